//! Boolean eligibility rules written as text.
//!
//! Rules such as `age > 30 AND department = 'Sales'` are parsed into a
//! [`Node`] tree, several trees can be merged into one with
//! [`combine_rules()`], and a tree is evaluated against a [`Record`] with
//! [`evaluate_rule()`].
//!
//! ```
//! use ruletree::{combine_rules, evaluate_rule, parse_rule, Record};
//!
//! let age = parse_rule("age > 30").unwrap();
//! let salary = parse_rule("salary > 50000").unwrap();
//! let combined = combine_rules(
//!     vec![age, salary],
//!     vec!["age > 30".into(), "salary > 50000".into()],
//! )
//! .unwrap();
//! assert_eq!(combined.rule_string, "(age > 30) OR (salary > 50000)");
//!
//! let record = Record::new().set("age", 25).set("salary", 60000);
//! assert!(evaluate_rule(&combined.root, &record).unwrap());
//! ```

mod combine;
pub mod document;
mod error;
mod evaluate;
pub mod parse;
mod types;

pub use combine::{combine_rules, Combined};
pub use document::DocumentError;
pub use error::RuleError;
pub use evaluate::evaluate_rule;
pub use parse::{parse_rule, parse_rule_with, ParseError, ParseOptions};
pub use types::{
    attr, AttrExpr, CombineError, CompareOp, Comparison, Connective, EvalError, Node, Record,
    Rule, Value,
};
