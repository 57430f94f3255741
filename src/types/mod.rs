mod error;
mod node;
mod record;
mod rule;
mod value;

pub use error::{CombineError, EvalError};
pub use node::{attr, AttrExpr, CompareOp, Comparison, Connective, Node};
pub use record::Record;
pub use rule::Rule;
pub use value::Value;
