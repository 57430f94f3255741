use serde::{Deserialize, Serialize};

use super::error::{CombineError, EvalError};
use super::node::Node;
use super::record::Record;
use crate::parse::{ParseError, ParseOptions};

/// A named rule: the text it was written as and the tree parsed from it.
///
/// The rule exclusively owns its tree. Serializes as
/// `{ "name", "ruleString", "root" }`.
///
/// # Example
///
/// ```
/// use ruletree::{Record, Rule};
///
/// let rule = Rule::parse("senior_sales", "age > 30 AND department = 'Sales'").unwrap();
/// let record = Record::new().set("age", 35).set("department", "Sales");
/// assert!(rule.evaluate(&record).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    name: String,
    #[serde(rename = "ruleString")]
    rule_string: String,
    root: Node,
}

impl Rule {
    /// Parse `text` into a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a valid rule.
    pub fn parse(name: impl Into<String>, text: impl Into<String>) -> Result<Self, ParseError> {
        Self::parse_with(name, text, &ParseOptions::default())
    }

    /// Parse `text` into a new rule with explicit parser options.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a valid rule.
    pub fn parse_with(
        name: impl Into<String>,
        text: impl Into<String>,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        let rule_string = text.into();
        let root = crate::parse::parse_rule_with(&rule_string, options)?;
        Ok(Self {
            name: name.into(),
            rule_string,
            root,
        })
    }

    /// Assemble a rule from an already-built tree, e.g. one decoded from storage.
    #[must_use]
    pub fn from_parts(name: impl Into<String>, rule_string: impl Into<String>, root: Node) -> Self {
        Self {
            name: name.into(),
            rule_string: rule_string.into(),
            root,
        }
    }

    /// Replace the rule's text and tree. On error the rule is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the new text is not a valid rule.
    pub fn update(&mut self, text: impl Into<String>) -> Result<(), ParseError> {
        self.update_with(text, &ParseOptions::default())
    }

    /// [`update()`](Self::update) with explicit parser options.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the new text is not a valid rule.
    pub fn update_with(
        &mut self,
        text: impl Into<String>,
        options: &ParseOptions,
    ) -> Result<(), ParseError> {
        let rule_string = text.into();
        let root = crate::parse::parse_rule_with(&rule_string, options)?;
        self.rule_string = rule_string;
        self.root = root;
        Ok(())
    }

    /// Evaluate the rule against a record.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a reached comparison cannot be evaluated.
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        crate::evaluate::evaluate_rule(&self.root, record)
    }

    /// Combine several rules into a new one.
    ///
    /// The trees are cloned, so every input rule keeps owning its own tree.
    ///
    /// # Errors
    ///
    /// Returns [`CombineError::NoRules`] if `rules` is empty.
    pub fn combine(name: impl Into<String>, rules: &[Rule]) -> Result<Self, CombineError> {
        let roots = rules.iter().map(|r| r.root.clone()).collect();
        let strings = rules.iter().map(|r| r.rule_string.clone()).collect();
        let combined = crate::combine::combine_rules(roots, strings)?;
        Ok(Self {
            name: name.into(),
            rule_string: combined.rule_string,
            root: combined.root,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rule_string(&self) -> &str {
        &self.rule_string
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consume the rule, returning its name, text and tree.
    #[must_use]
    pub fn into_parts(self) -> (String, String, Node) {
        (self.name, self.rule_string, self.root)
    }
}
