use thiserror::Error;

use super::CompareOp;

/// Errors raised while evaluating a rule tree against a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("attribute '{attribute}' is missing from the record")]
    MissingAttribute { attribute: String },

    #[error("cannot apply '{op}' to {left} attribute '{attribute}' and {right} literal")]
    TypeMismatch {
        attribute: String,
        op: CompareOp,
        left: &'static str,
        right: &'static str,
    },
}

/// Errors raised by the rule combiner when its arguments are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("no rules to combine; at least one is required")]
    NoRules,

    #[error("got {roots} rule trees but {strings} rule strings")]
    LengthMismatch { roots: usize, strings: usize },
}
