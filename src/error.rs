use thiserror::Error;

use crate::document::DocumentError;
use crate::parse::ParseError;
use crate::{CombineError, EvalError};

/// Unified error type covering parsing, combining, evaluation and document decoding.
///
/// Each operation returns its own error type; this enum lets callers that
/// chain several of them use `?` throughout.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
