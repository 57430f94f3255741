mod error;
mod grammar;
mod options;

pub use error::ParseError;
pub use options::{ParseOptions, DEFAULT_MAX_GROUP_DEPTH};

use crate::Node;

/// Parse rule text into a [`Node`] tree using the default [`ParseOptions`].
///
/// # Errors
///
/// Returns [`ParseError`] if the text is empty or not a valid rule.
pub fn parse_rule(text: &str) -> Result<Node, ParseError> {
    parse_rule_with(text, &ParseOptions::default())
}

/// Parse rule text into a [`Node`] tree.
///
/// Either the whole text parses into a complete tree or an error is
/// returned; no partial tree is ever produced.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is empty or not a valid rule.
pub fn parse_rule_with(text: &str, options: &ParseOptions) -> Result<Node, ParseError> {
    use winnow::stream::Stateful;
    use winnow::Parser;

    if text.trim().is_empty() {
        tracing::debug!("rejected empty rule text");
        return Err(ParseError::empty());
    }

    let input = Stateful {
        input: text,
        state: grammar::ParserState::new(*options),
    };
    match grammar::rule.parse(input) {
        Ok(root) => {
            tracing::debug!(rule = text, parsed = %root, "parsed rule");
            Ok(root)
        }
        Err(e) => {
            let message = e.inner().to_string();
            let message = if message.is_empty() {
                "unexpected input".to_owned()
            } else {
                message
            };
            let err = ParseError::new(message, e.offset());
            tracing::debug!(rule = text, error = %err, "failed to parse rule");
            Err(err)
        }
    }
}
