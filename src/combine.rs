use crate::{CombineError, Connective, Node};

/// The result of merging several rule trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Combined {
    /// Merged tree. Every input root appears exactly once, in input order.
    pub root: Node,
    /// Each input rule string, parenthesized and joined with the connective keyword.
    pub rule_string: String,
    /// The connective used to join the inputs.
    pub connective: Connective,
}

/// Merge rule trees into a single tree joined by the majority connective.
///
/// The roots are moved into the merged tree; nothing is copied or shared.
/// Use [`Rule::combine()`](crate::Rule::combine) to keep the original rules intact.
///
/// # Errors
///
/// Returns [`CombineError::NoRules`] for empty input and
/// [`CombineError::LengthMismatch`] when `roots` and `rule_strings` differ in length.
pub fn combine_rules(
    roots: Vec<Node>,
    rule_strings: Vec<String>,
) -> Result<Combined, CombineError> {
    if roots.is_empty() {
        return Err(CombineError::NoRules);
    }
    if roots.len() != rule_strings.len() {
        return Err(CombineError::LengthMismatch {
            roots: roots.len(),
            strings: rule_strings.len(),
        });
    }

    let connective = majority_connective(&roots);
    let rule_string = join_rule_strings(&rule_strings, connective);

    let count = roots.len();
    let mut iter = roots.into_iter();
    let first = iter.next().ok_or(CombineError::NoRules)?;
    let root = iter.fold(first, |acc, next| Node::logical(connective, acc, next));

    tracing::debug!(
        rules = count,
        connective = %connective,
        combined = %rule_string,
        "combined rules"
    );

    Ok(Combined {
        root,
        rule_string,
        connective,
    })
}

/// Tally the top-level connectives of `Logical` roots. Comparison roots do
/// not vote; a tie (including no votes) falls back to `OR`.
pub(crate) fn majority_connective(roots: &[Node]) -> Connective {
    let (and_votes, or_votes) =
        roots
            .iter()
            .fold((0_usize, 0_usize), |(and, or), root| match root.top_connective() {
                Some(Connective::And) => (and + 1, or),
                Some(Connective::Or) => (and, or + 1),
                None => (and, or),
            });
    if and_votes > or_votes {
        Connective::And
    } else {
        Connective::Or
    }
}

fn join_rule_strings(rule_strings: &[String], connective: Connective) -> String {
    let separator = format!(" {} ", connective.keyword());
    rule_strings
        .iter()
        .map(|s| format!("({})", s.trim()))
        .collect::<Vec<_>>()
        .join(&separator)
}
