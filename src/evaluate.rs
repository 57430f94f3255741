use crate::{Comparison, Connective, EvalError, Node, Record};

/// Evaluate a rule tree against a record.
///
/// `AND` and `OR` evaluate their left side first and only evaluate the
/// right side when the left does not already decide the result. Errors in
/// a skipped branch are never reported.
///
/// # Errors
///
/// Returns [`EvalError::MissingAttribute`] when a reached comparison names an
/// attribute absent from the record, and [`EvalError::TypeMismatch`] when the
/// record value and literal cannot be compared with the operator.
pub fn evaluate_rule(root: &Node, record: &Record) -> Result<bool, EvalError> {
    enum Step<'a> {
        Eval(&'a Node),
        /// The left side of a connective has just produced `value`; decide
        /// whether its right side still matters.
        Right(Connective, &'a Node),
    }

    let mut value = false;
    let mut work = vec![Step::Eval(root)];
    while let Some(step) = work.pop() {
        match step {
            Step::Eval(Node::Comparison(cmp)) => value = eval_comparison(cmp, record)?,
            Step::Eval(Node::Logical {
                connective,
                left,
                right,
            }) => {
                work.push(Step::Right(*connective, right.as_ref()));
                work.push(Step::Eval(left.as_ref()));
            }
            Step::Right(Connective::And, _) if !value => {
                tracing::trace!("AND short-circuited on false left branch");
            }
            Step::Right(Connective::Or, _) if value => {
                tracing::trace!("OR short-circuited on true left branch");
            }
            Step::Right(_, right) => work.push(Step::Eval(right)),
        }
    }
    Ok(value)
}

fn eval_comparison(cmp: &Comparison, record: &Record) -> Result<bool, EvalError> {
    let actual = record
        .get(&cmp.attribute)
        .ok_or_else(|| EvalError::MissingAttribute {
            attribute: cmp.attribute.clone(),
        })?;
    actual
        .compare(cmp.op, &cmp.literal)
        .ok_or_else(|| EvalError::TypeMismatch {
            attribute: cmp.attribute.clone(),
            op: cmp.op,
            left: actual.kind(),
            right: cmp.literal.kind(),
        })
}
