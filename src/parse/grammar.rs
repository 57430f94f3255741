use winnow::ascii::{multispace0, Caseless};
use winnow::combinator::{alt, cut_err, eof, fail, not, opt, preceded, repeat, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::{any, literal, one_of, take_while};

use crate::{CompareOp, Comparison, Connective, Node, Value};

use super::options::ParseOptions;

pub(crate) type Input<'i> = Stateful<&'i str, ParserState>;

/// Options plus the current group nesting depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParserState {
    options: ParseOptions,
    depth: usize,
}

impl ParserState {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Self { options, depth: 0 }
    }
}

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

// -- Identifiers & keywords -------------------------------------------------

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    (one_of(is_ident_start), take_while(0.., is_ident_char))
        .take()
        .parse_next(input)
}

/// Match a whole-word keyword. `ANDROID` is not `AND`.
fn keyword(input: &mut Input<'_>, word: &'static str) -> ModalResult<()> {
    if input.state.options.keywords_case_insensitive() {
        literal(Caseless(word)).void().parse_next(input)?;
    } else {
        literal(word).void().parse_next(input)?;
    }
    not(one_of(is_ident_char)).parse_next(input)
}

fn and_keyword(input: &mut Input<'_>) -> ModalResult<()> {
    keyword(input, "AND")
}

fn or_keyword(input: &mut Input<'_>) -> ModalResult<()> {
    keyword(input, "OR")
}

fn and_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("&&".void(), and_keyword)).parse_next(input)
}

fn or_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("||".void(), or_keyword)).parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut Input<'_>) -> ModalResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '\'' => s.push('\''),
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut Input<'_>) -> ModalResult<f64> {
    (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn boolean(input: &mut Input<'_>) -> ModalResult<bool> {
    terminated(
        alt(("true".value(true), "false".value(false))),
        not(one_of(is_ident_char)),
    )
    .parse_next(input)
}

fn value(input: &mut Input<'_>) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        boolean.map(Value::Bool),
        number.map(Value::Number),
    ))
    .context(StrContext::Expected(StrContextValue::Description("literal")))
    .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut Input<'_>) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
        // Bare `=` is shorthand for equality.
        "=".value(CompareOp::Eq),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "comparison operator",
    )))
    .parse_next(input)
}

// -- Expressions (precedence: OR < AND < group/comparison) ------------------

fn comparison(input: &mut Input<'_>) -> ModalResult<Node> {
    let attribute = ident
        .context(StrContext::Expected(StrContextValue::Description(
            "attribute name",
        )))
        .parse_next(input)?;
    let op = cut_err(compare_op).parse_next(input)?;
    let literal = cut_err(value).parse_next(input)?;
    Ok(Node::Comparison(Comparison {
        attribute: attribute.to_owned(),
        op,
        literal,
    }))
}

fn group(input: &mut Input<'_>) -> ModalResult<Node> {
    '('.parse_next(input)?;
    if input.state.depth >= input.state.options.group_depth_limit() {
        return cut_err(fail)
            .context(StrContext::Expected(StrContextValue::Description(
                "fewer nested groups",
            )))
            .parse_next(input);
    }
    input.state.depth += 1;
    let inner = cut_err(expr).parse_next(input);
    input.state.depth -= 1;
    let inner = inner?;
    (
        ws,
        cut_err(')').context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
    )
        .parse_next(input)?;
    Ok(inner)
}

fn factor(input: &mut Input<'_>) -> ModalResult<Node> {
    ws.parse_next(input)?;
    alt((group, comparison))
        .context(StrContext::Expected(StrContextValue::Description(
            "comparison or parenthesized group",
        )))
        .parse_next(input)
}

/// `Factor (AND Factor)*`, folded left. Two groups with nothing between
/// them count as an `AND` when the options allow it.
fn and_expr(input: &mut Input<'_>) -> ModalResult<Node> {
    ws.parse_next(input)?;
    let mut prev_was_group = input.input.starts_with('(');
    let mut acc = factor(input)?;
    loop {
        let checkpoint = input.checkpoint();
        ws.parse_next(input)?;
        let explicit = opt(and_op).parse_next(input)?.is_some();
        if !explicit {
            let implicit = input.state.options.joins_adjacent_groups()
                && prev_was_group
                && input.input.starts_with('(');
            if !implicit {
                input.reset(&checkpoint);
                break;
            }
        }
        ws.parse_next(input)?;
        prev_was_group = input.input.starts_with('(');
        let rhs = cut_err(factor).parse_next(input)?;
        acc = Node::logical(Connective::And, acc, rhs);
    }
    Ok(acc)
}

fn or_expr(input: &mut Input<'_>) -> ModalResult<Node> {
    let first = and_expr(input)?;
    let rest: Vec<Node> =
        repeat(0.., preceded((ws, or_op), cut_err(and_expr))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Node::logical(Connective::Or, acc, r)))
}

fn expr(input: &mut Input<'_>) -> ModalResult<Node> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn rule(input: &mut Input<'_>) -> ModalResult<Node> {
    let root = expr(input)?;
    ws.parse_next(input)?;
    cut_err(eof.void())
        .context(StrContext::Expected(StrContextValue::Description(
            "end of rule",
        )))
        .parse_next(input)?;
    Ok(root)
}
