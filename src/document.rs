//! Conversion between rule trees and their persisted JSON document shape.
//!
//! Each node is stored as an object with four keys:
//!
//! ```text
//! { "type": "operator", "value": "AND" | "OR", "left": <node>, "right": <node> }
//! { "type": "operand",  "value": { "attribute": "age", "operator": ">", "literal": 30 },
//!   "left": null, "right": null }
//! ```
//!
//! Decoding enforces this shape: operator nodes need both children and a
//! connective, operand nodes need no children, one of the six operator
//! tokens and a scalar literal. [`Node`] implements `Serialize` and
//! `Deserialize` through the same shape, so a [`Rule`](crate::Rule) can be
//! stored as `{ "name", "ruleString", "root" }`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{CompareOp, Comparison, Connective, Node, Record, Value};

/// Largest magnitude below which whole numbers are written as JSON integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Deepest tree that can be written as a document. Anything deeper would
/// exceed serde_json's nesting limit and could not be read back.
pub const MAX_DOCUMENT_DEPTH: usize = 100;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when decoding trees or records from JSON.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid node document: {0}")]
    InvalidShape(String),

    #[error("attribute '{attribute}' holds a {kind}; expected a number, string or boolean")]
    UnsupportedValue {
        attribute: String,
        kind: &'static str,
    },

    #[error("tree depth {depth} exceeds the document limit of {max}")]
    TooDeep { depth: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Document type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct NodeDocument {
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    left: Option<Box<NodeDocument>>,
    #[serde(default)]
    right: Option<Box<NodeDocument>>,
    value: NodeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeKind {
    Operator,
    Operand,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum NodeValue {
    Connective(String),
    Operand(OperandDocument),
}

#[derive(Debug, Serialize, Deserialize)]
struct OperandDocument {
    attribute: String,
    operator: String,
    literal: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Node -> document
// ---------------------------------------------------------------------------

fn literal_to_json(attribute: &str, value: &Value) -> Result<serde_json::Value, DocumentError> {
    Ok(match value {
        Value::Number(v) if !v.is_finite() => {
            return Err(DocumentError::UnsupportedValue {
                attribute: attribute.to_owned(),
                kind: "non-finite number",
            })
        }
        #[allow(clippy::cast_possible_truncation)]
        Value::Number(v) if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
            serde_json::Value::from(*v as i64)
        }
        Value::Number(v) => serde_json::Value::from(*v),
        Value::String(v) => serde_json::Value::from(v.as_str()),
        Value::Bool(v) => serde_json::Value::from(*v),
    })
}

fn encode(node: &Node) -> Result<NodeDocument, DocumentError> {
    let depth = node.depth();
    if depth > MAX_DOCUMENT_DEPTH {
        return Err(DocumentError::TooDeep {
            depth,
            max: MAX_DOCUMENT_DEPTH,
        });
    }
    encode_node(node)
}

fn encode_node(node: &Node) -> Result<NodeDocument, DocumentError> {
    Ok(match node {
        Node::Comparison(cmp) => NodeDocument {
            kind: NodeKind::Operand,
            left: None,
            right: None,
            value: NodeValue::Operand(OperandDocument {
                attribute: cmp.attribute.clone(),
                operator: cmp.op.as_str().to_owned(),
                literal: literal_to_json(&cmp.attribute, &cmp.literal)?,
            }),
        },
        Node::Logical {
            connective,
            left,
            right,
        } => NodeDocument {
            kind: NodeKind::Operator,
            left: Some(Box::new(encode_node(left)?)),
            right: Some(Box::new(encode_node(right)?)),
            value: NodeValue::Connective(connective.keyword().to_owned()),
        },
    })
}

// ---------------------------------------------------------------------------
// Document -> Node
// ---------------------------------------------------------------------------

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn scalar_from_json(attribute: &str, value: &serde_json::Value) -> Result<Value, DocumentError> {
    match value {
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
            DocumentError::UnsupportedValue {
                attribute: attribute.to_owned(),
                kind: "number outside the f64 range",
            }
        }),
        other => Err(DocumentError::UnsupportedValue {
            attribute: attribute.to_owned(),
            kind: json_kind(other),
        }),
    }
}

fn decode_node(doc: NodeDocument) -> Result<Node, DocumentError> {
    match (doc.kind, doc.value) {
        (NodeKind::Operator, NodeValue::Connective(keyword)) => {
            let connective = Connective::from_keyword(&keyword).ok_or_else(|| {
                DocumentError::InvalidShape(format!(
                    "operator value must be \"AND\" or \"OR\", got \"{keyword}\""
                ))
            })?;
            let (Some(left), Some(right)) = (doc.left, doc.right) else {
                return Err(DocumentError::InvalidShape(format!(
                    "{connective} operator is missing a child"
                )));
            };
            Ok(Node::logical(
                connective,
                decode_node(*left)?,
                decode_node(*right)?,
            ))
        }
        (NodeKind::Operator, NodeValue::Operand(_)) => Err(DocumentError::InvalidShape(
            "operator value must be \"AND\" or \"OR\", got an operand".to_owned(),
        )),
        (NodeKind::Operand, NodeValue::Operand(operand)) => {
            if doc.left.is_some() || doc.right.is_some() {
                return Err(DocumentError::InvalidShape(format!(
                    "operand on '{}' must not have children",
                    operand.attribute
                )));
            }
            let op = CompareOp::from_token(&operand.operator).ok_or_else(|| {
                DocumentError::InvalidShape(format!(
                    "unknown comparison operator \"{}\"",
                    operand.operator
                ))
            })?;
            let literal = scalar_from_json(&operand.attribute, &operand.literal)?;
            Ok(Node::Comparison(Comparison {
                attribute: operand.attribute,
                op,
                literal,
            }))
        }
        (NodeKind::Operand, NodeValue::Connective(keyword)) => Err(DocumentError::InvalidShape(
            format!("operand value must be an object, got \"{keyword}\""),
        )),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Encode a tree as a JSON document value.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedValue`] for a NaN or infinite literal
/// and [`DocumentError::TooDeep`] for trees deeper than [`MAX_DOCUMENT_DEPTH`].
pub fn to_document(node: &Node) -> Result<serde_json::Value, DocumentError> {
    Ok(serde_json::to_value(encode(node)?)?)
}

/// Decode a tree from a JSON document value, validating its shape.
///
/// # Errors
///
/// Returns [`DocumentError`] if the value does not have the node shape.
pub fn from_document(value: &serde_json::Value) -> Result<Node, DocumentError> {
    let doc = NodeDocument::deserialize(value)?;
    decode_node(doc)
}

/// Encode a tree as a JSON string.
///
/// # Errors
///
/// Same as [`to_document()`].
pub fn to_json(node: &Node) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(&encode(node)?)?)
}

/// Decode a tree from a JSON string, validating its shape.
///
/// # Errors
///
/// Returns [`DocumentError`] on malformed JSON or an invalid node shape.
pub fn from_json(input: &str) -> Result<Node, DocumentError> {
    let doc: NodeDocument = serde_json::from_str(input)?;
    decode_node(doc)
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = NodeDocument::deserialize(deserializer)?;
        decode_node(doc).map_err(serde::de::Error::custom)
    }
}

impl Record {
    /// Build a record from a JSON object whose values are numbers, strings or booleans.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidShape`] if `value` is not an object and
    /// [`DocumentError::UnsupportedValue`] for null, array or object members.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, DocumentError> {
        let serde_json::Value::Object(map) = value else {
            return Err(DocumentError::InvalidShape(format!(
                "record must be a JSON object, got {}",
                json_kind(value)
            )));
        };
        let mut record = Record::new();
        for (attribute, member) in map {
            record.insert(attribute, scalar_from_json(attribute, member)?);
        }
        Ok(record)
    }

    /// The record as a JSON object, the inverse of [`Record::from_json()`].
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedValue`] for NaN or infinite numbers.
    pub fn to_json(&self) -> Result<serde_json::Value, DocumentError> {
        let mut map = serde_json::Map::with_capacity(self.len());
        for (attribute, value) in self.iter() {
            map.insert(attribute.to_owned(), literal_to_json(attribute, value)?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::attr;

    #[test]
    fn encode_operand() {
        let doc = to_document(&attr("age").gt(30)).unwrap();
        assert_eq!(
            doc,
            json!({
                "type": "operand",
                "left": null,
                "right": null,
                "value": { "attribute": "age", "operator": ">", "literal": 30 }
            })
        );
    }

    #[test]
    fn encode_operator() {
        let doc = to_document(&attr("age").gt(30).and(attr("department").eq("Sales"))).unwrap();
        assert_eq!(doc["type"], "operator");
        assert_eq!(doc["value"], "AND");
        assert_eq!(doc["left"]["value"]["attribute"], "age");
        assert_eq!(doc["right"]["value"]["literal"], "Sales");
        assert_eq!(doc["right"]["value"]["operator"], "==");
    }

    #[test]
    fn encode_fractional_and_bool_literals() {
        let doc = to_document(&attr("ratio").lte(0.75)).unwrap();
        assert_eq!(doc["value"]["literal"], json!(0.75));
        let doc = to_document(&attr("active").eq(true)).unwrap();
        assert_eq!(doc["value"]["literal"], json!(true));
    }

    #[test]
    fn decode_accepts_absent_children_on_operands() {
        let node = from_document(&json!({
            "type": "operand",
            "value": { "attribute": "salary", "operator": ">=", "literal": 50000 }
        }))
        .unwrap();
        assert_eq!(node, attr("salary").gte(50_000));
    }

    #[test]
    fn decode_nested_tree() {
        let node = from_document(&json!({
            "type": "operator",
            "value": "OR",
            "left": {
                "type": "operand",
                "value": { "attribute": "age", "operator": "<", "literal": 18 }
            },
            "right": {
                "type": "operand",
                "value": { "attribute": "vip", "operator": "==", "literal": true }
            }
        }))
        .unwrap();
        assert_eq!(node, attr("age").lt(18).or(attr("vip").eq(true)));
    }

    #[test]
    fn decode_rejects_operator_without_child() {
        let err = from_document(&json!({
            "type": "operator",
            "value": "AND",
            "left": {
                "type": "operand",
                "value": { "attribute": "a", "operator": "==", "literal": 1 }
            },
            "right": null
        }))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidShape(_)));
    }

    #[test]
    fn decode_rejects_unknown_connective() {
        let err = from_document(&json!({
            "type": "operator",
            "value": "XOR",
            "left": { "type": "operand", "value": { "attribute": "a", "operator": "==", "literal": 1 } },
            "right": { "type": "operand", "value": { "attribute": "b", "operator": "==", "literal": 1 } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("XOR"));
    }

    #[test]
    fn decode_rejects_operand_with_children() {
        let leaf = json!({ "type": "operand", "value": { "attribute": "a", "operator": "==", "literal": 1 } });
        let err = from_document(&json!({
            "type": "operand",
            "value": { "attribute": "a", "operator": "==", "literal": 1 },
            "left": leaf.clone(),
            "right": leaf
        }))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidShape(_)));
    }

    #[test]
    fn decode_rejects_unknown_operator_token() {
        let err = from_document(&json!({
            "type": "operand",
            "value": { "attribute": "a", "operator": "=", "literal": 1 }
        }))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidShape(_)));
    }

    #[test]
    fn decode_rejects_non_scalar_literal() {
        let err = from_document(&json!({
            "type": "operand",
            "value": { "attribute": "tags", "operator": "==", "literal": ["a"] }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnsupportedValue { kind: "array", .. }
        ));
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let err = from_document(&json!({ "type": "branch", "value": "AND" })).unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn json_string_round_trip() {
        let node = attr("age")
            .gt(30)
            .and(attr("department").eq("Sales"))
            .or(attr("ratio").lt(0.5));
        let text = to_json(&node).unwrap();
        assert_eq!(from_json(&text).unwrap(), node);
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(from_json("{ not json"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn serde_impls_use_document_shape() {
        let node = attr("x").neq("y");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "operand");
        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn record_from_json_object() {
        let record =
            Record::from_json(&json!({ "age": 35, "department": "Sales", "active": true }))
                .unwrap();
        assert_eq!(record.get("age"), Some(&Value::Number(35.0)));
        assert_eq!(record.get("department"), Some(&Value::from("Sales")));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn record_from_json_rejects_nested_values() {
        let err = Record::from_json(&json!({ "age": 35, "address": { "city": "Oslo" } }))
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnsupportedValue { ref attribute, kind: "object" } if attribute == "address"
        ));
        assert!(Record::from_json(&json!({ "age": null })).is_err());
        assert!(matches!(
            Record::from_json(&json!([1, 2])),
            Err(DocumentError::InvalidShape(_))
        ));
    }

    #[test]
    fn non_finite_literals_rejected() {
        for literal in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let node = attr("x").eq(literal);
            assert!(matches!(
                to_document(&node),
                Err(DocumentError::UnsupportedValue { ref attribute, kind: "non-finite number" })
                    if attribute == "x"
            ));
            assert!(to_json(&node).is_err());
            assert!(serde_json::to_value(&node).is_err());
        }
    }

    #[test]
    fn non_finite_literal_deep_in_tree_rejected() {
        let node = attr("a").eq(1).and(attr("b").gt(f64::INFINITY).or(attr("c").eq(2)));
        let err = to_json(&node).unwrap_err();
        assert!(err.to_string().contains("'b'"), "{err}");
    }

    fn chain(depth: usize) -> Node {
        (1..depth).fold(attr("f0").eq(1), |acc, i| acc.and(attr(&format!("f{i}")).eq(i as i64)))
    }

    #[test]
    fn deepest_storable_tree_round_trips() {
        let node = chain(MAX_DOCUMENT_DEPTH);
        let text = to_json(&node).unwrap();
        assert!(from_json(&text).unwrap() == node);
    }

    #[test]
    fn too_deep_tree_rejected() {
        let node = chain(MAX_DOCUMENT_DEPTH + 1);
        assert!(matches!(
            to_document(&node),
            Err(DocumentError::TooDeep { depth, max: MAX_DOCUMENT_DEPTH }) if depth == MAX_DOCUMENT_DEPTH + 1
        ));
        assert!(serde_json::to_string(&node).is_err());
    }

    #[test]
    fn record_to_json_inverts_from_json() {
        let data = json!({ "age": 35, "ratio": 0.5, "department": "Sales", "active": false });
        let record = Record::from_json(&data).unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record.to_json().unwrap(), data);

        assert!(Record::new().to_json().unwrap().as_object().unwrap().is_empty());
        assert!(Record::new().set("x", f64::NAN).to_json().is_err());
    }
}
