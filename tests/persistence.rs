use ruletree::{document, evaluate_rule, DocumentError, Record, Rule, RuleError};
use serde_json::json;

#[test]
fn rule_document_round_trip() {
    let rule = Rule::parse("senior_sales", "age > 30 AND department = 'Sales'").unwrap();
    let stored = serde_json::to_string(&rule).unwrap();
    let loaded: Rule = serde_json::from_str(&stored).unwrap();
    assert_eq!(loaded, rule);
}

#[test]
fn stored_rule_document_shape() {
    let rule = Rule::parse("senior_sales", "age > 30 AND department = 'Sales'").unwrap();
    let value = serde_json::to_value(&rule).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "senior_sales",
            "ruleString": "age > 30 AND department = 'Sales'",
            "root": {
                "type": "operator",
                "value": "AND",
                "left": {
                    "type": "operand",
                    "left": null,
                    "right": null,
                    "value": { "attribute": "age", "operator": ">", "literal": 30 }
                },
                "right": {
                    "type": "operand",
                    "left": null,
                    "right": null,
                    "value": { "attribute": "department", "operator": "==", "literal": "Sales" }
                }
            }
        })
    );
}

#[test]
fn evaluate_request_payload() {
    // The shape an HTTP layer would hand over: a stored tree plus a JSON record.
    let stored = json!({
        "type": "operator",
        "value": "OR",
        "left": {
            "type": "operand",
            "value": { "attribute": "age", "operator": ">", "literal": 30 }
        },
        "right": {
            "type": "operand",
            "value": { "attribute": "salary", "operator": ">", "literal": 50000 }
        }
    });
    let data = json!({ "age": 25, "salary": 60000 });

    let outcome = (|| -> Result<bool, RuleError> {
        let root = document::from_document(&stored)?;
        let record = Record::from_json(&data)?;
        Ok(evaluate_rule(&root, &record)?)
    })();
    assert!(outcome.unwrap());
}

#[test]
fn corrupt_stored_rule_is_rejected() {
    let stored = json!({
        "name": "broken",
        "ruleString": "age > 30",
        "root": { "type": "operand", "value": { "attribute": "age", "operator": "=>", "literal": 30 } }
    });
    let err = serde_json::from_value::<Rule>(stored).unwrap_err();
    assert!(err.to_string().contains("=>"));
}

#[test]
fn json_string_helpers() {
    let rule = Rule::parse("r", "(a = 1) (b = 'two')").unwrap();
    let text = document::to_json(rule.root()).unwrap();
    assert_eq!(document::from_json(&text).unwrap(), *rule.root());
    assert!(matches!(
        document::from_json("[]"),
        Err(DocumentError::Json(_))
    ));
}

#[test]
fn request_record_round_trips() {
    let data = json!({ "age": 25, "salary": 60000.5, "vip": true });
    let record = Record::from_json(&data).unwrap();
    assert!(!record.is_empty());
    assert_eq!(record.iter().count(), 3);
    assert_eq!(record.to_json().unwrap(), data);

    let empty = Record::from_json(&json!({})).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn rule_with_infinite_literal_cannot_be_stored() {
    let rule = Rule::from_parts("inf", "x < inf", ruletree::attr("x").lt(f64::INFINITY));
    let err = serde_json::to_string(&rule).unwrap_err();
    assert!(err.to_string().contains("non-finite"), "{err}");
}
