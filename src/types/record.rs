use std::collections::HashMap;

use super::Value;

/// Evaluation input mapping attribute names to scalar [`Value`]s.
///
/// Records are supplied per call and never retained by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    data: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    #[must_use]
    pub fn set(mut self, attribute: &str, value: impl Into<Value>) -> Self {
        self.insert(attribute, value.into());
        self
    }

    /// Insert an attribute (mutable reference version).
    pub fn insert(&mut self, attribute: &str, value: Value) {
        self.data.insert(attribute.to_owned(), value);
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.data.get(attribute)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let record = Record::new().set("department", "Sales").set("age", 35);
        assert_eq!(
            record.get("department"),
            Some(&Value::String("Sales".to_owned()))
        );
        assert_eq!(record.get("age"), Some(&Value::Number(35.0)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn get_missing_returns_none() {
        let record = Record::new().set("age", 35);
        assert_eq!(record.get("salary"), None);
    }

    #[test]
    fn dotted_names_are_plain_keys() {
        let record = Record::new().set("user.age", 20);
        assert_eq!(record.get("user.age"), Some(&Value::Number(20.0)));
        assert_eq!(record.get("user"), None);
    }

    #[test]
    fn overwrite_value() {
        let record = Record::new().set("score", 10).set("score", 20);
        assert_eq!(record.get("score"), Some(&Value::Number(20.0)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn insert_mutable_ref() {
        let mut record = Record::new();
        record.insert("active", Value::Bool(true));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn collect_from_pairs() {
        let record: Record = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(record.get("b"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn empty_record() {
        let record = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.iter().count(), 0);
    }
}
