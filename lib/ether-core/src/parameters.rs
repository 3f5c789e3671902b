//! Request parameters.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Key-value parameters encoded either into the query string or a JSON body.
///
/// Keys are unique; inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Value>);

impl Parameters {
    /// Empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterate over `(key, canonical string)` pairs, as used for query items.
    pub fn string_pairs(&self) -> impl Iterator<Item = (&str, String)> {
        self.iter().map(|(key, value)| (key, canonical_string(value)))
    }
}

/// Canonical string form: strings as-is, `null` as empty, everything else as JSON text.
fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Parameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn string_pairs_use_canonical_form() {
        let params = Parameters::new()
            .with("marco", "polo")
            .with("count", 3)
            .with("ratio", 1.5)
            .with("flag", true)
            .with("nothing", Value::Null);

        let pairs: Vec<_> = params.string_pairs().collect();
        check!(
            pairs
                == vec![
                    ("count", "3".to_string()),
                    ("flag", "true".to_string()),
                    ("marco", "polo".to_string()),
                    ("nothing", String::new()),
                    ("ratio", "1.5".to_string()),
                ]
        );
    }

    #[test]
    fn keys_are_unique() {
        let mut params = Parameters::from([("a", "1")]);
        let previous = params.insert("a", "2");

        check!(previous == Some(Value::from("1")));
        check!(params.len() == 1);
        check!(params.get("a") == Some(&Value::from("2")));
    }

    #[test]
    fn serializes_as_object() {
        let params = Parameters::from([("name", Value::from("Alice")), ("age", Value::from(30))]);
        let json = serde_json::to_string(&params).expect("serialize");
        check!(json == r#"{"age":30,"name":"Alice"}"#);
    }
}
