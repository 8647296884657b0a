//! Context variables - run-scoped key/value state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value store shared by instruction generators and tools during a run
///
/// Only tool results write to it; the runner merges their updates after each
/// dispatch batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextVariables {
    values: Map<String, Value>,
}

impl ContextVariables {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a value rendered as text, or the empty string for unknown keys
    ///
    /// String values are returned unquoted; other JSON values use their compact form.
    pub fn get_str(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Merge another store into this one; keys in `other` win
    pub fn merge(&mut self, other: &ContextVariables) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Iterate over entries in insertion-independent key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying JSON map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for ContextVariables {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.set(k, v);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_str_defaults_to_empty() {
        let ctx = ContextVariables::new().with("name", "James").with("user_id", 123);
        assert_eq!(ctx.get_str("name"), "James");
        assert_eq!(ctx.get_str("user_id"), "123");
        assert_eq!(ctx.get_str("missing"), "");
    }

    #[test]
    fn test_merge_overwrites() {
        let mut ctx = ContextVariables::new().with("k", 1).with("a", "x");
        let update = ContextVariables::new().with("k", 2).with("b", true);
        ctx.merge(&update);

        assert_eq!(ctx.get("k"), Some(&json!(2)));
        assert_eq!(ctx.get("a"), Some(&json!("x")));
        assert_eq!(ctx.get("b"), Some(&json!(true)));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let ctx: ContextVariables = [("a", 1)].into_iter().collect();
        assert_eq!(serde_json::to_string(&ctx).unwrap(), r#"{"a":1}"#);

        let back: ContextVariables = serde_json::from_str(r#"{"b":"c"}"#).unwrap();
        assert_eq!(back.get_str("b"), "c");
    }
}
