//! Backend capability sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key marking whether a backend is trusted for real sessions.
pub const SAFE: &str = "safe";

/// What a loaded backend supports. Empty means unusable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeMap<String, Value>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Some(false)` once a backend has been marked unsafe.
    pub fn is_safe(&self) -> Option<bool> {
        self.0.get(SAFE).and_then(Value::as_bool)
    }

    pub fn mark_unsafe(&mut self) {
        self.insert(SAFE, false);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Capabilities {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_flag() {
        let mut caps = Capabilities::new().with("display-mode", "native");
        assert_eq!(caps.is_safe(), None);
        caps.mark_unsafe();
        assert_eq!(caps.is_safe(), Some(false));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn serializes_as_a_plain_object() {
        let caps: Capabilities = [("display-mode", "native")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&caps).unwrap(),
            r#"{"display-mode":"native"}"#
        );
    }
}
