//! Ordered style maps and the deep-clone round trip.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::value::StyleValue;
use crate::error::CloneError;

/// An ordered mapping from property name to [`StyleValue`].
///
/// Declaration order is kept exactly as written: later declarations of the
/// same property win under the cascade, so the map never reorders entries.
/// Inserting an existing property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    entries: Vec<(String, StyleValue)>,
}

impl StyleMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-clones any serializable style object.
    ///
    /// The value is serialized to canonical JSON and parsed back, so the
    /// result shares nothing with the input. Returns the clone together with
    /// the canonical serialization, which callers use as the class-name
    /// generator input.
    ///
    /// # Errors
    ///
    /// Returns a [`CloneError`] if the value does not serialize, is not a
    /// map, or holds a value with no CSS representation.
    pub fn clone_from_serialize<S>(style: &S) -> Result<(Self, String), CloneError>
    where
        S: Serialize + ?Sized,
    {
        let serialized = serde_json::to_string(style)?;
        let parsed: Value = serde_json::from_str(&serialized)?;
        let map = Self::from_json(parsed)?;
        Ok((map, serialized))
    }

    /// Converts an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Fails the same way as [`StyleMap::clone_from_serialize`].
    pub fn from_json(value: Value) -> Result<Self, CloneError> {
        match value {
            Value::Object(map) => Self::from_json_map(map, ""),
            other => Err(CloneError::NotAMap {
                found: json_kind(&other),
            }),
        }
    }

    pub(crate) fn from_json_map(map: Map<String, Value>, prefix: &str) -> Result<Self, CloneError> {
        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            entries.push((name, StyleValue::from_json(value, &path)?));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Sets a property, returning the previous value if there was one.
    ///
    /// New properties are appended; existing ones keep their position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StyleValue>) -> Option<StyleValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Removes a property, shifting later entries down.
    pub fn remove(&mut self, name: &str) -> Option<StyleValue> {
        let pos = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates over properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<String>,
    V: Into<StyleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_clone_preserves_order() {
        let (map, _) =
            StyleMap::clone_from_serialize(&json!({"z-index": 1, "color": "red", "margin": 0}))
                .unwrap();
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["z-index", "color", "margin"]);
    }

    #[test]
    fn test_clone_returns_canonical_serialization() {
        let (_, serialized) = StyleMap::clone_from_serialize(&json!({"color": "red"})).unwrap();
        assert_eq!(serialized, r#"{"color":"red"}"#);
    }

    #[test]
    fn test_clone_from_rust_map() {
        let mut source = BTreeMap::new();
        source.insert("width", 10);
        let (map, _) = StyleMap::clone_from_serialize(&source).unwrap();
        assert_eq!(map.get("width"), Some(&StyleValue::from(10)));
    }

    #[test]
    fn test_clone_rejects_non_map() {
        let err = StyleMap::clone_from_serialize(&json!(["a"])).unwrap_err();
        assert!(matches!(err, CloneError::NotAMap { found: "sequence" }));
    }

    #[test]
    fn test_clone_rejects_non_finite_numbers() {
        let mut source = BTreeMap::new();
        source.insert("opacity", f64::NAN);
        let err = StyleMap::clone_from_serialize(&source).unwrap_err();
        match err {
            CloneError::Unrepresentable { path, kind } => {
                assert_eq!(path, "opacity");
                assert_eq!(kind, "null");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clone_rejects_non_string_keys() {
        let mut source = BTreeMap::new();
        source.insert(vec![1u8], "x");
        let err = StyleMap::clone_from_serialize(&source).unwrap_err();
        assert!(matches!(err, CloneError::Serialize(_)));
    }

    #[test]
    fn test_nested_error_path() {
        let err =
            StyleMap::clone_from_serialize(&json!({"fallbacks": {"color": null}})).unwrap_err();
        match err {
            CloneError::Unrepresentable { path, .. } => assert_eq!(path, "fallbacks.color"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map: StyleMap = vec![("a", 1), ("b", 2)].into_iter().collect();
        let previous = map.insert("a", 3);
        assert_eq!(previous, Some(StyleValue::from(1)));
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&StyleValue::from(3)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: StyleMap = vec![("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        map.remove("b");
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(map.remove("missing").is_none());
    }

    #[test]
    fn test_serialize_round_trips_through_json() {
        let (map, _) =
            StyleMap::clone_from_serialize(&json!({"a": "x", "b": [1, 2], "c": {"d": 1}}))
                .unwrap();
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value, json!({"a": "x", "b": [1, 2], "c": {"d": 1}}));
    }
}
