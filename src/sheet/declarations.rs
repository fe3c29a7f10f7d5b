//! Style declarations: the `name → style` documents sheets are built from.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::DeclarationsError;
use crate::style::json_kind;

/// Ordered `name → style` pairs.
///
/// Each entry becomes one rule when a sheet is created from the
/// declarations, in document order. Styles are kept as JSON values; they
/// are validated when the rule deep-clones them.
///
/// # Example
///
/// ```rust
/// use stylekit::Declarations;
///
/// let yaml = r#"
/// button:
///   color: white
///   padding: [4, 8]
/// title:
///   font-weight: bold
/// "#;
///
/// let declarations = Declarations::from_yaml(yaml).unwrap();
/// let names: Vec<&str> = declarations.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, vec!["button", "title"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declarations {
    entries: Vec<(String, Value)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping of names to styles.
    pub fn from_yaml(text: &str) -> Result<Self, DeclarationsError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    /// Parses a JSON object of names to styles.
    pub fn from_json(text: &str) -> Result<Self, DeclarationsError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Converts any serializable map, e.g. a `BTreeMap` or a `json!` literal.
    pub fn from_serialize<S>(value: &S) -> Result<Self, DeclarationsError>
    where
        S: Serialize + ?Sized,
    {
        Self::from_value(serde_json::to_value(value)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DeclarationsError> {
        match value {
            Value::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            // A YAML document holding only `~`.
            Value::Null => Ok(Self::new()),
            other => Err(DeclarationsError::NotAMap {
                found: json_kind(&other),
            }),
        }
    }

    /// Loads a file, as YAML for `.yaml`/`.yml` and as JSON otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DeclarationsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| DeclarationsError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Appends a declaration. A repeated name is kept as a second entry.
    pub fn push<S>(&mut self, name: impl Into<String>, style: &S) -> Result<&mut Self, DeclarationsError>
    where
        S: Serialize + ?Sized,
    {
        self.entries
            .push((name.into(), serde_json::to_value(style)?));
        Ok(self)
    }

    /// Builder form of [`Declarations::push`].
    pub fn with<S>(mut self, name: impl Into<String>, style: &S) -> Result<Self, DeclarationsError>
    where
        S: Serialize + ?Sized,
    {
        self.push(name, style)?;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_yaml_keeps_document_order() {
        let declarations = Declarations::from_yaml("zeta:\n  color: red\nalpha:\n  color: blue\n").unwrap();
        let names: Vec<&str> = declarations.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_from_json() {
        let declarations = Declarations::from_json(r#"{"a": {"margin": [0, "auto"]}}"#).unwrap();
        assert_eq!(declarations.len(), 1);
        let (_, style) = declarations.iter().next().unwrap();
        assert_eq!(style, &json!({"margin": [0, "auto"]}));
    }

    #[test]
    fn test_from_serialize() {
        let mut styles = BTreeMap::new();
        styles.insert("a", json!({"color": "red"}));
        let declarations = Declarations::from_serialize(&styles).unwrap();
        assert_eq!(declarations.len(), 1);
    }

    #[test]
    fn test_rejects_non_map() {
        let err = Declarations::from_yaml("- a\n- b\n").unwrap_err();
        assert!(matches!(err, DeclarationsError::NotAMap { found: "sequence" }));
    }

    #[test]
    fn test_null_is_empty() {
        assert!(Declarations::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Declarations::from_yaml("a: [1, 2"),
            Err(DeclarationsError::Yaml(_))
        ));
    }

    #[test]
    fn test_builder() {
        let declarations = Declarations::new()
            .with("a", &json!({"color": "red"}))
            .unwrap()
            .with("b", &json!({"color": "blue"}))
            .unwrap();
        assert_eq!(declarations.len(), 2);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("styles.yaml");
        std::fs::write(&yaml, "title:\n  color: red\n").unwrap();
        let json = dir.path().join("styles.json");
        std::fs::write(&json, r#"{"title": {"color": "red"}}"#).unwrap();

        assert_eq!(
            Declarations::from_path(&yaml).unwrap(),
            Declarations::from_path(&json).unwrap()
        );
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Declarations::from_path(dir.path().join("missing.yaml")).unwrap_err();
        match err {
            DeclarationsError::Read { path, .. } => assert!(path.ends_with("missing.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
