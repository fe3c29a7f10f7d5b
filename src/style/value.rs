//! Property values.

use serde::Serialize;
use serde_json::{Number, Value};

use super::map::StyleMap;
use crate::error::CloneError;

/// A single property value in a [`StyleMap`].
///
/// Values mirror what a plain style object can hold:
///
/// - scalars: strings and finite numbers
/// - sequences of scalars, rendered as a comma separated multi-value
///   declaration (`[a, b]` → `a, b`)
/// - sequences of sequences, where each inner sequence is space joined
///   (`[[1, 2], [3]]` → `1 2, 3`)
/// - nested maps, used for fallback values; these never appear in the flat
///   projection returned by [`StyleRule::to_json`](crate::StyleRule::to_json)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Str(String),
    Number(Number),
    List(Vec<StyleValue>),
    Nested(StyleMap),
}

impl StyleValue {
    /// Creates a numeric value, or `None` for NaN and infinities.
    pub fn number(value: f64) -> Option<Self> {
        Number::from_f64(value).map(StyleValue::Number)
    }

    /// Returns `true` for strings and numbers.
    pub fn is_scalar(&self) -> bool {
        matches!(self, StyleValue::Str(_) | StyleValue::Number(_))
    }

    /// Returns the string payload of a [`StyleValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload as `f64`.
    ///
    /// Strings are not parsed; `"1"` yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Renders the value as it appears on the right-hand side of a declaration.
    ///
    /// Returns `None` for nested maps, which have no single-value form.
    pub fn to_css_value(&self) -> Option<String> {
        match self {
            StyleValue::Str(s) => Some(s.clone()),
            StyleValue::Number(n) => Some(format_number(n)),
            StyleValue::List(items) => Some(join_list(items)),
            StyleValue::Nested(_) => None,
        }
    }

    /// Converts one property of a parsed style, rejecting unsupported kinds.
    pub(crate) fn from_json(value: Value, path: &str) -> Result<Self, CloneError> {
        match value {
            Value::Object(map) => Ok(StyleValue::Nested(StyleMap::from_json_map(map, path)?)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| list_item(item, &format!("{}[{}]", path, i), true))
                .collect::<Result<Vec<_>, _>>()
                .map(StyleValue::List),
            other => scalar(other, path),
        }
    }
}

fn list_item(value: Value, path: &str, allow_nested_list: bool) -> Result<StyleValue, CloneError> {
    match value {
        Value::Array(items) if allow_nested_list => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| list_item(item, &format!("{}[{}]", path, i), false))
            .collect::<Result<Vec<_>, _>>()
            .map(StyleValue::List),
        Value::Array(_) => Err(CloneError::Unrepresentable {
            path: path.to_string(),
            kind: "deeply nested sequence",
        }),
        Value::Object(_) => Err(CloneError::Unrepresentable {
            path: path.to_string(),
            kind: "map inside a sequence",
        }),
        other => scalar(other, path),
    }
}

fn scalar(value: Value, path: &str) -> Result<StyleValue, CloneError> {
    match value {
        Value::String(s) => Ok(StyleValue::Str(s)),
        Value::Number(n) => Ok(StyleValue::Number(n)),
        Value::Null => Err(CloneError::Unrepresentable {
            path: path.to_string(),
            kind: "null",
        }),
        Value::Bool(_) => Err(CloneError::Unrepresentable {
            path: path.to_string(),
            kind: "boolean",
        }),
        Value::Array(_) | Value::Object(_) => Err(CloneError::Unrepresentable {
            path: path.to_string(),
            kind: "compound",
        }),
    }
}

/// Integral floats print without a fractional part, matching how style
/// objects written by hand read (`1.0` → `1`).
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

fn join_list(items: &[StyleValue]) -> String {
    let space_separated = matches!(items.first(), Some(StyleValue::List(_)));
    items
        .iter()
        .filter_map(|item| match item {
            StyleValue::List(inner) if space_separated => Some(
                inner
                    .iter()
                    .filter_map(StyleValue::to_css_value)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            other => other.to_css_value(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

impl From<&String> for StyleValue {
    fn from(value: &String) -> Self {
        StyleValue::Str(value.clone())
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StyleValue {
                fn from(value: $ty) -> Self {
                    StyleValue::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<StyleMap> for StyleValue {
    fn from(map: StyleMap) -> Self {
        StyleValue::Nested(map)
    }
}
