//! Style data: values, ordered maps and CSS text output.
//!
//! - [`StyleValue`]: a property value (scalar, multi-value sequence, or nested fallbacks)
//! - [`StyleMap`]: an ordered, deep-cloned map of properties
//! - [`to_css`] / [`CssOptions`]: serialization to CSS rule text
//!
//! Style objects enter the crate through [`StyleMap::clone_from_serialize`],
//! a serde_json round trip that produces a copy sharing nothing with the
//! caller's value.

mod css;
mod map;
mod value;

pub use css::{to_css, CssOptions, FALLBACKS_KEY};
pub(crate) use map::json_kind;
pub use map::StyleMap;
pub use value::StyleValue;
