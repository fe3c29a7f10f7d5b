//! CSS text output.

use super::map::StyleMap;
use super::value::StyleValue;

/// Key holding fallback declarations, emitted ahead of the regular ones.
pub const FALLBACKS_KEY: &str = "fallbacks";

const INDENT: &str = "  ";

/// Formatting options for [`to_css`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssOptions {
    /// Nesting level of the rule; each level adds two spaces.
    pub indentation: usize,
    /// Emit regular declarations sorted by property name.
    pub sort_properties: bool,
}

impl CssOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indentation(mut self, level: usize) -> Self {
        self.indentation = level;
        self
    }

    pub fn sort_properties(mut self, sort: bool) -> Self {
        self.sort_properties = sort;
        self
    }
}

/// Serializes one rule as `selector { prop: value; ... }`.
///
/// Fallbacks (a nested map under [`FALLBACKS_KEY`]) come first so the
/// regular value overrides them in browsers that understand it. Any other
/// nested map is skipped.
///
/// # Example
///
/// ```rust
/// use stylekit::{to_css, CssOptions, StyleMap};
///
/// let style: StyleMap = vec![("color", "red")].into_iter().collect();
/// assert_eq!(to_css(".a", &style, &CssOptions::new()), ".a {\n  color: red;\n}");
/// ```
pub fn to_css(selector: &str, style: &StyleMap, options: &CssOptions) -> String {
    let level = options.indentation;

    let fallbacks: Vec<(&str, String)> = match style.get(FALLBACKS_KEY) {
        Some(StyleValue::Nested(map)) => declarations(map),
        _ => Vec::new(),
    };

    let mut regular: Vec<(&str, String)> = declarations(style)
        .into_iter()
        .filter(|(name, _)| *name != FALLBACKS_KEY)
        .collect();
    if options.sort_properties {
        regular.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut css = indent(level, selector);
    css.push_str(" {");
    for (name, value) in fallbacks.into_iter().chain(regular) {
        css.push('\n');
        css.push_str(&indent(level + 1, &format!("{}: {};", name, value)));
    }
    css.push('\n');
    css.push_str(&indent(level, "}"));
    css
}

fn declarations(style: &StyleMap) -> Vec<(&str, String)> {
    style
        .iter()
        .filter_map(|(name, value)| value.to_css_value().map(|css| (name, css)))
        .collect()
}

fn indent(level: usize, text: &str) -> String {
    format!("{}{}", INDENT.repeat(level), text)
}
