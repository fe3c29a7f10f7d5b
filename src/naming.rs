//! Class-name generation for named rules.

use deunicode::deunicode;

use crate::rule::StyleRule;

/// Produces the class name of a named rule.
///
/// Receives the canonical serialization of the rule's style and the
/// partially built rule (its name is set, its selector is not yet).
/// Implementations must return a CSS identifier that is unique among the
/// rules they name.
///
/// Any `FnMut(&str, &StyleRule) -> String` closure is a generator.
pub trait GenerateClassName {
    fn generate(&mut self, style: &str, rule: &StyleRule) -> String;
}

impl<F> GenerateClassName for F
where
    F: FnMut(&str, &StyleRule) -> String,
{
    fn generate(&mut self, style: &str, rule: &StyleRule) -> String {
        self(style, rule)
    }
}

/// The default generator: `{name}-{hash}-{counter}`.
///
/// `name` is the rule name reduced to an identifier, `hash` is a base-36
/// FNV-1a hash of the serialized style and `counter` increases with every
/// generated name, so identical styles still get distinct classes.
///
/// ```rust
/// use serde_json::json;
/// use stylekit::{DefaultClassNames, RuleOptions, StyleRule};
///
/// let mut names = DefaultClassNames::new();
/// let options = RuleOptions::new().named(true);
/// let a = StyleRule::new(Some("title"), &json!({"color": "red"}), options.clone(), &mut names).unwrap();
/// let b = StyleRule::new(Some("title"), &json!({"color": "red"}), options, &mut names).unwrap();
/// assert_ne!(a.class_name(), b.class_name());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultClassNames {
    counter: u64,
}

impl DefaultClassNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names generated so far.
    pub fn generated(&self) -> u64 {
        self.counter
    }
}

impl GenerateClassName for DefaultClassNames {
    fn generate(&mut self, style: &str, rule: &StyleRule) -> String {
        self.counter += 1;
        let prefix = rule
            .name()
            .map(sanitize_identifier)
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| "rule".to_string());
        format!("{}-{}-{}", prefix, to_base36(fnv1a(style)), self.counter)
    }
}

/// Reduces arbitrary text to `[A-Za-z0-9_-]`, transliterating non-ASCII
/// letters first and prefixing `_` when the result would start with a digit.
///
/// ```rust
/// use stylekit::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Überschrift groß"), "Uberschrift-gross");
/// assert_eq!(sanitize_identifier("1st"), "_1st");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = deunicode(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn fnv1a(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
