//! Style rules and selector changes.
//!
//! - [`StyleRule`]: a selector with a deep-cloned style map
//! - [`RuleOptions`]: construction options (named rules, explicit class names, renderer)
//! - [`RuleState`] / [`SelectorChange`]: the selector-change state machine

#[allow(clippy::module_inception)]
mod rule;
mod selector;

pub use rule::{RuleId, RuleOptions, StyleRule};
pub(crate) use selector::SelectorStep;
pub use selector::{find_class_names, RuleState, SelectorChange};
