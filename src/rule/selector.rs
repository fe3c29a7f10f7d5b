//! Selector changes as an explicit state machine.
//!
//! A rule is in exactly one [`RuleState`]. Renaming it runs through these
//! transitions, with the sheet index always updated under the new key:
//!
//! | State      | Renderer reply | Effect                                   | Result          |
//! |------------|----------------|------------------------------------------|-----------------|
//! | `Detached` | -              | selector text only                       | `Renamed`       |
//! | `Indexed`  | -              | unregister, rename, register             | `Reindexed`     |
//! | `Rendered` | changed        | unregister, rename in place, register    | `UpdatedInPlace`|
//! | `Rendered` | unchanged      | drop handle, register, deploy, link      | `Redeployed`    |
//!
//! The last row exists because some render targets cannot change a rule's
//! selector once it is created; only a full rebuild removes the stale rule.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::render::RenderHandle;

static CLASS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([\w-]+)").expect("class token pattern is valid"));

/// Where a rule currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// Not owned by any sheet.
    Detached,
    /// Owned and indexed by a sheet, without a live render binding.
    Indexed,
    /// Owned, indexed and bound to a live render target.
    Rendered,
}

/// Outcome of a selector change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorChange {
    /// The rule had no owner; only its text changed.
    Renamed,
    /// The owning sheet's index was updated.
    Reindexed,
    /// The renderer renamed the live rule in place.
    UpdatedInPlace,
    /// The renderer could not rename in place; the whole sheet was redeployed
    /// and relinked.
    Redeployed,
}

/// First step of a selector change, decided before the renderer is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorStep {
    Rename,
    Reindex,
    Render(RenderHandle),
}

impl RuleState {
    pub(crate) fn of(owned: bool, handle: Option<RenderHandle>) -> Self {
        match (owned, handle) {
            (true, Some(_)) => RuleState::Rendered,
            (true, None) => RuleState::Indexed,
            (false, _) => RuleState::Detached,
        }
    }

    pub(crate) fn selector_step(self, handle: Option<RenderHandle>) -> SelectorStep {
        match (self, handle) {
            (RuleState::Rendered, Some(handle)) => SelectorStep::Render(handle),
            (RuleState::Detached, _) => SelectorStep::Rename,
            _ => SelectorStep::Reindex,
        }
    }
}

impl SelectorChange {
    pub(crate) fn from_renderer(changed: bool) -> Self {
        if changed {
            SelectorChange::UpdatedInPlace
        } else {
            SelectorChange::Redeployed
        }
    }
}

/// Extracts class names from a selector, space separated.
///
/// ```rust
/// use stylekit::find_class_names;
///
/// assert_eq!(find_class_names(".btn.primary:hover"), "btn primary");
/// assert_eq!(find_class_names("div > a"), "");
/// ```
pub fn find_class_names(selector: &str) -> String {
    CLASS_TOKEN
        .captures_iter(selector)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
