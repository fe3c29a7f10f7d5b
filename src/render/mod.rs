//! The rendering capability.
//!
//! The core never draws anything itself. It talks to a render target only
//! through the [`Renderer`] trait, so backends are interchangeable:
//!
//! - [`MemoryRenderer`]: a headless target that records deployed CSS text,
//!   live rule bindings and inline elements
//! - [`NoopRenderer`]: accepts everything and keeps nothing
//!
//! Renderers are shared as `Rc<dyn Renderer>` between a sheet and its rules
//! and use interior mutability; the whole model is single-threaded.

mod memory;
mod noop;

use std::fmt;

use crate::error::RenderError;
use crate::rule::StyleRule;
use crate::sheet::StyleSheet;
use crate::style::StyleValue;

pub use memory::MemoryRenderer;
pub use noop::NoopRenderer;

/// Opaque token for a live binding (a rendered rule or an inline element).
///
/// Only the backend that issued a handle knows what it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(u64);

impl RenderHandle {
    /// Wraps a backend-specific identifier.
    pub fn new(raw: u64) -> Self {
        RenderHandle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Operations a rendering backend provides to rules and sheets.
pub trait Renderer: fmt::Debug {
    /// Materializes a rule in its owning sheet's target.
    fn create_handle(&self, rule: &StyleRule) -> Result<RenderHandle, RenderError>;

    /// Renames a live rule in place.
    ///
    /// Returns `false` when the target cannot change a selector after
    /// creation; the caller then rebuilds the whole sheet.
    fn set_selector(&self, handle: RenderHandle, selector: &str) -> Result<bool, RenderError>;

    fn get_selector(&self, handle: RenderHandle) -> Result<String, RenderError>;

    /// Reads a property from the live target; `None` if it is not set.
    fn get_style_property(
        &self,
        handle: RenderHandle,
        name: &str,
    ) -> Result<Option<StyleValue>, RenderError>;

    fn set_style_property(
        &self,
        handle: RenderHandle,
        name: &str,
        value: &StyleValue,
    ) -> Result<(), RenderError>;

    fn attach_sheet(&self, sheet: &StyleSheet) -> Result<(), RenderError>;

    fn detach_sheet(&self, sheet: &StyleSheet) -> Result<(), RenderError>;

    /// Replaces the sheet's target content with `css`.
    ///
    /// Every binding previously created for the sheet becomes invalid.
    fn deploy(&self, sheet: &StyleSheet, css: &str) -> Result<(), RenderError>;
}
