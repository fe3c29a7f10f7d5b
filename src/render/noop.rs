//! A renderer that renders nothing.

use std::cell::Cell;

use super::{RenderHandle, Renderer};
use crate::error::RenderError;
use crate::rule::StyleRule;
use crate::sheet::StyleSheet;
use crate::style::StyleValue;

/// Accepts every call and keeps no state.
///
/// Useful where the model and its CSS text are wanted without any target,
/// e.g. server-side rendering through [`SheetRegistry::to_css`](crate::SheetRegistry::to_css).
/// In-place renames are reported as unsupported, and live reads find nothing.
///
/// Renaming a rule of a linked sheet therefore always costs a full redeploy
/// and relink. Both are free here, but plugins and callers see
/// [`SelectorChange::Redeployed`](crate::SelectorChange::Redeployed) and a
/// fresh handle every time. Use [`MemoryRenderer`](crate::MemoryRenderer)
/// where in-place renames matter.
#[derive(Debug, Default)]
pub struct NoopRenderer {
    next_handle: Cell<u64>,
}

impl NoopRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for NoopRenderer {
    fn create_handle(&self, _rule: &StyleRule) -> Result<RenderHandle, RenderError> {
        let next = self.next_handle.get() + 1;
        self.next_handle.set(next);
        Ok(RenderHandle::new(next))
    }

    fn set_selector(&self, _handle: RenderHandle, _selector: &str) -> Result<bool, RenderError> {
        Ok(false)
    }

    fn get_selector(&self, _handle: RenderHandle) -> Result<String, RenderError> {
        Ok(String::new())
    }

    fn get_style_property(
        &self,
        _handle: RenderHandle,
        _name: &str,
    ) -> Result<Option<StyleValue>, RenderError> {
        Ok(None)
    }

    fn set_style_property(
        &self,
        _handle: RenderHandle,
        _name: &str,
        _value: &StyleValue,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    fn attach_sheet(&self, _sheet: &StyleSheet) -> Result<(), RenderError> {
        Ok(())
    }

    fn detach_sheet(&self, _sheet: &StyleSheet) -> Result<(), RenderError> {
        Ok(())
    }

    fn deploy(&self, _sheet: &StyleSheet, _css: &str) -> Result<(), RenderError> {
        Ok(())
    }
}
