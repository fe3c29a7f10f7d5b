//! Headless render target.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, trace};

use super::{RenderHandle, Renderer};
use crate::error::RenderError;
use crate::rule::StyleRule;
use crate::sheet::{SheetId, StyleSheet};
use crate::style::{StyleMap, StyleValue};

/// A render target kept entirely in memory.
///
/// Each sheet gets a target holding the last deployed CSS text and the live
/// rules created by linking, in creation order. Inline elements for
/// [`StyleRule::apply_to`] are created with
/// [`MemoryRenderer::create_element`]. Property reads are counted so callers
/// can observe caching.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use stylekit::{Declarations, MemoryRenderer, SheetOptions, StyleEngine};
///
/// let renderer = Rc::new(MemoryRenderer::new());
/// let mut engine = StyleEngine::new().with_renderer(renderer.clone());
///
/// let declarations = Declarations::from_yaml("title:\n  color: red\n").unwrap();
/// let id = engine
///     .create_style_sheet(&declarations, SheetOptions::new().link(true))
///     .unwrap();
/// engine.sheet_mut(id).unwrap().attach().unwrap();
///
/// assert_eq!(renderer.rendered_selectors(id).len(), 1);
/// assert!(renderer.css(id).unwrap().contains("color: red;"));
/// ```
#[derive(Debug)]
pub struct MemoryRenderer {
    state: RefCell<MemoryState>,
    selector_updates: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_handle: u64,
    targets: HashMap<SheetId, Target>,
    bindings: HashMap<RenderHandle, Binding>,
    elements: HashMap<RenderHandle, StyleMap>,
    property_reads: usize,
}

#[derive(Debug, Default)]
struct Target {
    attached: bool,
    media: Option<String>,
    meta: Option<String>,
    css: String,
    deploys: usize,
    live: Vec<RenderHandle>,
}

#[derive(Debug)]
struct Binding {
    target: SheetId,
    selector: String,
    properties: StyleMap,
}

impl MemoryRenderer {
    /// Creates a target that supports renaming live rules in place.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MemoryState::default()),
            selector_updates: true,
        }
    }

    /// Creates a target that refuses in-place renames, forcing sheets to
    /// redeploy when a bound rule's selector changes.
    pub fn without_selector_updates() -> Self {
        Self {
            selector_updates: false,
            ..Self::new()
        }
    }

    /// Creates an element that rules can be applied to inline.
    pub fn create_element(&self) -> RenderHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.elements.insert(handle, StyleMap::new());
        handle
    }

    /// Inline style of an element created by [`MemoryRenderer::create_element`].
    pub fn element_style(&self, element: RenderHandle) -> Option<StyleMap> {
        self.state.borrow().elements.get(&element).cloned()
    }

    /// The CSS text last deployed for a sheet.
    pub fn css(&self, sheet: SheetId) -> Option<String> {
        self.state
            .borrow()
            .targets
            .get(&sheet)
            .map(|target| target.css.clone())
    }

    /// Selectors of the sheet's live rules, in creation order.
    pub fn rendered_selectors(&self, sheet: SheetId) -> Vec<String> {
        let state = self.state.borrow();
        state
            .targets
            .get(&sheet)
            .map(|target| {
                target
                    .live
                    .iter()
                    .filter_map(|handle| state.bindings.get(handle))
                    .map(|binding| binding.selector.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A property of a live rule, without counting as a read.
    pub fn live_property(&self, handle: RenderHandle, name: &str) -> Option<StyleValue> {
        self.state
            .borrow()
            .bindings
            .get(&handle)
            .and_then(|binding| binding.properties.get(name).cloned())
    }

    /// Changes a live rule behind the model's back.
    pub fn set_live_property(
        &self,
        handle: RenderHandle,
        name: &str,
        value: impl Into<StyleValue>,
    ) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        let binding = state
            .bindings
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        binding.properties.insert(name, value);
        Ok(())
    }

    pub fn is_attached(&self, sheet: SheetId) -> bool {
        self.state
            .borrow()
            .targets
            .get(&sheet)
            .is_some_and(|target| target.attached)
    }

    pub fn media(&self, sheet: SheetId) -> Option<String> {
        self.state
            .borrow()
            .targets
            .get(&sheet)
            .and_then(|target| target.media.clone())
    }

    /// The label the sheet was attached with.
    pub fn meta(&self, sheet: SheetId) -> Option<String> {
        self.state
            .borrow()
            .targets
            .get(&sheet)
            .and_then(|target| target.meta.clone())
    }

    /// Number of times the sheet's content was replaced.
    pub fn deploy_count(&self, sheet: SheetId) -> usize {
        self.state
            .borrow()
            .targets
            .get(&sheet)
            .map_or(0, |target| target.deploys)
    }

    /// Number of [`Renderer::get_style_property`] calls served so far.
    pub fn property_reads(&self) -> usize {
        self.state.borrow().property_reads
    }
}

impl Default for MemoryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn allocate(&mut self) -> RenderHandle {
        self.next_handle += 1;
        RenderHandle::new(self.next_handle)
    }

    fn drop_live(&mut self, sheet: SheetId) {
        if let Some(target) = self.targets.get_mut(&sheet) {
            for handle in target.live.drain(..) {
                self.bindings.remove(&handle);
            }
        }
    }
}

impl Renderer for MemoryRenderer {
    fn create_handle(&self, rule: &StyleRule) -> Result<RenderHandle, RenderError> {
        let sheet = rule.owner().ok_or(RenderError::NoTarget(rule.id()))?;
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.bindings.insert(
            handle,
            Binding {
                target: sheet,
                selector: rule.selector().to_string(),
                properties: rule.flat_style(),
            },
        );
        state.targets.entry(sheet).or_default().live.push(handle);
        trace!("bound {} as {} in {}", rule.id(), handle, sheet);
        Ok(handle)
    }

    fn set_selector(&self, handle: RenderHandle, selector: &str) -> Result<bool, RenderError> {
        let mut state = self.state.borrow_mut();
        let binding = state
            .bindings
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        if !self.selector_updates {
            return Ok(false);
        }
        binding.selector = selector.to_string();
        Ok(true)
    }

    fn get_selector(&self, handle: RenderHandle) -> Result<String, RenderError> {
        self.state
            .borrow()
            .bindings
            .get(&handle)
            .map(|binding| binding.selector.clone())
            .ok_or(RenderError::UnknownHandle(handle))
    }

    fn get_style_property(
        &self,
        handle: RenderHandle,
        name: &str,
    ) -> Result<Option<StyleValue>, RenderError> {
        let mut state = self.state.borrow_mut();
        state.property_reads += 1;
        if let Some(binding) = state.bindings.get(&handle) {
            return Ok(binding.properties.get(name).cloned());
        }
        state
            .elements
            .get(&handle)
            .map(|style| style.get(name).cloned())
            .ok_or(RenderError::UnknownHandle(handle))
    }

    fn set_style_property(
        &self,
        handle: RenderHandle,
        name: &str,
        value: &StyleValue,
    ) -> Result<(), RenderError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let style = match state.bindings.get_mut(&handle) {
            Some(binding) => &mut binding.properties,
            None => state
                .elements
                .get_mut(&handle)
                .ok_or(RenderError::UnknownHandle(handle))?,
        };
        style.insert(name, value.clone());
        Ok(())
    }

    fn attach_sheet(&self, sheet: &StyleSheet) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        let target = state.targets.entry(sheet.id()).or_default();
        target.attached = true;
        target.media = sheet.options().media.clone();
        target.meta = sheet.options().meta.clone();
        debug!("attached {}", sheet.id());
        Ok(())
    }

    fn detach_sheet(&self, sheet: &StyleSheet) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        let target = state
            .targets
            .get_mut(&sheet.id())
            .ok_or(RenderError::UnknownTarget(sheet.id()))?;
        target.attached = false;
        state.drop_live(sheet.id());
        debug!("detached {}", sheet.id());
        Ok(())
    }

    fn deploy(&self, sheet: &StyleSheet, css: &str) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        let target = state.targets.entry(sheet.id()).or_default();
        target.css = css.to_string();
        target.deploys += 1;
        state.drop_live(sheet.id());
        Ok(())
    }
}
