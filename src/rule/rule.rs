//! The style rule.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::trace;
use serde::Serialize;
use serde_json::{Map, Value};

use super::selector::{find_class_names, RuleState};
use crate::error::{Error, Result};
use crate::naming::GenerateClassName;
use crate::render::{RenderHandle, Renderer};
use crate::sheet::SheetId;
use crate::style::{to_css, CssOptions, StyleMap, StyleValue};

/// Stable identity of a rule, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RuleId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// Options controlling how a rule is constructed.
///
/// # Example
///
/// ```rust
/// use stylekit::RuleOptions;
///
/// let options = RuleOptions::new().named(true).class_name("button");
/// assert_eq!(options.named, Some(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    /// Treat the selector argument as a name and synthesize a class selector.
    ///
    /// `None` means "inherit": a sheet substitutes its own default, a
    /// standalone rule treats it as `false`.
    pub named: Option<bool>,
    /// Explicit class name; always wins over generation.
    pub class_name: Option<String>,
    /// Backend used for live reads/writes and inline application.
    pub renderer: Option<Rc<dyn Renderer>>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, named: bool) -> Self {
        self.named = Some(named);
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

/// A selector plus a deep-cloned style map.
///
/// A rule is either detached, owned by a [`StyleSheet`](crate::StyleSheet)
/// (indexed by its selector), or owned and bound to a live render target
/// through a [`RenderHandle`]. The handle is the only signal of the bound
/// state.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use stylekit::{CssOptions, DefaultClassNames, RuleOptions, StyleRule};
///
/// let mut names = DefaultClassNames::new();
/// let rule = StyleRule::new(
///     Some(".title"),
///     &json!({"font-weight": "bold", "margin": [0, "auto"]}),
///     RuleOptions::new(),
///     &mut names,
/// )
/// .unwrap();
///
/// assert_eq!(
///     rule.to_css(&CssOptions::new()),
///     ".title {\n  font-weight: bold;\n  margin: 0, auto;\n}"
/// );
/// ```
#[derive(Debug)]
pub struct StyleRule {
    id: RuleId,
    selector_text: String,
    style: StyleMap,
    source_style: String,
    class_name: String,
    name: Option<String>,
    handle: Option<RenderHandle>,
    owner: Option<SheetId>,
    renderer: Option<Rc<dyn Renderer>>,
    /// Properties already read from the current binding.
    probed: HashSet<String>,
}

impl StyleRule {
    /// Builds a rule, deep-cloning `style`.
    ///
    /// For named rules the selector is used as the rule's name and the
    /// selector becomes `.{class_name}`; the class name comes from
    /// `options.class_name` or, failing that, from `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clone`] if `style` cannot be represented.
    pub fn new<S>(
        selector: Option<&str>,
        style: &S,
        options: RuleOptions,
        generator: &mut dyn GenerateClassName,
    ) -> Result<Self>
    where
        S: Serialize + ?Sized,
    {
        let (style, source_style) = StyleMap::clone_from_serialize(style)?;
        let mut rule = StyleRule {
            id: RuleId::next(),
            selector_text: selector.unwrap_or_default().to_string(),
            style,
            source_style,
            class_name: options.class_name.unwrap_or_default(),
            name: None,
            handle: None,
            owner: None,
            renderer: options.renderer,
            probed: HashSet::new(),
        };

        if options.named.unwrap_or(false) {
            rule.name = selector.map(str::to_string);
            if rule.class_name.is_empty() {
                let generated = generator.generate(&rule.source_style, &rule);
                rule.class_name = generated;
            }
            rule.selector_text = format!(".{}", rule.class_name);
        }

        trace!("created {} with selector `{}`", rule.id, rule.selector_text);
        Ok(rule)
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The selector held by the model.
    pub fn selector(&self) -> &str {
        &self.selector_text
    }

    /// The selector as the render target reports it.
    ///
    /// Falls back to the model selector when the rule is not bound.
    pub fn rendered_selector(&self) -> Result<String> {
        match self.handle {
            Some(handle) => Ok(self.require_renderer("rendered_selector")?.get_selector(handle)?),
            None => Ok(self.selector_text.clone()),
        }
    }

    /// Changes the selector of a rule that no sheet owns.
    ///
    /// Rules inside a sheet are renamed through
    /// [`StyleSheet::set_selector`](crate::StyleSheet::set_selector), which
    /// keeps the sheet index and the render target in sync.
    pub fn set_selector(&mut self, selector: &str) -> &mut Self {
        self.apply_selector_text(selector);
        self
    }

    /// Space-separated class names, either generated, supplied, or parsed
    /// from the selector after a rename.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn style(&self) -> &StyleMap {
        &self.style
    }

    /// Canonical JSON of the style object the rule was created from.
    pub fn source_style(&self) -> &str {
        &self.source_style
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    pub fn owner(&self) -> Option<SheetId> {
        self.owner
    }

    pub fn is_rendered(&self) -> bool {
        self.handle.is_some()
    }

    pub fn state(&self) -> RuleState {
        RuleState::of(self.owner.is_some(), self.handle)
    }

    pub fn renderer(&self) -> Option<&Rc<dyn Renderer>> {
        self.renderer.as_ref()
    }

    /// Reads a property.
    ///
    /// When bound and the property is not in the model, the value is read
    /// once from the render target and cached. A property the target does
    /// not have is remembered as missing, so it is not read again until the
    /// rule is rebound. Later changes made directly on the target are not
    /// observed.
    ///
    /// # Errors
    ///
    /// [`Error::RendererUnavailable`] if a live read is needed without a
    /// renderer, or [`Error::Render`] if the backend fails.
    pub fn prop(&mut self, name: &str) -> Result<Option<StyleValue>> {
        if let Some(handle) = self.handle {
            if !self.style.contains(name) && self.probed.insert(name.to_string()) {
                let live = self
                    .require_renderer("prop")?
                    .get_style_property(handle, name)?;
                if let Some(value) = live {
                    trace!("{}: cached live `{}`", self.id, name);
                    self.style.insert(name, value);
                }
            }
        }
        Ok(self.style.get(name).cloned())
    }

    /// Writes a property, pushing it to the render target when bound.
    ///
    /// # Errors
    ///
    /// [`Error::Render`] if the backend rejects the update. The model keeps
    /// the new value either way.
    pub fn set_prop(&mut self, name: &str, value: impl Into<StyleValue>) -> Result<&mut Self> {
        let value = value.into();
        if let Some(handle) = self.handle {
            self.style.insert(name, value.clone());
            self.require_renderer("set_prop")?
                .set_style_property(handle, name, &value)?;
            trace!("{}: pushed `{}`", self.id, name);
        } else {
            self.style.insert(name, value);
        }
        Ok(self)
    }

    /// Applies the flat projection of the style to an arbitrary element.
    ///
    /// Independent of this rule's own binding.
    ///
    /// # Errors
    ///
    /// [`Error::RendererUnavailable`] without a renderer.
    pub fn apply_to(&self, element: RenderHandle) -> Result<&Self> {
        let renderer = self.require_renderer("apply_to")?;
        for (name, value) in self.flat_style().iter() {
            renderer.set_style_property(element, name, value)?;
        }
        Ok(self)
    }

    /// Scalar properties, with sequences joined into their CSS form.
    ///
    /// Nested maps (fallbacks) are dropped.
    pub fn flat_style(&self) -> StyleMap {
        self.style
            .iter()
            .filter_map(|(name, value)| match value {
                StyleValue::Str(_) | StyleValue::Number(_) => Some((name, value.clone())),
                StyleValue::List(_) => value
                    .to_css_value()
                    .map(|css| (name, StyleValue::Str(css))),
                StyleValue::Nested(_) => None,
            })
            .collect()
    }

    /// JSON form of [`StyleRule::flat_style`]. Fallbacks are not supported.
    pub fn to_json(&self) -> Map<String, Value> {
        self.flat_style()
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    StyleValue::Number(n) => Value::Number(n.clone()),
                    other => Value::String(other.to_css_value().unwrap_or_default()),
                };
                (name.to_string(), json)
            })
            .collect()
    }

    pub fn to_css(&self, options: &CssOptions) -> String {
        to_css(&self.selector_text, &self.style, options)
    }

    pub(crate) fn apply_selector_text(&mut self, selector: &str) {
        self.selector_text = selector.to_string();
        self.class_name = find_class_names(selector);
    }

    pub(crate) fn set_handle(&mut self, handle: Option<RenderHandle>) {
        if self.handle != handle {
            self.probed.clear();
        }
        self.handle = handle;
    }

    pub(crate) fn set_owner(&mut self, owner: Option<SheetId>) {
        self.owner = owner;
    }

    /// Switches to the owning sheet's renderer, which creates every handle
    /// this rule will hold. Keeps its own when the sheet has none.
    pub(crate) fn adopt_renderer(&mut self, renderer: Option<&Rc<dyn Renderer>>) {
        if let Some(renderer) = renderer {
            self.renderer = Some(Rc::clone(renderer));
        }
    }

    fn require_renderer(&self, operation: &'static str) -> Result<&Rc<dyn Renderer>> {
        self.renderer
            .as_ref()
            .ok_or(Error::RendererUnavailable { operation })
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(&CssOptions::default()))
    }
}
