//! Style sheets: ordered rule containers bound to one render target.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};
use serde::Serialize;

use crate::engine::RuleFactory;
use crate::error::{Error, Result};
use crate::render::{RenderHandle, Renderer};
use crate::rule::{RuleId, RuleOptions, SelectorChange, SelectorStep, StyleRule};
use crate::style::{CssOptions, StyleValue};

/// Identity of a sheet; also keys the sheet's render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(u64);

impl SheetId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SheetId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet#{}", self.0)
    }
}

/// Sheet configuration.
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Default for rules added without an explicit `named` option.
    pub named: bool,
    /// Link rules to the target when the sheet is attached.
    pub link: bool,
    /// Media query handed to the render target.
    pub media: Option<String>,
    /// Free-form label, useful when inspecting targets.
    pub meta: Option<String>,
    pub renderer: Option<Rc<dyn Renderer>>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            named: true,
            link: false,
            media: None,
            meta: None,
            renderer: None,
        }
    }
}

impl SheetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, named: bool) -> Self {
        self.named = named;
        self
    }

    pub fn link(mut self, link: bool) -> Self {
        self.link = link;
        self
    }

    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    pub fn renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

/// An ordered collection of rules sharing one render target.
///
/// Rule order is cascade order and never changes except by explicit
/// insertion or removal. Besides the ordered rules the sheet keeps lookup
/// indexes by selector and by name, and the class name of every named rule.
///
/// Lifecycle flags:
///
/// - `attached`: the target exists in the document
/// - `deployed`: the target holds the sheet's full CSS text
/// - `linked`: every rule holds a live [`RenderHandle`]
#[derive(Debug)]
pub struct StyleSheet {
    id: SheetId,
    options: SheetOptions,
    rules: Vec<StyleRule>,
    index: HashMap<String, RuleId>,
    names: HashMap<String, RuleId>,
    classes: HashMap<String, String>,
    attached: bool,
    deployed: bool,
    linked: bool,
}

impl StyleSheet {
    /// Creates an empty, detached sheet.
    pub fn new(options: SheetOptions) -> Self {
        Self {
            id: SheetId::next(),
            options,
            rules: Vec::new(),
            index: HashMap::new(),
            names: HashMap::new(),
            classes: HashMap::new(),
            attached: false,
            deployed: false,
            linked: false,
        }
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn renderer(&self) -> Option<&Rc<dyn Renderer>> {
        self.options.renderer.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in cascade order.
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> Option<&StyleRule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    /// Looks a rule up by name first, then by selector.
    pub fn get_rule(&self, key: &str) -> Option<&StyleRule> {
        self.names
            .get(key)
            .or_else(|| self.index.get(key))
            .and_then(|id| self.rule(*id))
    }

    /// Class names of named rules, keyed by rule name.
    pub fn classes(&self) -> &HashMap<String, String> {
        &self.classes
    }

    pub fn class_name(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    /// Builds a rule through `factory` and appends it.
    ///
    /// `options.named` defaults to the sheet's setting. The sheet's renderer,
    /// when set, replaces any renderer in `options`.
    ///
    /// # Errors
    ///
    /// Construction and plugin errors, or render errors while bringing the
    /// new rule live.
    pub fn add_rule<S>(
        &mut self,
        factory: &mut RuleFactory,
        key: &str,
        style: &S,
        options: RuleOptions,
    ) -> Result<RuleId>
    where
        S: Serialize + ?Sized,
    {
        let options = self.rule_options(options);
        let rule = factory.create_rule(Some(key), style, options)?;
        self.insert_rule(rule)
    }

    /// Appends an already-built, detached rule.
    ///
    /// The rule switches to the sheet's renderer, since that renderer creates
    /// its handles. When the sheet is linked the rule is linked right away;
    /// when it is only deployed the sheet is redeployed so the target stays
    /// complete.
    pub fn insert_rule(&mut self, mut rule: StyleRule) -> Result<RuleId> {
        let id = rule.id();
        rule.set_owner(Some(self.id));
        rule.set_handle(None);
        rule.adopt_renderer(self.options.renderer.as_ref());
        self.rules.push(rule);
        self.register_rule(id)?;

        if self.linked {
            let renderer = self.require_renderer("insert_rule")?;
            let pos = self.position(id)?;
            let handle = renderer.create_handle(&self.rules[pos])?;
            self.rules[pos].set_handle(Some(handle));
        } else if self.deployed {
            self.deploy()?;
        }
        Ok(id)
    }

    /// Removes a rule, keeping the order of the rest.
    ///
    /// A deployed or linked sheet is redeployed (and relinked if it was
    /// linked) so the removed rule disappears from the target.
    pub fn remove_rule(&mut self, id: RuleId) -> Result<StyleRule> {
        self.unregister_rule(id)?;
        let pos = self.position(id)?;
        let mut rule = self.rules.remove(pos);
        rule.set_owner(None);
        rule.set_handle(None);

        if self.deployed || self.linked {
            let relink = self.linked;
            self.deploy()?;
            if relink {
                self.link()?;
            }
        }
        Ok(rule)
    }

    /// Makes a rule reachable by its name and current selector.
    ///
    /// Returns the sheet so calls chain: `register_rule(id)?.deploy()?.link()`.
    pub fn register_rule(&mut self, id: RuleId) -> Result<&mut Self> {
        let pos = self.position(id)?;
        let rule = &self.rules[pos];
        if let Some(name) = rule.name() {
            self.names.insert(name.to_string(), id);
            self.classes
                .insert(name.to_string(), rule.class_name().to_string());
        }
        let selector = rule.selector();
        if !selector.is_empty() {
            if let Some(previous) = self.index.insert(selector.to_string(), id) {
                if previous != id {
                    warn!(
                        "{}: selector `{}` of {} now points to {}",
                        self.id, selector, previous, id
                    );
                }
            }
        }
        trace!("{}: registered {} as `{}`", self.id, id, selector);
        Ok(self)
    }

    /// Drops a rule from the lookup indexes. Membership and order are kept.
    pub fn unregister_rule(&mut self, id: RuleId) -> Result<&mut Self> {
        let pos = self.position(id)?;
        let rule = &self.rules[pos];
        if let Some(name) = rule.name() {
            if self.names.get(name) == Some(&id) {
                self.names.remove(name);
                self.classes.remove(name);
            }
        }
        if self.index.get(rule.selector()) == Some(&id) {
            self.index.remove(rule.selector());
        }
        trace!("{}: unregistered {}", self.id, id);
        Ok(self)
    }

    /// Changes a rule's selector, keeping index and target in sync.
    ///
    /// See [`RuleState`](crate::RuleState) for the transitions. When the
    /// renderer cannot rename a live rule, the whole sheet is redeployed and
    /// relinked.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] or a render error. The rule is re-registered
    /// under its new selector before a render error is returned.
    pub fn set_selector(&mut self, id: RuleId, selector: &str) -> Result<SelectorChange> {
        let pos = self.position(id)?;
        let step = self.rules[pos]
            .state()
            .selector_step(self.rules[pos].handle());

        self.unregister_rule(id)?;
        self.rules[pos].apply_selector_text(selector);

        let handle = match step {
            SelectorStep::Render(handle) => handle,
            SelectorStep::Rename | SelectorStep::Reindex => {
                self.register_rule(id)?;
                return Ok(SelectorChange::Reindexed);
            }
        };

        let changed = match self
            .require_renderer("set_selector")
            .and_then(|renderer| renderer.set_selector(handle, selector).map_err(Error::from))
        {
            Ok(changed) => changed,
            Err(err) => {
                self.register_rule(id)?;
                return Err(err);
            }
        };

        let outcome = SelectorChange::from_renderer(changed);
        if changed {
            self.register_rule(id)?;
        } else {
            debug!(
                "{}: renderer kept the old selector of {}, redeploying",
                self.id, id
            );
            self.rules[pos].set_handle(None);
            self.register_rule(id)?.deploy()?.link()?;
        }
        Ok(outcome)
    }

    /// Reads a property of a rule; see [`StyleRule::prop`].
    pub fn prop(&mut self, id: RuleId, name: &str) -> Result<Option<StyleValue>> {
        let pos = self.position(id)?;
        self.rules[pos].prop(name)
    }

    /// Writes a property of a rule; see [`StyleRule::set_prop`].
    pub fn set_prop(
        &mut self,
        id: RuleId,
        name: &str,
        value: impl Into<StyleValue>,
    ) -> Result<&mut Self> {
        let pos = self.position(id)?;
        self.rules[pos].set_prop(name, value)?;
        Ok(self)
    }

    /// Applies a rule inline to an element; see [`StyleRule::apply_to`].
    pub fn apply_to(&self, id: RuleId, element: RenderHandle) -> Result<&Self> {
        let pos = self.position(id)?;
        self.rules[pos].apply_to(element)?;
        Ok(self)
    }

    /// Binds every unbound rule to the render target.
    ///
    /// Rules that already hold a handle are left alone.
    pub fn link(&mut self) -> Result<&mut Self> {
        let renderer = self.require_renderer("link")?;
        let mut created = 0;
        for rule in self.rules.iter_mut().filter(|rule| !rule.is_rendered()) {
            let handle = renderer.create_handle(rule)?;
            rule.set_handle(Some(handle));
            created += 1;
        }
        self.linked = true;
        debug!("{}: linked {} rule(s)", self.id, created);
        Ok(self)
    }

    /// Submits the full CSS text of the sheet to the target.
    ///
    /// The rebuilt target invalidates every binding, so all handles are
    /// dropped and the sheet is no longer linked.
    pub fn deploy(&mut self) -> Result<&mut Self> {
        let renderer = self.require_renderer("deploy")?;
        let css = self.to_css(&CssOptions::default());
        renderer.deploy(self, &css)?;
        for rule in &mut self.rules {
            rule.set_handle(None);
        }
        self.linked = false;
        self.deployed = true;
        debug!("{}: deployed {} rule(s)", self.id, self.rules.len());
        Ok(self)
    }

    /// Attaches the target, deploying first if needed and linking when
    /// [`SheetOptions::link`] is set. A no-op on an attached sheet.
    pub fn attach(&mut self) -> Result<&mut Self> {
        if self.attached {
            return Ok(self);
        }
        let renderer = self.require_renderer("attach")?;
        renderer.attach_sheet(self)?;
        self.attached = true;
        if !self.deployed {
            self.deploy()?;
        }
        if self.options.link {
            self.link()?;
        }
        Ok(self)
    }

    /// Removes the target from the document and drops every binding.
    pub fn detach(&mut self) -> Result<&mut Self> {
        if !self.attached {
            return Ok(self);
        }
        let renderer = self.require_renderer("detach")?;
        renderer.detach_sheet(self)?;
        for rule in &mut self.rules {
            rule.set_handle(None);
        }
        self.linked = false;
        self.attached = false;
        Ok(self)
    }

    /// All rules as CSS text, separated by newlines.
    pub fn to_css(&self, options: &CssOptions) -> String {
        self.rules
            .iter()
            .map(|rule| rule.to_css(options))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn rule_options(&self, mut options: RuleOptions) -> RuleOptions {
        options.named.get_or_insert(self.options.named);
        if let Some(renderer) = &self.options.renderer {
            options.renderer = Some(Rc::clone(renderer));
        }
        options
    }

    fn position(&self, id: RuleId) -> Result<usize> {
        self.rules
            .iter()
            .position(|rule| rule.id() == id)
            .ok_or(Error::UnknownRule(id))
    }

    fn require_renderer(&self, operation: &'static str) -> Result<Rc<dyn Renderer>> {
        self.options
            .renderer
            .clone()
            .ok_or(Error::RendererUnavailable { operation })
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(&CssOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemoryRenderer;
    use crate::rule::RuleState;
    use serde_json::json;

    fn sheet_with(renderer: &Rc<MemoryRenderer>) -> (StyleSheet, RuleFactory) {
        let options = SheetOptions::new().renderer(renderer.clone());
        (StyleSheet::new(options), RuleFactory::new())
    }

    #[test]
    fn test_add_rule_named_by_default() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, "button", &json!({"color": "red"}), RuleOptions::new())
            .unwrap();

        let rule = sheet.rule(id).unwrap();
        assert_eq!(rule.name(), Some("button"));
        assert_eq!(rule.owner(), Some(sheet.id()));
        assert_eq!(rule.state(), RuleState::Indexed);
        assert_eq!(sheet.class_name("button"), Some(rule.class_name()));
        assert_eq!(sheet.get_rule("button").unwrap().id(), id);
        assert_eq!(sheet.get_rule(rule.selector()).unwrap().id(), id);
    }

    #[test]
    fn test_add_rule_unnamed() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(
                &mut factory,
                "a:hover",
                &json!({"color": "red"}),
                RuleOptions::new().named(false),
            )
            .unwrap();
        assert_eq!(sheet.get_rule("a:hover").unwrap().id(), id);
        assert!(sheet.classes().is_empty());
    }

    #[test]
    fn test_rules_keep_insertion_order() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        for selector in ["c", "a", "b"] {
            sheet
                .add_rule(&mut factory, selector, &json!({}), RuleOptions::new().named(false))
                .unwrap();
        }
        let selectors: Vec<&str> = sheet.rules().iter().map(StyleRule::selector).collect();
        assert_eq!(selectors, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unregister_keeps_membership() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, "a", &json!({}), RuleOptions::new().named(false))
            .unwrap();
        sheet.unregister_rule(id).unwrap();
        assert!(sheet.get_rule("a").is_none());
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn test_link_is_idempotent() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        sheet
            .add_rule(&mut factory, "a", &json!({}), RuleOptions::new().named(false))
            .unwrap();
        sheet.link().unwrap();
        let handle = sheet.rules()[0].handle();
        sheet.link().unwrap();
        assert_eq!(sheet.rules()[0].handle(), handle);
        assert_eq!(renderer.rendered_selectors(sheet.id()), vec!["a".to_string()]);
    }

    #[test]
    fn test_deploy_drops_handles() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        sheet
            .add_rule(&mut factory, "a", &json!({"color": "red"}), RuleOptions::new().named(false))
            .unwrap();
        sheet.link().unwrap();
        sheet.deploy().unwrap();
        assert!(!sheet.is_linked());
        assert!(sheet.rules().iter().all(|rule| !rule.is_rendered()));
        assert_eq!(renderer.css(sheet.id()).unwrap(), "a {\n  color: red;\n}");
    }

    #[test]
    fn test_set_selector_indexed() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, ".old", &json!({}), RuleOptions::new().named(false))
            .unwrap();

        let change = sheet.set_selector(id, ".new").unwrap();

        assert_eq!(change, SelectorChange::Reindexed);
        assert!(sheet.get_rule(".old").is_none());
        assert_eq!(sheet.get_rule(".new").unwrap().id(), id);
        assert_eq!(sheet.rule(id).unwrap().class_name(), "new");
    }

    #[test]
    fn test_set_selector_in_place() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, ".old", &json!({}), RuleOptions::new().named(false))
            .unwrap();
        sheet.link().unwrap();
        let handle = sheet.rule(id).unwrap().handle();

        let change = sheet.set_selector(id, ".new").unwrap();

        assert_eq!(change, SelectorChange::UpdatedInPlace);
        assert_eq!(sheet.rule(id).unwrap().handle(), handle);
        assert_eq!(sheet.rule(id).unwrap().rendered_selector().unwrap(), ".new");
        assert_eq!(renderer.deploy_count(sheet.id()), 0);
    }

    #[test]
    fn test_set_selector_forces_redeploy() {
        let renderer = Rc::new(MemoryRenderer::without_selector_updates());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, ".old", &json!({"color": "red"}), RuleOptions::new().named(false))
            .unwrap();
        sheet.link().unwrap();

        let change = sheet.set_selector(id, ".new").unwrap();

        assert_eq!(change, SelectorChange::Redeployed);
        assert!(sheet.is_linked());
        assert!(sheet.rule(id).unwrap().is_rendered());
        assert_eq!(renderer.rendered_selectors(sheet.id()), vec![".new".to_string()]);
        assert_eq!(renderer.css(sheet.id()).unwrap(), ".new {\n  color: red;\n}");
    }

    #[test]
    fn test_unknown_rule() {
        let renderer = Rc::new(MemoryRenderer::new());
        let (mut sheet, mut factory) = sheet_with(&renderer);
        let id = sheet
            .add_rule(&mut factory, "a", &json!({}), RuleOptions::new().named(false))
            .unwrap();
        sheet.remove_rule(id).unwrap();
        assert!(matches!(
            sheet.set_selector(id, "b"),
            Err(Error::UnknownRule(missing)) if missing == id
        ));
    }

    #[test]
    fn test_link_without_renderer() {
        let mut sheet = StyleSheet::new(SheetOptions::new());
        assert!(matches!(
            sheet.link(),
            Err(Error::RendererUnavailable { operation: "link" })
        ));
    }
}
