//! The style engine: one place that owns the rule factory, the registry and
//! the default renderer.

use std::fmt;
use std::rc::Rc;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::naming::{DefaultClassNames, GenerateClassName};
use crate::plugin::PluginPipeline;
use crate::render::Renderer;
use crate::rule::{RuleId, RuleOptions, StyleRule};
use crate::sheet::{Declarations, SheetId, SheetOptions, SheetRegistry, StyleSheet};

/// The shared constructor path for rules.
///
/// Every rule built here gets its class name from the factory's generator
/// and then runs through the plugin pipeline, before any sheet owns it.
pub struct RuleFactory {
    generator: Box<dyn GenerateClassName>,
    plugins: PluginPipeline,
}

impl RuleFactory {
    /// A factory with [`DefaultClassNames`] and no plugins.
    pub fn new() -> Self {
        Self {
            generator: Box::new(DefaultClassNames::new()),
            plugins: PluginPipeline::new(),
        }
    }

    pub fn set_generator(&mut self, generator: Box<dyn GenerateClassName>) -> &mut Self {
        self.generator = generator;
        self
    }

    pub fn plugins(&self) -> &PluginPipeline {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginPipeline {
        &mut self.plugins
    }

    /// Builds a detached rule and runs the plugins on it.
    ///
    /// # Errors
    ///
    /// [`Error::Clone`] for unrepresentable styles, [`Error::Plugin`] when a
    /// plugin fails.
    pub fn create_rule<S>(
        &mut self,
        selector: Option<&str>,
        style: &S,
        options: RuleOptions,
    ) -> Result<StyleRule>
    where
        S: Serialize + ?Sized,
    {
        let mut rule = StyleRule::new(selector, style, options, self.generator.as_mut())?;
        self.plugins.run(&mut rule)?;
        Ok(rule)
    }
}

impl Default for RuleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleFactory")
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

/// Entry point for building rules and sheets.
///
/// Owns the [`SheetRegistry`] of every sheet it created, the plugin
/// pipeline and class-name generator shared by all its rules, and an
/// optional default renderer handed to sheets and rules that do not bring
/// their own.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use stylekit::{Declarations, SheetOptions, StyleEngine, StyleRule};
///
/// let mut engine = StyleEngine::new();
/// engine.use_plugin(|rule: &mut StyleRule| {
///     if rule.style().contains("display") {
///         rule.set_prop("box-sizing", "border-box")?;
///     }
///     Ok(())
/// });
///
/// let declarations = Declarations::new()
///     .with("card", &json!({"display": "flex"}))
///     .unwrap();
/// let id = engine
///     .create_style_sheet(&declarations, SheetOptions::new())
///     .unwrap();
///
/// let sheet = engine.sheet(id).unwrap();
/// let class = sheet.class_name("card").unwrap();
/// assert_eq!(
///     sheet.get_rule("card").unwrap().to_string(),
///     format!(".{} {{\n  display: flex;\n  box-sizing: border-box;\n}}", class)
/// );
/// ```
#[derive(Debug, Default)]
pub struct StyleEngine {
    factory: RuleFactory,
    sheets: SheetRegistry,
    renderer: Option<Rc<dyn Renderer>>,
}

impl StyleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default renderer.
    pub fn with_renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replaces the class-name generator.
    pub fn with_class_name_generator<G>(mut self, generator: G) -> Self
    where
        G: GenerateClassName + 'static,
    {
        self.factory.set_generator(Box::new(generator));
        self
    }

    /// Replaces the class-name generator with a closure.
    pub fn with_class_name_fn<F>(self, generator: F) -> Self
    where
        F: FnMut(&str, &StyleRule) -> String + 'static,
    {
        self.with_class_name_generator(generator)
    }

    /// Registers a plugin. Plugins run in registration order.
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: Fn(&mut StyleRule) -> anyhow::Result<()> + 'static,
    {
        self.factory.plugins_mut().register(plugin);
        self
    }

    pub fn renderer(&self) -> Option<&Rc<dyn Renderer>> {
        self.renderer.as_ref()
    }

    pub fn factory_mut(&mut self) -> &mut RuleFactory {
        &mut self.factory
    }

    /// Builds a standalone rule through the shared constructor path.
    pub fn create_rule<S>(
        &mut self,
        selector: Option<&str>,
        style: &S,
        mut options: RuleOptions,
    ) -> Result<StyleRule>
    where
        S: Serialize + ?Sized,
    {
        if options.renderer.is_none() {
            options.renderer = self.renderer.clone();
        }
        self.factory.create_rule(selector, style, options)
    }

    /// Builds a sheet with one rule per declaration and registers it.
    ///
    /// Nothing is registered if any rule fails to build.
    pub fn create_style_sheet(
        &mut self,
        declarations: &Declarations,
        mut options: SheetOptions,
    ) -> Result<SheetId> {
        if options.renderer.is_none() {
            options.renderer = self.renderer.clone();
        }
        let mut sheet = StyleSheet::new(options);
        for (name, style) in declarations.iter() {
            sheet.add_rule(&mut self.factory, name, style, RuleOptions::new())?;
        }
        debug!("{}: created with {} rule(s)", sheet.id(), sheet.len());
        Ok(self.sheets.add(sheet))
    }

    /// Adds a rule to a registered sheet.
    pub fn add_rule<S>(
        &mut self,
        sheet: SheetId,
        key: &str,
        style: &S,
        options: RuleOptions,
    ) -> Result<RuleId>
    where
        S: Serialize + ?Sized,
    {
        let target = self
            .sheets
            .get_mut(sheet)
            .ok_or(Error::UnknownSheet(sheet))?;
        target.add_rule(&mut self.factory, key, style, options)
    }

    /// Detaches a sheet and drops it from the registry.
    pub fn remove_style_sheet(&mut self, sheet: SheetId) -> Result<StyleSheet> {
        self.sheets
            .get_mut(sheet)
            .ok_or(Error::UnknownSheet(sheet))?
            .detach()?;
        self.sheets.remove(sheet).ok_or(Error::UnknownSheet(sheet))
    }

    pub fn sheet(&self, sheet: SheetId) -> Option<&StyleSheet> {
        self.sheets.get(sheet)
    }

    pub fn sheet_mut(&mut self, sheet: SheetId) -> Option<&mut StyleSheet> {
        self.sheets.get_mut(sheet)
    }

    pub fn sheets(&self) -> &SheetRegistry {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut SheetRegistry {
        &mut self.sheets
    }

    /// CSS text of every registered sheet.
    pub fn to_css(&self) -> String {
        self.sheets.to_css()
    }
}
