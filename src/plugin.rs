//! Rule transform plugins.

use std::fmt;

use log::trace;

use crate::error::{Error, Result};
use crate::rule::StyleRule;

/// A transform applied to every rule right after construction.
pub type Plugin = Box<dyn Fn(&mut StyleRule) -> anyhow::Result<()>>;

/// Ordered list of plugins.
///
/// Plugins run in registration order, each seeing the changes made by the
/// ones before it. The first failure stops the pipeline; the rule stays as
/// the earlier plugins left it.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use stylekit::{DefaultClassNames, PluginPipeline, RuleOptions, StyleRule};
///
/// let mut plugins = PluginPipeline::new();
/// plugins.register(|rule: &mut StyleRule| {
///     rule.set_prop("box-sizing", "border-box")?;
///     Ok(())
/// });
///
/// let mut rule = StyleRule::new(Some(".a"), &json!({}), RuleOptions::new(), &mut DefaultClassNames::new()).unwrap();
/// plugins.run(&mut rule).unwrap();
/// assert!(rule.style().contains("box-sizing"));
/// ```
#[derive(Default)]
pub struct PluginPipeline {
    plugins: Vec<Plugin>,
}

impl PluginPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin.
    pub fn register<F>(&mut self, plugin: F) -> &mut Self
    where
        F: Fn(&mut StyleRule) -> anyhow::Result<()> + 'static,
    {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Runs every plugin against `rule`, in order.
    ///
    /// # Errors
    ///
    /// [`Error::Plugin`] carrying the failing plugin's position and error.
    pub fn run(&self, rule: &mut StyleRule) -> Result<()> {
        for (index, plugin) in self.plugins.iter().enumerate() {
            trace!("plugin #{} on {}", index, rule.id());
            plugin(rule).map_err(|cause| Error::Plugin { index, cause })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginPipeline")
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DefaultClassNames;
    use crate::rule::RuleOptions;
    use crate::style::StyleValue;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rule() -> StyleRule {
        StyleRule::new(
            Some(".a"),
            &json!({}),
            RuleOptions::new(),
            &mut DefaultClassNames::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_plugins_run_in_order() {
        let mut plugins = PluginPipeline::new();
        plugins
            .register(|rule: &mut StyleRule| {
                rule.set_prop("x", 1)?;
                Ok(())
            })
            .register(|rule: &mut StyleRule| {
                let x = rule
                    .prop("x")?
                    .and_then(|value| value.as_f64())
                    .unwrap_or_default();
                rule.set_prop("y", x as i64 + 1)?;
                Ok(())
            });

        let mut rule = rule();
        plugins.run(&mut rule).unwrap();
        assert_eq!(rule.style().get("y"), Some(&StyleValue::from(2)));
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let mut plugins = PluginPipeline::new();
        let log = Rc::clone(&ran);
        plugins.register(move |_: &mut StyleRule| {
            log.borrow_mut().push(0);
            Ok(())
        });
        plugins.register(|_: &mut StyleRule| anyhow::bail!("rejected"));
        let log = Rc::clone(&ran);
        plugins.register(move |_: &mut StyleRule| {
            log.borrow_mut().push(2);
            Ok(())
        });

        let mut rule = rule();
        let err = plugins.run(&mut rule).unwrap_err();
        match err {
            Error::Plugin { index, cause } => {
                assert_eq!(index, 1);
                assert_eq!(cause.to_string(), "rejected");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*ran.borrow(), vec![0]);
    }

    #[test]
    fn test_empty_pipeline() {
        let plugins = PluginPipeline::new();
        assert!(plugins.is_empty());
        let mut rule = rule();
        plugins.run(&mut rule).unwrap();
        assert_eq!(plugins.len(), 0);
    }
}
