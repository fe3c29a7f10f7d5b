//! # Stylekit - CSS rules as data
//!
//! Stylekit models style sheets as plain Rust values: rules with deep-cloned
//! style maps, sheets that keep them in cascade order, and a pluggable
//! renderer that materializes them into a live target.
//!
//! ## Core Concepts
//!
//! - [`StyleRule`]: a selector plus a style map, optionally named and bound to a live rule
//! - [`StyleSheet`]: an ordered rule container with lookups by selector and by name
//! - [`Renderer`]: the capability that turns sheets and rules into live output
//! - [`PluginPipeline`]: transforms run on every rule right after construction
//! - [`GenerateClassName`]: class names for named rules
//! - [`SheetRegistry`]: every sheet an engine created, for combined CSS output
//! - [`StyleEngine`]: owns all of the above and is the usual entry point
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use stylekit::{Declarations, MemoryRenderer, SheetOptions, StyleEngine};
//!
//! let renderer = Rc::new(MemoryRenderer::new());
//! let mut engine = StyleEngine::new().with_renderer(renderer.clone());
//!
//! let declarations = Declarations::from_yaml(r#"
//! button:
//!   color: white
//!   padding: [4, 8]
//! "#).unwrap();
//!
//! let id = engine
//!     .create_style_sheet(&declarations, SheetOptions::new().link(true))
//!     .unwrap();
//! let sheet = engine.sheet_mut(id).unwrap();
//! sheet.attach().unwrap();
//!
//! let class = sheet.class_name("button").unwrap().to_string();
//! let rule = sheet.get_rule("button").unwrap().id();
//! sheet.set_selector(rule, ".primary").unwrap();
//!
//! assert!(class.starts_with("button-"));
//! assert_eq!(renderer.rendered_selectors(id), vec![".primary".to_string()]);
//! ```
//!
//! ## Rule states
//!
//! A rule is detached, owned by a sheet, or owned and bound to a live
//! target (see [`RuleState`]). Selector changes on owned rules go through
//! [`StyleSheet::set_selector`] so the sheet index and the render target
//! never disagree with the model.
//!
//! ## Style values
//!
//! Styles enter through serde: anything that serializes to a map of
//! strings, numbers, sequences (one or two levels) and a nested
//! `fallbacks` map is accepted. Other values are rejected with
//! [`CloneError`] rather than silently dropped.

mod engine;
mod error;
mod naming;
mod plugin;
pub mod render;
mod rule;
mod sheet;
pub mod style;

pub use engine::{RuleFactory, StyleEngine};
pub use error::{CloneError, DeclarationsError, Error, RenderError, Result};
pub use naming::{sanitize_identifier, DefaultClassNames, GenerateClassName};
pub use plugin::{Plugin, PluginPipeline};
pub use render::{MemoryRenderer, NoopRenderer, RenderHandle, Renderer};
pub use rule::{find_class_names, RuleId, RuleOptions, RuleState, SelectorChange, StyleRule};
pub use sheet::{Declarations, SheetId, SheetOptions, SheetRegistry, StyleSheet};
pub use style::{to_css, CssOptions, StyleMap, StyleValue, FALLBACKS_KEY};
