//! Style sheets and the registry that tracks them.
//!
//! - [`StyleSheet`]: ordered rules bound to one render target
//! - [`SheetOptions`]: sheet configuration
//! - [`SheetRegistry`]: every sheet an application created, for enumeration
//! - [`Declarations`]: `name → style` documents loaded from YAML, JSON or serde values

mod declarations;
mod registry;
#[allow(clippy::module_inception)]
mod sheet;

pub use declarations::Declarations;
pub use registry::SheetRegistry;
pub use sheet::{SheetId, SheetOptions, StyleSheet};
