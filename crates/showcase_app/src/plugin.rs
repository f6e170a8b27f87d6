//! Plugin lifecycle.
//!
//! Hosts package their component modules, resolver bindings, and
//! infrastructure as plugins added to a [`ShowcaseBuilder`].
//!
//! # Lifecycle
//!
//! - **`build()`** runs as soon as the plugin is added. Register modules,
//!   loaders, bindings, and configuration here.
//! - **`ready()`** runs once [`ShowcaseBuilder::finish`] has frozen the
//!   registry and built the resolver.
//!
//! # Example
//!
//! ```
//! use showcase_app::{Plugin, Showcase, ShowcaseBuilder};
//! use showcase_catalog::ComponentModule;
//!
//! struct DesignSystemPlugin;
//!
//! impl Plugin for DesignSystemPlugin {
//!     fn build(&self, builder: &mut ShowcaseBuilder) {
//!         builder.register_module(ComponentModule::new("design_system"));
//!     }
//! }
//!
//! let showcase = ShowcaseBuilder::new().add_plugins(DesignSystemPlugin).finish();
//! assert!(showcase.discover_components().items.is_empty());
//! ```

use crate::showcase::{Showcase, ShowcaseBuilder};
use core::any::TypeId;

/// Unique identifier for a plugin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Returns the identifier of `P`.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Rust type name of the plugin.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A unit of Showcase setup.
pub trait Plugin: Send + Sync + 'static {
    /// Configures the builder. Called once when the plugin is added.
    fn build(&self, builder: &mut ShowcaseBuilder);

    /// Called after the showcase is built.
    fn ready(&self, _showcase: &Showcase) {}

    /// Name used in logs and duplicate checks.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Whether adding the plugin twice is an error. Defaults to `true`.
    fn is_unique(&self) -> bool {
        true
    }
}
