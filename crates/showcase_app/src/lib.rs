//! Showcase facade.
//!
//! [`ShowcaseBuilder`] collects [`Plugin`]s, component modules, resolver
//! bindings, and [`ShowcaseConfig`]; [`ShowcaseBuilder::finish`] freezes
//! them into a [`Showcase`] that answers discovery, metadata, coercion, and
//! preview requests.

mod config;
mod error;
mod plugin;
mod render;
mod showcase;
mod tracing_plugin;

pub use config::{AssetLinks, COMPONENT_LIBRARY_ENV, ShowcaseConfig};
pub use error::{PreviewError, RenderError};
pub use plugin::{Plugin, PluginId};
pub use render::TemplateRenderer;
pub use showcase::{Preview, Showcase, ShowcaseBuilder};
pub use tracing_plugin::{TracingFormat, TracingPlugin};
