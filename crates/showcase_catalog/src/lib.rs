//! Component and story discovery.
//!
//! Host applications register [`ComponentModule`]s with a
//! [`ComponentRegistry`]. Each module lists story provider types by path,
//! props types, and concrete types for interface resolution. Discovery reads
//! components from the story type paths:
//!
//! ```text
//! app::Components::Atoms::ButtonStories
//!      ^^^^^^^^^^  ^^^^^  ^^^^^^
//!      anchor      level  component
//! ```
//!
//! and pairs each component with the `{Name}Props` type of the same module.

mod component;
mod error;
mod level;
mod module;
mod registry;
mod story;

pub use component::ComponentDefinition;
pub use error::{Diagnostic, DiagnosticKind, ModuleLoadError, StoryError};
pub use level::AtomicLevel;
pub use module::{ComponentModule, StoryType};
pub use registry::{ComponentRegistry, Discovered, StoryIndex};
pub use story::{StoryDefinition, StoryProvider};
