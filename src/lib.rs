//! A component preview engine: discovers UI components and their stories,
//! extracts property metadata, and coerces untyped property values into
//! typed instances ready for rendering.
//!

/// Interface-to-concrete type resolution.
pub use showcase_resolve;

/// Property metadata extraction and value coercion.
pub use showcase_props;

/// Component and story discovery.
pub use showcase_catalog;

/// Plugin lifecycle, configuration, and preview composition.
pub use showcase_app;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use showcase_app::{
        Plugin, Preview, PreviewError, Showcase, ShowcaseBuilder, ShowcaseConfig,
        TemplateRenderer, TracingFormat, TracingPlugin,
    };
    pub use showcase_catalog::{
        AtomicLevel, ComponentDefinition, ComponentModule, StoryDefinition, StoryProvider,
    };
    pub use showcase_props::{PropValue, PropertyValueMap, Props, PropsInstance, SchemaType};
    pub use showcase_resolve::{
        ConcreteType, HtmlContent, Interface, Markup, Polymorphic, TypeResolver,
    };
}
