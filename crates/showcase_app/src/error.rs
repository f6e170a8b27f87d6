//! Errors returned by the [`Showcase`](crate::Showcase) facade.

use showcase_props::CoercionError;
use thiserror::Error;

/// Error produced by a [`TemplateRenderer`](crate::TemplateRenderer).
pub type RenderError = Box<dyn core::error::Error + Send + Sync>;

/// Errors raised while composing or rendering a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// No discovered component has this name.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// The component has no story with this name.
    #[error("component '{component}' has no story named '{story}'")]
    UnknownStory {
        /// Component name.
        component: String,
        /// Requested story name.
        story: String,
    },

    /// The component has no registered props type.
    #[error("component '{component}' has no props type '{schema}'")]
    MissingSchema {
        /// Component name.
        component: String,
        /// Props type the component looks for.
        schema: String,
    },

    /// The property values could not be turned into an instance.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// The template renderer failed.
    #[error("failed to render '{template}': {source}")]
    Render {
        /// Template path.
        template: String,
        /// Renderer error.
        #[source]
        source: RenderError,
    },
}

impl PreviewError {
    /// Returns `true` if the request named something that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownComponent(_) | Self::UnknownStory { .. } | Self::MissingSchema { .. }
        )
    }
}
