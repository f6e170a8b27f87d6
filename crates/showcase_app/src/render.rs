//! The seam to an external template engine.

use crate::error::RenderError;
use showcase_props::PropsInstance;

/// Produces markup from a template path and a props instance.
///
/// Implementations usually read [`PropsInstance::snapshot`] or downcast the
/// instance to the component's props type.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `template` with `instance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing or fails to render.
    fn render(&self, template: &str, instance: &PropsInstance) -> Result<String, RenderError>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &PropsInstance) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, template: &str, instance: &PropsInstance) -> Result<String, RenderError> {
        self(template, instance)
    }
}
