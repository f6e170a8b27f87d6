//! Error and diagnostic types for discovery.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by deferred module loaders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    /// The module is not present in this build or environment.
    #[error("module is not available: {0}")]
    Unavailable(String),

    /// The module was found but could not be initialized.
    #[error("module failed to load: {0}")]
    Failed(String),
}

/// Errors raised while creating story providers or their presets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// The provider could not be constructed.
    #[error("story provider could not be created: {0}")]
    Instantiate(String),

    /// A typed preset could not be captured as property values.
    #[error("preset for story '{story}' could not be serialized: {message}")]
    Preset {
        /// Story name.
        story: String,
        /// Serializer message.
        message: String,
    },
}

/// What a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A deferred module failed to load and was skipped.
    ModuleUnavailable,
    /// A story provider could not be created and was skipped.
    StoryUnavailable,
    /// A second provider claimed a component that already had one.
    DuplicateProvider,
    /// A provider returned two stories with the same name.
    DuplicateStory,
}

/// A non-fatal problem found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Module, or component for story problems, the problem was found in.
    pub module: String,
    /// Story type, component, or story concerned, if any.
    pub subject: Option<String>,
    /// Problem category.
    pub kind: DiagnosticKind,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(
        kind: DiagnosticKind,
        module: impl Into<String>,
        subject: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            subject,
            kind,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {}: {}", self.module, subject, self.message),
            None => write!(f, "[{}] {}", self.module, self.message),
        }
    }
}
