//! Tracing and observability plugin.
//!
//! Provides [`TracingPlugin`], which installs a `tracing` subscriber once the
//! showcase is ready.
//!
//! # Example
//!
//! ```
//! use showcase_app::{ShowcaseBuilder, TracingFormat, TracingPlugin};
//! use tracing::Level;
//!
//! let showcase = ShowcaseBuilder::new()
//!     .add_plugins(
//!         TracingPlugin::default()
//!             .with_level(Level::DEBUG)
//!             .with_format(TracingFormat::Compact),
//!     )
//!     .finish();
//! # let _ = showcase;
//! ```

use crate::plugin::Plugin;
use crate::showcase::{Showcase, ShowcaseBuilder};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

/// Installs a `tracing` subscriber.
///
/// The subscriber is installed in [`Plugin::ready`], so every other plugin
/// has been built by then. Installation is skipped if a global subscriber
/// already exists.
///
/// ```
/// use showcase_app::{TracingFormat, TracingPlugin};
/// use tracing::Level;
///
/// // Skipped properties and module diagnostics log at WARN; discovery and
/// // resolution details at DEBUG.
/// let plugin = TracingPlugin::new()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("showcase_props=debug,showcase_catalog=warn");
/// # let _ = plugin;
/// ```
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a plugin with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a filter directive string, `target=level,target=level,...`.
    /// An invalid directive falls back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, _builder: &mut ShowcaseBuilder) {}

    fn ready(&self, showcase: &Showcase) {
        let env_filter = self.env_filter();
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init fails when a subscriber is already installed.
        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        }
        .is_ok();

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            installed,
            modules = showcase.registry().module_names().len(),
            "TracingPlugin initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_info() {
        let plugin = TracingPlugin::default();
        assert_eq!(plugin.format(), TracingFormat::Pretty);
        assert_eq!(plugin.level(), Level::INFO);
        assert!(!plugin.span_events);
    }

    #[test]
    fn builder_methods_apply() {
        let plugin = TracingPlugin::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("showcase_props=debug")
            .with_span_events(true);

        assert_eq!(plugin.level(), Level::DEBUG);
        assert_eq!(plugin.format(), TracingFormat::Json);
        assert_eq!(plugin.env_filter.as_deref(), Some("showcase_props=debug"));
        assert!(plugin.span_events);
    }

    #[test]
    fn installs_during_ready() {
        let showcase = ShowcaseBuilder::new()
            .add_plugins(TracingPlugin::new().with_format(TracingFormat::Compact))
            .finish();
        assert!(showcase.has_plugin::<TracingPlugin>());
    }
}
