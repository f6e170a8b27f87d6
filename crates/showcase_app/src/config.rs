//! Showcase configuration.

use serde::{Deserialize, Serialize};

/// Environment variable read by [`ShowcaseConfig::from_env`].
pub const COMPONENT_LIBRARY_ENV: &str = "SHOWCASE_COMPONENT_LIBRARY";

/// Host-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    /// Identifier of the component library whose static assets previews
    /// should link.
    pub component_library: Option<String>,
}

impl ShowcaseConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `SHOWCASE_COMPONENT_LIBRARY`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            component_library: std::env::var(COMPONENT_LIBRARY_ENV).ok(),
        }
    }

    /// Sets the component library identifier.
    #[must_use]
    pub fn with_component_library(mut self, library: impl Into<String>) -> Self {
        self.component_library = Some(library.into());
        self
    }

    /// Static asset links for the configured library. `None` when the
    /// identifier is absent or blank.
    #[must_use]
    pub fn asset_links(&self) -> Option<AssetLinks> {
        let library = self.component_library.as_deref()?.trim();
        if library.is_empty() {
            return None;
        }
        Some(AssetLinks {
            stylesheet: format!("/_content/{library}/styles.css"),
            script: format!("/_content/{library}/scripts.js"),
        })
    }
}

/// Paths of a component library's static assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetLinks {
    /// Stylesheet path.
    pub stylesheet: String,
    /// Script path.
    pub script: String,
}
