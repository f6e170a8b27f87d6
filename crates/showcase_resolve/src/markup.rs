//! Built-in renderable HTML fragment interface.

use crate::concrete::Factory;
use crate::interface::{Interface, Polymorphic};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A fragment of markup that can be emitted verbatim by a template.
pub trait HtmlContent: Send + Sync {
    /// Returns the markup text.
    fn to_html(&self) -> String;
}

impl Interface for dyn HtmlContent {
    const NAME: &'static str = "showcase::html::IHtmlContent";
}

/// A string of trusted markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Fully-qualified name reported for built-in resolutions.
    pub const NAME: &'static str = "showcase::html::Markup";

    /// Wraps markup text.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Returns the markup text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if there is no markup.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl HtmlContent for Markup {
    fn to_html(&self) -> String {
        self.0.clone()
    }
}

impl core::fmt::Display for Markup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for Polymorphic<dyn HtmlContent> {
    fn default() -> Self {
        Polymorphic::new(Box::new(Markup::default()), Value::Null)
    }
}

/// Strings wrap directly and `null` becomes empty markup; anything else goes
/// through `Markup`'s own deserializer.
pub(crate) fn markup_factory() -> Factory<dyn HtmlContent> {
    Arc::new(|value| match value {
        Value::String(html) => Ok(Box::new(Markup(html)) as Box<dyn HtmlContent>),
        Value::Null => Ok(Box::new(Markup::default()) as Box<dyn HtmlContent>),
        other => {
            serde_json::from_value::<Markup>(other).map(|m| Box::new(m) as Box<dyn HtmlContent>)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn factory_wraps_plain_strings() {
        let html = markup_factory()(json!("<b>hi</b>")).unwrap();
        assert_eq!(html.to_html(), "<b>hi</b>");
    }

    #[test]
    fn factory_maps_null_to_empty_markup() {
        let html = markup_factory()(Value::Null).unwrap();
        assert_eq!(html.to_html(), "");
    }

    #[test]
    fn factory_rejects_objects() {
        assert!(markup_factory()(json!({ "html": "x" })).is_err());
    }

    #[test]
    fn default_polymorphic_markup_is_empty() {
        let content = Polymorphic::<dyn HtmlContent>::default();
        assert_eq!(content.to_html(), "");
        assert_eq!(content.source(), &Value::Null);
    }
}
