//! Stories: named presets of property values for one component.

use crate::error::StoryError;
use serde::Serialize;
use showcase_props::{PropValue, PropertyValueMap, display_name_for};

/// One named variant of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryDefinition {
    name: String,
    display_name: String,
    description: Option<String>,
    values: PropertyValueMap,
}

impl StoryDefinition {
    /// Creates a story with no preset values. The display name is derived
    /// from `name` until set.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: display_name_for(&name),
            name,
            description: None,
            values: PropertyValueMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Presets one property.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Presets every field of a typed props value.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Preset`] if `props` does not serialize to an
    /// object.
    pub fn with_props<T: Serialize>(mut self, props: &T) -> Result<Self, StoryError> {
        let message = match serde_json::to_value(props) {
            Ok(serde_json::Value::Object(object)) => {
                self.values.merge(&PropertyValueMap::from_json_object(object));
                return Ok(self);
            }
            Ok(_) => "expected an object".to_string(),
            Err(err) => err.to_string(),
        };
        Err(StoryError::Preset {
            story: self.name,
            message,
        })
    }

    /// Story name, unique within its component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label shown in the story list.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Optional help text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Preset property values.
    #[must_use]
    pub fn values(&self) -> &PropertyValueMap {
        &self.values
    }
}

/// Supplies the stories of one component.
///
/// Providers are registered on a [`ComponentModule`](crate::ComponentModule)
/// under a type path whose last segment ends with `Stories`.
pub trait StoryProvider: Send + Sync {
    /// Name of the component the stories belong to. Matched ignoring case.
    fn component_name(&self) -> &str;

    /// The stories, in display order.
    fn stories(&self) -> Vec<StoryDefinition>;
}
