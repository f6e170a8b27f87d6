//! Untyped property values and the maps that carry them.

use crate::error::CoercionError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A raw property value before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Text from a form field or query string.
    Text(String),
    /// A parsed JSON node or a pre-typed value in JSON form.
    Json(Value),
}

impl PropValue {
    /// Captures an already-typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn typed<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Returns the text if this value came from a form.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Returns the value as JSON; text becomes a JSON string.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Json(value) => value.clone(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Json(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Json(value.into())
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Json(value.into())
    }
}

impl From<u64> for PropValue {
    fn from(value: u64) -> Self {
        Self::Json(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Json(value.into())
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Json(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Json)
    }
}

/// Compares property names ignoring case.
pub(crate) fn keys_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Property name to raw value. Lookups ignore case; insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyValueMap {
    entries: IndexMap<String, PropValue>,
}

impl PropertyValueMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from form or query pairs; every value is text.
    pub fn from_form<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| (key.into(), PropValue::Text(value.into())))
            .collect()
    }

    /// Builds a map from a parsed JSON object.
    #[must_use]
    pub fn from_json_object(object: serde_json::Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| (key, PropValue::Json(value)))
            .collect()
    }

    /// Parses a JSON document that must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::MalformedInput`] if the text is not valid
    /// JSON or not an object.
    pub fn parse_json(text: &str) -> Result<Self, CoercionError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => Ok(Self::from_json_object(object)),
            Ok(other) => Err(CoercionError::malformed(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
            Err(err) => Err(CoercionError::malformed(err.to_string())),
        }
    }

    /// Adds a value, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value. An existing entry whose key matches ignoring case is
    /// replaced in place and its previous value returned.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => {
                let (_, slot) = self.entries.get_index_mut(index)?;
                let previous = core::mem::replace(slot, value);
                // Unique by construction: `index` is the only case-insensitive match.
                let _ = self.entries.replace_index(index, key);
                Some(previous)
            }
            None => {
                self.entries.insert(key, value);
                None
            }
        }
    }

    /// Returns the value for `key`, ignoring case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.position(key)
            .and_then(|index| self.entries.get_index(index))
            .map(|(_, value)| value)
    }

    /// Returns whether `key` is present, ignoring case.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Removes the entry for `key`, ignoring case.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let index = self.position(key)?;
        self.entries.shift_remove_index(index).map(|(_, value)| value)
    }

    /// Copies every entry of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &PropertyValueMap) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the map as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .get_index_of(key)
            .or_else(|| self.entries.keys().position(|existing| keys_match(existing, key)))
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for PropertyValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for PropertyValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyValueMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IndexMap::<String, PropValue>::deserialize(deserializer)
            .map(|entries| entries.into_iter().collect())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookups_ignore_case() {
        let map = PropertyValueMap::new().with("MaxWidth", 10);
        assert!(map.contains_key("maxwidth"));
        assert_eq!(map.get("MAXWIDTH"), Some(&PropValue::Json(json!(10))));
    }

    #[test]
    fn insert_replaces_case_insensitive_match() {
        let mut map = PropertyValueMap::new().with("text", "a").with("size", 1);
        let previous = map.insert("Text", "b");

        assert_eq!(previous, Some(PropValue::Text("a".into())));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Text", "size"]);
    }

    #[test]
    fn merge_prefers_other() {
        let mut story = PropertyValueMap::new().with("text", "Story").with("disabled", true);
        let overrides = PropertyValueMap::from_form([("TEXT", "Override")]);
        story.merge(&overrides);

        assert_eq!(story.get("text"), Some(&PropValue::Text("Override".into())));
        assert_eq!(story.get("disabled"), Some(&PropValue::Json(json!(true))));
    }

    #[test]
    fn remove_ignores_case() {
        let mut map = PropertyValueMap::new().with("Label", "x");
        assert!(map.remove("label").is_some());
        assert!(map.is_empty());
    }

    #[test]
    fn parse_json_requires_object() {
        assert!(PropertyValueMap::parse_json(r#"{"a": 1}"#).is_ok());

        let err = PropertyValueMap::parse_json("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"), "got: {err}");

        let err = PropertyValueMap::parse_json("{oops").unwrap_err();
        assert!(matches!(err, CoercionError::MalformedInput(_)));
    }

    #[test]
    fn serializes_as_object() {
        let map = PropertyValueMap::new().with("text", "Save").with("count", 2);
        assert_eq!(map.to_json(), json!({ "text": "Save", "count": 2 }));
        assert_eq!(serde_json::to_value(&map).unwrap(), json!({ "text": "Save", "count": 2 }));
    }
}
