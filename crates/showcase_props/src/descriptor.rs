//! Property descriptors: the metadata an editor needs to render one prop.

use serde::Serialize;
use serde_json::Value;

/// Simple scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Text.
    Text,
    /// `true` / `false`.
    Boolean,
    /// Whole numbers.
    Integer,
    /// Floating-point or decimal numbers.
    Number,
    /// Dates, times, and timestamps carried as strings.
    DateTime,
}

/// The concrete shape of a collection property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionShape {
    /// Ordered sequence.
    List,
    /// Sequence of unique items.
    Set,
    /// String-keyed map.
    Map,
}

/// Semantic classification of a property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// A simple scalar.
    Primitive(Primitive),
    /// One of a fixed set of named members.
    Enum,
    /// A list, set, or map over an item kind.
    Collection {
        /// Concrete shape.
        shape: CollectionShape,
        /// Kind of each item (map values for [`CollectionShape::Map`]).
        item: Box<PropertyKind>,
    },
    /// A nested object, interface, or anything without a simpler reading.
    Complex,
    /// The wrapped kind, or no value.
    Nullable(Box<PropertyKind>),
}

impl PropertyKind {
    /// Returns `true` if the property accepts no value.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Returns the kind with any nullable wrapper removed.
    #[must_use]
    pub fn non_null(&self) -> &PropertyKind {
        match self {
            Self::Nullable(inner) => inner.non_null(),
            other => other,
        }
    }

    /// Returns `true` for primitives and enums, nullable or not.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self.non_null(), Self::Primitive(_) | Self::Enum)
    }

    pub(crate) fn nullable(self) -> Self {
        match self {
            nullable @ Self::Nullable(_) => nullable,
            other => Self::Nullable(Box::new(other)),
        }
    }
}

/// Metadata for one property of a props type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Property name as it appears in JSON.
    pub name: String,
    /// Semantic kind.
    pub kind: PropertyKind,
    /// Default value; `null` when the property has none.
    pub default_value: Value,
    /// Member names in declaration order, for enum properties.
    pub enum_choices: Option<Vec<String>>,
    /// Human-readable label.
    pub display_name: String,
    /// Optional help text.
    pub description: Option<String>,
    /// Fully-qualified interface name when the property is interface-typed.
    pub interface: Option<String>,
    /// The property is listed but never written by coercion.
    pub read_only: bool,
    /// The property can be written but is not listed.
    pub write_only: bool,
    /// The property's JSON Schema.
    pub schema: Value,
}

/// Splits a property name into a label: `MaxWidth` -> `Max Width`,
/// `max_width` -> `Max Width`.
#[must_use]
pub fn display_name_for(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for part in name.split(['_', '-']).filter(|part| !part.is_empty()) {
        let mut word = String::new();
        for (index, c) in part.chars().enumerate() {
            if index > 0 && c.is_uppercase() {
                words.push(core::mem::take(&mut word));
            }
            if word.is_empty() {
                word.extend(c.to_uppercase());
            } else {
                word.push(c);
            }
        }
        words.push(word);
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_splits_uppercase_boundaries() {
        assert_eq!(display_name_for("MaxWidth"), "Max Width");
        assert_eq!(display_name_for("maxWidth"), "Max Width");
        assert_eq!(display_name_for("Text"), "Text");
        assert_eq!(display_name_for("HTML"), "H T M L");
    }

    #[test]
    fn display_name_splits_snake_case() {
        assert_eq!(display_name_for("max_width"), "Max Width");
        assert_eq!(display_name_for("is_disabled"), "Is Disabled");
    }

    #[test]
    fn non_null_unwraps() {
        let kind = PropertyKind::Primitive(Primitive::Integer).nullable();
        assert!(kind.is_nullable());
        assert!(kind.is_simple());
        assert_eq!(kind.non_null(), &PropertyKind::Primitive(Primitive::Integer));
        assert_eq!(kind.clone().nullable(), kind);
    }
}
