//! Property metadata extraction.
//!
//! Props types describe themselves through [`schemars::JsonSchema`]; this
//! module reads the generated JSON Schema and turns each property into a
//! [`PropertyDescriptor`].
//!
//! Classification rules:
//!
//! - `enum` of strings, or `oneOf`/`anyOf` of string constants -> [`PropertyKind::Enum`]
//! - `string` -> text, or date/time for `date-time`, `date`, `time` formats
//! - `boolean`, `integer`, `number` -> the matching primitive
//! - `array` -> list (set with `uniqueItems`); `object` without `properties`
//!   but with `additionalProperties` -> map
//! - `x-interface` and everything else -> [`PropertyKind::Complex`]
//! - `null` in `type`, a `{"type": "null"}` branch, or `nullable: true` wraps
//!   the kind in [`PropertyKind::Nullable`]

use crate::descriptor::{
    CollectionShape, Primitive, PropertyDescriptor, PropertyKind, display_name_for,
};
use crate::error::SchemaError;
use crate::value::{PropValue, PropertyValueMap, keys_match};
use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::{Map, Value, json};
use std::borrow::Cow;

const MAX_REF_DEPTH: usize = 32;

/// Extension keyword carrying an explicit display name.
pub const DISPLAY_NAME_KEYWORD: &str = "x-display-name";

/// Extension keyword marking interface-typed properties.
pub const INTERFACE_KEYWORD: &str = "x-interface";

/// The extracted property set of a props type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropsSchema {
    type_name: String,
    properties: Vec<PropertyDescriptor>,
    root: Value,
}

impl PropsSchema {
    /// Generates and reads the schema of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not an object type or its schema contains
    /// unknown references.
    pub fn of<T: JsonSchema>() -> Result<Self, SchemaError> {
        let generator = SchemaSettings::draft2020_12()
            .with(|settings| settings.inline_subschemas = true)
            .into_generator();
        let root = generator.into_root_schema_for::<T>();
        Self::from_json_schema(core::any::type_name::<T>(), root.as_value())
    }

    /// Reads an already-generated root schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an object schema or contains
    /// unknown references.
    pub fn from_json_schema(type_name: &str, root: &Value) -> Result<Self, SchemaError> {
        let reader = Reader { type_name, root };
        let object = reader.deref(root)?;
        let Some(object) = object.as_object() else {
            return Err(reader.not_an_object());
        };

        let mut entries = Vec::new();
        reader.collect_properties(object, &mut entries)?;
        if entries.is_empty() && object.get("type").and_then(Value::as_str) != Some("object") {
            return Err(reader.not_an_object());
        }

        let mut properties = Vec::with_capacity(entries.len());
        for (name, schema) in entries {
            if properties
                .iter()
                .any(|existing: &PropertyDescriptor| existing.name == name)
            {
                continue;
            }
            properties.push(reader.describe(name, schema)?);
        }

        properties.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Self {
            type_name: type_name.to_string(),
            properties,
            root: root.clone(),
        })
    }

    /// Rust type name the schema was read from.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Readable properties, sorted by name.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyDescriptor> {
        self.properties
            .iter()
            .filter(|property| !property.write_only)
            .cloned()
            .collect()
    }

    /// Every property, including write-only ones.
    #[must_use]
    pub fn all_properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Finds a property by name, ignoring case. An exact match wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|property| keys_match(&property.name, name))
            })
    }

    /// Default value of every readable property.
    ///
    /// A `default` annotation in the schema, which schemars emits for
    /// `#[serde(default)]` types, takes precedence over the zero value of the
    /// property's kind. A text property whose type defaults to `"Click me"`
    /// reports `"Click me"`, not `""`.
    #[must_use]
    pub fn default_values(&self) -> PropertyValueMap {
        self.properties
            .iter()
            .filter(|property| !property.write_only)
            .map(|property| {
                (
                    property.name.clone(),
                    PropValue::Json(property.default_value.clone()),
                )
            })
            .collect()
    }

    /// Renames the keys of a structured `value` to the casing declared in
    /// `descriptor`'s schema, at every nesting level. Keys that already match
    /// exactly are kept, and undeclared keys are left alone.
    pub(crate) fn align_keys(&self, descriptor: &PropertyDescriptor, value: &mut Value) {
        align_keys(&self.root, &descriptor.schema, value, 0);
    }
}

fn align_keys(root: &Value, schema: &Value, value: &mut Value, depth: usize) {
    if depth > MAX_REF_DEPTH {
        return;
    }
    let mut views = Vec::new();
    schema_views(root, schema, 0, &mut views);

    match value {
        Value::Object(map) => {
            let mut declared: Vec<(&String, &Value)> = Vec::new();
            for view in &views {
                if let Some(Value::Object(properties)) = view.get("properties") {
                    for (name, schema) in properties {
                        if !declared.iter().any(|(existing, _)| *existing == name) {
                            declared.push((name, schema));
                        }
                    }
                }
            }
            let additional = views
                .iter()
                .find_map(|view| view.get("additionalProperties").filter(|s| s.is_object()));
            if declared.is_empty() && additional.is_none() {
                return;
            }

            let original = core::mem::take(map);
            let exact: Vec<String> = original.keys().cloned().collect();
            for (key, mut item) in original {
                let target = declared
                    .iter()
                    .find(|(name, _)| **name == key)
                    .or_else(|| {
                        declared
                            .iter()
                            .find(|(name, _)| keys_match(name, &key) && !exact.contains(*name))
                    });
                let (key, item_schema) = match target {
                    Some((name, schema)) => ((*name).clone(), Some(*schema)),
                    None => (key, additional),
                };
                if let Some(item_schema) = item_schema {
                    align_keys(root, item_schema, &mut item, depth + 1);
                }
                map.insert(key, item);
            }
        }
        Value::Array(items) => {
            let item_schema = views
                .iter()
                .find_map(|view| view.get("items").filter(|s| s.is_object()));
            if let Some(item_schema) = item_schema {
                for item in items {
                    align_keys(root, item_schema, item, depth + 1);
                }
            }
        }
        _ => {}
    }
}

/// Collects `schema` and every subschema that applies to the same value:
/// reference targets and `allOf`/`anyOf`/`oneOf` branches.
fn schema_views<'s>(
    root: &'s Value,
    schema: &'s Value,
    depth: usize,
    out: &mut Vec<&'s Map<String, Value>>,
) {
    if depth > MAX_REF_DEPTH {
        return;
    }
    let Some(object) = schema.as_object() else {
        return;
    };
    out.push(object);

    let target = object
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer));
    if let Some(target) = target {
        schema_views(root, target, depth + 1, out);
    }
    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = object.get(keyword) {
            for branch in branches {
                schema_views(root, branch, depth + 1, out);
            }
        }
    }
}

struct Classified {
    kind: PropertyKind,
    choices: Option<Vec<String>>,
    interface: Option<String>,
    format: Option<String>,
}

impl Classified {
    fn of(kind: PropertyKind) -> Self {
        Self {
            kind,
            choices: None,
            interface: None,
            format: None,
        }
    }
}

struct Reader<'a> {
    type_name: &'a str,
    root: &'a Value,
}

impl<'a> Reader<'a> {
    fn not_an_object(&self) -> SchemaError {
        SchemaError::NotAnObject {
            type_name: self.type_name.to_string(),
        }
    }

    /// Follows `$ref` chains. Keywords next to a `$ref` override the target's.
    fn deref<'v>(&self, schema: &'v Value) -> Result<Cow<'v, Value>, SchemaError>
    where
        'a: 'v,
    {
        let mut current = Cow::Borrowed(schema);
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Ok(current);
            };
            let target = reference
                .strip_prefix('#')
                .and_then(|pointer| self.root.pointer(pointer))
                .ok_or_else(|| SchemaError::UnknownReference {
                    type_name: self.type_name.to_string(),
                    reference: reference.to_string(),
                })?;

            let mut merged = target.as_object().cloned().unwrap_or_default();
            if let Some(siblings) = current.as_object() {
                for (key, value) in siblings {
                    if key != "$ref" {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            current = Cow::Owned(Value::Object(merged));
        }

        Err(SchemaError::UnknownReference {
            type_name: self.type_name.to_string(),
            reference: "<reference cycle>".to_string(),
        })
    }

    fn collect_properties(
        &self,
        object: &Map<String, Value>,
        out: &mut Vec<(String, Value)>,
    ) -> Result<(), SchemaError> {
        if let Some(Value::Object(properties)) = object.get("properties") {
            out.extend(
                properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.clone())),
            );
        }

        // Flattened fields arrive as `allOf` members.
        if let Some(Value::Array(parts)) = object.get("allOf") {
            for part in parts {
                let part = self.deref(part)?;
                if let Some(part) = part.as_object() {
                    self.collect_properties(part, out)?;
                }
            }
        }

        Ok(())
    }

    fn describe(&self, name: String, schema: Value) -> Result<PropertyDescriptor, SchemaError> {
        let resolved = self.deref(&schema)?.into_owned();
        let classified = self.classify(&resolved)?;

        let annotation = |key: &str| resolved.get(key).and_then(Value::as_str).map(str::to_string);
        let flag = |key: &str| resolved.get(key).and_then(Value::as_bool).unwrap_or(false);

        let display_name = annotation(DISPLAY_NAME_KEYWORD)
            .or_else(|| annotation("title"))
            .unwrap_or_else(|| display_name_for(&name));
        let description = annotation("description");
        let read_only = flag("readOnly");
        let write_only = flag("writeOnly");

        let default_value = match resolved.get("default") {
            Some(explicit) => explicit.clone(),
            None => zero_value(&classified),
        };

        let enum_choices = match classified.kind.non_null() {
            PropertyKind::Enum => classified.choices,
            _ => None,
        };

        Ok(PropertyDescriptor {
            display_name,
            description,
            default_value,
            enum_choices,
            interface: classified.interface,
            read_only,
            write_only,
            kind: classified.kind,
            schema: resolved,
            name,
        })
    }

    fn classify(&self, schema: &Value) -> Result<Classified, SchemaError> {
        let schema = self.deref(schema)?;

        if let Some(inner) = strip_null(&schema) {
            let mut classified = self.classify(&inner)?;
            classified.kind = classified.kind.nullable();
            return Ok(classified);
        }

        let Some(object) = schema.as_object() else {
            return Ok(Classified::of(PropertyKind::Complex));
        };

        if let Some(interface) = object.get(INTERFACE_KEYWORD).and_then(Value::as_str) {
            return Ok(Classified {
                interface: Some(interface.to_string()),
                ..Classified::of(PropertyKind::Complex)
            });
        }

        if let Some(choices) = self.enum_choices(object)? {
            return Ok(Classified {
                choices: Some(choices),
                ..Classified::of(PropertyKind::Enum)
            });
        }

        let format = object.get("format").and_then(Value::as_str);
        let kind = match object.get("type").and_then(Value::as_str) {
            Some("string") => match format {
                Some("date-time" | "date" | "time") => PropertyKind::Primitive(Primitive::DateTime),
                _ => PropertyKind::Primitive(Primitive::Text),
            },
            Some("boolean") => PropertyKind::Primitive(Primitive::Boolean),
            Some("integer") => PropertyKind::Primitive(Primitive::Integer),
            Some("number") => PropertyKind::Primitive(Primitive::Number),
            Some("array") => {
                let shape = if object.get("uniqueItems") == Some(&Value::Bool(true)) {
                    CollectionShape::Set
                } else {
                    CollectionShape::List
                };
                PropertyKind::Collection {
                    shape,
                    item: Box::new(self.item_kind(object.get("items"))?),
                }
            }
            Some("object") if !object.contains_key("properties") => {
                match object.get("additionalProperties") {
                    Some(values) if values.is_object() => PropertyKind::Collection {
                        shape: CollectionShape::Map,
                        item: Box::new(self.item_kind(Some(values))?),
                    },
                    _ => PropertyKind::Complex,
                }
            }
            _ => PropertyKind::Complex,
        };

        Ok(Classified {
            format: format.map(str::to_string),
            ..Classified::of(kind)
        })
    }

    fn item_kind(&self, items: Option<&Value>) -> Result<PropertyKind, SchemaError> {
        match items {
            Some(items) => self.classify(items).map(|classified| classified.kind),
            None => Ok(PropertyKind::Complex),
        }
    }

    fn enum_choices(
        &self,
        object: &Map<String, Value>,
    ) -> Result<Option<Vec<String>>, SchemaError> {
        if let Some(Value::Array(values)) = object.get("enum") {
            return Ok(string_choices(values));
        }

        if let Some(Value::String(only)) = object.get("const") {
            return Ok(Some(vec![only.clone()]));
        }

        for key in ["oneOf", "anyOf"] {
            let Some(Value::Array(branches)) = object.get(key) else {
                continue;
            };
            if branches.is_empty() {
                continue;
            }

            let mut choices = Vec::new();
            for branch in branches {
                let branch = self.deref(branch)?;
                let single = match (branch.get("const"), branch.get("enum")) {
                    (Some(Value::String(name)), _) => Some(vec![name.clone()]),
                    (None, Some(Value::Array(values))) => string_choices(values),
                    _ => None,
                };
                let Some(single) = single else {
                    return Ok(None);
                };
                choices.extend(single);
            }
            return Ok(Some(choices));
        }

        Ok(None)
    }
}

fn string_choices(values: &[Value]) -> Option<Vec<String>> {
    let choices: Option<Vec<String>> = values
        .iter()
        .filter(|value| !value.is_null())
        .map(|value| value.as_str().map(str::to_string))
        .collect();
    choices.filter(|choices| !choices.is_empty())
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
        || schema.get("const") == Some(&Value::Null)
}

/// Returns the schema with its null alternative removed, or `None` if the
/// schema does not admit `null`.
fn strip_null(schema: &Value) -> Option<Value> {
    let object = schema.as_object()?;

    if let Some(Value::Array(types)) = object.get("type")
        && types.iter().any(|ty| ty == "null")
    {
        let rest: Vec<Value> = types.iter().filter(|ty| *ty != "null").cloned().collect();
        let mut inner = object.clone();
        match rest.len() {
            0 => return None,
            1 => {
                inner.insert("type".to_string(), rest[0].clone());
            }
            _ => {
                inner.insert("type".to_string(), Value::Array(rest));
            }
        }
        if let Some(Value::Array(values)) = inner.get_mut("enum") {
            values.retain(|value| !value.is_null());
        }
        return Some(Value::Object(inner));
    }

    for key in ["anyOf", "oneOf"] {
        let Some(Value::Array(branches)) = object.get(key) else {
            continue;
        };
        let (nulls, others): (Vec<&Value>, Vec<&Value>) =
            branches.iter().partition(|branch| is_null_schema(branch));
        if nulls.is_empty() || others.is_empty() {
            continue;
        }
        if let [only] = others.as_slice() {
            return Some((*only).clone());
        }
        let mut inner = object.clone();
        inner.insert(key.to_string(), Value::Array(others.into_iter().cloned().collect()));
        return Some(Value::Object(inner));
    }

    if object.get("nullable") == Some(&Value::Bool(true)) {
        let mut inner = object.clone();
        inner.remove("nullable");
        return Some(Value::Object(inner));
    }

    None
}

/// The zero value of a kind: first enum member, empty text, `false`, `0`,
/// empty collection, and `null` for nullable and complex properties.
fn zero_value(classified: &Classified) -> Value {
    match &classified.kind {
        PropertyKind::Nullable(_) | PropertyKind::Complex => Value::Null,
        PropertyKind::Enum => classified
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .map_or(Value::Null, |first| Value::String(first.clone())),
        PropertyKind::Primitive(Primitive::Text) => json!(""),
        PropertyKind::Primitive(Primitive::Boolean) => json!(false),
        PropertyKind::Primitive(Primitive::Integer) => json!(0),
        PropertyKind::Primitive(Primitive::Number) => json!(0.0),
        PropertyKind::Primitive(Primitive::DateTime) => match classified.format.as_deref() {
            Some("date") => json!("0001-01-01"),
            Some("time") => json!("00:00:00"),
            _ => json!("0001-01-01T00:00:00Z"),
        },
        PropertyKind::Collection {
            shape: CollectionShape::Map,
            ..
        } => json!({}),
        PropertyKind::Collection { .. } => json!([]),
    }
}
