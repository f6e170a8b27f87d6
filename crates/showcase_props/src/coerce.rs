//! Coercion of untyped property maps into typed props instances.
//!
//! An instance starts as `T::default()`. Each entry of the input map is
//! matched to a property by name, ignoring case, converted to the JSON form
//! the property expects, and written over the default's JSON image. After
//! every property the image is deserialized again; a property that breaks
//! deserialization is rolled back and reported as a [`PropertyFailure`].
//! Only an unresolved interface aborts the whole attempt.

use crate::descriptor::{Primitive, PropertyDescriptor, PropertyKind};
use crate::error::{CoercionError, PropertyFailure};
use crate::schema::PropsSchema;
use crate::schema_type::Props;
use crate::value::{PropValue, PropertyValueMap, keys_match};
use serde_json::{Map, Number, Value, json};
use showcase_resolve::TypeResolver;
use tracing::{debug, warn};

/// A props instance together with the properties that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    /// The built instance.
    pub instance: T,
    /// Properties whose values were rejected, in input order.
    pub failures: Vec<PropertyFailure>,
}

impl<T> Coerced<T> {
    /// Returns `true` if every property was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Maps the instance, keeping the failures.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Coerced<U> {
        Coerced {
            instance: f(self.instance),
            failures: self.failures,
        }
    }
}

/// Builds a `T` from `values`.
///
/// Properties not named in `values` keep the value they have in
/// `T::default()`. Keys that match no property are ignored, as are
/// read-only properties.
///
/// # Errors
///
/// Returns [`CoercionError::UnresolvedInterface`] when an interface-typed
/// property cannot be resolved, and [`CoercionError::NotAnObject`] when
/// `T::default()` does not serialize to a JSON object.
pub fn create_instance<T: Props>(
    schema: &PropsSchema,
    values: &PropertyValueMap,
    resolver: &TypeResolver,
) -> Result<Coerced<T>, CoercionError> {
    let type_name = schema.type_name();
    let scope = resolver.enter();

    let mut instance = T::default();
    let Value::Object(mut working) = serde_json::to_value(&instance)? else {
        return Err(CoercionError::NotAnObject {
            type_name: type_name.to_string(),
        });
    };

    let mut failures = Vec::new();
    for (key, raw) in values.iter() {
        let Some(descriptor) = schema.find(key) else {
            debug!(type_name, key, "ignoring unknown property");
            continue;
        };
        if descriptor.read_only {
            debug!(type_name, property = %descriptor.name, "ignoring read-only property");
            continue;
        }

        let mut coerced = match coerce_value(descriptor, raw) {
            Ok(coerced) => coerced,
            Err(message) => {
                warn!(
                    type_name,
                    property = %descriptor.name,
                    error = %message,
                    "skipping property"
                );
                failures.push(PropertyFailure {
                    property: descriptor.name.clone(),
                    message,
                });
                continue;
            }
        };

        if !descriptor.kind.is_simple() {
            schema.align_keys(descriptor, &mut coerced);
        }

        let previous = working.insert(descriptor.name.clone(), coerced);
        let trial = serde_json::from_value::<T>(Value::Object(working.clone()));
        let recorded = scope.take_failure();
        match trial {
            Ok(next) => instance = next,
            Err(err) => {
                // A failure that an untagged enum recovered from comes back
                // as a different error.
                let fatal = recorded.filter(|fatal| fatal.to_string() == err.to_string());
                if let Some(fatal) = fatal {
                    return Err(CoercionError::UnresolvedInterface(fatal));
                }
                restore(&mut working, &descriptor.name, previous);
                warn!(type_name, property = %descriptor.name, error = %err, "skipping property");
                failures.push(PropertyFailure {
                    property: descriptor.name.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(Coerced { instance, failures })
}

fn restore(working: &mut Map<String, Value>, name: &str, previous: Option<Value>) {
    match previous {
        Some(previous) => {
            working.insert(name.to_string(), previous);
        }
        None => {
            working.remove(name);
        }
    }
}

/// Converts one raw value into the JSON form `descriptor` expects.
pub(crate) fn coerce_value(
    descriptor: &PropertyDescriptor,
    raw: &PropValue,
) -> Result<Value, String> {
    let kind = &descriptor.kind;
    if kind.is_nullable() {
        match raw {
            PropValue::Json(Value::Null) => return Ok(Value::Null),
            // An empty form field clears anything but text.
            PropValue::Text(text)
                if text.trim().is_empty()
                    && kind.non_null() != &PropertyKind::Primitive(Primitive::Text) =>
            {
                return Ok(Value::Null);
            }
            _ => {}
        }
    }

    match kind.non_null() {
        PropertyKind::Enum => {
            coerce_enum(descriptor.enum_choices.as_deref().unwrap_or_default(), raw)
        }
        PropertyKind::Primitive(primitive) => coerce_primitive(*primitive, raw),
        PropertyKind::Collection { .. } | PropertyKind::Complex | PropertyKind::Nullable(_) => {
            coerce_structured(descriptor.interface.is_some(), raw)
        }
    }
}

fn coerce_enum(choices: &[String], raw: &PropValue) -> Result<Value, String> {
    let index = match raw {
        PropValue::Text(text) | PropValue::Json(Value::String(text)) => {
            let text = text.trim();
            if let Some(choice) = choices.iter().find(|choice| keys_match(choice, text)) {
                return Ok(Value::String(choice.clone()));
            }
            text.parse::<usize>().ok()
        }
        PropValue::Json(Value::Number(number)) => {
            number.as_u64().and_then(|index| usize::try_from(index).ok())
        }
        PropValue::Json(_) => None,
    };

    index
        .and_then(|index| choices.get(index))
        .map(|choice| Value::String(choice.clone()))
        .ok_or_else(|| {
            format!(
                "'{}' is not one of [{}]",
                display(raw),
                choices.join(", ")
            )
        })
}

fn coerce_primitive(primitive: Primitive, raw: &PropValue) -> Result<Value, String> {
    match primitive {
        Primitive::Text => Ok(Value::String(match raw {
            PropValue::Text(text) | PropValue::Json(Value::String(text)) => text.clone(),
            PropValue::Json(Value::Null) => String::new(),
            PropValue::Json(other) => other.to_string(),
        })),
        Primitive::Boolean => match raw {
            PropValue::Text(text) | PropValue::Json(Value::String(text)) => parse_bool(text),
            PropValue::Json(Value::Bool(flag)) => Ok(Value::Bool(*flag)),
            PropValue::Json(Value::Number(number)) => {
                Ok(Value::Bool(number.as_f64().is_some_and(|n| n != 0.0)))
            }
            PropValue::Json(Value::Null) => Ok(Value::Bool(false)),
            PropValue::Json(other) => Err(format!("{other} is not a boolean")),
        },
        Primitive::Integer => match raw {
            PropValue::Text(text) | PropValue::Json(Value::String(text)) => parse_integer(text),
            PropValue::Json(Value::Number(number)) if number.is_i64() || number.is_u64() => {
                Ok(Value::Number(number.clone()))
            }
            PropValue::Json(Value::Number(number)) => {
                number
                    .as_f64()
                    .and_then(round_to_integer)
                    .ok_or_else(|| format!("{number} is not an integer"))
            }
            PropValue::Json(Value::Bool(flag)) => Ok(json!(i64::from(*flag))),
            PropValue::Json(Value::Null) => Ok(json!(0)),
            PropValue::Json(other) => Err(format!("{other} is not an integer")),
        },
        Primitive::Number => match raw {
            PropValue::Text(text) | PropValue::Json(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("'{text}' is not a number")),
            PropValue::Json(Value::Number(number)) => Ok(Value::Number(number.clone())),
            PropValue::Json(Value::Bool(flag)) => Ok(json!(if *flag { 1.0 } else { 0.0 })),
            PropValue::Json(Value::Null) => Ok(json!(0.0)),
            PropValue::Json(other) => Err(format!("{other} is not a number")),
        },
        Primitive::DateTime => match raw {
            PropValue::Text(text) | PropValue::Json(Value::String(text)) => {
                Ok(Value::String(text.trim().to_string()))
            }
            PropValue::Json(other) => Err(format!("{other} is not a date or time")),
        },
    }
}

fn coerce_structured(interface: bool, raw: &PropValue) -> Result<Value, String> {
    match raw {
        PropValue::Text(text) => {
            let parsed = serde_json::from_str::<Value>(text);
            if interface {
                // Interface targets such as markup accept plain strings.
                return Ok(match parsed {
                    Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
                    _ => Value::String(text.clone()),
                });
            }
            parsed.map_err(|err| format!("invalid JSON: {err}"))
        }
        PropValue::Json(Value::String(text)) if !interface => {
            let parsed = serde_json::from_str::<Value>(text);
            Ok(parsed.unwrap_or_else(|_| Value::String(text.clone())))
        }
        PropValue::Json(value) => Ok(value.clone()),
    }
}

fn parse_bool(text: &str) -> Result<Value, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    text.parse::<f64>()
        .map(|n| Value::Bool(n != 0.0))
        .map_err(|_| format!("'{text}' is not a boolean"))
}

fn parse_integer(text: &str) -> Result<Value, String> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Ok(json!(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Ok(json!(n));
    }
    text.parse::<f64>()
        .ok()
        .and_then(round_to_integer)
        .ok_or_else(|| format!("'{text}' is not an integer"))
}

fn round_to_integer(n: f64) -> Option<Value> {
    const LIMIT: f64 = 9_223_372_036_854_775_807.0;
    let rounded = n.round_ties_even();
    if rounded.is_finite() && rounded.abs() < LIMIT {
        Some(json!(rounded as i64))
    } else {
        None
    }
}

fn display(raw: &PropValue) -> String {
    match raw {
        PropValue::Text(text) | PropValue::Json(Value::String(text)) => text.clone(),
        PropValue::Json(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CollectionShape;

    fn descriptor(kind: PropertyKind) -> PropertyDescriptor {
        PropertyDescriptor {
            name: "value".to_string(),
            kind,
            default_value: Value::Null,
            enum_choices: None,
            display_name: "Value".to_string(),
            description: None,
            interface: None,
            read_only: false,
            write_only: false,
            schema: Value::Null,
        }
    }

    fn primitive(primitive: Primitive) -> PropertyDescriptor {
        descriptor(PropertyKind::Primitive(primitive))
    }

    fn variant() -> PropertyDescriptor {
        PropertyDescriptor {
            enum_choices: Some(vec!["primary".to_string(), "secondary".to_string()]),
            ..descriptor(PropertyKind::Enum)
        }
    }

    #[test]
    fn enum_names_ignore_case() {
        assert_eq!(coerce_value(&variant(), &"SECONDARY".into()), Ok(json!("secondary")));
        assert_eq!(coerce_value(&variant(), &json!("Primary").into()), Ok(json!("primary")));
    }

    #[test]
    fn enum_integers_select_by_position() {
        assert_eq!(coerce_value(&variant(), &json!(1).into()), Ok(json!("secondary")));
        assert_eq!(coerce_value(&variant(), &"0".into()), Ok(json!("primary")));
        assert!(coerce_value(&variant(), &json!(2).into()).is_err());
        assert!(coerce_value(&variant(), &"tertiary".into()).is_err());
    }

    #[test]
    fn booleans_accept_words_and_numbers() {
        let flag = primitive(Primitive::Boolean);
        assert_eq!(coerce_value(&flag, &"TRUE".into()), Ok(json!(true)));
        assert_eq!(coerce_value(&flag, &"false".into()), Ok(json!(false)));
        assert_eq!(coerce_value(&flag, &"1".into()), Ok(json!(true)));
        assert_eq!(coerce_value(&flag, &json!(0).into()), Ok(json!(false)));
        assert!(coerce_value(&flag, &"maybe".into()).is_err());
    }

    #[test]
    fn integers_round_half_to_even() {
        let count = primitive(Primitive::Integer);
        assert_eq!(coerce_value(&count, &"42".into()), Ok(json!(42)));
        assert_eq!(coerce_value(&count, &" -7 ".into()), Ok(json!(-7)));
        assert_eq!(coerce_value(&count, &"2.5".into()), Ok(json!(2)));
        assert_eq!(coerce_value(&count, &json!(3.5).into()), Ok(json!(4)));
        assert_eq!(coerce_value(&count, &json!(true).into()), Ok(json!(1)));
        assert!(coerce_value(&count, &"many".into()).is_err());
    }

    #[test]
    fn text_renders_other_values() {
        let label = primitive(Primitive::Text);
        assert_eq!(coerce_value(&label, &json!(12).into()), Ok(json!("12")));
        assert_eq!(coerce_value(&label, &json!(null).into()), Ok(json!("")));
        assert_eq!(coerce_value(&label, &json!([1, 2]).into()), Ok(json!("[1,2]")));
    }

    #[test]
    fn empty_form_text_clears_nullable_values() {
        let optional = descriptor(PropertyKind::Nullable(Box::new(PropertyKind::Primitive(
            Primitive::Integer,
        ))));
        assert_eq!(coerce_value(&optional, &"".into()), Ok(Value::Null));

        let optional_text = descriptor(PropertyKind::Nullable(Box::new(PropertyKind::Primitive(
            Primitive::Text,
        ))));
        assert_eq!(coerce_value(&optional_text, &"".into()), Ok(json!("")));
    }

    #[test]
    fn structured_text_is_parsed_as_json() {
        let tags = descriptor(PropertyKind::Collection {
            shape: CollectionShape::List,
            item: Box::new(PropertyKind::Primitive(Primitive::Text)),
        });
        assert_eq!(coerce_value(&tags, &r#"["a","b"]"#.into()), Ok(json!(["a", "b"])));
        assert!(coerce_value(&tags, &"[not json".into()).is_err());
    }

    #[test]
    fn interface_text_passes_through() {
        let content = PropertyDescriptor {
            interface: Some("showcase::html::IHtmlContent".to_string()),
            ..descriptor(PropertyKind::Complex)
        };
        assert_eq!(coerce_value(&content, &"<b>hi</b>".into()), Ok(json!("<b>hi</b>")));
        assert_eq!(coerce_value(&content, &"42".into()), Ok(json!("42")));
        assert_eq!(
            coerce_value(&content, &r#"{"kind":"x"}"#.into()),
            Ok(json!({ "kind": "x" }))
        );
    }
}
