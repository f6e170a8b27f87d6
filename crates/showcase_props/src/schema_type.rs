//! Type-erased handles to props types.

use crate::coerce::{Coerced, create_instance};
use crate::descriptor::PropertyDescriptor;
use crate::error::{CoercionError, SchemaError};
use crate::schema::PropsSchema;
use crate::value::PropertyValueMap;
use core::any::Any;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use showcase_resolve::TypeResolver;

/// A type that can be described and built from untyped property values.
///
/// Implemented for every type with the required derives. Use
/// `#[serde(default)]` on the struct so omitted properties fall back to
/// `Default`, which also lets the schema carry each property's default.
pub trait Props: JsonSchema + Serialize + DeserializeOwned + Default + Send + 'static {}

impl<T> Props for T where T: JsonSchema + Serialize + DeserializeOwned + Default + Send + 'static {}

/// A built props value of a type known only at runtime.
pub struct PropsInstance {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
    snapshot: Value,
}

impl core::fmt::Debug for PropsInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropsInstance")
            .field("type_name", &self.type_name)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl PropsInstance {
    /// Wraps a typed value and records its JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn new<T: Props>(value: T) -> Result<Self, serde_json::Error> {
        let snapshot = serde_json::to_value(&value)?;
        Ok(Self {
            type_name: core::any::type_name::<T>(),
            value: Box::new(value),
            snapshot,
        })
    }

    /// Rust type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Takes the wrapped value out as a `T`, handing `self` back on a type
    /// mismatch.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                type_name: self.type_name,
                value,
                snapshot: self.snapshot,
            }),
        }
    }

    /// The value as it serialized when the instance was built.
    #[must_use]
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }
}

type DescribeFn = fn() -> Result<PropsSchema, SchemaError>;
type CreateFn = fn(
    &PropsSchema,
    &PropertyValueMap,
    &TypeResolver,
) -> Result<Coerced<PropsInstance>, CoercionError>;

/// A props type registered by name.
///
/// Carries function pointers into the monomorphized schema and coercion
/// code, so registries can hold props types of any shape.
#[derive(Clone)]
pub struct SchemaType {
    name: String,
    type_name: &'static str,
    describe: DescribeFn,
    create: CreateFn,
}

impl core::fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchemaType")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl SchemaType {
    /// Registers `T` under its short type name (`ButtonProps`).
    #[must_use]
    pub fn of<T: Props>() -> Self {
        Self::named::<T>(short_type_name(core::any::type_name::<T>()))
    }

    /// Registers `T` under an explicit name.
    #[must_use]
    pub fn named<T: Props>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: core::any::type_name::<T>(),
            describe: PropsSchema::of::<T>,
            create: create_erased::<T>,
        }
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full Rust type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Extracts the property schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's schema is not an object schema.
    pub fn schema(&self) -> Result<PropsSchema, SchemaError> {
        (self.describe)()
    }

    /// Readable properties sorted by name.
    ///
    /// # Errors
    ///
    /// See [`SchemaType::schema`].
    pub fn properties(&self) -> Result<Vec<PropertyDescriptor>, SchemaError> {
        self.schema().map(|schema| schema.properties())
    }

    /// Default value of every readable property.
    ///
    /// # Errors
    ///
    /// See [`SchemaType::schema`].
    pub fn default_values(&self) -> Result<PropertyValueMap, SchemaError> {
        self.schema().map(|schema| schema.default_values())
    }

    /// Builds an instance from untyped values.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read or an interface-typed
    /// property cannot be resolved.
    pub fn create_instance(
        &self,
        values: &PropertyValueMap,
        resolver: &TypeResolver,
    ) -> Result<Coerced<PropsInstance>, CoercionError> {
        let schema = self.schema()?;
        (self.create)(&schema, values, resolver)
    }

    /// Builds an instance from a JSON object document.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::MalformedInput`] if `json` is not a JSON
    /// object, otherwise as [`SchemaType::create_instance`].
    pub fn create_instance_from_json(
        &self,
        json: &str,
        resolver: &TypeResolver,
    ) -> Result<Coerced<PropsInstance>, CoercionError> {
        let values = PropertyValueMap::parse_json(json)?;
        self.create_instance(&values, resolver)
    }
}

fn create_erased<T: Props>(
    schema: &PropsSchema,
    values: &PropertyValueMap,
    resolver: &TypeResolver,
) -> Result<Coerced<PropsInstance>, CoercionError> {
    let Coerced { instance, failures } = create_instance::<T>(schema, values, resolver)?;
    Ok(Coerced {
        instance: PropsInstance::new(instance)?,
        failures,
    })
}

/// `app::ui::ButtonProps<T>` -> `ButtonProps`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
    #[serde(default)]
    struct BadgeProps {
        label: String,
        count: u32,
    }

    #[test]
    fn short_names_drop_paths_and_generics() {
        assert_eq!(short_type_name("app::ui::ButtonProps"), "ButtonProps");
        assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn handle_builds_typed_instances() {
        let handle = SchemaType::of::<BadgeProps>();
        assert_eq!(handle.name(), "BadgeProps");

        let values = PropertyValueMap::new().with("label", "New").with("COUNT", "3");
        let built = handle
            .create_instance(&values, &TypeResolver::new())
            .unwrap();
        assert!(built.is_clean());
        assert!(built.instance.is::<BadgeProps>());
        assert_eq!(built.instance.snapshot(), &serde_json::json!({ "label": "New", "count": 3 }));

        let props = built.instance.into_inner::<BadgeProps>().unwrap();
        assert_eq!(props, BadgeProps { label: "New".to_string(), count: 3 });
    }

    #[test]
    fn into_inner_returns_instance_on_mismatch() {
        let instance = PropsInstance::new(BadgeProps::default()).unwrap();
        let instance = instance.into_inner::<String>().unwrap_err();
        assert!(instance.downcast_ref::<BadgeProps>().is_some());
    }
}
