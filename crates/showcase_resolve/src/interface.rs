//! Interface marker trait and the [`Polymorphic`] field wrapper.
//!
//! A props field typed as `Polymorphic<dyn Widget>` holds a boxed trait
//! object. Deserializing it asks the active [`TypeResolver`](crate::TypeResolver)
//! for a concrete type bound to `dyn Widget` and deserializes the JSON value
//! into that type.

use crate::error::ResolveError;
use crate::scope;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::ops::Deref;

/// An abstract property type that must be resolved to a concrete type before
/// it can be deserialized.
///
/// Implemented for trait objects:
///
/// ```
/// use showcase_resolve::Interface;
///
/// pub trait Widget: Send + Sync {
///     fn label(&self) -> String;
/// }
///
/// impl Interface for dyn Widget {
///     const NAME: &'static str = "demo::IWidget";
/// }
/// ```
pub trait Interface: 'static {
    /// Fully-qualified interface name, used for naming-convention lookup and
    /// in error messages.
    const NAME: &'static str;
}

/// A props field holding an interface-typed value.
///
/// Keeps the JSON it was deserialized from so the field can be serialized
/// back without knowing the concrete type.
pub struct Polymorphic<I: Interface + ?Sized> {
    value: Box<I>,
    source: Value,
}

impl<I: Interface + ?Sized> Polymorphic<I> {
    /// Wraps an already-built value together with its JSON form.
    pub fn new(value: Box<I>, source: Value) -> Self {
        Self { value, source }
    }

    /// Returns the JSON the value was built from.
    #[must_use]
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Consumes the wrapper and returns the boxed value.
    #[must_use]
    pub fn into_inner(self) -> Box<I> {
        self.value
    }
}

impl<I: Interface + ?Sized> Deref for Polymorphic<I> {
    type Target = I;

    fn deref(&self) -> &I {
        &self.value
    }
}

impl<I: Interface + ?Sized> core::fmt::Debug for Polymorphic<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Polymorphic")
            .field("interface", &I::NAME)
            .field("source", &self.source)
            .finish()
    }
}

impl<I: Interface + ?Sized> PartialEq for Polymorphic<I> {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl<I: Interface + ?Sized> Serialize for Polymorphic<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source.serialize(serializer)
    }
}

impl<'de, I: Interface + ?Sized> Deserialize<'de> for Polymorphic<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = Value::deserialize(deserializer)?;
        let Some(resolver) = scope::active() else {
            return Err(D::Error::custom(ResolveError::NoActiveResolver));
        };

        match resolver.instantiate::<I>(source.clone()) {
            Ok(value) => Ok(Self { value, source }),
            Err(err) => {
                if err.is_fatal() {
                    scope::record_failure(err.clone());
                }
                Err(D::Error::custom(err))
            }
        }
    }
}

impl<I: Interface + ?Sized> JsonSchema for Polymorphic<I> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed(I::NAME)
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "x-interface": I::NAME,
        })
    }
}
