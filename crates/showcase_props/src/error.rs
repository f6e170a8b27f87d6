//! Error types for schema extraction and value coercion.

use serde::Serialize;
use showcase_resolve::ResolveError;
use thiserror::Error;

/// Errors raised while reading a props type's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The type does not describe an object with named properties.
    #[error("schema for '{type_name}' does not describe an object")]
    NotAnObject {
        /// Rust type name of the props type.
        type_name: String,
    },

    /// A `$ref` points outside the generated schema.
    #[error("schema for '{type_name}' references unknown definition '{reference}'")]
    UnknownReference {
        /// Rust type name of the props type.
        type_name: String,
        /// The unresolved reference.
        reference: String,
    },
}

/// Errors that abort the creation of a props instance.
///
/// Single-property conversion problems are not errors; they are reported as
/// [`PropertyFailure`]s alongside the instance.
#[derive(Debug, Error)]
pub enum CoercionError {
    /// The raw property document was not valid JSON or not a JSON object.
    #[error("malformed property input: {0}")]
    MalformedInput(String),

    /// An interface-typed property could not be resolved to a concrete type.
    #[error(transparent)]
    UnresolvedInterface(#[from] ResolveError),

    /// The props type's schema could not be read.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The props type's default value does not serialize to a JSON object.
    #[error("default value of '{type_name}' does not serialize to an object")]
    NotAnObject {
        /// Rust type name of the props type.
        type_name: String,
    },

    /// The props type could not be rebuilt from its own default values.
    #[error("failed to instantiate '{type_name}': {message}")]
    Instantiate {
        /// Rust type name of the props type.
        type_name: String,
        /// Underlying deserializer message.
        message: String,
    },

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoercionError {
    /// Creates a [`MalformedInput`](Self::MalformedInput).
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}

/// A property that was skipped while building an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyFailure {
    /// Canonical property name.
    pub property: String,
    /// Why the value was rejected.
    pub message: String,
}

impl core::fmt::Display for PropertyFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}
