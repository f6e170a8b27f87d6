//! Error types for interface resolution.

use thiserror::Error;

/// Errors that can occur while resolving or instantiating an interface type.
///
/// The type is [`Clone`] so the active [`ResolverScope`](crate::ResolverScope)
/// can record a failure while the serde error carrying its message keeps
/// propagating up the deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No built-in entry, explicit binding, or conventionally named type
    /// could be found for the interface.
    #[error("could not resolve a concrete type for interface '{interface}'")]
    Unresolved {
        /// Fully-qualified interface name.
        interface: String,
    },

    /// An explicit binding names a type that is missing, abstract, or does
    /// not implement the interface.
    #[error("invalid binding for interface '{interface}' to '{concrete}': {reason}")]
    InvalidBinding {
        /// Fully-qualified interface name.
        interface: String,
        /// Concrete type named by the binding.
        concrete: String,
        /// Why the binding was rejected.
        reason: String,
    },

    /// The concrete type was found but the JSON value did not deserialize into it.
    #[error("failed to deserialize '{concrete}' for interface '{interface}': {message}")]
    Deserialize {
        /// Fully-qualified interface name.
        interface: String,
        /// Concrete type being deserialized.
        concrete: String,
        /// Underlying deserializer message.
        message: String,
    },

    /// A [`Polymorphic`](crate::Polymorphic) value was deserialized outside of
    /// a [`ResolverScope`](crate::ResolverScope).
    #[error("no type resolver is active on this thread")]
    NoActiveResolver,

    /// A stored factory did not produce the requested interface type.
    #[error("factory registered for '{interface}' has an unexpected signature")]
    FactoryMismatch {
        /// Fully-qualified interface name.
        interface: String,
    },
}

impl ResolveError {
    /// Creates an [`Unresolved`](Self::Unresolved) error.
    pub fn unresolved(interface: impl Into<String>) -> Self {
        Self::Unresolved {
            interface: interface.into(),
        }
    }

    /// Creates an [`InvalidBinding`](Self::InvalidBinding) error.
    pub fn invalid_binding(
        interface: impl Into<String>,
        concrete: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidBinding {
            interface: interface.into(),
            concrete: concrete.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` when this error must abort the enclosing coercion
    /// instead of skipping a single property.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unresolved { .. }
                | Self::InvalidBinding { .. }
                | Self::NoActiveResolver
                | Self::FactoryMismatch { .. }
        )
    }
}
