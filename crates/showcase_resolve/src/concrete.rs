//! Registered concrete types and the modules that group them.

use crate::interface::Interface;
use core::any::{Any, TypeId};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Builds a boxed interface value from JSON.
pub(crate) type Factory<I> =
    Arc<dyn Fn(Value) -> Result<Box<I>, serde_json::Error> + Send + Sync>;

/// A [`Factory`] with the interface type erased.
pub(crate) type ErasedFactory = Arc<dyn Any + Send + Sync>;

/// A concrete type that can stand in for one or more interfaces.
///
/// # Example
///
/// ```
/// use showcase_resolve::{ConcreteType, Interface};
/// use serde::Deserialize;
///
/// pub trait Widget: Send + Sync {}
/// impl Interface for dyn Widget {
///     const NAME: &'static str = "demo::IWidget";
/// }
///
/// #[derive(Deserialize)]
/// struct Slider { max: u32 }
/// impl Widget for Slider {}
///
/// let slider = ConcreteType::new("demo::Slider")
///     .implements::<dyn Widget, Slider>(|s| Box::new(s));
/// assert!(slider.implements_interface::<dyn Widget>());
/// ```
#[derive(Clone)]
pub struct ConcreteType {
    name: String,
    is_abstract: bool,
    implementations: HashMap<TypeId, ErasedFactory>,
}

impl core::fmt::Debug for ConcreteType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcreteType")
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("implementations", &self.implementations.len())
            .finish()
    }
}

impl ConcreteType {
    /// Creates an instantiable type with the given fully-qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            implementations: HashMap::new(),
        }
    }

    /// Creates a type that is never chosen by resolution.
    pub fn new_abstract(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name)
        }
    }

    /// Declares that this type implements `I`, deserializing as `C` and
    /// boxing through `upcast`.
    #[must_use]
    pub fn implements<I, C>(mut self, upcast: fn(C) -> Box<I>) -> Self
    where
        I: Interface + ?Sized,
        C: DeserializeOwned + 'static,
    {
        let factory: Factory<I> =
            Arc::new(move |value| serde_json::from_value::<C>(value).map(upcast));
        self.implementations
            .insert(TypeId::of::<I>(), Arc::new(factory));
        self
    }

    /// Returns the fully-qualified type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for types that cannot be instantiated.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns whether this type implements `I`.
    #[must_use]
    pub fn implements_interface<I: Interface + ?Sized>(&self) -> bool {
        self.implementations.contains_key(&TypeId::of::<I>())
    }

    pub(crate) fn factory_for(&self, interface: TypeId) -> Option<&ErasedFactory> {
        self.implementations.get(&interface)
    }
}

/// A named group of concrete types, scanned in registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeModule {
    name: String,
    types: Vec<ConcreteType>,
}

impl TypeModule {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Adds a type to the module.
    #[must_use]
    pub fn with_type(mut self, concrete: ConcreteType) -> Self {
        self.types.push(concrete);
        self
    }

    /// Adds a type to the module in place.
    pub fn push(&mut self, concrete: ConcreteType) {
        self.types.push(concrete);
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the registered types.
    #[must_use]
    pub fn types(&self) -> &[ConcreteType] {
        &self.types
    }

    /// Finds a type by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ConcreteType> {
        self.types.iter().find(|ty| ty.name == name)
    }
}
