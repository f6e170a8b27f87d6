//! Interface resolution with a per-resolver cache.
//!
//! Lookup order for an interface `I`:
//!
//! 1. the built-in table (`dyn HtmlContent` -> [`Markup`](crate::Markup)),
//! 2. an explicit factory registered with [`TypeResolverBuilder::factory`],
//! 3. an explicit binding registered with [`TypeResolverBuilder::bind`],
//! 4. the naming convention: `ns::IWidget` -> `ns::Widget`, searching
//!    modules in registration order for a non-abstract type implementing `I`.
//!
//! Successful resolutions are cached for the lifetime of the resolver and
//! shared by all of its clones. Modules are fixed once the resolver is built,
//! so entries are never invalidated. Failures are not cached.

use crate::concrete::{ErasedFactory, Factory, TypeModule};
use crate::error::ResolveError;
use crate::interface::Interface;
use crate::markup::{HtmlContent, Markup, markup_factory};
use crate::scope::ResolverScope;
use core::any::TypeId;
use core::sync::atomic::{AtomicUsize, Ordering};
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
struct Resolved {
    concrete: String,
    factory: ErasedFactory,
}

enum Binding {
    Named(String),
    Factory(Resolved),
}

struct ResolverInner {
    modules: Vec<TypeModule>,
    bindings: HashMap<TypeId, Binding>,
    cache: RwLock<HashMap<TypeId, Resolved>>,
    scans: AtomicUsize,
}

/// Resolves interface types to concrete types during deserialization.
///
/// Cloning is cheap; clones share the cache.
#[derive(Clone)]
pub struct TypeResolver {
    inner: Arc<ResolverInner>,
}

impl core::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeResolver")
            .field(
                "modules",
                &self
                    .inner
                    .modules
                    .iter()
                    .map(TypeModule::name)
                    .collect::<Vec<_>>(),
            )
            .field("bindings", &self.inner.bindings.len())
            .field("cached", &self.cached_count())
            .finish()
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver {
    /// Creates a resolver that only knows the built-in table.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a resolver.
    #[must_use]
    pub fn builder() -> TypeResolverBuilder {
        TypeResolverBuilder::default()
    }

    /// Makes this resolver the active one on the current thread until the
    /// returned guard is dropped.
    pub fn enter(&self) -> ResolverScope {
        ResolverScope::push(self.clone())
    }

    /// Returns the name of the concrete type `I` resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] when nothing matches and
    /// [`ResolveError::InvalidBinding`] when an explicit binding is unusable.
    pub fn concrete_name<I: Interface + ?Sized>(&self) -> Result<String, ResolveError> {
        self.resolve::<I>().map(|resolved| resolved.concrete)
    }

    /// Resolves `I` and deserializes `value` into the concrete type.
    ///
    /// # Errors
    ///
    /// Returns a resolution error, or [`ResolveError::Deserialize`] when the
    /// value does not fit the concrete type.
    pub fn instantiate<I: Interface + ?Sized>(&self, value: Value) -> Result<Box<I>, ResolveError> {
        let resolved = self.resolve::<I>()?;
        let factory = resolved
            .factory
            .downcast_ref::<Factory<I>>()
            .ok_or_else(|| ResolveError::FactoryMismatch {
                interface: I::NAME.to_string(),
            })?;

        factory(value).map_err(|err| ResolveError::Deserialize {
            interface: I::NAME.to_string(),
            concrete: resolved.concrete.clone(),
            message: err.to_string(),
        })
    }

    /// Number of naming-convention scans performed so far.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.inner.scans.load(Ordering::Relaxed)
    }

    /// Number of interfaces currently cached.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.inner.cache.read().len()
    }

    /// Returns the registered modules.
    #[must_use]
    pub fn modules(&self) -> &[TypeModule] {
        &self.inner.modules
    }

    fn resolve<I: Interface + ?Sized>(&self) -> Result<Resolved, ResolveError> {
        let key = TypeId::of::<I>();
        if let Some(hit) = self.inner.cache.read().get(&key) {
            return Ok(hit.clone());
        }

        let resolved = self.lookup::<I>(key)?;
        tracing::debug!(
            interface = I::NAME,
            concrete = %resolved.concrete,
            "resolved interface"
        );

        Ok(self
            .inner
            .cache
            .write()
            .entry(key)
            .or_insert(resolved)
            .clone())
    }

    fn lookup<I: Interface + ?Sized>(&self, key: TypeId) -> Result<Resolved, ResolveError> {
        if let Some(builtin) = builtin(key) {
            return Ok(builtin);
        }

        match self.inner.bindings.get(&key) {
            Some(Binding::Factory(resolved)) => Ok(resolved.clone()),
            Some(Binding::Named(concrete)) => self.lookup_bound::<I>(key, concrete),
            None => self.lookup_conventional::<I>(key),
        }
    }

    fn lookup_bound<I: Interface + ?Sized>(
        &self,
        key: TypeId,
        concrete: &str,
    ) -> Result<Resolved, ResolveError> {
        let ty = self
            .inner
            .modules
            .iter()
            .find_map(|module| module.find(concrete))
            .ok_or_else(|| {
                ResolveError::invalid_binding(I::NAME, concrete, "no such type is registered")
            })?;

        if ty.is_abstract() {
            return Err(ResolveError::invalid_binding(
                I::NAME,
                concrete,
                "type is abstract",
            ));
        }

        let factory = ty.factory_for(key).ok_or_else(|| {
            ResolveError::invalid_binding(
                I::NAME,
                concrete,
                "type does not implement the interface",
            )
        })?;

        Ok(Resolved {
            concrete: concrete.to_string(),
            factory: factory.clone(),
        })
    }

    fn lookup_conventional<I: Interface + ?Sized>(
        &self,
        key: TypeId,
    ) -> Result<Resolved, ResolveError> {
        let candidate =
            conventional_name(I::NAME).ok_or_else(|| ResolveError::unresolved(I::NAME))?;

        self.inner.scans.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(interface = I::NAME, candidate = %candidate, "scanning type modules");

        self.inner
            .modules
            .iter()
            .flat_map(TypeModule::types)
            .filter(|ty| ty.name() == candidate && !ty.is_abstract())
            .find_map(|ty| ty.factory_for(key))
            .map(|factory| Resolved {
                concrete: candidate.clone(),
                factory: factory.clone(),
            })
            .ok_or_else(|| ResolveError::unresolved(I::NAME))
    }
}

fn builtin(key: TypeId) -> Option<Resolved> {
    if key == TypeId::of::<dyn HtmlContent>() {
        return Some(Resolved {
            concrete: Markup::NAME.to_string(),
            factory: Arc::new(markup_factory()),
        });
    }
    None
}

/// Maps an interface name to the concrete name the convention expects:
/// `ns::IWidget` -> `ns::Widget`, `Ns.IWidget` -> `Ns.Widget`.
///
/// Returns `None` when the last segment is not `I` followed by an uppercase
/// letter.
#[must_use]
pub fn conventional_name(interface: &str) -> Option<String> {
    let colons = interface.rfind("::").map(|idx| idx + 2);
    let dot = interface.rfind('.').map(|idx| idx + 1);
    let start = colons.max(dot).unwrap_or(0);

    let (namespace, name) = interface.split_at(start);
    let rest = name.strip_prefix('I')?;
    if !rest.starts_with(|c: char| c.is_uppercase()) {
        return None;
    }

    Some(format!("{namespace}{rest}"))
}

/// Builder for [`TypeResolver`].
#[derive(Default)]
pub struct TypeResolverBuilder {
    modules: Vec<TypeModule>,
    bindings: HashMap<TypeId, Binding>,
}

impl core::fmt::Debug for TypeResolverBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeResolverBuilder")
            .field("modules", &self.modules.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

impl TypeResolverBuilder {
    /// Adds a module to the end of the scan order.
    #[must_use]
    pub fn module(mut self, module: TypeModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Binds `I` to a registered concrete type by name.
    ///
    /// # Panics
    ///
    /// Panics if `I` already has an explicit binding or factory.
    #[must_use]
    pub fn bind<I: Interface + ?Sized>(mut self, concrete: impl Into<String>) -> Self {
        self.insert_binding::<I>(Binding::Named(concrete.into()));
        self
    }

    /// Binds `I` to a factory building values directly from JSON.
    ///
    /// # Panics
    ///
    /// Panics if `I` already has an explicit binding or factory.
    #[must_use]
    pub fn factory<I, F>(mut self, concrete: impl Into<String>, factory: F) -> Self
    where
        I: Interface + ?Sized,
        F: Fn(Value) -> Result<Box<I>, serde_json::Error> + Send + Sync + 'static,
    {
        let factory: Factory<I> = Arc::new(factory);
        self.insert_binding::<I>(Binding::Factory(Resolved {
            concrete: concrete.into(),
            factory: Arc::new(factory),
        }));
        self
    }

    /// Finishes the resolver.
    #[must_use]
    pub fn build(self) -> TypeResolver {
        TypeResolver {
            inner: Arc::new(ResolverInner {
                modules: self.modules,
                bindings: self.bindings,
                cache: RwLock::new(HashMap::new()),
                scans: AtomicUsize::new(0),
            }),
        }
    }

    fn insert_binding<I: Interface + ?Sized>(&mut self, binding: Binding) {
        let key = TypeId::of::<I>();
        assert!(
            !self.bindings.contains_key(&key),
            "Interface '{}' is already bound",
            I::NAME
        );
        self.bindings.insert(key, binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_name_strips_interface_prefix() {
        assert_eq!(
            conventional_name("demo::widgets::IWidget").as_deref(),
            Some("demo::widgets::Widget")
        );
        assert_eq!(
            conventional_name("Namespace.IWidget").as_deref(),
            Some("Namespace.Widget")
        );
        assert_eq!(conventional_name("IWidget").as_deref(), Some("Widget"));
    }

    #[test]
    fn conventional_name_requires_prefix() {
        assert_eq!(conventional_name("demo::Widget"), None);
        assert_eq!(conventional_name("demo::Item"), None);
        assert_eq!(conventional_name("demo::I"), None);
    }

    #[test]
    fn builtin_markup_is_known_without_modules() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.concrete_name::<dyn HtmlContent>().unwrap(),
            Markup::NAME
        );
        assert_eq!(resolver.scan_count(), 0);
    }
}
