//! Component modules: the unit of registration.

use crate::error::StoryError;
use crate::story::StoryProvider;
use showcase_props::{Props, SchemaType};
use showcase_resolve::{ConcreteType, TypeModule};
use std::sync::Arc;

type StoryConstructor = Arc<dyn Fn() -> Result<Box<dyn StoryProvider>, StoryError> + Send + Sync>;

/// A story provider type registered under its type path.
#[derive(Clone)]
pub struct StoryType {
    path: String,
    construct: StoryConstructor,
}

impl core::fmt::Debug for StoryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoryType")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl StoryType {
    /// Type path, e.g. `app::Components::Atoms::ButtonStories`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Creates a provider instance.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error.
    pub fn instantiate(&self) -> Result<Box<dyn StoryProvider>, StoryError> {
        (self.construct)()
    }

    /// Splits the path at `::` or `.` separators.
    pub(crate) fn segments(&self) -> Vec<&str> {
        split_path(&self.path)
    }
}

pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split("::")
        .flat_map(|part| part.split('.'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// A named group of story providers, props types, and concrete types,
/// registered with a [`ComponentRegistry`](crate::ComponentRegistry).
///
/// ```
/// use showcase_catalog::{ComponentModule, StoryDefinition, StoryProvider};
///
/// #[derive(Default)]
/// struct ButtonStories;
///
/// impl StoryProvider for ButtonStories {
///     fn component_name(&self) -> &str {
///         "Button"
///     }
///
///     fn stories(&self) -> Vec<StoryDefinition> {
///         vec![StoryDefinition::new("Default")]
///     }
/// }
///
/// let module = ComponentModule::new("app")
///     .with_stories::<ButtonStories>("app::Components::Atoms::ButtonStories");
/// assert_eq!(module.story_types().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ComponentModule {
    name: String,
    dynamic: bool,
    story_types: Vec<StoryType>,
    schemas: Vec<SchemaType>,
    types: TypeModule,
}

impl ComponentModule {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            types: TypeModule::new(name.clone()),
            name,
            dynamic: false,
            story_types: Vec::new(),
            schemas: Vec::new(),
        }
    }

    /// Marks the module as dynamic. Dynamic modules are skipped by
    /// discovery and interface resolution.
    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Registers a default-constructed story provider under `path`.
    #[must_use]
    pub fn with_stories<P>(self, path: impl Into<String>) -> Self
    where
        P: StoryProvider + Default + 'static,
    {
        self.with_stories_from(path, || Ok(Box::new(P::default())))
    }

    /// Registers a story provider built by a fallible constructor.
    #[must_use]
    pub fn with_stories_from<F>(mut self, path: impl Into<String>, construct: F) -> Self
    where
        F: Fn() -> Result<Box<dyn StoryProvider>, StoryError> + Send + Sync + 'static,
    {
        self.story_types.push(StoryType {
            path: path.into(),
            construct: Arc::new(construct),
        });
        self
    }

    /// Registers a props type under its short type name.
    #[must_use]
    pub fn with_props<T: Props>(mut self) -> Self {
        self.schemas.push(SchemaType::of::<T>());
        self
    }

    /// Registers a props type under an explicit name.
    #[must_use]
    pub fn with_props_named<T: Props>(mut self, name: impl Into<String>) -> Self {
        self.schemas.push(SchemaType::named::<T>(name));
        self
    }

    /// Registers a concrete type for interface resolution.
    #[must_use]
    pub fn with_type(mut self, concrete: ConcreteType) -> Self {
        self.types.push(concrete);
        self
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for dynamic modules.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Registered story provider types.
    #[must_use]
    pub fn story_types(&self) -> &[StoryType] {
        &self.story_types
    }

    /// Registered props types.
    #[must_use]
    pub fn schemas(&self) -> &[SchemaType] {
        &self.schemas
    }

    /// Finds a props type by name, ignoring case.
    #[must_use]
    pub fn find_schema(&self, name: &str) -> Option<&SchemaType> {
        self.schemas
            .iter()
            .find(|schema| schema.name().eq_ignore_ascii_case(name))
    }

    /// Concrete types for interface resolution.
    #[must_use]
    pub fn type_module(&self) -> &TypeModule {
        &self.types
    }
}
