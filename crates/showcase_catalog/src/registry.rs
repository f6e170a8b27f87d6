//! The component registry and its discovery passes.
//!
//! Modules are registered once at startup. Every discovery call walks the
//! registered modules again, so results always reflect what the loaders
//! return at that moment. Problems with single modules or story types are
//! collected as [`Diagnostic`]s; discovery itself never fails.

use crate::component::ComponentDefinition;
use crate::error::{Diagnostic, DiagnosticKind, ModuleLoadError};
use crate::module::ComponentModule;
use crate::story::{StoryDefinition, StoryProvider};
use hashbrown::{HashMap, HashSet};
use showcase_resolve::TypeModule;
use std::sync::Arc;
use tracing::{debug, warn};

type ModuleLoader = Box<dyn Fn() -> Result<ComponentModule, ModuleLoadError> + Send + Sync>;

enum ModuleEntry {
    Ready(Arc<ComponentModule>),
    Deferred { name: String, load: ModuleLoader },
}

impl ModuleEntry {
    fn name(&self) -> &str {
        match self {
            Self::Ready(module) => module.name(),
            Self::Deferred { name, .. } => name.as_str(),
        }
    }
}

/// Results of a discovery pass plus everything that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Discovered<T> {
    /// What was found.
    pub items: T,
    /// What was skipped, and why.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Discovered<T> {
    fn new(items: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { items, diagnostics }
    }

    /// Drops the diagnostics.
    pub fn into_items(self) -> T {
        self.items
    }

    /// Maps the items, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Discovered<U> {
        Discovered {
            items: f(self.items),
            diagnostics: self.diagnostics,
        }
    }
}

/// Story providers indexed by lowercased component name.
#[derive(Clone, Default)]
pub struct StoryIndex {
    providers: HashMap<String, Arc<dyn StoryProvider>>,
}

impl core::fmt::Debug for StoryIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoryIndex")
            .field("components", &self.component_names())
            .finish()
    }
}

impl StoryIndex {
    /// Returns the provider for a component, ignoring case.
    #[must_use]
    pub fn get(&self, component: &str) -> Option<&Arc<dyn StoryProvider>> {
        self.providers.get(&component.to_lowercase())
    }

    /// Lowercased component names, sorted.
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indexed components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if no providers were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Registry of component modules.
///
/// # Lifecycle
///
/// Register modules with [`register_module`](Self::register_module) or
/// [`register_loader`](Self::register_loader) during setup, then query.
/// Registration order matters: the first module to define a component or
/// a story provider wins.
#[derive(Default)]
pub struct ComponentRegistry {
    modules: Vec<ModuleEntry>,
}

impl core::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("modules", &self.module_names())
            .finish()
    }
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Registers a ready module.
    pub fn register_module(&mut self, module: ComponentModule) -> &mut Self {
        self.modules.push(ModuleEntry::Ready(Arc::new(module)));
        self
    }

    /// Registers a module that is loaded on every discovery pass. A failing
    /// loader skips the module with a [`DiagnosticKind::ModuleUnavailable`].
    pub fn register_loader<F>(&mut self, name: impl Into<String>, load: F) -> &mut Self
    where
        F: Fn() -> Result<ComponentModule, ModuleLoadError> + Send + Sync + 'static,
    {
        self.modules.push(ModuleEntry::Deferred {
            name: name.into(),
            load: Box::new(load),
        });
        self
    }

    /// Names of registered modules, in registration order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(ModuleEntry::name).collect()
    }

    /// Loads every module, skipping dynamic ones and failed loaders.
    #[must_use]
    pub fn load_modules(&self) -> Discovered<Vec<Arc<ComponentModule>>> {
        let mut modules = Vec::with_capacity(self.modules.len());
        let mut diagnostics = Vec::new();

        for entry in &self.modules {
            let module = match entry {
                ModuleEntry::Ready(module) => Arc::clone(module),
                ModuleEntry::Deferred { name, load } => match load() {
                    Ok(module) => Arc::new(module),
                    Err(err) => {
                        warn!(module = %name, error = %err, "skipping module");
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::ModuleUnavailable,
                            name.as_str(),
                            None,
                            err.to_string(),
                        ));
                        continue;
                    }
                },
            };

            if module.is_dynamic() {
                debug!(module = module.name(), "skipping dynamic module");
                continue;
            }
            modules.push(module);
        }

        Discovered::new(modules, diagnostics)
    }

    /// Concrete types of every loaded module, for building a resolver.
    #[must_use]
    pub fn type_modules(&self) -> Discovered<Vec<TypeModule>> {
        self.load_modules().map(|modules| {
            modules
                .iter()
                .map(|module| module.type_module().clone())
                .collect()
        })
    }

    /// Finds every component, ordered by level then name.
    ///
    /// A component is identified by its category and name; later
    /// definitions of the same pair are dropped.
    #[must_use]
    pub fn discover_components(&self) -> Discovered<Vec<ComponentDefinition>> {
        let Discovered {
            items: modules,
            diagnostics,
        } = self.load_modules();

        let mut seen = HashSet::new();
        let mut components = Vec::new();
        for module in &modules {
            for story_type in module.story_types() {
                let Some((name, category)) = ComponentDefinition::identify(story_type) else {
                    continue;
                };
                if !seen.insert((category.to_lowercase(), name.to_lowercase())) {
                    debug!(module = module.name(), component = %name, "duplicate component");
                    continue;
                }

                let schema = module.find_schema(&format!("{name}Props")).cloned();
                components.push(ComponentDefinition::new(name, category, schema, module.name()));
            }
        }

        components.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
        debug!(components = components.len(), "discovered components");
        Discovered::new(components, diagnostics)
    }

    /// Instantiates every story provider and indexes it by lowercased
    /// component name. The first provider for a component wins.
    ///
    /// Providers are keyed on [`StoryProvider::component_name`], so a story
    /// type registered outside a `Components` path is still indexed.
    #[must_use]
    pub fn discover_stories(&self) -> Discovered<StoryIndex> {
        let Discovered {
            items: modules,
            mut diagnostics,
        } = self.load_modules();

        let mut index = StoryIndex::default();
        for module in &modules {
            for story_type in module.story_types() {
                let provider = match story_type.instantiate() {
                    Ok(provider) => provider,
                    Err(err) => {
                        warn!(
                            module = module.name(),
                            story_type = story_type.path(),
                            error = %err,
                            "skipping story type"
                        );
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::StoryUnavailable,
                            module.name(),
                            Some(story_type.path().to_string()),
                            err.to_string(),
                        ));
                        continue;
                    }
                };

                let key = provider.component_name().to_lowercase();
                if index.providers.contains_key(&key) {
                    warn!(
                        module = module.name(),
                        story_type = story_type.path(),
                        component = %key,
                        "duplicate story provider"
                    );
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DuplicateProvider,
                        module.name(),
                        Some(story_type.path().to_string()),
                        format!("component '{key}' already has a story provider"),
                    ));
                    continue;
                }
                index.providers.insert(key, Arc::from(provider));
            }
        }

        debug!(providers = index.len(), "discovered story providers");
        Discovered::new(index, diagnostics)
    }

    /// Stories of one component, ignoring case in the component name.
    /// Repeated story names keep the first.
    #[must_use]
    pub fn stories_for_component(&self, component: &str) -> Discovered<Vec<StoryDefinition>> {
        let Discovered {
            items: index,
            mut diagnostics,
        } = self.discover_stories();

        let Some(provider) = index.get(component) else {
            return Discovered::new(Vec::new(), diagnostics);
        };

        let mut seen = HashSet::new();
        let mut stories = Vec::new();
        for story in provider.stories() {
            if !seen.insert(story.name().to_lowercase()) {
                warn!(component, story = story.name(), "duplicate story");
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateStory,
                    provider.component_name(),
                    Some(story.name().to_string()),
                    format!("story '{}' is defined more than once", story.name()),
                ));
                continue;
            }
            stories.push(story);
        }

        Discovered::new(stories, diagnostics)
    }
}
