//! The Showcase builder and the frozen facade it produces.

use crate::config::{AssetLinks, ShowcaseConfig};
use crate::error::PreviewError;
use crate::plugin::{Plugin, PluginId};
use crate::render::TemplateRenderer;
use hashbrown::HashSet;
use showcase_catalog::{
    ComponentDefinition, ComponentModule, ComponentRegistry, Diagnostic, Discovered,
    ModuleLoadError, StoryDefinition,
};
use showcase_props::{
    Coerced, CoercionError, PropertyDescriptor, PropertyFailure, PropertyValueMap, PropsInstance,
    SchemaError, SchemaType,
};
use showcase_resolve::{Interface, TypeResolver, TypeResolverBuilder};
use tracing::{debug, warn};

struct PluginEntry {
    id: PluginId,
    plugin: Box<dyn Plugin>,
}

/// Collects plugins, modules, bindings, and configuration.
///
/// # Example
///
/// ```
/// use showcase_app::{ShowcaseBuilder, ShowcaseConfig};
/// use showcase_catalog::ComponentModule;
///
/// let mut builder = ShowcaseBuilder::new();
/// builder
///     .register_module(ComponentModule::new("app"))
///     .set_config(ShowcaseConfig::new().with_component_library("Acme.Ui"));
/// let showcase = builder.finish();
///
/// assert!(showcase.asset_links().is_some());
/// ```
#[derive(Default)]
pub struct ShowcaseBuilder {
    registry: ComponentRegistry,
    resolver: TypeResolverBuilder,
    config: ShowcaseConfig,
    plugins: Vec<PluginEntry>,
    plugin_ids: HashSet<PluginId>,
}

impl core::fmt::Debug for ShowcaseBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShowcaseBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("plugins", &self.plugin_names())
            .finish_non_exhaustive()
    }
}

impl ShowcaseBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin and runs its `build()` immediately.
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin of the same type was already added.
    #[must_use]
    pub fn add_plugins<P: Plugin>(mut self, plugin: P) -> Self {
        self.add_plugin(plugin);
        self
    }

    /// Adds a plugin in place. See [`add_plugins`](Self::add_plugins).
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin of the same type was already added.
    pub fn add_plugin<P: Plugin>(&mut self, plugin: P) -> &mut Self {
        let id = PluginId::of::<P>();
        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            panic!(
                "Plugin '{}' is unique and was already added.\n\
                 If you intended to add this plugin multiple times, \
                 set `is_unique()` to return `false`.",
                plugin.name()
            );
        }
        self.plugin_ids.insert(id);

        debug!(plugin = plugin.name(), "building plugin");
        plugin.build(self);
        self.plugins.push(PluginEntry {
            id,
            plugin: Box::new(plugin),
        });
        self
    }

    /// Registers a ready component module.
    pub fn register_module(&mut self, module: ComponentModule) -> &mut Self {
        self.registry.register_module(module);
        self
    }

    /// Registers a deferred module loader.
    pub fn register_loader<F>(&mut self, name: impl Into<String>, load: F) -> &mut Self
    where
        F: Fn() -> Result<ComponentModule, ModuleLoadError> + Send + Sync + 'static,
    {
        self.registry.register_loader(name, load);
        self
    }

    /// Binds interface `I` to a concrete type by name.
    ///
    /// # Panics
    ///
    /// Panics if `I` is already bound.
    pub fn bind<I: Interface + ?Sized>(&mut self, concrete: impl Into<String>) -> &mut Self {
        self.resolver = core::mem::take(&mut self.resolver).bind::<I>(concrete);
        self
    }

    /// Binds interface `I` to a factory.
    ///
    /// # Panics
    ///
    /// Panics if `I` is already bound.
    pub fn factory<I, F>(&mut self, concrete: impl Into<String>, factory: F) -> &mut Self
    where
        I: Interface + ?Sized,
        F: Fn(serde_json::Value) -> Result<Box<I>, serde_json::Error> + Send + Sync + 'static,
    {
        self.resolver = core::mem::take(&mut self.resolver).factory::<I, F>(concrete, factory);
        self
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: ShowcaseConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    /// Names of added plugins, in order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|entry| entry.plugin.name()).collect()
    }

    /// Freezes the registry, builds the resolver from the loaded modules,
    /// and runs every plugin's `ready()`.
    #[must_use]
    pub fn finish(self) -> Showcase {
        let Self {
            registry,
            resolver,
            config,
            plugins,
            ..
        } = self;

        let modules = registry.type_modules();
        for diagnostic in &modules.diagnostics {
            warn!(%diagnostic, "module unavailable for interface resolution");
        }
        let resolver = modules
            .items
            .into_iter()
            .fold(resolver, TypeResolverBuilder::module)
            .build();

        let showcase = Showcase {
            registry,
            resolver,
            config,
            plugins,
        };
        for entry in &showcase.plugins {
            entry.plugin.ready(&showcase);
        }
        showcase
    }
}

/// A component preview ready to render.
#[derive(Debug)]
pub struct Preview {
    /// The previewed component.
    pub component: ComponentDefinition,
    /// The story whose presets were applied, if any.
    pub story: Option<StoryDefinition>,
    /// The built props instance.
    pub instance: PropsInstance,
    /// Properties that were skipped.
    pub failures: Vec<PropertyFailure>,
    /// Discovery problems met while composing the preview.
    pub diagnostics: Vec<Diagnostic>,
}

/// The frozen Showcase.
///
/// Every query runs a fresh discovery pass; the only state shared between
/// calls is the resolver's interface cache.
pub struct Showcase {
    registry: ComponentRegistry,
    resolver: TypeResolver,
    config: ShowcaseConfig,
    plugins: Vec<PluginEntry>,
}

impl core::fmt::Debug for Showcase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Showcase")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .field(
                "plugins",
                &self
                    .plugins
                    .iter()
                    .map(|entry| entry.plugin.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Showcase {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ShowcaseBuilder {
        ShowcaseBuilder::new()
    }

    /// Every component, ordered by level then name.
    #[must_use]
    pub fn discover_components(&self) -> Discovered<Vec<ComponentDefinition>> {
        self.registry.discover_components()
    }

    /// Stories of one component, ignoring case in the name.
    #[must_use]
    pub fn discover_stories_for_component(
        &self,
        component: &str,
    ) -> Discovered<Vec<StoryDefinition>> {
        self.registry.stories_for_component(component)
    }

    /// Readable properties of a props type, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's schema is not an object schema.
    pub fn properties(&self, schema: &SchemaType) -> Result<Vec<PropertyDescriptor>, SchemaError> {
        schema.properties()
    }

    /// Default value of every readable property of a props type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's schema is not an object schema.
    pub fn default_values(&self, schema: &SchemaType) -> Result<PropertyValueMap, SchemaError> {
        schema.default_values()
    }

    /// Builds a props instance with this showcase's resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if an interface-typed property cannot be resolved.
    pub fn create_instance(
        &self,
        schema: &SchemaType,
        values: &PropertyValueMap,
    ) -> Result<Coerced<PropsInstance>, CoercionError> {
        schema.create_instance(values, &self.resolver)
    }

    /// Finds a component by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::UnknownComponent`] when nothing matches.
    pub fn component(&self, name: &str) -> Result<ComponentDefinition, PreviewError> {
        self.find_component(name).items
    }

    /// Finds a story of a component by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::UnknownStory`] when the component has no such
    /// story.
    pub fn story(&self, component: &str, story: &str) -> Result<StoryDefinition, PreviewError> {
        self.find_story(component, story).items
    }

    /// Builds a preview of `component`, applying the presets of `story`
    /// and then `overrides`. Overrides win.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown components, stories, or props
    /// types, and the coercion error when an interface cannot be resolved.
    pub fn preview(
        &self,
        component: &str,
        story: Option<&str>,
        overrides: &PropertyValueMap,
    ) -> Result<Preview, PreviewError> {
        let Discovered {
            items: definition,
            mut diagnostics,
        } = self.find_component(component);
        let definition = definition?;

        let (story, mut values) = match story {
            Some(name) => {
                let found = self.find_story(&definition.name, name);
                diagnostics.extend(found.diagnostics);
                let story = found.items?;
                let values = story.values().clone();
                (Some(story), values)
            }
            None => (None, PropertyValueMap::new()),
        };
        values.merge(overrides);

        self.compose(definition, story, &values, diagnostics)
    }

    /// Builds a preview of `component` from a raw JSON object document.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::MalformedInput`] (wrapped) if `json` is not a
    /// JSON object, otherwise as [`Showcase::preview`].
    pub fn preview_json(&self, component: &str, json: &str) -> Result<Preview, PreviewError> {
        let Discovered {
            items: definition,
            diagnostics,
        } = self.find_component(component);
        let definition = definition?;
        let values = PropertyValueMap::parse_json(json)?;

        self.compose(definition, None, &values, diagnostics)
    }

    /// Renders a preview with an external template engine.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Render`] with the renderer's error.
    pub fn render(
        &self,
        preview: &Preview,
        renderer: &dyn TemplateRenderer,
    ) -> Result<String, PreviewError> {
        let template = &preview.component.path;
        renderer
            .render(template, &preview.instance)
            .map_err(|source| PreviewError::Render {
                template: template.clone(),
                source,
            })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    /// Static asset links for the configured component library.
    #[must_use]
    pub fn asset_links(&self) -> Option<AssetLinks> {
        self.config.asset_links()
    }

    /// The interface resolver.
    #[must_use]
    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// The component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns `true` if a plugin of type `P` was added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        let id = PluginId::of::<P>();
        self.plugins.iter().any(|entry| entry.id == id)
    }

    fn find_component(&self, name: &str) -> Discovered<Result<ComponentDefinition, PreviewError>> {
        self.registry.discover_components().map(|components| {
            components
                .into_iter()
                .find(|component| component.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| PreviewError::UnknownComponent(name.to_string()))
        })
    }

    fn find_story(
        &self,
        component: &str,
        story: &str,
    ) -> Discovered<Result<StoryDefinition, PreviewError>> {
        self.registry.stories_for_component(component).map(|stories| {
            stories
                .into_iter()
                .find(|candidate| candidate.name().eq_ignore_ascii_case(story))
                .ok_or_else(|| PreviewError::UnknownStory {
                    component: component.to_string(),
                    story: story.to_string(),
                })
        })
    }

    fn compose(
        &self,
        component: ComponentDefinition,
        story: Option<StoryDefinition>,
        values: &PropertyValueMap,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<Preview, PreviewError> {
        let Some(schema) = &component.schema else {
            return Err(PreviewError::MissingSchema {
                schema: component.schema_name(),
                component: component.name,
            });
        };

        let Coerced { instance, failures } = schema.create_instance(values, &self.resolver)?;
        debug!(
            component = %component.name,
            story = story.as_ref().map(StoryDefinition::name),
            failures = failures.len(),
            "composed preview"
        );

        Ok(Preview {
            component,
            story,
            instance,
            failures,
            diagnostics,
        })
    }
}
