//! Integration tests for the `showcase_app` crate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use showcase_app::{
    Plugin, PreviewError, RenderError, Showcase, ShowcaseBuilder, ShowcaseConfig,
};
use showcase_catalog::{ComponentModule, StoryDefinition, StoryProvider};
use showcase_props::{CoercionError, PropValue, PropertyValueMap, PropsInstance};
use showcase_resolve::{HtmlContent, Interface, Polymorphic, ResolveError};

// ─────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Variant {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct ButtonProps {
    text: String,
    disabled: bool,
    variant: Variant,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            text: "Click me".to_string(),
            disabled: false,
            variant: Variant::Primary,
        }
    }
}

#[derive(Default)]
struct ButtonStories;

impl StoryProvider for ButtonStories {
    fn component_name(&self) -> &str {
        "Button"
    }

    fn stories(&self) -> Vec<StoryDefinition> {
        vec![
            StoryDefinition::new("Default"),
            StoryDefinition::new("Secondary")
                .with_value("variant", "secondary")
                .with_value("text", "Cancel"),
        ]
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct CalloutProps {
    body: Polymorphic<dyn HtmlContent>,
    icon: Option<Polymorphic<dyn Icon>>,
}

trait Icon: Send + Sync {
    fn glyph(&self) -> char;
}

impl Interface for dyn Icon {
    const NAME: &'static str = "Design.IIcon";
}

#[derive(Deserialize)]
struct Star {
    filled: bool,
}

impl Icon for Star {
    fn glyph(&self) -> char {
        if self.filled { '*' } else { 'o' }
    }
}

#[derive(Default)]
struct CalloutStories;

impl StoryProvider for CalloutStories {
    fn component_name(&self) -> &str {
        "Callout"
    }

    fn stories(&self) -> Vec<StoryDefinition> {
        vec![StoryDefinition::new("Plain").with_value("body", "<p>Note</p>")]
    }
}

#[derive(Default)]
struct BadgeStories;

impl StoryProvider for BadgeStories {
    fn component_name(&self) -> &str {
        "Badge"
    }

    fn stories(&self) -> Vec<StoryDefinition> {
        Vec::new()
    }
}

struct DesignSystemPlugin;

impl Plugin for DesignSystemPlugin {
    fn build(&self, builder: &mut ShowcaseBuilder) {
        builder.register_module(
            ComponentModule::new("design")
                .with_stories::<CalloutStories>("design::Components::Molecules::CalloutStories")
                .with_stories::<ButtonStories>("design::Components::Atoms::ButtonStories")
                .with_stories::<BadgeStories>("design::Components::Atoms::BadgeStories")
                .with_props::<ButtonProps>()
                .with_props::<CalloutProps>(),
        );
    }
}

fn showcase() -> Showcase {
    ShowcaseBuilder::new().add_plugins(DesignSystemPlugin).finish()
}

fn button(preview: &showcase_app::Preview) -> &ButtonProps {
    preview.instance.downcast_ref::<ButtonProps>().unwrap()
}

// ─────────────────────────────────────────────────────────────────────
// Discovery and metadata
// ─────────────────────────────────────────────────────────────────────

#[test]
fn components_are_discovered_through_plugins() {
    let showcase = showcase();
    let names: Vec<String> = showcase
        .discover_components()
        .items
        .into_iter()
        .map(|component| component.name)
        .collect();
    assert_eq!(names, vec!["Badge", "Button", "Callout"]);
}

#[test]
fn properties_and_defaults_come_from_the_props_type() {
    let showcase = showcase();
    let button = showcase.component("button").unwrap();
    let schema = button.schema.unwrap();

    let names: Vec<String> = showcase
        .properties(&schema)
        .unwrap()
        .into_iter()
        .map(|property| property.name)
        .collect();
    assert_eq!(names, vec!["disabled", "text", "variant"]);

    let defaults = showcase.default_values(&schema).unwrap();
    assert_eq!(defaults.get("text"), Some(&PropValue::Json(json!("Click me"))));
}

#[test]
fn stories_are_listed_per_component() {
    let showcase = showcase();
    let stories = showcase.discover_stories_for_component("BUTTON").items;
    let names: Vec<&str> = stories.iter().map(StoryDefinition::name).collect();
    assert_eq!(names, vec!["Default", "Secondary"]);

    assert!(showcase.story("button", "secondary").is_ok());
    let err = showcase.story("button", "Tertiary").unwrap_err();
    assert!(matches!(err, PreviewError::UnknownStory { .. }));
}

// ─────────────────────────────────────────────────────────────────────
// Previews
// ─────────────────────────────────────────────────────────────────────

#[test]
fn create_instance_uses_the_showcase_resolver() {
    let showcase = showcase();
    let schema = showcase.component("Button").unwrap().schema.unwrap();
    let built = showcase
        .create_instance(&schema, &PropertyValueMap::new().with("text", "Save"))
        .unwrap();

    assert_eq!(
        built.instance.downcast_ref::<ButtonProps>(),
        Some(&ButtonProps {
            text: "Save".to_string(),
            ..ButtonProps::default()
        })
    );
}

#[test]
fn story_presets_apply_and_overrides_win() {
    let showcase = showcase();
    let overrides = PropertyValueMap::from_form([("TEXT", "Dismiss")]);
    let preview = showcase.preview("button", Some("secondary"), &overrides).unwrap();

    assert_eq!(preview.story.as_ref().map(StoryDefinition::name), Some("Secondary"));
    assert_eq!(button(&preview).variant, Variant::Secondary);
    assert_eq!(button(&preview).text, "Dismiss");
    assert!(!button(&preview).disabled);
    assert!(preview.failures.is_empty());
}

#[test]
fn previews_without_story_use_defaults() {
    let preview = showcase()
        .preview("Button", None, &PropertyValueMap::new())
        .unwrap();
    assert_eq!(button(&preview), &ButtonProps::default());
    assert_eq!(preview.component.path, "Components/Atoms/Button/Button");
}

#[test]
fn bad_values_are_reported_not_fatal() {
    let preview = showcase()
        .preview("Button", None, &PropertyValueMap::from_form([("disabled", "perhaps")]))
        .unwrap();
    assert_eq!(preview.failures.len(), 1);
    assert_eq!(preview.failures[0].property, "disabled");
}

#[test]
fn json_previews_reject_malformed_documents() {
    let showcase = showcase();

    let preview = showcase
        .preview_json("button", r#"{ "variant": "SECONDARY" }"#)
        .unwrap();
    assert_eq!(button(&preview).variant, Variant::Secondary);

    let err = showcase.preview_json("button", "{ variant: ").unwrap_err();
    assert!(matches!(err, PreviewError::Coercion(CoercionError::MalformedInput(_))));
}

#[test]
fn missing_components_and_schemas_are_not_found() {
    let showcase = showcase();

    let err = showcase.preview("Slider", None, &PropertyValueMap::new()).unwrap_err();
    assert!(matches!(err, PreviewError::UnknownComponent(ref name) if name == "Slider"));
    assert!(err.is_not_found());

    let err = showcase.preview("Badge", None, &PropertyValueMap::new()).unwrap_err();
    match err {
        PreviewError::MissingSchema { component, schema } => {
            assert_eq!(component, "Badge");
            assert_eq!(schema, "BadgeProps");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn story_markup_renders_as_html() {
    let preview = showcase().preview("callout", Some("plain"), &PropertyValueMap::new()).unwrap();
    let callout = preview.instance.downcast_ref::<CalloutProps>().unwrap();
    assert_eq!(callout.body.to_html(), "<p>Note</p>");
    assert!(callout.icon.is_none());
}

#[test]
fn unresolved_interfaces_fail_the_preview() {
    let overrides = PropertyValueMap::new().with("icon", json!({ "filled": true }));
    let err = showcase().preview("Callout", None, &overrides).unwrap_err();

    match err {
        PreviewError::Coercion(CoercionError::UnresolvedInterface(ResolveError::Unresolved {
            interface,
        })) => assert_eq!(interface, "Design.IIcon"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn bound_interfaces_resolve() {
    let mut builder = ShowcaseBuilder::new().add_plugins(DesignSystemPlugin);
    builder.factory::<dyn Icon, _>("Design.Star", |value| {
        serde_json::from_value::<Star>(value).map(|star| Box::new(star) as Box<dyn Icon>)
    });
    let showcase = builder.finish();

    let overrides = PropertyValueMap::new().with("icon", json!({ "filled": true }));
    let preview = showcase.preview("Callout", None, &overrides).unwrap();
    let callout = preview.instance.downcast_ref::<CalloutProps>().unwrap();
    assert_eq!(callout.icon.as_ref().map(|icon| icon.glyph()), Some('*'));
    assert_eq!(showcase.resolver().concrete_name::<dyn Icon>().unwrap(), "Design.Star");
}

// ─────────────────────────────────────────────────────────────────────
// Rendering, configuration and plugins
// ─────────────────────────────────────────────────────────────────────

#[test]
fn render_passes_template_and_instance() {
    let showcase = showcase();
    let preview = showcase.preview("Button", Some("Secondary"), &PropertyValueMap::new()).unwrap();

    let renderer = |template: &str, instance: &PropsInstance| -> Result<String, RenderError> {
        Ok(format!("{template}:{}", instance.snapshot()["text"]))
    };
    let html = showcase.render(&preview, &renderer).unwrap();
    assert_eq!(html, "Components/Atoms/Button/Button:\"Cancel\"");
}

#[test]
fn render_failures_name_the_template() {
    let showcase = showcase();
    let preview = showcase.preview("Button", None, &PropertyValueMap::new()).unwrap();

    let renderer = |_: &str, _: &PropsInstance| -> Result<String, RenderError> {
        Err("template not found".into())
    };
    let err = showcase.render(&preview, &renderer).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to render 'Components/Atoms/Button/Button': template not found"
    );
}

#[test]
fn asset_links_follow_configuration() {
    assert!(showcase().asset_links().is_none());

    let mut builder = ShowcaseBuilder::new();
    builder.set_config(ShowcaseConfig::new().with_component_library("Acme.Ui"));
    let links = builder.finish().asset_links().unwrap();
    assert_eq!(links.stylesheet, "/_content/Acme.Ui/styles.css");
}

#[test]
#[should_panic(expected = "is unique and was already added")]
fn unique_plugins_cannot_be_added_twice() {
    let _ = ShowcaseBuilder::new()
        .add_plugins(DesignSystemPlugin)
        .add_plugins(DesignSystemPlugin);
}

#[test]
fn ready_runs_after_finish() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPlugin(Arc<AtomicUsize>);

    impl Plugin for CountingPlugin {
        fn build(&self, _builder: &mut ShowcaseBuilder) {}

        fn ready(&self, showcase: &Showcase) {
            self.0.store(showcase.discover_components().items.len(), Ordering::SeqCst);
        }
    }

    let seen = Arc::new(AtomicUsize::new(0));
    let showcase = ShowcaseBuilder::new()
        .add_plugins(DesignSystemPlugin)
        .add_plugins(CountingPlugin(Arc::clone(&seen)))
        .finish();

    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert!(showcase.has_plugin::<CountingPlugin>());
}
