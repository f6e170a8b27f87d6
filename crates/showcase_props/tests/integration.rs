//! Integration tests for the `showcase_props` crate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use showcase_props::{
    CoercionError, CollectionShape, Primitive, PropValue, PropertyKind, PropertyValueMap,
    PropsSchema, SchemaType, create_instance,
};
use showcase_resolve::{
    ConcreteType, HtmlContent, Interface, Polymorphic, ResolveError, TypeModule, TypeResolver,
};
use std::collections::{BTreeMap, BTreeSet};

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
#[serde(default, rename_all = "camelCase")]
struct ButtonProps {
    text: String,
    disabled: bool,
    variant: Variant,
    max_width: Option<u32>,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            text: "Click me".to_string(),
            disabled: false,
            variant: Variant::Primary,
            max_width: None,
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct Padding {
    top: u32,
    left: u32,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct CardProps {
    title: String,
    count: i32,
    tags: Vec<String>,
    ids: BTreeSet<u32>,
    labels: BTreeMap<String, String>,
    padding: Padding,
    #[serde(skip_deserializing)]
    id: String,
    #[serde(skip_serializing)]
    secret: String,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct LayoutProps {
    margins: Vec<Padding>,
    inset: Option<Padding>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct ArticleProps {
    heading: String,
    body: Polymorphic<dyn HtmlContent>,
}

trait Widget: Send + Sync {
    fn label(&self) -> String;
}

impl Interface for dyn Widget {
    const NAME: &'static str = "Namespace.IWidget";
}

#[derive(Deserialize)]
struct Chip {
    text: String,
}

impl Widget for Chip {
    fn label(&self) -> String {
        self.text.clone()
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct SlotProps {
    caption: String,
    slot: Option<Polymorphic<dyn Widget>>,
}

trait Gadget: Send + Sync {}

impl Interface for dyn Gadget {
    const NAME: &'static str = "Namespace.IGadget";
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
enum Slot {
    Gadget(Polymorphic<dyn Gadget>),
    Text(String),
}

impl Default for Slot {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
struct FallbackProps {
    slot: Slot,
    small: u8,
}

fn widget_module() -> TypeModule {
    TypeModule::new("Namespace").with_type(
        ConcreteType::new("Namespace.Widget").implements::<dyn Widget, Chip>(|chip| Box::new(chip)),
    )
}

fn build<T: showcase_props::Props>(values: &PropertyValueMap) -> showcase_props::Coerced<T> {
    let schema = PropsSchema::of::<T>().unwrap();
    create_instance::<T>(&schema, values, &TypeResolver::new()).unwrap()
}

// ─────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────

#[test]
fn properties_are_sorted_with_display_names() {
    let properties = SchemaType::of::<ButtonProps>().properties().unwrap();
    let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["disabled", "maxWidth", "text", "variant"]);

    let labels: Vec<&str> = properties.iter().map(|p| p.display_name.as_str()).collect();
    assert_eq!(labels, vec!["Disabled", "Max Width", "Text", "Variant"]);
}

#[test]
fn button_properties_are_classified() {
    let schema = PropsSchema::of::<ButtonProps>().unwrap();

    assert_eq!(
        schema.find("text").unwrap().kind,
        PropertyKind::Primitive(Primitive::Text)
    );
    assert_eq!(
        schema.find("disabled").unwrap().kind,
        PropertyKind::Primitive(Primitive::Boolean)
    );
    assert_eq!(
        schema.find("maxWidth").unwrap().kind,
        PropertyKind::Nullable(Box::new(PropertyKind::Primitive(Primitive::Integer)))
    );

    let variant = schema.find("variant").unwrap();
    assert_eq!(variant.kind, PropertyKind::Enum);
    assert_eq!(
        variant.enum_choices,
        Some(vec!["primary".to_string(), "secondary".to_string()])
    );
}

#[test]
fn collections_and_nested_types_are_classified() {
    let schema = PropsSchema::of::<CardProps>().unwrap();

    assert_eq!(
        schema.find("tags").unwrap().kind,
        PropertyKind::Collection {
            shape: CollectionShape::List,
            item: Box::new(PropertyKind::Primitive(Primitive::Text)),
        }
    );
    assert_eq!(
        schema.find("ids").unwrap().kind,
        PropertyKind::Collection {
            shape: CollectionShape::Set,
            item: Box::new(PropertyKind::Primitive(Primitive::Integer)),
        }
    );
    assert_eq!(
        schema.find("labels").unwrap().kind,
        PropertyKind::Collection {
            shape: CollectionShape::Map,
            item: Box::new(PropertyKind::Primitive(Primitive::Text)),
        }
    );
    assert_eq!(schema.find("padding").unwrap().kind, PropertyKind::Complex);
}

#[test]
fn read_only_listed_and_write_only_hidden() {
    let schema = PropsSchema::of::<CardProps>().unwrap();
    let names: Vec<String> = schema.properties().into_iter().map(|p| p.name).collect();

    assert!(names.contains(&"id".to_string()));
    assert!(!names.contains(&"secret".to_string()));
    assert!(schema.find("id").unwrap().read_only);
    assert!(schema.find("secret").unwrap().write_only);
}

#[test]
fn default_values_follow_the_default_impl() {
    let defaults = SchemaType::of::<ButtonProps>().default_values().unwrap();

    assert_eq!(defaults.get("text"), Some(&PropValue::Json(json!("Click me"))));
    assert_eq!(defaults.get("disabled"), Some(&PropValue::Json(json!(false))));
    assert_eq!(defaults.get("variant"), Some(&PropValue::Json(json!("primary"))));
    assert_eq!(defaults.get("maxWidth"), Some(&PropValue::Json(json!(null))));
}

#[test]
fn default_values_are_idempotent() {
    let handle = SchemaType::of::<CardProps>();
    assert_eq!(handle.default_values().unwrap(), handle.default_values().unwrap());
}

#[test]
fn interface_properties_carry_their_name() {
    let schema = PropsSchema::of::<SlotProps>().unwrap();
    let slot = schema.find("slot").unwrap();
    assert_eq!(slot.interface.as_deref(), Some("Namespace.IWidget"));
    assert!(slot.kind.is_nullable());
}

// ─────────────────────────────────────────────────────────────────────
// Coercion
// ─────────────────────────────────────────────────────────────────────

#[test]
fn unset_properties_keep_defaults() {
    let values = PropertyValueMap::parse_json(r#"{ "text": "Save" }"#).unwrap();
    let built = build::<ButtonProps>(&values);

    assert!(built.is_clean());
    assert_eq!(
        built.instance,
        ButtonProps {
            text: "Save".to_string(),
            ..ButtonProps::default()
        }
    );
}

#[test]
fn enum_members_match_any_casing() {
    let built = build::<ButtonProps>(&PropertyValueMap::new().with("variant", "SECONDARY"));
    assert_eq!(built.instance.variant, Variant::Secondary);
}

#[test]
fn form_values_are_converted() {
    let values = PropertyValueMap::from_form([
        ("Disabled", "true"),
        ("MAXWIDTH", "320"),
        ("variant", "1"),
    ]);
    let built = build::<ButtonProps>(&values);

    assert!(built.is_clean());
    assert!(built.instance.disabled);
    assert_eq!(built.instance.max_width, Some(320));
    assert_eq!(built.instance.variant, Variant::Secondary);
}

#[test]
fn empty_form_text_clears_optional_values() {
    let values = PropertyValueMap::new()
        .with("maxWidth", json!(100))
        .with("text", "Go");
    let mut built = build::<ButtonProps>(&values);
    assert_eq!(built.instance.max_width, Some(100));

    built = build::<ButtonProps>(&PropertyValueMap::from_form([("maxWidth", "")]));
    assert_eq!(built.instance.max_width, None);
}

#[test]
fn json_text_fills_nested_and_collection_properties() {
    let values = PropertyValueMap::from_form([
        ("padding", r#"{ "top": 4, "left": 2 }"#),
        ("tags", r#"["new", "sale"]"#),
        ("ids", "[3, 1, 3]"),
        ("labels", r#"{ "en": "Hello" }"#),
    ]);
    let built = build::<CardProps>(&values);

    assert!(built.is_clean(), "{:?}", built.failures);
    assert_eq!(built.instance.padding, Padding { top: 4, left: 2 });
    assert_eq!(built.instance.tags, vec!["new", "sale"]);
    assert_eq!(built.instance.ids, BTreeSet::from([1, 3]));
    assert_eq!(built.instance.labels.get("en").map(String::as_str), Some("Hello"));
}

#[test]
fn nested_keys_match_ignoring_case() {
    let values = PropertyValueMap::from_form([
        ("padding", r#"{ "Top": 5, "LEFT": 7 }"#),
        ("labels", r#"{ "EN": "Hello" }"#),
    ]);
    let built = build::<CardProps>(&values);

    assert!(built.is_clean(), "{:?}", built.failures);
    assert_eq!(built.instance.padding, Padding { top: 5, left: 7 });
    assert_eq!(built.instance.labels.get("EN").map(String::as_str), Some("Hello"));
}

#[test]
fn keys_inside_lists_and_optionals_match_ignoring_case() {
    let values = PropertyValueMap::new()
        .with("margins", json!([{ "TOP": 1 }, { "Left": 2 }]))
        .with("inset", json!({ "top": 3, "Top": 9 }));
    let built = build::<LayoutProps>(&values);

    assert!(built.is_clean(), "{:?}", built.failures);
    assert_eq!(
        built.instance.margins,
        vec![Padding { top: 1, left: 0 }, Padding { top: 0, left: 2 }]
    );
    assert_eq!(built.instance.inset, Some(Padding { top: 3, left: 0 }));
}

#[test]
fn bad_properties_are_skipped_and_reported() {
    let values = PropertyValueMap::new()
        .with("count", "many")
        .with("title", "Kept")
        .with("padding", json!({ "top": "high" }))
        .with("tags", "[broken");
    let built = build::<CardProps>(&values);

    assert_eq!(built.instance.title, "Kept");
    assert_eq!(built.instance.count, 0);
    assert_eq!(built.instance.padding, Padding::default());
    assert!(built.instance.tags.is_empty());

    let failed: Vec<&str> = built.failures.iter().map(|f| f.property.as_str()).collect();
    assert_eq!(failed, vec!["count", "padding", "tags"]);
}

#[test]
fn out_of_range_numbers_are_skipped() {
    let values = PropertyValueMap::new().with("count", json!(5_000_000_000_i64));
    let built = build::<CardProps>(&values);
    assert_eq!(built.instance.count, 0);
    assert_eq!(built.failures.len(), 1);
}

#[test]
fn unknown_and_read_only_keys_are_ignored() {
    let values = PropertyValueMap::new()
        .with("nonsense", "x")
        .with("id", "forged")
        .with("secret", "hunter2");
    let built = build::<CardProps>(&values);

    assert!(built.is_clean());
    assert_eq!(built.instance.id, "");
    assert_eq!(built.instance.secret, "hunter2");
}

#[test]
fn markup_accepts_plain_strings() {
    let values = PropertyValueMap::from_form([("body", "<p>Hi</p>"), ("heading", "News")]);
    let built = build::<ArticleProps>(&values);

    assert!(built.is_clean());
    assert_eq!(built.instance.body.to_html(), "<p>Hi</p>");
    assert_eq!(built.instance.heading, "News");
}

#[test]
fn markup_defaults_to_empty() {
    let built = build::<ArticleProps>(&PropertyValueMap::new());
    assert_eq!(built.instance.body.to_html(), "");
}

#[test]
fn interface_resolves_by_convention() {
    let resolver = TypeResolver::builder().module(widget_module()).build();
    let schema = PropsSchema::of::<SlotProps>().unwrap();
    let values = PropertyValueMap::new().with("slot", json!({ "text": "Chip" }));

    let built = create_instance::<SlotProps>(&schema, &values, &resolver).unwrap();
    assert!(built.is_clean());
    assert_eq!(built.instance.slot.map(|slot| slot.label()), Some("Chip".to_string()));
}

#[test]
fn unresolved_interface_is_fatal() {
    let schema = PropsSchema::of::<SlotProps>().unwrap();
    let values = PropertyValueMap::new()
        .with("caption", "ignored")
        .with("slot", json!({ "text": "Chip" }));

    let err = create_instance::<SlotProps>(&schema, &values, &TypeResolver::new()).unwrap_err();
    match err {
        CoercionError::UnresolvedInterface(ResolveError::Unresolved { interface }) => {
            assert_eq!(interface, "Namespace.IWidget");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn recovered_interface_failures_do_not_abort() {
    let values = PropertyValueMap::new()
        .with("slot", json!("hello"))
        .with("small", json!(300));
    let built = build::<FallbackProps>(&values);

    assert!(matches!(&built.instance.slot, Slot::Text(text) if text == "hello"));
    assert_eq!(built.instance.small, 0);
    let failed: Vec<&str> = built.failures.iter().map(|f| f.property.as_str()).collect();
    assert_eq!(failed, vec!["small"]);
}

#[test]
fn interface_shape_mismatch_is_not_fatal() {
    let resolver = TypeResolver::builder().module(widget_module()).build();
    let schema = PropsSchema::of::<SlotProps>().unwrap();
    let values = PropertyValueMap::new().with("slot", json!({ "text": 7 }));

    let built = create_instance::<SlotProps>(&schema, &values, &resolver).unwrap();
    assert!(built.instance.slot.is_none());
    assert_eq!(built.failures[0].property, "slot");
}

#[test]
fn malformed_documents_are_rejected() {
    let handle = SchemaType::of::<ButtonProps>();
    let resolver = TypeResolver::new();

    for text in ["{ not json", "[1, 2]", "\"text\""] {
        let err = handle.create_instance_from_json(text, &resolver).unwrap_err();
        assert!(matches!(err, CoercionError::MalformedInput(_)), "{text}: {err}");
    }
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn any_casing(word: &'static str) -> impl Strategy<Value = String> {
        prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
            word.chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Enum members are matched regardless of letter casing.
        #[test]
        fn enum_casing_is_ignored(name in any_casing("secondary")) {
            let values = PropertyValueMap::new().with("variant", name.as_str());
            let built = build::<ButtonProps>(&values);
            prop_assert_eq!(built.instance.variant, Variant::Secondary);
        }

        /// Keys match properties regardless of letter casing.
        #[test]
        fn key_casing_is_ignored(key in any_casing("disabled")) {
            let built = build::<ButtonProps>(&PropertyValueMap::new().with(key, "true"));
            prop_assert!(built.instance.disabled);
        }

        /// Coercion never disturbs properties that were not supplied.
        #[test]
        fn untouched_properties_keep_defaults(text in "[a-zA-Z ]{0,16}") {
            let built = build::<ButtonProps>(&PropertyValueMap::new().with("text", text.as_str()));
            prop_assert_eq!(built.instance.text, text);
            prop_assert!(!built.instance.disabled);
            prop_assert_eq!(built.instance.variant, Variant::Primary);
            prop_assert_eq!(built.instance.max_width, None);
        }
    }
}
