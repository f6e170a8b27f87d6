//! Component definitions produced by discovery.

use crate::level::AtomicLevel;
use crate::module::StoryType;
use showcase_props::SchemaType;

const STORIES_SUFFIX: &str = "Stories";
const COMPONENTS_SEGMENT: &str = "Components";

/// A previewable component.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    /// Component name, e.g. `Button`.
    pub name: String,
    /// Category segment as written in the story type path.
    pub category: String,
    /// Category as an ordered level.
    pub level: AtomicLevel,
    /// Template reference: `Components/{Category}/{Name}/{Name}`.
    pub path: String,
    /// The `{Name}Props` type from the same module, if registered.
    pub schema: Option<SchemaType>,
    /// Sort position derived from the level.
    pub order: u8,
    /// Module the component was discovered in.
    pub module: String,
}

impl ComponentDefinition {
    /// Reads a component from a story type path.
    ///
    /// The last segment must end with `Stories` and some earlier segment
    /// must be `Components` (ignoring case). The segment after it is the
    /// category, or `Unknown` when the story type sits directly under it.
    pub(crate) fn identify(story_type: &StoryType) -> Option<(String, String)> {
        let segments = story_type.segments();
        let (type_name, parents) = segments.split_last()?;
        let name = type_name.strip_suffix(STORIES_SUFFIX)?;
        if name.is_empty() {
            return None;
        }

        let anchor = parents
            .iter()
            .position(|segment| segment.eq_ignore_ascii_case(COMPONENTS_SEGMENT))?;
        let category = parents
            .get(anchor + 1)
            .map_or_else(|| AtomicLevel::Unknown.to_string(), |segment| (*segment).to_string());

        Some((name.to_string(), category))
    }

    pub(crate) fn new(
        name: String,
        category: String,
        schema: Option<SchemaType>,
        module: &str,
    ) -> Self {
        let level = AtomicLevel::from_category(&category);
        Self {
            path: format!("{COMPONENTS_SEGMENT}/{category}/{name}/{name}"),
            order: level.order(),
            level,
            category,
            schema,
            name,
            module: module.to_string(),
        }
    }

    /// Name of the props type this component looks for.
    #[must_use]
    pub fn schema_name(&self) -> String {
        format!("{}Props", self.name)
    }
}
