//! Property metadata extraction and value coercion.
//!
//! A props type is any `Serialize + Deserialize + JsonSchema + Default`
//! struct. [`PropsSchema`] reads its JSON Schema into sorted
//! [`PropertyDescriptor`]s with defaults, enum choices, and display names.
//! [`create_instance`] turns a [`PropertyValueMap`] of form text or JSON
//! nodes into a typed instance, skipping properties that do not convert.
//!
//! ```
//! use schemars::JsonSchema;
//! use serde::{Deserialize, Serialize};
//! use showcase_props::{PropertyValueMap, PropsSchema, create_instance};
//! use showcase_resolve::TypeResolver;
//!
//! #[derive(Serialize, Deserialize, JsonSchema)]
//! #[serde(default)]
//! struct ButtonProps {
//!     text: String,
//!     disabled: bool,
//! }
//!
//! impl Default for ButtonProps {
//!     fn default() -> Self {
//!         Self { text: "Click me".to_string(), disabled: false }
//!     }
//! }
//!
//! let schema = PropsSchema::of::<ButtonProps>().unwrap();
//! let values = PropertyValueMap::new().with("Text", "Save");
//! let built = create_instance::<ButtonProps>(&schema, &values, &TypeResolver::new()).unwrap();
//! assert_eq!(built.instance.text, "Save");
//! assert!(!built.instance.disabled);
//! ```

mod coerce;
mod descriptor;
mod error;
mod schema;
mod schema_type;
mod value;

pub use coerce::{Coerced, create_instance};
pub use descriptor::{
    CollectionShape, Primitive, PropertyDescriptor, PropertyKind, display_name_for,
};
pub use error::{CoercionError, PropertyFailure, SchemaError};
pub use schema::{DISPLAY_NAME_KEYWORD, INTERFACE_KEYWORD, PropsSchema};
pub use schema_type::{Props, PropsInstance, SchemaType};
pub use value::{PropValue, PropertyValueMap};
