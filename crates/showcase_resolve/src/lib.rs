//! Interface resolution for Showcase.
//!
//! Props types may declare fields whose type is an abstract interface (a trait
//! object). JSON cannot say which concrete type to build, so deserialization
//! goes through a [`TypeResolver`] that maps each interface to a registered
//! concrete type.
//!
//! # Example
//!
//! ```
//! use serde::Deserialize;
//! use showcase_resolve::{ConcreteType, Interface, Polymorphic, TypeModule, TypeResolver};
//!
//! pub trait Widget: Send + Sync {
//!     fn label(&self) -> String;
//! }
//!
//! impl Interface for dyn Widget {
//!     const NAME: &'static str = "demo::IWidget";
//! }
//!
//! #[derive(Deserialize)]
//! struct Chip {
//!     text: String,
//! }
//!
//! impl Widget for Chip {
//!     fn label(&self) -> String {
//!         self.text.clone()
//!     }
//! }
//!
//! let resolver = TypeResolver::builder()
//!     .module(
//!         TypeModule::new("demo").with_type(
//!             ConcreteType::new("demo::Widget").implements::<dyn Widget, Chip>(|c| Box::new(c)),
//!         ),
//!     )
//!     .build();
//!
//! let _scope = resolver.enter();
//! let widget: Polymorphic<dyn Widget> =
//!     serde_json::from_value(serde_json::json!({ "text": "New" })).unwrap();
//! assert_eq!(widget.label(), "New");
//! ```
//!
//! # Architecture
//!
//! - [`Interface`] - marker trait naming an abstract type
//! - [`Polymorphic`] - props field wrapper resolved on deserialization
//! - [`ConcreteType`] / [`TypeModule`] - registered implementations
//! - [`TypeResolver`] - lookup with a shared, never-invalidated cache
//! - [`ResolverScope`] - guard making a resolver active on this thread
//! - [`HtmlContent`] / [`Markup`] - the built-in markup interface

pub mod concrete;
pub mod error;
pub mod interface;
pub mod markup;
pub mod resolver;
pub mod scope;

pub use concrete::{ConcreteType, TypeModule};
pub use error::ResolveError;
pub use interface::{Interface, Polymorphic};
pub use markup::{HtmlContent, Markup};
pub use resolver::{TypeResolver, TypeResolverBuilder, conventional_name};
pub use scope::ResolverScope;
