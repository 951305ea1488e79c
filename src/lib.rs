//! # serilux
//!
//! A serialization framework for user-defined object graphs.
//!
//! Objects are serialized to a self-describing tagged map (a
//! `serde_json::Map` with a reserved `_type` discriminator) and
//! deserialized back into live instances, recovering the concrete type of
//! every node through a process-wide type registry.
//!
//! ## Features
//!
//! - **Tagged-map format**: every serialized node carries a `_type` tag
//!   resolvable through the registry
//! - **Recursive engine**: per-field traversal over nested objects,
//!   sequences, and mappings with depth limiting and cycle detection
//! - **Type registry**: explicit startup registration, duplicate names
//!   rejected, resettable for tests
//! - **Object registry**: identity index for resolving shared and
//!   back-references during deserialization
//! - **Callable codec**: best-effort round-tripping of function-like
//!   values as named references or source expressions
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use serilux::{
//!     deserialize_item, register_serializable, FieldPayload, FieldSet, FieldView,
//!     Serializable, SerializableExt, SeriluxResult, TypeEntry,
//! };
//!
//! struct Task {
//!     title: String,
//!     fields: FieldSet,
//! }
//!
//! impl Task {
//!     fn new() -> Self {
//!         Self {
//!             title: String::new(),
//!             fields: FieldSet::from_names(&["title"]).unwrap(),
//!         }
//!     }
//! }
//!
//! impl Serializable for Task {
//!     fn type_name(&self) -> &'static str {
//!         "Task"
//!     }
//!
//!     fn fields_to_serialize(&self) -> &FieldSet {
//!         &self.fields
//!     }
//!
//!     fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
//!         &mut self.fields
//!     }
//!
//!     fn field(&self, name: &str) -> Option<FieldView<'_>> {
//!         match name {
//!             "title" => Some(FieldView::Scalar(json!(self.title))),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set_field(&mut self, name: &str, value: FieldPayload) -> SeriluxResult<()> {
//!         if name == "title" {
//!             if let Some(title) = value.as_str() {
//!                 self.title = title.to_string();
//!             }
//!         }
//!         Ok(())
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
//!         self
//!     }
//!
//!     fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
//!         self
//!     }
//! }
//!
//! let _ = register_serializable(TypeEntry::new("Task", || Box::new(Task::new())));
//!
//! let mut task = Task::new();
//! task.title = "write docs".to_string();
//!
//! let data = task.serialize().unwrap();
//! assert_eq!(data["_type"], json!("Task"));
//!
//! let restored = deserialize_item(&data).unwrap();
//! let restored = restored.as_any().downcast_ref::<Task>().unwrap();
//! assert_eq!(restored.title, "write docs");
//! ```

pub mod callable;
pub mod deserialize;
pub mod error;
pub mod expression;
pub mod fields;
pub mod object_registry;
pub mod recursive;
pub mod registry;
pub mod serializable;
pub mod serialize;
pub mod validate;

// Core trait and engine entry points
pub use deserialize::{deserialize, deserialize_item};
pub use serializable::{Serializable, SerializableExt, MAX_SERIALIZE_DEPTH};
pub use serialize::{serialize, serialize_with_depth};

// Registries
pub use object_registry::{
	global_object_registry, CustomLookup, ObjectRegistry, SharedSerializable,
};
pub use registry::{register_serializable, Factory, SerializableRegistry, TypeEntry};

// Field declaration and value shapes
pub use fields::{validate_field_name, FieldPayload, FieldSet, FieldView};

// Recursion control
pub use recursive::{SerializationContext, DEFAULT_MAX_DEPTH};

// Callable serialization
pub use callable::{
	clear_callable_registry, deserialize_callable, deserialize_lambda_expression,
	extract_callable_expression, register_callable, register_expression, serialize_callable,
	serialize_callable_with_fallback, CallableFn, CallableValue,
};
pub use expression::validate_expression;

// Validation
pub use validate::{check_serializable_constructability, validate_serializable_tree};

// Errors
pub use error::{CallableKind, ErrorContext, SeriluxError, SeriluxResult};
