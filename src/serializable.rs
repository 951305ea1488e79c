//! The `Serializable` trait: the capability every participating type
//! implements so the generic engine can walk it.
//!
//! Instead of runtime reflection, each type exposes an explicit field
//! descriptor surface: its registered type name, its declared [`FieldSet`],
//! and accessors that map field names to value shapes. The engine drives
//! those accessors recursively; implementors never deal with depth, cycles,
//! or the tagged-map format themselves.

use std::any::Any;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::SeriluxResult;
use crate::fields::{FieldPayload, FieldSet, FieldView};
use crate::recursive::DEFAULT_MAX_DEPTH;

/// A node in a serializable object graph.
///
/// Implementors declare which fields participate through a [`FieldSet`] and
/// expose per-field accessors. The blanket [`SerializableExt`] impl adds the
/// `serialize`/`deserialize` entry points on top.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use serilux::{
///     register_serializable, FieldPayload, FieldSet, FieldView, Serializable,
///     SerializableExt, SeriluxResult, TypeEntry,
/// };
///
/// #[derive(Default)]
/// struct Address {
///     street: String,
///     fields: FieldSet,
/// }
///
/// impl Address {
///     fn new() -> Self {
///         Self {
///             street: String::new(),
///             fields: FieldSet::from_names(&["street"]).unwrap(),
///         }
///     }
/// }
///
/// impl Serializable for Address {
///     fn type_name(&self) -> &'static str {
///         "Address"
///     }
///
///     fn fields_to_serialize(&self) -> &FieldSet {
///         &self.fields
///     }
///
///     fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
///         &mut self.fields
///     }
///
///     fn field(&self, name: &str) -> Option<FieldView<'_>> {
///         match name {
///             "street" => Some(FieldView::Scalar(json!(self.street))),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, name: &str, value: FieldPayload) -> SeriluxResult<()> {
///         if name == "street" {
///             if let Some(street) = value.as_str() {
///                 self.street = street.to_string();
///             }
///         }
///         Ok(())
///     }
///
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
///         self
///     }
///
///     fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
///         self
///     }
/// }
///
/// let _ = register_serializable(TypeEntry::new("Address", || Box::new(Address::new())));
///
/// let mut address = Address::new();
/// address.street = "1 Main St".to_string();
/// let data = address.serialize().unwrap();
/// assert_eq!(data["_type"], json!("Address"));
/// assert_eq!(data["street"], json!("1 Main St"));
/// ```
pub trait Serializable {
	/// The registered type name emitted as the `_type` tag.
	fn type_name(&self) -> &'static str;

	/// The declared fields participating in serialization.
	fn fields_to_serialize(&self) -> &FieldSet;

	/// Mutable access to the declared-field set.
	fn fields_to_serialize_mut(&mut self) -> &mut FieldSet;

	/// Returns the current value of a declared field, or `None` when the
	/// field holds no value (serialized as null).
	fn field(&self, name: &str) -> Option<FieldView<'_>>;

	/// Stores a deserialized value into a declared field.
	fn set_field(&mut self, name: &str, value: FieldPayload) -> SeriluxResult<()>;

	/// Optional identity used by the object registry.
	fn object_id(&self) -> Option<&str> {
		None
	}

	/// Upcast for downcasting to the concrete type.
	fn as_any(&self) -> &dyn Any;

	/// Mutable upcast for downcasting to the concrete type.
	fn as_any_mut(&mut self) -> &mut dyn Any;

	/// Consuming upcast, used by [`FieldPayload::into_node`].
	fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Serialization entry points, blanket-implemented for every
/// [`Serializable`] type.
pub trait SerializableExt: Serializable + Sized {
	/// Serializes this object to a tagged map with the default depth limit.
	fn serialize(&self) -> SeriluxResult<JsonMap<String, JsonValue>> {
		crate::serialize::serialize(self)
	}

	/// Serializes this object with an explicit depth limit.
	fn serialize_with_depth(&self, max_depth: usize) -> SeriluxResult<JsonMap<String, JsonValue>> {
		crate::serialize::serialize_with_depth(self, max_depth)
	}

	/// Populates this object from a tagged map.
	///
	/// With `strict` set, keys that are not declared fields fail with
	/// [`crate::SeriluxError::UnknownField`]; otherwise they are ignored.
	fn deserialize(
		&mut self,
		data: &JsonMap<String, JsonValue>,
		strict: bool,
	) -> SeriluxResult<()> {
		crate::deserialize::deserialize(self, data, strict)
	}

	/// Adds names to the declared-field set, validating all of them first.
	fn add_serializable_fields(&mut self, names: &[&str]) -> SeriluxResult<()> {
		self.fields_to_serialize_mut().add_fields(names)
	}

	/// Removes names from the declared-field set.
	fn remove_serializable_fields(&mut self, names: &[&str]) -> SeriluxResult<()> {
		self.fields_to_serialize_mut().remove_fields(names)
	}
}

impl<T: Serializable> SerializableExt for T {}

/// Stable identity of a node for cycle detection: the address of its data.
pub(crate) fn node_identity(obj: &dyn Serializable) -> usize {
	obj as *const dyn Serializable as *const u8 as usize
}

/// Default depth limit re-exported where the trait is used.
pub const MAX_SERIALIZE_DEPTH: usize = DEFAULT_MAX_DEPTH;
