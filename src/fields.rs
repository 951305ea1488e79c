//! Declared-field bookkeeping and the value shapes the engine dispatches on.
//!
//! Every serializable type carries a [`FieldSet`]: the ordered set of field
//! names that participate in serialization. The generic engine never looks at
//! a type's struct layout; it asks for a [`FieldView`] per declared field when
//! serializing and hands back a [`FieldPayload`] per stored key when
//! deserializing.

use std::any::Any;

use serde_json::Value as JsonValue;

use crate::callable::CallableValue;
use crate::error::{SeriluxError, SeriluxResult};
use crate::serializable::Serializable;

/// Ordered set of declared field names.
///
/// Insertion order is preserved and duplicates are ignored. Mutation
/// validates every candidate name before touching the set, so an invalid
/// name never leaves a partially applied change behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
	names: Vec<String>,
}

impl FieldSet {
	/// Creates an empty field set.
	pub fn new() -> Self {
		Self { names: Vec::new() }
	}

	/// Creates a field set from the given names.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::InvalidField`] if any name is empty or not a
	/// valid identifier; the set is not created in that case.
	pub fn from_names(names: &[&str]) -> SeriluxResult<Self> {
		let mut set = Self::new();
		set.add_fields(names)?;
		Ok(set)
	}

	/// Adds field names to the set, preserving first-insertion order.
	///
	/// All names are validated before any is inserted.
	pub fn add_fields(&mut self, names: &[&str]) -> SeriluxResult<()> {
		for name in names {
			validate_field_name(name)?;
		}
		for name in names {
			if !self.contains(name) {
				self.names.push((*name).to_string());
			}
		}
		Ok(())
	}

	/// Removes field names from the set. Names not present are ignored.
	///
	/// All names are validated before any is removed.
	pub fn remove_fields(&mut self, names: &[&str]) -> SeriluxResult<()> {
		for name in names {
			validate_field_name(name)?;
		}
		self.names.retain(|existing| !names.contains(&existing.as_str()));
		Ok(())
	}

	/// Returns true if the name is declared.
	pub fn contains(&self, name: &str) -> bool {
		self.names.iter().any(|existing| existing == name)
	}

	/// Iterates declared names in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.names.iter().map(String::as_str)
	}

	/// Number of declared fields.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	/// Returns true if no fields are declared.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

/// Validates a single declared-field name.
///
/// A valid name is non-empty, starts with a letter or underscore, and
/// contains only alphanumerics and underscores.
pub fn validate_field_name(name: &str) -> SeriluxResult<()> {
	let mut chars = name.chars();
	let valid = match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
		}
		_ => false,
	};
	if valid {
		Ok(())
	} else {
		Err(SeriluxError::InvalidField {
			field_name: name.to_string(),
			reason: "field names must be non-empty identifiers".to_string(),
		})
	}
}

/// Borrowed view of a field value, produced during serialization.
///
/// The engine dispatches on the shape: scalars are copied through, nested
/// nodes are recursed into, sequences element-wise, mappings value-wise,
/// and callables are handed to the callable codec.
pub enum FieldView<'a> {
	/// Primitive value (text, number, boolean, null) copied as-is.
	Scalar(JsonValue),
	/// Nested serializable node.
	Node(&'a dyn Serializable),
	/// Ordered sequence, serialized positionally.
	Seq(Vec<FieldView<'a>>),
	/// Mapping, serialized value-wise with keys preserved.
	Map(Vec<(String, FieldView<'a>)>),
	/// Function-like value, delegated to the callable codec.
	Callable(&'a CallableValue),
}

/// Owned field value handed to [`Serializable::set_field`] during
/// deserialization. Mirrors the shapes of [`FieldView`], with nested nodes
/// already constructed and populated by the engine.
pub enum FieldPayload {
	/// Primitive value.
	Scalar(JsonValue),
	/// Fully deserialized nested node; downcast it with [`FieldPayload::into_node`].
	Node(Box<dyn Serializable>),
	/// Ordered sequence of payloads.
	Seq(Vec<FieldPayload>),
	/// Mapping of payloads.
	Map(Vec<(String, FieldPayload)>),
	/// Reconstructed callable value.
	Callable(CallableValue),
}

impl FieldPayload {
	/// Consumes a `Node` payload and downcasts it to a concrete type.
	///
	/// # Errors
	///
	/// Returns a deserialization error if the payload is not a node or the
	/// node is of a different concrete type.
	pub fn into_node<T: Serializable + 'static>(self) -> SeriluxResult<Box<T>> {
		match self {
			FieldPayload::Node(node) => {
				let type_name = node.type_name();
				let any: Box<dyn Any> = node.into_any();
				any.downcast::<T>().map_err(|_| {
					SeriluxError::deserialization(format!(
						"expected a different node type, got '{type_name}'"
					))
				})
			}
			other => Err(SeriluxError::deserialization(format!(
				"expected a nested object, got {}",
				other.shape_name()
			))),
		}
	}

	/// Borrows a scalar payload.
	pub fn as_scalar(&self) -> Option<&JsonValue> {
		match self {
			FieldPayload::Scalar(value) => Some(value),
			_ => None,
		}
	}

	/// Extracts a string scalar.
	pub fn as_str(&self) -> Option<&str> {
		self.as_scalar().and_then(JsonValue::as_str)
	}

	/// Extracts an integer scalar.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_scalar().and_then(JsonValue::as_i64)
	}

	/// Extracts a float scalar.
	pub fn as_f64(&self) -> Option<f64> {
		self.as_scalar().and_then(JsonValue::as_f64)
	}

	/// Extracts a boolean scalar.
	pub fn as_bool(&self) -> Option<bool> {
		self.as_scalar().and_then(JsonValue::as_bool)
	}

	/// Returns true for a scalar null (the absent value).
	pub fn is_null(&self) -> bool {
		matches!(self, FieldPayload::Scalar(JsonValue::Null))
	}

	/// Human-readable shape name, used in error messages.
	pub fn shape_name(&self) -> &'static str {
		match self {
			FieldPayload::Scalar(_) => "a scalar",
			FieldPayload::Node(_) => "a nested object",
			FieldPayload::Seq(_) => "a sequence",
			FieldPayload::Map(_) => "a mapping",
			FieldPayload::Callable(_) => "a callable",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_add_fields_preserves_order() {
		let mut fields = FieldSet::new();
		fields.add_fields(&["name", "value", "name"]).unwrap();
		let names: Vec<&str> = fields.iter().collect();
		assert_eq!(names, vec!["name", "value"]);
	}

	#[rstest]
	fn test_add_invalid_name_mutates_nothing() {
		let mut fields = FieldSet::from_names(&["name"]).unwrap();
		let result = fields.add_fields(&["ok", "123bad"]);
		assert!(matches!(result, Err(SeriluxError::InvalidField { .. })));
		// "ok" must not have been inserted before the failure
		assert_eq!(fields.len(), 1);
		assert!(!fields.contains("ok"));
	}

	#[rstest]
	fn test_remove_fields() {
		let mut fields = FieldSet::from_names(&["name", "value"]).unwrap();
		fields.remove_fields(&["name", "missing"]).unwrap();
		assert_eq!(fields.len(), 1);
		assert!(!fields.contains("name"));
		assert!(fields.contains("value"));
	}

	#[rstest]
	fn test_remove_invalid_name_mutates_nothing() {
		let mut fields = FieldSet::from_names(&["name", "value"]).unwrap();
		let result = fields.remove_fields(&["name", ""]);
		assert!(result.is_err());
		assert!(fields.contains("name"));
	}

	#[rstest]
	#[case("name", true)]
	#[case("_private", true)]
	#[case("field2", true)]
	#[case("", false)]
	#[case("2field", false)]
	#[case("with space", false)]
	#[case("with-dash", false)]
	fn test_validate_field_name(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(validate_field_name(name).is_ok(), expected);
	}

	#[rstest]
	fn test_payload_scalar_accessors() {
		let payload = FieldPayload::Scalar(serde_json::json!(42));
		assert_eq!(payload.as_i64(), Some(42));
		assert_eq!(payload.as_str(), None);
		assert!(!payload.is_null());
	}

	struct Leaf {
		label: String,
		fields: FieldSet,
	}

	impl Leaf {
		fn new(label: &str) -> Self {
			Self {
				label: label.to_string(),
				fields: FieldSet::new(),
			}
		}
	}

	impl Serializable for Leaf {
		fn type_name(&self) -> &'static str {
			"fields_tests.Leaf"
		}

		fn fields_to_serialize(&self) -> &FieldSet {
			&self.fields
		}

		fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
			&mut self.fields
		}

		fn field(&self, _name: &str) -> Option<FieldView<'_>> {
			None
		}

		fn set_field(&mut self, _name: &str, _value: FieldPayload) -> SeriluxResult<()> {
			Ok(())
		}

		fn as_any(&self) -> &dyn Any {
			self
		}

		fn as_any_mut(&mut self) -> &mut dyn Any {
			self
		}

		fn into_any(self: Box<Self>) -> Box<dyn Any> {
			self
		}
	}

	#[rstest]
	fn test_into_node_downcasts_to_concrete_type() {
		let payload = FieldPayload::Node(Box::new(Leaf::new("leaf")));
		let leaf = payload.into_node::<Leaf>().unwrap();
		assert_eq!(leaf.label, "leaf");
	}

	#[rstest]
	fn test_into_node_rejects_non_node_payload() {
		let payload = FieldPayload::Scalar(serde_json::json!(1));
		let err = payload.into_node::<Leaf>().err().unwrap();
		assert!(err.to_string().contains("expected a nested object"));
	}
}
