//! The recursive serialization engine.
//!
//! Turns a [`Serializable`] node into a tagged map: `_type` plus one entry
//! per declared field, dispatching on the shape of each value. Nested nodes
//! are identity-checked against the visited set and recursed into with the
//! depth check ahead of the recursion; sequences serialize positionally and
//! mappings value-wise; callables go through the callable codec and degrade
//! to null when they cannot be serialized.

use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tracing::trace;

use crate::callable::serialize_callable_with_fallback;
use crate::error::SeriluxResult;
use crate::fields::FieldView;
use crate::recursive::{SerializationContext, DEFAULT_MAX_DEPTH};
use crate::serializable::Serializable;

/// Serializes an object graph to a tagged map with the default depth limit.
pub fn serialize(root: &dyn Serializable) -> SeriluxResult<JsonMap<String, JsonValue>> {
	serialize_with_depth(root, DEFAULT_MAX_DEPTH)
}

/// Serializes an object graph with an explicit depth limit.
pub fn serialize_with_depth(
	root: &dyn Serializable,
	max_depth: usize,
) -> SeriluxResult<JsonMap<String, JsonValue>> {
	trace!(type_name = root.type_name(), max_depth, "serializing object graph");
	let mut ctx = SerializationContext::new(max_depth);
	serialize_node(root, &mut ctx)
}

/// Serializes one node: `_type` plus every declared field.
pub(crate) fn serialize_node(
	obj: &dyn Serializable,
	ctx: &mut SerializationContext,
) -> SeriluxResult<JsonMap<String, JsonValue>> {
	ctx.visit(obj)?;

	let mut map = JsonMap::new();
	map.insert("_type".to_string(), json!(obj.type_name()));

	for name in obj.fields_to_serialize().iter() {
		let value = match obj.field(name) {
			// a declared field holding no value serializes as null
			None => JsonValue::Null,
			Some(view) => serialize_value(view, ctx)
				.map_err(|e| e.wrap_field(obj.type_name(), name, "serialize"))?,
		};
		map.insert(name.to_string(), value);
	}

	ctx.leave(obj);
	Ok(map)
}

/// Serializes a single field value, dispatching on its shape.
fn serialize_value(view: FieldView<'_>, ctx: &mut SerializationContext) -> SeriluxResult<JsonValue> {
	match view {
		FieldView::Scalar(value) => Ok(value),
		FieldView::Node(node) => {
			// depth check precedes the recursion it guards
			ctx.descend()?;
			let nested = serialize_node(node, ctx)?;
			ctx.ascend();
			Ok(JsonValue::Object(nested))
		}
		FieldView::Seq(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(serialize_value(item, ctx)?);
			}
			Ok(JsonValue::Array(out))
		}
		FieldView::Map(entries) => {
			let mut out = JsonMap::new();
			for (key, value) in entries {
				let serialized = serialize_value(value, ctx)?;
				out.insert(key, serialized);
			}
			Ok(JsonValue::Object(out))
		}
		FieldView::Callable(callable) => {
			// a callable that cannot be serialized degrades the field to null
			Ok(serialize_callable_with_fallback(Some(callable), true)
				.map(JsonValue::Object)
				.unwrap_or(JsonValue::Null))
		}
	}
}
