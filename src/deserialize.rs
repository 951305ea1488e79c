//! The recursive deserialization engine.
//!
//! Mirrors the serialize dispatch: a tagged map becomes a fresh instance
//! resolved through the type registry, sequences deserialize element-wise,
//! plain mappings value-wise, callable-tagged maps go through the callable
//! codec, and everything else is assigned as a scalar. A failure on any
//! nested field is caught at the boundary and re-wrapped naming the field,
//! so the top-level caller can diagnose exactly where in the tree it
//! originated.

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::trace;

use crate::callable::{deserialize_callable, CALLABLE_TAG, LAMBDA_EXPRESSION_TAG};
use crate::error::{SeriluxError, SeriluxResult};
use crate::fields::FieldPayload;
use crate::registry::SerializableRegistry;
use crate::serializable::Serializable;

/// Populates an existing instance from a tagged map.
///
/// Keys that are not declared fields of the target are ignored when
/// `strict` is false (forward-compatible reads) and rejected with
/// [`SeriluxError::UnknownField`] when `strict` is true. The unknown-key
/// scan runs before any field is written, so strict mode never leaves a
/// partially populated target behind.
pub fn deserialize(
	obj: &mut dyn Serializable,
	data: &JsonMap<String, JsonValue>,
	strict: bool,
) -> SeriluxResult<()> {
	trace!(type_name = obj.type_name(), strict, "deserializing object");

	if strict {
		for key in data.keys() {
			if key != "_type" && !obj.fields_to_serialize().contains(key) {
				return Err(SeriluxError::UnknownField {
					field_name: key.clone(),
					obj_type: obj.type_name().to_string(),
				});
			}
		}
	}

	for (key, value) in data {
		if key == "_type" || !obj.fields_to_serialize().contains(key) {
			continue;
		}
		let payload = build_payload(value)
			.map_err(|e| e.wrap_field(obj.type_name(), key, "deserialize"))?;
		obj.set_field(key, payload)
			.map_err(|e| e.wrap_field(obj.type_name(), key, "deserialize"))?;
	}

	Ok(())
}

/// Deserializes a tagged map of unknown type into a fresh instance.
///
/// Reads `_type`, resolves it through the type registry (failing with
/// [`SeriluxError::ClassNotFound`] naming the offending type), constructs a
/// bare instance, and populates its fields. A failed deserialize never
/// hands out the partially built instance, so nothing half-populated can
/// end up in the object registry.
pub fn deserialize_item(data: &JsonMap<String, JsonValue>) -> SeriluxResult<Box<dyn Serializable>> {
	let type_name = data
		.get("_type")
		.and_then(JsonValue::as_str)
		.ok_or_else(|| SeriluxError::deserialization("item is missing the '_type' tag"))?;

	let mut obj = SerializableRegistry::new().construct(type_name)?;
	deserialize(obj.as_mut(), data, false)?;
	Ok(obj)
}

/// Classifies a stored value by shape and rebuilds the corresponding
/// payload, recursing into nested tagged maps.
fn build_payload(value: &JsonValue) -> SeriluxResult<FieldPayload> {
	match value {
		JsonValue::Object(map) => match map.get("_type").and_then(JsonValue::as_str) {
			Some(CALLABLE_TAG) | Some(LAMBDA_EXPRESSION_TAG) => {
				match deserialize_callable(map)? {
					Some(callable) => Ok(FieldPayload::Callable(callable)),
					// unrecognized callable tags degrade to null
					None => Ok(FieldPayload::Scalar(JsonValue::Null)),
				}
			}
			Some(_) => Ok(FieldPayload::Node(deserialize_item(map)?)),
			None => {
				let mut entries = Vec::with_capacity(map.len());
				for (key, nested) in map {
					entries.push((key.clone(), build_payload(nested)?));
				}
				Ok(FieldPayload::Map(entries))
			}
		},
		JsonValue::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(build_payload(item)?);
			}
			Ok(FieldPayload::Seq(out))
		}
		scalar => Ok(FieldPayload::Scalar(scalar.clone())),
	}
}
