//! Constructability checks that surface integration problems before any
//! data is serialized.
//!
//! Deserialization builds a bare instance first and populates fields
//! afterwards, so every type reachable through declared fields must be
//! constructible with no arguments. These checks verify that precondition
//! statically, against the declared-field shape of a live object rather
//! than against stored data.

use std::collections::HashSet;

use crate::error::SeriluxResult;
use crate::fields::FieldView;
use crate::registry::SerializableRegistry;
use crate::serializable::{node_identity, Serializable};

/// Checks that a registered type can be built with no arguments.
///
/// # Errors
///
/// Returns [`crate::SeriluxError::ClassNotFound`] when the type is not
/// registered and [`crate::SeriluxError::Validation`] when it is registered
/// without a zero-argument factory.
pub fn check_serializable_constructability(type_name: &str) -> SeriluxResult<()> {
	SerializableRegistry::new()
		.resolve(type_name)?
		.construct()
		.map(drop)
}

/// Walks the declared-field shape of a live object recursively and applies
/// the constructability check to every reachable node type.
///
/// Revisited nodes are skipped rather than reported; cycle detection is the
/// serializer's job, this check only has to terminate.
pub fn validate_serializable_tree(root: &dyn Serializable) -> SeriluxResult<()> {
	let mut seen = HashSet::new();
	validate_node(root, &mut seen)
}

fn validate_node(obj: &dyn Serializable, seen: &mut HashSet<usize>) -> SeriluxResult<()> {
	if !seen.insert(node_identity(obj)) {
		return Ok(());
	}

	check_serializable_constructability(obj.type_name())?;

	for name in obj.fields_to_serialize().iter() {
		if let Some(view) = obj.field(name) {
			validate_view(view, seen)?;
		}
	}
	Ok(())
}

fn validate_view(view: FieldView<'_>, seen: &mut HashSet<usize>) -> SeriluxResult<()> {
	match view {
		FieldView::Node(node) => validate_node(node, seen),
		FieldView::Seq(items) => {
			for item in items {
				validate_view(item, seen)?;
			}
			Ok(())
		}
		FieldView::Map(entries) => {
			for (_, value) in entries {
				validate_view(value, seen)?;
			}
			Ok(())
		}
		FieldView::Scalar(_) | FieldView::Callable(_) => Ok(()),
	}
}
