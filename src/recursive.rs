//! Depth tracking and circular reference detection for the recursive engine.
//!
//! A [`SerializationContext`] travels down the graph with the engine. It
//! holds the current depth, the configured maximum, and a set of visited
//! node identities (data pointer addresses). The engine marks a node before
//! walking its fields and unmarks it afterwards, so diamonds (the same node
//! reachable twice through different paths) serialize fine while true
//! cycles are reported.

use std::collections::HashSet;

use crate::error::{SeriluxError, SeriluxResult};
use crate::serializable::{node_identity, Serializable};

/// Default maximum recursion depth while walking a nested object graph.
///
/// Generous enough for ordinary nesting but finite: unbounded recursion on
/// accidentally-cyclic or attacker-controlled structures is the primary
/// hazard this guards against.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Per-call state for one serialization pass.
#[derive(Debug, Clone)]
pub struct SerializationContext {
	current_depth: usize,
	max_depth: usize,
	visited: HashSet<usize>,
}

impl SerializationContext {
	/// Creates a context with the given depth limit. The root is depth 0.
	pub fn new(max_depth: usize) -> Self {
		Self {
			current_depth: 0,
			max_depth,
			visited: HashSet::new(),
		}
	}

	/// Current depth (0 = root).
	pub fn current_depth(&self) -> usize {
		self.current_depth
	}

	/// Configured maximum depth.
	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Levels left before the limit.
	pub fn remaining_depth(&self) -> usize {
		self.max_depth.saturating_sub(self.current_depth)
	}

	/// Marks a node as being serialized.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::CircularReference`] if the node is already
	/// on the current path.
	pub fn visit(&mut self, obj: &dyn Serializable) -> SeriluxResult<()> {
		let identity = node_identity(obj);
		if !self.visited.insert(identity) {
			return Err(SeriluxError::CircularReference(format!(
				"object of type '{}' is reachable from itself",
				obj.type_name()
			)));
		}
		Ok(())
	}

	/// Unmarks a node once its fields are fully serialized.
	pub fn leave(&mut self, obj: &dyn Serializable) {
		self.visited.remove(&node_identity(obj));
	}

	/// Steps one level deeper. The check precedes the recursion it guards.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::DepthLimit`] reporting the configured limit
	/// and the depth that would have been reached.
	pub fn descend(&mut self) -> SeriluxResult<()> {
		if self.current_depth + 1 > self.max_depth {
			return Err(SeriluxError::DepthLimit {
				max_depth: self.max_depth,
				current_depth: self.current_depth + 1,
			});
		}
		self.current_depth += 1;
		Ok(())
	}

	/// Steps back up after a nested node is done.
	pub fn ascend(&mut self) {
		self.current_depth = self.current_depth.saturating_sub(1);
	}
}

impl Default for SerializationContext {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_DEPTH)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	use crate::fields::{FieldPayload, FieldSet, FieldView};

	struct Plain {
		fields: FieldSet,
	}

	impl Plain {
		fn new() -> Self {
			Self {
				fields: FieldSet::new(),
			}
		}
	}

	impl Serializable for Plain {
		fn type_name(&self) -> &'static str {
			"recursive_tests.Plain"
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

		fn as_any(&self) -> &dyn std::any::Any {
			self
		}

		fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
			self
		}

		fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
			self
		}
	}

	#[rstest]
	fn test_new_context() {
		let ctx = SerializationContext::new(3);
		assert_eq!(ctx.current_depth(), 0);
		assert_eq!(ctx.max_depth(), 3);
		assert_eq!(ctx.remaining_depth(), 3);
	}

	#[rstest]
	fn test_descend_and_ascend() {
		let mut ctx = SerializationContext::new(2);
		ctx.descend().unwrap();
		ctx.descend().unwrap();
		assert_eq!(ctx.current_depth(), 2);
		assert_eq!(ctx.remaining_depth(), 0);

		let err = ctx.descend().unwrap_err();
		assert!(matches!(
			err,
			SeriluxError::DepthLimit {
				max_depth: 2,
				current_depth: 3
			}
		));

		ctx.ascend();
		assert_eq!(ctx.current_depth(), 1);
		assert!(ctx.descend().is_ok());
	}

	#[rstest]
	fn test_visit_and_leave() {
		let node = Plain::new();
		let mut ctx = SerializationContext::default();

		ctx.visit(&node).unwrap();
		let err = ctx.visit(&node).unwrap_err();
		assert!(matches!(err, SeriluxError::CircularReference(_)));

		ctx.leave(&node);
		assert!(ctx.visit(&node).is_ok());
	}

	#[rstest]
	fn test_distinct_objects_do_not_collide() {
		let a = Plain::new();
		let b = Plain::new();
		let mut ctx = SerializationContext::default();

		ctx.visit(&a).unwrap();
		// same type, different identity
		assert!(ctx.visit(&b).is_ok());
	}

	#[rstest]
	fn test_same_object_through_different_references() {
		let node = Plain::new();
		let alias: &Plain = &node;
		let mut ctx = SerializationContext::default();

		ctx.visit(&node).unwrap();
		assert!(ctx.visit(alias).is_err());
	}
}
