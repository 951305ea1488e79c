//! Object registry: an identity index used to resolve shared and
//! back-references during deserialization instead of deep-copying.
//!
//! Objects are indexed by bare object id and by `(class name, object id)`.
//! Per-class custom lookup functions act as a fallback when the index
//! misses. The registry is an index, not an owner: entries are shared
//! handles, true ownership stays with the graph that created the object.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

use crate::serializable::Serializable;

/// Shared handle to a registered object.
pub type SharedSerializable = Arc<dyn Serializable + Send + Sync>;

/// Fallback resolution function, receiving `(class_name, object_id)`.
pub type CustomLookup = Arc<dyn Fn(&str, &str) -> Option<SharedSerializable> + Send + Sync>;

#[derive(Default)]
struct Indexes {
	by_id: HashMap<String, SharedSerializable>,
	by_class_and_id: HashMap<(String, String), SharedSerializable>,
	custom_lookups: HashMap<String, CustomLookup>,
}

/// Identity index over live serializable objects.
///
/// Lookups are O(1) amortized; no ordering is guaranteed across entries.
/// Entries are added by [`ObjectRegistry::register`] and removed only by
/// [`ObjectRegistry::clear`].
#[derive(Default)]
pub struct ObjectRegistry {
	inner: RwLock<Indexes>,
}

impl ObjectRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Indexes `obj` under `object_id` and under `(class_name, object_id)`.
	///
	/// Re-registering an id replaces the previous entry.
	pub fn register(&self, obj: SharedSerializable, object_id: &str) {
		let class_name = obj.type_name().to_string();
		trace!(class_name, object_id, "registering object");
		let mut inner = self.inner.write();
		inner.by_id.insert(object_id.to_string(), Arc::clone(&obj));
		inner
			.by_class_and_id
			.insert((class_name, object_id.to_string()), obj);
	}

	/// Looks up an object by bare id.
	pub fn find_by_id(&self, object_id: &str) -> Option<SharedSerializable> {
		self.inner.read().by_id.get(object_id).cloned()
	}

	/// Looks up an object by class name and id, falling back to the
	/// class's custom lookup function when the index misses.
	pub fn find_by_class_and_id(
		&self,
		class_name: &str,
		object_id: &str,
	) -> Option<SharedSerializable> {
		let lookup = {
			let inner = self.inner.read();
			if let Some(found) = inner
				.by_class_and_id
				.get(&(class_name.to_string(), object_id.to_string()))
			{
				return Some(Arc::clone(found));
			}
			inner.custom_lookups.get(class_name).cloned()
		};
		// Invoked outside the lock so a lookup may register what it finds.
		lookup.and_then(|f| f(class_name, object_id))
	}

	/// Installs a fallback resolution function for a class name.
	pub fn register_custom_lookup<F>(&self, class_name: &str, lookup: F)
	where
		F: Fn(&str, &str) -> Option<SharedSerializable> + Send + Sync + 'static,
	{
		self.inner
			.write()
			.custom_lookups
			.insert(class_name.to_string(), Arc::new(lookup));
	}

	/// Returns true if a custom lookup is installed for the class name.
	pub fn has_custom_lookup(&self, class_name: &str) -> bool {
		self.inner.read().custom_lookups.contains_key(class_name)
	}

	/// Empties all three indexes atomically.
	pub fn clear(&self) {
		let mut inner = self.inner.write();
		inner.by_id.clear();
		inner.by_class_and_id.clear();
		inner.custom_lookups.clear();
	}

	/// Number of objects indexed by bare id.
	pub fn len(&self) -> usize {
		self.inner.read().by_id.len()
	}

	/// Returns true if no objects are indexed.
	pub fn is_empty(&self) -> bool {
		self.inner.read().by_id.is_empty()
	}
}

/// Process-wide object registry instance.
static GLOBAL_OBJECT_REGISTRY: Lazy<ObjectRegistry> = Lazy::new(ObjectRegistry::new);

/// Returns the process-wide object registry.
pub fn global_object_registry() -> &'static ObjectRegistry {
	&GLOBAL_OBJECT_REGISTRY
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	use crate::error::SeriluxResult;
	use crate::fields::{FieldPayload, FieldSet, FieldView};

	struct Tracked {
		id: String,
		fields: FieldSet,
	}

	impl Tracked {
		fn new(id: &str) -> Self {
			Self {
				id: id.to_string(),
				fields: FieldSet::new(),
			}
		}
	}

	impl Serializable for Tracked {
		fn type_name(&self) -> &'static str {
			"object_registry_tests.Tracked"
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

		fn object_id(&self) -> Option<&str> {
			Some(&self.id)
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
	fn test_register_and_find() {
		let registry = ObjectRegistry::new();
		let obj: SharedSerializable = Arc::new(Tracked::new("obj-1"));
		registry.register(obj, "obj-1");

		assert!(registry.find_by_id("obj-1").is_some());
		assert!(registry
			.find_by_class_and_id("object_registry_tests.Tracked", "obj-1")
			.is_some());
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn test_find_missing_returns_none() {
		let registry = ObjectRegistry::new();
		assert!(registry.find_by_id("nope").is_none());
		assert!(registry
			.find_by_class_and_id("object_registry_tests.Tracked", "nope")
			.is_none());
	}

	#[rstest]
	fn test_custom_lookup_fallback() {
		let registry = ObjectRegistry::new();
		registry.register_custom_lookup("object_registry_tests.Tracked", |_class, id| {
			Some(Arc::new(Tracked::new(id)) as SharedSerializable)
		});
		assert!(registry.has_custom_lookup("object_registry_tests.Tracked"));

		let found = registry
			.find_by_class_and_id("object_registry_tests.Tracked", "made-up")
			.expect("custom lookup should resolve");
		assert_eq!(found.object_id(), Some("made-up"));

		// the fallback is per class name
		assert!(registry.find_by_class_and_id("Other", "made-up").is_none());
	}

	#[rstest]
	fn test_clear_empties_all_indexes() {
		let registry = ObjectRegistry::new();
		registry.register(Arc::new(Tracked::new("obj-1")), "obj-1");
		registry.register_custom_lookup("object_registry_tests.Tracked", |_, _| None);

		registry.clear();

		assert!(registry.is_empty());
		assert!(registry.find_by_id("obj-1").is_none());
		assert!(!registry.has_custom_lookup("object_registry_tests.Tracked"));
	}
}
