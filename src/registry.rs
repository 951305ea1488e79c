//! Process-wide type registry.
//!
//! Maps registered type names to [`TypeEntry`] descriptors so the
//! deserializer can resolve a `_type` tag to a concrete constructor.
//! Registration is an explicit startup call per type; duplicate names are
//! rejected rather than silently overwritten. Tests and long-running hosts
//! reset the registry with [`SerializableRegistry::clear`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{SeriluxError, SeriluxResult};
use crate::serializable::Serializable;

/// Factory capability invoked to build a bare instance before field
/// population. Types whose construction needs arguments the engine cannot
/// supply register without one.
pub type Factory = Arc<dyn Fn() -> Box<dyn Serializable> + Send + Sync>;

/// Descriptor for a registered serializable type.
#[derive(Clone)]
pub struct TypeEntry {
	name: String,
	factory: Option<Factory>,
}

impl TypeEntry {
	/// Creates a constructible entry.
	pub fn new<F>(name: impl Into<String>, factory: F) -> Self
	where
		F: Fn() -> Box<dyn Serializable> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			factory: Some(Arc::new(factory)),
		}
	}

	/// Creates an entry for a type that cannot be built without arguments.
	///
	/// Such a type can appear in serialized output but fails the
	/// constructability check and cannot be deserialized fresh.
	pub fn without_factory(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			factory: None,
		}
	}

	/// The registered type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns true if the entry carries a zero-argument factory.
	pub fn is_constructible(&self) -> bool {
		self.factory.is_some()
	}

	/// Builds a bare instance of the type.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::Validation`] when the entry has no factory.
	pub fn construct(&self) -> SeriluxResult<Box<dyn Serializable>> {
		match &self.factory {
			Some(factory) => Ok(factory()),
			None => Err(SeriluxError::validation(
				"type cannot be constructed without arguments",
				self.name.clone(),
			)),
		}
	}
}

impl fmt::Debug for TypeEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeEntry")
			.field("name", &self.name)
			.field("constructible", &self.is_constructible())
			.finish()
	}
}

/// Global registry of serializable types.
static TYPE_REGISTRY: Lazy<RwLock<HashMap<String, TypeEntry>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a serializable type in the global registry.
///
/// # Errors
///
/// Returns [`SeriluxError::Validation`] if the name is already bound.
pub fn register_serializable(entry: TypeEntry) -> SeriluxResult<()> {
	let mut registry = TYPE_REGISTRY.write();
	if registry.contains_key(entry.name()) {
		return Err(SeriluxError::validation(
			"type is already registered",
			entry.name().to_string(),
		));
	}
	debug!(type_name = entry.name(), "registering serializable type");
	registry.insert(entry.name().to_string(), entry);
	Ok(())
}

/// Facade over the global type registry.
#[derive(Debug, Default)]
pub struct SerializableRegistry;

impl SerializableRegistry {
	/// Creates a registry reference.
	pub fn new() -> Self {
		Self
	}

	/// Registers a type. Equivalent to [`register_serializable`].
	pub fn register(&self, entry: TypeEntry) -> SeriluxResult<()> {
		register_serializable(entry)
	}

	/// Resolves a type name to its descriptor.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::ClassNotFound`] naming the missing type.
	pub fn resolve(&self, name: &str) -> SeriluxResult<TypeEntry> {
		TYPE_REGISTRY
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| SeriluxError::ClassNotFound(name.to_string()))
	}

	/// Resolves a type name and builds a bare instance of it.
	pub fn construct(&self, name: &str) -> SeriluxResult<Box<dyn Serializable>> {
		self.resolve(name)?.construct()
	}

	/// Returns true if the name is registered.
	pub fn has_type(&self, name: &str) -> bool {
		TYPE_REGISTRY.read().contains_key(name)
	}

	/// All registered type names.
	pub fn type_names(&self) -> Vec<String> {
		TYPE_REGISTRY.read().keys().cloned().collect()
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		TYPE_REGISTRY.read().len()
	}

	/// Returns true if no types are registered.
	pub fn is_empty(&self) -> bool {
		TYPE_REGISTRY.read().is_empty()
	}

	/// Removes all registered types.
	///
	/// This is primarily useful for tests isolating registry state.
	pub fn clear(&self) {
		TYPE_REGISTRY.write().clear();
	}
}
