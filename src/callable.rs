//! Callable codec: best-effort serialization of function-like values.
//!
//! Callables are not portable data. Named functions round-trip as a
//! `callable` tagged map carrying a module path and name, resolved on load
//! through a process-wide callable registry (the analogue of an import).
//! Anonymous closures round-trip as a `lambda_expression` tagged map
//! carrying their literal source text, captured at the definition site by
//! [`lambda_expr!`](crate::lambda_expr) and resolved through the expression
//! registry. Opaque closures with neither a name nor a source degrade to an
//! absent result rather than failing: a handler field holding a function
//! must never crash the surrounding serialization pass.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tracing::{debug, trace};

use crate::error::{CallableKind, SeriluxError, SeriluxResult};
use crate::expression::validate_expression;

/// Tag value for named callables.
pub const CALLABLE_TAG: &str = "callable";
/// Tag value for expression-backed callables.
pub const LAMBDA_EXPRESSION_TAG: &str = "lambda_expression";

/// The function shape callables share: a JSON value in, a JSON value out.
pub type CallableFn = dyn Fn(&JsonValue) -> JsonValue + Send + Sync;

/// A function-like value participating in serialization.
#[derive(Clone)]
pub enum CallableValue {
	/// A function referenced by module path and name.
	Named {
		/// Module path, e.g. `"handlers"`.
		module: String,
		/// Function name within the module.
		name: String,
		/// The resolved function, present after registration or lookup.
		func: Option<Arc<CallableFn>>,
	},
	/// An anonymous callable carrying its source expression text.
	Expression {
		/// Literal source text of the expression.
		source: String,
		/// The resolved function, present after registration or lookup.
		func: Option<Arc<CallableFn>>,
	},
	/// A closure with no name and no recoverable source. Serializes to an
	/// absent result.
	Opaque {
		/// The live function.
		func: Arc<CallableFn>,
	},
}

impl CallableValue {
	/// Creates a named callable reference without a live function.
	pub fn named(module: impl Into<String>, name: impl Into<String>) -> Self {
		CallableValue::Named {
			module: module.into(),
			name: name.into(),
			func: None,
		}
	}

	/// Creates a named callable, registering the function so it can be
	/// re-resolved on deserialization.
	pub fn named_with<F>(module: impl Into<String>, name: impl Into<String>, func: F) -> Self
	where
		F: Fn(&JsonValue) -> JsonValue + Send + Sync + 'static,
	{
		let module = module.into();
		let name = name.into();
		let func: Arc<CallableFn> = Arc::new(func);
		register_callable(&module, &name, Arc::clone(&func));
		CallableValue::Named {
			module,
			name,
			func: Some(func),
		}
	}

	/// Creates an expression-backed callable, registering the source text
	/// so the expression can be re-resolved on deserialization.
	///
	/// Prefer the [`lambda_expr!`](crate::lambda_expr) macro, which captures
	/// the source text for you.
	pub fn expression_with<F>(source: impl Into<String>, func: F) -> Self
	where
		F: Fn(&JsonValue) -> JsonValue + Send + Sync + 'static,
	{
		let source = source.into();
		let func: Arc<CallableFn> = Arc::new(func);
		register_expression(&source, Arc::clone(&func));
		CallableValue::Expression {
			source,
			func: Some(func),
		}
	}

	/// Creates an opaque callable that cannot be serialized.
	pub fn opaque<F>(func: F) -> Self
	where
		F: Fn(&JsonValue) -> JsonValue + Send + Sync + 'static,
	{
		CallableValue::Opaque {
			func: Arc::new(func),
		}
	}

	/// Returns true when a live function is attached.
	pub fn is_resolved(&self) -> bool {
		match self {
			CallableValue::Named { func, .. } | CallableValue::Expression { func, .. } => {
				func.is_some()
			}
			CallableValue::Opaque { .. } => true,
		}
	}

	/// Invokes the callable.
	///
	/// # Errors
	///
	/// Returns [`SeriluxError::Callable`] when no live function is attached
	/// (an unresolved reference).
	pub fn call(&self, input: &JsonValue) -> SeriluxResult<JsonValue> {
		let (func, kind) = match self {
			CallableValue::Named { func, .. } => (func.as_ref(), CallableKind::Named),
			CallableValue::Expression { func, .. } => (func.as_ref(), CallableKind::Expression),
			CallableValue::Opaque { func } => (Some(func), CallableKind::Builtin),
		};
		match func {
			Some(func) => Ok(func(input)),
			None => Err(SeriluxError::Callable {
				message: "callable reference is not resolved".to_string(),
				callable_type: kind,
			}),
		}
	}
}

impl fmt::Debug for CallableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CallableValue::Named { module, name, func } => f
				.debug_struct("Named")
				.field("module", module)
				.field("name", name)
				.field("resolved", &func.is_some())
				.finish(),
			CallableValue::Expression { source, func } => f
				.debug_struct("Expression")
				.field("source", source)
				.field("resolved", &func.is_some())
				.finish(),
			CallableValue::Opaque { .. } => f.debug_struct("Opaque").finish_non_exhaustive(),
		}
	}
}

/// Registry of named callables, keyed by `module::name`.
static CALLABLE_REGISTRY: Lazy<RwLock<HashMap<String, Arc<CallableFn>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Registry of expression-backed callables, keyed by source text.
static EXPRESSION_REGISTRY: Lazy<RwLock<HashMap<String, Arc<CallableFn>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

fn callable_key(module: &str, name: &str) -> String {
	format!("{module}::{name}")
}

/// Registers a named callable so `callable` tagged maps can re-resolve it.
/// Re-registration replaces the previous function.
pub fn register_callable(module: &str, name: &str, func: Arc<CallableFn>) {
	debug!(module, name, "registering callable");
	CALLABLE_REGISTRY
		.write()
		.insert(callable_key(module, name), func);
}

/// Registers an expression so `lambda_expression` tagged maps can
/// re-resolve it by source text.
pub fn register_expression(source: &str, func: Arc<CallableFn>) {
	debug!(source, "registering expression callable");
	EXPRESSION_REGISTRY.write().insert(source.to_string(), func);
}

/// Removes all registered callables and expressions. For tests.
pub fn clear_callable_registry() {
	CALLABLE_REGISTRY.write().clear();
	EXPRESSION_REGISTRY.write().clear();
}

/// Captures a closure together with its literal source text and returns a
/// registered [`CallableValue::Expression`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use serilux::lambda_expr;
///
/// let condition = lambda_expr!(|v| json!(v.get("priority") == Some(&json!("high"))));
/// assert_eq!(condition.call(&json!({"priority": "high"})).unwrap(), json!(true));
/// ```
#[macro_export]
macro_rules! lambda_expr {
	($closure:expr) => {
		$crate::callable::CallableValue::expression_with(stringify!($closure), $closure)
	};
}

/// Serializes a callable without expression fallback.
///
/// Named callables produce a `callable` tagged map. Expression-backed and
/// opaque callables return `None` (degraded, not an error).
pub fn serialize_callable(value: &CallableValue) -> Option<JsonMap<String, JsonValue>> {
	match value {
		CallableValue::Named { module, name, .. } => {
			let mut map = JsonMap::new();
			map.insert("_type".to_string(), json!(CALLABLE_TAG));
			map.insert("module".to_string(), json!(module));
			map.insert("name".to_string(), json!(name));
			Some(map)
		}
		CallableValue::Expression { .. } | CallableValue::Opaque { .. } => None,
	}
}

/// Serializes a callable, optionally falling back to a `lambda_expression`
/// tagged map for expression-backed values.
///
/// `None` input serializes to `None`. Opaque callables always degrade to
/// `None`: they carry nothing that could be reconstructed.
pub fn serialize_callable_with_fallback(
	value: Option<&CallableValue>,
	fallback_to_expression: bool,
) -> Option<JsonMap<String, JsonValue>> {
	let value = value?;
	match value {
		CallableValue::Named { .. } => serialize_callable(value),
		CallableValue::Expression { source, .. } if fallback_to_expression => {
			let mut map = JsonMap::new();
			map.insert("_type".to_string(), json!(LAMBDA_EXPRESSION_TAG));
			map.insert("expression".to_string(), json!(source));
			Some(map)
		}
		CallableValue::Expression { .. } | CallableValue::Opaque { .. } => {
			trace!("degrading unserializable callable to absent");
			None
		}
	}
}

/// Returns the recoverable source text of an expression-backed callable.
pub fn extract_callable_expression(value: &CallableValue) -> Option<&str> {
	match value {
		CallableValue::Expression { source, .. } => Some(source),
		_ => None,
	}
}

/// Deserializes a callable-tagged map.
///
/// A `callable` tag is re-resolved through the callable registry; a
/// `lambda_expression` tag is delegated to
/// [`deserialize_lambda_expression`]. Any other `_type` returns `Ok(None)`
/// so callers can treat "not a callable we recognize" as a normal outcome.
pub fn deserialize_callable(
	data: &JsonMap<String, JsonValue>,
) -> SeriluxResult<Option<CallableValue>> {
	match data.get("_type").and_then(JsonValue::as_str) {
		Some(CALLABLE_TAG) => {
			let module = data
				.get("module")
				.and_then(JsonValue::as_str)
				.ok_or_else(|| {
					SeriluxError::deserialization("callable is missing 'module' field")
				})?;
			let name = data.get("name").and_then(JsonValue::as_str).ok_or_else(|| {
				SeriluxError::deserialization("callable is missing 'name' field")
			})?;
			let func = CALLABLE_REGISTRY
				.read()
				.get(&callable_key(module, name))
				.cloned()
				.ok_or_else(|| SeriluxError::Callable {
					message: format!("callable '{module}::{name}' is not registered"),
					callable_type: CallableKind::Named,
				})?;
			Ok(Some(CallableValue::Named {
				module: module.to_string(),
				name: name.to_string(),
				func: Some(func),
			}))
		}
		Some(LAMBDA_EXPRESSION_TAG) => deserialize_lambda_expression(data),
		_ => Ok(None),
	}
}

/// Deserializes a `lambda_expression` tagged map.
///
/// # Errors
///
/// Fails with a missing-field failure when `expression` is absent or
/// empty, with a syntax-error failure when the text does not parse, and
/// with a callable failure when the text is valid but was never
/// registered. A non-matching `_type` returns `Ok(None)`.
pub fn deserialize_lambda_expression(
	data: &JsonMap<String, JsonValue>,
) -> SeriluxResult<Option<CallableValue>> {
	if data.get("_type").and_then(JsonValue::as_str) != Some(LAMBDA_EXPRESSION_TAG) {
		return Ok(None);
	}
	let source = data
		.get("expression")
		.and_then(JsonValue::as_str)
		.filter(|s| !s.trim().is_empty())
		.ok_or_else(|| {
			SeriluxError::deserialization("lambda_expression is missing 'expression' field")
		})?;

	validate_expression(source)?;

	let func = EXPRESSION_REGISTRY
		.read()
		.get(source)
		.cloned()
		.ok_or_else(|| SeriluxError::Callable {
			message: format!("expression '{source}' is not registered"),
			callable_type: CallableKind::Expression,
		})?;

	Ok(Some(CallableValue::Expression {
		source: source.to_string(),
		func: Some(func),
	}))
}
