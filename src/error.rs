//! Error types for the serilux serialization framework.
//!
//! This module defines the failure taxonomy used throughout the crate.
//! Failures deep in an object graph are caught at each recursive boundary
//! and re-wrapped with the owning type and field name, so the top-level
//! caller sees a chain of context from the root down to the failing leaf.

use std::fmt;

use thiserror::Error;

/// Context attached to serialization and deserialization failures.
///
/// Carries the offending object type and field when known. The rendered
/// message appends each piece of context that is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
	/// Primary error message.
	pub message: String,
	/// Type of the object being processed, when known.
	pub obj_type: Option<String>,
	/// Field that caused the error, when known.
	pub field: Option<String>,
}

impl ErrorContext {
	/// Creates a context carrying only a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			obj_type: None,
			field: None,
		}
	}

	/// Attaches the owning object type.
	pub fn with_obj_type(mut self, obj_type: impl Into<String>) -> Self {
		self.obj_type = Some(obj_type.into());
		self
	}

	/// Attaches the offending field name.
	pub fn with_field(mut self, field: impl Into<String>) -> Self {
		self.field = Some(field.into());
		self
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.message)?;
		if let Some(obj_type) = &self.obj_type {
			write!(f, ": object type: {obj_type}")?;
		}
		if let Some(field) = &self.field {
			write!(f, ": field: {field}")?;
		}
		Ok(())
	}
}

/// Classification of a callable that failed to round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
	/// A free function referenced by module path and name.
	Named,
	/// A method referenced through its owning type.
	Method,
	/// A builtin or otherwise unlocatable function.
	Builtin,
	/// An anonymous expression-backed callable.
	Expression,
}

impl fmt::Display for CallableKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			CallableKind::Named => "named",
			CallableKind::Method => "method",
			CallableKind::Builtin => "builtin",
			CallableKind::Expression => "expression",
		};
		write!(f, "{name}")
	}
}

/// Errors that can occur during serialization and deserialization.
#[derive(Debug, Error)]
pub enum SeriluxError {
	/// Serialization of an object or one of its fields failed.
	#[error("Serialization failed: {0}")]
	Serialization(ErrorContext),

	/// Deserialization of an object or one of its fields failed.
	#[error("Deserialization failed: {0}")]
	Deserialization(ErrorContext),

	/// A `_type` tag did not resolve through the type registry.
	#[error(
		"Class '{0}' not found in registry. \
		 This usually means the type was never registered with register_serializable."
	)]
	ClassNotFound(String),

	/// An object or type failed a validation check.
	#[error("Validation failed: {0}")]
	Validation(ErrorContext),

	/// A node was reached again through its own declared fields.
	#[error("Circular reference detected: {0}")]
	CircularReference(String),

	/// The configured recursion depth was exceeded while walking the graph.
	#[error(
		"Serialization depth limit ({max_depth}) exceeded (current depth: {current_depth}). \
		 This may indicate a circular reference or an excessively nested structure."
	)]
	DepthLimit {
		/// Maximum allowed depth.
		max_depth: usize,
		/// Depth at the point of violation.
		current_depth: usize,
	},

	/// Serialization or deserialization of a callable value failed.
	#[error("Callable error: {message} (callable type: {callable_type})")]
	Callable {
		/// What went wrong.
		message: String,
		/// Which kind of callable was involved.
		callable_type: CallableKind,
	},

	/// A declared-field mutation was given an invalid field name.
	#[error("Invalid field '{field_name}': {reason}")]
	InvalidField {
		/// Name that was rejected.
		field_name: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Strict deserialization met a key that is not a declared field.
	#[error("Unknown field '{field_name}' in {obj_type}")]
	UnknownField {
		/// The undeclared key.
		field_name: String,
		/// Type being deserialized.
		obj_type: String,
	},
}

impl SeriluxError {
	/// Creates a serialization error with just a message.
	pub fn serialization(message: impl Into<String>) -> Self {
		SeriluxError::Serialization(ErrorContext::new(message))
	}

	/// Creates a deserialization error with just a message.
	pub fn deserialization(message: impl Into<String>) -> Self {
		SeriluxError::Deserialization(ErrorContext::new(message))
	}

	/// Creates a validation error naming the offending object type.
	pub fn validation(message: impl Into<String>, obj_type: impl Into<String>) -> Self {
		SeriluxError::Validation(ErrorContext::new(message).with_obj_type(obj_type))
	}

	/// Wraps a nested failure with the type and field at the current
	/// recursion boundary, preserving the inner message as a suffix.
	pub(crate) fn wrap_field(self, obj_type: &str, field: &str, verb: &str) -> Self {
		let context = ErrorContext::new(format!("Failed to {verb} field '{field}': {self}"))
			.with_obj_type(obj_type)
			.with_field(field);
		match verb {
			"serialize" => SeriluxError::Serialization(context),
			_ => SeriluxError::Deserialization(context),
		}
	}

	/// The owning object type, when the error carries one.
	pub fn obj_type(&self) -> Option<&str> {
		match self {
			SeriluxError::Serialization(ctx)
			| SeriluxError::Deserialization(ctx)
			| SeriluxError::Validation(ctx) => ctx.obj_type.as_deref(),
			SeriluxError::UnknownField { obj_type, .. } => Some(obj_type),
			_ => None,
		}
	}

	/// The offending field name, when the error carries one.
	pub fn field(&self) -> Option<&str> {
		match self {
			SeriluxError::Serialization(ctx) | SeriluxError::Deserialization(ctx) => {
				ctx.field.as_deref()
			}
			SeriluxError::InvalidField { field_name, .. }
			| SeriluxError::UnknownField { field_name, .. } => Some(field_name),
			_ => None,
		}
	}
}

/// Result type alias for serilux operations.
pub type SeriluxResult<T> = Result<T, SeriluxError>;
