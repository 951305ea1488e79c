//! Shared fixture types for the integration suites.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde_json::json;
use serilux::{
	register_serializable, CallableValue, FieldPayload, FieldSet, FieldView, Serializable,
	SeriluxResult, TypeEntry,
};

/// A serializable object exercising every value shape: scalars, a
/// sequence, a mapping, an optional nested node, and an optional callable.
pub struct SimpleObject {
	pub name: String,
	pub value: i64,
	pub tags: Vec<String>,
	pub attributes: BTreeMap<String, i64>,
	pub nested: Option<Box<SimpleObject>>,
	pub handler: Option<CallableValue>,
	fields: FieldSet,
}

impl SimpleObject {
	pub fn new() -> Self {
		Self {
			name: String::new(),
			value: 0,
			tags: Vec::new(),
			attributes: BTreeMap::new(),
			nested: None,
			handler: None,
			fields: FieldSet::from_names(&["name", "value", "tags", "attributes"]).unwrap(),
		}
	}
}

impl Serializable for SimpleObject {
	fn type_name(&self) -> &'static str {
		"SimpleObject"
	}

	fn fields_to_serialize(&self) -> &FieldSet {
		&self.fields
	}

	fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
		&mut self.fields
	}

	fn field(&self, name: &str) -> Option<FieldView<'_>> {
		match name {
			"name" => Some(FieldView::Scalar(json!(self.name))),
			"value" => Some(FieldView::Scalar(json!(self.value))),
			"tags" => Some(FieldView::Seq(
				self.tags
					.iter()
					.map(|tag| FieldView::Scalar(json!(tag)))
					.collect(),
			)),
			"attributes" => Some(FieldView::Map(
				self.attributes
					.iter()
					.map(|(key, value)| (key.clone(), FieldView::Scalar(json!(value))))
					.collect(),
			)),
			"nested" => self
				.nested
				.as_deref()
				.map(|nested| FieldView::Node(nested as &dyn Serializable)),
			"handler" => self.handler.as_ref().map(FieldView::Callable),
			_ => None,
		}
	}

	fn set_field(&mut self, name: &str, value: FieldPayload) -> SeriluxResult<()> {
		match name {
			"name" => {
				if let Some(text) = value.as_str() {
					self.name = text.to_string();
				}
			}
			"value" => {
				if let Some(number) = value.as_i64() {
					self.value = number;
				}
			}
			"tags" => {
				if let FieldPayload::Seq(items) = value {
					self.tags = items
						.iter()
						.filter_map(|item| item.as_str().map(str::to_string))
						.collect();
				}
			}
			"attributes" => {
				if let FieldPayload::Map(entries) = value {
					self.attributes = entries
						.iter()
						.filter_map(|(key, item)| item.as_i64().map(|v| (key.clone(), v)))
						.collect();
				}
			}
			"nested" => {
				if value.is_null() {
					self.nested = None;
				} else {
					self.nested = Some(value.into_node::<SimpleObject>()?);
				}
			}
			"handler" => {
				if let FieldPayload::Callable(callable) = value {
					self.handler = Some(callable);
				} else {
					self.handler = None;
				}
			}
			_ => {}
		}
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

/// A type whose construction requires an argument the engine cannot
/// supply. Registered without a factory.
pub struct RequiresArgs {
	pub required_param: String,
	fields: FieldSet,
}

impl RequiresArgs {
	pub fn new(required_param: &str) -> Self {
		Self {
			required_param: required_param.to_string(),
			fields: FieldSet::from_names(&["required_param"]).unwrap(),
		}
	}
}

impl Serializable for RequiresArgs {
	fn type_name(&self) -> &'static str {
		"RequiresArgs"
	}

	fn fields_to_serialize(&self) -> &FieldSet {
		&self.fields
	}

	fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
		&mut self.fields
	}

	fn field(&self, name: &str) -> Option<FieldView<'_>> {
		match name {
			"required_param" => Some(FieldView::Scalar(json!(self.required_param))),
			_ => None,
		}
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

/// A node that can point at another node (or itself) through shared
/// ownership, used to build reference cycles.
pub struct CycleNode {
	pub name: String,
	pub next: OnceCell<Rc<CycleNode>>,
	fields: FieldSet,
}

impl CycleNode {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			next: OnceCell::new(),
			fields: FieldSet::from_names(&["name", "next"]).unwrap(),
		}
	}
}

impl Serializable for CycleNode {
	fn type_name(&self) -> &'static str {
		"CycleNode"
	}

	fn fields_to_serialize(&self) -> &FieldSet {
		&self.fields
	}

	fn fields_to_serialize_mut(&mut self) -> &mut FieldSet {
		&mut self.fields
	}

	fn field(&self, name: &str) -> Option<FieldView<'_>> {
		match name {
			"name" => Some(FieldView::Scalar(json!(self.name))),
			"next" => self
				.next
				.get()
				.map(|next| FieldView::Node(next.as_ref() as &dyn Serializable)),
			_ => None,
		}
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

/// A `SimpleObject` with the optional `nested` and `handler` fields
/// declared, matching the shape the registry factory produces.
pub fn registered_object() -> SimpleObject {
	use serilux::SerializableExt;
	let mut obj = SimpleObject::new();
	obj.add_serializable_fields(&["nested", "handler"]).unwrap();
	obj
}

/// Registers the fixture types, ignoring already-registered duplicates so
/// every test can call this unconditionally.
pub fn setup() {
	let _ = register_serializable(TypeEntry::new("SimpleObject", || Box::new(registered_object())));
	let _ = register_serializable(TypeEntry::without_factory("RequiresArgs"));
	let _ = register_serializable(TypeEntry::new("CycleNode", || Box::new(CycleNode::new(""))));
}

/// Builds a chain of `levels` nested objects under a root, so the deepest
/// node sits at recursion depth `levels`.
pub fn build_chain(levels: usize) -> SimpleObject {
	let mut root = SimpleObject::new();
	root.declare_nested_field();
	root.name = "root".to_string();

	let mut current = &mut root;
	for level in 0..levels {
		let mut nested = SimpleObject::new();
		nested.declare_nested_field();
		nested.name = format!("level_{level}");
		current.nested = Some(Box::new(nested));
		current = current.nested.as_mut().unwrap();
	}
	root
}

impl SimpleObject {
	/// Declares the optional `nested` field used by the chain tests.
	pub fn declare_nested_field(&mut self) {
		use serilux::SerializableExt;
		self.add_serializable_fields(&["nested"]).unwrap();
	}
}
