use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// The name of the setting that declares the template's language.
pub const LANGUAGE_SETTING: &str = "lang";

/// The layer a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
	/// Declared in the template's settings header.
	Setting,
	/// A literal value referenced with `$name`.
	Constant,
	/// Referenced with `${name}`. Its value names a constant.
	Option,
	/// A literal value referenced with `{name}`.
	Key,
}

impl Display for VariableKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Setting => write!(f, "setting"),
			Self::Constant => write!(f, "constant"),
			Self::Option => write!(f, "option"),
			Self::Key => write!(f, "key"),
		}
	}
}

/// A stored value and the layer it belongs to.
///
/// For [`VariableKind::Option`] the value is the name of the constant the
/// option points at. For every other kind it is the literal replacement
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
	pub kind: VariableKind,
	pub value: String,
}

impl Variable {
	pub fn new(kind: VariableKind, value: impl Into<String>) -> Self {
		Self {
			kind,
			value: value.into(),
		}
	}

	pub fn setting(value: impl Into<String>) -> Self {
		Self::new(VariableKind::Setting, value)
	}

	pub fn constant(value: impl Into<String>) -> Self {
		Self::new(VariableKind::Constant, value)
	}

	pub fn option(target: impl Into<String>) -> Self {
		Self::new(VariableKind::Option, target)
	}

	pub fn key(value: impl Into<String>) -> Self {
		Self::new(VariableKind::Key, value)
	}
}

/// Variables available to a single render, keyed by `(name, kind)`.
///
/// The same name may be stored once per kind without the entries
/// overwriting each other. Callers seed constants, options and keys before
/// rendering; settings are added while the header is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
	settings: HashMap<String, Variable>,
	constants: HashMap<String, Variable>,
	options: HashMap<String, Variable>,
	keys: HashMap<String, Variable>,
}

impl VariableStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn layer(&self, kind: VariableKind) -> &HashMap<String, Variable> {
		match kind {
			VariableKind::Setting => &self.settings,
			VariableKind::Constant => &self.constants,
			VariableKind::Option => &self.options,
			VariableKind::Key => &self.keys,
		}
	}

	fn layer_mut(&mut self, kind: VariableKind) -> &mut HashMap<String, Variable> {
		match kind {
			VariableKind::Setting => &mut self.settings,
			VariableKind::Constant => &mut self.constants,
			VariableKind::Option => &mut self.options,
			VariableKind::Key => &mut self.keys,
		}
	}

	/// Store `variable` under `name` in the layer named by its kind. Returns
	/// the variable previously stored under the same name and kind.
	pub fn insert(&mut self, name: impl Into<String>, variable: Variable) -> Option<Variable> {
		self.layer_mut(variable.kind).insert(name.into(), variable)
	}

	/// Look up `name`, returning `None` unless a variable of exactly `kind`
	/// is stored under it.
	pub fn get(&self, name: &str, kind: VariableKind) -> Option<&Variable> {
		self.layer(kind).get(name)
	}

	/// Shorthand for the value of [`get`](Self::get).
	pub fn value(&self, name: &str, kind: VariableKind) -> Option<&str> {
		self.get(name, kind).map(|variable| variable.value.as_str())
	}

	#[must_use]
	pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, Variable::setting(value));
		self
	}

	#[must_use]
	pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, Variable::constant(value));
		self
	}

	#[must_use]
	pub fn with_option(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.insert(name, Variable::option(target));
		self
	}

	#[must_use]
	pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, Variable::key(value));
		self
	}

	/// All entries of one kind, sorted by name.
	pub fn entries(&self, kind: VariableKind) -> BTreeMap<&str, &str> {
		self.layer(kind)
			.iter()
			.map(|(name, variable)| (name.as_str(), variable.value.as_str()))
			.collect()
	}

	/// The settings recorded from the template header, sorted by name.
	pub fn settings(&self) -> BTreeMap<&str, &str> {
		self.entries(VariableKind::Setting)
	}

	/// The declared `lang` setting, if any.
	pub fn language(&self) -> Option<&str> {
		self.value(LANGUAGE_SETTING, VariableKind::Setting)
	}

	pub fn len(&self) -> usize {
		self.settings.len() + self.constants.len() + self.options.len() + self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
