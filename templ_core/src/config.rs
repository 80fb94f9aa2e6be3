use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Requirement;
use crate::TemplError;
use crate::TemplResult;
use crate::VariableKind;
use crate::VariableStore;

/// The serialization formats a seed can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SeedFormat {
	Toml,
	Json,
	Yaml,
}

impl SeedFormat {
	/// Pick the format from a file extension such as `toml` or `yml`.
	pub fn from_extension(extension: &str) -> TemplResult<Self> {
		match extension.trim().to_ascii_lowercase().as_str() {
			"toml" => Ok(Self::Toml),
			"json" => Ok(Self::Json),
			"yaml" | "yml" => Ok(Self::Yaml),
			other => Err(TemplError::UnsupportedSeedFormat(other.to_string())),
		}
	}

	/// Pick the format from the extension of `path`.
	pub fn from_path(path: &Path) -> TemplResult<Self> {
		let extension = path
			.extension()
			.and_then(|extension| extension.to_str())
			.unwrap_or("");

		Self::from_extension(extension)
	}
}

impl FromStr for SeedFormat {
	type Err = TemplError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_extension(s)
	}
}

impl Display for SeedFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Toml => write!(f, "toml"),
			Self::Json => write!(f, "json"),
			Self::Yaml => write!(f, "yaml"),
		}
	}
}

/// The variables a caller provides before rendering.
///
/// ```toml
/// [constants]
/// elternteil = "Mutter"
///
/// [options]
/// # `${name}` renders the constant `elternteil`
/// name = "elternteil"
///
/// [keys]
/// city = "Berlin"
/// ```
///
/// Settings are not part of a seed; they come from the template header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
	/// Values for `$name` placeholders.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub constants: BTreeMap<String, String>,
	/// Constant names for `${name}` placeholders.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub options: BTreeMap<String, String>,
	/// Values for `{name}` placeholders.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub keys: BTreeMap<String, String>,
}

impl SeedConfig {
	/// Parse a seed from `content`. Empty content is an empty seed.
	pub fn parse(content: &str, format: SeedFormat) -> TemplResult<Self> {
		if content.trim().is_empty() {
			return Ok(Self::default());
		}

		let parse_error = |reason: String| {
			TemplError::ConfigParse {
				format: format.to_string(),
				reason,
			}
		};

		match format {
			SeedFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
			SeedFormat::Json => {
				serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
			}
			SeedFormat::Yaml => {
				serde_yaml_ng::from_str(content).map_err(|e| parse_error(e.to_string()))
			}
		}
	}

	/// Serialize the seed back into `format`.
	pub fn to_string_as(&self, format: SeedFormat) -> TemplResult<String> {
		let serialize_error = |reason: String| {
			TemplError::ConfigSerialize {
				format: format.to_string(),
				reason,
			}
		};

		match format {
			SeedFormat::Toml => toml::to_string(self).map_err(|e| serialize_error(e.to_string())),
			SeedFormat::Json => {
				serde_json::to_string_pretty(self).map_err(|e| serialize_error(e.to_string()))
			}
			SeedFormat::Yaml => {
				serde_yaml_ng::to_string(self).map_err(|e| serialize_error(e.to_string()))
			}
		}
	}

	/// Build a skeleton seed covering every requirement of a template.
	///
	/// Keys and constants get empty values. Each option points at a constant
	/// of the same name, pre-filled with the option's inline default.
	pub fn from_requirements(requirements: &[Requirement]) -> Self {
		let mut seed = Self::default();

		for requirement in requirements {
			let name = requirement.name.clone();

			match requirement.kind {
				VariableKind::Key => {
					seed.keys.entry(name).or_default();
				}
				VariableKind::Constant => {
					seed.constants.entry(name).or_default();
				}
				VariableKind::Option => {
					let default = requirement.default.clone().unwrap_or_default();
					seed.options.insert(name.clone(), name.clone());
					let constant = seed.constants.entry(name).or_default();

					if constant.is_empty() {
						*constant = default;
					}
				}
				VariableKind::Setting => {}
			}
		}

		seed
	}

	pub fn is_empty(&self) -> bool {
		self.constants.is_empty() && self.options.is_empty() && self.keys.is_empty()
	}

	/// Convert the seed into the store a render starts from.
	pub fn into_store(self) -> VariableStore {
		let mut store = VariableStore::new();

		for (name, value) in self.constants {
			store = store.with_constant(name, value);
		}

		for (name, target) in self.options {
			store = store.with_option(name, target);
		}

		for (name, value) in self.keys {
			store = store.with_key(name, value);
		}

		store
	}
}
