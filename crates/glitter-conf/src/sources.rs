//! Configuration sources for layered settings
//!
//! Sources are merged in priority order
//! (environment variables > TOML file > defaults).

use crate::GlitterSettings;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Built-in defaults, lowest priority
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		match serde_json::to_value(GlitterSettings::default())? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			other => Err(SourceError::Parse(format!(
				"defaults did not serialize to a table: {}",
				other
			))),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Built-in defaults".to_string()
	}
}

/// TOML file configuration source
///
/// Keys are read from the top level of the file:
///
/// ```toml
/// default_blocks = [["glitter_html.HTML", "HTML"]]
/// block_admin_prefix = "/blockadmin/"
/// ```
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// Create a source for an optional TOML file
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// Fail loading when the file does not exist
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			if self.required {
				return Err(SourceError::Io(std::io::Error::new(
					std::io::ErrorKind::NotFound,
					format!("settings file not found: {}", self.path.display()),
				)));
			}
			tracing::debug!(path = %self.path.display(), "optional settings file missing");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let config: IndexMap<String, Value> = toml::from_str(&content)?;
		Ok(config)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
///
/// Reads `GLITTER_*` variables, strips the prefix and lowercases the rest.
/// `GLITTER_DEFAULT_BLOCKS` accepts either JSON (`[["tag", "Label"]]`) or
/// the short form `tag=Label,tag=Label`. `GLITTER_FALLBACK_BLOCKS` accepts
/// JSON or a comma separated list.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Create a source reading the process environment with the `GLITTER_` prefix
	pub fn new() -> Self {
		Self {
			prefix: "GLITTER_".to_string(),
			vars: None,
		}
	}

	/// Set a different prefix filter
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Read from the given pairs instead of the process environment
	pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		self.vars = Some(
			vars.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		);
		self
	}

	fn parse_value(key: &str, value: &str) -> Result<Value, SourceError> {
		let trimmed = value.trim();
		if trimmed.starts_with('[') || trimmed.starts_with('{') {
			return Ok(serde_json::from_str(trimmed)?);
		}

		match key {
			"default_blocks" => {
				let pairs = trimmed
					.split(',')
					.filter(|item| !item.trim().is_empty())
					.map(|item| {
						let (tag, label) = item.split_once('=').ok_or_else(|| {
							SourceError::Parse(format!(
								"expected 'tag=Label' in default_blocks, got '{}'",
								item
							))
						})?;
						Ok(Value::Array(vec![
							Value::String(tag.trim().to_string()),
							Value::String(label.trim().to_string()),
						]))
					})
					.collect::<Result<Vec<_>, SourceError>>()?;
				Ok(Value::Array(pairs))
			}
			"fallback_blocks" => Ok(Value::Array(
				trimmed
					.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(|s| Value::String(s.to_string()))
					.collect(),
			)),
			_ => Ok(Value::String(trimmed.to_string())),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = IndexMap::new();
		for (key, value) in vars {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let lower_key = clean_key.to_lowercase();
			let parsed = Self::parse_value(&lower_key, &value)?;
			config.insert(lower_key, parsed);
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}
