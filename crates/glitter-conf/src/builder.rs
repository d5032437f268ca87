//! Settings builder merging configuration sources

use crate::sources::{ConfigSource, DefaultSource};
use crate::{GlitterSettings, SettingsError};
use serde_json::{Map, Value};

/// Builds [`GlitterSettings`] from prioritized sources
///
/// Built-in defaults are always applied first; later (higher priority)
/// sources overwrite keys of earlier ones.
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Create a builder holding only the built-in defaults
	pub fn new() -> Self {
		Self {
			sources: vec![Box::new(DefaultSource)],
		}
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Load, merge, deserialize and validate
	pub fn build(mut self) -> Result<GlitterSettings, SettingsError> {
		// Stable sort keeps insertion order among equal priorities
		self.sources.sort_by_key(|s| s.priority());

		let mut merged = Map::new();
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded settings source"
			);
			merged.extend(values);
		}

		let settings: GlitterSettings = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}
