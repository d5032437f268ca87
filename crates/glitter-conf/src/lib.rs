//! # Glitter Settings
//!
//! Layered settings for Glitter page editing.
//!
//! Settings are merged from layered sources in priority order
//! (environment variables > TOML file > defaults) and then deserialized into
//! [`GlitterSettings`].
//!
//! ```rust
//! use glitter_conf::{EnvSource, SettingsBuilder};
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(EnvSource::new().with_vars([(
//!         "GLITTER_DEFAULT_BLOCKS",
//!         "glitter_html.HTML=HTML",
//!     )]))
//!     .build()
//!     .unwrap();
//!
//! let blocks = settings.default_blocks.unwrap();
//! assert_eq!(blocks[0].type_tag, "glitter_html.HTML");
//! ```

pub mod builder;
pub mod sources;

pub use builder::SettingsBuilder;
pub use sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};

use serde::{Deserialize, Serialize};

/// Block tags offered as quick-add defaults when `default_blocks` is unset
pub const FALLBACK_BLOCKS: [&str; 3] = [
	"glitter_redactor.Redactor",
	"glitter_image.ImageBlock",
	"glitter_html.HTML",
];

/// A quick-add block shown next to the "add block" selector
///
/// Serialized as a `[type_tag, label]` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct DefaultBlock {
	/// `app_label.ObjectName` of the block kind
	pub type_tag: String,
	/// Button label
	pub label: String,
}

impl DefaultBlock {
	/// Create a default block entry
	pub fn new(type_tag: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			type_tag: type_tag.into(),
			label: label.into(),
		}
	}
}

impl From<(String, String)> for DefaultBlock {
	fn from((type_tag, label): (String, String)) -> Self {
		Self { type_tag, label }
	}
}

impl From<DefaultBlock> for (String, String) {
	fn from(block: DefaultBlock) -> Self {
		(block.type_tag, block.label)
	}
}

/// Settings consumed by the page renderer and block admin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitterSettings {
	/// Explicit quick-add blocks (`GLITTER_DEFAULT_BLOCKS`)
	///
	/// `None` means the list is derived from `fallback_blocks`.
	pub default_blocks: Option<Vec<DefaultBlock>>,

	/// Well-known block tags used when `default_blocks` is unset
	pub fallback_blocks: Vec<String>,

	/// URL prefix of the block edit views
	pub block_admin_prefix: String,
}

impl Default for GlitterSettings {
	fn default() -> Self {
		Self {
			default_blocks: None,
			fallback_blocks: FALLBACK_BLOCKS.iter().map(|s| s.to_string()).collect(),
			block_admin_prefix: "/blockadmin/".to_string(),
		}
	}
}

impl GlitterSettings {
	/// Check cross-field constraints
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !self.block_admin_prefix.starts_with('/') || !self.block_admin_prefix.ends_with('/') {
			return Err(SettingsError::Invalid(format!(
				"block_admin_prefix must start and end with '/': {}",
				self.block_admin_prefix
			)));
		}

		let tags = self
			.default_blocks
			.iter()
			.flatten()
			.map(|b| b.type_tag.as_str())
			.chain(self.fallback_blocks.iter().map(String::as_str));

		for tag in tags {
			if tag.split_once('.').is_none_or(|(app, model)| app.is_empty() || model.is_empty()) {
				return Err(SettingsError::Invalid(format!(
					"block type tag must look like 'app_label.ObjectName': {}",
					tag
				)));
			}
		}

		Ok(())
	}
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// A source failed to load
	#[error("Source error: {0}")]
	Source(#[from] SourceError),

	/// Merged values did not match the settings structure
	#[error("Deserialization error: {0}")]
	Deserialize(#[from] serde_json::Error),

	/// Values deserialized but are not acceptable
	#[error("Invalid settings: {0}")]
	Invalid(String),
}
