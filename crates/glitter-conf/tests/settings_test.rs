//! Tests for layered settings loading

use glitter_conf::{
	DefaultBlock, EnvSource, GlitterSettings, SettingsBuilder, SettingsError, TomlFileSource,
};
use rstest::rstest;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(content: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file
}

#[rstest]
fn test_builder_without_sources_yields_defaults() {
	let settings = SettingsBuilder::new().build().unwrap();

	assert_eq!(settings, GlitterSettings::default());
}

#[rstest]
fn test_toml_file_overrides_defaults() {
	// Arrange
	let file = toml_file(
		r#"
default_blocks = [["glitter_html.HTML", "HTML"], ["glitter_image.ImageBlock", "Image"]]
block_admin_prefix = "/admin/blocks/"
"#,
	);

	// Act
	let settings = SettingsBuilder::new()
		.add_source(TomlFileSource::new(file.path()))
		.build()
		.unwrap();

	// Assert
	assert_eq!(
		settings.default_blocks,
		Some(vec![
			DefaultBlock::new("glitter_html.HTML", "HTML"),
			DefaultBlock::new("glitter_image.ImageBlock", "Image"),
		])
	);
	assert_eq!(settings.block_admin_prefix, "/admin/blocks/");
	assert_eq!(settings.fallback_blocks.len(), 3);
}

#[rstest]
fn test_environment_wins_over_toml_regardless_of_add_order() {
	// Arrange
	let file = toml_file(r#"default_blocks = [["glitter_html.HTML", "From file"]]"#);

	// Act
	let settings = SettingsBuilder::new()
		.add_source(EnvSource::new().with_vars([(
			"GLITTER_DEFAULT_BLOCKS",
			"glitter_html.HTML=From env",
		)]))
		.add_source(TomlFileSource::new(file.path()))
		.build()
		.unwrap();

	// Assert
	assert_eq!(
		settings.default_blocks,
		Some(vec![DefaultBlock::new("glitter_html.HTML", "From env")])
	);
}

#[rstest]
fn test_invalid_toml_is_source_error() {
	let file = toml_file("default_blocks = [[");

	let result = SettingsBuilder::new()
		.add_source(TomlFileSource::new(file.path()))
		.build();

	assert!(matches!(result, Err(SettingsError::Source(_))));
}

#[rstest]
fn test_wrong_shape_is_deserialize_error() {
	let file = toml_file(r#"default_blocks = "glitter_html.HTML""#);

	let result = SettingsBuilder::new()
		.add_source(TomlFileSource::new(file.path()))
		.build();

	assert!(matches!(result, Err(SettingsError::Deserialize(_))));
}

#[rstest]
fn test_validation_runs_after_merge() {
	let result = SettingsBuilder::new()
		.add_source(EnvSource::new().with_vars([("GLITTER_BLOCK_ADMIN_PREFIX", "blocks")]))
		.build();

	assert!(matches!(result, Err(SettingsError::Invalid(_))));
}

#[rstest]
#[serial(glitter_env)]
fn test_process_environment_is_read() {
	// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		std::env::set_var("GLITTER_FALLBACK_BLOCKS", "glitter_html.HTML,glitter_image.ImageBlock");
	}

	let result = SettingsBuilder::new().add_source(EnvSource::new()).build();

	// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		std::env::remove_var("GLITTER_FALLBACK_BLOCKS");
	}

	let settings = result.unwrap();
	assert_eq!(
		settings.fallback_blocks,
		vec!["glitter_html.HTML", "glitter_image.ImageBlock"]
	);
}
