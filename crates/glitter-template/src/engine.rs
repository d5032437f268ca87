//! Tera-based template engine
//!
//! Wraps a [`Tera`] instance preloaded with the column templates used by the
//! page renderer. Projects can override any built-in template by adding a raw
//! template under the same name.

use crate::TemplateResult;
use crate::filters::{capfirst_filter, slugify_filter};
use serde::Serialize;
use tera::{Context, Tera};

/// Read-only column template
pub const COLUMN_TEMPLATE: &str = "glitter/include/column.html";

/// Column template used in edit mode
pub const COLUMN_EDIT_TEMPLATE: &str = "glitter/include/column_edit.html";

/// Template engine used by the page renderer
///
/// # Examples
///
/// ```
/// use glitter_template::{COLUMN_TEMPLATE, TemplateEngine};
/// use serde_json::json;
///
/// let engine = TemplateEngine::new().unwrap();
/// let html = engine
///     .render(COLUMN_TEMPLATE, &json!({ "column_slug": "main", "blocks": [] }))
///     .unwrap();
/// assert!(html.contains("glitter_column_main"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateEngine {
	tera: Tera,
}

impl TemplateEngine {
	/// Create an engine with the built-in templates and filters registered
	pub fn new() -> TemplateResult<Self> {
		let mut tera = Tera::default();
		tera.register_filter("slugify", slugify_filter);
		tera.register_filter("capfirst", capfirst_filter);

		tera.add_raw_templates(vec![
			(
				COLUMN_TEMPLATE,
				include_str!("../templates/glitter/include/column.html"),
			),
			(
				COLUMN_EDIT_TEMPLATE,
				include_str!("../templates/glitter/include/column_edit.html"),
			),
		])?;

		Ok(Self { tera })
	}

	/// Add or replace a template
	pub fn add_raw_template(&mut self, name: &str, content: &str) -> TemplateResult<()> {
		tracing::debug!(template = name, "registering template");
		self.tera.add_raw_template(name, content)?;
		Ok(())
	}

	/// Whether a template with this name is registered
	pub fn has_template(&self, name: &str) -> bool {
		self.tera.get_template_names().any(|n| n == name)
	}

	/// Render a template with any serializable context
	pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> TemplateResult<String> {
		let ctx = Context::from_serialize(context)?;
		Ok(self.tera.render(template_name, &ctx)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_builtin_templates_registered() {
		let engine = TemplateEngine::new().unwrap();

		assert!(engine.has_template(COLUMN_TEMPLATE));
		assert!(engine.has_template(COLUMN_EDIT_TEMPLATE));
	}

	#[rstest]
	fn test_column_template_keeps_block_markup_unescaped() {
		// Arrange
		let engine = TemplateEngine::new().unwrap();
		let context = json!({
			"column_slug": "main",
			"blocks": [{ "html": "<p>First</p>" }, { "html": "<p>Second</p>" }],
		});

		// Act
		let html = engine.render(COLUMN_TEMPLATE, &context).unwrap();

		// Assert
		let first = html.find("<p>First</p>").unwrap();
		let second = html.find("<p>Second</p>").unwrap();
		assert!(first < second);
	}

	#[rstest]
	fn test_override_builtin_template() {
		// Arrange
		let mut engine = TemplateEngine::new().unwrap();
		engine
			.add_raw_template(COLUMN_TEMPLATE, "[{{ column_slug }}]")
			.unwrap();

		// Act
		let html = engine
			.render(COLUMN_TEMPLATE, &json!({ "column_slug": "side", "blocks": [] }))
			.unwrap();

		// Assert
		assert_eq!(html, "[side]");
	}

	#[rstest]
	fn test_missing_template_is_error() {
		let engine = TemplateEngine::new().unwrap();

		let result = engine.render("nope.html", &json!({}));

		assert!(result.is_err());
	}
}
