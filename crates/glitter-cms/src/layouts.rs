//! Layout registry
//!
//! A layout names a page template and declares its columns in display
//! order. Layouts are registered once at startup and are read-only while
//! requests are rendered.

use crate::error::{CmsError, CmsResult};
use crate::models::ContentType;
use glitter_template::capfirst;
use indexmap::IndexMap;

/// A named template and its ordered columns
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
	template: String,
	title: String,
	columns: IndexMap<String, String>,
	models: Vec<ContentType>,
}

impl Layout {
	/// Create a layout with no columns
	pub fn new(template: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			template: template.into(),
			title: title.into(),
			columns: IndexMap::new(),
			models: Vec::new(),
		}
	}

	/// Append a column with a display label
	pub fn column(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
		self.columns.insert(name.into(), label.into());
		self
	}

	/// Restrict the layout to an entity type
	///
	/// A layout without restrictions is offered for every entity type.
	pub fn for_model(mut self, content_type: ContentType) -> Self {
		self.models.push(content_type);
		self
	}

	/// Template identifier
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Display title
	pub fn title(&self) -> &str {
		&self.title
	}

	/// Column names in declared order
	pub fn column_names(&self) -> impl Iterator<Item = &str> {
		self.columns.keys().map(String::as_str)
	}

	/// Whether the layout declares a column
	pub fn has_column(&self, name: &str) -> bool {
		self.columns.contains_key(name)
	}

	/// Display label of a column
	///
	/// Falls back to the capitalised column name for undeclared columns.
	pub fn get_column_name(&self, name: &str) -> String {
		match self.columns.get(name) {
			Some(label) => label.clone(),
			None => capfirst(&name.replace('_', " ")),
		}
	}

	/// `(column_name, label)` pairs in declared order
	pub fn column_choices(&self) -> Vec<(String, String)> {
		self.columns
			.iter()
			.map(|(name, label)| (name.clone(), label.clone()))
			.collect()
	}

	/// Whether the layout may be used by an entity type
	pub fn applies_to(&self, content_type: &ContentType) -> bool {
		self.models.is_empty() || self.models.contains(content_type)
	}
}

/// Registry of layouts keyed by template identifier
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
	layouts: IndexMap<String, Layout>,
}

impl LayoutRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a layout, replacing one with the same template identifier
	pub fn register(&mut self, layout: Layout) {
		tracing::debug!(template = layout.template(), "registering layout");
		self.layouts.insert(layout.template.clone(), layout);
	}

	/// Look up a layout by template identifier
	pub fn get_layout(&self, template_name: &str) -> CmsResult<&Layout> {
		self.layouts
			.get(template_name)
			.ok_or_else(|| CmsError::UnknownLayout(template_name.to_string()))
	}

	/// `(template, title)` choices for an entity type, sorted by title
	pub fn get_templates(&self, content_type: &ContentType) -> Vec<(String, String)> {
		let mut templates: Vec<(String, String)> = self
			.layouts
			.values()
			.filter(|layout| layout.applies_to(content_type))
			.map(|layout| (layout.template.clone(), layout.title.clone()))
			.collect();
		templates.sort_by(|a, b| a.1.cmp(&b.1));
		templates
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> LayoutRegistry {
		let page = ContentType::new("pages", "Page");
		let mut registry = LayoutRegistry::new();
		registry.register(
			Layout::new("two_column", "Two columns")
				.column("main", "Main content")
				.column("side", "Sidebar"),
		);
		registry.register(Layout::new("blank", "Blank").column("content", "Content"));
		registry.register(
			Layout::new("landing", "A landing page")
				.column("hero", "Hero")
				.for_model(page),
		);
		registry
	}

	#[rstest]
	fn test_columns_keep_declared_order(registry: LayoutRegistry) {
		let layout = registry.get_layout("two_column").unwrap();

		assert_eq!(layout.column_names().collect::<Vec<_>>(), vec!["main", "side"]);
		assert_eq!(layout.get_column_name("side"), "Sidebar");
		assert_eq!(layout.get_column_name("extra_wide"), "Extra wide");
	}

	#[rstest]
	fn test_unknown_layout(registry: LayoutRegistry) {
		assert!(matches!(registry.get_layout("missing"), Err(CmsError::UnknownLayout(_))));
	}

	#[rstest]
	fn test_templates_sorted_by_title(registry: LayoutRegistry) {
		let templates = registry.get_templates(&ContentType::new("pages", "Page"));

		let titles: Vec<&str> = templates.iter().map(|(_, t)| t.as_str()).collect();
		assert_eq!(titles, vec!["A landing page", "Blank", "Two columns"]);
	}

	#[rstest]
	fn test_templates_respect_model_restriction(registry: LayoutRegistry) {
		let templates = registry.get_templates(&ContentType::new("blog", "Post"));

		assert!(templates.iter().all(|(template, _)| template != "landing"));
		assert_eq!(templates.len(), 2);
	}
}
