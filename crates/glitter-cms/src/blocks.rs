//! Block library
//!
//! Block kinds (rich text, image, raw HTML, embeds, ...) share a single
//! capability: a type tag and a render entry point. The library maps type
//! tags to kinds, groups kinds into categories for the "add block" control
//! and resolves render entry points by their `"module.function"` path.
//!
//! The library is built once at startup and handed to [`GlitterSite`]; it is
//! never mutated while rendering.
//!
//! [`GlitterSite`]: crate::site::GlitterSite

use crate::error::{CmsError, CmsResult};
use crate::models::{ContentBlock, ContentType, RequestContext};
use glitter_conf::DefaultBlock;
use glitter_template::capfirst;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Render entry point of a block kind
///
/// Called with the block payload (`None` when the block has not been saved
/// yet), the request, the rerender flag, the owning content block and the
/// computed CSS classes. Implementations must tolerate a missing payload.
pub type RenderFn = Arc<
	dyn Fn(Option<&JsonValue>, &RequestContext, bool, &ContentBlock, &[String]) -> CmsResult<String>
		+ Send
		+ Sync,
>;

/// A registered kind of block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockKind {
	content_type: ContentType,
	object_name: String,
	verbose_name: String,
	render_function: String,
}

impl BlockKind {
	/// Describe a block kind
	///
	/// `object_name` keeps its case (`HTML`, `ImageBlock`) and forms the type
	/// tag together with the app label.
	pub fn new(
		app_label: impl Into<String>,
		object_name: impl Into<String>,
		verbose_name: impl Into<String>,
		render_function: impl Into<String>,
	) -> Self {
		let object_name = object_name.into();
		Self {
			content_type: ContentType::new(app_label, &object_name),
			object_name,
			verbose_name: verbose_name.into(),
			render_function: render_function.into(),
		}
	}

	/// `app_label.ObjectName`
	pub fn type_tag(&self) -> String {
		format!("{}.{}", self.content_type.app_label, self.object_name)
	}

	/// Content type of the payload records
	pub fn content_type(&self) -> &ContentType {
		&self.content_type
	}

	/// Human readable name
	pub fn verbose_name(&self) -> &str {
		&self.verbose_name
	}

	/// Verbose name with the first letter capitalised
	pub fn label(&self) -> String {
		capfirst(&self.verbose_name)
	}

	/// `"module.function"` path of the render entry point
	pub fn render_function(&self) -> &str {
		&self.render_function
	}
}

/// Registry of block kinds, categories and render functions
#[derive(Default)]
pub struct BlockLibrary {
	kinds: IndexMap<String, BlockKind>,
	by_content_type: HashMap<ContentType, String>,
	categories: BTreeMap<String, Vec<String>>,
	render_functions: HashMap<String, RenderFn>,
}

impl fmt::Debug for BlockLibrary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockLibrary")
			.field("kinds", &self.kinds.keys().collect::<Vec<_>>())
			.field("categories", &self.categories)
			.field("render_functions", &self.render_functions.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl BlockLibrary {
	/// Create an empty library
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a block kind, replacing one with the same type tag
	///
	/// A type tag always maps to the same content type. Object names that
	/// differ only in case share a content type, so registering one of them
	/// replaces the other kind entirely.
	pub fn register(&mut self, kind: BlockKind) {
		let tag = kind.type_tag();
		tracing::debug!(block_type = %tag, "registering block kind");

		if let Some(other) = self.by_content_type.get(&kind.content_type).cloned()
			&& other != tag
		{
			tracing::warn!(
				block_type = %tag,
				replaced = %other,
				content_type = %kind.content_type,
				"block kind claims a registered content type, replacing"
			);
			self.kinds.shift_remove(&other);
			for entries in self.categories.values_mut() {
				entries.retain(|t| t != &other);
			}
		}

		self.by_content_type
			.insert(kind.content_type.clone(), tag.clone());
		self.kinds.insert(tag, kind);
	}

	/// Register a kind and list it under a category in one step
	pub fn register_in(&mut self, kind: BlockKind, category: impl Into<String>) {
		let tag = kind.type_tag();
		self.register(kind);
		let entries = self.categories.entry(category.into()).or_default();
		if !entries.contains(&tag) {
			entries.push(tag);
		}
	}

	/// List an already registered kind under a category
	pub fn register_block(&mut self, type_tag: &str, category: impl Into<String>) -> CmsResult<()> {
		if !self.kinds.contains_key(type_tag) {
			return Err(CmsError::UnknownBlockType(type_tag.to_string()));
		}
		let entries = self.categories.entry(category.into()).or_default();
		if !entries.iter().any(|t| t == type_tag) {
			entries.push(type_tag.to_string());
		}
		Ok(())
	}

	/// Remove a kind from a category; unknown entries are ignored
	pub fn unregister_block(&mut self, type_tag: &str, category: &str) {
		if let Some(entries) = self.categories.get_mut(category) {
			entries.retain(|t| t != type_tag);
		}
	}

	/// Register a render entry point under its `"module.function"` path
	pub fn register_render_function<F>(&mut self, path: impl Into<String>, render: F)
	where
		F: Fn(Option<&JsonValue>, &RequestContext, bool, &ContentBlock, &[String]) -> CmsResult<String>
			+ Send
			+ Sync
			+ 'static,
	{
		self.render_functions.insert(path.into(), Arc::new(render));
	}

	/// Look up a kind by type tag
	pub fn get(&self, type_tag: &str) -> Option<&BlockKind> {
		self.kinds.get(type_tag)
	}

	/// Look up a kind by type tag, failing for unknown tags
	pub fn get_kind(&self, type_tag: &str) -> CmsResult<&BlockKind> {
		self.get(type_tag)
			.ok_or_else(|| CmsError::UnknownBlockType(type_tag.to_string()))
	}

	/// Look up the kind whose payloads have the given content type
	pub fn get_by_content_type(&self, content_type: &ContentType) -> CmsResult<&BlockKind> {
		self.by_content_type
			.get(content_type)
			.and_then(|tag| self.kinds.get(tag))
			.ok_or_else(|| CmsError::UnknownBlockType(content_type.to_string()))
	}

	/// Resolve the render entry point declared by a kind
	pub fn resolve_render_function(&self, kind: &BlockKind) -> CmsResult<&RenderFn> {
		self.render_functions
			.get(kind.render_function())
			.ok_or_else(|| CmsError::UnknownRenderFunction(kind.render_function().to_string()))
	}

	/// Choices for the "add block" control
	///
	/// Categories are sorted by name, entries within a category by label.
	pub fn add_block_options(&self) -> Vec<(String, Vec<(String, String)>)> {
		self.categories
			.iter()
			.map(|(category, tags)| {
				let mut choices: Vec<(String, String)> = tags
					.iter()
					.filter_map(|tag| self.kinds.get(tag))
					.map(|kind| (kind.type_tag(), kind.label()))
					.collect();
				choices.sort_by(|a, b| a.1.cmp(&b.1));
				(category.clone(), choices)
			})
			.collect()
	}

	/// Quick-add defaults derived from well-known tags
	///
	/// Tags that are not registered are skipped; order follows `fallback_tags`.
	pub fn fallback_default_blocks(&self, fallback_tags: &[String]) -> Vec<DefaultBlock> {
		fallback_tags
			.iter()
			.filter_map(|tag| match self.kinds.get(tag) {
				Some(kind) => Some(DefaultBlock::new(tag.clone(), kind.label())),
				None => {
					tracing::warn!(block_type = %tag, "fallback block not installed, skipping");
					None
				}
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	fn noop(
		_block: Option<&JsonValue>,
		_request: &RequestContext,
		_rerender: bool,
		_content_block: &ContentBlock,
		_classes: &[String],
	) -> CmsResult<String> {
		Ok(String::new())
	}

	#[fixture]
	fn library() -> BlockLibrary {
		let mut library = BlockLibrary::new();
		library.register_in(
			BlockKind::new("glitter_html", "HTML", "HTML", "glitter_html.render"),
			"Text",
		);
		library.register_in(
			BlockKind::new("glitter_redactor", "Redactor", "text", "glitter_redactor.render"),
			"Text",
		);
		library.register_in(
			BlockKind::new("glitter_image", "ImageBlock", "image block", "glitter_image.render"),
			"Media",
		);
		library.register_render_function("glitter_html.render", noop);
		library
	}

	#[rstest]
	fn test_type_tag_keeps_object_name_case() {
		let kind = BlockKind::new("glitter_image", "ImageBlock", "image block", "x.y");

		assert_eq!(kind.type_tag(), "glitter_image.ImageBlock");
		assert_eq!(kind.content_type(), &ContentType::new("glitter_image", "imageblock"));
		assert_eq!(kind.label(), "Image block");
	}

	#[rstest]
	fn test_add_block_options_sorted(library: BlockLibrary) {
		let options = library.add_block_options();

		assert_eq!(
			options,
			vec![
				(
					"Media".to_string(),
					vec![("glitter_image.ImageBlock".to_string(), "Image block".to_string())]
				),
				(
					"Text".to_string(),
					vec![
						("glitter_html.HTML".to_string(), "HTML".to_string()),
						("glitter_redactor.Redactor".to_string(), "Text".to_string()),
					]
				),
			]
		);
	}

	#[rstest]
	fn test_register_block_requires_known_kind(mut library: BlockLibrary) {
		assert!(library.register_block("glitter_html.HTML", "Advanced").is_ok());
		assert!(matches!(
			library.register_block("missing.Block", "Advanced"),
			Err(CmsError::UnknownBlockType(_))
		));
	}

	#[rstest]
	fn test_unregister_block(mut library: BlockLibrary) {
		library.unregister_block("glitter_html.HTML", "Text");
		library.unregister_block("glitter_html.HTML", "Nonexistent");

		let text = &library.add_block_options()[1].1;
		assert_eq!(text.len(), 1);
		assert_eq!(text[0].0, "glitter_redactor.Redactor");
	}

	#[rstest]
	fn test_resolve_render_function(library: BlockLibrary) {
		let html = library.get_kind("glitter_html.HTML").unwrap();
		let image = library.get_kind("glitter_image.ImageBlock").unwrap();

		assert!(library.resolve_render_function(html).is_ok());
		assert!(matches!(
			library.resolve_render_function(image),
			Err(CmsError::UnknownRenderFunction(_))
		));
	}

	#[rstest]
	fn test_lookup_by_content_type(library: BlockLibrary) {
		let kind = library
			.get_by_content_type(&ContentType::new("glitter_html", "html"))
			.unwrap();

		assert_eq!(kind.type_tag(), "glitter_html.HTML");
	}

	#[rstest]
	fn test_case_colliding_object_names_replace_each_other(mut library: BlockLibrary) {
		// Arrange
		let shouting = BlockKind::new("glitter_image", "IMAGEBLOCK", "loud image", "x.y");

		// Act
		library.register_in(shouting, "Media");

		// Assert
		assert!(library.get("glitter_image.ImageBlock").is_none());
		let kind = library
			.get_by_content_type(&ContentType::new("glitter_image", "imageblock"))
			.unwrap();
		assert_eq!(kind.type_tag(), "glitter_image.IMAGEBLOCK");
		assert_eq!(
			library.add_block_options()[0],
			(
				"Media".to_string(),
				vec![("glitter_image.IMAGEBLOCK".to_string(), "Loud image".to_string())]
			)
		);
	}

	#[rstest]
	fn test_register_in_twice_lists_kind_once(mut library: BlockLibrary) {
		library.register_in(
			BlockKind::new("glitter_image", "ImageBlock", "image block", "glitter_image.render"),
			"Media",
		);

		assert_eq!(library.add_block_options()[0].1.len(), 1);
	}

	#[rstest]
	fn test_fallback_skips_missing_kinds() {
		// Arrange
		let mut library = BlockLibrary::new();
		library.register(BlockKind::new("glitter_html", "HTML", "HTML", "x.y"));
		library.register(BlockKind::new("glitter_redactor", "Redactor", "text", "x.y"));
		let fallback: Vec<String> = glitter_conf::FALLBACK_BLOCKS
			.iter()
			.map(|s| s.to_string())
			.collect();

		// Act
		let defaults = library.fallback_default_blocks(&fallback);

		// Assert
		assert_eq!(
			defaults,
			vec![
				DefaultBlock::new("glitter_redactor.Redactor", "Text"),
				DefaultBlock::new("glitter_html.HTML", "HTML"),
			]
		);
	}
}
