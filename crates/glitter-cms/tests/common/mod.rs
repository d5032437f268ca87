//! Shared site fixture for integration tests

#![allow(dead_code)]

use glitter_cms::prelude::*;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Editor with edit and publish rights
pub const EDITOR: UserId = 1;
/// Second editor with edit rights only
pub const OTHER_EDITOR: UserId = 2;
/// Authenticated user without rights
pub const VISITOR: UserId = 3;

pub const TEXT: &str = "glitter_redactor.Redactor";
pub const HTML: &str = "glitter_html.HTML";
pub const IMAGE: &str = "glitter_image.ImageBlock";
pub const BROKEN: &str = "glitter_broken.Broken";

pub fn page_type() -> ContentType {
	ContentType::new("pages", "Page")
}

pub fn page() -> ObjectRef {
	ObjectRef::new(page_type(), 1)
}

fn render_markup(
	block: Option<&JsonValue>,
	_request: &RequestContext,
	_rerender: bool,
	content_block: &ContentBlock,
	css_classes: &[String],
) -> CmsResult<String> {
	let content = block
		.and_then(|b| b["content"].as_str())
		.unwrap_or_default();
	Ok(format!(
		r#"<div class="{}" data-id="{}">{}</div>"#,
		css_classes.join(" "),
		content_block.id,
		content
	))
}

pub fn layouts() -> LayoutRegistry {
	let mut layouts = LayoutRegistry::new();
	layouts.register(
		Layout::new("default", "Default")
			.column("main_content", "Main content")
			.column("sidebar", "Sidebar"),
	);
	layouts.register(Layout::new("wide", "Wide").column("main_content", "Main content"));
	layouts.register(
		Layout::new("article", "Article")
			.column("body", "Body")
			.for_model(ContentType::new("news", "Article")),
	);
	layouts
}

/// Library with the text, HTML and failing kinds; `with_image` adds the image kind
pub fn library(with_image: bool) -> BlockLibrary {
	let mut library = BlockLibrary::new();
	library.register_in(
		BlockKind::new("glitter_redactor", "Redactor", "text", "glitter_redactor.render"),
		"Common",
	);
	library.register_in(
		BlockKind::new("glitter_html", "HTML", "HTML", "glitter_html.render"),
		"Common",
	);
	library.register_in(
		BlockKind::new("glitter_broken", "Broken", "broken", "glitter_broken.render"),
		"Testing",
	);
	library.register_render_function("glitter_redactor.render", render_markup);
	library.register_render_function("glitter_html.render", render_markup);
	library.register_render_function("glitter_broken.render", |_, _, _, _, _| {
		Err(CmsError::Render("broken block".to_string()))
	});

	if with_image {
		library.register_in(
			BlockKind::new("glitter_image", "ImageBlock", "image block", "glitter_image.render"),
			"Media",
		);
		library.register_render_function("glitter_image.render", render_markup);
	}
	library
}

pub fn permissions() -> ModelPermissions {
	let permissions = ModelPermissions::new();
	permissions.add_user_permission(EDITOR, "pages.edit_page");
	permissions.add_user_permission(EDITOR, "pages.publish_page");
	permissions.add_user_permission(OTHER_EDITOR, "pages.edit_page");
	permissions
}

/// Site over an existing store, so several configurations can share records
pub fn site_over(store: Arc<InMemoryStore>, layouts: LayoutRegistry, library: BlockLibrary) -> GlitterSite {
	GlitterSite::new(store)
		.unwrap()
		.with_layouts(layouts)
		.with_library(library)
		.with_permissions(Arc::new(permissions()))
}

pub fn site_with(library: BlockLibrary) -> GlitterSite {
	site_over(Arc::new(InMemoryStore::new()), layouts(), library)
}

pub fn site() -> GlitterSite {
	site_with(library(true))
}

/// Add a block and save its payload content
pub fn add_text(site: &GlitterSite, version: &Version, column: &str, content: &str) -> ContentBlock {
	let block = site
		.versions()
		.add_block(version.id, version.owner, column, TEXT, None)
		.unwrap();
	site.block_admin()
		.save_payload(version.owner, block.id, serde_json::json!({ "content": content }))
		.unwrap()
}
