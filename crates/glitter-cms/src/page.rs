//! Page, column and block renderers
//!
//! [`Glitter`] loads every content block of a version in one batch, groups
//! them by column and renders each layout column (in the layout's declared
//! order) through a [`GlitterColumn`], which in turn renders its blocks in
//! position order through [`GlitterBlock`].
//!
//! A failing block render function aborts the whole render; there is no
//! per-block error containment.

use crate::error::{CmsError, CmsResult};
use crate::layouts::Layout;
use crate::models::{ContentBlock, ContentBlockId, RequestContext, UserId, Version};
use crate::navigator::VersionNavigator;
use crate::ordering::MoveBlock;
use crate::site::GlitterSite;
use crate::widgets::Select;
use glitter_conf::DefaultBlock;
use glitter_template::{COLUMN_EDIT_TEMPLATE, COLUMN_TEMPLATE, slugify};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Stored records pointing at a layout or block kind the site no longer registers
fn unregistered(err: CmsError) -> CmsError {
	match err {
		CmsError::UnknownLayout(name) => {
			CmsError::Configuration(format!("layout {name} is not registered"))
		}
		CmsError::UnknownBlockType(name) => {
			CmsError::Configuration(format!("block type {name} is not registered"))
		}
		other => other,
	}
}

/// A page version ready to be rendered
pub struct Glitter<'a> {
	site: &'a GlitterSite,
	version: Version,
	request: RequestContext,
	layout: &'a Layout,
	show_controls: bool,
	column_blocks: HashMap<String, Vec<ContentBlock>>,
	payloads: HashMap<ContentBlockId, JsonValue>,
	navigator: OnceCell<VersionNavigator>,
	default_blocks: OnceCell<Vec<DefaultBlock>>,
}

impl<'a> Glitter<'a> {
	/// Load a version for rendering
	///
	/// Edit controls are shown only when the request has a user holding the
	/// edit permission on the version's entity type.
	pub fn new(
		site: &'a GlitterSite,
		version: Version,
		request: Option<&RequestContext>,
	) -> CmsResult<Self> {
		let request = request.cloned().unwrap_or_default();
		let layout = site
			.layouts
			.get_layout(&version.template_name)
			.map_err(unregistered)?;

		let show_controls = request
			.user
			.is_some_and(|user| site.permissions.can_edit(user, &version.object.content_type));

		// Fetch all content blocks in one go
		let mut column_blocks: HashMap<String, Vec<ContentBlock>> = HashMap::new();
		let mut payloads = HashMap::new();
		for block in site.blocks.blocks_for_version(version.id)? {
			if let Some(object_id) = block.object_id
				&& let Some(data) = site.payloads.get_payload(&block.content_type, object_id)?
			{
				payloads.insert(block.id, data);
			}
			column_blocks
				.entry(block.column.clone())
				.or_default()
				.push(block);
		}
		for blocks in column_blocks.values_mut() {
			blocks.sort_by_key(|b| b.position);
		}

		for column in column_blocks.keys() {
			if !layout.has_column(column) {
				tracing::debug!(
					version = version.id,
					column = %column,
					"blocks in a column the layout does not declare are not rendered"
				);
			}
		}

		Ok(Self {
			site,
			version,
			request,
			layout,
			show_controls,
			column_blocks,
			payloads,
			navigator: OnceCell::new(),
			default_blocks: OnceCell::new(),
		})
	}

	/// Render every layout column, keyed by column name in layout order
	///
	/// Edit mode requires edit controls to be available to the acting user.
	pub fn render(&self, edit_mode: bool, rerender: bool) -> CmsResult<IndexMap<String, String>> {
		if edit_mode && !self.show_controls {
			return Err(CmsError::PermissionDenied(format!(
				"cannot edit {}",
				self.version.object
			)));
		}

		tracing::debug!(
			version = self.version.id,
			template = self.layout.template(),
			edit_mode,
			rerender,
			"rendering page"
		);

		let mut columns = IndexMap::new();
		for column_name in self.layout.column_names() {
			let column = GlitterColumn::new(
				column_name,
				self.layout.get_column_name(column_name),
				self,
				self.column_blocks(column_name),
			);
			columns.insert(column_name.to_string(), column.render(edit_mode, rerender)?);
		}
		Ok(columns)
	}

	/// The version being rendered
	pub fn version(&self) -> &Version {
		&self.version
	}

	/// The version's layout
	pub fn layout(&self) -> &Layout {
		self.layout
	}

	/// The request the page is rendered for
	pub fn request(&self) -> &RequestContext {
		&self.request
	}

	/// The acting user
	pub fn user(&self) -> Option<UserId> {
		self.request.user
	}

	/// Whether edit controls are shown
	pub fn show_controls(&self) -> bool {
		self.show_controls
	}

	/// Blocks of a column in position order; empty for columns without blocks
	pub fn column_blocks(&self, column: &str) -> &[ContentBlock] {
		self.column_blocks
			.get(column)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	fn payload(&self, content_block: &ContentBlock) -> Option<&JsonValue> {
		self.payloads.get(&content_block.id)
	}

	fn navigator(&self) -> CmsResult<&VersionNavigator> {
		self.navigator.get_or_try_init(|| {
			let candidates = self.site.versions.versions_for(&self.version.object)?;
			Ok(VersionNavigator::new(
				self.version.clone(),
				candidates,
				self.request.user,
			))
		})
	}

	/// Versions visible to the acting user, most recently modified first
	pub fn all_versions(&self) -> CmsResult<Vec<&Version>> {
		Ok(self.navigator()?.all_versions().collect())
	}

	/// Previous version in the visible history
	pub fn previous_version(&self) -> CmsResult<Option<&Version>> {
		Ok(self.navigator()?.previous_version())
	}

	/// Next version in the visible history
	pub fn next_version(&self) -> CmsResult<Option<&Version>> {
		Ok(self.navigator()?.next_version())
	}

	/// `(template, title)` choices for the entity type, sorted by title
	pub fn change_template_options(&self) -> Vec<(String, String)> {
		self.site
			.layouts
			.get_templates(&self.version.object.content_type)
	}

	/// Template selector with the current layout selected
	pub fn change_template_widget(&self) -> String {
		Select::new(self.change_template_options())
			.attr("id", "id_template_name")
			.render("template_name", Some(self.layout.template()))
	}

	/// `(column_name, label)` choices of the layout
	pub fn get_column_choices(&self) -> Vec<(String, String)> {
		self.layout.column_choices()
	}

	/// Quick-add blocks shown next to the "add block" selector
	///
	/// Uses the configured list when set, otherwise the installed subset of
	/// the fallback block types in their declared order.
	pub fn default_blocks(&self) -> &[DefaultBlock] {
		self.default_blocks.get_or_init(|| {
			let settings = &self.site.settings;
			match &settings.default_blocks {
				Some(blocks) => blocks.clone(),
				None => self
					.site
					.library
					.fallback_default_blocks(&settings.fallback_blocks),
			}
		})
	}
}

/// One layout column of a page
pub struct GlitterColumn<'g> {
	name: &'g str,
	verbose_name: String,
	glitter: &'g Glitter<'g>,
	blocks: Vec<GlitterBlock<'g>>,
}

#[derive(Serialize)]
struct BlockView {
	content_block_id: ContentBlockId,
	html: String,
	css_classes: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	block_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	edit_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	move_block_widget: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	choose_column_widget: Option<String>,
}

#[derive(Serialize)]
struct DefaultBlockView<'a> {
	type_tag: &'a str,
	label: &'a str,
}

#[derive(Serialize)]
struct EditContext<'a> {
	column_name: &'a str,
	verbose_name: &'a str,
	default_blocks: Vec<DefaultBlockView<'a>>,
	add_block_widget: String,
}

#[derive(Serialize)]
struct ColumnContext<'a> {
	blocks: Vec<BlockView>,
	column_slug: String,
	#[serde(flatten)]
	edit: Option<EditContext<'a>>,
}

impl<'g> GlitterColumn<'g> {
	/// Number the column's blocks 1..N in position order
	pub fn new(
		name: &'g str,
		verbose_name: String,
		glitter: &'g Glitter<'g>,
		content_blocks: &'g [ContentBlock],
	) -> Self {
		let column_len = content_blocks.len();
		let blocks = content_blocks
			.iter()
			.enumerate()
			.map(|(index, content_block)| GlitterBlock {
				content_block,
				block: glitter.payload(content_block),
				column_name: name,
				column_len,
				block_number: index + 1,
				glitter,
			})
			.collect();

		Self {
			name,
			verbose_name,
			glitter,
			blocks,
		}
	}

	/// Column name
	pub fn name(&self) -> &str {
		self.name
	}

	/// Column display label
	pub fn verbose_name(&self) -> &str {
		&self.verbose_name
	}

	/// Block renderers in position order
	pub fn blocks(&self) -> &[GlitterBlock<'g>] {
		&self.blocks
	}

	/// Render all blocks, then the column template
	pub fn render(&self, edit_mode: bool, rerender: bool) -> CmsResult<String> {
		let mut blocks = Vec::with_capacity(self.blocks.len());
		for block in &self.blocks {
			let html = block.render(rerender)?;
			let mut view = BlockView {
				content_block_id: block.content_block.id,
				html,
				css_classes: block.css_classes(),
				block_type: None,
				edit_url: None,
				move_block_widget: None,
				choose_column_widget: None,
			};
			if edit_mode {
				view.block_type = Some(block.block_type()?);
				view.edit_url = Some(block.edit_url());
				view.move_block_widget = Some(block.move_block_widget());
				view.choose_column_widget = Some(block.choose_column_widget());
			}
			blocks.push(view);
		}

		let edit = if edit_mode {
			Some(EditContext {
				column_name: self.name,
				verbose_name: &self.verbose_name,
				default_blocks: self
					.glitter
					.default_blocks()
					.iter()
					.map(|b| DefaultBlockView {
						type_tag: &b.type_tag,
						label: &b.label,
					})
					.collect(),
				add_block_widget: self.add_block_widget(),
			})
		} else {
			None
		};

		let context = ColumnContext {
			blocks,
			column_slug: slugify(self.name),
			edit,
		};
		let template = if edit_mode {
			COLUMN_EDIT_TEMPLATE
		} else {
			COLUMN_TEMPLATE
		};
		Ok(self.glitter.site.templates.render(template, &context)?)
	}

	/// Block types grouped by category, for the "add block" control
	pub fn add_block_options(&self) -> Vec<(String, Vec<(String, String)>)> {
		self.glitter.site.library.add_block_options()
	}

	/// "Add block" selector
	pub fn add_block_widget(&self) -> String {
		Select::grouped(self.add_block_options())
			.attr("class", "glitter-add-block-select")
			.placeholder("Add block")
			.render("", None)
	}
}

/// One block within a column
pub struct GlitterBlock<'g> {
	content_block: &'g ContentBlock,
	block: Option<&'g JsonValue>,
	column_name: &'g str,
	column_len: usize,
	block_number: usize,
	glitter: &'g Glitter<'g>,
}

impl<'g> GlitterBlock<'g> {
	/// The placement record
	pub fn content_block(&self) -> &ContentBlock {
		self.content_block
	}

	/// The payload, `None` until the block has been saved
	pub fn block(&self) -> Option<&JsonValue> {
		self.block
	}

	/// 1-based number within the column
	pub fn block_number(&self) -> usize {
		self.block_number
	}

	/// Positional CSS classes
	pub fn css_classes(&self) -> Vec<String> {
		let mut classes = vec![format!(
			"glitter_page_blocktype_{}",
			self.content_block.content_type.model
		)];

		if self.block_number == 1 {
			classes.push("glitter_page_block_first".to_string());
		}

		if self.block_number % 2 == 0 {
			classes.push("glitter_page_block glitter_page_block_even".to_string());
		} else {
			classes.push("glitter_page_block glitter_page_block_odd".to_string());
		}

		if self.block_number == self.column_len {
			classes.push("glitter_page_block_last".to_string());
		}

		classes
	}

	/// Invoke the block kind's render function
	pub fn render(&self, rerender: bool) -> CmsResult<String> {
		let css_classes = self.css_classes();
		let library = &self.glitter.site.library;
		let kind = library
			.get_by_content_type(&self.content_block.content_type)
			.map_err(unregistered)?;
		let render = library.resolve_render_function(kind)?;

		if self.block.is_none() {
			// Added on the front end but not saved yet
			tracing::debug!(
				content_block = self.content_block.id,
				block_type = %kind.type_tag(),
				"rendering block without a payload"
			);
		}

		render(
			self.block,
			&self.glitter.request,
			rerender,
			self.content_block,
			&css_classes,
		)
	}

	/// Block kind label shown in the block header
	pub fn block_type(&self) -> CmsResult<String> {
		Ok(self
			.glitter
			.site
			.library
			.get_by_content_type(&self.content_block.content_type)
			.map_err(unregistered)?
			.label())
	}

	/// URL of the block's edit view
	pub fn edit_url(&self) -> String {
		let ct = &self.content_block.content_type;
		format!(
			"{}{}/{}/{}/",
			self.glitter.site.settings.block_admin_prefix, ct.app_label, ct.model, self.content_block.id
		)
	}

	/// Column selector with the block's column selected
	pub fn choose_column_widget(&self) -> String {
		Select::new(self.glitter.get_column_choices())
			.attr("class", "glitter-move-column-select")
			.render("", Some(self.column_name))
	}

	/// Moves that change this block's position
	pub fn move_options(&self) -> Vec<(MoveBlock, &'static str)> {
		MoveBlock::ALL
			.into_iter()
			.filter(|m| m.is_available(self.block_number, self.column_len))
			.map(|m| (m, m.label()))
			.collect()
	}

	/// Move selector
	pub fn move_block_widget(&self) -> String {
		let choices = self
			.move_options()
			.into_iter()
			.map(|(m, label)| (m.as_str().to_string(), label.to_string()))
			.collect();
		Select::new(choices)
			.attr("class", "glitter-move-block-select")
			.placeholder("Move")
			.render("", None)
	}
}
