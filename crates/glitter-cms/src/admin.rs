//! Block edit flow and column rerendering
//!
//! The edit screens for individual block payloads live in the host
//! application; this module supplies the checks those screens make and the
//! response they send back after a save so the editor can swap in the
//! freshly rendered column.

use crate::error::{CmsError, CmsResult};
use crate::models::{ContentBlock, ContentBlockId, RequestContext, UserId, Version};
use crate::page::Glitter;
use crate::site::GlitterSite;
use glitter_template::{slugify, to_html_safe_json};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

/// Payload returned to the editor after a block save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerenderResponse {
	/// Slug of the column that was rerendered
	pub column: String,
	/// `{"content": <html>}`, encoded for embedding in markup
	pub rendered_json: String,
}

/// Checks and responses for the block edit views
pub struct BlockAdmin<'a> {
	site: &'a GlitterSite,
}

impl<'a> BlockAdmin<'a> {
	/// Create the admin flow for a site
	pub fn new(site: &'a GlitterSite) -> Self {
		Self { site }
	}

	/// Whether the user may edit the entity that owns the block
	pub fn has_change_permission(&self, user: UserId, content_block_id: ContentBlockId) -> CmsResult<bool> {
		let block = self.site.blocks.get_content_block(content_block_id)?;
		let version = self.site.versions.get_version(block.version_id)?;
		Ok(self
			.site
			.permissions
			.can_edit(user, &version.object.content_type))
	}

	/// Load a block for editing
	///
	/// The block's version must be an unpublished draft owned by `user`.
	pub fn edit_guard(
		&self,
		user: UserId,
		content_block_id: ContentBlockId,
	) -> CmsResult<(ContentBlock, Version)> {
		if !self.has_change_permission(user, content_block_id)? {
			return Err(CmsError::PermissionDenied(format!(
				"cannot change content block {content_block_id}"
			)));
		}

		let block = self.site.blocks.get_content_block(content_block_id)?;
		let version = self.site.versions.get_version(block.version_id)?;
		if version.is_published() || version.owner != user {
			return Err(CmsError::PermissionDenied(format!(
				"content block {content_block_id} is not in your draft"
			)));
		}
		Ok((block, version))
	}

	/// Store a block's payload, attaching it on first save
	pub fn save_payload(
		&self,
		user: UserId,
		content_block_id: ContentBlockId,
		data: JsonValue,
	) -> CmsResult<ContentBlock> {
		let (block, version) = self.edit_guard(user, content_block_id)?;

		let block = match block.object_id {
			Some(object_id) => {
				self.site
					.payloads
					.update_payload(&block.content_type, object_id, data)?;
				block
			}
			None => {
				let object_id = self.site.payloads.insert_payload(&block.content_type, data)?;
				self.site.blocks.set_object_id(content_block_id, object_id)?
			}
		};
		self.site.versions.touch_version(version.id)?;

		tracing::debug!(
			content_block = content_block_id,
			object_id = ?block.object_id,
			"saved block payload"
		);
		Ok(block)
	}

	/// Render the block's column in edit mode for the editor to swap in
	pub fn rerender(&self, user: UserId, content_block_id: ContentBlockId) -> CmsResult<RerenderResponse> {
		let (block, version) = self.edit_guard(user, content_block_id)?;

		let request = RequestContext::for_user(user);
		let glitter = Glitter::new(self.site, version, Some(&request))?;
		let mut columns = glitter.render(true, true)?;
		let content = columns
			.swap_remove(&block.column)
			.ok_or_else(|| CmsError::UnknownColumn(block.column.clone()))?;

		Ok(RerenderResponse {
			column: slugify(&block.column),
			rendered_json: to_html_safe_json(&json!({ "content": content }))?,
		})
	}
}
