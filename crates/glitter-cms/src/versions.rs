//! Draft/publish lifecycle and block edits
//!
//! Every editor works on their own draft of an entity. Publishing a draft
//! assigns it the next version number, after which it never changes again.
//! Block edits are accepted only on drafts, and only from the draft's owner.

use crate::error::{CmsError, CmsResult};
use crate::models::{ContentBlock, ContentBlockId, NewVersion, ObjectRef, UserId, Version, VersionId};
use crate::ordering::MoveBlock;
use crate::site::GlitterSite;
use std::collections::BTreeSet;

/// Version lifecycle operations over a [`GlitterSite`]
pub struct VersionService<'a> {
	site: &'a GlitterSite,
}

impl<'a> VersionService<'a> {
	/// Create a service for a site
	pub fn new(site: &'a GlitterSite) -> Self {
		Self { site }
	}

	/// The owner's unpublished draft of an entity, if any
	pub fn current_draft(&self, object: &ObjectRef, owner: UserId) -> CmsResult<Option<Version>> {
		Ok(self
			.site
			.versions
			.versions_for(object)?
			.into_iter()
			.find(|v| v.is_draft() && v.owner == owner))
	}

	/// The published version with the highest number
	pub fn latest_published(&self, object: &ObjectRef) -> CmsResult<Option<Version>> {
		Ok(self
			.site
			.versions
			.versions_for(object)?
			.into_iter()
			.filter(Version::is_published)
			.max_by_key(|v| v.version_number))
	}

	/// Return the owner's draft, creating it when needed
	///
	/// A new draft copies the blocks and payloads of the latest published
	/// version, or starts empty on `template_name` when nothing has been
	/// published yet.
	pub fn start_editing(
		&self,
		object: &ObjectRef,
		owner: UserId,
		template_name: &str,
	) -> CmsResult<Version> {
		self.require_edit(owner, object)?;

		if let Some(draft) = self.current_draft(object, owner)? {
			return Ok(draft);
		}

		let Some(published) = self.latest_published(object)? else {
			self.offered_layout(object, template_name)?;
			let Some(draft) = self.insert_draft(object, owner, template_name)? else {
				return self.concurrent_draft(object, owner);
			};
			tracing::info!(version = draft.id, object = %object, owner, "started empty draft");
			return Ok(draft);
		};

		let Some(draft) = self.insert_draft(object, owner, &published.template_name)? else {
			return self.concurrent_draft(object, owner);
		};

		for block in self.site.blocks.blocks_for_version(published.id)? {
			let object_id = match block.object_id {
				Some(id) => match self.site.payloads.get_payload(&block.content_type, id)? {
					Some(data) => Some(self.site.payloads.insert_payload(&block.content_type, data)?),
					None => None,
				},
				None => None,
			};
			// Blocks arrive in position order, so appending keeps it
			self.site.blocks.insert_block(
				draft.id,
				&block.column,
				block.content_type,
				object_id,
				None,
			)?;
		}

		tracing::info!(
			version = draft.id,
			from = published.id,
			object = %object,
			owner,
			"started draft from published version"
		);
		Ok(draft)
	}

	/// Publish a draft as the entity's next version number
	pub fn publish(&self, version_id: VersionId, user: UserId) -> CmsResult<Version> {
		let version = self.site.versions.get_version(version_id)?;
		if !self
			.site
			.permissions
			.can_publish(user, &version.object.content_type)
		{
			return Err(CmsError::PermissionDenied(format!(
				"cannot publish {}",
				version.object
			)));
		}

		let version = self.site.versions.publish_version(version_id)?;

		tracing::info!(
			version = version_id,
			version_number = version.version_number,
			object = %version.object,
			"published version"
		);
		Ok(version)
	}

	/// Switch a draft to another layout offered for its entity type
	pub fn change_template(
		&self,
		version_id: VersionId,
		user: UserId,
		template_name: &str,
	) -> CmsResult<Version> {
		let mut version = self.editable_draft(version_id, user)?;
		self.offered_layout(&version.object, template_name)?;

		version.template_name = template_name.to_string();
		self.site.versions.update_version(&version)?;
		self.site.versions.touch_version(version_id)
	}

	/// Add a block of `type_tag` to a column of a draft
	///
	/// `position` is 1-based; `None` appends.
	pub fn add_block(
		&self,
		version_id: VersionId,
		user: UserId,
		column: &str,
		type_tag: &str,
		position: Option<u32>,
	) -> CmsResult<ContentBlock> {
		let version = self.editable_draft(version_id, user)?;
		self.declared_column(&version, column)?;
		let kind = self.site.library.get_kind(type_tag)?;

		let block = self.site.blocks.insert_block(
			version_id,
			column,
			kind.content_type().clone(),
			None,
			position,
		)?;
		self.site.versions.touch_version(version_id)?;

		tracing::debug!(
			version = version_id,
			content_block = block.id,
			column = %column,
			block_type = %type_tag,
			"added block"
		);
		Ok(block)
	}

	/// Move a block within its column, returning the renumbered column
	pub fn move_block(
		&self,
		content_block_id: ContentBlockId,
		user: UserId,
		direction: MoveBlock,
	) -> CmsResult<Vec<ContentBlock>> {
		let (_, version) = self.editable_block(content_block_id, user)?;
		let column = self.site.blocks.move_block(content_block_id, direction)?;
		self.site.versions.touch_version(version.id)?;
		Ok(column)
	}

	/// Move a block to the end of another column
	pub fn change_column(
		&self,
		content_block_id: ContentBlockId,
		user: UserId,
		column: &str,
	) -> CmsResult<ContentBlock> {
		let (_, version) = self.editable_block(content_block_id, user)?;
		self.declared_column(&version, column)?;
		let block = self.site.blocks.change_column(content_block_id, column)?;
		self.site.versions.touch_version(version.id)?;
		Ok(block)
	}

	/// Delete a block and its payload
	pub fn delete_block(&self, content_block_id: ContentBlockId, user: UserId) -> CmsResult<ContentBlock> {
		let (_, version) = self.editable_block(content_block_id, user)?;
		let block = self.site.blocks.delete_block(content_block_id)?;
		if let Some(object_id) = block.object_id {
			self.site
				.payloads
				.delete_payload(&block.content_type, object_id)?;
		}
		self.site.versions.touch_version(version.id)?;
		Ok(block)
	}

	/// Remove blocks of `type_tag` whose payload `field` is an empty string
	///
	/// Applies to every version, published or not. Returns the number of
	/// blocks removed.
	pub fn delete_empty_blocks(&self, type_tag: &str, field: &str) -> CmsResult<usize> {
		let kind = self.site.library.get_kind(type_tag)?;
		let content_type = kind.content_type();

		let mut removed = 0;
		let mut touched = BTreeSet::new();
		for block in self.site.blocks.blocks_of_type(content_type)? {
			let Some(object_id) = block.object_id else {
				continue;
			};
			let Some(data) = self.site.payloads.get_payload(content_type, object_id)? else {
				continue;
			};
			if data.get(field).and_then(|v| v.as_str()) != Some("") {
				continue;
			}

			self.site.blocks.delete_block(block.id)?;
			self.site.payloads.delete_payload(content_type, object_id)?;
			touched.insert(block.version_id);
			removed += 1;
		}

		tracing::info!(
			block_type = %type_tag,
			removed,
			versions = touched.len(),
			"deleted empty blocks"
		);
		Ok(removed)
	}

	/// Insert an empty draft, or `None` when the owner already has one
	fn insert_draft(
		&self,
		object: &ObjectRef,
		owner: UserId,
		template_name: &str,
	) -> CmsResult<Option<Version>> {
		match self
			.site
			.versions
			.insert_version(NewVersion::draft(object.clone(), owner, template_name))
		{
			Ok(draft) => Ok(Some(draft)),
			Err(CmsError::DuplicateDraft(_)) => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// The draft another request created between our lookup and insert
	fn concurrent_draft(&self, object: &ObjectRef, owner: UserId) -> CmsResult<Version> {
		tracing::debug!(object = %object, owner, "draft created concurrently, reusing it");
		self.current_draft(object, owner)?.ok_or_else(|| {
			CmsError::DuplicateDraft(format!("user {owner} on {object}"))
		})
	}

	fn require_edit(&self, user: UserId, object: &ObjectRef) -> CmsResult<()> {
		if self.site.permissions.can_edit(user, &object.content_type) {
			Ok(())
		} else {
			Err(CmsError::PermissionDenied(format!("cannot edit {object}")))
		}
	}

	fn editable_draft(&self, version_id: VersionId, user: UserId) -> CmsResult<Version> {
		let version = self.site.versions.get_version(version_id)?;
		self.require_edit(user, &version.object)?;
		if version.is_published() {
			return Err(CmsError::PublishedVersion(version_id));
		}
		if version.owner != user {
			return Err(CmsError::PermissionDenied(format!(
				"version {version_id} belongs to another editor"
			)));
		}
		Ok(version)
	}

	fn editable_block(
		&self,
		content_block_id: ContentBlockId,
		user: UserId,
	) -> CmsResult<(ContentBlock, Version)> {
		let block = self.site.blocks.get_content_block(content_block_id)?;
		let version = self.editable_draft(block.version_id, user)?;
		Ok((block, version))
	}

	fn declared_column(&self, version: &Version, column: &str) -> CmsResult<()> {
		let layout = self.site.layouts.get_layout(&version.template_name)?;
		if layout.has_column(column) {
			Ok(())
		} else {
			Err(CmsError::UnknownColumn(column.to_string()))
		}
	}

	fn offered_layout(&self, object: &ObjectRef, template_name: &str) -> CmsResult<()> {
		let layout = self.site.layouts.get_layout(template_name)?;
		if layout.applies_to(&object.content_type) {
			Ok(())
		} else {
			Err(CmsError::UnknownLayout(format!(
				"{template_name} is not offered for {}",
				object.content_type
			)))
		}
	}
}
