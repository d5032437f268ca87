//! Storage traits and the in-memory store
//!
//! Three stores back the page model: versions, content blocks and block
//! payloads. Operations that renumber a column read the whole sibling set
//! and write it back as one unit; implementations must make that unit
//! atomic with respect to other renumberings of the same column.
//!
//! [`InMemoryStore`] implements all three behind a single lock.

use crate::error::{CmsError, CmsResult};
use crate::models::{
	ContentBlock, ContentBlockId, ContentType, NewVersion, ObjectId, ObjectRef, Version,
	VersionId,
};
use crate::ordering::{MoveBlock, reindex, renumber};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

/// Persistence of [`Version`] records
pub trait VersionStore: Send + Sync {
	/// Fetch a version
	fn get_version(&self, id: VersionId) -> CmsResult<Version>;

	/// All versions of an entity, oldest modification first
	fn versions_for(&self, object: &ObjectRef) -> CmsResult<Vec<Version>>;

	/// Create a version
	///
	/// Fails when the owner already has a draft of the entity, or when the
	/// publish number is already taken.
	fn insert_version(&self, new: NewVersion) -> CmsResult<Version>;

	/// Overwrite a version record
	///
	/// Fails when the record's publish number is held by another version of
	/// the same entity.
	fn update_version(&self, version: &Version) -> CmsResult<()>;

	/// Set `modified` to now and return the updated record
	fn touch_version(&self, id: VersionId) -> CmsResult<Version>;

	/// Publish a draft under the entity's next version number
	///
	/// Reading the highest number and assigning its successor happen as one
	/// atomic unit, so concurrent publishes of the same entity never share a
	/// number. `modified` is set to now.
	fn publish_version(&self, id: VersionId) -> CmsResult<Version>;
}

/// Persistence of [`ContentBlock`] records and their ordering
pub trait ContentBlockStore: Send + Sync {
	/// Fetch a content block
	fn get_content_block(&self, id: ContentBlockId) -> CmsResult<ContentBlock>;

	/// All blocks of a version, ordered by column then position
	fn blocks_for_version(&self, version_id: VersionId) -> CmsResult<Vec<ContentBlock>>;

	/// All blocks whose payload has the given content type
	fn blocks_of_type(&self, content_type: &ContentType) -> CmsResult<Vec<ContentBlock>>;

	/// Insert a block into a column
	///
	/// `position` is 1-based; `None` (or a position past the end) appends.
	/// Following siblings shift down by one.
	fn insert_block(
		&self,
		version_id: VersionId,
		column: &str,
		content_type: ContentType,
		object_id: Option<ObjectId>,
		position: Option<u32>,
	) -> CmsResult<ContentBlock>;

	/// Move a block within its column, returning the renumbered column
	fn move_block(&self, id: ContentBlockId, direction: MoveBlock) -> CmsResult<Vec<ContentBlock>>;

	/// Move a block to the end of another column, closing the gap it leaves
	fn change_column(&self, id: ContentBlockId, column: &str) -> CmsResult<ContentBlock>;

	/// Remove a block and renumber its column, returning the removed record
	fn delete_block(&self, id: ContentBlockId) -> CmsResult<ContentBlock>;

	/// Attach a payload to a block
	fn set_object_id(&self, id: ContentBlockId, object_id: ObjectId) -> CmsResult<ContentBlock>;
}

/// Persistence of typed block payloads
pub trait PayloadStore: Send + Sync {
	/// Fetch a payload, `None` when it does not exist
	fn get_payload(&self, content_type: &ContentType, id: ObjectId) -> CmsResult<Option<JsonValue>>;

	/// Store a new payload and return its id
	fn insert_payload(&self, content_type: &ContentType, data: JsonValue) -> CmsResult<ObjectId>;

	/// Replace an existing payload
	fn update_payload(&self, content_type: &ContentType, id: ObjectId, data: JsonValue) -> CmsResult<()>;

	/// Delete a payload; deleting a missing payload is not an error
	fn delete_payload(&self, content_type: &ContentType, id: ObjectId) -> CmsResult<()>;
}

#[derive(Debug, Default)]
struct StoreState {
	next_version_id: VersionId,
	next_block_id: ContentBlockId,
	next_object_id: ObjectId,
	versions: BTreeMap<VersionId, Version>,
	blocks: BTreeMap<ContentBlockId, ContentBlock>,
	payloads: HashMap<(ContentType, ObjectId), JsonValue>,
	last_timestamp: Option<DateTime<Utc>>,
}

impl StoreState {
	/// Strictly increasing timestamps so history order never ties
	fn now(&mut self) -> DateTime<Utc> {
		let mut now = Utc::now();
		if let Some(last) = self.last_timestamp
			&& now <= last
		{
			now = last + Duration::microseconds(1);
		}
		self.last_timestamp = Some(now);
		now
	}

	fn block(&self, id: ContentBlockId) -> CmsResult<&ContentBlock> {
		self.blocks
			.get(&id)
			.ok_or(CmsError::ContentBlockNotFound(id))
	}

	fn column_ids(&self, version_id: VersionId, column: &str) -> Vec<ContentBlockId> {
		let mut siblings: Vec<&ContentBlock> = self
			.blocks
			.values()
			.filter(|b| b.version_id == version_id && b.column == column)
			.collect();
		siblings.sort_by_key(|b| b.position);
		siblings.iter().map(|b| b.id).collect()
	}

	fn apply_positions(&mut self, positions: &[(ContentBlockId, u32)]) {
		for (id, position) in positions {
			if let Some(block) = self.blocks.get_mut(id) {
				block.position = *position;
			}
		}
	}

	fn column_blocks(&self, version_id: VersionId, column: &str) -> Vec<ContentBlock> {
		self.column_ids(version_id, column)
			.iter()
			.filter_map(|id| self.blocks.get(id).cloned())
			.collect()
	}
}

/// Thread-safe in-memory implementation of every store trait
///
/// # Examples
///
/// ```
/// use glitter_cms::models::{ContentType, NewVersion, ObjectRef};
/// use glitter_cms::store::{ContentBlockStore, InMemoryStore, VersionStore};
///
/// let store = InMemoryStore::new();
/// let page = ObjectRef::new(ContentType::new("pages", "Page"), 1);
/// let version = store.insert_version(NewVersion::draft(page, 1, "default")).unwrap();
///
/// let html = ContentType::new("glitter_html", "HTML");
/// let first = store.insert_block(version.id, "main", html.clone(), None, None).unwrap();
/// let second = store.insert_block(version.id, "main", html, None, Some(1)).unwrap();
///
/// let blocks = store.blocks_for_version(version.id).unwrap();
/// assert_eq!(blocks[0].id, second.id);
/// assert_eq!(blocks[1].id, first.id);
/// assert_eq!(blocks[1].position, 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
	state: RwLock<StoreState>,
}

impl InMemoryStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}
}

impl VersionStore for InMemoryStore {
	fn get_version(&self, id: VersionId) -> CmsResult<Version> {
		self.state
			.read()
			.versions
			.get(&id)
			.cloned()
			.ok_or(CmsError::VersionNotFound(id))
	}

	fn versions_for(&self, object: &ObjectRef) -> CmsResult<Vec<Version>> {
		let state = self.state.read();
		let mut versions: Vec<Version> = state
			.versions
			.values()
			.filter(|v| &v.object == object)
			.cloned()
			.collect();
		versions.sort_by_key(|v| v.modified);
		Ok(versions)
	}

	fn insert_version(&self, new: NewVersion) -> CmsResult<Version> {
		let mut state = self.state.write();

		let conflict = state.versions.values().any(|v| {
			v.object == new.object
				&& match new.version_number {
					None => v.is_draft() && v.owner == new.owner,
					Some(number) => v.version_number == Some(number),
				}
		});
		if conflict {
			return Err(match new.version_number {
				None => CmsError::DuplicateDraft(format!("user {} on {}", new.owner, new.object)),
				Some(number) => {
					CmsError::DuplicateVersionNumber(format!("{} on {}", number, new.object))
				}
			});
		}

		state.next_version_id += 1;
		let now = state.now();
		let version = Version {
			id: state.next_version_id,
			object: new.object,
			owner: new.owner,
			version_number: new.version_number,
			template_name: new.template_name,
			created: now,
			modified: now,
		};
		state.versions.insert(version.id, version.clone());
		Ok(version)
	}

	fn update_version(&self, version: &Version) -> CmsResult<()> {
		let mut state = self.state.write();
		if let Some(number) = version.version_number {
			let taken = state.versions.values().any(|v| {
				v.id != version.id && v.object == version.object && v.version_number == Some(number)
			});
			if taken {
				return Err(CmsError::DuplicateVersionNumber(format!(
					"{} on {}",
					number, version.object
				)));
			}
		}
		let slot = state
			.versions
			.get_mut(&version.id)
			.ok_or(CmsError::VersionNotFound(version.id))?;
		*slot = version.clone();
		Ok(())
	}

	fn touch_version(&self, id: VersionId) -> CmsResult<Version> {
		let mut state = self.state.write();
		let now = state.now();
		let version = state
			.versions
			.get_mut(&id)
			.ok_or(CmsError::VersionNotFound(id))?;
		version.modified = now;
		Ok(version.clone())
	}

	fn publish_version(&self, id: VersionId) -> CmsResult<Version> {
		let mut state = self.state.write();
		let object = match state.versions.get(&id) {
			None => return Err(CmsError::VersionNotFound(id)),
			Some(version) if version.is_published() => return Err(CmsError::PublishedVersion(id)),
			Some(version) => version.object.clone(),
		};

		let next = state
			.versions
			.values()
			.filter(|v| v.object == object)
			.filter_map(|v| v.version_number)
			.max()
			.unwrap_or(0)
			+ 1;

		let now = state.now();
		let version = state
			.versions
			.get_mut(&id)
			.ok_or(CmsError::VersionNotFound(id))?;
		version.version_number = Some(next);
		version.modified = now;
		Ok(version.clone())
	}
}

impl ContentBlockStore for InMemoryStore {
	fn get_content_block(&self, id: ContentBlockId) -> CmsResult<ContentBlock> {
		self.state.read().block(id).cloned()
	}

	fn blocks_for_version(&self, version_id: VersionId) -> CmsResult<Vec<ContentBlock>> {
		let state = self.state.read();
		let mut blocks: Vec<ContentBlock> = state
			.blocks
			.values()
			.filter(|b| b.version_id == version_id)
			.cloned()
			.collect();
		blocks.sort_by(|a, b| a.column.cmp(&b.column).then(a.position.cmp(&b.position)));
		Ok(blocks)
	}

	fn blocks_of_type(&self, content_type: &ContentType) -> CmsResult<Vec<ContentBlock>> {
		Ok(self
			.state
			.read()
			.blocks
			.values()
			.filter(|b| &b.content_type == content_type)
			.cloned()
			.collect())
	}

	fn insert_block(
		&self,
		version_id: VersionId,
		column: &str,
		content_type: ContentType,
		object_id: Option<ObjectId>,
		position: Option<u32>,
	) -> CmsResult<ContentBlock> {
		let mut state = self.state.write();
		if !state.versions.contains_key(&version_id) {
			return Err(CmsError::VersionNotFound(version_id));
		}

		let mut ids = state.column_ids(version_id, column);
		let index = match position {
			Some(0) => {
				return Err(CmsError::InvalidMove("positions start at 1".to_string()));
			}
			Some(p) => (p as usize - 1).min(ids.len()),
			None => ids.len(),
		};

		state.next_block_id += 1;
		let block = ContentBlock {
			id: state.next_block_id,
			version_id,
			column: column.to_string(),
			position: 0,
			content_type,
			object_id,
		};
		ids.insert(index, block.id);
		state.blocks.insert(block.id, block);
		state.apply_positions(&renumber(&ids));

		state.block(ids[index]).cloned()
	}

	fn move_block(&self, id: ContentBlockId, direction: MoveBlock) -> CmsResult<Vec<ContentBlock>> {
		let mut state = self.state.write();
		let block = state.block(id)?.clone();

		let ids = state.column_ids(block.version_id, &block.column);
		let old_index = ids
			.iter()
			.position(|b| *b == id)
			.ok_or(CmsError::ContentBlockNotFound(id))?;
		let new_index = direction.target_index(old_index, ids.len())?;
		let positions = reindex(&ids, old_index, new_index)?;
		state.apply_positions(&positions);

		Ok(state.column_blocks(block.version_id, &block.column))
	}

	fn change_column(&self, id: ContentBlockId, column: &str) -> CmsResult<ContentBlock> {
		let mut state = self.state.write();
		let block = state.block(id)?.clone();
		if block.column == column {
			return Ok(block);
		}

		let remaining: Vec<ContentBlockId> = state
			.column_ids(block.version_id, &block.column)
			.into_iter()
			.filter(|b| *b != id)
			.collect();
		let mut target = state.column_ids(block.version_id, column);
		target.push(id);

		if let Some(moved) = state.blocks.get_mut(&id) {
			moved.column = column.to_string();
		}
		state.apply_positions(&renumber(&remaining));
		state.apply_positions(&renumber(&target));

		state.block(id).cloned()
	}

	fn delete_block(&self, id: ContentBlockId) -> CmsResult<ContentBlock> {
		let mut state = self.state.write();
		let removed = state
			.blocks
			.remove(&id)
			.ok_or(CmsError::ContentBlockNotFound(id))?;

		let remaining = state.column_ids(removed.version_id, &removed.column);
		state.apply_positions(&renumber(&remaining));

		Ok(removed)
	}

	fn set_object_id(&self, id: ContentBlockId, object_id: ObjectId) -> CmsResult<ContentBlock> {
		let mut state = self.state.write();
		let block = state
			.blocks
			.get_mut(&id)
			.ok_or(CmsError::ContentBlockNotFound(id))?;
		block.object_id = Some(object_id);
		Ok(block.clone())
	}
}

impl PayloadStore for InMemoryStore {
	fn get_payload(&self, content_type: &ContentType, id: ObjectId) -> CmsResult<Option<JsonValue>> {
		Ok(self
			.state
			.read()
			.payloads
			.get(&(content_type.clone(), id))
			.cloned())
	}

	fn insert_payload(&self, content_type: &ContentType, data: JsonValue) -> CmsResult<ObjectId> {
		let mut state = self.state.write();
		state.next_object_id += 1;
		let id = state.next_object_id;
		state.payloads.insert((content_type.clone(), id), data);
		Ok(id)
	}

	fn update_payload(&self, content_type: &ContentType, id: ObjectId, data: JsonValue) -> CmsResult<()> {
		let mut state = self.state.write();
		let slot = state
			.payloads
			.get_mut(&(content_type.clone(), id))
			.ok_or_else(|| CmsError::ObjectNotFound(format!("{}#{}", content_type, id)))?;
		*slot = data;
		Ok(())
	}

	fn delete_payload(&self, content_type: &ContentType, id: ObjectId) -> CmsResult<()> {
		self.state
			.write()
			.payloads
			.remove(&(content_type.clone(), id));
		Ok(())
	}
}
