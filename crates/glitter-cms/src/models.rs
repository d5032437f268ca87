//! Persistent records: content types, versions and content blocks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a [`Version`]
pub type VersionId = i64;

/// Primary key of a [`ContentBlock`]
pub type ContentBlockId = i64;

/// Primary key of an entity or block payload
pub type ObjectId = i64;

/// Primary key of a user
pub type UserId = i64;

/// Content type identifying a model class
///
/// The model name is stored lowercased, so `ContentType::new("glitter_html", "HTML")`
/// and `ContentType::new("glitter_html", "html")` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentType {
	/// Application label
	pub app_label: String,
	/// Lowercased model name
	pub model: String,
}

impl ContentType {
	/// Create a content type
	pub fn new(app_label: impl Into<String>, model: impl AsRef<str>) -> Self {
		Self {
			app_label: app_label.into(),
			model: model.as_ref().to_lowercase(),
		}
	}

	/// Permission codename for an action on this model, e.g. `pages.edit_page`
	pub fn permission(&self, action: &str) -> String {
		format!("{}.{}_{}", self.app_label, action, self.model)
	}
}

impl fmt::Display for ContentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.app_label, self.model)
	}
}

/// Polymorphic reference to an entity (content type + id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
	/// Entity class
	pub content_type: ContentType,
	/// Entity id
	pub object_id: ObjectId,
}

impl ObjectRef {
	/// Create an object reference
	pub fn new(content_type: ContentType, object_id: ObjectId) -> Self {
		Self {
			content_type,
			object_id,
		}
	}
}

impl fmt::Display for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.content_type, self.object_id)
	}
}

/// One editable or published snapshot of a page's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
	/// Primary key
	pub id: VersionId,
	/// Owning content entity
	pub object: ObjectRef,
	/// Editor who created the version
	pub owner: UserId,
	/// Publish number, `None` while the version is a draft
	pub version_number: Option<u32>,
	/// Layout identifier
	pub template_name: String,
	/// Creation time
	pub created: DateTime<Utc>,
	/// Last modification time
	pub modified: DateTime<Utc>,
}

impl Version {
	/// Whether a publish number has been assigned
	pub fn is_published(&self) -> bool {
		self.version_number.is_some()
	}

	/// Whether this is an unpublished draft
	pub fn is_draft(&self) -> bool {
		self.version_number.is_none()
	}

	/// Published versions are visible to everyone, drafts only to their owner
	pub fn is_visible_to(&self, user: Option<UserId>) -> bool {
		self.is_published() || Some(self.owner) == user
	}
}

/// Fields needed to create a [`Version`]
#[derive(Debug, Clone)]
pub struct NewVersion {
	/// Owning content entity
	pub object: ObjectRef,
	/// Editor creating the version
	pub owner: UserId,
	/// Layout identifier
	pub template_name: String,
	/// Publish number; `None` creates a draft
	pub version_number: Option<u32>,
}

impl NewVersion {
	/// A new draft
	pub fn draft(object: ObjectRef, owner: UserId, template_name: impl Into<String>) -> Self {
		Self {
			object,
			owner,
			template_name: template_name.into(),
			version_number: None,
		}
	}

	/// A version that is already published with the given number
	pub fn published(mut self, version_number: u32) -> Self {
		self.version_number = Some(version_number);
		self
	}
}

/// Placement of a typed block inside one column of a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
	/// Primary key
	pub id: ContentBlockId,
	/// Owning version
	pub version_id: VersionId,
	/// Column name within the version's layout
	pub column: String,
	/// 1-based position, contiguous within `(version_id, column)`
	pub position: u32,
	/// Block kind
	pub content_type: ContentType,
	/// Payload id, `None` until the block has been saved for the first time
	pub object_id: Option<ObjectId>,
}

/// Request data handed to block render functions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
	/// Acting user, `None` for anonymous requests
	pub user: Option<UserId>,
	/// Request path
	pub path: String,
}

impl RequestContext {
	/// Anonymous request
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Request made by a logged in user
	pub fn for_user(user: UserId) -> Self {
		Self {
			user: Some(user),
			path: String::new(),
		}
	}

	/// Set the request path
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}
}
