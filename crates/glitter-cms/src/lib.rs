//! # Glitter CMS
//!
//! Page content built from ordered, typed blocks arranged into named layout
//! columns, with per-editor drafts and published versions.
//!
//! ## Features
//!
//! - **Versions**: one draft per editor and entity, monotonically numbered
//!   published versions, previous/next navigation that hides other editors' drafts
//! - **Content blocks**: contiguous per-column ordering with atomic move,
//!   insert, column change and delete
//! - **Block library**: explicit registry of block kinds, categories and
//!   render functions
//! - **Page rendering**: per-column markup in layout order, with edit-mode
//!   affordances (move/column/add-block selectors)
//!
//! ## Architecture
//!
//! ```text
//! glitter-cms
//! ├── models      - Versions, content blocks, content types
//! ├── ordering    - Position reindexing and move directions
//! ├── store       - Storage traits and the in-memory store
//! ├── layouts     - Layout registry
//! ├── blocks      - Block library and render functions
//! ├── permissions - Permission authority
//! ├── site        - Collaborators shared by renderers and services
//! ├── page        - Page, column and block renderers
//! ├── navigator   - Draft-aware version history
//! ├── versions    - Draft/publish lifecycle and block edits
//! ├── widgets     - Choice lists rendered as `<select>` controls
//! └── admin       - Block edit flow and column rerendering
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use glitter_cms::prelude::*;
//! use std::sync::Arc;
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(Layout::new("default", "Default").column("main", "Main content"));
//!
//! let mut library = BlockLibrary::new();
//! library.register(BlockKind::new("glitter_html", "HTML", "HTML", "glitter_html.render"));
//! library.register_render_function("glitter_html.render", |block, _request, _rerender, _cb, _classes| {
//!     Ok(block
//!         .and_then(|b| b["content"].as_str())
//!         .unwrap_or_default()
//!         .to_string())
//! });
//!
//! let permissions = ModelPermissions::new();
//! permissions.add_user_permission(1, "pages.edit_page");
//!
//! let store = Arc::new(InMemoryStore::new());
//! let site = GlitterSite::new(store)
//!     .unwrap()
//!     .with_layouts(layouts)
//!     .with_library(library)
//!     .with_permissions(Arc::new(permissions));
//!
//! let page = ObjectRef::new(ContentType::new("pages", "Page"), 1);
//! let draft = site.versions().start_editing(&page, 1, "default").unwrap();
//! let glitter = Glitter::new(&site, draft, None).unwrap();
//! let columns = glitter.render(false, false).unwrap();
//! assert_eq!(columns.keys().collect::<Vec<_>>(), vec!["main"]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod admin;
pub mod blocks;
pub mod layouts;
pub mod models;
pub mod navigator;
pub mod ordering;
pub mod page;
pub mod permissions;
pub mod site;
pub mod store;
pub mod versions;
pub mod widgets;

// Prelude for convenient imports
pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::admin::{BlockAdmin, RerenderResponse};
	pub use crate::blocks::{BlockKind, BlockLibrary, RenderFn};
	pub use crate::error::{CmsError, CmsResult};
	pub use crate::layouts::{Layout, LayoutRegistry};
	pub use crate::models::{
		ContentBlock, ContentBlockId, ContentType, NewVersion, ObjectId, ObjectRef,
		RequestContext, UserId, Version, VersionId,
	};
	pub use crate::navigator::VersionNavigator;
	pub use crate::ordering::{MoveBlock, reindex};
	pub use crate::page::{Glitter, GlitterBlock, GlitterColumn};
	pub use crate::permissions::{ModelPermissions, PermissionAuthority};
	pub use crate::site::GlitterSite;
	pub use crate::store::{ContentBlockStore, InMemoryStore, PayloadStore, VersionStore};
	pub use crate::versions::VersionService;
	pub use glitter_conf::{DefaultBlock, GlitterSettings};
}

/// CMS error types
pub mod error {
	use crate::models::{ContentBlockId, VersionId};
	use thiserror::Error;

	/// CMS-related errors
	#[derive(Error, Debug)]
	pub enum CmsError {
		/// Version not found
		#[error("Version not found: {0}")]
		VersionNotFound(VersionId),

		/// Content block not found
		#[error("Content block not found: {0}")]
		ContentBlockNotFound(ContentBlockId),

		/// Owning entity or block payload not found
		#[error("Object not found: {0}")]
		ObjectNotFound(String),

		/// Acting user lacks the required capability
		#[error("Permission denied: {0}")]
		PermissionDenied(String),

		/// Published versions cannot be edited
		#[error("Version {0} is published and cannot be changed")]
		PublishedVersion(VersionId),

		/// An editor already has a draft of this entity
		#[error("Draft already exists: {0}")]
		DuplicateDraft(String),

		/// A published version with this number already exists
		#[error("Duplicate version number: {0}")]
		DuplicateVersionNumber(String),

		/// Block type not registered
		#[error("Block type not registered: {0}")]
		UnknownBlockType(String),

		/// Render function path not registered
		#[error("Render function not registered: {0}")]
		UnknownRenderFunction(String),

		/// Layout not registered or not offered for the entity
		#[error("Layout not registered: {0}")]
		UnknownLayout(String),

		/// Column not declared by the layout
		#[error("Column not in layout: {0}")]
		UnknownColumn(String),

		/// Move or position outside the column
		#[error("Invalid move: {0}")]
		InvalidMove(String),

		/// A stored version or block names a layout or block kind that is no
		/// longer registered
		#[error("Site configuration error: {0}")]
		Configuration(String),

		/// A block render function failed
		#[error("Block render failed: {0}")]
		Render(String),

		/// Column template failed
		#[error(transparent)]
		Template(#[from] glitter_template::TemplateError),

		/// Storage failure
		#[error("Database error: {0}")]
		Database(String),
	}

	impl CmsError {
		/// HTTP-style status code for the boundary layer
		///
		/// Not-found errors map to 404, permission errors to 403, rejected
		/// requests to 400 and everything else to 500. Unknown layouts and
		/// block types count as rejected requests when they come from the
		/// caller; renderers report stored references to them as
		/// [`CmsError::Configuration`].
		pub fn status_code(&self) -> u16 {
			match self {
				Self::VersionNotFound(_)
				| Self::ContentBlockNotFound(_)
				| Self::ObjectNotFound(_) => 404,
				Self::PermissionDenied(_) | Self::PublishedVersion(_) => 403,
				Self::DuplicateDraft(_)
				| Self::DuplicateVersionNumber(_)
				| Self::UnknownBlockType(_)
				| Self::UnknownLayout(_)
				| Self::UnknownColumn(_)
				| Self::InvalidMove(_) => 400,
				Self::UnknownRenderFunction(_)
				| Self::Configuration(_)
				| Self::Render(_)
				| Self::Template(_)
				| Self::Database(_) => 500,
			}
		}
	}

	/// Result type for CMS operations
	pub type CmsResult<T> = Result<T, CmsError>;

	#[cfg(test)]
	mod tests {
		use super::*;
		use rstest::rstest;

		#[rstest]
		#[case(CmsError::VersionNotFound(1), 404)]
		#[case(CmsError::ContentBlockNotFound(1), 404)]
		#[case(CmsError::PermissionDenied("x".into()), 403)]
		#[case(CmsError::PublishedVersion(1), 403)]
		#[case(CmsError::UnknownColumn("x".into()), 400)]
		#[case(CmsError::UnknownBlockType("x".into()), 400)]
		#[case(CmsError::Configuration("x".into()), 500)]
		#[case(CmsError::Render("boom".into()), 500)]
		fn test_status_codes(#[case] error: CmsError, #[case] status: u16) {
			assert_eq!(error.status_code(), status);
		}
	}
}
