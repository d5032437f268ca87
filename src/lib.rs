//! # Glitter
//!
//! Page content composed of ordered, typed blocks arranged into named layout
//! columns, with per-editor drafts, published versions and in-place editing.
//!
//! ## Feature Flags
//!
//! - `conf` (default) - Layered settings loading (`glitter-conf`)
//! - `templates` (default) - Template engine and filters (`glitter-template`)
//!
//! The page model itself (`glitter-cms`) is always included.
//!
//! ## Example
//!
//! ```rust
//! use glitter::prelude::*;
//! use std::sync::Arc;
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(
//!     Layout::new("default", "Default")
//!         .column("main_content", "Main content")
//!         .column("sidebar", "Sidebar"),
//! );
//!
//! let permissions = ModelPermissions::new();
//! permissions.add_superuser(1);
//!
//! let site = GlitterSite::new(Arc::new(InMemoryStore::new()))
//!     .unwrap()
//!     .with_layouts(layouts)
//!     .with_permissions(Arc::new(permissions));
//!
//! let page = ObjectRef::new(ContentType::new("pages", "Page"), 1);
//! let draft = site.versions().start_editing(&page, 1, "default").unwrap();
//! let published = site.versions().publish(draft.id, 1).unwrap();
//! assert_eq!(published.version_number, Some(1));
//! ```

pub use glitter_cms as cms;

#[cfg(feature = "conf")]
pub use glitter_conf as conf;

#[cfg(feature = "templates")]
pub use glitter_template as template;

pub use glitter_cms::error::{CmsError, CmsResult};
pub use glitter_cms::page::Glitter;
pub use glitter_cms::site::GlitterSite;

#[cfg(feature = "conf")]
pub use glitter_conf::{SettingsBuilder, SettingsError};

/// Convenient re-exports of commonly used items
pub mod prelude {
	pub use glitter_cms::prelude::*;

	#[cfg(feature = "conf")]
	pub use glitter_conf::{ConfigSource, EnvSource, SettingsBuilder, TomlFileSource};

	#[cfg(feature = "templates")]
	pub use glitter_template::{TemplateEngine, slugify};
}
