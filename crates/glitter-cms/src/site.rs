//! Collaborators shared by the renderers, the version service and the block admin

use crate::admin::BlockAdmin;
use crate::blocks::BlockLibrary;
use crate::error::CmsResult;
use crate::layouts::LayoutRegistry;
use crate::permissions::{ModelPermissions, PermissionAuthority};
use crate::store::{ContentBlockStore, PayloadStore, VersionStore};
use crate::versions::VersionService;
use glitter_conf::GlitterSettings;
use glitter_template::TemplateEngine;
use std::sync::Arc;

/// Stores, registries, settings and templates used while handling a request
///
/// Built once at startup; everything except the stores is read-only
/// afterwards.
pub struct GlitterSite {
	pub(crate) versions: Arc<dyn VersionStore>,
	pub(crate) blocks: Arc<dyn ContentBlockStore>,
	pub(crate) payloads: Arc<dyn PayloadStore>,
	pub(crate) layouts: LayoutRegistry,
	pub(crate) library: BlockLibrary,
	pub(crate) permissions: Arc<dyn PermissionAuthority>,
	pub(crate) settings: GlitterSettings,
	pub(crate) templates: TemplateEngine,
}

impl GlitterSite {
	/// Create a site backed by one store implementing every store trait
	///
	/// Starts with empty registries, an empty permission table, default
	/// settings and the built-in templates.
	pub fn new<S>(store: Arc<S>) -> CmsResult<Self>
	where
		S: VersionStore + ContentBlockStore + PayloadStore + 'static,
	{
		Self::with_stores(store.clone(), store.clone(), store)
	}

	/// Create a site from separate stores
	pub fn with_stores(
		versions: Arc<dyn VersionStore>,
		blocks: Arc<dyn ContentBlockStore>,
		payloads: Arc<dyn PayloadStore>,
	) -> CmsResult<Self> {
		Ok(Self {
			versions,
			blocks,
			payloads,
			layouts: LayoutRegistry::new(),
			library: BlockLibrary::new(),
			permissions: Arc::new(ModelPermissions::new()),
			settings: GlitterSettings::default(),
			templates: TemplateEngine::new()?,
		})
	}

	/// Replace the layout registry
	pub fn with_layouts(mut self, layouts: LayoutRegistry) -> Self {
		self.layouts = layouts;
		self
	}

	/// Replace the block library
	pub fn with_library(mut self, library: BlockLibrary) -> Self {
		self.library = library;
		self
	}

	/// Replace the permission authority
	pub fn with_permissions(mut self, permissions: Arc<dyn PermissionAuthority>) -> Self {
		self.permissions = permissions;
		self
	}

	/// Replace the settings
	pub fn with_settings(mut self, settings: GlitterSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Replace the template engine
	pub fn with_templates(mut self, templates: TemplateEngine) -> Self {
		self.templates = templates;
		self
	}

	/// Layout registry
	pub fn layouts(&self) -> &LayoutRegistry {
		&self.layouts
	}

	/// Block library
	pub fn library(&self) -> &BlockLibrary {
		&self.library
	}

	/// Settings
	pub fn settings(&self) -> &GlitterSettings {
		&self.settings
	}

	/// Permission authority
	pub fn permissions(&self) -> &dyn PermissionAuthority {
		self.permissions.as_ref()
	}

	/// Version store
	pub fn version_store(&self) -> &dyn VersionStore {
		self.versions.as_ref()
	}

	/// Content block store
	pub fn block_store(&self) -> &dyn ContentBlockStore {
		self.blocks.as_ref()
	}

	/// Payload store
	pub fn payload_store(&self) -> &dyn PayloadStore {
		self.payloads.as_ref()
	}

	/// Draft/publish lifecycle and block edits
	pub fn versions(&self) -> VersionService<'_> {
		VersionService::new(self)
	}

	/// Block edit flow
	pub fn block_admin(&self) -> BlockAdmin<'_> {
		BlockAdmin::new(self)
	}
}
