//! Permission authority
//!
//! Rendering and editing only consume a yes/no answer to
//! "does this user hold this permission". Codenames use the
//! `app_label.action_model` format (e.g. `pages.edit_page`).

use crate::models::{ContentType, UserId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Action required to edit an entity's content
pub const EDIT_ACTION: &str = "edit";

/// Action required to publish a version of an entity
pub const PUBLISH_ACTION: &str = "publish";

/// Source of permission decisions
pub trait PermissionAuthority: Send + Sync {
	/// Whether `user` holds `permission`
	fn has_perm(&self, user: UserId, permission: &str) -> bool;

	/// Whether `user` may edit entities of `content_type`
	fn can_edit(&self, user: UserId, content_type: &ContentType) -> bool {
		self.has_perm(user, &content_type.permission(EDIT_ACTION))
	}

	/// Whether `user` may publish versions of entities of `content_type`
	fn can_publish(&self, user: UserId, content_type: &ContentType) -> bool {
		self.has_perm(user, &content_type.permission(PUBLISH_ACTION))
	}
}

/// In-memory model permissions
///
/// Maps users to `app_label.action_model` codenames. Superusers hold every
/// permission.
///
/// # Examples
///
/// ```
/// use glitter_cms::permissions::{ModelPermissions, PermissionAuthority};
///
/// let perms = ModelPermissions::new();
/// perms.add_user_permission(1, "pages.edit_page");
///
/// assert!(perms.has_perm(1, "pages.edit_page"));
/// assert!(!perms.has_perm(1, "pages.publish_page"));
/// assert!(!perms.has_perm(2, "pages.edit_page"));
/// ```
#[derive(Debug, Default)]
pub struct ModelPermissions {
	user_permissions: RwLock<HashMap<UserId, HashSet<String>>>,
	superusers: RwLock<HashSet<UserId>>,
}

impl ModelPermissions {
	/// Create an empty permission table
	pub fn new() -> Self {
		Self::default()
	}

	/// Grant a permission codename to a user
	pub fn add_user_permission(&self, user: UserId, permission: impl Into<String>) {
		self.user_permissions
			.write()
			.entry(user)
			.or_default()
			.insert(permission.into());
	}

	/// Revoke a permission codename
	pub fn remove_user_permission(&self, user: UserId, permission: &str) {
		if let Some(perms) = self.user_permissions.write().get_mut(&user) {
			perms.remove(permission);
		}
	}

	/// Mark a user as superuser
	pub fn add_superuser(&self, user: UserId) {
		self.superusers.write().insert(user);
	}
}

impl PermissionAuthority for ModelPermissions {
	fn has_perm(&self, user: UserId, permission: &str) -> bool {
		if self.superusers.read().contains(&user) {
			return true;
		}
		self.user_permissions
			.read()
			.get(&user)
			.is_some_and(|perms| perms.contains(permission))
	}
}
