//! Draft-aware version history
//!
//! The history an editor sees contains every published version of the
//! entity plus that editor's own draft. Other editors' drafts are hidden.

use crate::models::{UserId, Version};

/// Previous/next navigation over the versions visible to one user
#[derive(Debug, Clone)]
pub struct VersionNavigator {
	current: Version,
	visible: Vec<Version>,
}

impl VersionNavigator {
	/// Build the visible history around `current`
	///
	/// `candidates` may contain versions of other entities; they are ignored.
	pub fn new(
		current: Version,
		candidates: impl IntoIterator<Item = Version>,
		user: Option<UserId>,
	) -> Self {
		let mut visible: Vec<Version> = candidates
			.into_iter()
			.filter(|v| v.object == current.object && v.is_visible_to(user))
			.collect();
		visible.sort_by_key(|v| v.modified);
		Self { current, visible }
	}

	/// The version navigation is relative to
	pub fn current(&self) -> &Version {
		&self.current
	}

	/// Visible versions, most recently modified first
	pub fn all_versions(&self) -> impl Iterator<Item = &Version> {
		self.visible.iter().rev()
	}

	/// Whether a version belongs to the visible set
	pub fn is_visible(&self, version: &Version) -> bool {
		self.visible.iter().any(|v| v.id == version.id)
	}

	/// Latest visible version modified strictly before the current one
	pub fn previous_version(&self) -> Option<&Version> {
		self.visible
			.iter()
			.rev()
			.find(|v| v.modified < self.current.modified)
	}

	/// Earliest visible version modified strictly after the current one
	pub fn next_version(&self) -> Option<&Version> {
		self.visible
			.iter()
			.find(|v| v.modified > self.current.modified)
	}
}
