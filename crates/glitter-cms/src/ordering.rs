//! Position bookkeeping for blocks within a column
//!
//! Positions within a `(version, column)` pair are always the contiguous
//! sequence `1..=N`. Every mutation computes the complete renumbered sibling
//! set with the helpers here and writes it back in one step.

use crate::error::{CmsError, CmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a block move within its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveBlock {
	/// Move to position 1
	#[serde(rename = "move_top")]
	Top,
	/// Swap with the previous block
	#[serde(rename = "move_up")]
	Up,
	/// Swap with the next block
	#[serde(rename = "move_down")]
	Down,
	/// Move to the last position
	#[serde(rename = "move_bottom")]
	Bottom,
}

impl MoveBlock {
	/// All directions in display order
	pub const ALL: [MoveBlock; 4] = [Self::Top, Self::Up, Self::Down, Self::Bottom];

	/// Form value
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Top => "move_top",
			Self::Up => "move_up",
			Self::Down => "move_down",
			Self::Bottom => "move_bottom",
		}
	}

	/// Human readable label
	pub fn label(&self) -> &'static str {
		match self {
			Self::Top => "To top",
			Self::Up => "Up",
			Self::Down => "Down",
			Self::Bottom => "To bottom",
		}
	}

	/// Whether this move changes anything for a block at `block_number` of `len`
	pub fn is_available(&self, block_number: usize, len: usize) -> bool {
		match self {
			Self::Top | Self::Up => block_number != 1,
			Self::Down | Self::Bottom => block_number != len,
		}
	}

	/// 0-based target index for a block currently at 0-based `index` in a column of `len`
	pub fn target_index(&self, index: usize, len: usize) -> CmsResult<usize> {
		if index >= len {
			return Err(CmsError::InvalidMove(format!(
				"index {} outside column of {}",
				index, len
			)));
		}
		Ok(match self {
			Self::Top => 0,
			Self::Up => index.saturating_sub(1),
			Self::Down => (index + 1).min(len - 1),
			Self::Bottom => len - 1,
		})
	}
}

impl fmt::Display for MoveBlock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for MoveBlock {
	type Err = CmsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|m| m.as_str() == s)
			.ok_or_else(|| CmsError::InvalidMove(format!("unknown move '{}'", s)))
	}
}

/// Number items in order, starting at 1
pub fn renumber<T: Clone>(items: &[T]) -> Vec<(T, u32)> {
	items
		.iter()
		.cloned()
		.zip(1u32..)
		.collect()
}

/// Move the item at `old_index` to `new_index` and renumber the full set
///
/// `items` must be in current position order. Items between the two indices
/// shift by one; the identity of every item is preserved.
///
/// # Examples
///
/// ```
/// use glitter_cms::ordering::reindex;
///
/// let moved = reindex(&["a", "b", "c"], 2, 0).unwrap();
/// assert_eq!(moved, vec![("c", 1), ("a", 2), ("b", 3)]);
/// ```
pub fn reindex<T: Clone>(items: &[T], old_index: usize, new_index: usize) -> CmsResult<Vec<(T, u32)>> {
	if old_index >= items.len() || new_index >= items.len() {
		return Err(CmsError::InvalidMove(format!(
			"cannot move index {} to {} in a column of {}",
			old_index,
			new_index,
			items.len()
		)));
	}

	let mut ordered = items.to_vec();
	let item = ordered.remove(old_index);
	ordered.insert(new_index, item);
	Ok(renumber(&ordered))
}
