//! Insertion into user lists that are kept sorted by username.

use crate::error::{Error, Result};
use core::cmp::Ordering;
use tracing::{debug, instrument, trace};
use web_sys::Element;

pub const USERNAME_ATTRIBUTE: &str = "data-username";

/// Result of [`search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
	/// An entry with the same (case-insensitive) key sits at this index.
	Occupied(u32),
	/// The key belongs before the entry at this index, or at the end if it equals the length.
	Vacant(u32),
}

/// Outcome of [`insert_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
	Inserted(u32),
	/// An entry with the same username already exists and is left as-is. The new element was dropped.
	Duplicate,
}

/// Binary search over `len` keys that are sorted ascending by their lower-cased value.
///
/// `key_at` is called O(log `len`) times.
///
/// # Errors
///
/// Whatever `key_at` returns.
pub fn search<K: AsRef<str>>(len: u32, key: &str, mut key_at: impl FnMut(u32) -> Result<K>) -> Result<Slot> {
	let key = key.to_lowercase();
	let (mut left, mut right) = (0_u32, len);
	while left < right {
		let mid = left + (right - left) / 2;
		let mid_key = key_at(mid)?.as_ref().to_lowercase();
		match mid_key.cmp(&key) {
			Ordering::Less => left = mid + 1,
			Ordering::Greater => right = mid,
			Ordering::Equal => return Ok(Slot::Occupied(mid)),
		}
	}
	Ok(Slot::Vacant(left))
}

/// Inserts `element` among `container`'s child elements so that they stay sorted case-insensitively by `data-username`.
///
/// The children must already be sorted that way.
///
/// # Errors
///
/// Iff `element` or a probed child lacks `data-username`, or the DOM rejects the insertion.
#[instrument(skip(element))]
pub fn insert_sorted(container: &Element, element: &Element) -> Result<Insertion> {
	let username = element.get_attribute(USERNAME_ATTRIBUTE).ok_or(Error::MissingAttribute { attribute: USERNAME_ATTRIBUTE })?;
	#[cfg(feature = "dangerous-logging")]
	trace!(username = %username, "Inserting by username.");

	let children = container.children();
	let slot = search(children.length(), &username, |i| {
		children
			.item(i)
			.and_then(|child| child.get_attribute(USERNAME_ATTRIBUTE))
			.ok_or(Error::MissingAttribute { attribute: USERNAME_ATTRIBUTE })
	})?;

	match slot {
		Slot::Occupied(index) => {
			debug!("An entry with the same username already exists at index {}. Not inserting.", index);
			Ok(Insertion::Duplicate)
		}
		Slot::Vacant(index) => {
			let next_sibling = children.item(index);
			container.insert_before(element, next_sibling.as_deref())?;
			trace!("Inserted at index {}.", index);
			Ok(Insertion::Inserted(index))
		}
	}
}
