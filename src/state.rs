//! Page-scoped flags that outlive single envelopes but not htmx swaps.

/// What the client knows about the friendship with the counterpart of the open chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Friendship {
	#[default]
	Unknown,
	Friends,
	NotFriends,
}

impl From<bool> for Friendship {
	fn from(are_friends: bool) -> Self {
		if are_friends {
			Self::Friends
		} else {
			Self::NotFriends
		}
	}
}

/// Page-scoped client state that isn't derived from the DOM on demand.
///
/// Lives exactly as long as one rendered page: [`ViewState::reset`] runs before every htmx swap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
	pub friendship: Friendship,
	/// Whether the "new messages" marker is displayed and should be removed by the next incoming message.
	pub new_messages_marker: bool,
}

impl ViewState {
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Whether an outgoing chat message with `content` may be sent.
	///
	/// Sending requires a known mutual friendship and non-blank content.
	#[must_use]
	pub fn may_send(&self, content: &str) -> bool {
		self.friendship == Friendship::Friends && !content.trim().is_empty()
	}

	/// Clears the marker flag, returning whether it was set.
	pub fn take_new_messages_marker(&mut self) -> bool {
		core::mem::replace(&mut self.new_messages_marker, false)
	}
}
