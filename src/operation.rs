//! The push-channel envelope: `{"type": <operation>, ...fields}`.

use serde::Deserialize;

/// One server-pushed update, decoded from its JSON envelope.
///
/// Field names are camelCase on the wire. Unrecognised `type` tags decode to [`Operation::Unknown`]
/// so that newer servers don't break older clients, but a *known* tag with missing or mistyped
/// fields is a decoding error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
	RecentChatHtml { html: String },
	MessageHtml { html: String },
	DecrementUnreadCount { other_user_uuid: String, count: u32 },
	UpdateRecentChatReadStatus { other_user_uuid: String },
	UpdateMessageReadStatus { message_uuid: String },
	UpdateAllMessagesReadStatus { sender_uuid: String },
	UpdateSectionCount { page: Page, section: Section, action: CountAction },
	RemoveUserFromSection { section: Section, other_user_uuid: String },
	AddUserHtmlToSection { section: Section, html: String },
	UpdateFriendship { are_friends: bool },
	AccountDeleted,
	SessionLoggedOut,
	UpdateAccount { other_user: OtherUser },
	#[serde(other)]
	Unknown,
}

impl Operation {
	/// # Errors
	///
	/// Iff `json` isn't an envelope or a known operation is missing fields.
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	/// The wire tag, for logging.
	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			Self::RecentChatHtml { .. } => "recent_chat_html",
			Self::MessageHtml { .. } => "message_html",
			Self::DecrementUnreadCount { .. } => "decrement_unread_count",
			Self::UpdateRecentChatReadStatus { .. } => "update_recent_chat_read_status",
			Self::UpdateMessageReadStatus { .. } => "update_message_read_status",
			Self::UpdateAllMessagesReadStatus { .. } => "update_all_messages_read_status",
			Self::UpdateSectionCount { .. } => "update_section_count",
			Self::RemoveUserFromSection { .. } => "remove_user_from_section",
			Self::AddUserHtmlToSection { .. } => "add_user_html_to_section",
			Self::UpdateFriendship { .. } => "update_friendship",
			Self::AccountDeleted => "account_deleted",
			Self::SessionLoggedOut => "session_logged_out",
			Self::UpdateAccount { .. } => "update_account",
			Self::Unknown => "unknown",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtherUser {
	pub uuid: String,
	pub username: String,
}

/// Which page layout the counters of [`Operation::UpdateSectionCount`] refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Page {
	Home,
	Other,
}

impl From<String> for Page {
	fn from(page: String) -> Self {
		if page == "home" {
			Self::Home
		} else {
			Self::Other
		}
	}
}

/// A user list on the friends pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
	Friends,
	Sent,
	Received,
}

impl Section {
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Friends => "friends",
			Self::Sent => "sent",
			Self::Received => "received",
		}
	}

	/// `friends-list`, `sent-requests` or `received-requests`.
	#[must_use]
	pub fn container_id(self) -> String {
		match self {
			Self::Friends => "friends-list".to_owned(),
			other => format!("{}-requests", other.name()),
		}
	}

	/// `friend-<uuid>`, `sent-<uuid>` or `received-<uuid>`.
	#[must_use]
	pub fn entry_id(self, other_user_uuid: &str) -> String {
		match self {
			Self::Friends => format!("friend-{}", other_user_uuid),
			other => format!("{}-{}", other.name(), other_user_uuid),
		}
	}

	/// `<section>-count`, with a `-home` suffix for the counters on the home page.
	#[must_use]
	pub fn count_id(self, page: Page) -> String {
		match page {
			Page::Home => format!("{}-count-home", self.name()),
			Page::Other => format!("{}-count", self.name()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountAction {
	Increment,
	Decrement,
}

impl CountAction {
	/// Steps `count` by one in this direction, never below zero.
	#[must_use]
	pub fn apply(self, count: u32) -> u32 {
		match self {
			Self::Increment => count.saturating_add(1),
			Self::Decrement => count.saturating_sub(1),
		}
	}
}
