//! Page conventions shared with the server-side templates, and formatter settings.

/// Ids, class names and texts that server-rendered pages and fragments must use.
///
/// These form the contract with the templating backend. Entry ids are derived from them with the
/// `*_id` helpers so that the prefixes are defined in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
	pub recent_chats: &'static str,
	pub messages: &'static str,
	pub new_messages_marker: &'static str,
	pub friendship_status: &'static str,
	pub connection_status: &'static str,
	pub chat_input: &'static str,
	/// Id of the element whose websocket sends bypass send gating (the chat load trigger).
	pub load_trigger: &'static str,

	pub chat_prefix: &'static str,
	pub message_prefix: &'static str,
	pub date_prefix: &'static str,

	pub message_class: &'static str,
	pub date_text_class: &'static str,
	pub not_friends_class: &'static str,
	pub read_status_selector: &'static str,
	pub unread_count_selector: &'static str,
	pub username_selector: &'static str,
	pub time_selector: &'static str,
	pub date_selector: &'static str,

	pub read_text: &'static str,
	pub not_friends_text: &'static str,
	pub connection_lost_text: &'static str,

	/// Header that asks the backend for a complete document instead of a fragment.
	pub full_page_header: &'static str,
}

impl Default for Conventions {
	fn default() -> Self {
		Self {
			recent_chats: "recent-chats",
			messages: "messages",
			new_messages_marker: "new-messages-text",
			friendship_status: "friendship-status",
			connection_status: "ws-connection-status",
			chat_input: "chat-input",
			load_trigger: "load",

			chat_prefix: "chat-",
			message_prefix: "message-",
			date_prefix: "date-",

			message_class: "message",
			date_text_class: "date-text",
			not_friends_class: "not-friends-text",
			read_status_selector: ".read-status",
			unread_count_selector: ".unread-count",
			username_selector: ".other-user-username",
			time_selector: ".time",
			date_selector: ".date",

			read_text: "Read",
			not_friends_text: "You are not friends with this user",
			connection_lost_text: "Connection lost",

			full_page_header: "HX-Full-Page-Request",
		}
	}
}

impl Conventions {
	#[must_use]
	pub fn chat_id(&self, other_user_uuid: &str) -> String {
		format!("{}{}", self.chat_prefix, other_user_uuid)
	}

	#[must_use]
	pub fn message_id(&self, message_uuid: &str) -> String {
		format!("{}{}", self.message_prefix, message_uuid)
	}

	#[must_use]
	pub fn date_id(&self, date: &str) -> String {
		format!("{}{}", self.date_prefix, date)
	}
}

/// Client configuration.
///
/// `locale` and `time_zone` are handed to `Intl.DateTimeFormat`. `None` means the browser default,
/// which is what end users get. Pinning them makes the rendered dates (and with them the
/// `date-…` header ids) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	pub locale: Option<String>,
	pub time_zone: Option<String>,
	pub conventions: Conventions,
}

impl Config {
	#[must_use]
	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = Some(locale.into());
		self
	}

	#[must_use]
	pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
		self.time_zone = Some(time_zone.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entry_ids() {
		let conventions = Conventions::default();
		assert_eq!(conventions.chat_id("U1"), "chat-U1");
		assert_eq!(conventions.message_id("M1"), "message-M1");
		assert_eq!(conventions.date_id("2024-01-05"), "date-2024-01-05");
	}

	#[test]
	fn builder() {
		let config = Config::default().with_locale("sv-SE").with_time_zone("UTC");
		assert_eq!(config.locale.as_deref(), Some("sv-SE"));
		assert_eq!(config.time_zone.as_deref(), Some("UTC"));
		assert_eq!(config.conventions, Conventions::default());
	}
}
