#![cfg(target_arch = "wasm32")]

use chat_dom::{
	operation::{CountAction, OtherUser, Page, Section},
	state::Friendship,
	Error, Operation,
};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_fixture_::{by_id, child_ids, child_text, exists, message_html, reconciler, recent_chat_html, text, user_html, HostCall};

const T1: &str = "2024-01-05T10:30:00Z";
const T2: &str = "2024-01-05T11:00:00Z";
const T3: &str = "2024-01-06T09:15:00Z";

fn chats_page() -> String {
	format!(
		r#"<div id="recent-chats">{}{}</div>"#,
		recent_chat_html("U0", "0", T1),
		recent_chat_html("U1", "2", T1),
	)
}

#[wasm_bindgen_test]
fn recent_chat_increment_moves_to_top() {
	let (mut reconciler, calls) = reconciler(&chats_page());

	reconciler
		.apply(Operation::RecentChatHtml {
			html: recent_chat_html("U1", "increment", T2),
		})
		.unwrap();

	assert_eq!(child_ids("recent-chats"), ["chat-U1", "chat-U0"]);
	let entry = by_id("chat-U1");
	assert_eq!(entry.get_attribute("data-unread-count").as_deref(), Some("3"));
	assert_eq!(child_text("chat-U1", ".unread-count"), "3");
	assert_eq!(child_text("chat-U1", ".time"), "11:00");
	assert_eq!(child_text("chat-U1", ".date"), "2024-01-05");
	assert_eq!(*calls.borrow(), [HostCall::Process("recent-chats".to_owned())]);
}

#[wasm_bindgen_test]
fn recent_chat_increment_without_prior_starts_at_one() {
	let (mut reconciler, _) = reconciler(&chats_page());

	reconciler
		.apply(Operation::RecentChatHtml {
			html: recent_chat_html("U2", "increment", T2),
		})
		.unwrap();

	assert_eq!(child_ids("recent-chats"), ["chat-U2", "chat-U0", "chat-U1"]);
	assert_eq!(child_text("chat-U2", ".unread-count"), "1");
}

#[wasm_bindgen_test]
fn recent_chat_literal_count_replaces() {
	let (mut reconciler, _) = reconciler(&chats_page());

	reconciler
		.apply(Operation::RecentChatHtml {
			html: recent_chat_html("U1", "0", T2),
		})
		.unwrap();

	assert_eq!(child_ids("recent-chats"), ["chat-U1", "chat-U0"]);
	assert_eq!(by_id("chat-U1").get_attribute("data-unread-count").as_deref(), Some("0"));
}

#[wasm_bindgen_test]
fn recent_chat_twice_keeps_one_entry() {
	let (mut reconciler, _) = reconciler(&chats_page());

	for _ in 0..2 {
		reconciler
			.apply(Operation::RecentChatHtml {
				html: recent_chat_html("U0", "increment", T2),
			})
			.unwrap();
	}

	assert_eq!(child_ids("recent-chats"), ["chat-U0", "chat-U1"]);
	assert_eq!(child_text("chat-U0", ".unread-count"), "2");
}

#[wasm_bindgen_test]
fn message_adds_date_header_once() {
	let (mut reconciler, _) = reconciler(r#"<div id="messages"></div>"#);

	reconciler
		.apply(Operation::MessageHtml {
			html: message_html("M1", "U1", "ME", "False", T1),
		})
		.unwrap();
	assert_eq!(child_ids("messages"), ["date-2024-01-05", "message-M1"]);
	assert_eq!(text("date-2024-01-05"), "2024-01-05");
	assert_eq!(child_text("message-M1", ".time"), "10:30");

	reconciler
		.apply(Operation::MessageHtml {
			html: message_html("M2", "ME", "U1", "False", T2),
		})
		.unwrap();
	reconciler
		.apply(Operation::MessageHtml {
			html: message_html("M3", "U1", "ME", "False", T3),
		})
		.unwrap();
	assert_eq!(child_ids("messages"), ["date-2024-01-05", "message-M1", "message-M2", "date-2024-01-06", "message-M3"]);
}

#[wasm_bindgen_test]
fn message_clears_new_messages_marker_once() {
	let (mut reconciler, _) = reconciler(r#"<div id="messages"><p id="new-messages-text">New messages</p></div>"#);
	reconciler.observe_page();
	assert!(reconciler.view().new_messages_marker);

	reconciler
		.apply(Operation::MessageHtml {
			html: message_html("M1", "U1", "ME", "False", T1),
		})
		.unwrap();
	assert!(!exists("new-messages-text"));
	assert!(!reconciler.view().new_messages_marker);

	// A second message must not look for the (gone) marker again.
	reconciler
		.apply(Operation::MessageHtml {
			html: message_html("M2", "U1", "ME", "False", T2),
		})
		.unwrap();
	assert_eq!(child_ids("messages"), ["date-2024-01-05", "message-M1", "message-M2"]);
}

#[wasm_bindgen_test]
fn decrement_unread_count_floors_at_zero() {
	let (mut reconciler, _) = reconciler(&chats_page());

	reconciler
		.apply(Operation::DecrementUnreadCount {
			other_user_uuid: "U1".to_owned(),
			count: 1,
		})
		.unwrap();
	assert_eq!(child_text("chat-U1", ".unread-count"), "1");

	reconciler
		.apply(Operation::DecrementUnreadCount {
			other_user_uuid: "U1".to_owned(),
			count: 5,
		})
		.unwrap();
	assert_eq!(by_id("chat-U1").get_attribute("data-unread-count").as_deref(), Some("0"));
	assert_eq!(child_text("chat-U1", ".unread-count"), "0");
}

#[wasm_bindgen_test]
fn recent_chat_read_status() {
	let (mut reconciler, _) = reconciler(&chats_page());
	reconciler
		.apply(Operation::UpdateRecentChatReadStatus {
			other_user_uuid: "U0".to_owned(),
		})
		.unwrap();
	assert_eq!(child_text("chat-U0", ".read-status"), "Read");
	assert_eq!(child_text("chat-U1", ".read-status"), "Delivered");
}

#[wasm_bindgen_test]
fn message_read_status_is_idempotent() {
	let (mut reconciler, _) = reconciler(&format!(r#"<div id="messages">{}</div>"#, message_html("M1", "ME", "U1", "False", T1)));
	let operation = Operation::UpdateMessageReadStatus { message_uuid: "M1".to_owned() };

	reconciler.apply(operation.clone()).unwrap();
	let once = by_id("messages").inner_html();
	assert_eq!(by_id("message-M1").get_attribute("data-read").as_deref(), Some("True"));
	assert_eq!(child_text("message-M1", ".read-status"), "Read");

	reconciler.apply(operation).unwrap();
	assert_eq!(by_id("messages").inner_html(), once);
}

#[wasm_bindgen_test]
fn message_read_status_of_absent_message_is_ignored() {
	let (mut reconciler, _) = reconciler(r#"<div id="messages"></div>"#);
	reconciler
		.apply(Operation::UpdateMessageReadStatus { message_uuid: "M9".to_owned() })
		.unwrap();
}

#[wasm_bindgen_test]
fn all_messages_read_status_only_touches_sender() {
	let (mut reconciler, _) = reconciler(&format!(
		r#"<div id="messages">{}{}{}</div>"#,
		message_html("M1", "ME", "U1", "False", T1),
		message_html("M2", "U1", "ME", "False", T1),
		message_html("M3", "ME", "U1", "False", T2),
	));

	reconciler
		.apply(Operation::UpdateAllMessagesReadStatus { sender_uuid: "ME".to_owned() })
		.unwrap();

	assert_eq!(by_id("message-M1").get_attribute("data-read").as_deref(), Some("True"));
	assert_eq!(by_id("message-M2").get_attribute("data-read").as_deref(), Some("False"));
	assert_eq!(by_id("message-M3").get_attribute("data-read").as_deref(), Some("True"));
	assert_eq!(child_text("message-M2", ".read-status"), "Delivered");
	assert_eq!(child_text("message-M3", ".read-status"), "Read");
}

#[wasm_bindgen_test]
fn section_counts() {
	let (mut reconciler, _) = reconciler(r#"<span id="received-count-home">0</span><span id="received-count">4</span>"#);

	reconciler
		.apply(Operation::UpdateSectionCount {
			page: Page::Home,
			section: Section::Received,
			action: CountAction::Increment,
		})
		.unwrap();
	assert_eq!(text("received-count-home"), "1");
	assert_eq!(text("received-count"), "4");

	for _ in 0..6 {
		reconciler
			.apply(Operation::UpdateSectionCount {
				page: Page::Other,
				section: Section::Received,
				action: CountAction::Decrement,
			})
			.unwrap();
	}
	assert_eq!(text("received-count"), "0");
}

#[wasm_bindgen_test]
fn users_in_sections() {
	let (mut reconciler, calls) = reconciler(&format!(
		r#"<ul id="friends-list">{}{}</ul><ul id="sent-requests">{}</ul>"#,
		user_html("friend-U1", "alice"),
		user_html("friend-U3", "carol"),
		user_html("sent-U4", "dave"),
	));

	reconciler
		.apply(Operation::AddUserHtmlToSection {
			section: Section::Friends,
			html: user_html("friend-U2", "Bob"),
		})
		.unwrap();
	assert_eq!(child_ids("friends-list"), ["friend-U1", "friend-U2", "friend-U3"]);
	assert_eq!(*calls.borrow(), [HostCall::Process("friends-list".to_owned())]);

	reconciler
		.apply(Operation::AddUserHtmlToSection {
			section: Section::Friends,
			html: user_html("friend-U5", "ALICE"),
		})
		.unwrap();
	assert_eq!(child_ids("friends-list"), ["friend-U1", "friend-U2", "friend-U3"]);

	reconciler
		.apply(Operation::RemoveUserFromSection {
			section: Section::Sent,
			other_user_uuid: "U4".to_owned(),
		})
		.unwrap();
	assert!(child_ids("sent-requests").is_empty());

	reconciler
		.apply(Operation::RemoveUserFromSection {
			section: Section::Friends,
			other_user_uuid: "U1".to_owned(),
		})
		.unwrap();
	assert_eq!(child_ids("friends-list"), ["friend-U2", "friend-U3"]);
}

#[wasm_bindgen_test]
fn friendship_banner() {
	let (mut reconciler, _) = reconciler(r#"<div id="friendship-status"></div>"#);

	reconciler.apply(Operation::UpdateFriendship { are_friends: false }).unwrap();
	assert_eq!(reconciler.view().friendship, Friendship::NotFriends);
	assert_eq!(child_text("friendship-status", ".not-friends-text"), "You are not friends with this user");

	reconciler.apply(Operation::UpdateFriendship { are_friends: true }).unwrap();
	assert_eq!(reconciler.view().friendship, Friendship::Friends);
	assert_eq!(by_id("friendship-status").child_element_count(), 0);
}

#[wasm_bindgen_test]
fn terminal_operations_reload() {
	let (mut reconciler, calls) = reconciler("");
	reconciler.apply(Operation::AccountDeleted).unwrap();
	reconciler.apply(Operation::SessionLoggedOut).unwrap();
	assert_eq!(*calls.borrow(), [HostCall::Reload, HostCall::Reload]);
}

#[wasm_bindgen_test]
fn rename() {
	let (mut reconciler, _) = reconciler(&chats_page());
	reconciler
		.apply(Operation::UpdateAccount {
			other_user: OtherUser {
				uuid: "U1".to_owned(),
				username: "renamed".to_owned(),
			},
		})
		.unwrap();
	assert_eq!(child_text("chat-U1", ".other-user-username"), "renamed");
	assert_eq!(child_text("chat-U0", ".other-user-username"), "user-U0");
}

#[wasm_bindgen_test]
fn missing_targets_fail() {
	let (mut reconciler, _) = reconciler(&chats_page());

	let result = reconciler.apply(Operation::DecrementUnreadCount {
		other_user_uuid: "nobody".to_owned(),
		count: 1,
	});
	assert!(matches!(result, Err(Error::MissingElement { ref id }) if id == "chat-nobody"));

	let result = reconciler.apply(Operation::MessageHtml {
		html: message_html("M1", "U1", "ME", "False", T1),
	});
	assert!(matches!(result, Err(Error::MissingElement { ref id }) if id == "messages"));
}

#[wasm_bindgen_test]
fn unknown_and_json() {
	let (mut reconciler, calls) = reconciler(&chats_page());
	let before = by_id("recent-chats").inner_html();

	reconciler.apply_json(r#"{"type": "friendship_created"}"#).unwrap();
	assert_eq!(by_id("recent-chats").inner_html(), before);

	reconciler
		.apply_json(r#"{"type": "decrement_unread_count", "otherUserUuid": "U1", "count": 2}"#)
		.unwrap();
	assert_eq!(child_text("chat-U1", ".unread-count"), "0");

	assert!(matches!(reconciler.apply_json("{"), Err(Error::Json(_))));
	assert!(calls.borrow().is_empty());
}
