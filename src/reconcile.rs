//! Applying pushed [`Operation`]s to the live DOM.

use crate::{
	config::{Config, Conventions},
	error::{Error, Result},
	fragment::Fragment,
	host::Host,
	operation::{CountAction, Operation, OtherUser, Page, Section},
	sorted::{insert_sorted, Insertion},
	state::{Friendship, ViewState},
	time::TimestampFormatter,
};
use core::str::FromStr;
use tracing::{debug, error, info, instrument, trace, trace_span, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

pub const UNREAD_COUNT_ATTRIBUTE: &str = "data-unread-count";
pub const READ_ATTRIBUTE: &str = "data-read";
pub const SENDER_ATTRIBUTE: &str = "data-sender-uuid";
pub const RECIPIENT_ATTRIBUTE: &str = "data-recipient-uuid";

/// `data-read` values, as rendered by the backend.
pub const READ: &str = "True";
pub const UNREAD: &str = "False";

/// The value of a fresh recent-chat entry's `data-unread-count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadCount {
	Literal(u32),
	/// `"increment"`: one more than the entry this one replaces.
	Increment,
}

impl UnreadCount {
	/// The count to display, given the count of the entry being replaced (if any).
	///
	/// An [`UnreadCount::Increment`] without a prior entry starts at 1.
	#[must_use]
	pub fn resolve(self, prior: Option<u32>) -> u32 {
		match self {
			Self::Literal(count) => count,
			Self::Increment => prior.map_or(1, |prior| prior.saturating_add(1)),
		}
	}
}

impl FromStr for UnreadCount {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self> {
		let value = value.trim();
		if value == "increment" {
			Ok(Self::Increment)
		} else {
			parse_count(value).map(Self::Literal)
		}
	}
}

fn parse_count(value: &str) -> Result<u32> {
	value.trim().parse().map_err(|_| Error::InvalidCount { value: value.to_owned() })
}

/// Merges pushed updates into one page.
///
/// Every operation either completes or fails with an [`Error`] before its first DOM mutation where
/// that can be checked up front. Operations referring to elements that don't exist fail with
/// [`Error::MissingElement`]; there is no attempt at recovery beyond reporting.
#[derive(Debug)]
pub struct Reconciler<H> {
	document: Document,
	config: Config,
	formatter: TimestampFormatter,
	host: H,
	view: ViewState,
}

impl<H: Host> Reconciler<H> {
	/// # Errors
	///
	/// Iff the timestamp formatter can't be created from `config`.
	pub fn new(document: Document, config: Config, host: H) -> Result<Self> {
		Ok(Self {
			formatter: TimestampFormatter::new(&config)?,
			document,
			config,
			host,
			view: ViewState::default(),
		})
	}

	#[must_use]
	pub fn view(&self) -> &ViewState {
		&self.view
	}

	pub fn view_mut(&mut self) -> &mut ViewState {
		&mut self.view
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	#[must_use]
	pub fn conventions(&self) -> &Conventions {
		&self.config.conventions
	}

	/// Forgets all page-scoped state. Call before the page content is swapped out.
	pub fn reset_view(&mut self) {
		trace!("Resetting view state.");
		self.view.reset()
	}

	/// Picks up page-scoped state that the freshly swapped-in page declares through its markup.
	pub fn observe_page(&mut self) {
		self.view.new_messages_marker = self.document.get_element_by_id(self.config.conventions.new_messages_marker).is_some();
		trace!(new_messages_marker = self.view.new_messages_marker, "Observed page.");
	}

	/// Decodes and applies one push-channel envelope.
	///
	/// # Errors
	///
	/// Iff the envelope is malformed or [`Reconciler::apply`] fails.
	pub fn apply_json(&mut self, json: &str) -> Result<()> {
		let operation = Operation::from_json(json)?;
		self.apply(operation)
	}

	/// # Errors
	///
	/// Iff the operation refers to elements or attributes that the page doesn't have, or the DOM rejects a mutation.
	pub fn apply(&mut self, operation: Operation) -> Result<()> {
		let span = trace_span!("Applying operation", operation = operation.name());
		let _enter = span.enter();

		match operation {
			Operation::RecentChatHtml { html } => self.upsert_recent_chat(&html),
			Operation::MessageHtml { html } => self.append_message(&html),
			Operation::DecrementUnreadCount { other_user_uuid, count } => self.decrement_unread_count(&other_user_uuid, count),
			Operation::UpdateRecentChatReadStatus { other_user_uuid } => {
				let entry = by_id(&self.document, &self.config.conventions.chat_id(&other_user_uuid))?;
				self.mark_read(&entry)
			}
			Operation::UpdateMessageReadStatus { message_uuid } => self.mark_message_read(&message_uuid),
			Operation::UpdateAllMessagesReadStatus { sender_uuid } => self.mark_all_messages_read(&sender_uuid),
			Operation::UpdateSectionCount { page, section, action } => self.step_section_count(page, section, action),
			Operation::RemoveUserFromSection { section, other_user_uuid } => {
				by_id(&self.document, &section.entry_id(&other_user_uuid))?.remove();
				Ok(())
			}
			Operation::AddUserHtmlToSection { section, html } => self.add_user(section, &html),
			Operation::UpdateFriendship { are_friends } => self.update_friendship(are_friends),
			Operation::AccountDeleted | Operation::SessionLoggedOut => self.host.reload(),
			Operation::UpdateAccount { other_user } => self.rename(&other_user),
			Operation::Unknown => {
				debug!("Ignoring unknown operation.");
				Ok(())
			}
		}
	}

	fn materialize(&self, html: &str) -> Result<Element> {
		#[cfg(feature = "dangerous-logging")]
		trace!(html, "Materializing fragment.");
		Fragment::parse(&self.document, html)?.single()
	}

	#[instrument(skip(self, html))]
	fn upsert_recent_chat(&mut self, html: &str) -> Result<()> {
		let conventions = &self.config.conventions;
		let entry = self.materialize(html)?;
		self.formatter.stamp(&entry, conventions)?;

		let id = entry.id();
		if id.is_empty() {
			return Err(Error::MissingAttribute { attribute: "id" });
		}
		let recent_chats = by_id(&self.document, conventions.recent_chats)?;

		let unread_count: UnreadCount = entry
			.get_attribute(UNREAD_COUNT_ATTRIBUTE)
			.ok_or(Error::MissingAttribute { attribute: UNREAD_COUNT_ATTRIBUTE })?
			.parse()?;

		let prior = self.document.get_element_by_id(&id);
		if unread_count == UnreadCount::Increment {
			let prior_count = prior.as_ref().map(read_unread_count).transpose()?;
			set_unread_count(&entry, unread_count.resolve(prior_count), conventions)?;
		}

		if let Some(prior) = prior {
			trace!("Removing previous entry {:?}.", id);
			prior.remove();
		}

		recent_chats.prepend_with_node_1(&entry)?;
		self.host.process(&recent_chats);
		Ok(())
	}

	#[instrument(skip(self, html))]
	fn append_message(&mut self, html: &str) -> Result<()> {
		let conventions = &self.config.conventions;
		let message = self.materialize(html)?;
		let local = self.formatter.stamp(&message, conventions)?;
		let messages = by_id(&self.document, conventions.messages)?;

		let date_id = conventions.date_id(&local.date);
		if self.document.get_element_by_id(&date_id).is_none() {
			trace!("First message on {:?}. Adding date header.", local.date);
			let header = self.document.create_element("div")?;
			header.set_id(&date_id);
			header.set_class_name(conventions.date_text_class);
			header.set_text_content(Some(&local.date));
			messages.append_child(&header)?;
		}

		messages.append_child(&message)?;

		if self.view.take_new_messages_marker() {
			trace!("Clearing new messages marker.");
			by_id(&self.document, conventions.new_messages_marker)?.remove();
		}
		Ok(())
	}

	#[instrument(skip(self))]
	fn decrement_unread_count(&mut self, other_user_uuid: &str, count: u32) -> Result<()> {
		let entry = by_id(&self.document, &self.config.conventions.chat_id(other_user_uuid))?;
		let unread = read_unread_count(&entry)?;
		set_unread_count(&entry, unread.saturating_sub(count), &self.config.conventions)
	}

	fn mark_read(&self, element: &Element) -> Result<()> {
		let conventions = &self.config.conventions;
		child(element, conventions.read_status_selector)?.set_text_content(Some(conventions.read_text));
		Ok(())
	}

	fn mark_message_entry_read(&self, message: &Element) -> Result<()> {
		message.set_attribute(READ_ATTRIBUTE, READ)?;
		self.mark_read(message)
	}

	#[instrument(skip(self))]
	fn mark_message_read(&mut self, message_uuid: &str) -> Result<()> {
		let message = match self.document.get_element_by_id(&self.config.conventions.message_id(message_uuid)) {
			Some(message) => message,
			None => {
				trace!("Message not displayed. Nothing to mark.");
				return Ok(());
			}
		};

		if message.get_attribute(READ_ATTRIBUTE).as_deref() == Some(UNREAD) {
			self.mark_message_entry_read(&message)
		} else {
			trace!("Message already read.");
			Ok(())
		}
	}

	#[instrument(skip(self))]
	fn mark_all_messages_read(&mut self, sender_uuid: &str) -> Result<()> {
		let selector = format!(".{}[{}='{}']", self.config.conventions.message_class, READ_ATTRIBUTE, UNREAD);
		let unread = self.document.query_selector_all(&selector)?;

		// The `NodeList` is static, so flipping `data-read` while iterating is fine.
		let mut marked = 0_usize;
		for message in (0..unread.length()).filter_map(|i| unread.item(i)).filter_map(|node| node.dyn_into::<Element>().ok()) {
			if message.get_attribute(SENDER_ATTRIBUTE).as_deref() == Some(sender_uuid) {
				self.mark_message_entry_read(&message)?;
				marked += 1;
			}
		}
		trace!("Marked {} message(s) as read.", marked);
		Ok(())
	}

	#[instrument(skip(self))]
	fn step_section_count(&mut self, page: Page, section: Section, action: CountAction) -> Result<()> {
		let counter = by_id(&self.document, &section.count_id(page))?;
		let count = parse_count(&counter.text_content().unwrap_or_default())?;
		counter.set_text_content(Some(&action.apply(count).to_string()));
		Ok(())
	}

	#[instrument(skip(self, html))]
	fn add_user(&mut self, section: Section, html: &str) -> Result<()> {
		let user = self.materialize(html)?;
		let container = by_id(&self.document, &section.container_id())?;
		match insert_sorted(&container, &user)? {
			Insertion::Inserted(index) => {
				trace!("Inserted user at index {}.", index);
				self.host.process(&container);
			}
			Insertion::Duplicate => warn!("A user with the same username is already listed in {:?}. Keeping the listed one.", section),
		}
		Ok(())
	}

	#[instrument(skip(self))]
	fn update_friendship(&mut self, are_friends: bool) -> Result<()> {
		self.view.friendship = Friendship::from(are_friends);

		let conventions = &self.config.conventions;
		let status = by_id(&self.document, conventions.friendship_status)?;
		status.set_text_content(None);
		if !are_friends {
			let banner = self.document.create_element("p")?;
			banner.set_class_name(conventions.not_friends_class);
			banner.set_text_content(Some(conventions.not_friends_text));
			status.append_child(&banner)?;
		}
		Ok(())
	}

	#[instrument(skip(self, other_user), fields(uuid = %other_user.uuid))]
	fn rename(&mut self, other_user: &OtherUser) -> Result<()> {
		let conventions = &self.config.conventions;
		let entry = by_id(&self.document, &conventions.chat_id(&other_user.uuid))?;
		child(&entry, conventions.username_selector)?.set_text_content(Some(&other_user.username));
		#[cfg(feature = "dangerous-logging")]
		info!(username = %other_user.username, "Renamed chat counterpart.");
		#[cfg(not(feature = "dangerous-logging"))]
		info!("Renamed chat counterpart.");
		Ok(())
	}
}

/// Logs instead of propagating, for use at the event boundary.
pub(crate) fn report(result: Result<()>, context: &str) {
	if let Err(error) = result {
		error!("{} failed: {}", context, error)
	}
}

fn by_id(document: &Document, id: &str) -> Result<Element> {
	document.get_element_by_id(id).ok_or_else(|| Error::MissingElement { id: id.to_owned() })
}

fn child(element: &Element, selector: &str) -> Result<Element> {
	element.query_selector(selector)?.ok_or_else(|| Error::MissingChild { selector: selector.to_owned() })
}

fn read_unread_count(entry: &Element) -> Result<u32> {
	let value = entry.get_attribute(UNREAD_COUNT_ATTRIBUTE).ok_or(Error::MissingAttribute { attribute: UNREAD_COUNT_ATTRIBUTE })?;
	parse_count(&value)
}

fn set_unread_count(entry: &Element, count: u32, conventions: &Conventions) -> Result<()> {
	let count = count.to_string();
	entry.set_attribute(UNREAD_COUNT_ATTRIBUTE, &count)?;
	child(entry, conventions.unread_count_selector)?.set_text_content(Some(&count));
	Ok(())
}
