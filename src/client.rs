//! Wiring htmx's DOM events to the reconciler and the connection tracker.

use crate::{
	body::sync_body_attributes,
	config::Config,
	connection::{ConnectionStatus, ConnectionTracker},
	error::{Error, Result},
	host::{Host, Htmx},
	reconcile::{report, Reconciler},
	state::{Friendship, ViewState},
};
use core::cell::RefCell;
use hashbrown::HashMap;
use js_sys::Reflect;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{CustomEvent, Document, Element, Event, HtmlInputElement, HtmlTextAreaElement};

pub const WS_OPEN: &str = "htmx:wsOpen";
pub const WS_CLOSE: &str = "htmx:wsClose";
pub const WS_BEFORE_MESSAGE: &str = "htmx:wsBeforeMessage";
pub const WS_CONFIG_SEND: &str = "htmx:wsConfigSend";
pub const WS_AFTER_SEND: &str = "htmx:wsAfterSend";
pub const BEFORE_SWAP: &str = "htmx:beforeSwap";
pub const AFTER_SETTLE: &str = "htmx:afterSettle";

#[derive(Debug)]
struct Session<H> {
	reconciler: Reconciler<H>,
	connection: ConnectionTracker,
}

type Listener = Closure<dyn FnMut(Event)>;

/// The installed client: a set of event listeners on one element (normally `<body>`) sharing a session.
///
/// Dropping the client removes its listeners.
pub struct Client<H> {
	session: Rc<RefCell<Session<H>>>,
	target: Element,
	listeners: HashMap<&'static str, Listener>,
}

impl<H> core::fmt::Debug for Client<H> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Client")
			.field("target", &self.target)
			.field("listeners", &self.listeners.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl<H: Host + 'static> Client<H> {
	/// Listens for htmx events bubbling up to `target`.
	///
	/// # Errors
	///
	/// Iff the reconciler can't be created or a listener can't be added.
	#[instrument(skip(document, config, host))]
	pub fn install(target: Element, document: Document, config: Config, host: H) -> Result<Self> {
		let session = Rc::new(RefCell::new(Session {
			reconciler: Reconciler::new(document, config, host)?,
			connection: ConnectionTracker::new(),
		}));

		let mut client = Self {
			session,
			target,
			listeners: HashMap::new(),
		};

		client.listen(WS_OPEN, |session, _| {
			let Session { reconciler, connection } = session;
			report(connection.opened(reconciler.document(), reconciler.conventions(), reconciler.host()), "Resynchronisation");
		})?;

		client.listen(WS_CLOSE, |session, _| {
			let Session { reconciler, connection } = session;
			connection.closed(reconciler.document(), reconciler.conventions());
		})?;

		client.listen(WS_BEFORE_MESSAGE, |session, event| {
			let message = match detail(event, &["message"]).and_then(|message| message.as_string()) {
				Some(message) => message,
				None => return warn!("{} without a text message. Ignoring.", WS_BEFORE_MESSAGE),
			};
			// Fully handled here. htmx would otherwise try to swap the JSON as HTML.
			event.prevent_default();
			report(session.reconciler.apply_json(&message), "Applying pushed update");
		})?;

		client.listen(WS_CONFIG_SEND, |session, event| {
			if trigger_id(event).as_deref() == Some(session.reconciler.conventions().load_trigger) {
				return;
			}
			let content = detail(event, &["parameters", "content"]).and_then(|content| content.as_string()).unwrap_or_default();
			if !session.reconciler.view().may_send(&content) {
				debug!("Blocking send. Friendship: {:?}", session.reconciler.view().friendship);
				event.prevent_default();
			}
		})?;

		client.listen(WS_AFTER_SEND, |session, event| {
			let conventions = session.reconciler.conventions();
			if trigger_id(event).as_deref() == Some(conventions.load_trigger) {
				return;
			}
			match session.reconciler.document().get_element_by_id(conventions.chat_input) {
				Some(input) => clear_value(&input),
				None => warn!("No #{} to clear.", conventions.chat_input),
			}
		})?;

		client.listen(BEFORE_SWAP, |session, _| session.reconciler.reset_view())?;

		client.listen(AFTER_SETTLE, |session, event| {
			session.reconciler.observe_page();

			let swapped_body = detail(event, &["target"])
				.and_then(|target| target.dyn_into::<Element>().ok())
				.map_or(false, |target| target.tag_name().eq_ignore_ascii_case("body"));
			if !swapped_body {
				return;
			}

			let response = match detail(event, &["xhr", "response"]).and_then(|response| response.as_string()) {
				Some(response) => response,
				None => return warn!("Body swap without a text response. Not syncing body attributes."),
			};
			match sync_body_attributes(session.reconciler.document(), &response) {
				Ok(true) => {
					info!("Body attributes changed. Reloading so they take effect.");
					report(session.reconciler.host().reload(), "Reloading after body change")
				}
				Ok(false) => trace!("Body attributes unchanged."),
				Err(error) => error!("Syncing body attributes failed: {}", error),
			}
		})?;

		// htmx doesn't settle the initially loaded page.
		client.session.borrow_mut().reconciler.observe_page();

		info!("Installed {} listeners.", client.listeners.len());
		Ok(client)
	}

	fn listen(&mut self, name: &'static str, mut handler: impl 'static + FnMut(&mut Session<H>, &Event)) -> Result<()> {
		let session = Rc::downgrade(&self.session);
		let listener: Listener = Closure::wrap(Box::new(move |event: Event| {
			let span = trace_span!("Handling event", name);
			let _enter = span.enter();

			let session = match session.upgrade() {
				Some(session) => session,
				None => return error!("Event after the client was dropped."),
			};
			// Handlers run to completion, but one might synchronously cause another event through htmx.
			let mut session = match session.try_borrow_mut() {
				Ok(session) => session,
				Err(_) => return error!("Re-entrant {} while another event is being handled. Dropping it.", name),
			};
			handler(&mut *session, &event);
		}));

		self.target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
		if let Some(replaced) = self.listeners.insert(name, listener) {
			self.detach(name, &replaced);
		}
		Ok(())
	}

	/// Overrides the friendship flag, for pages that render the initial friendship state.
	pub fn set_are_friends(&self, are_friends: bool) {
		self.session.borrow_mut().reconciler.view_mut().friendship = Friendship::from(are_friends);
	}

	#[must_use]
	pub fn view(&self) -> ViewState {
		self.session.borrow().reconciler.view().clone()
	}

	#[must_use]
	pub fn connection_status(&self) -> ConnectionStatus {
		self.session.borrow().connection.status()
	}
}

impl<H> Client<H> {
	fn detach(&self, name: &str, listener: &Listener) {
		if let Err(error) = self.target.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref()) {
			error!("Failed to remove {} listener: {:?}", name, error)
		}
	}
}

impl<H> Drop for Client<H> {
	fn drop(&mut self) {
		for (name, listener) in &self.listeners {
			self.detach(name, listener)
		}
		trace!("Removed {} listeners.", self.listeners.len());
	}
}

/// Walks `path` through the event's `detail` object.
fn detail(event: &Event, path: &[&str]) -> Option<JsValue> {
	let mut value = event.dyn_ref::<CustomEvent>()?.detail();
	for key in path {
		if value.is_undefined() || value.is_null() {
			return None;
		}
		value = Reflect::get(&value, &JsValue::from_str(key)).ok()?;
	}
	if value.is_undefined() || value.is_null() {
		None
	} else {
		Some(value)
	}
}

/// Id of the element that triggered a websocket send.
fn trigger_id(event: &Event) -> Option<String> {
	detail(event, &["elt"]).and_then(|element| element.dyn_into::<Element>().ok()).map(|element| element.id())
}

fn clear_value(input: &Element) {
	if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
		input.set_value("")
	} else if let Some(textarea) = input.dyn_ref::<HtmlTextAreaElement>() {
		textarea.set_value("")
	} else {
		warn!("Chat input is neither <input> nor <textarea>: {:?}", input.tag_name());
	}
}

thread_local! {
	static CLIENT: RefCell<Option<Client<Htmx>>> = RefCell::new(None);
}

/// Installs the client on `document.body` with the default configuration.
///
/// Calling this again replaces the previous installation.
///
/// # Errors
///
/// Iff there is no document body or installation fails.
#[wasm_bindgen]
pub fn install() -> core::result::Result<(), JsValue> {
	let document = web_sys::window().and_then(|window| window.document()).ok_or_else(|| Error::Js("No `document`.".to_owned()))?;
	let body = document.body().ok_or_else(|| Error::MissingElement { id: "body".to_owned() })?;
	let client = Client::install(body.into(), document, Config::default(), Htmx)?;
	CLIENT.with(|slot| *slot.borrow_mut() = Some(client));
	Ok(())
}

/// Sets the friendship flag of the installed client. Does nothing before [`install`].
#[wasm_bindgen(js_name = setAreFriends)]
pub fn set_are_friends(are_friends: bool) {
	CLIENT.with(|slot| match &*slot.borrow() {
		Some(client) => client.set_are_friends(are_friends),
		None => warn!("`setAreFriends` before `install`. Ignoring."),
	})
}
