//! Tracking the websocket connection and healing the page after an outage.

use crate::{config::Conventions, error::Result, host::Host};
use tracing::{info, instrument, warn};
use web_sys::Document;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
	/// Neither opened nor closed yet.
	#[default]
	Unknown,
	Connected,
	Disconnected,
}

/// Follows `htmx:wsOpen`/`htmx:wsClose` and keeps the "connection lost" indicator current.
///
/// Updates pushed while the socket was down are lost, so a reopen after a close resynchronises the
/// whole page instead of trying to replay them.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
	status: ConnectionStatus,
}

impl ConnectionTracker {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn status(&self) -> ConnectionStatus {
		self.status
	}

	/// # Errors
	///
	/// Iff the resynchronisation request can't be issued. The tracker still counts as connected then.
	#[instrument(skip(self, document, conventions, host))]
	pub fn opened(&mut self, document: &Document, conventions: &Conventions, host: &impl Host) -> Result<()> {
		let resync = if self.status == ConnectionStatus::Disconnected {
			info!("Reconnected. Requesting full page to catch up on missed updates.");
			let path = document.location().map_or_else(|| "/".to_owned(), |location| location.pathname().unwrap_or_else(|_| "/".to_owned()));
			host.request_full_page(&path, conventions.full_page_header)
		} else {
			Ok(())
		};

		self.set(ConnectionStatus::Connected, document, conventions);
		resync
	}

	#[instrument(skip(self, document, conventions))]
	pub fn closed(&mut self, document: &Document, conventions: &Conventions) {
		if self.status != ConnectionStatus::Disconnected {
			warn!("Connection lost.");
		}
		self.set(ConnectionStatus::Disconnected, document, conventions)
	}

	fn set(&mut self, status: ConnectionStatus, document: &Document, conventions: &Conventions) {
		self.status = status;
		if let Some(indicator) = document.get_element_by_id(conventions.connection_status) {
			indicator.set_text_content(Some(match status {
				ConnectionStatus::Disconnected => conventions.connection_lost_text,
				ConnectionStatus::Connected | ConnectionStatus::Unknown => "",
			}));
		}
	}
}
