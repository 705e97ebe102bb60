//! Carrying `<body>` attributes over from full-page responses.
//!
//! htmx only swaps the *content* of the body, but pages declare behaviour on the body element
//! itself (for example the websocket connection). When those attributes change, the page has to be
//! reloaded for them to take effect.

use crate::error::{Error, Result};
use hashbrown::HashSet;
use tracing::{instrument, trace, warn};
use web_sys::{Document, DomParser, Element, NamedNodeMap, SupportedType};

/// Makes the attributes of `document`'s body equal to those of the body in `response_html`.
///
/// Returns whether anything changed.
///
/// # Errors
///
/// Iff the response can't be parsed or an attribute can't be written.
#[instrument(skip(document, response_html), fields(response_html.len = response_html.len()))]
pub fn sync_body_attributes(document: &Document, response_html: &str) -> Result<bool> {
	let parsed = DomParser::new()?.parse_from_string(response_html, SupportedType::TextHtml)?;
	let source = parsed.body().ok_or_else(|| Error::MissingElement { id: "body (response)".to_owned() })?;
	let target = document.body().ok_or_else(|| Error::MissingElement { id: "body".to_owned() })?;
	sync_attributes(&target, &source)
}

/// Makes `target`'s attributes equal to `source`'s. Returns whether anything changed.
///
/// # Errors
///
/// Iff an attribute can't be removed or set.
pub fn sync_attributes(target: &Element, source: &Element) -> Result<bool> {
	let wanted = source.attributes();
	let wanted_names: HashSet<String> = names(&wanted).collect();
	let mut changed = false;

	let current = target.attributes();
	// Backwards, since removal shifts the live `NamedNodeMap`.
	for i in (0..current.length()).rev() {
		let name = match current.item(i) {
			Some(attribute) => attribute.name(),
			None => {
				warn!("Attribute {} vanished while syncing.", i);
				continue;
			}
		};
		if !wanted_names.contains(&name) {
			trace!("Removing body attribute {:?}.", name);
			target.remove_attribute(&name)?;
			changed = true;
		}
	}

	for attribute in (0..wanted.length()).filter_map(|i| wanted.item(i)) {
		let (name, value) = (attribute.name(), attribute.value());
		if target.get_attribute(&name).as_deref() != Some(value.as_str()) {
			trace!("Setting body attribute {:?}.", name);
			target.set_attribute(&name, &value)?;
			changed = true;
		}
	}

	Ok(changed)
}

fn names(attributes: &NamedNodeMap) -> impl '_ + Iterator<Item = String> {
	(0..attributes.length()).filter_map(move |i| attributes.item(i)).map(|attribute| attribute.name())
}
