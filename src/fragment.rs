//! Turning server-rendered HTML snippets into detached elements.

use crate::error::{Error, Result};
use tracing::{instrument, trace};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlTemplateElement};

/// The top-level elements of a parsed HTML snippet.
///
/// Elements are owned by the inert content document of a `<template>`, so they can be queried and
/// mutated without side effects before they are inserted into the page.
#[derive(Debug, Clone)]
pub enum Fragment {
	/// The (trimmed) input was empty or contained no elements at all.
	None,
	Single(Element),
	/// In document order.
	Many(Vec<Element>),
}

impl Fragment {
	/// Parses `html` after trimming surrounding whitespace.
	///
	/// Only top-level *elements* are kept: stray top-level text or comments are dropped.
	/// Well-formedness is whatever the browser's HTML parser tolerates.
	///
	/// # Errors
	///
	/// Iff a `<template>` element can't be created in `document`.
	#[instrument(skip(html), fields(html.len = html.len()))]
	pub fn parse(document: &Document, html: &str) -> Result<Self> {
		let html = html.trim();
		if html.is_empty() {
			return Ok(Self::None);
		}

		let template = document
			.create_element("template")?
			.dyn_into::<HtmlTemplateElement>()
			.map_err(|element| Error::Js(format!("Expected `HtmlTemplateElement` but created {:?}", element)))?;
		template.set_inner_html(html);

		let children = template.content().children();
		let mut elements: Vec<Element> = (0..children.length()).filter_map(|i| children.item(i)).collect();
		trace!("Parsed {} top-level element(s).", elements.len());

		Ok(match elements.len() {
			0 => Self::None,
			1 => Self::Single(elements.remove(0)),
			_ => Self::Many(elements),
		})
	}

	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			Self::None => 0,
			Self::Single(_) => 1,
			Self::Many(elements) => elements.len(),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::None)
	}

	/// # Errors
	///
	/// [`Error::FragmentShape`] unless there is exactly one top-level element.
	pub fn single(self) -> Result<Element> {
		match self {
			Self::Single(element) => Ok(element),
			other => Err(Error::FragmentShape { found: other.len() }),
		}
	}

	/// All top-level elements, in document order.
	#[must_use]
	pub fn into_elements(self) -> Vec<Element> {
		match self {
			Self::None => Vec::new(),
			Self::Single(element) => vec![element],
			Self::Many(elements) => elements,
		}
	}
}
