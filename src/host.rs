//! What the reconciler needs from its surroundings beyond the DOM itself.

use crate::error::{Error, Result};
use js_sys::{Object, Reflect};
use tracing::{info, instrument};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use web_sys::Element;

/// Page-level effects that are owned by htmx and the browser rather than by this crate.
pub trait Host {
	/// Issues a GET for `path` that carries `header: true`, so the backend answers with a complete
	/// document that htmx swaps in.
	///
	/// # Errors
	///
	/// Iff the request can't be issued.
	fn request_full_page(&self, path: &str, header: &str) -> Result<()>;

	/// Reloads the whole page.
	///
	/// # Errors
	///
	/// Iff the browser refuses.
	fn reload(&self) -> Result<()>;

	/// Enables htmx behaviour (`hx-*` attributes) on freshly inserted content below `element`.
	fn process(&self, element: &Element);
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = htmx, js_name = ajax, catch)]
	fn htmx_ajax(verb: &str, path: &str, context: &JsValue) -> core::result::Result<JsValue, JsValue>;

	#[wasm_bindgen(js_namespace = htmx, js_name = process)]
	fn htmx_process(element: &Element);
}

/// [`Host`] backed by the global `htmx` object and `window.location`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Htmx;

impl Host for Htmx {
	#[instrument]
	fn request_full_page(&self, path: &str, header: &str) -> Result<()> {
		let headers = Object::new();
		Reflect::set(&headers, &JsValue::from_str(header), &JsValue::from_str("true"))?;
		let context = Object::new();
		Reflect::set(&context, &JsValue::from_str("headers"), &headers)?;

		info!("Requesting full page.");
		htmx_ajax("GET", path, &context)?;
		Ok(())
	}

	#[instrument]
	fn reload(&self) -> Result<()> {
		info!("Reloading page.");
		web_sys::window().ok_or_else(|| Error::Js("No `window`.".to_owned()))?.location().reload()?;
		Ok(())
	}

	fn process(&self, element: &Element) {
		htmx_process(element)
	}
}
