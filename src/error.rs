//! The error type shared by every fallible operation.

use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can make applying a pushed update fail.
///
/// Missing targets are treated as broken page invariants: the operation that ran into one is abandoned
/// and nothing is rolled back.
#[derive(Debug, Error)]
pub enum Error {
	#[error("no element with id {id:?}")]
	MissingElement { id: String },
	#[error("no child element matching {selector:?}")]
	MissingChild { selector: String },
	#[error("missing attribute {attribute:?}")]
	MissingAttribute { attribute: &'static str },
	#[error("not a count: {value:?}")]
	InvalidCount { value: String },
	#[error("not a timestamp: {value:?}")]
	InvalidTimestamp { value: String },
	#[error("expected exactly one element in fragment, found {found}")]
	FragmentShape { found: usize },
	#[error("malformed envelope: {0}")]
	Json(#[from] serde_json::Error),
	#[error("DOM error: {0}")]
	Js(String),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		js_sys::Error::new(&error.to_string()).into()
	}
}
