//! Local display of the UTC timestamps that fragments carry in `data-utc-timestamp`.

use crate::{
	config::{Config, Conventions},
	error::{Error, Result},
};
use js_sys::{Array, Date, Function, Intl::DateTimeFormat, Object, Reflect};
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

pub const UTC_TIMESTAMP_ATTRIBUTE: &str = "data-utc-timestamp";
pub const DATE_ATTRIBUTE: &str = "data-date";
pub const TIME_ATTRIBUTE: &str = "data-time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTimestamp {
	pub date: String,
	pub time: String,
}

/// Formats instants as short local date and short local time, like `Intl.DateTimeFormat` with
/// `dateStyle: "short"` and `timeStyle: "short"`.
///
/// The two underlying formatters are created once and reused, since constructing them is comparatively expensive.
#[derive(Debug, Clone)]
pub struct TimestampFormatter {
	date: Function,
	time: Function,
}

impl TimestampFormatter {
	/// # Errors
	///
	/// Iff the formatter options can't be assembled or `Intl.DateTimeFormat` rejects them,
	/// for example because of an unsupported `time_zone`.
	#[instrument]
	pub fn new(config: &Config) -> Result<Self> {
		Ok(Self {
			date: short_formatter(config, "dateStyle")?,
			time: short_formatter(config, "timeStyle")?,
		})
	}

	/// # Errors
	///
	/// [`Error::InvalidTimestamp`] iff `utc_timestamp` isn't understood by `Date`.
	pub fn format(&self, utc_timestamp: &str) -> Result<LocalTimestamp> {
		let instant = Date::new(&JsValue::from_str(utc_timestamp));
		if instant.get_time().is_nan() {
			return Err(Error::InvalidTimestamp { value: utc_timestamp.to_owned() });
		}
		Ok(LocalTimestamp {
			date: apply(&self.date, &instant)?,
			time: apply(&self.time, &instant)?,
		})
	}

	/// Reads `element`'s UTC timestamp and writes the local rendering into its `data-date` and `data-time`
	/// attributes as well as into its `.date` and `.time` descendants, where present.
	///
	/// # Errors
	///
	/// Iff the timestamp attribute is missing or invalid, or the DOM refuses the update.
	#[instrument(skip(self, conventions))]
	pub fn stamp(&self, element: &Element, conventions: &Conventions) -> Result<LocalTimestamp> {
		let utc_timestamp = element
			.get_attribute(UTC_TIMESTAMP_ATTRIBUTE)
			.ok_or(Error::MissingAttribute { attribute: UTC_TIMESTAMP_ATTRIBUTE })?;
		let local = self.format(&utc_timestamp)?;
		trace!(date = %local.date, time = %local.time, "Stamping local timestamp.");

		element.set_attribute(TIME_ATTRIBUTE, &local.time)?;
		element.set_attribute(DATE_ATTRIBUTE, &local.date)?;

		if let Some(time_element) = element.query_selector(conventions.time_selector)? {
			time_element.set_text_content(Some(&local.time));
		}
		if let Some(date_element) = element.query_selector(conventions.date_selector)? {
			date_element.set_text_content(Some(&local.date));
		}

		Ok(local)
	}
}

fn short_formatter(config: &Config, style: &str) -> Result<Function> {
	let locales = Array::new();
	if let Some(locale) = &config.locale {
		locales.push(&JsValue::from_str(locale));
	}

	let options = Object::new();
	Reflect::set(&options, &JsValue::from_str(style), &JsValue::from_str("short"))?;
	if let Some(time_zone) = &config.time_zone {
		Reflect::set(&options, &JsValue::from_str("timeZone"), &JsValue::from_str(time_zone))?;
	}

	// Constructed reflectively so that a rejected locale or time zone is caught.
	let constructor: Function = Reflect::get(&Reflect::get(&js_sys::global(), &JsValue::from_str("Intl"))?, &JsValue::from_str("DateTimeFormat"))?
		.dyn_into::<Function>()
		.map_err(|value| Error::Js(format!("`Intl.DateTimeFormat` is not a constructor: {:?}", value)))?;
	let formatter: DateTimeFormat = Reflect::construct(&constructor, &Array::of2(&locales, &options))?.unchecked_into();
	Ok(formatter.format())
}

fn apply(formatter: &Function, instant: &Date) -> Result<String> {
	let formatted = formatter.call1(&JsValue::UNDEFINED, instant)?;
	formatted
		.as_string()
		.ok_or_else(|| Error::Js(format!("`Intl.DateTimeFormat` produced a non-string: {:?}", formatted)))
}
