//! Domain-rule validation and formatting helpers shared by GA4 actions.
//!
//! GA4 rejects requests that violate its Measurement Protocol rules after
//! accepting them with a 2xx, silently dropping the event. Everything here
//! runs before the request is built so a violation fails loudly as a
//! classified validation error instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use courier_core::ActionError;

/// ISO 4217 currency codes GA4 accepts.
const CURRENCY_CODES: [&str; 42] = [
    "AED", "ARS", "AUD", "BGN", "BRL", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK", "EGP",
    "EUR", "GBP", "HKD", "HUF", "IDR", "ILS", "INR", "JPY", "KRW", "MXN", "MYR", "NGN", "NOK",
    "NZD", "PEN", "PHP", "PKR", "PLN", "RON", "SAR", "SEK", "SGD", "THB", "TRY", "TWD", "UAH",
    "USD", "VND", "ZAR",
];

/// Unix-second threshold below which an integer timestamp is read as
/// seconds (about year 5138); above it, milliseconds; above a thousand
/// times that, microseconds.
const SECONDS_CEILING: u64 = 100_000_000_000;

/// Validate a currency code against the GA4 allow-list.
pub(crate) fn verify_currency(currency: &str) -> Result<(), ActionError> {
    let canonical = currency.to_ascii_uppercase();
    if CURRENCY_CODES.contains(&canonical.as_str()) {
        Ok(())
    } else {
        Err(ActionError::field_validation(format!(
            "{currency} is not a valid currency code."
        )))
    }
}

/// GA4 event parameters must be flat; nested objects and arrays are
/// rejected here rather than silently dropped by GA4.
pub(crate) fn verify_params(params: &Map<String, Value>) -> Result<(), ActionError> {
    for (name, value) in params {
        if value.is_object() || value.is_array() {
            return Err(ActionError::field_validation(format!(
                "GA4 does not accept nested values for event parameters. Remove the nested value for `{name}` or flatten it."
            )));
        }
    }
    Ok(())
}

/// User properties must likewise be flat scalars (null is allowed, to
/// clear a property).
pub(crate) fn verify_user_props(props: &Map<String, Value>) -> Result<(), ActionError> {
    for (name, value) in props {
        if value.is_object() || value.is_array() {
            return Err(ActionError::field_validation(format!(
                "GA4 does not accept nested values for user properties. Remove the nested value for `{name}` or flatten it."
            )));
        }
    }
    Ok(())
}

/// Wrap mapped user properties into the `{name: {"value": ...}}` shape the
/// Measurement Protocol expects.
pub(crate) fn format_user_properties(props: &Map<String, Value>) -> Value {
    let wrapped: Map<String, Value> = props
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::json!({ "value": value })))
        .collect();
    Value::Object(wrapped)
}

/// An event timestamp as mapped from the incoming event: either a unix
/// timestamp (seconds, milliseconds, or microseconds, disambiguated by
/// magnitude) or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTimestamp {
    Unix(i64),
    Rfc3339(String),
}

/// Normalize an event timestamp to the microseconds GA4 expects.
pub(crate) fn convert_timestamp(ts: &EventTimestamp) -> Result<i64, ActionError> {
    match ts {
        EventTimestamp::Unix(raw) => {
            let raw = *raw;
            let magnitude = raw.unsigned_abs();
            if magnitude < SECONDS_CEILING {
                Ok(raw * 1_000_000)
            } else if magnitude < SECONDS_CEILING * 1_000 {
                Ok(raw * 1_000)
            } else {
                Ok(raw)
            }
        }
        EventTimestamp::Rfc3339(raw) => {
            let parsed: DateTime<Utc> = raw.parse().map_err(|_| {
                ActionError::field_validation(format!(
                    "`{raw}` is not a valid timestamp. Use RFC 3339 or a unix timestamp."
                ))
            })?;
            Ok(parsed.timestamp_micros())
        }
    }
}
