//! # Google Analytics 4 destination
//!
//! Delivers events to the GA4 Measurement Protocol collect endpoint. A GA4
//! property ingests through either a web data stream (identified by
//! `measurement_id` + per-device `client_id`) or a mobile app stream
//! (identified by `firebase_app_id` + `app_instance_id`); the payload's
//! stream type selects which pair of credentials an event needs.
//!
//! Missing stream-level identifiers are settings failures (the fix is in
//! the destination configuration); missing per-event identifiers are field
//! failures (the fix is in the event mapping).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use courier_core::ActionError;

pub(crate) mod functions;
mod view_item;

pub use functions::EventTimestamp;
pub use view_item::{ProductItem, ViewItem, ViewItemPayload};

/// Production Measurement Protocol collect endpoint.
const COLLECT_URL: &str = "https://www.google-analytics.com/mp/collect";

/// Destination-level settings for the GA4 destination.
///
/// Custom `Debug` redacts the API secret to keep credentials out of logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ga4Settings {
    /// Measurement ID of the web data stream. Required for web streams.
    #[serde(default)]
    pub measurement_id: Option<String>,
    /// Firebase App ID of the mobile app stream. Required for mobile
    /// streams.
    #[serde(default)]
    pub firebase_app_id: Option<String>,
    /// Measurement Protocol API secret generated in the GA4 admin UI.
    pub api_secret: String,
    /// Override of the collect URL, for testing and proxies.
    #[serde(default)]
    pub collect_url: Option<String>,
}

impl std::fmt::Debug for Ga4Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ga4Settings")
            .field("measurement_id", &self.measurement_id)
            .field("firebase_app_id", &self.firebase_app_id)
            .field("api_secret", &"[REDACTED]")
            .field("collect_url", &self.collect_url)
            .finish()
    }
}

impl Ga4Settings {
    pub(crate) fn collect_base(&self) -> &str {
        self.collect_url.as_deref().unwrap_or(COLLECT_URL)
    }
}

/// Which GA4 data stream an event belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStreamType {
    /// Web data stream (`measurement_id` + `client_id`).
    #[default]
    Web,
    /// Mobile app stream (`firebase_app_id` + `app_instance_id`).
    MobileApp,
}

/// Resolved stream credentials for one event: the query-string parameters
/// and the identifier object merged into the request body.
#[derive(Debug, Clone)]
pub(crate) struct StreamParams {
    pub search_params: String,
    pub identifier: Value,
}

/// Resolve the credentials the selected stream type requires.
///
/// The Firebase App ID may contain colons, which must not be
/// percent-encoded; the parameters are therefore interpolated into a raw
/// query string instead of going through a URL encoder.
pub(crate) fn stream_params(
    settings: &Ga4Settings,
    stream_type: DataStreamType,
    app_instance_id: Option<&str>,
    client_id: Option<&str>,
) -> Result<StreamParams, ActionError> {
    match stream_type {
        DataStreamType::MobileApp => {
            let firebase_app_id = settings.firebase_app_id.as_deref().ok_or_else(|| {
                ActionError::settings_validation(
                    "Firebase App ID is required for mobile app streams.",
                )
            })?;
            let app_instance_id = app_instance_id.ok_or_else(|| {
                ActionError::field_validation(
                    "Firebase App Instance ID is required for mobile app streams.",
                )
            })?;
            Ok(StreamParams {
                search_params: format!(
                    "api_secret={}&firebase_app_id={}",
                    settings.api_secret, firebase_app_id
                ),
                identifier: serde_json::json!({ "app_instance_id": app_instance_id }),
            })
        }
        DataStreamType::Web => {
            let measurement_id = settings.measurement_id.as_deref().ok_or_else(|| {
                ActionError::settings_validation("Measurement ID is required for web streams.")
            })?;
            let client_id = client_id.ok_or_else(|| {
                ActionError::field_validation("Client ID is required for web streams.")
            })?;
            Ok(StreamParams {
                search_params: format!(
                    "api_secret={}&measurement_id={}",
                    settings.api_secret, measurement_id
                ),
                identifier: serde_json::json!({ "client_id": client_id }),
            })
        }
    }
}
