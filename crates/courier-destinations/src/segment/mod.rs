//! # Segment destination
//!
//! Forwards events to the Segment tracking API. Settings select a regional
//! ingest endpoint from a closed map; an unknown selection is a
//! settings-level failure, not a per-event one.
//!
//! ## Endpoints
//!
//! | Selection | Base URL |
//! |-----------|----------|
//! | `north_america` | `https://api.segment.io` |
//! | `europe` | `https://events.eu1.segmentapis.com` |

use serde::Deserialize;

use courier_core::ActionError;

pub mod errors;
mod send_track;

pub use send_track::{SendTrack, TrackPayload};

/// Destination-level settings for the Segment destination.
///
/// Custom `Debug` redacts the write key to keep credentials out of logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSettings {
    /// Write key of the Segment source events are delivered to.
    pub source_write_key: String,
    /// Regional endpoint selection (`north_america` or `europe`).
    pub endpoint: String,
    /// Override of the ingest base URL, for testing and proxies.
    #[serde(default)]
    pub endpoint_override: Option<String>,
}

impl std::fmt::Debug for SegmentSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentSettings")
            .field("source_write_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("endpoint_override", &self.endpoint_override)
            .finish()
    }
}

impl SegmentSettings {
    /// Resolve the ingest base URL for the selected region.
    ///
    /// Fails with the shared settings-validation factory when the selection
    /// is not in the closed endpoint map.
    pub fn base_url(&self) -> Result<String, ActionError> {
        if let Some(override_url) = &self.endpoint_override {
            return Ok(override_url.trim_end_matches('/').to_string());
        }
        match self.endpoint.as_str() {
            "north_america" => Ok("https://api.segment.io".to_string()),
            "europe" => Ok("https://events.eu1.segmentapis.com".to_string()),
            _ => Err(errors::invalid_endpoint_selected()),
        }
    }
}
