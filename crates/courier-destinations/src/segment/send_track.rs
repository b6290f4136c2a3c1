//! Send Track action: forwards one track call to the Segment ingest API.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use courier_core::{
    ActionContext, ActionError, ActionSchema, DestinationAction, FieldType, InputField,
    PerformOutcome, Transport,
};

use super::errors;
use super::SegmentSettings;

/// Mapped payload for one track call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPayload {
    /// Permanent user identifier. At least one of `user_id` /
    /// `anonymous_id` must be present; checked imperatively in `perform`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Pre-identification pseudonymous identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
    /// Name of the tracked event.
    pub event: String,
    /// Free-form event properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    /// When the event occurred, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// The Send Track destination action.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendTrack;

impl DestinationAction for SendTrack {
    type Settings = SegmentSettings;
    type Payload = TrackPayload;

    fn schema() -> ActionSchema {
        ActionSchema {
            title: "Send Track",
            description: "Send a track call to the selected Segment regional endpoint.",
            default_subscription: Some("type = \"track\""),
            fields: BTreeMap::from([
                (
                    "user_id",
                    InputField::optional(
                        "User ID",
                        "Permanent identifier of the user. One of User ID or Anonymous ID is required.",
                        FieldType::String,
                    )
                    .with_event_path("$.userId"),
                ),
                (
                    "anonymous_id",
                    InputField::optional(
                        "Anonymous ID",
                        "Pseudonymous identifier used before the user is known. One of User ID or Anonymous ID is required.",
                        FieldType::String,
                    )
                    .with_event_path("$.anonymousId"),
                ),
                (
                    "event",
                    InputField::required("Event Name", "Name of the tracked event.", FieldType::String)
                        .with_event_path("$.event"),
                ),
                (
                    "properties",
                    InputField::optional(
                        "Properties",
                        "Free-form properties of the event.",
                        FieldType::Object,
                    )
                    .with_event_path("$.properties"),
                ),
                (
                    "timestamp",
                    InputField::optional(
                        "Timestamp",
                        "When the event occurred, RFC 3339.",
                        FieldType::DateTime,
                    )
                    .with_event_path("$.timestamp"),
                ),
            ]),
        }
    }

    async fn perform(
        &self,
        transport: &Transport,
        ctx: ActionContext<'_, SegmentSettings, TrackPayload>,
    ) -> Result<PerformOutcome, ActionError> {
        let base = ctx.settings.base_url()?;

        // Cross-field invariant the static schema cannot express.
        if ctx.payload.user_id.is_none() && ctx.payload.anonymous_id.is_none() {
            return Err(errors::missing_user_or_anonymous_id());
        }

        let mut body = serde_json::to_value(ctx.payload).map_err(|e| {
            ActionError::field_validation(format!("payload does not serialize: {e}"))
        })?;
        if let Value::Object(map) = &mut body {
            map.insert(
                "writeKey".to_string(),
                Value::String(ctx.settings.source_write_key.clone()),
            );
        }

        tracing::debug!(event = %ctx.payload.event, "delivering track call");
        let resp = transport
            .request_json(Method::POST, &format!("{base}/v1/track"), Some(&body))
            .await?;
        Ok(PerformOutcome::Delivered(resp))
    }
}
