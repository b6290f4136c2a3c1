//! View Item action: sends a `view_item` event when a user views a product.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use courier_core::{
    ActionContext, ActionError, ActionSchema, DestinationAction, FieldType, InputField,
    PerformOutcome, Transport,
};

use super::functions::{
    convert_timestamp, format_user_properties, verify_currency, verify_params, verify_user_props,
    EventTimestamp,
};
use super::{stream_params, DataStreamType, Ga4Settings};

/// Flag gating the strict params/user-properties verification rollout.
const VERIFY_PARAMS_FLAG: &str = "actions-google-analytics-4-verify-params-feature";
/// Flag gating timestamp forwarding.
const ADD_TIMESTAMP_FLAG: &str = "actions-google-analytics-4-add-timestamp";

/// One product in the `items` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_variant: Option<String>,
}

/// Mapped payload for one `view_item` event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ViewItemPayload {
    #[serde(default)]
    pub data_stream_type: DataStreamType,
    #[serde(default)]
    pub app_instance_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timestamp_micros: Option<EventTimestamp>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub items: Vec<ProductItem>,
    #[serde(default)]
    pub user_properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub engagement_time_msec: Option<u64>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// The View Item destination action.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewItem;

impl DestinationAction for ViewItem {
    type Settings = Ga4Settings;
    type Payload = ViewItemPayload;

    fn schema() -> ActionSchema {
        ActionSchema {
            title: "View Item",
            description: "Send event when a user views an item.",
            default_subscription: Some("type = \"track\" and event = \"Product Viewed\""),
            fields: BTreeMap::from([
                (
                    "data_stream_type",
                    InputField::optional(
                        "Data Stream Type",
                        "Web stream or mobile app stream the event belongs to.",
                        FieldType::String,
                    )
                    .with_literal(serde_json::json!("web")),
                ),
                (
                    "app_instance_id",
                    InputField::optional(
                        "Firebase App Instance ID",
                        "Required for mobile app streams.",
                        FieldType::String,
                    ),
                ),
                (
                    "client_id",
                    InputField::optional(
                        "Client ID",
                        "Required for web streams.",
                        FieldType::String,
                    )
                    .with_event_path("$.anonymousId"),
                ),
                (
                    "user_id",
                    InputField::optional(
                        "User ID",
                        "Identifier for a user across platforms.",
                        FieldType::String,
                    )
                    .with_event_path("$.userId"),
                ),
                (
                    "timestamp_micros",
                    InputField::optional(
                        "Timestamp",
                        "When the event occurred. RFC 3339 or unix timestamp.",
                        FieldType::DateTime,
                    )
                    .with_event_path("$.timestamp"),
                ),
                (
                    "currency",
                    InputField::optional(
                        "Currency",
                        "ISO 4217 currency code of the event value.",
                        FieldType::String,
                    )
                    .with_event_path("$.properties.currency"),
                ),
                (
                    "value",
                    InputField::optional("Value", "Monetary value of the event.", FieldType::Number)
                        .with_event_path("$.properties.value"),
                ),
                (
                    "items",
                    InputField::required(
                        "Items",
                        "The viewed products. Each item needs a product name or product id.",
                        FieldType::Object,
                    ),
                ),
                (
                    "user_properties",
                    InputField::optional(
                        "User Properties",
                        "User properties forwarded with the event. Values must be flat.",
                        FieldType::Object,
                    ),
                ),
                (
                    "engagement_time_msec",
                    InputField::optional(
                        "Engagement Time",
                        "Duration of user engagement, milliseconds.",
                        FieldType::Integer,
                    )
                    .with_literal(serde_json::json!(1)),
                ),
                (
                    "params",
                    InputField::optional(
                        "Event Parameters",
                        "Extra flat event parameters.",
                        FieldType::Object,
                    ),
                ),
            ]),
        }
    }

    async fn perform(
        &self,
        transport: &Transport,
        ctx: ActionContext<'_, Ga4Settings, ViewItemPayload>,
    ) -> Result<PerformOutcome, ActionError> {
        let payload = ctx.payload;
        let stream = stream_params(
            ctx.settings,
            payload.data_stream_type,
            payload.app_instance_id.as_deref(),
            payload.client_id.as_deref(),
        )?;

        if let Some(currency) = &payload.currency {
            verify_currency(currency)?;
        }

        if payload.items.is_empty() {
            return Err(ActionError::field_validation(
                "At least one item is required for product or impression data.",
            ));
        }
        for item in &payload.items {
            if item.item_id.is_none() && item.item_name.is_none() {
                return Err(ActionError::field_validation(
                    "One of product name or product id is required for product or impression data.",
                ));
            }
            if let Some(currency) = &item.currency {
                verify_currency(currency)?;
            }
        }

        if ctx.feature_enabled(VERIFY_PARAMS_FLAG) {
            if let Some(params) = &payload.params {
                verify_params(params)?;
            }
            if let Some(props) = &payload.user_properties {
                verify_user_props(props)?;
            }
        }

        let mut event_params = Map::new();
        if let Some(currency) = &payload.currency {
            event_params.insert("currency".to_string(), Value::String(currency.clone()));
        }
        if let Some(value) = payload.value {
            event_params.insert("value".to_string(), serde_json::json!(value));
        }
        event_params.insert(
            "items".to_string(),
            serde_json::to_value(&payload.items).map_err(|e| {
                ActionError::field_validation(format!("items do not serialize: {e}"))
            })?,
        );
        if let Some(engagement) = payload.engagement_time_msec {
            event_params.insert("engagement_time_msec".to_string(), serde_json::json!(engagement));
        }
        if let Some(params) = &payload.params {
            for (name, value) in params {
                event_params.insert(name.clone(), value.clone());
            }
        }

        let mut body = Map::new();
        if let Value::Object(identifier) = stream.identifier {
            body.extend(identifier);
        }
        if let Some(user_id) = &payload.user_id {
            body.insert("user_id".to_string(), Value::String(user_id.clone()));
        }
        body.insert(
            "events".to_string(),
            serde_json::json!([{ "name": "view_item", "params": event_params }]),
        );
        if let Some(props) = &payload.user_properties {
            body.insert("user_properties".to_string(), format_user_properties(props));
        }
        if ctx.feature_enabled(ADD_TIMESTAMP_FLAG) {
            if let Some(ts) = &payload.timestamp_micros {
                body.insert(
                    "timestamp_micros".to_string(),
                    serde_json::json!(convert_timestamp(ts)?),
                );
            }
        }

        tracing::debug!(
            items = payload.items.len(),
            stream = ?payload.data_stream_type,
            "delivering view_item event"
        );
        let url = format!("{}?{}", ctx.settings.collect_base(), stream.search_params);
        let resp = transport
            .request_json(Method::POST, &url, Some(&Value::Object(body)))
            .await?;
        Ok(PerformOutcome::Delivered(resp))
    }
}
