//! One-shot HTTP transport for destination actions.
//!
//! Wraps a shared `reqwest::Client` behind the request primitive actions
//! consume: method, URL, serializable JSON body. Exactly one request goes
//! out per call — retries are NOT built into the transport; the delivery
//! pipeline owns retry policy once it receives a retryable error.
//!
//! ## Classification
//!
//! Every transport failure leaves as a classified [`ActionError`]:
//! - request timeout → retryable at 408
//! - connection failure → retryable at 500
//! - non-2xx response → [`classify_response_status`]

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::errors::{ActionError, RetryableStatus};
use crate::retry::classify_response_status;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest response-body excerpt carried into a user-visible message.
const BODY_EXCERPT_LEN: usize = 256;

/// Shared HTTP transport handle. Cheap to clone; the underlying connection
/// pool is shared across clones and tasks.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

/// A successful (2xx) delivery.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    /// The HTTP status the destination returned.
    pub status: u16,
    /// The response body, when it parses as JSON.
    pub body: Option<Value>,
}

impl Transport {
    /// Build a transport with the default 30 s per-request timeout.
    pub fn new() -> Result<Self, ActionError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Build a transport with an explicit per-request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ActionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                ActionError::retryable_default(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Issue exactly one JSON request and classify the outcome.
    ///
    /// A malformed `url` fails with `SettingsValidation` before anything is
    /// sent — destination URLs come from settings, so the fix is at
    /// configuration level.
    pub async fn request_json<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<DeliveryResponse, ActionError>
    where
        B: Serialize + ?Sized,
    {
        let parsed = Url::parse(url).map_err(|e| {
            ActionError::settings_validation(format!("Invalid destination URL `{url}`: {e}"))
        })?;

        let delivery_id = Uuid::new_v4();
        tracing::debug!(%delivery_id, %method, url = %parsed, "issuing destination request");

        let mut request = self.client.request(method.clone(), parsed);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                // 408 keeps "the destination did not answer in time" distinct
                // from "the destination answered 5xx" in pipeline logs.
                ActionError::retryable(
                    format!("request timed out: {e}"),
                    retryable_status(408),
                )
            } else {
                ActionError::retryable_default(format!("request failed: {e}"))
            };
            tracing::warn!(%delivery_id, %method, url, error = %err, "transport failure");
            err
        })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt = excerpt(&body);
            let err = classify_response_status(
                status,
                format!("Destination returned HTTP {status}: {excerpt}"),
            );
            tracing::warn!(
                %delivery_id,
                status,
                retryable = err.is_retryable(),
                "destination rejected request"
            );
            return Err(err);
        }

        let body = resp.text().await.unwrap_or_default();
        let body = serde_json::from_str(&body).ok();
        tracing::debug!(%delivery_id, status, "destination accepted request");
        Ok(DeliveryResponse { status, body })
    }
}

/// Allow-listed status lookup that cannot fail for the fixed codes used
/// inside this module.
fn retryable_status(status: u16) -> RetryableStatus {
    RetryableStatus::try_from(status).unwrap_or_default()
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
