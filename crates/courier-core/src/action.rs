//! # Destination Action Contract
//!
//! The shape every destination action satisfies: a static field schema
//! describing what it maps from the event, and a perform function that
//! either delivers one outbound request, skips explicitly, or fails with a
//! classified [`ActionError`].
//!
//! ## Failure contract
//!
//! `perform` is the classification boundary. Every failure it detects must
//! leave as one of the [`ActionError`] variants — no untyped error reaches
//! the pipeline. Before issuing any network call an implementation must:
//!
//! - check cross-field invariants the static schema cannot express (e.g.
//!   "at least one identity field present") and fail with a specific
//!   `FieldValidation` message, never a generic error;
//! - fail malformed destination-level settings with `SettingsValidation`,
//!   signaling a configuration-level fix;
//! - validate values governed by the third-party API's domain rules (e.g.
//!   currency codes) so nothing malformed reaches the transport.
//!
//! On success exactly one outbound request is issued. Actions never retry
//! internally; retry policy belongs to the pipeline once it sees a
//! retryable failure.

use std::collections::BTreeMap;

use crate::errors::ActionError;
use crate::features::FeatureFlags;
use crate::fields::InputField;
use crate::request::{DeliveryResponse, Transport};

/// Declarative description of one destination action.
#[derive(Debug, Clone)]
pub struct ActionSchema {
    /// Action title shown in the catalog (e.g. "View Item").
    pub title: &'static str,
    /// One-line description of what the action sends.
    pub description: &'static str,
    /// Default event subscription expression, if the action ships one
    /// (e.g. `type = "track" and event = "Product Viewed"`).
    pub default_subscription: Option<&'static str>,
    /// Field name → schema, ordered for stable catalog rendering.
    pub fields: BTreeMap<&'static str, InputField>,
}

/// Everything a perform invocation receives besides the transport handle.
///
/// Borrowed per invocation; invocations are independent and may run
/// concurrently without interference.
pub struct ActionContext<'a, S, P> {
    /// Destination-level settings, validated by their own schema upstream.
    pub settings: &'a S,
    /// The mapped, validated field values for one event.
    pub payload: &'a P,
    /// Optional per-invocation feature flags.
    pub features: Option<&'a FeatureFlags>,
}

// Manual impls: the derives would demand `S: Copy` / `P: Copy` even though
// only references are stored.
impl<S, P> Clone for ActionContext<'_, S, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, P> Copy for ActionContext<'_, S, P> {}

impl<S, P> ActionContext<'_, S, P> {
    /// Whether the named feature flag is enabled for this invocation.
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.is_some_and(|f| f.enabled(name))
    }
}

/// Result of a successful perform invocation.
#[derive(Debug, Clone)]
pub enum PerformOutcome {
    /// The outbound request was issued and accepted.
    Delivered(DeliveryResponse),
    /// The action decided there is nothing to send (explicit no-op).
    Skipped,
}

impl PerformOutcome {
    /// The delivered response, if the action sent anything.
    pub fn response(&self) -> Option<&DeliveryResponse> {
        match self {
            Self::Delivered(resp) => Some(resp),
            Self::Skipped => None,
        }
    }
}

/// One outbound destination action.
///
/// Implementations are stateless values; the pipeline may invoke them from
/// arbitrarily many tasks at once.
pub trait DestinationAction: Send + Sync {
    /// Destination-level settings type.
    type Settings;
    /// Mapped per-event payload type.
    type Payload;

    /// The static field schema for this action.
    fn schema() -> ActionSchema;

    /// Validate and deliver one event, or fail with a classified error.
    fn perform(
        &self,
        transport: &Transport,
        ctx: ActionContext<'_, Self::Settings, Self::Payload>,
    ) -> impl std::future::Future<Output = Result<PerformOutcome, ActionError>> + Send;
}
