//! # courier-core — shared contract layer for destination actions
//!
//! A destination action takes a normalized event, maps its fields per a
//! static schema, and issues one HTTP call to a third-party analytics or
//! marketing API. The catalog of actions lives in `courier-destinations`;
//! this crate owns everything the actions share:
//!
//! - **[`errors`]**: the closed, classified error taxonomy. Every failure
//!   leaving a perform function carries a human message, a stable machine
//!   code, and an HTTP-status-shaped retryability signal.
//! - **[`retry`]**: the single retryability predicate and the translation of
//!   third-party responses into the taxonomy.
//! - **[`action`]** / **[`fields`]**: the contract every action satisfies:
//!   declarative field schema plus a perform function.
//! - **[`request`]**: the one-shot transport primitive actions send through.
//! - **[`features`]**: read-only per-invocation feature flags.
//!
//! ## Architecture
//!
//! The taxonomy and classifier are pure and stateless; the pipeline may run
//! any number of invocations concurrently. This crate owns no retry
//! scheduling, no backoff timing, and no rate limiting; those belong to
//! the pipeline that consumes the classified errors.

pub mod action;
pub mod errors;
pub mod features;
pub mod fields;
pub mod request;
pub mod retry;

pub use action::{ActionContext, ActionSchema, DestinationAction, PerformOutcome};
pub use errors::{ActionError, ErrorCode, NotRetryable, RetryableStatus, RETRYABLE_STATUS_CODES};
pub use features::FeatureFlags;
pub use fields::{FieldDefault, FieldType, InputField};
pub use request::{DeliveryResponse, Transport};
pub use retry::{classify_response_status, is_retryable};
