//! Shared error factories for the Segment destination.
//!
//! Every action in this destination reports identical failure conditions
//! through these factories rather than constructing errors inline, so the
//! machine codes stay consistent across the catalog. The values are
//! stateless and safe to hand out from any number of concurrent
//! invocations.

use courier_core::ActionError;

/// The event carries neither of the identity fields Segment requires.
pub fn missing_user_or_anonymous_id() -> ActionError {
    ActionError::field_validation("Either `Anonymous ID` or `User ID` must be defined.")
}

/// The settings select an endpoint outside the closed regional map.
pub fn invalid_endpoint_selected() -> ActionError {
    ActionError::settings_validation(
        "A valid endpoint must be selected. Please check your destination settings.",
    )
}
