//! Retryability classification for HTTP-status-shaped failure signals.
//!
//! This module is the single source of truth for "should the pipeline retry
//! automatically". Both the delivery pipeline (after receiving a classified
//! error) and the transport wrapper (when translating a third-party response)
//! route through [`is_retryable`]; the logic is never duplicated elsewhere.

use crate::errors::{ActionError, ErrorCode, RetryableStatus};

/// Whether a status code signals a transient condition worth retrying.
///
/// Retry-eligible iff the status is 408, 423, or 429, or is a 5xx other than
/// 501. 501 means "not implemented" — a permanent condition, deliberately
/// excluded despite being a 5xx. Total over all integers; anything outside
/// the recognized sets classifies `false` (fail-safe: unknown statuses are
/// never retried).
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 408 | 423 | 429) || ((500..=599).contains(&status) && status != 501)
}

/// Translate a non-2xx third-party response status into the taxonomy.
///
/// - 401 → [`ActionError::InvalidAuthentication`]
/// - allow-listed retryable status → [`ActionError::Retryable`]
/// - retry-eligible but non-allow-listed (non-standard 5xx such as 550) →
///   generic error carrying the `RETRYABLE_ERROR` code and the raw status,
///   so the pipeline's own [`is_retryable`] check still applies
/// - anything else → generic error with the raw status, not retried
pub fn classify_response_status(status: u16, message: impl Into<String>) -> ActionError {
    if status == 401 {
        return ActionError::invalid_authentication(message);
    }
    match RetryableStatus::try_from(status) {
        Ok(retryable) => ActionError::retryable(message, retryable),
        Err(_) if is_retryable(status) => {
            ActionError::new(message, Some(ErrorCode::RetryableError), Some(status))
        }
        Err(_) => ActionError::new(message, None, Some(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_4xx_exceptions_are_retryable() {
        assert!(is_retryable(408));
        assert!(is_retryable(423));
        assert!(is_retryable(429));
    }

    #[test]
    fn other_4xx_are_not_retryable() {
        for status in [400, 401, 403, 404, 409, 410, 422, 428, 430, 499] {
            assert!(!is_retryable(status), "{status} must not be retryable");
        }
    }

    #[test]
    fn five_hundreds_are_retryable_except_501() {
        for status in 500..=599 {
            if status == 501 {
                assert!(!is_retryable(status), "501 is permanent, never retried");
            } else {
                assert!(is_retryable(status), "{status} must be retryable");
            }
        }
    }

    #[test]
    fn statuses_outside_any_recognized_range_are_not_retryable() {
        for status in [0, 100, 200, 201, 204, 301, 304, 600, 999, u16::MAX] {
            assert!(!is_retryable(status), "{status} must not be retryable");
        }
    }

    #[test]
    fn classification_is_pure() {
        for status in [408, 429, 500, 501, 404] {
            assert_eq!(is_retryable(status), is_retryable(status));
        }
    }

    #[test]
    fn classify_401_as_invalid_authentication() {
        let err = classify_response_status(401, "key revoked");
        assert_eq!(err.code(), Some(ErrorCode::InvalidAuthentication));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn classify_429_as_retryable() {
        let err = classify_response_status(429, "rate limited");
        assert!(matches!(err, ActionError::Retryable { .. }));
        assert_eq!(err.status(), Some(429));
        assert!(err.is_retryable());
    }

    #[test]
    fn classify_501_as_fatal() {
        let err = classify_response_status(501, "not implemented");
        assert!(matches!(err, ActionError::Integration { .. }));
        assert_eq!(err.code(), None);
        assert_eq!(err.status(), Some(501));
        assert!(!err.is_retryable());
    }

    #[test]
    fn classify_non_standard_5xx_keeps_retryable_code_and_raw_status() {
        let err = classify_response_status(550, "proxy hiccup");
        assert!(matches!(err, ActionError::Integration { .. }));
        assert_eq!(err.code(), Some(ErrorCode::RetryableError));
        assert_eq!(err.status(), Some(550));
        assert!(err.is_retryable());
    }

    #[test]
    fn classify_404_as_plain_integration_error() {
        let err = classify_response_status(404, "no such stream");
        assert_eq!(err.code(), None);
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_retryable());
    }
}
