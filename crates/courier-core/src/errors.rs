//! Classified error taxonomy for destination actions.
//!
//! Every failure leaving a perform function is an [`ActionError`]. The
//! delivery pipeline branches on [`ActionError::code`] and
//! [`ActionError::status`] to decide between automatic retry, surfacing the
//! message to the integration owner, and pausing for credential refresh.
//!
//! Retry policy, as consumed by the pipeline:
//! - 4xx failures are not retried, except 408, 423, 429
//! - 5xx failures are retried, except 501

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::retry::is_retryable;

/// Stable machine-readable error codes.
///
/// The string forms are persisted and matched on by pipeline consumers:
/// once shipped, an identifier never changes. New codes may be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAuthentication,
    ValidationError,
    SettingsValidationError,
    RetryableError,
    RefreshTokenExpired,
    OauthRefreshFailed,
}

impl ErrorCode {
    /// The stable string identifier for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAuthentication => "INVALID_AUTHENTICATION",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::SettingsValidationError => "SETTINGS_VALIDATION_ERROR",
            Self::RetryableError => "RETRYABLE_ERROR",
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            Self::OauthRefreshFailed => "OAUTH_REFRESH_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status codes eligible for [`ActionError::retryable`].
///
/// The set is closed and deliberate: 501 is excluded even though it is a 5xx
/// (it means "not implemented", a permanent condition), and 598/599 are
/// included for reverse proxies that use them for upstream timeouts. Do not
/// rewrite this as a range check.
pub const RETRYABLE_STATUS_CODES: [u16; 16] = [
    408, 423, 429, 500, 502, 503, 504, 505, 506, 507, 508, 509, 510, 511, 598, 599,
];

/// A status code accepted by the [`ActionError::retryable`] constructor.
///
/// Validated at construction against [`RETRYABLE_STATUS_CODES`]; a value of
/// this type always classifies retryable under [`is_retryable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RetryableStatus(u16);

impl RetryableStatus {
    /// The underlying status code.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Default for RetryableStatus {
    fn default() -> Self {
        Self(500)
    }
}

impl TryFrom<u16> for RetryableStatus {
    type Error = NotRetryable;

    fn try_from(status: u16) -> Result<Self, NotRetryable> {
        if RETRYABLE_STATUS_CODES.contains(&status) {
            Ok(Self(status))
        } else {
            Err(NotRetryable(status))
        }
    }
}

impl fmt::Display for RetryableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejection from [`RetryableStatus::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status {0} is not in the retryable status set")]
pub struct NotRetryable(pub u16);

/// A classified failure raised by a destination action.
///
/// One tagged shape instead of an error-class hierarchy: each variant fixes
/// the machine [`code`](Self::code) and [`status`](Self::status) it reports,
/// and is built through a smart constructor. Construction is pure and never
/// fails. The `Display` form is exactly the human message shown verbatim to
/// the destination's configuring user.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActionError {
    /// Generic misconfiguration with caller-supplied code and status.
    #[error("{message}")]
    Integration {
        message: String,
        code: Option<ErrorCode>,
        status: Option<u16>,
    },
    /// Transient upstream failure; the pipeline may retry the identical
    /// request without user intervention.
    #[error("{message}")]
    Retryable {
        message: String,
        status: RetryableStatus,
    },
    /// Credentials expired or revoked; the user must fix them manually.
    #[error("{message}")]
    InvalidAuthentication { message: String },
    /// A mapped field value is malformed or missing. Never retried; the user
    /// has to fix the field mapping.
    #[error("{message}")]
    FieldValidation { message: String },
    /// Destination-level settings are invalid. Never retried; the fix is at
    /// configuration level, not per event.
    #[error("{message}")]
    SettingsValidation { message: String },
    /// The stored refresh token has expired; the credential-refresh
    /// subsystem must obtain a new grant before delivery can resume.
    #[error("{message}")]
    RefreshTokenExpired { message: String },
    /// A credential refresh was attempted and failed.
    #[error("{message}")]
    OauthRefreshFailed { message: String },
}

impl ActionError {
    /// Generic integration error with an optional code and status.
    pub fn new(
        message: impl Into<String>,
        code: Option<ErrorCode>,
        status: Option<u16>,
    ) -> Self {
        Self::Integration {
            message: message.into(),
            code,
            status,
        }
    }

    /// Transient failure, retryable at the supplied status.
    pub fn retryable(message: impl Into<String>, status: RetryableStatus) -> Self {
        Self::Retryable {
            message: message.into(),
            status,
        }
    }

    /// Transient failure with the default retryable status (500).
    pub fn retryable_default(message: impl Into<String>) -> Self {
        Self::retryable(message, RetryableStatus::default())
    }

    /// Authentication no longer valid (status 401).
    pub fn invalid_authentication(message: impl Into<String>) -> Self {
        Self::InvalidAuthentication {
            message: message.into(),
        }
    }

    /// Malformed or missing field value (status 400).
    pub fn field_validation(message: impl Into<String>) -> Self {
        Self::FieldValidation {
            message: message.into(),
        }
    }

    /// Invalid destination-level settings (status 400).
    pub fn settings_validation(message: impl Into<String>) -> Self {
        Self::SettingsValidation {
            message: message.into(),
        }
    }

    /// Refresh token expired; signals the refresh subsystem (status 401).
    pub fn refresh_token_expired(message: impl Into<String>) -> Self {
        Self::RefreshTokenExpired {
            message: message.into(),
        }
    }

    /// Credential refresh attempted and failed (status 401).
    pub fn oauth_refresh_failed(message: impl Into<String>) -> Self {
        Self::OauthRefreshFailed {
            message: message.into(),
        }
    }

    /// The human-readable message. Always present, possibly empty.
    pub fn message(&self) -> &str {
        match self {
            Self::Integration { message, .. }
            | Self::Retryable { message, .. }
            | Self::InvalidAuthentication { message }
            | Self::FieldValidation { message }
            | Self::SettingsValidation { message }
            | Self::RefreshTokenExpired { message }
            | Self::OauthRefreshFailed { message } => message,
        }
    }

    /// The machine-readable code this variant reports, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Integration { code, .. } => *code,
            Self::Retryable { .. } => Some(ErrorCode::RetryableError),
            Self::InvalidAuthentication { .. } => Some(ErrorCode::InvalidAuthentication),
            Self::FieldValidation { .. } => Some(ErrorCode::ValidationError),
            Self::SettingsValidation { .. } => Some(ErrorCode::SettingsValidationError),
            Self::RefreshTokenExpired { .. } => Some(ErrorCode::RefreshTokenExpired),
            Self::OauthRefreshFailed { .. } => Some(ErrorCode::OauthRefreshFailed),
        }
    }

    /// The HTTP-status-shaped signal this variant reports, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Integration { status, .. } => *status,
            Self::Retryable { status, .. } => Some(status.get()),
            Self::InvalidAuthentication { .. }
            | Self::RefreshTokenExpired { .. }
            | Self::OauthRefreshFailed { .. } => Some(401),
            Self::FieldValidation { .. } | Self::SettingsValidation { .. } => Some(400),
        }
    }

    /// Whether the pipeline should automatically retry this failure.
    pub fn is_retryable(&self) -> bool {
        self.status().is_some_and(is_retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_have_stable_identifiers() {
        assert_eq!(ErrorCode::InvalidAuthentication.as_str(), "INVALID_AUTHENTICATION");
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(
            ErrorCode::SettingsValidationError.as_str(),
            "SETTINGS_VALIDATION_ERROR"
        );
        assert_eq!(ErrorCode::RetryableError.as_str(), "RETRYABLE_ERROR");
        assert_eq!(ErrorCode::RefreshTokenExpired.as_str(), "REFRESH_TOKEN_EXPIRED");
        assert_eq!(ErrorCode::OauthRefreshFailed.as_str(), "OAUTH_REFRESH_FAILED");
    }

    #[test]
    fn error_code_serde_matches_as_str() {
        for code in [
            ErrorCode::InvalidAuthentication,
            ErrorCode::ValidationError,
            ErrorCode::SettingsValidationError,
            ErrorCode::RetryableError,
            ErrorCode::RefreshTokenExpired,
            ErrorCode::OauthRefreshFailed,
        ] {
            let json = serde_json::to_string(&code).expect("serialize");
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn retryable_status_accepts_allow_listed_codes() {
        for status in RETRYABLE_STATUS_CODES {
            let s = RetryableStatus::try_from(status).expect("allow-listed");
            assert_eq!(s.get(), status);
        }
    }

    #[test]
    fn retryable_status_rejects_non_members() {
        for status in [200, 400, 401, 404, 501, 512, 550, 597, 600] {
            assert_eq!(RetryableStatus::try_from(status), Err(NotRetryable(status)));
        }
    }

    #[test]
    fn retryable_status_defaults_to_500() {
        let status = RetryableStatus::default();
        assert_eq!(status.get(), 500);
        assert!(is_retryable(status.get()));
    }

    #[test]
    fn allow_list_members_all_classify_retryable() {
        // The constructor's allow-list must never drift from the classifier.
        for status in RETRYABLE_STATUS_CODES {
            assert!(is_retryable(status), "allow-listed {status} must classify retryable");
        }
    }

    #[test]
    fn retryable_error_carries_code_and_status() {
        let status = RetryableStatus::try_from(429).expect("429 is allow-listed");
        let err = ActionError::retryable("rate limited", status);
        assert_eq!(err.code(), Some(ErrorCode::RetryableError));
        assert_eq!(err.status(), Some(429));
        assert!(err.is_retryable());
    }

    #[test]
    fn retryable_default_yields_500() {
        let err = ActionError::retryable_default("upstream down");
        assert_eq!(err.status(), Some(500));
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_authentication_is_fixed_401() {
        let err = ActionError::invalid_authentication("token revoked");
        assert_eq!(err.code(), Some(ErrorCode::InvalidAuthentication));
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());
    }

    #[test]
    fn field_validation_is_fixed_400() {
        let err = ActionError::field_validation("currency is malformed");
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_retryable());
    }

    #[test]
    fn settings_validation_is_fixed_400() {
        let err = ActionError::settings_validation("no endpoint selected");
        assert_eq!(err.code(), Some(ErrorCode::SettingsValidationError));
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_retryable());
    }

    #[test]
    fn oauth_variants_are_distinct_from_generic_authentication() {
        let expired = ActionError::refresh_token_expired("grant expired");
        let failed = ActionError::oauth_refresh_failed("refresh rejected");
        assert_eq!(expired.code(), Some(ErrorCode::RefreshTokenExpired));
        assert_eq!(failed.code(), Some(ErrorCode::OauthRefreshFailed));
        assert_eq!(expired.status(), Some(401));
        assert_eq!(failed.status(), Some(401));
    }

    #[test]
    fn display_is_the_verbatim_user_message() {
        let err = ActionError::field_validation("Either `Anonymous ID` or `User ID` must be defined.");
        assert_eq!(
            format!("{err}"),
            "Either `Anonymous ID` or `User ID` must be defined."
        );
    }

    #[test]
    fn message_may_be_empty_but_is_always_present() {
        let err = ActionError::retryable_default("");
        assert_eq!(err.message(), "");
    }

    #[test]
    fn generic_error_preserves_caller_fields() {
        let err = ActionError::new("bad item", Some(ErrorCode::ValidationError), Some(400));
        assert_eq!(err.message(), "bad item");
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));
        assert_eq!(err.status(), Some(400));

        let bare = ActionError::new("unclassified", None, None);
        assert_eq!(bare.code(), None);
        assert_eq!(bare.status(), None);
        assert!(!bare.is_retryable());
    }
}
