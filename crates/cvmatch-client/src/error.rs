//! Error types for the CV-Match client
//!
//! Every transport failure and non-2xx response is normalized into
//! [`ApiError`] so upstream code can branch on kind (especially 401)
//! without re-parsing raw responses.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Sentinel payload the backend returns with HTTP 202 when a new Google
/// account must pick a role before registration completes.
pub const ROLE_SELECTION_SENTINEL: &str = "ROLE_SELECTION_REQUIRED";

/// Normalized client error.
///
/// Variants carry owned strings rather than the underlying `reqwest::Error`
/// so the enum is `Clone`: the refresh coordinator fans a single failure out
/// to every caller waiting on the same in-flight request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Network unreachable, DNS failure, connection reset
    #[error("network error: {message}")]
    Transport { message: String },

    /// Request exceeded its bounded timeout
    #[error("request timed out")]
    Timeout,

    /// Credential invalid or expired (HTTP 401)
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Valid session, insufficient privilege (HTTP 403)
    #[error("access denied: {message}")]
    Authorization { message: String },

    /// Request rejected with field-level errors (other 4xx)
    #[error("validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Not a true error: the OAuth flow needs a role-selection step
    /// (HTTP 202 sentinel) before it can complete
    #[error("role selection required to complete registration")]
    RoleSelectionRequired,

    /// Resource not found (HTTP 404)
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Stored session could not be restored or refreshed
    #[error("session expired")]
    SessionExpired,

    /// Durable storage failure (quota, permissions)
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Everything else (5xx, unexpected payloads, setup errors)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// True for errors that mean the bearer credential was rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Authentication { .. } | ApiError::SessionExpired
        )
    }

    /// True for connectivity-shaped failures (transport or timeout)
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Timeout)
    }

    /// Message suitable for inline display to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { .. } | ApiError::Timeout => {
                "Unable to reach the server. Please check your connection and try again."
                    .to_string()
            }
            ApiError::Authentication { message } => message.clone(),
            ApiError::Authorization { .. } => {
                "You do not have permission to perform this action.".to_string()
            }
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::RoleSelectionRequired => {
                "Please choose an account type to finish signing up.".to_string()
            }
            ApiError::NotFound { message } => message.clone(),
            ApiError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::Storage { .. } | ApiError::Internal { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Map a non-2xx response to an error variant.
    ///
    /// `body` is the raw response text; both `{"detail": ...}` and
    /// `{"message": ...}` shapes are recognized.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> ApiError {
        let message = ErrorBody::parse(body)
            .and_then(|b| b.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Authentication { message },
            StatusCode::FORBIDDEN => ApiError::Authorization { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            s if s.is_client_error() => ApiError::Validation {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Internal {
                message: format!("request failed with status {s}: {message}"),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Internal {
                message: format!("failed to decode response: {err}"),
            }
        } else {
            ApiError::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Tolerant wire error body.
///
/// The backend mostly answers `{"detail": "..."}`, but `detail` may also be
/// a structured validation payload, and some endpoints answer
/// `{"message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// The `detail` field when it is a plain string
    pub(crate) fn detail_str(&self) -> Option<&str> {
        self.detail.as_ref().and_then(|v| v.as_str())
    }

    /// Best human-readable message the body offers
    pub(crate) fn message(&self) -> Option<String> {
        if let Some(detail) = self.detail_str() {
            return Some(detail.to_string());
        }
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        // Structured validation details are surfaced verbatim; the
        // presentation layer maps them to localized copy.
        self.detail
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":"bad token"}"#);
        assert!(matches!(err, ApiError::Authentication { ref message } if message == "bad token"));
        assert!(err.is_unauthorized());

        let err = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"message":"nope"}"#);
        assert!(matches!(err, ApiError::Authorization { ref message } if message == "nope"));

        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "{}");
        assert!(matches!(err, ApiError::Validation { status: 422, .. }));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::Internal { .. }));
    }

    #[test]
    fn test_error_body_shapes() {
        let body = ErrorBody::parse(r#"{"detail":"ROLE_SELECTION_REQUIRED"}"#).unwrap();
        assert_eq!(body.detail_str(), Some(ROLE_SELECTION_SENTINEL));

        let body = ErrorBody::parse(r#"{"detail":[{"loc":["email"],"msg":"invalid"}]}"#).unwrap();
        assert!(body.detail_str().is_none());
        assert!(body.message().unwrap().contains("invalid"));

        assert!(ErrorBody::parse("not json").is_none());
    }

    #[test]
    fn test_network_errors_share_user_message() {
        let transport = ApiError::Transport {
            message: "connection refused".into(),
        };
        assert!(transport.is_network());
        assert_eq!(transport.user_message(), ApiError::Timeout.user_message());
    }
}
