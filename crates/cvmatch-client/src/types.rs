//! Request and response types for the CV-Match auth API

use cvmatch_common::{UserProfile, UserRole};
use serde::{Deserialize, Serialize};

/// `POST /auth/login` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/register` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: UserRole,
}

/// Token payload returned by login, refresh, and the OAuth endpoints
///
/// `expires_in` is the access-token lifetime in seconds. `user` is present
/// on login and OAuth responses and may be included on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Generic `{message}` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /auth/refresh` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `POST /auth/google-auth` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAuthRequest {
    pub google_token: String,
}

/// `POST /auth/google-complete-registration` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteGoogleRegistrationRequest {
    pub google_token: String,
    pub role: UserRole,
}

/// `POST /auth/verify-otp` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp_code: String,
}

/// `POST /auth/resend-otp` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// `POST /auth/forgot-password` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// `POST /auth/reset-password` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}
