//! HTTP client for the CV-Match auth API
//!
//! This module provides a type-safe client for the authentication
//! endpoints. The client is stateless with respect to credentials: calls
//! that need a bearer token take it as a parameter, so the
//! [`TokenStore`](crate::store::TokenStore) stays the single source of
//! truth for the persisted session.
//!
//! # Usage
//!
//! ```rust,no_run
//! use cvmatch_client::{AuthApiClient, ClientBuilder};
//!
//! # async fn example() -> cvmatch_client::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("https://api.cvmatch.io")
//!     .build()?;
//!
//! let tokens = client.login("a@b.com", "secret").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{ApiError, ErrorBody, Result, ROLE_SELECTION_SENTINEL};
use crate::types::{
    CompleteGoogleRegistrationRequest, ForgotPasswordRequest, GoogleAuthRequest, LoginRequest,
    MessageResponse, RefreshRequest, RegisterRequest, ResendOtpRequest, ResetPasswordRequest,
    TokenResponse, VerifyOtpRequest,
};
use cvmatch_common::{routes::DEFAULT_API_URL, UserProfile, UserRole};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the CV-Match authentication endpoints
#[derive(Debug)]
pub struct AuthApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AuthApiClient {
    /// Create a new client (private - use ClientBuilder instead)
    fn new(base_url: String, timeout: Duration, connect_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http_client = builder.build().map_err(|e| ApiError::Internal {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    // ===== Credentials =====

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &request).await
    }

    /// Create a new account; the user must verify their email via OTP
    /// before they can sign in
    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        self.post("/auth/register", request).await
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post("/auth/refresh", &request).await
    }

    /// Invalidate the session server-side
    pub async fn logout(&self, access_token: &str) -> Result<MessageResponse> {
        self.post_authed("/auth/logout", &serde_json::json!({}), access_token)
            .await
    }

    /// Fetch the profile of the authenticated user
    pub async fn get_current_user(&self, access_token: &str) -> Result<UserProfile> {
        self.get_authed("/auth/me", access_token).await
    }

    // ===== Google OAuth =====

    /// Exchange a Google credential for a token pair.
    ///
    /// For a Google account the backend has never seen, it answers HTTP 202
    /// with a sentinel payload instead of tokens; that surfaces here as
    /// [`ApiError::RoleSelectionRequired`] so the caller can route the user
    /// to the role-selection step rather than show a failure.
    pub async fn google_auth(&self, google_token: &str) -> Result<TokenResponse> {
        let request = GoogleAuthRequest {
            google_token: google_token.to_string(),
        };
        let url = format!("{}/auth/google-auth", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() == StatusCode::ACCEPTED {
            let body = response.text().await.map_err(ApiError::from)?;
            let detail = ErrorBody::parse(&body).and_then(|b| b.detail_str().map(str::to_string));
            return if detail.as_deref() == Some(ROLE_SELECTION_SENTINEL) {
                debug!("google auth requires role selection");
                Err(ApiError::RoleSelectionRequired)
            } else {
                Err(ApiError::Internal {
                    message: format!("unexpected 202 response: {body}"),
                })
            };
        }

        self.handle_response(response).await
    }

    /// Finalize a new-user Google signup with the chosen role
    pub async fn complete_google_registration(
        &self,
        google_token: &str,
        role: UserRole,
    ) -> Result<TokenResponse> {
        let request = CompleteGoogleRegistrationRequest {
            google_token: google_token.to_string(),
            role,
        };
        self.post("/auth/google-complete-registration", &request)
            .await
    }

    // ===== Email verification and password reset =====

    /// Confirm the OTP code emailed during registration
    pub async fn verify_otp(&self, email: &str, otp_code: &str) -> Result<MessageResponse> {
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp_code: otp_code.to_string(),
        };
        self.post("/auth/verify-otp", &request).await
    }

    /// Request a fresh OTP code
    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse> {
        let request = ResendOtpRequest {
            email: email.to_string(),
        };
        self.post("/auth/resend-otp", &request).await
    }

    /// Start the password-reset flow
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post("/auth/forgot-password", &request).await
    }

    /// Complete the password-reset flow with the emailed token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/auth/reset-password", &request).await
    }

    // ===== Private helper methods =====

    fn apply_auth(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {access_token}"))
    }

    /// Generic POST request without authentication
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        self.handle_response(response).await
    }

    /// Generic POST request with bearer authentication
    async fn post_authed<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        access_token: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http_client.post(&url).json(body);
        let request = self.apply_auth(request, access_token);
        let response = request.send().await.map_err(ApiError::from)?;
        self.handle_response(response).await
    }

    /// Generic GET request with bearer authentication
    async fn get_authed<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http_client.get(&url);
        let request = self.apply_auth(request, access_token);
        let response = request.send().await.map_err(ApiError::from)?;
        self.handle_response(response).await
    }

    /// Handle successful response
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(ApiError::from)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

/// Builder for constructing an [`AuthApiClient`] with custom configuration
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AuthApiClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Url::parse(&base_url).map_err(|e| ApiError::Internal {
            message: format!("invalid base URL {base_url}: {e}"),
        })?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        AuthApiClient::new(base_url, timeout, self.connect_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        json!({
            "id": "1",
            "email": "a@b.com",
            "full_name": "Ada Lovelace",
            "role": "candidate",
            "email_verified": true,
            "auth_provider": "email",
        })
    }

    async fn client_for(server: &MockServer) -> AuthApiClient {
        ClientBuilder::default()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "AT",
                "refresh_token": "RT",
                "expires_in": 3600,
                "user": user_json(),
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let tokens = client.login("a@b.com", "pw").await.unwrap();

        assert_eq!(tokens.access_token, "AT");
        assert_eq!(tokens.refresh_token, "RT");
        assert_eq!(tokens.expires_in, 3600);
        assert_eq!(tokens.user.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let err = client.login("a@b.com", "wrong").await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::Authentication { ref message } if message == "Invalid credentials"
        ));
    }

    #[tokio::test]
    async fn test_me_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("Authorization", "Bearer AT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let user = client.get_current_user("AT").await.unwrap();
        assert_eq!(user.id, "1");
    }

    #[tokio::test]
    async fn test_google_auth_role_selection_sentinel() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/google-auth"))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({"detail": "ROLE_SELECTION_REQUIRED"})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let err = client.google_auth("google-credential").await.unwrap_err();
        assert!(matches!(err, ApiError::RoleSelectionRequired));
    }

    #[tokio::test]
    async fn test_google_auth_unexpected_202_is_internal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/google-auth"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"detail": "pending"})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let err = client.google_auth("google-credential").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = client.login("a@b.com", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
    }

    #[tokio::test]
    async fn test_validation_error_carries_status_and_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"detail": "passwords mismatch"})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let request = RegisterRequest {
            email: "a@b.com".to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw2".to_string(),
            full_name: "Ada".to_string(),
            role: UserRole::Candidate,
        };
        let err = client.register(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation { status: 422, ref message } if message == "passwords mismatch"
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = ClientBuilder::default().base_url("not a url").build();
        assert!(matches!(result.unwrap_err(), ApiError::Internal { .. }));
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let client = ClientBuilder::default()
            .base_url("https://api.cvmatch.io/")
            .build()
            .unwrap();
        assert_eq!(client.base_url, "https://api.cvmatch.io");
    }
}
