//! Canonical runtime auth state and its mutating operations
//!
//! The [`SessionManager`] owns the folded [`AuthState`] behind a
//! `tokio::sync::watch` channel: any number of observers subscribe for
//! change notifications while operations fold actions through the reducer.
//! Only the manager's operations (and the refresh coordinator it delegates
//! to) write to the token store; UI code reads state through the channel
//! and never touches storage directly.

use crate::client::AuthApiClient;
use crate::error::{ApiError, Result};
use crate::session::interceptor::UnauthorizedInterceptor;
use crate::session::refresh::RefreshCoordinator;
use crate::session::state::{reduce, AuthAction, AuthState};
use crate::store::TokenStore;
use crate::types::{RegisterRequest, TokenResponse};
use cvmatch_common::{UserProfile, UserProfileUpdate, UserRole};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Holds runtime auth state and exposes the state-mutating auth operations
pub struct SessionManager {
    store: Arc<TokenStore>,
    api: Arc<AuthApiClient>,
    refresher: Arc<RefreshCoordinator>,
    interceptor: Arc<UnauthorizedInterceptor>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionManager {
    pub fn new(
        store: Arc<TokenStore>,
        api: Arc<AuthApiClient>,
        refresher: Arc<RefreshCoordinator>,
        interceptor: Arc<UnauthorizedInterceptor>,
    ) -> Self {
        let (state_tx, _) = watch::channel(AuthState::default());
        Self {
            store,
            api,
            refresher,
            interceptor,
            state_tx,
        }
    }

    // ===== State observation =====

    /// Snapshot of the current auth state
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Fold an action through the reducer and publish the new state
    pub(crate) fn dispatch(&self, action: AuthAction) {
        self.state_tx.send_modify(|state| *state = reduce(state, action));
    }

    // ===== Operations =====

    /// Sign in with email and password.
    ///
    /// On success stores the token pair and user snapshot and transitions
    /// to authenticated. On failure stores a normalized message in state
    /// and rethrows; a pre-existing signed-out state is otherwise untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        self.dispatch(AuthAction::Start);
        match self.api.login(email, password).await {
            Ok(tokens) => {
                let user = self.persist_session(tokens).await?;
                info!("login succeeded for {}", user.email);
                self.dispatch(AuthAction::Success { user: user.clone() });
                Ok(user)
            }
            Err(e) => {
                debug!("login failed: {e}");
                self.dispatch(AuthAction::Failure {
                    message: Some(e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// Create a new account.
    ///
    /// The product requires email verification, so success does not sign
    /// the user in: it transitions to unauthenticated with an informational
    /// `pending_verification` prompt, distinguishable from a real error.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String> {
        self.dispatch(AuthAction::Start);
        match self.api.register(request).await {
            Ok(response) => {
                info!("registration accepted; awaiting OTP verification");
                self.dispatch(AuthAction::RegistrationPending {
                    message: response.message.clone(),
                });
                Ok(response.message)
            }
            Err(e) => {
                debug!("registration failed: {e}");
                self.dispatch(AuthAction::Failure {
                    message: Some(e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// Sign in with a Google credential.
    ///
    /// When the backend signals that a new account must pick a role first,
    /// the distinguishable [`ApiError::RoleSelectionRequired`] is rethrown
    /// without recording an error banner, so the caller can navigate to the
    /// role-selection step instead of showing a failure.
    pub async fn google_sign_in(&self, google_token: &str) -> Result<UserProfile> {
        self.dispatch(AuthAction::Start);
        match self.api.google_auth(google_token).await {
            Ok(tokens) => {
                let user = self.persist_session(tokens).await?;
                info!("google sign-in succeeded for {}", user.email);
                self.dispatch(AuthAction::Success { user: user.clone() });
                Ok(user)
            }
            Err(ApiError::RoleSelectionRequired) => {
                debug!("google sign-in needs role selection");
                self.dispatch(AuthAction::Failure { message: None });
                Err(ApiError::RoleSelectionRequired)
            }
            Err(e) => {
                debug!("google sign-in failed: {e}");
                self.dispatch(AuthAction::Failure {
                    message: Some(e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// Finalize a new-user Google signup with the chosen role
    pub async fn complete_google_registration(
        &self,
        google_token: &str,
        role: UserRole,
    ) -> Result<UserProfile> {
        self.dispatch(AuthAction::Start);
        match self
            .api
            .complete_google_registration(google_token, role)
            .await
        {
            Ok(tokens) => {
                let user = self.persist_session(tokens).await?;
                info!("google registration completed for {}", user.email);
                self.dispatch(AuthAction::Success { user: user.clone() });
                Ok(user)
            }
            Err(e) => {
                self.dispatch(AuthAction::Failure {
                    message: Some(e.user_message()),
                });
                Err(e)
            }
        }
    }

    /// End the session.
    ///
    /// Local logout is authoritative and instantaneous: tokens are cleared
    /// and state transitions before this method returns. The server-side
    /// logout call runs in the background and its failure is swallowed.
    pub fn logout(&self) {
        let access_token = self.store.access_token();
        self.store.clear();
        self.dispatch(AuthAction::Logout);
        info!("logged out locally");

        if let Some(token) = access_token {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                if let Err(e) = api.logout(&token).await {
                    debug!("background logout call failed: {e}");
                }
            });
        }
    }

    /// Refresh the token pair via the coordinator.
    ///
    /// On failure the coordinator has already cleared the stored session;
    /// state transitions to unauthenticated and the failure propagates.
    /// A 401 here means the refresh token itself was rejected, so it is
    /// also forwarded to the interceptor.
    pub async fn refresh_token(&self) -> Result<TokenResponse> {
        match self.refresher.refresh().await {
            Ok(tokens) => {
                if let Some(user) = tokens.user.clone() {
                    self.dispatch(AuthAction::Success { user });
                }
                Ok(tokens)
            }
            Err(e) => {
                warn!("refresh failed: {e}");
                self.dispatch(AuthAction::Failure {
                    message: Some(ApiError::SessionExpired.user_message()),
                });
                if e.is_unauthorized() {
                    self.interceptor.on_unauthorized().await;
                }
                Err(e)
            }
        }
    }

    /// Shallow-merge a profile patch into runtime state and the cached
    /// snapshot. Tokens are untouched.
    pub fn update_user(&self, patch: UserProfileUpdate) {
        if let Some(mut user) = self.store.user_snapshot() {
            patch.apply_to(&mut user);
            self.store.store_user_snapshot(&user);
        }
        self.dispatch(AuthAction::UpdateUser { patch });
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        self.dispatch(AuthAction::ClearError);
    }

    // ===== Derived queries =====

    /// True iff a user is present and holds the given role
    pub fn has_role(&self, role: UserRole) -> bool {
        self.has_any_role(&[role])
    }

    /// True iff a user is present and its role is in the given set
    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.state_tx
            .borrow()
            .user
            .as_ref()
            .map(|user| roles.contains(&user.role))
            .unwrap_or(false)
    }

    /// Whether the stored access token has passed its expiry
    pub fn is_token_expired(&self) -> bool {
        self.store.is_expired()
    }

    // ===== Background work =====

    /// Re-fetch the current user and patch state when it returns.
    ///
    /// Used after the cached-snapshot fast path at startup. Single attempt:
    /// a 401 is forwarded to the interceptor, anything else is logged and
    /// swallowed so a flaky network cannot disturb the optimistic UI.
    pub async fn revalidate(&self) {
        let Some(token) = self.store.access_token() else {
            return;
        };
        match self.api.get_current_user(&token).await {
            Ok(user) => {
                debug!("background revalidation refreshed the user snapshot");
                self.store.store_user_snapshot(&user);
                self.dispatch(AuthAction::Success { user });
            }
            Err(e) if e.is_unauthorized() => {
                warn!("background revalidation got 401");
                self.interceptor.on_unauthorized().await;
            }
            Err(e) => {
                debug!("background revalidation failed: {e}");
            }
        }
    }

    /// Fire-and-forget [`revalidate`](Self::revalidate)
    pub fn spawn_revalidation(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.revalidate().await;
        });
    }

    /// Forward a 401 observed by application code (data fetches outside
    /// the auth flows) to the interceptor.
    pub async fn report_unauthorized(&self) {
        self.interceptor.on_unauthorized().await;
    }

    // ===== Collaborator access (session-layer internal) =====

    pub(crate) fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub(crate) fn api(&self) -> &Arc<AuthApiClient> {
        &self.api
    }

    pub(crate) fn refresher(&self) -> &Arc<RefreshCoordinator> {
        &self.refresher
    }

    /// Persist tokens and resolve the session user.
    ///
    /// Login and OAuth responses normally embed the user; when they do not,
    /// the profile is fetched with the new access token. If that fetch
    /// fails, the just-stored tokens are cleared and the operation settles
    /// as a failure before the error propagates: tokens never outlive a
    /// session that cannot enter authenticated.
    async fn persist_session(&self, tokens: TokenResponse) -> Result<UserProfile> {
        self.store
            .store_tokens(&tokens.access_token, &tokens.refresh_token, tokens.expires_in);

        let user = match tokens.user {
            Some(user) => user,
            None => match self.api.get_current_user(&tokens.access_token).await {
                Ok(user) => user,
                Err(e) => {
                    warn!("profile fetch after token grant failed: {e}");
                    self.store.clear();
                    self.dispatch(AuthAction::Failure {
                        message: Some(e.user_message()),
                    });
                    return Err(e);
                }
            },
        };
        self.store.store_user_snapshot(&user);
        Ok(user)
    }
}
