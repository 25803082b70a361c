//! Runtime auth state and its transition function
//!
//! The state machine is a tagged union of actions folded over an immutable
//! state record: `reduce(state, action) -> state`. It is independent of any
//! UI framework; the [`SessionManager`](super::manager::SessionManager)
//! publishes the folded state through a watch channel.

use cvmatch_common::{UserProfile, UserProfileUpdate};
use serde::{Deserialize, Serialize};

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Boot-time restoration has not settled yet
    Initializing,
    /// A valid (or refreshable) session exists and `user` is populated
    Authenticated,
    /// No session; durable storage has been cleared
    Unauthenticated,
}

/// In-memory auth state, rebuilt from durable storage on every boot.
///
/// Invariants: `status == Authenticated` implies `user` is `Some`;
/// `status == Unauthenticated` implies the token store has been cleared by
/// whichever operation drove the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<UserProfile>,
    /// Normalized message of the last failed operation, if any
    pub error: Option<String>,
    /// Informational prompt after a successful registration that still
    /// needs email verification. Deliberately not the error channel: the
    /// user is unauthenticated but nothing went wrong.
    pub pending_verification: Option<String>,
    /// True while an auth operation is in flight
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            status: AuthStatus::Initializing,
            user: None,
            error: None,
            pending_verification: None,
            is_loading: false,
        }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

/// State-machine actions
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// An auth operation started; sets `is_loading` and clears `error`
    Start,
    /// Operation produced a valid session for `user`
    Success { user: UserProfile },
    /// Operation failed. `message` is `None` for outcomes that must not
    /// surface an error banner (e.g. the OAuth role-selection detour).
    Failure { message: Option<String> },
    /// Registration succeeded but the account awaits OTP verification
    RegistrationPending { message: String },
    /// Session ended locally
    Logout,
    /// Shallow profile patch after an edit
    UpdateUser { patch: UserProfileUpdate },
    /// Dismiss the current error without other changes
    ClearError,
}

/// Pure state-transition function.
pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Start => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Success { user } => AuthState {
            status: AuthStatus::Authenticated,
            user: Some(user),
            error: None,
            pending_verification: None,
            is_loading: false,
        },
        AuthAction::Failure { message } => AuthState {
            status: AuthStatus::Unauthenticated,
            user: None,
            error: message,
            pending_verification: None,
            is_loading: false,
        },
        AuthAction::RegistrationPending { message } => AuthState {
            status: AuthStatus::Unauthenticated,
            user: None,
            error: None,
            pending_verification: Some(message),
            is_loading: false,
        },
        AuthAction::Logout => AuthState {
            status: AuthStatus::Unauthenticated,
            user: None,
            error: None,
            pending_verification: None,
            is_loading: false,
        },
        AuthAction::UpdateUser { patch } => {
            let mut next = state.clone();
            if let Some(user) = &mut next.user {
                patch.apply_to(user);
            }
            next
        }
        AuthAction::ClearError => AuthState {
            error: None,
            ..state.clone()
        },
    }
}
