//! Declarative route guards
//!
//! Guards read a snapshot of the runtime auth state and answer what the
//! host should do with a route: show the loading placeholder, render the
//! content, or redirect. They hold no state of their own beyond their
//! configuration, so one instance per route definition is fine.

use crate::error::{ApiError, Result};
use crate::session::navigation::NavigationTarget;
use crate::session::state::{AuthState, AuthStatus};
use crate::store::{SessionNotice, TokenStore};
use cvmatch_common::UserRole;
use std::sync::Arc;
use tracing::debug;

const LOGIN_PROMPT_MESSAGE: &str = "Please sign in to continue";
const LOGIN_PROMPT_SUBTITLE: &str = "You need an account to view that page.";

/// What the host should do with the guarded route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state has not settled; render the loading placeholder
    Loading,
    /// Render the guarded content
    Render,
    /// Navigate away instead of rendering
    Redirect(NavigationTarget),
}

/// Guard for routes that require a session, with an optional role
/// restriction.
pub struct ProtectedRoute {
    store: Arc<TokenStore>,
    allowed_roles: Option<Vec<UserRole>>,
}

impl ProtectedRoute {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self {
            store,
            allowed_roles: None,
        }
    }

    /// Additionally require one of the given roles
    pub fn with_roles(store: Arc<TokenStore>, roles: Vec<UserRole>) -> Self {
        Self {
            store,
            allowed_roles: Some(roles),
        }
    }

    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        match state.status {
            AuthStatus::Initializing => GuardDecision::Loading,
            AuthStatus::Unauthenticated => {
                debug!("unauthenticated access to protected route");
                // One-shot prompt shown by the login page after redirect
                self.store.put_notice(SessionNotice::info(
                    LOGIN_PROMPT_MESSAGE,
                    LOGIN_PROMPT_SUBTITLE,
                ));
                GuardDecision::Redirect(NavigationTarget::Login)
            }
            AuthStatus::Authenticated => match &self.allowed_roles {
                None => GuardDecision::Render,
                Some(roles) => match &state.user {
                    Some(user) if roles.contains(&user.role) => GuardDecision::Render,
                    _ => {
                        debug!("role mismatch on protected route");
                        GuardDecision::Redirect(NavigationTarget::Unauthorized)
                    }
                },
            },
        }
    }
}

/// Guard for signed-out-only routes (login, register, ...): authenticated
/// sessions are sent to the dashboard.
#[derive(Debug, Default)]
pub struct PublicRoute;

impl PublicRoute {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        match state.status {
            AuthStatus::Initializing => GuardDecision::Loading,
            AuthStatus::Authenticated => GuardDecision::Redirect(NavigationTarget::Dashboard),
            AuthStatus::Unauthenticated => GuardDecision::Render,
        }
    }
}

/// Like [`ProtectedRoute`] but the role restriction is mandatory
pub struct RoleBasedRoute {
    inner: ProtectedRoute,
}

impl RoleBasedRoute {
    /// Fails if `roles` is empty; a role-based route without roles is a
    /// configuration error, not a permissive default.
    pub fn new(store: Arc<TokenStore>, roles: Vec<UserRole>) -> Result<Self> {
        if roles.is_empty() {
            return Err(ApiError::Internal {
                message: "RoleBasedRoute requires at least one role".to_string(),
            });
        }
        Ok(Self {
            inner: ProtectedRoute::with_roles(store, roles),
        })
    }

    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        self.inner.evaluate(state)
    }
}
