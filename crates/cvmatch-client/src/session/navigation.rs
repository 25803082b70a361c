//! Navigation seam between the session layer and the host UI
//!
//! The session core never touches ambient location state; components that
//! need to force navigation (the 401 interceptor, guards, the initializer)
//! emit a [`NavigationTarget`] and the host wires a [`Navigator`] to its
//! router.

use async_trait::async_trait;
use cvmatch_common::routes::{DASHBOARD_ROUTE, LOGIN_ROUTE, UNAUTHORIZED_ROUTE};
use std::fmt;

/// Destination of a forced navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Login page, used after session expiry or unauthenticated access
    Login,
    /// Authenticated landing destination
    Dashboard,
    /// Access-denied page for role mismatches
    Unauthorized,
}

impl NavigationTarget {
    /// Route path for this destination
    pub fn path(&self) -> &'static str {
        match self {
            NavigationTarget::Login => LOGIN_ROUTE,
            NavigationTarget::Dashboard => DASHBOARD_ROUTE,
            NavigationTarget::Unauthorized => UNAUTHORIZED_ROUTE,
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Pluggable navigation sink.
///
/// Production wiring forwards to the router; tests record the calls.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, target: NavigationTarget);
}

/// Navigator that drops every navigation; useful as a default in contexts
/// that only inspect returned decisions.
#[derive(Debug, Default)]
pub struct NoopNavigator;

#[async_trait]
impl Navigator for NoopNavigator {
    async fn navigate(&self, target: NavigationTarget) {
        tracing::debug!("ignoring navigation to {}", target.path());
    }
}
