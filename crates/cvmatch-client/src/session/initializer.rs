//! Boot-time session restoration
//!
//! Runs once per application load and decides the initial auth state from
//! the stored tokens, the cached user snapshot, and (when needed) a
//! revalidation call. The cached-snapshot fast path never blocks first
//! paint on network latency: state becomes authenticated immediately and a
//! background re-fetch patches it later.

use crate::session::manager::SessionManager;
use crate::session::navigation::NavigationTarget;
use crate::session::state::{AuthAction, AuthStatus};
use cvmatch_common::routes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SESSION_EXPIRED_REASON: &str = "Your session has expired. Please sign in again.";
const INVALID_SESSION_REASON: &str = "Your session is no longer valid. Please sign in again.";

/// Result of a session initialization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    /// Status the auth state settled on
    pub status: AuthStatus,
    /// Redirect the host should perform, e.g. away from the login page
    /// when the restored session turned out to be valid
    pub redirect: Option<NavigationTarget>,
}

/// Once-per-boot session restorer.
///
/// The current route and the public-route set are injected rather than
/// read from ambient navigation state, which keeps the decision tree
/// testable.
pub struct SessionInitializer {
    manager: Arc<SessionManager>,
    public_routes: Vec<String>,
    auth_only_routes: Vec<String>,
    running: AtomicBool,
}

impl SessionInitializer {
    /// Initializer with the product's compiled-in route sets
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self::with_routes(
            manager,
            routes::PUBLIC_ROUTES.iter().map(|r| r.to_string()).collect(),
            routes::AUTH_ONLY_ROUTES.iter().map(|r| r.to_string()).collect(),
        )
    }

    /// Initializer with explicit route sets
    pub fn with_routes(
        manager: Arc<SessionManager>,
        public_routes: Vec<String>,
        auth_only_routes: Vec<String>,
    ) -> Self {
        Self {
            manager,
            public_routes,
            auth_only_routes,
            running: AtomicBool::new(false),
        }
    }

    /// Decide the initial auth state for the given route.
    ///
    /// Re-entrant triggers (rapid reload, double-mount) are no-ops while a
    /// run is in flight: they return the state as it currently stands
    /// without starting a second sequence.
    pub async fn initialize(&self, current_route: &str) -> InitOutcome {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("session initialization already running; ignoring trigger");
            return InitOutcome {
                status: self.manager.state().status,
                redirect: None,
            };
        }

        let outcome = self.run(current_route).await;
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self, current_route: &str) -> InitOutcome {
        let store = self.manager.store();
        let access_token = store.access_token();
        let refresh_token = store.refresh_token();

        // No (complete) token pair: settle unauthenticated without any
        // network call. Protected routes redirect via the guards.
        if access_token.is_none() || refresh_token.is_none() {
            if self.is_public(current_route) {
                debug!("no session on public route {current_route}");
            } else {
                debug!("no session on protected route {current_route}");
            }
            store.clear();
            self.manager.dispatch(AuthAction::Logout);
            return InitOutcome {
                status: AuthStatus::Unauthenticated,
                redirect: None,
            };
        }
        let access_token = access_token.unwrap_or_default();

        // Cached snapshot: paint authenticated immediately and revalidate
        // in the background.
        if let Some(user) = store.user_snapshot() {
            info!("restored session for {} from cached snapshot", user.email);
            self.manager.dispatch(AuthAction::Success { user });
            self.manager.spawn_revalidation();
            return self.authenticated_outcome(current_route);
        }

        // Tokens but no snapshot: validate over the network.
        match self.manager.api().get_current_user(&access_token).await {
            Ok(user) => {
                info!("session validated for {}", user.email);
                store.store_user_snapshot(&user);
                self.manager.dispatch(AuthAction::Success { user });
                self.authenticated_outcome(current_route)
            }
            Err(e) if e.is_unauthorized() => self.refresh_and_retry(current_route).await,
            Err(e) => {
                warn!("session validation failed: {e}");
                store.clear();
                self.manager.dispatch(AuthAction::Failure {
                    message: Some(INVALID_SESSION_REASON.to_string()),
                });
                InitOutcome {
                    status: AuthStatus::Unauthenticated,
                    redirect: None,
                }
            }
        }
    }

    /// Controlled 401 recovery: exactly one refresh, then one retry.
    ///
    /// This path handles the 401 locally instead of going through the
    /// interceptor; the state machine has not settled yet, so there is
    /// nothing to redirect away from.
    async fn refresh_and_retry(&self, current_route: &str) -> InitOutcome {
        debug!("stored access token rejected; attempting refresh");
        let tokens = match self.manager.refresher().refresh().await {
            Ok(tokens) => tokens,
            Err(e) => {
                // Coordinator already cleared the stored session
                warn!("startup refresh failed: {e}");
                self.manager.dispatch(AuthAction::Failure {
                    message: Some(SESSION_EXPIRED_REASON.to_string()),
                });
                return InitOutcome {
                    status: AuthStatus::Unauthenticated,
                    redirect: None,
                };
            }
        };

        match self
            .manager
            .api()
            .get_current_user(&tokens.access_token)
            .await
        {
            Ok(user) => {
                info!("session restored after refresh for {}", user.email);
                self.manager.store().store_user_snapshot(&user);
                self.manager.dispatch(AuthAction::Success { user });
                self.authenticated_outcome(current_route)
            }
            Err(e) => {
                warn!("retry after refresh failed: {e}");
                self.manager.store().clear();
                self.manager.dispatch(AuthAction::Failure {
                    message: Some(SESSION_EXPIRED_REASON.to_string()),
                });
                InitOutcome {
                    status: AuthStatus::Unauthenticated,
                    redirect: None,
                }
            }
        }
    }

    /// Authenticated sessions landing on signed-out-only pages (login,
    /// register, ...) are redirected to the dashboard.
    fn authenticated_outcome(&self, current_route: &str) -> InitOutcome {
        let redirect = if self.is_auth_only(current_route) {
            Some(NavigationTarget::Dashboard)
        } else {
            None
        };
        InitOutcome {
            status: AuthStatus::Authenticated,
            redirect,
        }
    }

    fn is_public(&self, route: &str) -> bool {
        let route = routes::normalize_path(route);
        self.public_routes.iter().any(|r| r == route)
    }

    fn is_auth_only(&self, route: &str) -> bool {
        let route = routes::normalize_path(route);
        self.auth_only_routes.iter().any(|r| r == route)
    }
}
