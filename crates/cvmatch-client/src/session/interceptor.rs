//! Process-wide reaction to unauthorized responses
//!
//! Any code path that receives a 401 outside the initializer's controlled
//! refresh-retry forwards it here. The first 401 clears the stored session,
//! records a one-shot "session expired" notice for the login page, and
//! forces navigation to login; 401s arriving while that redirect is pending
//! are no-ops, so a burst of failing requests cannot cause a redirect storm.

use crate::session::navigation::{NavigationTarget, Navigator};
use crate::store::{SessionNotice, TokenStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired";
const SESSION_EXPIRED_SUBTITLE: &str = "Please sign in again to continue.";

/// One-shot 401 handler shared by the whole process.
///
/// Constructed explicitly and injected (not ambient module state) so tests
/// can instantiate fresh copies; production wiring creates one instance at
/// startup and shares it by reference.
pub struct UnauthorizedInterceptor {
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    redirect_pending: AtomicBool,
}

impl UnauthorizedInterceptor {
    pub fn new(store: Arc<TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            redirect_pending: AtomicBool::new(false),
        }
    }

    /// React to a 401: clear the session and redirect to login exactly once.
    pub async fn on_unauthorized(&self) {
        if self.redirect_pending.swap(true, Ordering::SeqCst) {
            debug!("401 observed while redirect already pending; ignoring");
            return;
        }

        warn!("unauthorized response; clearing session and redirecting to login");
        self.store.clear();
        self.store.put_notice(SessionNotice::warning(
            SESSION_EXPIRED_MESSAGE,
            SESSION_EXPIRED_SUBTITLE,
        ));
        self.navigator.navigate(NavigationTarget::Login).await;
    }

    /// Clear the redirect-pending latch (used by tests and after the login
    /// page has been reached).
    pub fn reset(&self) {
        self.redirect_pending.store(false, Ordering::SeqCst);
    }

    /// True once a redirect has been triggered and not yet reset
    pub fn is_redirect_pending(&self) -> bool {
        self.redirect_pending.load(Ordering::SeqCst)
    }
}
