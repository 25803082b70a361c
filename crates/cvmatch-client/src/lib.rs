//! Client SDK for the CV-Match authentication and session lifecycle
//!
//! This crate implements the client side of CV-Match auth: durable token
//! storage, a typed API client for the auth endpoints, single-flight token
//! refresh, boot-time session restoration, a reducer-driven auth state
//! machine, a process-wide 401 interceptor, and declarative route guards.
//!
//! # Usage
//!
//! ```rust,no_run
//! use cvmatch_client::{bootstrap, config::ClientConfig, session::NoopNavigator};
//! use std::sync::Arc;
//!
//! # async fn example() -> cvmatch_client::Result<()> {
//! let config = ClientConfig::load_default().await?;
//! let (manager, initializer) = bootstrap(&config, Arc::new(NoopNavigator))?;
//!
//! let outcome = initializer.initialize("/dashboard").await;
//! if manager.state().is_authenticated() {
//!     // render the app
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use client::{AuthApiClient, ClientBuilder, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, Result};
pub use session::{
    AuthAction, AuthState, AuthStatus, GuardDecision, InitOutcome, NavigationTarget, Navigator,
    ProtectedRoute, PublicRoute, RefreshCoordinator, RoleBasedRoute, SessionInitializer,
    SessionManager, UnauthorizedInterceptor,
};
pub use store::{NoticeKind, SessionNotice, TokenStore};
pub use types::TokenResponse;

use crate::config::ClientConfig;
use std::sync::Arc;
use std::time::Duration;

/// Wire the full session stack from a configuration.
///
/// Creates one store, client, refresh coordinator, and interceptor, shares
/// them by reference, and returns the manager plus the boot initializer.
pub fn bootstrap(
    config: &ClientConfig,
    navigator: Arc<dyn Navigator>,
) -> Result<(Arc<SessionManager>, SessionInitializer)> {
    let store = Arc::new(TokenStore::open_default());
    let api = Arc::new(
        ClientBuilder::default()
            .base_url(&config.api.base_url)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?,
    );
    let refresher = Arc::new(RefreshCoordinator::new(Arc::clone(&api), Arc::clone(&store)));
    let interceptor = Arc::new(UnauthorizedInterceptor::new(Arc::clone(&store), navigator));

    let manager = Arc::new(SessionManager::new(store, api, refresher, interceptor));
    let initializer = SessionInitializer::new(Arc::clone(&manager));
    Ok((manager, initializer))
}
