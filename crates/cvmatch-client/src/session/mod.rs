//! Session lifecycle: state machine, initialization, refresh coordination,
//! 401 interception, and route guards
//!
//! Wiring order matches the dependency order: a [`TokenStore`] and
//! [`AuthApiClient`](crate::client::AuthApiClient) feed a
//! [`RefreshCoordinator`] and [`UnauthorizedInterceptor`], which together
//! back the [`SessionManager`]; the [`SessionInitializer`] drives the
//! manager once at boot and the guards read its state afterwards.
//!
//! [`TokenStore`]: crate::store::TokenStore
//! [`RefreshCoordinator`]: refresh::RefreshCoordinator
//! [`UnauthorizedInterceptor`]: interceptor::UnauthorizedInterceptor
//! [`SessionManager`]: manager::SessionManager
//! [`SessionInitializer`]: initializer::SessionInitializer

pub mod guards;
pub mod initializer;
pub mod interceptor;
pub mod manager;
pub mod navigation;
pub mod refresh;
pub mod state;

// Re-export commonly used types
pub use guards::{GuardDecision, ProtectedRoute, PublicRoute, RoleBasedRoute};
pub use initializer::{InitOutcome, SessionInitializer};
pub use interceptor::UnauthorizedInterceptor;
pub use manager::SessionManager;
pub use navigation::{NavigationTarget, Navigator, NoopNavigator};
pub use refresh::RefreshCoordinator;
pub use state::{reduce, AuthAction, AuthState, AuthStatus};
