//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use cvmatch_client::{
    AuthApiClient, ClientBuilder, NavigationTarget, Navigator, RefreshCoordinator, SessionManager,
    TokenStore, UnauthorizedInterceptor,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Navigator that records every forced navigation
pub struct RecordingNavigator {
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            targets: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.targets.lock().len()
    }

    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, target: NavigationTarget) {
        self.targets.lock().push(target);
    }
}

/// Fully wired session stack against a mock server, with an in-memory
/// store and a recording navigator
pub struct TestStack {
    pub store: Arc<TokenStore>,
    pub api: Arc<AuthApiClient>,
    pub refresher: Arc<RefreshCoordinator>,
    pub interceptor: Arc<UnauthorizedInterceptor>,
    pub manager: Arc<SessionManager>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn stack_for(base_url: &str) -> TestStack {
    let store = Arc::new(TokenStore::in_memory());
    let api = Arc::new(
        ClientBuilder::default()
            .base_url(base_url)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap(),
    );
    let refresher = Arc::new(RefreshCoordinator::new(Arc::clone(&api), Arc::clone(&store)));
    let navigator = RecordingNavigator::new();
    let interceptor = Arc::new(UnauthorizedInterceptor::new(
        Arc::clone(&store),
        navigator.clone(),
    ));
    let manager = Arc::new(SessionManager::new(
        Arc::clone(&store),
        Arc::clone(&api),
        Arc::clone(&refresher),
        Arc::clone(&interceptor),
    ));

    TestStack {
        store,
        api,
        refresher,
        interceptor,
        manager,
        navigator,
    }
}

/// Canonical user payload as the backend would return it
pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "1",
        "email": "a@b.com",
        "full_name": "Ada Lovelace",
        "role": "candidate",
        "email_verified": true,
        "auth_provider": "email",
    })
}

/// Token payload with the user embedded
pub fn token_json(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 3600,
        "user": user_json(),
    })
}
