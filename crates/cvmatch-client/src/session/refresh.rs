//! Single-flight token refresh
//!
//! Several in-flight requests can discover an expired access token at the
//! same moment. Without coordination each would call `/auth/refresh`
//! independently, racing to invalidate each other's newly minted tokens.
//! The [`RefreshCoordinator`] keeps at most one refresh request in flight;
//! callers that arrive while it is pending await the same shared future and
//! observe the identical outcome.

use crate::client::AuthApiClient;
use crate::error::{ApiError, Result};
use crate::store::TokenStore;
use crate::types::TokenResponse;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

type SharedRefresh = Shared<BoxFuture<'static, Result<TokenResponse>>>;

struct Inflight {
    generation: u64,
    future: SharedRefresh,
}

/// Serializes concurrent refresh attempts onto one HTTP call
pub struct RefreshCoordinator {
    api: Arc<AuthApiClient>,
    store: Arc<TokenStore>,
    // Locked only to read or swap the slot, never across an await
    inflight: Mutex<Option<Inflight>>,
    generations: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(api: Arc<AuthApiClient>, store: Arc<TokenStore>) -> Self {
        Self {
            api,
            store,
            inflight: Mutex::new(None),
            generations: AtomicU64::new(0),
        }
    }

    /// Exchange the stored refresh token for a fresh pair.
    ///
    /// If a refresh is already in flight, awaits that one instead of
    /// issuing a second HTTP call. On success the new tokens (and the user
    /// snapshot, when the server includes one) are persisted before any
    /// caller resolves; on failure the stored session is cleared and every
    /// subscriber sees the same error. The in-flight slot is always
    /// released, so a failed refresh cannot wedge future attempts.
    pub async fn refresh(&self) -> Result<TokenResponse> {
        let (generation, future) = {
            let mut slot = self.inflight.lock();
            match slot.as_ref() {
                Some(inflight) => {
                    debug!("refresh already in flight; subscribing to its outcome");
                    (inflight.generation, inflight.future.clone())
                }
                None => {
                    let generation = self.generations.fetch_add(1, Ordering::Relaxed);
                    let future = Self::run_refresh(Arc::clone(&self.api), Arc::clone(&self.store))
                        .boxed()
                        .shared();
                    *slot = Some(Inflight {
                        generation,
                        future: future.clone(),
                    });
                    (generation, future)
                }
            }
        };

        let result = future.await;

        // Release the slot, but only if a newer refresh has not replaced it
        let mut slot = self.inflight.lock();
        if slot.as_ref().map(|i| i.generation) == Some(generation) {
            *slot = None;
        }
        drop(slot);

        result
    }

    /// True while a refresh call is pending
    pub fn is_inflight(&self) -> bool {
        self.inflight.lock().is_some()
    }

    async fn run_refresh(api: Arc<AuthApiClient>, store: Arc<TokenStore>) -> Result<TokenResponse> {
        let Some(refresh_token) = store.refresh_token() else {
            warn!("refresh requested but no refresh token is stored");
            return Err(ApiError::SessionExpired);
        };

        debug!("refreshing access token");
        match api.refresh_token(&refresh_token).await {
            Ok(tokens) => {
                store.store_tokens(&tokens.access_token, &tokens.refresh_token, tokens.expires_in);
                if let Some(user) = &tokens.user {
                    store.store_user_snapshot(user);
                }
                info!("token refresh completed successfully");
                Ok(tokens)
            }
            Err(e) => {
                warn!("token refresh failed: {e}; clearing stored session");
                store.clear();
                Err(e)
            }
        }
    }
}
