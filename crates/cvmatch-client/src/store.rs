//! Durable session storage
//!
//! The [`TokenStore`] is the single source of truth for persisted session
//! data: the access/refresh token pair, the absolute access-token expiry,
//! the cached user snapshot painted before revalidation completes, and the
//! one-shot notice consumed by the post-redirect login page.
//!
//! Reads are served from an in-memory copy so callers never block on disk;
//! every mutation rewrites `session.json` best-effort. A storage failure is
//! logged and otherwise invisible to the caller: reads return `None` and
//! writes become no-ops rather than crashing the session layer.

use chrono::Utc;
use cvmatch_common::UserProfile;
use etcetera::{choose_base_strategy, BaseStrategy};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SESSION_FILE: &str = "session.json";

/// Severity of a [`SessionNotice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Warning,
    Info,
}

/// One-shot notice written before a redirect and consumed exactly once by
/// the destination page (e.g. "session expired" shown on the login page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNotice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl SessionNotice {
    pub fn warning(message: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
            subtitle: Some(subtitle.into()),
        }
    }

    pub fn info(message: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            subtitle: Some(subtitle.into()),
        }
    }
}

/// Persisted session bundle.
///
/// Invariant: `access_token` and `refresh_token` are always written and
/// cleared together, and `expires_at` is recomputed whenever the access
/// token is replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Absolute access-token expiry, unix milliseconds
    expires_at: Option<i64>,
    user: Option<UserProfile>,
    notice: Option<SessionNotice>,
}

/// File-backed session store with synchronous, infallible reads
pub struct TokenStore {
    cache: RwLock<SessionData>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Open the store rooted at the given directory.
    ///
    /// The directory is created if missing; if it cannot be created or the
    /// existing session file cannot be parsed, the store falls back to an
    /// empty in-memory session and logs a warning.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(
                "failed to create session directory {}: {e}; session will not persist",
                dir.display()
            );
            return Self::in_memory();
        }

        let path = dir.join(SESSION_FILE);
        let data = Self::load_file(&path);
        Self {
            cache: RwLock::new(data),
            path: Some(path),
        }
    }

    /// Open the store in the platform data directory
    /// (e.g. `~/.local/share/cvmatch` on Linux).
    pub fn open_default() -> Self {
        match choose_base_strategy() {
            Ok(strategy) => Self::new(strategy.data_dir().join("cvmatch")),
            Err(e) => {
                warn!("failed to determine base directories: {e}; session will not persist");
                Self::in_memory()
            }
        }
    }

    /// Store that never touches disk; used in tests and as the degraded
    /// fallback when no writable directory exists.
    pub fn in_memory() -> Self {
        Self {
            cache: RwLock::new(SessionData::default()),
            path: None,
        }
    }

    fn load_file(path: &Path) -> SessionData {
        if !path.exists() {
            return SessionData::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => {
                    debug!("restored session from {}", path.display());
                    data
                }
                Err(e) => {
                    warn!("failed to parse session file {}: {e}", path.display());
                    SessionData::default()
                }
            },
            Err(e) => {
                warn!("failed to read session file {}: {e}", path.display());
                SessionData::default()
            }
        }
    }

    /// Best-effort write of the current session to disk.
    fn persist(&self, data: &SessionData) {
        let Some(path) = &self.path else {
            return;
        };
        let content = match serde_json::to_string_pretty(data) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to serialize session: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(path, content) {
            warn!("failed to write session file {}: {e}", path.display());
        }
    }

    /// Store a token pair and recompute the absolute expiry.
    ///
    /// Both tokens are written in one call; there is no way to store one
    /// half of the pair.
    pub fn store_tokens(&self, access_token: &str, refresh_token: &str, expires_in_secs: i64) {
        let mut cache = self.cache.write();
        cache.access_token = Some(access_token.to_string());
        cache.refresh_token = Some(refresh_token.to_string());
        cache.expires_at = Some(Self::now_ms() + expires_in_secs * 1000);
        self.persist(&cache);
    }

    /// Cache a user snapshot for instant UI on the next load
    pub fn store_user_snapshot(&self, user: &UserProfile) {
        let mut cache = self.cache.write();
        cache.user = Some(user.clone());
        self.persist(&cache);
    }

    pub fn user_snapshot(&self) -> Option<UserProfile> {
        self.cache.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.cache.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.cache.read().refresh_token.clone()
    }

    /// Absolute access-token expiry in unix milliseconds, if any
    pub fn expires_at(&self) -> Option<i64> {
        self.cache.read().expires_at
    }

    /// True when both halves of the token pair are present
    pub fn has_tokens(&self) -> bool {
        let cache = self.cache.read();
        cache.access_token.is_some() && cache.refresh_token.is_some()
    }

    /// Whether the access token is expired right now.
    ///
    /// A missing expiry timestamp is treated as expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Self::now_ms())
    }

    /// Expiry check against an explicit clock, for deterministic tests
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.cache.read().expires_at {
            Some(expires_at) => now_ms >= expires_at,
            None => true,
        }
    }

    /// Remove tokens, expiry, and the cached user snapshot.
    ///
    /// Idempotent; the one-shot notice survives so it can still be shown
    /// after the redirect that usually follows a clear.
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.access_token = None;
        cache.refresh_token = None;
        cache.expires_at = None;
        cache.user = None;
        self.persist(&cache);
    }

    /// Record a one-shot notice for the next page load
    pub fn put_notice(&self, notice: SessionNotice) {
        let mut cache = self.cache.write();
        cache.notice = Some(notice);
        self.persist(&cache);
    }

    /// Consume the pending notice, if any. Subsequent calls return `None`.
    pub fn take_notice(&self) -> Option<SessionNotice> {
        let mut cache = self.cache.write();
        let notice = cache.notice.take();
        if notice.is_some() {
            self.persist(&cache);
        }
        notice
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }
}
