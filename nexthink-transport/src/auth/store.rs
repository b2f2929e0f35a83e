//! In-memory token slot.
//!
//! The store holds at most one token. All reads and writes go through one
//! async mutex, and the token manager keeps that mutex held across a refresh
//! so the check-then-act sequence is never interleaved.
//!
//! Every refresh attempt, successful or not, advances a refresh epoch. A
//! caller that sampled the epoch before queueing on the lock can tell whether
//! a refresh finished while it waited, and reuse that refresh's failure
//! instead of issuing another request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::error::AuthError;

// ============================================================================
// Token
// ============================================================================

/// Token payload returned by the OAuth2 token endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    /// Bearer token value.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds from issuance.
    #[serde(default)]
    pub expires_in: i64,
    /// Granted scope.
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug)]
struct CachedToken {
    token: Token,
    expires_at: Instant,
    expires_at_utc: DateTime<Utc>,
}

// ============================================================================
// Token Store
// ============================================================================

#[derive(Debug, Default)]
struct Slot {
    current: Option<CachedToken>,
    last_failure: Option<(u64, AuthError)>,
}

/// Single-slot token cache guarded by an async mutex.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: Mutex<Slot>,
    epoch: AtomicU64,
}

impl TokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh attempts recorded so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Acquires exclusive access to the slot.
    pub async fn lock(&self) -> TokenSlot<'_> {
        TokenSlot {
            slot: self.slot.lock().await,
            epoch: &self.epoch,
        }
    }

    /// Returns the cached token if it stays valid for longer than `margin`.
    pub async fn get(&self, margin: Duration) -> Option<String> {
        self.lock().await.usable(margin)
    }

    /// Drops the cached token.
    pub async fn invalidate(&self) {
        self.lock().await.clear();
    }

    /// Drops the cached token only if it is still `used`.
    ///
    /// Returns true if the slot was cleared.
    pub async fn invalidate_if(&self, used: &str) -> bool {
        self.lock().await.clear_if(used)
    }

    /// Wall-clock expiry of the cached token.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lock().await.expires_at()
    }
}

/// Exclusive handle on the token slot.
///
/// Held by the token manager for the whole of a refresh.
pub struct TokenSlot<'a> {
    slot: MutexGuard<'a, Slot>,
    epoch: &'a AtomicU64,
}

impl TokenSlot<'_> {
    /// Returns the token if `now + margin` is still before its expiry.
    pub fn usable(&self, margin: Duration) -> Option<String> {
        let cached = self.slot.current.as_ref()?;
        if Instant::now() + margin < cached.expires_at {
            Some(cached.token.access_token.clone())
        } else {
            None
        }
    }

    /// Stores a freshly issued token and advances the epoch.
    ///
    /// A non-positive lifetime is stored as already expired.
    pub fn store(&mut self, token: Token) {
        let lifetime = Duration::from_secs(u64::try_from(token.expires_in).unwrap_or(0));
        let expires_at_utc = Utc::now()
            + chrono::Duration::from_std(lifetime).unwrap_or_else(|_| chrono::Duration::zero());
        self.slot.current = Some(CachedToken {
            token,
            expires_at: Instant::now() + lifetime,
            expires_at_utc,
        });
        self.slot.last_failure = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a failed refresh and advances the epoch.
    ///
    /// The cached token, if any, is kept.
    pub fn record_failure(&mut self, error: AuthError) {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.slot.last_failure = Some((epoch, error));
    }

    /// Returns the failure of a refresh that completed after `observed`.
    pub fn failure_since(&self, observed: u64) -> Option<AuthError> {
        match &self.slot.last_failure {
            Some((epoch, error)) if *epoch > observed => Some(error.clone()),
            _ => None,
        }
    }

    /// Drops the cached token.
    pub fn clear(&mut self) {
        self.slot.current = None;
    }

    /// Drops the cached token if its value is `used`. A token stored by a
    /// later refresh is kept.
    pub fn clear_if(&mut self, used: &str) -> bool {
        let matches = self
            .slot
            .current
            .as_ref()
            .is_some_and(|c| c.token.access_token == used);
        if matches {
            self.slot.current = None;
        }
        matches
    }

    /// Wall-clock expiry of the cached token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.slot.current.as_ref().map(|c| c.expires_at_utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str, expires_in: i64) -> Token {
        Token {
            access_token: value.to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            scope: Some("service:integration".to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = TokenStore::new();
        assert_eq!(store.get(Duration::ZERO).await, None);
        assert_eq!(store.expires_at().await, None);
        assert_eq!(store.epoch(), 0);
    }

    #[tokio::test]
    async fn test_store_and_margin() {
        let store = TokenStore::new();
        store.lock().await.store(token("t1", 900));

        assert_eq!(store.get(Duration::from_secs(120)).await.as_deref(), Some("t1"));
        // Lifetime shorter than the margin counts as unusable.
        assert_eq!(store.get(Duration::from_secs(900)).await, None);
        assert!(store.expires_at().await.is_some());
        assert_eq!(store.epoch(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_lifetime_is_expired() {
        let store = TokenStore::new();
        store.lock().await.store(token("t1", 0));
        assert_eq!(store.get(Duration::ZERO).await, None);

        store.lock().await.store(token("t2", -5));
        assert_eq!(store.get(Duration::ZERO).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let store = TokenStore::new();
        store.lock().await.store(token("t1", 900));
        store.invalidate().await;
        store.invalidate().await;
        assert_eq!(store.get(Duration::ZERO).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_if_keeps_newer_token() {
        let store = TokenStore::new();
        store.lock().await.store(token("t2", 900));

        assert!(!store.invalidate_if("t1").await);
        assert_eq!(store.get(Duration::ZERO).await.as_deref(), Some("t2"));

        assert!(store.invalidate_if("t2").await);
        assert_eq!(store.get(Duration::ZERO).await, None);
        assert!(!store.invalidate_if("t2").await);
    }

    #[tokio::test]
    async fn test_failure_keeps_token_and_is_scoped_by_epoch() {
        let store = TokenStore::new();
        store.lock().await.store(token("t1", 900));
        let observed = store.epoch();

        let mut slot = store.lock().await;
        slot.record_failure(AuthError::RequestFailed("boom".into()));
        assert_eq!(slot.usable(Duration::ZERO).as_deref(), Some("t1"));
        assert!(slot.failure_since(observed).is_some());
        // A caller arriving after the failure does not inherit it.
        assert!(slot.failure_since(store.epoch()).is_none());
    }

    #[test]
    fn test_token_debug_redacts_value() {
        let printed = format!("{:?}", token("super-secret", 900));
        assert!(!printed.contains("super-secret"));
    }
}
