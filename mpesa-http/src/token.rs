//! Shared token cache.
//!
//! Token state is read before every outgoing operation and written only by
//! the fetch success path. The cache guards that read-modify-write with an
//! async `RwLock` so a gateway shared across concurrent callers cannot
//! interleave it unsafely; the refresh path re-checks validity under the
//! write lock, so a fetch completed by a contending caller is reused
//! instead of overwritten.

use mpesa::timestamp::UnixTimestamp;
use mpesa::token::AccessToken;
use tokio::sync::RwLock;

/// A mutual-exclusion cache for the gateway's bearer token.
///
/// Each clone has an independent cache state.
#[derive(Debug, Default)]
pub struct TokenCache {
    state: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache seeded with a stored token, valid or not.
    #[must_use]
    pub fn seeded(token: AccessToken) -> Self {
        Self {
            state: RwLock::new(Some(token)),
        }
    }

    /// Returns the stored token regardless of freshness.
    pub async fn current(&self) -> Option<AccessToken> {
        self.state.read().await.clone()
    }

    /// Returns the stored token only if it is valid at `now`.
    pub async fn get_valid(&self, now: UnixTimestamp) -> Option<AccessToken> {
        let guard = self.state.read().await;
        guard.as_ref().filter(|t| t.is_valid(now)).cloned()
    }

    /// Stores a freshly issued token.
    pub async fn store(&self, token: AccessToken) {
        let mut guard = self.state.write().await;
        *guard = Some(token);
    }

    /// Clears the cache.
    pub async fn clear(&self) {
        let mut guard = self.state.write().await;
        *guard = None;
    }

    /// Returns a valid token, refreshing through `fetch` if needed.
    ///
    /// The write lock is held across the fetch, so concurrent callers that
    /// all find the token invalid issue one fetch between them; late
    /// arrivals see the stored result on their re-check. When `fetch`
    /// returns `None` the stored state is left unchanged and returned as-is
    /// (possibly stale, possibly absent).
    pub async fn get_or_refresh<F, Fut>(&self, now: UnixTimestamp, fetch: F) -> Option<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<AccessToken>>,
    {
        if let Some(token) = self.get_valid(now).await {
            return Some(token);
        }

        let mut guard = self.state.write().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_valid(now)) {
            return Some(token.clone());
        }

        match fetch().await {
            Some(token) => {
                *guard = Some(token.clone());
                Some(token)
            }
            None => (*guard).clone(),
        }
    }
}

impl Clone for TokenCache {
    fn clone(&self) -> Self {
        Self::new()
    }
}
