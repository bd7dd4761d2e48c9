use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::IssuedToken;
use crate::errors::TokenError;
use crate::observability::metrics::get_metrics;

/// Holds at most one issued token for a single provider instance.
///
/// Reads take the shared lock. A refresh takes the exclusive lock and keeps it
/// for the whole obtain/exchange sequence, so concurrent callers racing on a
/// stale slot produce exactly one exchange.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<Arc<IssuedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token if present and not expired.
    pub async fn get(&self) -> Option<Arc<IssuedToken>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| !token.is_expired())
            .cloned()
    }

    pub async fn is_valid(&self) -> bool {
        self.get().await.is_some()
    }

    /// Overwrites the slot unconditionally.
    pub async fn replace(&self, token: IssuedToken) -> Arc<IssuedToken> {
        let token = Arc::new(token);
        *self.slot.write().await = Some(token.clone());
        token
    }

    /// Returns the cached token, or runs `refresh` under the exclusive lock and
    /// stores its result. The slot is written only when `refresh` succeeds with
    /// an unexpired token; errors and cancellation leave it as it was.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Arc<IssuedToken>, TokenError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken, TokenError>>,
    {
        let metrics = get_metrics().await;

        if let Some(token) = self.get().await {
            debug!("token in cache is good");
            metrics.cache_hits.inc();
            return Ok(token);
        }

        let mut slot = self.slot.write().await;

        // another caller may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref().filter(|token| !token.is_expired()) {
            debug!("token refreshed by a concurrent caller");
            metrics.cache_hits.inc();
            return Ok(token.clone());
        }

        match slot.as_ref() {
            Some(_) => debug!("token in cache is expired, fetching a new one"),
            None => debug!("no token in cache, fetching"),
        }

        let fresh = refresh().await?;
        if fresh.is_expired() {
            return Err(TokenError::Expired { exp: fresh.claims.exp });
        }

        metrics.cache_refreshes.inc();
        metrics.token_expiry_unix.set(fresh.claims.exp);

        let fresh = Arc::new(fresh);
        *slot = Some(fresh.clone());
        Ok(fresh)
    }
}
