//! One-shot final-stage tokens.
//!
//! A token is minted when the second riddle is solved and is bound to the
//! client that solved it. It stays valid until it is consumed or its TTL
//! runs out. Expiry is checked lazily on every read; no timer task is
//! spawned per token.

use dashmap::DashMap;
use sphinx_common::{ClientId, TokenId};
use std::time::Duration;
use tokio::time::Instant;

/// Final-stage token store
pub struct TokenStore {
    /// (token, client) -> expiry
    tokens: DashMap<(TokenId, ClientId), Instant>,
    /// Lifetime of a freshly issued token
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Mint a token for `client`
    pub fn issue(&self, client: &ClientId) -> TokenId {
        let token = TokenId::generate();
        self.tokens
            .insert((token, client.clone()), Instant::now() + self.ttl);

        tracing::debug!(token = %token, client = %client, "Final token issued");
        token
    }

    /// Whether the pair is present and unexpired. Does not consume.
    pub fn is_valid(&self, token: &TokenId, client: &ClientId) -> bool {
        self.tokens
            .get(&(*token, client.clone()))
            .is_some_and(|expires| *expires > Instant::now())
    }

    /// Invalidate the pair, returning whether it was valid.
    ///
    /// Removal is atomic, so of any number of concurrent callers with the
    /// same pair at most one sees `true`.
    pub fn consume(&self, token: &TokenId, client: &ClientId) -> bool {
        self.tokens
            .remove(&(*token, client.clone()))
            .is_some_and(|(_, expires)| expires > Instant::now())
    }

    /// Drop expired tokens, returning how many went
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, expires| *expires > now);
        before.saturating_sub(self.tokens.len())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
