//! Background pruning of lapsed cooldowns and tokens.
//!
//! Expiry is already enforced on every read, so this only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use crate::cooldown::CooldownTracker;
use crate::tokens::TokenStore;

/// Periodically drop expired entries until shutdown is signalled
pub async fn sweeper_worker(
    cooldown: Arc<CooldownTracker>,
    tokens: Arc<TokenStore>,
    interval: Duration,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tracing::info!("🧹 Sweeper started (interval: {}s)", interval.as_secs());

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                sweep(&cooldown, &tokens);
            }
            _ = shutdown.recv() => {
                tracing::info!("🧹 Sweeper shutting down...");
                break;
            }
        }
    }
}

/// One pruning pass, returning (cooldowns, tokens) removed
pub fn sweep(cooldown: &CooldownTracker, tokens: &TokenStore) -> (usize, usize) {
    let lapsed = cooldown.purge_expired();
    let expired = tokens.purge_expired();

    if lapsed > 0 || expired > 0 {
        tracing::debug!(
            cooldowns = lapsed,
            tokens = expired,
            remaining_cooldowns = cooldown.len(),
            remaining_tokens = tokens.len(),
            "Swept expired entries"
        );
    }

    (lapsed, expired)
}
