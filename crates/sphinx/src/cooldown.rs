//! Per-client cooldown after a wrong or scattershot guess.
//!
//! One lockout covers all three stages. Entries are overwritten, never
//! extended, and only the expiry-vs-now comparison matters, so a stale entry
//! is harmless until the sweeper drops it.

use dashmap::DashMap;
use sphinx_common::ClientId;
use std::time::Duration;
use tokio::time::Instant;

/// Cooldown tracking service
pub struct CooldownTracker {
    /// Client -> lockout expiry
    entries: DashMap<ClientId, Instant>,
    /// Lockout applied by `trigger`
    duration: Duration,
}

impl CooldownTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            duration,
        }
    }

    /// True iff the client has a lockout expiring strictly after now
    pub fn is_cooling_down(&self, client: &ClientId) -> bool {
        self.entries
            .get(client)
            .is_some_and(|until| *until > Instant::now())
    }

    /// Lock the client out for the configured duration
    pub fn trigger(&self, client: &ClientId) {
        self.trigger_for(client, self.duration);
    }

    /// Lock the client out for `duration`, replacing any previous expiry
    pub fn trigger_for(&self, client: &ClientId, duration: Duration) {
        self.entries.insert(client.clone(), Instant::now() + duration);
        tracing::debug!(client = %client, secs = duration.as_secs(), "Cooldown triggered");
    }

    /// Drop lockouts that have already lapsed, returning how many went
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, until| *until > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
