use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::domain::ClientIdentity;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitEntry {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn window_elapsed(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start > window
    }
}

/// Per-identity submission quota.
///
/// `check_and_increment` must be atomic per identity: two concurrent calls
/// may never both observe the last free slot.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn check_and_increment(
        &self,
        identity: &ClientIdentity,
        now: DateTime<Utc>,
    ) -> QuotaDecision;

    /// Drops entries whose window has already elapsed and returns how many
    /// were removed.
    async fn sweep_expired(&self, _now: DateTime<Utc>) -> usize {
        0
    }
}

/// Process-local quota table. Fixed windows; an entry resets (rather than
/// decrements) once its window has elapsed.
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    policy: QuotaPolicy,
    entries: Mutex<HashMap<ClientIdentity, RateLimitEntry>>,
}

impl InMemoryQuotaStore {
    pub fn new(policy: QuotaPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub async fn entry(&self, identity: &ClientIdentity) -> Option<RateLimitEntry> {
        self.entries.lock().await.get(identity).copied()
    }

    pub async fn tracked_identities(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl QuotaStore for InMemoryQuotaStore {
    async fn check_and_increment(
        &self,
        identity: &ClientIdentity,
        now: DateTime<Utc>,
    ) -> QuotaDecision {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(identity) else {
            entries.insert(identity.clone(), RateLimitEntry::fresh(now));
            return QuotaDecision::Allowed;
        };

        if entry.window_elapsed(now, self.policy.window) {
            *entry = RateLimitEntry::fresh(now);
            return QuotaDecision::Allowed;
        }
        if entry.count >= self.policy.max_requests {
            return QuotaDecision::Denied;
        }
        entry.count += 1;
        QuotaDecision::Allowed
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let window = self.policy.window;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.window_elapsed(now, window));
        before - entries.len()
    }
}

#[cfg(test)]
#[path = "tests/quota_tests.rs"]
mod tests;
