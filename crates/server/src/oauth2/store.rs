//! State → PKCE verifier storage.
//!
//! `/auth` stores the verifier under the freshly generated state; `/user-token`
//! takes it back out exactly once.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Storage for verifiers awaiting their authorization-code exchange.
pub trait VerifierStore: Send + Sync {
    /// Remember `verifier` for `state`, replacing any previous entry.
    fn put(&self, state: String, verifier: String);

    /// Remove and return the verifier for `state`, if present and not expired.
    fn take(&self, state: &str) -> Option<String>;

    /// Number of entries currently held, including expired ones not yet pruned.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
struct StoreEntry {
    verifier: String,
    expires_at: Instant,
}

impl StoreEntry {
    fn new(verifier: String, ttl: Duration) -> Self {
        Self {
            verifier,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Process-local store backed by a concurrent map with per-entry TTL.
#[derive(Clone)]
pub struct InMemoryVerifierStore {
    entries: Arc<DashMap<String, StoreEntry>>,
    ttl: Duration,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl InMemoryVerifierStore {
    const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Drop expired entries if the last sweep is older than a minute.
    fn maybe_cleanup(&self) {
        if let Ok(mut last_cleanup) = self.last_cleanup.try_lock() {
            if last_cleanup.elapsed() >= Self::CLEANUP_INTERVAL {
                *last_cleanup = Instant::now();
                drop(last_cleanup);
                self.purge_expired();
            }
        }
    }

    /// Remove every expired entry now.
    pub fn purge_expired(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "pruned expired PKCE verifiers");
        }
    }
}

impl Default for InMemoryVerifierStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

impl VerifierStore for InMemoryVerifierStore {
    fn put(&self, state: String, verifier: String) {
        self.maybe_cleanup();
        self.entries
            .insert(state, StoreEntry::new(verifier, self.ttl));
    }

    fn take(&self, state: &str) -> Option<String> {
        self.maybe_cleanup();
        let (_, entry) = self.entries.remove(state)?;
        if entry.is_expired() {
            None
        } else {
            Some(entry.verifier)
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
