//! Time-bounded cache of loaded tables, keyed by source identifier.
//!
//! Upstream data changes rarely, so repeated loads inside the TTL reuse the
//! previous table. Failed loads are never cached.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::data::loader::LoadOutcome;

#[derive(Debug, Clone)]
struct CachedTable {
    loaded_at: Instant,
    outcome: LoadOutcome,
}

#[derive(Debug, Clone)]
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<String, CachedTable>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load(&mut self, key: &str, load: impl FnOnce() -> LoadOutcome) -> LoadOutcome {
        self.get_or_load_at(key, Instant::now(), load)
    }

    /// Same as `get_or_load`, with an explicit clock.
    pub fn get_or_load_at(
        &mut self,
        key: &str,
        now: Instant,
        load: impl FnOnce() -> LoadOutcome,
    ) -> LoadOutcome {
        if let Some(hit) = self.entries.get(key) {
            if now.saturating_duration_since(hit.loaded_at) < self.ttl {
                log::debug!("cache hit for {key}");
                return hit.outcome.clone();
            }
            log::debug!("cache entry for {key} expired");
        }

        let outcome = load();
        if outcome.is_available() {
            self.entries.insert(
                key.to_string(),
                CachedTable {
                    loaded_at: now,
                    outcome: outcome.clone(),
                },
            );
        } else {
            self.entries.remove(key);
        }
        outcome
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
