//! # Processing Stats
//! Shared per-source counters written by the scheduler and the scoring
//! pipeline, read by the query surface. Mutation is restricted to atomic
//! per-key set/increment; readers only ever get a point-in-time copy, never
//! the live map.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct StatsBoard {
    inner: Mutex<HashMap<String, i64>>,
}

impl StatsBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: i64) {
        let mut map = self.inner.lock().expect("stats mutex poisoned");
        map.insert(key.into(), value);
    }

    pub fn increment(&self, key: impl Into<String>, by: i64) {
        let mut map = self.inner.lock().expect("stats mutex poisoned");
        *map.entry(key.into()).or_insert(0) += by;
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        let map = self.inner.lock().expect("stats mutex poisoned");
        map.get(key).copied()
    }

    /// Stable point-in-time copy of all counters.
    pub fn snapshot(&self) -> HashMap<String, i64> {
        let map = self.inner.lock().expect("stats mutex poisoned");
        map.clone()
    }

    /// Drop every counter; called at the start of an ingestion cycle.
    pub fn reset(&self) {
        let mut map = self.inner.lock().expect("stats mutex poisoned");
        map.clear();
    }
}
