//! # Per-Source Snapshot Cache
//! Read-mostly mirror of the store's recent-items view, keyed by source.
//! Each entry is a full snapshot replaced in one swap; readers always see
//! either the prior or the new complete list for a key, never a partial one.
//! Entries are rebuilt from the store, never mutated in place.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::model::NewsItem;

#[derive(Debug)]
pub struct NewsCache {
    entries: RwLock<HashMap<String, Arc<Vec<NewsItem>>>>,
    last_updated: RwLock<DateTime<Utc>>,
}

impl Default for NewsCache {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_updated: RwLock::new(Utc::now()),
        }
    }
}

impl NewsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for one key.
    pub fn replace(&self, source_key: &str, items: Vec<NewsItem>) {
        {
            let mut map = self.entries.write().expect("cache rwlock poisoned");
            map.insert(source_key.to_string(), Arc::new(items));
        }
        let mut ts = self.last_updated.write().expect("cache rwlock poisoned");
        *ts = Utc::now();
    }

    /// Current snapshot for a key; empty when the key was never cached.
    pub fn get(&self, source_key: &str) -> Arc<Vec<NewsItem>> {
        let map = self.entries.read().expect("cache rwlock poisoned");
        map.get(source_key)
            .cloned()
            .unwrap_or_else(|| Arc::new(Vec::new()))
    }

    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().expect("cache rwlock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        *self.last_updated.read().expect("cache rwlock poisoned")
    }
}
