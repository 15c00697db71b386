//! Search history: newest first, deduplicated by query, capped,
//! and mirrored into the key-value store after every change.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::DEFAULT_HISTORY_CAP;
use crate::model::{FilterConfig, SearchHistoryEntry};
use crate::storage::DynStore;

pub const HISTORY_STORAGE_KEY: &str = "search_history";

pub struct SearchHistory {
    inner: Mutex<Inner>,
    cap: usize,
    store: DynStore,
}

struct Inner {
    entries: Vec<SearchHistoryEntry>,
    seq: u64,
}

impl SearchHistory {
    /// Load persisted entries (if any). A corrupt payload is logged and ignored.
    pub fn load(store: DynStore, cap: usize) -> Self {
        let cap = cap.clamp(1, DEFAULT_HISTORY_CAP);
        let mut entries: Vec<SearchHistoryEntry> = match store.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(target: "history", error = %e, "failed to parse stored search history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(target: "history", error = ?e, "failed to read stored search history");
                Vec::new()
            }
        };
        entries.truncate(cap);
        Self {
            inner: Mutex::new(Inner { entries, seq: 0 }),
            cap,
            store,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Insert at the front, dropping any older entry with the same query, then
    /// evict beyond the cap.
    pub fn record(
        &self,
        query: &str,
        filters: &FilterConfig,
        result_count: usize,
        at: DateTime<Utc>,
    ) -> SearchHistoryEntry {
        let mut g = self.lock();
        g.seq += 1;
        let entry = SearchHistoryEntry {
            id: format!("{}-{}", at.timestamp_millis(), g.seq),
            query: query.to_string(),
            filters: filters.clone(),
            timestamp: at,
            result_count,
        };
        g.entries.retain(|e| e.query != query);
        g.entries.insert(0, entry.clone());
        let cap = self.cap;
        g.entries.truncate(cap);
        self.persist(&g.entries);
        entry
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut g = self.lock();
        let before = g.entries.len();
        g.entries.retain(|e| e.id != id);
        let removed = g.entries.len() != before;
        if removed {
            self.persist(&g.entries);
        }
        removed
    }

    /// Drop every entry and the persisted copy.
    pub fn clear(&self) {
        let mut g = self.lock();
        g.entries.clear();
        if let Err(e) = self.store.remove(HISTORY_STORAGE_KEY) {
            warn!(target: "history", error = ?e, "failed to remove stored search history");
        }
    }

    pub fn entries(&self) -> Vec<SearchHistoryEntry> {
        self.lock().entries.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.lock().entries.iter().map(|e| e.query.clone()).collect()
    }

    /// Distinct queries among the `n` newest entries.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let g = self.lock();
        let mut out: Vec<String> = Vec::new();
        for e in g.entries.iter().take(n) {
            if !out.contains(&e.query) {
                out.push(e.query.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &[SearchHistoryEntry]) {
        let res = serde_json::to_string(entries)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(HISTORY_STORAGE_KEY, &json));
        if let Err(e) = res {
            warn!(target: "history", error = ?e, "failed to persist search history");
        }
    }
}
