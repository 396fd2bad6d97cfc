//! Per-video completion percentages shared between transfers and the
//! `/progress` poll endpoint.
//!
//! Entries are keyed by video identifier only. Two transfers for the same
//! identifier write to the same entry and the last writer wins; pollers may
//! observe a value produced by either transfer.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Process-wide progress map
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    entries: Arc<RwLock<HashMap<String, f64>>>,
}

impl ProgressStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the percentage for `id`. The value is not clamped.
    pub fn set(&self, id: &str, value: f64) {
        debug!("📈 Progress {} -> {:.1}", id, value);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(id.to_string(), value);
    }

    /// Remove the entry for `id`; a missing entry is not an error
    pub fn clear(&self, id: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(id);
    }

    /// Current percentage for `id`, or 0 when nothing is tracked
    pub fn get(&self, id: &str) -> f64 {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).copied().unwrap_or(0.0)
    }

    /// Whether an entry exists for `id`
    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(id)
    }

    /// Clear `id` now and again when the returned guard is dropped
    pub fn track(&self, id: &str) -> ProgressGuard {
        self.clear(id);
        ProgressGuard {
            store: self.clone(),
            id: id.to_string(),
        }
    }
}

/// Clears a progress entry when dropped, whichever way the owning operation ends.
#[derive(Debug)]
pub struct ProgressGuard {
    store: ProgressStore,
    id: String,
}

impl ProgressGuard {
    pub fn set(&self, value: f64) {
        self.store.set(&self.id, value);
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.store.clear(&self.id);
    }
}
