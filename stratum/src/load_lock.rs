//! Per-name load-once table.
//!
//! Each name gets its own slot, created lazily and never removed. A slot holds
//! the settled outcome in a `OnceLock`, readable without blocking, and a
//! mutex held only while the first load runs. Concurrent callers for the same
//! name wait on that mutex and then read the memoized outcome. Callers for
//! different names only share the map shard long enough to fetch their slot.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::core::types::Definition;
use crate::error::Result;

/// Memoized outcome of one name: a definition or a terminal failure.
pub type Outcome = Result<Arc<Definition>>;

#[derive(Debug, Default)]
struct Slot {
    settled: OnceLock<Outcome>,
    loading: Mutex<()>,
}

#[derive(Debug, Default)]
pub struct LoadTable {
    slots: DashMap<String, Arc<Slot>>,
}

impl LoadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `load` at most once for `name`; every caller observes the same outcome.
    ///
    /// `load` runs while this name's slot is locked. It must not resolve the
    /// same name on the same table again.
    pub fn load_once<F>(&self, name: &str, load: F) -> Outcome
    where
        F: FnOnce() -> Outcome,
    {
        let slot = self.slot(name);
        if let Some(outcome) = slot.settled.get() {
            return outcome.clone();
        }
        let _loading = slot.loading.lock();
        slot.settled.get_or_init(load).clone()
    }

    /// Memoized outcome, without waiting for an in-flight load.
    pub fn peek(&self, name: &str) -> Option<Outcome> {
        self.slots.get(name)?.settled.get().cloned()
    }

    /// Number of names that have a slot, settled or in flight.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // The map guard is dropped before the slot is locked.
    fn slot(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(name) {
            return Arc::clone(&slot);
        }
        Arc::clone(&self.slots.entry(name.to_string()).or_default())
    }
}
