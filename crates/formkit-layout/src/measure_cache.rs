//! Component measurement cache.
//!
//! Asking the host for a component's minimum or preferred size can be
//! expensive, and one layout pass needs each size several times (track
//! resolution, span reconciliation, cell alignment). A grid keeps one cache
//! for all of its passes.
//!
//! # Design
//!
//! The cache uses epoch-based invalidation: entries are tagged with the epoch
//! they were stored in, and [`MeasureCache::invalidate`] moves to a new epoch,
//! making every earlier entry stale. Hosts call it (through the grid) when
//! component content or styles change.
//!
//! Cache keys are composed of:
//! - Component handle
//! - Axis (width or height)
//! - Measure kind (minimum or preferred)
//!
//! The cache is single-threaded interior-mutable state, so a grid holding it is
//! `!Sync`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;

use formkit_spec::Axis;

use crate::MeasureKind;

/// Cache key for measurement lookups.
type CacheKey<C> = (C, Axis, MeasureKind);

/// Cache entry with epoch tag for invalidation.
type CacheEntry = (usize, i32); // (epoch, value)

/// Lookup counters for debugging and profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub lookups: usize,
    pub hits: usize,
    pub stores: usize,
}

#[derive(Debug, Clone)]
pub struct MeasureCache<C> {
    epoch: Cell<usize>,
    entries: RefCell<HashMap<CacheKey<C>, CacheEntry>>,
    stats: Cell<CacheStats>,
}

impl<C> Default for MeasureCache<C> {
    fn default() -> Self {
        Self {
            epoch: Cell::new(1),
            entries: RefCell::new(HashMap::new()),
            stats: Cell::new(CacheStats::default()),
        }
    }
}

impl<C: Clone + Eq + Hash> MeasureCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_epoch(&self) -> usize {
        self.epoch.get()
    }

    /// Start a new epoch. Every stored measurement becomes stale and is
    /// overwritten by the next store for its key.
    pub fn invalidate(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    /// Look up a cached measurement.
    ///
    /// # Returns
    /// The cached value if found and not stale, or None if not cached.
    pub fn lookup(&self, component: &C, axis: Axis, kind: MeasureKind) -> Option<i32> {
        self.update_stats(|stats| stats.lookups += 1);

        let epoch = self.epoch.get();
        let key = (component.clone(), axis, kind);
        let value = self
            .entries
            .borrow()
            .get(&key)
            .and_then(|(entry_epoch, value)| (*entry_epoch == epoch).then_some(*value));

        if value.is_some() {
            self.update_stats(|stats| stats.hits += 1);
        }
        value
    }

    /// Store a measurement for the current epoch.
    pub fn store(&self, component: &C, axis: Axis, kind: MeasureKind, value: i32) {
        let key = (component.clone(), axis, kind);
        self.entries
            .borrow_mut()
            .insert(key, (self.epoch.get(), value));
        self.update_stats(|stats| stats.stores += 1);
    }

    /// Drop every measurement of one component.
    pub fn forget(&self, component: &C) {
        self.entries
            .borrow_mut()
            .retain(|(cached, _, _), _| cached != component);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(CacheStats::default());
    }

    /// Clear all entries, reset the epoch and the counters.
    pub fn clear_all(&self) {
        self.epoch.set(1);
        self.entries.borrow_mut().clear();
        self.reset_stats();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn update_stats(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}
