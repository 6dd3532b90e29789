//! Unique-object registry

use std::collections::{BTreeMap, HashSet};

use frame::ObjectClass;

/// Identifiers promoted to genuine objects and their per-class totals
#[derive(Debug, Clone, Default)]
pub struct UniqueRegistry {
    ids: HashSet<u32>,
    counts: BTreeMap<ObjectClass, u32>,
}

impl UniqueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `track_id` once; returns `true` only on first promotion
    pub fn promote(&mut self, track_id: u32, class: ObjectClass) -> bool {
        if !self.ids.insert(track_id) {
            return false;
        }
        *self.counts.entry(class).or_insert(0) += 1;
        true
    }

    pub fn contains(&self, track_id: u32) -> bool {
        self.ids.contains(&track_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Cumulative counts per class
    pub fn counts(&self) -> &BTreeMap<ObjectClass, u32> {
        &self.counts
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.counts.clear();
    }
}
