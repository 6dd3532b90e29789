//! Per-frame evidence tally

use std::collections::BTreeSet;

use frame::ObjectClass;
use serde::{Deserialize, Serialize};

use crate::AccidentType;

/// Evidence accumulated by one multi-evidence evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceTally {
    /// Vehicles flagged as structurally damaged
    pub damage_votes: u32,
    /// Vehicles flagged as rolled over
    pub rollover_votes: u32,
    /// Classes of the vehicles behind the rollover votes
    pub rollover_classes: Vec<ObjectClass>,
    pub fire_detected: bool,
    pub colliding_pairs: BTreeSet<(usize, usize)>,
}

impl EvidenceTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rollover(&mut self, class: ObjectClass) {
        self.rollover_votes += 1;
        self.rollover_classes.push(class);
    }

    pub fn has_collision(&self) -> bool {
        !self.colliding_pairs.is_empty()
    }

    /// A bus or truck rolled over
    pub fn heavy_rollover(&self) -> bool {
        self.rollover_classes.iter().any(ObjectClass::is_heavy)
    }

    /// Heavy rollovers stand on their own; car rollovers need damage or a collision
    pub fn rollover_corroborated(&self) -> bool {
        if self.rollover_votes == 0 {
            return false;
        }
        self.heavy_rollover() || self.damage_votes >= 1 || self.has_collision()
    }

    /// Evidence units present, highest priority first
    pub fn units(&self) -> Vec<AccidentType> {
        let mut units = Vec::with_capacity(4);
        if self.fire_detected {
            units.push(AccidentType::Fire);
        }
        if self.rollover_corroborated() {
            units.push(AccidentType::Rollover);
        }
        if self.damage_votes >= 2 {
            units.push(AccidentType::Damaged);
        }
        if self.has_collision() {
            units.push(AccidentType::Collision);
        }
        units
    }

    pub fn evidence_count(&self) -> u32 {
        self.units().len() as u32
    }

    /// Class blamed for a rollover verdict, heavy vehicles first
    pub fn rollover_class(&self) -> Option<ObjectClass> {
        self.rollover_classes
            .iter()
            .copied()
            .find(ObjectClass::is_heavy)
            .or_else(|| self.rollover_classes.first().copied())
    }
}
