//! Keyed track store

use std::collections::{BTreeMap, HashMap};

use frame::{BoundingBox, ObjectClass};
use tracing::{debug, trace};

use crate::registry::UniqueRegistry;
use crate::state::{Kinematics, TrackState};
use crate::{TrackingConfig, TrackingError};

/// Result of observing one identifier in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub kinematics: Kinematics,
    /// Identifier crossed the debounce threshold in this frame
    pub promoted: bool,
}

/// Track memory owned by one engine instance.
///
/// Entries are inserted on first sight and updated on every later sight.
/// Nothing is evicted; identifiers that stop appearing simply go stale.
#[derive(Debug, Clone)]
pub struct TrackStore {
    config: TrackingConfig,
    tracks: HashMap<u32, TrackState>,
    registry: UniqueRegistry,
    /// Index of the frame being observed (1-based once started)
    frame: u64,
}

impl TrackStore {
    pub fn new(config: TrackingConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self {
            config,
            tracks: HashMap::new(),
            registry: UniqueRegistry::new(),
            frame: 0,
        })
    }

    /// Advance to the next frame; call once before its observations
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Update kinematics and presence of `track_id` seen at `bbox`.
    ///
    /// A repeated identifier within one frame keeps its first observation.
    pub fn observe(&mut self, track_id: u32, bbox: &BoundingBox, class: ObjectClass) -> Observation {
        let centroid = bbox.centroid();
        let frame = self.frame;

        let (kinematics, consecutive) = match self.tracks.get(&track_id) {
            Some(state) if state.last_frame == frame => {
                return Observation {
                    kinematics: state.kinematics,
                    promoted: false,
                };
            }
            Some(state) if state.last_frame + 1 == frame => {
                let dx = centroid.0 - state.last_centroid.0;
                let dy = centroid.1 - state.last_centroid.1;
                let speed = (dx * dx + dy * dy).sqrt();
                let acceleration = self.clamp_acceleration(
                    (speed - state.kinematics.speed) / self.config.frame_interval,
                );
                (Kinematics { speed, acceleration }, state.consecutive_frames + 1)
            }
            Some(state) => {
                // back after a gap: fresh speed, acceleration against the stored one
                let speed = self.config.new_track_speed;
                let acceleration = self.clamp_acceleration(
                    (speed - state.kinematics.speed) / self.config.frame_interval,
                );
                (Kinematics { speed, acceleration }, 1)
            }
            None => (
                Kinematics {
                    speed: self.config.new_track_speed,
                    acceleration: 0.0,
                },
                1,
            ),
        };

        trace!(track_id, speed = kinematics.speed, acceleration = kinematics.acceleration, "track update");

        self.tracks.insert(
            track_id,
            TrackState {
                last_centroid: centroid,
                kinematics,
                last_frame: frame,
                consecutive_frames: consecutive,
            },
        );

        let promoted = consecutive > self.config.promotion_frames && self.registry.promote(track_id, class);
        if promoted {
            debug!(track_id, %class, "track promoted to unique object");
        }

        Observation { kinematics, promoted }
    }

    fn clamp_acceleration(&self, acceleration: f32) -> f32 {
        if acceleration.abs() > self.config.max_acceleration {
            0.0
        } else {
            acceleration
        }
    }

    pub fn get(&self, track_id: u32) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn registry(&self) -> &UniqueRegistry {
        &self.registry
    }

    /// Debounced per-class totals
    pub fn unique_counts(&self) -> &BTreeMap<ObjectClass, u32> {
        self.registry.counts()
    }

    /// Forget every identifier and count
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.registry.clear();
        self.frame = 0;
    }
}

impl Default for TrackStore {
    fn default() -> Self {
        Self {
            config: TrackingConfig::default(),
            tracks: HashMap::new(),
            registry: UniqueRegistry::new(),
            frame: 0,
        }
    }
}
