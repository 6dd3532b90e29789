//! Per-identifier state

use serde::{Deserialize, Serialize};

const SUDDEN_DECELERATION: f32 = -8.0;
const SUDDEN_DECELERATION_MAX_SPEED: f32 = 6.0;
const STOP_SPEED: f32 = 2.0;
const STOP_JOLT: f32 = 6.0;

/// Speed and acceleration of one object in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Centroid displacement, pixels per analysed frame
    pub speed: f32,
    /// Speed change per frame interval
    pub acceleration: f32,
}

impl Kinematics {
    /// Sudden deceleration to low speed, or a hard stop
    pub fn is_crash_motion(&self) -> bool {
        let sudden_deceleration =
            self.acceleration < SUDDEN_DECELERATION && self.speed < SUDDEN_DECELERATION_MAX_SPEED;
        let sudden_stop = self.speed < STOP_SPEED && self.acceleration.abs() > STOP_JOLT;
        sudden_deceleration || sudden_stop
    }
}

/// Stored state of a tracker identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    /// Centroid in the frame it was last seen
    pub last_centroid: (f32, f32),
    /// Kinematics computed in that frame
    pub kinematics: Kinematics,
    /// Store frame index of the last observation
    pub last_frame: u64,
    /// Length of the current run of consecutive observations
    pub consecutive_frames: u32,
}
