//! Track State Store
//!
//! Kinematic memory for tracker identifiers:
//! - Centroid displacement speed and clamped acceleration per identifier
//! - Consecutive-presence debounce promoting identifiers to unique objects
//! - Cumulative per-class counts of promoted objects

pub mod registry;
pub mod state;
pub mod store;

pub use registry::UniqueRegistry;
pub use state::{Kinematics, TrackState};
pub use store::{Observation, TrackStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tracking error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Invalid tracking configuration: {0}")]
    InvalidConfig(String),
}

/// Tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Speed assigned to an identifier without a previous-frame centroid
    pub new_track_speed: f32,
    /// Frame interval dividing the speed delta into an acceleration
    pub frame_interval: f32,
    /// Accelerations beyond this magnitude are tracker noise and zeroed
    pub max_acceleration: f32,
    /// Consecutive frames an identifier must exceed to count as unique
    pub promotion_frames: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            new_track_speed: 10.0,
            frame_interval: 10.0,
            max_acceleration: 50.0,
            promotion_frames: 15,
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.frame_interval <= 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "frame_interval must be positive, got {}",
                self.frame_interval
            )));
        }
        if self.max_acceleration <= 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "max_acceleration must be positive, got {}",
                self.max_acceleration
            )));
        }
        if self.new_track_speed < 0.0 {
            return Err(TrackingError::InvalidConfig(
                "new_track_speed must not be negative".into(),
            ));
        }
        Ok(())
    }
}
