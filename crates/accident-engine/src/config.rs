//! Engine configuration

use evidence::EvidenceConfig;
use serde::{Deserialize, Serialize};
use tracking::TrackingConfig;

use crate::EngineError;

/// Whole-clip sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Only raw frames whose index is a multiple of this are analysed
    pub frame_stride: u64,

    /// Raw frames below this index are analysed as static
    pub cold_start_frames: u64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            frame_stride: 10,
            cold_start_frames: 30,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pixel-evidence thresholds
    pub evidence: EvidenceConfig,

    /// Track store parameters
    pub tracking: TrackingConfig,

    /// Clip sampling
    pub clip: ClipConfig,

    /// Detections at or below this confidence are dropped on ingest
    pub min_detection_confidence: f32,

    /// Catastrophic branch ignores detections below this confidence
    pub catastrophic_confidence: f32,

    /// Heavy vehicle wider than this multiple of its height is on its side
    pub catastrophic_sideways_ratio: f32,

    /// Catastrophic ground contact: lower edge below this fraction of the frame
    pub catastrophic_ground_fraction: f32,

    /// Vehicles faster than this are moving
    pub low_motion_speed: f32,

    /// Scene is low-motion when fewer than this share of vehicles move
    pub low_motion_ratio: f32,

    /// IoU required for a static-scene collision
    pub static_collision_iou: f32,

    /// IoU required for a dynamic-scene collision
    pub dynamic_collision_iou: f32,

    /// Minimum aspect-ratio difference for an orientation mismatch
    pub orientation_aspect_diff: f32,

    /// Both boxes must exceed this size on their short side (pixels)
    pub orientation_min_dimension: i32,

    /// Buffer level that confirms an accident
    pub confirmation_threshold: u32,

    /// Buffer increment for a signalling near-static frame
    pub static_like_increment: u32,

    /// Buffer increment for a signalling dynamic frame
    pub dynamic_increment: u32,

    /// Buffer decrement for a quiet frame
    pub decay: u32,

    /// Non-heavy vehicles below this share of the frame area are not damage-checked
    pub small_vehicle_area: f32,

    /// Near-static fire scan: lower edge below this fraction of the frame
    pub fire_scan_fraction: f32,

    /// Stationary heavy-vehicle rollover score in near-static video
    pub stationary_rollover_score: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evidence: EvidenceConfig::default(),
            tracking: TrackingConfig::default(),
            clip: ClipConfig::default(),
            min_detection_confidence: 0.25,
            catastrophic_confidence: 0.4,
            catastrophic_sideways_ratio: 1.15,
            catastrophic_ground_fraction: 0.6,
            low_motion_speed: 2.0,
            low_motion_ratio: 0.2,
            static_collision_iou: 0.45,
            dynamic_collision_iou: 0.35,
            orientation_aspect_diff: 0.7,
            orientation_min_dimension: 40,
            confirmation_threshold: 5,
            static_like_increment: 3,
            dynamic_increment: 2,
            decay: 1,
            small_vehicle_area: 0.003,
            fire_scan_fraction: 0.5,
            stationary_rollover_score: 0.75,
        }
    }
}

impl EngineConfig {
    /// Require more evidence before anything is confirmed
    pub fn strict() -> Self {
        Self {
            min_detection_confidence: 0.4,
            catastrophic_confidence: 0.55,
            confirmation_threshold: 7,
            stationary_rollover_score: 0.85,
            ..Default::default()
        }
    }

    /// Confirm sooner on weaker evidence
    pub fn lenient() -> Self {
        Self {
            min_detection_confidence: 0.2,
            catastrophic_confidence: 0.3,
            confirmation_threshold: 4,
            stationary_rollover_score: 0.7,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.evidence.validate()?;
        self.tracking.validate()?;

        let ratios = [
            ("min_detection_confidence", self.min_detection_confidence),
            ("catastrophic_confidence", self.catastrophic_confidence),
            ("catastrophic_ground_fraction", self.catastrophic_ground_fraction),
            ("low_motion_ratio", self.low_motion_ratio),
            ("static_collision_iou", self.static_collision_iou),
            ("dynamic_collision_iou", self.dynamic_collision_iou),
            ("small_vehicle_area", self.small_vehicle_area),
            ("fire_scan_fraction", self.fire_scan_fraction),
            ("stationary_rollover_score", self.stationary_rollover_score),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.catastrophic_sideways_ratio <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "catastrophic_sideways_ratio must be positive".into(),
            ));
        }
        if self.low_motion_speed < 0.0 {
            return Err(EngineError::InvalidConfig(
                "low_motion_speed must not be negative".into(),
            ));
        }
        if self.confirmation_threshold == 0 {
            return Err(EngineError::InvalidConfig(
                "confirmation_threshold must be at least 1".into(),
            ));
        }
        if self.static_like_increment == 0 || self.dynamic_increment == 0 {
            return Err(EngineError::InvalidConfig(
                "buffer increments must be at least 1".into(),
            ));
        }
        if self.clip.frame_stride == 0 {
            return Err(EngineError::InvalidConfig("frame_stride must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::strict().validate().is_ok());
        assert!(EngineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_presets_order() {
        let strict = EngineConfig::strict();
        let lenient = EngineConfig::lenient();
        assert!(strict.confirmation_threshold > lenient.confirmation_threshold);
        assert!(strict.min_detection_confidence > lenient.min_detection_confidence);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = EngineConfig {
            static_collision_iou: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let config = EngineConfig {
            clip: ClipConfig {
                frame_stride: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.tracking.frame_interval = 0.0;
        assert!(matches!(config.validate(), Err(EngineError::Tracking(_))));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"confirmation_threshold": 6, "clip": {"frame_stride": 5}}"#).unwrap();
        assert_eq!(config.confirmation_threshold, 6);
        assert_eq!(config.clip.frame_stride, 5);
        assert_eq!(config.clip.cold_start_frames, 30);
        assert_eq!(config.min_detection_confidence, 0.25);
    }
}
