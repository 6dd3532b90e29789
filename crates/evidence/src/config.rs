//! Evidence extractor configuration

use serde::{Deserialize, Serialize};

use crate::EvidenceError;

/// Thresholds for the pixel-evidence extractors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Fire-hue ratio above which the region is treated as glare
    pub fire_glare_ratio: f32,
    /// Fire-hue ratio that is sufficient on its own
    pub fire_strong_ratio: f32,
    /// Fire-hue ratio that needs smoke corroboration
    pub fire_moderate_ratio: f32,
    /// Smoke ratio corroborating a moderate fire signature
    pub smoke_ratio: f32,

    /// Minimum colour area for a traffic-light classification
    pub signal_min_ratio: f32,

    /// Contrast-limited equalisation clip limit
    pub clahe_clip_limit: f32,
    /// Equalisation tile grid (tiles per axis)
    pub clahe_tiles: u32,

    /// Canny thresholds for damage edge maps
    pub damage_canny: (f32, f32),
    /// Canny thresholds for the rollover disruption cue
    pub rollover_canny: (f32, f32),

    /// Densest quadrant must exceed this multiple of the mean
    pub localized_dominance: f32,
    /// Densest quadrant absolute floor
    pub localized_floor: f32,
    /// Quadrant density that flags damage in static scenes
    pub static_quadrant_density: f32,
    /// Whole-region density threshold, static scenes
    pub static_damage_density: f32,
    /// Whole-region density threshold, dynamic scenes
    pub dynamic_damage_density: f32,
    /// Added to the density threshold for buses
    pub bus_damage_bonus: f32,

    /// Aspect ratio band of an upright vehicle (width / height)
    pub upright_aspect: (f32, f32),
    /// Lower edge below this fraction of frame height counts as ground contact
    pub rollover_ground_fraction: f32,
    /// Speed under which an object counts as stationary
    pub stationary_speed: f32,
    /// Edge density adding structural disruption to the rollover score
    pub rollover_edge_density: f32,
    /// Rollover score flagging a heavy vehicle in a static scene
    pub static_rollover_score: f32,
    /// Rollover score flagging a vehicle in a dynamic scene
    pub dynamic_rollover_score: f32,
    /// Edge density a car needs before a dynamic rollover is accepted
    pub car_rollover_edge_density: f32,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            fire_glare_ratio: 0.60,
            fire_strong_ratio: 0.35,
            fire_moderate_ratio: 0.15,
            smoke_ratio: 0.25,
            signal_min_ratio: 0.05,
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            damage_canny: (25.0, 75.0),
            rollover_canny: (80.0, 160.0),
            localized_dominance: 2.2,
            localized_floor: 0.15,
            static_quadrant_density: 0.12,
            static_damage_density: 0.18,
            dynamic_damage_density: 0.35,
            bus_damage_bonus: 0.20,
            upright_aspect: (0.45, 1.6),
            rollover_ground_fraction: 0.65,
            stationary_speed: 1.0,
            rollover_edge_density: 0.22,
            static_rollover_score: 0.70,
            dynamic_rollover_score: 0.80,
            car_rollover_edge_density: 0.25,
        }
    }
}

impl EvidenceConfig {
    /// Reject values that would make an extractor meaningless
    pub fn validate(&self) -> Result<(), EvidenceError> {
        let ratios = [
            ("fire_glare_ratio", self.fire_glare_ratio),
            ("fire_strong_ratio", self.fire_strong_ratio),
            ("fire_moderate_ratio", self.fire_moderate_ratio),
            ("smoke_ratio", self.smoke_ratio),
            ("signal_min_ratio", self.signal_min_ratio),
            ("localized_floor", self.localized_floor),
            ("static_quadrant_density", self.static_quadrant_density),
            ("static_damage_density", self.static_damage_density),
            ("dynamic_damage_density", self.dynamic_damage_density),
            ("rollover_ground_fraction", self.rollover_ground_fraction),
            ("rollover_edge_density", self.rollover_edge_density),
            ("static_rollover_score", self.static_rollover_score),
            ("dynamic_rollover_score", self.dynamic_rollover_score),
            ("car_rollover_edge_density", self.car_rollover_edge_density),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvidenceError::InvalidConfig(format!(
                    "{field} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.clahe_tiles == 0 {
            return Err(EvidenceError::InvalidConfig("clahe_tiles must be positive".into()));
        }
        if self.clahe_clip_limit <= 0.0 {
            return Err(EvidenceError::InvalidConfig(
                "clahe_clip_limit must be positive".into(),
            ));
        }
        if self.upright_aspect.0 >= self.upright_aspect.1 {
            return Err(EvidenceError::InvalidConfig(format!(
                "upright_aspect band is empty: {:?}",
                self.upright_aspect
            )));
        }
        for (field, (low, high)) in [
            ("damage_canny", self.damage_canny),
            ("rollover_canny", self.rollover_canny),
        ] {
            if low < 0.0 || high < low {
                return Err(EvidenceError::InvalidConfig(format!(
                    "{field} thresholds must satisfy 0 <= low <= high"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EvidenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_ratio_out_of_range() {
        let config = EvidenceConfig {
            smoke_ratio: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_aspect_band() {
        let config = EvidenceConfig {
            upright_aspect: (2.0, 1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
