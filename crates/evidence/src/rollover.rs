//! Rollover likelihood and the combined damage-or-rollover decision

use frame::{BoundingBox, ObjectClass, VideoFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::{assess_damage, enhanced_edges};
use crate::EvidenceConfig;

const SIDEWAYS_WEIGHT: f32 = 0.4;
const GROUND_CONTACT_WEIGHT: f32 = 0.3;
const STATIONARY_WEIGHT: f32 = 0.2;
const DISRUPTION_WEIGHT: f32 = 0.1;

/// Kind of per-vehicle structural evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructuralKind {
    Rollover,
    Damaged,
}

/// Outcome of the combined damage-or-rollover check
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageVerdict {
    /// `None` when nothing was flagged
    pub kind: Option<StructuralKind>,
    /// Rollover score or edge density behind the decision
    pub confidence: f32,
}

impl DamageVerdict {
    pub const NONE: DamageVerdict = DamageVerdict {
        kind: None,
        confidence: 0.0,
    };

    fn flag(kind: StructuralKind, confidence: f32) -> Self {
        Self {
            kind: Some(kind),
            confidence,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.kind.is_some()
    }

    pub fn is_rollover(&self) -> bool {
        self.kind == Some(StructuralKind::Rollover)
    }

    pub fn is_damaged(&self) -> bool {
        self.kind == Some(StructuralKind::Damaged)
    }
}

/// Additive rollover score in [0, 1].
///
/// Sideways silhouette, ground contact, standing still and visible edge
/// disruption each add a fixed weight. Persons always score 0.
pub fn rollover_confidence(
    frame: &VideoFrame,
    bbox: &BoundingBox,
    class: ObjectClass,
    speed: f32,
    is_static: bool,
    config: &EvidenceConfig,
) -> f32 {
    if class == ObjectClass::Person {
        return 0.0;
    }
    let Some(region) = frame.region(bbox) else {
        return 0.0;
    };

    let mut score = 0.0;

    let aspect = region.width() as f32 / region.height() as f32;
    let (upright_min, upright_max) = config.upright_aspect;
    if aspect > upright_max || aspect < upright_min {
        score += SIDEWAYS_WEIGHT;
    }

    if bbox.bottom_below(frame.height, config.rollover_ground_fraction) {
        score += GROUND_CONTACT_WEIGHT;
    }

    if is_static || speed < config.stationary_speed {
        score += STATIONARY_WEIGHT;
    }

    let edges = enhanced_edges(&region, config.rollover_canny, config);
    if edges.density() > config.rollover_edge_density {
        score += DISRUPTION_WEIGHT;
    }

    f32::min(score, 1.0)
}

/// Combined check: rollover first, then structural damage.
///
/// Static scenes only accept heavy-vehicle rollovers. Moving scenes accept
/// heavy vehicles on score alone; cars also need visible edge disruption.
pub fn damaged_or_rollover(
    frame: &VideoFrame,
    bbox: &BoundingBox,
    class: ObjectClass,
    speed: f32,
    is_static: bool,
    config: &EvidenceConfig,
) -> DamageVerdict {
    if class == ObjectClass::Person {
        return DamageVerdict::NONE;
    }
    let Some(region) = frame.region(bbox) else {
        return DamageVerdict::NONE;
    };

    let score = rollover_confidence(frame, bbox, class, speed, is_static, config);

    if is_static {
        if class.is_heavy() && score >= config.static_rollover_score {
            debug!(%class, score, "static heavy-vehicle rollover");
            return DamageVerdict::flag(StructuralKind::Rollover, score);
        }
    } else if score >= config.dynamic_rollover_score {
        if class.is_heavy() {
            debug!(%class, score, "heavy-vehicle rollover");
            return DamageVerdict::flag(StructuralKind::Rollover, score);
        }
        if class == ObjectClass::Car {
            let density = enhanced_edges(&region, config.damage_canny, config).density();
            if density >= config.car_rollover_edge_density {
                debug!(score, density, "car rollover with visible damage");
                return DamageVerdict::flag(StructuralKind::Rollover, score);
            }
            debug!(score, density, "car rollover candidate without visible damage");
        }
    }

    match assess_damage(&region, class, is_static, config) {
        Some(density) => DamageVerdict::flag(StructuralKind::Damaged, density),
        None => DamageVerdict::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame() -> VideoFrame {
        VideoFrame::filled(640, 480, [90, 90, 90])
    }

    #[test]
    fn test_person_scores_zero() {
        let bbox = BoundingBox::new(100, 400, 400, 470);
        let config = EvidenceConfig::default();
        assert_eq!(rollover_confidence(&frame(), &bbox, ObjectClass::Person, 0.0, true, &config), 0.0);
        assert!(!damaged_or_rollover(&frame(), &bbox, ObjectClass::Person, 0.0, true, &config).is_flagged());
    }

    #[test]
    fn test_sideways_grounded_stationary() {
        // 300x70 box, bottom at 470 of 480, flat colour (no edges)
        let bbox = BoundingBox::new(100, 400, 400, 470);
        let score = rollover_confidence(&frame(), &bbox, ObjectClass::Bus, 0.0, true, &EvidenceConfig::default());
        assert!((score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_upright_moving_vehicle() {
        // 100x80, high in frame, moving
        let bbox = BoundingBox::new(100, 50, 200, 130);
        let score = rollover_confidence(&frame(), &bbox, ObjectClass::Car, 12.0, false, &EvidenceConfig::default());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_static_car_never_rolls_over() {
        let bbox = BoundingBox::new(100, 400, 400, 470);
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Car, 0.0, true, &EvidenceConfig::default());
        assert!(!verdict.is_rollover());
    }

    #[test]
    fn test_static_heavy_rollover() {
        let bbox = BoundingBox::new(100, 400, 400, 470);
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Truck, 0.0, true, &EvidenceConfig::default());
        assert!(verdict.is_rollover());
        assert!((verdict.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_dynamic_heavy_rollover_threshold() {
        let config = EvidenceConfig::default();
        let bbox = BoundingBox::new(100, 400, 400, 470);
        // Sideways + ground + slow = 0.9
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Bus, 0.5, false, &config);
        assert!(verdict.is_rollover());
        // Moving: 0.7 < 0.8
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Bus, 5.0, false, &config);
        assert!(!verdict.is_rollover());
    }

    #[test]
    fn test_dynamic_car_rollover_needs_edges() {
        let bbox = BoundingBox::new(100, 400, 400, 470);
        // Flat region: score 0.9 but no visible damage
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Car, 0.0, false, &EvidenceConfig::default());
        assert!(!verdict.is_flagged());
    }

    #[test]
    fn test_dynamic_car_rollover_with_forced_edge_gate() {
        let config = EvidenceConfig {
            car_rollover_edge_density: 0.0,
            ..Default::default()
        };
        let bbox = BoundingBox::new(100, 400, 400, 470);
        let verdict = damaged_or_rollover(&frame(), &bbox, ObjectClass::Car, 0.0, false, &config);
        assert!(verdict.is_rollover());
    }

    proptest! {
        #[test]
        fn prop_extractors_are_total(
            x in -100i32..700, y in -100i32..600, w in -20i32..400, h in -20i32..400,
            speed in 0.0f32..50.0, is_static in any::<bool>(),
        ) {
            let frame = VideoFrame::filled(64, 48, [120, 60, 30]);
            let bbox = BoundingBox::new(x / 10, y / 10, x / 10 + w / 10, y / 10 + h / 10);
            let config = EvidenceConfig::default();
            let score = rollover_confidence(&frame, &bbox, ObjectClass::Truck, speed, is_static, &config);
            prop_assert!((0.0..=1.0).contains(&score));
            let _ = damaged_or_rollover(&frame, &bbox, ObjectClass::Car, speed, is_static, &config);
        }
    }
}
