//! Evidence aggregation strategies
//!
//! The scene mode selects exactly one strategy per frame. Static frames only
//! look for unambiguous catastrophes; video frames vote over several kinds of
//! evidence before anything is signalled.

use frame::ObjectClass;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collision::colliding_pairs;
use crate::context::FrameContext;
use crate::{AccidentType, AccidentVerdict, EngineConfig, EvidenceTally, SceneMode, Severity};

/// Evidence rules of the multi-evidence strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidencePolicy {
    /// Static collision rule, damage checked on every vehicle
    NearStatic,
    /// Dynamic collision rule, damage checked only on crash-motion vehicles
    Dynamic,
}

/// Aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "policy")]
pub enum Strategy {
    Catastrophic,
    MultiEvidence(EvidencePolicy),
}

impl Strategy {
    pub fn for_scene(scene: SceneMode) -> Self {
        match scene {
            SceneMode::Static => Self::Catastrophic,
            SceneMode::NearStatic => Self::MultiEvidence(EvidencePolicy::NearStatic),
            SceneMode::Dynamic => Self::MultiEvidence(EvidencePolicy::Dynamic),
        }
    }

    /// Evaluate one frame.
    ///
    /// `already_confirmed` enables the dynamic fire scan on frames that do not
    /// signal by themselves.
    pub fn evaluate(
        &self,
        ctx: &FrameContext<'_>,
        config: &EngineConfig,
        already_confirmed: bool,
    ) -> Assessment {
        match self {
            Self::Catastrophic => catastrophic(ctx, config),
            Self::MultiEvidence(policy) => multi_evidence(*policy, ctx, config, already_confirmed),
        }
    }
}

/// Result of one strategy evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub verdict: AccidentVerdict,
    pub tally: EvidenceTally,
    /// Confirms immediately, bypassing the confirmation buffer
    pub self_confirming: bool,
    pub evidence_count: u32,
}

fn catastrophic(ctx: &FrameContext<'_>, config: &EngineConfig) -> Assessment {
    let height = ctx.frame_height();

    for (i, fd) in ctx.detections.iter().enumerate() {
        let det = &fd.detection;
        if det.confidence < config.catastrophic_confidence || !det.class.is_accident_vehicle() {
            continue;
        }
        if det.bbox.is_empty() {
            continue;
        }
        let grounded = det.bbox.bottom_below(height, config.catastrophic_ground_fraction);
        if !grounded {
            continue;
        }

        let mut tally = EvidenceTally::new();
        let sideways =
            det.bbox.width() as f32 > det.bbox.height() as f32 * config.catastrophic_sideways_ratio;

        let verdict = if det.class.is_heavy() && sideways {
            tally.record_rollover(det.class);
            AccidentVerdict::signal(
                AccidentType::Rollover,
                Severity::Critical,
                format!("{} on its side at ground level", det.class),
            )
        } else if ctx.fire(i) {
            tally.fire_detected = true;
            AccidentVerdict::signal(
                AccidentType::Fire,
                Severity::Critical,
                format!("{} on fire at ground level", det.class),
            )
        } else {
            continue;
        };

        debug!(index = i, class = %det.class, kind = ?verdict.accident_type, "catastrophic hit");
        return Assessment {
            verdict,
            tally,
            self_confirming: true,
            evidence_count: 1,
        };
    }

    Assessment::default()
}

fn multi_evidence(
    policy: EvidencePolicy,
    ctx: &FrameContext<'_>,
    config: &EngineConfig,
    already_confirmed: bool,
) -> Assessment {
    let mut tally = EvidenceTally::new();
    tally.colliding_pairs = colliding_pairs(ctx, config);

    match policy {
        EvidencePolicy::NearStatic => {
            let height = ctx.frame_height();
            let fraction = config.fire_scan_fraction;
            tally.fire_detected = ctx
                .indices_where(move |d| {
                    d.detection.class.is_accident_vehicle() && d.detection.bbox.bottom_below(height, fraction)
                })
                .any(|i| ctx.fire(i));

            let min_area = config.small_vehicle_area as f64 * ctx.frame_area() as f64;
            let vehicles: Vec<usize> = ctx
                .indices_where(|d| d.detection.class.is_accident_vehicle())
                .collect();
            for i in vehicles {
                let det = &ctx.detections[i].detection;
                if !det.class.is_heavy() && (det.bbox.area() as f64) < min_area {
                    debug!(index = i, class = %det.class, "skipping small vehicle");
                    continue;
                }
                record_structural(&mut tally, ctx, i);
            }
        }
        EvidencePolicy::Dynamic => {
            let crashing: Vec<usize> = ctx
                .indices_where(|d| d.detection.class.is_accident_vehicle() && d.kinematics.is_crash_motion())
                .collect();
            for i in crashing {
                record_structural(&mut tally, ctx, i);
            }
        }
    }

    let mut verdict = resolve(&tally);
    // units that drove the verdict; a dynamic fire scan only upgrades it
    let mut evidence_count = tally.evidence_count();

    if policy == EvidencePolicy::Dynamic && (verdict.signal || already_confirmed) {
        tally.fire_detected = ctx
            .indices_where(|d| d.detection.class.is_accident_vehicle())
            .any(|i| ctx.fire(i));
        if tally.fire_detected && verdict.upgrade_to_fire() {
            debug!("fire upgrades the frame verdict");
        }
    }

    if policy == EvidencePolicy::NearStatic && !verdict.signal {
        if let Some((i, class, score)) = stationary_heavy_rollover(ctx, config) {
            debug!(index = i, %class, score, "stationary overturned vehicle");
            tally.record_rollover(class);
            tally.damage_votes = tally.damage_votes.max(1);
            evidence_count = tally.evidence_count();
            verdict = AccidentVerdict::signal(
                AccidentType::Rollover,
                Severity::Critical,
                "Vehicle overturned and stationary",
            );
        }
    }

    let verdict = rollover_gate(verdict.with_type_fallback(), &tally);

    Assessment {
        verdict,
        tally,
        self_confirming: false,
        evidence_count,
    }
}

fn record_structural(tally: &mut EvidenceTally, ctx: &FrameContext<'_>, index: usize) {
    let structural = ctx.structural(index);
    let class = ctx.detections[index].detection.class;
    if structural.is_damaged() {
        tally.damage_votes += 1;
        debug!(index, %class, confidence = structural.confidence, "damage vote");
    } else if structural.is_rollover() {
        tally.record_rollover(class);
        debug!(index, %class, confidence = structural.confidence, "rollover vote");
    }
}

fn stationary_heavy_rollover(
    ctx: &FrameContext<'_>,
    config: &EngineConfig,
) -> Option<(usize, ObjectClass, f32)> {
    ctx.indices_where(|d| d.detection.class.is_heavy()).find_map(|i| {
        let score = ctx.stationary_rollover_confidence(i);
        (score >= config.stationary_rollover_score).then(|| (i, ctx.detections[i].detection.class, score))
    })
}

/// Type and severity from the evidence units
fn resolve(tally: &EvidenceTally) -> AccidentVerdict {
    let units = tally.units();
    let Some(&top) = units.first() else {
        return AccidentVerdict::none();
    };
    let corroborated = units.len() >= 2;

    let severity = if top.is_catastrophic() || corroborated {
        Severity::Critical
    } else {
        Severity::Low
    };

    let base = match top {
        AccidentType::Fire => "Fire detected".to_string(),
        AccidentType::Rollover => match tally.rollover_class() {
            Some(class) if class.is_heavy() => "Heavy vehicle rollover detected".to_string(),
            _ => "Car rollover confirmed with damage or collision".to_string(),
        },
        AccidentType::Damaged => format!("{} damaged vehicles", tally.damage_votes),
        AccidentType::Collision => format!("{} colliding pairs", tally.colliding_pairs.len()),
    };
    let reason = if corroborated {
        format!("{base} + other evidence")
    } else {
        base
    };

    AccidentVerdict::signal(top, severity, reason)
}

/// A car rollover needs a collision or fire in the same frame
fn rollover_gate(verdict: AccidentVerdict, tally: &EvidenceTally) -> AccidentVerdict {
    if verdict.accident_type != Some(AccidentType::Rollover) {
        return verdict;
    }
    let heavy = tally.rollover_class().is_some_and(|class| class.is_heavy());
    if !heavy && !tally.has_collision() && !tally.fire_detected {
        warn!("car rollover without collision or fire vetoed");
        return AccidentVerdict::none();
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameDetection;
    use evidence::EvidenceExtractor;
    use frame::{BoundingBox, Detection, VideoFrame};
    use tracking::Kinematics;

    fn det(class: ObjectClass, bbox: BoundingBox, confidence: f32) -> FrameDetection {
        FrameDetection::new(Detection::new(bbox, class, confidence), Kinematics::default())
    }

    fn assess(scene: SceneMode, frame: &VideoFrame, dets: Vec<FrameDetection>) -> Assessment {
        let extractor = EvidenceExtractor::default();
        let ctx = FrameContext::new(frame, &extractor, scene, dets);
        Strategy::for_scene(scene).evaluate(&ctx, &EngineConfig::default(), false)
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(Strategy::for_scene(SceneMode::Static), Strategy::Catastrophic);
        assert_eq!(
            Strategy::for_scene(SceneMode::NearStatic),
            Strategy::MultiEvidence(EvidencePolicy::NearStatic)
        );
        assert_eq!(
            Strategy::for_scene(SceneMode::Dynamic),
            Strategy::MultiEvidence(EvidencePolicy::Dynamic)
        );
    }

    #[test]
    fn test_catastrophic_heavy_rollover() {
        let frame = VideoFrame::blank(640, 480);
        // width 1.2x height, lower edge at 90% of the frame
        let bus = BoundingBox::new(400, 252, 616, 432);
        let assessment = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Bus, bus, 0.9)]);

        assert!(assessment.self_confirming);
        assert_eq!(assessment.verdict.accident_type, Some(AccidentType::Rollover));
        assert_eq!(assessment.verdict.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_catastrophic_excludes_cars_and_weak_detections() {
        let frame = VideoFrame::blank(640, 480);
        let wide = BoundingBox::new(100, 300, 400, 450);

        let car = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Car, wide, 0.9)]);
        assert!(!car.verdict.signal);

        let weak_truck = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Truck, wide, 0.35)]);
        assert!(!weak_truck.verdict.signal);

        let airborne = BoundingBox::new(100, 50, 400, 200);
        let high_truck = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Truck, airborne, 0.9)]);
        assert!(!high_truck.verdict.signal);
    }

    #[test]
    fn test_catastrophic_fire() {
        let mut frame = VideoFrame::blank(640, 480);
        let car = BoundingBox::new(100, 350, 200, 450);
        frame.fill_rect(&car, [255, 128, 0]);
        let assessment = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Car, car, 0.9)]);
        // a solid fire colour reads as glare
        assert!(!assessment.verdict.signal);

        let mut frame = VideoFrame::blank(640, 480);
        frame.fill_rect(&BoundingBox::new(100, 350, 200, 400), [255, 128, 0]);
        let assessment = assess(SceneMode::Static, &frame, vec![det(ObjectClass::Car, car, 0.9)]);
        assert_eq!(assessment.verdict.accident_type, Some(AccidentType::Fire));
        assert!(assessment.tally.fire_detected);
    }

    #[test]
    fn test_near_static_heavy_rollover_signals() {
        let frame = VideoFrame::blank(640, 480);
        let truck = BoundingBox::new(100, 350, 300, 450);
        let assessment = assess(SceneMode::NearStatic, &frame, vec![det(ObjectClass::Truck, truck, 0.8)]);

        assert!(!assessment.self_confirming);
        assert_eq!(assessment.tally.rollover_votes, 1);
        assert_eq!(assessment.verdict.accident_type, Some(AccidentType::Rollover));
        assert_eq!(assessment.verdict.severity, Some(Severity::Critical));
        assert_eq!(assessment.evidence_count, 1);
    }

    #[test]
    fn test_near_static_quiet_scene() {
        let frame = VideoFrame::blank(640, 480);
        let car = BoundingBox::new(100, 100, 180, 160);
        let assessment = assess(SceneMode::NearStatic, &frame, vec![det(ObjectClass::Car, car, 0.8)]);
        assert_eq!(assessment, Assessment::default());
    }

    #[test]
    fn test_dynamic_fire_scan_is_not_a_unit() {
        let mut frame = VideoFrame::blank(640, 480);
        let car = BoundingBox::new(100, 350, 200, 450);
        frame.fill_rect(&BoundingBox::new(100, 350, 200, 400), [255, 128, 0]);
        let extractor = EvidenceExtractor::default();
        let ctx = FrameContext::new(&frame, &extractor, SceneMode::Dynamic, vec![det(ObjectClass::Car, car, 0.9)]);

        // scan runs because an accident is already confirmed
        let assessment = Strategy::MultiEvidence(EvidencePolicy::Dynamic).evaluate(&ctx, &EngineConfig::default(), true);
        assert!(assessment.tally.fire_detected);
        assert!(!assessment.verdict.signal);
        assert_eq!(assessment.evidence_count, 0);
    }

    #[test]
    fn test_resolution_rules() {
        let mut tally = EvidenceTally::new();
        tally.colliding_pairs.insert((0, 1));
        let verdict = resolve(&tally);
        assert_eq!(verdict.accident_type, Some(AccidentType::Collision));
        assert_eq!(verdict.severity, Some(Severity::Low));

        tally.damage_votes = 2;
        let verdict = resolve(&tally);
        assert_eq!(verdict.accident_type, Some(AccidentType::Damaged));
        assert_eq!(verdict.severity, Some(Severity::Critical));

        let mut fire_only = EvidenceTally::new();
        fire_only.fire_detected = true;
        let verdict = resolve(&fire_only);
        assert_eq!(verdict.accident_type, Some(AccidentType::Fire));
        assert_eq!(verdict.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_lone_car_rollover_vetoed() {
        // rollover vote on a car, no collision, no fire
        let mut tally = EvidenceTally::new();
        tally.record_rollover(ObjectClass::Car);
        let verdict = rollover_gate(resolve(&tally).with_type_fallback(), &tally);
        assert!(!verdict.signal);
        assert_ne!(verdict.accident_type, Some(AccidentType::Rollover));

        // damage corroborates the unit but the gate still needs collision or fire
        tally.damage_votes = 1;
        let verdict = rollover_gate(resolve(&tally), &tally);
        assert!(!verdict.signal);

        tally.colliding_pairs.insert((0, 2));
        let verdict = rollover_gate(resolve(&tally), &tally);
        assert_eq!(verdict.accident_type, Some(AccidentType::Rollover));
    }

    #[test]
    fn test_heavy_rollover_passes_gate() {
        let mut tally = EvidenceTally::new();
        tally.record_rollover(ObjectClass::Bus);
        let verdict = rollover_gate(resolve(&tally), &tally);
        assert!(verdict.signal);
        assert_eq!(verdict.reason.as_deref(), Some("Heavy vehicle rollover detected"));
    }
}
