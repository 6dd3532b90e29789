//! Accident engine

use std::collections::BTreeMap;

use evidence::EvidenceExtractor;
use frame::{Detection, ObjectClass, RawDetection, VideoFrame};
use tracing::{debug, info, warn};
use tracking::{Kinematics, TrackStore};

use crate::context::{FrameContext, FrameDetection};
use crate::report::{AnnotatedDetection, FrameReport, Lane, LaneCounts, SignalTally};
use crate::scene::is_low_motion;
use crate::{
    ConfirmationState, EngineConfig, EngineError, SceneMode, SceneRequest, Strategy,
};

/// Accident detection engine for one stream.
///
/// Owns all cross-frame state: track kinematics, unique-object registry,
/// and the confirmation state machine. Frames must be processed in order.
pub struct AccidentEngine {
    config: EngineConfig,
    extractor: EvidenceExtractor,
    tracks: TrackStore,
    confirmation: ConfirmationState,
    /// Class tally of the latest static frame
    static_counts: BTreeMap<ObjectClass, u32>,
    /// A video frame has been processed since reset
    motion_seen: bool,
    frames_processed: u64,
}

impl AccidentEngine {
    /// Create an engine after validating its configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let extractor = EvidenceExtractor::new(config.evidence.clone())?;
        let tracks = TrackStore::new(config.tracking.clone())?;
        Ok(Self {
            config,
            extractor,
            tracks,
            confirmation: ConfirmationState::new(),
            static_counts: BTreeMap::new(),
            motion_seen: false,
            frames_processed: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn confirmation(&self) -> &ConfirmationState {
        &self.confirmation
    }

    pub fn tracks(&self) -> &TrackStore {
        &self.tracks
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Static tally until the first video frame, debounced unique counts after
    pub fn cumulative_counts(&self) -> BTreeMap<ObjectClass, u32> {
        if self.motion_seen {
            self.tracks.unique_counts().clone()
        } else {
            self.static_counts.clone()
        }
    }

    /// Forget everything; required before an unrelated clip or image
    pub fn reset(&mut self) {
        self.tracks.reset();
        self.confirmation = ConfirmationState::new();
        self.static_counts.clear();
        self.motion_seen = false;
        self.frames_processed = 0;
        info!("engine state reset");
    }

    /// Process a frame described by a textual scene request.
    ///
    /// An unrecognised request is rejected before any state changes.
    pub fn process_request(
        &mut self,
        frame: &VideoFrame,
        detections: Vec<RawDetection>,
        request: &str,
    ) -> Result<FrameReport, EngineError> {
        let request: SceneRequest = request.parse()?;
        Ok(self.process(frame, detections, request.is_static()))
    }

    /// Process one frame of detector output
    pub fn process(&mut self, frame: &VideoFrame, detections: Vec<RawDetection>, is_static: bool) -> FrameReport {
        self.frames_processed += 1;
        let detections = self.ingest(detections);

        if !is_static {
            self.tracks.begin_frame();
            self.motion_seen = true;
        }

        let mut frame_detections = Vec::with_capacity(detections.len());
        for det in detections {
            let kinematics = match (is_static, det.track_id) {
                (false, Some(track_id)) => self.tracks.observe(track_id, &det.bbox, det.class).kinematics,
                _ => Kinematics::default(),
            };
            frame_detections.push(FrameDetection::new(det, kinematics));
        }

        if is_static {
            self.static_counts.clear();
            for fd in &frame_detections {
                *self.static_counts.entry(fd.detection.class).or_insert(0) += 1;
            }
        }

        let low_motion = is_low_motion(
            frame_detections
                .iter()
                .filter(|fd| fd.detection.class.is_collision_vehicle())
                .map(|fd| fd.kinematics.speed),
            self.config.low_motion_speed,
            self.config.low_motion_ratio,
        );
        let scene = SceneMode::classify(is_static, low_motion);

        let ctx = FrameContext::new(frame, &self.extractor, scene, frame_detections);
        let assessment = Strategy::for_scene(scene).evaluate(&ctx, &self.config, self.confirmation.confirmed);

        if scene == SceneMode::Static {
            self.confirmation.clear_buffer();
            if assessment.self_confirming {
                self.confirmation.confirm_immediately(&assessment.verdict);
            }
        } else {
            self.confirmation.step(&assessment.verdict, scene, &self.config);
            if scene == SceneMode::Dynamic && assessment.tally.fire_detected {
                self.confirmation.upgrade_to_fire();
            }
            self.confirmation.rollover_override(
                assessment.tally.damage_votes,
                scene,
                assessment.verdict.signal,
            );
        }

        let mut lane_counts = LaneCounts::default();
        let mut signals = SignalTally::default();
        let mut person_count = 0;
        let mut vehicle_count = 0;
        let mut annotated = Vec::with_capacity(ctx.detections.len());

        for (i, fd) in ctx.detections.iter().enumerate() {
            let det = &fd.detection;
            let signal = if det.class == ObjectClass::TrafficLight {
                let color = self.extractor.signal_color(frame, &det.bbox);
                signals.add(color);
                Some(color)
            } else {
                None
            };
            let lane = (det.class != ObjectClass::TrafficLight).then(|| Lane::assign(&det.bbox, frame.width));
            if let Some(lane) = lane {
                lane_counts.add(lane);
            }
            if det.class == ObjectClass::Person {
                person_count += 1;
            }
            if det.class.is_collision_vehicle() {
                vehicle_count += 1;
            }

            annotated.push(AnnotatedDetection {
                bbox: det.bbox,
                class: det.class,
                confidence: det.confidence,
                track_id: det.track_id,
                speed: fd.kinematics.speed,
                acceleration: fd.kinematics.acceleration,
                lane,
                signal,
                structural: ctx.structural_if_computed(i),
                colliding: assessment
                    .tally
                    .colliding_pairs
                    .iter()
                    .any(|&(a, b)| a == i || b == i),
            });
        }

        debug!(
            frame = self.frames_processed,
            scene = %scene,
            vehicles = vehicle_count,
            signal = assessment.verdict.signal,
            buffer = self.confirmation.buffer,
            confirmed = self.confirmation.confirmed,
            "frame processed"
        );

        FrameReport {
            scene_mode: scene,
            vehicle_count,
            emergency: self.confirmation.emergency(),
            accident_confirmed: self.confirmation.confirmed,
            accident_type: self.confirmation.accident_type,
            severity: self.confirmation.severity,
            reason: self.confirmation.reason.clone(),
            frame_verdict: assessment.verdict,
            cumulative_class_counts: self.cumulative_counts(),
            lane_counts,
            signals,
            person_count,
            damage_votes: assessment.tally.damage_votes,
            evidence_count: assessment.evidence_count,
            confirmation_buffer: self.confirmation.buffer,
            detections: annotated,
        }
    }

    /// Drop weak detections and classes outside the vocabulary
    fn ingest(&self, raw: Vec<RawDetection>) -> Vec<Detection> {
        raw.into_iter()
            .filter_map(|raw| {
                if raw.confidence <= self.config.min_detection_confidence {
                    debug!(class_id = raw.class_id, confidence = raw.confidence, "weak detection dropped");
                    return None;
                }
                match Detection::try_from(raw) {
                    Ok(det) => Some(det),
                    Err(e) => {
                        warn!(error = %e, "detection rejected");
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for AccidentEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            extractor: EvidenceExtractor::default(),
            tracks: TrackStore::default(),
            confirmation: ConfirmationState::new(),
            static_counts: BTreeMap::new(),
            motion_seen: false,
            frames_processed: 0,
        }
    }
}
