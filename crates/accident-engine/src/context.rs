//! Per-frame evaluation context

use std::cell::OnceCell;

use evidence::{DamageVerdict, EvidenceExtractor};
use frame::{Detection, VideoFrame};
use tracking::Kinematics;

use crate::SceneMode;

/// Detection augmented with its kinematics for this frame
#[derive(Debug, Clone)]
pub struct FrameDetection {
    pub detection: Detection,
    pub kinematics: Kinematics,
    structural: OnceCell<DamageVerdict>,
}

impl FrameDetection {
    pub fn new(detection: Detection, kinematics: Kinematics) -> Self {
        Self {
            detection,
            kinematics,
            structural: OnceCell::new(),
        }
    }
}

/// Everything one frame's evaluation reads.
///
/// The damage-or-rollover verdict of each detection is computed at most
/// once, with the scene's semantics, and shared by every rule that asks.
pub struct FrameContext<'a> {
    pub frame: &'a VideoFrame,
    pub extractor: &'a EvidenceExtractor,
    pub scene: SceneMode,
    pub detections: Vec<FrameDetection>,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        frame: &'a VideoFrame,
        extractor: &'a EvidenceExtractor,
        scene: SceneMode,
        detections: Vec<FrameDetection>,
    ) -> Self {
        Self {
            frame,
            extractor,
            scene,
            detections,
        }
    }

    /// Memoised damage-or-rollover verdict of detection `index`
    pub fn structural(&self, index: usize) -> DamageVerdict {
        let Some(det) = self.detections.get(index) else {
            return DamageVerdict::NONE;
        };
        *det.structural.get_or_init(|| {
            let (speed, is_static) = if self.scene.is_static_like() {
                (0.0, true)
            } else {
                (det.kinematics.speed, false)
            };
            self.extractor.damaged_or_rollover(
                self.frame,
                &det.detection.bbox,
                det.detection.class,
                speed,
                is_static,
            )
        })
    }

    /// Verdict of detection `index` if some rule already asked for it
    pub fn structural_if_computed(&self, index: usize) -> Option<DamageVerdict> {
        self.detections.get(index).and_then(|det| det.structural.get().copied())
    }

    /// Fire or fire-and-smoke signature on detection `index`
    pub fn fire(&self, index: usize) -> bool {
        self.detections
            .get(index)
            .is_some_and(|det| self.extractor.fire_smoke(self.frame, &det.detection.bbox))
    }

    /// Rollover score of detection `index` as if standing still
    pub fn stationary_rollover_confidence(&self, index: usize) -> f32 {
        self.detections.get(index).map_or(0.0, |det| {
            self.extractor
                .rollover_confidence(self.frame, &det.detection.bbox, det.detection.class, 0.0, true)
        })
    }

    pub fn frame_height(&self) -> u32 {
        self.frame.height
    }

    pub fn frame_area(&self) -> u64 {
        self.frame.area()
    }

    /// Indices of detections satisfying `pred`
    pub fn indices_where<'s, F>(&'s self, pred: F) -> impl Iterator<Item = usize> + 's
    where
        F: Fn(&FrameDetection) -> bool + 's,
    {
        self.detections
            .iter()
            .enumerate()
            .filter(move |(_, det)| pred(det))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::{BoundingBox, ObjectClass};

    #[test]
    fn test_structural_is_memoised() {
        let frame = VideoFrame::blank(200, 200);
        let extractor = EvidenceExtractor::default();
        let det = Detection::new(BoundingBox::new(10, 10, 90, 60), ObjectClass::Car, 0.9);
        let ctx = FrameContext::new(
            &frame,
            &extractor,
            SceneMode::NearStatic,
            vec![FrameDetection::new(det, Kinematics::default())],
        );

        assert_eq!(ctx.structural_if_computed(0), None);
        let first = ctx.structural(0);
        assert_eq!(ctx.structural_if_computed(0), Some(first));
        assert_eq!(ctx.structural(0), first);
    }

    #[test]
    fn test_out_of_range_is_neutral() {
        let frame = VideoFrame::blank(50, 50);
        let extractor = EvidenceExtractor::default();
        let ctx = FrameContext::new(&frame, &extractor, SceneMode::Dynamic, Vec::new());
        assert_eq!(ctx.structural(3), DamageVerdict::NONE);
        assert!(!ctx.fire(3));
        assert_eq!(ctx.stationary_rollover_confidence(3), 0.0);
    }
}
