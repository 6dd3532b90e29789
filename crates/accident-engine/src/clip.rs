//! Whole-clip analysis

use std::collections::BTreeMap;

use frame::{ObjectClass, RawDetection, VideoFrame};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AccidentEngine, AccidentType, FrameReport, Severity};

/// One raw frame of a clip
#[derive(Debug, Clone)]
pub struct ClipFrame {
    /// 1-based position in the decoded stream
    pub index: u64,
    pub frame: VideoFrame,
    pub detections: Vec<RawDetection>,
}

/// Result of analysing a whole image or video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipSummary {
    pub cumulative_class_counts: BTreeMap<ObjectClass, u32>,
    pub peak_vehicle_count: u32,
    pub emergency: bool,
    /// Raw index of the frame that raised the emergency
    pub first_emergency_frame: Option<u64>,
    pub frames_analyzed: u32,
    pub accident_confirmed: bool,
    pub accident_type: Option<AccidentType>,
    pub severity: Option<Severity>,
    pub reason: Option<String>,
}

impl ClipSummary {
    fn absorb(&mut self, report: &FrameReport) {
        self.frames_analyzed += 1;
        self.peak_vehicle_count = self.peak_vehicle_count.max(report.vehicle_count);
        self.cumulative_class_counts = report.cumulative_class_counts.clone();
        self.accident_confirmed = report.accident_confirmed;
        self.accident_type = report.accident_type;
        self.severity = report.severity;
        self.reason = report.reason.clone();
    }
}

impl AccidentEngine {
    /// Reset, then analyse a single image once as static
    pub fn analyze_image(&mut self, frame: &VideoFrame, detections: Vec<RawDetection>) -> ClipSummary {
        self.analyze_image_with(frame, detections, |_| {})
    }

    /// [`AccidentEngine::analyze_image`] with access to the single report
    pub fn analyze_image_with<F>(
        &mut self,
        frame: &VideoFrame,
        detections: Vec<RawDetection>,
        on_report: F,
    ) -> ClipSummary
    where
        F: FnOnce(&FrameReport),
    {
        self.reset();
        let report = self.process(frame, detections, true);
        on_report(&report);
        let mut summary = ClipSummary::default();
        summary.absorb(&report);
        summary.emergency = report.emergency;
        summary.first_emergency_frame = report.emergency.then_some(1);
        summary
    }

    /// Reset, then analyse a video; see [`AccidentEngine::analyze_video_with`]
    pub fn analyze_video<I>(&mut self, frames: I) -> ClipSummary
    where
        I: IntoIterator<Item = ClipFrame>,
    {
        self.analyze_video_with(frames, |_, _| {})
    }

    /// Reset, then analyse every `frame_stride`-th raw frame.
    ///
    /// Frames inside the cold-start window are treated as static. Analysis
    /// stops at the first emergency. `on_report` sees each analysed frame.
    pub fn analyze_video_with<I, F>(&mut self, frames: I, mut on_report: F) -> ClipSummary
    where
        I: IntoIterator<Item = ClipFrame>,
        F: FnMut(u64, &FrameReport),
    {
        self.reset();
        let stride = self.config().clip.frame_stride.max(1);
        let cold_start = self.config().clip.cold_start_frames;
        let mut summary = ClipSummary::default();

        for clip_frame in frames {
            if clip_frame.index % stride != 0 {
                continue;
            }
            let is_static = clip_frame.index < cold_start;
            let report = self.process(&clip_frame.frame, clip_frame.detections, is_static);
            summary.absorb(&report);
            on_report(clip_frame.index, &report);

            if report.emergency {
                summary.emergency = true;
                summary.first_emergency_frame = Some(clip_frame.index);
                info!(frame = clip_frame.index, kind = ?report.accident_type, "emergency raised, stopping clip");
                break;
            }
        }

        summary
    }
}
