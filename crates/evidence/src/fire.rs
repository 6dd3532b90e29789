//! Fire and smoke colour signature

use frame::{BoundingBox, VideoFrame};
use serde::{Deserialize, Serialize};

use crate::hsv::{self, rgb_to_hsv};
use crate::EvidenceConfig;

/// Fraction of region pixels inside the fire and smoke bands
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FireSmokeRatios {
    pub fire: f32,
    pub smoke: f32,
}

impl FireSmokeRatios {
    /// Measure a region; empty regions measure zero
    pub fn measure(frame: &VideoFrame, bbox: &BoundingBox) -> Self {
        let Some(region) = frame.region(bbox) else {
            return Self::default();
        };

        let mut fire = 0usize;
        let mut smoke = 0usize;
        for pixel in region.pixels() {
            let hsv = rgb_to_hsv(pixel);
            if hsv::FIRE.contains(hsv) {
                fire += 1;
            }
            if hsv::SMOKE.contains(hsv) {
                smoke += 1;
            }
        }

        let total = region.pixel_count() as f32;
        Self {
            fire: fire as f32 / total,
            smoke: smoke as f32 / total,
        }
    }

    /// Fire needs a strong hue signature, or a moderate one backed by smoke.
    /// Near-total coverage is glare, not flame.
    pub fn indicates_fire(&self, config: &EvidenceConfig) -> bool {
        if self.fire > config.fire_glare_ratio {
            return false;
        }
        if self.fire > config.fire_strong_ratio {
            return true;
        }
        self.fire > config.fire_moderate_ratio && self.smoke > config.smoke_ratio
    }
}

/// Whether the region shows fire or a fire-and-smoke signature
pub fn detect_fire_smoke(frame: &VideoFrame, bbox: &BoundingBox, config: &EvidenceConfig) -> bool {
    FireSmokeRatios::measure(frame, bbox).indicates_fire(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: [u8; 3] = [255, 128, 0];
    const SMOKE_GREY: [u8; 3] = [200, 200, 205];

    /// 100x10 strip with `fire` columns of flame and `smoke` columns of smoke
    fn strip(fire: i32, smoke: i32) -> (VideoFrame, BoundingBox) {
        let mut frame = VideoFrame::blank(100, 10);
        frame.fill_rect(&BoundingBox::new(0, 0, fire, 10), ORANGE);
        frame.fill_rect(&BoundingBox::new(fire, 0, fire + smoke, 10), SMOKE_GREY);
        (frame, BoundingBox::new(0, 0, 100, 10))
    }

    #[test]
    fn test_ratios() {
        let (frame, bbox) = strip(20, 30);
        let ratios = FireSmokeRatios::measure(&frame, &bbox);
        assert!((ratios.fire - 0.20).abs() < 1e-6);
        assert!((ratios.smoke - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_strong_fire() {
        let (frame, bbox) = strip(40, 0);
        assert!(detect_fire_smoke(&frame, &bbox, &EvidenceConfig::default()));
    }

    #[test]
    fn test_glare_is_rejected() {
        let (frame, bbox) = strip(70, 0);
        assert!(!detect_fire_smoke(&frame, &bbox, &EvidenceConfig::default()));
    }

    #[test]
    fn test_moderate_fire_needs_smoke() {
        let config = EvidenceConfig::default();
        let (frame, bbox) = strip(20, 30);
        assert!(detect_fire_smoke(&frame, &bbox, &config));

        let (frame, bbox) = strip(20, 10);
        assert!(!detect_fire_smoke(&frame, &bbox, &config));
    }

    #[test]
    fn test_red_vehicle_is_not_fire() {
        let mut frame = VideoFrame::blank(50, 50);
        let bbox = BoundingBox::new(0, 0, 50, 50);
        frame.fill_rect(&bbox, [210, 10, 20]);
        assert!(!detect_fire_smoke(&frame, &bbox, &EvidenceConfig::default()));
    }

    #[test]
    fn test_empty_region() {
        let frame = VideoFrame::blank(50, 50);
        let bbox = BoundingBox::new(60, 60, 80, 80);
        assert_eq!(FireSmokeRatios::measure(&frame, &bbox), FireSmokeRatios::default());
        assert!(!detect_fire_smoke(&frame, &bbox, &EvidenceConfig::default()));
    }
}
