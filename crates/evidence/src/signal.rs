//! Traffic-light colour classification

use frame::{BoundingBox, VideoFrame};
use serde::{Deserialize, Serialize};

use crate::hsv::{self, rgb_to_hsv};
use crate::EvidenceConfig;

/// Lit signal colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalColor {
    Red,
    Green,
    Yellow,
    Unknown,
}

impl SignalColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalColor::Red => "Red",
            SignalColor::Green => "Green",
            SignalColor::Yellow => "Yellow",
            SignalColor::Unknown => "Unknown",
        }
    }
}

/// Majority colour of a traffic-light region.
///
/// The winner must strictly outnumber both other colours and cover more than
/// `signal_min_ratio` of the region.
pub fn classify_signal(frame: &VideoFrame, bbox: &BoundingBox, config: &EvidenceConfig) -> SignalColor {
    let Some(region) = frame.region(bbox) else {
        return SignalColor::Unknown;
    };

    let (mut red, mut green, mut yellow) = (0usize, 0usize, 0usize);
    for pixel in region.pixels() {
        let hsv = rgb_to_hsv(pixel);
        if hsv::SIGNAL_RED_LOW.contains(hsv) || hsv::SIGNAL_RED_HIGH.contains(hsv) {
            red += 1;
        }
        if hsv::SIGNAL_GREEN.contains(hsv) {
            green += 1;
        }
        if hsv::SIGNAL_YELLOW.contains(hsv) {
            yellow += 1;
        }
    }

    let threshold = config.signal_min_ratio * region.pixel_count() as f32;
    let wins = |count: usize, a: usize, b: usize| count as f32 > threshold && count > a && count > b;

    if wins(red, green, yellow) {
        SignalColor::Red
    } else if wins(green, red, yellow) {
        SignalColor::Green
    } else if wins(yellow, red, green) {
        SignalColor::Yellow
    } else {
        SignalColor::Unknown
    }
}
