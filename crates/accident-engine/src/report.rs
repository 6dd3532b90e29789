//! Per-frame report

use std::collections::BTreeMap;

use evidence::{DamageVerdict, SignalColor};
use frame::{BoundingBox, ObjectClass};
use serde::{Deserialize, Serialize};

use crate::{AccidentType, AccidentVerdict, SceneMode, Severity};

/// Lane by horizontal position in frame thirds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub fn assign(bbox: &BoundingBox, frame_width: u32) -> Self {
        let (center_x, _) = bbox.centroid();
        let third = frame_width as f32 / 3.0;
        if center_x < third {
            Self::Left
        } else if center_x < 2.0 * third {
            Self::Center
        } else {
            Self::Right
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCounts {
    pub left: u32,
    pub center: u32,
    pub right: u32,
}

impl LaneCounts {
    pub fn add(&mut self, lane: Lane) {
        match lane {
            Lane::Left => self.left += 1,
            Lane::Center => self.center += 1,
            Lane::Right => self.right += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.left + self.center + self.right
    }
}

/// Traffic-light colours seen in the frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTally {
    pub red: u32,
    pub green: u32,
    pub yellow: u32,
}

impl SignalTally {
    /// Count a classified light; unknown colours are ignored
    pub fn add(&mut self, color: SignalColor) {
        match color {
            SignalColor::Red => self.red += 1,
            SignalColor::Green => self.green += 1,
            SignalColor::Yellow => self.yellow += 1,
            SignalColor::Unknown => {}
        }
    }
}

/// Detection as reported back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDetection {
    pub bbox: BoundingBox,
    pub class: ObjectClass,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u32>,
    pub speed: f32,
    pub acceleration: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<Lane>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalColor>,
    /// Damage-or-rollover verdict, when this frame evaluated one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<DamageVerdict>,
    pub colliding: bool,
}

/// Everything the engine reports for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub scene_mode: SceneMode,
    /// Collision-vehicle detections in the frame
    pub vehicle_count: u32,
    pub emergency: bool,
    pub accident_confirmed: bool,
    pub accident_type: Option<AccidentType>,
    pub severity: Option<Severity>,
    pub reason: Option<String>,
    /// Verdict of this frame alone, before confirmation
    pub frame_verdict: AccidentVerdict,
    pub cumulative_class_counts: BTreeMap<ObjectClass, u32>,
    pub lane_counts: LaneCounts,
    pub signals: SignalTally,
    pub person_count: u32,
    pub damage_votes: u32,
    pub evidence_count: u32,
    pub confirmation_buffer: u32,
    pub detections: Vec<AnnotatedDetection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_assignment() {
        let width = 600;
        assert_eq!(Lane::assign(&BoundingBox::new(0, 0, 100, 50), width), Lane::Left);
        assert_eq!(Lane::assign(&BoundingBox::new(250, 0, 350, 50), width), Lane::Center);
        assert_eq!(Lane::assign(&BoundingBox::new(500, 0, 600, 50), width), Lane::Right);
        // centre exactly on the first boundary belongs to the centre lane
        assert_eq!(Lane::assign(&BoundingBox::new(150, 0, 250, 50), width), Lane::Center);
        // far off-frame boxes still land in an edge lane
        assert_eq!(Lane::assign(&BoundingBox::new(2_000_000_000, 0, 2_100_000_000, 10), width), Lane::Right);
        assert_eq!(Lane::assign(&BoundingBox::new(i32::MIN, 0, i32::MIN + 10, 10), width), Lane::Left);
    }

    #[test]
    fn test_tallies() {
        let mut lanes = LaneCounts::default();
        lanes.add(Lane::Left);
        lanes.add(Lane::Right);
        lanes.add(Lane::Right);
        assert_eq!(lanes.total(), 3);
        assert_eq!(lanes.right, 2);

        let mut signals = SignalTally::default();
        signals.add(SignalColor::Red);
        signals.add(SignalColor::Unknown);
        assert_eq!(signals, SignalTally { red: 1, green: 0, yellow: 0 });
    }

    #[test]
    fn test_counts_serialize_with_class_names() {
        let mut counts = BTreeMap::new();
        counts.insert(ObjectClass::TrafficLight, 2);
        counts.insert(ObjectClass::Car, 3);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"car":3,"traffic_light":2}"#);
    }
}
