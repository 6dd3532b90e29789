//! Detector vocabulary and per-frame detection records

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, FrameError};

/// Object class (detector ids 0..=9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Person,
    Bicycle,
    Car,
    Motorcycle,
    Airplane,
    Bus,
    Train,
    Truck,
    Boat,
    TrafficLight,
}

impl ObjectClass {
    /// Map a detector class id into the vocabulary
    pub fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0 => Self::Person,
            1 => Self::Bicycle,
            2 => Self::Car,
            3 => Self::Motorcycle,
            4 => Self::Airplane,
            5 => Self::Bus,
            6 => Self::Train,
            7 => Self::Truck,
            8 => Self::Boat,
            9 => Self::TrafficLight,
            _ => return None,
        })
    }

    /// Detector class id
    pub fn id(&self) -> u32 {
        match self {
            Self::Person => 0,
            Self::Bicycle => 1,
            Self::Car => 2,
            Self::Motorcycle => 3,
            Self::Airplane => 4,
            Self::Bus => 5,
            Self::Train => 6,
            Self::Truck => 7,
            Self::Boat => 8,
            Self::TrafficLight => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Bicycle => "bicycle",
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Airplane => "airplane",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Truck => "truck",
            Self::Boat => "boat",
            Self::TrafficLight => "traffic light",
        }
    }

    /// Road vehicles considered for pairwise collision
    pub fn is_collision_vehicle(&self) -> bool {
        matches!(
            self,
            Self::Bicycle | Self::Car | Self::Motorcycle | Self::Bus | Self::Truck
        )
    }

    /// Vehicles examined for damage, rollover and fire
    pub fn is_accident_vehicle(&self) -> bool {
        matches!(self, Self::Car | Self::Bus | Self::Truck)
    }

    /// Bus or truck
    pub fn is_heavy(&self) -> bool {
        matches!(self, Self::Bus | Self::Truck)
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection as emitted by the external detector/tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    /// Bounding box [x1, y1, x2, y2]
    pub bbox: BoundingBox,
    /// Detector class id
    pub class_id: u32,
    /// Detector label, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Detection confidence
    pub confidence: f32,
    /// Tracker identifier, absent for unlinked objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u32>,
}

/// Validated detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class: ObjectClass,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u32>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, class: ObjectClass, confidence: f32) -> Self {
        Self {
            bbox,
            class,
            confidence,
            track_id: None,
        }
    }

    pub fn with_track(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

impl TryFrom<RawDetection> for Detection {
    type Error = FrameError;

    fn try_from(raw: RawDetection) -> Result<Self, Self::Error> {
        let class = ObjectClass::from_id(raw.class_id).ok_or(FrameError::UnknownClass(raw.class_id))?;
        if !(0.0..=1.0).contains(&raw.confidence) {
            return Err(FrameError::Confidence(raw.confidence));
        }
        Ok(Self {
            bbox: raw.bbox,
            class,
            confidence: raw.confidence,
            track_id: raw.track_id,
        })
    }
}
