//! Scene classification

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// How the current frame is treated for evidence purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneMode {
    /// Single image or explicit still frame
    Static,
    /// Video frame where almost nothing moves
    NearStatic,
    /// Moving traffic
    Dynamic,
}

impl SceneMode {
    /// Static input wins; otherwise motion decides
    pub fn classify(is_static: bool, low_motion: bool) -> Self {
        if is_static {
            Self::Static
        } else if low_motion {
            Self::NearStatic
        } else {
            Self::Dynamic
        }
    }

    /// Static and near-static frames share the static evidence semantics
    pub fn is_static_like(&self) -> bool {
        !matches!(self, Self::Dynamic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::NearStatic => "NEAR_STATIC",
            Self::Dynamic => "DYNAMIC",
        }
    }
}

impl std::fmt::Display for SceneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller's description of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneRequest {
    /// Still image or frame that must be treated as motionless
    Static,
    /// Video frame, classified by measured motion
    Video,
}

impl SceneRequest {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static)
    }
}

impl FromStr for SceneRequest {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" | "image" | "still" => Ok(Self::Static),
            "video" | "dynamic" => Ok(Self::Video),
            _ => Err(EngineError::UnknownSceneMode(s.to_string())),
        }
    }
}

/// Fewer than `ratio` of the vehicles move faster than `speed_floor`.
///
/// A frame without vehicles is low-motion.
pub fn is_low_motion<I>(vehicle_speeds: I, speed_floor: f32, ratio: f32) -> bool
where
    I: IntoIterator<Item = f32>,
{
    let mut vehicles = 0usize;
    let mut moving = 0usize;
    for speed in vehicle_speeds {
        vehicles += 1;
        if speed > speed_floor {
            moving += 1;
        }
    }
    if vehicles == 0 {
        return true;
    }
    (moving as f32) < vehicles as f32 * ratio
}
