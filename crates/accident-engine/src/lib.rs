//! Accident Evidence Fusion Engine
//!
//! Turns per-frame detector output into a stable accident verdict:
//! - Scene classification (static, near-static, dynamic)
//! - Pairwise collision geometry with motion or damage corroboration
//! - Catastrophic-only and multi-evidence aggregation strategies
//! - Hysteresis confirmation with a final rollover safety override
//! - Whole-clip analysis with frame stride and cold-start window
//!
//! One engine instance owns one stream. Frames must be fed in order and
//! `reset` must be called before an unrelated clip or image.

pub mod aggregator;
pub mod clip;
pub mod collision;
pub mod config;
pub mod confirmation;
pub mod context;
pub mod engine;
pub mod report;
pub mod scene;
pub mod tally;
pub mod verdict;

pub use aggregator::{Assessment, EvidencePolicy, Strategy};
pub use clip::{ClipFrame, ClipSummary};
pub use config::{ClipConfig, EngineConfig};
pub use confirmation::ConfirmationState;
pub use engine::AccidentEngine;
pub use report::{AnnotatedDetection, FrameReport, Lane, LaneCounts, SignalTally};
pub use scene::{SceneMode, SceneRequest};
pub use tally::EvidenceTally;
pub use verdict::{AccidentType, AccidentVerdict, Severity};

use evidence::EvidenceError;
use thiserror::Error;
use tracking::TrackingError;

/// Engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown scene mode: {0}")]
    UnknownSceneMode(String),

    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}
