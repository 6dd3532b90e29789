//! Pixel-Evidence Extractors
//!
//! Stateless checks over one bounding-box region of one frame:
//! - Fire and smoke colour signature
//! - Traffic-light colour
//! - Structural damage (localised edge disruption)
//! - Rollover likelihood and the combined damage-or-rollover decision
//!
//! Every extractor is total: empty or degenerate regions produce the
//! "no evidence" result, never an error.

pub mod config;
pub mod contrast;
pub mod damage;
pub mod edges;
pub mod fire;
pub mod hsv;
pub mod rollover;
pub mod signal;

pub use config::EvidenceConfig;
pub use edges::EdgeMap;
pub use fire::FireSmokeRatios;
pub use rollover::{DamageVerdict, StructuralKind};
pub use signal::SignalColor;

use frame::{BoundingBox, ObjectClass, VideoFrame};
use thiserror::Error;

/// Evidence error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    #[error("Invalid evidence configuration: {0}")]
    InvalidConfig(String),
}

/// Configured set of extractors
#[derive(Debug, Clone)]
pub struct EvidenceExtractor {
    config: EvidenceConfig,
}

impl EvidenceExtractor {
    /// Create an extractor after validating its thresholds
    pub fn new(config: EvidenceConfig) -> Result<Self, EvidenceError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvidenceConfig {
        &self.config
    }

    /// Fire or fire-and-smoke signature in the region
    pub fn fire_smoke(&self, frame: &VideoFrame, bbox: &BoundingBox) -> bool {
        fire::detect_fire_smoke(frame, bbox, &self.config)
    }

    /// Traffic-light colour
    pub fn signal_color(&self, frame: &VideoFrame, bbox: &BoundingBox) -> SignalColor {
        signal::classify_signal(frame, bbox, &self.config)
    }

    /// Rollover score in [0, 1]
    pub fn rollover_confidence(
        &self,
        frame: &VideoFrame,
        bbox: &BoundingBox,
        class: ObjectClass,
        speed: f32,
        is_static: bool,
    ) -> f32 {
        rollover::rollover_confidence(frame, bbox, class, speed, is_static, &self.config)
    }

    /// Combined rollover / structural damage decision
    pub fn damaged_or_rollover(
        &self,
        frame: &VideoFrame,
        bbox: &BoundingBox,
        class: ObjectClass,
        speed: f32,
        is_static: bool,
    ) -> DamageVerdict {
        rollover::damaged_or_rollover(frame, bbox, class, speed, is_static, &self.config)
    }
}

impl Default for EvidenceExtractor {
    fn default() -> Self {
        Self {
            config: EvidenceConfig::default(),
        }
    }
}
