//! Frame and Detection Primitives
//!
//! Shared data model for the accident pipeline:
//! - Decoded RGB frames and clipped regions of interest
//! - Pixel-space bounding boxes (IoU, aspect ratio, centroids)
//! - The fixed detector vocabulary and per-frame detection records

pub mod bbox;
pub mod frame;
pub mod object;

pub use bbox::BoundingBox;
pub use frame::{Region, VideoFrame};
pub use object::{Detection, ObjectClass, RawDetection};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid frame dimensions {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("Unknown class id: {0}")]
    UnknownClass(u32),

    #[error("Confidence {0} outside [0, 1]")]
    Confidence(f32),
}
