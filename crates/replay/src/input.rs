//! Recorded clip files

use std::path::{Path, PathBuf};

use accident_engine::ClipFrame;
use anyhow::{bail, Context, Result};
use frame::{RawDetection, VideoFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether the clip is a still image or a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    Image,
    Video,
}

/// One recorded frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    /// 1-based raw frame index
    pub index: u64,
    /// Frame image, relative to the clip file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// Recorded detector output for one image or video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipInput {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub kind: ClipKind,
    pub frames: Vec<FrameInput>,
}

impl ClipInput {
    /// Read and validate a clip file
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading clip {}", path.display()))?;
        let clip: ClipInput =
            serde_json::from_str(&text).with_context(|| format!("parsing clip {}", path.display()))?;
        clip.validate()?;
        Ok(clip)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("clip {} has empty dimensions {}x{}", self.source, self.width, self.height);
        }
        if self.frames.is_empty() {
            bail!("clip {} has no frames", self.source);
        }
        if self.kind == ClipKind::Image && self.frames.len() != 1 {
            bail!("image clip {} must have exactly one frame, got {}", self.source, self.frames.len());
        }
        Ok(())
    }

    /// Decode every frame; frames without an image are blank
    pub async fn decode(self, base_dir: &Path) -> Result<Vec<ClipFrame>> {
        let mut frames = Vec::with_capacity(self.frames.len());
        for input in self.frames {
            let frame = match &input.image {
                Some(image) => decode_image(&base_dir.join(image), input.index).await?,
                None => VideoFrame::blank(self.width, self.height),
            };
            frames.push(ClipFrame {
                index: input.index,
                frame,
                detections: input.detections,
            });
        }
        Ok(frames)
    }
}

async fn decode_image(path: &Path, index: u64) -> Result<VideoFrame> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading frame image {}", path.display()))?;
    let rgb = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding frame image {}", path.display()))?
        .to_rgb8();
    debug!(path = %path.display(), width = rgb.width(), height = rgb.height(), "frame decoded");
    Ok(VideoFrame::from_rgb_image(rgb, 0, index as u32))
}
