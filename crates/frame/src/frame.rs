//! Video frame types and region cropping

use image::{GrayImage, RgbImage};

use crate::{BoundingBox, FrameError};

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Dimensions { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        })
    }

    /// Frame filled with a single colour
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            data,
            width,
            height,
            timestamp_ns: 0,
            sequence: 0,
        }
    }

    /// Black frame, used when only detector output is available
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    /// Wrap a decoded `image` buffer
    pub fn from_rgb_image(img: RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Set pixel at (x, y); out-of-bounds writes are ignored
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Paint the clipped part of `bbox` with a solid colour
    pub fn fill_rect(&mut self, bbox: &BoundingBox, rgb: [u8; 3]) {
        if let Some((x0, y0, x1, y1)) = bbox.clip(self.width, self.height) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.put_pixel(x, y, rgb);
                }
            }
        }
    }

    /// Clipped view of `bbox`, `None` when the box has no pixels inside the frame
    pub fn region(&self, bbox: &BoundingBox) -> Option<Region<'_>> {
        let (x0, y0, x1, y1) = bbox.clip(self.width, self.height)?;
        Some(Region {
            frame: self,
            x0,
            y0,
            x1,
            y1,
        })
    }

    /// Total pixel count
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Rectangular view into a frame, always non-empty and inside the frame
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    frame: &'a VideoFrame,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl<'a> Region<'a> {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Row-major RGB pixels of the region
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        let frame = self.frame;
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| {
            let start = ((y * frame.width + x0) * 3) as usize;
            let end = ((y * frame.width + x1) * 3) as usize;
            frame.data[start..end]
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
        })
    }

    /// Luminance crop (0.299 R + 0.587 G + 0.114 B)
    pub fn to_gray_image(&self) -> GrayImage {
        let raw: Vec<u8> = self
            .pixels()
            .map(|p| (p[0] as f32 * 0.299 + p[1] as f32 * 0.587 + p[2] as f32 * 0.114) as u8)
            .collect();
        // Length is width * height by construction
        GrayImage::from_raw(self.width(), self.height(), raw)
            .unwrap_or_else(|| GrayImage::new(self.width(), self.height()))
    }
}
