//! Pixel-space bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixel coordinates `[x1, y1, x2, y2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl From<[i32; 4]> for BoundingBox {
    fn from(b: [i32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl BoundingBox {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels (0 for inverted boxes, saturating at `i32::MAX`)
    pub fn width(&self) -> i32 {
        span(self.x1, self.x2)
    }

    /// Height in pixels (0 for inverted boxes, saturating at `i32::MAX`)
    pub fn height(&self) -> i32 {
        span(self.y1, self.y2)
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Centre point
    pub fn centroid(&self) -> (f32, f32) {
        (
            (self.x1 as i64 + self.x2 as i64) as f32 / 2.0,
            (self.y1 as i64 + self.y2 as i64) as f32 / 2.0,
        )
    }

    /// Width / height, `None` for degenerate boxes
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width() as f32 / self.height() as f32)
        }
    }

    /// Overlap rectangle, if the boxes strictly overlap
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let lx = self.x1.max(other.x1);
        let ly = self.y1.max(other.y1);
        let rx = self.x2.min(other.x2);
        let ry = self.y2.min(other.y2);

        if lx < rx && ly < ry {
            Some(BoundingBox::new(lx, ly, rx, ry))
        } else {
            None
        }
    }

    /// Intersection-over-union in [0, 1]
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let Some(inter) = self.intersection(other) else {
            return 0.0;
        };
        let inter_area = inter.area();
        let union = self.area().saturating_add(other.area()) - inter_area;
        if union <= 0 {
            return 0.0;
        }
        inter_area as f32 / union as f32
    }

    /// Clip to a `width` x `height` frame, returning `(x0, y0, x1, y1)` as
    /// half-open pixel bounds, or `None` when nothing of the box is inside
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x1.clamp(0, width as i32) as u32;
        let y0 = self.y1.clamp(0, height as i32) as u32;
        let x1 = self.x2.clamp(0, width as i32) as u32;
        let y1 = self.y2.clamp(0, height as i32) as u32;

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    /// Whether the lower edge lies strictly below `fraction` of the frame height
    pub fn bottom_below(&self, frame_height: u32, fraction: f32) -> bool {
        self.y2 as f32 > frame_height as f32 * fraction
    }
}

fn span(lo: i32, hi: i32) -> i32 {
    (hi as i64 - lo as i64).clamp(0, i32::MAX as i64) as i32
}
