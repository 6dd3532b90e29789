//! Edge maps and quadrant localisation

use image::GrayImage;
use imageproc::edges::canny;
use ndarray::{s, Array2, ArrayView2};

/// Smallest side Canny is run on; thinner crops produce no edges
const MIN_EDGE_SIDE: u32 = 3;

/// Binary edge map, indexed `[row, col]`
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    edges: Array2<bool>,
}

impl EdgeMap {
    /// Run Canny with hysteresis thresholds `low` / `high`
    pub fn detect(gray: &GrayImage, low: f32, high: f32) -> Self {
        let (width, height) = gray.dimensions();
        if width < MIN_EDGE_SIDE || height < MIN_EDGE_SIDE {
            return Self::from_array(Array2::from_elem((height as usize, width as usize), false));
        }

        let edges = canny(gray, low, high);
        Self::from_array(Array2::from_shape_fn(
            (height as usize, width as usize),
            |(y, x)| edges.get_pixel(x as u32, y as u32)[0] > 0,
        ))
    }

    pub fn from_array(edges: Array2<bool>) -> Self {
        Self { edges }
    }

    pub fn rows(&self) -> usize {
        self.edges.nrows()
    }

    pub fn cols(&self) -> usize {
        self.edges.ncols()
    }

    /// Number of edge pixels
    pub fn count(&self) -> usize {
        count_edges(self.edges.view())
    }

    /// Edge pixels per pixel, 0 for an empty map
    pub fn density(&self) -> f32 {
        density(self.edges.view())
    }

    /// Densities of the top-left, top-right, bottom-left and bottom-right
    /// quadrants; `None` when either side is under 4 pixels
    pub fn quadrant_densities(&self) -> Option<[f32; 4]> {
        let (h, w) = self.edges.dim();
        if h < 4 || w < 4 {
            return None;
        }
        let (h2, w2) = (h / 2, w / 2);
        Some([
            density(self.edges.slice(s![..h2, ..w2])),
            density(self.edges.slice(s![..h2, w2..])),
            density(self.edges.slice(s![h2.., ..w2])),
            density(self.edges.slice(s![h2.., w2..])),
        ])
    }

    /// Localised disruption: the densest quadrant dominates the mean by
    /// `dominance` and clears the absolute `floor`. Uniform texture does not
    /// qualify however dense it is.
    pub fn is_localized(&self, dominance: f32, floor: f32) -> bool {
        let Some(quadrants) = self.quadrant_densities() else {
            return false;
        };
        let max = quadrants.iter().copied().fold(0.0f32, f32::max);
        let mean = quadrants.iter().sum::<f32>() / quadrants.len() as f32;
        max > mean * dominance && max > floor
    }
}

fn count_edges(view: ArrayView2<'_, bool>) -> usize {
    view.iter().filter(|&&e| e).count()
}

fn density(view: ArrayView2<'_, bool>) -> f32 {
    if view.is_empty() {
        0.0
    } else {
        count_edges(view) as f32 / view.len() as f32
    }
}
