//! Contrast-limited adaptive histogram equalisation (CLAHE)
//!
//! The region is split into a `tiles` x `tiles` grid. Each tile gets a
//! clipped, redistributed histogram and a lookup table; every pixel is mapped
//! by bilinear interpolation between the four nearest tile tables.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Per-tile lookup tables
struct TileLuts {
    luts: Vec<[u8; BINS]>,
    cols: usize,
    rows: usize,
    tile_w: u32,
    tile_h: u32,
}

impl TileLuts {
    fn build(image: &GrayImage, clip_limit: f32, tiles: u32) -> Self {
        let (width, height) = image.dimensions();
        let tile_w = width.div_ceil(tiles).max(1);
        let tile_h = height.div_ceil(tiles).max(1);
        let cols = width.div_ceil(tile_w) as usize;
        let rows = height.div_ceil(tile_h) as usize;

        let mut luts = Vec::with_capacity(cols * rows);
        for ty in 0..rows as u32 {
            for tx in 0..cols as u32 {
                let x0 = tx * tile_w;
                let y0 = ty * tile_h;
                let x1 = (x0 + tile_w).min(width);
                let y1 = (y0 + tile_h).min(height);

                let mut hist = [0u32; BINS];
                for y in y0..y1 {
                    for x in x0..x1 {
                        hist[image.get_pixel(x, y)[0] as usize] += 1;
                    }
                }
                let area = (x1 - x0) * (y1 - y0);
                luts.push(tile_lut(&mut hist, area, clip_limit));
            }
        }

        Self {
            luts,
            cols,
            rows,
            tile_w,
            tile_h,
        }
    }

    fn lut(&self, tx: usize, ty: usize) -> &[u8; BINS] {
        &self.luts[ty * self.cols + tx]
    }
}

/// Clip the histogram, spread the excess evenly, and integrate into a LUT
fn tile_lut(hist: &mut [u32; BINS], area: u32, clip_limit: f32) -> [u8; BINS] {
    let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess % BINS as u32;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        for count in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *count += 1;
            residual -= 1;
        }
    }

    let scale = (BINS - 1) as f32 / area.max(1) as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (value, count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *value = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Position of a pixel between tile centres: (low tile, high tile, weight of high)
fn interpolation_axis(pos: u32, tile: u32, count: usize) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
    let last = count.saturating_sub(1) as f32;
    let f = f.clamp(0.0, last);
    let low = f.floor() as usize;
    let high = (low + 1).min(count - 1);
    (low, high, f - low as f32)
}

/// Equalise local contrast of a grayscale image
pub fn clahe(image: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || tiles == 0 {
        return image.clone();
    }

    let luts = TileLuts::build(image, clip_limit, tiles);
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        let (ty0, ty1, wy) = interpolation_axis(y, luts.tile_h, luts.rows);
        for x in 0..width {
            let (tx0, tx1, wx) = interpolation_axis(x, luts.tile_w, luts.cols);
            let v = image.get_pixel(x, y)[0] as usize;

            let top = luts.lut(tx0, ty0)[v] as f32 * (1.0 - wx) + luts.lut(tx1, ty0)[v] as f32 * wx;
            let bottom = luts.lut(tx0, ty1)[v] as f32 * (1.0 - wx) + luts.lut(tx1, ty1)[v] as f32 * wx;
            let mapped = top * (1.0 - wy) + bottom * wy;

            out.put_pixel(x, y, Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}
