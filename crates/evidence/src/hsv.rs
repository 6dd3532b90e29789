//! HSV conversion and colour bands
//!
//! Uses the 8-bit HSV scale common to camera tooling: H in [0, 180],
//! S and V in [0, 255].

/// HSV triple on the 8-bit scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

/// Convert one RGB pixel to HSV
#[inline]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max <= 0.0 { 0.0 } else { 255.0 * delta / max };

    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    Hsv {
        h: (h / 2.0).round().min(180.0) as u8,
        s: s.round() as u8,
        v: max as u8,
    }
}

/// Inclusive HSV box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvBand {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower[0]..=self.upper[0]).contains(&hsv.h)
            && (self.lower[1]..=self.upper[1]).contains(&hsv.s)
            && (self.lower[2]..=self.upper[2]).contains(&hsv.v)
    }
}

/// Orange/yellow flame hues, saturated and bright
pub const FIRE: HsvBand = HsvBand::new([5, 120, 150], [30, 255, 255]);
/// Grey/white plume: any hue, low saturation, bright
pub const SMOKE: HsvBand = HsvBand::new([0, 0, 135], [180, 30, 255]);

pub const SIGNAL_RED_LOW: HsvBand = HsvBand::new([0, 70, 50], [10, 255, 255]);
pub const SIGNAL_RED_HIGH: HsvBand = HsvBand::new([170, 70, 50], [180, 255, 255]);
pub const SIGNAL_GREEN: HsvBand = HsvBand::new([35, 100, 100], [85, 255, 255]);
pub const SIGNAL_YELLOW: HsvBand = HsvBand::new([20, 100, 100], [35, 255, 255]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colours() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv([0, 255, 0]), Hsv { h: 60, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv([0, 0, 255]), Hsv { h: 120, s: 255, v: 255 });
    }

    #[test]
    fn test_greys_have_no_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), Hsv { h: 0, s: 0, v: 0 });
        assert_eq!(rgb_to_hsv([200, 200, 200]), Hsv { h: 0, s: 0, v: 200 });
    }

    #[test]
    fn test_orange_is_fire() {
        // Pure orange, hue 30 degrees
        let hsv = rgb_to_hsv([255, 128, 0]);
        assert_eq!(hsv.h, 15);
        assert!(FIRE.contains(hsv));
        assert!(!SMOKE.contains(hsv));
    }

    #[test]
    fn test_light_grey_is_smoke() {
        let hsv = rgb_to_hsv([190, 190, 195]);
        assert!(SMOKE.contains(hsv));
        assert!(!FIRE.contains(hsv));
    }

    #[test]
    fn test_red_is_not_fire() {
        assert!(!FIRE.contains(rgb_to_hsv([220, 0, 0])));
        assert!(SIGNAL_RED_LOW.contains(rgb_to_hsv([220, 0, 0])));
    }
}
