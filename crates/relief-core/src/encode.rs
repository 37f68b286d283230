use crate::config::{ColorParams, VisualParams};
use crate::types::Population;

/// Maps a population value onto the two visual channels of a region:
/// extrusion height and luminance. Both are linear in the clamped population
/// and therefore monotonically non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualEncoder {
    max_population: Population,
    max_extrusion: f32,
}

impl VisualEncoder {
    pub fn new(max_population: Population, params: &VisualParams) -> Self {
        Self {
            max_population,
            max_extrusion: params.max_extrusion,
        }
    }

    /// Fraction of the maximum population, in [0, 1]. 0 when the maximum is 0.
    fn ratio(&self, population: Population) -> f64 {
        if self.max_population == 0 {
            return 0.0;
        }
        let clamped = population.min(self.max_population);
        clamped as f64 / self.max_population as f64
    }

    /// Height of the solid for `population`, in [0, max_extrusion].
    pub fn extrusion(&self, population: Population) -> f32 {
        (self.ratio(population) * self.max_extrusion as f64) as f32
    }

    /// Normalized brightness for `population`, in [0, 1].
    pub fn luminance(&self, population: Population) -> f32 {
        self.ratio(population) as f32
    }

    /// sRGB color of a region with `population`: fixed hue and saturation,
    /// lightness taken from the luminance.
    pub fn color(&self, population: Population, params: &ColorParams) -> [f32; 3] {
        hsl_to_rgb(
            params.hue_degrees,
            params.saturation,
            self.luminance(population),
        )
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to sRGB in [0, 1].
pub fn hsl_to_rgb(hue_degrees: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue_degrees.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    [
        hue_channel(h + 120.0, m1, m2),
        hue_channel(h, m1, m2),
        hue_channel(h - 120.0, m1, m2),
    ]
}

fn hue_channel(h: f32, m1: f32, m2: f32) -> f32 {
    let h = h.rem_euclid(360.0);
    if h < 60.0 {
        m1 + (m2 - m1) * h / 60.0
    } else if h < 180.0 {
        m2
    } else if h < 240.0 {
        m1 + (m2 - m1) * (240.0 - h) / 60.0
    } else {
        m1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn encoder(max_population: Population) -> VisualEncoder {
        VisualEncoder::new(max_population, &VisualParams { max_extrusion: 10.0 })
    }

    #[test]
    fn test_extrusion_bounds() {
        let enc = encoder(2_000_000);
        assert_eq!(enc.extrusion(0), 0.0);
        assert!((enc.extrusion(2_000_000) - 10.0).abs() < EPS);
        assert!((enc.extrusion(1_000_000) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_extrusion_clamps_above_max() {
        let enc = encoder(1000);
        assert!((enc.extrusion(5000) - 10.0).abs() < EPS);
        assert!((enc.luminance(5000) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_extrusion_monotonic() {
        let enc = encoder(1_883_425);
        let mut previous = -1.0f32;
        for p in (0..=2_000_000u64).step_by(12_345) {
            let h = enc.extrusion(p);
            assert!(h >= previous, "extrusion decreased at {p}");
            assert!((0.0..=10.0).contains(&h));
            previous = h;
        }
    }

    #[test]
    fn test_luminance_is_ratio() {
        let enc = encoder(400);
        assert_eq!(enc.luminance(0), 0.0);
        assert!((enc.luminance(400) - 1.0).abs() < EPS);
        assert!((enc.luminance(100) - 0.25).abs() < EPS);
        assert!((enc.luminance(123) - 123.0 / 400.0).abs() < EPS);
    }

    #[test]
    fn test_zero_max_population_is_guarded() {
        let enc = encoder(0);
        assert_eq!(enc.extrusion(0), 0.0);
        assert_eq!(enc.extrusion(10), 0.0);
        assert_eq!(enc.luminance(10), 0.0);
    }

    #[test]
    fn test_hsl_extremes() {
        assert_eq!(hsl_to_rgb(105.0, 0.8, 0.0), [0.0, 0.0, 0.0]);
        let white = hsl_to_rgb(105.0, 0.8, 1.0);
        for c in white {
            assert!((c - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_hsl_green_hue() {
        // hue 105 at mid lightness: green dominant, blue lowest.
        let [r, g, b] = hsl_to_rgb(105.0, 0.8, 0.5);
        assert!((g - 0.9).abs() < EPS);
        assert!((b - 0.1).abs() < EPS);
        assert!(r > b && r < g);
    }

    #[test]
    fn test_color_tracks_luminance() {
        let enc = encoder(100);
        let params = ColorParams::default();
        let dark = enc.color(10, &params);
        let bright = enc.color(90, &params);
        assert!(bright[1] > dark[1]);
    }
}
