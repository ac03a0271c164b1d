//! Per-pixel color conversions used by segmentation and template matching.

use image::Rgb;

/// Saturation and value of an RGB pixel (HSV model, hue unused).
///
/// Saturation/value are more lighting-invariant than raw RGB for deciding
/// whether a pixel belongs to the tracked object's surface.
#[inline]
pub fn saturation_value(px: Rgb<u8>) -> (f32, f32) {
    let r = px[0] as f32 / 255.0;
    let g = px[1] as f32 / 255.0;
    let b = px[2] as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let s = if max == 0.0 { 0.0 } else { (max - min) / max };
    (s, max)
}

/// BT.601 luma of an RGB pixel, in [0, 255].
#[inline]
pub fn luma(px: Rgb<u8>) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_value_extremes() {
        let (s, v) = saturation_value(Rgb([255, 255, 255]));
        assert_eq!((s, v), (0.0, 1.0));

        let (s, v) = saturation_value(Rgb([0, 0, 0]));
        assert_eq!((s, v), (0.0, 0.0));

        // Pure red: fully saturated, full value
        let (s, v) = saturation_value(Rgb([255, 0, 0]));
        assert_eq!((s, v), (1.0, 1.0));
    }

    #[test]
    fn test_luma_weights() {
        assert!((luma(Rgb([255, 255, 255])) - 255.0).abs() < 1e-3);
        assert!((luma(Rgb([0, 255, 0])) - 0.587 * 255.0).abs() < 1e-3);
    }
}
