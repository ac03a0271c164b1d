//! Lock-time appearance sampling: HSV color signature and grayscale template.

use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array1;

use crate::tracker::color::{luma, saturation_value};
use crate::tracker::rect::Rect;

/// Learned saturation cap is kept inside this band regardless of the sample.
const SATURATION_MAX_BAND: (f32, f32) = (0.15, 0.40);
/// Learned value floor is kept inside this band regardless of the sample.
const VALUE_MIN_BAND: (f32, f32) = (0.55, 0.95);

/// HSV thresholds defining "this object's surface color".
///
/// A pixel is foreground iff `saturation <= saturation_max && value >= value_min`.
#[derive(Debug, Clone, Copy)]
pub struct ColorSignature {
    pub saturation_max: f32,
    pub value_min: f32,
}

impl Default for ColorSignature {
    fn default() -> Self {
        // Pale low-saturation object under neutral light
        Self {
            saturation_max: 0.30,
            value_min: 0.70,
        }
    }
}

impl ColorSignature {
    /// Learn a permissive band around the mean saturation/value inside `region`,
    /// biased toward tolerating shadows and highlights.
    pub fn learn(frame: &RgbImage, region: &Rect, sat_slack: f32, val_slack: f32) -> Self {
        let (rx, ry, rw, rh) = clamp_region(frame, region);
        let mut s_sum = 0.0f64;
        let mut v_sum = 0.0f64;
        let mut n = 0u64;
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                let (s, v) = saturation_value(*frame.get_pixel(x, y));
                s_sum += s as f64;
                v_sum += v as f64;
                n += 1;
            }
        }
        if n == 0 {
            return Self::default();
        }
        let s_mean = (s_sum / n as f64) as f32;
        let v_mean = (v_sum / n as f64) as f32;
        Self {
            saturation_max: (s_mean + sat_slack).clamp(SATURATION_MAX_BAND.0, SATURATION_MAX_BAND.1),
            value_min: (v_mean - val_slack).clamp(VALUE_MIN_BAND.0, VALUE_MIN_BAND.1),
        }
    }

    #[inline]
    pub fn matches(&self, s: f32, v: f32) -> bool {
        s <= self.saturation_max && v >= self.value_min
    }
}

/// Fixed-size grayscale patch sampled at lock time, used to score how much a
/// candidate region still looks like the locked object.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    size: u32,
    luma: Array1<f32>,
}

impl ObjectTemplate {
    /// Resample `region` of the frame down to `size x size` luma values.
    pub fn sample(frame: &RgbImage, region: &Rect, size: u32) -> ObjectTemplate {
        ObjectTemplate {
            size,
            luma: resample_luma(frame, region, size),
        }
    }

    /// Cosine similarity between the stored patch and `region` resampled to
    /// the template size. Rotation and lighting shifts degrade this slowly,
    /// which is why the gate threshold is loose.
    pub fn similarity(&self, frame: &RgbImage, region: &Rect) -> f32 {
        let candidate = resample_luma(frame, region, self.size);
        let mut dot = 0.0f32;
        let mut na = 0.0f32;
        let mut nb = 0.0f32;
        for (a, b) in self.luma.iter().zip(candidate.iter()) {
            dot += a * b;
            na += a * a;
            nb += b * b;
        }
        dot / (na.sqrt() * nb.sqrt() + 1e-6)
    }
}

/// Clamp a region to frame bounds, guaranteeing at least a 1x1 patch.
/// Out-of-bounds pixel indices must never be constructed downstream.
fn clamp_region(frame: &RgbImage, region: &Rect) -> (u32, u32, u32, u32) {
    let (fw, fh) = frame.dimensions();
    let [x1, y1, x2, y2] = region.to_tlbr();
    let rx = (x1.round().max(0.0) as u32).min(fw.saturating_sub(1));
    let ry = (y1.round().max(0.0) as u32).min(fh.saturating_sub(1));
    let rx2 = (x2.round().max(0.0) as u32).min(fw.saturating_sub(1));
    let ry2 = (y2.round().max(0.0) as u32).min(fh.saturating_sub(1));
    let rw = rx2.saturating_sub(rx).max(1).min(fw - rx);
    let rh = ry2.saturating_sub(ry).max(1).min(fh - ry);
    (rx, ry, rw, rh)
}

fn resample_luma(frame: &RgbImage, region: &Rect, size: u32) -> Array1<f32> {
    let (rx, ry, rw, rh) = clamp_region(frame, region);
    let patch = imageops::crop_imm(frame, rx, ry, rw, rh).to_image();
    let scaled = imageops::resize(&patch, size, size, FilterType::Triangle);
    Array1::from_iter(scaled.pixels().map(|px| luma(*px)))
}
