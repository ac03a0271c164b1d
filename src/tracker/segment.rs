//! Color segmentation over the search window: foreground masking and
//! iterative 4-connected component extraction.

use std::collections::VecDeque;

use image::RgbImage;
use ndarray::Array2;

use crate::tracker::color::saturation_value;
use crate::tracker::rect::Rect;
use crate::tracker::signature::ColorSignature;

/// Integer pixel window the per-pixel pass is bounded by. Always lies fully
/// inside the frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchWindow {
    pub x1: u32,
    pub y1: u32,
    pub width: u32,
    pub height: u32,
}

impl SearchWindow {
    /// Build a window around `bbox` padded by `pad` pixels, clipped to frame
    /// bounds. Degenerate inputs collapse to a 1x1 window.
    pub(crate) fn around(bbox: &Rect, pad: f32, frame_width: u32, frame_height: u32) -> Self {
        let clipped = bbox.expand(pad).clip_to_frame(frame_width, frame_height);
        let [x1, y1, x2, y2] = clipped.to_tlbr();
        let x1 = x1.round() as u32;
        let y1 = y1.round() as u32;
        let width = ((x2.round() as u32).saturating_sub(x1)).max(1);
        let height = ((y2.round() as u32).saturating_sub(y1)).max(1);
        Self {
            x1,
            y1,
            width: width.min(frame_width - x1),
            height: height.min(frame_height - y1),
        }
    }
}

/// A connected foreground region, bounds in frame-pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Component {
    pub area: u32,
    pub bounds: Rect,
}

/// Mark foreground pixels inside the window that also fall inside the
/// plausibility region. Restricting to `plausible` keeps the segmentation
/// centered on the object rather than the whole padded window.
pub(crate) fn foreground_mask(
    frame: &RgbImage,
    window: &SearchWindow,
    plausible: &Rect,
    signature: &ColorSignature,
) -> Array2<u8> {
    let mut mask = Array2::<u8>::zeros((window.height as usize, window.width as usize));
    for y in 0..window.height {
        let ay = window.y1 + y;
        for x in 0..window.width {
            let ax = window.x1 + x;
            if !plausible.contains(ax as f32, ay as f32) {
                continue;
            }
            let (s, v) = saturation_value(*frame.get_pixel(ax, ay));
            if signature.matches(s, v) {
                mask[[y as usize, x as usize]] = 1;
            }
        }
    }
    mask
}

/// Flood-fill every unvisited foreground pixel and keep the best-scoring
/// component: `score = area - distance_weight * dist^2` from the previous
/// center, preferring large regions near where the object last was.
/// Components below `min_area` are noise and are discarded.
pub(crate) fn best_component(
    mask: &Array2<u8>,
    window: &SearchWindow,
    prev_center: (f32, f32),
    min_area: u32,
    distance_weight: f32,
) -> Option<Component> {
    let (rows, cols) = mask.dim();
    let mut visited = Array2::<u8>::zeros((rows, cols));
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut best: Option<(f32, Component)> = None;

    for sy in 0..rows {
        for sx in 0..cols {
            if mask[[sy, sx]] == 0 || visited[[sy, sx]] != 0 {
                continue;
            }

            // Iterative BFS; recursion depth would be unbounded on large blobs.
            visited[[sy, sx]] = 1;
            queue.push_back((sy, sx));
            let (mut min_x, mut max_x, mut min_y, mut max_y) = (sx, sx, sy, sy);
            let mut area = 0u32;

            while let Some((y, x)) = queue.pop_front() {
                area += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                let neighbors = [
                    (y, x.wrapping_sub(1)),
                    (y, x + 1),
                    (y.wrapping_sub(1), x),
                    (y + 1, x),
                ];
                for (ny, nx) in neighbors {
                    if ny >= rows || nx >= cols {
                        continue;
                    }
                    if mask[[ny, nx]] != 0 && visited[[ny, nx]] == 0 {
                        visited[[ny, nx]] = 1;
                        queue.push_back((ny, nx));
                    }
                }
            }

            if area < min_area {
                continue;
            }

            let bounds = Rect::from_tlbr(
                (window.x1 + min_x as u32) as f32,
                (window.y1 + min_y as u32) as f32,
                (window.x1 + max_x as u32) as f32,
                (window.y1 + max_y as u32) as f32,
            );
            let (ccx, ccy) = bounds.center();
            let dist2 = (ccx - prev_center.0).powi(2) + (ccy - prev_center.1).powi(2);
            let score = area as f32 - distance_weight * dist2;

            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, Component { area, bounds }));
            }
        }
    }

    best.map(|(_, component)| component)
}
