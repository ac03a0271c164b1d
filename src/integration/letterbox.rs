//! Letterbox preprocessing for fixed-input-size detectors, plus the exact
//! inverse mapping used to bring detector output back to frame coordinates.
//!
//! Detector-square coordinates are strictly internal to the integration
//! layer; nothing outside it ever sees them.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::TrackError;
use crate::tracker::{Detection, Rect};

/// Geometry of one letterboxing pass: the frame is resized preserving aspect
/// ratio and centered on a black `target_size x target_size` canvas.
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub target_size: u32,
}

impl Letterbox {
    /// Pure geometry: no pixels touched.
    pub fn compute(
        frame_width: u32,
        frame_height: u32,
        target_size: u32,
    ) -> Result<Self, TrackError> {
        if target_size == 0 {
            return Err(TrackError::ZeroTargetSize);
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(TrackError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }
        let scale = (target_size as f32 / frame_width as f32)
            .min(target_size as f32 / frame_height as f32);
        let resized_width = (frame_width as f32 * scale).round() as u32;
        let resized_height = (frame_height as f32 * scale).round() as u32;
        Ok(Self {
            scale,
            offset_x: ((target_size - resized_width) / 2) as f32,
            offset_y: ((target_size - resized_height) / 2) as f32,
            resized_width,
            resized_height,
            target_size,
        })
    }

    /// Build the square detector input: bilinear resize onto black padding.
    pub fn apply(&self, frame: &RgbImage) -> RgbImage {
        let resized = imageops::resize(
            frame,
            self.resized_width,
            self.resized_height,
            FilterType::Triangle,
        );
        let mut square =
            RgbImage::from_pixel(self.target_size, self.target_size, image::Rgb([0, 0, 0]));
        imageops::replace(&mut square, &resized, self.offset_x as i64, self.offset_y as i64);
        square
    }

    /// The region of the square actually covered by frame content (everything
    /// outside it is padding).
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.resized_width as f32,
            self.resized_height as f32,
        )
    }

    /// Map a square-space box back to frame coordinates. Exact; rounding is
    /// left to final pixel output.
    pub fn to_frame(&self, square: &Rect) -> Rect {
        let [x1, y1, x2, y2] = square.to_tlbr();
        Rect::from_tlbr(
            (x1 - self.offset_x) / self.scale,
            (y1 - self.offset_y) / self.scale,
            (x2 - self.offset_x) / self.scale,
            (y2 - self.offset_y) / self.scale,
        )
    }

    /// Map a frame-space box into the square (inverse of [`to_frame`]).
    ///
    /// [`to_frame`]: Letterbox::to_frame
    pub fn to_square(&self, frame: &Rect) -> Rect {
        let [x1, y1, x2, y2] = frame.to_tlbr();
        Rect::from_tlbr(
            x1 * self.scale + self.offset_x,
            y1 * self.scale + self.offset_y,
            x2 * self.scale + self.offset_x,
            y2 * self.scale + self.offset_y,
        )
    }

    /// Post-process raw detector output: drop detections whose center lies in
    /// the padding (artifacts of the black bars, regardless of score), clip
    /// survivors to the content rectangle, and map them to frame space.
    pub fn map_detections(&self, detections: Vec<Detection>) -> Vec<Detection> {
        let content = self.content_rect();
        let [cx1, cy1, cx2, cy2] = content.to_tlbr();
        detections
            .into_iter()
            .filter_map(|det| {
                let (bx, by) = det.bbox.center();
                if !content.contains(bx, by) {
                    return None;
                }
                let [x1, y1, x2, y2] = det.bbox.to_tlbr();
                let clipped = Rect::from_tlbr(
                    x1.clamp(cx1, cx2),
                    y1.clamp(cy1, cy2),
                    x2.clamp(cx1, cx2),
                    y2.clamp(cy1, cy2),
                );
                Some(Detection {
                    bbox: self.to_frame(&clipped),
                    ..det
                })
            })
            .collect()
    }
}
