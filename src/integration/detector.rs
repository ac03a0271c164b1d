//! Trait for object detection inference backends.

use image::RgbImage;

use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the lock-on
/// tracker. The input is always the letterboxed square image built by the
/// pipeline; returned boxes are in that square's pixel space and are mapped
/// back to frame coordinates by the caller.
///
/// # Example
///
/// ```ignore
/// use locktrack_rs::{DetectionSource, Detection};
/// use image::RgbImage;
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, square: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::fmt::Display;

    /// Run inference on a letterboxed square image and return detections in
    /// square-pixel coordinates.
    fn detect(&mut self, square: &RgbImage) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}
