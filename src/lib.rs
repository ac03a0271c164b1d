//! Single-object lock-on tracking.
//!
//! A detector (any [`DetectionSource`]) acquires the target once; from then
//! on a lightweight HSV color-segmentation tracker re-locates it frame to
//! frame, with gating heuristics and a tolerance window for occlusion. The
//! detector is only consulted again after the lock is lost.
//!
//! The crate has no I/O surface of its own: frames come in as
//! [`image::RgbImage`] buffers, the detector and optional guide region are
//! injected by the caller, and each tick returns a bounding box to render
//! (or nothing to show).

pub mod integration;
pub mod tracker;

pub use integration::{DetectionSource, IntoDetections, Letterbox, TrackerPipeline, select_detection};
pub use tracker::{ColorSignature, Detection, LockTracker, ObjectTemplate, Rect, TrackMode, TrackerConfig};

use thiserror::Error;

/// Errors surfaced by the tracking core. Detector failures are not here by
/// design: they are logged at the integration boundary and treated as zero
/// detections for the tick.
#[derive(Debug, Error)]
pub enum TrackError {
    /// Frame dimensions must be non-zero.
    #[error("empty frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
    /// The detector input size must be non-zero.
    #[error("letterbox target size must be non-zero")]
    ZeroTargetSize,
}
