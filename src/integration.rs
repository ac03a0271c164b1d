//! Integration module for connecting object detection backends with the
//! lock-on tracker.
//!
//! This module provides the letterbox preprocessing contract, the
//! `DetectionSource` trait for inference backends, guide-biased detection
//! selection, and the end-to-end `TrackerPipeline`.

mod detector;
mod letterbox;
mod pipeline;
mod selector;

pub use detector::{DetectionSource, IntoDetections};
pub use letterbox::Letterbox;
pub use pipeline::TrackerPipeline;
pub use selector::select_detection;
