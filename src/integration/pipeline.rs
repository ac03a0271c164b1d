//! TrackerPipeline for combining detection with lock-on tracking.

use image::RgbImage;
use tracing::{debug, warn};

use crate::TrackError;
use crate::tracker::{Detection, LockTracker, Rect, TrackMode, TrackerConfig};

use super::letterbox::Letterbox;
use super::selector::select_detection;
use super::DetectionSource;

/// One tracking target, end to end: letterbox the frame, acquire through a
/// `DetectionSource`, then keep the lock alive frame to frame with the color
/// tracker, only falling back to the detector after the lock is lost.
///
/// The pipeline advances once per caller-driven tick; it owns no loop or
/// timer of its own.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: LockTracker,
    generation: u64,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self {
            detector,
            tracker: LockTracker::new(config),
            generation: 0,
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }

    /// Run one tick: while Locked the color tracker updates the box (the
    /// detector is not consulted); while Searching the detector path runs.
    /// If the lock is dropped on this very tick, re-acquisition happens
    /// immediately within the same tick.
    ///
    /// Returns the box to render, or `None` when there is nothing to show.
    /// Detector failures are logged and treated as zero detections.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        guide: Option<Rect>,
    ) -> Result<Option<Rect>, TrackError> {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        if self.tracker.mode() == TrackMode::Locked {
            self.tracker.track(frame, guide);
            if self.tracker.mode() == TrackMode::Locked {
                // Accepted update or a tolerated miss: either way the session
                // holds the box to show.
                return Ok(self.tracker.current_box());
            }
        }

        let (width, height) = frame.dimensions();
        let letterbox = Letterbox::compute(width, height, self.tracker.config().detector_size)?;
        let square = letterbox.apply(frame);
        let detections = match self.detector.detect(&square) {
            Ok(detections) => detections,
            Err(err) => {
                warn!(error = %err, "detector failed, treating as no detections");
                Vec::new()
            }
        };
        Ok(self.ingest_detections(generation, frame, guide, &letterbox, detections))
    }

    /// Generation of the most recent tick. Hosts running the detector
    /// asynchronously capture this before dispatching and pass it to
    /// [`ingest_detections`]; a mismatch means the world has moved on.
    ///
    /// [`ingest_detections`]: TrackerPipeline::ingest_detections
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply raw detector output (square-space boxes) produced for tick
    /// `generation`. Stale results are discarded rather than applied to a box
    /// that has since moved.
    pub fn ingest_detections(
        &mut self,
        generation: u64,
        frame: &RgbImage,
        guide: Option<Rect>,
        letterbox: &Letterbox,
        detections: Vec<Detection>,
    ) -> Option<Rect> {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "discarding out-of-date detection result"
            );
            return None;
        }
        let mapped = letterbox.map_detections(detections);
        let selected = select_detection(mapped, guide.as_ref())?;
        self.tracker.lock_on(frame, &selected, guide);
        self.tracker.current_box()
    }

    /// Hard reset back to Searching, discarding the session and invalidating
    /// any detector call still in flight.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.tracker.reset();
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &LockTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut LockTracker {
        &mut self.tracker
    }
}
