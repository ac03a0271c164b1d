//! Acquisition/loss state machine for a single lock-on target.

use image::RgbImage;
use tracing::debug;

use crate::tracker::color_tracker::relocate;
use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::signature::{ColorSignature, ObjectTemplate};
use crate::tracker::track_mode::TrackMode;

/// Configuration for the lock-on tracker.
///
/// Every field was hand-tuned in the field; the defaults are known-good
/// starting points, not sacred values.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Square input size expected by the object detector
    pub detector_size: u32,
    /// Pixels around the previous box to search each frame
    pub search_pad: f32,
    /// Fractional growth of the previous box defining the plausibility region
    pub region_expand: f32,
    /// Consecutive missed frames tolerated before the lock is dropped
    pub max_lost_frames: u32,
    /// Connected components smaller than this many pixels are noise
    pub min_component_area: u32,
    /// Weight of squared center distance in component scoring
    pub distance_weight: f32,
    /// Accepted candidate-area / reference-area band
    pub area_ratio_range: (f32, f32),
    /// Max |ln(candidate aspect / reference aspect)|
    pub max_aspect_deviation: f32,
    /// Cosine-similarity floor for the grayscale template gate
    pub min_template_similarity: f32,
    /// Side length of the square grayscale template
    pub template_size: u32,
    /// EMA weight on the previous box when smoothing accepted candidates
    pub box_smoothing: f32,
    /// Decay applied to the area/aspect priors as the box updates
    pub prior_decay: f32,
    /// Added to the mean saturation when learning the color signature
    pub saturation_slack: f32,
    /// Subtracted from the mean value when learning the color signature
    pub value_slack: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detector_size: 640,
            search_pad: 64.0,
            region_expand: 0.30,
            max_lost_frames: 24,
            min_component_area: 40,
            distance_weight: 0.002,
            area_ratio_range: (0.4, 2.5),
            max_aspect_deviation: 2.0_f32.ln(),
            min_template_similarity: 0.25,
            template_size: 32,
            box_smoothing: 0.6,
            prior_decay: 0.9,
            saturation_slack: 0.08,
            value_slack: 0.10,
        }
    }
}

/// Per-session state learned at lock time and updated while Locked.
#[derive(Debug, Clone)]
pub(crate) struct LockedTrack {
    pub(crate) current_box: Rect,
    pub(crate) lost_frames: u32,
    pub(crate) signature: ColorSignature,
    pub(crate) template: ObjectTemplate,
    pub(crate) reference_area: f32,
    pub(crate) reference_aspect: f32,
    pub(crate) guide_at_lock: Option<Rect>,
}

/// Single-target tracker: Searching until a detection locks it on, then
/// Locked while the color tracker keeps re-finding the object, with a
/// tolerance window for transient occlusion.
///
/// The machine only advances on caller-driven ticks; it never runs a loop of
/// its own.
#[derive(Debug, Default)]
pub struct LockTracker {
    config: TrackerConfig,
    session: Option<LockedTrack>,
}

impl LockTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn mode(&self) -> TrackMode {
        if self.session.is_some() {
            TrackMode::Locked
        } else {
            TrackMode::Searching
        }
    }

    /// The box to render, present iff Locked. While occluded within tolerance
    /// this is the last accepted (possibly stale) box.
    pub fn current_box(&self) -> Option<Rect> {
        self.session.as_ref().map(|s| s.current_box)
    }

    /// Consecutive missed frames in the current lock (0 while Searching).
    pub fn lost_frames(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.lost_frames)
    }

    /// Seed a new session from a detector-sourced box: learn the color
    /// signature and template, set the size/shape priors, snapshot the guide.
    /// Runs exactly once per lock; the tracker path takes over afterwards.
    pub fn lock_on(&mut self, frame: &RgbImage, detection: &Detection, guide: Option<Rect>) {
        let bbox = detection.bbox;
        let signature = ColorSignature::learn(
            frame,
            &bbox,
            self.config.saturation_slack,
            self.config.value_slack,
        );
        let template = ObjectTemplate::sample(frame, &bbox, self.config.template_size);
        debug!(
            score = detection.score,
            sat_max = signature.saturation_max,
            val_min = signature.value_min,
            "lock acquired"
        );
        self.session = Some(LockedTrack {
            current_box: bbox,
            lost_frames: 0,
            signature,
            template,
            reference_area: bbox.area().max(1.0),
            reference_aspect: bbox.aspect_ratio(),
            guide_at_lock: guide,
        });
    }

    /// One tracking tick. Returns the updated box on an accepted candidate;
    /// `None` means no update this frame. A miss leaves the previous box in
    /// place until `max_lost_frames` consecutive misses drop the lock.
    ///
    /// Both "nothing segmented" and "candidate gated out" count as a miss
    /// against the same counter.
    pub fn track(&mut self, frame: &RgbImage, live_guide: Option<Rect>) -> Option<Rect> {
        let session = self.session.as_mut()?;

        let Some(measured) = relocate(frame, session, live_guide.as_ref(), &self.config) else {
            session.lost_frames += 1;
            if session.lost_frames > self.config.max_lost_frames {
                debug!(
                    lost_frames = session.lost_frames,
                    "lock dropped, returning to search"
                );
                self.session = None;
            }
            return None;
        };

        // EMA toward the measurement to damp jitter.
        let alpha = self.config.box_smoothing;
        let [px1, py1, px2, py2] = session.current_box.to_tlbr();
        let [mx1, my1, mx2, my2] = measured.to_tlbr();
        let smoothed = Rect::from_tlbr(
            alpha * px1 + (1.0 - alpha) * mx1,
            alpha * py1 + (1.0 - alpha) * my1,
            alpha * px2 + (1.0 - alpha) * mx2,
            alpha * py2 + (1.0 - alpha) * my2,
        );
        session.current_box = smoothed;
        session.lost_frames = 0;

        // Let the size/shape priors drift with slow rotation and scale change
        // without being destabilized by single-frame noise.
        let decay = self.config.prior_decay;
        session.reference_area =
            decay * session.reference_area + (1.0 - decay) * smoothed.area().max(1.0);
        session.reference_aspect =
            decay * session.reference_aspect + (1.0 - decay) * smoothed.aspect_ratio();

        Some(smoothed)
    }

    /// Hard reset back to Searching, discarding all learned state. Invoked by
    /// the host (e.g. the user retakes a shot); honored from any state.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("tracking session reset");
        }
    }
}
