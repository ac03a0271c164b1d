//! Per-frame relocation of the locked object without invoking the detector:
//! segment the search window with the learned color signature, pick the best
//! connected component, and gate it for plausibility.

use image::RgbImage;
use tracing::trace;

use crate::tracker::lock_tracker::{LockedTrack, TrackerConfig};
use crate::tracker::rect::Rect;
use crate::tracker::segment::{SearchWindow, best_component, foreground_mask};

/// Attempt to re-locate the object near its previous box. Returns the raw
/// measured box when a candidate passes every gate, `None` otherwise
/// (smoothing and loss accounting are the state machine's job).
pub(crate) fn relocate(
    frame: &RgbImage,
    session: &LockedTrack,
    live_guide: Option<&Rect>,
    config: &TrackerConfig,
) -> Option<Rect> {
    let (frame_width, frame_height) = frame.dimensions();
    let prev = session.current_box;
    let prev_center = prev.center();

    let window = SearchWindow::around(&prev, config.search_pad, frame_width, frame_height);
    // Grown by a fraction of the box itself, not the fixed pad, so the
    // segmentation stays centered on the object.
    let plausible = prev
        .expand_frac(config.region_expand)
        .clip_to_frame(frame_width, frame_height);

    let mask = foreground_mask(frame, &window, &plausible, &session.signature);
    let component = best_component(
        &mask,
        &window,
        prev_center,
        config.min_component_area,
        config.distance_weight,
    )?;
    let candidate = component.bounds;

    // Area ratio against the slowly-adapted size prior.
    let area_ratio = candidate.area().max(1.0) / session.reference_area;
    let (ratio_min, ratio_max) = config.area_ratio_range;
    if area_ratio < ratio_min || area_ratio > ratio_max {
        trace!(area_ratio, "candidate rejected: area ratio out of range");
        return None;
    }

    // Aspect deviation, symmetric in log space.
    let aspect_dev = (candidate.aspect_ratio() / session.reference_aspect).ln().abs();
    if aspect_dev > config.max_aspect_deviation {
        trace!(aspect_dev, "candidate rejected: aspect deviation too large");
        return None;
    }

    // Motion plausibility: close to the previous center, or still
    // substantially overlapping the previous box.
    let (ccx, ccy) = candidate.center();
    let dist = ((ccx - prev_center.0).powi(2) + (ccy - prev_center.1).powi(2)).sqrt();
    let moved_ok = dist <= config.search_pad * 0.9 || candidate.iou(&prev) >= 0.15;
    if !moved_ok {
        trace!(dist, "candidate rejected: implausible motion");
        return None;
    }

    // Template similarity, loose enough to tolerate rotation and lighting.
    let sim = session.template.similarity(frame, &candidate);
    if sim < config.min_template_similarity {
        trace!(sim, "candidate rejected: template mismatch");
        return None;
    }

    // Guide containment: the guide captured at lock time wins; a live guide
    // is the fallback; with neither the check passes trivially.
    if let Some(guide) = session.guide_at_lock.as_ref().or(live_guide) {
        if !guide.contains(ccx, ccy) {
            trace!("candidate rejected: center outside guide region");
            return None;
        }
    }

    Some(candidate)
}
