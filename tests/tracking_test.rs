use approx::assert_relative_eq;
use image::{Rgb, RgbImage};

use locktrack_rs::{
    Detection, DetectionSource, LockTracker, Rect, TrackMode, TrackerConfig, TrackerPipeline,
};

/// Detector stub returning a fixed script of per-call detections
/// (square-space boxes, like a real backend would).
struct ScriptedDetector {
    script: Vec<Vec<Detection>>,
    calls: usize,
}

impl ScriptedDetector {
    fn new(script: Vec<Vec<Detection>>) -> Self {
        Self { script, calls: 0 }
    }
}

impl DetectionSource for ScriptedDetector {
    type Error = std::convert::Infallible;

    fn detect(&mut self, _square: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
        let out = self.script.get(self.calls).cloned().unwrap_or_default();
        self.calls += 1;
        Ok(out)
    }
}

fn dark_frame(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([10, 10, 10]))
}

/// Dark frame with a white axis-aligned blob (inclusive pixel bounds).
fn frame_with_blob(w: u32, h: u32, blob: [u32; 4]) -> RgbImage {
    let mut frame = dark_frame(w, h);
    for y in blob[1]..=blob[3] {
        for x in blob[0]..=blob[2] {
            frame.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    frame
}

#[test]
fn test_cold_start_locks_on_detection() {
    // No prior session; detector reports the object inside the guide.
    let frame = frame_with_blob(640, 640, [100, 100, 300, 300]);
    let guide = Rect::new(50.0, 50.0, 300.0, 300.0);
    let detector = ScriptedDetector::new(vec![vec![
        Detection::new(100.0, 100.0, 300.0, 300.0, 0.9).with_class(0),
    ]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);

    let boxed = pipeline.process_frame(&frame, Some(guide)).unwrap().unwrap();
    assert_eq!(pipeline.tracker().mode(), TrackMode::Locked);
    assert_eq!(boxed.to_tlbr(), [100.0, 100.0, 300.0, 300.0]);
    assert_eq!(boxed.area(), 40000.0);
}

#[test]
fn test_brief_occlusion_holds_last_box() {
    let lock_frame = frame_with_blob(640, 640, [100, 100, 300, 300]);
    let detector = ScriptedDetector::new(vec![vec![Detection::new(
        100.0, 100.0, 300.0, 300.0, 0.9,
    )]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);
    pipeline.process_frame(&lock_frame, None).unwrap().unwrap();

    // Object vanishes for 5 ticks: the last box is redrawn as-is, the lock
    // survives, and the detector is left alone.
    let occluded = dark_frame(640, 640);
    for _ in 0..5 {
        let boxed = pipeline.process_frame(&occluded, None).unwrap().unwrap();
        assert_eq!(boxed.to_tlbr(), [100.0, 100.0, 300.0, 300.0]);
        assert_eq!(pipeline.tracker().mode(), TrackMode::Locked);
    }
    assert_eq!(pipeline.detector().calls, 1);
}

#[test]
fn test_exceeded_occlusion_returns_to_searching() {
    let lock_frame = frame_with_blob(640, 640, [100, 100, 300, 300]);
    let detector = ScriptedDetector::new(vec![vec![Detection::new(
        100.0, 100.0, 300.0, 300.0, 0.9,
    )]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);
    pipeline.process_frame(&lock_frame, None).unwrap().unwrap();

    let occluded = dark_frame(640, 640);
    // 24 consecutive misses are tolerated.
    for _ in 0..24 {
        assert!(pipeline.process_frame(&occluded, None).unwrap().is_some());
    }
    assert_eq!(pipeline.tracker().mode(), TrackMode::Locked);

    // The 25th miss drops the lock; the pipeline immediately falls back to
    // the detector (which has nothing), so the caller gets nothing to show.
    let result = pipeline.process_frame(&occluded, None).unwrap();
    assert!(result.is_none());
    assert_eq!(pipeline.tracker().mode(), TrackMode::Searching);
    assert_eq!(pipeline.detector().calls, 2);
}

#[test]
fn test_accepted_candidate_is_smoothed() {
    let lock_frame = frame_with_blob(640, 640, [100, 100, 200, 200]);
    let mut tracker = LockTracker::default();
    tracker.lock_on(
        &lock_frame,
        &Detection::new(100.0, 100.0, 200.0, 200.0, 0.9),
        None,
    );

    // Raw measurement moves to [110, 110, 210, 210]; the update blends
    // 0.6 x old + 0.4 x measured per coordinate.
    let moved = frame_with_blob(640, 640, [110, 110, 210, 210]);
    let updated = tracker.track(&moved, None).unwrap();
    let [x1, y1, x2, y2] = updated.to_tlbr();
    assert_relative_eq!(x1, 104.0, epsilon = 1.0);
    assert_relative_eq!(y1, 104.0, epsilon = 1.0);
    assert_relative_eq!(x2, 204.0, epsilon = 1.0);
    assert_relative_eq!(y2, 204.0, epsilon = 1.0);
}

#[test]
fn test_slow_zoom_never_gated_out() {
    // Area grows ~5% per tick for 10 ticks; the adaptive size prior keeps
    // every candidate inside the area gate.
    let center = 320u32;
    let mut half = 50u32;
    let lock_frame = frame_with_blob(
        640,
        640,
        [center - half, center - half, center + half, center + half],
    );
    let mut tracker = LockTracker::default();
    tracker.lock_on(
        &lock_frame,
        &Detection::new(
            (center - half) as f32,
            (center - half) as f32,
            (center + half) as f32,
            (center + half) as f32,
            0.9,
        ),
        None,
    );

    for _ in 0..10 {
        half = ((half as f32) * 1.05f32.sqrt()).round() as u32;
        let frame = frame_with_blob(
            640,
            640,
            [center - half, center - half, center + half, center + half],
        );
        assert!(tracker.track(&frame, None).is_some());
        assert_eq!(tracker.lost_frames(), 0);
    }
    assert_eq!(tracker.mode(), TrackMode::Locked);
    // The smoothed box has followed the zoom upward.
    assert!(tracker.current_box().unwrap().area() > 100.0 * 100.0 * 1.2);
}

#[test]
fn test_padding_detections_never_lock() {
    // 1280x720 into a 640 square leaves 140px black bars top and bottom.
    // A confident detection centered in the top bar is an artifact; the
    // modest one in the content area wins and is mapped back to frame space.
    let frame = dark_frame(1280, 720);
    let detector = ScriptedDetector::new(vec![vec![
        Detection::new(300.0, 20.0, 340.0, 80.0, 0.99),
        Detection::new(250.0, 240.0, 350.0, 300.0, 0.30),
    ]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);

    let boxed = pipeline.process_frame(&frame, None).unwrap().unwrap();
    let [x1, y1, x2, y2] = boxed.to_tlbr();
    assert_relative_eq!(x1, 500.0, epsilon = 1e-3);
    assert_relative_eq!(y1, 200.0, epsilon = 1e-3);
    assert_relative_eq!(x2, 700.0, epsilon = 1e-3);
    assert_relative_eq!(y2, 320.0, epsilon = 1e-3);
}

#[test]
fn test_padding_only_detections_stay_searching() {
    let frame = dark_frame(1280, 720);
    let detector = ScriptedDetector::new(vec![vec![Detection::new(
        300.0, 20.0, 340.0, 80.0, 0.99,
    )]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);

    assert!(pipeline.process_frame(&frame, None).unwrap().is_none());
    assert_eq!(pipeline.tracker().mode(), TrackMode::Searching);
}

#[test]
fn test_guide_biases_acquisition() {
    let frame = frame_with_blob(640, 640, [100, 100, 300, 300]);
    let guide = Rect::new(50.0, 50.0, 300.0, 300.0);
    // Equal scores; only one overlaps the guide.
    let detector = ScriptedDetector::new(vec![vec![
        Detection::new(450.0, 450.0, 600.0, 600.0, 0.8),
        Detection::new(100.0, 100.0, 300.0, 300.0, 0.8),
    ]]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);

    let boxed = pipeline.process_frame(&frame, Some(guide)).unwrap().unwrap();
    assert_eq!(boxed.to_tlbr(), [100.0, 100.0, 300.0, 300.0]);
}

#[test]
fn test_reacquire_after_reset() {
    let frame = frame_with_blob(640, 640, [100, 100, 300, 300]);
    let det = || vec![Detection::new(100.0, 100.0, 300.0, 300.0, 0.9)];
    let detector = ScriptedDetector::new(vec![det(), det()]);
    let mut pipeline = TrackerPipeline::with_default_config(detector);

    pipeline.process_frame(&frame, None).unwrap().unwrap();
    assert_eq!(pipeline.tracker().mode(), TrackMode::Locked);

    // User retakes the shot: hard reset, then the next tick re-acquires.
    pipeline.reset();
    assert_eq!(pipeline.tracker().mode(), TrackMode::Searching);

    let boxed = pipeline.process_frame(&frame, None).unwrap().unwrap();
    assert_eq!(pipeline.tracker().mode(), TrackMode::Locked);
    assert_eq!(boxed.to_tlbr(), [100.0, 100.0, 300.0, 300.0]);
    assert_eq!(pipeline.detector().calls, 2);
}

#[test]
fn test_tracked_box_follows_moving_object() {
    let mut config = TrackerConfig::default();
    config.box_smoothing = 0.6;
    let lock_frame = frame_with_blob(640, 640, [100, 100, 260, 220]);
    let mut tracker = LockTracker::new(config);
    tracker.lock_on(
        &lock_frame,
        &Detection::new(100.0, 100.0, 260.0, 220.0, 0.9),
        None,
    );

    // Drift right 8px per tick; the smoothed box converges behind it.
    let mut x = 100u32;
    for _ in 0..12 {
        x += 8;
        let frame = frame_with_blob(640, 640, [x, 100, x + 160, 220]);
        assert!(tracker.track(&frame, None).is_some());
    }
    let boxed = tracker.current_box().unwrap();
    assert!(boxed.x > 150.0, "box lagged too far behind: {:?}", boxed);
    assert_relative_eq!(boxed.width, 160.0, epsilon = 8.0);
}
