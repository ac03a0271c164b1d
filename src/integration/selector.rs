//! Choosing the best candidate among detector outputs.

use crate::tracker::{Detection, Rect};

/// Pick the detection to lock on to.
///
/// When a guide region is supplied and at least one detection overlaps it,
/// only overlapping detections are considered, ordered by descending
/// intersection area with the guide (ties broken by score). Without a guide,
/// or when nothing overlaps it, the highest-scoring detection wins.
pub fn select_detection(mut detections: Vec<Detection>, guide: Option<&Rect>) -> Option<Detection> {
    if detections.is_empty() {
        return None;
    }

    if let Some(guide) = guide {
        let overlapping: Vec<Detection> = detections
            .iter()
            .filter(|d| d.bbox.intersection_area(guide) > 0.0)
            .cloned()
            .collect();
        if !overlapping.is_empty() {
            let mut ranked = overlapping;
            ranked.sort_by(|a, b| {
                let ia = a.bbox.intersection_area(guide);
                let ib = b.bbox.intersection_area(guide);
                ib.total_cmp(&ia).then(b.score.total_cmp(&a.score))
            });
            return ranked.into_iter().next();
        }
    }

    detections.sort_by(|a, b| b.score.total_cmp(&a.score));
    detections.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(select_detection(vec![], None).is_none());
    }

    #[test]
    fn test_highest_score_without_guide() {
        let dets = vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.4),
            Detection::new(50.0, 50.0, 60.0, 60.0, 0.9),
        ];
        let best = select_detection(dets, None).unwrap();
        assert!((best.score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_guide_overlap_beats_score() {
        let guide = Rect::new(0.0, 0.0, 20.0, 20.0);
        let dets = vec![
            Detection::new(5.0, 5.0, 15.0, 15.0, 0.5),    // inside guide
            Detection::new(100.0, 100.0, 150.0, 150.0, 0.95), // higher score, no overlap
        ];
        let best = select_detection(dets, Some(&guide)).unwrap();
        assert!((best.score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_equal_scores_prefer_overlapping() {
        let guide = Rect::new(50.0, 50.0, 300.0, 300.0);
        let dets = vec![
            Detection::new(500.0, 500.0, 600.0, 600.0, 0.8),
            Detection::new(100.0, 100.0, 300.0, 300.0, 0.8),
        ];
        let best = select_detection(dets, Some(&guide)).unwrap();
        assert_eq!(best.bbox.x, 100.0);
    }

    #[test]
    fn test_larger_guide_intersection_wins_tie() {
        let guide = Rect::new(0.0, 0.0, 100.0, 100.0);
        let dets = vec![
            Detection::new(90.0, 90.0, 120.0, 120.0, 0.9), // sliver of overlap
            Detection::new(10.0, 10.0, 80.0, 80.0, 0.6),   // mostly inside
        ];
        let best = select_detection(dets, Some(&guide)).unwrap();
        assert_eq!(best.bbox.x, 10.0);
    }

    #[test]
    fn test_guide_with_no_overlap_falls_back_to_score() {
        let guide = Rect::new(0.0, 0.0, 10.0, 10.0);
        let dets = vec![
            Detection::new(100.0, 100.0, 150.0, 150.0, 0.4),
            Detection::new(200.0, 200.0, 250.0, 250.0, 0.7),
        ];
        let best = select_detection(dets, Some(&guide)).unwrap();
        assert!((best.score - 0.7).abs() < 1e-6);
    }
}
