use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in frame-pixel coordinates
    pub bbox: Rect,
    /// Detection confidence score in [0, 1]
    pub score: f32,
    /// Class index (optional, for multi-class detectors)
    pub class_id: Option<usize>,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            class_id: None,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self {
            bbox,
            score,
            class_id: None,
        }
    }

    pub fn with_class(mut self, class_id: usize) -> Self {
        self.class_id = Some(class_id);
        self
    }
}
