/// Bounding box representation with format conversion utilities.
///
/// Stored as TLWH (top-left x, top-left y, width, height); all public
/// tracker contracts speak frame-pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Width / height, floored to avoid degenerate ratios on thin boxes.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        (self.width / self.height.max(1.0)).max(0.01)
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[inline]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Grow the rectangle by a fixed margin on all four sides.
    #[inline]
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Grow the rectangle by a fraction of its own width/height per side.
    #[inline]
    pub fn expand_frac(&self, frac: f32) -> Rect {
        Rect::new(
            self.x - self.width * frac,
            self.y - self.height * frac,
            self.width * (1.0 + 2.0 * frac),
            self.height * (1.0 + 2.0 * frac),
        )
    }

    /// Clip the rectangle to `[0, width) x [0, height)` frame bounds.
    pub fn clip_to_frame(&self, frame_width: u32, frame_height: u32) -> Rect {
        let max_x = (frame_width as f32 - 1.0).max(0.0);
        let max_y = (frame_height as f32 - 1.0).max(0.0);
        let [x1, y1, x2, y2] = self.to_tlbr();
        Rect::from_tlbr(
            x1.clamp(0.0, max_x),
            y1.clamp(0.0, max_y),
            x2.clamp(0.0, max_x),
            y2.clamp(0.0, max_y),
        )
    }

    /// Area of the intersection with another rectangle (zero if disjoint).
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter_area = self.intersection_area(other);
        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}
