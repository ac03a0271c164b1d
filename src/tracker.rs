mod color;
mod color_tracker;
mod detection;
mod lock_tracker;
mod rect;
mod segment;
mod signature;
mod track_mode;

pub use detection::Detection;
pub use lock_tracker::{LockTracker, TrackerConfig};
pub use rect::Rect;
pub use signature::{ColorSignature, ObjectTemplate};
pub use track_mode::TrackMode;
