/// Acquisition state of the lock-on tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackMode {
    /// No lock; re-acquisition runs through the object detector
    #[default]
    Searching,
    /// An active box exists and is updated by the color tracker
    Locked,
}
