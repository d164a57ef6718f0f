use crate::frame::PoseFrame;
use crate::hud::FrameHud;
use crate::ledger::{Counts, RepRecord};

/// Common surface of every exercise detector.
///
/// Detectors are single-threaded, call-and-return state machines: the host
/// serializes `on_frame` calls per instance and frames must arrive in
/// non-decreasing timestamp order. `on_frame` never fails — unusable input
/// yields a no-op [`FrameHud`] that repeats the last counts and state.
pub trait Detector {
    /// Advance the state machine by one pose frame and return the display
    /// state for the renderer.
    fn on_frame(&mut self, frame: &PoseFrame) -> FrameHud;

    /// Current (success, fail, total) counters; does not mutate state.
    fn counts(&self) -> Counts;

    /// Return and clear all ledger records pending since the last drain.
    fn drain_records(&mut self) -> Vec<RepRecord>;

    /// Non-destructive view of the most recent `limit` records.
    fn peek_recent(&self, limit: usize) -> Vec<RepRecord>;

    /// Restore the just-constructed state: counters, ledger, calibration.
    fn reset(&mut self);
}
