use rep_detect_calf::{CalfDetector, CalfParams};
use rep_detect_core::{Counts, Detector, FrameHud, PoseFrame, RepRecord};
use rep_detect_rehab::{RehabCalfDetector, RehabCalfParams};
use rep_detect_squat::{SquatDetector, SquatParams};

use crate::exercise::Exercise;

/// One detector of any supported exercise behind a single concrete type.
///
/// Hosts that pick the exercise at runtime (a CLI flag, a menu entry) build
/// this instead of naming a detector type; everything else goes through the
/// shared [`Detector`] trait.
pub enum ExerciseDetector {
    Calf(CalfDetector),
    Squat(SquatDetector),
    RehabCalf(RehabCalfDetector),
}

impl ExerciseDetector {
    /// Detector for `exercise` with that exercise's default parameters.
    pub fn new(exercise: Exercise) -> Self {
        match exercise {
            Exercise::Calf => CalfDetector::new(CalfParams::default()).into(),
            Exercise::Squat => SquatDetector::new(SquatParams::default()).into(),
            Exercise::RehabCalf => RehabCalfDetector::new(RehabCalfParams::default()).into(),
        }
    }

    pub fn exercise(&self) -> Exercise {
        match self {
            ExerciseDetector::Calf(_) => Exercise::Calf,
            ExerciseDetector::Squat(_) => Exercise::Squat,
            ExerciseDetector::RehabCalf(_) => Exercise::RehabCalf,
        }
    }

    /// Frames fed into the detector so far, no-op frames included.
    pub fn frames_sampled(&self) -> u64 {
        match self {
            ExerciseDetector::Calf(d) => d.frames_sampled(),
            ExerciseDetector::Squat(d) => d.frames_sampled(),
            ExerciseDetector::RehabCalf(d) => d.frames_sampled(),
        }
    }

    /// Active parameter set as a JSON value, for session reports.
    pub fn params_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ExerciseDetector::Calf(d) => serde_json::to_value(d.params()),
            ExerciseDetector::Squat(d) => serde_json::to_value(d.params()),
            ExerciseDetector::RehabCalf(d) => serde_json::to_value(d.params()),
        }
    }
}

impl From<CalfDetector> for ExerciseDetector {
    fn from(d: CalfDetector) -> Self {
        ExerciseDetector::Calf(d)
    }
}

impl From<SquatDetector> for ExerciseDetector {
    fn from(d: SquatDetector) -> Self {
        ExerciseDetector::Squat(d)
    }
}

impl From<RehabCalfDetector> for ExerciseDetector {
    fn from(d: RehabCalfDetector) -> Self {
        ExerciseDetector::RehabCalf(d)
    }
}

impl Detector for ExerciseDetector {
    fn on_frame(&mut self, frame: &PoseFrame) -> FrameHud {
        match self {
            ExerciseDetector::Calf(d) => d.on_frame(frame),
            ExerciseDetector::Squat(d) => d.on_frame(frame),
            ExerciseDetector::RehabCalf(d) => d.on_frame(frame),
        }
    }

    fn counts(&self) -> Counts {
        match self {
            ExerciseDetector::Calf(d) => d.counts(),
            ExerciseDetector::Squat(d) => d.counts(),
            ExerciseDetector::RehabCalf(d) => d.counts(),
        }
    }

    fn drain_records(&mut self) -> Vec<RepRecord> {
        match self {
            ExerciseDetector::Calf(d) => d.drain_records(),
            ExerciseDetector::Squat(d) => d.drain_records(),
            ExerciseDetector::RehabCalf(d) => d.drain_records(),
        }
    }

    fn peek_recent(&self, limit: usize) -> Vec<RepRecord> {
        match self {
            ExerciseDetector::Calf(d) => d.peek_recent(limit),
            ExerciseDetector::Squat(d) => d.peek_recent(limit),
            ExerciseDetector::RehabCalf(d) => d.peek_recent(limit),
        }
    }

    fn reset(&mut self) {
        match self {
            ExerciseDetector::Calf(d) => d.reset(),
            ExerciseDetector::Squat(d) => d.reset(),
            ExerciseDetector::RehabCalf(d) => d.reset(),
        }
    }
}
