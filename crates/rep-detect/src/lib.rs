//! High-level facade crate for the `rep-detect-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying detector crates
//! - runtime exercise selection behind one concrete [`ExerciseDetector`] type
//! - end-of-session reporting via [`SessionSummary`]
//!
//! ## Quickstart
//!
//! ```
//! use rep_detect::{Detector, Exercise, ExerciseDetector, SessionSummary};
//! use rep_detect::{joints, JointSample, PoseFrame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let exercise: Exercise = "squat".parse()?;
//! let mut detector = ExerciseDetector::new(exercise);
//!
//! // One frame per pose-estimation result; joints the exercise does not
//! // use are simply ignored.
//! let mut frame = PoseFrame::new(640, 480, 30.0, 0);
//! frame.insert(joints::LEFT_HIP, JointSample::new(0.4, 0.3).with_visibility(0.9));
//! frame.insert(joints::LEFT_KNEE, JointSample::new(0.4, 0.55).with_visibility(0.9));
//! frame.insert(joints::LEFT_ANKLE, JointSample::new(0.4, 0.8).with_visibility(0.9));
//! let hud = detector.on_frame(&frame);
//! println!("state: {} success: {}", hud.state, hud.success);
//!
//! let summary = SessionSummary::capture(&mut detector, 30.0)?;
//! println!("{}", summary.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `rep_detect::core`: frames, joints, geometry, the [`Detector`] trait,
//!   the repetition ledger.
//! - `rep_detect::calf`: standing calf-raise detector with pixel-baseline
//!   calibration and ground-contact checks.
//! - `rep_detect::squat`: knee-angle squat detector with pluggable side
//!   selection.
//! - `rep_detect::rehab`: seated rehabilitation calf-raise detector with
//!   raise-stability checks.
//!
//! Detectors are pure state machines over [`PoseFrame`] inputs; nothing in
//! this workspace talks to a camera or a pose-estimation model.

pub use rep_detect_calf as calf;
pub use rep_detect_core as core;
pub use rep_detect_rehab as rehab;
pub use rep_detect_squat as squat;

pub use rep_detect_calf::{CalfDetector, CalfParams};
pub use rep_detect_core::{
    joints, Counts, Detector, DiagValue, FrameHud, JointSample, Outcome, PoseFrame, RepLedger,
    RepRecord, Side,
};
pub use rep_detect_rehab::{RehabCalfDetector, RehabCalfParams};
pub use rep_detect_squat::{AutoSide, FixedSide, SideReading, SideStrategy, SquatDetector, SquatParams};

mod detector;
mod exercise;
mod session;

pub use detector::ExerciseDetector;
pub use exercise::{Exercise, ParseExerciseError};
pub use session::{SessionError, SessionSummary};
