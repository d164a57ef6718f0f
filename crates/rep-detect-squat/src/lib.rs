//! Squat repetition detector built on top of `rep-detect-core`.
//!
//! ## Quickstart
//!
//! ```
//! use rep_detect_squat::{SquatDetector, SquatParams};
//! use rep_detect_core::{joints, Detector, JointSample, PoseFrame};
//!
//! let mut detector = SquatDetector::new(SquatParams::default());
//!
//! let mut frame = PoseFrame::new(640, 480, 30.0, 0);
//! frame.insert(joints::LEFT_HIP, JointSample::new(0.45, 0.3).with_visibility(0.9));
//! frame.insert(joints::LEFT_KNEE, JointSample::new(0.45, 0.55).with_visibility(0.9));
//! frame.insert(joints::LEFT_ANKLE, JointSample::new(0.45, 0.8).with_visibility(0.9));
//!
//! let hud = detector.on_frame(&frame);
//! println!("state: {} angle: {:?}", hud.state, hud.angle_deg);
//! ```
//!
//! The detector smooths one leg's hip-knee-ankle angle, steps STAND -> DOWN
//! when the angle falls a margin under the stand-up threshold, and on return
//! to STAND classifies the minimum angle into success, known-fail, or
//! invalid depth. Which leg drives the angle is a [`SideStrategy`]; the
//! default prefers confident visibility and breaks ties toward the deeper
//! bend, and the choice locks for the duration of each repetition.

mod detector;
mod params;
mod side;

pub use detector::SquatDetector;
pub use params::SquatParams;
pub use side::{AutoSide, FixedSide, SideReading, SideStrategy};
