//! Rehabilitation calf-raise detector built on top of `rep-detect-core`.
//!
//! ## Quickstart
//!
//! ```
//! use rep_detect_rehab::{RehabCalfDetector, RehabCalfParams};
//! use rep_detect_core::{joints, Detector, JointSample, PoseFrame};
//!
//! let mut detector = RehabCalfDetector::new(RehabCalfParams::default());
//!
//! let mut frame = PoseFrame::new(640, 480, 30.0, 0);
//! frame.insert(joints::LEFT_ANKLE, JointSample::new(0.45, 0.7).with_visibility(0.9));
//! frame.insert(joints::LEFT_HEEL, JointSample::new(0.4, 0.8).with_visibility(0.9));
//! frame.insert(joints::LEFT_TOE, JointSample::new(0.5, 0.8).with_visibility(0.9));
//!
//! let hud = detector.on_frame(&frame);
//! println!("state: {} angle: {:?}", hud.state, hud.angle_deg);
//! ```
//!
//! The angle is the averaged bilateral ankle-heel-toe vertex angle, smoothed
//! with an EMA. States step STAND -> RAISING -> HOLDING -> LOWERING ->
//! STAND; a raise that falls too fast before reaching the hold band fails as
//! unstable, and releasing the hold before the target time fails as an early
//! lower.

mod detector;
mod params;

pub use detector::RehabCalfDetector;
pub use params::RehabCalfParams;
