//! Calf-raise repetition detector built on top of `rep-detect-core`.
//!
//! ## Quickstart
//!
//! ```
//! use rep_detect_calf::{CalfDetector, CalfParams};
//! use rep_detect_core::{joints, Detector, JointSample, PoseFrame};
//!
//! let mut detector = CalfDetector::new(CalfParams::default());
//!
//! let mut frame = PoseFrame::new(640, 480, 30.0, 0);
//! frame.insert(joints::LEFT_TOE, JointSample::new(0.2, 0.85).with_visibility(0.9));
//! frame.insert(joints::LEFT_HEEL, JointSample::new(0.5, 0.85).with_visibility(0.9));
//!
//! let hud = detector.on_frame(&frame);
//! println!("state: {}", hud.state);
//! ```
//!
//! Pipeline per frame:
//! 1. Lock the toe-heel baseline once the subject stands still (CALIB).
//! 2. Measure the heel's perpendicular lift above the baseline, convert it
//!    to an absolute angle, smooth it with an EMA, and clamp spikes.
//! 3. Work in delta angle: absolute angle minus the value latched when the
//!    current repetition entered RAISING.
//! 4. Step IDLE -> RAISING -> HOLDING -> COOLDOWN on delta thresholds; a
//!    continuous stay inside the success window for the hold target scores
//!    the repetition.
//! 5. While idling, watch the baseline for drift: nudge on soft breaches,
//!    discard and fast-recalibrate on sustained hard breaches.

mod baseline;
mod detector;
mod params;

pub use baseline::Baseline;
pub use detector::CalfDetector;
pub use params::CalfParams;
