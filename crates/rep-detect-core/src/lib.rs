//! Core types and utilities for exercise repetition detection.
//!
//! This crate is intentionally small and purely geometric/bookkeeping. It
//! does *not* depend on any pose-estimation provider: callers hand it one
//! [`PoseFrame`] of named joint samples per video frame and consume the
//! returned [`FrameHud`] plus whatever the [`RepLedger`] accumulated.

mod detector;
mod frame;
mod geometry;
mod hud;
mod ledger;
mod logger;
mod smooth;

pub use detector::Detector;
pub use frame::{joints, JointSample, PoseFrame};
pub use geometry::{perpendicular_distance, point_angle_deg};
pub use hud::{DiagValue, FrameHud};
pub use ledger::{epoch_ms, Counts, Outcome, RepLedger, RepRecord, Side};
pub use smooth::{Ema, FpsMeter};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
