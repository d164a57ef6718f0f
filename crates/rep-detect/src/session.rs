use rep_detect_core::{epoch_ms, Detector, RepRecord};
use serde::Serialize;
use thiserror::Error;

use crate::detector::ExerciseDetector;
use crate::exercise::Exercise;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("serializing session summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// End-of-session report: final counters, the parameter set that produced
/// them, and every ledger record pending at capture time.
///
/// `capture` drains the detector's ledger, so two captures back to back
/// split the records between them while the counters stay cumulative.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub exercise: Exercise,
    pub params: serde_json::Value,
    pub success: u32,
    pub fail: u32,
    pub total: u32,
    pub success_rate: f32,
    pub frames_sampled: u64,
    pub avg_fps: f32,
    pub finished_epoch_ms: u64,
    pub records: Vec<RepRecord>,
}

impl SessionSummary {
    pub fn capture(detector: &mut ExerciseDetector, avg_fps: f32) -> Result<Self, SessionError> {
        let counts = detector.counts();
        let success_rate = if counts.total > 0 {
            counts.success as f32 / counts.total as f32
        } else {
            0.0
        };
        Ok(Self {
            exercise: detector.exercise(),
            params: detector.params_value()?,
            success: counts.success,
            fail: counts.fail,
            total: counts.total,
            success_rate,
            frames_sampled: detector.frames_sampled(),
            avg_fps,
            finished_epoch_ms: epoch_ms(),
            records: detector.drain_records(),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
