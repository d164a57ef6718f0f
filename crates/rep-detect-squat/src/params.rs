use serde::{Deserialize, Serialize};

/// Parameters for squat detection.
///
/// Depth classification works on the minimum smoothed hip-knee-ankle angle
/// observed while DOWN: the success band, a known fail band, and everything
/// else as invalid depth. The engine does not validate band ordering.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SquatParams {
    /// Smoothed angle at or above which the subject counts as standing.
    pub stand_up_deg: f32,
    /// Margin under `stand_up_deg` required to enter DOWN.
    pub down_enter_margin_deg: f32,
    /// Success depth band: lowest acceptable minimum angle.
    pub succ_min_deg: f32,
    /// Success depth band: highest acceptable minimum angle.
    pub succ_max_deg: f32,
    /// Known-fail depth band (too shallow), lower bound.
    pub fail_min_deg: f32,
    /// Known-fail depth band (too shallow), upper bound.
    pub fail_max_deg: f32,
    /// EMA weight for the newest angle sample.
    pub ema_alpha: f32,
    /// Per-joint visibility floor below which a side has no valid angle.
    pub visibility_floor: f32,
    /// Minimum side visibility for the confident tier of auto selection.
    pub side_confidence: f32,
}

impl Default for SquatParams {
    fn default() -> Self {
        Self {
            stand_up_deg: 170.0,
            down_enter_margin_deg: 5.0,
            succ_min_deg: 95.0,
            succ_max_deg: 135.0,
            fail_min_deg: 136.0,
            fail_max_deg: 162.0,
            ema_alpha: 0.35,
            visibility_floor: 0.5,
            side_confidence: 0.6,
        }
    }
}
