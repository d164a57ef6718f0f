use serde::{Deserialize, Serialize};

/// Parameters for calf-raise detection.
///
/// All angle thresholds operate on the *delta* angle — the smoothed absolute
/// lift angle minus the angle latched when a repetition starts — except the
/// `stand_still_*` calibration ceilings, which see raw geometry.
///
/// Defaults are the canonical parameter set. The engine does not validate
/// combinations; contradictory bands (e.g. `a_min > a_max`) produce
/// undefined but non-crashing classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalfParams {
    /// Success window: lowest delta angle.
    pub a_min: f32,
    /// Success window: highest delta angle.
    pub a_max: f32,
    /// Delta angle at or under which the foot counts as "down".
    pub idle_threshold: f32,
    /// Continuous time the delta must stay in [a_min, a_max] for success.
    pub hold_seconds: f32,
    /// EMA weight for the newest angle sample.
    pub ema_alpha: f32,
    /// Absolute-angle clamp ceiling, suppresses single-frame spikes.
    pub angle_noise_max: f32,
    /// Symmetric slack around the success window while holding.
    pub hold_tolerance_deg: f32,

    /// Delta angle required to leave IDLE after rest gating.
    pub raise_enter_deg: f32,
    /// Delta angle that bypasses rest gating entirely (abrupt motions).
    pub fast_raise_enter_deg: f32,
    /// Low-angle rest required before a new attempt may start.
    pub rest_need_sec: f32,
    /// Window after RAISING entry during which the latched base angle may
    /// be revised downward (unstable starting stance).
    pub base_grace_sec: f32,

    /// Consecutive sub-idle frames that confirm a hold release.
    pub exit_debounce_frames: u32,
    /// Alternative time-based release confirmation.
    pub exit_grace_sec: f32,

    // Initial baseline lock (CALIB: stand still).
    pub stand_still_frames: u32,
    pub stand_still_speed_px: f32,
    pub stand_still_slope_max_deg: f32,
    pub stand_still_angle_max: f32,
    pub max_calib_wait_ms: u64,
    /// Last-resort lock timeout, applied regardless of speed.
    pub calib_fallback_wait_ms: u64,
    pub min_foot_len_px: f32,
    pub min_foot_len_ratio: f32,

    // Ground-contact guard while holding.
    pub calib_jitter_px: f32,
    pub calib_jitter_ratio: f32,
    /// Toe-lift allowance as a fraction of the baseline length.
    pub toe_lift_len_ratio: f32,
    pub enforce_toe_ground: bool,

    // Two-tier baseline maintenance during IDLE.
    pub soft_drift_px: f32,
    pub soft_len_drift_ratio: f32,
    pub soft_slope_max_deg: f32,
    pub hard_drift_px: f32,
    pub hard_len_drift_ratio: f32,
    pub hard_slope_max_deg: f32,
    pub recalib_fast_frames: u32,
    pub recalib_fast_timeout_ms: u64,
    pub recalib_cooldown_after_idle_ms: u64,
    pub recalib_need_stationary_frames: u32,
    pub recalib_require_consec_frames: u32,

    /// Escape hatch: leave COOLDOWN after this long even if the delta never
    /// settles under the idle threshold.
    pub cooldown_max_sec: f32,
}

impl Default for CalfParams {
    fn default() -> Self {
        Self {
            a_min: 7.5,
            a_max: 45.0,
            idle_threshold: 6.0,
            hold_seconds: 2.5,
            ema_alpha: 0.35,
            angle_noise_max: 60.0,
            hold_tolerance_deg: 1.0,

            raise_enter_deg: 6.0,
            fast_raise_enter_deg: 20.0,
            rest_need_sec: 0.25,
            base_grace_sec: 0.3,

            exit_debounce_frames: 3,
            exit_grace_sec: 0.25,

            stand_still_frames: 8,
            stand_still_speed_px: 8.0,
            stand_still_slope_max_deg: 20.0,
            stand_still_angle_max: 6.0,
            max_calib_wait_ms: 2500,
            calib_fallback_wait_ms: 4000,
            min_foot_len_px: 40.0,
            min_foot_len_ratio: 0.08,

            calib_jitter_px: 10.0,
            calib_jitter_ratio: 0.012,
            toe_lift_len_ratio: 0.03,
            enforce_toe_ground: true,

            soft_drift_px: 15.0,
            soft_len_drift_ratio: 0.25,
            soft_slope_max_deg: 25.0,
            hard_drift_px: 40.0,
            hard_len_drift_ratio: 0.50,
            hard_slope_max_deg: 45.0,
            recalib_fast_frames: 4,
            recalib_fast_timeout_ms: 1200,
            recalib_cooldown_after_idle_ms: 1200,
            recalib_need_stationary_frames: 6,
            recalib_require_consec_frames: 8,

            cooldown_max_sec: 2.0,
        }
    }
}
