use serde::{Deserialize, Serialize};

/// Parameters for the rehabilitation calf-raise variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RehabCalfParams {
    /// EMA weight for the newest angle sample.
    pub ema_alpha: f32,
    /// Hold time required in HOLDING for a success.
    pub hold_seconds: f32,
    /// Smoothed angle that starts a raise.
    pub raise_enter_deg: f32,
    /// Smoothed angle that starts the hold.
    pub hold_min_deg: f32,
    /// Dropping under this while holding counts as an early release.
    pub lower_exit_deg: f32,
    /// Angle at or under which the subject is back at rest.
    pub idle_threshold: f32,
    /// Downward angular speed bound during the raise, degrees per second
    /// scaled by the host fps estimate.
    pub max_lower_speed_deg: f32,
}

impl Default for RehabCalfParams {
    fn default() -> Self {
        Self {
            ema_alpha: 0.35,
            hold_seconds: 3.0,
            raise_enter_deg: 3.0,
            hold_min_deg: 5.0,
            lower_exit_deg: 6.0,
            idle_threshold: 3.0,
            max_lower_speed_deg: 40.0,
        }
    }
}
