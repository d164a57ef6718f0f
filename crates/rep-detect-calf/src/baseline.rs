//! Toe-heel baseline: initial lock and drift maintenance.
//!
//! The baseline is the two-point reference line every lift measurement is
//! taken against. It locks once the subject stands still, then stays under
//! watch while the machine idles: small drift nudges the stored endpoints
//! toward the current measurement, large sustained drift discards the lock
//! and forces a fast recalibration.

use std::time::{Duration, Instant};

use nalgebra::Point2;

use rep_detect_core::perpendicular_distance;

use crate::params::CalfParams;

/// A locked toe-heel reference line in pixel space.
#[derive(Clone, Copy, Debug)]
pub struct Baseline {
    pub toe: Point2<f32>,
    pub heel: Point2<f32>,
    pub len_px: f32,
}

impl Baseline {
    /// Perpendicular lift of a point above the reference line.
    pub fn lift_of(&self, p: Point2<f32>) -> f32 {
        perpendicular_distance(p, self.toe, self.heel)
    }

    /// Largest endpoint displacement from the locked positions.
    fn drift_px(&self, toe: Point2<f32>, heel: Point2<f32>) -> f32 {
        let d_toe = (toe - self.toe).norm();
        let d_heel = (heel - self.heel).norm();
        d_toe.max(d_heel)
    }

    /// Relative change of segment length versus the locked length.
    fn len_ratio(&self, toe: Point2<f32>, heel: Point2<f32>) -> f32 {
        let len = (heel - toe).norm();
        (len - self.len_px).abs() / self.len_px.max(1.0)
    }

    /// Blend the locked endpoints toward the current measurement (soft
    /// refresh, 20% current / 80% stored) and recompute the length.
    fn nudge_toward(&mut self, toe: Point2<f32>, heel: Point2<f32>) {
        const A: f32 = 0.2;
        self.toe = Point2::new(
            A * toe.x + (1.0 - A) * self.toe.x,
            A * toe.y + (1.0 - A) * self.toe.y,
        );
        self.heel = Point2::new(
            A * heel.x + (1.0 - A) * self.heel.x,
            A * heel.y + (1.0 - A) * self.heel.y,
        );
        self.len_px = (self.heel - self.toe).norm();
    }
}

/// Toe-to-heel slope versus horizontal, in degrees.
fn slope_deg(toe: Point2<f32>, heel: Point2<f32>) -> f32 {
    (heel.y - toe.y).atan2(heel.x - toe.x).to_degrees().abs()
}

/// Stand-still watcher for the CALIB phase.
///
/// Counts consecutive frames where both endpoints are slow, the line is
/// close to horizontal, and the angle proxy is small; wall-clock timeouts
/// provide lock paths for subjects who never quite settle.
#[derive(Clone, Debug)]
pub(crate) struct CalibPhase {
    fast: bool,
    stable_count: u32,
    prev_toe: Option<Point2<f32>>,
    prev_heel: Option<Point2<f32>>,
    prev_ts_ns: Option<i64>,
    started: Option<Instant>,
}

impl CalibPhase {
    pub fn new(fast: bool) -> Self {
        Self {
            fast,
            stable_count: 0,
            prev_toe: None,
            prev_heel: None,
            prev_ts_ns: None,
            started: None,
        }
    }

    /// Feed one frame; returns the locked baseline once the subject is
    /// judged stationary and the segment is long enough.
    pub fn step(
        &mut self,
        params: &CalfParams,
        toe: Point2<f32>,
        heel: Point2<f32>,
        ts_ns: i64,
        frame_height: f32,
    ) -> Option<Baseline> {
        let dt_sec = match self.prev_ts_ns {
            Some(prev) if ts_ns > prev => (ts_ns - prev) as f32 / 1e9,
            _ => 0.0,
        };
        let toe_speed = match (self.prev_toe, dt_sec > 0.0) {
            (Some(prev), true) => (toe - prev).norm() / dt_sec,
            _ => 0.0,
        };
        let heel_speed = match (self.prev_heel, dt_sec > 0.0) {
            (Some(prev), true) => (heel - prev).norm() / dt_sec,
            _ => 0.0,
        };
        self.prev_toe = Some(toe);
        self.prev_heel = Some(heel);
        self.prev_ts_ns = Some(ts_ns);

        let slope = slope_deg(toe, heel);
        let len_raw = (heel - toe).norm().max(1.0);
        let lift_proxy = (heel.y - toe.y).abs();
        let angle_proxy = lift_proxy.atan2(len_raw).to_degrees();

        let started = *self.started.get_or_insert_with(Instant::now);
        let waited = started.elapsed();

        let frames_need = if self.fast {
            params.recalib_fast_frames
        } else {
            params.stand_still_frames
        };
        let timeout = Duration::from_millis(if self.fast {
            params.recalib_fast_timeout_ms
        } else {
            params.max_calib_wait_ms
        });

        let still_enough = toe_speed <= params.stand_still_speed_px
            && heel_speed <= params.stand_still_speed_px
            && slope <= params.stand_still_slope_max_deg
            && angle_proxy <= params.stand_still_angle_max;

        self.stable_count = if still_enough {
            self.stable_count + 1
        } else {
            0
        };

        let long_enough =
            len_raw >= params.min_foot_len_px.max(params.min_foot_len_ratio * frame_height);
        let ok_by_frames = self.stable_count >= frames_need;
        let ok_by_timeout = waited >= timeout
            && toe_speed <= params.stand_still_speed_px * 2.0
            && heel_speed <= params.stand_still_speed_px * 2.0;
        let ok_by_fallback = waited >= Duration::from_millis(params.calib_fallback_wait_ms);

        if (ok_by_frames || ok_by_timeout || ok_by_fallback) && long_enough {
            log::debug!(
                "[CALF] baseline locked: len={len_raw:.1}px slope={slope:.1} stable={}",
                self.stable_count
            );
            return Some(Baseline {
                toe,
                heel,
                len_px: len_raw,
            });
        }
        None
    }
}

/// What the idle-phase drift watcher decided for this frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DriftVerdict {
    /// Baseline still valid (possibly not evaluated yet).
    Steady,
    /// Soft breach; the baseline was nudged toward the current measurement.
    Nudged,
    /// Hard breach sustained; the lock must be discarded.
    Recalibrate,
}

/// Drift watcher active while the state machine idles.
///
/// Rate-limited by wall-clock cooldowns so a re-lock cannot oscillate with
/// the state machine, and armed only after the endpoints have been nearly
/// stationary for a run of frames.
#[derive(Clone, Debug)]
pub(crate) struct IdleWatch {
    allow_after: Instant,
    stationary_consec: u32,
    soft_consec: u32,
    hard_consec: u32,
    last_toe: Point2<f32>,
    last_heel: Point2<f32>,
}

impl IdleWatch {
    pub fn enter(toe: Point2<f32>, heel: Point2<f32>, cooldown: Duration) -> Self {
        Self {
            allow_after: Instant::now() + cooldown,
            stationary_consec: 0,
            soft_consec: 0,
            hard_consec: 0,
            last_toe: toe,
            last_heel: heel,
        }
    }

    pub fn observe(
        &mut self,
        params: &CalfParams,
        baseline: &mut Baseline,
        abs_angle: f32,
        toe: Point2<f32>,
        heel: Point2<f32>,
    ) -> DriftVerdict {
        if Instant::now() < self.allow_after {
            return DriftVerdict::Steady;
        }
        // Only judge drift while the foot is down.
        if abs_angle > params.idle_threshold * 0.6 {
            return DriftVerdict::Steady;
        }

        let px_per_frame = (toe - self.last_toe)
            .norm()
            .max((heel - self.last_heel).norm());
        if px_per_frame <= (baseline.len_px * 0.005).max(1.0) {
            self.stationary_consec += 1;
        } else {
            self.stationary_consec = 0;
        }
        let stationary = self.stationary_consec >= params.recalib_need_stationary_frames;
        self.last_toe = toe;
        self.last_heel = heel;
        if !stationary {
            return DriftVerdict::Steady;
        }

        let drift = baseline.drift_px(toe, heel);
        let slope = slope_deg(toe, heel);
        let len_ratio = baseline.len_ratio(toe, heel);

        let soft_hit = drift > params.soft_drift_px.max(baseline.len_px * params.soft_len_drift_ratio)
            || slope > params.soft_slope_max_deg
            || len_ratio > params.soft_len_drift_ratio;
        let hard_hit = drift > params.hard_drift_px.max(baseline.len_px * params.hard_len_drift_ratio)
            || slope > params.hard_slope_max_deg
            || len_ratio > params.hard_len_drift_ratio;

        self.soft_consec = if soft_hit { self.soft_consec + 1 } else { 0 };
        self.hard_consec = if hard_hit { self.hard_consec + 1 } else { 0 };

        if self.hard_consec >= params.recalib_require_consec_frames {
            log::info!(
                "[CALF] hard baseline drift ({drift:.1}px, slope {slope:.1}), recalibrating"
            );
            self.hard_consec = 0;
            self.soft_consec = 0;
            self.stationary_consec = 0;
            self.allow_after =
                Instant::now() + Duration::from_millis(params.recalib_cooldown_after_idle_ms);
            return DriftVerdict::Recalibrate;
        }

        if !hard_hit && soft_hit {
            baseline.nudge_toward(toe, heel);
            return DriftVerdict::Nudged;
        }

        DriftVerdict::Steady
    }
}
