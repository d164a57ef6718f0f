use nalgebra::Point2;

use rep_detect_core::{
    joints, Counts, Detector, Ema, FpsMeter, FrameHud, Outcome, PoseFrame, RepLedger, RepRecord,
    Side,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::baseline::{Baseline, CalibPhase, DriftVerdict, IdleWatch};
use crate::params::CalfParams;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CalfState {
    Calib,
    Idle,
    Raising,
    Holding,
    Cooldown,
}

impl CalfState {
    fn as_str(self) -> &'static str {
        match self {
            CalfState::Calib => "CALIB",
            CalfState::Idle => "IDLE",
            CalfState::Raising => "RAISING",
            CalfState::Holding => "HOLDING",
            CalfState::Cooldown => "COOLDOWN",
        }
    }
}

/// Per-repetition measurement window.
#[derive(Clone, Copy, Debug, Default)]
struct RepWindow {
    /// Resting reference angle. Tracks the smoothed absolute angle with a
    /// slow blend while the machine idles at rest, and latches when a
    /// repetition leaves IDLE; all thresholds operate on the delta above it.
    base_deg: f32,
    peak_delta: f32,
    /// Continuous time spent inside the success band.
    window_hold_sec: f32,
    /// Displayed hold time; mirrors the window while holding.
    hold_sec: f32,
    /// Time accumulated inside the small-movement band during RAISING.
    small_hold_sec: f32,
    /// Time since RAISING was entered, for the base-revision grace window.
    raising_elapsed: f32,
    /// Debounce bookkeeping for the hold release.
    low_consec: u32,
    low_elapsed: f32,
    cooldown_elapsed: f32,
}

/// Rest gating: a new attempt needs a run of low-delta frames first.
#[derive(Clone, Copy, Debug, Default)]
struct RestGate {
    rest_frames: u32,
    can_raise: bool,
}

/// Calf-raise repetition detector.
///
/// The design reference of the detector family: baseline calibration with
/// drift maintenance, delta-angle thresholds with rest gating, a debounced
/// hold window, and a cooldown between repetitions. See the crate docs for
/// the state diagram.
pub struct CalfDetector {
    params: CalfParams,
    state: CalfState,
    ema: Ema,
    ledger: RepLedger,
    baseline: Option<Baseline>,
    calib: CalibPhase,
    idle_watch: Option<IdleWatch>,
    rep: RepWindow,
    gate: RestGate,
    side: Option<Side>,
    last_ts_ns: Option<i64>,
    fps_meter: FpsMeter,
    frames_sampled: u64,
}

impl Default for CalfDetector {
    fn default() -> Self {
        Self::new(CalfParams::default())
    }
}

impl CalfDetector {
    pub fn new(params: CalfParams) -> Self {
        let ema = Ema::new(params.ema_alpha);
        Self {
            params,
            state: CalfState::Calib,
            ema,
            ledger: RepLedger::new(),
            baseline: None,
            calib: CalibPhase::new(false),
            idle_watch: None,
            rep: RepWindow::default(),
            gate: RestGate::default(),
            side: None,
            last_ts_ns: None,
            fps_meter: FpsMeter::new(),
            frames_sampled: 0,
        }
    }

    pub fn params(&self) -> &CalfParams {
        &self.params
    }

    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    /// Locked foot side, once one has been chosen.
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    fn no_op_hud(&self) -> FrameHud {
        let counts = self.ledger.counts();
        FrameHud::empty(
            self.state.as_str(),
            self.rep.hold_sec,
            counts.success,
            counts.fail,
        )
    }

    /// Choose toe/heel pixel positions, locking the foot side on first
    /// sight. The score prefers high visibility, breaking ties toward the
    /// foot lower in the frame.
    fn pick_foot(&mut self, frame: &PoseFrame) -> Option<(Point2<f32>, Point2<f32>)> {
        if self.side.is_none() {
            let score = |name: &str| {
                frame
                    .joint(name)
                    .map(|s| s.visibility.unwrap_or(0.0) * 1000.0 + s.position.y)
            };
            self.side = match (score(joints::LEFT_TOE), score(joints::RIGHT_TOE)) {
                (Some(l), Some(r)) => Some(if l >= r { Side::Left } else { Side::Right }),
                (Some(_), None) => Some(Side::Left),
                (None, Some(_)) => Some(Side::Right),
                (None, None) => None,
            };
        }
        let (toe_name, heel_name, alt_toe, alt_heel) = match self.side? {
            Side::Left => (
                joints::LEFT_TOE,
                joints::LEFT_HEEL,
                joints::RIGHT_TOE,
                joints::RIGHT_HEEL,
            ),
            Side::Right => (
                joints::RIGHT_TOE,
                joints::RIGHT_HEEL,
                joints::LEFT_TOE,
                joints::LEFT_HEEL,
            ),
        };
        let toe = frame.joint_px(toe_name).or_else(|| frame.joint_px(alt_toe))?;
        let heel = frame
            .joint_px(heel_name)
            .or_else(|| frame.joint_px(alt_heel))?;
        Some((toe, heel))
    }

    fn last_dt_sec(&mut self, ts_ns: i64) -> f32 {
        match self.last_ts_ns.replace(ts_ns) {
            Some(prev) => (ts_ns - prev).max(0) as f32 / 1e9,
            None => 0.0,
        }
    }

    fn enter_idle(&mut self, toe: Point2<f32>, heel: Point2<f32>) {
        self.state = CalfState::Idle;
        self.idle_watch = Some(IdleWatch::enter(
            toe,
            heel,
            std::time::Duration::from_millis(self.params.recalib_cooldown_after_idle_ms),
        ));
        self.rep.small_hold_sec = 0.0;
        self.rep.low_consec = 0;
        self.rep.low_elapsed = 0.0;
        self.gate = RestGate::default();
        // The rep base stays latched; the next RAISING entry re-latches it.
    }

    fn enter_calib(&mut self, fast: bool) {
        self.state = CalfState::Calib;
        self.baseline = None;
        self.idle_watch = None;
        self.calib = CalibPhase::new(fast);
    }

    /// Finalize the active repetition from the hold window.
    fn finalize_rep(&mut self, success: bool) {
        let outcome = if success {
            Outcome::Success
        } else {
            Outcome::FailHoldShort
        };
        self.commit(outcome, self.rep.window_hold_sec);
    }

    fn commit(&mut self, outcome: Outcome, hold_sec: f32) {
        let id = self.ledger.outcome(
            outcome,
            Some(self.rep.base_deg),
            self.rep.peak_delta,
            hold_sec,
            self.side,
            None,
        );
        log::info!(
            "[CALF LOG] id={id} base={:.1} peak={:.1} hold={:.2} outcome={outcome}",
            self.rep.base_deg,
            self.rep.peak_delta,
            hold_sec,
        );
        self.rep.peak_delta = 0.0;
        self.rep.hold_sec = 0.0;
        self.rep.window_hold_sec = 0.0;
        self.rep.small_hold_sec = 0.0;
        self.rep.low_consec = 0;
        self.rep.low_elapsed = 0.0;
    }

    fn calib_hud(&mut self, frame: &PoseFrame, toe: Point2<f32>, heel: Point2<f32>) -> FrameHud {
        let counts = self.ledger.counts();
        let fps = self.fps_meter.update(frame.timestamp_ns);
        FrameHud::empty(self.state.as_str(), 0.0, counts.success, counts.fail)
            .with_extra("toeX", toe.x)
            .with_extra("toeY", toe.y)
            .with_extra("heelX", heel.x)
            .with_extra("heelY", heel.y)
            .with_extra("repBaseDeg", self.rep.base_deg)
            .with_extra("peakDeltaDeg", self.rep.peak_delta)
            .with_extra("holdTarget", self.params.hold_seconds)
            .with_extra("fps", fps)
    }
}

impl Detector for CalfDetector {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(ts = frame.timestamp_ns))
    )]
    fn on_frame(&mut self, frame: &PoseFrame) -> FrameHud {
        self.frames_sampled += 1;
        // Consume the timestamp on every call, usable input or not, so a
        // tracking dropout never spans more than one frame interval of dt.
        let dt = self.last_dt_sec(frame.timestamp_ns);

        let Some((toe, heel)) = self.pick_foot(frame) else {
            return self.no_op_hud();
        };

        // CALIB: lock the toe-heel baseline once the subject stands still.
        if self.state == CalfState::Calib {
            if let Some(baseline) = self.calib.step(
                &self.params,
                toe,
                heel,
                frame.timestamp_ns,
                frame.height as f32,
            ) {
                self.baseline = Some(baseline);
                self.ledger.transition("CALIB", "IDLE", 0.0);
                self.enter_idle(toe, heel);
            }
            return self.calib_hud(frame, toe, heel);
        }

        let Some(mut baseline) = self.baseline else {
            return self.no_op_hud();
        };

        // Ground-contact guard: the toe must stay near the baseline while
        // the heel holds, otherwise the whole foot left the ground.
        if self.params.enforce_toe_ground && self.state == CalfState::Holding {
            let toe_lift = baseline.lift_of(toe);
            let limit = self
                .params
                .calib_jitter_px
                .max(self.params.calib_jitter_ratio * frame.height as f32)
                .max(baseline.len_px * self.params.toe_lift_len_ratio);
            if toe_lift > limit {
                let hold = self.rep.window_hold_sec;
                self.commit(Outcome::ToeOffGround, hold);
                self.ledger.transition("HOLDING", "COOLDOWN", 0.0);
                self.state = CalfState::Cooldown;
                self.rep.cooldown_elapsed = 0.0;
            }
        }

        let heel_lift = baseline.lift_of(heel);
        let theta_abs = heel_lift.atan2(baseline.len_px).to_degrees();
        let abs_angle = self.ema.update(theta_abs).min(self.params.angle_noise_max);
        let mut delta = (abs_angle - self.rep.base_deg).max(0.0);

        match self.state {
            CalfState::Idle => {
                if let Some(watch) = self.idle_watch.as_mut() {
                    match watch.observe(&self.params, &mut baseline, abs_angle, toe, heel) {
                        DriftVerdict::Recalibrate => {
                            self.ledger.transition("IDLE", "CALIB", delta);
                            self.enter_calib(true);
                            return self.calib_hud(frame, toe, heel);
                        }
                        DriftVerdict::Nudged | DriftVerdict::Steady => {
                            self.baseline = Some(baseline);
                        }
                    }
                }

                // Rest gating: require a run of low-delta frames before the
                // next attempt may start. Once earned, the permission stays
                // latched until a repetition consumes it, so the smoothed
                // ramp through mid-range angles cannot revoke it. While at
                // rest the base angle trails the smoothed signal, so slow
                // stance settling does not accrue as a fake delta.
                let rest_need = ((self.params.rest_need_sec * frame.fps) as u32).max(3);
                if delta <= self.params.idle_threshold {
                    const REST_BASE_ALPHA: f32 = 0.1;
                    self.rep.base_deg += REST_BASE_ALPHA * (abs_angle - self.rep.base_deg);
                    delta = (abs_angle - self.rep.base_deg).max(0.0);
                    if self.gate.rest_frames < rest_need {
                        self.gate.rest_frames += 1;
                    }
                    if self.gate.rest_frames >= rest_need {
                        self.gate.can_raise = true;
                    }
                } else {
                    self.gate.rest_frames = 0;
                }

                self.rep.hold_sec = 0.0;
                self.rep.window_hold_sec = 0.0;
                self.rep.small_hold_sec = 0.0;

                // Leaving IDLE latches the rest base for the repetition.
                let raise_enter = self.params.raise_enter_deg.max(self.params.idle_threshold);
                let gated_entry = self.gate.can_raise && delta >= raise_enter;
                let fast_entry = delta >= self.params.fast_raise_enter_deg;
                if gated_entry || fast_entry {
                    self.ledger.transition("IDLE", "RAISING", delta);
                    self.state = CalfState::Raising;
                    self.rep.peak_delta = 0.0;
                    self.rep.raising_elapsed = 0.0;
                    self.gate.can_raise = false;
                    self.gate.rest_frames = 0;
                }
            }

            CalfState::Raising => {
                self.rep.raising_elapsed += dt;
                // Grace window: an unstable stance may push the latched base
                // above the true resting angle; revise it downward.
                if self.rep.raising_elapsed <= self.params.base_grace_sec
                    && abs_angle < self.rep.base_deg
                {
                    self.rep.base_deg = abs_angle;
                    delta = (abs_angle - self.rep.base_deg).max(0.0);
                }
                self.rep.peak_delta = self.rep.peak_delta.max(delta);

                // Tie-break order on one frame: small-kept timeout, then
                // success-band entry, then drop-out.
                let in_small = delta >= self.params.idle_threshold && delta < self.params.a_min;
                if in_small {
                    self.rep.small_hold_sec += dt;
                    if self.rep.small_hold_sec >= self.params.hold_seconds {
                        let hold = self.rep.small_hold_sec;
                        self.commit(Outcome::FailSmallKept, hold);
                        self.ledger.transition("RAISING", "COOLDOWN", delta);
                        self.state = CalfState::Cooldown;
                        self.rep.cooldown_elapsed = 0.0;
                    }
                } else if delta >= self.params.a_min {
                    self.ledger.transition("RAISING", "HOLDING", delta);
                    self.state = CalfState::Holding;
                    self.rep.window_hold_sec = 0.0;
                    self.rep.hold_sec = 0.0;
                    self.rep.small_hold_sec = 0.0;
                    self.rep.low_consec = 0;
                    self.rep.low_elapsed = 0.0;
                } else if delta < self.params.idle_threshold {
                    self.ledger.transition("RAISING", "IDLE", delta);
                    self.enter_idle(toe, heel);
                    self.rep.hold_sec = 0.0;
                    self.rep.window_hold_sec = 0.0;
                }
            }

            CalfState::Holding => {
                self.rep.peak_delta = self.rep.peak_delta.max(delta);

                let lo = self.params.a_min - self.params.hold_tolerance_deg;
                let hi = self.params.a_max + self.params.hold_tolerance_deg;
                if delta > hi {
                    // Overshooting the band restarts the continuous-hold
                    // clock entirely.
                    self.rep.window_hold_sec = 0.0;
                    self.rep.hold_sec = 0.0;
                    self.rep.low_consec = 0;
                    self.rep.low_elapsed = 0.0;
                } else if delta >= lo {
                    self.rep.window_hold_sec += dt;
                    self.rep.hold_sec = self.rep.window_hold_sec;
                    self.rep.low_consec = 0;
                    self.rep.low_elapsed = 0.0;
                } else if delta >= self.params.idle_threshold {
                    // Sagging under the band pauses the clock without
                    // restarting it.
                    self.rep.low_consec = 0;
                    self.rep.low_elapsed = 0.0;
                } else {
                    // Debounced release: jitter may dip under the idle
                    // threshold for a frame or two without the heel coming
                    // down for real.
                    self.rep.low_consec += 1;
                    self.rep.low_elapsed += dt;
                    if self.rep.low_consec >= self.params.exit_debounce_frames
                        || self.rep.low_elapsed >= self.params.exit_grace_sec
                    {
                        self.ledger.transition("HOLDING", "COOLDOWN", delta);
                        let success = self.rep.window_hold_sec >= self.params.hold_seconds;
                        self.finalize_rep(success);
                        self.state = CalfState::Cooldown;
                        self.rep.cooldown_elapsed = 0.0;
                    }
                }
            }

            CalfState::Cooldown => {
                self.rep.cooldown_elapsed += dt;
                let settled = delta < self.params.idle_threshold * 0.7;
                let timed_out = self.rep.cooldown_elapsed >= self.params.cooldown_max_sec;
                if settled || timed_out {
                    self.ledger.transition("COOLDOWN", "IDLE", delta);
                    self.enter_idle(toe, heel);
                }
            }

            CalfState::Calib => { /* handled before the angle computation */ }
        }

        let counts = self.ledger.counts();
        let fps = self.fps_meter.update(frame.timestamp_ns);
        FrameHud {
            angle_deg: Some(delta),
            state: self.state.as_str(),
            hold_sec: self.rep.hold_sec,
            success: counts.success,
            fail: counts.fail,
            extra: Default::default(),
        }
        .with_extra("baseToeX", baseline.toe.x)
        .with_extra("baseToeY", baseline.toe.y)
        .with_extra("baseHeelX", baseline.heel.x)
        .with_extra("baseHeelY", baseline.heel.y)
        .with_extra("heelLiftPx", heel_lift)
        .with_extra("absAngle", abs_angle)
        .with_extra("deltaDeg", delta)
        .with_extra("repBaseDeg", self.rep.base_deg)
        .with_extra("peakDeltaDeg", self.rep.peak_delta)
        .with_extra("holdTarget", self.params.hold_seconds)
        .with_extra("smallHoldSec", self.rep.small_hold_sec)
        .with_extra("fps", fps)
    }

    fn counts(&self) -> Counts {
        self.ledger.counts()
    }

    fn drain_records(&mut self) -> Vec<RepRecord> {
        self.ledger.drain()
    }

    fn peek_recent(&self, limit: usize) -> Vec<RepRecord> {
        self.ledger.peek_recent(limit)
    }

    fn reset(&mut self) {
        let params = self.params.clone();
        *self = Self::new(params);
    }
}
