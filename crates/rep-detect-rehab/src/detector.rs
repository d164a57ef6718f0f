use rep_detect_core::{
    joints, point_angle_deg, Counts, Detector, Ema, FpsMeter, FrameHud, Outcome, PoseFrame,
    RepLedger, RepRecord,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::RehabCalfParams;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RehabState {
    Stand,
    Raising,
    Holding,
    Lowering,
}

impl RehabState {
    fn as_str(self) -> &'static str {
        match self {
            RehabState::Stand => "STAND",
            RehabState::Raising => "RAISING",
            RehabState::Holding => "HOLDING",
            RehabState::Lowering => "LOWERING",
        }
    }
}

/// Rehabilitation calf-raise detector.
///
/// Works on the averaged bilateral ankle-heel-toe vertex angle, falling back
/// to whichever side is measurable. Unlike the full calf detector there is
/// no baseline calibration; instead the raise itself is checked for
/// stability via the instantaneous angular velocity.
pub struct RehabCalfDetector {
    params: RehabCalfParams,
    state: RehabState,
    ema: Ema,
    last_angle: f32,
    last_ts_ns: Option<i64>,
    hold_sec: f32,
    ledger: RepLedger,
    fps_meter: FpsMeter,
    frames_sampled: u64,
}

impl Default for RehabCalfDetector {
    fn default() -> Self {
        Self::new(RehabCalfParams::default())
    }
}

impl RehabCalfDetector {
    pub fn new(params: RehabCalfParams) -> Self {
        let ema = Ema::new(params.ema_alpha);
        Self {
            params,
            state: RehabState::Stand,
            ema,
            last_angle: 0.0,
            last_ts_ns: None,
            hold_sec: 0.0,
            ledger: RepLedger::new(),
            fps_meter: FpsMeter::new(),
            frames_sampled: 0,
        }
    }

    pub fn params(&self) -> &RehabCalfParams {
        &self.params
    }

    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    fn foot_angle(frame: &PoseFrame, ankle: &str, heel: &str, toe: &str) -> Option<f32> {
        let a = frame.joint(ankle)?;
        let h = frame.joint(heel)?;
        let t = frame.joint(toe)?;
        Some(point_angle_deg(a.position, h.position, t.position))
    }

    fn no_op_hud(&self) -> FrameHud {
        let counts = self.ledger.counts();
        FrameHud::empty(
            self.state.as_str(),
            self.hold_sec,
            counts.success,
            counts.fail,
        )
    }

    fn last_dt_sec(&mut self, ts_ns: i64) -> f32 {
        match self.last_ts_ns.replace(ts_ns) {
            Some(prev) => (ts_ns - prev).max(0) as f32 / 1e9,
            None => 0.0,
        }
    }

    fn commit(&mut self, outcome: Outcome, angle: f32, hold_sec: f32) {
        let min_angle = outcome.is_success().then_some(angle);
        let id = self
            .ledger
            .outcome(outcome, Some(angle), angle, hold_sec, None, min_angle);
        log::info!(
            "[REHAB LOG] id={id} angle={angle:.1} hold={hold_sec:.2} outcome={outcome}"
        );
    }
}

impl Detector for RehabCalfDetector {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(ts = frame.timestamp_ns))
    )]
    fn on_frame(&mut self, frame: &PoseFrame) -> FrameHud {
        self.frames_sampled += 1;
        // Consume the timestamp on every call, usable input or not, so a
        // tracking dropout never spans more than one frame interval of dt.
        let dt = self.last_dt_sec(frame.timestamp_ns);

        let left = Self::foot_angle(frame, joints::LEFT_ANKLE, joints::LEFT_HEEL, joints::LEFT_TOE);
        let right = Self::foot_angle(
            frame,
            joints::RIGHT_ANKLE,
            joints::RIGHT_HEEL,
            joints::RIGHT_TOE,
        );
        let raw = match (left, right) {
            (Some(l), Some(r)) => (l + r) / 2.0,
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => return self.no_op_hud(),
        };

        let smooth = self.ema.update(raw);
        let dtheta = (smooth - self.last_angle) / dt.max(1e-5);
        self.last_angle = smooth;

        match self.state {
            RehabState::Stand => {
                if smooth >= self.params.raise_enter_deg {
                    self.ledger.transition("STAND", "RAISING", smooth);
                    self.state = RehabState::Raising;
                    self.hold_sec = 0.0;
                }
            }
            RehabState::Raising => {
                if smooth >= self.params.hold_min_deg {
                    self.ledger.transition("RAISING", "HOLDING", smooth);
                    self.state = RehabState::Holding;
                    self.hold_sec = 0.0;
                } else if dtheta < -self.params.max_lower_speed_deg / frame.fps.max(1.0) {
                    self.commit(Outcome::UnstableRaise, smooth, 0.0);
                    self.ledger.transition("RAISING", "LOWERING", smooth);
                    self.state = RehabState::Lowering;
                }
            }
            RehabState::Holding => {
                self.hold_sec += dt;
                if self.hold_sec >= self.params.hold_seconds {
                    self.commit(Outcome::Success, smooth, self.hold_sec);
                    self.ledger.transition("HOLDING", "LOWERING", smooth);
                    self.state = RehabState::Lowering;
                } else if smooth < self.params.lower_exit_deg {
                    self.commit(Outcome::EarlyLower, smooth, 0.0);
                    self.ledger.transition("HOLDING", "LOWERING", smooth);
                    self.state = RehabState::Lowering;
                }
            }
            RehabState::Lowering => {
                if smooth <= self.params.idle_threshold {
                    self.ledger.transition("LOWERING", "STAND", smooth);
                    self.state = RehabState::Stand;
                    self.hold_sec = 0.0;
                }
            }
        }

        let counts = self.ledger.counts();
        let fps = self.fps_meter.update(frame.timestamp_ns);
        FrameHud {
            angle_deg: Some(smooth),
            state: self.state.as_str(),
            hold_sec: self.hold_sec,
            success: counts.success,
            fail: counts.fail,
            extra: Default::default(),
        }
        .with_extra("fps", fps)
        .with_extra("speedDegPerSec", dtheta)
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
