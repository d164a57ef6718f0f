use rep_detect_core::{
    joints, point_angle_deg, Counts, Detector, Ema, FpsMeter, FrameHud, Outcome, PoseFrame,
    RepLedger, RepRecord, Side,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::SquatParams;
use crate::side::{AutoSide, SideReading, SideStrategy};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SquatState {
    Stand,
    Down,
}

impl SquatState {
    fn as_str(self) -> &'static str {
        match self {
            SquatState::Stand => "STAND",
            SquatState::Down => "DOWN",
        }
    }
}

/// Squat repetition detector.
///
/// Tracks the EMA-smoothed hip-knee-ankle angle of one leg, chosen per
/// frame by a [`SideStrategy`] and locked for the duration of a repetition.
/// The minimum angle reached while DOWN classifies the repetition into the
/// success band, the known-fail band, or invalid depth.
pub struct SquatDetector {
    params: SquatParams,
    strategy: Box<dyn SideStrategy + Send>,
    state: SquatState,
    ema: Ema,
    min_angle: Option<f32>,
    active_side: Option<Side>,
    ledger: RepLedger,
    fps_meter: FpsMeter,
    frames_sampled: u64,
}

impl Default for SquatDetector {
    fn default() -> Self {
        Self::new(SquatParams::default())
    }
}

impl SquatDetector {
    pub fn new(params: SquatParams) -> Self {
        let ema = Ema::new(params.ema_alpha);
        let strategy = Box::new(AutoSide::new(params.side_confidence));
        Self {
            params,
            strategy,
            state: SquatState::Stand,
            ema,
            min_angle: None,
            active_side: None,
            ledger: RepLedger::new(),
            fps_meter: FpsMeter::new(),
            frames_sampled: 0,
        }
    }

    /// Replace the side-selection strategy.
    pub fn with_strategy(mut self, strategy: impl SideStrategy + Send + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn params(&self) -> &SquatParams {
        &self.params
    }

    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    fn reading(&self, frame: &PoseFrame, side: Side) -> Option<SideReading> {
        let (hip, knee, ankle) = match side {
            Side::Left => (joints::LEFT_HIP, joints::LEFT_KNEE, joints::LEFT_ANKLE),
            Side::Right => (joints::RIGHT_HIP, joints::RIGHT_KNEE, joints::RIGHT_ANKLE),
        };
        let h = frame.joint(hip)?;
        let k = frame.joint(knee)?;
        let a = frame.joint(ankle)?;
        let min_vis = [frame.visibility(hip), frame.visibility(knee), frame.visibility(ankle)]
            .into_iter()
            .fold(f32::INFINITY, f32::min);
        if min_vis <= self.params.visibility_floor {
            return None;
        }
        Some(SideReading {
            angle_deg: point_angle_deg(h.position, k.position, a.position),
            min_vis,
        })
    }

    fn no_op_hud(&self) -> FrameHud {
        let counts = self.ledger.counts();
        FrameHud::empty(self.state.as_str(), 0.0, counts.success, counts.fail)
    }

    fn finalize(&mut self) {
        let Some(min) = self.min_angle.take() else {
            return;
        };
        let outcome = if (self.params.succ_min_deg..=self.params.succ_max_deg).contains(&min) {
            Outcome::Success
        } else if (self.params.fail_min_deg..=self.params.fail_max_deg).contains(&min) {
            Outcome::FailDepthRange
        } else {
            Outcome::FailInvalidDepth
        };
        let side = self.active_side;
        let id = self.ledger.outcome(outcome, None, 0.0, 0.0, side, Some(min));
        log::info!(
            "[SQUAT LOG] id={id} min={min:.1} side={} outcome={outcome}",
            side.map(Side::as_str).unwrap_or("?"),
        );
    }
}

impl Detector for SquatDetector {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(ts = frame.timestamp_ns))
    )]
    fn on_frame(&mut self, frame: &PoseFrame) -> FrameHud {
        self.frames_sampled += 1;

        let left = self.reading(frame, Side::Left);
        let right = self.reading(frame, Side::Right);
        let side = self
            .active_side
            .or_else(|| self.strategy.pick(left, right));
        let raw = match side {
            Some(Side::Left) => left.map(|r| r.angle_deg),
            Some(Side::Right) => right.map(|r| r.angle_deg),
            None => None,
        };
        let Some(raw) = raw else {
            return self.no_op_hud();
        };

        let angle = self.ema.update(raw);
        match self.state {
            SquatState::Stand => {
                if angle <= self.params.stand_up_deg - self.params.down_enter_margin_deg {
                    self.ledger.transition("STAND", "DOWN", angle);
                    self.state = SquatState::Down;
                    self.min_angle = Some(angle);
                    // Lock the side for the rest of the repetition.
                    self.active_side = side;
                }
            }
            SquatState::Down => {
                self.min_angle = Some(self.min_angle.map_or(angle, |m| m.min(angle)));
                if angle >= self.params.stand_up_deg {
                    self.ledger.transition("DOWN", "STAND", angle);
                    self.finalize();
                    self.state = SquatState::Stand;
                    self.active_side = None;
                }
            }
        }

        let counts = self.ledger.counts();
        let fps = self.fps_meter.update(frame.timestamp_ns);
        let mut hud = FrameHud {
            angle_deg: Some(angle),
            state: self.state.as_str(),
            hold_sec: 0.0,
            success: counts.success,
            fail: counts.fail,
            extra: Default::default(),
        }
        .with_extra("fps", fps);
        if let Some(min) = self.min_angle {
            hud = hud.with_extra("minAngleThisRep", min);
        }
        if let Some(side) = self.active_side.or(side) {
            hud = hud.with_extra("side", side.as_str());
        }
        hud
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
        self.state = SquatState::Stand;
        self.ema.reset();
        self.min_angle = None;
        self.active_side = None;
        self.ledger.reset();
        self.fps_meter.reset();
        self.frames_sampled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rep_detect_core::JointSample;

    /// Builds one leg with the requested knee angle: hip above the knee,
    /// ankle rotated so the hip-knee-ankle vertex angle matches.
    fn insert_leg(frame: &mut PoseFrame, side: Side, knee_deg: f32, vis: f32) {
        let (hip, knee, ankle, x) = match side {
            Side::Left => (joints::LEFT_HIP, joints::LEFT_KNEE, joints::LEFT_ANKLE, 0.45),
            Side::Right => (joints::RIGHT_HIP, joints::RIGHT_KNEE, joints::RIGHT_ANKLE, 0.55),
        };
        let ky = 0.55f32;
        let phi = (180.0 - knee_deg).to_radians();
        frame.insert(hip, JointSample::new(x, 0.3).with_visibility(vis));
        frame.insert(knee, JointSample::new(x, ky).with_visibility(vis));
        frame.insert(
            ankle,
            JointSample::new(x + 0.25 * phi.sin(), ky + 0.25 * phi.cos()).with_visibility(vis),
        );
    }

    struct Sim {
        det: SquatDetector,
        i: i64,
    }

    impl Sim {
        fn new() -> Self {
            Sim {
                det: SquatDetector::default(),
                i: 0,
            }
        }

        fn tick(&mut self, left: (f32, f32), right: (f32, f32)) -> FrameHud {
            let mut frame = PoseFrame::new(640, 480, 30.0, self.i * 33_333_333);
            self.i += 1;
            insert_leg(&mut frame, Side::Left, left.0, left.1);
            insert_leg(&mut frame, Side::Right, right.0, right.1);
            self.det.on_frame(&frame)
        }

        fn tick_both(&mut self, deg: f32) -> FrameHud {
            self.tick((deg, 0.9), (deg, 0.9))
        }

        fn stand(&mut self) {
            for _ in 0..5 {
                self.tick_both(178.0);
            }
        }
    }

    fn last_outcome(records: &[RepRecord]) -> Option<(Outcome, Option<Side>, Option<f32>)> {
        records.iter().rev().find_map(|r| match r {
            RepRecord::Outcome {
                outcome,
                side,
                min_angle_deg,
                ..
            } => Some((*outcome, *side, *min_angle_deg)),
            _ => None,
        })
    }

    #[test]
    fn low_visibility_frames_are_a_noop() {
        let mut sim = Sim::new();
        let hud = sim.tick((120.0, 0.3), (120.0, 0.3));
        assert_eq!(hud.state, "STAND");
        assert!(hud.angle_deg.is_none());
        assert_eq!(sim.det.counts().total, 0);
    }

    #[test]
    fn deep_enough_squat_is_a_success() {
        let mut sim = Sim::new();
        sim.stand();
        for _ in 0..15 {
            sim.tick_both(100.0);
        }
        for _ in 0..10 {
            sim.tick_both(178.0);
        }
        let counts = sim.det.counts();
        assert_eq!((counts.success, counts.fail), (1, 0));

        let records = sim.det.drain_records();
        let (outcome, side, min) = last_outcome(&records).unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert!(side.is_some());
        let min = min.unwrap();
        assert!(min >= 95.0 && min <= 135.0, "min = {min}");
        assert!(sim.det.drain_records().is_empty());
    }

    #[test]
    fn shallow_squat_lands_in_the_fail_band() {
        let mut sim = Sim::new();
        sim.stand();
        for _ in 0..15 {
            sim.tick_both(150.0);
        }
        for _ in 0..10 {
            sim.tick_both(178.0);
        }
        let (outcome, _, min) = last_outcome(&sim.det.drain_records()).unwrap();
        assert_eq!(outcome, Outcome::FailDepthRange);
        let min = min.unwrap();
        assert!(min >= 136.0 && min <= 162.0, "min = {min}");
    }

    #[test]
    fn bottoming_out_is_invalid_depth() {
        let mut sim = Sim::new();
        sim.stand();
        for _ in 0..20 {
            sim.tick_both(70.0);
        }
        for _ in 0..12 {
            sim.tick_both(178.0);
        }
        let (outcome, _, min) = last_outcome(&sim.det.drain_records()).unwrap();
        assert_eq!(outcome, Outcome::FailInvalidDepth);
        assert!(min.unwrap() < 95.0);
    }

    #[test]
    fn side_stays_locked_for_the_whole_repetition() {
        let mut sim = Sim::new();
        sim.stand();
        // Left is deeper at entry, so auto selection locks left.
        for _ in 0..10 {
            sim.tick((110.0, 0.9), (160.0, 0.9));
        }
        // Mid-rep the right leg becomes deeper; the lock must hold.
        for _ in 0..5 {
            sim.tick((120.0, 0.9), (100.0, 0.9));
        }
        for _ in 0..10 {
            sim.tick_both(178.0);
        }
        let (_, side, _) = last_outcome(&sim.det.drain_records()).unwrap();
        assert_eq!(side, Some(Side::Left));
    }

    #[test]
    fn both_transitions_are_recorded() {
        let mut sim = Sim::new();
        sim.stand();
        for _ in 0..15 {
            sim.tick_both(100.0);
        }
        for _ in 0..10 {
            sim.tick_both(178.0);
        }
        let records = sim.det.drain_records();
        let down = records.iter().any(|r| {
            matches!(r, RepRecord::Transition { from, to, .. } if from == "STAND" && to == "DOWN")
        });
        let up = records.iter().any(|r| {
            matches!(r, RepRecord::Transition { from, to, .. } if from == "DOWN" && to == "STAND")
        });
        assert!(down && up);
    }

    #[test]
    fn reset_clears_counters_and_state() {
        let mut sim = Sim::new();
        sim.stand();
        for _ in 0..15 {
            sim.tick_both(100.0);
        }
        for _ in 0..10 {
            sim.tick_both(178.0);
        }
        assert_eq!(sim.det.counts().total, 1);

        sim.det.reset();
        assert_eq!(sim.det.counts(), Counts::default());
        let hud = sim.tick_both(178.0);
        assert_eq!(hud.state, "STAND");
    }
}
