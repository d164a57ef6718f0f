//! End-to-end sessions driven through the facade types only.

use approx::assert_relative_eq;
use rep_detect::{
    joints, CalfDetector, CalfParams, Detector, Exercise, ExerciseDetector, JointSample, Outcome,
    PoseFrame, RepRecord, SessionSummary,
};

const W: u32 = 640;
const H: u32 = 480;
const FRAME_NS: i64 = 33_333_333; // 30 fps

/// Synthetic session driver: one detector, monotonic timestamps.
struct Session {
    det: ExerciseDetector,
    i: i64,
}

impl Session {
    fn new(det: ExerciseDetector) -> Self {
        Session { det, i: 0 }
    }

    fn frame(&mut self) -> PoseFrame {
        let frame = PoseFrame::new(W, H, 30.0, self.i * FRAME_NS);
        self.i += 1;
        frame
    }

    /// Heel raised so the raw lift angle is `deg`, toe flat on the ground.
    fn calf_tick(&mut self, deg: f32) -> Option<f32> {
        const TOE_X: f32 = 0.2;
        const HEEL_X: f32 = 0.5;
        const FOOT_Y: f32 = 0.85;
        let len_px = (HEEL_X - TOE_X) * W as f32;
        let lift_px = len_px * deg.to_radians().tan();

        let mut frame = self.frame();
        frame.insert(
            joints::LEFT_TOE,
            JointSample::new(TOE_X, FOOT_Y).with_visibility(0.9),
        );
        frame.insert(
            joints::LEFT_HEEL,
            JointSample::new(HEEL_X, FOOT_Y - lift_px / H as f32).with_visibility(0.9),
        );
        self.det.on_frame(&frame).angle_deg
    }

    /// Both legs bent to the requested knee angle.
    fn squat_tick(&mut self, knee_deg: f32) {
        let mut frame = self.frame();
        for (hip, knee, ankle, x) in [
            (joints::LEFT_HIP, joints::LEFT_KNEE, joints::LEFT_ANKLE, 0.45),
            (
                joints::RIGHT_HIP,
                joints::RIGHT_KNEE,
                joints::RIGHT_ANKLE,
                0.55,
            ),
        ] {
            let ky = 0.55f32;
            let phi = (180.0 - knee_deg).to_radians();
            frame.insert(hip, JointSample::new(x, 0.3).with_visibility(0.9));
            frame.insert(knee, JointSample::new(x, ky).with_visibility(0.9));
            frame.insert(
                ankle,
                JointSample::new(x + 0.25 * phi.sin(), ky + 0.25 * phi.cos()).with_visibility(0.9),
            );
        }
        self.det.on_frame(&frame);
    }

    /// Both feet at the requested ankle-heel-toe vertex angle.
    fn rehab_tick(&mut self, deg: f32) {
        let mut frame = self.frame();
        for (ankle, heel, toe, hx) in [
            (joints::LEFT_ANKLE, joints::LEFT_HEEL, joints::LEFT_TOE, 0.4),
            (
                joints::RIGHT_ANKLE,
                joints::RIGHT_HEEL,
                joints::RIGHT_TOE,
                0.6,
            ),
        ] {
            let hy = 0.8f32;
            let rad = deg.to_radians();
            frame.insert(heel, JointSample::new(hx, hy).with_visibility(0.9));
            frame.insert(toe, JointSample::new(hx + 0.1, hy).with_visibility(0.9));
            frame.insert(
                ankle,
                JointSample::new(hx + 0.1 * rad.cos(), hy - 0.1 * rad.sin()).with_visibility(0.9),
            );
        }
        self.det.on_frame(&frame);
    }

    fn outcomes(&mut self) -> Vec<(u32, Outcome, f32, f32)> {
        self.det
            .drain_records()
            .into_iter()
            .filter_map(|r| match r {
                RepRecord::Outcome {
                    id,
                    outcome,
                    peak_deg,
                    hold_sec,
                    ..
                } => Some((id, outcome, peak_deg, hold_sec)),
                _ => None,
            })
            .collect()
    }
}

/// Calf session: stand, ramp the heel up at one degree per frame, hold a
/// fifteen degree raw angle, then lower smoothly. The drift between the
/// slowly trailing rest reference and the smoothed signal must still leave
/// one clean success.
#[test]
fn gradual_calf_raise_with_a_long_hold_is_one_success() {
    let params = CalfParams {
        hold_seconds: 3.0,
        ..CalfParams::default()
    };
    let mut s = Session::new(CalfDetector::new(params).into());

    let mut min_delta = f32::INFINITY;
    let mut observe = |delta: Option<f32>, min_delta: &mut f32| {
        if let Some(d) = delta {
            *min_delta = min_delta.min(d);
        }
    };

    for _ in 0..60 {
        let d = s.calf_tick(0.0);
        observe(d, &mut min_delta);
    }
    for i in 1..=20 {
        let d = s.calf_tick(i as f32);
        observe(d, &mut min_delta);
    }
    for _ in 0..90 {
        let d = s.calf_tick(15.0);
        observe(d, &mut min_delta);
    }
    for i in 1..=30 {
        let d = s.calf_tick(15.0 - 0.5 * i as f32);
        observe(d, &mut min_delta);
    }
    for _ in 0..10 {
        let d = s.calf_tick(0.0);
        observe(d, &mut min_delta);
    }

    assert!(min_delta >= 0.0, "delta must never go negative: {min_delta}");

    let counts = s.det.counts();
    assert_eq!((counts.success, counts.fail), (1, 0));

    let outcomes = s.outcomes();
    assert_eq!(outcomes.len(), 1);
    let (id, outcome, peak, hold) = outcomes[0];
    assert_eq!(id, 1);
    assert_eq!(outcome, Outcome::Success);
    assert!(hold >= 3.0, "hold = {hold}");
    assert!((10.0..=18.0).contains(&peak), "peak = {peak}");
}

#[test]
fn gradual_calf_raise_released_early_fails_the_hold() {
    let params = CalfParams {
        hold_seconds: 3.0,
        ..CalfParams::default()
    };
    let mut s = Session::new(CalfDetector::new(params).into());

    for _ in 0..60 {
        s.calf_tick(0.0);
    }
    for i in 1..=20 {
        s.calf_tick(i as f32);
    }
    // Barely a second in the band before lowering.
    for _ in 0..25 {
        s.calf_tick(15.0);
    }
    for i in 1..=30 {
        s.calf_tick(15.0 - 0.5 * i as f32);
    }
    for _ in 0..10 {
        s.calf_tick(0.0);
    }

    let counts = s.det.counts();
    assert_eq!((counts.success, counts.fail), (0, 1));
    let outcomes = s.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].1, Outcome::FailHoldShort);
}

/// Three squats at three depths classify into all three bands.
#[test]
fn squat_depths_classify_into_all_three_bands() {
    let mut s = Session::new(ExerciseDetector::new(Exercise::Squat));

    for (depth, _expected) in [
        (100.0, Outcome::Success),
        (150.0, Outcome::FailDepthRange),
        (70.0, Outcome::FailInvalidDepth),
    ] {
        for _ in 0..8 {
            s.squat_tick(178.0);
        }
        for _ in 0..20 {
            s.squat_tick(depth);
        }
        for _ in 0..12 {
            s.squat_tick(178.0);
        }
    }

    let counts = s.det.counts();
    assert_eq!((counts.success, counts.fail, counts.total), (1, 2, 3));

    let outcomes = s.outcomes();
    let kinds: Vec<Outcome> = outcomes.iter().map(|o| o.1).collect();
    assert_eq!(
        kinds,
        vec![
            Outcome::Success,
            Outcome::FailDepthRange,
            Outcome::FailInvalidDepth
        ]
    );
    let ids: Vec<u32> = outcomes.iter().map(|o| o.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn rehab_raise_and_hold_succeeds_through_the_facade() {
    let mut s = Session::new(ExerciseDetector::new(Exercise::RehabCalf));

    for _ in 0..5 {
        s.rehab_tick(2.0);
    }
    for _ in 0..100 {
        s.rehab_tick(10.0);
    }
    for _ in 0..10 {
        s.rehab_tick(2.0);
    }

    let counts = s.det.counts();
    assert_eq!((counts.success, counts.fail), (1, 0));
}

/// Two captures split the records between them while ids and counters keep
/// running.
#[test]
fn session_summaries_split_records_but_accumulate_counters() {
    let mut s = Session::new(ExerciseDetector::new(Exercise::Squat));

    let one_rep = |s: &mut Session| {
        for _ in 0..8 {
            s.squat_tick(178.0);
        }
        for _ in 0..20 {
            s.squat_tick(100.0);
        }
        for _ in 0..12 {
            s.squat_tick(178.0);
        }
    };

    one_rep(&mut s);
    let first = SessionSummary::capture(&mut s.det, 30.0).unwrap();
    assert_eq!(first.exercise, Exercise::Squat);
    assert_eq!(first.total, 1);
    assert!(first.records.iter().any(RepRecord::is_outcome));

    one_rep(&mut s);
    let second = SessionSummary::capture(&mut s.det, 30.0).unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.success, 2);
    assert_relative_eq!(second.success_rate, 1.0);

    let id_of = |records: &[RepRecord]| {
        records.iter().find_map(|r| match r {
            RepRecord::Outcome { id, .. } => Some(*id),
            _ => None,
        })
    };
    let (a, b) = (id_of(&first.records).unwrap(), id_of(&second.records).unwrap());
    assert!(b > a, "ids must keep increasing across drains: {a} vs {b}");

    let json = second.to_json_pretty().unwrap();
    assert!(json.contains("\"squat\""));
    assert!(json.contains("\"SUCCESS\""));
}
