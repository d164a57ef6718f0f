//! Runs a synthetic squat session against the detector and prints the
//! session summary as JSON.
//!
//! ```sh
//! cargo run -p rep-detect --example synthetic_session
//! ```

use log::LevelFilter;
use rep_detect::core::init_with_level;
use rep_detect::{
    joints, Detector, Exercise, ExerciseDetector, JointSample, PoseFrame, SessionSummary,
};

const FPS: f32 = 30.0;
const FRAME_NS: i64 = 33_333_333;

fn leg_frame(i: i64, knee_deg: f32) -> PoseFrame {
    let mut frame = PoseFrame::new(640, 480, FPS, i * FRAME_NS);
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
        frame.insert(hip, JointSample::new(x, 0.3).with_visibility(0.95));
        frame.insert(knee, JointSample::new(x, ky).with_visibility(0.95));
        frame.insert(
            ankle,
            JointSample::new(x + 0.25 * phi.sin(), ky + 0.25 * phi.cos()).with_visibility(0.95),
        );
    }
    frame
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_with_level(LevelFilter::Debug)?;

    let mut detector = ExerciseDetector::new(Exercise::Squat);
    let mut i = 0i64;

    // Three repetitions at different depths: deep, shallow, bottomed out.
    for depth in [100.0, 150.0, 70.0] {
        for _ in 0..10 {
            detector.on_frame(&leg_frame(i, 178.0));
            i += 1;
        }
        for _ in 0..20 {
            detector.on_frame(&leg_frame(i, depth));
            i += 1;
        }
        for _ in 0..12 {
            detector.on_frame(&leg_frame(i, 178.0));
            i += 1;
        }
    }

    let summary = SessionSummary::capture(&mut detector, FPS)?;
    println!("{}", summary.to_json_pretty()?);
    Ok(())
}
