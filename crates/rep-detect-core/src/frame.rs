use std::collections::HashMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Well-known MediaPipe pose landmark names used by the detectors.
pub mod joints {
    pub const LEFT_HIP: &str = "left_hip";
    pub const RIGHT_HIP: &str = "right_hip";
    pub const LEFT_KNEE: &str = "left_knee";
    pub const RIGHT_KNEE: &str = "right_knee";
    pub const LEFT_ANKLE: &str = "left_ankle";
    pub const RIGHT_ANKLE: &str = "right_ankle";
    pub const LEFT_HEEL: &str = "left_heel";
    pub const RIGHT_HEEL: &str = "right_heel";
    pub const LEFT_TOE: &str = "left_foot_index";
    pub const RIGHT_TOE: &str = "right_foot_index";
}

/// One named body joint as reported by the pose provider.
///
/// Coordinates are normalized to [0,1] in image space; `depth` is the
/// provider's relative z estimate and is carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub position: Point2<f32>,
    pub depth: f32,
    /// Provider confidence in [0,1], when available.
    pub visibility: Option<f32>,
}

impl JointSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            depth: 0.0,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// One frame of pose input: named joints plus the frame geometry and timing
/// the detectors need to convert normalized coordinates and advance timers.
///
/// `timestamp_ns` must be monotonic across successive frames fed to the same
/// detector. `fps` is the host's current frame-rate estimate; it is only
/// used for frame-count gating math, never for elapsed-time integration.
#[derive(Clone, Debug)]
pub struct PoseFrame {
    pub joints: HashMap<String, JointSample>,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    pub timestamp_ns: i64,
}

impl PoseFrame {
    pub fn new(width: u32, height: u32, fps: f32, timestamp_ns: i64) -> Self {
        Self {
            joints: HashMap::new(),
            width,
            height,
            fps,
            timestamp_ns,
        }
    }

    pub fn insert(&mut self, name: &str, sample: JointSample) {
        self.joints.insert(name.to_owned(), sample);
    }

    pub fn joint(&self, name: &str) -> Option<&JointSample> {
        self.joints.get(name)
    }

    /// Joint position scaled to pixel coordinates.
    pub fn joint_px(&self, name: &str) -> Option<Point2<f32>> {
        self.joints.get(name).map(|s| {
            Point2::new(
                s.position.x * self.width as f32,
                s.position.y * self.height as f32,
            )
        })
    }

    /// Visibility of a joint, defaulting to 0 when the provider omits it.
    pub fn visibility(&self, name: &str) -> f32 {
        self.joints
            .get(name)
            .and_then(|s| s.visibility)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_px_scales_by_frame_size() {
        let mut frame = PoseFrame::new(640, 480, 30.0, 0);
        frame.insert(joints::LEFT_HEEL, JointSample::new(0.5, 0.25));

        let px = frame.joint_px(joints::LEFT_HEEL).unwrap();
        assert_eq!(px, nalgebra::Point2::new(320.0, 120.0));
    }

    #[test]
    fn missing_joint_has_zero_visibility() {
        let frame = PoseFrame::new(640, 480, 30.0, 0);
        assert_eq!(frame.visibility(joints::LEFT_KNEE), 0.0);
        assert!(frame.joint_px(joints::LEFT_KNEE).is_none());
    }
}
