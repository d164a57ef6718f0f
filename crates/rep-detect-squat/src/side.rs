//! Side selection for the squat angle.
//!
//! The most heuristic part of the detector, kept behind a small strategy
//! seam so hosts can pin a side or swap the tie-break.

use rep_detect_core::Side;

/// One side's measurement for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideReading {
    /// Hip-knee-ankle vertex angle, degrees.
    pub angle_deg: f32,
    /// Minimum visibility over the three joints.
    pub min_vis: f32,
}

/// Picks which leg's angle drives the state machine on a given frame.
pub trait SideStrategy {
    fn pick(&self, left: Option<SideReading>, right: Option<SideReading>) -> Option<Side>;
}

/// Always the given side (falls back to the other when it is unmeasurable).
#[derive(Clone, Copy, Debug)]
pub struct FixedSide(pub Side);

impl SideStrategy for FixedSide {
    fn pick(&self, left: Option<SideReading>, right: Option<SideReading>) -> Option<Side> {
        match self.0 {
            Side::Left if left.is_some() => Some(Side::Left),
            Side::Right if right.is_some() => Some(Side::Right),
            _ => match (left, right) {
                (Some(_), _) => Some(Side::Left),
                (_, Some(_)) => Some(Side::Right),
                _ => None,
            },
        }
    }
}

/// Default tie-break: prefer the side whose joints are confidently visible;
/// when both qualify, the deeper (smaller) knee angle; otherwise fall back
/// to higher visibility, then to whichever side is measurable at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoSide {
    pub confidence: f32,
}

impl AutoSide {
    pub fn new(confidence: f32) -> Self {
        Self { confidence }
    }
}

impl SideStrategy for AutoSide {
    fn pick(&self, left: Option<SideReading>, right: Option<SideReading>) -> Option<Side> {
        match (left, right) {
            (None, None) => None,
            (Some(_), None) => Some(Side::Left),
            (None, Some(_)) => Some(Side::Right),
            (Some(l), Some(r)) => {
                let l_ok = l.min_vis >= self.confidence;
                let r_ok = r.min_vis >= self.confidence;
                let side = match (l_ok, r_ok) {
                    (true, false) => Side::Left,
                    (false, true) => Side::Right,
                    (true, true) => {
                        if l.angle_deg <= r.angle_deg {
                            Side::Left
                        } else {
                            Side::Right
                        }
                    }
                    (false, false) => {
                        if l.min_vis >= r.min_vis {
                            Side::Left
                        } else {
                            Side::Right
                        }
                    }
                };
                Some(side)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(angle_deg: f32, min_vis: f32) -> Option<SideReading> {
        Some(SideReading { angle_deg, min_vis })
    }

    #[test]
    fn auto_prefers_the_confident_side() {
        let auto = AutoSide::new(0.6);
        assert_eq!(
            auto.pick(reading(120.0, 0.55), reading(150.0, 0.9)),
            Some(Side::Right)
        );
    }

    #[test]
    fn auto_breaks_confident_ties_by_depth() {
        let auto = AutoSide::new(0.6);
        assert_eq!(
            auto.pick(reading(110.0, 0.8), reading(150.0, 0.9)),
            Some(Side::Left)
        );
    }

    #[test]
    fn auto_falls_back_to_visibility_then_presence() {
        let auto = AutoSide::new(0.6);
        assert_eq!(
            auto.pick(reading(120.0, 0.52), reading(130.0, 0.58)),
            Some(Side::Right)
        );
        assert_eq!(auto.pick(None, reading(130.0, 0.51)), Some(Side::Right));
        assert_eq!(auto.pick(None, None), None);
    }

    #[test]
    fn fixed_side_falls_back_when_unmeasurable() {
        let fixed = FixedSide(Side::Left);
        assert_eq!(fixed.pick(None, reading(140.0, 0.9)), Some(Side::Right));
        assert_eq!(
            fixed.pick(reading(140.0, 0.9), reading(120.0, 0.9)),
            Some(Side::Left)
        );
    }
}
