use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of supported exercises.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Calf,
    Squat,
    RehabCalf,
}

impl Exercise {
    pub const ALL: [Exercise; 3] = [Exercise::Calf, Exercise::Squat, Exercise::RehabCalf];

    pub fn as_str(self) -> &'static str {
        match self {
            Exercise::Calf => "calf",
            Exercise::Squat => "squat",
            Exercise::RehabCalf => "rehab_calf",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown exercise `{0}`, expected one of: calf, squat, rehab_calf")]
pub struct ParseExerciseError(String);

impl FromStr for Exercise {
    type Err = ParseExerciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calf" => Ok(Exercise::Calf),
            "squat" => Ok(Exercise::Squat),
            "rehab_calf" | "rehab-calf" | "rehabcalf" => Ok(Exercise::RehabCalf),
            other => Err(ParseExerciseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("calf".parse::<Exercise>().unwrap(), Exercise::Calf);
        assert_eq!(" Squat ".parse::<Exercise>().unwrap(), Exercise::Squat);
        assert_eq!(
            "rehab-calf".parse::<Exercise>().unwrap(),
            Exercise::RehabCalf
        );
    }

    #[test]
    fn rejects_unknown_names_with_context() {
        let err = "lunge".parse::<Exercise>().unwrap_err();
        assert!(err.to_string().contains("lunge"));
    }

    #[test]
    fn round_trips_through_display() {
        for exercise in Exercise::ALL {
            assert_eq!(exercise.to_string().parse::<Exercise>().unwrap(), exercise);
        }
    }
}
