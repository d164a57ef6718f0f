use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, used to stamp ledger records.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Body side a repetition was measured on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Final classification of one repetition. Failures are data, not errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    /// Reached the success band but released before the hold target.
    FailHoldShort,
    /// Stayed in the small-movement band for the whole hold target.
    FailSmallKept,
    /// Ground-contact constraint violated during the hold.
    ToeOffGround,
    /// Angle fell too fast while still rising.
    UnstableRaise,
    /// Dropped out of the hold band before the target (rehab variant).
    EarlyLower,
    /// Squat bottomed out inside the known-fail depth band.
    FailDepthRange,
    /// Squat depth outside every classified band.
    FailInvalidDepth,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::FailHoldShort => "FAIL_HOLD_SHORT",
            Outcome::FailSmallKept => "FAIL_SMALL_KEPT",
            Outcome::ToeOffGround => "TOE_OFF_GROUND",
            Outcome::UnstableRaise => "UNSTABLE_RAISE",
            Outcome::EarlyLower => "EARLY_LOWER",
            Outcome::FailDepthRange => "FAIL_DEPTH_RANGE",
            Outcome::FailInvalidDepth => "FAIL_INVALID_DEPTH",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One auditable ledger entry: either a state-machine transition or a
/// finalized repetition outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepRecord {
    Transition {
        from: String,
        to: String,
        /// Delta angle at the moment of transition.
        angle_deg: f32,
        epoch_ms: u64,
    },
    Outcome {
        /// Monotonically increasing within a session; unique until `reset`.
        id: u32,
        /// Absolute angle at repetition start, when the exercise tracks one.
        base_deg: Option<f32>,
        /// Peak delta angle reached during the repetition.
        peak_deg: f32,
        hold_sec: f32,
        outcome: Outcome,
        side: Option<Side>,
        /// Minimum angle observed during the repetition (squat depth).
        min_angle_deg: Option<f32>,
        epoch_ms: u64,
    },
}

impl RepRecord {
    pub fn is_outcome(&self) -> bool {
        matches!(self, RepRecord::Outcome { .. })
    }
}

/// Append-only record of transitions and finalized repetitions.
///
/// The ledger owns the outcome sequence id and the success/fail counters, so
/// `counts()` can never disagree with the outcomes it stored. `drain` hands
/// ownership of the pending records to the caller and clears the buffer; the
/// id keeps counting across drains and restarts only on `reset`.
#[derive(Clone, Debug, Default)]
pub struct RepLedger {
    records: Vec<RepRecord>,
    next_id: u32,
    success: u32,
    fail: u32,
}

/// Snapshot of the running counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Counts {
    pub success: u32,
    pub fail: u32,
    pub total: u32,
}

impl RepLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state transition at the given delta angle.
    pub fn transition(&mut self, from: &'static str, to: &'static str, angle_deg: f32) {
        log::debug!("[STATE] {from} -> {to} @angle={angle_deg:.1}");
        self.records.push(RepRecord::Transition {
            from: from.to_owned(),
            to: to.to_owned(),
            angle_deg,
            epoch_ms: epoch_ms(),
        });
    }

    /// Finalize one repetition and return its sequence id.
    #[allow(clippy::too_many_arguments)]
    pub fn outcome(
        &mut self,
        outcome: Outcome,
        base_deg: Option<f32>,
        peak_deg: f32,
        hold_sec: f32,
        side: Option<Side>,
        min_angle_deg: Option<f32>,
    ) -> u32 {
        self.next_id += 1;
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.fail += 1;
        }
        self.records.push(RepRecord::Outcome {
            id: self.next_id,
            base_deg,
            peak_deg,
            hold_sec,
            outcome,
            side,
            min_angle_deg,
            epoch_ms: epoch_ms(),
        });
        self.next_id
    }

    pub fn counts(&self) -> Counts {
        Counts {
            success: self.success,
            fail: self.fail,
            total: self.success + self.fail,
        }
    }

    /// Return and clear all pending records.
    pub fn drain(&mut self) -> Vec<RepRecord> {
        std::mem::take(&mut self.records)
    }

    /// Non-destructive view of the most recent `limit` records.
    pub fn peek_recent(&self, limit: usize) -> Vec<RepRecord> {
        let start = self.records.len().saturating_sub(limit);
        self.records[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget everything, including counters and the sequence id.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_outcome(ledger: &mut RepLedger, outcome: Outcome) -> u32 {
        ledger.outcome(outcome, Some(1.0), 10.0, 2.5, None, None)
    }

    #[test]
    fn ids_increase_and_survive_drain() {
        let mut ledger = RepLedger::new();
        let a = push_outcome(&mut ledger, Outcome::Success);
        let drained = ledger.drain();
        assert_eq!(drained.len(), 1);
        let b = push_outcome(&mut ledger, Outcome::FailHoldShort);
        assert!(b > a);
    }

    #[test]
    fn drain_is_idempotent() {
        let mut ledger = RepLedger::new();
        ledger.transition("IDLE", "RAISING", 7.0);
        push_outcome(&mut ledger, Outcome::Success);
        assert_eq!(ledger.drain().len(), 2);
        assert!(ledger.drain().is_empty());
    }

    #[test]
    fn counts_match_finalized_outcomes() {
        let mut ledger = RepLedger::new();
        push_outcome(&mut ledger, Outcome::Success);
        push_outcome(&mut ledger, Outcome::FailSmallKept);
        push_outcome(&mut ledger, Outcome::FailHoldShort);
        ledger.transition("HOLDING", "COOLDOWN", 3.0);

        let counts = ledger.counts();
        assert_eq!(counts.success, 1);
        assert_eq!(counts.fail, 2);
        let outcomes = ledger.drain().iter().filter(|r| r.is_outcome()).count();
        assert_eq!(counts.total as usize, outcomes);
    }

    #[test]
    fn peek_recent_does_not_clear() {
        let mut ledger = RepLedger::new();
        for _ in 0..5 {
            push_outcome(&mut ledger, Outcome::Success);
        }
        assert_eq!(ledger.peek_recent(2).len(), 2);
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let mut ledger = RepLedger::new();
        push_outcome(&mut ledger, Outcome::Success);
        ledger.reset();
        assert_eq!(ledger.counts(), Counts::default());
        assert_eq!(push_outcome(&mut ledger, Outcome::Success), 1);
    }

    #[test]
    fn outcome_tags_serialize_as_screaming_snake() {
        let json = serde_json::to_string(&Outcome::FailHoldShort).unwrap();
        assert_eq!(json, "\"FAIL_HOLD_SHORT\"");
        assert_eq!(Outcome::FailInvalidDepth.to_string(), "FAIL_INVALID_DEPTH");
    }
}
