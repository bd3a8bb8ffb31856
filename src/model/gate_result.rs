use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DurationSeconds;
use uuid::Uuid;

/// Tally of one finished gate (5 rounds). `coins_awarded` is the completion
/// bonus only; the session banks it together with the round score on a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub correct_count: usize,
    pub stars_awarded: u8,
    pub coins_awarded: u32,
}

/// Pass/fail wrapper; a fail still carries the counts for display but
/// awards nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    Passed(GateResult),
    Failed(GateResult),
}

impl GateOutcome {
    pub fn result(&self) -> &GateResult {
        match self {
            GateOutcome::Passed(result) | GateOutcome::Failed(result) => result,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, GateOutcome::Passed(_))
    }
}

/// Persisted record of a finished gate, appended to the score history.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRecord {
    pub gate_id: u32,
    pub correct_count: usize,
    pub stars_awarded: u8,
    pub score: u32,
    pub difficulty_factor: f64,
    #[serde_as(as = "DurationSeconds<f64>")]
    pub duration: Duration,
    pub timestamp: i64,
    pub playthrough_id: Uuid,
}
