use serde::{Deserialize, Serialize};

/// Player-visible phases of a round. Resolution and transition latches are
/// internal to the engine and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Memorize,
    Guess,
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Memorize => write!(f, "MEMORIZE"),
            RoundPhase::Guess => write!(f, "GUESS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceStatus {
    Idle,
    Success,
    Fail,
}

impl Default for ChoiceStatus {
    fn default() -> Self {
        ChoiceStatus::Idle
    }
}
