use serde::{Deserialize, Serialize};

/// What ended the guess phase: a word the player tapped, or the timer.
/// `TimeUp` is an incorrect sentinel, it never matches a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    Word(String),
    TimeUp,
}

impl Choice {
    pub fn matches(&self, target: &str) -> bool {
        match self {
            Choice::Word(word) => word == target,
            Choice::TimeUp => false,
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::Word(word) => write!(f, "{}", word),
            Choice::TimeUp => write!(f, "TIME_UP"),
        }
    }
}

/// Result of scoring one resolved choice. `points_delta` is negative on a
/// miss; the running session score is clamped at zero by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    pub is_correct: bool,
    pub is_reflex: bool,
    pub is_critical: bool,
    pub points_delta: i64,
    pub effective_difficulty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_up_never_matches() {
        assert!(!Choice::TimeUp.matches("TIME_UP"));
        assert!(Choice::Word("zirve".to_string()).matches("zirve"));
        assert!(!Choice::Word("kirve".to_string()).matches("zirve"));
    }
}
