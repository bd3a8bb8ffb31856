use serde::{Deserialize, Serialize};

/// Fallback difficulty when a gate has missing or malformed content.
pub const FALLBACK_DDS: f64 = 1.15;

/// One memorize/guess round as served by the content provider. Immutable
/// once fetched; the engine owns it for the round's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub gate_id: u32,
    pub ordinal: usize,
    pub target: String,
    pub distractors: [String; 3],
    pub base_difficulty: f64,
}

impl Round {
    /// Sentinel round used when content for a gate is missing or short.
    /// Keeps the state machine progressable; the placeholder words make the
    /// failure visible rather than silently masked.
    pub fn fallback(gate_id: u32, ordinal: usize) -> Self {
        Self {
            gate_id,
            ordinal,
            target: "HATA".to_string(),
            distractors: [
                "HAVA".to_string(),
                "KATA".to_string(),
                "HALA".to_string(),
            ],
            base_difficulty: FALLBACK_DDS,
        }
    }

    /// Target plus distractors, in content order (unshuffled).
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(4);
        options.push(self.target.clone());
        options.extend(self.distractors.iter().cloned());
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_round_is_playable() {
        let round = Round::fallback(7, 2);
        assert_eq!(round.gate_id, 7);
        assert_eq!(round.ordinal, 2);
        assert_eq!(round.base_difficulty, FALLBACK_DDS);
        let options = round.options();
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| **o == round.target).count(), 1);
    }
}
