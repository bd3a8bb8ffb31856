use serde::{Deserialize, Serialize};

use super::clock::Countdown;
use super::{Choice, ChoiceStatus, RoundPhase};

/// Memorize phase always counts down from a fixed 30 seconds.
pub const MEMORIZE_SECONDS: f64 = 30.0;

/// Mutable per-round phase state, created fresh at the start of each round.
/// Transitions are one-directional: Memorize -> Guess -> resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundPhaseState {
    pub phase: RoundPhase,
    pub countdown: Countdown,
    pub is_frozen: bool,
    pub freeze_used: bool,
    pub hint_reveal_used: bool,
    pub selected_choice: Option<Choice>,
    pub status: ChoiceStatus,
}

impl RoundPhaseState {
    pub fn new_memorize() -> Self {
        Self {
            phase: RoundPhase::Memorize,
            countdown: Countdown::new(MEMORIZE_SECONDS),
            is_frozen: false,
            freeze_used: false,
            hint_reveal_used: false,
            selected_choice: None,
            status: ChoiceStatus::Idle,
        }
    }

    /// Enter the guess phase; the countdown restarts at the dynamic round
    /// time (shorter at higher difficulty). Hint flags carry over.
    pub fn enter_guess(&mut self, guess_duration: f64) {
        self.phase = RoundPhase::Guess;
        self.countdown = Countdown::new(guess_duration);
    }

    pub fn time_left(&self) -> f64 {
        self.countdown.time_left()
    }

    /// Guess-phase wall time accrued, as seen by the countdown. Frozen time
    /// does not accrue, so it never counts against the reflex window.
    pub fn elapsed(&self) -> f64 {
        self.countdown.duration() - self.countdown.time_left()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_guess_resets_countdown() {
        let mut state = RoundPhaseState::new_memorize();
        state.countdown.tick();
        state.enter_guess(8.0);
        assert_eq!(state.phase, RoundPhase::Guess);
        assert_eq!(state.time_left(), 8.0);
        assert_eq!(state.countdown.duration(), 8.0);
        assert_eq!(state.elapsed(), 0.0);
    }
}
