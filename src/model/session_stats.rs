use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampSeconds;

use super::GateOutcome;

pub const MAX_HEARTS: u32 = 5;

/// Dropping from full hearts arms a 10-minute refill window.
pub const HEART_REFILL_WINDOW: Duration = Duration::from_secs(600);

/// Long-lived player profile, persisted across rounds and gates. All
/// mutation goes through `apply`; `difficulty_factor` is a derivation the
/// session controller refreshes after every change of level or streak,
/// never written directly.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub coins: u32,
    pub hearts: u32,
    pub stars: u32,
    pub level: u32,
    #[serde_as(as = "TimestampSeconds")]
    pub last_life_refill: SystemTime,
    pub hints_freeze: u32,
    pub hints_reveal: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub difficulty_factor: f64,
    pub performance_history: Vec<bool>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            coins: 0,
            hearts: MAX_HEARTS,
            stars: 0,
            level: 1,
            last_life_refill: SystemTime::now(),
            hints_freeze: 3,
            hints_reveal: 3,
            streak: 0,
            max_streak: 0,
            difficulty_factor: 1.0,
            performance_history: Vec::new(),
        }
    }
}

/// Every mutation of `SessionStats` in one place. The scattered per-handler
/// updates of the original flow collapse into this reducer so the streak
/// reset and max-streak clamp rules hold for every caller.
#[derive(Debug, Clone)]
pub enum StatsAction {
    RoundResolved { correct: bool },
    GateFinished { outcome: GateOutcome, session_score: u32 },
    Quit,
    FreezeHintConsumed,
    RevealHintConsumed,
    CoinsGranted(u32),
}

impl SessionStats {
    pub fn apply(&mut self, action: StatsAction) {
        self.apply_at(action, SystemTime::now());
    }

    pub fn apply_at(&mut self, action: StatsAction, now: SystemTime) {
        match action {
            StatsAction::RoundResolved { correct } => {
                if correct {
                    self.streak += 1;
                } else {
                    self.streak = 0;
                }
            }
            StatsAction::GateFinished {
                outcome,
                session_score,
            } => {
                let result = outcome.result();
                if outcome.passed() {
                    self.level += 1;
                    self.coins += session_score + result.coins_awarded;
                    self.stars += result.stars_awarded as u32;
                } else {
                    self.lose_heart(now);
                    self.streak = 0;
                }
                self.performance_history.push(outcome.passed());
            }
            StatsAction::Quit => {
                self.lose_heart(now);
                self.streak = 0;
            }
            StatsAction::FreezeHintConsumed => {
                self.hints_freeze = self.hints_freeze.saturating_sub(1);
            }
            StatsAction::RevealHintConsumed => {
                self.hints_reveal = self.hints_reveal.saturating_sub(1);
            }
            StatsAction::CoinsGranted(amount) => {
                self.coins += amount;
            }
        }
        self.max_streak = self.max_streak.max(self.streak);
    }

    fn lose_heart(&mut self, now: SystemTime) {
        // the refill window only re-arms when dropping from full
        if self.hearts == MAX_HEARTS {
            self.last_life_refill = now;
        }
        self.hearts = self.hearts.saturating_sub(1);
    }

    /// Time until the next heart refill, None at full hearts. Display
    /// concern only; the refill grant itself lives at the hub boundary.
    pub fn heart_refill_remaining(&self, now: SystemTime) -> Option<Duration> {
        if self.hearts >= MAX_HEARTS {
            return None;
        }
        let since = now
            .duration_since(self.last_life_refill)
            .unwrap_or(Duration::ZERO);
        Some(HEART_REFILL_WINDOW.saturating_sub(since))
    }
}
