use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed tick quantum: one logical tick is 50ms of game time.
pub const TICK_SECONDS: f64 = 0.05;

/// Logical clock driving a round engine. Advances only when a `Tick` command
/// is processed, so paused overlays and tests never race wall time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameClock {
    ticks: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }

    pub fn now(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.ticks as f64 * TICK_SECONDS)
    }

    pub fn ticks_for(seconds: f64) -> u64 {
        (seconds / TICK_SECONDS).round() as u64
    }

    /// Tick at which a delay of `seconds` from now expires.
    pub fn deadline(&self, seconds: f64) -> u64 {
        self.ticks + Self::ticks_for(seconds)
    }
}

/// Per-phase countdown. Decrements one quantum per tick, floors at zero and
/// reports the zero crossing exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f64,
    duration: f64,
    expired: bool,
}

impl Countdown {
    pub fn new(duration: f64) -> Self {
        Self {
            remaining: duration,
            duration,
            expired: false,
        }
    }

    /// Returns true on the tick that crosses zero.
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.remaining -= TICK_SECONDS;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.expired = true;
            return true;
        }
        false
    }

    pub fn time_left(&self) -> f64 {
        self.remaining
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
