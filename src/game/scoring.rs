use crate::model::{Choice, ChoiceOutcome, GateOutcome, GateResult};

/// Answering within this many seconds of guess entry is a reflex (strict).
pub const REFLEX_WINDOW_SECONDS: f64 = 2.0;
pub const REFLEX_MULTIPLIER: f64 = 2.5;

/// Answering with less than a second remaining is a critical success.
pub const CRITICAL_WINDOW_SECONDS: f64 = 1.0;
pub const CRITICAL_MULTIPLIER: f64 = 5.0;

/// More help, less reward: freeze active scales the payout down.
pub const FREEZE_REWARD_SCALE: f64 = 0.8;
pub const CLEAN_REWARD_SCALE: f64 = 1.2;

pub const MISS_PENALTY_BASE: f64 = 75.0;

pub const ROUNDS_PER_GATE: usize = 5;
/// Hard contract, not tunable per gate.
pub const GATE_PASS_THRESHOLD: usize = 3;
pub const COINS_PER_CORRECT: u32 = 50;

/// Strict boundary: exactly 2.0s elapsed gets no reflex bonus.
pub fn reflex_elapsed(elapsed: f64) -> bool {
    elapsed < REFLEX_WINDOW_SECONDS
}

/// Score one resolved choice. `effective_difficulty` is the value at the
/// moment of choice; `is_reflex` is the engine's elapsed-time verdict and is
/// only honored on a correct answer. Reflex and critical stack
/// multiplicatively when a short guess window lets both trigger.
pub fn resolve_choice(
    choice: &Choice,
    target: &str,
    time_left: f64,
    effective_difficulty: f64,
    freeze_active: bool,
    is_reflex: bool,
) -> ChoiceOutcome {
    let is_correct = choice.matches(target);
    let is_reflex = is_correct && is_reflex;
    let is_critical = is_correct && time_left < CRITICAL_WINDOW_SECONDS;

    let points_delta = if is_correct {
        let multiplier = if is_critical { CRITICAL_MULTIPLIER } else { 1.0 }
            * if is_reflex { REFLEX_MULTIPLIER } else { 1.0 };
        let scale = if freeze_active {
            FREEZE_REWARD_SCALE
        } else {
            CLEAN_REWARD_SCALE
        };
        ((100.0 + time_left * 20.0) * effective_difficulty * scale * multiplier).floor() as i64
    } else {
        -((MISS_PENALTY_BASE * effective_difficulty).floor() as i64)
    };

    ChoiceOutcome {
        is_correct,
        is_reflex,
        is_critical,
        points_delta,
        effective_difficulty,
    }
}

/// Apply a delta to the running session score. Floors at zero, never
/// negative.
pub fn apply_points(session_score: u32, delta: i64) -> u32 {
    (session_score as i64 + delta).max(0) as u32
}

/// Star and coin tally for a finished gate. Stars: 3 for a perfect gate,
/// 2 for 4 correct, else 1 (only meaningful on a pass).
pub fn gate_result(round_results: &[bool]) -> GateResult {
    let correct_count = round_results.iter().filter(|correct| **correct).count();
    let stars_awarded = if correct_count == ROUNDS_PER_GATE {
        3
    } else if correct_count >= 4 {
        2
    } else {
        1
    };
    GateResult {
        correct_count,
        stars_awarded,
        coins_awarded: correct_count as u32 * COINS_PER_CORRECT,
    }
}

pub fn gate_outcome(round_results: &[bool]) -> GateOutcome {
    let result = gate_result(round_results);
    if result.correct_count >= GATE_PASS_THRESHOLD {
        GateOutcome::Passed(result)
    } else {
        GateOutcome::Failed(result)
    }
}
