use crate::model::RoundPhase;

/// Guess phase counts down from this, divided by the difficulty factor.
pub const BASE_ROUND_TIME: f64 = 10.0;

/// Each streak unit adds 5% to the global difficulty factor.
pub const STREAK_FACTOR_STEP: f64 = 0.05;

/// Each streak unit adds 10% overdrive to the in-guess effective value.
pub const OVERDRIVE_STEP: f64 = 0.1;

/// Quadratic time-pressure gain: up to +50% approaching the deadline.
pub const TIME_RAMP_GAIN: f64 = 0.5;

/// Pulse wobble kicks in above this effective difficulty.
pub const PULSE_THRESHOLD: f64 = 1.6;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Session-wide difficulty factor: base gate DDS plus streak momentum,
/// rounded to 2 decimals. Pure; recomputed whenever level or streak
/// changes. Unbounded above: a long streak keeps escalating.
pub fn difficulty_factor(base_dds: f64, streak: u32) -> f64 {
    round2(base_dds + streak as f64 * STREAK_FACTOR_STEP)
}

/// Guess window in seconds. Higher difficulty, shorter window.
pub fn dynamic_round_time(factor: f64) -> f64 {
    BASE_ROUND_TIME / factor
}

/// Instantaneous difficulty at one tick. During MEMORIZE it is the global
/// factor unmodified; during GUESS a quadratic time ramp and the streak
/// overdrive multiply in. Pure function of tick state, recomputed every
/// tick, never memoized.
pub fn effective_difficulty(
    global_factor: f64,
    phase: RoundPhase,
    time_left: f64,
    phase_duration: f64,
    streak: u32,
) -> f64 {
    match phase {
        RoundPhase::Memorize => global_factor,
        RoundPhase::Guess => {
            let time_progress = 1.0 - time_left / phase_duration;
            let time_ramp = 1.0 + time_progress.powi(2) * TIME_RAMP_GAIN;
            let overdrive = 1.0 + streak as f64 * OVERDRIVE_STEP;
            global_factor * time_ramp * overdrive
        }
    }
}

/// Sine wobble on the rotation, enabled only above the pulse threshold.
pub fn pulse_factor(rotation_offset: f64, effective: f64) -> f64 {
    let gate = if effective > PULSE_THRESHOLD { 1.0 } else { 0.0 };
    1.0 + (rotation_offset * 0.15).sin() * 0.2 * gate
}

/// Particle-speed feed: doubles in the last 30% of the guess window.
pub fn adrenaline_factor(
    phase: RoundPhase,
    time_left: f64,
    phase_duration: f64,
    effective: f64,
    pulse: f64,
) -> f64 {
    match phase {
        RoundPhase::Memorize => 1.0,
        RoundPhase::Guess => {
            let time_ratio = time_left / phase_duration;
            let panic = if time_ratio < 0.3 { 2.0 } else { 1.0 };
            effective * panic * pulse
        }
    }
}

/// Base rotation advance per tick, before the difficulty scaling.
pub fn rotation_speed(phase: RoundPhase) -> f64 {
    match phase {
        RoundPhase::Memorize => 0.75,
        RoundPhase::Guess => 0.25,
    }
}
