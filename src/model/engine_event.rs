use std::time::Duration;

use super::{ChoiceOutcome, GateOutcome, IntensityTier, RoundPhase};

/// Per-tick numeric feeds for the presentation layer: timer bar, cube
/// rotation, particle speed, intensity styling.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub phase: RoundPhase,
    pub round_ordinal: usize,
    pub time_left: f64,
    pub phase_duration: f64,
    pub effective_difficulty: f64,
    pub intensity: IntensityTier,
    pub rotation_offset: f64,
    pub adrenaline_factor: f64,
    pub is_frozen: bool,
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    GateLoaded {
        gate_id: u32,
        round_count: usize,
    },
    RoundStarted {
        ordinal: usize,
    },
    PhaseChanged {
        phase: RoundPhase,
        duration: f64,
    },
    /// Emitted on guess entry with the shuffled option order.
    OptionsShuffled(Vec<String>),
    Tick(TickSnapshot),
    FreezeHintApplied {
        seconds: f64,
    },
    RevealHintApplied {
        first_letter: char,
    },
    RoundResolved {
        ordinal: usize,
        outcome: ChoiceOutcome,
        session_score: u32,
    },
    GateFinished {
        outcome: GateOutcome,
        session_score: u32,
        duration: Duration,
    },
    /// Quit: the gate ends immediately, no partial credit.
    Cancelled,
    Paused,
    Resumed,
}
