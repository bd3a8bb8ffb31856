mod choice;
pub mod clock;
mod engine_command;
mod engine_event;
mod gate_result;
mod intensity;
mod phase;
mod round;
mod round_phase_state;
mod session_event;
mod session_stats;

pub use choice::{Choice, ChoiceOutcome};
pub use clock::{Countdown, GameClock, TICK_SECONDS};
pub use engine_command::{EngineCommand, GatePlan};
pub use engine_event::{EngineEvent, TickSnapshot};
pub use gate_result::{GateOutcome, GateRecord, GateResult};
pub use intensity::IntensityTier;
pub use phase::{ChoiceStatus, RoundPhase};
pub use round::{Round, FALLBACK_DDS};
pub use round_phase_state::{RoundPhaseState, MEMORIZE_SECONDS};
pub use session_event::SessionEvent;
pub use session_stats::{SessionStats, StatsAction, HEART_REFILL_WINDOW, MAX_HEARTS};
