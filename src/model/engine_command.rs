use super::Round;

/// Everything the engine needs to run one gate, assembled by the session
/// controller at gate start. Rounds are already padded to a full gate with
/// fallbacks; the stats snapshot seeds the engine until the first
/// `StatsChanged` broadcast.
#[derive(Debug, Clone)]
pub struct GatePlan {
    pub gate_id: u32,
    pub rounds: Vec<Round>,
    pub difficulty_factor: f64,
    pub streak: u32,
    pub hints_freeze: u32,
    pub hints_reveal: u32,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub enum EngineCommand {
    LoadGate(GatePlan),
    /// One 50ms quantum of game time. The single driver of all countdowns,
    /// latches and the freeze window.
    Tick,
    /// Player ends the memorize phase early ("found it").
    ConfirmMemorized,
    SelectChoice(String),
    UseFreezeHint,
    UseRevealHint,
    Pause,
    Resume,
    Quit,
}
