use super::{GateRecord, SessionStats};

/// Events that are not specific to any one round: session-level state the
/// hub, the engine and the persistence indicator all observe.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Broadcast after every stats mutation, once the difficulty factor has
    /// been re-derived. The engine keeps its streak and factor from this.
    StatsChanged(SessionStats),
    GateStarted { gate_id: u32 },
    GateRecorded(GateRecord),
    /// Result of the most recent debounced remote push.
    SyncStateChanged { synced: bool },
}
