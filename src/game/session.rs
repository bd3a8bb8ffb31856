use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;

use log::{info, warn};
use rand::Rng;
use uuid::Uuid;

use super::content::ContentProvider;
use super::difficulty;
use super::scoring::ROUNDS_PER_GATE;
use super::stats_store::StatsStore;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    EngineCommand, EngineEvent, GatePlan, GateRecord, Round, SessionEvent, SessionStats,
    StatsAction,
};

/// Fixed seed override for reproducible option shuffles.
pub fn seed_from_env() -> Option<u64> {
    std::env::var("SEED").ok().and_then(|s| s.parse().ok())
}

/// Session controller: owns the player profile, translates engine events
/// into stats mutations and assembles gate plans. Every mutation runs the
/// same sequence: apply the reducer action, re-derive the difficulty factor,
/// persist, broadcast `StatsChanged`.
pub struct GameSession {
    stats: SessionStats,
    store: StatsStore,
    content: Box<dyn ContentProvider>,
    playthrough_id: Uuid,
    seed_override: Option<u64>,
    pending_events: Vec<SessionEvent>,
    command_emitter: EventEmitter<EngineCommand>,
    session_event_emitter: EventEmitter<SessionEvent>,
    engine_subscription: Option<Unsubscriber<EngineEvent>>,
}

impl Destroyable for GameSession {
    fn destroy(&mut self) {
        if let Some(subscription) = self.engine_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<EngineEvent> for GameSession {
    fn handle_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Tick(_) => {
                if let Some(synced) = self.store.tick() {
                    self.pending_events
                        .push(SessionEvent::SyncStateChanged { synced });
                }
            }
            EngineEvent::RoundResolved { outcome, .. } => {
                self.apply(StatsAction::RoundResolved {
                    correct: outcome.is_correct,
                });
            }
            EngineEvent::GateFinished {
                outcome,
                session_score,
                duration,
            } => {
                // record against the pre-advance level, before the pass
                // bumps it
                let record = GateRecord {
                    gate_id: self.stats.level,
                    correct_count: outcome.result().correct_count,
                    stars_awarded: outcome.result().stars_awarded,
                    score: *session_score,
                    difficulty_factor: self.stats.difficulty_factor,
                    duration: *duration,
                    timestamp: chrono::Utc::now().timestamp(),
                    playthrough_id: self.playthrough_id,
                };
                self.apply(StatsAction::GateFinished {
                    outcome: *outcome,
                    session_score: *session_score,
                });
                if let Err(e) = self.store.record_gate(&record) {
                    warn!(target: "session", "Failed to record gate history: {}", e);
                }
                self.pending_events.push(SessionEvent::GateRecorded(record));
            }
            EngineEvent::Cancelled => {
                self.apply(StatsAction::Quit);
            }
            EngineEvent::FreezeHintApplied { .. } => {
                self.apply(StatsAction::FreezeHintConsumed);
            }
            EngineEvent::RevealHintApplied { .. } => {
                self.apply(StatsAction::RevealHintConsumed);
            }
            _ => {}
        }
    }
}

impl GameSession {
    pub fn new(
        engine_event_observer: EventObserver<EngineEvent>,
        command_emitter: EventEmitter<EngineCommand>,
        session_event_emitter: EventEmitter<SessionEvent>,
        mut store: StatsStore,
        content: Box<dyn ContentProvider>,
    ) -> Rc<RefCell<Self>> {
        let mut stats = store.load();
        stats.difficulty_factor =
            difficulty::difficulty_factor(content.dds_for_gate(stats.level), stats.streak);
        info!(
            target: "session",
            "Session loaded: level {}, {} coins, {} hearts, factor {:.2}",
            stats.level, stats.coins, stats.hearts, stats.difficulty_factor
        );
        let initial = stats.clone();

        let session = Rc::new(RefCell::new(Self {
            stats,
            store,
            content,
            playthrough_id: Uuid::new_v4(),
            seed_override: seed_from_env(),
            pending_events: Vec::new(),
            command_emitter,
            session_event_emitter: session_event_emitter.clone(),
            engine_subscription: None,
        }));
        GameSession::wire_engine_subscription(session.clone(), engine_event_observer);
        session_event_emitter.emit(&SessionEvent::StatsChanged(initial));
        session
    }

    fn wire_engine_subscription(
        session: Rc<RefCell<Self>>,
        engine_event_observer: EventObserver<EngineEvent>,
    ) {
        let handler = session.clone();
        let subscription = engine_event_observer.subscribe(move |event| {
            let (emitter, events) = {
                let mut session = handler.borrow_mut();
                session.handle_event(event);
                (session.session_event_emitter.clone(), session.drain_events())
            };
            for event in &events {
                emitter.emit(event);
            }
        });
        session.borrow_mut().engine_subscription = Some(subscription);
    }

    fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn apply(&mut self, action: StatsAction) {
        self.stats.apply(action);
        self.stats.difficulty_factor = difficulty::difficulty_factor(
            self.content.dds_for_gate(self.stats.level),
            self.stats.streak,
        );
        self.store.save(&self.stats);
        self.pending_events
            .push(SessionEvent::StatsChanged(self.stats.clone()));
    }

    /// Start the gate at the current level. Refused without hearts. Emits
    /// `GateStarted` and hands the engine a full plan; returns false when
    /// refused.
    pub fn start_gate(session: &Rc<RefCell<Self>>) -> bool {
        let (command_emitter, session_event_emitter, plan, events) = {
            let mut session = session.borrow_mut();
            if session.stats.hearts == 0 {
                info!(target: "session", "Gate start refused: no hearts left");
                return false;
            }
            session.playthrough_id = Uuid::new_v4();
            let plan = session.build_plan();
            session
                .pending_events
                .push(SessionEvent::GateStarted { gate_id: plan.gate_id });
            (
                session.command_emitter.clone(),
                session.session_event_emitter.clone(),
                plan,
                session.drain_events(),
            )
        };
        for event in &events {
            session_event_emitter.emit(event);
        }
        command_emitter.emit(&EngineCommand::LoadGate(plan));
        true
    }

    fn build_plan(&mut self) -> GatePlan {
        let gate_id = self.stats.level;
        let mut rounds = self.content.questions_for_gate(gate_id);
        rounds.truncate(ROUNDS_PER_GATE);
        if rounds.len() < ROUNDS_PER_GATE {
            warn!(
                target: "session",
                "Gate {} content short ({} rounds), padding with fallbacks",
                gate_id, rounds.len()
            );
            for ordinal in rounds.len()..ROUNDS_PER_GATE {
                rounds.push(Round::fallback(gate_id, ordinal));
            }
        }
        GatePlan {
            gate_id,
            rounds,
            difficulty_factor: self.stats.difficulty_factor,
            streak: self.stats.streak,
            hints_freeze: self.stats.hints_freeze,
            hints_reveal: self.stats.hints_reveal,
            seed: self
                .seed_override
                .unwrap_or_else(|| rand::rng().random()),
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn heart_refill_remaining(&self) -> Option<std::time::Duration> {
        self.stats.heart_refill_remaining(SystemTime::now())
    }

    pub fn high_scores(&self, limit: usize) -> Vec<GateRecord> {
        self.store.high_scores(limit)
    }

    /// Push any pending remote sync immediately. For shutdown.
    pub fn flush_sync(&mut self) {
        if let Some(synced) = self.store.flush() {
            self.pending_events
                .push(SessionEvent::SyncStateChanged { synced });
        }
    }
}
