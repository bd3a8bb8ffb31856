use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{difficulty, scoring};
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    Choice, ChoiceStatus, EngineCommand, EngineEvent, GameClock, GatePlan, IntensityTier,
    RoundPhase, RoundPhaseState, SessionEvent, TickSnapshot, MEMORIZE_SECONDS,
};

/// Input latch after a choice, before scoring applies.
const RESOLVE_LATCH_SECONDS: f64 = 0.5;
/// Reveal window after scoring; correct answers get extra time per letter
/// for the letter-by-letter reveal.
const REVEAL_BASE_SECONDS: f64 = 1.0;
const REVEAL_PER_CHAR_SECONDS: f64 = 0.15;
/// Blackout between rounds.
const TRANSITION_SECONDS: f64 = 0.4;
/// Freeze hint suspends the countdown for this much game time.
const FREEZE_SECONDS: f64 = 5.0;

/// Everything captured at the moment of choice; scoring consumes these
/// values once the resolution latch expires, not the tick state at that
/// later moment.
#[derive(Debug, Clone)]
struct PendingResolution {
    choice: Choice,
    time_left: f64,
    effective: f64,
    freeze_active: bool,
    is_reflex: bool,
}

#[derive(Debug)]
enum Latch {
    Open,
    Resolving { until: u64, pending: PendingResolution },
    Revealing { until: u64 },
    Transitioning { until: u64 },
}

/// The round state machine: MEMORIZE -> GUESS -> resolution -> transition,
/// five rounds per gate. One logical clock per engine drives the countdown,
/// the freeze window and every latch; a `Tick` command is the only source
/// of time.
pub struct RoundEngine {
    gate_id: u32,
    rounds: Vec<crate::model::Round>,
    current_round: usize,
    round_results: Vec<bool>,
    phase_state: RoundPhaseState,
    latch: Latch,
    clock: GameClock,
    freeze_until: Option<u64>,
    options: Vec<String>,
    rotation_offset: f64,
    session_score: u32,
    difficulty_factor: f64,
    streak: u32,
    hints_freeze: u32,
    hints_reveal: u32,
    is_paused: bool,
    gate_over: bool,
    rng: StdRng,
    pending_events: Vec<EngineEvent>,
    event_emitter: EventEmitter<EngineEvent>,
    command_subscription: Option<Unsubscriber<EngineCommand>>,
    session_subscription: Option<Unsubscriber<SessionEvent>>,
}

impl Destroyable for RoundEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.command_subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(subscription) = self.session_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<EngineCommand> for RoundEngine {
    fn handle_event(&mut self, event: &EngineCommand) {
        self.handle_command(event.clone());
    }
}

impl EventHandler<SessionEvent> for RoundEngine {
    fn handle_event(&mut self, event: &SessionEvent) {
        if let SessionEvent::StatsChanged(stats) = event {
            // mutate-then-derive: the session refreshes the factor before
            // broadcasting, so the next tick reads consistent values
            self.difficulty_factor = stats.difficulty_factor;
            self.streak = stats.streak;
            self.hints_freeze = stats.hints_freeze;
            self.hints_reveal = stats.hints_reveal;
        }
    }
}

impl RoundEngine {
    pub fn new(
        command_observer: EventObserver<EngineCommand>,
        event_emitter: EventEmitter<EngineEvent>,
        session_event_observer: EventObserver<SessionEvent>,
    ) -> Rc<RefCell<Self>> {
        let engine = Self {
            gate_id: 0,
            rounds: Vec::new(),
            current_round: 0,
            round_results: Vec::new(),
            phase_state: RoundPhaseState::new_memorize(),
            latch: Latch::Open,
            clock: GameClock::new(),
            freeze_until: None,
            options: Vec::new(),
            rotation_offset: 0.0,
            session_score: 0,
            difficulty_factor: 1.0,
            streak: 0,
            hints_freeze: 0,
            hints_reveal: 0,
            is_paused: false,
            gate_over: true,
            rng: StdRng::seed_from_u64(0),
            pending_events: Vec::new(),
            event_emitter,
            command_subscription: None,
            session_subscription: None,
        };
        let refcell = Rc::new(RefCell::new(engine));
        RoundEngine::wire_command_subscription(refcell.clone(), command_observer);
        RoundEngine::wire_session_subscription(refcell.clone(), session_event_observer);
        refcell
    }

    fn wire_command_subscription(
        engine: Rc<RefCell<Self>>,
        command_observer: EventObserver<EngineCommand>,
    ) {
        let handler = engine.clone();
        let subscription = command_observer.subscribe(move |command| {
            // handle under the borrow, emit outside it, so a listener may
            // answer with another command without re-entering the engine
            let (emitter, events) = {
                let mut engine = handler.borrow_mut();
                engine.handle_event(command);
                (engine.event_emitter.clone(), engine.drain_events())
            };
            for event in &events {
                emitter.emit(event);
            }
        });
        engine.borrow_mut().command_subscription = Some(subscription);
    }

    fn wire_session_subscription(
        engine: Rc<RefCell<Self>>,
        session_event_observer: EventObserver<SessionEvent>,
    ) {
        let handler = engine.clone();
        let subscription = session_event_observer.subscribe(move |event| {
            handler.borrow_mut().handle_event(event);
        });
        engine.borrow_mut().session_subscription = Some(subscription);
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn handle_command(&mut self, command: EngineCommand) {
        trace!(target: "round_engine", "Handling command: {:?}", command);
        match command {
            EngineCommand::LoadGate(plan) => self.load_gate(plan),
            EngineCommand::Tick => self.handle_tick(),
            EngineCommand::ConfirmMemorized => self.confirm_memorized(),
            EngineCommand::SelectChoice(word) => self.select_choice(word),
            EngineCommand::UseFreezeHint => self.use_freeze_hint(),
            EngineCommand::UseRevealHint => self.use_reveal_hint(),
            EngineCommand::Pause => self.pause(),
            EngineCommand::Resume => self.resume(),
            EngineCommand::Quit => self.quit(),
        }
    }

    fn load_gate(&mut self, plan: GatePlan) {
        info!(
            target: "round_engine",
            "Loading gate {}: {} rounds, factor {:.2}, streak {}",
            plan.gate_id, plan.rounds.len(), plan.difficulty_factor, plan.streak
        );
        self.gate_id = plan.gate_id;
        self.rounds = plan.rounds;
        self.difficulty_factor = plan.difficulty_factor;
        self.streak = plan.streak;
        self.hints_freeze = plan.hints_freeze;
        self.hints_reveal = plan.hints_reveal;
        self.rng = StdRng::seed_from_u64(plan.seed);
        self.current_round = 0;
        self.round_results.clear();
        self.phase_state = RoundPhaseState::new_memorize();
        self.latch = Latch::Open;
        self.clock = GameClock::new();
        self.freeze_until = None;
        self.options.clear();
        self.rotation_offset = 0.0;
        self.session_score = 0;
        self.is_paused = false;
        self.gate_over = self.rounds.is_empty();
        self.pending_events.push(EngineEvent::GateLoaded {
            gate_id: self.gate_id,
            round_count: self.rounds.len(),
        });
        self.pending_events
            .push(EngineEvent::RoundStarted { ordinal: 0 });
        self.pending_events.push(EngineEvent::PhaseChanged {
            phase: RoundPhase::Memorize,
            duration: MEMORIZE_SECONDS,
        });
    }

    fn handle_tick(&mut self) {
        if self.is_paused || self.gate_over {
            return;
        }
        self.clock.advance();
        let now = self.clock.now();

        match std::mem::replace(&mut self.latch, Latch::Open) {
            Latch::Resolving { until, pending } => {
                if now >= until {
                    self.resolve(pending);
                } else {
                    self.latch = Latch::Resolving { until, pending };
                }
                return;
            }
            Latch::Revealing { until } => {
                self.latch = if now >= until {
                    Latch::Transitioning {
                        until: self.clock.deadline(TRANSITION_SECONDS),
                    }
                } else {
                    Latch::Revealing { until }
                };
                return;
            }
            Latch::Transitioning { until } => {
                if now >= until {
                    self.advance_round();
                } else {
                    self.latch = Latch::Transitioning { until };
                }
                return;
            }
            Latch::Open => {}
        }

        // the deadline tick is still frozen; decrement resumes one past it
        if let Some(until) = self.freeze_until {
            if now > until {
                self.freeze_until = None;
                self.phase_state.is_frozen = false;
                debug!(target: "round_engine", "Freeze window expired");
            }
        }

        let expired = if self.phase_state.is_frozen {
            false
        } else {
            self.phase_state.countdown.tick()
        };

        if expired {
            match self.phase_state.phase {
                RoundPhase::Memorize => self.enter_guess(),
                RoundPhase::Guess => {
                    self.begin_resolution(Choice::TimeUp);
                    return;
                }
            }
        }

        let effective = self.current_effective();
        let pulse = difficulty::pulse_factor(self.rotation_offset, effective);
        self.rotation_offset +=
            difficulty::rotation_speed(self.phase_state.phase) * effective * pulse;
        self.pending_events.push(EngineEvent::Tick(TickSnapshot {
            phase: self.phase_state.phase,
            round_ordinal: self.current_round,
            time_left: self.phase_state.time_left(),
            phase_duration: self.phase_state.countdown.duration(),
            effective_difficulty: effective,
            intensity: IntensityTier::for_difficulty(effective),
            rotation_offset: self.rotation_offset,
            adrenaline_factor: difficulty::adrenaline_factor(
                self.phase_state.phase,
                self.phase_state.time_left(),
                self.phase_state.countdown.duration(),
                effective,
                pulse,
            ),
            is_frozen: self.phase_state.is_frozen,
        }));
    }

    fn current_effective(&self) -> f64 {
        difficulty::effective_difficulty(
            self.difficulty_factor,
            self.phase_state.phase,
            self.phase_state.time_left(),
            self.phase_state.countdown.duration(),
            self.streak,
        )
    }

    fn confirm_memorized(&mut self) {
        if self.gate_over
            || self.is_paused
            || self.phase_state.phase != RoundPhase::Memorize
            || !matches!(self.latch, Latch::Open)
        {
            return;
        }
        self.enter_guess();
    }

    fn enter_guess(&mut self) {
        let duration = difficulty::dynamic_round_time(self.difficulty_factor);
        self.phase_state.enter_guess(duration);
        let mut options = self.rounds[self.current_round].options();
        options.shuffle(&mut self.rng);
        self.options = options.clone();
        debug!(
            target: "round_engine",
            "Round {} guess phase: {:.2}s window at factor {:.2}",
            self.current_round, duration, self.difficulty_factor
        );
        self.pending_events.push(EngineEvent::PhaseChanged {
            phase: RoundPhase::Guess,
            duration,
        });
        self.pending_events
            .push(EngineEvent::OptionsShuffled(options));
    }

    fn select_choice(&mut self, word: String) {
        if self.gate_over
            || self.is_paused
            || self.phase_state.phase != RoundPhase::Guess
            || self.phase_state.selected_choice.is_some()
            || !matches!(self.latch, Latch::Open)
        {
            return;
        }
        self.begin_resolution(Choice::Word(word));
    }

    fn begin_resolution(&mut self, choice: Choice) {
        let time_left = self.phase_state.time_left();
        let pending = PendingResolution {
            choice: choice.clone(),
            time_left,
            effective: self.current_effective(),
            freeze_active: self.phase_state.is_frozen,
            is_reflex: scoring::reflex_elapsed(self.phase_state.elapsed()),
        };
        self.phase_state.selected_choice = Some(choice);
        self.latch = Latch::Resolving {
            until: self.clock.deadline(RESOLVE_LATCH_SECONDS),
            pending,
        };
    }

    fn resolve(&mut self, pending: PendingResolution) {
        let round = self.rounds[self.current_round].clone();
        let outcome = scoring::resolve_choice(
            &pending.choice,
            &round.target,
            pending.time_left,
            pending.effective,
            pending.freeze_active,
            pending.is_reflex,
        );
        self.phase_state.status = if outcome.is_correct {
            ChoiceStatus::Success
        } else {
            ChoiceStatus::Fail
        };
        self.session_score = scoring::apply_points(self.session_score, outcome.points_delta);
        self.round_results.push(outcome.is_correct);
        // local mirror; the session's StatsChanged broadcast confirms it
        if outcome.is_correct {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        info!(
            target: "round_engine",
            "Round {} resolved: {:?} -> {} ({:+} points, score {})",
            round.ordinal, pending.choice, self.phase_state.status_word(),
            outcome.points_delta, self.session_score
        );
        let reveal_seconds = if outcome.is_correct {
            REVEAL_BASE_SECONDS + REVEAL_PER_CHAR_SECONDS * round.target.chars().count() as f64
        } else {
            REVEAL_BASE_SECONDS
        };
        self.pending_events.push(EngineEvent::RoundResolved {
            ordinal: round.ordinal,
            outcome,
            session_score: self.session_score,
        });
        self.latch = Latch::Revealing {
            until: self.clock.deadline(reveal_seconds),
        };
    }

    fn advance_round(&mut self) {
        self.latch = Latch::Open;
        if self.current_round + 1 >= self.rounds.len() {
            let outcome = scoring::gate_outcome(&self.round_results);
            self.gate_over = true;
            info!(
                target: "round_engine",
                "Gate {} finished: {:?}, score {}", self.gate_id, outcome, self.session_score
            );
            self.pending_events.push(EngineEvent::GateFinished {
                outcome,
                session_score: self.session_score,
                duration: self.clock.elapsed(),
            });
            return;
        }
        self.current_round += 1;
        self.phase_state = RoundPhaseState::new_memorize();
        self.freeze_until = None;
        self.options.clear();
        self.pending_events.push(EngineEvent::RoundStarted {
            ordinal: self.current_round,
        });
        self.pending_events.push(EngineEvent::PhaseChanged {
            phase: RoundPhase::Memorize,
            duration: MEMORIZE_SECONDS,
        });
    }

    fn use_freeze_hint(&mut self) {
        if self.gate_over
            || self.is_paused
            || self.phase_state.phase != RoundPhase::Guess
            || !matches!(self.latch, Latch::Open)
            || self.phase_state.freeze_used
            || self.hints_freeze == 0
        {
            trace!(target: "round_engine", "Freeze hint refused");
            return;
        }
        self.hints_freeze -= 1;
        self.phase_state.freeze_used = true;
        self.phase_state.is_frozen = true;
        self.freeze_until = Some(self.clock.deadline(FREEZE_SECONDS));
        self.pending_events.push(EngineEvent::FreezeHintApplied {
            seconds: FREEZE_SECONDS,
        });
    }

    fn use_reveal_hint(&mut self) {
        if self.gate_over
            || self.is_paused
            || self.phase_state.phase != RoundPhase::Guess
            || !matches!(self.latch, Latch::Open)
            || self.phase_state.hint_reveal_used
            || self.hints_reveal == 0
        {
            trace!(target: "round_engine", "Reveal hint refused");
            return;
        }
        self.hints_reveal -= 1;
        self.phase_state.hint_reveal_used = true;
        let first_letter = self.rounds[self.current_round]
            .target
            .chars()
            .next()
            .unwrap_or('?');
        self.pending_events
            .push(EngineEvent::RevealHintApplied { first_letter });
    }

    fn pause(&mut self) {
        if !self.is_paused && !self.gate_over {
            self.is_paused = true;
            self.pending_events.push(EngineEvent::Paused);
        }
    }

    fn resume(&mut self) {
        if self.is_paused {
            self.is_paused = false;
            self.pending_events.push(EngineEvent::Resumed);
        }
    }

    fn quit(&mut self) {
        if self.gate_over {
            return;
        }
        info!(target: "round_engine", "Gate {} cancelled by quit", self.gate_id);
        self.gate_over = true;
        self.pending_events.push(EngineEvent::Cancelled);
    }
}

impl RoundPhaseState {
    fn status_word(&self) -> &'static str {
        match self.status {
            ChoiceStatus::Idle => "idle",
            ChoiceStatus::Success => "success",
            ChoiceStatus::Fail => "fail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::model::{Round, SessionStats};
    use test_context::test_context;

    use crate::tests::UsingLogger;

    struct Harness {
        commands: EventEmitter<EngineCommand>,
        session_events: EventEmitter<SessionEvent>,
        events: Rc<RefCell<Vec<EngineEvent>>>,
        _engine: Rc<RefCell<RoundEngine>>,
    }

    impl Harness {
        fn new() -> Self {
            let (command_emitter, command_observer) = Channel::new();
            let (engine_event_emitter, engine_event_observer) = Channel::new();
            let (session_event_emitter, session_event_observer) = Channel::new();
            let engine = RoundEngine::new(
                command_observer,
                engine_event_emitter,
                session_event_observer,
            );
            let events = Rc::new(RefCell::new(Vec::new()));
            let sink = events.clone();
            engine_event_observer.subscribe(move |event: &EngineEvent| {
                sink.borrow_mut().push(event.clone());
            });
            Self {
                commands: command_emitter,
                session_events: session_event_emitter,
                events,
                _engine: engine,
            }
        }

        fn emit(&self, command: EngineCommand) {
            self.commands.emit(&command);
        }

        fn tick(&self, count: usize) {
            for _ in 0..count {
                self.emit(EngineCommand::Tick);
            }
        }

        fn last_snapshot(&self) -> Option<TickSnapshot> {
            self.events
                .borrow()
                .iter()
                .rev()
                .find_map(|event| match event {
                    EngineEvent::Tick(snapshot) => Some(snapshot.clone()),
                    _ => None,
                })
        }

        fn resolutions(&self) -> Vec<(usize, crate::model::ChoiceOutcome, u32)> {
            self.events
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    EngineEvent::RoundResolved {
                        ordinal,
                        outcome,
                        session_score,
                    } => Some((*ordinal, outcome.clone(), *session_score)),
                    _ => None,
                })
                .collect()
        }

        fn gate_finished(&self) -> Option<(crate::model::GateOutcome, u32)> {
            self.events
                .borrow()
                .iter()
                .find_map(|event| match event {
                    EngineEvent::GateFinished {
                        outcome,
                        session_score,
                        ..
                    } => Some((*outcome, *session_score)),
                    _ => None,
                })
        }

        fn guess_phase_changes(&self) -> Vec<f64> {
            self.events
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    EngineEvent::PhaseChanged {
                        phase: RoundPhase::Guess,
                        duration,
                    } => Some(*duration),
                    _ => None,
                })
                .collect()
        }

        fn clear_events(&self) {
            self.events.borrow_mut().clear();
        }
    }

    fn make_round(ordinal: usize) -> Round {
        Round {
            gate_id: 1,
            ordinal,
            target: format!("hedef{}", ordinal),
            distractors: [
                format!("yanlis{}a", ordinal),
                format!("yanlis{}b", ordinal),
                format!("yanlis{}c", ordinal),
            ],
            base_difficulty: 1.0,
        }
    }

    fn make_plan(factor: f64) -> GatePlan {
        GatePlan {
            gate_id: 1,
            rounds: (0..5).map(make_round).collect(),
            difficulty_factor: factor,
            streak: 0,
            hints_freeze: 3,
            hints_reveal: 3,
            seed: 7,
        }
    }

    /// Tick through the resolve latch, reveal window and transition so the
    /// next round's MEMORIZE is active.
    fn settle(harness: &Harness) {
        harness.tick(120);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_confirm_memorized_enters_guess_with_dynamic_time(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(2.0)));
        harness.emit(EngineCommand::ConfirmMemorized);

        let durations = harness.guess_phase_changes();
        assert_eq!(durations, vec![5.0]); // 10s / factor 2.0

        let options = harness
            .events
            .borrow()
            .iter()
            .find_map(|event| match event {
                EngineEvent::OptionsShuffled(options) => Some(options.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&"hedef0".to_string()));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_memorize_expiry_auto_enters_guess(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        // 30s of memorize at 50ms per tick
        harness.tick(601);
        assert_eq!(harness.guess_phase_changes(), vec![10.0]);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_scripted_gate_pass_three_of_five(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));

        for round in 0..5 {
            harness.emit(EngineCommand::ConfirmMemorized);
            harness.tick(10);
            let choice = if round < 3 {
                format!("hedef{}", round)
            } else {
                format!("yanlis{}a", round)
            };
            harness.emit(EngineCommand::SelectChoice(choice));
            settle(&harness);
        }

        let resolutions = harness.resolutions();
        assert_eq!(resolutions.len(), 5);
        assert!(resolutions[..3].iter().all(|(_, outcome, _)| outcome.is_correct));
        assert!(resolutions[3..].iter().all(|(_, outcome, _)| !outcome.is_correct));

        let (outcome, score) = harness.gate_finished().unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.result().correct_count, 3);
        assert_eq!(outcome.result().stars_awarded, 1);
        assert_eq!(outcome.result().coins_awarded, 150);
        assert_eq!(score, resolutions[4].2);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_scripted_gate_fail_two_of_five(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));

        for round in 0..5 {
            harness.emit(EngineCommand::ConfirmMemorized);
            harness.tick(10);
            let choice = if round < 2 {
                format!("hedef{}", round)
            } else {
                format!("yanlis{}b", round)
            };
            harness.emit(EngineCommand::SelectChoice(choice));
            settle(&harness);
        }

        let (outcome, _) = harness.gate_finished().unwrap();
        assert!(!outcome.passed());
        assert_eq!(outcome.result().correct_count, 2);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_guess_expiry_resolves_time_up_at_full_ramp(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        // run the 10s guess window out, then through the latches
        harness.tick(250);

        let resolutions = harness.resolutions();
        assert_eq!(resolutions.len(), 1);
        let (_, outcome, score) = &resolutions[0];
        assert!(!outcome.is_correct);
        assert!(!outcome.is_reflex);
        // time_left 0: full quadratic ramp, factor 1.0 -> effective 1.5
        assert!((outcome.effective_difficulty - 1.5).abs() < 1e-9);
        assert_eq!(outcome.points_delta, -112);
        assert_eq!(*score, 0); // score floors at zero
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_reflex_detection_by_elapsed_time(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(39); // 1.95s elapsed
        harness.emit(EngineCommand::SelectChoice("hedef0".to_string()));
        settle(&harness);
        assert!(harness.resolutions()[0].1.is_reflex);

        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(41); // 2.05s elapsed
        harness.emit(EngineCommand::SelectChoice("hedef1".to_string()));
        settle(&harness);
        assert!(!harness.resolutions()[1].1.is_reflex);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_freeze_suspends_countdown_only(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(20); // 1s into the guess window
        harness.emit(EngineCommand::UseFreezeHint);

        harness.clear_events();
        harness.tick(40); // 2s inside the 5s freeze
        let snapshot = harness.last_snapshot().unwrap();
        assert!(snapshot.is_frozen);
        assert!((snapshot.time_left - 9.0).abs() < 1e-6);

        harness.clear_events();
        harness.tick(80); // freeze expires 3s in, then 1s of decrement
        let snapshot = harness.last_snapshot().unwrap();
        assert!(!snapshot.is_frozen);
        assert!((snapshot.time_left - 8.0).abs() < 1e-6);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_freeze_hint_once_per_round(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.emit(EngineCommand::UseFreezeHint);
        harness.tick(110); // past the 5s window
        harness.emit(EngineCommand::UseFreezeHint);

        let applied = harness
            .events
            .borrow()
            .iter()
            .filter(|event| matches!(event, EngineEvent::FreezeHintApplied { .. }))
            .count();
        assert_eq!(applied, 1);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_freeze_refused_during_memorize(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::UseFreezeHint);
        assert!(!harness
            .events
            .borrow()
            .iter()
            .any(|event| matches!(event, EngineEvent::FreezeHintApplied { .. })));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_reveal_hint_emits_first_letter(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.emit(EngineCommand::UseRevealHint);
        harness.emit(EngineCommand::UseRevealHint);

        let letters: Vec<char> = harness
            .events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::RevealHintApplied { first_letter } => Some(*first_letter),
                _ => None,
            })
            .collect();
        assert_eq!(letters, vec!['h']); // once per round
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_pause_suspends_ticks_exactly(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(20);
        let before = harness.last_snapshot().unwrap();

        harness.emit(EngineCommand::Pause);
        harness.clear_events();
        harness.tick(200);
        assert!(harness.last_snapshot().is_none()); // nothing moves

        harness.emit(EngineCommand::Resume);
        harness.tick(1);
        let after = harness.last_snapshot().unwrap();
        assert!((before.time_left - after.time_left - TICK_SECONDS_F).abs() < 1e-6);
    }

    const TICK_SECONDS_F: f64 = crate::model::TICK_SECONDS;

    #[test_context(UsingLogger)]
    #[test]
    fn test_latched_machine_rejects_input(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(10);
        harness.emit(EngineCommand::SelectChoice("hedef0".to_string()));
        // second choice and hints land while latched
        harness.emit(EngineCommand::SelectChoice("yanlis0a".to_string()));
        harness.emit(EngineCommand::UseFreezeHint);
        settle(&harness);

        let resolutions = harness.resolutions();
        assert_eq!(resolutions.len(), 1);
        assert!(resolutions[0].1.is_correct);
        assert!(!harness
            .events
            .borrow()
            .iter()
            .any(|event| matches!(event, EngineEvent::FreezeHintApplied { .. })));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_quit_cancels_immediately(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));
        harness.emit(EngineCommand::ConfirmMemorized);
        harness.tick(10);
        harness.emit(EngineCommand::Quit);

        assert!(harness
            .events
            .borrow()
            .iter()
            .any(|event| matches!(event, EngineEvent::Cancelled)));
        assert!(harness.gate_finished().is_none());

        harness.clear_events();
        harness.tick(50);
        harness.emit(EngineCommand::SelectChoice("hedef0".to_string()));
        assert!(harness.events.borrow().is_empty()); // engine is dead until the next LoadGate
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_stats_changed_updates_difficulty_inputs(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.0)));

        let stats = SessionStats {
            streak: 4,
            difficulty_factor: 1.25,
            ..SessionStats::default()
        };
        harness
            .session_events
            .emit(&SessionEvent::StatsChanged(stats));

        harness.emit(EngineCommand::ConfirmMemorized);
        assert_eq!(harness.guess_phase_changes(), vec![8.0]); // 10 / 1.25

        harness.tick(1);
        let snapshot = harness.last_snapshot().unwrap();
        // overdrive 1.4 applies on top of the (still tiny) time ramp
        assert!(snapshot.effective_difficulty > 1.25 * 1.4 - 1e-9);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_effective_difficulty_ramps_within_guess(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.3)));
        harness.emit(EngineCommand::ConfirmMemorized);

        harness.tick(1);
        let early = harness.last_snapshot().unwrap().effective_difficulty;
        harness.tick(100);
        let late = harness.last_snapshot().unwrap().effective_difficulty;
        assert!(late > early);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_memorize_snapshot_uses_global_factor(_ctx: &mut UsingLogger) {
        let harness = Harness::new();
        harness.emit(EngineCommand::LoadGate(make_plan(1.3)));
        harness.tick(5);
        let snapshot = harness.last_snapshot().unwrap();
        assert_eq!(snapshot.phase, RoundPhase::Memorize);
        assert_eq!(snapshot.effective_difficulty, 1.3);
        assert_eq!(snapshot.adrenaline_factor, 1.0);
    }
}
