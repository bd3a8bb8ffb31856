use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use wordgate::events::Channel;
use wordgate::game::content::{ContentProvider, WordBank};
use wordgate::game::{GameSession, RoundEngine};
use wordgate::game::stats_store::StatsStore;
use wordgate::model::{EngineCommand, EngineEvent, RoundPhase, SessionEvent};

/// Gates the demo bot plays before exiting.
const DEMO_GATES: u32 = 3;

/// Safety bound on ticks per gate; a healthy gate finishes well under this.
const MAX_TICKS_PER_GATE: u32 = 20_000;

/// What the bot has seen of the current gate, fed purely by engine events.
#[derive(Default)]
struct BotView {
    gate_id: u32,
    ordinal: usize,
    phase: Option<RoundPhase>,
    ticks_in_phase: u32,
    answered: bool,
    hinted: bool,
    gate_done: bool,
}

impl BotView {
    fn observe(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::GateLoaded { gate_id, .. } => {
                *self = BotView {
                    gate_id: *gate_id,
                    ..BotView::default()
                };
            }
            EngineEvent::RoundStarted { ordinal } => {
                self.ordinal = *ordinal;
                self.answered = false;
                self.hinted = false;
            }
            EngineEvent::PhaseChanged { phase, .. } => {
                self.phase = Some(*phase);
                self.ticks_in_phase = 0;
            }
            EngineEvent::Tick(_) => {
                self.ticks_in_phase += 1;
            }
            EngineEvent::GateFinished { .. } | EngineEvent::Cancelled => {
                self.gate_done = true;
            }
            _ => {}
        }
    }
}

/// Scripted autoplay: answer from the word bank, deliberately miss round 3
/// to exercise the penalty path, spend one freeze hint per gate.
fn next_action(view: &mut BotView, bank: &WordBank) -> Option<EngineCommand> {
    match view.phase? {
        RoundPhase::Memorize if view.ticks_in_phase >= 10 => Some(EngineCommand::ConfirmMemorized),
        RoundPhase::Guess if view.ordinal == 1 && !view.hinted => {
            view.hinted = true;
            Some(EngineCommand::UseFreezeHint)
        }
        RoundPhase::Guess if !view.answered && view.ticks_in_phase >= 20 => {
            view.answered = true;
            let rounds = bank.questions_for_gate(view.gate_id);
            let target = rounds
                .get(view.ordinal)
                .map(|round| round.target.clone())
                .unwrap_or_else(|| "HATA".to_string());
            let choice = if view.ordinal == 3 {
                rounds
                    .get(view.ordinal)
                    .map(|round| round.distractors[0].clone())
                    .unwrap_or_else(|| "HAVA".to_string())
            } else {
                target
            };
            Some(EngineCommand::SelectChoice(choice))
        }
        _ => None,
    }
}

fn main() {
    env_logger::init();

    let (command_emitter, command_observer) = Channel::new();
    let (engine_event_emitter, engine_event_observer) = Channel::new();
    let (session_event_emitter, session_event_observer) = Channel::new();

    let bank = WordBank::bundled();
    let _engine = RoundEngine::new(
        command_observer,
        engine_event_emitter,
        session_event_observer.clone(),
    );
    let session = GameSession::new(
        engine_event_observer.clone(),
        command_emitter.clone(),
        session_event_emitter,
        StatsStore::new(),
        Box::new(bank.clone()),
    );

    let view = Rc::new(RefCell::new(BotView::default()));
    let view_sink = view.clone();
    engine_event_observer.subscribe(move |event: &EngineEvent| {
        view_sink.borrow_mut().observe(event);
    });
    session_event_observer.subscribe(|event: &SessionEvent| {
        if let SessionEvent::GateRecorded(record) = event {
            info!(
                "Gate {} recorded: {}/5 correct, {} stars, score {}",
                record.gate_id, record.correct_count, record.stars_awarded, record.score
            );
        }
    });

    for _ in 0..DEMO_GATES {
        if !GameSession::start_gate(&session) {
            info!("Out of hearts, stopping the demo");
            break;
        }
        for _ in 0..MAX_TICKS_PER_GATE {
            command_emitter.emit(&EngineCommand::Tick);
            let action = {
                let mut view = view.borrow_mut();
                if view.gate_done {
                    break;
                }
                next_action(&mut view, &bank)
            };
            if let Some(action) = action {
                command_emitter.emit(&action);
            }
        }
    }

    session.borrow_mut().flush_sync();
    let session = session.borrow();
    let stats = session.stats();
    info!(
        "Demo finished: level {}, {} coins, {} stars, {} hearts, best streak {}",
        stats.level, stats.coins, stats.stars, stats.hearts, stats.max_streak
    );
    for record in session.high_scores(5) {
        info!(
            "  top score: gate {} -> {} ({} stars)",
            record.gate_id, record.score, record.stars_awarded
        );
    }
}
