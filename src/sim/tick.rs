//! Cooperative animation tick
//!
//! The host calls [`tick`] once per frame. At most one animation runs per
//! puzzle; when it finishes, its completion is applied (score, phase, host
//! notification) before `tick` returns.

use super::orientation::{SnapToAxis, TurnAnimation};
use super::outcome::{Outcome, evaluate};
use super::state::{GameEvent, GamePhase, GameState, Host};
use super::travel::Travel;

/// The animation occupying a puzzle's single slot
#[derive(Debug, Clone)]
pub enum Animation {
    Turn(TurnAnimation),
    SnapToAxis(SnapToAxis),
    Travel(Travel),
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Nothing was running
    Idle,
    /// Still running; tick again next frame
    Continue,
    /// Finished this tick
    Done(Outcome),
}

/// Advance the running animation by `dt` seconds
pub fn tick<H: Host + ?Sized>(state: &mut GameState, host: &mut H, dt: f32) -> TickStatus {
    let Some(animation) = state.animation.as_mut() else {
        return TickStatus::Idle;
    };

    let finished = match animation {
        Animation::Turn(turn) => turn.tick(&mut state.orientation, dt),
        Animation::SnapToAxis(snap) => snap.tick(&mut state.orientation),
        Animation::Travel(travel) => travel.tick(&mut state.model, dt),
    };
    if !finished {
        return TickStatus::Continue;
    }

    let Some(finished) = state.animation.take() else {
        return TickStatus::Idle;
    };
    let outcome = match finished {
        Animation::Turn(_) => {
            host.notify(GameEvent::TurnCompleted);
            Outcome::Turned
        }
        Animation::SnapToAxis(_) => {
            state.solution.increment_score();
            host.notify(GameEvent::TurnCompleted);
            Outcome::Turned
        }
        Animation::Travel(travel) => {
            log::debug!("{} finished", travel.kind().as_str());
            complete_travel(state, host)
        }
    };
    TickStatus::Done(outcome)
}

fn complete_travel<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Outcome {
    let outcome = evaluate(&state.model, &mut state.solution);
    match outcome {
        Outcome::Lost => {
            log::info!("Game lost");
            state.phase = GamePhase::Lost;
            host.notify(GameEvent::GameLost);
        }
        Outcome::Won => {
            log::info!("Game won with score {}", state.solution.score());
            state.phase = GamePhase::Won;
            host.notify(GameEvent::GameWon);
        }
        Outcome::Travelled | Outcome::Turned => host.notify(GameEvent::TravelCompleted),
    }
    outcome
}

/// Tick until the running animation finishes (or `max_ticks` pass)
pub fn run_to_completion<H: Host + ?Sized>(
    state: &mut GameState,
    host: &mut H,
    dt: f32,
    max_ticks: u32,
) -> TickStatus {
    for _ in 0..max_ticks {
        match tick(state, host, dt) {
            TickStatus::Continue => {}
            status => return status,
        }
    }
    log::warn!("Animation still running after {max_ticks} ticks");
    TickStatus::Continue
}
