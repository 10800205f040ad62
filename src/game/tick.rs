//! Simulation Tick
//!
//! One frame of a level: physics step, event bookkeeping, camera follow and
//! goal check. Given the same state, intents and time scale, a tick always
//! produces the same result, which is what replay verification relies on.

use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};
use crate::game::events::{GameEvent, sort_events};
use crate::game::input::{InputRecording, Intents};
use crate::game::physics::{self, StepReport};
use crate::game::state::{LevelPhase, LevelState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in processing order
    pub events: Vec<GameEvent>,
    /// Whether the level was completed this tick
    pub completed: bool,
    /// Raw physics side effects
    pub report: StepReport,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The level state (will be mutated)
/// * `intents` - Abstract intents held this frame
/// * `time_scale` - Frame interval in nominal frames, from the frame clock
///
/// A completed level is frozen: further ticks return immediately with
/// `completed` set and no events.
pub fn tick(state: &mut LevelState, intents: Intents, time_scale: f32) -> TickResult {
    let mut result = TickResult::default();

    if state.phase == LevelPhase::Completed {
        result.completed = true;
        return result;
    }

    // 0. Advance tick counter
    state.tick += 1;

    // 1. Physics (collision, pickups, hazards)
    let report = physics::update(
        &mut state.actor,
        intents,
        &mut state.grid,
        &state.physics,
        time_scale,
    );

    // 2. Translate side effects into events
    record_step_events(state, &report);

    // 3. Camera
    state.camera.follow(state.actor.center());

    // 4. Goal
    if state.flag_reached() {
        complete_level(state, &mut result);
    }

    result.events = state.take_events();
    sort_events(&mut result.events);
    result.report = report;
    result
}

fn record_step_events(state: &mut LevelState, report: &StepReport) {
    let tick = state.tick;

    if report.spiked {
        state.push_event(GameEvent::respawned(tick, state.actor.respawns));
    }

    // Totals count up to the actor's final coin count
    let first_total = state.actor.coins.saturating_sub(report.coins.len() as u32);
    for (i, cell) in report.coins.iter().enumerate() {
        state.push_event(GameEvent::coin_collected(tick, *cell, first_total + i as u32 + 1));
    }

    if let Some(kind) = report.jump {
        state.push_event(GameEvent::jumped(tick, kind));
    }

    if report.landed {
        state.push_event(GameEvent::landed(tick));
    }
}

fn complete_level(state: &mut LevelState, result: &mut TickResult) {
    state.phase = LevelPhase::Completed;
    result.completed = true;

    tracing::info!(
        level = ?state.level_index,
        coins = state.actor.coins,
        ticks = state.tick,
        "level complete"
    );

    state.push_event(GameEvent::level_completed(
        state.tick,
        state.level_index,
        state.actor.coins,
    ));
}

// =============================================================================
// REPLAY
// =============================================================================

/// Failure to (de)serialize a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Binary encoding failed
    #[error("recording encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Replay a level run from a recording.
///
/// Stops early if the level completes. Returns the final state and all events.
pub fn replay_level(
    initial_state: LevelState,
    recording: &InputRecording,
) -> (LevelState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for step in recording.steps() {
        let result = tick(&mut state, step.intents, step.time_scale);
        all_events.extend(result.events);

        if result.completed {
            break;
        }
    }

    (state, all_events)
}

impl InputRecording {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Fingerprint of the recorded inputs (intents and scales).
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_recording();
        hasher.update_u64(self.level_index as u64);
        hasher.update_u32(self.len() as u32);
        for step in self.steps() {
            hasher.update_u8(step.intents.to_bits());
            hasher.update_f32(step.time_scale);
        }
        hasher.finalize()
    }
}
