//! Game Events
//!
//! Events generated during a tick, consumed by the session layer and kept in
//! replay output.

use std::cmp::Ordering;
use serde::{Serialize, Deserialize};

use crate::game::grid::CellPos;
use crate::game::physics::JumpKind;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Hazard respawns first
    Hazard = 0,
    /// Then pickups
    Pickup = 1,
    /// Then movement milestones
    Movement = 2,
    /// Then level transitions
    Progress = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Actor touched a spike and went back to spawn
    Respawned {
        respawns: u32,
    },

    /// Actor collected a coin
    CoinCollected {
        cell: CellPos,
        total: u32,
    },

    /// A ground or wall jump started
    Jumped {
        kind: JumpKind,
    },

    /// Actor became grounded
    Landed,

    /// Actor reached a flag
    LevelCompleted {
        level_index: Option<usize>,
        coins: u32,
        ticks: u32,
    },

    /// A level was installed. `level_index` is `None` for custom levels.
    LevelLoaded {
        level_index: Option<usize>,
        rows: usize,
        cols: usize,
    },

    /// An async level load failed; the current level stays active
    LoadFailed {
        reason: String,
    },

    /// Edit mode switched
    EditModeToggled {
        edit_mode: bool,
    },
}

impl GameEventData {
    /// Default priority for this kind of event.
    pub fn priority(&self) -> EventPriority {
        match self {
            GameEventData::Respawned { .. } => EventPriority::Hazard,
            GameEventData::CoinCollected { .. } => EventPriority::Pickup,
            GameEventData::Jumped { .. } | GameEventData::Landed => EventPriority::Movement,
            GameEventData::LevelCompleted { .. }
            | GameEventData::LevelLoaded { .. }
            | GameEventData::LoadFailed { .. } => EventPriority::Progress,
            GameEventData::EditModeToggled { .. } => EventPriority::Other,
        }
    }
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event with the data's default priority.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self {
            tick,
            priority: data.priority(),
            data,
        }
    }

    /// Create respawned event.
    pub fn respawned(tick: u32, respawns: u32) -> Self {
        Self::new(tick, GameEventData::Respawned { respawns })
    }

    /// Create coin collected event.
    pub fn coin_collected(tick: u32, cell: CellPos, total: u32) -> Self {
        Self::new(tick, GameEventData::CoinCollected { cell, total })
    }

    /// Create jumped event.
    pub fn jumped(tick: u32, kind: JumpKind) -> Self {
        Self::new(tick, GameEventData::Jumped { kind })
    }

    /// Create landed event.
    pub fn landed(tick: u32) -> Self {
        Self::new(tick, GameEventData::Landed)
    }

    /// Create level completed event.
    pub fn level_completed(tick: u32, level_index: Option<usize>, coins: u32) -> Self {
        Self::new(
            tick,
            GameEventData::LevelCompleted {
                level_index,
                coins,
                ticks: tick,
            },
        )
    }

    /// Create level loaded event.
    pub fn level_loaded(tick: u32, level_index: Option<usize>, rows: usize, cols: usize) -> Self {
        Self::new(tick, GameEventData::LevelLoaded { level_index, rows, cols })
    }

    /// Create load failed event.
    pub fn load_failed(tick: u32, reason: impl Into<String>) -> Self {
        Self::new(tick, GameEventData::LoadFailed { reason: reason.into() })
    }

    /// Create edit mode toggled event.
    pub fn edit_mode_toggled(tick: u32, edit_mode: bool) -> Self {
        Self::new(tick, GameEventData::EditModeToggled { edit_mode })
    }

    /// Processing order: tick, then priority.
    pub fn order(&self, other: &Self) -> Ordering {
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
    }
}

/// Stable sort into processing order. Events with equal tick and priority
/// keep their emission order.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by(GameEvent::order);
}
