//! Level State
//!
//! Everything one level needs to simulate: the grid, the actor, the camera
//! and the tick counter. Replaced wholesale on level transition.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::Vec2;
use crate::game::actor::Actor;
use crate::game::camera::{Camera, CameraMode};
use crate::game::events::GameEvent;
use crate::game::grid::{CellPos, TileGrid};
use crate::game::physics::PhysicsConfig;
use crate::game::tile::TileKind;

/// Default actor spawn point (sprite top-left, pixels).
pub const DEFAULT_SPAWN: Vec2 = Vec2::new(64.0, 300.0);

/// Level lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Ticks advance the simulation
    Playing,
    /// Flag reached; ticks are no-ops until the level is replaced
    Completed,
}

/// Parameters for building a [`LevelState`].
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSetup {
    /// Actor spawn point
    pub spawn: Vec2,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Camera follow behavior
    pub camera_mode: CameraMode,
    /// Movement tuning
    pub physics: PhysicsConfig,
}

impl Default for LevelSetup {
    fn default() -> Self {
        Self {
            spawn: DEFAULT_SPAWN,
            viewport: Vec2::new(crate::VIEWPORT_WIDTH, crate::VIEWPORT_HEIGHT),
            camera_mode: CameraMode::Center,
            physics: PhysicsConfig::default(),
        }
    }
}

/// Complete state of one level run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelState {
    /// Ticks simulated on this level
    pub tick: u32,

    /// Catalog index, `None` for custom (loaded or edited-from-scratch) levels
    pub level_index: Option<usize>,

    /// Current phase
    pub phase: LevelPhase,

    /// Tile grid (coins are removed in place)
    pub grid: TileGrid,

    /// The player body
    pub actor: Actor,

    /// Viewport
    pub camera: Camera,

    /// Movement tuning
    pub physics: PhysicsConfig,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl LevelState {
    /// Create a fresh level run: actor at spawn, camera following it.
    pub fn new(grid: TileGrid, level_index: Option<usize>, setup: &LevelSetup) -> Self {
        let actor = Actor::new(setup.spawn, &setup.physics);
        let mut camera = Camera::new(
            Vec2::new(grid.pixel_width(), grid.pixel_height()),
            setup.viewport,
            setup.camera_mode,
        );
        camera.follow(actor.center());

        Self {
            tick: 0,
            level_index,
            phase: LevelPhase::Playing,
            grid,
            actor,
            camera,
            physics: setup.physics.clone(),
            pending_events: Vec::new(),
        }
    }

    /// Cell under the center of the actor's hitbox.
    pub fn actor_cell(&self) -> CellPos {
        CellPos::containing(self.actor.hitbox().center())
    }

    /// Whether the actor is standing in a flag cell in play mode.
    pub fn flag_reached(&self) -> bool {
        !self.actor.edit_mode && self.grid.get_cell(self.actor_cell()) == TileKind::Flag
    }

    /// Whether the level has been completed.
    pub fn is_completed(&self) -> bool {
        self.phase == LevelPhase::Completed
    }

    /// Coins still on the grid.
    pub fn coins_remaining(&self) -> usize {
        self.grid.count(TileKind::Coin)
    }

    /// Switch edit mode, emitting an event when it changes.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        if self.actor.edit_mode == edit_mode {
            return;
        }
        self.actor.set_edit_mode(edit_mode);
        self.push_event(GameEvent::edit_mode_toggled(self.tick, edit_mode));
    }

    /// Compute the state hash for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            hasher.update_u64(self.level_index.map_or(u64::MAX, |i| i as u64));
            hasher.update_bool(self.is_completed());

            hasher.update_u32(self.grid.rows() as u32);
            hasher.update_u32(self.grid.cols() as u32);
            for row in self.grid.iter_rows() {
                for kind in row {
                    hasher.update_u8(kind.code());
                }
            }

            self.actor.hash_into(hasher);
            hasher.update_vec2(self.camera.offset);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Queue an event for this tick.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;

    fn level() -> LevelState {
        let mut grid = TileGrid::new(12, 30);
        grid.fill_row(11, TileKind::Ground);
        grid.set(10, 20, TileKind::Flag);
        grid.set(9, 5, TileKind::Coin);
        LevelState::new(grid, Some(0), &LevelSetup::default())
    }

    #[test]
    fn test_new_level_starts_at_spawn() {
        let state = level();
        assert_eq!(state.tick, 0);
        assert_eq!(state.actor.position, DEFAULT_SPAWN);
        assert_eq!(state.phase, LevelPhase::Playing);
        assert_eq!(state.coins_remaining(), 1);
    }

    #[test]
    fn test_flag_detection_uses_hitbox_center() {
        let mut state = level();
        assert!(!state.flag_reached());

        // Flag cell (10, 20) spans x 640..672, y 320..352
        state.actor.set_hitbox_left(644.0);
        state.actor.set_hitbox_top(324.0);
        assert_eq!(state.actor_cell(), CellPos::new(10, 20));
        assert!(state.flag_reached());

        state.set_edit_mode(true);
        assert!(!state.flag_reached());
    }

    #[test]
    fn test_edit_toggle_emits_once() {
        let mut state = level();
        state.set_edit_mode(true);
        state.set_edit_mode(true);
        state.set_edit_mode(false);

        let events = state.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, GameEventData::EditModeToggled { edit_mode: true });
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_state_hash_determinism() {
        let a = level();
        let b = level();
        assert_eq!(a.compute_hash(), b.compute_hash());

        let mut c = level();
        c.grid.take_coin(9, 5);
        assert_ne!(a.compute_hash(), c.compute_hash());

        let mut d = level();
        d.actor.position.x += 0.001;
        assert_ne!(a.compute_hash(), d.compute_hash());
    }
}
