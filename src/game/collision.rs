//! Collision Resolution
//!
//! Axis-separated actor-vs-grid resolution. The X pass always runs before the
//! Y pass; changing that order changes corner behavior.
//!
//! ## Scan windows
//!
//! ```text
//! X pass: cols = hitbox left ..= right
//!         rows = (top + INSET) ..= (bottom - INSET)   floor/ceiling excluded
//! Y pass: cols = (left + INSET) ..= (right - INSET)   side walls excluded
//!         rows = hitbox top ..= bottom
//! ```
//!
//! Both passes collect coins they overlap, so a coin seen through only one
//! axis's window is still picked up.

use crate::TILE_SIZE;
use crate::game::actor::{Actor, WallSide};
use crate::game::grid::{cell_index, CellPos, TileGrid};

/// Inward inset (pixels) applied to the cross axis of each pass.
pub const SCAN_INSET: f32 = 1.0;

/// Distance (pixels) past the hitbox checked by the static wall probe.
pub const WALL_PROBE_DISTANCE: f32 = 1.0;

/// Inclusive cell range covered by a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanWindow {
    /// First row
    pub top: i32,
    /// Last row (inclusive)
    pub bottom: i32,
    /// First column
    pub left: i32,
    /// Last column (inclusive)
    pub right: i32,
}

impl ScanWindow {
    /// Cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellPos> {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| CellPos::new(row, col)))
    }
}

/// Window for the X pass.
pub fn x_window(actor: &Actor) -> ScanWindow {
    let hb = actor.hitbox();
    ScanWindow {
        top: cell_index(hb.y + SCAN_INSET),
        bottom: cell_index(hb.bottom() - SCAN_INSET),
        left: cell_index(hb.x),
        right: cell_index(hb.right()),
    }
}

/// Window for the Y pass.
pub fn y_window(actor: &Actor) -> ScanWindow {
    let hb = actor.hitbox();
    ScanWindow {
        top: cell_index(hb.y),
        bottom: cell_index(hb.bottom()),
        left: cell_index(hb.x + SCAN_INSET),
        right: cell_index(hb.right() - SCAN_INSET),
    }
}

/// Side effects observed while scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassEffects {
    /// Coin cells cleared by this pass
    pub coins: Vec<CellPos>,
    /// A spike cell was overlapped (actor respawned)
    pub spiked: bool,
}

fn collect_coin(actor: &mut Actor, grid: &mut TileGrid, cell: CellPos, effects: &mut PassEffects) {
    if grid.take_coin(cell.row, cell.col) {
        actor.coins += 1;
        effects.coins.push(cell);
        tracing::trace!(%cell, coins = actor.coins, "coin collected");
    }
}

/// Resolve horizontal overlap after the X integration.
///
/// Sets `on_wall` from motion into a solid cell, falling back to the static
/// adjacency probe when airborne and no wall was hit.
pub fn resolve_x(actor: &mut Actor, grid: &mut TileGrid) -> PassEffects {
    let mut effects = PassEffects::default();
    let window = x_window(actor);

    actor.on_wall = WallSide::None;

    for cell in window.cells() {
        if grid.is_solid(cell.row, cell.col) {
            if actor.velocity.x > 0.0 {
                actor.set_hitbox_right(cell.col as f32 * TILE_SIZE);
                actor.on_wall = WallSide::Right;
            } else if actor.velocity.x < 0.0 {
                actor.set_hitbox_left((cell.col + 1) as f32 * TILE_SIZE);
                actor.on_wall = WallSide::Left;
            }
            actor.velocity.x = 0.0;
        }

        collect_coin(actor, grid, cell, &mut effects);
    }

    if !actor.on_wall.is_touching() && !actor.on_ground {
        actor.on_wall = probe_walls(actor, grid, window);
    }

    effects
}

/// Static wall-adjacency probe: is there a solid cell just left or right of
/// the hitbox across the X-pass rows? Left wins when both are present.
pub fn probe_walls(actor: &Actor, grid: &TileGrid, window: ScanWindow) -> WallSide {
    let hb = actor.hitbox();
    let column_is_solid = |col: i32| (window.top..=window.bottom).any(|row| grid.is_solid(row, col));

    if column_is_solid(cell_index(hb.x - WALL_PROBE_DISTANCE)) {
        WallSide::Left
    } else if column_is_solid(cell_index(hb.right() + WALL_PROBE_DISTANCE)) {
        WallSide::Right
    } else {
        WallSide::None
    }
}

/// Resolve vertical overlap after the Y integration.
///
/// Spikes send the actor back to spawn immediately; the rest of the sweep
/// still runs over the window computed before the reset. A sweep counts at most one respawn.
pub fn resolve_y(actor: &mut Actor, grid: &mut TileGrid) -> PassEffects {
    let mut effects = PassEffects::default();
    let window = y_window(actor);

    actor.on_ground = false;

    for cell in window.cells() {
        let kind = grid.get_cell(cell);

        if kind.is_solid() {
            if actor.velocity.y > 0.0 {
                actor.set_hitbox_bottom(cell.row as f32 * TILE_SIZE);
                actor.on_ground = true;
            } else if actor.velocity.y < 0.0 {
                actor.set_hitbox_top((cell.row + 1) as f32 * TILE_SIZE);
            }
            actor.velocity.y = 0.0;
        }

        if kind.is_hazard() {
            actor.reset_to_spawn();
            effects.spiked = true;
        }

        collect_coin(actor, grid, cell, &mut effects);
    }

    if effects.spiked {
        actor.respawns += 1;
        tracing::debug!(respawns = actor.respawns, "spike contact, respawned");
    }

    effects
}
