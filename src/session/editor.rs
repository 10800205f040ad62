//! Editor Surface
//!
//! Tile placement and level reshaping. The palette UI and dialogs live in the
//! host; this module only turns their requests into grid writes.

use thiserror::Error;

use crate::core::vec2::Vec2;
use crate::game::camera::Camera;
use crate::game::grid::{CellPos, TileGrid};
use crate::game::tile::TileKind;

/// Smallest allowed row count for a new level.
pub const MIN_ROWS: usize = 3;
/// Largest allowed row count for a new level.
pub const MAX_ROWS: usize = 256;
/// Smallest allowed column count for a new level.
pub const MIN_COLS: usize = 3;
/// Largest allowed column count for a new level.
pub const MAX_COLS: usize = 1024;

/// Rows of ground laid along the bottom of a cleared level.
pub const FLOOR_ROWS: usize = 2;

/// Editor request rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// New-level size outside the allowed range
    #[error("invalid level size {rows}x{cols}: rows must be {MIN_ROWS}..={MAX_ROWS}, cols {MIN_COLS}..={MAX_COLS}")]
    InvalidDimensions {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },
}

/// Palette selection and placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Editor {
    selected: TileKind,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            selected: TileKind::Ground,
        }
    }
}

impl Editor {
    /// Create an editor with GROUND selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected tile.
    pub fn selected(&self) -> TileKind {
        self.selected
    }

    /// Select the tile to paint. `Empty` acts as an eraser.
    pub fn select(&mut self, kind: TileKind) {
        self.selected = kind;
    }

    /// Paint the selected tile at a world pixel. Returns the cell written, or
    /// `None` when the point is outside the grid.
    pub fn place_at_world(&self, grid: &mut TileGrid, world: Vec2) -> Option<CellPos> {
        let cell = CellPos::containing(world);
        grid.set(cell.row, cell.col, self.selected).then_some(cell)
    }

    /// Paint at a viewport pixel, offset by the camera.
    pub fn place_at_screen(&self, grid: &mut TileGrid, camera: &Camera, screen: Vec2) -> Option<CellPos> {
        self.place_at_world(grid, camera.screen_to_world(screen))
    }
}

/// Check new-level dimensions.
pub fn validate_dimensions(rows: usize, cols: usize) -> Result<(), EditorError> {
    if (MIN_ROWS..=MAX_ROWS).contains(&rows) && (MIN_COLS..=MAX_COLS).contains(&cols) {
        Ok(())
    } else {
        Err(EditorError::InvalidDimensions { rows, cols })
    }
}

/// Empty level of the given size with a ground floor along the bottom.
pub fn floored_grid(rows: usize, cols: usize) -> TileGrid {
    let mut grid = TileGrid::new(rows, cols);
    for row in rows.saturating_sub(FLOOR_ROWS)..rows {
        grid.fill_row(row, TileKind::Ground);
    }
    grid
}

/// Validated new level.
pub fn new_level_grid(rows: usize, cols: usize) -> Result<TileGrid, EditorError> {
    validate_dimensions(rows, cols)?;
    Ok(floored_grid(rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::camera::CameraMode;

    #[test]
    fn test_place_at_world_converts_by_tile_size() {
        let mut grid = TileGrid::new(4, 4);
        let mut editor = Editor::new();
        editor.select(TileKind::Spike);

        let cell = editor.place_at_world(&mut grid, Vec2::new(70.0, 33.0));

        assert_eq!(cell, Some(CellPos::new(1, 2)));
        assert_eq!(grid.get(1, 2), TileKind::Spike);
    }

    #[test]
    fn test_place_out_of_bounds_is_ignored() {
        let mut grid = TileGrid::new(4, 4);
        let before = grid.clone();
        let editor = Editor::new();

        assert_eq!(editor.place_at_world(&mut grid, Vec2::new(-1.0, 10.0)), None);
        assert_eq!(editor.place_at_world(&mut grid, Vec2::new(10.0, 128.0)), None);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_place_at_screen_adds_camera_offset() {
        let mut grid = TileGrid::new(40, 60);
        let mut camera = Camera::new(
            Vec2::new(grid.pixel_width(), grid.pixel_height()),
            Vec2::new(800.0, 600.0),
            CameraMode::Center,
        );
        camera.follow(Vec2::new(1000.0, 700.0));
        let editor = Editor::new();

        let cell = editor.place_at_screen(&mut grid, &camera, Vec2::new(0.0, 0.0));
        assert_eq!(cell, Some(CellPos::new(12, 18)));
        assert_eq!(grid.get(12, 18), TileKind::Ground);
    }

    #[test]
    fn test_eraser() {
        let mut grid = TileGrid::filled(3, 3, TileKind::Brick);
        let mut editor = Editor::new();
        editor.select(TileKind::Empty);

        editor.place_at_world(&mut grid, Vec2::new(40.0, 40.0));
        assert_eq!(grid.get(1, 1), TileKind::Empty);
    }

    #[test]
    fn test_floored_grid_has_two_ground_rows() {
        let grid = floored_grid(10, 7);
        assert_eq!(grid.count(TileKind::Ground), 14);
        assert!(grid.is_solid(8, 0));
        assert!(grid.is_solid(9, 6));
        assert!(!grid.is_solid(7, 3));
    }

    #[test]
    fn test_new_level_dimension_bounds() {
        assert!(new_level_grid(3, 3).is_ok());
        assert!(new_level_grid(256, 1024).is_ok());
        assert_eq!(
            new_level_grid(2, 10).unwrap_err(),
            EditorError::InvalidDimensions { rows: 2, cols: 10 }
        );
        assert!(new_level_grid(10, 1025).is_err());
        assert!(new_level_grid(0, 0).is_err());
    }
}
