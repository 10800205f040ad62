//! Tile Grid
//!
//! Fixed-shape 2D array of tile kinds. Row 0 is the top of the level.
//!
//! ## Out-of-bounds reads
//!
//! [`TileGrid::get`] never fails: any row/column outside the grid reads as
//! [`TileKind::Empty`]. The space past an authored level edge is open air, so
//! levels are expected to carry their own floor.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::TILE_SIZE;
use crate::core::vec2::Vec2;
use crate::game::tile::TileKind;

/// Shape violations when building a grid from rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// No rows, or a first row with no columns.
    #[error("level grid has no cells")]
    Empty,
    /// A row's length differs from the first row's.
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        /// Offending row index
        row: usize,
        /// Column count of row 0
        expected: usize,
        /// Column count of the offending row
        found: usize,
    },
}

/// A grid cell address. Signed so that out-of-bounds neighbours are representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    /// Row index (0 = top)
    pub row: i32,
    /// Column index (0 = left)
    pub col: i32,
}

impl CellPos {
    /// Create a cell address.
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Cell containing a world-space pixel point.
    #[inline]
    pub fn containing(point: Vec2) -> Self {
        Self {
            row: cell_index(point.y),
            col: cell_index(point.x),
        }
    }

    /// Top-left pixel corner of this cell.
    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.col as f32 * TILE_SIZE, self.row as f32 * TILE_SIZE)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// Grid index of the tile containing pixel coordinate `px`.
#[inline]
pub fn cell_index(px: f32) -> i32 {
    (px / TILE_SIZE).floor() as i32
}

/// Rectangular grid of tile kinds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    /// Row-major cells, `rows * cols` long
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Create a grid of the given size filled with `kind`.
    pub fn filled(rows: usize, cols: usize, kind: TileKind) -> Self {
        Self {
            rows,
            cols,
            cells: vec![kind; rows * cols],
        }
    }

    /// Create an empty grid of the given size.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, TileKind::Empty)
    }

    /// Build from rows of tile kinds. Rows must all have the same length.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len() * expected);
        for (row, tiles) in rows.iter().enumerate() {
            if tiles.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: tiles.len(),
                });
            }
            cells.extend_from_slice(tiles);
        }

        Ok(Self {
            rows: rows.len(),
            cols: expected,
            cells,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Level width in pixels.
    #[inline]
    pub fn pixel_width(&self) -> f32 {
        self.cols as f32 * TILE_SIZE
    }

    /// Level height in pixels.
    #[inline]
    pub fn pixel_height(&self) -> f32 {
        self.rows as f32 * TILE_SIZE
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    /// Tile at `(row, col)`; `Empty` outside the grid.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> TileKind {
        self.index(row, col)
            .map(|i| self.cells[i])
            .unwrap_or(TileKind::Empty)
    }

    /// Tile at a cell address.
    #[inline]
    pub fn get_cell(&self, cell: CellPos) -> TileKind {
        self.get(cell.row, cell.col)
    }

    /// Write a tile. Writes outside the grid are ignored and return `false`.
    #[inline]
    pub fn set(&mut self, row: i32, col: i32, kind: TileKind) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = kind;
                true
            }
            None => false,
        }
    }

    /// Whether the cell at `(row, col)` blocks movement.
    #[inline]
    pub fn is_solid(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_solid()
    }

    /// Clear a coin at `(row, col)`. Returns `true` only if a coin was there.
    #[inline]
    pub fn take_coin(&mut self, row: i32, col: i32) -> bool {
        if self.get(row, col) == TileKind::Coin {
            self.set(row, col, TileKind::Empty)
        } else {
            false
        }
    }

    /// Fill an entire row (used for floors). Out-of-range rows are ignored.
    pub fn fill_row(&mut self, row: usize, kind: TileKind) {
        if row >= self.rows {
            return;
        }
        let start = row * self.cols;
        self.cells[start..start + self.cols].fill(kind);
    }

    /// Count cells of a kind.
    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|k| **k == kind).count()
    }

    /// First cell (row-major) holding `kind`.
    pub fn find(&self, kind: TileKind) -> Option<CellPos> {
        self.cells
            .iter()
            .position(|k| *k == kind)
            .map(|i| CellPos::new((i / self.cols) as i32, (i % self.cols) as i32))
    }

    /// Iterate rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Numeric codes, row by row (the level-encoding shape).
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.iter_rows()
            .map(|row| row.iter().map(|k| k.code()).collect())
            .collect()
    }
}

impl fmt::Debug for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TileGrid {}x{}", self.rows, self.cols)?;
        for row in self.iter_rows() {
            for kind in row {
                write!(f, "{}", kind.code())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
