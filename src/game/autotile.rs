//! Auto-Tiling
//!
//! Picks a visual variant for a tile from its same-kind neighbours.
//! Visual only: collision never looks at variants.
//!
//! ## Neighbour mask
//!
//! ```text
//!          top (8)
//!  left (1)   X   right (4)
//!         bottom (2)
//! ```
//!
//! A bit is set when the neighbour in that direction has the same kind.
//! Out-of-bounds neighbours read as `Empty` and never match a non-empty tile.

use serde::{Serialize, Deserialize};

use crate::game::grid::TileGrid;
use crate::game::tile::TileKind;

/// Neighbour bit: same kind above.
pub const NEIGHBOR_TOP: u8 = 0b1000;
/// Neighbour bit: same kind to the right.
pub const NEIGHBOR_RIGHT: u8 = 0b0100;
/// Neighbour bit: same kind below.
pub const NEIGHBOR_BOTTOM: u8 = 0b0010;
/// Neighbour bit: same kind to the left.
pub const NEIGHBOR_LEFT: u8 = 0b0001;

/// Visual variant of a tile sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileVariant {
    /// No same-kind neighbours
    Single = 0,
    /// Only a left neighbour: right end of a horizontal run
    EndRight = 1,
    /// Only a bottom neighbour: top cap of a column
    EndTop = 2,
    /// Bottom + left
    CornerTopRight = 3,
    /// Only a right neighbour: left end of a horizontal run
    EndLeft = 4,
    /// Left + right
    HorizontalMiddle = 5,
    /// Right + bottom
    CornerTopLeft = 6,
    /// Left + right + bottom
    EdgeTop = 7,
    /// Only a top neighbour: bottom cap of a column
    EndBottom = 8,
    /// Top + left
    CornerBottomRight = 9,
    /// Top + bottom
    VerticalMiddle = 10,
    /// Top + bottom + left
    EdgeRight = 11,
    /// Top + right
    CornerBottomLeft = 12,
    /// Top + left + right
    EdgeBottom = 13,
    /// Top + right + bottom
    EdgeLeft = 14,
    /// Fully connected
    Center = 15,
}

impl TileVariant {
    /// Sprite-sheet index of this variant.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// Variant used for any mask missing from [`VARIANT_TABLE`].
pub const FALLBACK_VARIANT: TileVariant = TileVariant::Center;

/// Mask -> variant table. Mask 15 is absent and resolves to [`FALLBACK_VARIANT`].
pub const VARIANT_TABLE: [(u8, TileVariant); 15] = [
    (0b0000, TileVariant::Single),
    (0b0001, TileVariant::EndRight),
    (0b0010, TileVariant::EndTop),
    (0b0011, TileVariant::CornerTopRight),
    (0b0100, TileVariant::EndLeft),
    (0b0101, TileVariant::HorizontalMiddle),
    (0b0110, TileVariant::CornerTopLeft),
    (0b0111, TileVariant::EdgeTop),
    (0b1000, TileVariant::EndBottom),
    (0b1001, TileVariant::CornerBottomRight),
    (0b1010, TileVariant::VerticalMiddle),
    (0b1011, TileVariant::EdgeRight),
    (0b1100, TileVariant::CornerBottomLeft),
    (0b1101, TileVariant::EdgeBottom),
    (0b1110, TileVariant::EdgeLeft),
];

/// Look up the variant for a 4-bit neighbour mask.
pub fn variant_for_mask(mask: u8) -> TileVariant {
    VARIANT_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == mask & 0b1111)
        .map(|(_, variant)| *variant)
        .unwrap_or(FALLBACK_VARIANT)
}

/// Same-kind neighbour mask of the cell at `(row, col)`.
pub fn neighbor_mask(grid: &TileGrid, row: i32, col: i32) -> u8 {
    let kind = grid.get(row, col);
    let same = |r: i32, c: i32| grid.get(r, c) == kind;

    let mut mask = 0;
    if same(row - 1, col) {
        mask |= NEIGHBOR_TOP;
    }
    if same(row, col + 1) {
        mask |= NEIGHBOR_RIGHT;
    }
    if same(row + 1, col) {
        mask |= NEIGHBOR_BOTTOM;
    }
    if same(row, col - 1) {
        mask |= NEIGHBOR_LEFT;
    }
    mask
}

/// Visual variant of the cell at `(row, col)`, or `None` for empty cells.
pub fn tile_variant(grid: &TileGrid, row: i32, col: i32) -> Option<TileVariant> {
    if grid.get(row, col) == TileKind::Empty {
        return None;
    }
    Some(variant_for_mask(neighbor_mask(grid, row, col)))
}
