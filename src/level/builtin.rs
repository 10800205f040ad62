//! Built-in Levels
//!
//! The embedded level catalog. Each row is a string of tile-code digits
//! (`0` empty, `1` ground, `2` brick, `3` spike, `4` flag, `5` coin).
//! Every level keeps a solid floor under the default spawn column.

use crate::game::grid::TileGrid;
use crate::game::tile::TileKind;
use crate::level::codec::LevelError;

/// An embedded level.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinLevel {
    /// Display name
    pub name: &'static str,
    /// Rows of code digits
    pub rows: &'static [&'static str],
}

impl BuiltinLevel {
    /// Build the tile grid.
    pub fn grid(&self) -> Result<TileGrid, LevelError> {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| {
                        ch.to_digit(10)
                            .and_then(|d| TileKind::from_code(d as u8))
                            .ok_or(LevelError::UnknownTile {
                                row,
                                col,
                                code: ch.to_digit(10).map_or(-1, i64::from),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TileGrid::from_rows(rows)?)
    }
}

/// Platforms, a spike strip and a staircase up to the flag.
pub const LEVEL_1: BuiltinLevel = BuiltinLevel {
    name: "Meadow Steps",
    rows: &[
        "00000000000000000000000000000000000000000000000000",
        "00000000000000000000000000000000000000000000000000",
        "00000000000000000000050000000000000000000000000000",
        "00000000000005000000222000000050000000000000000000",
        "00000000000222200000000000002222000000000000000400",
        "00000000000000000000000000000000000000000000001110",
        "00000000000000000005000000000000000000000000111111",
        "00000000000000000222220000000000000000000011111111",
        "00000000000000000000000000000000000000222211111111",
        "00000000000000000000000000000000000000000011111111",
        "00000000000000000000000000000000022200000011111111",
        "00000000000000000000000000000000000000000011111111",
        "00002220000000000000000000000000000000000011111111",
        "00000000000000000000000000000000000000000011111111",
        "11111111111100003330000000033300000000000011111111",
        "11111111111111111111111111111111111111111111111111",
        "11111111111111111111111111111111111111111111111111",
    ],
};

/// Two spike pits and a brick post guarding the flag ledge.
pub const LEVEL_2: BuiltinLevel = BuiltinLevel {
    name: "Spike Run",
    rows: &[
        "0000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000",
        "0000000000000000000000005000000000000000",
        "0000000000000000000000022200000000000000",
        "0000000000000000000000000000000000000000",
        "0000000000000050000000000000000000000000",
        "0000000000000222000000000000000000000000",
        "0000000000000000000000000000000002000000",
        "0000000000000000000000000000000002000000",
        "0000000000000000000000000000000002000040",
        "0000002220000000000000000000500002001111",
        "0000000000000000000000000000000002001111",
        "1111111111113331111111111133311111111111",
        "1111111111111111111111111111111111111111",
    ],
};

/// A wall-jump shaft with the flag on the roof.
pub const LEVEL_3: BuiltinLevel = BuiltinLevel {
    name: "The Shaft",
    rows: &[
        "000000000000000000000000000000",
        "000000000000000000000000000000",
        "000000000000000000000000000000",
        "000000000000000040000000000000",
        "000000000020011111000000000000",
        "000000000020020000000000000000",
        "000000000020520000000000000000",
        "000000000020020000000000000000",
        "000000000025020000000000000000",
        "000000000020020000000000000000",
        "000000000020020000000000000000",
        "000000000020020000000000000000",
        "000000000020020000000000000000",
        "000000000020020000000000000000",
        "000000000000020000000000000000",
        "000005500000020000000000000000",
        "111111111111111111113331111111",
        "111111111111111111111111111111",
    ],
};

/// The catalog, in play order.
pub static CATALOG: [BuiltinLevel; 3] = [LEVEL_1, LEVEL_2, LEVEL_3];

/// Catalog entry at `index`, if any.
pub fn builtin(index: usize) -> Option<&'static BuiltinLevel> {
    CATALOG.get(index)
}

/// Index after `index`, looping back to the first level after the last.
pub fn next_index(index: usize) -> usize {
    (index + 1) % CATALOG.len()
}
