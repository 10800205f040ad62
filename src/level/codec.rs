//! Level Codes
//!
//! A level travels as a single printable string:
//!
//! ```text
//! grid -> [[0,0,1],[1,1,1]] (JSON array of rows of tile codes) -> UTF-8 -> lowercase hex
//! ```
//!
//! Decoding validates every layer and never touches session state; callers
//! keep their current level when it fails.

use thiserror::Error;

use crate::game::grid::{GridError, TileGrid};
use crate::game::tile::TileKind;

/// Failure to decode or load a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The code contains non-hex characters or has odd length
    #[error("level code is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The decoded bytes are not UTF-8
    #[error("level code is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The text is not a JSON array of arrays of integers
    #[error("level data is not an array of tile-code rows: {0}")]
    Json(#[from] serde_json::Error),

    /// A cell holds a code outside 0..=5
    #[error("unknown tile code {code} at [{row}, {col}]")]
    UnknownTile {
        /// Row of the bad cell
        row: usize,
        /// Column of the bad cell
        col: usize,
        /// Offending code
        code: i64,
    },

    /// The rows are empty or ragged
    #[error(transparent)]
    Shape(#[from] GridError),

    /// Reading a level file failed
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    /// No built-in level at this catalog index
    #[error("no built-in level {index}")]
    UnknownLevel {
        /// Requested index
        index: usize,
    },

    /// The background load task ended without reporting
    #[error("level loader task ended without a result")]
    LoaderDropped,

    /// A load was requested outside a Tokio runtime
    #[error("no async runtime available for level loading")]
    NoRuntime,
}

/// Encode a grid as a level code.
pub fn encode_level(grid: &TileGrid) -> Result<String, LevelError> {
    Ok(hex::encode(encode_level_json(grid)?))
}

/// Encode a grid as its JSON row array.
pub fn encode_level_json(grid: &TileGrid) -> Result<String, LevelError> {
    Ok(serde_json::to_string(&grid.to_codes())?)
}

/// Decode a level code. Surrounding whitespace is ignored.
pub fn decode_level(code: &str) -> Result<TileGrid, LevelError> {
    let bytes = hex::decode(code.trim())?;
    let json = String::from_utf8(bytes)?;
    decode_level_json(&json)
}

/// Decode a JSON row array of tile codes.
pub fn decode_level_json(json: &str) -> Result<TileGrid, LevelError> {
    let codes: Vec<Vec<i64>> = serde_json::from_str(json)?;

    let rows = codes
        .into_iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .into_iter()
                .enumerate()
                .map(|(col, code)| {
                    u8::try_from(code)
                        .ok()
                        .and_then(TileKind::from_code)
                        .ok_or(LevelError::UnknownTile { row, col, code })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TileGrid::from_rows(rows)?)
}

/// Decode level text in either form: a JSON row array (starts with `[`) or a
/// hex level code.
pub fn parse_level_text(text: &str) -> Result<TileGrid, LevelError> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        decode_level_json(trimmed)
    } else {
        decode_level(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mixed_grid(rows: usize, cols: usize) -> TileGrid {
        let mut grid = TileGrid::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let kind = TileKind::ALL[(row * 7 + col * 3) % TileKind::ALL.len()];
                grid.set(row as i32, col as i32, kind);
            }
        }
        grid
    }

    #[test]
    fn test_round_trip_20_by_10() {
        let grid = mixed_grid(20, 10);
        let code = encode_level(&grid).unwrap();
        let decoded = decode_level(&code).unwrap();

        assert_eq!(decoded, grid);
        assert_eq!(decoded.rows(), 20);
        assert_eq!(decoded.cols(), 10);
    }

    #[test]
    fn test_code_is_printable_lowercase_hex() {
        let code = encode_level(&mixed_grid(3, 4)).unwrap();
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hex::decode(&code).unwrap(), b"[[0,3,0,3],[1,4,1,4],[2,5,2,5]]".to_vec());
    }

    #[test]
    fn test_decode_tolerates_whitespace() {
        let code = encode_level(&mixed_grid(3, 3)).unwrap();
        assert!(decode_level(&format!("  {code}\n")).is_ok());
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(decode_level("zz"), Err(LevelError::Hex(_))));
        assert!(matches!(decode_level("abc"), Err(LevelError::Hex(_))));
    }

    #[test]
    fn test_rejects_non_utf8() {
        assert!(matches!(decode_level("ff"), Err(LevelError::Utf8(_))));
    }

    #[test]
    fn test_rejects_non_array_of_arrays() {
        for json in ["{\"rows\": 1}", "[1, 2, 3]", "\"level\"", "[[0, \"x\"]]"] {
            let code = hex::encode(json);
            assert!(
                matches!(decode_level(&code), Err(LevelError::Json(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_rejects_unknown_tile() {
        let err = decode_level_json("[[0, 1], [9, 0]]").unwrap_err();
        assert!(matches!(err, LevelError::UnknownTile { row: 1, col: 0, code: 9 }));

        let err = decode_level_json("[[-1]]").unwrap_err();
        assert!(matches!(err, LevelError::UnknownTile { code: -1, .. }));
    }

    #[test]
    fn test_rejects_bad_shape() {
        assert!(matches!(
            decode_level_json("[]"),
            Err(LevelError::Shape(GridError::Empty))
        ));
        assert!(matches!(
            decode_level_json("[[0, 0], [0]]"),
            Err(LevelError::Shape(GridError::Ragged { row: 1, .. }))
        ));
    }

    #[test]
    fn test_parse_level_text_accepts_both_forms() {
        let grid = mixed_grid(3, 5);
        let json = encode_level_json(&grid).unwrap();
        let code = encode_level(&grid).unwrap();

        assert_eq!(parse_level_text(&json).unwrap(), grid);
        assert_eq!(parse_level_text(&code).unwrap(), grid);
    }

    proptest! {
        #[test]
        fn any_rectangular_grid_round_trips(
            rows in 1usize..24,
            cols in 1usize..24,
            seed in proptest::collection::vec(0u8..6, 1..64),
        ) {
            let mut grid = TileGrid::new(rows, cols);
            for i in 0..rows * cols {
                let kind = TileKind::from_code(seed[i % seed.len()]).unwrap_or_default();
                grid.set((i / cols) as i32, (i % cols) as i32, kind);
            }

            let decoded = decode_level(&encode_level(&grid).unwrap()).unwrap();
            prop_assert_eq!(decoded, grid);
        }
    }
}
