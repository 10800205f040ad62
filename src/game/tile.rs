//! Tile Codes
//!
//! The six tile kinds a level cell can hold, and their wire codes.

use serde::{Serialize, Deserialize};

/// Kind of a single grid cell.
///
/// The discriminant is the level-code integer (0..=5).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    /// Open air
    #[default]
    Empty = 0,
    /// Solid terrain
    Ground = 1,
    /// Solid block
    Brick = 2,
    /// Hazard: touching it respawns the actor
    Spike = 3,
    /// Goal: reaching it completes the level
    Flag = 4,
    /// Pickup: collected on contact
    Coin = 5,
}

impl TileKind {
    /// Every tile kind, in code order.
    pub const ALL: [TileKind; 6] = [
        TileKind::Empty,
        TileKind::Ground,
        TileKind::Brick,
        TileKind::Spike,
        TileKind::Flag,
        TileKind::Coin,
    ];

    /// Numeric code used by the level encoding.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Parse a numeric level code.
    pub const fn from_code(code: u8) -> Option<TileKind> {
        match code {
            0 => Some(TileKind::Empty),
            1 => Some(TileKind::Ground),
            2 => Some(TileKind::Brick),
            3 => Some(TileKind::Spike),
            4 => Some(TileKind::Flag),
            5 => Some(TileKind::Coin),
            _ => None,
        }
    }

    /// Whether this kind blocks movement. Only GROUND and BRICK do.
    #[inline]
    pub const fn is_solid(self) -> bool {
        matches!(self, TileKind::Ground | TileKind::Brick)
    }

    /// Whether touching this kind respawns the actor.
    #[inline]
    pub const fn is_hazard(self) -> bool {
        matches!(self, TileKind::Spike)
    }

    /// Short lowercase name (used for asset file names and logs).
    pub const fn name(self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::Ground => "ground",
            TileKind::Brick => "brick",
            TileKind::Spike => "spike",
            TileKind::Flag => "flag",
            TileKind::Coin => "coin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TileKind::from_code(6), None);
        assert_eq!(TileKind::from_code(255), None);
    }

    #[test]
    fn test_only_ground_and_brick_are_solid() {
        let solid: Vec<TileKind> = TileKind::ALL.into_iter().filter(|k| k.is_solid()).collect();
        assert_eq!(solid, vec![TileKind::Ground, TileKind::Brick]);
    }

    #[test]
    fn test_spike_flag_coin_pass_through() {
        assert!(!TileKind::Spike.is_solid());
        assert!(!TileKind::Flag.is_solid());
        assert!(!TileKind::Coin.is_solid());
        assert!(TileKind::Spike.is_hazard());
    }
}
