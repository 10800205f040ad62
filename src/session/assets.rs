//! Tile Assets
//!
//! Registry of tile sprites for the rendering collaborator. Each sprite is
//! read in the background; any sprite that fails to load is drawn as a flat
//! primitive colour instead. Physics never consults the registry.
//!
//! Lifecycle: [`AssetRegistry::new`] (everything on fallback, not ready) ->
//! [`AssetRegistry::load`] -> [`AssetRegistry::ready`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinSet;

use crate::game::tile::TileKind;

/// PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Signature, IHDR length and tag, width, height.
const PNG_HEADER_LEN: usize = 24;

/// Background colour behind the level.
pub const SKY_COLOR: Rgb = Rgb::new(0x87, 0xCE, 0xEB);

/// Actor body colour.
pub const ACTOR_COLOR: Rgb = Rgb::new(0xFF, 0x6B, 0x6B);

/// An opaque colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Create a colour.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB` form.
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode_upper([self.r, self.g, self.b]))
    }
}

/// Primitive colour used when a tile's sprite is unavailable.
///
/// `None` for [`TileKind::Empty`], which is never drawn.
pub const fn fallback_color(kind: TileKind) -> Option<Rgb> {
    match kind {
        TileKind::Empty => None,
        TileKind::Ground => Some(Rgb::new(0x8B, 0x45, 0x13)),
        TileKind::Brick => Some(Rgb::new(0xCD, 0x85, 0x3F)),
        TileKind::Spike => Some(Rgb::new(0xFF, 0x44, 0x44)),
        TileKind::Flag => Some(Rgb::new(0xFF, 0xD7, 0x00)),
        TileKind::Coin => Some(Rgb::new(0xFF, 0xA5, 0x00)),
    }
}

/// Sprite path for a tile, relative to the asset root.
pub fn sprite_path(kind: TileKind) -> Option<PathBuf> {
    match kind {
        TileKind::Empty => None,
        other => Some(Path::new("images").join(format!("{}.png", other.name()))),
    }
}

/// A loaded sprite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteInfo {
    /// File the sprite was read from
    pub path: PathBuf,
    /// Pixel width from the PNG header
    pub width: u32,
    /// Pixel height from the PNG header
    pub height: u32,
}

/// How a tile is drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileAppearance {
    /// Draw the sprite
    Sprite(SpriteInfo),
    /// Draw a filled square
    Fallback(Rgb),
}

/// Failure to read a sprite.
#[derive(Debug, Error)]
pub enum AssetError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Sprite path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not a PNG
    #[error("{path} is not a PNG image")]
    NotPng {
        /// Sprite path
        path: PathBuf,
    },
}

/// Read width and height from a PNG's IHDR chunk.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < PNG_HEADER_LEN || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (width > 0 && height > 0).then_some((width, height))
}

async fn read_sprite(path: PathBuf) -> Result<SpriteInfo, AssetError> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(source) => return Err(AssetError::Io { path, source }),
    };
    match png_dimensions(&bytes) {
        Some((width, height)) => Ok(SpriteInfo { path, width, height }),
        None => Err(AssetError::NotPng { path }),
    }
}

/// Tile sprites with primitive-colour fallback.
#[derive(Clone, Debug)]
pub struct AssetRegistry {
    /// Indexed by tile code
    tiles: Vec<Option<TileAppearance>>,
    ready: bool,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self {
            tiles: TileKind::ALL
                .iter()
                .map(|kind| fallback_color(*kind).map(TileAppearance::Fallback))
                .collect(),
            ready: false,
        }
    }
}

impl AssetRegistry {
    /// Registry with every tile on its fallback colour, not yet loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all tile sprites under `root` concurrently.
    ///
    /// Never fails: a sprite that cannot be read keeps its fallback colour.
    /// Must be called from within a Tokio runtime.
    pub async fn load(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut registry = Self::new();
        let mut tasks = JoinSet::new();

        for kind in TileKind::ALL {
            if let Some(relative) = sprite_path(kind) {
                let path = root.join(relative);
                tasks.spawn(async move { (kind, read_sprite(path).await) });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, Ok(sprite))) => {
                    tracing::debug!(tile = kind.name(), path = %sprite.path.display(), "sprite loaded");
                    registry.tiles[kind.code() as usize] = Some(TileAppearance::Sprite(sprite));
                }
                Ok((kind, Err(e))) => {
                    tracing::warn!(tile = kind.name(), error = %e, "using fallback color");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sprite loader task failed");
                }
            }
        }

        registry.ready = true;
        tracing::info!(
            sprites = registry.sprite_count(),
            fallbacks = registry.fallback_count(),
            "tile assets ready"
        );
        registry
    }

    /// Whether loading has finished.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// How to draw `kind`. `None` for empty cells.
    pub fn appearance(&self, kind: TileKind) -> Option<&TileAppearance> {
        self.tiles.get(kind.code() as usize)?.as_ref()
    }

    /// Tiles drawn from sprites.
    pub fn sprite_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Some(TileAppearance::Sprite(_))))
            .count()
    }

    /// Tiles drawn as primitive colours.
    pub fn fallback_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Some(TileAppearance::Fallback(_))))
            .count()
    }
}
