//! Camera
//!
//! Viewport offset derived from the actor's center each tick. Reads actor
//! state only; never feeds back into physics.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// How the camera approaches its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Snap so the actor is centered
    #[default]
    Center,
    /// Move `factor` of the remaining distance per follow call
    Ease {
        /// Fraction in `(0, 1]`
        factor: f32,
    },
}

/// Viewport offset clamped to the level extents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Viewport top-left in world pixels
    pub offset: Vec2,
    /// Level pixel extents
    level_size: Vec2,
    /// Viewport pixel extents
    viewport: Vec2,
    /// Follow behavior
    mode: CameraMode,
}

impl Camera {
    /// Create a camera at the origin for a level of the given pixel size.
    pub fn new(level_size: Vec2, viewport: Vec2, mode: CameraMode) -> Self {
        let mode = match mode {
            CameraMode::Ease { factor } if !(factor > 0.0 && factor <= 1.0) => {
                tracing::warn!(factor, "camera ease factor out of range, using center mode");
                CameraMode::Center
            }
            other => other,
        };

        Self {
            offset: Vec2::ZERO,
            level_size,
            viewport,
            mode,
        }
    }

    /// Camera with the default 800x600 viewport in center mode.
    pub fn for_level(level_size: Vec2) -> Self {
        Self::new(level_size, Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT), CameraMode::Center)
    }

    /// Follow behavior.
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Level pixel extents.
    pub fn level_size(&self) -> Vec2 {
        self.level_size
    }

    /// Viewport pixel extents.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Largest allowed offset on each axis (zero when the level is smaller
    /// than the viewport).
    pub fn max_offset(&self) -> Vec2 {
        Vec2::new(
            (self.level_size.x - self.viewport.x).max(0.0),
            (self.level_size.y - self.viewport.y).max(0.0),
        )
    }

    /// Update the offset toward centering `target`, then clamp.
    pub fn follow(&mut self, target: Vec2) {
        let centered = target.sub(self.viewport.scale(0.5));

        self.offset = match self.mode {
            CameraMode::Center => centered,
            CameraMode::Ease { factor } => self.offset.lerp(centered, factor),
        };

        self.offset = self.offset.clamp(Vec2::ZERO, self.max_offset());
    }

    /// Convert a viewport pixel to world pixels.
    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen.add(self.offset)
    }
}
