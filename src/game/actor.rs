//! Actor State
//!
//! The player body: sprite box, centered hitbox, velocity and mode flags.
//!
//! `position` is the sprite's top-left corner. All collision math uses the
//! hitbox, which is derived from the sprite size once at construction:
//!
//! ```text
//! +---------------- sprite (28 x 28) ----+
//! |  offset (2, 2)                        |
//! |    +------ hitbox (24 x 24) ------+   |
//! |    |                               |   |
//! |    +-------------------------------+   |
//! +---------------------------------------+
//! ```
//!
//! Hitbox dimensions are `hitbox_scale` of the sprite rounded to whole pixels,
//! which keeps the box centered and snap arithmetic exact.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::vec2::Vec2;
use crate::game::physics::PhysicsConfig;

/// Which side a wall is touching, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WallSide {
    /// Not touching a wall
    #[default]
    None = 0,
    /// Wall on the actor's left
    Left = 1,
    /// Wall on the actor's right
    Right = 2,
}

impl WallSide {
    /// Whether any wall is touched.
    #[inline]
    pub fn is_touching(self) -> bool {
        self != WallSide::None
    }
}

/// Horizontal facing, cosmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    /// Facing left
    Left = 0,
    /// Facing right
    #[default]
    Right = 1,
}

/// Priority-ordered movement mode derived from the flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorMode {
    /// Free flight in the editor, no collision
    EditFly,
    /// Standing on a solid tile
    Grounded,
    /// Airborne against a wall
    WallSliding,
    /// Airborne, no wall contact
    Airborne,
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[inline]
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// The player body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Sprite top-left corner (pixels)
    pub position: Vec2,

    /// Velocity in pixels per nominal frame
    pub velocity: Vec2,

    /// Sprite size (pixels)
    size: Vec2,

    /// Hitbox offset from `position`
    hitbox_offset: Vec2,

    /// Hitbox size (pixels)
    hitbox_size: Vec2,

    /// Standing on a solid tile after the last Y pass
    pub on_ground: bool,

    /// Wall contact after the last X pass
    pub on_wall: WallSide,

    /// Free-flight editor mode
    pub edit_mode: bool,

    /// Jump intent seen on the last normal-mode step
    pub jump_held: bool,

    /// Jump latch: a new jump may start only after the intent was released
    pub jump_released: bool,

    /// Coins collected on this level
    pub coins: u32,

    /// Horizontal facing
    pub facing: Facing,

    /// Respawn point (sprite top-left)
    pub spawn: Vec2,

    /// Number of hazard respawns on this level
    pub respawns: u32,

    /// Cosmetic animation clock, in nominal frames. Never read by physics.
    pub anim_time: f32,
}

impl Actor {
    /// Create an actor at `spawn` using the sprite/hitbox sizes from `config`.
    pub fn new(spawn: Vec2, config: &PhysicsConfig) -> Self {
        let size = Vec2::new(config.sprite_width, config.sprite_height);
        let hitbox_size = Vec2::new(
            (size.x * config.hitbox_scale).round(),
            (size.y * config.hitbox_scale).round(),
        );
        let hitbox_offset = size.sub(hitbox_size).scale(0.5);

        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            size,
            hitbox_offset,
            hitbox_size,
            on_ground: false,
            on_wall: WallSide::None,
            edit_mode: false,
            jump_held: false,
            jump_released: true,
            coins: 0,
            facing: Facing::Right,
            spawn,
            respawns: 0,
            anim_time: 0.0,
        }
    }

    /// Sprite size.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Sprite bounding box.
    #[inline]
    pub fn sprite_rect(&self) -> Rect {
        Rect {
            x: self.position.x,
            y: self.position.y,
            w: self.size.x,
            h: self.size.y,
        }
    }

    /// Collision hitbox.
    #[inline]
    pub fn hitbox(&self) -> Rect {
        Rect {
            x: self.position.x + self.hitbox_offset.x,
            y: self.position.y + self.hitbox_offset.y,
            w: self.hitbox_size.x,
            h: self.hitbox_size.y,
        }
    }

    /// Hitbox offset inside the sprite.
    #[inline]
    pub fn hitbox_offset(&self) -> Vec2 {
        self.hitbox_offset
    }

    /// Center of the actor (same for sprite and hitbox).
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.hitbox().center()
    }

    /// Move so the hitbox's left edge sits at `x`.
    #[inline]
    pub fn set_hitbox_left(&mut self, x: f32) {
        self.position.x = x - self.hitbox_offset.x;
    }

    /// Move so the hitbox's right edge sits at `x`.
    #[inline]
    pub fn set_hitbox_right(&mut self, x: f32) {
        self.set_hitbox_left(x - self.hitbox_size.x);
    }

    /// Move so the hitbox's top edge sits at `y`.
    #[inline]
    pub fn set_hitbox_top(&mut self, y: f32) {
        self.position.y = y - self.hitbox_offset.y;
    }

    /// Move so the hitbox's bottom edge sits at `y`.
    #[inline]
    pub fn set_hitbox_bottom(&mut self, y: f32) {
        self.set_hitbox_top(y - self.hitbox_size.y);
    }

    /// Current movement mode.
    pub fn mode(&self) -> ActorMode {
        if self.edit_mode {
            ActorMode::EditFly
        } else if self.on_ground {
            ActorMode::Grounded
        } else if self.on_wall.is_touching() {
            ActorMode::WallSliding
        } else {
            ActorMode::Airborne
        }
    }

    /// Back to the spawn point, motionless. Does not touch `respawns`;
    /// the caller counts one respawn per hazard contact.
    pub fn reset_to_spawn(&mut self) {
        self.position = self.spawn;
        self.velocity = Vec2::ZERO;
    }

    /// Enter or leave edit mode. Entering stops all motion.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
        if edit_mode {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Feed actor state into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_bool(self.on_ground);
        hasher.update_u8(self.on_wall as u8);
        hasher.update_bool(self.edit_mode);
        hasher.update_bool(self.jump_released);
        hasher.update_u32(self.coins);
        hasher.update_u8(self.facing as u8);
        hasher.update_u32(self.respawns);
    }
}
