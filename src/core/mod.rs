//! Core primitives.
//!
//! Math, time normalization and hashing shared by the game and session layers.
//! Nothing in this module touches the tile grid or the actor.

pub mod vec2;
pub mod clock;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use clock::{FrameClock, time_scale_for, NOMINAL_FRAME_MS, MAX_TIME_SCALE};
pub use hash::{StateHash, StateHasher, compute_state_hash};
