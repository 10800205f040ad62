//! Game Logic Module
//!
//! All simulation code. Given the same state, intents and time scales, a
//! level always evolves the same way.
//!
//! ## Module Structure
//!
//! - `tile`, `grid`: Tile kinds and the level grid
//! - `autotile`: Neighbour-mask sprite variants (visual only)
//! - `input`: Intents, key mapping, recording
//! - `actor`: The player body and its hitbox
//! - `physics`: Per-step movement state machine
//! - `collision`: Axis-separated tile collision and wall probing
//! - `camera`: Viewport follow
//! - `state`: Level state and state hash
//! - `tick`: One simulation frame and replay
//! - `events`: Game events for hosts and replay verification

pub mod tile;
pub mod grid;
pub mod autotile;
pub mod input;
pub mod actor;
pub mod physics;
pub mod collision;
pub mod camera;
pub mod events;
pub mod state;
pub mod tick;

// Re-export key types
pub use tile::TileKind;
pub use grid::{CellPos, TileGrid};
pub use input::{Intents, InputMapper, InputRecording, Key};
pub use actor::{Actor, WallSide, Facing};
pub use physics::{PhysicsConfig, StepReport};
pub use camera::{Camera, CameraMode};
pub use state::{LevelState, LevelSetup};
pub use tick::{tick, TickResult};
pub use events::GameEvent;
