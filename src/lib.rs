//! # Tilerun
//!
//! Tile platformer engine: actor physics, grid collision and a level session
//! with an integrated editor surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         TILERUN                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - 2D float vector                           │
//! │  ├── clock.rs    - Frame interval -> time scale              │
//! │  └── hash.rs     - State hashing for replay verification     │
//! │                                                              │
//! │  game/           - Simulation (deterministic per input)      │
//! │  ├── grid.rs     - Tile grid, out of bounds is empty         │
//! │  ├── physics.rs  - Actor movement state machine              │
//! │  ├── collision.rs- X/Y collision passes, wall probe          │
//! │  ├── camera.rs   - Viewport follow and clamp                 │
//! │  └── tick.rs     - One frame, goal check, replay             │
//! │                                                              │
//! │  level/          - Level data                                │
//! │  ├── codec.rs    - Hex level codes                           │
//! │  ├── builtin.rs  - Embedded catalog                          │
//! │  └── loader.rs   - Background loads (tokio)                  │
//! │                                                              │
//! │  session/        - Orchestration (non-deterministic)         │
//! │  ├── level_session.rs - Progression, loads, recording        │
//! │  ├── editor.rs   - Tile placement, new/clear level           │
//! │  └── assets.rs   - Tile sprites with colour fallback         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Flow
//!
//! ```text
//! FrameClock -> time scale -> physics::update(actor, intents, grid)
//!            -> goal check -> Camera::follow -> render (host)
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules read no clocks, files or randomness.
//! Recording the intents and time scale of every tick is enough to replay a
//! run and reproduce its state hash exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod level;
pub mod session;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::clock::FrameClock;
pub use game::grid::TileGrid;
pub use game::input::{Intents, InputRecording};
pub use game::state::LevelState;
pub use game::tile::TileKind;
pub use level::codec::LevelError;
pub use session::level_session::{LevelSession, SessionConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Edge length of a tile (pixels)
pub const TILE_SIZE: f32 = 32.0;

/// Viewport width (pixels)
pub const VIEWPORT_WIDTH: f32 = 800.0;

/// Viewport height (pixels)
pub const VIEWPORT_HEIGHT: f32 = 600.0;

/// Nominal simulation rate (Hz)
pub const TICK_RATE: u32 = 60;
