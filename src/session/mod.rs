//! Level Session Layer
//!
//! Orchestration around the simulation: progression, loading, editing,
//! recording and tile assets. Non-deterministic inputs (wall clock, files)
//! enter the system here and nowhere else.

pub mod level_session;
pub mod editor;
pub mod assets;

pub use level_session::{LevelSession, SessionConfig, SessionTick, Notice, ConfigError};
pub use editor::{Editor, EditorError};
pub use assets::{AssetRegistry, TileAppearance};
