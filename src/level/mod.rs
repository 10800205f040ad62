//! Level Data
//!
//! Level codes, the embedded catalog and background loading. Nothing here
//! runs during a tick.

pub mod codec;
pub mod builtin;
pub mod loader;

pub use codec::{decode_level, encode_level, parse_level_text, LevelError};
pub use builtin::{BuiltinLevel, CATALOG};
pub use loader::{spawn_code_load, spawn_file_load, PendingLoad};
