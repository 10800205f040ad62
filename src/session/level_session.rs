//! Level Session
//!
//! Owns the running level and everything around it: frame clock, input
//! mapping, the editor surface, background level loads, progression through
//! the built-in catalog and input recording for replay.
//!
//! The session never halts on a failure. Bad level data, a failed load or an
//! invalid editor request leaves the current level running and is reported
//! as a [`Notice`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;

use crate::core::clock::FrameClock;
use crate::core::hash::{short_hex, StateHash};
use crate::core::vec2::Vec2;
use crate::game::camera::CameraMode;
use crate::game::events::GameEvent;
use crate::game::grid::{CellPos, TileGrid};
use crate::game::input::{InputMapper, InputRecording, Intents};
use crate::game::physics::PhysicsConfig;
use crate::game::state::{LevelSetup, LevelState, DEFAULT_SPAWN};
use crate::game::tick::{tick, TickResult};
use crate::level::builtin::{builtin, next_index, CATALOG};
use crate::level::codec::{encode_level, LevelError};
use crate::level::loader::{spawn_code_load, spawn_file_load, PendingLoad};
use crate::session::editor::{floored_grid, new_level_grid, Editor, EditorError};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Failure to read a physics override file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid physics config
    #[error("invalid physics config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a level session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Actor spawn point (sprite top-left).
    pub spawn: Vec2,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    /// Camera follow behavior.
    pub camera_mode: CameraMode,
    /// Movement tuning.
    pub physics: PhysicsConfig,
    /// Catalog index of the first level.
    pub start_level: usize,
    /// Level file to load once the session is running.
    pub level_file: Option<PathBuf>,
    /// Ticks the demo driver runs before stopping.
    pub run_ticks: u32,
    /// Record inputs on catalog levels for replay.
    pub record_runs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            spawn: DEFAULT_SPAWN,
            viewport: Vec2::new(crate::VIEWPORT_WIDTH, crate::VIEWPORT_HEIGHT),
            camera_mode: CameraMode::Center,
            physics: PhysicsConfig::default(),
            start_level: 0,
            level_file: None,
            run_ticks: 3600, // 60 seconds @ 60Hz
            record_runs: true,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults. A physics file that
    /// cannot be read is logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let physics = match std::env::var("TILERUN_PHYSICS_FILE").ok() {
            Some(path) => load_physics_file(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path, error = %e, "ignoring physics file");
                PhysicsConfig::default()
            }),
            None => defaults.physics.clone(),
        };

        Self {
            camera_mode: env_parse::<f32>("TILERUN_CAMERA_EASE")
                .map(|factor| CameraMode::Ease { factor })
                .unwrap_or(defaults.camera_mode),
            physics,
            start_level: env_parse("TILERUN_START_LEVEL").unwrap_or(defaults.start_level),
            level_file: std::env::var("TILERUN_LEVEL_FILE").ok().map(PathBuf::from),
            run_ticks: env_parse("TILERUN_TICKS").unwrap_or(defaults.run_ticks),
            record_runs: std::env::var("TILERUN_RECORD")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.record_runs),
            ..defaults
        }
    }

    /// Level construction parameters derived from this config.
    pub fn level_setup(&self) -> LevelSetup {
        LevelSetup {
            spawn: self.spawn,
            viewport: self.viewport,
            camera_mode: self.camera_mode,
            physics: self.physics.clone(),
        }
    }
}

/// Read a JSON physics config. Missing fields keep their defaults.
pub fn load_physics_file(path: impl AsRef<Path>) -> Result<PhysicsConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

// =============================================================================
// NOTICES
// =============================================================================

/// User-facing outcome of a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The flag was reached.
    LevelCompleted {
        /// Catalog index, `None` for a custom level
        level_index: Option<usize>,
        /// Coins collected on the run
        coins: u32,
        /// Ticks the run took
        ticks: u32,
        /// State hash at the moment of completion
        final_hash: StateHash,
    },
    /// A requested level finished loading and is now active.
    LevelLoaded {
        /// Path or "level code"
        label: String,
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
    },
    /// A requested level could not be loaded; the current level stays.
    LoadFailed {
        /// Path or "level code"
        label: String,
        /// Why it failed
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LevelCompleted { coins, final_hash, .. } => {
                write!(f, "You win! Coins collected: {} [{}]", coins, short_hex(final_hash))
            }
            Notice::LevelLoaded { label, rows, cols } => {
                write!(f, "Loaded {} ({}x{})", label, rows, cols)
            }
            Notice::LoadFailed { label, reason } => {
                write!(f, "Could not load {}: {}", label, reason)
            }
        }
    }
}

/// Result of one session tick.
#[derive(Debug, Default)]
pub struct SessionTick {
    /// Simulation output for the level that was ticked
    pub result: TickResult,
    /// Notices raised this tick
    pub notices: Vec<Notice>,
}

// =============================================================================
// SESSION
// =============================================================================

/// A running level with its editor and loader.
pub struct LevelSession {
    /// Session configuration.
    config: SessionConfig,
    /// Derived level setup.
    setup: LevelSetup,
    /// The active level.
    state: LevelState,
    /// Unplayed copy of the active custom level, for restarts.
    custom_grid: Option<TileGrid>,
    /// Key to intent mapping.
    input: InputMapper,
    /// Tile palette and placement.
    editor: Editor,
    /// Frame interval tracking.
    clock: FrameClock,
    /// Level load in flight, if any.
    pending_load: Option<PendingLoad>,
    /// Inputs recorded since the current catalog level started.
    recording: Option<InputRecording>,
    /// Recording of the most recently completed catalog level.
    completed_recording: Option<InputRecording>,
    /// Levels completed so far.
    completed_levels: u32,
}

impl LevelSession {
    /// Create a session on the configured start level.
    ///
    /// A start index past the end of the catalog falls back to the first level.
    pub fn new(config: SessionConfig) -> Result<Self, LevelError> {
        let start = if config.start_level < CATALOG.len() {
            config.start_level
        } else {
            tracing::warn!(
                start_level = config.start_level,
                catalog = CATALOG.len(),
                "start level out of range, using first level"
            );
            0
        };

        let setup = config.level_setup();
        let grid = CATALOG[start].grid()?;
        let state = LevelState::new(grid, Some(start), &setup);

        let mut session = Self {
            config,
            setup,
            state,
            custom_grid: None,
            input: InputMapper::new(),
            editor: Editor::new(),
            clock: FrameClock::new(),
            pending_load: None,
            recording: None,
            completed_recording: None,
            completed_levels: 0,
        };
        session.begin_recording();

        tracing::info!(level = start, name = CATALOG[start].name, "session started");
        Ok(session)
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The active level.
    pub fn state(&self) -> &LevelState {
        &self.state
    }

    /// Mutable access to the active level.
    pub fn state_mut(&mut self) -> &mut LevelState {
        &mut self.state
    }

    /// Key to intent mapper fed by the host.
    pub fn input_mut(&mut self) -> &mut InputMapper {
        &mut self.input
    }

    /// Editor palette.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable editor palette.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Whether a level load is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Levels completed so far.
    pub fn completed_levels(&self) -> u32 {
        self.completed_levels
    }

    /// Whether the session is in edit mode.
    pub fn is_editing(&self) -> bool {
        self.state.actor.edit_mode
    }

    /// Fresh state for a catalog level, as the session would start it.
    pub fn initial_state(&self, index: usize) -> Result<LevelState, LevelError> {
        let level = builtin(index).ok_or(LevelError::UnknownLevel { index })?;
        Ok(LevelState::new(level.grid()?, Some(index), &self.setup))
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Run one frame at `now`: apply a pending edit toggle, derive the time
    /// scale from the frame clock and tick with the mapper's held intents.
    pub fn frame(&mut self, now: Instant) -> SessionTick {
        if self.input.take_toggle_edit() {
            self.toggle_edit_mode();
        }
        let time_scale = self.clock.tick(now);
        self.run_tick(self.input.intents(), time_scale)
    }

    /// Run a single tick with explicit intents and time scale.
    pub fn run_tick(&mut self, intents: Intents, time_scale: f32) -> SessionTick {
        let mut notices = Vec::new();

        // Finished loads are installed before simulating
        self.poll_pending_load(&mut notices);

        let was_playing = !self.state.is_completed();
        let result = tick(&mut self.state, intents, time_scale);

        if was_playing {
            if let Some(recording) = self.recording.as_mut() {
                recording.record(intents, time_scale);
            }
        }

        if result.completed && was_playing {
            self.finish_level(&mut notices);
        }

        SessionTick { result, notices }
    }

    fn poll_pending_load(&mut self, notices: &mut Vec<Notice>) {
        let Some(pending) = self.pending_load.as_mut() else {
            return;
        };
        let Some(outcome) = pending.poll() else {
            return;
        };
        let label = pending.label().to_string();
        self.pending_load = None;

        match outcome {
            Ok(grid) => {
                tracing::info!(%label, rows = grid.rows(), cols = grid.cols(), "level loaded");
                notices.push(Notice::LevelLoaded {
                    label,
                    rows: grid.rows(),
                    cols: grid.cols(),
                });
                self.install_custom(grid);
            }
            Err(e) => {
                tracing::warn!(%label, error = %e, "level load failed, keeping current level");
                let reason = e.to_string();
                self.state.push_event(GameEvent::load_failed(self.state.tick, reason.clone()));
                notices.push(Notice::LoadFailed { label, reason });
            }
        }
    }

    fn finish_level(&mut self, notices: &mut Vec<Notice>) {
        self.completed_levels += 1;
        notices.push(Notice::LevelCompleted {
            level_index: self.state.level_index,
            coins: self.state.actor.coins,
            ticks: self.state.tick,
            final_hash: self.state.compute_hash(),
        });

        if let Some(recording) = self.recording.take() {
            self.completed_recording = Some(recording);
        }

        match (self.state.level_index, self.custom_grid.clone()) {
            (Some(index), _) => self.install_catalog(next_index(index), notices),
            (None, Some(grid)) => {
                tracing::info!("custom level complete, restarting it");
                self.install(grid, None);
            }
            (None, None) => self.install_catalog(0, notices),
        }
    }

    // =========================================================================
    // Level installation
    // =========================================================================

    fn install_catalog(&mut self, index: usize, notices: &mut Vec<Notice>) {
        let Some(level) = builtin(index) else {
            return;
        };
        match level.grid() {
            Ok(grid) => {
                tracing::info!(level = index, name = level.name, "starting level");
                self.custom_grid = None;
                self.install(grid, Some(index));
            }
            Err(e) => {
                tracing::warn!(level = index, error = %e, "built-in level is malformed");
                notices.push(Notice::LoadFailed {
                    label: level.name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn install_custom(&mut self, grid: TileGrid) {
        self.custom_grid = Some(grid.clone());
        self.install(grid, None);
    }

    /// Replace the level, keeping edit mode. Actor back at spawn, camera
    /// rebuilt for the new extents.
    fn install(&mut self, grid: TileGrid, level_index: Option<usize>) {
        let edit_mode = self.state.actor.edit_mode;
        let (rows, cols) = (grid.rows(), grid.cols());

        self.state = LevelState::new(grid, level_index, &self.setup);
        self.state.actor.set_edit_mode(edit_mode);
        self.state.push_event(GameEvent::level_loaded(0, level_index, rows, cols));

        self.recording = None;
        self.begin_recording();
    }

    fn begin_recording(&mut self) {
        if !self.config.record_runs || self.state.actor.edit_mode {
            return;
        }
        if let Some(index) = self.state.level_index {
            self.recording = Some(InputRecording::new(index));
        }
    }

    fn discard_recording(&mut self, reason: &str) {
        if self.recording.take().is_some() {
            tracing::debug!(reason, "input recording discarded");
        }
    }

    /// Restart the current level from its unplayed layout.
    pub fn restart_level(&mut self) {
        let mut notices = Vec::new();
        match (self.state.level_index, self.custom_grid.clone()) {
            (Some(index), _) => self.install_catalog(index, &mut notices),
            (None, Some(grid)) => self.install(grid, None),
            (None, None) => self.install_catalog(0, &mut notices),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Start loading a level file. Replaces any load already in flight.
    ///
    /// Without a Tokio runtime the request fails on the next tick with a
    /// [`Notice::LoadFailed`] and the current level stays.
    pub fn request_file_load(&mut self, path: impl Into<PathBuf>) {
        self.replace_pending(spawn_file_load(path));
    }

    /// Start decoding a level code. Replaces any load already in flight.
    pub fn request_code_load(&mut self, code: impl Into<String>) {
        self.replace_pending(spawn_code_load(code));
    }

    fn replace_pending(&mut self, load: PendingLoad) {
        if let Some(previous) = self.pending_load.replace(load) {
            tracing::debug!(label = previous.label(), "superseded pending level load");
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Flip edit mode.
    pub fn toggle_edit_mode(&mut self) {
        let edit_mode = !self.state.actor.edit_mode;
        self.set_edit_mode(edit_mode);
    }

    /// Enter or leave edit mode. Entering stops the actor and ends any
    /// recording in progress.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        if self.state.actor.edit_mode == edit_mode {
            return;
        }
        self.state.set_edit_mode(edit_mode);
        self.input.set_edit_mode(edit_mode);
        if edit_mode {
            self.discard_recording("edit mode");
        }
        tracing::info!(edit_mode, "edit mode toggled");
    }

    /// Paint the selected tile at a world pixel.
    pub fn place_tile_at_world(&mut self, world: Vec2) -> Option<CellPos> {
        let cell = self.editor.place_at_world(&mut self.state.grid, world)?;
        self.after_edit(cell);
        Some(cell)
    }

    /// Paint the selected tile at a viewport pixel.
    pub fn place_tile_at_screen(&mut self, screen: Vec2) -> Option<CellPos> {
        let cell = self
            .editor
            .place_at_screen(&mut self.state.grid, &self.state.camera, screen)?;
        self.after_edit(cell);
        Some(cell)
    }

    fn after_edit(&mut self, cell: CellPos) {
        if let Some(grid) = self.custom_grid.as_mut() {
            grid.set(cell.row, cell.col, self.editor.selected());
        }
        self.discard_recording("level edited");
    }

    /// Empty the level, keeping its size, with a ground floor along the
    /// bottom. The actor and camera stay where they are.
    pub fn clear_level(&mut self) {
        let grid = floored_grid(self.state.grid.rows(), self.state.grid.cols());
        self.custom_grid = Some(grid.clone());
        self.state.grid = grid;
        self.state.level_index = None;
        self.discard_recording("level cleared");
        tracing::info!("level cleared");
    }

    /// Replace the level with an empty one of the given size.
    ///
    /// Invalid dimensions are rejected before anything changes.
    pub fn new_level(&mut self, rows: usize, cols: usize) -> Result<(), EditorError> {
        let grid = new_level_grid(rows, cols)?;
        tracing::info!(rows, cols, "new level");
        self.install_custom(grid);
        Ok(())
    }

    /// Level code of the current grid, as shown by "save level".
    pub fn level_code(&self) -> Result<String, LevelError> {
        encode_level(&self.state.grid)
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Whether inputs are being recorded.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Stop and return the recording in progress.
    pub fn take_recording(&mut self) -> Option<InputRecording> {
        self.recording.take()
    }

    /// Recording of the most recently completed catalog level.
    pub fn take_completed_recording(&mut self) -> Option<InputRecording> {
        self.completed_recording.take()
    }
}
