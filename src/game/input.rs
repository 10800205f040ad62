//! Input Intents, Mapping and Recording
//!
//! The physics step consumes abstract [`Intents`], never device events.
//! [`InputMapper`] turns logical key presses into intents (including the
//! edit-mode rule for Up), and [`InputRecording`] captures a run for replay.

use serde::{Serialize, Deserialize};

// =============================================================================
// INTENTS
// =============================================================================

/// Abstract movement intents for one simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intents {
    /// Move / fly left
    pub left: bool,
    /// Move / fly right
    pub right: bool,
    /// Fly up (edit mode only)
    pub up: bool,
    /// Fly down (edit mode only)
    pub down: bool,
    /// Jump (play mode only)
    pub jump: bool,
}

impl Intents {
    /// Left bit
    pub const BIT_LEFT: u8 = 0x01;
    /// Right bit
    pub const BIT_RIGHT: u8 = 0x02;
    /// Up bit
    pub const BIT_UP: u8 = 0x04;
    /// Down bit
    pub const BIT_DOWN: u8 = 0x08;
    /// Jump bit
    pub const BIT_JUMP: u8 = 0x10;

    /// No intents held.
    pub const NONE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
        jump: false,
    };

    /// Only `left` held.
    pub const fn left() -> Self {
        Self { left: true, ..Self::NONE }
    }

    /// Only `right` held.
    pub const fn right() -> Self {
        Self { right: true, ..Self::NONE }
    }

    /// Only `jump` held.
    pub const fn jump() -> Self {
        Self { jump: true, ..Self::NONE }
    }

    /// Add `jump` to these intents.
    pub const fn with_jump(self) -> Self {
        Self { jump: true, ..self }
    }

    /// Pack into a bit set.
    #[inline]
    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.left {
            bits |= Self::BIT_LEFT;
        }
        if self.right {
            bits |= Self::BIT_RIGHT;
        }
        if self.up {
            bits |= Self::BIT_UP;
        }
        if self.down {
            bits |= Self::BIT_DOWN;
        }
        if self.jump {
            bits |= Self::BIT_JUMP;
        }
        bits
    }

    /// Unpack from a bit set. Unknown bits are ignored.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & Self::BIT_LEFT != 0,
            right: bits & Self::BIT_RIGHT != 0,
            up: bits & Self::BIT_UP != 0,
            down: bits & Self::BIT_DOWN != 0,
            jump: bits & Self::BIT_JUMP != 0,
        }
    }

    /// Whether nothing is held.
    #[inline]
    pub fn is_idle(self) -> bool {
        self == Self::NONE
    }
}

// =============================================================================
// KEY MAPPING
// =============================================================================

/// Logical keys, already resolved from physical devices by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Arrow left / A
    Left,
    /// Arrow right / D
    Right,
    /// Arrow up / W
    Up,
    /// Arrow down / S
    Down,
    /// Space bar
    Space,
    /// Edit-mode toggle (E)
    ToggleEdit,
}

/// Maintains held intents from key presses and releases.
///
/// Up means "fly up" in edit mode and "jump" otherwise; Space only jumps
/// outside edit mode. Releasing Up clears both meanings.
#[derive(Clone, Debug, Default)]
pub struct InputMapper {
    intents: Intents,
    edit_mode: bool,
    toggle_pressed: bool,
}

impl InputMapper {
    /// Create a mapper in play mode with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tell the mapper whether the session is in edit mode.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
    }

    /// Handle a key press.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Left => self.intents.left = true,
            Key::Right => self.intents.right = true,
            Key::Up => {
                if self.edit_mode {
                    self.intents.up = true;
                } else {
                    self.intents.jump = true;
                }
            }
            Key::Down => self.intents.down = true,
            Key::Space => {
                if !self.edit_mode {
                    self.intents.jump = true;
                }
            }
            Key::ToggleEdit => self.toggle_pressed = true,
        }
    }

    /// Handle a key release.
    pub fn release(&mut self, key: Key) {
        match key {
            Key::Left => self.intents.left = false,
            Key::Right => self.intents.right = false,
            Key::Up => {
                self.intents.up = false;
                self.intents.jump = false;
            }
            Key::Down => self.intents.down = false,
            Key::Space => self.intents.jump = false,
            Key::ToggleEdit => {}
        }
    }

    /// Currently held intents.
    #[inline]
    pub fn intents(&self) -> Intents {
        self.intents
    }

    /// Consume a pending edit-mode toggle press (edge-triggered).
    pub fn take_toggle_edit(&mut self) -> bool {
        std::mem::take(&mut self.toggle_pressed)
    }
}

// =============================================================================
// RECORDING
// =============================================================================

/// Intents that took effect at `tick` and stayed until the next delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDelta {
    /// Tick when this intent set began
    pub tick: u32,
    /// Packed intents
    pub bits: u8,
}

/// One recorded step, as fed to the tick function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedStep {
    /// Tick index (0-based)
    pub tick: u32,
    /// Intents held for the step
    pub intents: Intents,
    /// Time scale for the step
    pub time_scale: f32,
}

/// Complete input recording for one run.
///
/// Intents are delta-compressed (stored only when they change). Time scales
/// vary every frame and are stored per tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Level catalog index the run started on
    pub level_index: usize,

    /// Delta-compressed intents
    deltas: Vec<IntentDelta>,

    /// Per-tick time scale
    scales: Vec<f32>,

    /// Last recorded intents (for delta comparison)
    #[serde(skip)]
    last: Option<Intents>,
}

impl InputRecording {
    /// Create an empty recording for a run starting on `level_index`.
    pub fn new(level_index: usize) -> Self {
        Self {
            level_index,
            deltas: Vec::with_capacity(256),
            scales: Vec::with_capacity(1024),
            last: None,
        }
    }

    /// Append the next step. Ticks are implicit (0, 1, 2, ...).
    pub fn record(&mut self, intents: Intents, time_scale: f32) {
        let tick = self.scales.len() as u32;
        if self.last != Some(intents) {
            self.deltas.push(IntentDelta {
                tick,
                bits: intents.to_bits(),
            });
            self.last = Some(intents);
        }
        self.scales.push(time_scale);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Whether no steps were recorded.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Number of stored intent deltas.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Intents in effect at `tick`.
    pub fn intents_at(&self, tick: u32) -> Intents {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            Intents::NONE
        } else {
            Intents::from_bits(self.deltas[idx - 1].bits)
        }
    }

    /// Iterate every recorded step in order.
    pub fn steps(&self) -> impl Iterator<Item = RecordedStep> + '_ {
        self.scales
            .iter()
            .enumerate()
            .map(move |(i, scale)| RecordedStep {
                tick: i as u32,
                intents: self.intents_at(i as u32),
                time_scale: *scale,
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_bits_round_trip() {
        let intents = Intents {
            left: true,
            right: false,
            up: true,
            down: false,
            jump: true,
        };
        assert_eq!(Intents::from_bits(intents.to_bits()), intents);
        assert_eq!(Intents::NONE.to_bits(), 0);
        assert!(Intents::from_bits(0xE0).is_idle());
    }

    #[test]
    fn test_up_is_jump_in_play_mode() {
        let mut mapper = InputMapper::new();
        mapper.press(Key::Up);

        assert!(mapper.intents().jump);
        assert!(!mapper.intents().up);
    }

    #[test]
    fn test_up_is_fly_in_edit_mode() {
        let mut mapper = InputMapper::new();
        mapper.set_edit_mode(true);
        mapper.press(Key::Up);
        mapper.press(Key::Space);

        assert!(mapper.intents().up);
        assert!(!mapper.intents().jump);
    }

    #[test]
    fn test_releasing_up_clears_both_meanings() {
        let mut mapper = InputMapper::new();
        mapper.press(Key::Up);
        mapper.set_edit_mode(true);
        mapper.press(Key::Up);

        mapper.release(Key::Up);
        assert!(!mapper.intents().up);
        assert!(!mapper.intents().jump);
    }

    #[test]
    fn test_toggle_is_edge_triggered() {
        let mut mapper = InputMapper::new();
        mapper.press(Key::ToggleEdit);

        assert!(mapper.take_toggle_edit());
        assert!(!mapper.take_toggle_edit());
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut recording = InputRecording::new(0);
        for _ in 0..4 {
            recording.record(Intents::right(), 1.0);
        }
        assert_eq!(recording.delta_count(), 1);

        recording.record(Intents::right().with_jump(), 1.0);
        assert_eq!(recording.delta_count(), 2);
        assert_eq!(recording.len(), 5);
    }

    #[test]
    fn test_recording_intents_at() {
        let mut recording = InputRecording::new(0);
        recording.record(Intents::NONE, 1.0);
        recording.record(Intents::left(), 1.0);
        recording.record(Intents::left(), 0.5);
        recording.record(Intents::jump(), 2.0);

        assert_eq!(recording.intents_at(0), Intents::NONE);
        assert_eq!(recording.intents_at(1), Intents::left());
        assert_eq!(recording.intents_at(2), Intents::left());
        assert_eq!(recording.intents_at(3), Intents::jump());
        assert_eq!(recording.intents_at(99), Intents::jump());
    }

    #[test]
    fn test_recording_steps_replay_scales() {
        let mut recording = InputRecording::new(2);
        recording.record(Intents::right(), 1.0);
        recording.record(Intents::right(), 0.25);
        recording.record(Intents::NONE, 3.0);

        let steps: Vec<_> = recording.steps().collect();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].time_scale, 0.25);
        assert_eq!(steps[1].intents, Intents::right());
        assert_eq!(steps[2].tick, 2);
        assert!(steps[2].intents.is_idle());
    }
}
