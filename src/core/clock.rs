//! Frame Clock
//!
//! Converts wall-clock frame intervals into a dimensionless time scale.
//!
//! A scale of `1.0` means "exactly one nominal 60 Hz frame elapsed". Every
//! velocity and acceleration constant in [`crate::game::physics`] is expressed
//! per nominal frame and multiplied by this scale.
//!
//! ```text
//! scale = (now - last) / NOMINAL_FRAME_MS
//! scale > MAX_TIME_SCALE  =>  scale = 1.0   (stall: play one frame, never catch up)
//! ```

use std::time::{Duration, Instant};

/// Nominal frame duration in milliseconds (60 Hz).
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

/// Largest scale accepted before a frame is treated as a stall.
pub const MAX_TIME_SCALE: f32 = 3.0;

/// Scale reported for a stalled frame.
pub const STALL_TIME_SCALE: f32 = 1.0;

/// Compute the time scale for a frame interval in milliseconds.
///
/// Stalls (scale above [`MAX_TIME_SCALE`]) clamp to exactly
/// [`STALL_TIME_SCALE`] rather than to the bound.
#[inline]
pub fn time_scale_for(delta_ms: f32) -> f32 {
    let scale = delta_ms.max(0.0) / NOMINAL_FRAME_MS;
    if scale > MAX_TIME_SCALE {
        STALL_TIME_SCALE
    } else {
        scale
    }
}

/// Compute the time scale for a frame interval.
#[inline]
pub fn time_scale_for_duration(delta: Duration) -> f32 {
    time_scale_for(delta.as_secs_f32() * 1000.0)
}

/// Tracks the previous frame timestamp.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    last_scale: f32,
    stalls: u32,
}

impl FrameClock {
    /// Create a clock with no previous frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock whose previous frame happened at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: Some(start),
            last_scale: STALL_TIME_SCALE,
            stalls: 0,
        }
    }

    /// Advance to `now` and return the time scale for this frame.
    ///
    /// The first call (no previous timestamp) returns `1.0`. A timestamp
    /// earlier than the previous one yields `0.0`.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let scale = match self.last {
            Some(last) => {
                let delta = now.saturating_duration_since(last);
                let raw = delta.as_secs_f32() * 1000.0 / NOMINAL_FRAME_MS;
                if raw > MAX_TIME_SCALE {
                    self.stalls += 1;
                    tracing::debug!(raw_scale = raw, "frame stall clamped to one nominal frame");
                }
                time_scale_for_duration(delta)
            }
            None => STALL_TIME_SCALE,
        };

        self.last = Some(now);
        self.last_scale = scale;
        scale
    }

    /// Scale returned by the most recent [`tick`](Self::tick).
    pub fn last_scale(&self) -> f32 {
        self.last_scale
    }

    /// Number of frames clamped as stalls so far.
    pub fn stall_count(&self) -> u32 {
        self.stalls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_frame_is_unit_scale() {
        let scale = time_scale_for(NOMINAL_FRAME_MS);
        assert!((scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_half_and_double_frames() {
        assert!((time_scale_for(NOMINAL_FRAME_MS / 2.0) - 0.5).abs() < 1e-6);
        assert!((time_scale_for(NOMINAL_FRAME_MS * 2.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_exactly_three_is_kept() {
        let scale = time_scale_for(NOMINAL_FRAME_MS * 3.0);
        assert!((scale - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_stall_clamps_to_one() {
        assert_eq!(time_scale_for(250.0), 1.0);
        assert_eq!(time_scale_for(10_000.0), 1.0);
    }

    #[test]
    fn test_negative_delta_is_zero() {
        assert_eq!(time_scale_for(-5.0), 0.0);
    }

    #[test]
    fn test_clock_first_tick_is_one() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Instant::now()), 1.0);
    }

    #[test]
    fn test_clock_uses_previous_timestamp() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let scale = clock.tick(start + Duration::from_micros(33_333));
        assert!((scale - 2.0).abs() < 1e-3);

        let scale = clock.tick(start + Duration::from_micros(33_333 + 8_333));
        assert!((scale - 0.5).abs() < 1e-3);
        assert_eq!(clock.last_scale(), scale);
    }

    #[test]
    fn test_clock_counts_stalls() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let scale = clock.tick(start + Duration::from_millis(500));
        assert_eq!(scale, 1.0);
        assert_eq!(clock.stall_count(), 1);
    }
}
