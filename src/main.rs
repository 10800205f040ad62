//! Tilerun Demo
//!
//! Headless driver for the level session. Runs a scripted player on a
//! synthetic, jittery frame clock, reports progression and verifies every
//! recorded run by replaying it.
//!
//! On the first catalog level the player follows a waypoint route to the
//! flag. Elsewhere it runs right and hops on a fixed rhythm.

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tilerun::{
    core::hash::short_hex,
    game::{
        actor::Actor,
        input::{InputMapper, InputRecording, Key},
        tick::replay_level,
    },
    session::{AssetRegistry, LevelSession, Notice, SessionConfig},
    TICK_RATE, VERSION,
};

/// Frame interval pattern (in nominal frames) for the synthetic clock.
const JITTER: [f32; 6] = [1.0, 0.5, 1.5, 2.0, 1.0, 0.75];

/// Every this many frames the synthetic clock stalls.
const STALL_EVERY: u32 = 600;

/// Horizontal distance (pixels) inside which the pilot stops steering.
const STEER_DEADBAND: f32 = 6.0;

/// Horizontal distance (pixels) that counts as arriving at a waypoint.
const ARRIVE_DISTANCE: f32 = 16.0;

/// How far below a platform top the pilot holds still while rising.
const CLIMB_MARGIN: f32 = 48.0;

/// Tolerance when comparing the hitbox bottom to a floor height.
const FLOOR_EPSILON: f32 = 0.5;

// =============================================================================
// AUTOPILOT
// =============================================================================

/// A point on a scripted route: hitbox centre x over a floor height.
#[derive(Clone, Copy, Debug)]
struct Waypoint {
    x: f32,
    floor: f32,
    /// Keep jumping while travelling (crossing hazards)
    hop: bool,
    /// Where to take off from when climbing onto a ledge from below
    approach: Option<f32>,
}

impl Waypoint {
    const fn land(x: f32, floor: f32) -> Self {
        Self { x, floor, hop: false, approach: None }
    }

    const fn hop(x: f32, floor: f32) -> Self {
        Self { x, floor, hop: true, approach: None }
    }

    const fn climb(x: f32, floor: f32, approach: f32) -> Self {
        Self { x, floor, hop: false, approach: Some(approach) }
    }
}

/// Route through the first catalog level: over both spike strips, a wall
/// jump onto the low brick shelf, then up the steps to the flag.
const MEADOW_ROUTE: [Waypoint; 8] = [
    Waypoint::land(78.0, 448.0),
    Waypoint::hop(736.0, 480.0),
    Waypoint::hop(1020.0, 480.0),
    Waypoint::climb(1104.0, 320.0, 1020.0),
    Waypoint::land(1280.0, 256.0),
    Waypoint::land(1376.0, 224.0),
    Waypoint::land(1440.0, 192.0),
    Waypoint::land(1520.0, 160.0),
];

/// Held keys for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Steer {
    left: bool,
    right: bool,
    jump: bool,
}

/// Scripted player.
#[derive(Debug, Default)]
struct Autopilot {
    stage: usize,
    level: Option<usize>,
}

impl Autopilot {
    /// Set the held keys for frame `t`.
    fn drive(&mut self, session: &mut LevelSession, t: u32) {
        let level = session.state().level_index;
        if level != self.level {
            self.level = level;
            self.stage = 0;
        }

        let steer = match level {
            Some(0) => self.follow(&MEADOW_ROUTE, &session.state().actor),
            _ => Steer { left: false, right: true, jump: t % 40 < 15 },
        };

        let input = session.input_mut();
        hold(input, Key::Left, steer.left);
        hold(input, Key::Right, steer.right);
        hold(input, Key::Up, steer.jump);
    }

    /// Back to the start of the route (after a respawn).
    fn restart(&mut self) {
        self.stage = 0;
    }

    fn follow(&mut self, route: &[Waypoint], actor: &Actor) -> Steer {
        let hb = actor.hitbox();
        let x = hb.center().x;
        let bottom = hb.bottom();

        let mut wp = route[self.stage];
        let arrived = actor.on_ground
            && (bottom - wp.floor).abs() < FLOOR_EPSILON
            && (x - wp.x).abs() < ARRIVE_DISTANCE;
        if arrived && self.stage + 1 < route.len() {
            self.stage += 1;
            wp = route[self.stage];
        }

        let below = !wp.hop && bottom > wp.floor + CLIMB_MARGIN;
        let aim = match wp.approach {
            Some(approach) if below => approach,
            _ => wp.x,
        };
        let dx = aim - x;

        let mut steer = Steer {
            left: dx < -STEER_DEADBAND,
            right: dx > STEER_DEADBAND,
            jump: actor.on_ground && (wp.hop || bottom > wp.floor + FLOOR_EPSILON),
        };

        if below {
            match wp.approach {
                // Walk to the take-off point before jumping
                Some(_) if dx.abs() > ARRIVE_DISTANCE => steer.jump = false,
                Some(_) => {}
                // Rise straight up until level with the target
                None if !actor.on_ground => {
                    steer.left = false;
                    steer.right = false;
                }
                None => {}
            }
        }

        // Kick off a touched wall, which needs the direction into it released
        if actor.on_wall.is_touching() && !actor.on_ground && bottom > wp.floor + FLOOR_EPSILON {
            steer = Steer { left: false, right: false, jump: true };
        }

        steer
    }
}

fn hold(input: &mut InputMapper, key: Key, held: bool) {
    if held {
        input.press(key);
    } else {
        input.release(key);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tilerun v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = SessionConfig::from_env();
    let run_ticks = config.run_ticks;
    let level_file = config.level_file.clone();

    let assets_root = std::env::var("TILERUN_ASSET_ROOT").unwrap_or_else(|_| ".".to_string());
    let assets = AssetRegistry::load(&assets_root).await;
    info!(
        "Assets: {} sprites, {} fallback colors",
        assets.sprite_count(),
        assets.fallback_count()
    );

    let mut session = LevelSession::new(config).context("failed to start level session")?;

    if let Some(path) = level_file {
        info!("Loading level file {}", path.display());
        session.request_file_load(path);
    }

    demo_run(&mut session, run_ticks).await
}

/// Drive the session with a scripted player for `ticks` frames.
async fn demo_run(session: &mut LevelSession, ticks: u32) -> anyhow::Result<()> {
    info!("=== Running {} frames ===", ticks);

    let mut now = Instant::now();
    let mut total_events = 0;
    let mut verified = 0;
    let mut pilot = Autopilot::default();

    for t in 0..ticks {
        pilot.drive(session, t);
        now += frame_interval(t);

        let out = session.frame(now);
        total_events += out.result.events.len();
        if out.result.report.spiked {
            pilot.restart();
        }

        for notice in &out.notices {
            info!("{}", notice);
            if let Notice::LevelCompleted { final_hash, .. } = notice {
                if let Some(recording) = session.take_completed_recording() {
                    verify_replay(session, &recording, final_hash)?;
                    verified += 1;
                }
            }
        }

        if t % 600 == 0 {
            let state = session.state();
            info!(
                "Frame {}: level {:?}, tick {}, coins {}, respawns {}",
                t,
                state.level_index,
                state.tick,
                state.actor.coins,
                state.actor.respawns
            );
        }

        if session.is_loading() {
            tokio::task::yield_now().await;
        }
    }

    info!("=== Results ===");
    let state = session.state();
    let hash = state.compute_hash();
    info!("Levels completed: {}", session.completed_levels());
    info!("Total events: {}", total_events);
    info!("Final State Hash: {}", hex::encode(hash));

    match session.level_code() {
        Ok(code) => info!("Current level code: {} chars", code.len()),
        Err(e) => warn!("Could not encode current level: {}", e),
    }

    if let Some(recording) = session.take_recording() {
        verify_replay(session, &recording, &hash)?;
        verified += 1;
    }

    info!("Replays verified: {}", verified);
    Ok(())
}

fn frame_interval(t: u32) -> Duration {
    let frames = if t > 0 && t % STALL_EVERY == 0 {
        15.0
    } else {
        JITTER[t as usize % JITTER.len()]
    };
    Duration::from_secs_f32(frames / TICK_RATE as f32)
}

/// Replay a recording from the start of its level and compare hashes.
fn verify_replay(
    session: &LevelSession,
    recording: &InputRecording,
    expected: &[u8; 32],
) -> anyhow::Result<()> {
    // Round trip through the wire format first
    let bytes = recording.to_bytes()?;
    let recording = InputRecording::from_bytes(&bytes)?;

    let initial = session.initial_state(recording.level_index)?;
    let (replayed, _) = replay_level(initial, &recording);
    let replay_hash = replayed.compute_hash();

    info!(
        "Replay of level {} ({} ticks, {} bytes, inputs {}): {}",
        recording.level_index,
        recording.len(),
        bytes.len(),
        short_hex(&recording.compute_hash()),
        hex::encode(replay_hash)
    );

    if &replay_hash == expected {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!(
            "replay hash {} differs from live hash {}",
            short_hex(&replay_hash),
            short_hex(expected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autopilot_clears_first_level() {
        let mut session = LevelSession::new(SessionConfig::default()).unwrap();
        let mut pilot = Autopilot::default();
        let mut now = Instant::now();
        let mut completed = None;

        for t in 0..1200 {
            pilot.drive(&mut session, t);
            now += frame_interval(t);
            let out = session.frame(now);
            if out.notices.iter().any(|n| matches!(n, Notice::LevelCompleted { .. })) {
                completed = Some(t);
                break;
            }
        }

        assert!(completed.is_some(), "route never reached the flag");
        assert_eq!(session.completed_levels(), 1);
        assert_eq!(session.state().level_index, Some(1));

        let recording = session.take_completed_recording().unwrap();
        assert_eq!(recording.level_index, 0);
    }

    #[test]
    fn test_completed_run_replays() {
        let mut session = LevelSession::new(SessionConfig::default()).unwrap();
        let mut pilot = Autopilot::default();
        let mut now = Instant::now();

        for t in 0..1200 {
            pilot.drive(&mut session, t);
            now += frame_interval(t);
            let out = session.frame(now);
            for notice in &out.notices {
                if let Notice::LevelCompleted { final_hash, .. } = notice {
                    let recording = session.take_completed_recording().unwrap();
                    verify_replay(&session, &recording, final_hash).unwrap();
                    return;
                }
            }
        }
        panic!("level was not completed");
    }
}
