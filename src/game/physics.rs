//! Actor Physics
//!
//! One simulation step for the actor: intents in, new position/velocity out.
//!
//! All velocities are in pixels per nominal frame (1/60 s). Every rate is
//! multiplied by `time_scale`, and friction is applied as
//! `friction.powf(time_scale)`, so velocities do not depend on frame rate.
//!
//! ## Normal-mode step order
//!
//! ```text
//! 1. jump latch      4. friction       7. wall-slide clamp  10. Y integrate + Y pass
//! 2. facing          5. jump / wall    8. terminal clamp    11. animation clock
//! 3. acceleration    6. gravity        9. X integrate + X pass
//! ```

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::actor::{Actor, Facing, WallSide};
use crate::game::collision::{resolve_x, resolve_y};
use crate::game::grid::{CellPos, TileGrid};
use crate::game::input::Intents;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Movement tuning. Defaults reproduce the shipped game feel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal acceleration per nominal frame while a direction is held
    pub speed: f32,
    /// Per-frame horizontal velocity multiplier at time scale 1
    pub friction: f32,
    /// Upward velocity of a ground jump
    pub jump_power: f32,
    /// Downward acceleration per nominal frame
    pub gravity: f32,
    /// Maximum downward speed
    pub terminal_velocity: f32,
    /// Edit-mode flight speed
    pub fly_speed: f32,
    /// Maximum downward speed while sliding on a wall
    pub wall_slide_speed: f32,
    /// Horizontal push-off of a wall jump
    pub wall_jump_power_x: f32,
    /// Upward velocity of a wall jump
    pub wall_jump_power_y: f32,
    /// Sprite width (pixels)
    pub sprite_width: f32,
    /// Sprite height (pixels)
    pub sprite_height: f32,
    /// Hitbox size as a fraction of the sprite size
    pub hitbox_scale: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            friction: 0.8,
            jump_power: 12.0,
            gravity: 0.5,
            terminal_velocity: 15.0,
            fly_speed: 8.0,
            wall_slide_speed: 2.0,
            wall_jump_power_x: 18.0,
            wall_jump_power_y: 12.0,
            sprite_width: 28.0,
            sprite_height: 28.0,
            hitbox_scale: 0.85,
        }
    }
}

// =============================================================================
// STEP REPORT
// =============================================================================

/// Which kind of jump started this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    /// Jump from the ground
    Ground,
    /// Jump away from a wall on the given side
    Wall(WallSide),
}

/// Gameplay side effects of one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Coin cells collected (X pass first, then Y pass)
    pub coins: Vec<CellPos>,
    /// A spike sent the actor back to spawn
    pub spiked: bool,
    /// A jump started
    pub jump: Option<JumpKind>,
    /// The actor became grounded this step
    pub landed: bool,
}

impl StepReport {
    /// Whether nothing noteworthy happened.
    pub fn is_quiet(&self) -> bool {
        self.coins.is_empty() && !self.spiked && self.jump.is_none() && !self.landed
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// Advance the actor by one step of `time_scale` nominal frames.
///
/// Mutates `grid` when coins are collected.
pub fn update(
    actor: &mut Actor,
    intents: Intents,
    grid: &mut TileGrid,
    config: &PhysicsConfig,
    time_scale: f32,
) -> StepReport {
    if actor.edit_mode {
        fly(actor, intents, grid, config, time_scale);
        return StepReport::default();
    }

    let mut report = StepReport::default();
    let was_grounded = actor.on_ground;
    let ts = time_scale;

    // 1. Jump latch
    if !intents.jump {
        actor.jump_released = true;
    }
    actor.jump_held = intents.jump;

    // 2. Facing
    if intents.left {
        actor.facing = Facing::Left;
    } else if intents.right {
        actor.facing = Facing::Right;
    }

    // 3-4. Horizontal drive and friction
    if intents.left {
        actor.velocity.x -= config.speed * ts;
    } else if intents.right {
        actor.velocity.x += config.speed * ts;
    }
    actor.velocity.x *= config.friction.powf(ts);

    // 5. Jump
    if intents.jump && actor.jump_released {
        report.jump = try_jump(actor, intents, config);
    }

    // 6-8. Vertical forces
    actor.velocity.y += config.gravity * ts;
    if actor.on_wall.is_touching() && !actor.on_ground && actor.velocity.y > 0.0 {
        actor.velocity.y = actor.velocity.y.min(config.wall_slide_speed);
    }
    actor.velocity.y = actor.velocity.y.min(config.terminal_velocity);

    // 9. X axis
    actor.position.x += actor.velocity.x * ts;
    let x_effects = resolve_x(actor, grid);
    report.coins.extend(x_effects.coins);

    // 10. Y axis
    actor.position.y += actor.velocity.y * ts;
    let y_effects = resolve_y(actor, grid);
    report.coins.extend(y_effects.coins);
    report.spiked = y_effects.spiked;

    // 11. Cosmetic
    actor.anim_time += ts;

    report.landed = actor.on_ground && !was_grounded;

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        position = ?actor.position,
        velocity = ?actor.velocity,
        mode = ?actor.mode(),
        "actor step"
    );

    report
}

/// Ground jump, else wall jump away from the touched wall.
///
/// A wall jump is refused (not queued) while the held direction pushes into
/// the wall.
fn try_jump(actor: &mut Actor, intents: Intents, config: &PhysicsConfig) -> Option<JumpKind> {
    if actor.on_ground {
        actor.velocity.y = -config.jump_power;
        actor.on_ground = false;
        actor.jump_released = false;
        return Some(JumpKind::Ground);
    }

    let (away, facing) = match actor.on_wall {
        WallSide::Left if !intents.left => (1.0, Facing::Right),
        WallSide::Right if !intents.right => (-1.0, Facing::Left),
        _ => return None,
    };

    let side = actor.on_wall;
    actor.velocity.x = away * config.wall_jump_power_x;
    actor.velocity.y = -config.wall_jump_power_y;
    actor.facing = facing;
    actor.on_wall = WallSide::None;
    actor.jump_released = false;

    tracing::debug!(?side, "wall jump");
    Some(JumpKind::Wall(side))
}

/// Edit-mode free flight: velocity straight from intents, clamped to the level.
fn fly(actor: &mut Actor, intents: Intents, grid: &TileGrid, config: &PhysicsConfig, ts: f32) {
    let mut velocity = Vec2::ZERO;
    if intents.left {
        velocity.x = -config.fly_speed;
    }
    if intents.right {
        velocity.x = config.fly_speed;
    }
    if intents.up {
        velocity.y = -config.fly_speed;
    }
    if intents.down {
        velocity.y = config.fly_speed;
    }
    actor.velocity = velocity;

    let size = actor.size();
    let max = Vec2::new(grid.pixel_width() - size.x, grid.pixel_height() - size.y);
    let next = actor.position.add(velocity.scale(ts));
    actor.position = Vec2::new(next.x.min(max.x).max(0.0), next.y.min(max.y).max(0.0));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::ActorMode;
    use crate::game::tile::TileKind;
    use proptest::prelude::*;

    fn config() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    /// 3 x 5 grid with a ground floor on the bottom row.
    fn floor_grid() -> TileGrid {
        let mut grid = TileGrid::new(3, 5);
        grid.fill_row(2, TileKind::Ground);
        grid
    }

    /// Actor whose hitbox rests on row 2 in the center column.
    fn resting_actor() -> Actor {
        let mut actor = Actor::new(Vec2::new(66.0, 0.0), &config());
        actor.set_hitbox_bottom(64.0);
        actor
    }

    #[test]
    fn test_default_config_matches_game_feel() {
        let cfg = config();
        assert_eq!(cfg.speed, 5.0);
        assert_eq!(cfg.friction, 0.8);
        assert_eq!(cfg.jump_power, 12.0);
        assert_eq!(cfg.gravity, 0.5);
        assert_eq!(cfg.terminal_velocity, 15.0);
        assert_eq!(cfg.wall_slide_speed, 2.0);
        assert!(cfg.wall_slide_speed < cfg.terminal_velocity);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let cfg: PhysicsConfig = serde_json::from_str(r#"{"gravity": 0.25}"#).unwrap();
        assert_eq!(cfg.gravity, 0.25);
        assert_eq!(cfg.speed, 5.0);
    }

    #[test]
    fn test_resting_actor_lands_in_one_step() {
        let mut grid = floor_grid();
        let mut actor = resting_actor();

        let report = update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);

        assert!(actor.on_ground);
        assert_eq!(actor.velocity.y, 0.0);
        assert_eq!(actor.hitbox().bottom(), 64.0);
        assert!(report.landed);
    }

    #[test]
    fn test_falling_actor_settles_on_floor() {
        let mut grid = floor_grid();
        let mut actor = Actor::new(Vec2::new(66.0, 32.0), &config());

        for _ in 0..60 {
            update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);
        }

        assert!(actor.on_ground);
        assert_eq!(actor.velocity.y, 0.0);
        assert_eq!(actor.hitbox().bottom(), 64.0);
    }

    #[test]
    fn test_walking_into_wall_stops_at_tile_edge() {
        let mut grid = floor_grid();
        grid.set(0, 3, TileKind::Brick);
        grid.set(1, 3, TileKind::Brick);

        let mut actor = resting_actor();
        actor.set_hitbox_right(95.0);
        actor.velocity.x = 2.0;

        update(&mut actor, Intents::right(), &mut grid, &config(), 1.0);

        assert_eq!(actor.on_wall, WallSide::Right);
        assert_eq!(actor.velocity.x, 0.0);
        assert_eq!(actor.hitbox().right(), 96.0);
        assert!(actor.on_ground);
    }

    #[test]
    fn test_ground_jump() {
        let mut grid = floor_grid();
        let mut actor = resting_actor();
        update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);

        let report = update(&mut actor, Intents::jump(), &mut grid, &config(), 1.0);

        assert_eq!(report.jump, Some(JumpKind::Ground));
        assert_eq!(actor.velocity.y, -12.0 + 0.5);
        assert!(!actor.on_ground);
        assert!(!actor.jump_released);
    }

    #[test]
    fn test_held_jump_does_not_repeat() {
        let mut grid = floor_grid();
        let mut actor = resting_actor();
        update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);
        actor.jump_released = false;

        let report = update(&mut actor, Intents::jump(), &mut grid, &config(), 1.0);
        assert_eq!(report.jump, None);
        assert!(actor.on_ground);

        update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);
        assert!(actor.jump_released);

        let report = update(&mut actor, Intents::jump(), &mut grid, &config(), 1.0);
        assert_eq!(report.jump, Some(JumpKind::Ground));
    }

    /// 6 x 6 grid with a brick wall down column 0 and actor flush against it, mid-air.
    fn wall_setup() -> (TileGrid, Actor) {
        let mut grid = TileGrid::new(6, 6);
        for row in 0..6 {
            grid.set(row, 0, TileKind::Brick);
        }
        let mut actor = Actor::new(Vec2::new(0.0, 64.0), &config());
        actor.set_hitbox_left(32.0);
        actor.on_wall = WallSide::Left;
        (grid, actor)
    }

    #[test]
    fn test_wall_jump_suppressed_when_pushing_into_wall() {
        let (mut grid, actor) = wall_setup();
        let pushing = Intents::left();

        let mut jumped = actor.clone();
        let report = update(&mut jumped, pushing.with_jump(), &mut grid.clone(), &config(), 1.0);

        let mut plain = actor;
        update(&mut plain, pushing, &mut grid, &config(), 1.0);

        assert_eq!(report.jump, None);
        assert_eq!(jumped.velocity, plain.velocity);
        assert_eq!(jumped.position, plain.position);
        assert_eq!(jumped.on_wall, WallSide::Left);
    }

    #[test]
    fn test_wall_jump_pushes_away() {
        let (mut grid, mut actor) = wall_setup();

        let report = update(&mut actor, Intents::jump(), &mut grid, &config(), 1.0);

        assert_eq!(report.jump, Some(JumpKind::Wall(WallSide::Left)));
        assert_eq!(actor.velocity.x, 18.0);
        assert_eq!(actor.velocity.y, -12.0 + 0.5);
        assert_eq!(actor.facing, Facing::Right);
        assert_eq!(actor.on_wall, WallSide::None);
    }

    #[test]
    fn test_wall_slide_caps_fall_speed() {
        let (mut grid, mut actor) = wall_setup();
        actor.velocity.y = 10.0;

        update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);

        assert_eq!(actor.velocity.y, 2.0);
        assert_eq!(actor.on_wall, WallSide::Left, "static probe keeps the wall");
        assert_eq!(actor.mode(), ActorMode::WallSliding);
    }

    #[test]
    fn test_terminal_velocity() {
        let mut grid = TileGrid::new(1, 1);
        let mut actor = Actor::new(Vec2::new(500.0, 500.0), &config());
        actor.velocity.y = 14.9;

        update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);
        assert_eq!(actor.velocity.y, 15.0);
    }

    #[test]
    fn test_left_beats_right_for_drive_and_facing() {
        let mut grid = TileGrid::new(1, 1);
        let mut actor = Actor::new(Vec2::new(500.0, 500.0), &config());
        let both = Intents { left: true, right: true, ..Intents::NONE };

        update(&mut actor, both, &mut grid, &config(), 1.0);

        assert_eq!(actor.facing, Facing::Left);
        assert!(actor.velocity.x < 0.0);
    }

    #[test]
    fn test_coin_counts_once() {
        let mut grid = TileGrid::new(3, 8);
        grid.set(1, 3, TileKind::Coin);
        let mut actor = Actor::new(Vec2::new(64.0, 32.0), &config());

        let mut collected = 0;
        for step in 0..40 {
            let intents = if step < 20 { Intents::right() } else { Intents::left() };
            actor.velocity.y = 0.0;
            actor.position.y = 32.0;
            collected += update(&mut actor, intents, &mut grid, &config(), 1.0).coins.len();
        }

        assert_eq!(collected, 1);
        assert_eq!(actor.coins, 1);
    }

    #[test]
    fn test_edit_fly_ignores_collision_and_clamps() {
        let mut grid = TileGrid::filled(4, 4, TileKind::Brick);
        let mut actor = Actor::new(Vec2::new(40.0, 40.0), &config());
        actor.set_edit_mode(true);

        let down_right = Intents { right: true, down: true, ..Intents::NONE };
        let report = update(&mut actor, down_right, &mut grid, &config(), 1.0);
        assert!(report.is_quiet());
        assert_eq!(actor.position, Vec2::new(48.0, 48.0));

        for _ in 0..100 {
            update(&mut actor, down_right, &mut grid, &config(), 1.0);
        }
        assert_eq!(actor.position, Vec2::new(128.0 - 28.0, 128.0 - 28.0));

        let up_left = Intents { left: true, up: true, ..Intents::NONE };
        for _ in 0..100 {
            update(&mut actor, up_left, &mut grid, &config(), 1.0);
        }
        assert_eq!(actor.position, Vec2::ZERO);
    }

    #[test]
    fn test_edit_fly_opposing_intents() {
        let mut grid = TileGrid::new(10, 10);
        let mut actor = Actor::new(Vec2::new(100.0, 100.0), &config());
        actor.set_edit_mode(true);

        let all = Intents { left: true, right: true, up: true, down: true, jump: false };
        update(&mut actor, all, &mut grid, &config(), 1.0);

        assert_eq!(actor.velocity, Vec2::new(8.0, 8.0));
    }

    proptest! {
        #[test]
        fn velocity_is_frame_rate_independent(
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            steps in 1u32..30,
            scale in 0.1f32..2.0,
        ) {
            let cfg = config();
            let mut coarse_grid = TileGrid::new(1, 1);
            let mut fine_grid = TileGrid::new(1, 1);

            let mut coarse = Actor::new(Vec2::new(5000.0, 5000.0), &cfg);
            coarse.velocity = Vec2::new(vx, vy);
            let mut fine = coarse.clone();

            for _ in 0..steps {
                update(&mut coarse, Intents::NONE, &mut coarse_grid, &cfg, scale);
            }
            for _ in 0..steps * 2 {
                update(&mut fine, Intents::NONE, &mut fine_grid, &cfg, scale / 2.0);
            }

            let tolerance = 1e-3;
            prop_assert!((coarse.velocity.x - fine.velocity.x).abs() < tolerance);
            prop_assert!((coarse.velocity.y - fine.velocity.y).abs() < tolerance);
        }

        #[test]
        fn flight_displacement_is_frame_rate_independent(
            bits in 0u8..16,
            steps in 1u32..30,
            scale in 0.1f32..2.0,
        ) {
            let cfg = config();
            let grid = TileGrid::new(100, 100);
            let intents = Intents::from_bits(bits);

            let mut coarse = Actor::new(Vec2::new(1600.0, 1600.0), &cfg);
            coarse.set_edit_mode(true);
            let mut fine = coarse.clone();

            for _ in 0..steps {
                update(&mut coarse, intents, &mut grid.clone(), &cfg, scale);
            }
            for _ in 0..steps * 2 {
                update(&mut fine, intents, &mut grid.clone(), &cfg, scale / 2.0);
            }

            prop_assert!(coarse.position.distance_squared(fine.position) < 1e-3);
        }

        #[test]
        fn spike_contact_resets_to_spawn(
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
        ) {
            let mut grid = TileGrid::new(6, 10);
            grid.fill_row(3, TileKind::Spike);

            let mut actor = Actor::new(Vec2::new(32.0, 0.0), &config());
            actor.set_hitbox_left(150.0);
            actor.set_hitbox_top(100.0);
            actor.velocity = Vec2::new(vx, vy);

            let report = update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);

            prop_assert!(report.spiked);
            prop_assert_eq!(actor.position, actor.spawn);
            prop_assert_eq!(actor.velocity, Vec2::ZERO);
            prop_assert_eq!(actor.respawns, 1);
        }

        #[test]
        fn falling_actor_always_lands_flush(
            start_y in 0.0f32..250.0,
            vy in 0.0f32..15.0,
        ) {
            let mut grid = TileGrid::new(10, 5);
            grid.fill_row(9, TileKind::Ground);

            let mut actor = Actor::new(Vec2::new(66.0, start_y), &config());
            actor.velocity.y = vy;

            for _ in 0..200 {
                update(&mut actor, Intents::NONE, &mut grid, &config(), 1.0);
                if actor.on_ground {
                    break;
                }
            }

            prop_assert!(actor.on_ground);
            prop_assert_eq!(actor.velocity.y, 0.0);
            prop_assert_eq!(actor.hitbox().bottom(), 288.0);
        }
    }
}
