//! Worm Artillery - turn-based artillery on destructible terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, worms, turns, AI)
//! - `terrain_config`: Terrain exchange format and generation parameters
//! - `settings`: Match configuration
//! - `stats`: Match-result records and aggregate statistics
//! - `advice`: Situational analysis over the live snapshot

pub mod advice;
pub mod error;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod terrain_config;

pub use error::{StoreError, TerrainConfigError};
pub use settings::{OpponentKind, Settings};
pub use stats::{MatchLog, MatchRecord, MatchRecorder, MatchResult};

use glam::Vec2;

/// Game configuration constants
///
/// Time is measured in frames of a 60 Hz clock; velocities are pixels per
/// frame and accelerations pixels per frame squared.
pub mod consts {
    /// Frames per simulated second
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// Fixed simulation timestep (one frame)
    pub const SIM_DT: f32 = 1.0;

    /// World dimensions in cells (one cell = one pixel)
    pub const WORLD_WIDTH: usize = 1600;
    pub const WORLD_HEIGHT: usize = 800;
    /// Water line; anything at or below drowns
    pub const WATER_Y: f32 = 760.0;
    pub const WATER_ROW: usize = 760;

    /// Valid band for generated surface heights
    pub const MIN_SURFACE_Y: f32 = 100.0;
    pub const MAX_SURFACE_Y: f32 = 750.0;

    /// Downward acceleration
    pub const GRAVITY: f32 = 0.15;
    /// Horizontal acceleration per unit of wind
    pub const WIND_FACTOR: f32 = 0.003;
    /// Wind magnitude bound
    pub const WIND_LIMIT: f32 = 8.0;
    /// Initial wind spread (uniform in ±half of this)
    pub const WIND_INITIAL_SPREAD: f32 = 10.0;
    /// Per-turn wind perturbation (uniform in ±half of this)
    pub const WIND_TURN_SPREAD: f32 = 3.0;

    /// Teams and rosters
    pub const TEAM_COUNT: usize = 2;
    pub const WORMS_PER_TEAM: usize = 3;
    pub const TEAM_NAMES: [&str; TEAM_COUNT] = ["RED", "BLU"];

    /// Turn timing (seconds)
    pub const TURN_TIME_SECS: f32 = 30.0;
    pub const TURN_BANNER_SECS: f32 = 1.2;
    pub const NEXT_TURN_DELAY_SECS: f32 = 0.6;

    /// Worm defaults
    pub const WORM_START_HP: i32 = 100;
    pub const WORM_HALF_WIDTH: f32 = 10.0;
    pub const WORM_HALF_HEIGHT: f32 = 14.0;
    /// Horizontal distance covered by one walk step
    pub const MOVE_SPEED: f32 = 1.5;
    pub const JUMP_VELOCITY: f32 = -4.5;
    /// Walk steps available per turn
    pub const MOVE_BUDGET: u32 = 120;
    pub const JUMP_COST: u32 = 20;
    /// Cells a worm may climb in a single step
    pub const STEP_UP_LIMIT: u32 = 6;
    /// Cells a walking worm snaps down before it starts falling
    pub const SNAP_DOWN_LIMIT: u32 = 8;
    /// Walking keeps worms this far from the world edges
    pub const WALK_EDGE_MARGIN: f32 = 5.0;
    pub const FALL_DAMAGE_THRESHOLD: f32 = 40.0;
    pub const FALL_DAMAGE_FACTOR: f32 = 0.8;
    /// Speed under which a worm counts as stopped
    pub const SETTLE_EPSILON: f32 = 0.1;

    /// Projectiles
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 50.0;
    /// Frames after launch during which a projectile ignores its own team
    pub const SAME_TEAM_GRACE_FRAMES: f32 = 10.0;
    /// Launch point above the worm's position
    pub const MUZZLE_OFFSET: f32 = 10.0;
    pub const TRAIL_LENGTH: usize = 20;
    pub const BOUNCE_RESTITUTION: f32 = 0.5;
    pub const BOUNCE_FRICTION: f32 = 0.7;
    pub const BOUNCE_STOP_SPEED: f32 = 0.5;

    /// Explosions
    pub const EXPLOSION_DURATION_FRAMES: f32 = 25.0;
    /// Damage reaches zero at this multiple of the blast radius
    pub const BLAST_REACH: f32 = 1.5;
    pub const KNOCKBACK_FORCE: f32 = 6.0;
    pub const KNOCKBACK_LIFT: f32 = 3.0;
    pub const DEATH_BLAST_RADIUS: f32 = 15.0;
}

/// Convert seconds to simulation frames
#[inline]
pub fn secs_to_frames(secs: f32) -> f32 {
    secs * consts::FRAMES_PER_SECOND
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Manhattan distance between two points
#[inline]
pub fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
