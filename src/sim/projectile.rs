//! Projectile integration
//!
//! Each tick a projectile moves under gravity (and wind, if sensitive),
//! then resolves against bounds, water, terrain, its fuse and worms in
//! that order. The caller turns `Exploded` into a blast.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::secs_to_frames;
use crate::sim::{Flight, TerrainField, WeaponKind, Worm};

/// What the projectile does when it goes off
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub blast_radius: f32,
    pub damage: i32,
    /// Bomblets released after detonation
    pub cluster: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub team: usize,
    pub weapon: WeaponKind,
    pub payload: Payload,
    pub wind: bool,
    /// Frames since launch
    pub age: f32,
    /// Frames until detonation; 0 detonates on contact
    pub fuse: f32,
    pub bounces_left: u32,
    /// Sitting on terrain waiting for the fuse
    pub resting: bool,
    /// Recent positions, newest first
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    Flying,
    Bounced,
    Resting,
    Exploded,
    OutOfBounds,
    Submerged,
}

impl ProjectileOutcome {
    /// The projectile is gone after this outcome
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProjectileOutcome::Exploded | ProjectileOutcome::OutOfBounds | ProjectileOutcome::Submerged
        )
    }
}

impl Projectile {
    pub fn new(
        id: u32,
        pos: Vec2,
        vel: Vec2,
        team: usize,
        weapon: WeaponKind,
        payload: Payload,
        flight: &Flight,
    ) -> Self {
        Self {
            id,
            pos,
            vel,
            team,
            weapon,
            payload,
            wind: flight.wind,
            age: 0.0,
            fuse: secs_to_frames(flight.fuse_secs),
            bounces_left: flight.bounces,
            resting: false,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    fn fuse_expired(&self) -> bool {
        self.fuse > 0.0 && self.age >= self.fuse
    }

    /// Advance one step of `dt` frames
    pub fn advance(&mut self, dt: f32, wind: f32, terrain: &TerrainField, worms: &[Worm]) -> ProjectileOutcome {
        self.age += dt;
        self.trail.insert(0, self.pos);
        self.trail.truncate(TRAIL_LENGTH);

        self.vel.y += GRAVITY * dt;
        if self.wind {
            self.vel.x += wind * WIND_FACTOR * dt;
        }
        self.pos += self.vel * dt;

        let w = terrain.width as f32;
        let h = terrain.height as f32;
        if self.pos.x < -OUT_OF_BOUNDS_MARGIN
            || self.pos.x > w + OUT_OF_BOUNDS_MARGIN
            || self.pos.y > h + OUT_OF_BOUNDS_MARGIN
            || !self.pos.is_finite()
        {
            return ProjectileOutcome::OutOfBounds;
        }

        if self.pos.y >= WATER_Y {
            return ProjectileOutcome::Submerged;
        }

        if terrain.is_solid(self.pos.x, self.pos.y) {
            if self.bounces_left > 0 {
                self.bounces_left -= 1;
                self.pos.y -= self.vel.y * dt;
                self.vel.y *= -BOUNCE_RESTITUTION;
                self.vel.x *= BOUNCE_FRICTION;
                if self.vel.x.abs() < BOUNCE_STOP_SPEED && self.vel.y.abs() < BOUNCE_STOP_SPEED {
                    self.bounces_left = 0;
                }
                return ProjectileOutcome::Bounced;
            }
            if self.fuse <= 0.0 || self.fuse_expired() {
                return ProjectileOutcome::Exploded;
            }
            self.vel = Vec2::ZERO;
            while terrain.is_solid(self.pos.x, self.pos.y) && self.pos.y > 0.0 {
                self.pos.y -= 1.0;
            }
            self.resting = true;
            return ProjectileOutcome::Resting;
        }

        if self.fuse_expired() {
            return ProjectileOutcome::Exploded;
        }

        for worm in worms.iter().filter(|w| w.alive) {
            if worm.team == self.team && self.age < SAME_TEAM_GRACE_FRAMES {
                continue;
            }
            if worm.hit_by(self.pos) {
                if self.fuse > 0.0 && self.age < self.fuse {
                    continue;
                }
                return ProjectileOutcome::Exploded;
            }
        }

        ProjectileOutcome::Flying
    }
}
