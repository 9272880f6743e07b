//! Worm kinematics
//!
//! Worms are points with a fixed hit box. Airborne worms fall under gravity
//! and land with fall damage; grounded worms walk cell by cell.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::TerrainField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worm {
    pub id: u32,
    pub name: String,
    pub team: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    pub alive: bool,
    pub grounded: bool,
    /// Y where the current fall began
    pub fall_origin: f32,
}

/// Something that happened to a worm during `step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WormEvent {
    Landed { id: u32, damage: i32 },
    Drowned { id: u32, pos: Vec2 },
    Died { id: u32, pos: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkResult {
    Moved,
    Blocked,
    StartedFalling,
}

/// Fall damage for a drop of `distance` pixels
pub fn fall_damage(distance: f32) -> i32 {
    if distance > FALL_DAMAGE_THRESHOLD {
        ((distance - FALL_DAMAGE_THRESHOLD) * FALL_DAMAGE_FACTOR).floor() as i32
    } else {
        0
    }
}

impl Worm {
    pub fn new(id: u32, name: String, team: usize, pos: Vec2) -> Self {
        Self {
            id,
            name,
            team,
            pos,
            vel: Vec2::ZERO,
            hp: WORM_START_HP,
            alive: true,
            grounded: true,
            fall_origin: pos.y,
        }
    }

    /// Point-in-hit-box test
    pub fn hit_by(&self, p: Vec2) -> bool {
        (p.x - self.pos.x).abs() < WORM_HALF_WIDTH && (p.y - self.pos.y).abs() < WORM_HALF_HEIGHT
    }

    /// Grounded and not sliding
    pub fn is_settled(&self) -> bool {
        !self.alive
            || (self.grounded && self.vel.x.abs() <= SETTLE_EPSILON && self.vel.y.abs() <= SETTLE_EPSILON)
    }

    /// Leave the ground, starting a fall measured from the current height
    pub fn launch(&mut self) {
        self.grounded = false;
        self.fall_origin = self.pos.y;
    }

    pub fn jump(&mut self) -> bool {
        if !self.alive || !self.grounded {
            return false;
        }
        self.vel.y = JUMP_VELOCITY;
        self.launch();
        true
    }

    /// One walk step of `MOVE_SPEED` in `dir` (sign only)
    pub fn walk(&mut self, dir: f32, terrain: &TerrainField) -> WalkResult {
        if !self.alive || !self.grounded || dir == 0.0 || !dir.is_finite() {
            return WalkResult::Blocked;
        }
        let nx = self.pos.x + dir.signum() * MOVE_SPEED;
        let y = self.pos.y;

        let result = if terrain.is_solid(nx, y) {
            let step = (1..=STEP_UP_LIMIT)
                .map(|up| up as f32)
                .find(|&up| !terrain.is_solid(nx, y - up) && terrain.is_solid(nx, y - up + 1.0));
            match step {
                Some(up) => {
                    self.pos = Vec2::new(nx, y - up);
                    WalkResult::Moved
                }
                None => return WalkResult::Blocked,
            }
        } else {
            self.pos.x = nx;
            let drop = (1..=SNAP_DOWN_LIMIT)
                .map(|d| d as f32)
                .find(|&d| terrain.is_solid(nx, y + d));
            match drop {
                Some(d) => {
                    self.pos.y = y + d - 1.0;
                    WalkResult::Moved
                }
                None => {
                    self.launch();
                    WalkResult::StartedFalling
                }
            }
        };
        self.pos.x = self.pos.x.clamp(WALK_EDGE_MARGIN, terrain.width as f32 - WALK_EDGE_MARGIN);
        result
    }

    fn land(&mut self, events: &mut Vec<WormEvent>) {
        let damage = fall_damage(self.pos.y - self.fall_origin);
        if damage > 0 {
            self.hp -= damage;
        }
        self.vel.y = 0.0;
        self.vel.x *= 0.3;
        if self.vel.x.abs() < SETTLE_EPSILON {
            self.vel.x = 0.0;
        }
        self.grounded = true;
        events.push(WormEvent::Landed { id: self.id, damage });
    }

    /// Advance physics by `dt` frames
    pub fn step(&mut self, dt: f32, terrain: &TerrainField, events: &mut Vec<WormEvent>) {
        if !self.alive {
            return;
        }

        if self.pos.y >= WATER_Y {
            self.alive = false;
            self.hp = 0;
            self.grounded = true;
            self.vel = Vec2::ZERO;
            log::debug!("{} drowned", self.name);
            events.push(WormEvent::Drowned {
                id: self.id,
                pos: self.pos,
            });
            return;
        }

        if !self.grounded {
            self.vel.y += GRAVITY * dt;
            let prev_x = self.pos.x;
            self.pos += self.vel * dt;

            if terrain.is_solid(self.pos.x, self.pos.y) {
                let free = (1..=STEP_UP_LIMIT)
                    .map(|n| n as f32)
                    .find(|&n| !terrain.is_solid(self.pos.x, self.pos.y - n));
                match free {
                    Some(n) => self.pos.y -= n,
                    None => {
                        self.pos.x = prev_x;
                        self.vel.x = 0.0;
                    }
                }
                if terrain.is_solid(self.pos.x, self.pos.y + 1.0) {
                    self.land(events);
                }
            } else if terrain.is_solid(self.pos.x, self.pos.y + 1.0) && self.vel.y >= 0.0 {
                self.land(events);
            }
        } else if !terrain.is_solid(self.pos.x, self.pos.y + 1.0) && !terrain.is_solid(self.pos.x, self.pos.y + 2.0) {
            self.launch();
        } else if self.vel.x != 0.0 {
            // Residual slide left over from landing
            self.vel.x *= 0.3;
            if self.vel.x.abs() < SETTLE_EPSILON {
                self.vel.x = 0.0;
            }
        }

        self.clamp_to_world(terrain);

        if self.hp <= 0 {
            self.alive = false;
            self.hp = 0;
            log::debug!("{} died", self.name);
            events.push(WormEvent::Died {
                id: self.id,
                pos: self.pos,
            });
        }
    }

    fn clamp_to_world(&mut self, terrain: &TerrainField) {
        if !self.pos.x.is_finite() {
            self.pos.x = terrain.width as f32 / 2.0;
            self.vel.x = 0.0;
        }
        if !self.pos.y.is_finite() {
            self.pos.y = 0.0;
            self.vel.y = 0.0;
        }
        if !self.vel.is_finite() {
            self.vel = Vec2::ZERO;
        }
        self.pos.x = self.pos.x.clamp(0.0, terrain.width as f32 - 1.0);
        self.pos.y = self.pos.y.clamp(0.0, terrain.height as f32);
    }
}
