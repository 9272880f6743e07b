//! Explosions: blast damage, knockback and the visual fireball lifetime

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Worm;

/// Expanding fireball; purely visual once the blast is resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub age: f32,
    pub duration: f32,
}

impl Explosion {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            age: 0.0,
            duration: EXPLOSION_DURATION_FRAMES,
        }
    }

    /// Age the fireball; false once it has burnt out
    pub fn advance(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age < self.duration
    }

    /// 0..1 progress for renderers
    pub fn progress(&self) -> f32 {
        (self.age / self.duration).clamp(0.0, 1.0)
    }
}

/// Damage multiplier at distance `d` from a blast of radius `r`
pub fn blast_falloff(d: f32, r: f32) -> f32 {
    let reach = r * BLAST_REACH;
    if reach <= 0.0 {
        return 0.0;
    }
    (1.0 - d / reach).max(0.0)
}

pub fn blast_damage(damage: i32, d: f32, r: f32) -> i32 {
    (damage as f32 * blast_falloff(d, r)).floor() as i32
}

/// A worm caught in a blast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastHit {
    pub worm_id: u32,
    pub damage: i32,
    pub pos: Vec2,
}

/// Apply damage and knockback to every living worm in reach
pub fn resolve_blast(center: Vec2, radius: f32, damage: i32, worms: &mut [Worm]) -> Vec<BlastHit> {
    let reach = radius * BLAST_REACH;
    let mut hits = Vec::new();
    for w in worms.iter_mut().filter(|w| w.alive) {
        let delta = w.pos - center;
        let dist = delta.length();
        if dist >= reach {
            continue;
        }
        let factor = blast_falloff(dist, radius);
        let dmg = blast_damage(damage, dist, radius);
        w.hp -= dmg;

        let angle = delta.y.atan2(delta.x);
        let push = crate::polar_to_cartesian(KNOCKBACK_FORCE * factor, angle);
        w.vel += push + Vec2::new(0.0, -KNOCKBACK_LIFT * factor);
        w.launch();

        hits.push(BlastHit {
            worm_id: w.id,
            damage: dmg,
            pos: w.pos,
        });
    }
    hits
}
