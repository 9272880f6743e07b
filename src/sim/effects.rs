//! Cosmetic particles and floating texts
//!
//! Nothing here feeds back into physics or the settle check.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// Live particle cap; oldest are dropped first
pub const MAX_PARTICLES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Fire,
    Spark,
    Dirt,
    Splash,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub life: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    /// Owning team for colouring, `None` for neutral messages
    pub team: Option<usize>,
    pub age: f32,
    pub duration: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, team: Option<usize>, duration: f32) -> Self {
        Self {
            pos,
            text: text.into(),
            team,
            age: 0.0,
            duration,
        }
    }
}

/// Age particles and texts, dropping expired ones
pub fn update_effects(particles: &mut Vec<Particle>, texts: &mut Vec<FloatingText>, dt: f32) {
    for p in particles.iter_mut() {
        p.vel.y += GRAVITY * 0.5 * dt;
        p.pos += p.vel * dt;
        p.age += dt;
    }
    particles.retain(|p| p.age < p.life);

    for t in texts.iter_mut() {
        t.age += dt;
        t.pos.y -= 0.5 * dt;
    }
    texts.retain(|t| t.age < t.duration);
}

fn push_capped(particles: &mut Vec<Particle>, p: Particle) {
    if particles.len() >= MAX_PARTICLES {
        particles.remove(0);
    }
    particles.push(p);
}

/// Fireball and dirt burst for an explosion
pub fn spawn_explosion_particles(particles: &mut Vec<Particle>, pos: Vec2, rng: &mut Pcg32) {
    for i in 0..20 {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = 1.0 + rng.random::<f32>() * 4.0;
        let vel = crate::polar_to_cartesian(speed, angle) + Vec2::new(0.0, -2.0);
        push_capped(
            particles,
            Particle {
                kind: if i % 2 == 0 {
                    ParticleKind::Fire
                } else {
                    ParticleKind::Spark
                },
                pos,
                vel,
                age: 0.0,
                life: 18.0 + rng.random::<f32>() * 30.0,
                size: 2.0 + rng.random::<f32>() * 3.0,
            },
        );
    }
    for _ in 0..15 {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = 1.0 + rng.random::<f32>() * 3.0;
        let vel = crate::polar_to_cartesian(speed, angle) + Vec2::new(0.0, -3.0);
        push_capped(
            particles,
            Particle {
                kind: ParticleKind::Dirt,
                pos,
                vel,
                age: 0.0,
                life: 30.0 + rng.random::<f32>() * 42.0,
                size: 2.0 + rng.random::<f32>() * 4.0,
            },
        );
    }
}

/// Upward spray where something hit the water
pub fn spawn_splash(particles: &mut Vec<Particle>, pos: Vec2, rng: &mut Pcg32) {
    for _ in 0..12 {
        let angle = -std::f32::consts::PI * (0.1 + rng.random::<f32>() * 0.8);
        let speed = 1.0 + rng.random::<f32>() * 3.0;
        let mut vel = crate::polar_to_cartesian(speed, angle);
        if rng.random::<bool>() {
            vel.x = -vel.x;
        }
        push_capped(
            particles,
            Particle {
                kind: ParticleKind::Splash,
                pos,
                vel,
                age: 0.0,
                life: 18.0 + rng.random::<f32>() * 24.0,
                size: 2.0 + rng.random::<f32>() * 3.0,
            },
        );
    }
}
