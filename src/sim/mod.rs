//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by worm index, then spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod aim;
pub mod effects;
pub mod explosion;
pub mod projectile;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod theme;
pub mod tick;
pub mod weapon;
pub mod worm;

pub use ai::AiPlan;
pub use aim::{FireCommand, drag_to_command, preview_trajectory};
pub use effects::{FloatingText, Particle, ParticleKind, update_effects};
pub use explosion::{BlastHit, Explosion, blast_damage, resolve_blast};
pub use projectile::{Payload, Projectile, ProjectileOutcome};
pub use schedule::{Schedule, Scheduled};
pub use snapshot::{Snapshot, WormSnapshot};
pub use state::{FireRejection, GameEvent, MatchState, Outcome, TurnPhase};
pub use terrain::{DirtyRect, FloatingIslands, TerrainField, TerrainPostProcess};
pub use theme::{Theme, ThemeProfile};
pub use tick::{TickInput, tick};
pub use weapon::{Ammo, AmmoBelt, BOMBLET_FLIGHT, Flight, MISSILE_FLIGHT, Weapon, WeaponClass, WeaponKind};
pub use worm::{WalkResult, Worm, WormEvent};
