//! Match state
//!
//! `MatchState` owns everything a match needs: terrain, worms, projectiles,
//! the turn machine and the action queue. `tick` drives it; the methods here
//! are the transitions the tick loop and callers invoke.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::error::TerrainConfigError;
use crate::secs_to_frames;
use crate::settings::Settings;
use crate::sim::effects::{spawn_explosion_particles, spawn_splash};
use crate::sim::{
    ai, resolve_blast, AmmoBelt, DirtyRect, Explosion, FireCommand, FloatingIslands, FloatingText,
    Particle, Payload, Projectile, Schedule, Scheduled, Snapshot, TerrainField, TerrainPostProcess,
    Theme, WeaponClass, WeaponKind, Worm, WormSnapshot, BOMBLET_FLIGHT,
};
use crate::stats::{MatchRecord, MatchRecorder, MatchResult};
use crate::terrain_config::TerrainConfig;

/// Delay between a detonation and its cluster bomblets (seconds)
pub const CLUSTER_DELAY_SECS: f32 = 0.1;
/// Launch speeds above this multiple of the weapon's speed are clamped
pub const MAX_POWER_FACTOR: f32 = 1.2;
/// Angular jitter per shotgun pellet, total width in radians
pub const PELLET_SPREAD: f32 = 0.15;
/// Worm placement keeps this far from the world edges
pub const PLACEMENT_MARGIN: f32 = 120.0;

/// Turn machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnPhase {
    /// Nothing loaded yet
    Menu,
    /// Terrain chosen, worms not yet placed
    TerrainSetup,
    /// Short pause between one turn ending and the next starting
    Intermission,
    /// Banner showing for the acting team
    TurnStart,
    /// Acting worm may move, aim and fire
    PlayerInput,
    /// Shot in flight
    Firing,
    /// Waiting for worms and debris to come to rest
    Settling,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(usize),
    Draw,
}

/// Why a fire request was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireRejection {
    #[error("not accepting input in this phase")]
    WrongPhase,
    #[error("already fired this turn")]
    AlreadyFired,
    #[error("no ammo left for this weapon")]
    NoAmmo,
    #[error("no living active worm")]
    NoActiveWorm,
    #[error("command does not fit the selected weapon")]
    Unsupported,
    #[error("aim is not a finite, non-negative vector")]
    InvalidAim,
}

/// Observable things that happened, drained by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MatchStarted { theme: Theme, worms: usize },
    TurnBanner { team: usize, worm: u32, wind: f32 },
    InputOpened { team: usize, worm: u32 },
    Fired { team: usize, worm: u32, weapon: WeaponKind },
    FireRejected { reason: FireRejection },
    Exploded { pos: Vec2, radius: f32 },
    WormDamaged { id: u32, damage: i32 },
    WormDrowned { id: u32 },
    WormDied { id: u32 },
    Splash { pos: Vec2 },
    TerrainCarved(DirtyRect),
    TurnTimedOut { team: usize },
    TurnEnded { team: usize },
    MatchEnded { outcome: Outcome },
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub settings: Settings,
    pub theme: Theme,
    pub terrain: TerrainField,
    /// Terrain came from an external config rather than the generator
    pub custom_terrain: bool,

    pub worms: Vec<Worm>,
    /// Per-team indices into `worms`, in turn order
    pub teams: [Vec<usize>; TEAM_COUNT],
    pub current_team: usize,
    /// Per-team position in its roster
    pub current_index: [usize; TEAM_COUNT],
    /// Index into `worms` of the acting worm
    pub active: Option<usize>,

    pub phase: TurnPhase,
    pub paused: bool,
    /// Turns started so far; stale AI actions compare against it
    pub turn: u32,
    pub wind: f32,
    pub ammo: [AmmoBelt; TEAM_COUNT],
    pub selected_weapon: WeaponKind,
    pub has_fired: bool,
    /// Walk steps left this turn
    pub move_budget: u32,
    /// Seconds on the turn clock
    pub turn_time_left: f32,

    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub schedule: Schedule,

    /// Virtual match clock in frames; frozen while paused
    pub clock: f64,
    pub time_ticks: u64,
    pub rng: Pcg32,
    pub events: Vec<GameEvent>,
    pub outcome: Option<Outcome>,
    match_record: Option<MatchRecord>,
    next_id: u32,
}

impl MatchState {
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            theme: settings.theme,
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            terrain: TerrainField::empty(WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW),
            custom_terrain: false,
            worms: Vec::new(),
            teams: [Vec::new(), Vec::new()],
            current_team: 0,
            current_index: [0; TEAM_COUNT],
            active: None,
            phase: TurnPhase::Menu,
            paused: false,
            turn: 0,
            wind: 0.0,
            ammo: [AmmoBelt::full(), AmmoBelt::full()],
            selected_weapon: WeaponKind::Bazooka,
            has_fired: false,
            move_budget: MOVE_BUDGET,
            turn_time_left: 0.0,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            schedule: Schedule::new(),
            clock: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            outcome: None,
            match_record: None,
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the terrain with a validated external config
    ///
    /// Only allowed before the match starts; an invalid config leaves the
    /// current field untouched.
    pub fn load_terrain(&mut self, config: &TerrainConfig) -> Result<(), TerrainConfigError> {
        if !matches!(self.phase, TurnPhase::Menu | TurnPhase::TerrainSetup) {
            log::warn!("Rejected terrain config after match start");
            return Err(TerrainConfigError::MatchInProgress);
        }
        let field = TerrainField::load_from_config(config).inspect_err(|e| {
            log::warn!("Rejected terrain config: {e}");
        })?;
        self.theme = config.theme()?;
        self.terrain = field;
        self.custom_terrain = true;
        self.phase = TurnPhase::TerrainSetup;
        log::info!("Loaded custom terrain ({})", self.theme.display_name());
        Ok(())
    }

    /// Generate terrain if needed, place worms and start the first turn
    pub fn start(&mut self) {
        if !matches!(self.phase, TurnPhase::Menu | TurnPhase::TerrainSetup) {
            return;
        }
        self.phase = TurnPhase::TerrainSetup;
        if !self.custom_terrain {
            let profile = self.theme.profile();
            let post = FloatingIslands;
            let post: Option<&dyn TerrainPostProcess> = if self.theme.floating_islands() {
                Some(&post)
            } else {
                None
            };
            self.terrain = TerrainField::generate(&profile.params, profile.random_plateaus, post, &mut self.rng);
        }
        self.place_worms();
        self.wind = (self.rng.random::<f32>() - 0.5) * WIND_INITIAL_SPREAD;
        self.current_team = 0;
        self.current_index = [0; TEAM_COUNT];
        log::info!(
            "Match started on {} with {} worms per team (seed {})",
            self.theme.display_name(),
            self.settings.worms_per_team,
            self.settings.seed
        );
        self.events.push(GameEvent::MatchStarted {
            theme: self.theme,
            worms: self.worms.len(),
        });
        self.begin_turn();
    }

    fn place_worms(&mut self) {
        self.worms.clear();
        self.teams = [Vec::new(), Vec::new()];

        let per_team = self.settings.worms_per_team;
        let slots = per_team * TEAM_COUNT;
        let spacing = (self.terrain.width as f32 - PLACEMENT_MARGIN * 2.0) / slots as f32;
        let mut positions: Vec<f32> = (0..slots)
            .map(|i| PLACEMENT_MARGIN + spacing * i as f32 + self.rng.random::<f32>() * spacing * 0.5)
            .collect();
        positions.shuffle(&mut self.rng);

        for i in 0..per_team {
            for team in 0..TEAM_COUNT {
                let x = positions[team * per_team + i];
                let x = self
                    .terrain
                    .nearest_ground_column(x, (spacing / 2.0) as usize)
                    .unwrap_or(x);
                let y = self.terrain.surface_y(x) - 1.0;
                let id = self.worms.len() as u32;
                let name = format!("{} {}", TEAM_NAMES[team], self.teams[team].len() + 1);
                self.worms.push(Worm::new(id, name, team, Vec2::new(x, y)));
                self.teams[team].push(self.worms.len() - 1);
            }
        }
    }

    pub fn active_worm(&self) -> Option<&Worm> {
        self.active.and_then(|i| self.worms.get(i))
    }

    pub fn living(&self, team: usize) -> usize {
        self.teams[team].iter().filter(|&&i| self.worms[i].alive).count()
    }

    /// Activate the next living worm of the acting team
    pub fn begin_turn(&mut self) {
        let team = self.current_team;
        let roster_len = self.teams[team].len();
        let mut found = None;
        for _ in 0..roster_len {
            let idx = self.teams[team][self.current_index[team]];
            if self.worms[idx].alive {
                found = Some(idx);
                break;
            }
            self.current_index[team] = (self.current_index[team] + 1) % roster_len;
        }
        let Some(idx) = found else {
            self.active = None;
            self.check_game_over();
            return;
        };

        self.turn += 1;
        self.active = Some(idx);
        self.has_fired = false;
        self.move_budget = MOVE_BUDGET;
        self.turn_time_left = self.settings.turn_time_secs;
        self.wind = (self.wind + (self.rng.random::<f32>() - 0.5) * WIND_TURN_SPREAD).clamp(-WIND_LIMIT, WIND_LIMIT);
        if !self.ammo[team].available(self.selected_weapon) {
            self.selected_weapon = WeaponKind::Bazooka;
        }
        self.phase = TurnPhase::TurnStart;

        let worm = &self.worms[idx];
        log::info!("Turn {}: {} (wind {:+.1})", self.turn, worm.name, self.wind);
        self.events.push(GameEvent::TurnBanner {
            team,
            worm: worm.id,
            wind: self.wind,
        });
        self.schedule.push(
            self.clock + secs_to_frames(self.settings.banner_delay_secs) as f64,
            Scheduled::EnterPlayerInput,
        );
    }

    /// Open the input window; CPU teams queue their shot here
    pub fn enter_player_input(&mut self) {
        let Some(idx) = self.active else {
            self.phase = TurnPhase::Settling;
            return;
        };
        self.phase = TurnPhase::PlayerInput;
        self.turn_time_left = self.settings.turn_time_secs;
        let team = self.current_team;
        self.events.push(GameEvent::InputOpened {
            team,
            worm: self.worms[idx].id,
        });

        if self.settings.is_cpu(team) {
            let me = self.worms[idx].clone();
            match ai::plan_turn(&self.worms, &me, &self.ammo[team], &mut self.rng) {
                Some(plan) => {
                    self.selected_weapon = plan.weapon;
                    let delay = secs_to_frames(ai::thinking_delay(&mut self.rng)) as f64;
                    self.schedule
                        .push(self.clock + delay, Scheduled::AiFire { turn: self.turn, plan });
                }
                None => self.phase = TurnPhase::Settling,
            }
        }
    }

    pub fn select_weapon(&mut self, weapon: WeaponKind) -> bool {
        if self.phase != TurnPhase::PlayerInput || self.has_fired {
            return false;
        }
        self.selected_weapon = weapon;
        true
    }

    fn reject(&mut self, reason: FireRejection) -> Result<(), FireRejection> {
        log::debug!("Fire rejected: {reason}");
        self.events.push(GameEvent::FireRejected { reason });
        Err(reason)
    }

    fn commit_shot(&mut self, team: usize, weapon: WeaponKind) {
        self.ammo[team].consume(weapon);
        self.has_fired = true;
        self.phase = TurnPhase::Firing;
    }

    /// Fire the selected weapon for the active worm
    pub fn fire(&mut self, command: FireCommand) -> Result<(), FireRejection> {
        if self.phase != TurnPhase::PlayerInput {
            return self.reject(FireRejection::WrongPhase);
        }
        if self.has_fired {
            return self.reject(FireRejection::AlreadyFired);
        }
        let Some(idx) = self.active.filter(|&i| self.worms[i].alive) else {
            return self.reject(FireRejection::NoActiveWorm);
        };
        let team = self.current_team;
        let weapon = self.selected_weapon;
        if !self.ammo[team].available(weapon) {
            return self.reject(FireRejection::NoAmmo);
        }
        let spec = weapon.spec();

        let worm_pos = self.worms[idx].pos;
        let muzzle = worm_pos - Vec2::new(0.0, MUZZLE_OFFSET);
        let flight = spec.projectile_flight();
        let payload = Payload {
            blast_radius: spec.blast_radius,
            damage: spec.damage,
            cluster: 0,
        };
        let valid_launch = |angle: f32, speed: f32| angle.is_finite() && speed.is_finite() && speed >= 0.0;

        match (spec.class, command) {
            (WeaponClass::Ballistic { cluster, .. }, FireCommand::Launch { angle, speed }) => {
                if !valid_launch(angle, speed) {
                    return self.reject(FireRejection::InvalidAim);
                }
                self.commit_shot(team, weapon);
                let speed = speed.min(flight.speed * MAX_POWER_FACTOR);
                let vel = crate::polar_to_cartesian(speed, angle);
                let id = self.next_entity_id();
                let payload = Payload { cluster, ..payload };
                self.projectiles
                    .push(Projectile::new(id, muzzle, vel, team, weapon, payload, &flight));
            }
            (WeaponClass::MultiPellet { pellets, .. }, FireCommand::Launch { angle, speed }) => {
                if !valid_launch(angle, speed) {
                    return self.reject(FireRejection::InvalidAim);
                }
                self.commit_shot(team, weapon);
                let speed = speed.min(flight.speed * MAX_POWER_FACTOR);
                for _ in 0..pellets {
                    let spread = (self.rng.random::<f32>() - 0.5) * PELLET_SPREAD;
                    let pellet_speed = speed + self.rng.random::<f32>();
                    let vel = crate::polar_to_cartesian(pellet_speed, angle + spread);
                    let id = self.next_entity_id();
                    self.projectiles
                        .push(Projectile::new(id, muzzle, vel, team, weapon, payload, &flight));
                }
            }
            (WeaponClass::Placement { .. }, FireCommand::Place) => {
                self.commit_shot(team, weapon);
                let id = self.next_entity_id();
                self.projectiles
                    .push(Projectile::new(id, worm_pos, Vec2::ZERO, team, weapon, payload, &flight));
            }
            (
                WeaponClass::Staged {
                    missiles,
                    spread,
                    interval_secs,
                },
                FireCommand::Strike { x },
            ) => {
                if !x.is_finite() {
                    return self.reject(FireRejection::InvalidAim);
                }
                self.commit_shot(team, weapon);
                let x = x.clamp(0.0, self.terrain.width as f32);
                let bazooka = WeaponKind::Bazooka.spec();
                let payload = Payload {
                    blast_radius: bazooka.blast_radius,
                    damage: bazooka.damage,
                    cluster: 0,
                };
                for i in 0..missiles {
                    let px = if missiles > 1 {
                        x - spread / 2.0 + spread * i as f32 / (missiles - 1) as f32
                    } else {
                        x
                    };
                    let pos = Vec2::new(px, -30.0 - 20.0 * i as f32);
                    let vel = Vec2::new(0.0, flight.speed);
                    let id = self.next_entity_id();
                    let missile = Projectile::new(id, pos, vel, team, weapon, payload, &flight);
                    let due = self.clock + (secs_to_frames(interval_secs) * i as f32) as f64;
                    self.schedule.push(due, Scheduled::SpawnProjectile(Box::new(missile)));
                }
            }
            _ => return self.reject(FireRejection::Unsupported),
        }

        log::debug!("{} fired {}", self.worms[idx].name, spec.name);
        self.events.push(GameEvent::Fired {
            team,
            worm: self.worms[idx].id,
            weapon,
        });
        Ok(())
    }

    /// Resolve a blast: carve, damage, knockback and cluster release
    pub fn detonate(&mut self, pos: Vec2, payload: Payload, team: usize) {
        if let Some(rect) = self.terrain.carve(pos.x, pos.y, payload.blast_radius) {
            self.events.push(GameEvent::TerrainCarved(rect));
        }
        self.explosions.push(Explosion::new(pos, payload.blast_radius));
        spawn_explosion_particles(&mut self.particles, pos, &mut self.rng);
        self.events.push(GameEvent::Exploded {
            pos,
            radius: payload.blast_radius,
        });
        log::debug!("Explosion at ({:.0}, {:.0}) r={}", pos.x, pos.y, payload.blast_radius);

        for hit in resolve_blast(pos, payload.blast_radius, payload.damage, &mut self.worms) {
            if hit.damage > 0 {
                let team = self.worms[hit.worm_id as usize].team;
                self.texts.push(FloatingText::new(
                    hit.pos - Vec2::new(0.0, 20.0),
                    format!("-{}", hit.damage),
                    Some(team),
                    90.0,
                ));
                self.events.push(GameEvent::WormDamaged {
                    id: hit.worm_id,
                    damage: hit.damage,
                });
            }
        }

        if payload.cluster > 0 {
            let bazooka = WeaponKind::Bazooka.spec();
            let bomblet = Payload {
                blast_radius: bazooka.blast_radius,
                damage: bazooka.damage,
                cluster: 0,
            };
            let due = self.clock + secs_to_frames(CLUSTER_DELAY_SECS) as f64;
            let n = payload.cluster;
            for i in 0..n {
                let angle = std::f32::consts::TAU * i as f32 / n as f32 + (self.rng.random::<f32>() - 0.5) * 0.5;
                let speed = self.rng.random_range(3.0..6.0);
                let vel = crate::polar_to_cartesian(speed, angle) + Vec2::new(0.0, -3.0);
                let id = self.next_entity_id();
                let p = Projectile::new(
                    id,
                    pos - Vec2::new(0.0, 5.0),
                    vel,
                    team,
                    WeaponKind::Bazooka,
                    bomblet,
                    &BOMBLET_FLIGHT,
                );
                self.schedule.push(due, Scheduled::SpawnProjectile(Box::new(p)));
            }
        }
    }

    /// Water entry: splash effect, no blast
    pub fn splash(&mut self, pos: Vec2) {
        let at = Vec2::new(pos.x, WATER_Y);
        spawn_splash(&mut self.particles, at, &mut self.rng);
        self.events.push(GameEvent::Splash { pos: at });
    }

    /// Nothing is moving and nothing is about to spawn
    pub fn all_settled(&self) -> bool {
        self.worms.iter().all(|w| w.is_settled())
            && self.projectiles.is_empty()
            && self.explosions.is_empty()
            && !self.schedule.has_pending_spawn()
    }

    /// End the match if a team has no living worms; true once over
    pub fn check_game_over(&mut self) -> bool {
        if self.phase == TurnPhase::GameOver {
            return true;
        }
        let alive = [self.living(0), self.living(1)];
        if alive[0] > 0 && alive[1] > 0 {
            return false;
        }
        let outcome = match (alive[0] > 0, alive[1] > 0) {
            (true, false) => Outcome::Winner(0),
            (false, true) => Outcome::Winner(1),
            _ => Outcome::Draw,
        };
        self.phase = TurnPhase::GameOver;
        self.outcome = Some(outcome);
        self.active = None;
        self.schedule.clear();

        let record = MatchRecord {
            result: if outcome == Outcome::Winner(0) {
                MatchResult::Win
            } else {
                MatchResult::Loss
            },
            opponent_type: self.settings.opponent,
            terrain_type: self.theme.key().to_string(),
            duration_seconds: (self.clock / FRAMES_PER_SECOND as f64) as u32,
            units_remaining: alive[0] as u32,
        };
        match outcome {
            Outcome::Winner(team) => log::info!("Game over: {} wins", TEAM_NAMES[team]),
            Outcome::Draw => log::info!("Game over: draw"),
        }
        self.match_record = Some(record);
        self.events.push(GameEvent::MatchEnded { outcome });
        true
    }

    /// Rotate the acting team's roster, switch teams and queue the next turn
    pub fn finish_turn(&mut self) {
        let team = self.current_team;
        let len = self.teams[team].len().max(1);
        self.current_index[team] = (self.current_index[team] + 1) % len;
        self.current_team = (team + 1) % TEAM_COUNT;
        self.active = None;
        self.phase = TurnPhase::Intermission;
        self.events.push(GameEvent::TurnEnded { team });
        self.schedule.push(
            self.clock + secs_to_frames(self.settings.next_turn_delay_secs) as f64,
            Scheduled::BeginTurn,
        );
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The finished match's record, handed out once
    pub fn take_match_record(&mut self) -> Option<MatchRecord> {
        self.match_record.take()
    }

    /// Hand the finished match's record to `recorder`; false if none is pending
    pub fn report(&mut self, recorder: &mut dyn MatchRecorder) -> bool {
        match self.take_match_record() {
            Some(record) => {
                recorder.record(&record);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            paused: self.paused,
            wind: self.wind,
            turn_time_left: self.turn_time_left,
            current_team: self.current_team,
            active_worm: self.active_worm().map(|w| w.id),
            selected_weapon: self.selected_weapon,
            worms: self
                .worms
                .iter()
                .map(|w| WormSnapshot {
                    id: w.id,
                    name: w.name.clone(),
                    team: w.team,
                    x: w.pos.x,
                    y: w.pos.y,
                    hp: w.hp,
                    alive: w.alive,
                })
                .collect(),
            ammo: self.ammo[self.current_team].iter().collect(),
            theme: self.theme,
        }
    }
}
