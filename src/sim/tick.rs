//! Fixed timestep simulation tick
//!
//! Advances one match by `dt` frames: scheduled actions, player input,
//! projectiles, explosions, effects, worms and finally the turn machine.

use glam::Vec2;

use super::state::{GameEvent, MatchState, TurnPhase};
use crate::consts::*;
use crate::sim::{
    update_effects, FireCommand, FloatingText, Payload, ProjectileOutcome, Scheduled, WalkResult, WeaponKind,
    WormEvent,
};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Walk one step; only the sign is used
    pub walk: Option<f32>,
    pub jump: bool,
    pub fire: Option<FireCommand>,
    pub select_weapon: Option<WeaponKind>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    let live = !matches!(
        state.phase,
        TurnPhase::Menu | TurnPhase::TerrainSetup | TurnPhase::GameOver
    );

    // Handle pause toggle
    if input.pause && live {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
        if state.paused {
            return;
        }
    }

    // Don't tick while paused, before the match, or after game over
    if state.paused || !live {
        return;
    }

    state.clock += dt as f64;
    state.time_ticks += 1;

    // Deferred actions due this tick
    run_schedule(state);
    if state.phase == TurnPhase::GameOver {
        return;
    }

    // Player controls, then the turn timer
    apply_input(state, input);
    update_turn_clock(state, dt);

    // Physics
    update_projectiles(state, dt);
    state.explosions.retain_mut(|e| e.advance(dt));
    update_effects(&mut state.particles, &mut state.texts, dt);
    update_worms(state, dt);

    if state.phase == TurnPhase::GameOver {
        return;
    }

    // Phase transitions
    match state.phase {
        TurnPhase::PlayerInput => {
            // Acting worm died mid-turn
            if state.active_worm().is_none_or(|w| !w.alive) {
                state.phase = TurnPhase::Settling;
            }
        }
        TurnPhase::Firing => {
            if state.projectiles.is_empty() && state.explosions.is_empty() && !state.schedule.has_pending_spawn() {
                state.phase = TurnPhase::Settling;
            }
        }
        _ => {}
    }

    // Turn ends once everything has come to rest
    if state.phase == TurnPhase::Settling && state.all_settled() && !state.check_game_over() {
        state.finish_turn();
    }
}

fn run_schedule(state: &mut MatchState) {
    while let Some(action) = state.schedule.pop_due(state.clock) {
        match action {
            Scheduled::BeginTurn => {
                if state.phase == TurnPhase::Intermission {
                    state.begin_turn();
                }
            }
            Scheduled::EnterPlayerInput => {
                if state.phase == TurnPhase::TurnStart {
                    state.enter_player_input();
                }
            }
            Scheduled::AiFire { turn, plan } => {
                if turn != state.turn || state.phase != TurnPhase::PlayerInput || state.has_fired {
                    log::debug!("Dropping stale AI shot for turn {turn}");
                    continue;
                }
                state.selected_weapon = plan.weapon;
                if let Err(e) = state.fire(plan.command) {
                    log::warn!("AI shot rejected: {e}");
                    state.phase = TurnPhase::Settling;
                }
            }
            Scheduled::SpawnProjectile(p) => state.projectiles.push(*p),
        }
        if state.phase == TurnPhase::GameOver {
            return;
        }
    }
}

fn apply_input(state: &mut MatchState, input: &TickInput) {
    if state.phase != TurnPhase::PlayerInput || state.settings.is_cpu(state.current_team) {
        return;
    }
    let Some(idx) = state.active else {
        return;
    };

    if let Some(weapon) = input.select_weapon {
        state.select_weapon(weapon);
    }

    if let Some(dir) = input.walk {
        if state.move_budget > 0 {
            let terrain = &state.terrain;
            let worm = &mut state.worms[idx];
            if matches!(worm.walk(dir, terrain), WalkResult::Moved | WalkResult::StartedFalling) {
                state.move_budget -= 1;
            }
        }
    }

    if input.jump && state.move_budget >= JUMP_COST && state.worms[idx].jump() {
        state.move_budget -= JUMP_COST;
    }

    if let Some(command) = input.fire {
        // Rejections are reported through events
        let _ = state.fire(command);
    }
}

fn update_turn_clock(state: &mut MatchState, dt: f32) {
    if state.phase != TurnPhase::PlayerInput {
        return;
    }
    state.turn_time_left -= dt / FRAMES_PER_SECOND;
    if state.turn_time_left <= 0.0 {
        state.turn_time_left = 0.0;
        log::info!("{} ran out of time", TEAM_NAMES[state.current_team]);
        state.events.push(GameEvent::TurnTimedOut {
            team: state.current_team,
        });
        state.phase = TurnPhase::Settling;
    }
}

fn update_projectiles(state: &mut MatchState, dt: f32) {
    let wind = state.wind;
    let terrain = &state.terrain;
    let worms = &state.worms;
    let mut detonations = Vec::new();
    let mut splashes = Vec::new();

    state.projectiles.retain_mut(|p| {
        let outcome = p.advance(dt, wind, terrain, worms);
        match outcome {
            ProjectileOutcome::Exploded => detonations.push((p.pos, p.payload, p.team)),
            ProjectileOutcome::Submerged => splashes.push(p.pos),
            _ => {}
        }
        !outcome.is_terminal()
    });

    for pos in splashes {
        state.splash(pos);
    }
    for (pos, payload, team) in detonations {
        state.detonate(pos, payload, team);
    }
}

fn update_worms(state: &mut MatchState, dt: f32) {
    let mut worm_events = Vec::new();
    let terrain = &state.terrain;
    for worm in &mut state.worms {
        worm.step(dt, terrain, &mut worm_events);
    }

    let mut casualties = false;
    for event in worm_events {
        match event {
            WormEvent::Landed { id, damage } => {
                if damage > 0 {
                    let worm = &state.worms[id as usize];
                    state.texts.push(FloatingText::new(
                        worm.pos - Vec2::new(0.0, 20.0),
                        format!("-{damage}"),
                        Some(worm.team),
                        90.0,
                    ));
                    state.events.push(GameEvent::WormDamaged { id, damage });
                }
            }
            WormEvent::Drowned { id, pos } => {
                casualties = true;
                log::info!("{} drowned", state.worms[id as usize].name);
                state.splash(pos);
                state.events.push(GameEvent::WormDrowned { id });
            }
            WormEvent::Died { id, pos } => {
                casualties = true;
                let team = state.worms[id as usize].team;
                log::info!("{} died", state.worms[id as usize].name);
                state.events.push(GameEvent::WormDied { id });
                state.detonate(
                    pos,
                    Payload {
                        blast_radius: DEATH_BLAST_RADIUS,
                        damage: 0,
                        cluster: 0,
                    },
                    team,
                );
            }
        }
    }

    if casualties {
        state.check_game_over();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{OpponentKind, Settings};
    use crate::sim::AiPlan;
    use crate::terrain_config::TerrainConfig;

    fn flat_config() -> TerrainConfig {
        TerrainConfig {
            heights: vec![500.0; WORLD_WIDTH],
            theme: "moonscape".into(),
            modifications: Vec::new(),
        }
    }

    fn run(state: &mut MatchState, frames: usize) {
        let input = TickInput::default();
        for _ in 0..frames {
            tick(state, &input, SIM_DT);
        }
    }

    /// Human-vs-human match on flat ground, ticked into the first input window
    fn human_match(turn_time_secs: f32) -> MatchState {
        let settings = Settings {
            opponent: OpponentKind::Human,
            turn_time_secs,
            seed: 7,
            ..Default::default()
        };
        let mut state = MatchState::new(settings);
        state.load_terrain(&flat_config()).unwrap();
        state.start();
        for _ in 0..200 {
            if state.phase == TurnPhase::PlayerInput {
                break;
            }
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, TurnPhase::PlayerInput);
        state
    }

    fn autoplay_match(seed: u64) -> MatchState {
        let settings = Settings {
            autoplay: true,
            seed,
            ..Default::default()
        };
        let mut state = MatchState::new(settings);
        state.start();
        state
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut state = MatchState::new(Settings::default());
        run(&mut state, 10);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase, TurnPhase::Menu);
    }

    #[test]
    fn test_banner_then_input() {
        let mut state = MatchState::new(Settings {
            opponent: OpponentKind::Human,
            ..Default::default()
        });
        state.start();
        assert_eq!(state.phase, TurnPhase::TurnStart);
        run(&mut state, 71);
        assert_eq!(state.phase, TurnPhase::TurnStart);
        run(&mut state, 1);
        assert_eq!(state.phase, TurnPhase::PlayerInput);
    }

    #[test]
    fn test_pause_freezes_match() {
        let mut state = human_match(30.0);
        run(&mut state, 30);
        let left = state.turn_time_left;
        let clock = state.clock;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert!(state.paused);
        run(&mut state, 600);
        assert_eq!(state.turn_time_left, left);
        assert_eq!(state.clock, clock);
        assert_eq!(state.phase, TurnPhase::PlayerInput);

        tick(&mut state, &pause, SIM_DT);
        assert!(!state.paused);
        assert!(state.turn_time_left < left);
    }

    #[test]
    fn test_turn_times_out() {
        let mut state = human_match(5.0);
        assert_eq!(state.current_team, 0);
        run(&mut state, 5 * 60 + 5);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::TurnTimedOut { team: 0 }));
        assert!(events.contains(&GameEvent::TurnEnded { team: 0 }));
        assert_eq!(state.current_team, 1);
        assert_eq!(state.phase, TurnPhase::Intermission);

        run(&mut state, 40);
        assert_eq!(state.phase, TurnPhase::TurnStart);
        assert_eq!(state.active_worm().map(|w| w.team), Some(1));
    }

    #[test]
    fn test_walk_spends_budget() {
        let mut state = human_match(30.0);
        let start_x = state.active_worm().unwrap().pos.x;
        let dir = if start_x < WORLD_WIDTH as f32 / 2.0 { 1.0 } else { -1.0 };
        let walk = TickInput {
            walk: Some(dir),
            ..Default::default()
        };
        for _ in 0..(MOVE_BUDGET + 50) {
            tick(&mut state, &walk, SIM_DT);
        }
        assert_eq!(state.move_budget, 0);
        let moved = (state.active_worm().unwrap().pos.x - start_x).abs();
        assert!(moved > 0.0);
        assert!(moved <= MOVE_BUDGET as f32 * MOVE_SPEED + 1e-3);
    }

    #[test]
    fn test_friendly_fire_hurts_own_team() {
        let mut state = human_match(30.0);
        let idx = state.active.unwrap();
        let fire = TickInput {
            fire: Some(FireCommand::Launch {
                angle: std::f32::consts::FRAC_PI_2,
                speed: 1.0,
            }),
            ..Default::default()
        };
        tick(&mut state, &fire, SIM_DT);
        assert_eq!(state.phase, TurnPhase::Firing);
        run(&mut state, 30);
        assert!(state.worms[idx].hp < WORM_START_HP);
        let id = state.worms[idx].id;
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::WormDamaged { id: hit, .. } if *hit == id)));
    }

    #[test]
    fn test_stale_ai_shot_ignored() {
        let mut state = human_match(30.0);
        let plan = AiPlan {
            weapon: WeaponKind::Bazooka,
            command: FireCommand::Launch { angle: 0.0, speed: 5.0 },
            target: 1,
        };
        let turn = state.turn + 1;
        state.schedule.push(state.clock, Scheduled::AiFire { turn, plan });
        run(&mut state, 1);
        assert!(state.projectiles.is_empty());
        assert!(!state.has_fired);
        assert_eq!(state.phase, TurnPhase::PlayerInput);
    }

    #[test]
    fn test_ai_takes_its_turn() {
        let mut state = autoplay_match(3);
        let mut fired = false;
        for _ in 0..400 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Fired { team: 0, .. }))
            {
                fired = true;
                break;
            }
        }
        assert!(fired);
        assert!(state.has_fired);
    }

    #[test]
    fn test_human_input_ignored_for_cpu() {
        let mut state = autoplay_match(4);
        run(&mut state, 72);
        assert_eq!(state.phase, TurnPhase::PlayerInput);
        let fire = TickInput {
            fire: Some(FireCommand::Launch { angle: 0.0, speed: 5.0 }),
            ..Default::default()
        };
        tick(&mut state, &fire, SIM_DT);
        assert!(!state.has_fired);
    }

    #[test]
    fn test_wiping_a_team_ends_match() {
        let mut state = human_match(30.0);
        for &i in &state.teams[1].clone() {
            state.worms[i].hp = 0;
        }
        run(&mut state, 1);
        assert_eq!(state.phase, TurnPhase::GameOver);
        let events = state.drain_events();
        let died = events
            .iter()
            .filter(|e| matches!(e, GameEvent::WormDied { .. }))
            .count();
        assert_eq!(died, state.teams[1].len());
        assert!(events.contains(&GameEvent::MatchEnded {
            outcome: crate::sim::Outcome::Winner(0)
        }));

        let ticks = state.time_ticks;
        run(&mut state, 100);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_turns_end_only_when_settled() {
        let mut state = autoplay_match(11);
        let mut wind_ok = true;
        let mut turns_ended = 0;
        let mut matches_ended = 0;
        for _ in 0..20_000 {
            let before = state.phase;
            tick(&mut state, &TickInput::default(), SIM_DT);
            if before != TurnPhase::Intermission && state.phase == TurnPhase::Intermission {
                assert!(state.all_settled());
                turns_ended += 1;
            }
            wind_ok &= state.wind.abs() <= WIND_LIMIT;
            matches_ended += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::MatchEnded { .. }))
                .count();
            if state.phase == TurnPhase::GameOver {
                break;
            }
        }
        assert!(wind_ok);
        assert!(turns_ended > 0);
        assert!(matches_ended <= 1);
        assert_eq!(state.phase == TurnPhase::GameOver, state.outcome.is_some());
    }

    #[test]
    fn test_determinism() {
        let mut a = autoplay_match(99);
        let mut b = autoplay_match(99);
        run(&mut a, 3000);
        run(&mut b, 3000);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.terrain, b.terrain);
    }
}
