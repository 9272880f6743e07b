//! Computer opponent
//!
//! Picks the nearest enemy, chooses a weapon by range and aims with a
//! rough gravity correction plus deliberate noise. The plan is queued and
//! fired through the same path as human input.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::manhattan;
use crate::sim::{AmmoBelt, FireCommand, WeaponKind, Worm};

/// Enemies closer than this get the shotgun
pub const CLOSE_RANGE: f32 = 80.0;
/// Enemies farther than this get an airstrike or bazooka
pub const LONG_RANGE: f32 = 500.0;
/// Angular noise, total width in radians
pub const AIM_NOISE: f32 = 0.15;
/// Airstrike target jitter, total width in pixels
pub const STRIKE_JITTER: f32 = 30.0;
/// Thinking delay before the shot (seconds)
pub const THINK_MIN_SECS: f32 = 0.8;
pub const THINK_MAX_SECS: f32 = 1.4;

const MID_RANGE_PICKS: [WeaponKind; 4] = [
    WeaponKind::Bazooka,
    WeaponKind::Grenade,
    WeaponKind::BananaBomb,
    WeaponKind::HolyGrenade,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiPlan {
    pub weapon: WeaponKind,
    pub command: FireCommand,
    /// Worm the shot is meant for
    pub target: u32,
}

/// Nearest living enemy of `me` by Manhattan distance
pub fn pick_target<'a>(worms: &'a [Worm], me: &Worm) -> Option<&'a Worm> {
    worms
        .iter()
        .filter(|w| w.alive && w.team != me.team)
        .min_by(|a, b| manhattan(a.pos, me.pos).total_cmp(&manhattan(b.pos, me.pos)))
}

/// Weapon for a target at Euclidean distance `dist`, falling back to the
/// bazooka when the pick is out of ammo
pub fn choose_weapon(dist: f32, ammo: &AmmoBelt, rng: &mut Pcg32) -> WeaponKind {
    let pick = if dist < CLOSE_RANGE {
        WeaponKind::Shotgun
    } else if dist > LONG_RANGE {
        if rng.random::<f32>() > 0.5 {
            WeaponKind::Airstrike
        } else {
            WeaponKind::Bazooka
        }
    } else {
        MID_RANGE_PICKS[rng.random_range(0..MID_RANGE_PICKS.len())]
    };
    if ammo.available(pick) {
        pick
    } else {
        WeaponKind::Bazooka
    }
}

/// Launch angle with a gravity lob correction
pub fn lob_angle(delta: Vec2, speed: f32) -> f32 {
    let d = delta.length();
    let flight_time = d / speed;
    delta.y.atan2(delta.x) - GRAVITY * flight_time * 0.5 / speed
}

/// Plan a shot for `me`; `None` when no enemy is alive
pub fn plan_turn(worms: &[Worm], me: &Worm, ammo: &AmmoBelt, rng: &mut Pcg32) -> Option<AiPlan> {
    let target = pick_target(worms, me)?;
    let delta = target.pos - me.pos;
    let weapon = choose_weapon(delta.length(), ammo, rng);

    let command = match weapon {
        WeaponKind::Airstrike => FireCommand::Strike {
            x: target.pos.x + (rng.random::<f32>() - 0.5) * STRIKE_JITTER,
        },
        WeaponKind::Dynamite => FireCommand::Place,
        _ => {
            let speed = weapon.spec().launch_speed();
            let angle = lob_angle(delta, speed) + (rng.random::<f32>() - 0.5) * AIM_NOISE;
            let power = 0.85 + rng.random::<f32>() * 0.3;
            FireCommand::Launch {
                angle,
                speed: speed * power,
            }
        }
    };

    log::debug!(
        "{} targets {} with {} from {:.0}px",
        me.name,
        target.name,
        weapon.key(),
        delta.length()
    );
    Some(AiPlan {
        weapon,
        command,
        target: target.id,
    })
}

/// Seconds the AI "thinks" before firing
pub fn thinking_delay(rng: &mut Pcg32) -> f32 {
    rng.random_range(THINK_MIN_SECS..THINK_MAX_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn worm(id: u32, team: usize, x: f32, y: f32) -> Worm {
        Worm::new(id, format!("W{id}"), team, Vec2::new(x, y))
    }

    #[test]
    fn test_target_is_nearest_manhattan_enemy() {
        let me = worm(0, 1, 500.0, 400.0);
        let worms = vec![
            me.clone(),
            worm(1, 1, 510.0, 400.0),
            worm(2, 0, 700.0, 400.0),
            // closer in Euclidean terms, farther in Manhattan terms
            worm(3, 0, 640.0, 540.0),
        ];
        assert_eq!(pick_target(&worms, &me).map(|w| w.id), Some(2));
    }

    #[test]
    fn test_no_living_enemy() {
        let me = worm(0, 1, 500.0, 400.0);
        let mut enemy = worm(1, 0, 600.0, 400.0);
        enemy.alive = false;
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(plan_turn(&[me.clone(), enemy], &me, &AmmoBelt::full(), &mut rng), None);
    }

    #[test]
    fn test_close_range_shotgun() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(choose_weapon(50.0, &AmmoBelt::full(), &mut rng), WeaponKind::Shotgun);
    }

    #[test]
    fn test_long_range_choices() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            let w = choose_weapon(900.0, &AmmoBelt::full(), &mut rng);
            assert!(matches!(w, WeaponKind::Airstrike | WeaponKind::Bazooka));
        }
    }

    #[test]
    fn test_mid_range_choices() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let w = choose_weapon(300.0, &AmmoBelt::full(), &mut rng);
            assert!(MID_RANGE_PICKS.contains(&w));
        }
    }

    #[test]
    fn test_fallback_to_bazooka() {
        let mut ammo = AmmoBelt::full();
        assert!(ammo.consume(WeaponKind::Airstrike));
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..50 {
            assert_eq!(choose_weapon(900.0, &ammo, &mut rng), WeaponKind::Bazooka);
        }
    }

    #[test]
    fn test_lob_aims_above_line_of_sight() {
        let delta = Vec2::new(300.0, 0.0);
        let angle = lob_angle(delta, 8.0);
        assert!(angle < 0.0);
        assert!(angle > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_launch_within_noise_bounds() {
        let me = worm(0, 1, 500.0, 400.0);
        let enemy = worm(1, 0, 800.0, 400.0);
        let worms = vec![me.clone(), enemy];
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..30 {
            let plan = plan_turn(&worms, &me, &AmmoBelt::full(), &mut rng).unwrap();
            assert_eq!(plan.target, 1);
            if let FireCommand::Launch { angle, speed } = plan.command {
                let base = plan.weapon.spec().launch_speed();
                assert!(speed >= base * 0.85 && speed <= base * 1.15);
                let ideal = lob_angle(Vec2::new(300.0, 0.0), base);
                assert!((angle - ideal).abs() <= AIM_NOISE / 2.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_strike_jitter() {
        let me = worm(0, 1, 100.0, 400.0);
        let enemy = worm(1, 0, 1200.0, 400.0);
        let worms = vec![me.clone(), enemy];
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..30 {
            if let Some(AiPlan {
                command: FireCommand::Strike { x },
                ..
            }) = plan_turn(&worms, &me, &AmmoBelt::full(), &mut rng)
            {
                assert!((x - 1200.0).abs() <= STRIKE_JITTER / 2.0);
            }
        }
    }

    #[test]
    fn test_thinking_delay_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..20 {
            let d = thinking_delay(&mut rng);
            assert!((THINK_MIN_SECS..THINK_MAX_SECS).contains(&d));
        }
    }
}
