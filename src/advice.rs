//! Situational analysis for the acting worm
//!
//! A pure function of the live snapshot: range band to the nearest enemy,
//! finishing opportunities, water proximity and wind.

use std::fmt;

use serde::Serialize;

use crate::sim::Snapshot;

/// Enemies closer than this call for close-range weapons
pub const CLOSE_BAND: f32 = 80.0;
/// Enemies closer than this are medium range
pub const MEDIUM_BAND: f32 = 300.0;
/// Enemies at or below this hp are worth finishing off
pub const FINISHABLE_HP: i32 = 25;
/// Worms below this height are at risk of being knocked into the water
pub const WATER_DANGER_Y: f32 = 650.0;
/// Wind above this strength matters at medium range
pub const STRONG_WIND: f32 = 3.0;
/// Wind at or below this strength is reported as calm
pub const CALM_WIND: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Suggestion {
    CloseRange { dist: f32 },
    MediumRange { dist: f32 },
    LongRange { dist: f32 },
    CompensateWind { wind: f32 },
    FinishOff { x: f32, y: f32, hp: i32 },
    NearWater,
    NoEnemies,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::CloseRange { dist } => write!(
                f,
                "Nearest enemy is very close ({dist:.0}px). Consider Dynamite or Shotgun for close-range damage."
            ),
            Suggestion::MediumRange { dist } => write!(
                f,
                "Nearest enemy is at medium range ({dist:.0}px). Bazooka or Grenade would work well."
            ),
            Suggestion::LongRange { dist } => write!(
                f,
                "Nearest enemy is far ({dist:.0}px). Consider Airstrike or Sniper for long range."
            ),
            Suggestion::CompensateWind { wind } => write!(
                f,
                "Wind is {} at {:.1}. Compensate your aim {} when using wind-affected weapons.",
                wind_direction(*wind),
                wind.abs(),
                if *wind > 0.0 { "left" } else { "right" }
            ),
            Suggestion::FinishOff { x, y, hp } => write!(
                f,
                "Enemy at ({x:.0}, {y:.0}) has only {hp} HP. Even a Shotgun could finish them!"
            ),
            Suggestion::NearWater => {
                write!(f, "Warning: you are close to the water! Be careful with knockback from explosions.")
            }
            Suggestion::NoEnemies => write!(f, "No enemies visible. Use the time to reposition."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub suggestions: Vec<Suggestion>,
    pub nearest_enemy_dist: Option<f32>,
    pub wind_advice: String,
}

fn wind_direction(wind: f32) -> &'static str {
    if wind > 0.0 { "rightward" } else { "leftward" }
}

fn wind_advice(wind: f32) -> String {
    if wind.abs() > CALM_WIND {
        format!("Compensate for {} wind", wind_direction(wind))
    } else {
        "Wind is calm".to_string()
    }
}

/// Analyze the snapshot from the active worm's point of view
///
/// Returns `None` when no worm is acting.
pub fn analyze(snapshot: &Snapshot) -> Option<Analysis> {
    let me = snapshot.active()?;
    let mut enemies: Vec<_> = snapshot
        .enemies_of(me.team)
        .map(|e| (e, (e.x - me.x).hypot(e.y - me.y)))
        .collect();

    if enemies.is_empty() {
        return Some(Analysis {
            suggestions: vec![Suggestion::NoEnemies],
            nearest_enemy_dist: None,
            wind_advice: wind_advice(snapshot.wind),
        });
    }
    enemies.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut suggestions = Vec::new();
    let dist = enemies[0].1;
    if dist < CLOSE_BAND {
        suggestions.push(Suggestion::CloseRange { dist });
    } else if dist < MEDIUM_BAND {
        suggestions.push(Suggestion::MediumRange { dist });
        if snapshot.wind.abs() > STRONG_WIND {
            suggestions.push(Suggestion::CompensateWind { wind: snapshot.wind });
        }
    } else {
        suggestions.push(Suggestion::LongRange { dist });
    }

    // Ties go to the nearer enemy
    if let Some((weakest, _)) = enemies.iter().min_by_key(|(e, _)| e.hp) {
        if weakest.hp <= FINISHABLE_HP {
            suggestions.push(Suggestion::FinishOff {
                x: weakest.x,
                y: weakest.y,
                hp: weakest.hp,
            });
        }
    }

    if me.y > WATER_DANGER_Y {
        suggestions.push(Suggestion::NearWater);
    }

    Some(Analysis {
        suggestions,
        nearest_enemy_dist: Some(dist),
        wind_advice: wind_advice(snapshot.wind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Theme, TurnPhase, WeaponKind, WormSnapshot};

    fn worm(id: u32, team: usize, x: f32, y: f32, hp: i32) -> WormSnapshot {
        WormSnapshot {
            id,
            name: format!("W{id}"),
            team,
            x,
            y,
            hp,
            alive: hp > 0,
        }
    }

    fn snapshot(worms: Vec<WormSnapshot>, wind: f32) -> Snapshot {
        Snapshot {
            phase: TurnPhase::PlayerInput,
            paused: false,
            wind,
            turn_time_left: 30.0,
            current_team: 0,
            active_worm: Some(0),
            selected_weapon: WeaponKind::Bazooka,
            worms,
            ammo: Vec::new(),
            theme: Theme::GreenHills,
        }
    }

    #[test]
    fn test_close_range() {
        let snap = snapshot(vec![worm(0, 0, 100.0, 400.0, 100), worm(1, 1, 150.0, 400.0, 100)], 0.0);
        let a = analyze(&snap).unwrap();
        assert_eq!(a.suggestions, vec![Suggestion::CloseRange { dist: 50.0 }]);
        assert_eq!(a.nearest_enemy_dist, Some(50.0));
        assert_eq!(a.wind_advice, "Wind is calm");
    }

    #[test]
    fn test_medium_range_wind() {
        let snap = snapshot(vec![worm(0, 0, 100.0, 400.0, 100), worm(1, 1, 300.0, 400.0, 100)], -4.0);
        let a = analyze(&snap).unwrap();
        assert_eq!(
            a.suggestions,
            vec![
                Suggestion::MediumRange { dist: 200.0 },
                Suggestion::CompensateWind { wind: -4.0 }
            ]
        );
        assert_eq!(a.wind_advice, "Compensate for leftward wind");
        assert!(a.suggestions[1].to_string().contains("aim right"));
    }

    #[test]
    fn test_long_range_ignores_dead() {
        let snap = snapshot(
            vec![
                worm(0, 0, 100.0, 400.0, 100),
                worm(1, 1, 120.0, 400.0, 0),
                worm(2, 1, 900.0, 400.0, 100),
                worm(3, 0, 110.0, 400.0, 100),
            ],
            2.5,
        );
        let a = analyze(&snap).unwrap();
        assert_eq!(a.suggestions, vec![Suggestion::LongRange { dist: 800.0 }]);
        assert_eq!(a.wind_advice, "Compensate for rightward wind");
    }

    #[test]
    fn test_weakest_enemy_and_water() {
        let snap = snapshot(
            vec![
                worm(0, 0, 100.0, 700.0, 100),
                worm(1, 1, 500.0, 700.0, 80),
                worm(2, 1, 1200.0, 400.0, 20),
            ],
            0.0,
        );
        let a = analyze(&snap).unwrap();
        assert!(a.suggestions.contains(&Suggestion::FinishOff {
            x: 1200.0,
            y: 400.0,
            hp: 20
        }));
        assert_eq!(a.suggestions.last(), Some(&Suggestion::NearWater));
    }

    #[test]
    fn test_no_enemies_or_no_actor() {
        let snap = snapshot(vec![worm(0, 0, 100.0, 400.0, 100)], 0.0);
        let a = analyze(&snap).unwrap();
        assert_eq!(a.suggestions, vec![Suggestion::NoEnemies]);
        assert_eq!(a.nearest_enemy_dist, None);

        let mut idle = snap.clone();
        idle.active_worm = None;
        assert_eq!(analyze(&idle), None);
    }
}
