//! Read-only view of a match for HUDs, logs and the advice module

use serde::{Deserialize, Serialize};

use crate::sim::{Ammo, Theme, TurnPhase, WeaponKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WormSnapshot {
    pub id: u32,
    pub name: String,
    pub team: usize,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: TurnPhase,
    pub paused: bool,
    pub wind: f32,
    /// Seconds left on the turn clock
    pub turn_time_left: f32,
    pub current_team: usize,
    pub active_worm: Option<u32>,
    pub selected_weapon: WeaponKind,
    pub worms: Vec<WormSnapshot>,
    /// Acting team's remaining ammo
    pub ammo: Vec<(WeaponKind, Ammo)>,
    pub theme: Theme,
}

impl Snapshot {
    pub fn active(&self) -> Option<&WormSnapshot> {
        let id = self.active_worm?;
        self.worms.iter().find(|w| w.id == id)
    }

    /// Living worms not on `team`
    pub fn enemies_of(&self, team: usize) -> impl Iterator<Item = &WormSnapshot> {
        self.worms.iter().filter(move |w| w.alive && w.team != team)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
