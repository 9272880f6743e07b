//! Match settings
//!
//! Loaded from an optional JSON file by the headless runner; every field has
//! a default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::StoreError;
use crate::sim::Theme;

/// Who controls team 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    Human,
    #[default]
    Cpu,
}

impl OpponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentKind::Human => "human",
            OpponentKind::Cpu => "cpu",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "hvh" | "pvp" => Some(OpponentKind::Human),
            "cpu" | "ai" => Some(OpponentKind::Cpu),
            _ => None,
        }
    }
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Controller of team 1 (team 0 is always a human seat unless autoplay)
    pub opponent: OpponentKind,
    /// Terrain theme used when no terrain config is supplied
    pub theme: Theme,
    pub worms_per_team: usize,

    // === Timing (seconds) ===
    pub turn_time_secs: f32,
    pub banner_delay_secs: f32,
    pub next_turn_delay_secs: f32,

    /// RNG seed for terrain, placement, wind and AI noise
    pub seed: u64,
    /// Both teams are driven by the AI
    pub autoplay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opponent: OpponentKind::Cpu,
            theme: Theme::GreenHills,
            worms_per_team: WORMS_PER_TEAM,
            turn_time_secs: TURN_TIME_SECS,
            banner_delay_secs: TURN_BANNER_SECS,
            next_turn_delay_secs: NEXT_TURN_DELAY_SECS,
            seed: 12345,
            autoplay: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Clamp values into playable ranges
    pub fn sanitized(mut self) -> Self {
        self.worms_per_team = self.worms_per_team.clamp(1, 8);
        if !self.turn_time_secs.is_finite() || self.turn_time_secs < 5.0 {
            self.turn_time_secs = 5.0;
        }
        if !self.banner_delay_secs.is_finite() || self.banner_delay_secs < 0.0 {
            self.banner_delay_secs = TURN_BANNER_SECS;
        }
        if !self.next_turn_delay_secs.is_finite() || self.next_turn_delay_secs < 0.0 {
            self.next_turn_delay_secs = NEXT_TURN_DELAY_SECS;
        }
        self
    }

    /// Whether the given team is driven by the AI
    pub fn is_cpu(&self, team: usize) -> bool {
        self.autoplay || (self.opponent == OpponentKind::Cpu && team == 1)
    }
}
