//! Terrain themes
//!
//! Each theme owns a generation profile: base height, wave set, plateau
//! count and noise. Alien floaters additionally run the floating-island
//! post-process.

use serde::{Deserialize, Serialize};

use crate::terrain_config::{HeightParams, Wave};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    GreenHills,
    VolcanicPeaks,
    FrozenValleys,
    AlienFloaters,
    Desert,
    Moonscape,
}

/// Generation inputs for one theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeProfile {
    pub params: HeightParams,
    /// Random flattened bands blended into the surface
    pub random_plateaus: usize,
}

const fn wave(frequency: f32, amplitude: f32, offset: f32) -> Wave {
    Wave {
        frequency,
        amplitude,
        offset,
    }
}

const GREEN_HILLS_WAVES: [Wave; 4] = [
    wave(0.003, 80.0, 0.0),
    wave(0.008, 45.0, 1.3),
    wave(0.02, 20.0, 4.1),
    wave(0.05, 8.0, 2.7),
];
const VOLCANIC_WAVES: [Wave; 3] = [
    wave(0.004, 70.0, 0.5),
    wave(0.015, 60.0, 2.0),
    wave(0.04, 25.0, 1.1),
];
const FROZEN_WAVES: [Wave; 2] = [wave(0.002, 110.0, 0.7), wave(0.01, 35.0, 3.0)];
const ALIEN_WAVES: [Wave; 2] = [wave(0.005, 50.0, 0.2), wave(0.02, 15.0, 1.7)];
const DESERT_WAVES: [Wave; 2] = [wave(0.0025, 40.0, 0.0), wave(0.012, 20.0, 2.2)];
const MOON_WAVES: [Wave; 2] = [wave(0.006, 30.0, 0.9), wave(0.03, 10.0, 0.3)];

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::GreenHills,
        Theme::VolcanicPeaks,
        Theme::FrozenValleys,
        Theme::AlienFloaters,
        Theme::Desert,
        Theme::Moonscape,
    ];

    /// Key used in terrain configs and match records
    pub fn key(&self) -> &'static str {
        match self {
            Theme::GreenHills => "greenHills",
            Theme::VolcanicPeaks => "volcanicPeaks",
            Theme::FrozenValleys => "frozenValleys",
            Theme::AlienFloaters => "alienFloaters",
            Theme::Desert => "desert",
            Theme::Moonscape => "moonscape",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::GreenHills => "Green Hills",
            Theme::VolcanicPeaks => "Volcanic Peaks",
            Theme::FrozenValleys => "Frozen Valleys",
            Theme::AlienFloaters => "Alien Floaters",
            Theme::Desert => "Desert Dunes",
            Theme::Moonscape => "Moonscape",
        }
    }

    pub fn profile(&self) -> ThemeProfile {
        let (base_y, waves, random_plateaus, noise_level): (f32, &[Wave], usize, f32) = match self {
            Theme::GreenHills => (440.0, &GREEN_HILLS_WAVES, 4, 0.0),
            Theme::VolcanicPeaks => (460.0, &VOLCANIC_WAVES, 3, 6.0),
            Theme::FrozenValleys => (430.0, &FROZEN_WAVES, 4, 2.0),
            Theme::AlienFloaters => (520.0, &ALIEN_WAVES, 3, 0.0),
            Theme::Desert => (480.0, &DESERT_WAVES, 5, 1.0),
            Theme::Moonscape => (470.0, &MOON_WAVES, 3, 4.0),
        };
        ThemeProfile {
            params: HeightParams {
                base_y: Some(base_y),
                waves: waves.to_vec(),
                plateaus: Vec::new(),
                noise_level,
            },
            random_plateaus,
        }
    }

    /// Whether generation carves gaps and adds floating platforms
    pub fn floating_islands(&self) -> bool {
        matches!(self, Theme::AlienFloaters)
    }
}
