//! Terrain exchange format and generation parameters
//!
//! `TerrainConfig` is the JSON shape shared with external tools:
//! per-column surface heights plus an ordered list of circle/rect edits.
//! Configs are validated here, before anything touches a live grid.

use serde::{Deserialize, Serialize};

use crate::error::TerrainConfigError;
use crate::sim::{TerrainField, Theme};

/// Whether a modification makes cells solid or carves them to air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Fill {
    Air,
    Solid,
}

impl TryFrom<u8> for Fill {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Fill::Air),
            1 => Ok(Fill::Solid),
            other => Err(format!("fill must be 0 or 1, got {other}")),
        }
    }
}

impl From<Fill> for u8 {
    fn from(f: Fill) -> u8 {
        match f {
            Fill::Air => 0,
            Fill::Solid => 1,
        }
    }
}

impl Fill {
    pub fn is_solid(self) -> bool {
        self == Fill::Solid
    }
}

/// One terrain edit, applied in list order after the heights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modification {
    Circle { x: f32, y: f32, r: f32, fill: Fill },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Fill,
    },
}

fn default_theme_key() -> String {
    Theme::GreenHills.key().to_string()
}

/// Serialized terrain: heights, theme key and modifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub heights: Vec<f32>,
    #[serde(default = "default_theme_key")]
    pub theme: String,
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

impl TerrainConfig {
    pub fn from_json(json: &str) -> Result<Self, TerrainConfigError> {
        serde_json::from_str(json).map_err(|e| TerrainConfigError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TerrainConfigError> {
        serde_json::to_string(self).map_err(|e| TerrainConfigError::Malformed(e.to_string()))
    }

    /// Export a live field's surface as a height-only config
    pub fn from_field(field: &TerrainField, theme: Theme) -> Self {
        Self {
            heights: field.export_heights(),
            theme: theme.key().to_string(),
            modifications: Vec::new(),
        }
    }

    /// Parsed theme key
    pub fn theme(&self) -> Result<Theme, TerrainConfigError> {
        Theme::from_key(&self.theme).ok_or_else(|| TerrainConfigError::UnknownTheme(self.theme.clone()))
    }

    /// Check the config against a `width × height` world flooded at `water_row`
    ///
    /// Heights are whole pixel rows in `[0, water_row]`; `water_row` itself
    /// means the column has no ground.
    pub fn validate(&self, width: usize, height: usize, water_row: usize) -> Result<(), TerrainConfigError> {
        if self.heights.is_empty() {
            return Err(TerrainConfigError::MissingHeights);
        }
        if self.heights.len() != width {
            return Err(TerrainConfigError::HeightCount {
                expected: width,
                found: self.heights.len(),
            });
        }
        if let Some(column) = self.heights.iter().position(|h| !h.is_finite()) {
            return Err(TerrainConfigError::NonFiniteHeight { column });
        }
        let max = water_row.min(height) as f32;
        if let Some((column, &value)) = self
            .heights
            .iter()
            .enumerate()
            .find(|(_, h)| **h < 0.0 || **h > max || h.fract() != 0.0)
        {
            return Err(TerrainConfigError::HeightOutOfRange { column, value });
        }
        self.theme()?;

        let (w, h) = (width as f32, height as f32);
        for (index, m) in self.modifications.iter().enumerate() {
            match *m {
                Modification::Circle { x, y, r, .. } => {
                    if !(x.is_finite() && y.is_finite() && r.is_finite()) {
                        return Err(TerrainConfigError::ModificationOutOfRange { index });
                    }
                    if r <= 0.0 {
                        return Err(TerrainConfigError::DegenerateModification { index });
                    }
                    if x < 0.0 || x >= w || y < 0.0 || y >= h {
                        return Err(TerrainConfigError::ModificationOutOfRange { index });
                    }
                }
                Modification::Rect {
                    x, y, w: rw, h: rh, ..
                } => {
                    if !(x.is_finite() && y.is_finite() && rw.is_finite() && rh.is_finite()) {
                        return Err(TerrainConfigError::ModificationOutOfRange { index });
                    }
                    if rw <= 0.0 || rh <= 0.0 {
                        return Err(TerrainConfigError::DegenerateModification { index });
                    }
                    if x + rw <= 0.0 || x >= w || y + rh <= 0.0 || y >= h {
                        return Err(TerrainConfigError::ModificationOutOfRange { index });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Sine component of a generated surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub frequency: f32,
    pub amplitude: f32,
    /// Phase offset in radians
    #[serde(default)]
    pub offset: f32,
}

/// Flattened band `[start, end)` at a fixed surface height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    pub start: f32,
    pub end: f32,
    pub height: f32,
}

/// Inputs for procedural height generation
///
/// Any field may be missing or out of range; generation clamps and defaults
/// rather than rejecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct HeightParams {
    pub base_y: Option<f32>,
    pub waves: Vec<Wave>,
    pub plateaus: Vec<Plateau>,
    pub noise_level: f32,
}

/// Named terrain features that expand to modifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainFeature {
    Canyon,
    Bridge,
    Tunnel,
    Platform,
}

impl TerrainFeature {
    /// Build the modification for a feature centered on `x`
    ///
    /// `y` and `height` fall back to per-feature defaults.
    pub fn modification(&self, x: f32, width: f32, y: Option<f32>, height: Option<f32>) -> Modification {
        let left = x - width / 2.0;
        match self {
            TerrainFeature::Canyon => Modification::Rect {
                x: left,
                y: y.unwrap_or(300.0),
                w: width,
                h: height.unwrap_or(300.0),
                fill: Fill::Air,
            },
            TerrainFeature::Bridge => Modification::Rect {
                x: left,
                y: y.unwrap_or(350.0),
                w: width,
                h: height.unwrap_or(12.0),
                fill: Fill::Solid,
            },
            TerrainFeature::Tunnel => Modification::Circle {
                x,
                y: y.unwrap_or(500.0),
                r: height.unwrap_or(width) / 2.0,
                fill: Fill::Air,
            },
            TerrainFeature::Platform => Modification::Rect {
                x: left,
                y: y.unwrap_or(250.0),
                w: width,
                h: height.unwrap_or(15.0),
                fill: Fill::Solid,
            },
        }
    }
}
