//! Aim commands, drag-to-fire input and trajectory preview

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{WeaponClass, WeaponKind};

/// Drag distance that maps to full power
pub const FULL_POWER_DRAG: f32 = 150.0;
/// Shorter drags are treated as taps
pub const MIN_DRAG: f32 = 15.0;
/// Aim origin sits this far above the worm's position
pub const AIM_ORIGIN_LIFT: f32 = 8.0;
pub const PREVIEW_STEPS: usize = 60;

/// A decision to fire the selected weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FireCommand {
    /// Launch along `angle` (radians, screen space, +y down) at `speed` px/frame
    Launch { angle: f32, speed: f32 },
    /// Call an airstrike on column `x`
    Strike { x: f32 },
    /// Drop at the worm's feet
    Place,
}

/// Turn a drag from the worm toward `pointer` into a fire command
///
/// The shot goes opposite the drag, slingshot style. Returns `None` for taps.
pub fn drag_to_command(weapon: WeaponKind, worm_pos: Vec2, pointer: Vec2) -> Option<FireCommand> {
    match weapon.spec().class {
        WeaponClass::Staged { .. } => return Some(FireCommand::Strike { x: pointer.x }),
        WeaponClass::Placement { .. } => return Some(FireCommand::Place),
        _ => {}
    }
    let origin = worm_pos - Vec2::new(0.0, AIM_ORIGIN_LIFT);
    let drag = origin - pointer;
    let dist = drag.length();
    if !dist.is_finite() || dist < MIN_DRAG {
        return None;
    }
    let power = (dist / FULL_POWER_DRAG).min(1.0);
    Some(FireCommand::Launch {
        angle: drag.y.atan2(drag.x),
        speed: power * weapon.spec().launch_speed(),
    })
}

/// Predicted path of a launch ignoring terrain, sampled every frame
pub fn preview_trajectory(origin: Vec2, angle: f32, speed: f32, wind: f32, wind_sensitive: bool) -> Vec<Vec2> {
    let mut pos = origin;
    let mut vel = crate::polar_to_cartesian(speed, angle);
    let mut points = Vec::with_capacity(PREVIEW_STEPS);
    for _ in 0..PREVIEW_STEPS {
        vel.y += GRAVITY;
        if wind_sensitive {
            vel.x += wind * WIND_FACTOR;
        }
        pos += vel;
        points.push(pos);
    }
    points
}
