//! Destructible terrain grid
//!
//! A `width × height` solid/air grid; the only collision source for
//! projectiles and worms. After construction it changes only through
//! `carve`, which also records the touched region for incremental redraw.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::TerrainConfigError;
use crate::terrain_config::{HeightParams, Modification, TerrainConfig};

/// Default surface height when generation params omit one
pub const DEFAULT_BASE_Y: f32 = 440.0;

/// Cell-space rectangle touched by an edit (inclusive origin, exclusive end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl DirtyRect {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Theme-driven edit applied after the base fill
pub trait TerrainPostProcess {
    fn apply(&self, field: &mut TerrainField, rng: &mut Pcg32);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainField {
    pub width: usize,
    pub height: usize,
    /// First row of water; generated ground fills down to here
    pub water_row: usize,
    cells: Vec<bool>,
    /// Regions carved since the last `take_damage`
    pub damage: Vec<DirtyRect>,
}

impl TerrainField {
    /// All-air field
    pub fn empty(width: usize, height: usize, water_row: usize) -> Self {
        Self {
            width,
            height,
            water_row: water_row.min(height),
            cells: vec![false; width * height],
            damage: Vec::new(),
        }
    }

    /// Fill each column from `floor(h)` down to the water line
    ///
    /// Missing or non-finite heights leave the column empty.
    pub fn from_heights(heights: &[f32], width: usize, height: usize, water_row: usize) -> Self {
        let mut field = Self::empty(width, height, water_row);
        for (x, &h) in heights.iter().enumerate().take(width) {
            if !h.is_finite() {
                continue;
            }
            let top = h.floor().clamp(0.0, field.water_row as f32) as usize;
            for y in top..field.water_row {
                field.cells[y * width + x] = true;
            }
        }
        field
    }

    /// Procedural field from generation params
    pub fn generate(
        params: &HeightParams,
        random_plateaus: usize,
        post: Option<&dyn TerrainPostProcess>,
        rng: &mut Pcg32,
    ) -> Self {
        let heights = heights_from_params(params, WORLD_WIDTH, random_plateaus, rng);
        let mut field = Self::from_heights(&heights, WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW);
        if let Some(post) = post {
            post.apply(&mut field, rng);
        }
        field.damage.clear();
        field
    }

    /// Build a field from an exchange config, rejecting invalid input
    pub fn load_from_config(config: &TerrainConfig) -> Result<Self, TerrainConfigError> {
        config.validate(WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW)?;
        let mut field = Self::from_heights(&config.heights, WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW);
        for m in &config.modifications {
            field.apply_modification(m);
        }
        Ok(field)
    }

    pub fn apply_modification(&mut self, m: &Modification) {
        match *m {
            Modification::Circle { x, y, r, fill } => {
                self.fill_circle(x, y, r, fill.is_solid());
            }
            Modification::Rect { x, y, w, h, fill } => {
                self.fill_rect(x, y, w, h, fill.is_solid());
            }
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Solid test; out-of-bounds and non-finite coordinates are air
    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return false;
        }
        let (cx, cy) = (x.floor() as usize, y.floor() as usize);
        if cx >= self.width || cy >= self.height {
            return false;
        }
        self.cells[self.idx(cx, cy)]
    }

    fn column(&self, x: f32) -> usize {
        if !x.is_finite() || self.width == 0 {
            return 0;
        }
        x.floor().clamp(0.0, (self.width - 1) as f32) as usize
    }

    /// First solid row of column `x` above the water line
    pub fn surface_y(&self, x: f32) -> f32 {
        if self.width == 0 {
            return self.water_row as f32;
        }
        let cx = self.column(x);
        (0..self.water_row)
            .find(|&y| self.cells[self.idx(cx, y)])
            .unwrap_or(self.water_row) as f32
    }

    /// Clamped cell bounding box of a circle, `None` if it misses the grid
    fn circle_bounds(&self, cx: f32, cy: f32, r: f32) -> Option<DirtyRect> {
        if !(cx.is_finite() && cy.is_finite() && r.is_finite()) || r < 0.0 {
            return None;
        }
        if cx + r < 0.0 || cy + r < 0.0 {
            return None;
        }
        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil() as usize).min(self.width.saturating_sub(1));
        let y1 = ((cy + r).ceil() as usize).min(self.height.saturating_sub(1));
        if x0 > x1 || y0 > y1 || x0 >= self.width || y0 >= self.height {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            w: x1 - x0 + 1,
            h: y1 - y0 + 1,
        })
    }

    /// Set every cell whose integer coordinate lies within `r` of the center
    ///
    /// Solid fills stop at the water line.
    pub(crate) fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, solid: bool) -> Option<DirtyRect> {
        let rect = self.circle_bounds(cx, cy, r)?;
        let r2 = r * r;
        let y_end = if solid {
            (rect.y + rect.h).min(self.water_row)
        } else {
            rect.y + rect.h
        };
        for y in rect.y..y_end {
            for x in rect.x..rect.x + rect.w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r2 {
                    let i = self.idx(x, y);
                    self.cells[i] = solid;
                }
            }
        }
        Some(rect)
    }

    /// Set every cell inside `[x, x+w) × [y, y+h)`; solid fills stop at the water line
    pub(crate) fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, solid: bool) -> Option<DirtyRect> {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return None;
        }
        let x0 = x.ceil().max(0.0) as usize;
        let y0 = y.ceil().max(0.0) as usize;
        let x1 = ((x + w).ceil().max(0.0) as usize).min(self.width);
        let floor = if solid { self.water_row } else { self.height };
        let y1 = ((y + h).ceil().max(0.0) as usize).min(floor);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        for cy in y0..y1 {
            for cx in x0..x1 {
                let i = self.idx(cx, cy);
                self.cells[i] = solid;
            }
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }

    /// Carve a circular hole and record the touched region
    pub fn carve(&mut self, cx: f32, cy: f32, r: f32) -> Option<DirtyRect> {
        let rect = self.fill_circle(cx, cy, r, false)?;
        self.damage.push(rect);
        Some(rect)
    }

    /// Drain the damage list
    pub fn take_damage(&mut self) -> Vec<DirtyRect> {
        std::mem::take(&mut self.damage)
    }

    /// First solid row per column (water line when the column is empty)
    pub fn export_heights(&self) -> Vec<f32> {
        (0..self.width).map(|x| self.surface_y(x as f32)).collect()
    }

    /// Closest column within `max_offset` of `x` that has ground above the water
    pub fn nearest_ground_column(&self, x: f32, max_offset: usize) -> Option<f32> {
        let has_ground = |cx: f32| cx >= 0.0 && cx < self.width as f32 && self.surface_y(cx) < self.water_row as f32;
        (0..=max_offset).map(|d| d as f32).find_map(|d| {
            if has_ground(x - d) {
                Some(x - d)
            } else if has_ground(x + d) {
                Some(x + d)
            } else {
                None
            }
        })
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Per-column surface heights from generation params
///
/// Non-finite wave terms are skipped, a missing base falls back to the
/// default and negative noise is treated as none.
pub fn heights_from_params(params: &HeightParams, width: usize, random_plateaus: usize, rng: &mut Pcg32) -> Vec<f32> {
    let base_y = params.base_y.filter(|b| b.is_finite()).unwrap_or(DEFAULT_BASE_Y);
    let noise = if params.noise_level.is_finite() {
        params.noise_level.max(0.0)
    } else {
        0.0
    };
    let waves: Vec<_> = params
        .waves
        .iter()
        .filter(|w| w.frequency.is_finite() && w.amplitude.is_finite() && w.offset.is_finite())
        .collect();

    let mut heights: Vec<f32> = (0..width)
        .map(|x| {
            let xf = x as f32;
            let mut h = base_y;
            for w in &waves {
                h += (xf * w.frequency + w.offset).sin() * w.amplitude;
            }
            if noise > 0.0 {
                h += (rng.random::<f32>() - 0.5) * noise;
            }
            h.clamp(MIN_SURFACE_Y, MAX_SURFACE_Y)
        })
        .collect();

    // Random flats blend toward the local height so worms have footing
    if width > 400 {
        for _ in 0..random_plateaus {
            let px = rng.random_range(200.0..(width as f32 - 200.0));
            let pw = rng.random_range(60.0..140.0);
            let flat = heights[px as usize];
            let start = (px - pw / 2.0).floor().max(0.0) as usize;
            let end = ((px + pw / 2.0).floor() as usize).min(width);
            for h in &mut heights[start..end] {
                *h = *h * 0.3 + flat * 0.7;
            }
        }
    }

    for p in &params.plateaus {
        if !(p.start.is_finite() && p.end.is_finite() && p.height.is_finite()) {
            continue;
        }
        let (lo, hi) = if p.start <= p.end {
            (p.start, p.end)
        } else {
            (p.end, p.start)
        };
        let start = lo.floor().clamp(0.0, width as f32) as usize;
        let end = hi.floor().clamp(0.0, width as f32) as usize;
        let level = p.height.clamp(MIN_SURFACE_Y, MAX_SURFACE_Y);
        for h in &mut heights[start..end] {
            *h = level;
        }
    }

    heights
}

/// Carves vertical gaps through the ground and adds floating platforms
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingIslands;

impl TerrainPostProcess for FloatingIslands {
    fn apply(&self, field: &mut TerrainField, rng: &mut Pcg32) {
        let w = field.width as f32;
        if w <= 400.0 {
            return;
        }
        let gaps = rng.random_range(3..=4);
        for _ in 0..gaps {
            let gx = rng.random_range(150.0..(w - 250.0));
            let gw = rng.random_range(60.0..120.0);
            field.fill_rect(gx, 0.0, gw, field.water_row as f32, false);
        }
        let platforms = rng.random_range(3..=5);
        for _ in 0..platforms {
            let px = rng.random_range(100.0..(w - 260.0));
            let pw = rng.random_range(80.0..160.0);
            let ph = rng.random_range(14.0..24.0);
            let py = rng.random_range(220.0..380.0);
            field.fill_rect(px, py, pw, ph, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain_config::{Fill, Plateau, Wave};
    use rand::SeedableRng;

    fn flat_field(surface: f32) -> TerrainField {
        TerrainField::from_heights(&vec![surface; WORLD_WIDTH], WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW)
    }

    #[test]
    fn test_out_of_bounds_and_nan_are_air() {
        let field = flat_field(400.0);
        assert!(field.is_solid(10.0, 500.0));
        assert!(!field.is_solid(-1.0, 500.0));
        assert!(!field.is_solid(WORLD_WIDTH as f32, 500.0));
        assert!(!field.is_solid(10.0, WORLD_HEIGHT as f32 + 3.0));
        assert!(!field.is_solid(f32::NAN, 500.0));
        assert!(!field.is_solid(10.0, f32::INFINITY));
    }

    #[test]
    fn test_fill_stops_at_water() {
        let field = flat_field(400.0);
        assert!(field.is_solid(5.0, 759.0));
        assert!(!field.is_solid(5.0, 760.0));
        assert!(!field.is_solid(5.0, 399.0));
    }

    #[test]
    fn test_surface_y_clamps_x() {
        let mut heights = vec![500.0; WORLD_WIDTH];
        heights[0] = 300.0;
        heights[WORLD_WIDTH - 1] = 200.0;
        let field = TerrainField::from_heights(&heights, WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW);
        assert_eq!(field.surface_y(-50.0), 300.0);
        assert_eq!(field.surface_y(99999.0), 200.0);
        assert_eq!(field.surface_y(10.7), 500.0);
    }

    #[test]
    fn test_empty_column_reports_water() {
        let field = TerrainField::empty(WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW);
        assert_eq!(field.surface_y(100.0), WATER_Y);
    }

    #[test]
    fn test_nearest_ground_column() {
        let mut heights = vec![400.0; WORLD_WIDTH];
        for h in &mut heights[100..130] {
            *h = f32::NAN;
        }
        let field = TerrainField::from_heights(&heights, WORLD_WIDTH, WORLD_HEIGHT, WATER_ROW);
        assert_eq!(field.nearest_ground_column(50.0, 10), Some(50.0));
        assert_eq!(field.nearest_ground_column(125.0, 10), Some(130.0));
        assert_eq!(field.nearest_ground_column(115.0, 5), None);
    }

    #[test]
    fn test_carve_records_damage() {
        let mut field = flat_field(400.0);
        let rect = field.carve(100.0, 420.0, 10.0).unwrap();
        assert!(rect.contains(100, 420));
        assert!(!field.is_solid(100.0, 420.0));
        assert!(!field.is_solid(110.0, 420.0));
        assert!(field.is_solid(111.0, 420.0));
        assert_eq!(field.take_damage(), vec![rect]);
        assert!(field.damage.is_empty());
    }

    #[test]
    fn test_carve_off_grid_is_noop() {
        let mut field = flat_field(400.0);
        let before = field.clone();
        assert_eq!(field.carve(-100.0, 400.0, 10.0), None);
        assert_eq!(field.carve(100.0, f32::NAN, 10.0), None);
        assert_eq!(field.carve(100.0, 400.0, -1.0), None);
        assert_eq!(field, before);
    }

    #[test]
    fn test_config_circle_carves_center() {
        let mut config = TerrainConfig {
            heights: vec![50.0; WORLD_WIDTH],
            theme: "greenHills".into(),
            modifications: Vec::new(),
        };
        config.modifications.push(Modification::Circle {
            x: 100.0,
            y: 100.0,
            r: 20.0,
            fill: Fill::Air,
        });
        let field = TerrainField::load_from_config(&config).unwrap();
        assert!(!field.is_solid(100.0, 100.0));
        assert!(field.is_solid(100.0, 130.0));
        assert!(field.damage.is_empty());
    }

    #[test]
    fn test_config_rect_adds_solid() {
        let config = TerrainConfig {
            heights: vec![700.0; WORLD_WIDTH],
            theme: "desert".into(),
            modifications: vec![Modification::Rect {
                x: 200.0,
                y: 300.0,
                w: 50.0,
                h: 10.0,
                fill: Fill::Solid,
            }],
        };
        let field = TerrainField::load_from_config(&config).unwrap();
        assert!(field.is_solid(200.0, 300.0));
        assert!(field.is_solid(249.0, 309.0));
        assert!(!field.is_solid(250.0, 305.0));
        assert!(!field.is_solid(220.0, 310.0));
    }

    #[test]
    fn test_solid_fill_clipped_at_water() {
        let config = TerrainConfig {
            heights: vec![700.0; WORLD_WIDTH],
            theme: "desert".into(),
            modifications: vec![
                Modification::Circle {
                    x: 100.0,
                    y: 790.0,
                    r: 8.0,
                    fill: Fill::Solid,
                },
                Modification::Rect {
                    x: 300.0,
                    y: 740.0,
                    w: 20.0,
                    h: 50.0,
                    fill: Fill::Solid,
                },
            ],
        };
        let field = TerrainField::load_from_config(&config).unwrap();
        assert!(!field.is_solid(100.0, 790.0));
        assert!(!field.is_solid(100.0, 783.0));
        assert!(field.is_solid(310.0, 759.0));
        assert!(!field.is_solid(310.0, 760.0));
        assert!(!field.is_solid(310.0, 789.0));
        assert_eq!(field.export_heights(), config.heights);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TerrainConfig {
            heights: vec![400.0; 10],
            theme: "greenHills".into(),
            modifications: Vec::new(),
        };
        assert!(matches!(
            TerrainField::load_from_config(&config),
            Err(TerrainConfigError::HeightCount { .. })
        ));
    }

    #[test]
    fn test_generate_is_seeded() {
        let params = crate::sim::Theme::VolcanicPeaks.profile().params;
        let a = TerrainField::generate(&params, 3, None, &mut Pcg32::seed_from_u64(9));
        let b = TerrainField::generate(&params, 3, None, &mut Pcg32::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_heights_clamped_and_defaulted() {
        let params = HeightParams {
            base_y: Some(f32::NAN),
            waves: vec![
                Wave {
                    frequency: 0.01,
                    amplitude: 2000.0,
                    offset: 0.0,
                },
                Wave {
                    frequency: f32::NAN,
                    amplitude: 10.0,
                    offset: 0.0,
                },
            ],
            plateaus: vec![Plateau {
                start: 60.0,
                end: 20.0,
                height: 5000.0,
            }],
            noise_level: -4.0,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let heights = heights_from_params(&params, WORLD_WIDTH, 0, &mut rng);
        assert_eq!(heights.len(), WORLD_WIDTH);
        assert!(heights.iter().all(|h| (MIN_SURFACE_Y..=MAX_SURFACE_Y).contains(h)));
        // inverted plateau bounds are swapped, height clamped
        assert!(heights[20..60].iter().all(|&h| h == MAX_SURFACE_Y));
    }

    #[test]
    fn test_default_base() {
        let mut rng = Pcg32::seed_from_u64(1);
        let heights = heights_from_params(&HeightParams::default(), 100, 0, &mut rng);
        assert!(heights.iter().all(|&h| h == DEFAULT_BASE_Y));
    }

    #[test]
    fn test_floating_islands_add_overhangs() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut field = flat_field(600.0);
        FloatingIslands.apply(&mut field, &mut rng);
        let floating = (0..WORLD_WIDTH).any(|x| {
            let top = field.surface_y(x as f32);
            top < 400.0 && !field.is_solid(x as f32, top + 30.0)
        });
        assert!(floating);
        let gap = (0..WORLD_WIDTH).any(|x| !field.is_solid(x as f32, 700.0));
        assert!(gap);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_carve_idempotent(cx in -50.0f32..1650.0, cy in -50.0f32..850.0, r in 0.0f32..80.0) {
                let mut once = flat_field(400.0);
                once.carve(cx, cy, r);
                let mut twice = once.clone();
                twice.carve(cx, cy, r);
                twice.damage.clear();
                once.damage.clear();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_carve_bounded(cx in 0.0f32..1600.0, cy in 300.0f32..760.0, r in 0.0f32..60.0) {
                let before = flat_field(300.0);
                let mut after = before.clone();
                after.carve(cx, cy, r);
                let reach = r + 2.0;
                let x_range = ((cx - reach).max(0.0) as usize)..((cx + reach) as usize).min(WORLD_WIDTH);
                let mut changed_in_window = 0;
                for y in ((cy - reach).max(0.0) as usize)..((cy + reach) as usize).min(WORLD_HEIGHT) {
                    for x in x_range.clone() {
                        if before.is_solid(x as f32, y as f32) != after.is_solid(x as f32, y as f32) {
                            changed_in_window += 1;
                            let dx = x as f32 - cx;
                            let dy = y as f32 - cy;
                            prop_assert!(dx * dx + dy * dy <= r * r);
                        }
                    }
                }
                prop_assert_eq!(before.solid_count() - after.solid_count(), changed_in_window);
            }

            #[test]
            fn prop_heights_roundtrip(heights in proptest::collection::vec(0..=WATER_ROW as u32, WORLD_WIDTH)) {
                let heights: Vec<f32> = heights.into_iter().map(|h| h as f32).collect();
                let config = TerrainConfig {
                    heights: heights.clone(),
                    theme: "greenHills".into(),
                    modifications: Vec::new(),
                };
                let field = TerrainField::load_from_config(&config).unwrap();
                prop_assert_eq!(field.export_heights(), heights);
            }
        }
    }
}
