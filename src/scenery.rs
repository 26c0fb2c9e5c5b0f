//! Static skyline collaborator
//!
//! The simulation only needs three things from the scenery: where the city
//! starts, the roofline height at a given x, and a list of damage spots to set
//! on fire. Drawing the skyline is the renderer's business.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Viewport;
use crate::consts::CITY_FRACTION;

/// Handle for one generated backdrop; changes every rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BackdropId(pub u64);

/// What the simulation reads from the static backdrop
pub trait Scenery {
    /// Top of the city block (y of the tallest possible building base)
    fn city_base_y(&self) -> f32;
    /// Roofline height for a horizontal position, `city_base_y` if no building
    fn roof_height_at(&self, x: f32) -> f32;
    /// Candidate fire locations
    fn ignition_points(&self) -> &[Vec2];
    /// Identifies the current backdrop image
    fn backdrop(&self) -> BackdropId;
    /// Regenerate for a new viewport
    fn rebuild(&mut self, viewport: Viewport);
}

/// One building footprint, optionally with a peaked roof
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub left: f32,
    pub right: f32,
    pub rect_top: f32,
    pub base_line_y: f32,
    pub peak: Option<Vec2>,
}

impl Building {
    fn roof_at(&self, x: f32) -> f32 {
        let Some(peak) = self.peak else {
            return self.rect_top;
        };
        let frac = if x <= peak.x {
            (x - self.left) / (peak.x - self.left).max(1.0)
        } else {
            (self.right - x) / (self.right - peak.x).max(1.0)
        };
        (self.base_line_y - frac * (self.base_line_y - peak.y)).floor()
    }
}

/// Maximum damage spots kept after shuffling
const MAX_DAMAGE_SPOTS: usize = 20;

/// Seeded procedural city skyline (geometry only)
#[derive(Debug, Clone)]
pub struct Skyline {
    seed: u64,
    viewport: Viewport,
    city_base_y: f32,
    buildings: Vec<Building>,
    damage_spots: Vec<Vec2>,
    backdrop: BackdropId,
}

impl Skyline {
    pub fn generate(viewport: Viewport, seed: u64) -> Self {
        let mut skyline = Self {
            seed,
            viewport,
            city_base_y: 0.0,
            buildings: Vec::new(),
            damage_spots: Vec::new(),
            backdrop: BackdropId::default(),
        };
        skyline.layout();
        skyline
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    fn layout(&mut self) {
        let Viewport { width: sw, height: sh } = self.viewport;
        let city_h = (sh * CITY_FRACTION).floor();
        let y_base = sh - city_h;
        let mut rng = Pcg32::seed_from_u64(self.seed);

        let int = |v: f32| (v as u32).max(1);
        let mut buildings = Vec::new();
        let mut spots = Vec::new();
        let mut x = 0.0;
        while x < sw {
            let bw = rng.random_range(int(sw * 0.04)..=int(sw * 0.08).max(int(sw * 0.04))) as f32;
            let bh = rng.random_range(int(city_h * 0.4)..=int(city_h)) as f32;
            let left = x;
            let top = y_base + (city_h - bh);
            let base_line_y = top + 6.0;
            let peak = rng
                .random_bool(0.5)
                .then(|| Vec2::new((left + bw / 2.0).floor(), top - (bh * 0.18).floor()));

            if rng.random_bool(0.75) && bw > 12.0 && bh > 16.0 {
                for _ in 0..rng.random_range(1..=3) {
                    let hx = rng.random_range(left + 6.0..=left + bw - 6.0).floor();
                    let hy = rng.random_range(top + 8.0..=top + bh - 8.0).floor();
                    if rng.random_bool(0.8) {
                        spots.push(Vec2::new(hx, hy - 2.0));
                    }
                }
            }

            buildings.push(Building {
                left,
                right: left + bw,
                rect_top: top,
                base_line_y,
                peak,
            });
            let gap_lo = int(sw * 0.006);
            x += bw + rng.random_range(gap_lo..=int(sw * 0.018).max(gap_lo)) as f32;
        }

        spots.shuffle(&mut rng);
        spots.truncate(MAX_DAMAGE_SPOTS);

        self.city_base_y = y_base;
        self.buildings = buildings;
        self.damage_spots = spots;
        self.backdrop = BackdropId(self.backdrop.0 + 1);
    }
}

impl Scenery for Skyline {
    fn city_base_y(&self) -> f32 {
        self.city_base_y
    }

    fn roof_height_at(&self, x: f32) -> f32 {
        self.buildings
            .iter()
            .find(|b| b.left <= x && x <= b.right)
            .map(|b| b.roof_at(x))
            .unwrap_or(self.city_base_y)
    }

    fn ignition_points(&self) -> &[Vec2] {
        &self.damage_spots
    }

    fn backdrop(&self) -> BackdropId {
        self.backdrop
    }

    fn rebuild(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.layout();
        log::info!(
            "Skyline rebuilt for {}x{}: {} buildings, {} damage spots",
            viewport.width,
            viewport.height,
            self.buildings.len(),
            self.damage_spots.len()
        );
    }
}
