//! Scene state and core entity types
//!
//! Everything the renderer reads lives here. Subsystems own the update logic;
//! these types only carry data plus small derived queries.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bombs::Bombs;
use super::effects::Effects;
use super::flak::Flak;
use super::overlay::{Overlay, OverlayCard};
use super::planes::Squadron;
use crate::scenery::Scenery;
use crate::{Settings, Tuning, Viewport};

/// Simulated seconds since the scene started
pub type SimTime = f64;

/// Which way a sprite's artwork points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

/// Bounding box of a decoded plane sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteInfo {
    /// Index into the renderer's sprite table
    pub id: usize,
    pub size: Vec2,
}

impl SpriteInfo {
    /// Scale `(w, h)` down so the longest side fits `max_side`
    pub fn fitted(id: usize, w: f32, h: f32, max_side: f32) -> Self {
        let scale = (max_side / w.max(h)).min(1.0);
        Self {
            id,
            size: Vec2::new((w * scale).floor(), (h * scale).floor()),
        }
    }

    /// Stand-in box used when the sprite failed to load
    pub fn placeholder(id: usize, max_side: f32) -> Self {
        Self::fitted(id, 120.0, 40.0, max_side)
    }
}

/// A patrolling bomber
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Top-left of the sprite
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation (radians), only non-zero while tumbling
    pub angle: f32,
    /// Angular velocity (rad/s)
    pub spin: f32,
    pub on_fire: bool,
    pub dying: bool,
    pub invulnerable_until: SimTime,
    pub next_bomb_due: SimTime,
    pub sprite: SpriteInfo,
    pub original_facing: Facing,
}

impl Plane {
    /// Visual center, used for hit tests and smoke
    pub fn center(&self) -> Vec2 {
        self.pos + self.sprite.size * 0.5
    }

    /// Where bombs leave the fuselage
    pub fn bomb_bay(&self) -> Vec2 {
        self.pos + Vec2::new(self.sprite.size.x * 0.5, self.sprite.size.y * 0.85)
    }

    pub fn heading_right(&self) -> bool {
        self.vel.x > 0.0
    }

    /// Whether the renderer must mirror the sprite
    pub fn flipped(&self) -> bool {
        match self.original_facing {
            Facing::Left => self.heading_right(),
            Facing::Right => !self.heading_right(),
        }
    }

    /// Alive and outside its grace period
    pub fn targetable(&self, now: SimTime) -> bool {
        !self.dying && now >= self.invulnerable_until
    }
}

/// A falling bomb, then its explosion
#[derive(Debug, Clone, PartialEq)]
pub struct Bomb {
    pub pos: Vec2,
    pub vy: f32,
    pub exploded: bool,
    pub exploded_at: SimTime,
    /// Height at which it detonates
    pub target_y: f32,
}

impl Bomb {
    /// Explosion progress in [0, 1], `None` while still falling
    pub fn explosion_progress(&self, now: SimTime, explosion_time: f32) -> Option<f32> {
        self.exploded
            .then(|| (((now - self.exploded_at) / explosion_time as f64) as f32).clamp(0.0, 1.0))
    }
}

/// Interceptor shot climbing toward its burst altitude
#[derive(Debug, Clone, PartialEq)]
pub struct AaShot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target_y: f32,
    pub alive: bool,
}

/// Flak burst, hit-testable for a short window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub pos: Vec2,
    pub created_at: SimTime,
    pub radius: f32,
}

impl Burst {
    pub fn age(&self, now: SimTime) -> f32 {
        (now - self.created_at) as f32
    }
}

/// Smoke puff
#[derive(Debug, Clone, PartialEq)]
pub struct Smoke {
    pub pos: Vec2,
    pub radius: f32,
    pub vy: f32,
    /// 0-255 scale
    pub alpha: f32,
    /// Radius growth (px/s)
    pub growth: f32,
    /// Alpha loss (per second)
    pub fade: f32,
    /// Grayscale level
    pub tone: u8,
}

/// Rooftop fire, purely decorative
#[derive(Debug, Clone, PartialEq)]
pub struct Fire {
    pub pos: Vec2,
    pub base_radius: f32,
    pub phase: f32,
}

impl Fire {
    /// Current flame radius
    pub fn size(&self) -> f32 {
        self.base_radius * (1.0 + 0.25 * self.phase.sin() + 0.08 * (3.0 * self.phase).sin())
    }
}

/// Searchlight sweeping from the ground line
#[derive(Debug, Clone, PartialEq)]
pub struct Searchlight {
    pub base: Vec2,
    pub phase: f32,
    /// Phase rate (rad/s)
    pub speed: f32,
    /// Sweep amplitude (degrees)
    pub amplitude: f32,
}

impl Searchlight {
    /// Beam direction in degrees, -90 is straight up
    pub fn angle_deg(&self) -> f32 {
        -90.0 + (self.phase + std::f32::consts::PI).sin() * self.amplitude
    }
}

/// Flag planted on the roofline at mid-screen
#[derive(Debug, Clone, PartialEq)]
pub struct FlagAnchor {
    pub x: f32,
    pub roof_y: f32,
    pub sway_seed: f32,
}

impl FlagAnchor {
    /// Vertical wobble of the cloth (px)
    pub fn wobble(&self, now: SimTime) -> f32 {
        ((now as f32 * 0.9) + self.sway_seed).sin() * 3.0
    }
}

/// Screen shake, shared by every explosion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraShake {
    pub until: SimTime,
    pub strength: f32,
}

impl CameraShake {
    pub fn active(&self, now: SimTime) -> bool {
        now < self.until
    }

    /// Add `amount` (capped) and keep shaking until at least `now + duration`
    pub fn trigger(&mut self, now: SimTime, duration: f32, amount: f32, cap: f32) {
        if !self.active(now) {
            self.strength = 0.0;
        }
        self.until = self.until.max(now + duration as f64);
        self.strength = (self.strength + amount).min(cap);
    }

    /// Current amplitude, fading linearly to zero at expiry
    pub fn magnitude(&self, now: SimTime, duration: f32) -> f32 {
        if !self.active(now) {
            return 0.0;
        }
        let remaining = ((self.until - now) / duration as f64) as f32;
        self.strength * remaining.clamp(0.0, 1.0)
    }
}

/// Complete scene state, owned by the host loop
pub struct Scene {
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Simulation clock
    pub now: SimTime,
    pub time_ticks: u64,
    /// Injectable randomness
    pub rng: Pcg32,
    pub squadron: Squadron,
    pub bombs: Bombs,
    pub flak: Flak,
    pub effects: Effects,
    pub overlay: Overlay,
    pub flag: FlagAnchor,
    pub scenery: Box<dyn Scenery>,
    /// Debug overlay (FPS counter) visible
    pub show_debug: bool,
    /// Apply shake offsets at all
    pub shake_enabled: bool,
    /// Host loop should stop
    pub quit: bool,
}

impl Scene {
    /// Build a scene for `viewport` with one sprite box per plane type
    pub fn new(
        seed: u64,
        tuning: Tuning,
        viewport: Viewport,
        sprites: &[SpriteInfo],
        scenery: Box<dyn Scenery>,
    ) -> Self {
        debug_assert!(tuning.validate().is_ok(), "tuning must be validated before use");
        let mut rng = Pcg32::seed_from_u64(seed);
        let now = 0.0;

        let squadron = Squadron::new(&tuning, viewport, sprites, now, &mut rng);
        let bombs = Bombs::new(tuning.max_bombs);
        let flak = Flak::new(&tuning, viewport, scenery.city_base_y(), now, &mut rng);
        let effects = Effects::new(&tuning, viewport, scenery.ignition_points(), &mut rng);
        let overlay = Overlay::new(
            OverlayCard::for_viewport(viewport),
            viewport,
            now + tuning.overlay_delay as f64,
            tuning.overlay_slide,
        );
        let flag = FlagAnchor::place(viewport, scenery.as_ref(), &mut rng);

        log::info!(
            "Scene ready: {}x{}, {} planes, {} batteries, {} fires",
            viewport.width,
            viewport.height,
            squadron.len(),
            flak.batteries.len(),
            effects.fires.len()
        );

        Self {
            tuning,
            viewport,
            now,
            time_ticks: 0,
            rng,
            squadron,
            bombs,
            flak,
            effects,
            overlay,
            flag,
            scenery,
            show_debug: false,
            shake_enabled: true,
            quit: false,
        }
    }

    /// Apply viewer preferences that affect presentation
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.shake_enabled = settings.effective_screen_shake();
        self.show_debug = settings.show_fps;
    }

    /// Re-derive every viewport-dependent layout value
    pub fn resize(&mut self, viewport: Viewport) {
        log::info!("Resize to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.scenery.rebuild(viewport);

        let city_base_y = self.scenery.city_base_y();
        self.squadron.resize(&self.tuning, viewport);
        self.flak.resize(&self.tuning, viewport, city_base_y, self.now, &mut self.rng);
        self.effects
            .resize(&self.tuning, viewport, self.scenery.ignition_points(), &mut self.rng);
        self.flag = FlagAnchor::place(viewport, self.scenery.as_ref(), &mut self.rng);
        self.overlay.resize(OverlayCard::for_viewport(viewport), viewport);
    }
}

impl FlagAnchor {
    fn place(viewport: Viewport, scenery: &dyn Scenery, rng: &mut Pcg32) -> Self {
        let x = (viewport.width * 0.5).floor();
        Self {
            x,
            roof_y: scenery.roof_height_at(x),
            sway_seed: crate::uniform(rng, (0.0, 1000.0)),
        }
    }
}
