//! Night Raid - a looping night air-raid vignette
//!
//! Core modules:
//! - `sim`: Scene simulation (planes, bombs, flak, effects, overlay)
//! - `scenery`: Static skyline collaborator (roofline + damage spots)
//! - `app`: Host loop, input/renderer seams, frame statistics
//! - `tuning`: Data-driven scene constants
//! - `settings`: User preferences

pub mod app;
pub mod scenery;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scene configuration defaults (overridable through `Tuning`)
pub mod consts {
    /// Frame rate the host loop paces itself to
    pub const TARGET_FPS: u32 = 60;
    /// Largest frame delta fed to the simulation (stall guard)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward acceleration for bombs and falling planes (px/s²)
    pub const GRAVITY: f32 = 280.0;

    /// Fixed plane population
    pub const PLANE_COUNT: usize = 9;
    /// Sprites are scaled so their longest side fits this
    pub const PLANE_MAX_SIDE: f32 = 150.0;
    /// Lane heights as fractions of the viewport height
    pub const LANES: [f32; 3] = [0.20, 0.28, 0.36];
    /// Cruise speed range as fractions of viewport width per second
    pub const PLANE_SPEED_FRAC: (f32, f32) = (0.06, 0.10);
    /// Off-screen spawn distance beyond the edge (px)
    pub const PLANE_SPAWN_GAP: (f32, f32) = (40.0, 260.0);
    /// How far past the far edge a plane travels before it wraps (px)
    pub const PLANE_WRAP_MARGIN: f32 = 60.0;
    /// Fall distance below the frame before a dying plane respawns (px)
    pub const PLANE_RESPAWN_DEPTH: f32 = 120.0;
    /// Gravity scale while tumbling
    pub const PLANE_FALL_GRAVITY_SCALE: f32 = 0.6;
    /// Horizontal speed scale while tumbling
    pub const PLANE_FALL_DRIFT_SCALE: f32 = 0.5;
    /// Chance per tick that a falling plane leaves a smoke puff
    pub const PLANE_SMOKE_CHANCE: f64 = 0.6;
    /// Upward kick when hit (px/s, negative is up)
    pub const PLANE_HIT_LIFT: f32 = -60.0;
    /// Spin range when hit (rad/s)
    pub const PLANE_HIT_SPIN: f32 = 2.5;
    /// Horizontal speed retained when hit
    pub const PLANE_HIT_DAMPING: f32 = 0.65;
    /// Grace period after a kill (s)
    pub const PLANE_HIT_GRACE: f32 = 2.0;

    /// Seconds between drops per plane
    pub const BOMB_RATE: (f32, f32) = (1.0, 2.0);
    pub const MAX_BOMBS: usize = 30;
    /// Initial downward speed of a released bomb (px/s)
    pub const BOMB_DROP_SPEED: f32 = 160.0;
    /// How long an explosion stays visible (s)
    pub const EXPLOSION_TIME: f32 = 0.60;

    pub const SHAKE_DURATION: f32 = 0.30;
    pub const SHAKE_STRENGTH: f32 = 9.0;
    /// Fraction of the cap each explosion adds
    pub const SHAKE_PULSE: f32 = 0.6;
    /// Minimum shake after a flak kill (s)
    pub const SHAKE_HIT_DURATION: f32 = 0.22;

    pub const MAX_SMOKE: usize = 220;
    /// Smoke at or below this alpha is dropped
    pub const SMOKE_ALPHA_FLOOR: f32 = 6.0;
    pub const MAX_FIRES: usize = 18;
    /// Fire flicker rate (rad/s)
    pub const FIRE_RATE: f32 = 6.0;

    pub const AA_BATTERIES: usize = 3;
    /// Mean seconds between shots per battery
    pub const AA_SPAWN_RATE: f32 = 1.2;
    /// Jitter applied to `AA_SPAWN_RATE`
    pub const AA_RATE_JITTER: (f32, f32) = (0.8, 1.3);
    /// First shot delay after (re)arming
    pub const AA_ARM_DELAY: (f32, f32) = (0.4, 1.1);
    pub const AA_MAX_SHOTS: usize = 6;
    /// Burst altitude band as fractions of viewport height
    pub const AA_ALT_FRAC: (f32, f32) = (0.22, 0.55);
    /// Shots never climb above this y (px)
    pub const AA_CEILING: f32 = 20.0;
    pub const AA_SHOT_DRIFT: f32 = 100.0;
    pub const AA_SHOT_SPEED: f32 = 500.0;
    pub const AA_SHOT_SPEED_JITTER: f32 = 120.0;
    pub const AA_MUZZLE_SPREAD: f32 = 6.0;
    pub const AA_BURST_RADIUS: f32 = 48.0;
    /// Seconds a burst can still hit something
    pub const AA_HIT_WINDOW: f32 = 0.18;
    pub const AA_SMOKE_PUFFS: (u32, u32) = (7, 11);
    pub const AA_PUFF_VY: (f32, f32) = (-36.0, -14.0);
    pub const AA_PUFF_R0: (f32, f32) = (4.5, 8.0);
    pub const AA_PUFF_DR: (f32, f32) = (14.0, 22.0);
    pub const AA_PUFF_ALPHA0: (f32, f32) = (120.0, 160.0);
    pub const AA_PUFF_DA: (f32, f32) = (130.0, 190.0);
    pub const AA_PUFF_SPREAD: f32 = 18.0;

    /// Seconds from start until the title card slides in
    pub const OVERLAY_DELAY: f32 = 10.0;
    pub const OVERLAY_SLIDE: f32 = 1.4;
    /// Gap below the frame where the card waits (px)
    pub const OVERLAY_OFFSCREEN_GAP: f32 = 20.0;

    /// City occupies this fraction of the viewport bottom
    pub const CITY_FRACTION: f32 = 0.30;
}

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "viewport must be non-empty");
        Self { width, height }
    }

    /// Ground line bombs explode on
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.height - 2.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Cubic ease-out on [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Uniform sample from an inclusive `(lo, hi)` range
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    debug_assert!(lo <= hi, "inverted range ({lo}, {hi})");
    rng.random_range(lo..=hi)
}

/// Uniform integer sample from an inclusive `(lo, hi)` range
#[inline]
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (u32, u32)) -> u32 {
    debug_assert!(lo <= hi, "inverted range ({lo}, {hi})");
    rng.random_range(lo..=hi)
}
