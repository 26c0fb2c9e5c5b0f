//! Data-driven scene constants
//!
//! Every number the simulation reads lives here so a scene can be retuned from
//! a JSON file without recompiling. Missing keys fall back to `consts`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from loading a tuning or settings file
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// A value that would break a pool or range invariant
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read config: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Scene tuning, fixed for the lifetime of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub target_fps: u32,
    pub gravity: f32,

    // === Planes ===
    pub plane_count: usize,
    pub plane_max_side: f32,
    pub lanes: Vec<f32>,
    pub plane_speed_frac: (f32, f32),
    pub plane_spawn_gap: (f32, f32),
    pub plane_smoke_chance: f64,
    pub plane_hit_grace: f32,

    // === Bombs ===
    pub bomb_rate: (f32, f32),
    pub max_bombs: usize,
    pub bomb_drop_speed: f32,
    pub explosion_time: f32,

    // === Shake ===
    pub shake_duration: f32,
    pub shake_strength: f32,

    // === Smoke & fire ===
    pub max_smoke: usize,
    pub max_fires: usize,

    // === Flak ===
    pub aa_batteries: usize,
    pub aa_spawn_rate: f32,
    pub aa_max_shots: usize,
    pub aa_alt_frac: (f32, f32),
    pub aa_ceiling: f32,
    pub aa_burst_radius: f32,
    pub aa_hit_window: f32,
    pub aa_smoke_puffs: (u32, u32),
    pub aa_puff_vy: (f32, f32),
    pub aa_puff_r0: (f32, f32),
    pub aa_puff_dr: (f32, f32),
    pub aa_puff_alpha0: (f32, f32),
    pub aa_puff_da: (f32, f32),
    pub aa_puff_spread: f32,

    // === Title overlay ===
    pub overlay_delay: f32,
    pub overlay_slide: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            gravity: GRAVITY,

            plane_count: PLANE_COUNT,
            plane_max_side: PLANE_MAX_SIDE,
            lanes: LANES.to_vec(),
            plane_speed_frac: PLANE_SPEED_FRAC,
            plane_spawn_gap: PLANE_SPAWN_GAP,
            plane_smoke_chance: PLANE_SMOKE_CHANCE,
            plane_hit_grace: PLANE_HIT_GRACE,

            bomb_rate: BOMB_RATE,
            max_bombs: MAX_BOMBS,
            bomb_drop_speed: BOMB_DROP_SPEED,
            explosion_time: EXPLOSION_TIME,

            shake_duration: SHAKE_DURATION,
            shake_strength: SHAKE_STRENGTH,

            max_smoke: MAX_SMOKE,
            max_fires: MAX_FIRES,

            aa_batteries: AA_BATTERIES,
            aa_spawn_rate: AA_SPAWN_RATE,
            aa_max_shots: AA_MAX_SHOTS,
            aa_alt_frac: AA_ALT_FRAC,
            aa_ceiling: AA_CEILING,
            aa_burst_radius: AA_BURST_RADIUS,
            aa_hit_window: AA_HIT_WINDOW,
            aa_smoke_puffs: AA_SMOKE_PUFFS,
            aa_puff_vy: AA_PUFF_VY,
            aa_puff_r0: AA_PUFF_R0,
            aa_puff_dr: AA_PUFF_DR,
            aa_puff_alpha0: AA_PUFF_ALPHA0,
            aa_puff_da: AA_PUFF_DA,
            aa_puff_spread: AA_PUFF_SPREAD,

            overlay_delay: OVERLAY_DELAY,
            overlay_slide: OVERLAY_SLIDE,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path`, or fall back to defaults with a warning
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Seconds per frame at the target rate
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.target_fps as f32
    }

    /// Reject values the simulation treats as programming errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn range(name: &str, (lo, hi): (f32, f32)) -> Result<(), ConfigError> {
            if lo.is_finite() && hi.is_finite() && lo <= hi {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} range ({lo}, {hi}) is inverted")))
            }
        }
        fn positive(name: &str, v: f32) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        }
        fn non_negative(name: &str, v: f32) -> Result<(), ConfigError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must not be negative, got {v}")))
            }
        }

        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".into()));
        }
        if self.plane_count == 0 || self.lanes.is_empty() {
            return Err(ConfigError::Invalid("need at least one plane and one lane".into()));
        }
        if self.max_bombs == 0 || self.max_smoke == 0 || self.aa_max_shots == 0 {
            return Err(ConfigError::Invalid("pool capacities must be positive".into()));
        }
        if self.aa_smoke_puffs.0 > self.aa_smoke_puffs.1 {
            return Err(ConfigError::Invalid("aa_smoke_puffs range is inverted".into()));
        }
        if !(0.0..=1.0).contains(&self.plane_smoke_chance) {
            return Err(ConfigError::Invalid("plane_smoke_chance must be a probability".into()));
        }

        positive("gravity", self.gravity)?;
        positive("plane_max_side", self.plane_max_side)?;
        positive("explosion_time", self.explosion_time)?;
        positive("shake_duration", self.shake_duration)?;
        positive("aa_spawn_rate", self.aa_spawn_rate)?;
        positive("aa_hit_window", self.aa_hit_window)?;
        positive("overlay_slide", self.overlay_slide)?;
        positive("aa_burst_radius", self.aa_burst_radius)?;

        non_negative("overlay_delay", self.overlay_delay)?;
        non_negative("bomb_drop_speed", self.bomb_drop_speed)?;
        non_negative("aa_ceiling", self.aa_ceiling)?;
        non_negative("aa_puff_spread", self.aa_puff_spread)?;
        non_negative("plane_spawn_gap", self.plane_spawn_gap.0)?;
        non_negative("plane_speed_frac", self.plane_speed_frac.0)?;
        non_negative("aa_alt_frac", self.aa_alt_frac.0)?;
        non_negative("shake_strength", self.shake_strength)?;
        if self.lanes.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(ConfigError::Invalid("lanes must be fractions of the height".into()));
        }

        range("plane_speed_frac", self.plane_speed_frac)?;
        range("plane_spawn_gap", self.plane_spawn_gap)?;
        range("bomb_rate", self.bomb_rate)?;
        range("aa_alt_frac", self.aa_alt_frac)?;
        range("aa_puff_vy", self.aa_puff_vy)?;
        range("aa_puff_r0", self.aa_puff_r0)?;
        range("aa_puff_dr", self.aa_puff_dr)?;
        range("aa_puff_alpha0", self.aa_puff_alpha0)?;
        range("aa_puff_da", self.aa_puff_da)?;
        Ok(())
    }
}
