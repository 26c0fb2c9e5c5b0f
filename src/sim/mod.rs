//! Scene simulation module
//!
//! All moving parts of the night raid live here:
//! - Single-threaded, fixed-order tick
//! - Seeded RNG owned by the scene
//! - Bounded pools for every dynamic collection
//! - No rendering or platform dependencies

pub mod bombs;
pub mod collision;
pub mod effects;
pub mod flak;
pub mod overlay;
pub mod planes;
pub mod pool;
pub mod state;
pub mod tick;

pub use bombs::Bombs;
pub use collision::{HitResult, burst_contains, resolve, resolve_burst};
pub use effects::{Effects, beam_extent, explosion_alpha, explosion_radius};
pub use flak::{Battery, Flak};
pub use overlay::{Composite, Overlay, OverlayCard, OverlayPhase};
pub use planes::{Heading, Squadron};
pub use pool::{RecentPool, SlotPool};
pub use state::{
    AaShot, Bomb, Burst, CameraShake, Facing, Fire, FlagAnchor, Plane, Scene, Searchlight,
    SimTime, Smoke, SpriteInfo,
};
pub use tick::{TickInput, tick};
