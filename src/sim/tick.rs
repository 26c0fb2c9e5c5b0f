//! Per-frame scene tick
//!
//! Advances every subsystem once, in a fixed order, against one shared clock.

use super::collision;
use super::state::Scene;
use crate::Viewport;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Stop the host loop
    pub quit: bool,
    /// Show/hide the debug overlay
    pub toggle_debug: bool,
    /// New window size, if it changed since the last tick
    pub resize: Option<Viewport>,
}

/// Advance the scene by `dt` seconds
pub fn tick(scene: &mut Scene, input: &TickInput, dt: f32) {
    debug_assert!(dt >= 0.0, "dt must not be negative");

    // Input first; quit only takes effect when the host checks it
    if input.quit {
        scene.quit = true;
    }
    if input.toggle_debug {
        scene.show_debug = !scene.show_debug;
    }
    if let Some(viewport) = input.resize {
        if viewport != scene.viewport {
            scene.resize(viewport);
        }
    }

    scene.time_ticks += 1;
    scene.now += dt as f64;
    let now = scene.now;

    let Scene {
        tuning,
        rng,
        squadron,
        bombs,
        flak,
        effects,
        overlay,
        scenery,
        shake_enabled,
        ..
    } = scene;

    squadron.advance(dt, now, tuning, rng, bombs, &mut effects.smoke);
    bombs.advance(dt, now, tuning, &mut effects.shake);
    flak.advance(dt, now, tuning, rng, &mut effects.smoke);

    let kills = collision::resolve(flak.bursts(), squadron, &mut effects.shake, now, tuning, rng);
    if kills > 1 {
        log::debug!("{kills} planes downed at {now:.2}s");
    }

    effects.advance(dt, now, tuning, rng, *shake_enabled);
    overlay.update(now, scenery.backdrop());
}
