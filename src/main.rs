//! Night Raid entry point
//!
//! Runs the scene headless for a fixed number of seconds, paced to the target
//! frame rate, with a renderer that reports to the log.
//!
//! Usage: `night-raid [seconds] [seed]`. Reads `settings.json` and
//! `tuning.json` from the working directory when present.

use std::thread;
use std::time::{Duration, Instant};

use night_raid::app::{App, LogRenderer, ScriptedInput};
use night_raid::scenery::Skyline;
use night_raid::sim::{Scene, SpriteInfo};
use night_raid::{Settings, Tuning, Viewport};

const SETTINGS_PATH: &str = "settings.json";
const TUNING_PATH: &str = "tuning.json";
const DEFAULT_SECONDS: f32 = 15.0;

/// Sprite boxes for the bundled plane art (width, height)
const PLANE_SPRITES: [(f32, f32); 3] = [(300.0, 100.0), (260.0, 90.0), (220.0, 80.0)];

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Night Raid (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(rand::random);

    let settings = Settings::load_or_default(SETTINGS_PATH);
    let tuning = Tuning::load_or_default(TUNING_PATH);
    let viewport = Viewport::new(settings.width as f32, settings.height as f32);

    let sprites: Vec<SpriteInfo> = PLANE_SPRITES
        .iter()
        .enumerate()
        .map(|(id, (w, h))| SpriteInfo::fitted(id, *w, *h, tuning.plane_max_side))
        .collect();

    let frame_dt = tuning.frame_dt();
    let frames = (seconds / frame_dt).ceil() as u64;
    log::info!("Seed {seed}, running {seconds}s ({frames} frames)");

    let skyline = Skyline::generate(viewport, seed);
    let mut scene = Scene::new(seed, tuning, viewport, &sprites, Box::new(skyline));
    scene.apply_settings(&settings);

    let input = ScriptedInput::new().quit_at(frames.saturating_sub(1));
    let mut app = App::new(scene, input, LogRenderer::new(u64::from(scene_fps(frame_dt))));

    let budget = Duration::from_secs_f32(frame_dt);
    let mut last = Instant::now();
    app.run(|| {
        // Pace to the target rate, then report the real delta
        let spent = last.elapsed();
        if spent < budget {
            thread::sleep(budget - spent);
        }
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        dt
    });

    let renderer = app.renderer();
    log::info!(
        "Peak smoke {} / bombs {}, overlay baked {} time(s)",
        renderer.peak_smoke,
        renderer.peak_bombs,
        app.scene().overlay.bake_count()
    );
}

/// Frames per log line: one per simulated second
fn scene_fps(frame_dt: f32) -> u32 {
    (1.0 / frame_dt).round().max(1.0) as u32
}
