//! Host loop and its seams
//!
//! `App` owns the scene and drives it one host frame at a time: poll input,
//! clamp the frame delta, tick, then hand a read-only `Frame` to the renderer.
//! Windowing and drawing stay behind the `InputSource` and `Renderer` traits.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::MAX_FRAME_DT;
use crate::sim::effects::{explosion_alpha, explosion_radius};
use crate::{Tuning, Viewport};
use crate::scenery::BackdropId;
use crate::sim::{
    Bombs, Effects, Flak, FlagAnchor, Overlay, Plane, Scene, SimTime, TickInput, tick,
};

/// Everything a renderer needs for one frame, borrowed from the scene
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub now: SimTime,
    pub viewport: Viewport,
    pub tuning: &'a Tuning,
    pub backdrop: BackdropId,
    pub planes: &'a [Plane],
    pub bombs: &'a Bombs,
    pub flak: &'a Flak,
    pub effects: &'a Effects,
    pub overlay: &'a Overlay,
    pub flag: &'a FlagAnchor,
    /// Offset applied to every draw call this frame
    pub shake_offset: Vec2,
    pub show_debug: bool,
    pub fps: u32,
}

impl<'a> Frame<'a> {
    pub fn capture(scene: &'a Scene, fps: u32) -> Self {
        Self {
            now: scene.now,
            viewport: scene.viewport,
            tuning: &scene.tuning,
            backdrop: scene.scenery.backdrop(),
            planes: scene.squadron.planes(),
            bombs: &scene.bombs,
            flak: &scene.flak,
            effects: &scene.effects,
            overlay: &scene.overlay,
            flag: &scene.flag,
            shake_offset: scene.effects.shake_offset,
            show_debug: scene.show_debug,
            fps,
        }
    }
}

/// Draws a frame snapshot
pub trait Renderer {
    fn present(&mut self, frame: &Frame<'_>);
}

/// Produces the input for the next tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Rolling frame rate over the last 60 frames
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
    frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            frames: 0,
        }
    }
}

impl FrameStats {
    /// Record a frame finishing at host time `time` (seconds)
    pub fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();
        self.frames += 1;

        // Oldest slot is the one we will overwrite next
        if self.frames >= self.frame_times.len() as u64 {
            let elapsed = time - self.frame_times[self.frame_index];
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Owns the scene and runs it against an input source and a renderer
pub struct App<I, R> {
    scene: Scene,
    input: I,
    renderer: R,
    stats: FrameStats,
    host_time: f64,
}

impl<I: InputSource, R: Renderer> App<I, R> {
    pub fn new(scene: Scene, input: I, renderer: R) -> Self {
        Self {
            scene,
            input,
            renderer,
            stats: FrameStats::default(),
            host_time: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run one host frame of `dt` seconds; false once the scene has quit
    pub fn frame(&mut self, dt: f32) -> bool {
        if self.scene.quit {
            return false;
        }

        let dt = dt.max(0.0);
        if dt > MAX_FRAME_DT {
            log::debug!("Frame delta {dt:.3}s clamped to {MAX_FRAME_DT}s");
        }
        let input = self.input.poll();
        tick(&mut self.scene, &input, dt.min(MAX_FRAME_DT));

        self.host_time += dt as f64;
        self.stats.record(self.host_time);

        let frame = Frame::capture(&self.scene, self.stats.fps());
        self.renderer.present(&frame);
        true
    }

    /// Keep running frames until the scene quits; returns the frame count
    pub fn run(&mut self, mut next_dt: impl FnMut() -> f32) -> u64 {
        let start = self.stats.frames();
        while self.frame(next_dt()) {}
        let frames = self.stats.frames() - start;
        log::info!(
            "Stopped after {frames} frames ({:.1}s simulated, {} fps)",
            self.scene.now,
            self.stats.fps()
        );
        frames
    }
}

/// Input replayed from a frame-indexed script
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frame: u64,
    events: BTreeMap<u64, TickInput>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `input` on frame `frame` (zero-based)
    pub fn at(mut self, frame: u64, input: TickInput) -> Self {
        self.events.insert(frame, input);
        self
    }

    /// Resize to `viewport` on frame `frame`
    pub fn resize_at(self, frame: u64, viewport: Viewport) -> Self {
        self.at(
            frame,
            TickInput {
                resize: Some(viewport),
                ..Default::default()
            },
        )
    }

    /// Ask to quit on frame `frame`
    pub fn quit_at(self, frame: u64) -> Self {
        self.at(
            frame,
            TickInput {
                quit: true,
                ..Default::default()
            },
        )
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        let input = self.events.remove(&self.frame).unwrap_or_default();
        self.frame += 1;
        input
    }
}

/// Headless renderer that summarizes the scene in the log
#[derive(Debug, Clone)]
pub struct LogRenderer {
    every: u64,
    presented: u64,
    /// Most smoke puffs seen in any frame
    pub peak_smoke: usize,
    /// Most bombs in flight or exploding in any frame
    pub peak_bombs: usize,
    /// Largest fireball radius drawn so far
    pub peak_fireball: f32,
}

impl LogRenderer {
    /// Log a summary line every `every` frames
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            presented: 0,
            peak_smoke: 0,
            peak_bombs: 0,
            peak_fireball: 0.0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Renderer for LogRenderer {
    fn present(&mut self, frame: &Frame<'_>) {
        self.presented += 1;
        self.peak_smoke = self.peak_smoke.max(frame.effects.smoke.len());
        self.peak_bombs = self.peak_bombs.max(frame.bombs.len());

        let explosion_time = frame.tuning.explosion_time;
        let fireballs: Vec<f32> = frame
            .bombs
            .iter()
            .filter_map(|b| b.explosion_progress(frame.now, explosion_time))
            .collect();
        for t in &fireballs {
            self.peak_fireball = self.peak_fireball.max(explosion_radius(*t));
        }

        if self.presented % self.every != 0 {
            return;
        }

        let dying = frame.planes.iter().filter(|p| p.dying).count();
        log::info!(
            "t={:.1}s planes={} (down {}) bombs={} shots={} bursts={} smoke={} overlay={:?}",
            frame.now,
            frame.planes.len(),
            dying,
            frame.bombs.len(),
            frame.flak.shot_count(),
            frame.flak.bursts().len(),
            frame.effects.smoke.len(),
            frame.overlay.phase(),
        );
        let brightest = fireballs.iter().map(|t| explosion_alpha(*t)).fold(0.0, f32::max);
        let mirrored = frame.planes.iter().filter(|p| p.flipped()).count();
        let beams: Vec<String> = frame
            .effects
            .searchlights
            .iter()
            .map(|l| format!("{:.0}", l.angle_deg()))
            .collect();
        log::debug!(
            "fireballs={} (alpha {:.0}) mirrored={} beams=[{}] flag=({}, {:.1})",
            fireballs.len(),
            brightest,
            mirrored,
            beams.join(", "),
            frame.flag.x,
            frame.flag.roof_y + frame.flag.wobble(frame.now),
        );
        if frame.show_debug {
            log::info!(
                "fps={} shake=({}, {})",
                frame.fps,
                frame.shake_offset.x,
                frame.shake_offset.y
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::scenery::Skyline;
    use crate::sim::OverlayPhase;

    const DT: f32 = 1.0 / 60.0;

    fn scene(seed: u64) -> Scene {
        let viewport = Viewport::default();
        Scene::new(
            seed,
            Tuning::default(),
            viewport,
            &[],
            Box::new(Skyline::generate(viewport, seed)),
        )
    }

    /// Remembers what each presented frame looked like
    #[derive(Default)]
    struct Recorder {
        times: Vec<SimTime>,
        viewports: Vec<Viewport>,
        phases: Vec<OverlayPhase>,
    }

    impl Renderer for Recorder {
        fn present(&mut self, frame: &Frame<'_>) {
            self.times.push(frame.now);
            self.viewports.push(frame.viewport);
            self.phases.push(frame.overlay.phase());
        }
    }

    #[test]
    fn test_frame_stats_fps() {
        let mut stats = FrameStats::default();
        for i in 1..=120 {
            stats.record(i as f64 / 60.0);
        }
        assert_eq!(stats.fps(), 60);
        assert_eq!(stats.frames(), 120);
    }

    #[test]
    fn test_frame_stats_warms_up() {
        let mut stats = FrameStats::default();
        for i in 1..30 {
            stats.record(i as f64 / 60.0);
        }
        assert_eq!(stats.fps(), 0);
    }

    #[test]
    fn test_quit_seen_on_next_frame() {
        let input = ScriptedInput::new().quit_at(3);
        let mut app = App::new(scene(1), input, Recorder::default());
        let frames = app.run(|| DT);
        // Frame 3 still presents; frame 4 sees the flag and stops
        assert_eq!(frames, 4);
        assert_eq!(app.renderer().times.len(), 4);
        assert!(app.scene().quit);
        assert!(!app.frame(DT));
    }

    #[test]
    fn test_large_delta_clamped() {
        let input = ScriptedInput::new().quit_at(1);
        let mut app = App::new(scene(2), input, Recorder::default());
        assert!(app.frame(5.0));
        assert!((app.scene().now - MAX_FRAME_DT as f64).abs() < 1e-6);
        assert!(app.frame(-1.0));
        assert!((app.scene().now - MAX_FRAME_DT as f64).abs() < 1e-6);
    }

    #[test]
    fn test_scripted_resize_reaches_renderer() {
        let viewport = Viewport::new(800.0, 600.0);
        let input = ScriptedInput::new().resize_at(2, viewport).quit_at(5);
        let mut app = App::new(scene(3), input, Recorder::default());
        app.run(|| DT);
        let seen = &app.renderer().viewports;
        assert_eq!(seen[1], Viewport::default());
        assert_eq!(seen[2], viewport);
        assert_eq!(app.scene().viewport, viewport);
    }

    #[test]
    fn test_overlay_visible_through_frames() {
        let input = ScriptedInput::new().quit_at(12 * 60);
        let mut app = App::new(scene(4), input, Recorder::default());
        app.run(|| DT);
        let phases = &app.renderer().phases;
        assert_eq!(phases[0], OverlayPhase::Dormant);
        assert!(phases.iter().any(|p| matches!(p, OverlayPhase::Sliding { .. })));
        assert_eq!(phases.last(), Some(&OverlayPhase::Baked));
        assert_eq!(app.scene().overlay.bake_count(), 1);
    }

    #[test]
    fn test_log_renderer_tracks_peaks() {
        let input = ScriptedInput::new().quit_at(600);
        let mut app = App::new(scene(5), input, LogRenderer::new(120));
        app.run(|| DT);
        let renderer = app.renderer();
        assert_eq!(renderer.presented(), 601);
        assert!(renderer.peak_smoke <= app.scene().tuning.max_smoke);
        assert!(renderer.peak_bombs <= app.scene().tuning.max_bombs);
        // Ten seconds of bombing always produces a fireball inside the curve
        assert!(renderer.peak_fireball >= explosion_radius(1.0));
        assert!(renderer.peak_fireball <= explosion_radius(0.0));
    }
}
