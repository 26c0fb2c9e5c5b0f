//! Timed effects: smoke, fires, searchlights and camera shake
//!
//! None of this feeds back into the planes or bombs. Smoke is the only effect
//! with a lifecycle; fires and searchlights are endless oscillators.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::pool::RecentPool;
use super::state::{CameraShake, Fire, Searchlight, SimTime, Smoke};
use crate::consts::*;
use crate::{Tuning, Viewport, uniform};

/// Horizontal searchlight positions as fractions of width
const SEARCHLIGHT_SITES: [f32; 3] = [0.15, 0.50, 0.85];

#[derive(Debug, Clone)]
pub struct Effects {
    pub smoke: RecentPool<Smoke>,
    pub fires: Vec<Fire>,
    pub searchlights: Vec<Searchlight>,
    pub shake: CameraShake,
    /// Pixel offset applied to everything drawn this frame
    pub shake_offset: Vec2,
}

impl Effects {
    pub fn new<R: Rng + ?Sized>(
        tuning: &Tuning,
        viewport: Viewport,
        ignition_points: &[Vec2],
        rng: &mut R,
    ) -> Self {
        let searchlights = (0..SEARCHLIGHT_SITES.len())
            .map(|i| Searchlight {
                base: Vec2::ZERO,
                phase: uniform(rng, (0.0, TAU)),
                speed: 0.50 + 0.25 * i as f32 + uniform(rng, (-0.08, 0.08)),
                amplitude: 14.0 + 1.5 * i as f32 + uniform(rng, (-2.0, 2.0)),
            })
            .collect();

        let mut effects = Self {
            smoke: RecentPool::with_capacity(tuning.max_smoke),
            fires: Vec::new(),
            searchlights,
            shake: CameraShake::default(),
            shake_offset: Vec2::ZERO,
        };
        effects.resize(tuning, viewport, ignition_points, rng);
        effects
    }

    /// Reseed fires from the new damage spots and move the searchlights
    pub fn resize<R: Rng + ?Sized>(
        &mut self,
        tuning: &Tuning,
        viewport: Viewport,
        ignition_points: &[Vec2],
        rng: &mut R,
    ) {
        self.fires = ignition_points
            .iter()
            .take(tuning.max_fires)
            .map(|spot| Fire {
                pos: *spot + Vec2::new(uniform(rng, (-2.0, 2.0)), uniform(rng, (-2.0, 2.0))),
                base_radius: uniform(rng, (4.0, 8.0)),
                phase: uniform(rng, (0.0, TAU)),
            })
            .collect();

        for (light, site) in self.searchlights.iter_mut().zip(SEARCHLIGHT_SITES) {
            light.base = Vec2::new((viewport.width * site).floor(), viewport.ground_y());
        }
    }

    /// Advance every effect by one tick
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        now: SimTime,
        tuning: &Tuning,
        rng: &mut R,
        shake_enabled: bool,
    ) {
        self.smoke.retain_mut(|puff| {
            puff.pos.y += puff.vy * dt;
            puff.radius += puff.growth * dt;
            puff.alpha -= puff.fade * dt;
            puff.alpha > SMOKE_ALPHA_FLOOR
        });

        for fire in &mut self.fires {
            fire.phase = (fire.phase + dt * FIRE_RATE) % TAU;
        }

        for light in &mut self.searchlights {
            light.phase = (light.phase + dt * light.speed) % TAU;
        }

        self.shake_offset = Vec2::ZERO;
        if shake_enabled {
            let mag = self.shake.magnitude(now, tuning.shake_duration);
            if mag > 0.0 {
                self.shake_offset = Vec2::new(
                    uniform(rng, (-mag, mag)).trunc(),
                    uniform(rng, (-mag, mag)).trunc(),
                );
            }
        }
    }
}

/// Beam length and width for the current viewport
pub fn beam_extent(viewport: Viewport) -> (f32, f32) {
    (
        (viewport.height * 1.08).floor(),
        (viewport.width.min(viewport.height) * 0.07).floor(),
    )
}

/// Explosion fireball radius for progress `t` in [0, 1]
pub fn explosion_radius(t: f32) -> f32 {
    36.0 + 140.0 * (1.0 - t.clamp(0.0, 1.0))
}

/// Explosion opacity (0-255) for progress `t`
pub fn explosion_alpha(t: f32) -> f32 {
    255.0 * (1.0 - t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn puff(alpha: f32) -> Smoke {
        Smoke {
            pos: Vec2::new(0.0, 100.0),
            radius: 5.0,
            vy: -20.0,
            alpha,
            growth: 18.0,
            fade: 160.0,
            tone: 60,
        }
    }

    fn effects(rng: &mut Pcg32) -> Effects {
        let spots: Vec<Vec2> = (0..30).map(|i| Vec2::new(i as f32 * 10.0, 600.0)).collect();
        Effects::new(&Tuning::default(), Viewport::new(1280.0, 720.0), &spots, rng)
    }

    #[test]
    fn test_smoke_pool_keeps_most_recent() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fx = effects(&mut rng);
        // 300 spawns in one burst; alpha doubles as a creation index
        for i in 0..300 {
            fx.smoke.push(puff(1000.0 + i as f32));
        }
        assert_eq!(fx.smoke.len(), MAX_SMOKE);
        let first = fx.smoke.iter().next().unwrap().alpha;
        let last = fx.smoke.iter().last().unwrap().alpha;
        assert_eq!(first, 1080.0);
        assert_eq!(last, 1299.0);
    }

    #[test]
    fn test_smoke_rises_grows_and_fades_out() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut fx = effects(&mut rng);
        let tuning = Tuning::default();
        fx.smoke.push(puff(150.0));

        fx.advance(0.1, 0.1, &tuning, &mut rng, true);
        let p = fx.smoke.iter().next().unwrap();
        assert!((p.pos.y - 98.0).abs() < 1e-4);
        assert!((p.radius - 6.8).abs() < 1e-4);
        assert!((p.alpha - 134.0).abs() < 1e-3);

        // 150 alpha at 160/s is gone within a second
        for i in 0..10 {
            fx.advance(0.1, 0.2 + i as f64 * 0.1, &tuning, &mut rng, true);
        }
        assert!(fx.smoke.is_empty());
    }

    #[test]
    fn test_fires_capped_and_oscillate() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = effects(&mut rng);
        assert_eq!(fx.fires.len(), MAX_FIRES);
        for _ in 0..1000 {
            fx.advance(1.0 / 60.0, 0.0, &Tuning::default(), &mut rng, true);
        }
        for fire in &fx.fires {
            assert!((0.0..TAU).contains(&fire.phase));
            let size = fire.size();
            assert!(size >= fire.base_radius * 0.67 && size <= fire.base_radius * 1.33);
        }
    }

    #[test]
    fn test_shake_offset_bounded_and_cleared() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut fx = effects(&mut rng);
        let tuning = Tuning::default();
        fx.shake.trigger(0.0, tuning.shake_duration, 9.0, 9.0);

        fx.advance(0.01, 0.01, &tuning, &mut rng, true);
        assert!(fx.shake_offset.x.abs() <= 9.0 && fx.shake_offset.y.abs() <= 9.0);
        assert_eq!(fx.shake_offset, fx.shake_offset.trunc());

        fx.advance(0.01, 1.0, &tuning, &mut rng, true);
        assert_eq!(fx.shake_offset, Vec2::ZERO);
    }

    #[test]
    fn test_shake_disabled() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut fx = effects(&mut rng);
        let tuning = Tuning::default();
        fx.shake.trigger(0.0, tuning.shake_duration, 9.0, 9.0);
        fx.advance(0.01, 0.01, &tuning, &mut rng, false);
        assert_eq!(fx.shake_offset, Vec2::ZERO);
    }

    #[test]
    fn test_searchlights_follow_viewport() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut fx = effects(&mut rng);
        fx.resize(&Tuning::default(), Viewport::new(1000.0, 500.0), &[], &mut rng);
        let xs: Vec<f32> = fx.searchlights.iter().map(|l| l.base.x).collect();
        assert_eq!(xs, vec![150.0, 500.0, 850.0]);
        assert!(fx.fires.is_empty());
        for light in &fx.searchlights {
            assert_eq!(light.base.y, 498.0);
            assert!((light.angle_deg() + 90.0).abs() <= light.amplitude + 1e-3);
        }
        assert_eq!(beam_extent(Viewport::new(1000.0, 500.0)), (540.0, 35.0));
    }

    #[test]
    fn test_explosion_curve() {
        assert_eq!(explosion_radius(0.0), 176.0);
        assert_eq!(explosion_radius(1.0), 36.0);
        assert_eq!(explosion_alpha(1.0), 0.0);
    }
}
