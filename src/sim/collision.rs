//! Flak burst vs plane hit detection
//!
//! Each burst is a circle that stays lethal for a short window of simulated
//! time. A burst downs at most one plane per tick: the first eligible plane in
//! squadron order.

use rand::Rng;

use super::planes::{Squadron, kill};
use super::state::{Burst, CameraShake, SimTime};
use crate::Tuning;
use crate::consts::{SHAKE_HIT_DURATION, SHAKE_PULSE};

/// Result of testing one burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Burst older than its hit window
    Expired,
    Miss,
    /// Squadron index of the downed plane
    Kill(usize),
}

/// Whether `point` lies within the burst radius
#[inline]
pub fn burst_contains(burst: &Burst, point: glam::Vec2) -> bool {
    burst.pos.distance_squared(point) <= burst.radius * burst.radius
}

/// Test one burst against the squadron, killing the first eligible plane
pub fn resolve_burst<R: Rng + ?Sized>(
    burst: &Burst,
    squadron: &mut Squadron,
    shake: &mut CameraShake,
    now: SimTime,
    tuning: &Tuning,
    rng: &mut R,
) -> HitResult {
    if burst.age(now) > tuning.aa_hit_window {
        return HitResult::Expired;
    }

    let victim = squadron
        .planes()
        .iter()
        .position(|p| p.targetable(now) && burst_contains(burst, p.center()));

    let Some(index) = victim else {
        return HitResult::Miss;
    };

    kill(&mut squadron.planes_mut()[index], now, tuning, rng);
    shake.trigger(
        now,
        SHAKE_HIT_DURATION,
        tuning.shake_strength * SHAKE_PULSE,
        tuning.shake_strength,
    );
    log::debug!("Flak downed plane {index} at ({:.0}, {:.0})", burst.pos.x, burst.pos.y);
    HitResult::Kill(index)
}

/// Test every live burst; returns the number of planes downed
pub fn resolve<R: Rng + ?Sized>(
    bursts: &[Burst],
    squadron: &mut Squadron,
    shake: &mut CameraShake,
    now: SimTime,
    tuning: &Tuning,
    rng: &mut R,
) -> usize {
    bursts
        .iter()
        .filter(|burst| {
            matches!(
                resolve_burst(burst, squadron, shake, now, tuning, rng),
                HitResult::Kill(_)
            )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Tuning, Squadron, Pcg32) {
        let tuning = Tuning {
            plane_count: 3,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let squadron = Squadron::new(&tuning, Viewport::new(1280.0, 720.0), &[], 0.0, &mut rng);
        (tuning, squadron, rng)
    }

    /// Park plane `index` so its center sits at `center`
    fn park(squadron: &mut Squadron, index: usize, center: Vec2) {
        let plane = &mut squadron.planes_mut()[index];
        plane.pos = center - plane.sprite.size * 0.5;
    }

    fn burst_at(pos: Vec2, created_at: SimTime) -> Burst {
        Burst {
            pos,
            created_at,
            radius: 48.0,
        }
    }

    #[test]
    fn test_kill_inside_radius() {
        let (tuning, mut squadron, mut rng) = setup();
        let mut shake = CameraShake::default();
        park(&mut squadron, 0, Vec2::new(500.0, 200.0));
        park(&mut squadron, 1, Vec2::new(900.0, 200.0));
        park(&mut squadron, 2, Vec2::new(100.0, 200.0));

        let burst = burst_at(Vec2::new(530.0, 230.0), 1.0);
        let result = resolve_burst(&burst, &mut squadron, &mut shake, 1.0, &tuning, &mut rng);
        assert_eq!(result, HitResult::Kill(0));
        assert!(squadron.planes()[0].dying);
        assert!(!squadron.planes()[1].dying);
        assert!(shake.active(1.0));
    }

    #[test]
    fn test_edge_of_radius_counts() {
        let burst = burst_at(Vec2::ZERO, 0.0);
        assert!(burst_contains(&burst, Vec2::new(48.0, 0.0)));
        assert!(!burst_contains(&burst, Vec2::new(48.1, 0.0)));
    }

    #[test]
    fn test_one_kill_per_burst_per_tick() {
        let (tuning, mut squadron, mut rng) = setup();
        let mut shake = CameraShake::default();
        for i in 0..3 {
            park(&mut squadron, i, Vec2::new(400.0 + i as f32 * 5.0, 200.0));
        }
        let burst = burst_at(Vec2::new(405.0, 200.0), 0.0);
        let kills = resolve(&[burst], &mut squadron, &mut shake, 0.0, &tuning, &mut rng);
        assert_eq!(kills, 1);
        assert!(squadron.planes()[0].dying);
        assert_eq!(squadron.planes().iter().filter(|p| p.dying).count(), 1);

        // Still inside the window on the next tick: the next plane in line goes
        let kills = resolve(&[burst], &mut squadron, &mut shake, 0.05, &tuning, &mut rng);
        assert_eq!(kills, 1);
        assert!(squadron.planes()[1].dying);
    }

    #[test]
    fn test_expired_burst_is_harmless() {
        let (tuning, mut squadron, mut rng) = setup();
        let mut shake = CameraShake::default();
        park(&mut squadron, 0, Vec2::new(300.0, 300.0));
        let burst = burst_at(Vec2::new(300.0, 300.0), 0.0);
        let result = resolve_burst(&burst, &mut squadron, &mut shake, 0.5, &tuning, &mut rng);
        assert_eq!(result, HitResult::Expired);
        assert!(!squadron.planes()[0].dying);
    }

    #[test]
    fn test_grace_period_blocks_second_kill() {
        let (tuning, mut squadron, mut rng) = setup();
        let mut shake = CameraShake::default();
        park(&mut squadron, 0, Vec2::new(300.0, 300.0));
        park(&mut squadron, 1, Vec2::new(1000.0, 100.0));
        park(&mut squadron, 2, Vec2::new(1100.0, 100.0));

        let first = burst_at(Vec2::new(300.0, 300.0), 0.0);
        resolve(&[first], &mut squadron, &mut shake, 0.0, &tuning, &mut rng);
        assert!(squadron.planes()[0].dying);

        // Pretend the plane recovered instantly: grace still protects it
        let plane = &mut squadron.planes_mut()[0];
        plane.dying = false;
        let pos = plane.center();
        let second = burst_at(pos, 1.0);
        let result = resolve_burst(&second, &mut squadron, &mut shake, 1.0, &tuning, &mut rng);
        assert_eq!(result, HitResult::Miss);

        let third = burst_at(pos, 2.5);
        let result = resolve_burst(&third, &mut squadron, &mut shake, 2.5, &tuning, &mut rng);
        assert_eq!(result, HitResult::Kill(0));
    }
}
