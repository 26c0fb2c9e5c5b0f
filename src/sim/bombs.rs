//! Projectile subsystem
//!
//! Bombs fall under gravity, explode when they reach their target height, and
//! linger for the explosion animation before their slot is freed.

use glam::Vec2;

use super::pool::SlotPool;
use super::state::{Bomb, CameraShake, SimTime};
use crate::Tuning;
use crate::consts::SHAKE_PULSE;

/// Bounded set of live bombs and explosions
#[derive(Debug, Clone)]
pub struct Bombs {
    pool: SlotPool<Bomb>,
}

impl Bombs {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: SlotPool::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bomb> {
        self.pool.iter()
    }

    /// Release a bomb; returns false (and does nothing) when the pool is full
    pub fn spawn(&mut self, x: f32, y: f32, vy: f32, target_y: f32, now: SimTime) -> bool {
        self.pool
            .insert(Bomb {
                pos: Vec2::new(x, y),
                vy,
                exploded: false,
                exploded_at: now,
                target_y,
            })
            .is_some()
    }

    /// Integrate falling bombs, detonate on impact, expire old explosions
    pub fn advance(&mut self, dt: f32, now: SimTime, tuning: &Tuning, shake: &mut CameraShake) {
        let explosion_time = tuning.explosion_time as f64;

        self.pool.retain_mut(|bomb| {
            if bomb.exploded {
                return now - bomb.exploded_at < explosion_time;
            }

            bomb.vy += tuning.gravity * dt;
            bomb.pos.y += bomb.vy * dt;
            if bomb.pos.y >= bomb.target_y {
                bomb.exploded = true;
                bomb.exploded_at = now;
                shake.trigger(
                    now,
                    tuning.shake_duration,
                    tuning.shake_strength * SHAKE_PULSE,
                    tuning.shake_strength,
                );
                log::debug!("Bomb impact at x={:.0}", bomb.pos.x);
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> Tuning {
        Tuning {
            gravity: 280.0,
            explosion_time: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let mut bombs = Bombs::new(2);
        assert!(bombs.spawn(0.0, 0.0, 0.0, 10.0, 0.0));
        assert!(bombs.spawn(0.0, 0.0, 0.0, 10.0, 0.0));
        assert!(!bombs.spawn(0.0, 0.0, 0.0, 10.0, 0.0));
        assert_eq!(bombs.len(), 2);
    }

    #[test]
    fn test_impact_tick_and_explosion_lifetime() {
        // dt and explosion time are exact in binary, so tick counts are exact
        let tuning = tuning();
        let dt = 1.0 / 64.0;
        let (v0, target) = (160.0, 500.0);

        // Expected impact tick from the same semi-implicit Euler integration
        let (mut y, mut vy, mut impact_tick) = (0.0f32, v0, 0u32);
        while y < target {
            vy += tuning.gravity * dt;
            y += vy * dt;
            impact_tick += 1;
        }

        let mut bombs = Bombs::new(4);
        let mut shake = CameraShake::default();
        bombs.spawn(0.0, 0.0, v0, target, 0.0);

        let mut now = 0.0;
        let mut tick = 0u32;
        let mut exploded_on = None;
        let mut removed_on = None;
        while tick < 2000 {
            tick += 1;
            now += dt as f64;
            bombs.advance(dt, now, &tuning, &mut shake);
            match bombs.iter().next() {
                Some(b) if b.exploded && exploded_on.is_none() => {
                    exploded_on = Some(tick);
                    assert!(shake.active(now));
                }
                None => {
                    removed_on = Some(tick);
                    break;
                }
                _ => {}
            }
        }

        let exploded_on = exploded_on.unwrap();
        assert_eq!(exploded_on, impact_tick);
        // 0.5s at 64 ticks/s
        assert_eq!(removed_on.unwrap() - exploded_on, 32);
    }

    #[test]
    fn test_explosion_stays_put() {
        let tuning = tuning();
        let mut bombs = Bombs::new(1);
        let mut shake = CameraShake::default();
        bombs.spawn(10.0, 99.0, 100.0, 100.0, 0.0);
        bombs.advance(0.1, 0.1, &tuning, &mut shake);
        let y = bombs.iter().next().unwrap().pos.y;
        bombs.advance(0.1, 0.2, &tuning, &mut shake);
        assert_eq!(bombs.iter().next().unwrap().pos.y, y);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(spawns in prop::collection::vec(0u8..5, 1..200)) {
            let tuning = tuning();
            let mut bombs = Bombs::new(tuning.max_bombs);
            let mut shake = CameraShake::default();
            let mut now = 0.0;
            for n in spawns {
                for _ in 0..n {
                    bombs.spawn(0.0, 0.0, 160.0, 300.0, now);
                }
                now += 1.0 / 60.0;
                bombs.advance(1.0 / 60.0, now, &tuning, &mut shake);
                prop_assert!(bombs.len() <= tuning.max_bombs);
                prop_assert!(shake.strength <= tuning.shake_strength);
            }
        }
    }
}
