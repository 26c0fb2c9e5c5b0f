//! Anti-aircraft subsystem
//!
//! Each battery keeps its own jittered timer so the guns never fire in
//! lockstep. Shots climb at constant velocity and turn into bursts at their
//! scripted altitude (or at the ceiling, whichever comes first).

use glam::Vec2;
use rand::Rng;

use super::pool::{RecentPool, SlotPool};
use super::state::{AaShot, Burst, SimTime, Smoke};
use crate::consts::*;
use crate::{Tuning, Viewport, uniform, uniform_int};

/// One gun emplacement on the city roofline
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub base: Vec2,
    pub next_fire: SimTime,
    /// Interval drawn at the last re-arm
    pub last_interval: Option<f32>,
}

/// Batteries, shots in flight, and recent bursts
#[derive(Debug, Clone)]
pub struct Flak {
    pub batteries: Vec<Battery>,
    shots: SlotPool<AaShot>,
    bursts: Vec<Burst>,
    viewport: Viewport,
}

impl Flak {
    pub fn new<R: Rng + ?Sized>(
        tuning: &Tuning,
        viewport: Viewport,
        city_base_y: f32,
        now: SimTime,
        rng: &mut R,
    ) -> Self {
        Self {
            batteries: place_batteries(tuning, viewport, city_base_y, now, rng),
            shots: SlotPool::with_capacity(tuning.aa_max_shots),
            bursts: Vec::new(),
            viewport,
        }
    }

    /// Move the batteries for a new viewport and re-arm them
    pub fn resize<R: Rng + ?Sized>(
        &mut self,
        tuning: &Tuning,
        viewport: Viewport,
        city_base_y: f32,
        now: SimTime,
        rng: &mut R,
    ) {
        self.viewport = viewport;
        self.batteries = place_batteries(tuning, viewport, city_base_y, now, rng);
    }

    pub fn shots(&self) -> impl Iterator<Item = &AaShot> {
        self.shots.iter()
    }

    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    /// Bursts still inside their hit window
    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    /// Fire due batteries, climb shots, convert arrivals into bursts
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        now: SimTime,
        tuning: &Tuning,
        rng: &mut R,
        smoke: &mut RecentPool<Smoke>,
    ) {
        let window = tuning.aa_hit_window;
        self.bursts.retain(|b| b.age(now) <= window);

        self.fire_due(now, tuning, rng);

        let Self { shots, bursts, .. } = self;
        shots.retain_mut(|shot| {
            shot.pos += shot.vel * dt;
            if shot.pos.y > shot.target_y && shot.pos.y >= tuning.aa_ceiling {
                return true;
            }

            shot.alive = false;
            bursts.push(Burst {
                pos: shot.pos,
                created_at: now,
                radius: tuning.aa_burst_radius,
            });
            let puffs = uniform_int(rng, tuning.aa_smoke_puffs);
            smoke.extend((0..puffs).map(|_| burst_puff(shot.pos, tuning, rng)));
            false
        });
    }

    /// Launch a shot from every battery whose timer has elapsed
    fn fire_due<R: Rng + ?Sized>(&mut self, now: SimTime, tuning: &Tuning, rng: &mut R) {
        let height = self.viewport.height;
        let (min_frac, max_frac) = tuning.aa_alt_frac;
        let top_alt = (height * min_frac) as u32;
        let bottom_alt = ((height * max_frac) as u32).max(top_alt);

        for i in 0..self.batteries.len() {
            if now < self.batteries[i].next_fire || self.shots.is_full() {
                continue;
            }

            let base = self.batteries[i].base;
            let shot = AaShot {
                pos: Vec2::new(
                    base.x + uniform(rng, (-AA_MUZZLE_SPREAD, AA_MUZZLE_SPREAD)),
                    base.y,
                ),
                vel: Vec2::new(
                    uniform(rng, (-AA_SHOT_DRIFT, AA_SHOT_DRIFT)),
                    -AA_SHOT_SPEED - uniform(rng, (0.0, AA_SHOT_SPEED_JITTER)),
                ),
                target_y: uniform_int(rng, (top_alt, bottom_alt)) as f32,
                alive: true,
            };
            log::debug!("Battery {i} fires, burst at y={}", shot.target_y);
            self.launch(shot);

            let (lo, hi) = AA_RATE_JITTER;
            let interval = uniform(rng, (tuning.aa_spawn_rate * lo, tuning.aa_spawn_rate * hi));
            let battery = &mut self.batteries[i];
            battery.next_fire = now + interval as f64;
            battery.last_interval = Some(interval);
        }
    }

    /// Put a shot in flight; false when the shot pool is full
    pub fn launch(&mut self, shot: AaShot) -> bool {
        self.shots.insert(shot).is_some()
    }
}

/// Evenly spaced guns along the city base
fn place_batteries<R: Rng + ?Sized>(
    tuning: &Tuning,
    viewport: Viewport,
    city_base_y: f32,
    now: SimTime,
    rng: &mut R,
) -> Vec<Battery> {
    let step = (viewport.width / (tuning.aa_batteries + 1) as f32).floor();
    (1..=tuning.aa_batteries)
        .map(|i| Battery {
            base: Vec2::new(i as f32 * step, city_base_y + 2.0),
            next_fire: now + uniform(rng, AA_ARM_DELAY) as f64,
            last_interval: None,
        })
        .collect()
}

fn burst_puff<R: Rng + ?Sized>(at: Vec2, tuning: &Tuning, rng: &mut R) -> Smoke {
    let spread = tuning.aa_puff_spread;
    Smoke {
        pos: at + Vec2::new(
            uniform(rng, (-spread, spread)),
            uniform(rng, (-spread * 0.6, spread * 0.6)),
        ),
        radius: uniform(rng, tuning.aa_puff_r0),
        vy: uniform(rng, tuning.aa_puff_vy),
        alpha: uniform(rng, tuning.aa_puff_alpha0),
        growth: uniform(rng, tuning.aa_puff_dr),
        fade: uniform(rng, tuning.aa_puff_da),
        tone: uniform_int(rng, (45, 75)) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(seed: u64) -> (Tuning, Flak, Pcg32, RecentPool<Smoke>) {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let flak = Flak::new(&tuning, Viewport::new(1280.0, 720.0), 504.0, 0.0, &mut rng);
        let smoke = RecentPool::with_capacity(tuning.max_smoke);
        (tuning, flak, rng, smoke)
    }

    #[test]
    fn test_batteries_evenly_spaced() {
        let (_, flak, _, _) = setup(1);
        let xs: Vec<f32> = flak.batteries.iter().map(|b| b.base.x).collect();
        assert_eq!(xs, vec![320.0, 640.0, 960.0]);
        for b in &flak.batteries {
            assert_eq!(b.base.y, 506.0);
            assert!(b.next_fire >= 0.4 && b.next_fire <= 1.1);
        }
    }

    #[test]
    fn test_shot_bursts_at_target_altitude() {
        let (tuning, mut flak, mut rng, mut smoke) = setup(2);
        flak.batteries.clear();
        flak.shots.insert(AaShot {
            pos: Vec2::new(100.0, 500.0),
            vel: Vec2::new(10.0, -500.0),
            target_y: 300.0,
            alive: true,
        });

        // 0.3s leaves it at y=350, still climbing
        flak.advance(0.3, 0.3, &tuning, &mut rng, &mut smoke);
        assert_eq!(flak.shot_count(), 1);
        assert!(flak.bursts().is_empty());

        flak.advance(0.1, 0.4, &tuning, &mut rng, &mut smoke);
        assert_eq!(flak.shot_count(), 0);
        assert_eq!(flak.bursts().len(), 1);
        let burst = flak.bursts()[0];
        assert_eq!(burst.radius, tuning.aa_burst_radius);
        assert!((burst.pos.y - 300.0).abs() < 1e-3);
        let (lo, hi) = tuning.aa_smoke_puffs;
        assert!((lo as usize..=hi as usize).contains(&smoke.len()));
    }

    #[test]
    fn test_ceiling_stops_runaway_shot() {
        let (tuning, mut flak, mut rng, mut smoke) = setup(3);
        flak.batteries.clear();
        // Target above the ceiling: the ceiling wins
        flak.shots.insert(AaShot {
            pos: Vec2::new(100.0, 30.0),
            vel: Vec2::new(0.0, -100.0),
            target_y: -50.0,
            alive: true,
        });
        flak.advance(0.2, 0.2, &tuning, &mut rng, &mut smoke);
        assert_eq!(flak.shot_count(), 0);
        assert!(flak.bursts()[0].pos.y < tuning.aa_ceiling);
    }

    #[test]
    fn test_bursts_expire_after_window() {
        let (tuning, mut flak, mut rng, mut smoke) = setup(4);
        flak.batteries.clear();
        flak.bursts.push(Burst {
            pos: Vec2::ZERO,
            created_at: 1.0,
            radius: 48.0,
        });
        flak.advance(0.1, 1.1, &tuning, &mut rng, &mut smoke);
        assert_eq!(flak.bursts().len(), 1);
        flak.advance(0.1, 1.2, &tuning, &mut rng, &mut smoke);
        assert!(flak.bursts().is_empty());
    }

    #[test]
    fn test_full_pool_blocks_firing() {
        let (tuning, mut flak, mut rng, mut smoke) = setup(5);
        for _ in 0..tuning.aa_max_shots {
            flak.shots.insert(AaShot {
                pos: Vec2::new(0.0, 700.0),
                vel: Vec2::ZERO,
                target_y: 0.0,
                alive: true,
            });
        }
        flak.advance(1.0 / 60.0, 5.0, &tuning, &mut rng, &mut smoke);
        assert_eq!(flak.shot_count(), tuning.aa_max_shots);
        assert!(flak.batteries.iter().all(|b| b.last_interval.is_none()));
    }

    proptest! {
        #[test]
        fn prop_shot_cap_and_rearm_interval(seed in any::<u64>(), ticks in 60usize..900) {
            let (tuning, mut flak, mut rng, mut smoke) = setup(seed);
            let dt = 1.0 / 60.0;
            let (lo, hi) = AA_RATE_JITTER;
            let mut now = 0.0;
            for _ in 0..ticks {
                now += dt as f64;
                flak.advance(dt, now, &tuning, &mut rng, &mut smoke);
                prop_assert!(flak.shot_count() <= tuning.aa_max_shots);
                for b in &flak.batteries {
                    if let Some(interval) = b.last_interval {
                        prop_assert!(interval >= tuning.aa_spawn_rate * lo);
                        prop_assert!(interval <= tuning.aa_spawn_rate * hi);
                    }
                }
            }
        }
    }
}
