//! Flying-entity subsystem
//!
//! A fixed squadron patrols the lanes, wraps at the screen edges, drops bombs
//! on a jittered timer, and tumbles out of the sky when flak catches it.
//! Planes are never added or removed; a downed plane is recycled in place.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::bombs::Bombs;
use super::pool::RecentPool;
use super::state::{Facing, Plane, SimTime, Smoke, SpriteInfo};
use crate::consts::*;
use crate::{Tuning, Viewport, uniform, uniform_int};

/// Travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    fn of(plane: &Plane) -> Self {
        if plane.heading_right() {
            Heading::Right
        } else {
            Heading::Left
        }
    }

    fn sign(self) -> f32 {
        match self {
            Heading::Left => -1.0,
            Heading::Right => 1.0,
        }
    }
}

/// The fixed plane population
#[derive(Debug, Clone)]
pub struct Squadron {
    planes: Box<[Plane]>,
    /// Absolute lane heights (px)
    lanes: Vec<f32>,
    viewport: Viewport,
}

impl Squadron {
    /// Spawn `tuning.plane_count` planes, alternating direction
    pub fn new<R: Rng + ?Sized>(
        tuning: &Tuning,
        viewport: Viewport,
        sprites: &[SpriteInfo],
        now: SimTime,
        rng: &mut R,
    ) -> Self {
        let placeholder = [SpriteInfo::placeholder(0, tuning.plane_max_side)];
        let sprites = if sprites.is_empty() { &placeholder[..] } else { sprites };

        let mut squadron = Self {
            planes: Box::new([]),
            lanes: lane_heights(tuning, viewport),
            viewport,
        };

        squadron.planes = (0..tuning.plane_count)
            .map(|i| {
                let mut plane = Plane {
                    pos: Vec2::ZERO,
                    vel: Vec2::ZERO,
                    angle: 0.0,
                    spin: 0.0,
                    on_fire: false,
                    dying: false,
                    invulnerable_until: 0.0,
                    next_bomb_due: now + uniform(rng, tuning.bomb_rate) as f64,
                    sprite: sprites[i % sprites.len()],
                    original_facing: Facing::Left,
                };
                let heading = if i % 2 == 0 { Heading::Right } else { Heading::Left };
                let lane = rng.random_range(0..squadron.lanes.len());
                squadron.place_airborne(&mut plane, lane, heading, tuning, rng);
                plane
            })
            .collect();

        squadron
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Mutable access; the slice length cannot change
    pub fn planes_mut(&mut self) -> &mut [Plane] {
        &mut self.planes
    }

    pub fn lanes(&self) -> &[f32] {
        &self.lanes
    }

    /// Recompute lanes for a new viewport; planes keep flying where they are
    pub fn resize(&mut self, tuning: &Tuning, viewport: Viewport) {
        self.viewport = viewport;
        self.lanes = lane_heights(tuning, viewport);
    }

    /// Reset plane `index` to a fresh airborne state just off-screen
    pub fn spawn_airborne<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        lane: usize,
        heading: Heading,
        tuning: &Tuning,
        rng: &mut R,
    ) {
        let mut plane = self.planes[index].clone();
        self.place_airborne(&mut plane, lane, heading, tuning, rng);
        self.planes[index] = plane;
    }

    fn place_airborne<R: Rng + ?Sized>(
        &self,
        plane: &mut Plane,
        lane: usize,
        heading: Heading,
        tuning: &Tuning,
        rng: &mut R,
    ) {
        let width = self.viewport.width;
        let speed = uniform(
            rng,
            (width * tuning.plane_speed_frac.0, width * tuning.plane_speed_frac.1),
        );
        plane.vel = Vec2::new(speed * heading.sign(), 0.0);
        plane.angle = 0.0;
        plane.spin = 0.0;
        plane.on_fire = false;
        plane.dying = false;
        // Grace does not survive the recycle: a fresh plane is a fair target
        plane.invulnerable_until = 0.0;
        reenter(plane, self.lanes[lane], heading, width, tuning.plane_spawn_gap, rng);
    }

    /// Move every plane one tick, dropping bombs and trailing smoke
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        now: SimTime,
        tuning: &Tuning,
        rng: &mut R,
        bombs: &mut Bombs,
        smoke: &mut RecentPool<Smoke>,
    ) {
        let Viewport { width, height } = self.viewport;

        for index in 0..self.planes.len() {
            let plane = &mut self.planes[index];

            if plane.dying {
                plane.vel.y += tuning.gravity * dt * PLANE_FALL_GRAVITY_SCALE;
                plane.pos.y += plane.vel.y * dt;
                plane.pos.x += plane.vel.x * dt * PLANE_FALL_DRIFT_SCALE;
                plane.angle += plane.spin * dt;

                if rng.random_bool(tuning.plane_smoke_chance) {
                    smoke.push(trail_puff(plane.center(), tuning, rng));
                }

                if plane.pos.y > height + PLANE_RESPAWN_DEPTH {
                    let heading = Heading::of(plane);
                    let lane = rng.random_range(0..self.lanes.len());
                    log::debug!("Plane {index} recycled into lane {lane}");
                    self.spawn_airborne(index, lane, heading, tuning, rng);
                }
            } else {
                plane.pos.x += plane.vel.x * dt;
            }

            let plane = &mut self.planes[index];
            schedule_bomb_if_due(plane, now, self.viewport, tuning, rng, bombs);

            if !plane.dying {
                let heading = Heading::of(plane);
                let gone = match heading {
                    Heading::Right => plane.pos.x > width + PLANE_WRAP_MARGIN,
                    Heading::Left => plane.pos.x + plane.sprite.size.x < -PLANE_WRAP_MARGIN,
                };
                if gone {
                    let lane_y = *self.lanes.choose(rng).unwrap_or(&plane.pos.y);
                    reenter(plane, lane_y, heading, width, tuning.plane_spawn_gap, rng);
                }
            }
        }
    }
}

/// Drop a bomb if the timer has elapsed and the bomb pool has room
///
/// A full pool leaves the timer elapsed, so the plane drops as soon as a slot
/// frees up.
pub fn schedule_bomb_if_due<R: Rng + ?Sized>(
    plane: &mut Plane,
    now: SimTime,
    viewport: Viewport,
    tuning: &Tuning,
    rng: &mut R,
    bombs: &mut Bombs,
) {
    if plane.dying || now < plane.next_bomb_due || bombs.is_full() {
        return;
    }
    let bay = plane.bomb_bay();
    if bombs.spawn(bay.x, bay.y, tuning.bomb_drop_speed, viewport.ground_y(), now) {
        plane.next_bomb_due = now + uniform(rng, tuning.bomb_rate) as f64;
    }
}

/// Knock a plane out of the sky
pub fn kill<R: Rng + ?Sized>(plane: &mut Plane, now: SimTime, tuning: &Tuning, rng: &mut R) {
    plane.dying = true;
    plane.on_fire = true;
    plane.vel.y = PLANE_HIT_LIFT;
    plane.spin = uniform(rng, (-PLANE_HIT_SPIN, PLANE_HIT_SPIN));
    plane.vel.x *= PLANE_HIT_DAMPING;
    plane.invulnerable_until = now + tuning.plane_hit_grace as f64;
}

fn lane_heights(tuning: &Tuning, viewport: Viewport) -> Vec<f32> {
    tuning.lanes.iter().map(|f| viewport.height * f).collect()
}

/// Put a plane just beyond the edge it enters from
fn reenter<R: Rng + ?Sized>(
    plane: &mut Plane,
    lane_y: f32,
    heading: Heading,
    width: f32,
    gap: (f32, f32),
    rng: &mut R,
) {
    let gap = uniform(rng, gap);
    plane.pos.x = match heading {
        Heading::Right => -plane.sprite.size.x - gap,
        Heading::Left => width + gap,
    };
    plane.pos.y = lane_y;
}

fn trail_puff<R: Rng + ?Sized>(center: Vec2, tuning: &Tuning, rng: &mut R) -> Smoke {
    Smoke {
        pos: center + Vec2::new(uniform(rng, (-8.0, 8.0)), uniform(rng, (-8.0, 8.0))),
        radius: uniform(rng, (3.5, 6.5)),
        vy: uniform(rng, (-24.0, -8.0)),
        alpha: uniform(rng, (110.0, 150.0)),
        growth: uniform(rng, tuning.aa_puff_dr),
        fade: uniform(rng, tuning.aa_puff_da),
        tone: uniform_int(rng, (60, 90)) as u8,
    }
}
