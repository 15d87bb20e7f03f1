//! Ball spawner
//!
//! Fires on its own interval clock, independent of the physics tick. Each
//! firing spends one unit of the spawn quota; only the cycle controller
//! refills it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::physics::{BodyHandle, BodyKind, BodyOptions, PhysicsWorld, Shape};
use crate::consts::{BALL_RADIUS, BALL_RESTITUTION, SPAWN_X, SPAWN_Y};

#[derive(Debug, Clone)]
pub struct Spawner {
    quota: u32,
    interval_ms: f64,
    jitter: f32,
    /// Time of the next firing
    next_fire_ms: f64,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(quota: u32, interval_ms: f64, jitter: f32, now_ms: f64, seed: u64) -> Self {
        Self {
            quota,
            interval_ms,
            jitter,
            next_fire_ms: now_ms + interval_ms,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Reopen the quota for a new batch
    pub fn refill(&mut self, quota: u32) {
        self.quota = quota;
    }

    /// Fire every interval that elapsed up to `now_ms`, spawning while quota remains.
    /// Returns the balls created.
    pub fn poll<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, now_ms: f64) -> Vec<BodyHandle> {
        let mut spawned = Vec::new();
        if self.interval_ms <= 0.0 {
            return spawned;
        }

        while self.next_fire_ms <= now_ms {
            self.next_fire_ms += self.interval_ms;
            if self.quota == 0 {
                continue;
            }
            self.quota -= 1;
            spawned.push(self.spawn(world));
        }
        spawned
    }

    fn spawn<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> BodyHandle {
        let offset = if self.jitter > 0.0 {
            self.rng.random_range(-self.jitter..self.jitter)
        } else {
            0.0
        };
        world.create_body(
            Shape::Circle { radius: BALL_RADIUS },
            BodyOptions::dynamic(
                BodyKind::Ball,
                Vec2::new(SPAWN_X + offset, SPAWN_Y + offset),
                BALL_RESTITUTION,
            ),
        )
    }
}
