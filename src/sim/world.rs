//! Minimal rigid-body world
//!
//! Stands in for a full engine in the headless runner and in tests:
//! gravity, static colliders, sensors, restitution and contact friction.
//! Dynamic bodies only collide with static ones.

use std::collections::BTreeMap;

use glam::Vec2;

use super::collision::{ball_shape_collision, bounce_velocity, damp_tangent};
use super::physics::{Body, BodyHandle, BodyOptions, PhysicsWorld, Shape};
use crate::consts::{CONTACT_FRICTION, GRAVITY, PHYSICS_SUBSTEPS};

/// Simple fixed-substep world
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    /// Bodies keyed by handle (handles increase, so iteration is creation order)
    bodies: BTreeMap<BodyHandle, Body>,
    gravity: Vec2,
    substeps: u32,
    next_handle: u64,
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleWorld {
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity: Vec2::new(0.0, GRAVITY),
            substeps: PHYSICS_SUBSTEPS,
            next_handle: 1,
        }
    }

    /// World without gravity (bodies stay where they are put)
    pub fn without_gravity() -> Self {
        Self {
            gravity: Vec2::ZERO,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn integrate(&mut self, h: f32) {
        // Snapshot colliders so dynamic bodies can be mutated freely
        let colliders: Vec<(Shape, Vec2, f32)> = self
            .bodies
            .values()
            .filter(|b| b.is_static && b.collides && !b.is_sensor)
            .map(|b| (b.shape, b.position, b.restitution))
            .collect();

        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            body.velocity += self.gravity * h;
            body.position += body.velocity * h;

            if !body.collides {
                continue;
            }
            let Shape::Circle { radius } = body.shape else {
                continue;
            };

            for (shape, center, restitution) in &colliders {
                let result = ball_shape_collision(body.position, radius, shape, *center);
                if result.hit {
                    body.position += result.normal * result.penetration;
                    let e = body.restitution.max(*restitution);
                    body.velocity = bounce_velocity(body.velocity, result.normal, e);
                    body.velocity = damp_tangent(body.velocity, result.normal, CONTACT_FRICTION);
                }
            }
        }
    }
}

impl PhysicsWorld for SimpleWorld {
    fn create_body(&mut self, shape: Shape, options: BodyOptions) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        let _ = self.bodies.insert(handle, Body::new(handle, shape, options));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(&handle)
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.bodies.keys().copied().collect()
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    fn step(&mut self, dt_ms: f64) {
        if dt_ms <= 0.0 {
            return;
        }
        let h = (dt_ms / 1000.0) as f32 / self.substeps as f32;
        for _ in 0..self.substeps {
            self.integrate(h);
        }
    }
}
