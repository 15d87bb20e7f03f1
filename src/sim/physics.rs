//! Physics collaborator interface
//!
//! The core never integrates motion itself. It creates and removes bodies,
//! reads their positions and bounds, and rewrites geometry for the bar and
//! peg toggles. Any rigid-body engine that can provide [`PhysicsWorld`] will do.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::slots::SlotId;

/// Opaque body identifier. Handles are never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Inclusive overlap test (touching edges overlap)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
}

/// Collision shape, centered on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
    /// Regular hexagon with the given circumradius
    Hexagon { radius: f32 },
    /// Line segment from `-half` to `+half`, thickened by `radius`
    Segment { half: Vec2, radius: f32 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    /// Segment between two points, returned with its center
    pub fn segment(from: Vec2, to: Vec2, thickness: f32) -> (Self, Vec2) {
        let shape = Shape::Segment {
            half: (to - from) / 2.0,
            radius: thickness / 2.0,
        };
        (shape, (from + to) / 2.0)
    }

    /// Half extents of the shape's bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } | Shape::Hexagon { radius } => Vec2::splat(radius),
            Shape::Rect { half_extents } => half_extents,
            Shape::Segment { half, radius } => half.abs() + Vec2::splat(radius),
        }
    }
}

/// What a body represents on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Ball,
    Peg,
    Divider,
    Slot(SlotId),
    Bar,
    Wall,
    Warning(SlotId),
}

/// Creation options for a body
#[derive(Debug, Clone, Copy)]
pub struct BodyOptions {
    pub kind: BodyKind,
    pub position: Vec2,
    pub is_static: bool,
    /// Sensors report overlaps but never collide
    pub is_sensor: bool,
    pub restitution: f32,
}

impl BodyOptions {
    pub fn dynamic(kind: BodyKind, position: Vec2, restitution: f32) -> Self {
        Self {
            kind,
            position,
            is_static: false,
            is_sensor: false,
            restitution,
        }
    }

    pub fn fixed(kind: BodyKind, position: Vec2, restitution: f32) -> Self {
        Self {
            kind,
            position,
            is_static: true,
            is_sensor: false,
            restitution,
        }
    }

    pub fn sensor(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            is_static: true,
            is_sensor: true,
            restitution: 0.0,
        }
    }
}

/// A body as seen by the simulation core
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub handle: BodyHandle,
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_static: bool,
    pub is_sensor: bool,
    /// Collision response switch (disabled pegs turn this off)
    pub collides: bool,
    pub restitution: f32,
}

impl Body {
    pub fn new(handle: BodyHandle, shape: Shape, options: BodyOptions) -> Self {
        Self {
            handle,
            kind: options.kind,
            shape,
            position: options.position,
            velocity: Vec2::ZERO,
            is_static: options.is_static,
            is_sensor: options.is_sensor,
            collides: !options.is_sensor,
            restitution: options.restitution,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.shape.half_extents())
    }
}

/// Operations the core needs from a rigid-body engine
pub trait PhysicsWorld {
    /// Add a body and return its handle
    fn create_body(&mut self, shape: Shape, options: BodyOptions) -> BodyHandle;

    /// Remove a body, returning it if it existed
    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body>;

    /// All live body handles, in creation order
    fn handles(&self) -> Vec<BodyHandle>;

    fn body(&self, handle: BodyHandle) -> Option<&Body>;

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body>;

    /// Replace a body's shape and position in a single write
    fn reshape(&mut self, handle: BodyHandle, shape: Shape, position: Vec2) -> bool {
        match self.body_mut(handle) {
            Some(body) => {
                *body = Body {
                    shape,
                    position,
                    ..body.clone()
                };
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by `dt_ms` milliseconds
    fn step(&mut self, dt_ms: f64);
}
