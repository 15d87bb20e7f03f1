//! Ball contact against static board geometry
//!
//! Pegs are treated as circles at their circumradius, frame walls as thick
//! segments and everything else as axis-aligned rectangles. Good enough for a board whose statistics, not
//! trajectories, are the point.

use glam::Vec2;

use super::physics::Shape;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at contact, pointing toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a static shape centered at `center`
pub fn ball_shape_collision(ball_pos: Vec2, ball_radius: f32, shape: &Shape, center: Vec2) -> CollisionResult {
    match *shape {
        Shape::Circle { radius } | Shape::Hexagon { radius } => {
            ball_circle_collision(ball_pos, ball_radius, center, radius)
        }
        Shape::Rect { half_extents } => ball_rect_collision(ball_pos, ball_radius, center, half_extents),
        Shape::Segment { half, radius } => {
            ball_segment_collision(ball_pos, ball_radius, center - half, center + half, radius)
        }
    }
}

/// Ball against a circle
pub fn ball_circle_collision(ball_pos: Vec2, ball_radius: f32, center: Vec2, radius: f32) -> CollisionResult {
    let delta = ball_pos - center;
    let dist = delta.length();
    let reach = ball_radius + radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    // Ball center exactly on the peg center: push straight up
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::NEG_Y };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Ball against an axis-aligned rectangle
pub fn ball_rect_collision(ball_pos: Vec2, ball_radius: f32, center: Vec2, half_extents: Vec2) -> CollisionResult {
    let local = ball_pos - center;
    let closest = local.clamp(-half_extents, half_extents);
    let delta = local - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-12 {
        if dist_sq >= ball_radius * ball_radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            normal: delta / dist,
            penetration: ball_radius - dist,
        };
    }

    // Center is inside the rectangle (tunneling case): exit along the shallowest axis
    let depth = half_extents - local.abs();
    if depth.x < depth.y {
        CollisionResult {
            hit: true,
            normal: Vec2::new(local.x.signum(), 0.0),
            penetration: depth.x + ball_radius,
        }
    } else {
        CollisionResult {
            hit: true,
            normal: Vec2::new(0.0, local.y.signum()),
            penetration: depth.y + ball_radius,
        }
    }
}

/// Ball against a segment from `a` to `b` with half-thickness `radius`
pub fn ball_segment_collision(ball_pos: Vec2, ball_radius: f32, a: Vec2, b: Vec2, radius: f32) -> CollisionResult {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 1e-12 {
        ((ball_pos - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let delta = ball_pos - (a + ab * t);
    let dist = delta.length();
    let reach = ball_radius + radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > 1e-6 {
        delta / dist
    } else {
        ab.perp().try_normalize().unwrap_or(Vec2::NEG_Y)
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Bounce velocity off a surface with restitution
///
/// Only the approaching normal component is reflected: v' = v - (1 + e)(v·n)n
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let approach = velocity.dot(normal);
    if approach >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * approach * normal
}

/// Scale the tangential part of a contact velocity by `1 - friction`
#[inline]
pub fn damp_tangent(velocity: Vec2, normal: Vec2, friction: f32) -> Vec2 {
    let along_normal = velocity.dot(normal) * normal;
    along_normal + (velocity - along_normal) * (1.0 - friction)
}
