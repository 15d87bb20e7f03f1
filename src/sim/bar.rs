//! Bottom bar and its width animation
//!
//! The animation runs on the display frame clock, not the physics tick. Each
//! frame writes the bar's new shape and position in one step, keeping the
//! left edge fixed.

use glam::Vec2;

use super::physics::{BodyHandle, PhysicsWorld, Shape};

/// Ease-in-out curve: 0.5 - cos(πt)/2
#[inline]
pub fn ease_in_out(progress: f64) -> f64 {
    0.5 - (std::f64::consts::PI * progress).cos() / 2.0
}

/// A width tween with a fixed duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarAnimation {
    pub start_width: f32,
    pub end_width: f32,
    pub duration_ms: f64,
    pub started_ms: f64,
}

impl BarAnimation {
    /// Progress in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Eased width at `now_ms`; exactly `end_width` once complete
    pub fn width_at(&self, now_ms: f64) -> f32 {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.end_width;
        }
        let eased = ease_in_out(progress) as f32;
        self.start_width + (self.end_width - self.start_width) * eased
    }
}

/// The bar body the batch rests on
#[derive(Debug, Clone)]
pub struct Bar {
    pub body: BodyHandle,
    /// Left edge, fixed while the width changes
    pub left_x: f32,
    pub center_y: f32,
    pub height: f32,
    pub width: f32,
    pub full_width: f32,
    pub slim_width: f32,
    animation: Option<BarAnimation>,
}

impl Bar {
    pub fn new(body: BodyHandle, center: Vec2, full_width: f32, slim_width: f32, height: f32) -> Self {
        Self {
            body,
            left_x: center.x - full_width / 2.0,
            center_y: center.y,
            height,
            width: full_width,
            full_width,
            slim_width,
            animation: None,
        }
    }

    pub fn animation(&self) -> Option<&BarAnimation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Full width and at rest
    pub fn is_restored(&self) -> bool {
        self.animation.is_none() && self.width == self.full_width
    }

    /// Start a tween, replacing any running one
    pub fn animate(&mut self, start_width: f32, end_width: f32, duration_ms: f64, now_ms: f64) {
        self.animation = Some(BarAnimation {
            start_width,
            end_width,
            duration_ms,
            started_ms: now_ms,
        });
    }

    pub fn narrow(&mut self, duration_ms: f64, now_ms: f64) {
        self.animate(self.full_width, self.slim_width, duration_ms, now_ms);
    }

    pub fn widen(&mut self, duration_ms: f64, now_ms: f64) {
        self.animate(self.slim_width, self.full_width, duration_ms, now_ms);
    }

    /// Shape and center for the current width
    pub fn geometry(&self) -> (Shape, Vec2) {
        (
            Shape::rect(self.width, self.height),
            Vec2::new(self.left_x + self.width / 2.0, self.center_y),
        )
    }

    /// Advance the animation for one display frame and write the body geometry.
    /// Returns true when an animation completed on this frame.
    pub fn advance_frame<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, now_ms: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };

        self.width = animation.width_at(now_ms);
        let (shape, position) = self.geometry();
        if !world.reshape(self.body, shape, position) {
            log::warn!("Bar body {} missing, animation dropped", self.body);
            self.animation = None;
            return false;
        }

        if animation.progress(now_ms) >= 1.0 {
            self.animation = None;
            return true;
        }
        false
    }
}
