//! The particle record.

use glam::{Vec2, Vec4};

/// A single drifting point.
///
/// Velocity magnitude is fixed at spawn; the stepper only flips its signs on
/// wall contact. Positions are in surface pixels with the origin at the top
/// left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Center in surface pixels.
    pub position: Vec2,
    /// Displacement applied once per tick.
    pub velocity: Vec2,
    /// Disc radius in pixels.
    pub radius: f32,
    /// Straight RGBA fill color.
    pub color: Vec4,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Vec4) -> Self {
        Self {
            position,
            velocity,
            radius,
            color,
        }
    }

    /// Squared distance to another particle.
    #[inline]
    pub fn distance_squared(&self, other: &Particle) -> f32 {
        self.position.distance_squared(other.position)
    }
}
