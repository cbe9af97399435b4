//! The renderer: discs plus distance-faded connection lines.
//!
//! Every frame is drawn from scratch in three passes:
//!
//! 1. clear the whole surface
//! 2. fill one disc per particle
//! 3. stroke a line between every pair closer than the connection radius
//!
//! Lines go on top of the discs.
//!
//! # Connection Search
//!
//! The search is a plain all-pairs scan. Distances are compared squared, so no
//! square root is taken, and line opacity falls off linearly in *squared*
//! distance: `1 - d² / R²`. A pair at distance 0 is fully opaque and a pair at
//! exactly `R` gets nothing. The density divisor keeps populations small
//! enough that the quadratic cost is negligible for card-sized surfaces.

use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::particle::Particle;
use crate::surface::DrawContext;
use glam::Vec4;

/// A line between two particles, by index into the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// Stroke alpha in `(0.0, 1.0]`.
    pub opacity: f32,
}

/// Opacity of the line for a pair at squared distance `distance_sq`, or `None`
/// if the pair is not connected.
#[inline]
pub fn connection_opacity(distance_sq: f32, radius_sq: f32) -> Option<f32> {
    if distance_sq < radius_sq {
        Some(1.0 - distance_sq / radius_sq)
    } else {
        None
    }
}

/// All connected pairs `(a, b)` with `a < b`, in index order.
pub fn connections(particles: &[Particle], radius: f32) -> impl Iterator<Item = Connection> + '_ {
    let radius_sq = radius * radius;
    let n = particles.len();

    (0..n).flat_map(move |a| {
        (a + 1..n).filter_map(move |b| {
            let distance_sq = particles[a].distance_squared(&particles[b]);
            connection_opacity(distance_sq, radius_sq).map(|opacity| Connection { a, b, opacity })
        })
    })
}

/// Stroke settings shared by every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    /// Line RGB; alpha is replaced per connection.
    pub line_color: Vec4,
    pub line_width: f32,
    pub connect_radius: f32,
}

impl Style {
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            line_color: config.accent(1.0),
            line_width: config.line_width,
            connect_radius: config.connect_radius,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

/// Draw one frame of `field` onto `ctx`. Particle state is not touched.
pub fn render<C: DrawContext + ?Sized>(ctx: &mut C, field: &ParticleField, style: &Style) {
    ctx.clear();

    let particles = field.particles();
    for p in particles {
        ctx.fill_circle(p.position, p.radius, p.color);
    }

    for c in connections(particles, style.connect_radius) {
        let color = style.line_color.truncate().extend(c.opacity);
        ctx.stroke_line(
            particles[c.a].position,
            particles[c.b].position,
            color,
            style.line_width,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawCommand};
    use glam::Vec2;

    fn dot(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, 1.5, Vec4::new(0.4, 0.9, 0.95, 0.8))
    }

    #[test]
    fn test_opacity_bounds() {
        let r2 = 100.0 * 100.0;
        assert_eq!(connection_opacity(0.0, r2), Some(1.0));
        assert_eq!(connection_opacity(r2, r2), None);
        assert_eq!(connection_opacity(r2 + 1.0, r2), None);
        assert_eq!(connection_opacity(r2 / 2.0, r2), Some(0.5));
    }

    #[test]
    fn test_opacity_is_linear_in_squared_distance() {
        // 50 px apart is a quarter of R², not half of R
        let particles = [dot(0.0, 0.0), dot(50.0, 0.0)];
        let found: Vec<_> = connections(&particles, 100.0).collect();
        assert_eq!(found.len(), 1);
        assert!((found[0].opacity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_exact_radius_not_connected() {
        let particles = [dot(0.0, 0.0), dot(60.0, 80.0)];
        assert_eq!(connections(&particles, 100.0).count(), 0);
    }

    #[test]
    fn test_pairs_are_distinct_and_unordered() {
        let particles = [dot(0.0, 0.0), dot(10.0, 0.0), dot(20.0, 0.0), dot(500.0, 500.0)];
        let found: Vec<_> = connections(&particles, 100.0).collect();
        let pairs: Vec<_> = found.iter().map(|c| (c.a, c.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_symmetric_under_reordering() {
        let forward = [dot(3.0, 4.0), dot(40.0, 70.0)];
        let reversed = [forward[1], forward[0]];
        let a: Vec<_> = connections(&forward, 100.0).collect();
        let b: Vec<_> = connections(&reversed, 100.0).collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].opacity, b[0].opacity);
    }

    #[test]
    fn test_render_order() {
        let field = ParticleField::from_particles(
            200,
            200,
            vec![dot(10.0, 10.0), dot(20.0, 10.0), dot(190.0, 190.0)],
        );
        let mut list = DisplayList::new(200, 200);
        render(&mut list, &field, &Style::default());

        let commands = list.commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(commands[1..4]
            .iter()
            .all(|c| matches!(c, DrawCommand::FillCircle { .. })));
        assert_eq!(commands.len(), 5);

        match commands[4] {
            DrawCommand::StrokeLine { from, to, color, width } => {
                assert_eq!(from, Vec2::new(10.0, 10.0));
                assert_eq!(to, Vec2::new(20.0, 10.0));
                assert!((color.w - 0.99).abs() < 1e-6);
                assert_eq!(width, 1.0);
            }
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[test]
    fn test_render_does_not_mutate() {
        let field = ParticleField::from_particles(50, 50, vec![dot(1.0, 2.0), dot(3.0, 4.0)]);
        let before = field.clone();
        let mut list = DisplayList::new(50, 50);
        render(&mut list, &field, &Style::default());
        assert_eq!(field, before);
    }

    #[test]
    fn test_render_empty_field_only_clears() {
        let mut list = DisplayList::new(10, 10);
        render(&mut list, &ParticleField::empty(), &Style::default());
        assert_eq!(list.commands(), &[DrawCommand::Clear]);
    }
}
