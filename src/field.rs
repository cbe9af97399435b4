//! Simulation state: the particle population of one surface.
//!
//! A [`ParticleField`] is always built in one batch for a given surface size
//! and thrown away in one batch when the size changes. There is no per-particle
//! add or remove during a run.
//!
//! # Density
//!
//! The population is `floor(width * height / density_divisor)`. With the
//! default divisor of 11000 a 400x300 card gets 10 particles and an 800x300
//! card gets 21, which keeps the quadratic connection search cheap.

use crate::config::FieldConfig;
use crate::particle::Particle;
use crate::spawn::SpawnContext;
use glam::Vec2;

/// Number of particles for a surface of the given size.
///
/// Computed in 64-bit integers so large surfaces cannot overflow. A zero
/// divisor yields an empty field.
pub fn particle_count(width: u32, height: u32, density_divisor: u32) -> usize {
    if density_divisor == 0 {
        return 0;
    }
    let area = width as u64 * height as u64;
    (area / density_divisor as u64) as usize
}

/// Particles plus the surface extent they bounce inside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleField {
    width: u32,
    height: u32,
    pub(crate) particles: Vec<Particle>,
}

impl ParticleField {
    /// An empty field with no extent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fresh population for a `width` x `height` surface.
    ///
    /// Each particle gets a radius in `[min_radius, max_radius)` and is placed
    /// at least twice its radius away from every edge. Always succeeds; a
    /// zero-area surface yields no particles.
    pub fn initialize(width: u32, height: u32, config: &FieldConfig, ctx: &mut SpawnContext) -> Self {
        let count = particle_count(width, height, config.density_divisor);
        let color = config.particle_color();
        let (w, h) = (width as f32, height as f32);

        let particles = (0..count)
            .map(|_| {
                let radius = ctx.random_range(config.min_radius, config.max_radius);
                let inset = radius * 2.0;
                let position = Vec2::new(ctx.random_inset(w, inset), ctx.random_inset(h, inset));
                let velocity = ctx.random_velocity(config.max_speed);
                Particle::new(position, velocity, radius, color)
            })
            .collect();

        Self {
            width,
            height,
            particles,
        }
    }

    /// Build a field from explicit particles, e.g. for replaying a recorded state.
    pub fn from_particles(width: u32, height: u32, particles: Vec<Particle>) -> Self {
        Self {
            width,
            height,
            particles,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface extent as a vector.
    #[inline]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
