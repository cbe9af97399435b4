//! Random sampling for particle initialization.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// RNG wrapper with the sampling helpers the field needs at spawn time.
///
/// Degenerate ranges (`max <= min`) are tolerated and yield `min`, so a zero
/// speed bound or a fixed radius never panics.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context from a fixed seed, or from the clock when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[min, max)`, or `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random coordinate in `[inset, extent - inset)`.
    ///
    /// When the surface is too thin to honor the inset, the coordinate is
    /// pinned to the middle of the axis so it stays on-surface.
    pub fn random_inset(&mut self, extent: f32, inset: f32) -> f32 {
        let max = extent - inset;
        if max > inset {
            self.rng.gen_range(inset..max)
        } else {
            extent * 0.5
        }
    }

    /// Random velocity with each component drawn from `[-max_speed, max_speed)`.
    pub fn random_velocity(&mut self, max_speed: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max_speed, max_speed),
            self.random_range(-max_speed, max_speed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SpawnContext::new(Some(9));
        let mut b = SpawnContext::new(Some(9));
        for _ in 0..16 {
            assert_eq!(a.random_range(0.0, 1.0), b.random_range(0.0, 1.0));
        }
    }

    #[test]
    fn test_random_range_bounds() {
        let mut ctx = SpawnContext::new(Some(1));
        for _ in 0..1000 {
            let v = ctx.random_range(1.0, 2.5);
            assert!((1.0..2.5).contains(&v));
        }
        assert_eq!(ctx.random_range(3.0, 3.0), 3.0);
        assert_eq!(ctx.random_range(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_random_inset() {
        let mut ctx = SpawnContext::new(Some(2));
        for _ in 0..1000 {
            let v = ctx.random_inset(100.0, 4.0);
            assert!((4.0..96.0).contains(&v));
        }
        // Too thin for the inset
        assert_eq!(ctx.random_inset(6.0, 4.0), 3.0);
        assert_eq!(ctx.random_inset(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_zero_speed() {
        let mut ctx = SpawnContext::new(Some(3));
        assert_eq!(ctx.random_velocity(0.0), Vec2::ZERO);
    }
}
