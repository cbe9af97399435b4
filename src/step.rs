//! The stepper: one tick of motion.

use crate::field::ParticleField;

/// Advance every particle by one tick.
///
/// Walls are tested against the position *before* the move: if a particle is
/// past `0` or the surface extent on an axis, that axis's velocity is negated,
/// then velocity is added to position. The radius is ignored, so a disc can
/// poke past an edge, and a particle may spend one tick just outside before
/// the reversed velocity brings it back.
pub fn advance(field: &mut ParticleField) {
    let extent = field.extent();

    for p in &mut field.particles {
        if p.position.x > extent.x || p.position.x < 0.0 {
            p.velocity.x = -p.velocity.x;
        }
        if p.position.y > extent.y || p.position.y < 0.0 {
            p.velocity.y = -p.velocity.y;
        }
        p.position += p.velocity;
    }
}
