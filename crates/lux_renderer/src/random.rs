//! Random sampling helpers shared by the camera and materials.

use lux_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed unit vector (rejection sampling in the unit ball).
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = p.length_squared();
        // Reject points too close to the origin to normalize safely
        if 1e-12 < len_sq && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Unit vector in the hemisphere around `normal`.
///
/// Samples the full sphere and mirrors samples from the wrong side.
pub fn random_hemisphere_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let dir = random_unit_vector(rng);
    if dir.dot(normal) < 0.0 {
        -dir
    } else {
        dir
    }
}
