// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod hit;
mod intersect;
mod ray;

pub use aabb::Aabb;
pub use hit::HitResult;
pub use intersect::barycentric;
pub use ray::{Ray, DEFAULT_RAY_DISTANCE, SURFACE_OFFSET};

/// Color type alias (linear RGB, typically 0-1 but unbounded for emitters)
pub type Color = Vec3;

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
