use crate::{Aabb, Vec3};

/// Distance budget given to primary rays.
pub const DEFAULT_RAY_DISTANCE: f32 = 1000.0;

/// Offset applied along a spawned ray so it does not re-hit the surface it
/// leaves.
pub const SURFACE_OFFSET: f32 = 0.001;

/// A ray in 3D space with origin, unit direction and a distance budget.
///
/// `max_distance` bounds every intersection test. Scene sweeps shrink it
/// each time a closer hit is found, so the nearest hit wins without sorting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        debug_assert!(
            direction.length_squared() > 0.0,
            "ray direction must be non-zero"
        );

        Self {
            origin,
            direction: direction.normalize(),
            max_distance,
        }
    }

    /// Create the ray segment running from `start` to `end`.
    pub fn between(start: Vec3, end: Vec3) -> Self {
        let delta = end - start;
        Self::new(start, delta, delta.length())
    }

    /// Spawn a ray leaving a surface at `position`, nudged along `direction`
    /// by [`SURFACE_OFFSET`].
    pub fn spawn(position: Vec3, direction: Vec3, max_distance: f32) -> Self {
        let direction = direction.normalize();
        Self {
            origin: position + direction * SURFACE_OFFSET,
            direction,
            max_distance,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Pruning pre-test only: the distance budget is not consulted. Empty
    /// boxes never intersect. An axis the ray runs parallel to rejects when
    /// the origin lies outside that slab.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if !aabb.is_valid() {
            return false;
        }

        let mut tmin = f32::MIN;
        let mut tmax = f32::MAX;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if dir.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;

            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        tmax >= tmin
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            max_distance: DEFAULT_RAY_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0), 10.0);
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.max_distance, 10.0);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 10.0);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_between() {
        let ray = Ray::between(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.direction, Vec3::Z);
        assert!((ray.max_distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_offsets_origin() {
        let ray = Ray::spawn(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 5.0);
        assert_eq!(ray.direction, Vec3::Y);
        assert!((ray.origin.y - SURFACE_OFFSET).abs() < 1e-7);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 100.0);
        assert!(ray.intersects_aabb(&aabb));

        // Ray missing the box, parallel to an axis
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 100.0);
        assert!(!ray.intersects_aabb(&aabb));

        // Diagonal ray passing beside the box
        let ray = Ray::new(Vec3::new(5.0, 0.0, -5.0), Vec3::new(0.0, 1.0, 1.0), 100.0);
        assert!(!ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_aabb_flat_box_is_not_culled() {
        // Zero thickness along Z, like the bounds of a quad in the XY plane.
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.2, 0.3, -5.0), Vec3::Z, 100.0);
        assert!(ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_empty_aabb_never_hits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let origin = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            if dir.length_squared() < 1e-4 {
                continue;
            }
            let ray = Ray::new(origin, dir, 100.0);
            assert!(!ray.intersects_aabb(&Aabb::EMPTY));
        }
    }

    #[test]
    fn test_ray_through_center_hits() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..256 {
            let min = Vec3::new(rng.gen_range(-5.0..0.0), rng.gen_range(-5.0..0.0), rng.gen_range(-5.0..0.0));
            let max = min + Vec3::new(rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0));
            let aabb = Aabb::from_points(min, max);

            let origin = Vec3::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            let to_center = aabb.centroid() - origin;
            if to_center.length_squared() < 1e-4 {
                continue;
            }

            let ray = Ray::new(origin, to_center, 100.0);
            assert!(ray.intersects_aabb(&aabb), "ray {ray:?} should hit {aabb:?}");
        }
    }
}
