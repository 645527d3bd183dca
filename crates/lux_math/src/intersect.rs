//! Analytic ray/primitive intersection routines.
//!
//! Every test accepts hits strictly in front of the origin and inside the
//! ray's distance budget, and returns the hit instead of mutating the ray.
//! Callers that sweep several primitives shrink `max_distance` themselves.

use crate::{HitResult, Ray, Vec3};

/// Below this |cos| between ray and plane normal the ray counts as parallel.
const PLANE_PARALLEL_EPSILON: f32 = 1e-6;

impl Ray {
    /// Ray/sphere test, taking the near root of the quadratic.
    ///
    /// A ray that starts inside the sphere has its near root behind the
    /// origin and therefore reports no hit.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<HitResult> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        if t <= 0.0 || t >= self.max_distance {
            return None;
        }

        let position = self.at(t);
        let normal = (position - center).normalize();
        debug_assert!(!normal.is_nan(), "NaN sphere normal (radius {radius})");

        Some(HitResult::new(position, normal, t))
    }

    /// Ray/plane test. Near-parallel rays never hit.
    pub fn intersect_plane(&self, normal: Vec3, point: Vec3) -> Option<HitResult> {
        let denom = normal.dot(self.direction);
        if denom.abs() <= PLANE_PARALLEL_EPSILON {
            return None;
        }

        let t = (point - self.origin).dot(normal) / denom;
        if t < 0.0 || t >= self.max_distance {
            return None;
        }

        Some(HitResult::new(self.at(t), normal, t))
    }

    /// Ray/capsule test: the clipped cylinder body first, then the two
    /// spherical caps, keeping the nearer cap when both are hit.
    pub fn intersect_capsule(&self, start: Vec3, end: Vec3, radius: f32) -> Option<HitResult> {
        if let Some(hit) = self.intersect_cylinder(start, end, radius) {
            return Some(hit);
        }

        match (
            self.intersect_sphere(start, radius),
            self.intersect_sphere(end, radius),
        ) {
            (Some(a), Some(b)) => Some(if a.distance < b.distance { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    /// Infinite cylinder around `start..end`, clipped to the segment's end planes.
    fn intersect_cylinder(&self, start: Vec3, end: Vec3, radius: f32) -> Option<HitResult> {
        let d = end - start;
        let m = self.origin - start;

        // Starting beyond an end plane and pointing away: nothing to hit.
        if m.dot(d) < 0.0 && self.direction.dot(d) < 0.0 {
            return None;
        }
        if (self.origin - end).dot(-d) < 0.0 && self.direction.dot(-d) < 0.0 {
            return None;
        }

        let dd = d.dot(d);
        let nd = self.direction.dot(d);
        let mn = m.dot(self.direction);
        let md = m.dot(d);
        let mm = m.dot(m);

        let a = dd - nd * nd;
        let b = dd * mn - nd * md;
        let c = dd * (mm - radius * radius) - md * md;

        // Parallel to the axis
        if a.abs() < f32::EPSILON {
            return None;
        }

        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let t = (-b - discriminant.sqrt()) / a;
        if t <= 0.0 || t >= self.max_distance {
            return None;
        }

        let position = self.at(t);
        if (position - start).dot(d) < 0.0 || (position - end).dot(-d) < 0.0 {
            return None;
        }

        let side = d.cross(position - start);
        let normal = side.cross(d).normalize();
        debug_assert!(!normal.is_nan(), "NaN capsule normal");

        Some(HitResult::new(position, normal, t))
    }

    /// Ray/triangle test against the plane of `points`.
    ///
    /// `face_normal` may be supplied precomputed; it must be the unit normal
    /// of the counter-clockwise winding `points[0], points[1], points[2]`.
    /// Both faces are hit and the reported normal is the face normal.
    pub fn intersect_triangle(
        &self,
        points: &[Vec3; 3],
        face_normal: Option<Vec3>,
    ) -> Option<HitResult> {
        let [a, b, c] = *points;
        let normal = face_normal.unwrap_or_else(|| (b - a).cross(c - a).normalize());

        // Signed heights of the ray's origin and endpoint above the plane.
        let denom = normal.dot(self.direction);
        let start_height = normal.dot(self.origin - a);
        let end_height = start_height + denom * self.max_distance;

        if start_height * end_height > 0.0 {
            return None;
        }
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = -start_height / denom;
        if t <= 0.0 || t >= self.max_distance {
            return None;
        }

        let position = self.at(t);
        debug_assert!(
            !position.is_nan(),
            "NaN triangle crossing for {points:?} and {self:?}"
        );

        let inside = [(a, b), (b, c), (c, a)]
            .iter()
            .all(|&(from, to)| (to - from).cross(normal).dot(position - from) <= 0.0);
        if !inside {
            return None;
        }

        Some(HitResult::new(position, normal, t))
    }
}

/// Barycentric weights `(u, v, w)` of `p` in triangle `(a, b, c)`.
///
/// The weights sum to one and interpolate as `u * A + v * B + w * C`.
pub fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < f32::MIN_POSITIVE {
        // Degenerate triangle: fall back to the first vertex.
        return Vec3::X;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Vec3::new(1.0 - v - w, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_sphere_hit_through_center() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 100.0);
        let hit = ray.intersect_sphere(Vec3::ZERO, 1.0).expect("should hit");

        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert_vec_near(hit.position, Vec3::new(0.0, 0.0, -1.0));
        assert_vec_near(hit.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z, 100.0);
        assert!(ray.intersect_sphere(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_respects_distance_budget() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 3.0);
        assert!(ray.intersect_sphere(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_inside_pointing_away_does_not_hit_behind() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::Z, 100.0);
        if let Some(hit) = ray.intersect_sphere(Vec3::ZERO, 1.0) {
            assert!(hit.distance > 0.0);
            assert!((hit.position - ray.origin).dot(ray.direction) > 0.0);
        }
    }

    #[test]
    fn test_sphere_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 100.0);
        assert!(ray.intersect_sphere(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 100.0);
        let hit = ray.intersect_plane(Vec3::Y, Vec3::ZERO).expect("should hit");

        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_parallel_is_miss() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X, 100.0);
        assert!(ray.intersect_plane(Vec3::Y, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_plane_behind_and_out_of_range() {
        let away = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y, 100.0);
        assert!(away.intersect_plane(Vec3::Y, Vec3::ZERO).is_none());

        let short = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 4.0);
        assert!(short.intersect_plane(Vec3::Y, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_capsule_body_hit() {
        let start = Vec3::new(0.0, -1.0, 0.0);
        let end = Vec3::new(0.0, 1.0, 0.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 100.0);

        let hit = ray.intersect_capsule(start, end, 0.5).expect("should hit");
        assert!((hit.distance - 4.5).abs() < 1e-4);
        assert_vec_near(hit.normal, -Vec3::X);
    }

    #[test]
    fn test_capsule_cap_hit() {
        let start = Vec3::new(0.0, -1.0, 0.0);
        let end = Vec3::new(0.0, 1.0, 0.0);

        // Straight down the axis: misses the body, hits the top cap.
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 100.0);
        let hit = ray.intersect_capsule(start, end, 0.5).expect("should hit cap");
        assert!((hit.distance - 3.5).abs() < 1e-4);
        assert_vec_near(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_capsule_miss() {
        let ray = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::X, 100.0);
        assert!(ray
            .intersect_capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.5)
            .is_none());
    }

    #[test]
    fn test_triangle_hit() {
        let points = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 100.0);

        let hit = ray.intersect_triangle(&points, None).expect("should hit");
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert_vec_near(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_triangle_hit_from_back() {
        let points = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, 100.0);
        assert!(ray.intersect_triangle(&points, None).is_some());
    }

    #[test]
    fn test_triangle_miss() {
        let points = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 100.0);
        assert!(ray.intersect_triangle(&points, None).is_none());

        // Crossing the plane outside the triangle
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), -Vec3::Z, 100.0);
        assert!(ray.intersect_triangle(&points, None).is_none());

        // Not long enough to reach the plane
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.5);
        assert!(ray.intersect_triangle(&points, None).is_none());

        // Coplanar
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X, 100.0);
        assert!(ray.intersect_triangle(&points, None).is_none());
    }

    #[test]
    fn test_barycentric_vertices_and_center() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);

        assert_vec_near(barycentric(a, a, b, c), Vec3::new(1.0, 0.0, 0.0));
        assert_vec_near(barycentric(b, a, b, c), Vec3::new(0.0, 1.0, 0.0));
        assert_vec_near(barycentric(c, a, b, c), Vec3::new(0.0, 0.0, 1.0));

        let centroid = (a + b + c) / 3.0;
        let weights = barycentric(centroid, a, b, c);
        assert_vec_near(weights, Vec3::splat(1.0 / 3.0));
        assert!((weights.x + weights.y + weights.z - 1.0).abs() < 1e-6);
    }
}
