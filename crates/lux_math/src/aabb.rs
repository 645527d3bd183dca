use crate::Vec3;

/// Axis-Aligned Bounding Box used to prune intersection tests.
///
/// The empty box uses the `min = +inf, max = -inf` sentinel so that the
/// first `expand` call snaps both corners onto the expanded point. Boxes
/// only ever grow.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the smallest AABB containing a sphere.
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        let mut aabb = Self::EMPTY;
        aabb.expand_by_sphere(center, radius);
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// A box is valid once it contains at least one point.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.max.x >= self.min.x && self.max.y >= self.min.y && self.max.z >= self.min.z
    }

    /// Grow the box to contain `p`.
    #[inline]
    pub fn expand(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow the box to contain another box.
    pub fn expand_by_aabb(&mut self, other: &Aabb) {
        if other.is_valid() {
            self.expand(other.min);
            self.expand(other.max);
        }
    }

    /// Grow the box to contain a sphere.
    pub fn expand_by_sphere(&mut self, center: Vec3, radius: f32) {
        let r = Vec3::splat(radius.abs());
        self.expand(center - r);
        self.expand(center + r);
    }

    /// Returns true if `p` is strictly inside the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.x < p.x
            && p.x < self.max.x
            && self.min.y < p.y
            && p.y < self.max.y
            && self.min.z < p.z
            && p.z < self.max.z
    }

    /// Extent of the box along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties resolve toward the later axis.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();

        if size.x > size.y {
            if size.x > size.z {
                0
            } else {
                2
            }
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
