//! Spatial tree over mesh triangles.
//!
//! A binary partition that splits at the mean triangle centroid along the
//! longest axis of each node's bounds. Every leaf holds exactly one triangle.
//! Queries shrink the ray's `max_distance` as they find closer hits.

use std::time::Instant;

use lux_math::{Aabb, HitResult, Ray, Vec3};

/// Above this many triangles the two halves of a node build in parallel.
const PARALLEL_BUILD_THRESHOLD: usize = 4096;

/// A triangle as stored in the tree: point indices plus its position in the
/// mesh's triangle list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleRef {
    pub points: [u32; 3],
    pub index: usize,
}

impl TriangleRef {
    #[inline]
    fn corners(&self, points: &[Vec3]) -> [Vec3; 3] {
        self.points.map(|i| points[i as usize])
    }
}

/// Tree node - either a branch owning two subtrees or a leaf with one triangle.
#[derive(Debug)]
enum TreeNode {
    Branch {
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        bounds: Aabb,
    },
    Leaf {
        triangle: TriangleRef,
        bounds: Aabb,
    },
}

/// Triangle acceleration structure for a single mesh.
///
/// The tree does not own the point buffer; queries take the same points the
/// tree was built from.
#[derive(Debug, Default)]
pub struct SpatialTree {
    root: Option<Box<TreeNode>>,
}

impl SpatialTree {
    /// Build a tree from a point buffer and a flat index buffer (three
    /// indices per triangle).
    ///
    /// An empty index buffer yields an unbuilt tree that never reports a hit.
    pub fn build(points: &[Vec3], indices: &[u32]) -> Self {
        let triangles: Vec<TriangleRef> = indices
            .chunks_exact(3)
            .enumerate()
            .map(|(index, tri)| TriangleRef {
                points: [tri[0], tri[1], tri[2]],
                index,
            })
            .collect();

        if triangles.is_empty() {
            log::warn!("Spatial tree build skipped: no triangles");
            return Self::default();
        }

        let start = Instant::now();
        let count = triangles.len();
        let root = TreeNode::build(points, triangles);
        let tree = Self {
            root: Some(Box::new(root)),
        };

        log::debug!(
            "Built spatial tree: {} triangles, depth {} in {:.2?}",
            count,
            tree.depth(),
            start.elapsed()
        );

        tree
    }

    /// Returns true once the tree holds at least one triangle.
    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    /// Find the nearest triangle hit along `ray`.
    ///
    /// On a hit, `ray.max_distance` is shrunk to the hit distance and the hit
    /// is returned with the triangle's originating index. On a miss the ray
    /// is left untouched.
    pub fn test_ray_intersection(
        &self,
        ray: &mut Ray,
        points: &[Vec3],
    ) -> Option<(HitResult, usize)> {
        let root = self.root.as_ref()?;
        let mut nearest = None;
        root.intersect(ray, points, &mut nearest);
        nearest
    }

    /// Bounds of every triangle in the tree.
    pub fn bounds(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, |node| node.bounds())
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, |node| node.leaf_count())
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |node| node.depth())
    }
}

impl TreeNode {
    fn build(points: &[Vec3], mut triangles: Vec<TriangleRef>) -> Self {
        let n = triangles.len();

        let mut bounds = Aabb::EMPTY;
        for tri in &triangles {
            for p in tri.corners(points) {
                bounds.expand(p);
            }
        }

        if n == 1 {
            return TreeNode::Leaf {
                triangle: triangles[0],
                bounds,
            };
        }

        let centroid = |tri: &TriangleRef| {
            let [a, b, c] = tri.corners(points);
            (a + b + c) / 3.0
        };

        let mean = triangles.iter().map(centroid).sum::<Vec3>() / n as f32;
        let axis = bounds.longest_axis();

        let (mut left, mut right): (Vec<_>, Vec<_>) = triangles
            .iter()
            .copied()
            .partition(|tri| centroid(tri)[axis] < mean[axis]);

        // All centroids on one side: fall back to halving the list.
        if left.is_empty() || right.is_empty() {
            right = triangles.split_off(n / 2);
            left = triangles;
        }

        let (left, right) = if n > PARALLEL_BUILD_THRESHOLD {
            rayon::join(
                || TreeNode::build(points, left),
                || TreeNode::build(points, right),
            )
        } else {
            (TreeNode::build(points, left), TreeNode::build(points, right))
        };

        TreeNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bounds,
        }
    }

    fn intersect(
        &self,
        ray: &mut Ray,
        points: &[Vec3],
        nearest: &mut Option<(HitResult, usize)>,
    ) -> bool {
        if !ray.intersects_aabb(&self.bounds()) {
            return false;
        }

        match self {
            TreeNode::Leaf { triangle, .. } => {
                match ray.intersect_triangle(&triangle.corners(points), None) {
                    Some(hit) => {
                        ray.max_distance = hit.distance;
                        *nearest = Some((hit, triangle.index));
                        true
                    }
                    None => false,
                }
            }
            TreeNode::Branch { left, right, .. } => {
                // The left subtree may shorten the ray before the right is tested.
                let hit_left = left.intersect(ray, points, nearest);
                let hit_right = right.intersect(ray, points, nearest);
                hit_left || hit_right
            }
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            TreeNode::Branch { bounds, .. } | TreeNode::Leaf { bounds, .. } => *bounds,
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}
