//! Renderable shapes.
//!
//! The set of shapes is closed, so dispatch is a single `match`. Every shape
//! except the unbounded plane carries bounds computed at construction, used
//! by the scene to skip precise tests for rays that miss the box.

use std::path::Path;

use lux_core::{load_obj_or_empty, MeshData, MeshMaterial, MeshTriangle, TextureCache};
use lux_math::{barycentric, Aabb, HitResult, Mat4, Ray, Vec2, Vec3};

use crate::spatial_tree::SpatialTree;

/// Geometry that a ray can hit.
#[derive(Debug)]
pub enum Shape {
    Sphere {
        center: Vec3,
        radius: f32,
        bounds: Aabb,
    },
    /// Infinite plane through `point`. Has no bounds.
    Plane { normal: Vec3, point: Vec3 },
    Capsule {
        start: Vec3,
        end: Vec3,
        radius: f32,
        bounds: Aabb,
    },
    Mesh(Box<MeshShape>),
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Shape::Sphere {
            center,
            radius,
            bounds: Aabb::from_sphere(center, radius),
        }
    }

    /// A plane with the given facing. The normal is normalized.
    pub fn plane(normal: Vec3, point: Vec3) -> Self {
        Shape::Plane {
            normal: normal.normalize(),
            point,
        }
    }

    pub fn capsule(start: Vec3, end: Vec3, radius: f32) -> Self {
        let mut bounds = Aabb::from_sphere(start, radius);
        bounds.expand_by_sphere(end, radius);
        Shape::Capsule {
            start,
            end,
            radius,
            bounds,
        }
    }

    pub fn mesh(mesh: MeshShape) -> Self {
        Shape::Mesh(Box::new(mesh))
    }

    /// Precise intersection test within `(0, ray.max_distance)`.
    ///
    /// The ray is not modified; the caller decides whether to shrink it.
    pub fn test_ray_intersection(&self, ray: &Ray) -> Option<HitResult> {
        match self {
            Shape::Sphere { center, radius, .. } => ray.intersect_sphere(*center, *radius),
            Shape::Plane { normal, point } => ray.intersect_plane(*normal, *point),
            Shape::Capsule {
                start, end, radius, ..
            } => ray.intersect_capsule(*start, *end, *radius),
            Shape::Mesh(mesh) => mesh.test_ray_intersection(ray),
        }
    }

    /// Whether `bounds()` can be used as a pre-test.
    pub fn has_culling_bounds(&self) -> bool {
        !matches!(self, Shape::Plane { .. })
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Shape::Sphere { bounds, .. } | Shape::Capsule { bounds, .. } => *bounds,
            Shape::Plane { .. } => Aabb::EMPTY,
            Shape::Mesh(mesh) => mesh.bounds,
        }
    }
}

/// A triangle mesh with its spatial tree.
///
/// Hits report a shading normal interpolated from the hit triangle's vertex
/// normals, and a texture sample when the triangle's material has a texture.
#[derive(Debug)]
pub struct MeshShape {
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    triangles: Vec<MeshTriangle>,
    materials: Vec<MeshMaterial>,
    tree: SpatialTree,
    bounds: Aabb,
}

impl MeshShape {
    /// Build the spatial tree for `mesh`.
    ///
    /// A mesh with invalid indices is logged and replaced by an empty mesh.
    pub fn new(mut mesh: MeshData) -> Self {
        if let Err(err) = mesh.validate() {
            log::error!("Discarding invalid mesh: {}", err);
            mesh = MeshData::empty();
        }

        let tree = SpatialTree::build(&mesh.points, &mesh.point_indices());
        let bounds = tree.bounds();

        Self {
            points: mesh.points,
            normals: mesh.normals,
            texcoords: mesh.texcoords,
            triangles: mesh.triangles,
            materials: mesh.materials,
            tree,
            bounds,
        }
    }

    /// Load an OBJ and place it with `transform`.
    ///
    /// Any load failure is logged and yields a mesh that renders nothing.
    pub fn from_obj_or_empty(
        path: impl AsRef<Path>,
        textures: &mut TextureCache,
        transform: Mat4,
    ) -> Self {
        let mesh = load_obj_or_empty(path, textures);
        if mesh.is_empty() {
            return Self::new(mesh);
        }
        Self::new(mesh.transformed(transform))
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn tree(&self) -> &SpatialTree {
        &self.tree
    }

    fn test_ray_intersection(&self, ray: &Ray) -> Option<HitResult> {
        let mut ray = *ray;
        let (mut hit, index) = self.tree.test_ray_intersection(&mut ray, &self.points)?;
        let tri = &self.triangles[index];

        let [a, b, c] = tri.points.map(|i| self.points[i as usize]);
        let weights = barycentric(hit.position, a, b, c);

        if let Some([n0, n1, n2]) = tri.normals {
            let normal = self.normals[n0 as usize] * weights.x
                + self.normals[n1 as usize] * weights.y
                + self.normals[n2 as usize] * weights.z;
            if let Some(normal) = normal.try_normalize() {
                hit.normal = normal;
            }
        }

        let texture = tri
            .material
            .and_then(|m| self.materials.get(m))
            .and_then(|m| m.diffuse_texture.as_ref());

        if let (Some(texture), Some([t0, t1, t2])) = (texture, tri.texcoords) {
            let uv = self.texcoords[t0 as usize] * weights.x
                + self.texcoords[t1 as usize] * weights.y
                + self.texcoords[t2 as usize] * weights.z;
            hit.texture_sample = Some(texture.sample(uv.x, uv.y));
        }

        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::Texture;
    use std::sync::Arc;

    fn quad_mesh() -> MeshData {
        // Unit quad in the XY plane at z = 2, facing -Z toward the origin.
        let mut mesh = MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, 2.0),
                Vec3::new(-1.0, 1.0, 2.0),
                Vec3::new(1.0, 1.0, 2.0),
                Vec3::new(1.0, -1.0, 2.0),
            ],
            vec![MeshTriangle::new([0, 1, 2]), MeshTriangle::new([0, 2, 3])],
        );
        mesh.compute_normals();
        mesh
    }

    #[test]
    fn test_plane_has_no_culling_bounds() {
        let plane = Shape::plane(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert!(!plane.has_culling_bounds());
        assert!(!plane.bounds().is_valid());

        match plane {
            Shape::Plane { normal, .. } => assert_eq!(normal, Vec3::Y),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_bounded_shapes() {
        let sphere = Shape::sphere(Vec3::new(0.0, 1.0, 0.0), 1.0);
        assert!(sphere.has_culling_bounds());
        assert_eq!(sphere.bounds().min, Vec3::new(-1.0, 0.0, -1.0));

        let capsule = Shape::capsule(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), 0.5);
        assert_eq!(capsule.bounds().min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(capsule.bounds().max, Vec3::new(0.5, 4.5, 0.5));
    }

    #[test]
    fn test_dispatch_matches_primitive_tests() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 100.0);
        let sphere = Shape::sphere(Vec3::ZERO, 1.0);
        let hit = sphere.test_ray_intersection(&ray).unwrap();
        assert_eq!(Some(hit), ray.intersect_sphere(Vec3::ZERO, 1.0));
    }

    #[test]
    fn test_mesh_hit_uses_interpolated_normal() {
        let mut mesh = quad_mesh();
        // Tilt one vertex normal so interpolation is observable
        mesh.normals[2] = Vec3::new(1.0, 0.0, -1.0).normalize();

        let shape = Shape::mesh(MeshShape::new(mesh));
        let ray = Ray::new(Vec3::new(0.5, -0.2, 0.0), Vec3::Z, 100.0);
        let hit = shape.test_ray_intersection(&ray).unwrap();

        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
        assert!(hit.normal.x > 0.0);
        assert!(hit.texture_sample.is_none());
    }

    #[test]
    fn test_mesh_samples_texture() {
        let mut mesh = quad_mesh();
        mesh.texcoords = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];
        mesh.materials = vec![MeshMaterial {
            name: "red".into(),
            diffuse_texture: Some(Arc::new(Texture::new(
                1,
                1,
                vec![[1.0, 0.0, 0.0, 0.25]],
                "<red>",
            ))),
        }];
        for tri in &mut mesh.triangles {
            tri.texcoords = Some(tri.points);
            tri.material = Some(0);
        }

        let shape = Shape::mesh(MeshShape::new(mesh));
        let ray = Ray::new(Vec3::new(-0.25, 0.5, 0.0), Vec3::Z, 100.0);
        let hit = shape.test_ray_intersection(&ray).unwrap();

        let sample = hit.texture_sample.unwrap();
        assert!((sample.x - 1.0).abs() < 1e-5);
        assert!((hit.sampled_alpha() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_mesh_does_not_modify_callers_ray() {
        let shape = Shape::mesh(MeshShape::new(quad_mesh()));
        let ray = Ray::new(Vec3::new(-0.3, 0.4, 0.0), Vec3::Z, 100.0);
        assert!(shape.test_ray_intersection(&ray).is_some());
        assert_eq!(ray.max_distance, 100.0);
    }

    #[test]
    fn test_invalid_mesh_becomes_empty() {
        let mesh = MeshData::new(vec![Vec3::ZERO], vec![MeshTriangle::new([0, 1, 2])]);
        let shape = MeshShape::new(mesh);
        assert!(shape.is_empty());

        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z, 100.0);
        assert!(Shape::mesh(shape).test_ray_intersection(&ray).is_none());
    }

    #[test]
    fn test_missing_obj_renders_nothing() {
        let mut textures = TextureCache::new();
        let shape = MeshShape::from_obj_or_empty(
            "no/such/file.obj",
            &mut textures,
            Mat4::IDENTITY,
        );
        assert!(shape.is_empty());
        assert!(!shape.tree().is_built());
    }
}
