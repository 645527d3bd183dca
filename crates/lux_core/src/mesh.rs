//! Indexed triangle mesh data.
//!
//! `MeshData` is what ingestion produces and what the renderer's mesh shape
//! and spatial tree are built from. Points, normals and texture coordinates
//! live in separate arrays indexed per triangle corner, the way OBJ stores them.

use std::sync::Arc;

use lux_math::{Aabb, Mat4, Vec2, Vec3};
use thiserror::Error;

use crate::texture::Texture;

/// Errors that can occur while ingesting a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Triangle {triangle} references {kind} index {index}, but only {len} exist")]
    InvalidIndex {
        triangle: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("Mesh contains no triangles")]
    Empty,
}

pub type MeshResult<T> = Result<T, MeshError>;

/// One triangle: per-corner indices into the mesh's attribute arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshTriangle {
    /// Indices into `MeshData::points`
    pub points: [u32; 3],

    /// Indices into `MeshData::normals`
    pub normals: Option<[u32; 3]>,

    /// Indices into `MeshData::texcoords`
    pub texcoords: Option<[u32; 3]>,

    /// Index into `MeshData::materials`
    pub material: Option<usize>,
}

impl MeshTriangle {
    /// A triangle carrying only point indices.
    pub fn new(points: [u32; 3]) -> Self {
        Self {
            points,
            normals: None,
            texcoords: None,
            material: None,
        }
    }
}

/// Material binding declared by a mesh's material library.
#[derive(Clone, Debug, Default)]
pub struct MeshMaterial {
    pub name: String,
    pub diffuse_texture: Option<Arc<Texture>>,
}

/// Triangle mesh ready to be turned into a renderable shape.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions
    pub points: Vec<Vec3>,

    /// Vertex normals, referenced by `MeshTriangle::normals`
    pub normals: Vec<Vec3>,

    /// Texture coordinates, referenced by `MeshTriangle::texcoords`
    pub texcoords: Vec<Vec2>,

    pub triangles: Vec<MeshTriangle>,

    pub materials: Vec<MeshMaterial>,

    /// Bounds of all points
    pub bounds: Aabb,
}

impl MeshData {
    /// Create a mesh from points and triangles without normals or materials.
    pub fn new(points: Vec<Vec3>, triangles: Vec<MeshTriangle>) -> Self {
        let mut mesh = Self {
            points,
            triangles,
            ..Default::default()
        };
        mesh.recompute_bounds();
        mesh
    }

    /// A mesh with nothing in it. Renders as no geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flat point index buffer, three entries per triangle.
    pub fn point_indices(&self) -> Vec<u32> {
        self.triangles.iter().flat_map(|t| t.points).collect()
    }

    /// Check that every index refers to an existing attribute.
    pub fn validate(&self) -> MeshResult<()> {
        let check = |triangle: usize, kind: &'static str, indices: &[u32; 3], len: usize| {
            match indices.iter().find(|&&i| i as usize >= len) {
                Some(&index) => Err(MeshError::InvalidIndex {
                    triangle,
                    kind,
                    index,
                    len,
                }),
                None => Ok(()),
            }
        };

        for (i, tri) in self.triangles.iter().enumerate() {
            check(i, "point", &tri.points, self.points.len())?;
            if let Some(normals) = &tri.normals {
                check(i, "normal", normals, self.normals.len())?;
            }
            if let Some(texcoords) = &tri.texcoords {
                check(i, "texcoord", texcoords, self.texcoords.len())?;
            }
            if let Some(material) = tri.material {
                if material >= self.materials.len() {
                    return Err(MeshError::InvalidIndex {
                        triangle: i,
                        kind: "material",
                        index: material as u32,
                        len: self.materials.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check if every triangle carries normal indices.
    pub fn has_normals(&self) -> bool {
        !self.triangles.is_empty() && self.triangles.iter().all(|t| t.normals.is_some())
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Replaces any existing normals; afterwards each triangle's normal
    /// indices equal its point indices. Faces wind counter-clockwise.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.points.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for tri in &self.triangles {
            let [i0, i1, i2] = tri.points.map(|i| i as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let edge1 = self.points[i1] - self.points[i0];
            let edge2 = self.points[i2] - self.points[i0];
            let face_normal = edge1.cross(edge2);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            // Default up normal for unreferenced or degenerate vertices
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = normals;
        for tri in &mut self.triangles {
            tri.normals = Some(tri.points);
        }
    }

    /// Ensure the mesh has per-vertex normals, computing them if any are missing.
    pub fn ensure_normals(&mut self) {
        if !self.has_normals() {
            log::debug!(
                "Computing smooth normals for {} triangles",
                self.triangles.len()
            );
            self.compute_normals();
        }
    }

    /// Apply an affine transform to points and normals.
    pub fn transformed(mut self, transform: Mat4) -> Self {
        let normal_matrix = transform.inverse().transpose();

        for p in &mut self.points {
            *p = transform.transform_point3(*p);
        }
        for n in &mut self.normals {
            *n = normal_matrix
                .transform_vector3(*n)
                .try_normalize()
                .unwrap_or(*n);
        }

        self.recompute_bounds();
        self
    }

    /// Recompute `bounds` from the current points.
    pub fn recompute_bounds(&mut self) {
        let mut bounds = Aabb::empty();
        for p in &self.points {
            bounds.expand(*p);
        }
        self.bounds = bounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![MeshTriangle::new([0, 1, 2]), MeshTriangle::new([0, 2, 3])],
        )
    }

    #[test]
    fn test_new_computes_bounds() {
        let mesh = quad();
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.point_indices(), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshData::empty();
        assert!(mesh.is_empty());
        assert!(!mesh.bounds.is_valid());
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = quad();
        assert!(!mesh.has_normals());

        mesh.ensure_normals();

        assert!(mesh.has_normals());
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(mesh.triangles[1].normals, Some([0, 2, 3]));
    }

    #[test]
    fn test_validate_reports_bad_index() {
        let mut mesh = quad();
        assert!(mesh.validate().is_ok());

        mesh.triangles.push(MeshTriangle::new([0, 1, 7]));
        match mesh.validate() {
            Err(MeshError::InvalidIndex {
                triangle,
                kind,
                index,
                len,
            }) => {
                assert_eq!(triangle, 2);
                assert_eq!(kind, "point");
                assert_eq!(index, 7);
                assert_eq!(len, 4);
            }
            other => panic!("expected InvalidIndex, got {other:?}"),
        }
    }

    #[test]
    fn test_transformed() {
        let mut mesh = quad();
        mesh.compute_normals();

        let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))
            * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let mesh = mesh.transformed(transform);

        // Rotating -90 degrees about X maps +Y to -Z and +Z to +Y
        assert!((mesh.points[2] - Vec3::new(1.0, 0.0, 4.0)).length() < 1e-5);
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-5);
        }
        assert!((mesh.bounds.min - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        assert!((mesh.bounds.max - Vec3::new(1.0, 0.0, 5.0)).length() < 1e-5);
    }
}
