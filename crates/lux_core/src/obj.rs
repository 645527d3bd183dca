//! OBJ/MTL ingestion.
//!
//! All models in a file are merged into one `MeshData`. Diffuse textures
//! named by the material library are resolved against the OBJ's directory
//! and decoded through the shared [`TextureCache`].

use std::path::Path;
use std::time::Instant;

use lux_math::{Vec2, Vec3};

use crate::mesh::{MeshData, MeshError, MeshMaterial, MeshResult, MeshTriangle};
use crate::texture::TextureCache;

/// Load an OBJ file (and its MTL library, when present) into mesh data.
///
/// Missing vertex normals are filled in with smooth normals. A broken or
/// missing material library only costs the textures; the geometry still loads.
pub fn load_obj(path: impl AsRef<Path>, textures: &mut TextureCache) -> MeshResult<MeshData> {
    let path = path.as_ref();
    let start = Instant::now();

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: false,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let materials = match materials {
        Ok(materials) => materials
            .into_iter()
            .map(|m| MeshMaterial {
                diffuse_texture: m
                    .diffuse_texture
                    .as_deref()
                    .and_then(|tex| textures.load_or_absent(base_dir.join(tex))),
                name: m.name,
            })
            .collect(),
        Err(err) => {
            log::warn!("No usable material library for {}: {}", path.display(), err);
            Vec::new()
        }
    };

    let mut data = MeshData {
        materials,
        ..Default::default()
    };

    for model in &models {
        append_model(&mut data, &model.mesh);
    }

    if data.is_empty() {
        return Err(MeshError::Empty);
    }

    // Material ids beyond the library (e.g. the library failed to load) are dropped.
    let material_count = data.materials.len();
    for tri in &mut data.triangles {
        tri.material = tri.material.filter(|&m| m < material_count);
    }

    data.validate()?;
    data.ensure_normals();
    data.recompute_bounds();

    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles, {} materials in {:.2?}",
        path.display(),
        data.points.len(),
        data.triangle_count(),
        data.materials.len(),
        start.elapsed()
    );

    Ok(data)
}

fn append_model(data: &mut MeshData, mesh: &tobj::Mesh) {
    let point_base = data.points.len() as u32;
    let normal_base = data.normals.len() as u32;
    let texcoord_base = data.texcoords.len() as u32;

    data.points.extend(
        mesh.positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2])),
    );
    data.normals.extend(
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2])),
    );
    data.texcoords.extend(
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1])),
    );

    let triangle_count = mesh.indices.len() / 3;
    let has_normals = mesh.normal_indices.len() == mesh.indices.len();
    let has_texcoords = mesh.texcoord_indices.len() == mesh.indices.len();

    let corners = |indices: &[u32], tri: usize, base: u32| -> [u32; 3] {
        [
            base + indices[tri * 3],
            base + indices[tri * 3 + 1],
            base + indices[tri * 3 + 2],
        ]
    };

    data.triangles.extend((0..triangle_count).map(|tri| MeshTriangle {
        points: corners(&mesh.indices, tri, point_base),
        normals: has_normals.then(|| corners(&mesh.normal_indices, tri, normal_base)),
        texcoords: has_texcoords.then(|| corners(&mesh.texcoord_indices, tri, texcoord_base)),
        material: mesh.material_id,
    }));
}

/// Load an OBJ, logging any failure and returning an empty mesh instead.
pub fn load_obj_or_empty(path: impl AsRef<Path>, textures: &mut TextureCache) -> MeshData {
    let path = path.as_ref();
    match load_obj(path, textures) {
        Ok(mesh) => mesh,
        Err(err) => {
            log::error!("Failed to load mesh {}: {}", path.display(), err);
            MeshData::empty()
        }
    }
}
