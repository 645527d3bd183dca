//! Lux Core - scene ingestion for the Lux path tracer.
//!
//! This crate provides:
//!
//! - **Mesh data**: `MeshData`, the indexed triangle soup meshes are built from
//! - **OBJ support**: OBJ/MTL loading through `tobj`
//! - **Textures**: PNG decoding and a shared `TextureCache`
//!
//! # Example
//!
//! ```ignore
//! use lux_core::{load_obj, TextureCache};
//!
//! let mut textures = TextureCache::new();
//! let mesh = load_obj("assets/TorusKnot.obj", &mut textures)?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod mesh;
pub mod obj;
pub mod texture;

// Re-export commonly used types
pub use mesh::{MeshData, MeshError, MeshMaterial, MeshResult, MeshTriangle};
pub use obj::{load_obj, load_obj_or_empty};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
