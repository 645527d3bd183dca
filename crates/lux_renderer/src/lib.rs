//! Lux Renderer - progressive CPU path tracing.
//!
//! A stochastic path tracer over analytic shapes and triangle meshes.
//! Samples are rendered in passes by a pool of worker threads fed from a
//! blocking task queue; each pixel keeps a running mean that is gamma
//! encoded into a packed framebuffer after every sample.
//!
//! # Example
//!
//! ```ignore
//! use lux_renderer::{Camera, RenderSession, RenderSettings, Scene, Shape, SurfaceMaterial};
//!
//! let mut scene = Scene::new();
//! scene.add_shape(Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0), SurfaceMaterial::default());
//!
//! let session = RenderSession::new(scene, Camera::new(), RenderSettings::default());
//! session.run(&mut |status: &RenderStatus| println!("{status}"))?;
//! session.save()?;
//! ```

mod accumulator;
mod camera;
mod framebuffer;
mod material;
mod random;
mod scene;
mod session;
mod settings;
mod shape;
mod shutdown;
mod spatial_tree;
mod task_queue;
mod worker;

pub use accumulator::{linear_to_gamma, pack_color, pack_gamma, AccumulationBuffer, PixelAccumulator};
pub use camera::{sample_offsets, Camera};
pub use framebuffer::{Framebuffer, OutputError};
pub use material::{SurfaceMaterial, ViewRayBounce, DEFAULT_CHECKER_SIZE};
pub use random::{gen_f32, random_hemisphere_direction, random_unit_vector};
pub use scene::{sky_color, RenderOptions, Scene, SceneEntry};
pub use session::{format_duration, RenderSession, RenderStats, RenderStatus, StatusSink};
pub use settings::{RenderSettings, SettingsError};
pub use shape::{MeshShape, Shape};
pub use shutdown::ShutdownSignal;
pub use spatial_tree::{SpatialTree, TriangleRef};
pub use task_queue::TaskQueue;
pub use worker::{RenderContext, RenderTask, WorkerPool};

/// Re-export the math types used throughout the public API
pub use lux_math::{Aabb, Color, HitResult, Mat4, Ray, Vec2, Vec3, Vec4};
