//! Scene storage and the recursive path-tracing integrator.

use lux_math::{Color, HitResult, Ray, Vec3};
use rand::RngCore;

use crate::material::SurfaceMaterial;
use crate::random::gen_f32;
use crate::shape::Shape;
use crate::shutdown::ShutdownSignal;

/// Per-trace switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Return the material's preview color at the first hit instead of
    /// tracing bounces.
    pub use_base_color: bool,
}

impl RenderOptions {
    pub const PREVIEW: RenderOptions = RenderOptions {
        use_base_color: true,
    };
    pub const FULL: RenderOptions = RenderOptions {
        use_base_color: false,
    };
}

/// A shape paired with the material it is shaded with.
#[derive(Debug)]
pub struct SceneEntry {
    pub shape: Shape,
    pub material: SurfaceMaterial,
}

/// Everything that can be hit, plus the shared termination flag.
///
/// The entry list is fixed once rendering starts, so workers share the scene
/// by reference without locking.
#[derive(Debug, Default)]
pub struct Scene {
    entries: Vec<SceneEntry>,
    shutdown: ShutdownSignal,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape; returns its index.
    pub fn add_shape(&mut self, shape: Shape, material: SurfaceMaterial) -> usize {
        self.entries.push(SceneEntry { shape, material });
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handle to the termination flag read by every trace.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Stop every trace and any session rendering this scene. Workers abandon
    /// queued rows and the pass barrier returns early.
    pub fn notify_terminating(&self) {
        self.shutdown.trigger();
    }

    #[inline]
    pub fn is_terminating(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Nearest hit across all shapes, in insertion order.
    ///
    /// Each hit shrinks `ray.max_distance`, so farther shapes later in the
    /// list are rejected by their own tests.
    pub fn find_nearest_intersection(&self, ray: &mut Ray) -> Option<(HitResult, usize)> {
        let mut nearest = None;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.shape.has_culling_bounds() && !ray.intersects_aabb(&entry.shape.bounds()) {
                continue;
            }

            if let Some(hit) = entry.shape.test_ray_intersection(ray) {
                ray.max_distance = hit.distance;
                nearest = Some((hit, index));
            }
        }

        nearest
    }

    /// Radiance arriving along `ray`, following at most `max_bounces` hits.
    pub fn trace(
        &self,
        ray: &Ray,
        max_bounces: u32,
        options: RenderOptions,
        rng: &mut dyn RngCore,
    ) -> Color {
        if self.is_terminating() || max_bounces == 0 {
            return Color::ZERO;
        }

        let mut nearest_ray = *ray;
        let Some((hit, index)) = self.find_nearest_intersection(&mut nearest_ray) else {
            return sky_color(ray.direction);
        };

        let material = &self.entries[index].material;
        let tint = hit.sampled_color().unwrap_or(Color::ONE);

        if options.use_base_color {
            return material.preview_color(&hit) * tint;
        }

        let alpha = hit.sampled_alpha();
        if alpha < 1.0 && gen_f32(rng) > alpha {
            // Transparent at this sample: continue straight through.
            let through = Ray::spawn(
                hit.position,
                ray.direction,
                ray.max_distance - hit.distance,
            );
            return self.trace(&through, max_bounces - 1, options, rng);
        }

        let bounce = material.bounce_view_ray(ray, &hit, rng);
        if bounce.attenuation == Color::ZERO {
            return bounce.emissive;
        }

        let incoming = self.trace(&bounce.ray, max_bounces - 1, options, rng);
        bounce.emissive + incoming * bounce.attenuation * tint
    }
}

/// Background radiance for a ray that hits nothing.
///
/// Vertical gradient from white looking straight down to sky blue straight up.
pub fn sky_color(direction: Vec3) -> Color {
    let a = 0.5 * (direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}
