//! Pinhole camera for primary ray generation.

use lux_math::{Ray, Vec2, Vec3, DEFAULT_RAY_DISTANCE};
use rand::RngCore;

use crate::random::gen_f32;

/// Look-at pinhole camera.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,

    /// Distance budget of primary rays
    ray_distance: f32,

    // Cached computed values (set by initialize())
    pixel_origin: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Create a camera with default settings, looking down +Z.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 800,
            look_from: Vec3::ZERO,
            look_at: Vec3::Z,
            vup: Vec3::Y,
            vfov: 60.0,
            ray_distance: DEFAULT_RAY_DISTANCE,
            pixel_origin: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.initialize();
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.initialize();
        self
    }

    pub fn with_ray_distance(mut self, ray_distance: f32) -> Self {
        self.ray_distance = ray_distance;
        self
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }

    /// Recompute the cached viewport basis.
    fn initialize(&mut self) {
        // Viewport one unit in front of the eye
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;
        self.pixel_origin = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
    }

    /// Ray through pixel `(x, y)` at `offset` within the pixel, where
    /// (0, 0) is the pixel's top-left corner and (1, 1) its bottom-right.
    pub fn get_ray(&self, x: u32, y: u32, offset: Vec2) -> Ray {
        let pixel_sample = self.pixel_origin
            + (x as f32 + offset.x) * self.pixel_delta_u
            + (y as f32 + offset.y) * self.pixel_delta_v;

        Ray::new(
            self.look_from,
            pixel_sample - self.look_from,
            self.ray_distance,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sub-pixel offsets for one pass sample.
///
/// With antialiasing: one jittered point inside each cell of a 2x2 grid.
/// Without: the pixel center.
pub fn sample_offsets(antialiasing: bool, rng: &mut dyn RngCore) -> Vec<Vec2> {
    if !antialiasing {
        return vec![Vec2::splat(0.5)];
    }

    let mut offsets = Vec::with_capacity(4);
    for j in 0..2 {
        for i in 0..2 {
            offsets.push(Vec2::new(
                (i as f32 + gen_f32(rng)) * 0.5,
                (j as f32 + gen_f32(rng)) * 0.5,
            ));
        }
    }
    offsets
}
