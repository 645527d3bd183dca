use crate::{Color, Vec3, Vec4};

/// Record of a ray-primitive intersection.
///
/// Produced fresh by every intersection test and never retained past the
/// shading of the hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Point of intersection
    pub position: Vec3,
    /// Surface normal at the intersection (unit length)
    pub normal: Vec3,
    /// Distance from the ray origin to the intersection
    pub distance: f32,
    /// RGBA sampled from a texture at the hit, if the surface is textured
    pub texture_sample: Option<Vec4>,
}

impl HitResult {
    /// Create an untextured hit.
    pub fn new(position: Vec3, normal: Vec3, distance: f32) -> Self {
        Self {
            position,
            normal,
            distance,
            texture_sample: None,
        }
    }

    /// Tint sampled from a texture, if any.
    pub fn sampled_color(&self) -> Option<Color> {
        self.texture_sample.map(|s| s.truncate())
    }

    /// Coverage of the surface at this hit. Untextured hits are opaque.
    pub fn sampled_alpha(&self) -> f32 {
        self.texture_sample.map_or(1.0, |s| s.w)
    }
}

impl Default for HitResult {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, 0.0)
    }
}
