//! Surface materials.
//!
//! A material turns an incoming view ray and its hit into the next ray to
//! trace, the weight applied to whatever that ray returns, and any light the
//! surface emits itself.

use lux_math::{reflect, Color, HitResult, Ray, Vec3};
use rand::RngCore;

use crate::random::{gen_f32, random_hemisphere_direction, random_unit_vector};

/// Default edge length of a checker cell, in world units.
pub const DEFAULT_CHECKER_SIZE: f32 = 5.0;

/// Result of bouncing a view ray off a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRayBounce {
    /// Next ray to trace
    pub ray: Ray,
    /// Weight for the radiance carried back along `ray`
    pub attenuation: Color,
    /// Light emitted by the surface itself
    pub emissive: Color,
}

/// Material attached to a shape in the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceMaterial {
    /// Lambertian diffuse
    Diffuse { albedo: Color },

    /// Diffuse with albedo halved on alternate cells of a 3D checkerboard
    DiffuseChecker {
        albedo: Color,
        /// Reciprocal of the cell size
        pattern_scale: f32,
    },

    /// Mirror, optionally fuzzy
    Reflective { albedo: Color, fuzziness: f32 },

    /// Light source; ends the path
    Emissive { color: Color },

    /// Stochastic mix: `b` with probability `factor`, else `a`
    Blend {
        a: Box<SurfaceMaterial>,
        b: Box<SurfaceMaterial>,
        factor: f32,
    },

    /// Sum of both materials' contributions
    Combine {
        a: Box<SurfaceMaterial>,
        b: Box<SurfaceMaterial>,
    },

    /// Pass-through; contributes nothing itself
    Null,
}

impl SurfaceMaterial {
    pub fn diffuse(albedo: Color) -> Self {
        Self::Diffuse { albedo }
    }

    /// Checkerboard with cells `pattern_size` world units wide.
    pub fn diffuse_checker(albedo: Color, pattern_size: f32) -> Self {
        Self::DiffuseChecker {
            albedo,
            pattern_scale: 1.0 / pattern_size,
        }
    }

    pub fn reflective(albedo: Color, fuzziness: f32) -> Self {
        Self::Reflective {
            albedo,
            fuzziness: fuzziness.max(0.0),
        }
    }

    pub fn emissive(color: Color) -> Self {
        Self::Emissive { color }
    }

    /// Blend `a` and `b`; the factor is clamped to [0, 1].
    pub fn blend(a: SurfaceMaterial, b: SurfaceMaterial, factor: f32) -> Self {
        Self::Blend {
            a: Box::new(a),
            b: Box::new(b),
            factor: factor.clamp(0.0, 1.0),
        }
    }

    pub fn combine(a: SurfaceMaterial, b: SurfaceMaterial) -> Self {
        Self::Combine {
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    /// Bounce `incoming` off the surface at `hit`.
    ///
    /// The outgoing ray leaves from the hit point with the distance the
    /// incoming ray had left.
    pub fn bounce_view_ray(
        &self,
        incoming: &Ray,
        hit: &HitResult,
        rng: &mut dyn RngCore,
    ) -> ViewRayBounce {
        let remaining = incoming.max_distance - hit.distance;

        match self {
            Self::Diffuse { albedo } => diffuse_bounce(*albedo, hit, remaining, rng),

            Self::DiffuseChecker {
                albedo,
                pattern_scale,
            } => {
                let factor = checker_factor(hit.position, *pattern_scale);
                diffuse_bounce(*albedo * factor, hit, remaining, rng)
            }

            Self::Reflective { albedo, fuzziness } => {
                let mut direction = reflect(incoming.direction, hit.normal);
                if *fuzziness > 0.0 {
                    direction += random_unit_vector(rng) * *fuzziness;
                    // Fuzz can cancel the reflection outright
                    direction = direction.try_normalize().unwrap_or(hit.normal);
                }

                ViewRayBounce {
                    ray: Ray::spawn(hit.position, direction, remaining),
                    attenuation: *albedo,
                    emissive: Color::ZERO,
                }
            }

            Self::Emissive { color } => ViewRayBounce {
                ray: Ray::spawn(hit.position, hit.normal, remaining),
                attenuation: Color::ZERO,
                emissive: *color,
            },

            Self::Blend { a, b, factor } => {
                if gen_f32(rng) > *factor {
                    a.bounce_view_ray(incoming, hit, rng)
                } else {
                    b.bounce_view_ray(incoming, hit, rng)
                }
            }

            Self::Combine { a, b } => {
                let first = a.bounce_view_ray(incoming, hit, rng);
                let second = b.bounce_view_ray(incoming, hit, rng);

                // Follow whichever side actually carries light forward.
                let ray = if first.attenuation == Color::ZERO {
                    second.ray
                } else {
                    first.ray
                };

                ViewRayBounce {
                    ray,
                    attenuation: first.attenuation + second.attenuation,
                    emissive: first.emissive + second.emissive,
                }
            }

            Self::Null => ViewRayBounce {
                ray: Ray::spawn(hit.position, incoming.direction, remaining),
                attenuation: Color::ONE,
                emissive: Color::ZERO,
            },
        }
    }

    /// Cheap non-recursive shade for the base-color preview pass.
    pub fn preview_color(&self, hit: &HitResult) -> Color {
        match self {
            Self::Diffuse { albedo } => *albedo * facing_up(hit.normal),
            Self::DiffuseChecker {
                albedo,
                pattern_scale,
            } => *albedo * facing_up(hit.normal) * checker_factor(hit.position, *pattern_scale),
            Self::Reflective { albedo, .. } => *albedo,
            Self::Emissive { color } => *color,
            Self::Blend { a, b, factor } => a.preview_color(hit).lerp(b.preview_color(hit), *factor),
            Self::Combine { a, b } => a.preview_color(hit) + b.preview_color(hit),
            Self::Null => Color::ZERO,
        }
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::diffuse(Color::splat(0.5))
    }
}

fn diffuse_bounce(
    albedo: Color,
    hit: &HitResult,
    remaining: f32,
    rng: &mut dyn RngCore,
) -> ViewRayBounce {
    let direction = random_hemisphere_direction(hit.normal, rng);
    let lambert = hit.normal.dot(direction).max(0.0);

    ViewRayBounce {
        ray: Ray::spawn(hit.position, direction, remaining),
        attenuation: albedo * lambert,
        emissive: Color::ZERO,
    }
}

/// Simple up-facing shade in [0, 1].
#[inline]
fn facing_up(normal: Vec3) -> f32 {
    normal.dot(Vec3::Y) * 0.5 + 0.5
}

/// 1.0 on bright cells, 0.5 on dark ones.
fn checker_factor(position: Vec3, pattern_scale: f32) -> f32 {
    let scaled = position * pattern_scale;
    let upper_half = |v: f32| v - v.floor() > 0.5;

    let bright = upper_half(scaled.x) ^ upper_half(scaled.y) ^ upper_half(scaled.z);
    if bright {
        1.0
    } else {
        0.5
    }
}
