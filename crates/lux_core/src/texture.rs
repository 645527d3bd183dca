//! Texture loading and caching for mesh materials.
//!
//! Only 8-bit RGB and RGBA images are accepted. Anything else is reported as
//! [`TextureError::UnsupportedFormat`] and callers shade the surface untextured.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ColorType;
use lux_math::Vec4;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported texture format: {0}")]
    UnsupportedFormat(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded texture.
///
/// Color channels are stored linear, alpha as authored.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data as [R, G, B, A] per pixel, row-major, top row first
    pub pixels: Vec<[f32; 4]>,

    /// Source path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>, path: impl Into<String>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Build a texture from 8-bit sRGB RGBA bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8], path: impl Into<String>) -> Self {
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();

        Self::new(width, height, pixels, path)
    }

    /// Sample the texture at UV coordinates with bilinear filtering.
    ///
    /// Addressing repeats in both directions, including across the filter
    /// footprint, so there is no seam where u or v wraps. Texel centres sit
    /// at `(i + 0.5) / width`. (0, 0) is the bottom-left corner.
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        if self.width == 0 || self.height == 0 {
            return Vec4::ONE;
        }

        // Flip V for image coordinates
        let x = u.rem_euclid(1.0) * self.width as f32 - 0.5;
        let y = (1.0 - v.rem_euclid(1.0)) * self.height as f32 - 0.5;

        let wrap = |i: f32, n: u32| (i as i64).rem_euclid(n as i64) as u32;
        let x0 = wrap(x.floor(), self.width);
        let y0 = wrap(y.floor(), self.height);
        let x1 = (x0 + 1) % self.width;
        let y1 = (y0 + 1) % self.height;

        let fx = x - x.floor();
        let fy = y - y.floor();

        let top = self.get_pixel(x0, y0).lerp(self.get_pixel(x1, y0), fx);
        let bottom = self.get_pixel(x0, y1).lerp(self.get_pixel(x1, y1), fx);

        top.lerp(bottom, fy)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Vec4 {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .map_or(Vec4::new(0.0, 0.0, 0.0, 1.0), |p| Vec4::from_array(*p))
    }

    /// Approximate size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Cache for loaded textures.
///
/// Several materials frequently share one image; each path is decoded once.
pub struct TextureCache {
    /// Cached textures by resolved file path
    textures: HashMap<PathBuf, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using the cache if available.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureResult<Arc<Texture>> {
        let full_path = self.resolve_path(path.as_ref());

        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(full_path, texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Load a texture, logging failures and treating the texture as absent.
    pub fn load_or_absent(&mut self, path: impl AsRef<Path>) -> Option<Arc<Texture>> {
        let path = path.as_ref();
        match self.load(path) {
            Ok(texture) => Some(texture),
            Err(TextureError::UnsupportedFormat(format)) => {
                log::warn!(
                    "Skipping texture {}: unsupported format {}",
                    path.display(),
                    format
                );
                None
            }
            Err(err) => {
                log::warn!("Skipping texture {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Total memory held by cached textures.
    pub fn total_size_bytes(&self) -> usize {
        self.textures.values().map(|t| t.size_bytes()).sum()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an 8-bit RGB or RGBA image file.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    if !path.exists() {
        return Err(TextureError::LoadError(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let img = image::open(path)?;

    match img.color() {
        ColorType::Rgb8 | ColorType::Rgba8 => {}
        other => return Err(TextureError::UnsupportedFormat(format!("{other:?}"))),
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Texture::from_rgba8(
        width,
        height,
        rgba.as_raw(),
        path.to_string_lossy(),
    ))
}

/// Convert an sRGB byte value to a linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_2x2() -> Texture {
        // Top row: black, white. Bottom row: white, black.
        Texture::new(
            2,
            2,
            vec![
                [0.0, 0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [0.0, 0.0, 0.0, 0.5],
            ],
            "<checker>",
        )
    }

    #[test]
    fn test_sample_texel_centers() {
        let tex = checker_2x2();

        // (0, 0) is bottom-left
        let bottom_left = tex.sample(0.25, 0.25);
        assert!((bottom_left.x - 1.0).abs() < 1e-5);

        let bottom_right = tex.sample(0.75, 0.25);
        assert!(bottom_right.x < 1e-5);
        assert!((bottom_right.w - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_sample_has_no_seam_at_wrap() {
        let tex = checker_2x2();
        for v in [0.1, 0.25, 0.6, 0.9] {
            let left_edge = tex.sample(0.0, v);
            let right_edge = tex.sample(0.999_999, v);
            assert!((left_edge - right_edge).length() < 1e-3, "seam at v = {v}");

            let bottom_edge = tex.sample(v, 0.0);
            let top_edge = tex.sample(v, 0.999_999);
            assert!((bottom_edge - top_edge).length() < 1e-3, "seam at u = {v}");
        }

        // Halfway between the last and first column
        let edge = tex.sample(0.0, 0.25);
        assert!((edge.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_sample_wraps() {
        let tex = checker_2x2();
        let inside = tex.sample(0.25, 0.25);
        let wrapped = tex.sample(1.25, -0.75);
        assert!((inside - wrapped).length() < 1e-5);
    }

    #[test]
    fn test_sample_bilinear_center() {
        let tex = checker_2x2();
        let center = tex.sample(0.5, 0.5);
        assert!((center.x - 0.5).abs() < 1e-5);
        assert!((center.w - 0.875).abs() < 1e-5);
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }

    #[test]
    fn test_cache_loads_png_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut cache = TextureCache::with_base_dir(dir.path());
        let first = cache.load("red.png").unwrap();
        let second = cache.load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((first.width, first.height), (4, 4));

        let sample = first.sample(0.3, 0.6);
        assert!((sample.x - 1.0).abs() < 1e-5);
        assert!(sample.y.abs() < 1e-5);
    }

    #[test]
    fn test_unsupported_format_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(2, 2, image::Luma([128]))
            .save(&path)
            .unwrap();

        let mut cache = TextureCache::new();
        assert!(matches!(
            cache.load(&path),
            Err(TextureError::UnsupportedFormat(_))
        ));
        assert!(cache.load_or_absent(&path).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_is_absent() {
        let mut cache = TextureCache::new();
        assert!(cache.load_or_absent("does/not/exist.png").is_none());
    }
}
