//! Packed display framebuffer.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

/// Errors that can occur while writing the final image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed-size image of packed `0xAARRGGBB` pixels.
///
/// Workers write disjoint pixel ranges while a presenter reads snapshots, so
/// each pixel is an atomic word.
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl Framebuffer {
    /// Create an opaque black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: (0..count).map(|_| AtomicU32::new(0xFF00_0000)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn set(&self, index: usize, packed: u32) {
        self.pixels[index].store(packed, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.pixels[index].load(Ordering::Relaxed)
    }

    /// Copy of every pixel, row-major from the top-left.
    pub fn snapshot(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|p| p.load(Ordering::Relaxed))
            .collect()
    }

    /// Snapshot as bytes. On little-endian targets this is BGRA order.
    pub fn as_bgra_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.snapshot()).to_vec()
    }

    /// Snapshot as RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for argb in self.snapshot() {
            bytes.extend_from_slice(&[
                (argb >> 16) as u8,
                (argb >> 8) as u8,
                argb as u8,
                (argb >> 24) as u8,
            ]);
        }
        bytes
    }

    /// Encode the current contents to an image file (format from extension).
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        image::save_buffer(
            path,
            &self.to_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )?;

        log::info!(
            "Saved {}x{} image to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }
}
