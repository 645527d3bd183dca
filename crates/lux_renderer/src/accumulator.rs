//! Per-pixel sample accumulation and tone mapping.
//!
//! Each pixel keeps a running radiance sum and sample count. Display colors
//! are derived on demand from the mean.

use std::sync::atomic::{AtomicU32, Ordering};

use lux_math::Color;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Pack a color as `0xAARRGGBB` with opaque alpha, clamping each channel to [0, 1].
pub fn pack_color(color: Color) -> u32 {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
    0xFF00_0000 | to_byte(color.x) << 16 | to_byte(color.y) << 8 | to_byte(color.z)
}

/// Gamma-encode a linear color and pack it for display.
pub fn pack_gamma(color: Color) -> u32 {
    pack_color(Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    ))
}

/// Running sum of radiance samples for one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelAccumulator {
    sum: Color,
    count: u32,
}

impl PixelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, color: Color) {
        self.sum += color;
        self.count += 1;
    }

    pub fn sample_count(&self) -> u32 {
        self.count
    }

    /// Mean of all samples so far; black before the first sample.
    pub fn mean(&self) -> Color {
        if self.count == 0 {
            Color::ZERO
        } else {
            self.sum / self.count as f32
        }
    }

    /// Linear mean, packed.
    pub fn pixel(&self) -> u32 {
        pack_color(self.mean())
    }

    /// Gamma-encoded mean, packed for display.
    pub fn gamma_pixel(&self) -> u32 {
        pack_gamma(self.mean())
    }
}

/// One pixel's accumulator stored as atomics so it can sit in shared memory.
#[derive(Debug, Default)]
struct AtomicAccumulator {
    sum: [AtomicU32; 3],
    count: AtomicU32,
}

impl AtomicAccumulator {
    fn load(&self) -> PixelAccumulator {
        PixelAccumulator {
            sum: Color::new(
                f32::from_bits(self.sum[0].load(Ordering::Relaxed)),
                f32::from_bits(self.sum[1].load(Ordering::Relaxed)),
                f32::from_bits(self.sum[2].load(Ordering::Relaxed)),
            ),
            count: self.count.load(Ordering::Relaxed),
        }
    }

    fn store(&self, value: &PixelAccumulator) {
        for (slot, v) in self.sum.iter().zip(value.sum.to_array()) {
            slot.store(v.to_bits(), Ordering::Relaxed);
        }
        self.count.store(value.count, Ordering::Relaxed);
    }
}

/// Accumulators for a whole image, shared between workers.
///
/// Writers must own disjoint pixel ranges within a pass, and passes must be
/// separated by a barrier; the task queue provides both. Relaxed atomics
/// keep concurrent display reads free of data races; a read racing a write
/// may see a sample half-applied.
#[derive(Debug)]
pub struct AccumulationBuffer {
    pixels: Vec<AtomicAccumulator>,
}

impl AccumulationBuffer {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixels: (0..pixel_count).map(|_| AtomicAccumulator::default()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Add a sample to `index` and return the updated accumulator.
    pub fn add_sample(&self, index: usize, color: Color) -> PixelAccumulator {
        let slot = &self.pixels[index];
        let mut value = slot.load();
        value.add_sample(color);
        slot.store(&value);
        value
    }

    pub fn get(&self, index: usize) -> PixelAccumulator {
        self.pixels[index].load()
    }
}
