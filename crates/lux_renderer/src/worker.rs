//! Render worker threads.
//!
//! Each worker pulls [`RenderTask`]s from the shared [`TaskQueue`], renders
//! the pixel range, and reports the task done. Workers exit when the queue
//! is shut down.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use lux_math::Color;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::accumulator::{pack_gamma, AccumulationBuffer};
use crate::camera::{sample_offsets, Camera};
use crate::framebuffer::Framebuffer;
use crate::scene::{RenderOptions, Scene};
use crate::task_queue::TaskQueue;

/// A contiguous run of pixel indices to render, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTask {
    pub start: usize,
    pub end: usize,
    pub options: RenderOptions,
}

impl RenderTask {
    pub fn new(start: usize, end: usize, options: RenderOptions) -> Self {
        Self {
            start,
            end,
            options,
        }
    }

    /// One task per image row.
    pub fn rows(width: u32, height: u32, options: RenderOptions) -> Vec<RenderTask> {
        let width = width as usize;
        if width == 0 {
            return Vec::new();
        }
        (0..height as usize)
            .map(|y| RenderTask::new(y * width, y * width + width - 1, options))
            .collect()
    }

    pub fn pixel_count(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// State shared read-only (or through atomics) by all workers.
#[derive(Debug)]
pub struct RenderContext {
    pub scene: Scene,
    pub camera: Camera,
    pub accumulation: AccumulationBuffer,
    pub framebuffer: Framebuffer,
    pub max_bounces: u32,
    pub antialiasing: bool,
}

impl RenderContext {
    /// Buffers are sized from the camera's resolution.
    pub fn new(scene: Scene, camera: Camera, max_bounces: u32, antialiasing: bool) -> Self {
        let (width, height) = (camera.image_width, camera.image_height);
        Self {
            scene,
            camera,
            accumulation: AccumulationBuffer::new(width as usize * height as usize),
            framebuffer: Framebuffer::new(width, height),
            max_bounces,
            antialiasing,
        }
    }

    /// Radiance for one pixel: the mean over this pass's sub-pixel offsets.
    pub fn sample_pixel(&self, x: u32, y: u32, options: RenderOptions, rng: &mut dyn RngCore) -> Color {
        let offsets = sample_offsets(self.antialiasing, rng);
        let mut color = Color::ZERO;
        for offset in &offsets {
            let ray = self.camera.get_ray(x, y, *offset);
            color += self.scene.trace(&ray, self.max_bounces, options, rng);
        }
        color / offsets.len() as f32
    }

    /// Render every pixel of `task`, stopping early on termination.
    ///
    /// Preview tasks overwrite the displayed pixel. Full tasks add one
    /// sample to the accumulator and display the running mean.
    pub fn render_task(&self, task: &RenderTask, rng: &mut dyn RngCore) {
        let width = self.camera.image_width as usize;
        let last = task.end.min(self.framebuffer.len().saturating_sub(1));

        for index in task.start..=last {
            if self.scene.is_terminating() {
                return;
            }

            let x = (index % width) as u32;
            let y = (index / width) as u32;
            let color = self.sample_pixel(x, y, task.options, rng);

            if task.options.use_base_color {
                self.framebuffer.set(index, pack_gamma(color));
            } else {
                let accumulated = self.accumulation.add_sample(index, color);
                self.framebuffer.set(index, accumulated.gamma_pixel());
            }
        }
    }
}

/// Fixed set of render threads bound to one queue.
///
/// Dropping the pool shuts the queue down and joins every thread.
#[derive(Debug)]
pub struct WorkerPool {
    queue: Arc<TaskQueue<RenderTask>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `thread_count` workers (at least one).
    ///
    /// With a `seed`, worker `i` draws from a generator seeded with
    /// `seed + i`; otherwise each worker seeds from OS entropy.
    pub fn spawn(
        thread_count: usize,
        queue: Arc<TaskQueue<RenderTask>>,
        context: Arc<RenderContext>,
        seed: Option<u64>,
    ) -> io::Result<Self> {
        let mut pool = Self {
            queue: Arc::clone(&queue),
            handles: Vec::with_capacity(thread_count.max(1)),
        };

        for id in 0..thread_count.max(1) {
            let queue = Arc::clone(&queue);
            let context = Arc::clone(&context);
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
                None => StdRng::from_entropy(),
            };

            // On error, dropping `pool` stops the threads spawned so far.
            let handle = thread::Builder::new()
                .name(format!("lux-worker-{id}"))
                .spawn(move || worker_loop(id, &queue, &context, rng))?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Signal every worker to quit and wait for them.
    pub fn shutdown(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        self.queue.notify_quit();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("Render worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, queue: &TaskQueue<RenderTask>, context: &RenderContext, mut rng: StdRng) {
    log::debug!("Worker {id} started");

    while let Some(task) = queue.pop_blocking() {
        context.render_task(&task, &mut rng);
        queue.task_done();
    }

    log::debug!("Worker {id} stopped");
}
