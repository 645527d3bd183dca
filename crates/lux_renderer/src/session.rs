//! Progressive render driver.
//!
//! A session owns the shared render state, spawns the worker pool, and
//! feeds it one pass at a time: an optional preview pass, then one pass per
//! sample. Each pass pushes one task per image row and waits on the queue's
//! barrier before the next begins, so a pixel never receives two samples
//! concurrently.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::accumulator::AccumulationBuffer;
use crate::camera::Camera;
use crate::framebuffer::{Framebuffer, OutputError};
use crate::scene::{RenderOptions, Scene};
use crate::settings::RenderSettings;
use crate::task_queue::TaskQueue;
use crate::worker::{RenderContext, RenderTask, WorkerPool};

/// Progress after one completed sample pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// 1-based index of the pass that just finished
    pub sample: u32,
    pub total_samples: u32,
    pub elapsed: Duration,
    /// Linear estimate from the mean pass time so far
    pub remaining: Duration,
    pub frame_time: Duration,
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S: [{}/{}] | T: [{} / {}] | F: [{}ms]",
            self.sample,
            self.total_samples,
            format_duration(self.elapsed),
            format_duration(self.remaining),
            self.frame_time.as_millis()
        )
    }
}

/// Receiver for per-pass progress, e.g. a window title.
pub trait StatusSink {
    fn update(&mut self, status: &RenderStatus);
}

impl<F: FnMut(&RenderStatus)> StatusSink for F {
    fn update(&mut self, status: &RenderStatus) {
        self(status)
    }
}

/// Summary of a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub completed_samples: u32,
    pub total_samples: u32,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Format a duration as `"{ms}ms"` below one second, else `"{h}h:{m}m:{s}s"`,
/// dropping leading zero units.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        return format!("{ms}ms");
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = total_secs / 60 % 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h:{minutes}m:{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m:{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// One progressive render of a fixed scene.
///
/// The session renders once: finishing or cancelling triggers the scene's
/// termination flag, after which [`run`](Self::run) returns immediately.
/// Share it behind an `Arc` to cancel or read the framebuffer from another
/// thread while it runs.
#[derive(Debug)]
pub struct RenderSession {
    settings: RenderSettings,
    context: Arc<RenderContext>,
    queue: Arc<TaskQueue<RenderTask>>,
}

impl RenderSession {
    /// The camera's resolution and ray distance are taken from `settings`.
    pub fn new(scene: Scene, camera: Camera, settings: RenderSettings) -> Self {
        let camera = camera
            .with_resolution(settings.width, settings.height)
            .with_ray_distance(settings.ray_distance);
        let queue = Arc::new(TaskQueue::new(scene.shutdown_signal()));
        let context = Arc::new(RenderContext::new(
            scene,
            camera,
            settings.max_bounces,
            settings.antialiasing,
        ));

        Self {
            settings,
            context,
            queue,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.context.scene
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.context.framebuffer
    }

    pub fn accumulation(&self) -> &AccumulationBuffer {
        &self.context.accumulation
    }

    /// Stop rendering as soon as possible.
    ///
    /// In-flight traces return black, idle workers wake and exit, and
    /// [`run`](Self::run) returns after the current pass.
    pub fn request_shutdown(&self) {
        if !self.queue.is_shutting_down() {
            log::info!("Render shutdown requested");
        }
        self.queue.notify_quit();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.queue.is_shutting_down()
    }

    /// Render every pass, reporting progress to `status` after each sample.
    ///
    /// Fails only if worker threads cannot be spawned.
    pub fn run<S: StatusSink + ?Sized>(&self, status: &mut S) -> io::Result<RenderStats> {
        let start = Instant::now();
        let total = self.settings.total_samples;
        let threads = self.settings.resolved_thread_count();

        log::info!(
            "Starting rendering tasks on {} threads ({}x{}, {} samples)",
            threads,
            self.framebuffer().width(),
            self.framebuffer().height(),
            total
        );
        let mut pool = WorkerPool::spawn(
            threads,
            Arc::clone(&self.queue),
            Arc::clone(&self.context),
            self.settings.seed,
        )?;

        if self.settings.preview_pass {
            let pass_start = Instant::now();
            if self.run_pass(RenderOptions::PREVIEW) {
                log::info!("Preview pass done in {}", format_duration(pass_start.elapsed()));
            }
        }

        let mut completed = 0;
        for sample in 1..=total {
            let pass_start = Instant::now();
            if !self.run_pass(RenderOptions::FULL) {
                break;
            }
            completed = sample;

            let elapsed = start.elapsed();
            let report = RenderStatus {
                sample,
                total_samples: total,
                elapsed,
                remaining: elapsed / sample * (total - sample),
                frame_time: pass_start.elapsed(),
            };
            log::info!("{report}");
            status.update(&report);
        }

        pool.shutdown();

        let stats = RenderStats {
            completed_samples: completed,
            total_samples: total,
            elapsed: start.elapsed(),
            cancelled: completed < total,
        };
        if stats.cancelled {
            log::warn!(
                "Render cancelled after {}/{} samples ({})",
                completed,
                total,
                format_duration(stats.elapsed)
            );
        } else {
            log::info!("Render finished in {}", format_duration(stats.elapsed));
        }
        Ok(stats)
    }

    /// Queue one task per row and wait for the pass barrier.
    fn run_pass(&self, options: RenderOptions) -> bool {
        if self.queue.is_shutting_down() {
            return false;
        }
        let framebuffer = self.framebuffer();
        self.queue
            .push_batch(RenderTask::rows(framebuffer.width(), framebuffer.height(), options));
        self.queue.wait_for_all_done()
    }

    /// Write the framebuffer to the configured output path, if any.
    pub fn save(&self) -> Result<Option<PathBuf>, OutputError> {
        let Some(path) = self.settings.output_path.clone() else {
            return Ok(None);
        };
        self.framebuffer().save_png(&path)?;
        Ok(Some(path))
    }
}
