use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use lux_core::TextureCache;
use lux_renderer::{RenderSession, RenderSettings, RenderStatus};

mod demo_scene;

/// Settings file picked up from the working directory
const SETTINGS_FILE: &str = "lux.json";

/// How often the main thread checks on the render
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn load_settings() -> Result<RenderSettings> {
    let path = Path::new(SETTINGS_FILE);
    if !path.exists() {
        log::info!("No {} found, using default settings", SETTINGS_FILE);
        return Ok(RenderSettings::default());
    }

    let settings = RenderSettings::from_json_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Lux");

    let settings = load_settings()?;
    let time_limit = settings.time_limit_secs.map(Duration::from_secs);

    let mut textures = TextureCache::new();
    let (scene, camera) = demo_scene::build(&mut textures);
    log::info!(
        "Scene ready: {} shapes, {} textures ({:.1} MB)",
        scene.len(),
        textures.len(),
        textures.total_size_bytes() as f64 / (1024.0 * 1024.0)
    );

    let session = Arc::new(RenderSession::new(scene, camera, settings));

    let runner = {
        let session = Arc::clone(&session);
        thread::Builder::new()
            .name("lux-render".to_string())
            .spawn(move || {
                let mut last_status = None;
                let stats = session.run(&mut |status: &RenderStatus| last_status = Some(*status));
                stats.map(|stats| (stats, last_status))
            })?
    };

    // Enforce the time limit from here so a long pass is cut short too
    let start = Instant::now();
    while !runner.is_finished() {
        if time_limit.is_some_and(|limit| start.elapsed() >= limit) && !session.is_shutting_down() {
            log::warn!("Time limit reached, stopping render");
            session.request_shutdown();
        }
        thread::sleep(POLL_INTERVAL);
    }

    let (stats, last_status) = runner
        .join()
        .map_err(|_| anyhow!("Render thread panicked"))??;
    if let Some(status) = last_status {
        log::info!("Last pass: {}", status);
    }
    log::info!(
        "Rendered {}/{} samples",
        stats.completed_samples,
        stats.total_samples
    );

    match session.save().context("Failed to save render")? {
        Some(path) => log::info!("Output written to {}", path.display()),
        None => log::info!("No output path configured, image not saved"),
    }

    Ok(())
}
