use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crossbeam_channel::{bounded, unbounded};
use serde::Serialize;
use torus::{drive, LoopOptions, LoopStats, RenderLoop, SurfaceSize, Vsync};
use torus_config::TorusConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::control::{spawn_request_timer, spawn_stdin_reader};
use crate::paths::AppPaths;
use crate::pulse::PulseEngine;

/// Written to `--summary` when the loop stops.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub fps: f32,
    pub on_demand: bool,
    pub refresh_rate: f32,
    #[serde(flatten)]
    pub stats: LoopStats,
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config named on the command line, or the default one if it exists.
pub fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<(TorusConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = paths.config_file();
            if !default.exists() {
                tracing::debug!(path = %default.display(), "no config file; using built-in defaults");
                return Ok((TorusConfig::default(), None));
            }
            default
        }
    };
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config = TorusConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config file at {}", path.display()))?;
    Ok((config, Some(path)))
}

fn apply_overrides(config: &mut TorusConfig, args: &RunArgs) -> Result<()> {
    if let Some(fps) = args.fps {
        config.render.fps = fps;
    }
    if let Some(rate) = args.refresh_rate {
        config.render.refresh_rate = rate;
    }
    if let Some(interval) = args.request_every {
        config.demand.request_interval = Some(interval);
    }
    if let Some(size) = args.size {
        config.wallpaper.width = size.width;
        config.wallpaper.height = size.height;
    }
    config
        .validate()
        .context("command-line overrides produced an invalid configuration")?;
    Ok(())
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (mut config, source) = load_config(args.config.as_deref(), &paths)?;
    apply_overrides(&mut config, &args)?;
    if config.demand.request_interval.is_some() && !config.on_demand() {
        tracing::info!("request interval set while pacing continuously; requests are redundant");
    }

    tracing::info!(
        config = ?source.as_ref().map(|p| p.display().to_string()),
        fps = config.render.fps,
        on_demand = config.on_demand(),
        refresh_rate = config.render.refresh_rate,
        "starting torusd render loop"
    );

    let stats = run_loop(&config, &args)?;

    if let Some(path) = args.summary.as_ref() {
        write_summary(path, &config, stats)?;
    }
    Ok(())
}

fn run_loop(config: &TorusConfig, args: &RunArgs) -> Result<LoopStats> {
    let wallpaper = &config.wallpaper;
    let engine = PulseEngine::new(wallpaper.curve, wallpaper.period, wallpaper.fade_in);
    let mut render_loop = RenderLoop::new(
        engine,
        LoopOptions {
            fps: config.render.fps,
            elapsed_time_limit: config.render.elapsed_time_limit,
        },
    );
    render_loop.create(SurfaceSize::new(wallpaper.width, wallpaper.height));

    let (mut vsync, frames) =
        Vsync::spawn(config.render.refresh_rate).context("failed to start vsync source")?;
    let (command_tx, command_rx) = unbounded();
    spawn_stdin_reader(command_tx, render_loop.requester())
        .context("failed to spawn stdin control thread")?;

    let (stop_tx, stop_rx) = bounded::<()>(0);
    let timer = match config.demand.request_interval {
        Some(interval) => Some(
            spawn_request_timer(interval, render_loop.requester(), stop_rx)
                .context("failed to spawn request timer")?,
        ),
        None => None,
    };

    render_loop.resume(0);
    let result = drive(&mut render_loop, &frames, &command_rx, args.duration);
    render_loop.destroy();

    drop(stop_tx);
    if let Some(timer) = timer {
        if timer.join().is_err() {
            tracing::warn!("request timer thread panicked");
        }
    }
    vsync.stop();

    let stats = result.context("render loop stopped unexpectedly")?;
    if stats.frames > 0 && stats.rendered == 0 {
        tracing::warn!(frames = stats.frames, "no frames were rendered");
    }
    Ok(stats)
}

fn write_summary(path: &Path, config: &TorusConfig, stats: LoopStats) -> Result<()> {
    let summary = RunSummary {
        fps: config.render.fps,
        on_demand: config.on_demand(),
        refresh_rate: config.render.refresh_rate,
        stats,
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to prepare directory {}", dir.display()))?;
    }
    let serialized =
        serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write run summary to {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote run summary");
    Ok(())
}

pub fn check_config(path: Option<&Path>, paths: &AppPaths) -> Result<()> {
    let (config, source) = load_config(path, paths)?;
    let Some(source) = source else {
        bail!(
            "no config file given and none found at {}",
            paths.config_file().display()
        );
    };
    println!("Config OK: {}", source.display());
    println!(
        "  fps:                {} ({})",
        config.render.fps,
        if config.on_demand() { "on-demand" } else { "continuous" }
    );
    println!("  refresh rate:       {} Hz", config.render.refresh_rate);
    println!("  elapsed time limit: {} s", config.render.elapsed_time_limit);
    match config.demand.request_interval {
        Some(interval) => println!(
            "  request interval:   {}",
            humantime::format_duration(interval)
        ),
        None => println!("  request interval:   (none)"),
    }
    println!(
        "  wallpaper:          {}x{} curve={} period={} fade_in={}",
        config.wallpaper.width,
        config.wallpaper.height,
        config.wallpaper.curve,
        humantime::format_duration(config.wallpaper.period),
        humantime::format_duration(config.wallpaper.fade_in)
    );
    Ok(())
}

pub fn print_paths(paths: &AppPaths) {
    println!("Configuration directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  file:       {}", paths.config_file().display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            fps: None,
            refresh_rate: None,
            duration: None,
            request_every: None,
            size: None,
            summary: None,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = TorusConfig::default();
        let args = RunArgs {
            fps: Some(0.0),
            request_every: Some(Duration::from_millis(100)),
            size: Some(SurfaceSize::new(8, 2)),
            ..args()
        };
        apply_overrides(&mut config, &args).unwrap();
        assert!(config.on_demand());
        assert_eq!(
            config.demand.request_interval,
            Some(Duration::from_millis(100))
        );
        assert_eq!((config.wallpaper.width, config.wallpaper.height), (8, 2));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = TorusConfig::default();
        let args = RunArgs {
            refresh_rate: Some(0.0),
            ..args()
        };
        assert!(apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_config_dir(root.path().to_path_buf());
        let missing = root.path().join("missing.toml");
        assert!(load_config(Some(missing.as_path()), &paths).is_err());

        let (config, source) = load_config(None, &paths).unwrap();
        assert_eq!(config, TorusConfig::default());
        assert!(source.is_none());
    }
}
