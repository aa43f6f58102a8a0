use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use torus::SurfaceSize;

#[derive(Parser, Debug)]
#[command(
    name = "torusd",
    author,
    version,
    about = "Headless frame-paced wallpaper daemon",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration file; defaults to `torusd.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target frame rate (0 or negative = render only on request).
    #[arg(long, value_name = "FPS", allow_negative_numbers = true)]
    pub fps: Option<f32>,

    /// Rate of the simulated display refresh in Hz.
    #[arg(long, value_name = "HZ")]
    pub refresh_rate: Option<f32>,

    /// Stop after running for this long (e.g. `5s`, `250ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Request a frame at this interval from a background thread.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub request_every: Option<Duration>,

    /// Override the wallpaper surface size (e.g. `128x72`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Write loop statistics as JSON to this path when the loop stops.
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect configuration files and locations.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate a configuration file and print the resolved settings.
    Check {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Print the configuration directory and default config path.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    let duration = humantime::parse_duration(trimmed)
        .map_err(|err| format!("invalid duration '{trimmed}': {err}"))?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

pub fn parse_size(value: &str) -> Result<SurfaceSize, String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in surface size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in surface size".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok(SurfaceSize::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_size("128x72").unwrap(), SurfaceSize::new(128, 72));
        assert_eq!(parse_size(" 4 X 3 ").unwrap(), SurfaceSize::new(4, 3));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn accepts_negative_fps() {
        let cli = Cli::try_parse_from(["torusd", "--fps", "-1", "--duration", "1s"]).unwrap();
        assert_eq!(cli.run.fps, Some(-1.0));
        assert_eq!(cli.run.duration, Some(Duration::from_secs(1)));
    }
}
