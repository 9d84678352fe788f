use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use morphconfig::{AntialiasSetting, ColorSpaceSetting, GpuPowerSetting};
use pointmorph::EasingCurve;

#[derive(Parser, Debug)]
#[command(
    name = "morphview",
    author,
    version,
    about = "Morph between images as a cloud of points"
)]
pub struct Args {
    /// Images to morph between; replaces the list from the config file.
    #[arg(value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    /// Configuration file; defaults to `morphview.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "MORPHVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transition length, in seconds or humantime form (e.g. `4s`, `1500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Easing curve: `linear`, `smoothstep`, `ease-in-out` or `ease-out`.
    #[arg(long, value_name = "CURVE", value_parser = parse_curve)]
    pub curve: Option<EasingCurve>,

    /// Point size in pixels at unit distance from the camera.
    #[arg(long, value_name = "SIZE", value_parser = parse_point_size)]
    pub point_size: Option<f32>,

    /// Background colour as `#rrggbb`.
    #[arg(long, value_name = "COLOR", value_parser = parse_background)]
    pub background: Option<[f32; 3]>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap while animating (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceSetting>,

    /// GPU adapter preference: `low` (integrated) or `high` (discrete).
    #[arg(long, value_name = "PREFERENCE", value_parser = parse_gpu_power)]
    pub gpu_power: Option<GpuPowerSetting>,

    /// Resample every image to an N x N grid before mapping.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub grid_size: Option<u32>,

    /// Hide the thumbnail strip.
    #[arg(long)]
    pub no_thumbnails: bool,

    /// Zero-based index of the image shown first.
    #[arg(long, value_name = "INDEX")]
    pub start: Option<usize>,

    /// Load and map the images, log their statistics, then exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Raise log verbosity (`-v` debug, `-vv` trace); `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse() -> Args {
    Args::parse()
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    morphconfig::parse_duration(value)
}

pub fn parse_curve(value: &str) -> Result<EasingCurve, String> {
    value.parse()
}

pub fn parse_point_size(value: &str) -> Result<f32, String> {
    let size: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid point size '{value}'"))?;
    if !size.is_finite() || size <= 0.0 {
        return Err("point size must be greater than zero".to_string());
    }
    Ok(size)
}

pub fn parse_background(value: &str) -> Result<[f32; 3], String> {
    morphconfig::parse_hex_color(value)
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    morphconfig::parse_window_size(value)
}

pub fn parse_antialias(value: &str) -> Result<AntialiasSetting, String> {
    if value.trim().is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }
    morphconfig::parse_antialias(value)
}

pub fn parse_gpu_power(value: &str) -> Result<GpuPowerSetting, String> {
    morphconfig::parse_gpu_power(value)
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceSetting, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceSetting::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceSetting::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceSetting::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}
