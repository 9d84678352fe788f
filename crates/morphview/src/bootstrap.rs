use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use morphconfig::{
    AntialiasSetting, ColorSpaceSetting, CurveSetting, GpuPowerSetting, MorphConfig,
};
use pointmorph::{EasingCurve, GalleryOptions};
use renderer::{Antialiasing, ColorSpaceMode, GpuPowerPreference, RendererConfig};
use tracing::{debug, info};

use crate::cli::Args;
use crate::paths::AppPaths;

/// Everything needed to load the gallery and open the window.
#[derive(Debug)]
pub struct LaunchPlan {
    pub images: Vec<PathBuf>,
    pub gallery: GalleryOptions,
    pub renderer_config: RendererConfig,
}

/// Loads `--config` when given, else the default file if it exists.
pub fn load_config(args: &Args, paths: &AppPaths) -> Result<MorphConfig> {
    if let Some(path) = args.config.as_ref() {
        let config = MorphConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        return Ok(config);
    }

    let default_path = paths.default_config_file();
    if default_path.is_file() {
        let config = MorphConfig::from_toml_file(&default_path)
            .with_context(|| format!("failed to load config {}", default_path.display()))?;
        info!(path = %default_path.display(), "loaded default configuration");
        Ok(config)
    } else {
        debug!(path = %default_path.display(), "no configuration file; using defaults");
        Ok(MorphConfig::default())
    }
}

/// Applies command-line overrides on top of `config`.
pub fn build_plan(args: &Args, config: &MorphConfig) -> Result<LaunchPlan> {
    let images = if args.images.is_empty() {
        config.images.clone()
    } else {
        args.images.clone()
    };
    if images.is_empty() {
        bail!("no images given; pass image paths or list them under `images` in the config");
    }

    let start_index = args.start.unwrap_or(0);
    if start_index >= images.len() {
        bail!(
            "start index {start_index} is out of range for {} image(s)",
            images.len()
        );
    }

    if let Some(fps) = args.fps {
        if !fps.is_finite() || fps < 0.0 {
            bail!("fps must be >= 0");
        }
    }

    let render = &config.render;
    let transition = &config.transition;
    let defaults = RendererConfig::default();
    let renderer_config = RendererConfig {
        surface_size: args
            .size
            .or(render.window_size)
            .unwrap_or(defaults.surface_size),
        target_fps: args.fps.or(render.fps),
        antialiasing: map_antialias(args.antialias.or(render.antialias)),
        color_space: map_color_space(args.color_space.unwrap_or(render.color_space)),
        gpu_power: map_gpu_power(args.gpu_power.unwrap_or(render.gpu_power)),
        background: args.background.unwrap_or(render.background),
        point_size: args.point_size.unwrap_or(render.point_size),
        stagger: transition.stagger,
        arc_height: transition.arc_height,
        fov_degrees: config.camera.fov,
        camera_distance: config.camera.distance,
        transition_duration: args.duration.unwrap_or(transition.duration),
        curve: args.curve.unwrap_or_else(|| map_curve(transition.curve)),
        start_index,
        show_thumbnails: render.thumbnails && !args.no_thumbnails,
    };

    Ok(LaunchPlan {
        images,
        gallery: GalleryOptions {
            grid_size: args.grid_size.or(render.grid_size),
        },
        renderer_config,
    })
}

pub fn map_curve(setting: CurveSetting) -> EasingCurve {
    match setting {
        CurveSetting::Linear => EasingCurve::Linear,
        CurveSetting::Smoothstep => EasingCurve::Smoothstep,
        CurveSetting::EaseInOut => EasingCurve::EaseInOut,
        CurveSetting::EaseOut => EasingCurve::EaseOut,
    }
}

pub fn map_antialias(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting {
        None | Some(AntialiasSetting::Auto) => Antialiasing::Auto,
        Some(AntialiasSetting::Off) => Antialiasing::Off,
        Some(AntialiasSetting::Samples2) => Antialiasing::Samples(2),
        Some(AntialiasSetting::Samples4) => Antialiasing::Samples(4),
        Some(AntialiasSetting::Samples8) => Antialiasing::Samples(8),
        Some(AntialiasSetting::Samples16) => Antialiasing::Samples(16),
    }
}

pub fn map_gpu_power(setting: GpuPowerSetting) -> GpuPowerPreference {
    match setting {
        GpuPowerSetting::Low => GpuPowerPreference::Low,
        GpuPowerSetting::High => GpuPowerPreference::High,
    }
}

pub fn map_color_space(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["morphview"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn config(toml: &str) -> MorphConfig {
        MorphConfig::from_toml_str(toml).unwrap()
    }

    #[test]
    fn cli_images_replace_configured_list() {
        let config = config("version = 1\nimages = [\"/cfg/a.png\", \"/cfg/b.png\"]");
        let plan = build_plan(&args(&["x.png", "y.png", "z.png"]), &config).unwrap();
        assert_eq!(
            plan.images,
            vec![
                PathBuf::from("x.png"),
                PathBuf::from("y.png"),
                PathBuf::from("z.png")
            ]
        );

        let plan = build_plan(&args(&[]), &config).unwrap();
        assert_eq!(plan.images.len(), 2);
    }

    #[test]
    fn missing_images_is_an_error() {
        let err = build_plan(&args(&[]), &MorphConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no images"));
    }

    #[test]
    fn start_index_must_be_in_range() {
        let err = build_plan(&args(&["a.png", "--start", "1"]), &MorphConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn defaults_flow_into_renderer_config() {
        let plan = build_plan(&args(&["a.png", "b.png"]), &MorphConfig::default()).unwrap();
        let cfg = &plan.renderer_config;
        assert_eq!(cfg.transition_duration, Duration::from_secs(4));
        assert_eq!(cfg.curve, EasingCurve::EaseOut);
        assert_eq!(cfg.antialiasing, Antialiasing::Auto);
        assert_eq!(cfg.color_space, ColorSpaceMode::Auto);
        assert_eq!(cfg.surface_size, (1280, 720));
        assert_eq!(cfg.target_fps, None);
        assert_eq!(cfg.stagger, 0.5);
        assert_eq!(cfg.fov_degrees, 70.0);
        assert!(cfg.show_thumbnails);
        assert_eq!(cfg.gpu_power, GpuPowerPreference::High);
        assert_eq!(plan.gallery.grid_size, None);
    }

    #[test]
    fn cli_flags_override_config_values() {
        let config = config(
            r#"
version = 1
images = ["/cfg/a.png", "/cfg/b.png"]
[transition]
duration = "2s"
curve = "smoothstep"
stagger = 0.1
[render]
antialias = 4
color_space = "gamma"
fps = 30
grid_size = 64
window_size = "640x480"
thumbnails = true
gpu_power = "low"
[camera]
fov = 45
"#,
        );
        let plan = build_plan(
            &args(&[
                "--duration",
                "750ms",
                "--curve",
                "linear",
                "--antialias",
                "off",
                "--size",
                "1024x768",
                "--grid-size",
                "32",
                "--no-thumbnails",
                "--start",
                "1",
            ]),
            &config,
        )
        .unwrap();
        let cfg = &plan.renderer_config;
        assert_eq!(cfg.transition_duration, Duration::from_millis(750));
        assert_eq!(cfg.curve, EasingCurve::Linear);
        assert_eq!(cfg.antialiasing, Antialiasing::Off);
        assert_eq!(cfg.surface_size, (1024, 768));
        assert!(!cfg.show_thumbnails);
        assert_eq!(cfg.start_index, 1);
        assert_eq!(plan.gallery.grid_size, Some(32));

        // Values without a flag come from the file.
        assert_eq!(cfg.color_space, ColorSpaceMode::Gamma);
        assert_eq!(cfg.target_fps, Some(30.0));
        assert_eq!(cfg.stagger, 0.1);
        assert_eq!(cfg.fov_degrees, 45.0);
        assert_eq!(cfg.gpu_power, GpuPowerPreference::Low);
    }

    #[test]
    fn gpu_power_flag_overrides_config() {
        let config = config("version = 1\n[render]\ngpu_power = \"low\"");
        let plan = build_plan(&args(&["a.png", "--gpu-power", "high"]), &config).unwrap();
        assert_eq!(plan.renderer_config.gpu_power, GpuPowerPreference::High);
    }

    #[test]
    fn config_curve_is_used_without_flag() {
        let config = config("version = 1\n[transition]\ncurve = \"ease-in-out\"");
        let plan = build_plan(&args(&["a.png"]), &config).unwrap();
        assert_eq!(plan.renderer_config.curve, EasingCurve::EaseInOut);
    }

    #[test]
    fn antialias_mapping_covers_sample_counts() {
        assert_eq!(map_antialias(None), Antialiasing::Auto);
        assert_eq!(
            map_antialias(Some(AntialiasSetting::Samples16)),
            Antialiasing::Samples(16)
        );
    }

    #[test]
    fn explicit_config_flag_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "version = 1\nimages = [\"one.png\"]\n").unwrap();

        let args = args(&["--config", path.to_str().unwrap()]);
        let paths = AppPaths::from_raw(dir.path().join("unused"));
        let config = load_config(&args, &paths).unwrap();
        assert_eq!(config.images, vec![dir.path().join("one.png")]);
    }

    #[test]
    fn default_config_file_is_discovered() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("morphview.toml"),
            "version = 1\n[transition]\nduration = 1\n",
        )
        .unwrap();

        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let config = load_config(&args(&[]), &paths).unwrap();
        assert_eq!(config.transition.duration, Duration::from_secs(1));
    }

    #[test]
    fn absent_default_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let config = load_config(&args(&[]), &paths).unwrap();
        assert!(config.images.is_empty());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let args = args(&["--config", path.to_str().unwrap()]);
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let err = load_config(&args, &paths).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }
}
