use anyhow::{Context, Result};
use pointmorph::{load_gallery, saturation, Gallery, ImageRecord};
use renderer::Renderer;
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{build_plan, load_config};
use crate::cli::Args;
use crate::paths::AppPaths;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing(args.verbose);

    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved morphview paths");

    let config = load_config(&args, &paths)?;
    let plan = build_plan(&args, &config)?;
    tracing::info!(
        images = plan.images.len(),
        grid_size = ?plan.gallery.grid_size,
        "loading gallery"
    );

    let gallery = load_gallery(&plan.images, plan.gallery).context("failed to load images")?;

    if args.dry_run {
        report_gallery(&gallery);
        tracing::info!("dry run complete; not opening a window");
        return Ok(());
    }

    Renderer::new(plan.renderer_config).run(gallery)
}

fn initialise_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{level},wgpu_core=warn,wgpu_hal=warn,naga=warn")
}

fn report_gallery(gallery: &Gallery) {
    for (index, record) in gallery.records().iter().enumerate() {
        let (min, max) = saturation_range(record);
        tracing::info!(
            index,
            path = %record.file().display(),
            width = record.width(),
            height = record.height(),
            points = record.coordinates().len(),
            saturation_min = min,
            saturation_max = max,
            "mapped image"
        );
    }
}

/// Least and most saturated pixel, read from the ends of the sorted buffer.
fn saturation_range(record: &ImageRecord) -> (f32, f32) {
    let coordinates = record.coordinates();
    let at = |slot: usize| {
        coordinates
            .slot(slot)
            .map(|(x, y)| {
                let pixel = record.pixels().get_pixel(x as u32, y as u32);
                saturation([pixel[0], pixel[1], pixel[2]])
            })
            .unwrap_or(0.0)
    };
    (at(0), at(coordinates.len().saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn verbosity_raises_default_level() {
        assert!(default_filter(0).starts_with("info,"));
        assert!(default_filter(1).starts_with("debug,"));
        assert!(default_filter(5).starts_with("trace,"));
        assert!(default_filter(0).contains("wgpu_core=warn"));
    }

    #[test]
    fn saturation_range_spans_grey_to_primary() {
        let pixels = RgbaImage::from_fn(2, 2, |x, y| match (x, y) {
            (1, 1) => Rgba([255, 0, 0, 255]),
            _ => Rgba([90, 90, 90, 255]),
        });
        let record = ImageRecord::from_rgba("mixed.png", pixels);
        let (min, max) = saturation_range(&record);
        assert_eq!(min, 0.0);
        assert!((max - 1.0).abs() < 1e-6);
    }
}
