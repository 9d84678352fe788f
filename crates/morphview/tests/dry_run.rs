use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 40) as u8, (y * 40) as u8, 128, 255])
    })
    .save(&path)
    .unwrap();
    path
}

fn morphview(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_morphview"))
        .args(args)
        .env("MORPHVIEW_CONFIG_DIR", config_dir)
        .env_remove("MORPHVIEW_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn dry_run_maps_images_without_a_window() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4);
    let b = write_png(dir.path(), "b.png", 4, 4);

    let output = morphview(
        dir.path(),
        &["--dry-run", a.to_str().unwrap(), b.to_str().unwrap()],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("mapped image"));
    assert!(stdout.contains("dry run complete"));
}

#[test]
fn dry_run_reads_images_from_default_config() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "a.png", 3, 3);
    write_png(dir.path(), "b.png", 3, 3);
    std::fs::write(
        dir.path().join("morphview.toml"),
        "version = 1\nimages = [\"a.png\", \"b.png\"]\n",
    )
    .unwrap();

    let output = morphview(dir.path(), &["--dry-run"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("mapped image").count(), 2, "stdout: {stdout}");
}

#[test]
fn mismatched_dimensions_fail_with_the_offending_file() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4);
    let b = write_png(dir.path(), "odd.png", 5, 5);

    let output = morphview(
        dir.path(),
        &["--dry-run", a.to_str().unwrap(), b.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("odd.png"), "stderr: {stderr}");
}

#[test]
fn grid_size_resamples_mismatched_images() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4);
    let b = write_png(dir.path(), "b.png", 7, 3);

    let output = morphview(
        dir.path(),
        &[
            "--dry-run",
            "--grid-size",
            "5",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
}

#[test]
fn no_images_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = morphview(dir.path(), &["--dry-run"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no images"), "stderr: {stderr}");
}
