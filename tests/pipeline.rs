//! End-to-end pipeline runs against real files.
//!
//! Uses the pure-Rust backend on a temp directory. The upscaler is faked: it
//! writes a 4x nearest-neighbour enlargement where waifu2x would put its
//! output, so no GPU or external binary is needed.

use backdrop::config::PipelineConfig;
use backdrop::imaging::RustBackend;
use backdrop::imaging::calculations::within_aspect_band;
use backdrop::pipeline::{PipelineError, Step, run_pipeline};
use backdrop::upscale::{UpscaleError, UpscaleOutcome, Upscaler, scaled_path};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct NearestUpscaler;

impl Upscaler for NearestUpscaler {
    fn upscale(&self, input: &Path, scale: u32) -> Result<UpscaleOutcome, UpscaleError> {
        let output_path = scaled_path(input);
        let img = image::open(input).unwrap();
        img.resize_exact(
            img.width() * scale,
            img.height() * scale,
            FilterType::Nearest,
        )
        .save(&output_path)
        .unwrap();
        Ok(UpscaleOutcome {
            exit_code: Some(0),
            output_path,
        })
    }
}

struct BrokenUpscaler;

impl Upscaler for BrokenUpscaler {
    fn upscale(&self, input: &Path, _scale: u32) -> Result<UpscaleOutcome, UpscaleError> {
        Err(UpscaleError::Failed {
            exit_code: Some(1),
            output: scaled_path(input),
        })
    }
}

fn write_source(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    })
    .save(&path)
    .unwrap();
    path
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn small_scale_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    // Keep the fake upscale small; the computed level for tiny sources is 32
    config.upscaler.scale = Some(2);
    config
}

#[test]
fn full_pipeline_writes_expected_files() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "dusk.png", 200, 150);

    let report = run_pipeline(
        &RustBackend::new(),
        Some(&NearestUpscaler),
        &source,
        &small_scale_config(),
    )
    .unwrap();

    assert_eq!(report.scale.level, Some(2));
    assert_eq!(
        file_names(tmp.path()),
        vec![
            "dusk.png",
            "dusk_edgy_blurred.png",
            "dusk_scaled.png",
            "dusk_scaled_cropped.png",
            "dusk_scaled_mixed.png",
        ]
    );
    assert_eq!(
        report.final_output(),
        Some(tmp.path().join("dusk_edgy_blurred.png").as_path())
    );
}

#[test]
fn output_sizes_on_disk() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "dusk.png", 200, 150);

    run_pipeline(
        &RustBackend::new(),
        Some(&NearestUpscaler),
        &source,
        &small_scale_config(),
    )
    .unwrap();

    let dir = tmp.path();
    assert_eq!(
        image::image_dimensions(dir.join("dusk_scaled.png")).unwrap(),
        (400, 300)
    );

    let cropped = image::image_dimensions(dir.join("dusk_scaled_cropped.png")).unwrap();
    assert_eq!(cropped.0, 400);
    assert!(within_aspect_band(cropped));

    let mixed = image::image_dimensions(dir.join("dusk_scaled_mixed.png")).unwrap();
    assert_eq!(mixed, cropped);

    let feathered = image::image_dimensions(dir.join("dusk_edgy_blurred.png")).unwrap();
    assert_eq!(feathered, (cropped.0 + 40, cropped.1 + 40));
}

#[test]
fn jpeg_source_keeps_extension_except_mix() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "shore.jpg", 160, 120);

    run_pipeline(
        &RustBackend::new(),
        Some(&NearestUpscaler),
        &source,
        &small_scale_config(),
    )
    .unwrap();

    let names = file_names(tmp.path());
    assert!(names.contains(&"shore_scaled_cropped.jpg".to_string()));
    assert!(names.contains(&"shore_scaled_mixed.png".to_string()));
    assert!(names.contains(&"shore_edgy_blurred.jpg".to_string()));
}

#[test]
fn existing_scaled_file_is_reused() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "dusk.png", 100, 100);
    write_source(tmp.path(), "dusk_scaled.png", 300, 200);

    // No upscaler at all: it must not be needed
    let report = run_pipeline(
        &RustBackend::new(),
        None,
        &source,
        &PipelineConfig::default(),
    )
    .unwrap();

    assert!(report.scale.skipped);
    assert_eq!(report.steps[0].step, Step::Crop);
    assert_eq!(report.steps[0].dimensions.0, 300);
}

#[test]
fn failed_upscale_leaves_only_the_source() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "dusk.png", 200, 150);

    let result = run_pipeline(
        &RustBackend::new(),
        Some(&BrokenUpscaler),
        &source,
        &PipelineConfig::default(),
    );

    assert!(matches!(result, Err(PipelineError::Upscale(_))));
    assert_eq!(file_names(tmp.path()), vec!["dusk.png"]);
}

#[test]
fn blurred_backdrop_saved_when_configured() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "dusk.png", 200, 150);
    let mut config = small_scale_config();
    config.save.blurred = true;
    config.save.cropped = false;

    run_pipeline(&RustBackend::new(), Some(&NearestUpscaler), &source, &config).unwrap();

    let names = file_names(tmp.path());
    assert!(names.contains(&"dusk_scaled_cropped_blurred.png".to_string()));
    assert!(!names.contains(&"dusk_scaled_cropped.png".to_string()));
}
