//! End-to-end backdrop pipeline.
//!
//! Turns one source image into a 16:9 wallpaper with a feathered frame:
//!
//! ```text
//! dusk.jpg
//!   └─ upscale ──> dusk_scaled.jpg            (skipped if it already exists)
//!        ├─ crop ──> dusk_scaled_cropped.jpg
//!        │    └─ blur ──> dusk_scaled_cropped_blurred.jpg (in memory by default)
//!        └─ mix (scaled over blurred) ──> dusk_scaled_mixed.png
//!             └─ feather ──> dusk_edgy_blurred.jpg
//! ```
//!
//! The final output is named after the *source*, not the mixed intermediate.
//! Which intermediates reach the disk is controlled by the `[save]` config
//! section. Everything runs on the calling thread; the upscaler call blocks
//! until the external process exits.

use crate::config::PipelineConfig;
use crate::imaging::{
    BackendError, ImageBackend, Layer, OperationError, blur, crop_to_widescreen, feather_edge,
    mix, scale_level,
};
use crate::upscale::{UpscaleError, UpscaleOutcome, Upscaler, check_outcome, scaled_path};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, info_span};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Upscale failed: {0}")]
    Upscale(#[from] UpscaleError),
    #[error("Source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

/// A pipeline step that produces an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Crop,
    Blur,
    Mix,
    Feather,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Crop => "crop",
            Step::Blur => "blur",
            Step::Mix => "mix",
            Step::Feather => "feather",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: Step,
    /// Output identity; the file path when `saved` is true.
    pub identity: PathBuf,
    pub dimensions: (u32, u32),
    pub saved: bool,
}

/// Whether the upscaler ran, and at which factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDecision {
    /// Factor passed to the upscaler; `None` when it did not run.
    pub level: Option<u32>,
    /// A scaled image was already on disk.
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub source: PathBuf,
    pub scaled: PathBuf,
    pub scale: ScaleDecision,
    pub steps: Vec<StepRecord>,
}

impl PipelineReport {
    /// Identity of the last step's output.
    pub fn final_output(&self) -> Option<&Path> {
        self.steps.last().map(|s| s.identity.as_path())
    }
}

fn record(step: Step, layer: &Layer, saved: bool) -> StepRecord {
    StepRecord {
        step,
        identity: layer.identity.clone().unwrap_or_default(),
        dimensions: layer.dimensions(),
        saved,
    }
}

/// Run the full pipeline on `source`.
///
/// `upscaler` is only consulted when `<stem>_scaled<ext>` does not exist yet.
/// If it is needed and fails (or none was given), the error is logged and
/// returned before any other step runs.
pub fn run_pipeline(
    backend: &impl ImageBackend,
    upscaler: Option<&dyn Upscaler>,
    source: &Path,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    if !source.is_file() {
        return Err(PipelineError::SourceNotFound(source.to_path_buf()));
    }

    let span = info_span!("pipeline", source = %source.display());
    let _enter = span.enter();

    let scaled = scaled_path(source);
    let scale = ensure_scaled(backend, upscaler, source, &scaled, config)?;

    let mut steps = Vec::with_capacity(4);

    // Backdrop: cropped to 16:9 and blurred
    let cropped = crop_to_widescreen(
        backend,
        Layer::open(backend, &scaled)?,
        None,
        config.step_options(config.save.cropped),
    )?;
    // An image already in the band comes back as-is and is never written
    let crop_saved = config.save.cropped && cropped.identity.as_deref() != Some(scaled.as_path());
    steps.push(record(Step::Crop, &cropped, crop_saved));

    let blurred = blur(
        backend,
        &cropped,
        None,
        config.blur.background(),
        config.step_options(config.save.blurred),
    )?;
    steps.push(record(Step::Blur, &blurred, config.save.blurred));

    // Foreground: the full scaled image, fitted over the backdrop
    let foreground = Layer::open(backend, &scaled)?;
    let mixed = mix(
        backend,
        &scaled,
        &foreground,
        &blurred,
        config.step_options(config.save.mixed),
    )?;
    steps.push(record(Step::Mix, &mixed, config.save.mixed));

    let framed = Layer::new(mixed.image).with_identity(source);
    let feathered = feather_edge(
        backend,
        &framed,
        None,
        config.fill_color(),
        config.step_options(config.save.feathered),
    )?;
    steps.push(record(Step::Feather, &feathered, config.save.feathered));

    info!(
        output = %feathered.identity.as_deref().unwrap_or(source).display(),
        "pipeline finished"
    );

    Ok(PipelineReport {
        source: source.to_path_buf(),
        scaled,
        scale,
        steps,
    })
}

fn ensure_scaled(
    backend: &impl ImageBackend,
    upscaler: Option<&dyn Upscaler>,
    source: &Path,
    scaled: &Path,
    config: &PipelineConfig,
) -> Result<ScaleDecision, PipelineError> {
    if scaled.is_file() {
        info!(path = %scaled.display(), "upscale skipped, scaled image exists");
        return Ok(ScaleDecision {
            level: None,
            skipped: true,
        });
    }

    let level = match config.upscaler.scale {
        Some(level) => level,
        None => scale_level(backend, source)?,
    };

    // Whatever the upscaler reports, the file must be at the expected path
    let result = match upscaler {
        Some(upscaler) => upscaler.upscale(source, level).and_then(|outcome| {
            check_outcome(UpscaleOutcome {
                exit_code: outcome.exit_code,
                output_path: scaled.to_path_buf(),
            })
        }),
        None => Err(UpscaleError::NotConfigured),
    };
    if let Err(e) = result {
        error!(error = %e, "upscale failed, stopping");
        return Err(e.into());
    }

    Ok(ScaleDecision {
        level: Some(level),
        skipped: false,
    })
}
