//! External super-resolution upscaler.
//!
//! Upscaling is delegated to a separate program (by default
//! [waifu2x-ncnn-vulkan](https://github.com/nihui/waifu2x-ncnn-vulkan)). The
//! call is synchronous: the pipeline blocks until the process exits, then
//! checks that the expected `<stem>_scaled<ext>` file exists. A non-zero
//! exit and a missing output are the same failure.

use crate::naming::{Suffix, derive_identity};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info};

/// Scale factors the upscaler accepts.
pub const SUPPORTED_SCALES: &[u32] = &[1, 2, 4, 8, 16, 32];

#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("Failed to launch upscaler {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Upscale failed (exit code {exit_code:?}), expected output {}", .output.display())]
    Failed {
        exit_code: Option<i32>,
        output: PathBuf,
    },
    #[error("No upscaler configured; set upscaler.binary or pass --upscaler")]
    NotConfigured,
}

/// What a finished upscale produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleOutcome {
    pub exit_code: Option<i32>,
    pub output_path: PathBuf,
}

/// Where an upscale of `input` is written.
pub fn scaled_path(input: &Path) -> PathBuf {
    derive_identity(input, Suffix::Scaled)
}

/// Anything that can turn `input` into `<stem>_scaled<ext>`.
pub trait Upscaler {
    fn upscale(&self, input: &Path, scale: u32) -> Result<UpscaleOutcome, UpscaleError>;
}

/// waifu2x-ncnn-vulkan invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct Waifu2x {
    pub binary: PathBuf,
    /// GPU device id passed as `-g`.
    pub gpu: i32,
}

impl Waifu2x {
    pub fn new(binary: impl Into<PathBuf>, gpu: i32) -> Self {
        Self {
            binary: binary.into(),
            gpu,
        }
    }

    fn args(&self, input: &Path, output: &Path, scale: u32) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
            "-s".to_string(),
            scale.to_string(),
            "-g".to_string(),
            self.gpu.to_string(),
        ]
    }
}

impl Upscaler for Waifu2x {
    fn upscale(&self, input: &Path, scale: u32) -> Result<UpscaleOutcome, UpscaleError> {
        let output = scaled_path(input);
        let args = self.args(input, &output, scale);
        info!(binary = %self.binary.display(), scale, "running upscaler");
        debug!(?args, "upscaler arguments");

        let status = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::null())
            .status()
            .map_err(|source| UpscaleError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        check_outcome(UpscaleOutcome {
            exit_code: status.code(),
            output_path: output,
        })
    }
}

/// Collapse a non-zero exit or a missing output file into one failure.
pub fn check_outcome(outcome: UpscaleOutcome) -> Result<UpscaleOutcome, UpscaleError> {
    if outcome.exit_code != Some(0) || !outcome.output_path.is_file() {
        return Err(UpscaleError::Failed {
            exit_code: outcome.exit_code,
            output: outcome.output_path,
        });
    }
    Ok(outcome)
}
