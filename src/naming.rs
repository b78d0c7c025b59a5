//! Output file naming for pipeline steps.
//!
//! Every step names its output after the identity of its input: the file
//! stem gets a fixed suffix and the file lands next to the input.
//!
//! | Step | Input | Output |
//! |---|---|---|
//! | upscale | `dusk.jpg` | `dusk_scaled.jpg` |
//! | crop | `dusk_scaled.jpg` | `dusk_scaled_cropped.jpg` |
//! | blur | `dusk_scaled_cropped.jpg` | `dusk_scaled_cropped_blurred.jpg` |
//! | mix | `dusk_scaled.jpg` | `dusk_scaled_mixed.png` |
//! | feather | `dusk.jpg` | `dusk_edgy_blurred.jpg` |
//!
//! The mix step always writes PNG, whatever the input extension.

use std::path::{Path, PathBuf};

/// Fixed suffix appended to the stem of a step's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    Scaled,
    Cropped,
    Blurred,
    Mixed,
    EdgyBlurred,
}

impl Suffix {
    pub fn as_str(self) -> &'static str {
        match self {
            Suffix::Scaled => "_scaled",
            Suffix::Cropped => "_cropped",
            Suffix::Blurred => "_blurred",
            Suffix::Mixed => "_mixed",
            Suffix::EdgyBlurred => "_edgy_blurred",
        }
    }

    /// Extension forced onto the output, if the suffix has one.
    fn forced_extension(self) -> Option<&'static str> {
        match self {
            Suffix::Mixed => Some("png"),
            _ => None,
        }
    }
}

/// Derive an output path: `<dir>/<stem><suffix>.<ext>`.
///
/// - `"photos/dusk.jpg"` + `Cropped` → `"photos/dusk_cropped.jpg"`
/// - `"photos/dusk.jpg"` + `Mixed` → `"photos/dusk_mixed.png"`
/// - `"dusk"` + `Blurred` → `"dusk_blurred"` (no extension stays none)
pub fn derive_identity(identity: &Path, suffix: Suffix) -> PathBuf {
    let stem = identity
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extension = match suffix.forced_extension() {
        Some(forced) => Some(forced.to_string()),
        None => identity
            .extension()
            .map(|e| e.to_string_lossy().into_owned()),
    };

    let file_name = match extension {
        Some(ext) => format!("{stem}{}.{ext}", suffix.as_str()),
        None => format!("{stem}{}", suffix.as_str()),
    };
    identity.with_file_name(file_name)
}
