//! Parameter types for composition steps.
//!
//! These structs describe *what* to do, not *how* to do it. They replace the
//! loose keyword arguments each step would otherwise take (radius, fill
//! color, save flag) with one explicit value per call.
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (1–100, default 100). Clamped on construction.
//! - [`BlurRadius`]: Gaussian blur radius in pixels, used as the kernel's sigma.
//! - [`FillColor`]: RGB fill for the padded canvas behind a feathered edge.
//! - [`EdgeGeometry`]: Padding radius and unblurred-zone shrink for feathering.
//! - [`StepOptions`]: Whether a step persists its output, and at what quality.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Gaussian blur radius in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRadius(pub f32);

impl BlurRadius {
    /// Radius for a general-purpose blur.
    pub const GENERAL: BlurRadius = BlurRadius(16.0);
    /// Radius for the background layer behind a composite.
    pub const BACKGROUND: BlurRadius = BlurRadius(24.0);

    pub fn sigma(self) -> f32 {
        self.0
    }
}

impl Default for BlurRadius {
    fn default() -> Self {
        Self::GENERAL
    }
}

/// Solid RGB color used to fill canvas padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillColor(pub [u8; 3]);

impl FillColor {
    pub const WHITE: FillColor = FillColor([255, 255, 255]);
    pub const BLACK: FillColor = FillColor([0, 0, 0]);
}

impl Default for FillColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for FillColor {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }
}

/// Fixed geometry of a feathered edge.
///
/// - `radius`: padding added on each side of the image; half of it is the
///   blur sigma.
/// - `diameter`: total growth of the canvas per axis, and how far the sharp
///   interior shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGeometry {
    pub radius: u32,
    pub diameter: u32,
}

impl EdgeGeometry {
    pub fn blur_radius(self) -> BlurRadius {
        BlurRadius(self.radius as f32 / 2.0)
    }
}

impl Default for EdgeGeometry {
    fn default() -> Self {
        Self {
            radius: 20,
            diameter: 40,
        }
    }
}

/// Per-call persistence options shared by every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOptions {
    /// Write the output next to its identity path.
    pub save: bool,
    pub quality: Quality,
}

impl StepOptions {
    /// Keep the result in memory only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persist the result at the given quality.
    pub fn saved(quality: Quality) -> Self {
        Self {
            save: true,
            quality,
        }
    }
}
