//! High-level composition steps.
//!
//! These functions combine calculations with raster primitives and, when
//! asked to, persist through the backend. Each step takes a [`Layer`] (an
//! image plus the path its output names derive from) and returns a new one.
//!
//! Identity resolution is the same for every step that names its output
//! after its input: the layer's own identity wins, then the explicit `path`
//! argument, and if neither exists the step fails with
//! [`OperationError::MissingIdentity`] before doing any pixel work.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    CropBox, TARGET_RATIO, calculate_crop_box, calculate_edge_layout, calculate_placement,
    calculate_scale_level,
};
use super::compose::{feather_mask, gaussian_blur, paste, paste_masked, solid_canvas};
use super::params::{BlurRadius, EdgeGeometry, FillColor, StepOptions};
use crate::naming::{Suffix, derive_identity};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Cannot name {step} output: no path given and the image has no identity")]
    MissingIdentity { step: &'static str },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type for composition steps.
pub type Result<T> = std::result::Result<T, OperationError>;

/// An in-memory image paired with the path used to name its derivatives.
///
/// The identity is never stored on the image itself; steps thread it
/// explicitly and hand back a fresh pair.
#[derive(Debug, Clone)]
pub struct Layer {
    pub image: DynamicImage,
    pub identity: Option<PathBuf>,
}

impl Layer {
    /// A layer with no identity, e.g. an image built in memory.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            identity: None,
        }
    }

    /// Load a layer from disk; its identity is the path it was read from.
    pub fn open(backend: &impl ImageBackend, path: &Path) -> Result<Self> {
        let image = backend.load(path)?;
        Ok(Self {
            image,
            identity: Some(path.to_path_buf()),
        })
    }

    /// Replace the identity, keeping the pixels.
    pub fn with_identity(self, identity: impl Into<PathBuf>) -> Self {
        Self {
            image: self.image,
            identity: Some(identity.into()),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

fn resolve_identity(layer: &Layer, path: Option<&Path>, step: &'static str) -> Result<PathBuf> {
    layer
        .identity
        .clone()
        .or_else(|| path.map(Path::to_path_buf))
        .ok_or(OperationError::MissingIdentity { step })
}

/// Name the output, optionally persist it, and wrap it as a layer.
fn emit(
    backend: &impl ImageBackend,
    image: DynamicImage,
    identity: PathBuf,
    options: StepOptions,
) -> Result<Layer> {
    if options.save {
        backend.save(&image, &identity, options.quality)?;
    }
    info!(path = %identity.display(), saved = options.save, "output");
    Ok(Layer {
        image,
        identity: Some(identity),
    })
}

/// Crop an image into the 16:9 aspect band.
///
/// An image already inside the band comes back unchanged and is not saved.
/// Otherwise the long axis is trimmed symmetrically and the result is named
/// `<stem>_cropped`.
pub fn crop_to_widescreen(
    backend: &impl ImageBackend,
    layer: Layer,
    path: Option<&Path>,
    options: StepOptions,
) -> Result<Layer> {
    let identity = resolve_identity(&layer, path, "crop")?;
    let (w, h) = layer.dimensions();
    let ratio = w as f64 / h as f64;

    let Some(crop) = calculate_crop_box((w, h)) else {
        info!(ratio, "aspect ratio already within band, crop skipped");
        return Ok(layer.with_identity(identity));
    };

    if ratio > TARGET_RATIO {
        info!(ratio, "ratio > {}, trimming width", TARGET_RATIO);
    } else {
        info!(ratio, "ratio <= {}, trimming height", TARGET_RATIO);
    }

    let CropBox { left, top, .. } = crop;
    debug!(?crop, "crop box");
    let cropped = layer.image.crop_imm(left, top, crop.width(), crop.height());
    emit(
        backend,
        cropped,
        derive_identity(&identity, Suffix::Cropped),
        options,
    )
}

/// Blur the whole surface uniformly. Output is named `<stem>_blurred`.
pub fn blur(
    backend: &impl ImageBackend,
    layer: &Layer,
    path: Option<&Path>,
    radius: BlurRadius,
    options: StepOptions,
) -> Result<Layer> {
    let identity = resolve_identity(layer, path, "blur")?;
    debug!(sigma = radius.sigma(), "gaussian blur");
    let blurred = gaussian_blur(&layer.image, radius);
    emit(
        backend,
        blurred,
        derive_identity(&identity, Suffix::Blurred),
        options,
    )
}

/// Scale `foreground` to span `background` on one axis and center it on the other.
///
/// The background is copied onto a fresh canvas; neither input is modified.
/// The background should be large enough to hold the scaled foreground; an
/// overhang is clipped rather than rejected. The output is named after
/// `name` as `<stem>_mixed.png`.
pub fn mix(
    backend: &impl ImageBackend,
    name: &Path,
    foreground: &Layer,
    background: &Layer,
    options: StepOptions,
) -> Result<Layer> {
    let placement = calculate_placement(foreground.dimensions(), background.dimensions());
    let scaled = foreground
        .image
        .resize_exact(placement.width, placement.height, FilterType::Lanczos3)
        .to_rgb8();

    let mut canvas = background.image.to_rgb8();
    paste(&mut canvas, &scaled, placement.x, placement.y);
    info!(x = placement.x, y = placement.y, "mix offset");

    emit(
        backend,
        DynamicImage::ImageRgb8(canvas),
        derive_identity(name, Suffix::Mixed),
        options,
    )
}

/// Feather the outer edge of an image into a blurred frame.
///
/// The image is padded onto a canvas of `color`, the whole canvas is blurred,
/// and the blur is kept only outside the mask's sharp interior. The output is
/// `diameter` pixels larger on each axis and named `<stem>_edgy_blurred`.
pub fn feather_edge(
    backend: &impl ImageBackend,
    layer: &Layer,
    path: Option<&Path>,
    color: FillColor,
    options: StepOptions,
) -> Result<Layer> {
    let identity = resolve_identity(layer, path, "feather")?;
    let geometry = EdgeGeometry::default();
    let layout = calculate_edge_layout(layer.dimensions(), geometry);
    let (canvas_w, canvas_h) = layout.canvas;
    let (offset_x, offset_y) = layout.image_offset;

    let mut canvas = solid_canvas(canvas_w, canvas_h, color);
    paste(
        &mut canvas,
        &layer.image.to_rgb8(),
        offset_x as i64,
        offset_y as i64,
    );

    let mask = feather_mask(canvas_w, canvas_h, layout.interior);
    debug!(interior = ?layout.interior, "feather mask");

    let blurred = gaussian_blur(
        &DynamicImage::ImageRgb8(canvas.clone()),
        geometry.blur_radius(),
    )
    .to_rgb8();
    paste_masked(&mut canvas, &blurred, &mask);

    emit(
        backend,
        DynamicImage::ImageRgb8(canvas),
        derive_identity(&identity, Suffix::EdgyBlurred),
        options,
    )
}

/// Power-of-two upscale factor that brings the image at `path` up to 4K.
pub fn scale_level(backend: &impl ImageBackend, path: &Path) -> Result<u32> {
    let dims = backend.identify(path)?;
    let level = calculate_scale_level(dims.as_tuple());
    info!(level, "scale level");
    Ok(level)
}
