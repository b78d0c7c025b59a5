//! Pure calculation functions for composition geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Integer results follow floor semantics: fractional pixels are dropped.

use super::params::EdgeGeometry;

/// Canonical widescreen ratio (width / height).
pub const TARGET_RATIO: f64 = 1.77;

/// Relative tolerance for treating a ratio as already widescreen.
pub const RATIO_TOLERANCE: f64 = 1e-3;

/// Resolution every upscaled image should reach or exceed (4K UHD).
pub const UHD: (u32, u32) = (3840, 2160);

/// Largest scale factor the upscaler accepts, as a power of two (2^5 = 32).
const MAX_SCALE_EXPONENT: f64 = 5.0;

fn is_close(a: f64, b: f64, rel_tol: f64) -> bool {
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Whether `width / height` already sits inside the aspect band around 16:9.
///
/// The boundary itself counts as inside.
pub fn within_aspect_band(dims: (u32, u32)) -> bool {
    let (w, h) = dims;
    is_close(w as f64 / h as f64, TARGET_RATIO, RATIO_TOLERANCE)
}

/// Crop rectangle as `(left, upper, right, lower)` edges, right/lower exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Calculate the crop that brings an image into the aspect band.
///
/// Returns `None` when the image is already inside the band. Otherwise the
/// long axis is trimmed symmetrically: the offset is truncated once and used
/// for both edges, so a one-pixel asymmetry against the exact target is
/// possible.
///
/// # Examples
/// ```
/// # use backdrop::imaging::calculations::calculate_crop_box;
/// // 3000x1000 is far too wide: keep the full height, trim 615px per side
/// let crop = calculate_crop_box((3000, 1000)).unwrap();
/// assert_eq!((crop.width(), crop.height()), (1770, 1000));
///
/// // 1770x1000 is already 16:9
/// assert!(calculate_crop_box((1770, 1000)).is_none());
/// ```
pub fn calculate_crop_box(dims: (u32, u32)) -> Option<CropBox> {
    if within_aspect_band(dims) {
        return None;
    }

    let (w, h) = dims;
    let ratio = w as f64 / h as f64;

    if ratio > TARGET_RATIO {
        // Too wide: height is kept
        let target_w = h as f64 * TARGET_RATIO;
        let offset = ((w as f64 - target_w) / 2.0) as u32;
        Some(CropBox {
            left: offset,
            top: 0,
            right: w - offset,
            bottom: h,
        })
    } else {
        // Too tall: width is kept
        let target_h = w as f64 / TARGET_RATIO;
        let offset = ((h as f64 - target_h) / 2.0) as u32;
        Some(CropBox {
            left: 0,
            top: offset,
            right: w,
            bottom: h - offset,
        })
    }
}

/// Where a scaled foreground lands on a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled foreground width.
    pub width: u32,
    /// Scaled foreground height.
    pub height: u32,
    /// Paste offset. Negative only when the foreground overhangs the background.
    pub x: i64,
    pub y: i64,
}

/// Calculate how a foreground is scaled and centered onto a background.
///
/// A wide foreground (ratio above [`TARGET_RATIO`]) is matched to the
/// background width and centered vertically. Anything else is matched to the
/// background height and centered horizontally.
///
/// # Arguments
/// * `foreground` - Foreground dimensions (width, height)
/// * `background` - Background dimensions (width, height)
pub fn calculate_placement(foreground: (u32, u32), background: (u32, u32)) -> Placement {
    let (fg_w, fg_h) = (foreground.0 as f64, foreground.1 as f64);
    let (bg_w, bg_h) = background;

    if fg_w / fg_h > TARGET_RATIO {
        let height = ((fg_h / (fg_w / bg_w as f64)).floor() as u32).max(1);
        Placement {
            width: bg_w,
            height,
            x: 0,
            y: (bg_h as i64 - height as i64).div_euclid(2),
        }
    } else {
        let width = ((fg_w / (fg_h / bg_h as f64)).floor() as u32).max(1);
        Placement {
            width,
            height: bg_h,
            x: (bg_w as i64 - width as i64).div_euclid(2),
            y: 0,
        }
    }
}

/// An axis-aligned rectangle inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Canvas and mask layout for feathering an image's edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLayout {
    /// Padded canvas size: the image plus `diameter` on each axis.
    pub canvas: (u32, u32),
    /// Where the sharp image is pasted on the canvas.
    pub image_offset: (u32, u32),
    /// Region of the mask left black, i.e. kept sharp.
    pub interior: Rect,
}

/// Calculate the feather layout for an image of the given size.
///
/// The interior sits at `(diameter, diameter)` in mask coordinates rather
/// than at the mask's true center, so the sharp area is shifted towards the
/// lower right by `radius` pixels. An image smaller than `diameter` on an
/// axis has an empty interior on that axis.
pub fn calculate_edge_layout(dims: (u32, u32), geometry: EdgeGeometry) -> EdgeLayout {
    let (w, h) = dims;
    let EdgeGeometry { radius, diameter } = geometry;

    EdgeLayout {
        canvas: (w + diameter, h + diameter),
        image_offset: (radius, radius),
        interior: Rect {
            x: diameter,
            y: diameter,
            width: w.saturating_sub(diameter),
            height: h.saturating_sub(diameter),
        },
    }
}

/// Calculate the power-of-two upscale factor that reaches 4K on both axes.
///
/// The raw factor is `max(2160 / height, 3840 / width)`, rounded up to the
/// next power of two and clamped to the range the upscaler supports
/// (1 through 32). Images already at or above 4K get 1.
///
/// # Examples
/// ```
/// # use backdrop::imaging::calculations::calculate_scale_level;
/// assert_eq!(calculate_scale_level((1920, 1080)), 2);
/// assert_eq!(calculate_scale_level((1000, 1000)), 4);
/// ```
pub fn calculate_scale_level(dims: (u32, u32)) -> u32 {
    let (w, h) = dims;
    let (uhd_w, uhd_h) = UHD;
    let raw = f64::max(uhd_h as f64 / h as f64, uhd_w as f64 / w as f64);
    let exponent = raw.log2().ceil().clamp(0.0, MAX_SCALE_EXPONENT);
    1 << exponent as u32
}
