//! Raster primitives the composition steps are built from.
//!
//! Canvases are RGB8: pasting ignores alpha, the same way a flat photo
//! editor layer would.

use super::calculations::Rect;
use super::params::{BlurRadius, FillColor};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, imageops};

/// A canvas filled with a single color.
pub fn solid_canvas(width: u32, height: u32, color: FillColor) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color.0))
}

/// Replace canvas pixels with `top` at a signed offset. Overhang is clipped.
pub fn paste(canvas: &mut RgbImage, top: &RgbImage, x: i64, y: i64) {
    imageops::replace(canvas, top, x, y);
}

/// A mask that is white everywhere except a black `interior`.
///
/// White selects the blurred source, black keeps the sharp one.
pub fn feather_mask(width: u32, height: u32, interior: Rect) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    let black = GrayImage::new(interior.width, interior.height);
    imageops::replace(&mut mask, &black, interior.x as i64, interior.y as i64);
    mask
}

/// Blend `top` onto `base` in place, weighted by `mask` (255 = all `top`).
///
/// All three images must share the same dimensions.
pub fn paste_masked(base: &mut RgbImage, top: &RgbImage, mask: &GrayImage) {
    debug_assert_eq!(base.dimensions(), top.dimensions());
    debug_assert_eq!(base.dimensions(), mask.dimensions());

    for ((dst, src), weight) in base.pixels_mut().zip(top.pixels()).zip(mask.pixels()) {
        let w = weight[0] as u32;
        match w {
            0 => {}
            255 => *dst = *src,
            _ => {
                for c in 0..3 {
                    let blended = (src[c] as u32 * w + dst[c] as u32 * (255 - w) + 127) / 255;
                    dst[c] = blended as u8;
                }
            }
        }
    }
}

/// Uniform Gaussian blur over the whole surface.
pub fn gaussian_blur(image: &DynamicImage, radius: BlurRadius) -> DynamicImage {
    image.blur(radius.sigma())
}
