//! Image processing in pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Crop** | `DynamicImage::crop_imm` |
//! | **Blur** | `DynamicImage::blur` (Gaussian) |
//! | **Mix** | Lanczos3 resize + `imageops::replace` |
//! | **Feather** | padded canvas, blur, masked blend |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing composition steps
//! - **Compose**: Raster primitives (canvas, paste, mask, blend)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level steps combining calculations + backend

pub mod backend;
pub mod calculations;
pub(crate) mod compose;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{
    Layer, OperationError, blur, crop_to_widescreen, feather_edge, mix, scale_level,
};
pub use params::{BlurRadius, EdgeGeometry, FillColor, Quality, StepOptions};
pub use rust_backend::RustBackend;
