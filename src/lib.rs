//! # Backdrop
//!
//! Turns a single photo into a 16:9 wallpaper: the image is upscaled, a
//! cropped and heavily blurred copy becomes the backdrop, the full image is
//! fitted over it, and the outer edge is feathered into a solid frame.
//!
//! # Architecture: Step Pipeline
//!
//! ```text
//! source ──upscale──> scaled ──crop──> cropped ──blur──> blurred
//!                       │                                   │
//!                       └──────────── mix (over) ───────────┘
//!                                       │
//!                                    feather ──> <source>_edgy_blurred
//! ```
//!
//! Every step is a plain function from a [`imaging::Layer`] to a new one. A
//! layer is an in-memory image paired with the path its outputs are named
//! after, so intermediates can stay in memory or be written next to the
//! source without the steps caring which.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry math, raster primitives, the `ImageBackend` trait, and the five steps |
//! | [`naming`] | `<stem><suffix><ext>` output naming shared by every step |
//! | [`upscale`] | `Upscaler` trait and the waifu2x subprocess driver |
//! | [`pipeline`] | Runs the steps in order and reports what each produced |
//! | [`config`] | `backdrop.toml` loading, merging onto stock defaults, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Beside the Image
//!
//! The path a result is named after travels next to the raster in a
//! [`imaging::Layer`], never as hidden state on the image. A step that needs
//! a name and finds none fails before doing any pixel work.
//!
//! ## Upscaling Out of Process
//!
//! Super-resolution is left to an external program behind the
//! [`upscale::Upscaler`] trait. An existing `<stem>_scaled<ext>` file is
//! reused, so reruns never pay for the upscale twice.
//!
//! ## Pure-Rust Compositing
//!
//! Crop, blur, resize and blend all use the `image` crate. Nothing but the
//! optional upscaler needs to be installed.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod upscale;

#[cfg(test)]
pub(crate) mod test_helpers;
