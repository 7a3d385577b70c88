//! Emoji Press Core - custom emoji compression
//!
//! This crate turns an arbitrary raster image into a 162x162 palette PNG that
//! fits a chat platform's 16KB custom-emoji limit.
//!
//! # Pipeline
//!
//! 1. [`decode`] - load PNG, JPEG, GIF or WebP bytes into RGBA pixels
//! 2. [`canvas`] - fit and center the image on a transparent square canvas
//! 3. [`search`] - walk a ladder of palette configs until one fits the budget,
//!    using an [`encode::PaletteEncoder`] backend
//! 4. [`package`] - expose the PNG as bytes, base64 or a data URL
//!
//! [`pipeline::Compressor`] runs all four stages; [`transport`] shapes the
//! result as an HTTP JSON response.

pub mod canvas;
pub mod decode;
pub mod encode;
pub mod error;
pub mod package;
pub mod pipeline;
pub mod search;
pub mod transport;

#[cfg(test)]
mod fixtures;

pub use error::{CompressError, ErrorKind};
pub use package::{CompressedImage, CompressionSummary};
pub use pipeline::{compress, CompressOptions, Compressor};

/// Edge length of the output canvas, in pixels.
pub const TARGET_SIZE: u32 = 162;

/// Default byte budget: 15.5KB, leaving headroom under the platform limit.
pub const MAX_FILE_SIZE: usize = 15 * 1024 + 512;

/// Hard upload limit enforced by the chat platform.
pub const PLATFORM_LIMIT: usize = 16 * 1024;
