//! Palette-quantized PNG encoding.
//!
//! This module provides:
//! - [`CompressionConfig`] and the compiled-in quality ladders
//! - The [`PaletteEncoder`] capability used by the palette search
//! - An in-memory backend ([`QuantizeEncoder`], imagequant + png)
//! - An out-of-process backend ([`PngquantEncoder`], behind the `pngquant` feature)
//!
//! # Examples
//!
//! ```ignore
//! use emoji_press_core::encode::{CompressionConfig, PaletteEncoder, QuantizeEncoder};
//!
//! let encoder = QuantizeEncoder::default();
//! let png = encoder.encode(&canvas, &CompressionConfig::new(64)).unwrap();
//! println!("Encoded {} bytes", png.len());
//! ```

mod config;
mod indexed;
#[cfg(feature = "pngquant")]
mod pngquant;
mod quantize;

use thiserror::Error;

use crate::decode::PixelBuffer;

pub use config::{CompressionConfig, QualityRange, DEFAULT_LADDER, PNGQUANT_LADDER};
pub use indexed::{bit_depth_for, write_indexed_png, write_rgba_png};
#[cfg(feature = "pngquant")]
pub use pngquant::PngquantEncoder;
pub use quantize::QuantizeEncoder;

/// Errors that can occur while encoding a single palette attempt.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Config values outside what the encoders accept
    #[error("Invalid compression config: {0}")]
    InvalidConfig(String),

    /// The quantizer rejected the image or could not meet the quality range
    #[error("Quantization failed: {0}")]
    Quantization(String),

    /// PNG serialization failed
    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external encoder binary could not be located
    #[error("{0} not found on PATH")]
    ToolNotFound(&'static str),

    /// The external encoder ran but did not succeed
    #[error("External encoder exited with {status}: {stderr}")]
    ExternalTool { status: String, stderr: String },
}

/// Encodes an RGBA canvas as a palette PNG for one ladder step.
///
/// Implementations must be deterministic: the same buffer and config always
/// yield the same bytes.
pub trait PaletteEncoder {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Encode `image` with at most `config.palette_size` colors.
    fn encode(&self, image: &PixelBuffer, config: &CompressionConfig)
        -> Result<Vec<u8>, EncodeError>;
}

impl<E: PaletteEncoder + ?Sized> PaletteEncoder for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        config: &CompressionConfig,
    ) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(image, config)
    }
}

/// Check that a pixel buffer is non-empty and matches its dimensions.
pub fn validate_pixels(image: &PixelBuffer) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = image.pixel_count() * 4;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    Ok(())
}
