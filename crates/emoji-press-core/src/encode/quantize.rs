//! In-memory palette encoder built on libimagequant.

use imagequant::RGBA;

use super::{validate_pixels, write_indexed_png, CompressionConfig, EncodeError, PaletteEncoder};
use crate::decode::PixelBuffer;

/// Quantizes with imagequant and writes the result with the png crate.
///
/// Runs entirely in-process, which makes it the backend for the browser build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeEncoder {
    /// Floyd-Steinberg dithering level, 0.0 (off) to 1.0 (full).
    pub dithering: f32,
}

impl Default for QuantizeEncoder {
    fn default() -> Self {
        Self { dithering: 1.0 }
    }
}

impl QuantizeEncoder {
    pub fn new(dithering: f32) -> Self {
        Self {
            dithering: dithering.clamp(0.0, 1.0),
        }
    }
}

impl PaletteEncoder for QuantizeEncoder {
    fn name(&self) -> &'static str {
        "imagequant"
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        config: &CompressionConfig,
    ) -> Result<Vec<u8>, EncodeError> {
        validate_pixels(image)?;
        config.validate()?;

        let mut liq = imagequant::new();
        liq.set_max_colors(config.palette_size)
            .map_err(quant_error)?;
        if let Some(q) = config.quality {
            liq.set_quality(q.min, q.max).map_err(quant_error)?;
        }
        if let Some(speed) = config.speed {
            liq.set_speed(i32::from(speed)).map_err(quant_error)?;
        }

        let bitmap: Vec<RGBA> = image
            .pixels
            .chunks_exact(4)
            .map(|px| RGBA {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            })
            .collect();

        let mut img = liq
            .new_image(bitmap, image.width as usize, image.height as usize, 0.0)
            .map_err(quant_error)?;
        let mut res = liq.quantize(&mut img).map_err(quant_error)?;
        res.set_dithering_level(self.dithering)
            .map_err(quant_error)?;

        let (palette, indices) = res.remapped(&mut img).map_err(quant_error)?;
        let palette: Vec<[u8; 4]> = palette.iter().map(|c| [c.r, c.g, c.b, c.a]).collect();

        write_indexed_png(image.width, image.height, &palette, &indices)
    }
}

fn quant_error(e: imagequant::Error) -> EncodeError {
    EncodeError::Quantization(e.to_string())
}
