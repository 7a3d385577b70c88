//! PNG serialization for quantized and raw RGBA buffers.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_pixels, EncodeError};
use crate::decode::PixelBuffer;

/// Smallest PNG bit depth that can address `palette_len` entries.
pub fn bit_depth_for(palette_len: usize) -> ::png::BitDepth {
    match palette_len {
        0..=2 => ::png::BitDepth::One,
        3..=4 => ::png::BitDepth::Two,
        5..=16 => ::png::BitDepth::Four,
        _ => ::png::BitDepth::Eight,
    }
}

/// Write a palette-indexed PNG.
///
/// Palette entries with partial or full transparency are moved to the front
/// so the `tRNS` chunk only lists as many alpha values as needed. The
/// smallest bit depth that fits the palette is used, with maximum
/// compression and no row filtering (filters rarely help indexed data).
///
/// # Arguments
///
/// * `width` / `height` - Image dimensions in pixels
/// * `palette` - RGBA palette entries (1-256)
/// * `indices` - One palette index per pixel, row-major
pub fn write_indexed_png(
    width: u32,
    height: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if palette.is_empty() || palette.len() > 256 {
        return Err(EncodeError::Png(format!(
            "palette must have 1-256 entries, got {}",
            palette.len()
        )));
    }
    let expected = width as usize * height as usize;
    if indices.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: indices.len(),
        });
    }
    if indices.iter().any(|&i| i as usize >= palette.len()) {
        return Err(EncodeError::Png("palette index out of range".to_string()));
    }

    // Transparent entries first, stable otherwise
    let mut order: Vec<usize> = (0..palette.len()).collect();
    order.sort_by_key(|&i| palette[i][3] == 255);
    let mut remap = [0u8; 256];
    for (new_index, &old_index) in order.iter().enumerate() {
        remap[old_index] = new_index as u8;
    }

    let plte: Vec<u8> = order
        .iter()
        .flat_map(|&i| [palette[i][0], palette[i][1], palette[i][2]])
        .collect();
    let trns: Vec<u8> = order
        .iter()
        .map(|&i| palette[i][3])
        .take_while(|&a| a != 255)
        .collect();

    let depth = bit_depth_for(palette.len());
    let remapped: Vec<u8> = indices.iter().map(|&i| remap[i as usize]).collect();
    let data = pack_indices(&remapped, width as usize, depth_bits(depth));

    let mut out = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(&mut out, width, height);
        encoder.set_color(::png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_palette(plte);
        if !trns.is_empty() {
            encoder.set_trns(trns);
        }
        encoder.set_compression(::png::Compression::Best);
        encoder.set_filter(::png::FilterType::NoFilter);

        let mut writer = encoder.write_header().map_err(png_error)?;
        writer.write_image_data(&data).map_err(png_error)?;
        writer.finish().map_err(png_error)?;
    }

    Ok(out)
}

/// Write a plain RGBA8 PNG, used to hand the canvas to external tools.
pub fn write_rgba_png(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    validate_pixels(image)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::Png(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn png_error(e: ::png::EncodingError) -> EncodeError {
    EncodeError::Png(e.to_string())
}

fn depth_bits(depth: ::png::BitDepth) -> usize {
    match depth {
        ::png::BitDepth::One => 1,
        ::png::BitDepth::Two => 2,
        ::png::BitDepth::Four => 4,
        _ => 8,
    }
}

/// Pack one-byte indices into rows of `bits`-wide samples, MSB first.
/// Each row starts on a byte boundary.
fn pack_indices(indices: &[u8], width: usize, bits: usize) -> Vec<u8> {
    if bits == 8 {
        return indices.to_vec();
    }

    let per_byte = 8 / bits;
    let row_bytes = width.div_ceil(per_byte);
    let mut packed = Vec::with_capacity(row_bytes * (indices.len() / width.max(1)));

    for row in indices.chunks(width) {
        let start = packed.len();
        packed.resize(start + row_bytes, 0);
        for (x, &index) in row.iter().enumerate() {
            let shift = 8 - bits * (x % per_byte + 1);
            packed[start + x / per_byte] |= index << shift;
        }
    }

    packed
}
