//! Synthetic test images, generated in memory.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

/// A single-color image.
pub fn flat(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, image::Rgba(color))
}

/// A smooth opaque gradient.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
            255,
        ])
    })
}

/// Opaque noise from a fixed-seed LCG, so fixtures are reproducible.
pub fn noise(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    RgbaImage::from_fn(width, height, |_, _| {
        let mut channel = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgba([channel(), channel(), channel(), 255])
    })
}

/// Encode a fixture in the given container format.
///
/// JPEG has no alpha channel, so JPEG fixtures are flattened to RGB first.
pub fn encode_fixture(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let dynamic = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img.clone()).into_rgb8()),
        _ => DynamicImage::ImageRgba8(img.clone()),
    };
    let mut out = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut out, format)
        .expect("fixture encoding should succeed");
    out.into_inner()
}
