//! Canvas normalization: fit any image onto a fixed transparent square.
//!
//! The source is scaled uniformly so that it fits the `target x target`
//! canvas (upscaling small sources as needed), then centered. Everything
//! outside the placed image stays fully transparent.
//!
//! # Example
//!
//! ```ignore
//! // A 500x300 photo becomes 162x97 content letterboxed on a 162x162 canvas
//! let layout = CanvasLayout::compute(500, 300, 162).unwrap();
//! assert_eq!((layout.scaled_width, layout.scaled_height), (162, 97));
//! assert_eq!((layout.offset_x, layout.offset_y), (0, 33));
//! ```

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::decode::{FilterType, PixelBuffer};

/// Errors from canvas normalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    /// The source has a zero dimension or a pixel buffer that disagrees with it.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    /// The canvas size is zero or larger than [`MAX_TARGET_SIZE`].
    #[error("Canvas size must be between 1 and {max}, got {0}", max = MAX_TARGET_SIZE)]
    InvalidTarget(u32),
}

/// Largest canvas edge accepted, keeping the canvas allocation small enough
/// for a 32-bit address space.
pub const MAX_TARGET_SIZE: u32 = 4096;

/// Placement of the scaled source on the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    /// Canvas edge length.
    pub target: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl CanvasLayout {
    /// Compute the fit-and-center placement of a `width x height` source.
    ///
    /// The scale factor is `min(target / width, target / height)`; scaled
    /// dimensions and offsets are rounded to the nearest pixel. Scaled
    /// dimensions never drop below one pixel.
    pub fn compute(width: u32, height: u32, target: u32) -> Result<Self, CanvasError> {
        if target == 0 || target > MAX_TARGET_SIZE {
            return Err(CanvasError::InvalidTarget(target));
        }
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidImage { width, height });
        }

        let t = target as f64;
        let scale = (t / width as f64).min(t / height as f64);

        let scaled_width = ((width as f64 * scale).round() as u32).clamp(1, target);
        let scaled_height = ((height as f64 * scale).round() as u32).clamp(1, target);

        Ok(Self {
            target,
            scaled_width,
            scaled_height,
            offset_x: centered_offset(target, scaled_width),
            offset_y: centered_offset(target, scaled_height),
        })
    }

    /// Whether canvas pixel (x, y) is covered by the scaled source.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.offset_x
            && x < self.offset_x + self.scaled_width
            && y >= self.offset_y
            && y < self.offset_y + self.scaled_height
    }
}

fn centered_offset(target: u32, scaled: u32) -> u32 {
    ((target - scaled) as f64 / 2.0).round() as u32
}

/// Fit an image onto a transparent `target x target` canvas.
///
/// # Arguments
///
/// * `image` - Decoded RGBA source of any size
/// * `target` - Canvas edge length in pixels
/// * `filter` - Resampling filter used for scaling
///
/// # Errors
///
/// Returns `CanvasError::InvalidImage` for zero dimensions or an inconsistent
/// pixel buffer, and `CanvasError::InvalidTarget` for a zero or oversized target.
pub fn normalize_to_canvas(
    image: &PixelBuffer,
    target: u32,
    filter: FilterType,
) -> Result<PixelBuffer, CanvasError> {
    let invalid = || CanvasError::InvalidImage {
        width: image.width,
        height: image.height,
    };

    if !image.has_consistent_length() {
        return Err(invalid());
    }
    let layout = CanvasLayout::compute(image.width, image.height, target)?;

    let source = image.to_rgba_image().ok_or_else(invalid)?;

    // Fast path: no resampling when the source already has the scaled size
    let scaled = if source.dimensions() == (layout.scaled_width, layout.scaled_height) {
        source
    } else {
        imageops::resize(
            &source,
            layout.scaled_width,
            layout.scaled_height,
            filter.to_image_filter(),
        )
    };

    // RgbaImage::new is zero-filled: alpha 0 everywhere
    let mut canvas = RgbaImage::new(target, target);
    imageops::replace(
        &mut canvas,
        &scaled,
        i64::from(layout.offset_x),
        i64::from(layout.offset_y),
    );

    Ok(PixelBuffer::from_rgba_image(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{flat, gradient};
    use crate::TARGET_SIZE;

    fn buffer(img: image::RgbaImage) -> PixelBuffer {
        PixelBuffer::from_rgba_image(img)
    }

    #[test]
    fn test_layout_landscape_letterbox() {
        let layout = CanvasLayout::compute(500, 300, 162).unwrap();
        assert_eq!(layout.scaled_width, 162);
        assert_eq!(layout.scaled_height, 97); // 300 * 0.324 = 97.2
        assert_eq!(layout.offset_x, 0);
        assert_eq!(layout.offset_y, 33); // (162 - 97) / 2 = 32.5 rounds up
    }

    #[test]
    fn test_layout_portrait_pillarbox() {
        let layout = CanvasLayout::compute(300, 500, 162).unwrap();
        assert_eq!((layout.scaled_width, layout.scaled_height), (97, 162));
        assert_eq!((layout.offset_x, layout.offset_y), (33, 0));
    }

    #[test]
    fn test_layout_small_source_upscales() {
        let layout = CanvasLayout::compute(100, 100, 162).unwrap();
        assert_eq!((layout.scaled_width, layout.scaled_height), (162, 162));
        assert_eq!((layout.offset_x, layout.offset_y), (0, 0));

        let layout = CanvasLayout::compute(20, 10, 162).unwrap();
        assert_eq!((layout.scaled_width, layout.scaled_height), (162, 81));
        assert_eq!(layout.offset_y, 41); // 40.5 rounds up
    }

    #[test]
    fn test_layout_extreme_ratio_keeps_one_pixel() {
        let layout = CanvasLayout::compute(10_000, 1, 162).unwrap();
        assert_eq!(layout.scaled_width, 162);
        assert_eq!(layout.scaled_height, 1);
    }

    #[test]
    fn test_layout_zero_dimensions() {
        assert_eq!(
            CanvasLayout::compute(0, 10, 162),
            Err(CanvasError::InvalidImage {
                width: 0,
                height: 10
            })
        );
        assert!(CanvasLayout::compute(10, 0, 162).is_err());
        assert_eq!(
            CanvasLayout::compute(10, 10, 0),
            Err(CanvasError::InvalidTarget(0))
        );
    }

    #[test]
    fn test_layout_target_ceiling() {
        assert!(CanvasLayout::compute(10, 10, MAX_TARGET_SIZE).is_ok());
        assert_eq!(
            CanvasLayout::compute(10, 10, 40_000),
            Err(CanvasError::InvalidTarget(40_000))
        );
    }

    #[test]
    fn test_oversized_target_rejected_before_allocating() {
        let source = buffer(flat(4, 4, [255, 0, 0, 255]));
        assert_eq!(
            normalize_to_canvas(&source, u32::MAX, FilterType::Bilinear),
            Err(CanvasError::InvalidTarget(u32::MAX))
        );
    }

    #[test]
    fn test_layout_contains() {
        let layout = CanvasLayout::compute(500, 300, 162).unwrap();
        assert!(!layout.contains(80, 32));
        assert!(layout.contains(80, 33));
        assert!(layout.contains(80, 129));
        assert!(!layout.contains(80, 130));
    }

    #[test]
    fn test_normalize_output_is_square() {
        for (w, h) in [(500, 300), (300, 500), (50, 50), (2000, 1000), (1, 1)] {
            let canvas =
                normalize_to_canvas(&buffer(gradient(w, h)), TARGET_SIZE, FilterType::Bilinear)
                    .unwrap();
            assert_eq!((canvas.width, canvas.height), (TARGET_SIZE, TARGET_SIZE));
            assert_eq!(canvas.pixels.len(), (TARGET_SIZE * TARGET_SIZE * 4) as usize);
        }
    }

    #[test]
    fn test_normalize_letterbox_is_transparent() {
        let source = buffer(flat(500, 300, [200, 100, 50, 255]));
        let canvas = normalize_to_canvas(&source, 162, FilterType::Bilinear).unwrap();
        let layout = CanvasLayout::compute(500, 300, 162).unwrap();

        for y in 0..162 {
            for x in 0..162 {
                let [_, _, _, a] = canvas.pixel(x, y).unwrap();
                if layout.contains(x, y) {
                    assert_eq!(a, 255, "covered pixel ({x}, {y}) should be opaque");
                } else {
                    assert_eq!(a, 0, "uncovered pixel ({x}, {y}) should be transparent");
                }
            }
        }
        assert_eq!(canvas.pixel(81, 81), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_normalize_exact_size_is_copied() {
        let source = buffer(gradient(162, 162));
        let canvas = normalize_to_canvas(&source, 162, FilterType::Lanczos3).unwrap();
        assert_eq!(canvas, source);
    }

    #[test]
    fn test_normalize_rejects_inconsistent_buffer() {
        let bad = PixelBuffer {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        assert_eq!(
            normalize_to_canvas(&bad, 162, FilterType::Bilinear),
            Err(CanvasError::InvalidImage {
                width: 10,
                height: 10
            })
        );
    }

    #[test]
    fn test_normalize_rejects_zero_dimension() {
        let empty = PixelBuffer {
            width: 0,
            height: 5,
            pixels: vec![],
        };
        assert!(matches!(
            normalize_to_canvas(&empty, 162, FilterType::Bilinear),
            Err(CanvasError::InvalidImage { .. })
        ));
    }

    #[test]
    fn test_all_filter_types() {
        let source = buffer(gradient(100, 50));
        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let canvas = normalize_to_canvas(&source, 64, filter).unwrap();
            assert_eq!((canvas.width, canvas.height), (64, 64));
            assert_eq!(canvas.pixel(0, 0).map(|px| px[3]), Some(0));
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the scaled content always fits and touches the canvas edge.
        #[test]
        fn prop_layout_fits_canvas(
            width in 1u32..=4000,
            height in 1u32..=4000,
            target in 1u32..=512,
        ) {
            let layout = CanvasLayout::compute(width, height, target).unwrap();

            prop_assert!(layout.scaled_width >= 1 && layout.scaled_width <= target);
            prop_assert!(layout.scaled_height >= 1 && layout.scaled_height <= target);
            prop_assert!(layout.offset_x + layout.scaled_width <= target);
            prop_assert!(layout.offset_y + layout.scaled_height <= target);
            prop_assert!(
                layout.scaled_width == target || layout.scaled_height == target,
                "one edge should span the canvas: {:?}",
                layout
            );
        }

        /// Property: content is centered within one pixel on both axes.
        #[test]
        fn prop_layout_is_centered(
            width in 1u32..=4000,
            height in 1u32..=4000,
        ) {
            let layout = CanvasLayout::compute(width, height, 162).unwrap();

            let left = layout.offset_x;
            let right = 162 - layout.offset_x - layout.scaled_width;
            let top = layout.offset_y;
            let bottom = 162 - layout.offset_y - layout.scaled_height;

            prop_assert!(left.abs_diff(right) <= 1);
            prop_assert!(top.abs_diff(bottom) <= 1);
        }

        /// Property: aspect ratio survives scaling up to rounding.
        #[test]
        fn prop_layout_preserves_aspect_ratio(
            width in 1u32..=4000,
            height in 1u32..=4000,
        ) {
            // Below one scaled pixel the minimum size clamp takes over
            prop_assume!(width.max(height) <= width.min(height) * 162);

            let layout = CanvasLayout::compute(width, height, 162).unwrap();

            // sw/sh vs w/h, cross-multiplied: error is bounded by half a pixel per axis
            let cross = (layout.scaled_width as f64 * height as f64)
                - (layout.scaled_height as f64 * width as f64);
            let tolerance = (width as f64 + height as f64) / 2.0 + 1e-6;
            prop_assert!(
                cross.abs() <= tolerance,
                "ratio drift {} exceeds {} for {}x{} -> {:?}",
                cross,
                tolerance,
                width,
                height,
                layout
            );
        }
    }
}
