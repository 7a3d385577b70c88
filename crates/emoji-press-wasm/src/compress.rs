//! Compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_image`] - Compress with the default options
//! - [`compress_image_with_options`] - Compress with caller-supplied options
//! - [`default_options`] - The default options as a plain JS object
//!
//! # Example
//!
//! ```typescript
//! import { compress_image } from '@emoji-press/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const emoji = compress_image(bytes, file.type, (p) => bar.value = p);
//! if (!emoji.within_budget) {
//!   console.log(`Still ${emoji.size} bytes`);
//! }
//! img.src = emoji.data_url();
//! ```

use crate::types::JsCompressedImage;
use emoji_press_core::decode::SourceImage;
use emoji_press_core::{CompressError, CompressOptions, Compressor, ErrorKind};
use wasm_bindgen::prelude::*;

/// Compress an image into a 162x162 emoji PNG.
///
/// # Arguments
///
/// * `bytes` - Encoded PNG, JPEG, GIF or WebP file contents
/// * `media_type` - The file's declared MIME type, if known
/// * `on_progress` - Called with percentages 10, 30, 50, 80, 90, 100
///
/// # Errors
///
/// Throws an `Error` whose `kind` property is one of `decode`,
/// `invalid_image`, `invalid_config` or `encoding`. A result over the byte
/// budget is not an error; check `within_budget`.
#[wasm_bindgen]
pub fn compress_image(
    bytes: &[u8],
    media_type: Option<String>,
    on_progress: Option<js_sys::Function>,
) -> Result<JsCompressedImage, JsValue> {
    run(bytes, media_type, CompressOptions::default(), on_progress)
}

/// Compress an image with options such as `{ byteBudget: 12000 }`.
///
/// Missing fields take their defaults; `null` or `undefined` means all
/// defaults.
#[wasm_bindgen]
pub fn compress_image_with_options(
    bytes: &[u8],
    media_type: Option<String>,
    options: JsValue,
    on_progress: Option<js_sys::Function>,
) -> Result<JsCompressedImage, JsValue> {
    let options = if options.is_null() || options.is_undefined() {
        CompressOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| {
            js_error(
                &format!("Invalid compression options: {}", e),
                ErrorKind::InvalidConfig,
            )
        })?
    };
    run(bytes, media_type, options, on_progress)
}

/// Default options as a plain object, including the palette ladder.
#[wasm_bindgen]
pub fn default_options() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&CompressOptions::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn run(
    bytes: &[u8],
    media_type: Option<String>,
    options: CompressOptions,
    on_progress: Option<js_sys::Function>,
) -> Result<JsCompressedImage, JsValue> {
    let mut forward = |percent: u8| {
        if let Some(callback) = &on_progress {
            // A throwing callback must not abort compression
            let _ = callback.call1(&JsValue::NULL, &JsValue::from(percent));
        }
    };

    let image = compress_bytes(bytes, media_type.as_deref(), options, Some(&mut forward))
        .map_err(|e| js_error(&e.to_string(), e.kind()))?;

    if !image.within_budget() {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "emoji-press: result is {:.2}KB with {} colors, over the {:.2}KB budget",
            image.size() as f64 / 1024.0,
            image.palette_size(),
            image.inner().budget() as f64 / 1024.0,
        )));
    }

    Ok(image)
}

/// Target-independent core of the bindings.
pub(crate) fn compress_bytes(
    bytes: &[u8],
    media_type: Option<&str>,
    options: CompressOptions,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<JsCompressedImage, CompressError> {
    let source = SourceImage::with_mime(bytes.to_vec(), media_type);
    Compressor::with_options(options)
        .compress(&source, progress)
        .map(JsCompressedImage::new)
}

fn js_error(message: &str, kind: ErrorKind) -> JsValue {
    let error = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(
        &error,
        &JsValue::from_str("kind"),
        &JsValue::from_str(kind.as_str()),
    );
    error.into()
}

/// Tests for compression bindings.
///
/// The exported functions return `Result<T, JsValue>` and only run on wasm32;
/// these tests drive the shared `compress_bytes` path instead.
#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 3) as u8, (y * 2) as u8, 90, 255])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_compress_bytes_produces_emoji() {
        let bytes = png_bytes(80, 40);
        let image =
            compress_bytes(&bytes, Some("image/png"), CompressOptions::default(), None).unwrap();

        assert_eq!((image.width(), image.height()), (162, 162));
        assert!(image.within_budget());
        assert!(!image.exceeds_platform_limit());
        assert_eq!(image.original_size(), bytes.len());
        assert_eq!(image.size(), image.bytes().len());
        assert!(image.data_url().starts_with("data:image/png;base64,"));
        assert!(image.data_url().ends_with(&image.base64()));
    }

    #[test]
    fn test_compress_bytes_reports_progress() {
        let mut seen = Vec::new();
        let mut record = |p: u8| seen.push(p);
        compress_bytes(
            &png_bytes(20, 20),
            None,
            CompressOptions::default(),
            Some(&mut record),
        )
        .unwrap();

        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_compress_bytes_rejects_garbage() {
        let result = compress_bytes(b"not an image", None, CompressOptions::default(), None);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Decode));
    }

    #[test]
    fn test_compress_bytes_rejects_oversized_canvas() {
        let options = CompressOptions {
            target_size: 40_000,
            ..CompressOptions::default()
        };
        let result = compress_bytes(&png_bytes(20, 20), None, options, None);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InvalidConfig));
    }

    #[test]
    fn test_compress_bytes_flags_over_budget() {
        let options = CompressOptions {
            byte_budget: 64,
            ..CompressOptions::default()
        };
        let image = compress_bytes(&png_bytes(162, 162), None, options, None).unwrap();

        assert!(!image.within_budget());
        assert_eq!(image.palette_size(), 32);
    }
}
