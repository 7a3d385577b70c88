//! WASM-compatible wrapper types for compression results.

use emoji_press_core::CompressedImage;
use wasm_bindgen::prelude::*;

/// A compressed emoji PNG for JavaScript.
///
/// The PNG stays in WASM memory; `bytes()`, `base64()` and `data_url()` each
/// make a copy on the JavaScript side.
#[wasm_bindgen]
pub struct JsCompressedImage {
    inner: CompressedImage,
}

impl JsCompressedImage {
    pub(crate) fn new(inner: CompressedImage) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &CompressedImage {
        &self.inner
    }
}

#[wasm_bindgen]
impl JsCompressedImage {
    /// Size of the PNG in bytes
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Size of the submitted file in bytes
    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> usize {
        self.inner.original_size()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.dimensions().0
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.dimensions().1
    }

    /// Palette size of the config that produced this PNG
    #[wasm_bindgen(getter)]
    pub fn palette_size(&self) -> u32 {
        self.inner.palette_size()
    }

    #[wasm_bindgen(getter)]
    pub fn within_budget(&self) -> bool {
        self.inner.within_budget()
    }

    /// True when the PNG would be rejected by the platform outright.
    #[wasm_bindgen(getter)]
    pub fn exceeds_platform_limit(&self) -> bool {
        self.inner.exceeds_platform_limit()
    }

    /// Percent of the original size saved.
    #[wasm_bindgen(getter)]
    pub fn compression_ratio(&self) -> f64 {
        self.inner.compression_ratio()
    }

    /// PNG bytes as a `Uint8Array`.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes().to_vec()
    }

    pub fn base64(&self) -> String {
        self.inner.to_base64()
    }

    /// `data:image/png;base64,...`, ready for an `<img src>`.
    pub fn data_url(&self) -> String {
        self.inner.to_data_url()
    }
}
