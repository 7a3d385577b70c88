//! Emoji Press WASM - WebAssembly bindings for Emoji Press
//!
//! This crate exposes the emoji-press-core pipeline to JavaScript/TypeScript.
//! Only the in-memory encoder is compiled in; everything runs in the page or
//! a worker without a server round trip.
//!
//! # Module Structure
//!
//! - `compress` - Compression entry points and option handling
//! - `types` - WASM-compatible wrapper for the compressed PNG
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@emoji-press/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const emoji = compress_image(bytes, file.type);
//! console.log(`${emoji.size} bytes, ${emoji.palette_size} colors`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

pub use compress::{compress_image, compress_image_with_options, default_options};
pub use types::JsCompressedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
