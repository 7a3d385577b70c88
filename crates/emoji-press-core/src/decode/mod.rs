//! Image loading for the compression pipeline.
//!
//! This module turns caller-supplied bytes into an RGBA [`PixelBuffer`]:
//! - PNG, JPEG, GIF (first frame) and WebP inputs
//! - Format sniffing from magic bytes, with the declared MIME type as fallback
//! - EXIF orientation correction for JPEG
//!
//! # Examples
//!
//! ```ignore
//! use emoji_press_core::decode::{load_image, SourceImage};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let source = SourceImage::with_mime(bytes, Some("image/jpeg"));
//! let image = load_image(&source).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod loader;
mod types;

pub use loader::{load_image, resolve_format};
pub use types::{DecodeError, FilterType, MediaType, Orientation, PixelBuffer, SourceImage};
