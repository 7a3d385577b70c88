//! Decoding of user-supplied image bytes into RGBA pixel buffers.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, MediaType, Orientation, PixelBuffer, SourceImage};

/// Decode a source image into an RGBA pixel buffer.
///
/// The format is sniffed from the leading bytes; the declared media type is
/// only consulted when sniffing fails. GIF input yields its first frame and
/// JPEG input has its EXIF orientation applied, matching what a browser
/// would render.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for zero-length input,
/// `DecodeError::UnsupportedFormat` when no supported format can be
/// determined, and `DecodeError::CorruptedFile` when the bytes fail to decode.
pub fn load_image(source: &SourceImage) -> Result<PixelBuffer, DecodeError> {
    let bytes = source.bytes.as_slice();
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = resolve_format(bytes, source.media_type).ok_or(DecodeError::UnsupportedFormat)?;
    let img = decode_as(bytes, format)?;

    let img = match format {
        MediaType::Jpeg => apply_orientation(img, extract_orientation(bytes)),
        _ => img,
    };

    Ok(PixelBuffer::from_rgba_image(img.into_rgba8()))
}

/// Pick the format to decode with: magic bytes first, then the declared type.
pub fn resolve_format(bytes: &[u8], declared: Option<MediaType>) -> Option<MediaType> {
    MediaType::sniff(bytes).or(declared)
}

fn decode_as(bytes: &[u8], format: MediaType) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::with_format(Cursor::new(bytes), format.to_image_format());
    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Extract EXIF orientation from JPEG bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
