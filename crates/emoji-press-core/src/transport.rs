//! HTTP-style response shaping for a single uploaded image.
//!
//! The server front end parses a multipart form into an [`Upload`] and hands
//! it to [`handle_upload`]; this module decides the status code and JSON body.
//! No socket or framework code lives here.

use serde_json::{json, Value};

use crate::decode::{MediaType, SourceImage};
use crate::encode::PaletteEncoder;
use crate::error::CompressError;
use crate::pipeline::Compressor;

/// Multipart form field the server reads the image from.
pub const FORM_FIELD: &str = "file";

/// One file received from the form field [`FORM_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    /// Declared content type, if the client sent one.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.map(str::to_string),
            bytes,
        }
    }
}

/// Status code and JSON body to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    fn error(status: u16, error: &str) -> Self {
        Self {
            status,
            body: json!({ "error": error }),
        }
    }

    fn error_with_details(status: u16, error: &str, details: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": error, "details": details.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Compress an uploaded image and shape the response.
///
/// | Case                         | Status |
/// |------------------------------|--------|
/// | method other than POST       | 405    |
/// | no file, or an empty file    | 400    |
/// | unreadable image             | 400    |
/// | nothing fits the byte budget | 400    |
/// | encoder or settings failure  | 500    |
/// | success                      | 200    |
pub fn handle_upload<E: PaletteEncoder>(
    compressor: &Compressor<E>,
    method: &str,
    upload: Option<Upload>,
) -> TransportResponse {
    if !method.eq_ignore_ascii_case("POST") {
        return TransportResponse::error(405, "Method not allowed");
    }

    let upload = match upload {
        Some(upload) if !upload.bytes.is_empty() => upload,
        _ => return TransportResponse::error(400, "No image file provided"),
    };

    let media_type = upload.media_type.as_deref().and_then(MediaType::from_mime);
    let source = SourceImage::new(upload.bytes, media_type);

    let image = match compressor.compress(&source, None) {
        Ok(image) => image,
        Err(e) => {
            log::error!("{}: {}", upload.file_name, e);
            return error_response(&e);
        }
    };

    if image.exceeds_budget() {
        return TransportResponse::error_with_details(
            400,
            "Unable to compress image below the size limit",
            format!(
                "Smallest result was {:.2}KB with {} colors",
                image.size() as f64 / 1024.0,
                image.palette_size()
            ),
        );
    }

    let summary = image.summary();
    TransportResponse {
        status: 200,
        body: json!({
            "success": true,
            "data": {
                "base64": image.to_base64(),
                "originalSize": summary.original_size,
                "compressedSize": summary.compressed_size,
                "compressionRatio": summary.compression_ratio,
                "fileName": upload.file_name,
                "config": summary.config,
            }
        }),
    }
}

fn error_response(e: &CompressError) -> TransportResponse {
    let status = if e.is_input_error() { 400 } else { 500 };
    let error = if e.is_input_error() {
        "Invalid image"
    } else {
        "Failed to compress image"
    };
    TransportResponse::error_with_details(status, error, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{CompressionConfig, EncodeError};
    use crate::fixtures::{encode_fixture, flat, gradient, noise};
    use crate::pipeline::CompressOptions;
    use crate::decode::PixelBuffer;
    use base64::Engine as _;
    use image::ImageFormat;

    struct BrokenEncoder;

    impl PaletteEncoder for BrokenEncoder {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn encode(&self, _: &PixelBuffer, _: &CompressionConfig) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError::Quantization("quality too low".into()))
        }
    }

    fn png_upload(name: &str) -> Upload {
        let bytes = encode_fixture(&flat(64, 64, [250, 200, 20, 255]), ImageFormat::Png);
        Upload::new(name, Some("image/png"), bytes)
    }

    #[test]
    fn test_success_response() {
        let upload = png_upload("party.png");
        let original_size = upload.bytes.len();

        let response = handle_upload(&Compressor::new(), "POST", Some(upload));
        assert_eq!(response.status, 200);
        assert!(response.is_success());

        let data = &response.body["data"];
        assert_eq!(response.body["success"], true);
        assert_eq!(data["fileName"], "party.png");
        assert_eq!(data["originalSize"], original_size);
        assert_eq!(data["config"]["paletteSize"], 256);

        let ratio = data["compressionRatio"].as_str().unwrap();
        assert!(ratio.ends_with('%'));

        let png = base64::engine::general_purpose::STANDARD
            .decode(data["base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(data["compressedSize"], png.len());
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (162, 162));
    }

    #[test]
    fn test_form_field_name() {
        assert_eq!(FORM_FIELD, "file");
    }

    #[test]
    fn test_method_not_allowed() {
        let response = handle_upload(&Compressor::new(), "GET", Some(png_upload("a.png")));
        assert_eq!(response.status, 405);
        assert_eq!(response.body["error"], "Method not allowed");
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let response = handle_upload(&Compressor::new(), "post", Some(png_upload("a.png")));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_missing_or_empty_file() {
        let compressor = Compressor::new();

        let response = handle_upload(&compressor, "POST", None);
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "No image file provided");

        let empty = Upload::new("empty.png", Some("image/png"), Vec::new());
        assert_eq!(handle_upload(&compressor, "POST", Some(empty)).status, 400);
    }

    #[test]
    fn test_corrupt_image_is_bad_request() {
        let bytes = encode_fixture(&gradient(40, 40), ImageFormat::Png);
        let upload = Upload::new("cut.png", Some("image/png"), bytes[..30].to_vec());

        let response = handle_upload(&Compressor::new(), "POST", Some(upload));
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "Invalid image");
        assert!(response.body["details"].as_str().is_some());
    }

    #[test]
    fn test_over_budget_is_bad_request() {
        let options = CompressOptions {
            byte_budget: 256,
            ..CompressOptions::default()
        };
        let bytes = encode_fixture(&noise(200, 200, 3), ImageFormat::Png);
        let upload = Upload::new("noise.png", Some("image/png"), bytes);

        let response = handle_upload(&Compressor::with_options(options), "POST", Some(upload));
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body["error"],
            "Unable to compress image below the size limit"
        );
        assert!(response.body["details"]
            .as_str()
            .unwrap()
            .contains("32 colors"));
    }

    #[test]
    fn test_encoder_failure_is_server_error() {
        let compressor = Compressor::with_encoder(BrokenEncoder, CompressOptions::default());
        let response = handle_upload(&compressor, "POST", Some(png_upload("a.png")));

        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"], "Failed to compress image");
    }

    #[test]
    fn test_unknown_declared_type_is_sniffed() {
        let bytes = encode_fixture(&flat(20, 20, [0, 0, 0, 255]), ImageFormat::Png);
        let upload = Upload::new("blob", Some("application/octet-stream"), bytes);

        assert_eq!(handle_upload(&Compressor::new(), "POST", Some(upload)).status, 200);
    }
}
