//! Pipeline-level error type.

use serde::Serialize;
use thiserror::Error;

use crate::canvas::CanvasError;
use crate::decode::DecodeError;
use crate::search::SearchError;

/// Why a single image could not be compressed.
///
/// Exceeding the byte budget is not an error; see
/// [`CompressedImage::within_budget`](crate::package::CompressedImage::within_budget).
#[derive(Debug, Error)]
pub enum CompressError {
    /// Unreadable or unsupported input.
    #[error("Failed to load image: {0}")]
    Decode(#[from] DecodeError),

    /// Decoded image with zero or degenerate dimensions.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    /// Options or ladder that no encoder can run.
    #[error("Invalid compression settings: {0}")]
    InvalidConfig(String),

    /// Every palette attempt failed inside the encoder.
    #[error("Compression failed: {0}")]
    Encoding(String),
}

/// Machine-checkable category of a [`CompressError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    InvalidImage,
    InvalidConfig,
    Encoding,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::InvalidImage => "invalid_image",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Encoding => "encoding",
        }
    }
}

impl CompressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompressError::Decode(_) => ErrorKind::Decode,
            CompressError::InvalidImage { .. } => ErrorKind::InvalidImage,
            CompressError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            CompressError::Encoding(_) => ErrorKind::Encoding,
        }
    }

    /// True for problems with the submitted image rather than the compressor.
    pub fn is_input_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Decode | ErrorKind::InvalidImage)
    }
}

impl From<CanvasError> for CompressError {
    fn from(e: CanvasError) -> Self {
        match e {
            CanvasError::InvalidImage { width, height } => {
                CompressError::InvalidImage { width, height }
            }
            CanvasError::InvalidTarget(_) => CompressError::InvalidConfig(e.to_string()),
        }
    }
}

impl From<SearchError> for CompressError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidLadder(msg) => CompressError::InvalidConfig(msg),
            SearchError::AllAttemptsFailed { .. } => CompressError::Encoding(e.to_string()),
        }
    }
}
