//! Caller-facing packaging of a finished compression.
//!
//! Nothing here touches the encoded bytes; it only exposes them in the forms
//! callers need (raw bytes for downloads, base64 and data URLs for text
//! transports) alongside the size bookkeeping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::encode::CompressionConfig;
use crate::search::SearchOutcome;
use crate::PLATFORM_LIMIT;

/// A finished 162x162 PNG plus its size metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    bytes: Vec<u8>,
    original_size: usize,
    dimensions: (u32, u32),
    config: CompressionConfig,
    config_index: usize,
    budget: usize,
    within_budget: bool,
}

impl CompressedImage {
    /// Package a search outcome for an input of `original_size` bytes.
    pub fn from_outcome(
        outcome: SearchOutcome,
        original_size: usize,
        dimensions: (u32, u32),
        budget: usize,
    ) -> Self {
        Self {
            bytes: outcome.artifact.bytes,
            original_size,
            dimensions,
            config: outcome.config,
            config_index: outcome.config_index,
            budget,
            within_budget: outcome.within_budget,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size of the submitted file in bytes.
    pub fn original_size(&self) -> usize {
        self.original_size
    }

    /// Canvas width and height.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Position of the used config in the ladder.
    pub fn config_index(&self) -> usize {
        self.config_index
    }

    pub fn palette_size(&self) -> u32 {
        self.config.palette_size
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn within_budget(&self) -> bool {
        self.within_budget
    }

    pub fn exceeds_budget(&self) -> bool {
        !self.within_budget
    }

    /// Over the platform's hard 16KB limit, not just the safety budget.
    pub fn exceeds_platform_limit(&self) -> bool {
        self.size() > PLATFORM_LIMIT
    }

    /// Percentage of the original size saved; negative when the output grew.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.size() as f64 / self.original_size as f64) * 100.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/png;base64,...` for inline display.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }

    /// Serializable description, without the bytes.
    pub fn summary(&self) -> CompressionSummary {
        CompressionSummary {
            original_size: self.original_size,
            compressed_size: self.size(),
            compression_ratio: format!("{:.2}%", self.compression_ratio()),
            width: self.dimensions.0,
            height: self.dimensions.1,
            palette_size: self.palette_size(),
            within_budget: self.within_budget,
            config: self.config,
        }
    }
}

/// JSON-friendly metadata for a [`CompressedImage`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub original_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: String,
    pub width: u32,
    pub height: u32,
    pub palette_size: u32,
    pub within_budget: bool,
    pub config: CompressionConfig,
}
