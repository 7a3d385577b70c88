//! Compression configs and the compiled-in palette ladders.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EncodeError;

/// Quantization quality bounds (0-100), as understood by imagequant and pngquant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRange {
    pub min: u8,
    pub max: u8,
}

impl fmt::Display for QualityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One step of the quality ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionConfig {
    /// Maximum number of palette entries (2-256).
    pub palette_size: u32,
    /// Optional quality range; the encoder fails the attempt if it cannot reach `min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityRange>,
    /// Optional speed/quality trade-off (1 = slowest, best; 10 = fastest).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
}

impl CompressionConfig {
    pub const fn new(palette_size: u32) -> Self {
        Self {
            palette_size,
            quality: None,
            speed: None,
        }
    }

    pub const fn with_quality(mut self, min: u8, max: u8) -> Self {
        self.quality = Some(QualityRange { min, max });
        self
    }

    pub const fn with_speed(mut self, speed: u8) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Check the values against what both encoder backends accept.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if !(2..=256).contains(&self.palette_size) {
            return Err(EncodeError::InvalidConfig(format!(
                "palette size {} outside 2-256",
                self.palette_size
            )));
        }
        if let Some(q) = self.quality {
            if q.min > q.max || q.max > 100 {
                return Err(EncodeError::InvalidConfig(format!(
                    "quality range {} outside 0-100 or reversed",
                    q
                )));
            }
        }
        if let Some(speed) = self.speed {
            if !(1..=10).contains(&speed) {
                return Err(EncodeError::InvalidConfig(format!(
                    "speed {} outside 1-10",
                    speed
                )));
            }
        }
        Ok(())
    }
}

/// Palette sizes tried by the in-process pipeline, best quality first.
pub const DEFAULT_LADDER: &[CompressionConfig] = &[
    CompressionConfig::new(256),
    CompressionConfig::new(192),
    CompressionConfig::new(128),
    CompressionConfig::new(96),
    CompressionConfig::new(64),
    CompressionConfig::new(48),
    CompressionConfig::new(32),
];

/// Ladder for the pngquant backend, with per-step quality floors.
pub const PNGQUANT_LADDER: &[CompressionConfig] = &[
    CompressionConfig::new(256).with_quality(90, 100).with_speed(1),
    CompressionConfig::new(192).with_quality(85, 95).with_speed(1),
    CompressionConfig::new(128).with_quality(80, 90).with_speed(1),
    CompressionConfig::new(96).with_quality(75, 85).with_speed(1),
    CompressionConfig::new(64).with_quality(70, 80).with_speed(1),
    CompressionConfig::new(32).with_quality(65, 75).with_speed(1),
];
