//! Palette search: walk the quality ladder until an encoding fits the budget.
//!
//! The search is greedy. Configs are tried in ladder order (largest palette
//! first) and the first result at or under the byte budget wins. When no
//! config fits, the artifact of the last config that encoded successfully is
//! returned with `within_budget == false` instead of failing; only a ladder on
//! which every attempt errored is a hard failure.

use thiserror::Error;

use crate::decode::PixelBuffer;
use crate::encode::{CompressionConfig, EncodeError, PaletteEncoder};

/// Errors from the palette search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The ladder is empty, unordered, or holds an unusable config.
    #[error("Invalid compression ladder: {0}")]
    InvalidLadder(String),

    /// Every config in the ladder failed inside the encoder.
    #[error("All {attempts} compression attempts failed; last error: {last}")]
    AllAttemptsFailed { attempts: usize, last: EncodeError },
}

/// Encoded PNG bytes plus the palette size that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub palette_size: u32,
}

impl EncodedArtifact {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// What happened at one ladder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// Encoded to this many bytes.
    Encoded(usize),
    /// The encoder failed with this message.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAttempt {
    pub config: CompressionConfig,
    pub result: AttemptResult,
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub artifact: EncodedArtifact,
    /// Config that produced `artifact`.
    pub config: CompressionConfig,
    /// Position of `config` in the ladder.
    pub config_index: usize,
    /// False when no config fit and this is the best-effort fallback.
    pub within_budget: bool,
    /// Every attempt made, in order.
    pub attempts: Vec<SearchAttempt>,
}

/// Greedy search over a descending palette ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSearch {
    budget: usize,
}

impl PaletteSearch {
    /// Search against a byte budget (results `<= budget` are accepted).
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Run the search over `ladder` with `encoder`.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidLadder` if the ladder fails [`validate_ladder`];
    /// `SearchError::AllAttemptsFailed` if no config could be encoded at all.
    pub fn run<E: PaletteEncoder + ?Sized>(
        &self,
        canvas: &PixelBuffer,
        ladder: &[CompressionConfig],
        encoder: &E,
    ) -> Result<SearchOutcome, SearchError> {
        validate_ladder(ladder)?;

        let mut attempts = Vec::with_capacity(ladder.len());
        let mut fallback: Option<(usize, EncodedArtifact)> = None;
        let mut last_error = None;

        for (index, config) in ladder.iter().enumerate() {
            match encoder.encode(canvas, config) {
                Ok(bytes) => {
                    let size = bytes.len();
                    log::debug!(
                        "{}: {} colors -> {} bytes (budget {})",
                        encoder.name(),
                        config.palette_size,
                        size,
                        self.budget
                    );
                    attempts.push(SearchAttempt {
                        config: *config,
                        result: AttemptResult::Encoded(size),
                    });

                    let artifact = EncodedArtifact {
                        bytes,
                        palette_size: config.palette_size,
                    };
                    if size <= self.budget {
                        return Ok(SearchOutcome {
                            artifact,
                            config: *config,
                            config_index: index,
                            within_budget: true,
                            attempts,
                        });
                    }
                    fallback = Some((index, artifact));
                }
                Err(e) => {
                    log::warn!(
                        "{}: {} colors failed: {}",
                        encoder.name(),
                        config.palette_size,
                        e
                    );
                    attempts.push(SearchAttempt {
                        config: *config,
                        result: AttemptResult::Failed(e.to_string()),
                    });
                    last_error = Some(e);
                }
            }
        }

        match (fallback, last_error) {
            (Some((index, artifact)), _) => {
                log::warn!(
                    "no config fits {} bytes; keeping {} colors at {} bytes",
                    self.budget,
                    artifact.palette_size,
                    artifact.byte_length()
                );
                Ok(SearchOutcome {
                    config: ladder[index],
                    config_index: index,
                    artifact,
                    within_budget: false,
                    attempts,
                })
            }
            (None, Some(last)) => Err(SearchError::AllAttemptsFailed {
                attempts: attempts.len(),
                last,
            }),
            // validate_ladder guarantees at least one attempt
            (None, None) => Err(SearchError::InvalidLadder("ladder is empty".to_string())),
        }
    }
}

/// Check that a ladder is non-empty, valid per config, and strictly descending.
pub fn validate_ladder(ladder: &[CompressionConfig]) -> Result<(), SearchError> {
    if ladder.is_empty() {
        return Err(SearchError::InvalidLadder("ladder is empty".to_string()));
    }
    for (index, config) in ladder.iter().enumerate() {
        config
            .validate()
            .map_err(|e| SearchError::InvalidLadder(format!("step {}: {}", index, e)))?;
    }
    if let Some(index) = ladder
        .windows(2)
        .position(|pair| pair[1].palette_size >= pair[0].palette_size)
    {
        return Err(SearchError::InvalidLadder(format!(
            "palette sizes must strictly decrease (step {}: {} -> {})",
            index + 1,
            ladder[index].palette_size,
            ladder[index + 1].palette_size
        )));
    }
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
