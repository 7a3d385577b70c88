//! The end-to-end compression pipeline: load, normalize, search, package.
//!
//! Each call owns its buffers and runs the four stages strictly in order.
//! Nothing is shared between calls, so independent images can be compressed
//! from separate threads or workers with separate [`Compressor`] references.

use serde::{Deserialize, Serialize};

use crate::canvas::{normalize_to_canvas, MAX_TARGET_SIZE};
use crate::decode::{load_image, FilterType, SourceImage};
use crate::encode::{CompressionConfig, PaletteEncoder, QuantizeEncoder, DEFAULT_LADDER};
use crate::error::CompressError;
use crate::package::CompressedImage;
use crate::search::PaletteSearch;
use crate::{MAX_FILE_SIZE, TARGET_SIZE};

/// Per-call tuning for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressOptions {
    /// Canvas edge length in pixels.
    pub target_size: u32,
    /// Accept the first encoding at or under this many bytes.
    pub byte_budget: usize,
    /// Configs to try, largest palette first.
    pub ladder: Vec<CompressionConfig>,
    /// Resampling filter for the canvas fit.
    pub filter: FilterType,
    /// Dithering level for the in-memory encoder (0.0-1.0).
    pub dithering: f32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            target_size: TARGET_SIZE,
            byte_budget: MAX_FILE_SIZE,
            ladder: DEFAULT_LADDER.to_vec(),
            filter: FilterType::Bilinear,
            dithering: 1.0,
        }
    }
}

impl CompressOptions {
    /// Reject options that would fail or exhaust memory before any decoding.
    ///
    /// The ladder itself is checked by the palette search.
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.target_size == 0 || self.target_size > MAX_TARGET_SIZE {
            return Err(CompressError::InvalidConfig(format!(
                "Canvas size must be between 1 and {}, got {}",
                MAX_TARGET_SIZE, self.target_size
            )));
        }
        Ok(())
    }
}

/// Coarse progress milestones, in percent.
pub mod progress {
    pub const LOADING: u8 = 10;
    pub const RESIZING: u8 = 30;
    pub const SEARCHING: u8 = 50;
    pub const SEARCHED: u8 = 80;
    pub const PACKAGING: u8 = 90;
    pub const DONE: u8 = 100;
}

/// Forwards progress to an optional observer, clamped to 0-100 and never
/// going backwards.
struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn FnMut(u8)>,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    fn new(sink: Option<&'a mut dyn FnMut(u8)>) -> Self {
        Self { sink, last: 0 }
    }

    fn report(&mut self, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        if let Some(sink) = self.sink.as_mut() {
            sink(percent);
        }
    }
}

/// Runs the pipeline with a fixed encoder backend and options.
#[derive(Debug, Clone)]
pub struct Compressor<E = QuantizeEncoder> {
    encoder: E,
    options: CompressOptions,
}

impl Compressor<QuantizeEncoder> {
    /// In-memory backend with default options.
    pub fn new() -> Self {
        Self::with_options(CompressOptions::default())
    }

    /// In-memory backend; its dithering level comes from `options`.
    pub fn with_options(options: CompressOptions) -> Self {
        Self {
            encoder: QuantizeEncoder::new(options.dithering),
            options,
        }
    }
}

impl Default for Compressor<QuantizeEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PaletteEncoder> Compressor<E> {
    /// Any backend, e.g. [`PngquantEncoder`](crate::encode::PngquantEncoder).
    pub fn with_encoder(encoder: E, options: CompressOptions) -> Self {
        Self { encoder, options }
    }

    pub fn options(&self) -> &CompressOptions {
        &self.options
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Compress one image.
    ///
    /// `progress`, when given, receives non-decreasing percentages at the
    /// milestones in [`progress`]. It is purely informational.
    ///
    /// # Errors
    ///
    /// `CompressError::Decode` for unreadable input, `InvalidImage` for
    /// degenerate dimensions, `InvalidConfig` for unusable options and
    /// `Encoding` when every ladder step failed in the encoder. A result over
    /// the byte budget is returned as `Ok` with `within_budget() == false`.
    pub fn compress(
        &self,
        source: &SourceImage,
        progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<CompressedImage, CompressError> {
        self.options.validate()?;
        let mut progress = ProgressReporter::new(progress);
        let target = self.options.target_size;

        progress.report(progress::LOADING);
        let decoded = load_image(source)?;

        progress.report(progress::RESIZING);
        let canvas = normalize_to_canvas(&decoded, target, self.options.filter)?;
        drop(decoded);

        progress.report(progress::SEARCHING);
        let outcome = PaletteSearch::new(self.options.byte_budget).run(
            &canvas,
            &self.options.ladder,
            &self.encoder,
        )?;
        progress.report(progress::SEARCHED);

        if outcome.within_budget {
            log::info!(
                "compressed {} bytes to {} bytes with {} colors",
                source.len(),
                outcome.artifact.byte_length(),
                outcome.config.palette_size
            );
        } else {
            log::warn!(
                "result exceeds the {} byte budget: {:.2}KB with {} colors",
                self.options.byte_budget,
                outcome.artifact.byte_length() as f64 / 1024.0,
                outcome.config.palette_size
            );
        }

        progress.report(progress::PACKAGING);
        let image = CompressedImage::from_outcome(
            outcome,
            source.len(),
            (canvas.width, canvas.height),
            self.options.byte_budget,
        );
        progress.report(progress::DONE);

        Ok(image)
    }

    /// Compress several named images independently.
    ///
    /// A failure is recorded against its own entry and never stops the rest
    /// of the batch. Entries keep the input order.
    pub fn compress_batch<I, S>(&self, items: I) -> BatchReport
    where
        I: IntoIterator<Item = (S, SourceImage)>,
        S: Into<String>,
    {
        let entries = items
            .into_iter()
            .map(|(name, source)| {
                let name = name.into();
                let result = self.compress(&source, None);
                if let Err(e) = &result {
                    log::warn!("{}: {}", name, e);
                }
                BatchEntry {
                    name,
                    original_size: source.len(),
                    result,
                }
            })
            .collect();

        BatchReport { entries }
    }
}

/// Compress with the default in-memory pipeline.
///
/// `media_type` is the declared MIME type, if any; unknown types are ignored
/// and the format is sniffed from the bytes.
pub fn compress(
    bytes: &[u8],
    media_type: Option<&str>,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<CompressedImage, CompressError> {
    let source = SourceImage::with_mime(bytes.to_vec(), media_type);
    Compressor::new().compress(&source, progress)
}

/// Outcome category for one batch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Success,
    OverBudget,
    Failed,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub name: String,
    pub original_size: usize,
    pub result: Result<CompressedImage, CompressError>,
}

impl BatchEntry {
    pub fn status(&self) -> EntryStatus {
        match &self.result {
            Ok(image) if image.within_budget() => EntryStatus::Success,
            Ok(_) => EntryStatus::OverBudget,
            Err(_) => EntryStatus::Failed,
        }
    }
}

/// Per-image results of [`Compressor::compress_batch`].
#[derive(Debug)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &BatchEntry> {
        self.with_status(EntryStatus::Success)
    }

    pub fn over_budget(&self) -> impl Iterator<Item = &BatchEntry> {
        self.with_status(EntryStatus::OverBudget)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchEntry> {
        self.with_status(EntryStatus::Failed)
    }

    fn with_status(&self, status: EntryStatus) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(move |e| e.status() == status)
    }
}
