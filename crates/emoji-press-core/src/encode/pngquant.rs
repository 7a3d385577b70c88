//! Out-of-process palette encoder driving the `pngquant` command-line tool.
//!
//! Each attempt marshals the canvas through two scratch files: an RGBA PNG
//! input and the quantized output. Both are `NamedTempFile` guards, so they
//! are removed when the attempt returns, whether pngquant succeeded, failed
//! its quality floor, crashed, or could not be spawned at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;

use super::{write_rgba_png, CompressionConfig, EncodeError, PaletteEncoder};
use crate::decode::PixelBuffer;

const BINARY_NAME: &str = "pngquant";

/// Palette encoder that shells out to a `pngquant` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngquantEncoder {
    binary: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl PngquantEncoder {
    /// Use the binary at `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scratch_dir: None,
        }
    }

    /// Find `pngquant` on `PATH`.
    pub fn locate() -> Result<Self, EncodeError> {
        which::which(BINARY_NAME)
            .map(Self::new)
            .map_err(|_| EncodeError::ToolNotFound(BINARY_NAME))
    }

    /// Place scratch files in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn scratch_file(&self, prefix: &str) -> Result<NamedTempFile, EncodeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(".png");
        let file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

/// Command-line arguments for one attempt, in pngquant's expected order.
fn build_args(config: &CompressionConfig, input: &Path, output: &Path) -> Vec<String> {
    let mut args = vec!["--force".to_string()];
    if let Some(q) = config.quality {
        args.push("--quality".to_string());
        args.push(q.to_string());
    }
    if let Some(speed) = config.speed {
        args.push("--speed".to_string());
        args.push(speed.to_string());
    }
    args.push("--floyd=1".to_string());
    args.push(config.palette_size.to_string());
    args.push("--output".to_string());
    args.push(output.display().to_string());
    args.push(input.display().to_string());
    args
}

impl PaletteEncoder for PngquantEncoder {
    fn name(&self) -> &'static str {
        BINARY_NAME
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        config: &CompressionConfig,
    ) -> Result<Vec<u8>, EncodeError> {
        config.validate()?;
        let input_png = write_rgba_png(image)?;

        let input = self.scratch_file("input-")?;
        fs::write(input.path(), &input_png)?;
        let output = self.scratch_file("output-")?;

        let result = Command::new(&self.binary)
            .args(build_args(config, input.path(), output.path()))
            .output()?;

        if !result.status.success() {
            let status = match result.status.code() {
                Some(code) => format!("status {}", code),
                None => "a signal".to_string(),
            };
            return Err(EncodeError::ExternalTool {
                status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = fs::read(output.path())?;
        if bytes.is_empty() {
            return Err(EncodeError::ExternalTool {
                status: "status 0".to_string(),
                stderr: "empty output".to_string(),
            });
        }
        Ok(bytes)
    }
}
