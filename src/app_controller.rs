use anyhow::{Result, Context, anyhow};
use log::{info, warn, debug};
use std::path::{Path, PathBuf};
use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::storage::{Attachment, StorageService};
use crate::subtitle_shifter::{ShiftReport, ShiftValue, SubtitleShifter};

// @module: Application controller for subtitle shifting

/// Result of one successful shift request
#[derive(Debug, Clone)]
pub struct ShiftOutcome {
    /// The stored upload the shift was read from
    pub attachment: Attachment,
    /// Where the shifted subtitles were written
    pub output_path: PathBuf,
    /// Line counts and encoding of the pass
    pub report: ShiftReport,
}

/// Main application controller for subtitle shifting
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Upload and output placement
    storage: StorageService,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()
            .context("Configuration validation failed")?;

        let storage = StorageService::new(config.storage.clone());
        Ok(Self { config, storage })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shift the subtitle file at `input_file` by `timeshift` milliseconds.
    ///
    /// Returns `None` when the output already exists and `force_overwrite` is off.
    pub fn run(&self, input_file: &Path, timeshift: &str, force_overwrite: bool) -> Result<Option<ShiftOutcome>> {
        // Reject a malformed delta before touching any file
        let delta = ShiftValue::parse(timeshift)?;

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let file_name = FileManager::file_name(input_file)?;
        let content = FileManager::read_bytes(input_file)?;

        self.shift_upload(&file_name, &content, &delta, force_overwrite)
    }

    /// Store an uploaded subtitle file and shift it into the shifted directory
    pub fn handle_upload(&self, file_name: &str, content: &[u8], timeshift: &str, force_overwrite: bool) -> Result<Option<ShiftOutcome>> {
        let delta = ShiftValue::parse(timeshift)?;
        self.shift_upload(file_name, content, &delta, force_overwrite)
    }

    fn shift_upload(&self, file_name: &str, content: &[u8], delta: &ShiftValue, force_overwrite: bool) -> Result<Option<ShiftOutcome>> {
        let start_time = std::time::Instant::now();

        // Name and extension are checked before any directory is created
        let file_name = self.storage.validate_upload(file_name, content)?;

        let output_path = self.storage.output_path(&file_name, delta.as_str())?;
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, {:?} already exists (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        let attachment = self.storage.store(&file_name, content)?;
        debug!("Stored upload: {:?}", attachment);

        let shifter = SubtitleShifter::new(self.config.encoding_detector()?, self.config.shift.options);
        let report = shifter
            .shift_file(&attachment.filepath, &output_path, delta)
            .with_context(|| format!("Failed to shift {}", attachment.original_file_name))?;

        info!(
            "Shifted {} time lines of {} by {} ms ({}) in {:.2?}: {}",
            report.shifted_lines,
            attachment.original_file_name,
            delta.millis(),
            report.encoding,
            start_time.elapsed(),
            output_path.display()
        );

        Ok(Some(ShiftOutcome {
            attachment,
            output_path,
            report,
        }))
    }
}
