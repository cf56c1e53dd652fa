use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use crate::file_utils::FileManager;
use crate::encoding::ChardetDetector;
use crate::subtitle_shifter::ShiftOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Upload and output directories
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shifting behavior
    #[serde(default)]
    pub shift: ShiftConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Where uploads are kept and shifted files are written
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Directory uploaded subtitle files are saved to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory shifted subtitle files are written to
    #[serde(default = "default_shifted_dir")]
    pub shifted_dir: PathBuf,

    /// The only accepted file extension, with its leading dot
    #[serde(default = "default_valid_extension")]
    pub valid_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            shifted_dir: default_shifted_dir(),
            valid_extension: default_valid_extension(),
        }
    }
}

/// Settings of the shift pass
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShiftConfig {
    /// Negative-time policy and line terminator
    #[serde(flatten)]
    pub options: ShiftOptions,

    /// WHATWG label of the encoding used when detection is not confident
    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: String,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            options: ShiftOptions::default(),
            fallback_encoding: default_fallback_encoding(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_shifted_dir() -> PathBuf {
    PathBuf::from("shifted")
}

fn default_valid_extension() -> String {
    ".srt".to_string()
}

fn default_fallback_encoding() -> String {
    "utf-8".to_string()
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", config_path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        FileManager::write_to_file(config_path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(anyhow!("Upload directory must not be empty"));
        }

        if self.storage.shifted_dir.as_os_str().is_empty() {
            return Err(anyhow!("Shifted directory must not be empty"));
        }

        let extension = &self.storage.valid_extension;
        if extension.len() < 2 || !extension.starts_with('.') || extension[1..].contains('.') {
            return Err(anyhow!("Invalid file extension in configuration: {:?}", extension));
        }

        self.encoding_detector()?;

        Ok(())
    }

    /// Encoding detector honoring the configured fallback
    pub fn encoding_detector(&self) -> Result<ChardetDetector> {
        ChardetDetector::from_label(&self.shift.fallback_encoding)
            .map_err(|e| anyhow!("Invalid fallback encoding: {}", e))
    }
}
