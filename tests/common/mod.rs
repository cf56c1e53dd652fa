/*!
 * Common test utilities for the subshift test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;
use subshift::app_config::{Config, StorageConfig};

/// A short three-caption subtitle document
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT.as_bytes())
}

/// Configuration whose storage directories live inside `root`
pub fn config_in(root: &Path) -> Config {
    Config {
        storage: StorageConfig {
            upload_dir: root.join("uploads"),
            shifted_dir: root.join("shifted"),
            ..StorageConfig::default()
        },
        ..Config::default()
    }
}
