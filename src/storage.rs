/*!
 * Storage of uploaded subtitle files and placement of shifted outputs.
 *
 * Uploads are saved under a UUID-prefixed name in the upload directory;
 * shifted files go to the shifted directory under a name that records the
 * applied timeshift (`movie.srt` + `-500` gives `movie_-500.srt`).
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::{error, info};
use uuid::Uuid;
use crate::app_config::StorageConfig;
use crate::errors::StorageError;
use crate::file_utils::FileManager;

/// Length of the UUID prefix put in front of saved upload names
const SAVED_NAME_PREFIX_LEN: usize = 10;

/// Metadata of a stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name the file was uploaded with
    pub original_file_name: String,
    /// Identifier generated for this upload
    pub uuid: Uuid,
    /// Name of the file inside the upload directory
    pub saved_name: String,
    /// Extension including the leading dot, e.g. ".srt"
    pub extension: String,
    /// Full path of the saved file
    pub filepath: PathBuf,
}

/// Manages the upload and shifted directories
#[derive(Debug, Clone)]
pub struct StorageService {
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Reduce an upload name to its final component and check it against the
    /// configured extension. Nothing is created on disk.
    pub fn validate_upload(&self, original_file_name: &str, content: &[u8]) -> Result<String, StorageError> {
        let file_name = Path::new(original_file_name)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        if file_name.is_empty() || content.is_empty() {
            error!("Failed to store null or empty file: {:?}", original_file_name);
            return Err(StorageError::EmptyUpload(file_name));
        }

        let extension = file_extension(&file_name).unwrap_or_default();
        if !extension.eq_ignore_ascii_case(&self.config.valid_extension) {
            error!("Failed to save file with invalid extension: {:?}", extension);
            return Err(StorageError::UnsupportedExtension {
                file_name,
                required: self.config.valid_extension.clone(),
            });
        }

        Ok(file_name)
    }

    /// Save an uploaded file into the upload directory
    pub fn store(&self, original_file_name: &str, content: &[u8]) -> Result<Attachment, StorageError> {
        let original_file_name = self.validate_upload(original_file_name, content)?;
        let extension = file_extension(&original_file_name).unwrap_or_default().to_string();

        let uuid = Uuid::new_v4();
        let saved_name = format!("{}{}", &uuid.to_string()[..SAVED_NAME_PREFIX_LEN], original_file_name);
        let filepath = self.input_path(&saved_name)?;

        fs::write(&filepath, content).map_err(|source| {
            error!("Failed to write upload {}: {}", filepath.display(), source);
            StorageError::Io {
                path: filepath.clone(),
                source,
            }
        })?;
        info!("Stored {} as {}", original_file_name, filepath.display());

        Ok(Attachment {
            original_file_name,
            uuid,
            saved_name,
            extension,
            filepath,
        })
    }

    /// Path of `input_filename` inside the upload directory, creating the directory if needed
    pub fn input_path(&self, input_filename: &str) -> Result<PathBuf, StorageError> {
        let input_dir = ensure_dir(&self.config.upload_dir)?;
        Ok(input_dir.join(input_filename))
    }

    /// Path the shifted version of `input_filename` is written to, creating the directory if needed.
    ///
    /// Only the final component of `input_filename` is used.
    pub fn output_path(&self, input_filename: &str, timeshift: &str) -> Result<PathBuf, StorageError> {
        let file_name = Path::new(input_filename)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::EmptyUpload(input_filename.to_string()))?;
        let output_dir = ensure_dir(&self.config.shifted_dir)?;
        Ok(output_dir.join(create_output_filename(&file_name, timeshift)))
    }
}

/// Insert `_<sign><timeshift>` before the extension.
///
/// The sign is `+` unless the timeshift already starts with `-`. A name
/// without an extension gets the suffix at the end.
pub fn create_output_filename(input_filename: &str, timeshift: &str) -> String {
    let shift_sign = if timeshift.starts_with('-') { "" } else { "+" };
    let (stem, extension) = match input_filename.rfind('.') {
        Some(index) => input_filename.split_at(index),
        None => (input_filename, ""),
    };
    format!("{}_{}{}{}", stem, shift_sign, timeshift, extension)
}

// @returns: Extension with its leading dot, taken after the last '.'
fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|index| &file_name[index..])
}

fn ensure_dir(dir: &Path) -> Result<PathBuf, StorageError> {
    FileManager::ensure_dir(dir).map_err(|e| {
        error!("{:#}", e);
        StorageError::Io {
            path: dir.to_path_buf(),
            source: e.downcast::<io::Error>().unwrap_or_else(io::Error::other),
        }
    })?;
    Ok(dir.to_path_buf())
}
