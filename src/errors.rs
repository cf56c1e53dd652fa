/*!
 * Error types for the subshift application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while shifting a subtitle document
#[derive(Error, Debug)]
pub enum ShiftError {
    /// The delta is not a bare, optionally signed integer
    #[error("Invalid timeshift: {0}")]
    InvalidShiftValue(String),

    /// A timestamp does not match HH:MM:SS,mmm
    #[error("Invalid timestamp: {0}")]
    InvalidTimestampFormat(String),

    /// Shifting would move a timestamp before 00:00:00,000
    #[error("Timestamp {timestamp} shifted by {delta} ms falls below zero")]
    NegativeTimestamp {
        /// Timestamp as it appeared in the source
        timestamp: String,
        /// Requested delta in milliseconds
        delta: i64,
    },

    /// The text cannot be decoded or encoded with the detected encoding
    #[error("Encoding error ({encoding}): {message}")]
    Encoding {
        /// Encoding name
        encoding: &'static str,
        /// What went wrong
        message: String,
    },

    /// Reading the source or writing the destination failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Path of the file being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ShiftError {
    /// Wrap an I/O error with the path it happened on
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the upload storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Nothing to store
    #[error("Failed to store uploaded file: {0} is empty")]
    EmptyUpload(String),

    /// Extension does not match the configured one
    #[error("Invalid file extension: {file_name}. Required extension: {required}")]
    UnsupportedExtension {
        /// Name of the rejected file
        file_name: String,
        /// Extension the storage accepts
        required: String,
    },

    /// Directory creation or file write failed
    #[error("Storage I/O error on {path:?}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the shifting core
    #[error("Shift error: {0}")]
    Shift(#[from] ShiftError),

    /// Error from the upload storage
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
