/*!
 * # Subshift - Subtitle timestamp shifter
 *
 * A Rust library for moving every timestamp of an SRT-style subtitle file by a
 * fixed signed number of milliseconds.
 *
 * ## Features
 *
 * - Strict `HH:MM:SS,mmm --> HH:MM:SS,mmm` time line recognition
 * - Exact millisecond arithmetic with a configurable policy for negative results
 * - Content lines copied byte for byte
 * - Character encoding detection, output written in the input's encoding
 * - Upload storage with UUID-prefixed names and `_+500` / `_-500` output naming
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timestamp`: The `Timestamp` value type
 * - `time_line`: Time line classification and shifting
 * - `encoding`: Encoding detection (BOM, UTF-8, chardetng)
 * - `subtitle_shifter`: Whole-document shift pass
 * - `storage`: Upload storage and output file naming
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod encoding;
pub mod errors;
pub mod file_utils;
pub mod storage;
pub mod subtitle_shifter;
pub mod time_line;
pub mod timestamp;

// Re-export main types for easier usage
pub use app_config::Config;
pub use encoding::{ChardetDetector, DetectedEncoding, EncodingDetector};
pub use errors::{AppError, ShiftError, StorageError};
pub use storage::{create_output_filename, Attachment, StorageService};
pub use subtitle_shifter::{LineEnding, ShiftOptions, ShiftReport, ShiftValue, SubtitleShifter};
pub use time_line::{is_time_line, shift_time_line, NegativeTimePolicy, TimeLine};
pub use timestamp::Timestamp;
