use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;
use once_cell::sync::Lazy;
use regex::Regex;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use crate::encoding::{ChardetDetector, EncodingDetector};
use crate::errors::ShiftError;
use crate::time_line::{is_time_line, shift_time_line, NegativeTimePolicy};

// @module: Whole-document timestamp shifting

// @const: Bare, optionally negative integer
static SHIFT_VALUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+$").unwrap()
});

/// A validated timeshift in milliseconds.
///
/// Keeps the text it was parsed from, which output file names are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftValue {
    text: String,
    millis: i64,
}

impl ShiftValue {
    /// Accept only `^-?\d+$` that fits in an i64
    pub fn parse(text: &str) -> Result<Self, ShiftError> {
        if !SHIFT_VALUE_REGEX.is_match(text) {
            error!("Invalid timeshift: {}", text);
            return Err(ShiftError::InvalidShiftValue(text.to_string()));
        }

        let millis = text.parse::<i64>().map_err(|_| {
            error!("Timeshift out of range: {}", text);
            ShiftError::InvalidShiftValue(text.to_string())
        })?;

        Ok(Self {
            text: text.to_string(),
            millis,
        })
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// The delta exactly as supplied
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for ShiftValue {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ShiftValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Line terminator written after every output line
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Knobs of a shift pass
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftOptions {
    /// Behavior for timestamps that would land before zero
    #[serde(default)]
    pub negative_time_policy: NegativeTimePolicy,

    /// Terminator for every written line
    #[serde(default)]
    pub line_ending: LineEnding,
}

/// Summary of one shift pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftReport {
    /// Lines read, equal to lines written
    pub total_lines: usize,
    /// Lines recognized as time lines and rewritten
    pub shifted_lines: usize,
    /// Encoding the document was read and written with
    pub encoding: &'static str,
}

/// Shifts every time line of a subtitle document by a fixed delta.
///
/// Content lines are copied through untouched and the output keeps the line
/// count, line order, encoding and byte-order mark of the input.
pub struct SubtitleShifter<D: EncodingDetector = ChardetDetector> {
    detector: D,
    options: ShiftOptions,
}

impl Default for SubtitleShifter<ChardetDetector> {
    fn default() -> Self {
        Self::new(ChardetDetector::default(), ShiftOptions::default())
    }
}

impl<D: EncodingDetector> SubtitleShifter<D> {
    pub fn new(detector: D, options: ShiftOptions) -> Self {
        Self { detector, options }
    }

    pub fn options(&self) -> &ShiftOptions {
        &self.options
    }

    /// Shift an in-memory document and return the rewritten bytes
    pub fn transform(&self, source: &[u8], delta: &ShiftValue) -> Result<Vec<u8>, ShiftError> {
        let mut output = Vec::with_capacity(source.len() + source.len() / 8);
        self.transform_to(source, delta, &mut output)?;
        Ok(output)
    }

    /// Shift `source` line by line into `writer`
    pub fn transform_to<W: Write>(&self, source: &[u8], delta: &ShiftValue, writer: &mut W) -> Result<ShiftReport, ShiftError> {
        let detected = self.detector.detect(source);
        debug!("Reading subtitles as {} (BOM: {} bytes)", detected.name(), detected.bom_len);

        let write_err = |e: std::io::Error| ShiftError::io("<output>", e);
        writer.write_all(detected.bom()).map_err(write_err)?;

        let mut report = ShiftReport {
            total_lines: 0,
            shifted_lines: 0,
            encoding: detected.name(),
        };

        if detected.encoding.is_ascii_compatible() {
            // Time lines are pure ASCII, so lines can be classified without decoding
            // and content lines are copied as raw bytes
            let body = source.get(detected.bom_len..).unwrap_or_default();
            let terminator = self.options.line_ending.as_str().as_bytes();

            for line in byte_lines(body) {
                report.total_lines += 1;
                match std::str::from_utf8(line).ok().filter(|text| is_time_line(text)) {
                    Some(time_line) => {
                        let shifted = shift_time_line(time_line, delta.millis(), self.options.negative_time_policy)?;
                        writer.write_all(shifted.as_bytes()).map_err(write_err)?;
                        report.shifted_lines += 1;
                    }
                    None => writer.write_all(line).map_err(write_err)?,
                }
                writer.write_all(terminator).map_err(write_err)?;
            }
        } else {
            let text = detected.decode(source)?;
            let mut buffer = Vec::with_capacity(256);

            for line in text_lines(&text) {
                report.total_lines += 1;
                let output_line: Cow<str> = if is_time_line(line) {
                    report.shifted_lines += 1;
                    Cow::Owned(shift_time_line(line, delta.millis(), self.options.negative_time_policy)?)
                } else {
                    Cow::Borrowed(line)
                };

                buffer.clear();
                detected.encode_into(&output_line, &mut buffer)?;
                detected.encode_into(self.options.line_ending.as_str(), &mut buffer)?;
                writer.write_all(&buffer).map_err(write_err)?;
            }
        }

        debug!(
            "Shifted {} of {} lines by {} ms",
            report.shifted_lines, report.total_lines, delta.millis()
        );
        Ok(report)
    }

    /// Shift the file at `input` into `output`.
    ///
    /// The result is written to a temporary file next to `output` and renamed
    /// into place once complete, so a failed run leaves no partial file behind.
    pub fn shift_file(&self, input: &Path, output: &Path, delta: &ShiftValue) -> Result<ShiftReport, ShiftError> {
        let source = fs::read(input).map_err(|e| {
            error!("Failed to read subtitle file {}: {}", input.display(), e);
            ShiftError::io(input, e)
        })?;

        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp_file = NamedTempFile::new_in(parent).map_err(|e| {
            error!("Failed to create temporary file in {}: {}", parent.display(), e);
            ShiftError::io(parent, e)
        })?;

        let report = {
            let mut writer = BufWriter::new(temp_file.as_file());
            let report = self.transform_to(&source, delta, &mut writer).map_err(|e| match e {
                ShiftError::Io { source, .. } => {
                    error!("Failed to write shifted subtitles {}: {}", output.display(), source);
                    ShiftError::io(output, source)
                }
                other => other,
            })?;
            writer.flush().map_err(|e| {
                error!("Failed to write shifted subtitles {}: {}", output.display(), e);
                ShiftError::io(output, e)
            })?;
            report
        };

        temp_file.persist(output).map_err(|e| {
            error!("Failed to save shifted subtitles {}: {}", output.display(), e.error);
            ShiftError::io(output, e.error)
        })?;

        Ok(report)
    }
}

/// Byte ranges of the lines of `bytes`.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`; the terminator is not part of
/// the range and the last line may have none.
struct LineRanges<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for LineRanges<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }

        let start = self.pos;
        match self.bytes[start..].iter().position(|&byte| byte == b'\n' || byte == b'\r') {
            Some(offset) => {
                let end = start + offset;
                self.pos = if self.bytes[end] == b'\r' && self.bytes.get(end + 1) == Some(&b'\n') {
                    end + 2
                } else {
                    end + 1
                };
                Some(start..end)
            }
            None => {
                self.pos = self.bytes.len();
                Some(start..self.bytes.len())
            }
        }
    }
}

fn line_ranges(bytes: &[u8]) -> LineRanges<'_> {
    LineRanges { bytes, pos: 0 }
}

fn byte_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    line_ranges(bytes).map(move |range| &bytes[range])
}

// Terminators are ASCII, so every range boundary is a char boundary
fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    line_ranges(text.as_bytes()).map(move |range| &text[range])
}
