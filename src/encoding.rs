/*!
 * Character encoding detection for subtitle files.
 *
 * Subtitles are frequently authored in legacy code pages (windows-1253,
 * windows-1251, ...). The shifted file is written back in the same encoding
 * it was read with, so content lines stay byte-identical.
 *
 * Detection order:
 * 1. A byte-order mark decides outright and is re-emitted on output
 * 2. Input that is valid UTF-8 (ASCII included) is UTF-8
 * 3. Otherwise chardetng guesses; an unconfident guess gives way to the
 *    configured fallback when the fallback decodes the input cleanly
 */

use std::borrow::Cow;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::{debug, warn};
use crate::errors::ShiftError;

/// Outcome of encoding detection for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedEncoding {
    /// Encoding used to decode the input and encode the output
    pub encoding: &'static Encoding,
    /// Length of the byte-order mark at the start of the input, 0 if none
    pub bom_len: usize,
    /// Whether the detection was backed by a BOM, valid UTF-8 or a confident guess
    pub confident: bool,
}

impl DetectedEncoding {
    /// Plain detection result without a BOM
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            bom_len: 0,
            confident: true,
        }
    }

    /// WHATWG name of the encoding
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Byte-order mark to write ahead of the output, empty if the input had none
    pub fn bom(&self) -> &'static [u8] {
        if self.bom_len == 0 {
            return &[];
        }
        if self.encoding == UTF_8 {
            b"\xEF\xBB\xBF"
        } else if self.encoding == UTF_16LE {
            b"\xFF\xFE"
        } else if self.encoding == UTF_16BE {
            b"\xFE\xFF"
        } else {
            &[]
        }
    }

    /// Decode the whole input, skipping the BOM
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, ShiftError> {
        let body = bytes.get(self.bom_len..).unwrap_or_default();
        let (text, had_errors) = self.encoding.decode_without_bom_handling(body);
        if had_errors {
            return Err(ShiftError::Encoding {
                encoding: self.name(),
                message: "input contains malformed byte sequences".to_string(),
            });
        }
        Ok(text)
    }

    /// Append the encoded form of `text` to `out`
    pub fn encode_into(&self, text: &str, out: &mut Vec<u8>) -> Result<(), ShiftError> {
        // encoding_rs only encodes to ASCII-compatible encodings; UTF-16 is done by hand
        if self.encoding == UTF_16LE {
            out.extend(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()));
            return Ok(());
        }
        if self.encoding == UTF_16BE {
            out.extend(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()));
            return Ok(());
        }

        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            return Err(ShiftError::Encoding {
                encoding: self.name(),
                message: format!("cannot represent {:?}", text),
            });
        }
        out.extend_from_slice(&bytes);
        Ok(())
    }
}

/// Inspects raw bytes and picks the encoding to read and write them with
pub trait EncodingDetector {
    fn detect(&self, bytes: &[u8]) -> DetectedEncoding;
}

/// Statistical detector backed by chardetng
#[derive(Debug, Clone, Copy)]
pub struct ChardetDetector {
    fallback: &'static Encoding,
}

impl Default for ChardetDetector {
    fn default() -> Self {
        Self { fallback: UTF_8 }
    }
}

impl ChardetDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fallback` when the statistical guess is not confident
    pub fn with_fallback(fallback: &'static Encoding) -> Self {
        Self { fallback }
    }

    /// Build from a WHATWG label such as "utf-8" or "windows-1253"
    pub fn from_label(label: &str) -> Result<Self, ShiftError> {
        let fallback = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ShiftError::Encoding {
            encoding: "unknown",
            message: format!("unknown encoding label: {}", label),
        })?;
        Ok(Self::with_fallback(fallback))
    }

    pub fn fallback(&self) -> &'static Encoding {
        self.fallback
    }
}

impl EncodingDetector for ChardetDetector {
    fn detect(&self, bytes: &[u8]) -> DetectedEncoding {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            debug!("Byte-order mark found: {}", encoding.name());
            return DetectedEncoding {
                encoding,
                bom_len,
                confident: true,
            };
        }

        if std::str::from_utf8(bytes).is_ok() {
            return DetectedEncoding::new(UTF_8);
        }

        let mut engine = chardetng::EncodingDetector::new();
        engine.feed(bytes, true);
        let (guess, confident) = engine.guess_assess(None, false);
        debug!("chardetng guess: {} (confident: {})", guess.name(), confident);

        if confident {
            return DetectedEncoding::new(guess);
        }

        let (_, fallback_errors) = self.fallback.decode_without_bom_handling(bytes);
        let encoding = if fallback_errors {
            warn!(
                "Low-confidence encoding guess {}; fallback {} cannot decode the input, keeping the guess",
                guess.name(),
                self.fallback.name()
            );
            guess
        } else {
            warn!(
                "Low-confidence encoding guess {}; using fallback {}",
                guess.name(),
                self.fallback.name()
            );
            self.fallback
        };

        DetectedEncoding {
            encoding,
            bom_len: 0,
            confident: false,
        }
    }
}
