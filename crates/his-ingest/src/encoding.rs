//! Text encoding detection and decoding.
//!
//! Exports are either UTF-8 or Big5 (the legacy double-byte encoding used by
//! Taiwanese HIS systems). Neither carries a reliable marker, so the buffer is
//! classified by counting well-formed sequences.

use encoding_rs::BIG5;

/// Minimum number of well-formed sequences before a verdict is trusted.
const MIN_SEQUENCES: usize = 5;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encoding a buffer was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Big5,
}

/// Decoded export text together with its source encoding.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
    /// Input bytes, minus a UTF-8 BOM.
    pub source: Vec<u8>,
}

impl DecodedText {
    /// Physical lines of the source buffer, without line terminators.
    ///
    /// Fixed-width layouts are defined in source bytes, so they slice these
    /// lines rather than [`Self::text`]. Line numbers match `text.lines()`.
    pub fn source_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.source
            .split(|byte| *byte == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Decodes a slice of a source line.
    ///
    /// Buffers classified as UTF-8 may still hold a few Big5 characters, so a
    /// slice that is not valid UTF-8 is tried as Big5 before going lossy.
    pub fn decode_slice(&self, bytes: &[u8]) -> String {
        if self.encoding == TextEncoding::Utf8
            && let Ok(text) = std::str::from_utf8(bytes)
        {
            return text.to_string();
        }
        let (text, had_errors) = BIG5.decode_without_bom_handling(bytes);
        if had_errors && self.encoding == TextEncoding::Utf8 {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        text.into_owned()
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn is_big5_lead(byte: u8) -> bool {
    (0x81..=0xFE).contains(&byte)
}

fn is_big5_trail(byte: u8) -> bool {
    (0x40..=0x7E).contains(&byte) || (0xA1..=0xFE).contains(&byte)
}

/// Counts (valid multi-byte UTF-8 sequences, invalid bytes).
fn utf8_sequence_counts(bytes: &[u8]) -> (usize, usize) {
    let mut valid = 0;
    let mut invalid = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < 0x80 {
            i += 1;
        } else if (0xE0..=0xEF).contains(&b)
            && i + 2 < bytes.len()
            && is_continuation(bytes[i + 1])
            && is_continuation(bytes[i + 2])
        {
            valid += 1;
            i += 3;
        } else if (0xC0..=0xDF).contains(&b) && i + 1 < bytes.len() && is_continuation(bytes[i + 1])
        {
            valid += 1;
            i += 2;
        } else {
            invalid += 1;
            i += 1;
        }
    }
    (valid, invalid)
}

fn big5_pair_count(bytes: &[u8]) -> usize {
    let mut pairs = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if is_big5_lead(bytes[i]) && is_big5_trail(bytes[i + 1]) {
            pairs += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs
}

/// Returns true when `bytes` look like Big5 rather than UTF-8.
///
/// UTF-8 wins whenever more than five multi-byte sequences are well formed
/// and invalid bytes stay under a tenth of them. Otherwise more than five
/// Big5 lead/trail pairs mean Big5. Anything else defaults to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> bool {
    let (valid, invalid) = utf8_sequence_counts(bytes);
    if valid > MIN_SEQUENCES && invalid < valid / 10 {
        return false;
    }
    big5_pair_count(bytes) > MIN_SEQUENCES
}

/// Decodes an export buffer to text, stripping a UTF-8 BOM.
///
/// Big5 input that does not decode cleanly falls back to lossy UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if detect_encoding(bytes) {
        let (text, had_errors) = BIG5.decode_without_bom_handling(bytes);
        if !had_errors {
            tracing::debug!(encoding = "big5", bytes = bytes.len(), "decoded export");
            return DecodedText {
                text: text.into_owned(),
                encoding: TextEncoding::Big5,
                source: bytes.to_vec(),
            };
        }
        tracing::debug!("big5 decode reported malformed sequences, falling back to utf-8");
    }

    let source = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = String::from_utf8_lossy(source).into_owned();
    tracing::debug!(encoding = "utf-8", bytes = bytes.len(), "decoded export");
    DecodedText {
        text,
        encoding: TextEncoding::Utf8,
        source: source.to_vec(),
    }
}
