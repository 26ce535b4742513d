//! Text decoding for setting values and event payloads.
//!
//! Miranda stores text in three encodings: Latin-1 for plain ASCIIZ data,
//! UTF-8 for anything flagged as Unicode, and UTF-16LE for wide-character
//! settings. Decoding never fails: bytes that are invalid for the selected
//! encoding are kept as an escaped byte string and an
//! [`EncodingFailure`](crate::DecodeWarning::EncodingFailure) is reported.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE};

use crate::diagnostics::{DecodeWarning, report};

/// A text encoding used somewhere in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextEncoding {
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// UTF-8
    Utf8,
    /// UTF-16, little-endian unless a byte order mark says otherwise
    Utf16,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Latin1 => "Latin-1",
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
        };
        f.write_str(name)
    }
}

impl TextEncoding {
    /// Decode `bytes`, returning `None` if they are malformed for this encoding
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Latin1 => Some(latin1(bytes)),
            Self::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
            Self::Utf16 => {
                let (encoding, body) = match bytes {
                    [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                    [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                    _ => (UTF_16LE, bytes),
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(Cow::into_owned)
            }
        }
    }
}

/// Latin-1 decoding.
///
/// `encoding_rs` maps the label "latin1" to windows-1252, which differs in
/// 0x80..=0x9F, so the mapping is done directly.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Escaped representation of raw bytes, e.g. `b"hi\xff"`
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b\"");
    for &b in bytes {
        out.extend(std::ascii::escape_default(b).map(char::from));
    }
    out.push('"');
    out
}

/// The bytes before the first NUL, or all of them
pub fn clip_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Decode `bytes` located at `offset`, falling back to [`escape_bytes`].
pub(crate) fn decode_lossless(
    bytes: &[u8],
    encoding: TextEncoding,
    offset: u32,
    warnings: &mut Vec<DecodeWarning>,
) -> String {
    if let Some(text) = encoding.decode(bytes) {
        text
    } else {
        report(warnings, DecodeWarning::EncodingFailure { offset, encoding });
        escape_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_latin1_maps_every_byte() {
        assert_eq!(latin1(b"abc"), "abc");
        assert_eq!(latin1(&[0xE9, 0x80, 0xFF]), "\u{e9}\u{80}\u{ff}");
    }

    #[test_case(b"hi", "b\"hi\"" ; "printable")]
    #[test_case(b"a\xff\x00", "b\"a\\xff\\x00\"" ; "non printable")]
    #[test_case(b"", "b\"\"" ; "empty")]
    fn test_escape_bytes(input: &[u8], expected: &str) {
        assert_eq!(escape_bytes(input), expected);
    }

    #[test_case(b"hi\0pad", b"hi" ; "stops at first nul")]
    #[test_case(b"\0hi", b"" ; "leading nul")]
    #[test_case(b"hello", b"hello" ; "no nul")]
    fn test_clip_at_nul(input: &[u8], expected: &[u8]) {
        assert_eq!(clip_at_nul(input), expected);
    }

    #[test]
    fn test_utf8() {
        assert_eq!(
            TextEncoding::Utf8.decode("grüß".as_bytes()).as_deref(),
            Some("grüß")
        );
        assert_eq!(TextEncoding::Utf8.decode(&[0xC3]), None);
    }

    #[test]
    fn test_utf16_byte_order() {
        assert_eq!(
            TextEncoding::Utf16.decode(&[b'h', 0, b'i', 0]).as_deref(),
            Some("hi")
        );
        assert_eq!(
            TextEncoding::Utf16.decode(&[0xFF, 0xFE, b'h', 0]).as_deref(),
            Some("h")
        );
        assert_eq!(
            TextEncoding::Utf16.decode(&[0xFE, 0xFF, 0, b'h']).as_deref(),
            Some("h")
        );
        // Odd length and lone surrogates are malformed
        assert_eq!(TextEncoding::Utf16.decode(b"abc"), None);
        assert_eq!(TextEncoding::Utf16.decode(&[0x00, 0xD8]), None);
    }

    #[test]
    fn test_decode_lossless_falls_back() {
        let mut warnings = Vec::new();
        let text = decode_lossless(b"abc", TextEncoding::Utf16, 0x10, &mut warnings);
        assert_eq!(text, "b\"abc\"");
        assert_eq!(
            warnings,
            vec![DecodeWarning::EncodingFailure {
                offset: 0x10,
                encoding: TextEncoding::Utf16,
            }]
        );
    }
}
