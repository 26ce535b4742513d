//! Non-fatal decode diagnostics.
//!
//! Miranda databases in the wild carry benign damage: drifted signatures,
//! settings written by plugins with private type tags, text that does not
//! match its encoding flag. None of these stop decoding. They are collected
//! as [`DecodeWarning`]s next to the decoded value and logged at `warn`.

use std::fmt;

use crate::text::TextEncoding;

/// The kinds of record found in a database file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RecordKind {
    /// File header at offset 0
    Header,
    /// Contact record
    Contact,
    /// Settings node
    Settings,
    /// Event record
    Event,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Contact => "contact",
            Self::Settings => "settings",
            Self::Event => "event",
        };
        f.write_str(name)
    }
}

/// A condition that was absorbed during decoding
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DecodeWarning {
    /// A record's magic did not match; its fields were decoded as laid out anyway
    SignatureMismatch {
        /// Kind of record being decoded
        kind: RecordKind,
        /// Offset of the record
        offset: u32,
        /// Expected magic, little-endian bytes
        expected: Vec<u8>,
        /// Magic found in the file
        found: Vec<u8>,
    },

    /// A settings entry had a type tag with no known width; the rest of its node was skipped
    UndecodableValue {
        /// Offset of the entry's type tag
        offset: u32,
        /// Name of the entry
        name: String,
        /// The unrecognized tag
        tag: u8,
    },

    /// Text bytes were invalid for their encoding; the raw bytes were kept in escaped form
    EncodingFailure {
        /// Offset of the text bytes
        offset: u32,
        /// Encoding that was attempted
        encoding: TextEncoding,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureMismatch {
                kind,
                offset,
                expected,
                found,
            } => write!(
                f,
                "{kind} at {offset:#x}: signature mismatch (expected {}, found {})",
                hex(expected),
                hex(found)
            ),
            Self::UndecodableValue { offset, name, tag } => write!(
                f,
                "setting '{name}' at {offset:#x}: unknown type tag {tag}, rest of node skipped"
            ),
            Self::EncodingFailure { offset, encoding } => {
                write!(f, "text at {offset:#x}: not valid {encoding}")
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Push a warning onto `sink` and log it.
pub(crate) fn report(sink: &mut Vec<DecodeWarning>, warning: DecodeWarning) {
    log::warn!("{warning}");
    sink.push(warning);
}

/// A decoded value together with the warnings raised while decoding it
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    /// The decoded value
    pub value: T,
    /// Conditions absorbed along the way
    pub warnings: Vec<DecodeWarning>,
}

impl<T> Decoded<T> {
    /// Wrap a value with no warnings
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Wrap a value with its warnings
    pub fn new(value: T, warnings: Vec<DecodeWarning>) -> Self {
        Self { value, warnings }
    }

    /// Whether decoding raised no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Split into value and warnings
    pub fn into_parts(self) -> (T, Vec<DecodeWarning>) {
        (self.value, self.warnings)
    }

    /// Transform the value, keeping the warnings
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = DecodeWarning::SignatureMismatch {
            kind: RecordKind::Contact,
            offset: 0x2c,
            expected: vec![0xDE, 0xCA, 0xDE, 0x43],
            found: vec![0, 0, 0, 0],
        };
        assert_eq!(
            warning.to_string(),
            "contact at 0x2c: signature mismatch (expected DE CA DE 43, found 00 00 00 00)"
        );

        let warning = DecodeWarning::UndecodableValue {
            offset: 0x100,
            name: "Status".to_string(),
            tag: 7,
        };
        assert_eq!(
            warning.to_string(),
            "setting 'Status' at 0x100: unknown type tag 7, rest of node skipped"
        );

        let warning = DecodeWarning::EncodingFailure {
            offset: 0x200,
            encoding: TextEncoding::Utf16,
        };
        assert_eq!(warning.to_string(), "text at 0x200: not valid UTF-16");
    }

    #[test]
    fn test_report_logs_and_collects() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Warn)
            .try_init();

        let mut sink = Vec::new();
        let warning = DecodeWarning::EncodingFailure {
            offset: 0x30,
            encoding: TextEncoding::Latin1,
        };
        report(&mut sink, warning.clone());
        report(&mut sink, warning.clone());
        assert_eq!(sink, vec![warning.clone(), warning]);
    }

    #[test]
    fn test_decoded_map_keeps_warnings() {
        let warning = DecodeWarning::EncodingFailure {
            offset: 1,
            encoding: TextEncoding::Utf8,
        };
        let decoded = Decoded::new(2, vec![warning.clone()]).map(|v| v * 21);
        assert!(!decoded.is_clean());
        let (value, warnings) = decoded.into_parts();
        assert_eq!(value, 42);
        assert_eq!(warnings, vec![warning]);
    }
}
