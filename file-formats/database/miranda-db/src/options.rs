//! Decoder configuration

use crate::text::TextEncoding;

/// How text marked as Unicode is decoded.
///
/// Applies to event payloads carrying the `UTF` flag and to `Utf8`-tagged
/// settings. Miranda writes UTF-8 in both places. Some older export tools
/// decoded the same bytes as UTF-16; [`UtfMode::Utf16`] reproduces their
/// output for comparison with existing exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UtfMode {
    /// Decode as UTF-8
    #[default]
    Utf8,
    /// Decode as UTF-16 (compatibility mode)
    Utf16,
}

impl UtfMode {
    /// The text encoding this mode selects
    pub fn encoding(self) -> TextEncoding {
        match self {
            Self::Utf8 => TextEncoding::Utf8,
            Self::Utf16 => TextEncoding::Utf16,
        }
    }
}

/// Options shared by every decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Decoding strategy for Unicode-flagged text
    pub utf_mode: UtfMode,
}

impl DecodeOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoding strategy for Unicode-flagged text
    #[must_use]
    pub fn with_utf_mode(mut self, utf_mode: UtfMode) -> Self {
        self.utf_mode = utf_mode;
        self
    }
}
