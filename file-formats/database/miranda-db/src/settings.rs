//! Settings node parsing.
//!
//! A settings node holds the settings one module stores for one contact.
//! After the 16-byte node header comes a packed entry list:
//!
//! ```text
//! +--------+--------------+-----+-------------------------+
//! | cbName | name (Latin1) | tag | value (width from tag)  |  ... repeated
//! +--------+--------------+-----+-------------------------+
//! | 0x00   |  end of list
//! ```
//!
//! Fixed-width values are 1, 2 or 4 bytes. Text and blob values carry a
//! little-endian `u16` length prefix.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use binrw::BinRead;

use crate::buffer::{DbBuffer, FixedLayout};
use crate::diagnostics::{DecodeWarning, Decoded, RecordKind, report};
use crate::options::DecodeOptions;
use crate::text::{TextEncoding, decode_lossless, escape_bytes, latin1};
use crate::{Error, Result};

/// Magic at the start of every settings node
pub const SETTINGS_SIGNATURE: u32 = 0x4DDE_CADE;

/// Merged settings of a contact, keyed by setting name
pub type Settings = BTreeMap<String, SettingValue>;

/// Fixed header of a settings node
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[br(little)]
pub struct SettingsNodeHeader {
    /// Should be [`SETTINGS_SIGNATURE`]
    pub signature: u32,
    /// Offset of the next settings node of the same contact, 0 at the end
    pub next: u32,
    /// Offset of the module name record (not resolved)
    pub module_name: u32,
    /// Size of the entry list in bytes
    pub blob_size: u32,
}

impl FixedLayout for SettingsNodeHeader {
    const SIZE: usize = 16;
}

/// Type tags of setting values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SettingType {
    /// Setting was deleted, no value bytes
    Deleted,
    /// 8-bit unsigned integer
    Byte,
    /// 16-bit unsigned integer
    Word,
    /// 32-bit unsigned integer
    Dword,
    /// Length-prefixed Latin-1 text
    AsciiZ,
    /// Length-prefixed raw bytes
    Blob,
    /// Length-prefixed UTF-8 text
    Utf8,
    /// Length-prefixed UTF-16LE text
    WChar,
}

impl SettingType {
    /// Map a tag byte to a type
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Deleted),
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            4 => Some(Self::Dword),
            255 => Some(Self::AsciiZ),
            254 => Some(Self::Blob),
            253 => Some(Self::Utf8),
            252 => Some(Self::WChar),
            _ => None,
        }
    }

    /// The tag byte of this type
    pub fn tag(self) -> u8 {
        match self {
            Self::Deleted => 0,
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
            Self::AsciiZ => 255,
            Self::Blob => 254,
            Self::Utf8 => 253,
            Self::WChar => 252,
        }
    }

    /// Human-readable type name
    pub fn name(self) -> &'static str {
        match self {
            Self::Deleted => "Deleted",
            Self::Byte => "Byte",
            Self::Word => "Word",
            Self::Dword => "Dword",
            Self::AsciiZ => "AsciiZ",
            Self::Blob => "Blob",
            Self::Utf8 => "Utf8",
            Self::WChar => "WChar",
        }
    }

    /// Whether the value carries a `u16` length prefix
    pub fn is_variable_length(self) -> bool {
        matches!(self, Self::AsciiZ | Self::Blob | Self::Utf8 | Self::WChar)
    }
}

/// A decoded setting value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", content = "value")
)]
pub enum SettingValue {
    /// Deleted setting
    Deleted,
    /// 8-bit value
    Byte(u8),
    /// 16-bit value
    Word(u16),
    /// 32-bit value
    Dword(u32),
    /// Latin-1 text
    AsciiZ(String),
    /// Raw bytes
    Blob(Vec<u8>),
    /// Unicode text
    Utf8(String),
    /// Wide-character text
    WChar(String),
}

impl SettingValue {
    /// The type of this value
    pub fn setting_type(&self) -> SettingType {
        match self {
            Self::Deleted => SettingType::Deleted,
            Self::Byte(_) => SettingType::Byte,
            Self::Word(_) => SettingType::Word,
            Self::Dword(_) => SettingType::Dword,
            Self::AsciiZ(_) => SettingType::AsciiZ,
            Self::Blob(_) => SettingType::Blob,
            Self::Utf8(_) => SettingType::Utf8,
            Self::WChar(_) => SettingType::WChar,
        }
    }

    /// The value as text, if it is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::AsciiZ(s) | Self::Utf8(s) | Self::WChar(s) => Some(s),
            _ => None,
        }
    }

    /// The value widened to `u32`, if it is an integer value
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Byte(v) => Some(u32::from(*v)),
            Self::Word(v) => Some(u32::from(*v)),
            Self::Dword(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the value carries no information: deleted, zero, or empty
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Deleted => true,
            Self::Byte(v) => *v == 0,
            Self::Word(v) => *v == 0,
            Self::Dword(v) => *v == 0,
            Self::AsciiZ(s) | Self::Utf8(s) | Self::WChar(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Cow<'_, str> = match self {
            Self::Deleted => Cow::Borrowed("Deleted"),
            Self::Byte(v) => Cow::Owned(v.to_string()),
            Self::Word(v) => Cow::Owned(v.to_string()),
            Self::Dword(v) => Cow::Owned(v.to_string()),
            Self::AsciiZ(s) | Self::Utf8(s) | Self::WChar(s) => Cow::Borrowed(s.as_str()),
            Self::Blob(b) => Cow::Owned(escape_bytes(b)),
        };
        f.pad(&text)
    }
}

/// One decoded settings node
#[derive(Debug, Clone)]
pub struct SettingsNode {
    /// Offset of the node in the file
    pub offset: u32,
    /// The fixed node header
    pub header: SettingsNodeHeader,
    /// Entries of this node, in name order
    pub settings: Settings,
}

/// Bounds-checked sub-slice of a node's entry list.
///
/// `base` is the absolute offset of `blob[0]`, used for error reporting.
fn take(blob: &[u8], pos: usize, len: usize, base: u32) -> Result<&[u8]> {
    pos.checked_add(len)
        .and_then(|end| blob.get(pos..end))
        .ok_or(Error::OutOfRange {
            offset: u64::from(base) + pos as u64,
            length: len as u64,
            end: u64::from(base) + blob.len() as u64,
        })
}

fn at(base: u32, pos: usize) -> u32 {
    base.saturating_add(pos as u32)
}

/// Decode one setting value from the start of `data`.
///
/// `offset` is the absolute offset of `data[0]`. Returns the value and the
/// number of bytes it occupied, or `None` if `tag` is not a known type and
/// so the value width cannot be determined.
pub fn decode_setting_value(
    tag: u8,
    data: &[u8],
    offset: u32,
    options: &DecodeOptions,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<Option<(SettingValue, usize)>> {
    let Some(setting_type) = SettingType::from_tag(tag) else {
        return Ok(None);
    };

    let decoded = match setting_type {
        SettingType::Deleted => (SettingValue::Deleted, 0),
        SettingType::Byte => (SettingValue::Byte(take(data, 0, 1, offset)?[0]), 1),
        SettingType::Word => {
            let b = take(data, 0, 2, offset)?;
            (SettingValue::Word(u16::from_le_bytes([b[0], b[1]])), 2)
        }
        SettingType::Dword => {
            let b = take(data, 0, 4, offset)?;
            (
                SettingValue::Dword(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
                4,
            )
        }
        SettingType::AsciiZ | SettingType::Blob | SettingType::Utf8 | SettingType::WChar => {
            let prefix = take(data, 0, 2, offset)?;
            let len = usize::from(u16::from_le_bytes([prefix[0], prefix[1]]));
            let body = take(data, 2, len, offset)?;
            let body_offset = at(offset, 2);

            let value = match setting_type {
                SettingType::AsciiZ => SettingValue::AsciiZ(latin1(body)),
                SettingType::Blob => SettingValue::Blob(body.to_vec()),
                SettingType::Utf8 => SettingValue::Utf8(decode_lossless(
                    body,
                    options.utf_mode.encoding(),
                    body_offset,
                    warnings,
                )),
                _ => SettingValue::WChar(decode_lossless(
                    body,
                    TextEncoding::Utf16,
                    body_offset,
                    warnings,
                )),
            };
            (value, len + 2)
        }
    };

    Ok(Some(decoded))
}

/// Decode the entry list of a settings node.
///
/// `base` is the absolute offset of `blob[0]`. The walk ends at a zero name
/// length, at the exact end of the list, or at the first entry whose type
/// tag is unknown.
pub fn decode_entries(
    blob: &[u8],
    base: u32,
    options: &DecodeOptions,
) -> Result<Decoded<Settings>> {
    let mut settings = Settings::new();
    let mut warnings = Vec::new();
    let mut pos = 0;

    while pos < blob.len() {
        let cb_name = usize::from(blob[pos]);
        if cb_name == 0 {
            break;
        }

        let name = latin1(take(blob, pos + 1, cb_name, base)?);
        let tag_pos = pos + 1 + cb_name;
        let tag = take(blob, tag_pos, 1, base)?[0];
        let value_pos = tag_pos + 1;

        match decode_setting_value(
            tag,
            &blob[value_pos..],
            at(base, value_pos),
            options,
            &mut warnings,
        )? {
            Some((value, width)) => {
                log::trace!("Setting {name} = {value:?}");
                settings.insert(name, value);
                pos = value_pos + width;
            }
            None => {
                report(
                    &mut warnings,
                    DecodeWarning::UndecodableValue {
                        offset: at(base, tag_pos),
                        name,
                        tag,
                    },
                );
                break;
            }
        }
    }

    Ok(Decoded::new(settings, warnings))
}

/// Decode the settings node at `offset`
pub fn decode_settings_node(
    buffer: &DbBuffer,
    offset: u32,
    options: &DecodeOptions,
) -> Result<Decoded<SettingsNode>> {
    let header: SettingsNodeHeader = buffer.read_struct(offset)?;
    let mut warnings = Vec::new();

    if header.signature != SETTINGS_SIGNATURE {
        report(
            &mut warnings,
            DecodeWarning::SignatureMismatch {
                kind: RecordKind::Settings,
                offset,
                expected: SETTINGS_SIGNATURE.to_le_bytes().to_vec(),
                found: header.signature.to_le_bytes().to_vec(),
            },
        );
    }

    let blob_offset = at(offset, SettingsNodeHeader::SIZE);
    let blob = buffer.slice(blob_offset, header.blob_size as usize)?;
    let (settings, entry_warnings) = decode_entries(blob, blob_offset, options)?.into_parts();
    warnings.extend(entry_warnings);

    Ok(Decoded::new(
        SettingsNode {
            offset,
            header,
            settings,
        },
        warnings,
    ))
}
