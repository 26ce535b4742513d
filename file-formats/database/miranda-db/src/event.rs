//! Event records: messages, URLs, file transfers and system notices.

use std::fmt;

use binrw::BinRead;
use bitflags::bitflags;
use chrono::{DateTime, TimeZone, Utc};

use crate::buffer::{DbBuffer, FixedLayout};
use crate::diagnostics::{DecodeWarning, Decoded, RecordKind, report};
use crate::options::DecodeOptions;
use crate::text::{TextEncoding, clip_at_nul, decode_lossless};
use crate::Result;

/// Magic at the start of every event record
pub const EVENT_SIGNATURE: u32 = 0x45DE_CADE;

/// Bytes at the start of a file-transfer payload that precede the text
const FILE_EVENT_PREFIX: usize = 4;

/// Fixed header of an event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[br(little)]
pub struct EventHeader {
    /// Should be [`EVENT_SIGNATURE`]
    pub signature: u32,
    /// Offset of the previous event of the same contact
    pub prev: u32,
    /// Offset of the next event, 0 at the end of the chain
    pub next: u32,
    /// Offset of the module name record (not resolved)
    pub module_name: u32,
    /// Seconds since the Unix epoch
    pub timestamp: u32,
    /// Raw [`EventFlags`]
    pub flags: u32,
    /// Raw [`EventType`]
    pub event_type: u16,
    /// Size of the payload area in bytes
    pub blob_size: u32,
}

impl FixedLayout for EventHeader {
    const SIZE: usize = 30;
}

bitflags! {
    /// Event flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct EventFlags: u32 {
        /// First event of the contact
        const FIRST = 0x01;
        /// Sent by the profile owner
        const SENT = 0x02;
        /// Marked as read
        const READ = 0x04;
        /// Right-to-left text
        const RTL = 0x08;
        /// Payload text is Unicode
        const UTF = 0x10;
    }
}

/// Kind of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventType {
    /// Instant message
    Message,
    /// URL
    Url,
    /// Contact list
    Contacts,
    /// "You were added" notice
    Added,
    /// Authorization request
    AuthRequest,
    /// File transfer
    File,
    /// Any other value, usually from a protocol plugin
    Unknown(u16),
}

impl EventType {
    /// Map a raw type value
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Message,
            1 => Self::Url,
            2 => Self::Contacts,
            1000 => Self::Added,
            1001 => Self::AuthRequest,
            1002 => Self::File,
            other => Self::Unknown(other),
        }
    }

    /// The raw type value
    pub fn raw(self) -> u16 {
        match self {
            Self::Message => 0,
            Self::Url => 1,
            Self::Contacts => 2,
            Self::Added => 1000,
            Self::AuthRequest => 1001,
            Self::File => 1002,
            Self::Unknown(raw) => raw,
        }
    }

    /// Display name, `"Unknown"` for unrecognized values
    pub fn name(self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::Url => "Url",
            Self::Contacts => "Contacts",
            Self::Added => "Added",
            Self::AuthRequest => "AuthRequest",
            Self::File => "File",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded event.
///
/// The payload borrows from the database buffer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event<'a> {
    /// Offset of the record in the file
    pub offset: u32,
    /// The fixed record header
    pub header: EventHeader,
    /// Payload bytes, `blob_size - 1` of them
    #[cfg_attr(feature = "serde", serde(skip))]
    pub blob: &'a [u8],
    /// Payload text
    pub text: String,
}

impl Event<'_> {
    /// Kind of the event
    pub fn event_type(&self) -> EventType {
        EventType::from_raw(self.header.event_type)
    }

    /// Flags of the event; unknown bits are kept
    pub fn flags(&self) -> EventFlags {
        EventFlags::from_bits_retain(self.header.flags)
    }

    /// When the event happened
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.header.timestamp), 0).unwrap_or_default()
    }

    /// Whether the profile owner sent the event
    pub fn is_sent(&self) -> bool {
        self.flags().contains(EventFlags::SENT)
    }

    /// `>` for sent events, `<` for received ones
    pub fn direction(&self) -> char {
        if self.is_sent() { '>' } else { '<' }
    }

    /// Display name of the event type
    pub fn type_name(&self) -> &'static str {
        self.event_type().name()
    }

    /// One-line rendering, `"> Name (timestamp) Type: text"`, with the
    /// timestamp shown in `tz`
    pub fn line<Tz>(&self, name: &str, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        format!(
            "{} {} ({}) {}: {}",
            self.direction(),
            name,
            self.timestamp()
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S"),
            self.type_name(),
            self.text
        )
    }
}

/// Decode the text of an event payload.
///
/// `blob_offset` is the absolute offset of `blob[0]`.
pub fn decode_event_text(
    event_type: EventType,
    flags: EventFlags,
    blob: &[u8],
    blob_offset: u32,
    options: &DecodeOptions,
    warnings: &mut Vec<DecodeWarning>,
) -> String {
    let skip = if event_type == EventType::File {
        FILE_EVENT_PREFIX.min(blob.len())
    } else {
        0
    };
    let text = clip_at_nul(&blob[skip..]);

    let encoding = if flags.contains(EventFlags::UTF) {
        options.utf_mode.encoding()
    } else {
        TextEncoding::Latin1
    };

    decode_lossless(
        text,
        encoding,
        blob_offset.saturating_add(skip as u32),
        warnings,
    )
}

/// Decode the event record at `offset`
pub fn decode_event<'a>(
    buffer: &'a DbBuffer,
    offset: u32,
    options: &DecodeOptions,
) -> Result<Decoded<Event<'a>>> {
    let header: EventHeader = buffer.read_struct(offset)?;
    let mut warnings = Vec::new();

    if header.signature != EVENT_SIGNATURE {
        report(
            &mut warnings,
            DecodeWarning::SignatureMismatch {
                kind: RecordKind::Event,
                offset,
                expected: EVENT_SIGNATURE.to_le_bytes().to_vec(),
                found: header.signature.to_le_bytes().to_vec(),
            },
        );
    }

    // The last byte of the payload area is not part of the payload
    let blob_offset = offset.saturating_add(EventHeader::SIZE as u32);
    let blob_len = header.blob_size.saturating_sub(1) as usize;
    let blob = buffer.slice(blob_offset, blob_len)?;

    let text = decode_event_text(
        EventType::from_raw(header.event_type),
        EventFlags::from_bits_retain(header.flags),
        blob,
        blob_offset,
        options,
        &mut warnings,
    );

    log::trace!("Event at {offset:#x}: type {}, {} bytes", header.event_type, blob.len());

    Ok(Decoded::new(
        Event {
            offset,
            header,
            blob,
            text,
        },
        warnings,
    ))
}
