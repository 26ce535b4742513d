//! Contact records and their settings and event chains.
//!
//! A contact record is the head of two chains: the settings nodes written
//! by each module for the contact, and the contact's message history.
//! [`decode_contact`] walks both eagerly.

use std::fmt;

use binrw::BinRead;

use crate::buffer::{DbBuffer, FixedLayout};
use crate::chain::ChainGuard;
use crate::diagnostics::{DecodeWarning, RecordKind, report};
use crate::event::{Event, decode_event};
use crate::options::DecodeOptions;
use crate::settings::{SettingValue, Settings, decode_settings_node};
use crate::Result;

/// Magic at the start of every contact record
pub const CONTACT_SIGNATURE: u32 = 0x43DE_CADE;

/// Display name used when a contact has no name settings
pub const UNKNOWN_NAME: &str = "?";

/// Fixed header of a contact record
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[br(little)]
pub struct ContactHeader {
    /// Should be [`CONTACT_SIGNATURE`]
    pub signature: u32,
    /// Offset of the next contact, 0 at the end of the chain
    pub next: u32,
    /// Offset of the first settings node, 0 if there are none
    pub first_settings: u32,
    /// Number of events as recorded by Miranda
    pub event_count: u32,
    /// Offset of the first event, 0 if there are none
    pub first_event: u32,
    /// Offset of the last event
    pub last_event: u32,
    /// Offset of the first unread event
    pub first_unread_event: u32,
    /// Timestamp of the first unread event
    pub timestamp_first_unread: u32,
}

impl FixedLayout for ContactHeader {
    const SIZE: usize = 32;
}

/// A fully decoded contact
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Contact<'a> {
    /// Offset of the record in the file
    pub offset: u32,
    /// The fixed record header
    pub header: ContactHeader,
    /// Settings of all nodes merged, later nodes overriding earlier ones
    pub settings: Settings,
    /// Events in chain order
    pub events: Vec<Event<'a>>,
    /// Name derived from the name settings
    pub display_name: String,
    /// Conditions absorbed while decoding this contact
    pub warnings: Vec<DecodeWarning>,
}

impl Contact<'_> {
    /// Offset of the next contact, 0 at the end of the chain
    pub fn next(&self) -> u32 {
        self.header.next
    }

    /// Event count stored in the record
    pub fn event_count(&self) -> u32 {
        self.header.event_count
    }

    /// Look up a setting
    pub fn setting(&self, key: &str) -> Option<&SettingValue> {
        self.settings.get(key)
    }

    /// The `FirstName` setting
    pub fn first_name(&self) -> Option<&SettingValue> {
        self.setting("FirstName")
    }

    /// The `LastName` setting
    pub fn last_name(&self) -> Option<&SettingValue> {
        self.setting("LastName")
    }

    /// The `Nick` setting
    pub fn nick(&self) -> Option<&SettingValue> {
        self.setting("Nick")
    }

    /// The `UIN` setting
    pub fn uin(&self) -> Option<&SettingValue> {
        self.setting("UIN")
    }

    /// Whether setting `key` exists and displays as `value`
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.setting(key).is_some_and(|v| v.to_string() == value)
    }

    /// Whether decoding raised no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for Contact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contact: {}", self.display_name)?;
        writeln!(f, "Event count: {}", self.event_count())?;
        for (key, value) in &self.settings {
            writeln!(f, "{key:>12}:\t{value:>12}")?;
        }
        Ok(())
    }
}

fn present(settings: &Settings, key: &str) -> Option<String> {
    settings
        .get(key)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Derive a display name from `FirstName`, `LastName`, `Nick` and `UIN`.
///
/// A setting counts only if it holds a non-empty value.
pub fn display_name(settings: &Settings) -> String {
    let first = present(settings, "FirstName");
    let last = present(settings, "LastName");
    let nick = present(settings, "Nick");

    match (first, last, nick) {
        (Some(first), Some(last), Some(nick)) => format!("{first} {last} ({nick})"),
        (Some(first), None, Some(nick)) => format!("{first} ({nick})"),
        (None, Some(last), Some(nick)) => format!("{last} ({nick})"),
        (Some(first), Some(last), None) => format!("{first} {last}"),
        (_, _, Some(nick)) => nick,
        _ => present(settings, "UIN").unwrap_or_else(|| UNKNOWN_NAME.to_string()),
    }
}

fn read_settings_chain(
    buffer: &DbBuffer,
    first: u32,
    options: &DecodeOptions,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<Settings> {
    let mut merged = Settings::new();
    let mut guard = ChainGuard::new(RecordKind::Settings);
    let mut offset = first;

    while offset != 0 {
        guard.visit(offset)?;
        let (node, node_warnings) = decode_settings_node(buffer, offset, options)?.into_parts();
        warnings.extend(node_warnings);
        log::trace!(
            "Settings node at {offset:#x}: {} entries",
            node.settings.len()
        );
        merged.extend(node.settings);
        offset = node.header.next;
    }

    Ok(merged)
}

fn read_event_chain<'a>(
    buffer: &'a DbBuffer,
    first: u32,
    options: &DecodeOptions,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<Vec<Event<'a>>> {
    let mut events = Vec::new();
    let mut guard = ChainGuard::new(RecordKind::Event);
    let mut offset = first;

    while offset != 0 {
        guard.visit(offset)?;
        let (event, event_warnings) = decode_event(buffer, offset, options)?.into_parts();
        warnings.extend(event_warnings);
        offset = event.header.next;
        events.push(event);
    }

    Ok(events)
}

/// Decode the contact record at `offset` with its settings and events
pub fn decode_contact<'a>(
    buffer: &'a DbBuffer,
    offset: u32,
    options: &DecodeOptions,
) -> Result<Contact<'a>> {
    let header: ContactHeader = buffer.read_struct(offset)?;
    let mut warnings = Vec::new();

    if header.signature != CONTACT_SIGNATURE {
        report(
            &mut warnings,
            DecodeWarning::SignatureMismatch {
                kind: RecordKind::Contact,
                offset,
                expected: CONTACT_SIGNATURE.to_le_bytes().to_vec(),
                found: header.signature.to_le_bytes().to_vec(),
            },
        );
    }

    let settings = read_settings_chain(buffer, header.first_settings, options, &mut warnings)?;
    let name = display_name(&settings);
    let events = read_event_chain(buffer, header.first_event, options, &mut warnings)?;

    log::debug!(
        "Contact at {offset:#x}: {name}, {} settings, {} events",
        settings.len(),
        events.len()
    );

    Ok(Contact {
        offset,
        header,
        settings,
        events,
        display_name: name,
        warnings,
    })
}
