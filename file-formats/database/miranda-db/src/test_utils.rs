//! Builders for synthetic database images.
//!
//! Used by the unit tests, the integration tests, the benchmarks and the
//! command-line tests. The images are well formed unless a builder is told
//! otherwise; [`DatabaseBuilder::build_with_layout`] returns record offsets
//! so tests can corrupt specific fields afterwards.
//!
//! Compiled for this crate's own tests and, for other crates, behind the
//! `test-utils` feature.

use crate::buffer::FixedLayout;
use crate::contact::{CONTACT_SIGNATURE, ContactHeader};
use crate::event::{EVENT_SIGNATURE, EventFlags, EventHeader, EventType};
use crate::header::{DB_SIGNATURE, DatabaseHeader};
use crate::settings::{SETTINGS_SIGNATURE, SettingType, SettingsNodeHeader};

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn patch_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Builder for the entry list of a settings node
#[derive(Debug, Clone, Default)]
pub struct SettingsBlob {
    bytes: Vec<u8>,
}

impl SettingsBlob {
    /// An empty entry list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry with a raw tag and raw value bytes
    #[must_use]
    pub fn entry(mut self, name: &str, tag: u8, value: &[u8]) -> Self {
        let name: Vec<u8> = name.chars().map(|c| c as u8).collect();
        self.bytes.push(name.len() as u8);
        self.bytes.extend_from_slice(&name);
        self.bytes.push(tag);
        self.bytes.extend_from_slice(value);
        self
    }

    fn prefixed(self, name: &str, setting_type: SettingType, body: &[u8]) -> Self {
        let mut value = (body.len() as u16).to_le_bytes().to_vec();
        value.extend_from_slice(body);
        self.entry(name, setting_type.tag(), &value)
    }

    /// Append a deleted entry
    #[must_use]
    pub fn deleted(self, name: &str) -> Self {
        self.entry(name, SettingType::Deleted.tag(), &[])
    }

    /// Append a byte entry
    #[must_use]
    pub fn byte(self, name: &str, value: u8) -> Self {
        self.entry(name, SettingType::Byte.tag(), &[value])
    }

    /// Append a word entry
    #[must_use]
    pub fn word(self, name: &str, value: u16) -> Self {
        self.entry(name, SettingType::Word.tag(), &value.to_le_bytes())
    }

    /// Append a dword entry
    #[must_use]
    pub fn dword(self, name: &str, value: u32) -> Self {
        self.entry(name, SettingType::Dword.tag(), &value.to_le_bytes())
    }

    /// Append a Latin-1 text entry; characters above U+00FF are truncated
    #[must_use]
    pub fn ascii(self, name: &str, value: &str) -> Self {
        let body: Vec<u8> = value.chars().map(|c| c as u8).collect();
        self.prefixed(name, SettingType::AsciiZ, &body)
    }

    /// Append a blob entry
    #[must_use]
    pub fn blob(self, name: &str, value: &[u8]) -> Self {
        self.prefixed(name, SettingType::Blob, value)
    }

    /// Append a UTF-8 text entry
    #[must_use]
    pub fn utf8(self, name: &str, value: &str) -> Self {
        self.prefixed(name, SettingType::Utf8, value.as_bytes())
    }

    /// Append a UTF-16LE text entry
    #[must_use]
    pub fn wchar(self, name: &str, value: &str) -> Self {
        let body: Vec<u8> = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
        self.prefixed(name, SettingType::WChar, &body)
    }

    /// The entry list with its terminating zero byte
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(0);
        self.bytes
    }
}

/// A complete settings node: header followed by `blob`
pub fn settings_node_bytes(next: u32, blob: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SettingsNodeHeader::SIZE + blob.len());
    put_u32(&mut out, SETTINGS_SIGNATURE);
    put_u32(&mut out, next);
    put_u32(&mut out, 0);
    put_u32(&mut out, blob.len() as u32);
    out.extend_from_slice(blob);
    out
}

/// Description of one event record
#[derive(Debug, Clone)]
pub struct EventSpec {
    signature: u32,
    event_type: EventType,
    flags: EventFlags,
    timestamp: u32,
    payload: Vec<u8>,
    blob_size: Option<u32>,
}

impl EventSpec {
    /// An event with the given payload area.
    ///
    /// The stored size is `payload.len()`; the decoder reads one byte less.
    pub fn new(event_type: EventType, payload: &[u8]) -> Self {
        Self {
            signature: EVENT_SIGNATURE,
            event_type,
            flags: EventFlags::empty(),
            timestamp: 0,
            payload: payload.to_vec(),
            blob_size: None,
        }
    }

    /// A received message with Latin-1 `text` and a terminating NUL
    pub fn message(text: &str) -> Self {
        let mut payload: Vec<u8> = text.chars().map(|c| c as u8).collect();
        payload.push(0);
        Self::new(EventType::Message, &payload)
    }

    /// A message with UTF-8 `text`, flagged as Unicode
    pub fn utf8_message(text: &str) -> Self {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        Self::new(EventType::Message, &payload).flags(EventFlags::UTF)
    }

    /// Set the flags
    #[must_use]
    pub fn flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the timestamp
    #[must_use]
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the stored payload size
    #[must_use]
    pub fn blob_size(mut self, blob_size: u32) -> Self {
        self.blob_size = Some(blob_size);
        self
    }

    /// Override the signature
    #[must_use]
    pub fn signature(mut self, signature: u32) -> Self {
        self.signature = signature;
        self
    }

    /// The record: header followed by the payload
    pub fn to_bytes(&self, prev: u32, next: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(EventHeader::SIZE + self.payload.len());
        put_u32(&mut out, self.signature);
        put_u32(&mut out, prev);
        put_u32(&mut out, next);
        put_u32(&mut out, 0);
        put_u32(&mut out, self.timestamp);
        put_u32(&mut out, self.flags.bits());
        out.extend_from_slice(&self.event_type.raw().to_le_bytes());
        put_u32(
            &mut out,
            self.blob_size.unwrap_or(self.payload.len() as u32),
        );
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Description of one contact record
#[derive(Debug, Clone)]
pub struct ContactSpec {
    signature: u32,
    settings: Vec<Vec<u8>>,
    events: Vec<EventSpec>,
}

impl Default for ContactSpec {
    fn default() -> Self {
        Self {
            signature: CONTACT_SIGNATURE,
            settings: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl ContactSpec {
    /// Append a settings node
    pub fn settings(&mut self, blob: SettingsBlob) -> &mut Self {
        self.settings.push(blob.finish());
        self
    }

    /// Append a settings node with a raw entry list
    pub fn raw_settings(&mut self, blob: Vec<u8>) -> &mut Self {
        self.settings.push(blob);
        self
    }

    /// Append an event
    pub fn event(&mut self, event: EventSpec) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Override the signature
    pub fn signature(&mut self, signature: u32) -> &mut Self {
        self.signature = signature;
        self
    }

    /// Append the contact and its chains to `out`, returning its layout.
    /// The contact's `next` field is left at 0.
    fn write(&self, out: &mut Vec<u8>) -> ContactLayout {
        let offset = out.len() as u32;
        out.resize(out.len() + ContactHeader::SIZE, 0);

        let mut settings = Vec::with_capacity(self.settings.len());
        for blob in &self.settings {
            let node = out.len() as u32;
            if let Some(&prev) = settings.last() {
                patch_u32(out, prev as usize + 4, node);
            }
            settings.push(node);
            out.extend(settings_node_bytes(0, blob));
        }

        let mut events = Vec::with_capacity(self.events.len());
        for event in &self.events {
            let at = out.len() as u32;
            let prev = events.last().copied().unwrap_or(0);
            if prev != 0 {
                patch_u32(out, prev as usize + 8, at);
            }
            events.push(at);
            out.extend(event.to_bytes(prev, 0));
        }

        let base = offset as usize;
        patch_u32(out, base, self.signature);
        patch_u32(out, base + 8, settings.first().copied().unwrap_or(0));
        patch_u32(out, base + 12, self.events.len() as u32);
        patch_u32(out, base + 16, events.first().copied().unwrap_or(0));
        patch_u32(out, base + 20, events.last().copied().unwrap_or(0));

        ContactLayout {
            offset,
            settings,
            events,
        }
    }
}

/// Record offsets of a built contact
#[derive(Debug, Clone)]
pub struct ContactLayout {
    /// Offset of the contact record
    pub offset: u32,
    /// Offsets of its settings nodes, in chain order
    pub settings: Vec<u32>,
    /// Offsets of its events, in chain order
    pub events: Vec<u32>,
}

/// Record offsets of a built image
#[derive(Debug, Clone)]
pub struct Layout {
    /// The owner's contact record, if one was added
    pub owner: Option<ContactLayout>,
    /// Chained contacts, in chain order
    pub contacts: Vec<ContactLayout>,
}

/// Builder for a whole database image
#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    signature: [u8; 16],
    owner: Option<ContactSpec>,
    contacts: Vec<ContactSpec>,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    /// An image with no contacts
    pub fn new() -> Self {
        Self {
            signature: DB_SIGNATURE,
            owner: None,
            contacts: Vec::new(),
        }
    }

    /// Override the file signature
    pub fn signature(&mut self, signature: [u8; 16]) -> &mut Self {
        self.signature = signature;
        self
    }

    /// The owner's own contact record, referenced by the header's `user` field
    pub fn owner(&mut self) -> &mut ContactSpec {
        self.owner.get_or_insert_with(ContactSpec::default)
    }

    /// Append a contact to the chain
    pub fn contact(&mut self) -> &mut ContactSpec {
        self.contacts.push(ContactSpec::default());
        let last = self.contacts.len() - 1;
        &mut self.contacts[last]
    }

    /// Build the image
    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    /// Build the image and report where each record was placed
    pub fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let mut out = vec![0u8; DatabaseHeader::SIZE];

        let owner = self.owner.as_ref().map(|spec| spec.write(&mut out));

        let mut contacts: Vec<ContactLayout> = Vec::with_capacity(self.contacts.len());
        for spec in &self.contacts {
            let layout = spec.write(&mut out);
            if let Some(prev) = contacts.last() {
                patch_u32(&mut out, prev.offset as usize + 4, layout.offset);
            }
            contacts.push(layout);
        }

        let mut header = Vec::with_capacity(DatabaseHeader::SIZE);
        header.extend_from_slice(&self.signature);
        header.extend_from_slice(&0x5678u16.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
        put_u32(&mut header, out.len() as u32);
        put_u32(&mut header, 0);
        put_u32(&mut header, contacts.len() as u32);
        put_u32(&mut header, contacts.first().map_or(0, |c| c.offset));
        put_u32(&mut header, owner.as_ref().map_or(0, |c| c.offset));
        put_u32(&mut header, 0);
        out[..DatabaseHeader::SIZE].copy_from_slice(&header);

        (out, Layout { owner, contacts })
    }
}
