//! # miranda_db - Miranda IM profile decoder
//!
//! Read-only decoder for the `.dat` profile databases written by the
//! Miranda instant messenger. A profile is a single file of linked records
//! addressed by absolute offsets:
//!
//! - a fixed header at offset 0
//! - a chain of contact records
//! - per contact, a chain of settings nodes (one per module) and a chain of
//!   events (the message history)
//!
//! ## Features
//!
//! - Bounds-checked reads over one immutable buffer, optionally memory mapped
//! - Permissive decoding: damaged signatures, unknown setting types and
//!   badly encoded text become [`DecodeWarning`]s instead of errors
//! - Cycle detection on every chain walk
//! - Optional `serde` serialization and `rayon` parallel decoding
//!
//! ## Examples
//!
//! ```no_run
//! use miranda_db::MirandaDb;
//!
//! # fn main() -> Result<(), miranda_db::Error> {
//! let db = MirandaDb::open("profile.dat")?;
//! for contact in db.contacts() {
//!     let contact = contact?;
//!     println!("{}: {} events", contact.display_name, contact.events.len());
//! }
//! # Ok(())
//! # }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod buffer;
pub mod chain;
pub mod contact;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod header;
pub mod options;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod settings;
#[cfg(any(test, feature = "test-utils", doc))]
pub mod test_utils;
pub mod text;

use std::path::Path;

pub use buffer::DbBuffer;
pub use chain::{ContactChain, contact_offsets};
pub use contact::{CONTACT_SIGNATURE, Contact, ContactHeader, decode_contact, display_name};
pub use diagnostics::{DecodeWarning, Decoded, RecordKind};
pub use error::{Error, Result};
pub use event::{EVENT_SIGNATURE, Event, EventFlags, EventHeader, EventType, decode_event};
pub use header::{DB_SIGNATURE, DB_SIGNATURE_SECURED, DatabaseHeader};
pub use options::{DecodeOptions, UtfMode};
#[cfg(feature = "parallel")]
pub use parallel::decode_contacts_parallel;
pub use settings::{
    SETTINGS_SIGNATURE, SettingType, SettingValue, Settings, SettingsNode, decode_settings_node,
};
pub use text::TextEncoding;

/// A loaded database: the file buffer, its header and the decode options.
#[derive(Debug)]
pub struct MirandaDb {
    buffer: DbBuffer,
    header: DatabaseHeader,
    header_warnings: Vec<DecodeWarning>,
    options: DecodeOptions,
}

impl MirandaDb {
    /// Load the file at `path` with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_buffer(DbBuffer::open(path)?, DecodeOptions::default())
    }

    /// Memory-map the file at `path` with default options
    #[cfg(feature = "mmap")]
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_buffer(DbBuffer::open_mmap(path)?, DecodeOptions::default())
    }

    /// Use an in-memory image with default options
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_buffer(DbBuffer::from_vec(data), DecodeOptions::default())
    }

    /// Use an already loaded buffer
    pub fn from_buffer(buffer: DbBuffer, options: DecodeOptions) -> Result<Self> {
        let (header, header_warnings) = DatabaseHeader::parse(&buffer)?.into_parts();
        Ok(Self {
            buffer,
            header,
            header_warnings,
            options,
        })
    }

    /// Replace the decode options
    #[must_use]
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// The file header
    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    /// Warnings raised while parsing the header
    pub fn header_warnings(&self) -> &[DecodeWarning] {
        &self.header_warnings
    }

    /// The decode options in use
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &DbBuffer {
        &self.buffer
    }

    /// Iterate over the contacts in chain order
    pub fn contacts(&self) -> ContactChain<'_> {
        ContactChain::new(&self.buffer, self.header.first_contact, self.options)
    }

    /// Decode the owner's own contact record, if the header names one
    pub fn owner(&self) -> Option<Result<Contact<'_>>> {
        match self.header.user {
            0 => None,
            offset => Some(decode_contact(&self.buffer, offset, &self.options)),
        }
    }

    /// Contacts whose setting `key` displays as `value`.
    ///
    /// Stops at the first contact that fails to decode.
    pub fn find_contacts(&self, key: &str, value: &str) -> Result<Vec<Contact<'_>>> {
        let mut found = Vec::new();
        for contact in self.contacts() {
            let contact = contact?;
            if contact.matches(key, value) {
                found.push(contact);
            }
        }
        Ok(found)
    }

    /// Decode all contacts on the rayon pool, in chain order
    #[cfg(feature = "parallel")]
    pub fn contacts_parallel(&self) -> Result<Vec<Contact<'_>>> {
        decode_contacts_parallel(&self.buffer, self.header.first_contact, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{DatabaseBuilder, SettingsBlob};
    use pretty_assertions::assert_eq;

    fn sample() -> MirandaDb {
        let mut builder = DatabaseBuilder::new();
        builder
            .owner()
            .settings(SettingsBlob::new().ascii("Nick", "Me"));
        builder
            .contact()
            .settings(SettingsBlob::new().dword("UIN", 1).ascii("Nick", "Ann"));
        builder
            .contact()
            .settings(SettingsBlob::new().dword("UIN", 2).ascii("Nick", "Bob"));
        builder
            .contact()
            .settings(SettingsBlob::new().dword("UIN", 3).ascii("Nick", "Bob"));
        MirandaDb::from_bytes(builder.build()).unwrap()
    }

    #[test]
    fn test_find_contacts() {
        let db = sample();
        let bobs: Vec<_> = db
            .find_contacts("Nick", "Bob")
            .unwrap()
            .into_iter()
            .map(|c| c.uin().and_then(SettingValue::as_u32))
            .collect();
        assert_eq!(bobs, vec![Some(2), Some(3)]);

        assert_eq!(db.find_contacts("UIN", "1").unwrap().len(), 1);
        assert!(db.find_contacts("Nick", "Nobody").unwrap().is_empty());
    }

    #[test]
    fn test_owner_is_not_in_chain() {
        let db = sample();
        assert!(db.header_warnings().is_empty());
        assert_eq!(db.header().contact_count, 3);
        assert_eq!(db.contacts().count(), 3);

        let owner = db.owner().unwrap().unwrap();
        assert_eq!(owner.display_name, "Me");
    }

    #[test]
    fn test_open_from_file() {
        let mut builder = DatabaseBuilder::new();
        builder
            .contact()
            .settings(SettingsBlob::new().ascii("Nick", "Bob"));
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), builder.build()).unwrap();

        let db = MirandaDb::open(file.path()).unwrap();
        assert!(db.owner().is_none());
        let names: Vec<_> = db.contacts().map(|c| c.unwrap().display_name).collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn test_truncated_file() {
        assert!(matches!(
            MirandaDb::from_bytes(vec![0; 10]),
            Err(Error::TruncatedHeader { size: 10 })
        ));
    }
}
