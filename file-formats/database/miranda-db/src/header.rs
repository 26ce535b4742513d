//! Database header structure and parsing functionality.

use crate::buffer::{DbBuffer, FixedLayout};
use crate::diagnostics::{DecodeWarning, Decoded, RecordKind, report};
use crate::{Error, Result};
use binrw::BinRead;

/// Signature of a plain Miranda profile
pub const DB_SIGNATURE: [u8; 16] = *b"Miranda ICQ DB\0\x1a";

/// Signature of a profile written by the secured database driver
pub const DB_SIGNATURE_SECURED: [u8; 16] = *b"Miranda ICQ SD\0\x1a";

/// Represents the database header at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[br(little)]
pub struct DatabaseHeader {
    /// The magic signature, see [`DB_SIGNATURE`]
    pub signature: [u8; 16],
    /// Format check word
    pub check_word: u16,
    /// Identifier of the encryption module, 0 when unencrypted
    pub cryptor_uid: u16,
    /// Offset of the end of the used area
    pub file_end: u32,
    /// Bytes of free space inside the used area
    pub slack_space: u32,
    /// Number of contacts, not counting the owner
    pub contact_count: u32,
    /// Offset of the first contact record, 0 if there are none
    pub first_contact: u32,
    /// Offset of the owner's own contact record
    pub user: u32,
    /// Offset of the first module name record
    pub first_module_name: u32,
}

impl FixedLayout for DatabaseHeader {
    const SIZE: usize = 44;
}

impl DatabaseHeader {
    /// The size of the header in bytes
    pub const SIZE: usize = <Self as FixedLayout>::SIZE;

    /// Parse the header at the start of `buffer`.
    ///
    /// An unknown signature does not fail the parse; it is reported as a
    /// warning and the fields are returned as laid out.
    pub fn parse(buffer: &DbBuffer) -> Result<Decoded<Self>> {
        if buffer.len() < Self::SIZE {
            return Err(Error::TruncatedHeader { size: buffer.len() });
        }

        let header: Self = buffer.read_struct(0)?;
        let mut warnings = Vec::new();

        if !header.has_valid_signature() {
            report(
                &mut warnings,
                DecodeWarning::SignatureMismatch {
                    kind: RecordKind::Header,
                    offset: 0,
                    expected: DB_SIGNATURE.to_vec(),
                    found: header.signature.to_vec(),
                },
            );
        }

        log::debug!(
            "Header: {} contacts, first contact at {:#x}, file end {:#x}",
            header.contact_count,
            header.first_contact,
            header.file_end
        );

        Ok(Decoded::new(header, warnings))
    }

    /// Whether the signature is one written by Miranda
    pub fn has_valid_signature(&self) -> bool {
        self.signature == DB_SIGNATURE || self.signature == DB_SIGNATURE_SECURED
    }

    /// Whether the database is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.cryptor_uid != 0
    }

    /// The signature with trailing NUL and control bytes removed, for display
    pub fn signature_text(&self) -> String {
        crate::text::latin1(&self.signature)
            .trim_end_matches(|c: char| c.is_control())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DatabaseBuilder;

    #[test]
    fn test_header_fields() {
        let mut builder = DatabaseBuilder::new();
        builder.contact();
        let image = builder.build();

        let buffer = DbBuffer::from_vec(image);
        let decoded = DatabaseHeader::parse(&buffer).unwrap();
        assert!(decoded.is_clean());

        let header = decoded.value;
        assert_eq!(header.signature, DB_SIGNATURE);
        assert_eq!(header.contact_count, 1);
        assert_eq!(header.first_contact, DatabaseHeader::SIZE as u32);
        assert_eq!(header.file_end as usize, buffer.len());
        assert!(!header.is_encrypted());
        assert_eq!(header.signature_text(), "Miranda ICQ DB");
    }

    #[test]
    fn test_truncated_header() {
        let buffer = DbBuffer::from_vec(vec![0u8; 43]);
        assert!(matches!(
            DatabaseHeader::parse(&buffer),
            Err(Error::TruncatedHeader { size: 43 })
        ));
    }

    #[test]
    fn test_bad_signature_is_a_warning() {
        let mut image = DatabaseBuilder::new().build();
        image[..16].copy_from_slice(b"Not a Miranda DB");
        let buffer = DbBuffer::from_vec(image);

        let decoded = DatabaseHeader::parse(&buffer).unwrap();
        assert_eq!(decoded.value.first_contact, 0);
        assert!(matches!(
            decoded.warnings.as_slice(),
            [DecodeWarning::SignatureMismatch {
                kind: RecordKind::Header,
                offset: 0,
                ..
            }]
        ));
    }

    #[test]
    fn test_secured_signature_accepted() {
        let mut image = DatabaseBuilder::new().build();
        image[..16].copy_from_slice(&DB_SIGNATURE_SECURED);
        let buffer = DbBuffer::from_vec(image);
        assert!(DatabaseHeader::parse(&buffer).unwrap().is_clean());
    }
}
