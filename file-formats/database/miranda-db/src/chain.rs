//! Walking the contact chain.

use std::collections::HashSet;

use crate::buffer::DbBuffer;
use crate::contact::{Contact, ContactHeader, decode_contact};
use crate::diagnostics::RecordKind;
use crate::options::DecodeOptions;
use crate::{Error, Result};

/// Offsets visited by one chain walk.
///
/// Every record chain in the file is terminated by a zero offset; a corrupt
/// file can instead link back to an earlier record.
#[derive(Debug)]
pub(crate) struct ChainGuard {
    kind: RecordKind,
    visited: HashSet<u32>,
}

impl ChainGuard {
    pub(crate) fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            visited: HashSet::new(),
        }
    }

    /// Record a visit, failing if `offset` was seen before
    pub(crate) fn visit(&mut self, offset: u32) -> Result<()> {
        if self.visited.insert(offset) {
            Ok(())
        } else {
            Err(Error::ChainCycle {
                kind: self.kind,
                offset,
            })
        }
    }
}

/// Iterator over the contacts of a database, in chain order.
///
/// Yields one `Result` per contact. After the first error the iterator is
/// exhausted, since the `next` offset of a failed record is unknown.
#[derive(Debug)]
pub struct ContactChain<'a> {
    buffer: &'a DbBuffer,
    options: DecodeOptions,
    next: u32,
    guard: ChainGuard,
}

impl<'a> ContactChain<'a> {
    /// Start a walk at `first`, usually `header.first_contact`
    pub fn new(buffer: &'a DbBuffer, first: u32, options: DecodeOptions) -> Self {
        Self {
            buffer,
            options,
            next: first,
            guard: ChainGuard::new(RecordKind::Contact),
        }
    }
}

impl<'a> Iterator for ContactChain<'a> {
    type Item = Result<Contact<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }

        let offset = self.next;
        let result = self
            .guard
            .visit(offset)
            .and_then(|()| decode_contact(self.buffer, offset, &self.options));

        self.next = match &result {
            Ok(contact) => contact.next(),
            Err(_) => 0,
        };
        Some(result)
    }
}

/// Offsets of every contact in the chain starting at `first`.
///
/// Reads only the fixed contact headers, so it is much cheaper than a full
/// walk.
pub fn contact_offsets(buffer: &DbBuffer, first: u32) -> Result<Vec<u32>> {
    let mut offsets = Vec::new();
    let mut guard = ChainGuard::new(RecordKind::Contact);
    let mut offset = first;

    while offset != 0 {
        guard.visit(offset)?;
        offsets.push(offset);
        let header: ContactHeader = buffer.read_struct(offset)?;
        offset = header.next;
    }

    Ok(offsets)
}
