//! Parallel contact decoding

use rayon::prelude::*;

use crate::buffer::DbBuffer;
use crate::chain::contact_offsets;
use crate::contact::{Contact, decode_contact};
use crate::options::DecodeOptions;
use crate::Result;

/// Decode every contact in the chain starting at `first` on the rayon pool.
///
/// The contact chain itself is walked sequentially, reading only the fixed
/// headers, then each contact with its settings and events is decoded
/// independently. The result keeps chain order, and when several contacts
/// fail the error of the earliest one in the chain is returned.
pub fn decode_contacts_parallel<'a>(
    buffer: &'a DbBuffer,
    first: u32,
    options: &DecodeOptions,
) -> Result<Vec<Contact<'a>>> {
    let offsets = contact_offsets(buffer, first)?;
    log::debug!(
        "Decoding {} contacts on {} threads",
        offsets.len(),
        rayon::current_num_threads()
    );

    let results: Vec<Result<Contact<'a>>> = offsets
        .par_iter()
        .map(|&offset| decode_contact(buffer, offset, options))
        .collect();
    results.into_iter().collect()
}
