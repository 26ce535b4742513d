//! Loading databases from disk

use std::path::Path;

use anyhow::{Context, Result};
use miranda_db::{DbBuffer, MirandaDb};

use crate::cli::LoadOptions;

/// Load and check the header of the database at `path`
pub fn open_database(path: &Path, options: &LoadOptions) -> Result<MirandaDb> {
    let buffer = if options.mmap {
        DbBuffer::open_mmap(path)
    } else {
        DbBuffer::open(path)
    }
    .with_context(|| format!("Failed to open database: {}", path.display()))?;

    log::info!(
        "Loaded {} ({} bytes, UTF mode {:?})",
        path.display(),
        buffer.len(),
        options.utf_mode
    );

    MirandaDb::from_buffer(buffer, options.decode_options())
        .with_context(|| format!("Failed to read database header: {}", path.display()))
}
