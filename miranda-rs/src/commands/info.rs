//! The `info` command

use std::path::Path;

use anyhow::Result;

use crate::cli::LoadOptions;
use crate::utils::{format_bytes, format_offset, format_signature, open_database};

/// Display the header of a database
pub fn execute(file: &Path, options: &LoadOptions) -> Result<()> {
    let db = open_database(file, options)?;
    let header = db.header();

    println!("Miranda Database Information");
    println!("============================");
    println!();
    println!("File: {}", file.display());
    println!("Size: {}", format_bytes(db.buffer().len() as u64));
    println!(
        "Signature: {} ({})",
        format_signature(&header.signature),
        if header.has_valid_signature() {
            "valid"
        } else {
            "unknown"
        }
    );
    println!("Check word: {:#06x}", header.check_word);
    println!(
        "Encryption: {}",
        if header.is_encrypted() {
            format!("cryptor {}", header.cryptor_uid)
        } else {
            "none".to_string()
        }
    );
    println!("File end: {}", format_offset(header.file_end));
    println!("Slack space: {}", format_bytes(u64::from(header.slack_space)));
    println!("Contacts: {}", header.contact_count);
    println!("First contact: {}", format_offset(header.first_contact));
    println!("Owner record: {}", format_offset(header.user));
    println!("First module name: {}", format_offset(header.first_module_name));

    match db.owner() {
        Some(Ok(owner)) => println!("Owner: {}", owner.display_name),
        Some(Err(e)) => println!("Owner: unreadable ({e})"),
        None => println!("Owner: none"),
    }

    for warning in db.header_warnings() {
        println!("Warning: {warning}");
    }

    Ok(())
}
