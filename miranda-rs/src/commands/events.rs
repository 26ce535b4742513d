//! The `events` command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::cli::LoadOptions;
use crate::utils::open_database;

/// Print every event of every contact, one per line
pub fn execute(file: &Path, options: &LoadOptions) -> Result<()> {
    let db = open_database(file, options)?;
    let mut total = 0usize;

    for contact in db.contacts() {
        let contact = contact.context("Failed to decode contact")?;
        for event in &contact.events {
            println!("{}", event.line(&contact.display_name, &Local));
        }
        total += contact.events.len();
    }

    log::info!("Printed {total} events");
    Ok(())
}
