//! Contact listing commands: `names`, `find` and `contacts`

use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use miranda_db::MirandaDb;

use crate::cli::LoadOptions;
use crate::utils::{
    NAME_COLUMNS, add_contact_row, format_timestamp, open_database, settings_table,
};

/// Print one contact with its warnings
fn print_contact(contact: &miranda_db::Contact<'_>) {
    print!("{contact}");
    let first_unread =
        DateTime::from_timestamp(i64::from(contact.header.timestamp_first_unread), 0)
            .unwrap_or_default();
    println!("First unread: {}", format_timestamp(first_unread));
    for warning in &contact.warnings {
        println!("Warning: {warning}");
    }
}

/// Decode every contact, in chain order
fn for_each_contact(
    db: &MirandaDb,
    mut f: impl FnMut(&miranda_db::Contact<'_>),
) -> Result<()> {
    for contact in db.contacts() {
        let contact = contact.context("Failed to decode contact")?;
        f(&contact);
    }
    Ok(())
}

/// Table of UIN, nick, first name and last name
pub fn names(file: &Path, options: &LoadOptions) -> Result<()> {
    let db = open_database(file, options)?;
    let mut table = settings_table(&NAME_COLUMNS);

    for_each_contact(&db, |contact| {
        add_contact_row(&mut table, contact, &NAME_COLUMNS);
    })?;

    if table.is_empty() {
        println!("No contacts found");
    } else {
        table.printstd();
    }
    Ok(())
}

/// Contacts whose setting `key` displays as `value`
pub fn find(file: &Path, key: &str, value: &str, options: &LoadOptions) -> Result<()> {
    let db = open_database(file, options)?;
    let found = db
        .find_contacts(key, value)
        .context("Failed to decode contact")?;

    if found.is_empty() {
        println!("No contact with {key} = {value}");
    }
    for contact in &found {
        print_contact(contact);
    }
    Ok(())
}

/// Every contact with its settings
pub fn list(file: &Path, options: &LoadOptions) -> Result<()> {
    let db = open_database(file, options)?;
    print_all(&db)
}

#[cfg(not(feature = "parallel"))]
fn print_all(db: &MirandaDb) -> Result<()> {
    for_each_contact(db, print_contact)
}

#[cfg(feature = "parallel")]
fn print_all(db: &MirandaDb) -> Result<()> {
    let contacts = db
        .contacts_parallel()
        .context("Failed to decode contact")?;
    contacts.iter().for_each(print_contact);
    Ok(())
}
