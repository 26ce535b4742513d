//! Writing decoded contacts into the export database

use miranda_db::Contact;
use rusqlite::{Transaction, params};

use super::Database;
use super::connection::Result;

/// Row counts written by an export
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    /// Rows written to `contacts`
    pub contacts: usize,
    /// Rows written to `settings`
    pub settings: usize,
    /// Rows written to `events`
    pub events: usize,
}

/// Writes contacts inside one transaction; nothing is kept unless
/// [`Exporter::finish`] is called.
#[derive(Debug)]
pub struct Exporter<'a> {
    tx: Transaction<'a>,
    stats: ExportStats,
}

impl<'a> Exporter<'a> {
    /// Start an export into `db`
    pub fn new(db: &'a mut Database) -> Result<Self> {
        Ok(Self {
            tx: db.transaction()?,
            stats: ExportStats::default(),
        })
    }

    /// Insert a contact with its settings and events, returning its row id
    pub fn add_contact(&mut self, contact: &Contact<'_>) -> Result<i64> {
        self.tx.execute(
            "INSERT INTO contacts (name, file_offset) VALUES (?1, ?2)",
            params![contact.display_name, contact.offset],
        )?;
        let id = self.tx.last_insert_rowid();

        {
            let mut stmt = self.tx.prepare_cached(
                "INSERT INTO settings (owner, name, type, value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (name, value) in &contact.settings {
                stmt.execute(params![
                    id,
                    name,
                    value.setting_type().name(),
                    value.to_string()
                ])?;
            }
        }

        {
            let mut stmt = self.tx.prepare_cached(
                "INSERT INTO events (owner, timestamp, direction, type, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for event in &contact.events {
                stmt.execute(params![
                    id,
                    event.header.timestamp,
                    event.direction().to_string(),
                    event.type_name(),
                    event.text
                ])?;
            }
        }

        self.stats.contacts += 1;
        self.stats.settings += contact.settings.len();
        self.stats.events += contact.events.len();
        log::debug!("Exported contact {id}: {}", contact.display_name);

        Ok(id)
    }

    /// Commit the export
    pub fn finish(self) -> Result<ExportStats> {
        self.tx.commit()?;
        Ok(self.stats)
    }
}
