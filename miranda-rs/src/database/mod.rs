//! SQLite export of decoded profiles
//!
//! The export database has one row per contact, and rows for the contact's
//! settings and events keyed by the contact's row id.

mod connection;
mod export;
mod schema;

pub use connection::{Database, DatabaseError};
pub use export::{ExportStats, Exporter};
