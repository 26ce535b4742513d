//! Database connection management

use rusqlite::{Connection, Result as SqlResult};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::schema;

/// Errors that can occur during database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output file is already there and overwriting was not requested
    #[error("Output file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

pub(super) type Result<T> = std::result::Result<T, DatabaseError>;

/// Database connection wrapper
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Create a new export database at `path`.
    ///
    /// Fails if the file exists, unless `overwrite` is set, in which case
    /// the old file is removed first.
    pub fn create(path: &Path, overwrite: bool) -> Result<Self> {
        if path.exists() {
            if !overwrite {
                return Err(DatabaseError::AlreadyExists(path.to_path_buf()));
            }
            log::info!("Removing existing file {}", path.display());
            std::fs::remove_file(path)?;
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        schema::init_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an in-memory database, used by tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Begin a transaction
    pub fn transaction(&mut self) -> SqlResult<rusqlite::Transaction<'_>> {
        self.conn.transaction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.db3");
        std::fs::write(&path, b"existing").unwrap();

        assert!(matches!(
            Database::create(&path, false),
            Err(DatabaseError::AlreadyExists(_))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"existing");

        let db = Database::create(&path, true).unwrap();
        assert_eq!(db.path(), path);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/export.db3");
        Database::create(&path, false).unwrap();
        assert!(path.exists());
    }
}
