//! The `export` command

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail};
use miranda_db::{Contact, DatabaseHeader, MirandaDb};
use serde::Serialize;

use crate::cli::{ExportFormat, LoadOptions};
use crate::database::{Database, Exporter};
use crate::utils::{create_progress_bar, open_database};

/// Export document written by `--format json`
#[derive(Serialize)]
struct JsonExport<'a> {
    header: &'a DatabaseHeader,
    contacts: Vec<Contact<'a>>,
}

/// Export every contact of `file` to `output`
pub fn execute(
    file: &Path,
    output: &Path,
    format: ExportFormat,
    force: bool,
    options: &LoadOptions,
) -> Result<()> {
    let db = open_database(file, options)?;

    match format {
        ExportFormat::Sqlite => export_sqlite(&db, output, force),
        ExportFormat::Json => export_json(&db, output, force),
    }
}

fn export_sqlite(db: &MirandaDb, output: &Path, force: bool) -> Result<()> {
    let mut target = Database::create(output, force)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut exporter = Exporter::new(&mut target)?;

    let pb = create_progress_bar(u64::from(db.header().contact_count), "Exporting contacts");
    for contact in db.contacts() {
        let contact = contact.context("Failed to decode contact")?;
        exporter.add_contact(&contact)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = exporter.finish()?;
    println!(
        "Exported {} contacts, {} settings and {} events to {}",
        stats.contacts,
        stats.settings,
        stats.events,
        output.display()
    );
    Ok(())
}

fn export_json(db: &MirandaDb, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "Output file already exists: {} (use --force to replace it)",
            output.display()
        );
    }

    let contacts = db
        .contacts()
        .collect::<miranda_db::Result<Vec<_>>>()
        .context("Failed to decode contact")?;
    let count = contacts.len();
    let document = JsonExport {
        header: db.header(),
        contacts,
    };

    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    serde_json::to_writer_pretty(writer, &document).context("Failed to write JSON")?;

    println!("Exported {count} contacts to {}", output.display());
    Ok(())
}
