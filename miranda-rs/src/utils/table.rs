//! Tables of contact settings

use miranda_db::Contact;
use prettytable::{Cell, Row, Table};

use super::format_setting;

/// Setting columns of the `names` listing
pub const NAME_COLUMNS: [&str; 4] = ["UIN", "Nick", "FirstName", "LastName"];

/// An empty table titled with the setting names in `columns`
pub fn settings_table(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        columns
            .iter()
            .map(|name| Cell::new(name).style_spec("b"))
            .collect(),
    ));
    table
}

/// Append the settings of `contact` named by `columns`; missing ones show as `-`
pub fn add_contact_row(table: &mut Table, contact: &Contact<'_>, columns: &[&str]) {
    table.add_row(Row::new(
        columns
            .iter()
            .map(|&key| Cell::new(&format_setting(contact.setting(key))))
            .collect(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use miranda_db::MirandaDb;
    use miranda_db::test_utils::{DatabaseBuilder, SettingsBlob};

    #[test]
    fn test_contact_row() {
        let mut builder = DatabaseBuilder::new();
        builder
            .contact()
            .settings(SettingsBlob::new().dword("UIN", 42).ascii("Nick", "Bob"));
        let db = MirandaDb::from_bytes(builder.build()).unwrap();
        let contact = db.contacts().next().unwrap().unwrap();

        let mut table = settings_table(&NAME_COLUMNS);
        add_contact_row(&mut table, &contact, &NAME_COLUMNS);

        assert_eq!(table.len(), 1);
        let cells: Vec<String> = table[0].iter().map(Cell::get_content).collect();
        assert_eq!(cells, vec!["42", "Bob", "-", "-"]);
    }
}
