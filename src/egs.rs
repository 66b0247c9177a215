use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

/// One row of the EGS achievement localization table. Identity key is
/// (name, locale); the table assumes it unique but does not enforce it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationRecord {
    pub name: String,
    pub locale: String,
    pub locked_title: String,
    pub locked_description: String,
    pub unlocked_title: String,
    pub unlocked_description: String,
    pub flavor_text: String,
    pub locked_icon: String,
    pub unlocked_icon: String,
}

/// Field count of the CSV wire format.
pub const RECORD_FIELD_COUNT: usize = 9;

#[derive(Debug)]
pub enum TableError {
    Io(io::Error),
    /// A row in the table did not have exactly [`RECORD_FIELD_COUNT`] fields.
    MalformedRow { line: u64, fields: usize },
    Csv(csv::Error),
}

impl From<io::Error> for TableError {
    fn from(value: io::Error) -> Self {
        TableError::Io(value)
    }
}

impl From<csv::Error> for TableError {
    fn from(value: csv::Error) -> Self {
        TableError::Csv(value)
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(e) => write!(f, "IO error: {}", e),
            TableError::MalformedRow { line, fields } => write!(
                f,
                "Malformed row on line {}: expected {} fields, found {}",
                line, RECORD_FIELD_COUNT, fields
            ),
            TableError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for TableError {}

/**
The EGS achievement localization table: an ordered list of
[`LocalizationRecord`] rows backed by a headerless 9-column CSV file in
which every field is double-quoted.

The table is loaded once, mutated in place by the merge pass and written
once. The written file is valid input for the next run.
*/
#[derive(Debug, Default)]
pub struct LocalizationTable {
    records: Vec<LocalizationRecord>,
}

impl LocalizationTable {
    /**
    Loads a table from a CSV file on disk.

    # Errors
    - [`TableError::Io`] when the file can't be opened
    - [`TableError::MalformedRow`] when a row does not have exactly 9 fields
    - [`TableError::Csv`] when the file is not well-formed CSV
    */
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LocalizationTable, TableError> {
        let file = File::open(path)?;

        LocalizationTable::from_csv_reader(BufReader::new(file))
    }

    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<LocalizationTable, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();

        for row in csv_reader.records() {
            let row = row?;

            if row.len() != RECORD_FIELD_COUNT {
                return Err(TableError::MalformedRow {
                    line: row.position().map(|p| p.line()).unwrap_or(0),
                    fields: row.len(),
                });
            }

            records.push(row.deserialize(None)?);
        }

        Ok(LocalizationTable { records })
    }

    /// Writes the table back out, one quoted 9-field row per record, in
    /// table order, with no header row.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let mut writer = BufWriter::new(File::create(path)?);

        self.write_csv(&mut writer)?;
        writer.flush()?;

        Ok(())
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(writer);

        for record in &self.records {
            csv_writer.serialize(record)?;
        }

        csv_writer.flush()?;

        Ok(())
    }

    pub fn find(&self, name: &str, locale: &str) -> Option<&LocalizationRecord> {
        self.records
            .iter()
            .find(|record| record.name == name && record.locale == locale)
    }

    pub fn find_mut(&mut self, name: &str, locale: &str) -> Option<&mut LocalizationRecord> {
        self.records
            .iter_mut()
            .find(|record| record.name == name && record.locale == locale)
    }

    pub fn push(&mut self, record: LocalizationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LocalizationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
