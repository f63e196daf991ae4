//! Loader for the hymn catalog: a `;`-delimited text table with a header row.
//! The table is read completely at startup and never changes afterwards, so
//! the rest of the program shares it behind an `Arc` without locking.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};

use crate::error::CatalogError;
use crate::models::{Collection, HymnRecord};

const DELIMITER: u8 = b';';
const COLLECTION_COLUMN: &str = "collection";
const NUMBER_COLUMN: &str = "number";
const TITLE_COLUMN: &str = "title";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<HymnRecord>,
}

/// Positions of the required columns within the header row.
struct Columns {
    collection: usize,
    number: usize,
    title: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, CatalogError> {
        let find = |column: &'static str| {
            header
                .iter()
                .position(|name| {
                    name.trim_start_matches('\u{feff}')
                        .eq_ignore_ascii_case(column)
                })
                .ok_or(CatalogError::MissingColumn(column))
        };

        Ok(Self {
            collection: find(COLLECTION_COLUMN)?,
            number: find(NUMBER_COLUMN)?,
            title: find(TITLE_COLUMN)?,
        })
    }

    fn width(&self) -> usize {
        self.collection.max(self.number).max(self.title) + 1
    }
}

/// Required text field of a row; blank values are rejected.
fn required<'r>(
    row: &'r StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<&'r str, CatalogError> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CatalogError::EmptyField { line, column }),
    }
}

impl Catalog {
    /// Read and parse the catalog file. Any problem here is fatal for startup.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        info!(
            "loaded {} hymns from {}",
            catalog.records.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(DELIMITER)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let header = reader.headers()?;
        if header.iter().all(str::is_empty) {
            return Err(CatalogError::Empty);
        }
        let columns = Columns::from_header(header)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let line = row.position().map_or(0, |position| position.line());
            if row.len() < columns.width() {
                return Err(CatalogError::MalformedRow {
                    line,
                    expected: columns.width(),
                    found: row.len(),
                });
            }

            let collection: Collection =
                required(&row, columns.collection, COLLECTION_COLUMN, line)?
                    .parse()
                    .map_err(|source| CatalogError::Collection { line, source })?;
            records.push(HymnRecord::new(
                collection,
                required(&row, columns.number, NUMBER_COLUMN, line)?,
                required(&row, columns.title, TITLE_COLUMN, line)?,
            ));
        }

        let catalog = Self { records };
        catalog.warn_on_duplicates();
        Ok(catalog)
    }

    pub fn from_records(records: Vec<HymnRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HymnRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of a single collection, in catalog order.
    pub fn in_collection(&self, collection: Collection) -> impl Iterator<Item = &HymnRecord> {
        self.records
            .iter()
            .filter(move |record| record.collection == collection)
    }

    /// Numbers are expected to be unique per collection. Duplicates are kept
    /// and the first one wins at lookup time, but we flag them in the log.
    fn warn_on_duplicates(&self) {
        let mut seen = HashSet::new();
        for record in &self.records {
            if !seen.insert((record.collection, record.number.as_str())) {
                warn!(
                    "duplicate hymn number {} in collection {}; \"{}\" is unreachable by number",
                    record.number, record.collection, record.title
                );
            }
        }
    }
}
