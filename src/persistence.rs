//! Saving and loading catalogs.
//!
//! Two encodings are supported, chosen by file extension:
//!
//! - flat text (default): one `title,author,isbn,publicationYear,totalCopies`
//!   line per title, no header and no escaping. Titles or authors containing
//!   commas cannot be represented. Checked-out copies are not recorded, so a
//!   reload starts every title fully available.
//! - JSON snapshot (`.json`): the same fields plus the available count.
//!
//! Both writers emit titles oldest first so a reload rebuilds the registry
//! in its original order. Loading resets the inventory, then ingests entry
//! by entry; a bad entry is recorded in the [`LoadReport`] and skipped.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{book::CatalogEntry, error::PersistenceError, inventory::Inventory};

/// Number of comma-separated fields in a flat-text line
const FIELD_COUNT: usize = 5;

/// On-disk encoding of a catalog file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated lines
    Text,
    /// Pretty-printed JSON snapshot
    Json,
}

impl Format {
    /// Pick the encoding from the file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Outcome of a load
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Entries accepted by the inventory
    pub loaded: usize,
    /// Entries that were skipped, with the reason
    pub rejected: Vec<PersistenceError>,
}

impl LoadReport {
    /// Whether every entry was loaded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Record one entry's outcome
    fn record(&mut self, line: usize, outcome: Result<(), PersistenceError>) {
        match outcome {
            Ok(()) => self.loaded = self.loaded.saturating_add(1),
            Err(error) => {
                warn!(line, %error, "skipping catalog entry");
                self.rejected.push(error);
            }
        }
    }
}

/// One title in a JSON snapshot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SnapshotEntry {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Catalog key
    pub isbn: String,
    /// Year of publication
    pub publication_year: i32,
    /// Copies ever added
    pub total_copies: u32,
    /// Copies on the shelf
    pub available_copies: u32,
}

impl From<CatalogEntry<'_>> for SnapshotEntry {
    fn from(entry: CatalogEntry<'_>) -> Self {
        Self {
            title: entry.book.title().to_string(),
            author: entry.book.author().to_string(),
            isbn: entry.book.isbn().to_string(),
            publication_year: entry.book.publication_year(),
            total_copies: entry.total_copies(),
            available_copies: entry.available_copies(),
        }
    }
}

/// Serializable representation of a whole catalog
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Snapshot {
    /// Titles, oldest first
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Capture the current catalog
    #[must_use]
    pub fn capture(inventory: &Inventory) -> Self {
        Self { entries: oldest_first(inventory).into_iter().map(SnapshotEntry::from).collect() }
    }
}

/// Catalog entries in the order they were first added
fn oldest_first(inventory: &Inventory) -> Vec<CatalogEntry<'_>> {
    let mut entries: Vec<_> = inventory.entries().collect();
    entries.reverse();
    entries
}

/// Write the catalog as flat text, returning the number of lines written
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn write_text<W: Write>(inventory: &Inventory, mut writer: W) -> std::io::Result<usize> {
    let entries = oldest_first(inventory);
    for entry in &entries {
        let book = entry.book;
        writeln!(
            writer,
            "{},{},{},{},{}",
            book.title(),
            book.author(),
            book.isbn(),
            book.publication_year(),
            entry.total_copies()
        )?;
    }
    writer.flush()?;
    Ok(entries.len())
}

/// Reset `inventory` and ingest flat-text lines from `reader`
///
/// Blank lines are ignored. Lines that are not valid UTF-8, have the wrong
/// number of fields or malformed numbers, or hold values the inventory
/// rejects are reported and skipped.
///
/// # Errors
///
/// Returns `PersistenceError::Format` if the reader itself fails part way;
/// lines read before the failure stay loaded.
pub fn read_text<R: BufRead>(
    inventory: &mut Inventory,
    reader: R,
) -> Result<LoadReport, PersistenceError> {
    inventory.reset();
    let mut report = LoadReport::default();
    for (number, line) in (1_usize..).zip(reader.lines()) {
        let line = match line {
            Ok(line) => line,
            Err(error) if error.kind() == ErrorKind::InvalidData => {
                let reason = format!("unreadable line: {error}");
                report.record(number, Err(PersistenceError::Format { line: number, reason }));
                continue;
            }
            Err(error) => {
                return Err(PersistenceError::Format {
                    line: number,
                    reason: format!("read failed: {error}"),
                });
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let outcome = parse_line(number, &line).and_then(|fields| {
            inventory
                .add(fields.title, fields.author, fields.isbn, fields.publication_year, fields.copies)
                .map(drop)
                .map_err(|source| PersistenceError::Rejected { line: number, source })
        });
        report.record(number, outcome);
    }
    Ok(report)
}

/// Fields of one flat-text line
#[derive(Debug)]
struct TextRecord<'a> {
    /// Title field
    title: &'a str,
    /// Author field
    author: &'a str,
    /// ISBN field
    isbn: &'a str,
    /// Parsed publication year
    publication_year: i32,
    /// Parsed copy count
    copies: i64,
}

/// Split and parse one flat-text line
fn parse_line(number: usize, line: &str) -> Result<TextRecord<'_>, PersistenceError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let &[title, author, isbn, year, copies] = fields.as_slice() else {
        return Err(PersistenceError::Format {
            line: number,
            reason: format!("expected {FIELD_COUNT} comma-separated fields, found {}", fields.len()),
        });
    };
    let publication_year = year.parse().map_err(|_| PersistenceError::Format {
        line: number,
        reason: format!("invalid publication year {year:?}"),
    })?;
    let copies = copies.parse().map_err(|_| PersistenceError::Format {
        line: number,
        reason: format!("invalid number of copies {copies:?}"),
    })?;
    Ok(TextRecord { title, author, isbn, publication_year, copies })
}

/// Write the catalog as a JSON snapshot, returning the number of entries
///
/// # Errors
///
/// Returns `PersistenceError::Json` if encoding or writing fails.
pub fn write_json<W: Write>(inventory: &Inventory, writer: W) -> Result<usize, PersistenceError> {
    let snapshot = Snapshot::capture(inventory);
    serde_json::to_writer_pretty(writer, &snapshot)?;
    Ok(snapshot.entries.len())
}

/// Reset `inventory` and restore a JSON snapshot from `reader`
///
/// The snapshot is decoded completely before the inventory is touched.
///
/// # Errors
///
/// Returns `PersistenceError::Json` if the snapshot cannot be decoded; the
/// inventory is unchanged in that case.
pub fn read_json<R: Read>(
    inventory: &mut Inventory,
    reader: R,
) -> Result<LoadReport, PersistenceError> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    inventory.reset();
    let mut report = LoadReport::default();
    for (number, entry) in (1_usize..).zip(&snapshot.entries) {
        let outcome = inventory
            .restore(
                &entry.title,
                &entry.author,
                &entry.isbn,
                entry.publication_year,
                i64::from(entry.total_copies),
                i64::from(entry.available_copies),
            )
            .map(drop)
            .map_err(|source| PersistenceError::Rejected { line: number, source });
        report.record(number, outcome);
    }
    Ok(report)
}

/// Save the catalog to `path`, in the format its extension selects
///
/// # Errors
///
/// Returns `PersistenceError::Io` if the file cannot be created or written,
/// or `PersistenceError::Json` if a snapshot cannot be encoded.
pub fn save_to_file(inventory: &Inventory, path: impl AsRef<Path>) -> Result<usize, PersistenceError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    let written = match Format::from_path(path) {
        Format::Text => write_text(inventory, &mut writer).map_err(|source| io_error(path, source))?,
        Format::Json => {
            let written = write_json(inventory, &mut writer)?;
            writer.flush().map_err(|source| io_error(path, source))?;
            written
        }
    };
    info!(path = %path.display(), entries = written, "catalog saved");
    Ok(written)
}

/// Replace the catalog with the contents of `path`
///
/// The file is opened before anything is reset, so a missing file leaves
/// the inventory as it was.
///
/// # Errors
///
/// Returns `PersistenceError::Io` if the file cannot be opened, or the
/// reader's error if the contents cannot be read.
pub fn load_from_file(
    inventory: &mut Inventory,
    path: impl AsRef<Path>,
) -> Result<LoadReport, PersistenceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);
    let report = match Format::from_path(path) {
        Format::Text => read_text(inventory, reader)?,
        Format::Json => read_json(inventory, reader)?,
    };
    info!(
        path = %path.display(),
        loaded = report.loaded,
        rejected = report.rejected.len(),
        "catalog loaded"
    );
    Ok(report)
}

/// Attach the path to an I/O error
fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io { path: PathBuf::from(path), source }
}
