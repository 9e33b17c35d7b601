//! Local CSV file storage.
//!
//! ## Behavior
//!
//! - **Header once**: the header row is written only when the file is created
//!   (or exists but is empty). An existing header must match exactly.
//! - **Append only**: rows are appended in call order; nothing is reordered.
//! - **Duplicates kept**: `append` never checks for existing rows. Re-running
//!   a range appends it again unless `append_unique` is used.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{NormalizedRow, RowSchema};
use crate::storage::RowSink;

/// CSV file with a fixed header.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    header: RowSchema,
}

impl CsvSink {
    /// Open a sink, creating the file with `header` if it does not exist.
    pub fn open(path: impl Into<PathBuf>, header: RowSchema) -> Result<Self> {
        let path = path.into();
        ensure_schema(&path, &header)?;
        Ok(Self { path, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project rows onto the header, failing on the first incomplete row.
    fn records<'a>(&'a self, rows: &'a [NormalizedRow]) -> Result<Vec<Vec<&'a str>>> {
        rows.iter()
            .map(|row| {
                row.project(self.header.fields()).map_err(|missing| {
                    AppError::validation(format!(
                        "row is missing column '{}' for {}",
                        missing,
                        self.path.display()
                    ))
                })
            })
            .collect()
    }

    fn write_records(&self, records: &[Vec<&str>]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let file = open_for_append(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for record in records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn check_key(&self, key: &[String]) -> Result<()> {
        if key.is_empty() {
            return Err(AppError::validation("dedup key is empty"));
        }
        match key.iter().find(|k| !self.header.contains(k)) {
            Some(k) => Err(AppError::validation(format!(
                "dedup key column '{}' is not in {}",
                k,
                self.path.display()
            ))),
            None => Ok(()),
        }
    }
}

impl RowSink for CsvSink {
    fn header(&self) -> &RowSchema {
        &self.header
    }

    fn append(&mut self, rows: &[NormalizedRow]) -> Result<usize> {
        let records = self.records(rows)?;
        self.write_records(&records)?;
        log::debug!("Appended {} rows to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn append_unique(&mut self, rows: &[NormalizedRow], key: &[String]) -> Result<usize> {
        self.check_key(key)?;
        let records = self.records(rows)?;

        let (_, existing) = read_rows(&self.path)?;
        let mut seen: HashSet<Vec<String>> = existing
            .iter()
            .filter_map(|row| row.project(key).ok())
            .map(|values| values.into_iter().map(str::to_string).collect())
            .collect();

        let mut fresh = Vec::new();
        for (row, record) in rows.iter().zip(records) {
            let Ok(values) = row.project(key) else {
                continue;
            };
            let values: Vec<String> = values.into_iter().map(str::to_string).collect();
            if seen.insert(values) {
                fresh.push(record);
            }
        }

        let skipped = rows.len() - fresh.len();
        if skipped > 0 {
            log::info!(
                "Skipped {} rows already present in {}",
                skipped,
                self.path.display()
            );
        }
        self.write_records(&fresh)?;
        Ok(fresh.len())
    }
}

/// Create `path` with a header row if it does not exist yet.
///
/// Returns `true` when the header was written. An existing non-empty file is
/// left untouched, but its header must equal `header`.
pub fn ensure_schema(path: &Path, header: &RowSchema) -> Result<bool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            write_header(file, header)?;
            log::info!("Created {}", path.display());
            return Ok(true);
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e.into()),
    }

    if fs::metadata(path)?.len() == 0 {
        let file = OpenOptions::new().append(true).open(path)?;
        write_header(file, header)?;
        return Ok(true);
    }

    let mut reader = csv::Reader::from_path(path)?;
    let existing = reader.headers()?;
    if existing.iter().ne(header.fields().iter().map(String::as_str)) {
        return Err(AppError::validation(format!(
            "{} has header [{}], expected [{}]",
            path.display(),
            existing.iter().collect::<Vec<_>>().join(", "),
            header.fields().join(", ")
        )));
    }
    Ok(false)
}

/// Open `path` for appending, first terminating a last line that lacks a
/// newline so the next record starts on its own line.
fn open_for_append(path: &Path) -> Result<File> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            log::warn!("{} does not end with a newline; adding one", path.display());
            file.write_all(b"\n")?;
        }
    }
    Ok(file)
}

fn write_header(file: File, header: &RowSchema) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(header.fields())?;
    writer.flush()?;
    Ok(())
}

/// Load a CSV file written by a sink.
pub fn read_rows(path: &Path) -> Result<(RowSchema, Vec<NormalizedRow>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let schema = RowSchema::new(reader.headers()?.iter())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: NormalizedRow = schema
            .fields()
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok((schema, rows))
}
