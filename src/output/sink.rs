//! Incremental record sink
//!
//! Every record is serialised and written as one line the moment it is
//! appended. Nothing is held back in memory, so a killed process keeps
//! every record appended before it died.

use crate::listing::ListingRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing or reading records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed record on line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

/// Destination for extracted records
///
/// Implementations must persist a record before `append` returns.
pub trait RecordSink {
    /// Persists one record after all previously appended ones
    fn append(&mut self, record: &ListingRecord) -> Result<(), SinkError>;

    /// Number of records appended through this sink
    fn records_written(&self) -> u64;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        (**self).append(record)
    }

    fn records_written(&self) -> u64 {
        (**self).records_written()
    }
}

/// Newline-delimited JSON file sink
///
/// The file is opened in append mode; the write position only moves
/// forward.
#[derive(Debug)]
pub struct JsonLinesSink {
    file: File,
    path: PathBuf,
    written: u64,
}

impl JsonLinesSink {
    /// Opens (or creates) the destination for appending
    ///
    /// The destination is assumed to be resolved already; existing content
    /// is kept.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn append(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        // One write per record so a line is never split across appends
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;

        self.written += 1;
        tracing::trace!("Appended record {} to {}", record.id, self.path.display());
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}

/// Reads every record back from a newline-delimited JSON file
///
/// Blank lines are skipped.
pub fn read_records(path: &Path) -> Result<Vec<ListingRecord>, SinkError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| SinkError::Malformed {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
