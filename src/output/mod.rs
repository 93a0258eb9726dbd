//! Output module for persisting listing records and reporting runs
//!
//! This module handles:
//! - Appending records to newline-delimited JSON, one line per record
//! - Resolving the output destination before a run starts
//! - Summarising a finished run

mod destination;
mod report;
mod sink;

pub use destination::{resolve_destination, ConflictPolicy};
pub use report::{print_report, AbortReason, RunReport};
pub use sink::{read_records, JsonLinesSink, RecordSink, SinkError};
