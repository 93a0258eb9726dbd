//! Run report
//!
//! Every run ends with a report, however it ended, so the number of
//! captured records is never lost.

use crate::state::RunState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Why a run ended in `Aborted`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The operator interrupted the run
    OperatorCancelled,

    /// An unrecoverable error
    Fatal(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorCancelled => write!(f, "cancelled by operator"),
            Self::Fatal(message) => write!(f, "fatal error: {}", message),
        }
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub query: String,
    pub state: RunState,
    pub abort_reason: Option<AbortReason>,

    /// Records appended to the sink during this run
    pub records_written: u64,

    /// Listings skipped after a recoverable failure, keyed by error kind
    pub skipped: HashMap<&'static str, u64>,

    /// Results pages parsed, including the first
    pub pages_visited: usize,

    /// References handed out by the paginator
    pub references_seen: usize,

    /// Listing count the site reported for the query
    pub total_found: Option<u64>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            state: RunState::Ready,
            abort_reason: None,
            records_written: 0,
            skipped: HashMap::new(),
            pages_visited: 0,
            references_seen: 0,
            total_found: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Counts one skipped listing
    pub fn record_skip(&mut self, kind: &'static str) {
        *self.skipped.entry(kind).or_insert(0) += 1;
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn was_cancelled(&self) -> bool {
        self.abort_reason == Some(AbortReason::OperatorCancelled)
    }

    /// Wall-clock duration, once the run has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints a run report to stdout in a formatted manner
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    println!("Query: {}", report.query);
    match &report.abort_reason {
        Some(reason) => println!("Status: {} ({})", report.state, reason),
        None => println!("Status: {}", report.state),
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    println!("Overview:");
    if let Some(total) = report.total_found {
        println!("  Listings reported by site: {}", total);
    }
    println!("  Result pages visited: {}", report.pages_visited);
    println!("  Listings seen: {}", report.references_seen);
    println!("  Records written: {}", report.records_written);
    println!("  Listings skipped: {}", report.total_skipped());
    println!();

    if !report.skipped.is_empty() {
        println!("Skip Summary:");
        let mut skip_counts: Vec<_> = report.skipped.iter().collect();
        skip_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (kind, count) in skip_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }
}
