//! Crawler module for listing traversal and extraction
//!
//! This module contains the core harvesting logic, including:
//! - The shared crawl session and HTTP client
//! - HTTP fetching with timeout and error classification
//! - Search-results pagination
//! - Per-field listing extraction
//! - Overall run control

mod controller;
mod extractor;
mod fetcher;
mod paginator;
mod session;

pub use controller::Controller;
pub use extractor::{extract, extract_from_html, ListingSelectors};
pub use fetcher::{fetch_body, fetch_listing};
pub use paginator::{search, Paginator, ResultsSelectors, SearchResultsPage};
pub use session::{build_http_client, CrawlSession};

use crate::config::Config;
use crate::output::{JsonLinesSink, RunReport};
use crate::HarvestError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest into a newline-delimited JSON file
///
/// This is the main entry point for a run. It will:
/// 1. Open the (already resolved) destination for appending
/// 2. Build the crawl session
/// 3. Fetch the first results page for `query`
/// 4. Process every listing reference until the results run out,
///    the item limit is reached or `cancel` fires
///
/// # Returns
///
/// * `Ok(RunReport)` - The run finished, completed or aborted
/// * `Err(HarvestError)` - The run could not be set up
pub async fn harvest(
    config: Config,
    query: &str,
    destination: &Path,
    cancel: CancellationToken,
) -> Result<RunReport, HarvestError> {
    let sink = JsonLinesSink::open(destination)?;
    tracing::debug!("Appending records to {}", sink.path().display());
    let mut controller = Controller::new(config, sink, cancel)?;
    controller.run(query).await
}
