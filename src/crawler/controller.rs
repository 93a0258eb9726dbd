//! Run controller - main harvest orchestration logic
//!
//! Pulls references from the paginator one at a time and, for each,
//! fetches the listing, extracts the record and appends it to the sink.
//! Recoverable failures skip the listing; cancellation and fatal errors
//! abort the run. Records already appended are never touched again.

use crate::config::Config;
use crate::crawler::extractor::{extract, ListingSelectors};
use crate::crawler::fetcher::fetch_listing;
use crate::crawler::paginator::{search, Paginator, ResultsSelectors};
use crate::crawler::session::CrawlSession;
use crate::listing::{ListingRecord, ListingReference};
use crate::output::{AbortReason, RecordSink, RunReport};
use crate::state::RunState;
use crate::HarvestError;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Main run controller structure
pub struct Controller<S: RecordSink> {
    config: Config,
    results_selectors: ResultsSelectors,
    listing_selectors: ListingSelectors,
    max_items: Option<usize>,
    sink: S,
    cancel: CancellationToken,
    state: RunState,
}

impl<S: RecordSink> Controller<S> {
    /// Creates a new controller instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `sink` - Destination for records, already resolved
    /// * `cancel` - Token the operator cancels to stop the run
    ///
    /// # Returns
    ///
    /// * `Ok(Controller)` - Controller in the `Ready` state
    /// * `Err(HarvestError)` - A configured selector does not compile
    pub fn new(config: Config, sink: S, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let results_selectors = ResultsSelectors::compile(&config.selectors)?;
        let listing_selectors = ListingSelectors::compile(&config.selectors)?;

        Ok(Self {
            max_items: config.crawler.max_items,
            config,
            results_selectors,
            listing_selectors,
            sink,
            cancel,
            state: RunState::Ready,
        })
    }

    /// Overrides the configured item limit
    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs a harvest for `query` on a session built from the configuration
    ///
    /// # Errors
    ///
    /// Only when the controller has already run. Every other outcome,
    /// including failures, is described by the returned report.
    pub async fn run(&mut self, query: &str) -> Result<RunReport, HarvestError> {
        self.ensure_ready()?;

        match CrawlSession::new(&self.config) {
            Ok(mut session) => self.run_with_session(&mut session, query).await,
            Err(e) => {
                tracing::error!("Failed to set up crawl session: {}", e);
                let report = RunReport::new(query);
                self.finish(report, RunState::Aborted, Some(AbortReason::Fatal(e.to_string())))
            }
        }
    }

    /// Runs a harvest for `query` on a caller-provided session
    pub async fn run_with_session(
        &mut self,
        session: &mut CrawlSession,
        query: &str,
    ) -> Result<RunReport, HarvestError> {
        self.ensure_ready()?;
        let mut report = RunReport::new(query);
        self.transition(RunState::Running)?;
        report.state = RunState::Running;
        tracing::info!("Starting harvest for query '{}'", query);

        let cancel = self.cancel.clone();

        let first_page = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return self.finish(report, RunState::Aborted, Some(AbortReason::OperatorCancelled));
            }
            result = search(session, query, &self.results_selectors) => result,
        };

        let first_page = match first_page {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Search request failed: {}", e);
                let reason = AbortReason::Fatal(e.to_string());
                return self.finish(report, RunState::Aborted, Some(reason));
            }
        };

        report.total_found = first_page.total_found;
        if let Some(total) = first_page.total_found {
            tracing::info!("Site reports {} listings for '{}'", total, query);
        }

        let mut paginator = Paginator::new(
            first_page,
            self.results_selectors.clone(),
            self.max_items,
        );

        let abort_reason = loop {
            if cancel.is_cancelled() {
                break Some(AbortReason::OperatorCancelled);
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Some(AbortReason::OperatorCancelled),
                next = paginator.next_reference(session) => next,
            };

            let Some(reference) = next else {
                break None;
            };
            tracing::debug!("Processing reference: {}", reference);

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Some(AbortReason::OperatorCancelled),
                result = harvest_listing(session, &reference, &self.listing_selectors) => result,
            };

            match result {
                Ok(record) => {
                    if let Err(e) = self.sink.append(&record) {
                        let error = HarvestError::from(e);
                        tracing::error!("Failed to persist listing {}: {}", record.id, error);
                        break Some(AbortReason::Fatal(error.to_string()));
                    }
                    report.records_written += 1;
                    tracing::info!("Processed listing {}: {}", record.id, record.name);

                    let missing = record.missing_fields();
                    if !missing.is_empty() {
                        tracing::debug!("Listing {} has no {}", record.id, missing.join(", "));
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping {}: {}", reference, e);
                    report.record_skip(e.kind());
                }
                Err(e) => {
                    tracing::error!("Fatal error on {}: {}", reference, e);
                    break Some(AbortReason::Fatal(e.to_string()));
                }
            }
        };

        report.pages_visited = paginator.pages_visited();
        report.references_seen = paginator.references_yielded();

        match abort_reason {
            None => self.finish(report, RunState::Completed, None),
            Some(reason) => self.finish(report, RunState::Aborted, Some(reason)),
        }
    }

    fn ensure_ready(&self) -> Result<(), HarvestError> {
        if self.state == RunState::Ready {
            Ok(())
        } else {
            Err(HarvestError::InvalidTransition {
                from: self.state,
                to: RunState::Running,
            })
        }
    }

    fn transition(&mut self, next: RunState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn finish(
        &mut self,
        mut report: RunReport,
        state: RunState,
        reason: Option<AbortReason>,
    ) -> Result<RunReport, HarvestError> {
        self.transition(state)?;
        report.state = state;
        report.abort_reason = reason;
        report.finished_at = Some(Utc::now());

        match &report.abort_reason {
            None => tracing::info!(
                "Harvest completed: {} records written, {} skipped",
                report.records_written,
                report.total_skipped()
            ),
            Some(reason) => tracing::warn!(
                "Harvest aborted ({}): {} records written",
                reason,
                report.records_written
            ),
        }

        Ok(report)
    }
}

/// Fetch and extract one listing
async fn harvest_listing(
    session: &mut CrawlSession,
    reference: &ListingReference,
    selectors: &ListingSelectors,
) -> Result<ListingRecord, HarvestError> {
    // No request for a reference that can never become a record
    reference.listing_id()?;

    let document = fetch_listing(session, reference).await?;
    extract(&document, reference, selectors)
}
