//! Pagination over search results
//!
//! The paginator hands out listing references one at a time. When the
//! current page runs dry it follows the "next page" link, fetching through
//! the shared session so the politeness delay applies. Traversal is
//! forward-only and cannot be restarted.

use crate::config::SelectorConfig;
use crate::crawler::extractor::compile_selector;
use crate::crawler::fetcher::fetch_body;
use crate::crawler::session::CrawlSession;
use crate::listing::ListingReference;
use crate::{ConfigError, HarvestError};
use scraper::{Html, Selector};
use std::collections::VecDeque;
use url::Url;

/// Compiled selectors for a search-results page
#[derive(Debug, Clone)]
pub struct ResultsSelectors {
    listing_link: Selector,
    next_page: Selector,
    total_found: Selector,
}

impl ResultsSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            listing_link: compile_selector("listing_link", &config.listing_link)?,
            next_page: compile_selector("next_page", &config.next_page)?,
            total_found: compile_selector("total_found", &config.total_found)?,
        })
    }
}

/// One parsed page of search results
#[derive(Debug, Clone, Default)]
pub struct SearchResultsPage {
    /// Listing references in document order
    pub references: Vec<ListingReference>,

    /// Absolute URL of the following page, if the pager has one
    pub next_page: Option<Url>,

    /// Number of listings the site reports for the query
    pub total_found: Option<u64>,
}

impl SearchResultsPage {
    /// Parses a results page
    ///
    /// # Arguments
    ///
    /// * `html` - The page content
    /// * `selectors` - Compiled results-page selectors
    /// * `page_url` - URL the page was fetched from; the next-page link is
    ///   resolved against it, so query-only links keep the search path
    pub fn parse(html: &str, selectors: &ResultsSelectors, page_url: &Url) -> Self {
        let document = Html::parse_document(html);

        let references = document
            .select(&selectors.listing_link)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(ListingReference::new)
            .collect();

        let next_page = document
            .select(&selectors.next_page)
            .filter_map(|element| element.value().attr("href"))
            .next()
            .and_then(|href| match page_url.join(href.trim()) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Ignoring unparseable next-page link {}: {}", href, e);
                    None
                }
            });

        let total_found = document
            .select(&selectors.total_found)
            .next()
            .and_then(|element| parse_count(&element.text().collect::<String>()));

        Self {
            references,
            next_page,
            total_found,
        }
    }
}

/// Reads a listing count out of header text such as "1 234 вакансии"
///
/// Digit groups are concatenated, since the site separates thousands with
/// spaces.
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Fetches the first results page for a query
///
/// Unlike later pages, a failure here is returned to the caller: there is
/// nothing to traverse without it.
pub async fn search(
    session: &mut CrawlSession,
    query: &str,
    selectors: &ResultsSelectors,
) -> Result<SearchResultsPage, HarvestError> {
    let url = session.search_url(query);
    tracing::info!("Searching: {}", url);

    let body = fetch_body(session, &url).await?;
    Ok(SearchResultsPage::parse(&body, selectors, &url))
}

/// Lazy, forward-only sequence of listing references
pub struct Paginator {
    /// References of the current page not yet handed out
    pending: VecDeque<ListingReference>,

    /// Link to the following page, if any
    next_page: Option<Url>,

    /// Upper bound on references yielded; None is unbounded
    max_items: Option<usize>,

    selectors: ResultsSelectors,

    yielded: usize,
    pages_visited: usize,
    exhausted: bool,
}

impl Paginator {
    /// Starts a traversal at an already fetched page
    pub fn new(
        start_page: SearchResultsPage,
        selectors: ResultsSelectors,
        max_items: Option<usize>,
    ) -> Self {
        Self {
            pending: start_page.references.into(),
            next_page: start_page.next_page,
            max_items,
            selectors,
            yielded: 0,
            pages_visited: 1,
            exhausted: false,
        }
    }

    /// Returns the next listing reference, fetching further pages on demand
    ///
    /// Returns None once the results run out, the item limit is reached, or
    /// a next-page fetch fails. After that it keeps returning None.
    pub async fn next_reference(
        &mut self,
        session: &mut CrawlSession,
    ) -> Option<ListingReference> {
        loop {
            if self.exhausted {
                return None;
            }

            if let Some(max) = self.max_items {
                if self.yielded >= max {
                    tracing::info!("Reached item limit of {}", max);
                    self.exhausted = true;
                    return None;
                }
            }

            if let Some(reference) = self.pending.pop_front() {
                self.yielded += 1;
                return Some(reference);
            }

            let Some(url) = self.next_page.take() else {
                tracing::info!("No more result pages after page {}", self.pages_visited);
                self.exhausted = true;
                return None;
            };

            match fetch_body(session, &url).await {
                Ok(body) => {
                    let page = SearchResultsPage::parse(&body, &self.selectors, &url);
                    self.pages_visited += 1;
                    tracing::debug!(
                        "Results page {}: {} references",
                        self.pages_visited,
                        page.references.len()
                    );
                    self.pending.extend(page.references);
                    self.next_page = page.next_page;
                }
                Err(e) => {
                    // A failed page looks the same as the end of the results
                    tracing::warn!("Stopping traversal, next page {} failed: {}", url, e);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }

    /// Number of results pages parsed so far, including the start page
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn references_yielded(&self) -> usize {
        self.yielded
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
