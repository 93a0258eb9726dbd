//! HTTP fetcher implementation
//!
//! All requests go through the session: the politeness delay is applied
//! first, then a GET with the session's timeout. Network failures are
//! classified into timeout, transport error and bad status.

use crate::crawler::session::CrawlSession;
use crate::listing::ListingReference;
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// Fetches a URL through the session and returns the response body
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout (connect or read) | `FetchTimeout` |
/// | Non-2xx status | `HttpStatus` |
/// | Any other transport failure | `Fetch` |
pub async fn fetch_body(session: &mut CrawlSession, url: &Url) -> Result<String, HarvestError> {
    session.throttle().await;
    tracing::debug!("GET {}", url);

    let response = session
        .client()
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Retrieves and parses one listing page
///
/// Relative references are resolved against the session base URL.
pub async fn fetch_listing(
    session: &mut CrawlSession,
    reference: &ListingReference,
) -> Result<Html, HarvestError> {
    let url = reference.resolve(session.base_url())?;
    let body = fetch_body(session, &url).await?;
    Ok(Html::parse_document(&body))
}

fn classify_error(url: &Url, error: reqwest::Error) -> HarvestError {
    if error.is_timeout() {
        HarvestError::FetchTimeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Fetch {
            url: url.to_string(),
            source: error,
        }
    }
}
