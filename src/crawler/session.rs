//! Crawl session shared by the paginator and the listing fetcher
//!
//! One session per run: a single HTTP client (connection pool and cookie
//! jar), the site base URL, and the politeness throttle every request
//! passes through.

use crate::config::{Config, SiteConfig};
use crate::state::Throttle;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The full configuration (user agent and timeouts are used)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Reusable connection context for one run
pub struct CrawlSession {
    client: Client,
    base_url: Url,
    search_url: Url,
    query_param: String,
    throttle: Throttle,
}

impl CrawlSession {
    /// Creates a session from the configuration
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        Self::with_client(
            client,
            &config.site,
            Duration::from_millis(config.crawler.politeness_delay_ms),
        )
    }

    /// Creates a session around an existing client
    pub fn with_client(
        client: Client,
        site: &SiteConfig,
        politeness_delay: Duration,
    ) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&site.base_url)?;
        let search_url = base_url.join(&site.search_path)?;

        Ok(Self {
            client,
            base_url,
            search_url,
            query_param: site.query_param.clone(),
            throttle: Throttle::new(politeness_delay),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Base URL that relative references are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the first results-page URL for a free-text query
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(&self.query_param, query);
        url
    }

    /// Waits for the politeness interval before a request
    pub async fn throttle(&mut self) {
        self.throttle.acquire().await;
    }

    /// Minimum spacing between two requests of this session
    pub fn politeness_delay(&self) -> Duration {
        self.throttle.min_interval()
    }

    /// Number of requests issued through this session
    pub fn requests_made(&self) -> u64 {
        self.throttle.request_count()
    }
}
