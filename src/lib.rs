//! Vacancy-Harvest: a polite job-listing crawler
//!
//! This crate walks the paginated search results of a job-listing site,
//! extracts one structured record per listing and appends every record to a
//! newline-delimited JSON file the moment it is extracted.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Vacancy-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing reference has no identifier: {reference}")]
    MalformedReference { reference: String },

    #[error("Request timeout for {url}")]
    FetchTimeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Cannot resolve reference {reference}: {source}")]
    InvalidUrl {
        reference: String,
        source: ::url::ParseError,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Run cancelled by operator")]
    OperatorCancelled,

    #[error("Output destination already exists: {path}")]
    DestinationConflict { path: String },

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Invalid run state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if the failure only affects the current listing
    ///
    /// Recoverable failures are logged and the listing is skipped; every
    /// other failure ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedReference { .. }
                | Self::FetchTimeout { .. }
                | Self::Fetch { .. }
                | Self::HttpStatus { .. }
                | Self::InvalidUrl { .. }
        )
    }

    /// Short stable label used when counting failures
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::MalformedReference { .. } => "malformed_reference",
            Self::FetchTimeout { .. } => "fetch_timeout",
            Self::Fetch { .. } => "fetch_error",
            Self::HttpStatus { .. } => "http_status",
            Self::InvalidUrl { .. } | Self::UrlParse(_) => "invalid_url",
            Self::HttpClient(_) => "http_client",
            Self::OperatorCancelled => "operator_cancelled",
            Self::DestinationConflict { .. } => "destination_conflict",
            Self::Sink(_) => "sink",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Io(_) => "io",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {field}: {selector}")]
    InvalidSelector { field: &'static str, selector: String },
}

/// Result type alias for Vacancy-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, CrawlSession};
pub use listing::{Contact, ListingRecord, ListingReference};
pub use output::{JsonLinesSink, RecordSink, RunReport};
pub use state::RunState;
