//! Configuration module for Vacancy-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section of the file is optional; omitted keys keep their defaults.
//!
//! # Example
//!
//! ```no_run
//! use vacancy_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Politeness delay: {}ms", config.crawler.politeness_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
