use crate::HarvestError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use url::Url;

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").expect("digit pattern is valid");
}

/// A link to one listing, kept exactly as it appeared in the results page
///
/// References are consumed once by the run controller and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReference {
    raw: String,
}

impl ListingReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The href as discovered, absolute or relative
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the listing identifier: the first run of digits in the reference
    ///
    /// Depends on the reference alone so a record keeps its identity even
    /// when nothing else can be read from the page.
    pub fn listing_id(&self) -> Result<String, HarvestError> {
        DIGIT_RUN
            .find(&self.raw)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| HarvestError::MalformedReference {
                reference: self.raw.clone(),
            })
    }

    /// Resolves the reference against the site base URL
    ///
    /// Absolute references are returned unchanged.
    pub fn resolve(&self, base: &Url) -> Result<Url, HarvestError> {
        base.join(self.raw.trim())
            .map_err(|source| HarvestError::InvalidUrl {
                reference: self.raw.clone(),
                source,
            })
    }
}

impl fmt::Display for ListingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
