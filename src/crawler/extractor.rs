//! Field extractor for listing pages
//!
//! The identifier comes from the reference; every other field is an
//! independent CSS lookup. A lookup that finds nothing leaves its field
//! empty instead of failing the record.

use crate::config::SelectorConfig;
use crate::listing::{Contact, ListingRecord, ListingReference};
use crate::{ConfigError, HarvestError};
use scraper::{Html, Selector};

/// Compiles one configured selector
pub(crate) fn compile_selector(
    field: &'static str,
    selector: &str,
) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

/// Compiled selectors for the fields of a listing page
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    name: Selector,
    company: Selector,
    tags: Selector,
    salary: Selector,
    contact_name: Selector,
    contact_phone: Selector,
    contact_email: Selector,
    experience: Selector,
    description: Selector,
    branded_description: Selector,
    posted_at: Selector,
}

impl ListingSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: compile_selector("name", &config.name)?,
            company: compile_selector("company", &config.company)?,
            tags: compile_selector("tags", &config.tags)?,
            salary: compile_selector("salary", &config.salary)?,
            contact_name: compile_selector("contact_name", &config.contact_name)?,
            contact_phone: compile_selector("contact_phone", &config.contact_phone)?,
            contact_email: compile_selector("contact_email", &config.contact_email)?,
            experience: compile_selector("experience", &config.experience)?,
            description: compile_selector("description", &config.description)?,
            branded_description: compile_selector(
                "branded_description",
                &config.branded_description,
            )?,
            posted_at: compile_selector("posted_at", &config.posted_at)?,
        })
    }
}

/// Extracts a listing record from a parsed listing page
///
/// # Errors
///
/// Only `MalformedReference`, when the reference carries no digits.
/// Missing page elements never fail the record.
pub fn extract(
    document: &Html,
    reference: &ListingReference,
    selectors: &ListingSelectors,
) -> Result<ListingRecord, HarvestError> {
    let id = reference.listing_id()?;

    let description = first_text(document, &selectors.description)
        .or_else(|| first_text(document, &selectors.branded_description));

    Ok(ListingRecord {
        id,
        name: first_text(document, &selectors.name).unwrap_or_default(),
        company: first_text(document, &selectors.company),
        tags: all_texts(document, &selectors.tags),
        salary: first_text(document, &selectors.salary),
        contact: Contact {
            name: first_text(document, &selectors.contact_name),
            phone: first_text(document, &selectors.contact_phone),
            email: first_text(document, &selectors.contact_email),
        },
        experience: first_text(document, &selectors.experience),
        description,
        posted_at: first_text(document, &selectors.posted_at),
    })
}

/// Convenience function for extracting straight from HTML text
pub fn extract_from_html(
    html: &str,
    reference: &ListingReference,
    selectors: &ListingSelectors,
) -> Result<ListingRecord, HarvestError> {
    extract(&Html::parse_document(html), reference, selectors)
}

/// Text of the first match, trimmed; None when absent or blank
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Texts of every match in document order, blanks dropped
fn all_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
