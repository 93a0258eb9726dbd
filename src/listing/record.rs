use serde::{Deserialize, Serialize};

/// Recruiter contact details; any part may be missing from the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// One extracted listing, written as a single JSON line
///
/// Values are raw page text. Salary, experience and dates are left
/// unparsed for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Identifier taken from the listing URL
    pub id: String,

    /// Listing title; empty when the page has none
    pub name: String,

    pub company: Option<String>,

    /// Skill tags in page order
    pub tags: Vec<String>,

    pub salary: Option<String>,

    pub contact: Contact,

    /// Required experience
    pub experience: Option<String>,

    pub description: Option<String>,

    pub posted_at: Option<String>,
}

impl ListingRecord {
    /// Creates a record carrying only its identity
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            company: None,
            tags: Vec::new(),
            salary: None,
            contact: Contact::default(),
            experience: None,
            description: None,
            posted_at: None,
        }
    }

    /// Names of the optional fields that were not found on the page
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.company.is_none() {
            missing.push("company");
        }
        if self.salary.is_none() {
            missing.push("salary");
        }
        if self.contact.is_empty() {
            missing.push("contact");
        }
        if self.experience.is_none() {
            missing.push("experience");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.posted_at.is_none() {
            missing.push("posted_at");
        }
        missing
    }
}
