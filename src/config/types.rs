use serde::Deserialize;

/// Main configuration structure for Vacancy-Harvest
///
/// Every section is optional in the TOML file; missing sections fall back
/// to the defaults for the hh.ru search pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Minimum time between two outbound requests (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of listings to process; `None` means all of them
    #[serde(rename = "max-items")]
    pub max_items: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: 3000,
            request_timeout_secs: 3,
            connect_timeout_secs: 10,
            max_items: None,
        }
    }
}

/// Where the search lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that relative listing and pager links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Query-string parameter that carries the search text
    #[serde(rename = "query-param")]
    pub query_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ekaterinburg.hh.ru".to_string(),
            search_path: "/search/vacancy".to_string(),
            query_param: "text".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "VacancyHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the newline-delimited JSON output file
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "vacancies.jsonl".to_string(),
        }
    }
}

/// CSS selectors for the search-results and listing pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    // ===== Search results =====
    #[serde(rename = "listing-link")]
    pub listing_link: String,

    #[serde(rename = "next-page")]
    pub next_page: String,

    /// Header holding the number of listings found for the query
    #[serde(rename = "total-found")]
    pub total_found: String,

    // ===== Listing page =====
    pub name: String,
    pub company: String,
    pub tags: String,
    pub salary: String,

    #[serde(rename = "contact-name")]
    pub contact_name: String,

    #[serde(rename = "contact-phone")]
    pub contact_phone: String,

    #[serde(rename = "contact-email")]
    pub contact_email: String,

    pub experience: String,
    pub description: String,

    /// Fallback used by employers with a branded vacancy layout
    #[serde(rename = "branded-description")]
    pub branded_description: String,

    #[serde(rename = "posted-at")]
    pub posted_at: String,
}

impl SelectorConfig {
    /// Returns every selector paired with its field name
    pub fn named(&self) -> [(&'static str, &str); 14] {
        [
            ("listing_link", self.listing_link.as_str()),
            ("next_page", self.next_page.as_str()),
            ("total_found", self.total_found.as_str()),
            ("name", self.name.as_str()),
            ("company", self.company.as_str()),
            ("tags", self.tags.as_str()),
            ("salary", self.salary.as_str()),
            ("contact_name", self.contact_name.as_str()),
            ("contact_phone", self.contact_phone.as_str()),
            ("contact_email", self.contact_email.as_str()),
            ("experience", self.experience.as_str()),
            ("description", self.description.as_str()),
            ("branded_description", self.branded_description.as_str()),
            ("posted_at", self.posted_at.as_str()),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_link: "a.HH-LinkModifier".to_string(),
            next_page: "a.HH-Pager-Controls-Next".to_string(),
            total_found: "h1.bloko-header-1".to_string(),
            name: "h1[data-qa='vacancy-title']".to_string(),
            company: "span.bloko-section-header-2.bloko-section-header-2_lite".to_string(),
            tags: ".bloko-tag__section_text".to_string(),
            salary: ".vacancy-salary".to_string(),
            contact_name: "p[data-qa='vacancy-contacts__fio']".to_string(),
            contact_phone: "p[data-qa='vacancy-contacts__phone']".to_string(),
            contact_email: "a[data-qa='vacancy-contacts__email']".to_string(),
            experience: "span[data-qa='vacancy-experience']".to_string(),
            description: "div[data-qa='vacancy-description']".to_string(),
            branded_description: "div.vacancy-section.HH-VacancyBrandedDescription-DANGEROUS-HTML"
                .to_string(),
            posted_at: "p.vacancy-creation-time".to_string(),
        }
    }
}
