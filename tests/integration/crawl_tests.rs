//! Integration tests for the harvester
//!
//! These tests use wiremock to serve search-results and listing pages and
//! run the whole pipeline end-to-end into a temporary output file.

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vacancy_harvest::config::{Config, CrawlerConfig, SiteConfig};
use vacancy_harvest::crawler::{harvest, Controller};
use vacancy_harvest::listing::ListingRecord;
use vacancy_harvest::output::{read_records, JsonLinesSink, RecordSink, SinkError};
use vacancy_harvest::RunState;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            politeness_delay_ms: 10, // Very short for testing
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            max_items: None,
        },
        site: SiteConfig {
            base_url: base_url.to_string(),
            ..SiteConfig::default()
        },
        ..Config::default()
    }
}

/// Renders a results page listing `ids`, with an optional pager link
fn results_page(ids: &[u32], next: Option<&str>) -> String {
    let mut html = String::from(
        r#"<html><body><h1 class="bloko-header-1">Найдено 2 вакансии</h1>"#,
    );
    for id in ids {
        html.push_str(&format!(
            r#"<div class="vacancy-serp-item"><a class="bloko-link HH-LinkModifier" data-qa="vacancy-serp__vacancy-title" href="/vacancy/{}?query=test">Listing {}</a></div>"#,
            id, id
        ));
    }
    if let Some(href) = next {
        html.push_str(&format!(
            r#"<a class="bloko-button HH-Pager-Controls-Next" href="{}">дальше</a>"#,
            href
        ));
    }
    html.push_str("</body></html>");
    html
}

/// Renders a listing page; omitted parts are simply not in the markup
fn listing_page(name: &str, salary: Option<&str>, tags: &[&str]) -> String {
    let mut html = format!(
        r#"<html><body>
        <h1 class="bloko-header-1" data-qa="vacancy-title">{}</h1>
        <span class="bloko-section-header-2 bloko-section-header-2_lite">Acme</span>"#,
        name
    );
    if let Some(salary) = salary {
        html.push_str(&format!(r#"<p class="vacancy-salary">{}</p>"#, salary));
    }
    for tag in tags {
        html.push_str(&format!(
            r#"<div class="bloko-tag"><span class="bloko-tag__section_text">{}</span></div>"#,
            tag
        ));
    }
    html.push_str(
        r#"<span data-qa="vacancy-experience">1–3 года</span>
        <div data-qa="vacancy-description">Описание вакансии</div>
        <p class="vacancy-creation-time">1 марта</p>
        </body></html>"#,
    );
    html
}

async fn mount_html(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, query: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("text", query))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Sink that cancels the run once it has written `limit` records
struct CancelAfter {
    inner: JsonLinesSink,
    limit: u64,
    token: CancellationToken,
}

impl RecordSink for CancelAfter {
    fn append(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        self.inner.append(record)?;
        if self.inner.records_written() >= self.limit {
            self.token.cancel();
        }
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.inner.records_written()
    }
}

/// Sink whose storage fails on every write
struct BrokenSink;

impl RecordSink for BrokenSink {
    fn append(&mut self, _record: &ListingRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }

    fn records_written(&self) -> u64 {
        0
    }
}

#[tokio::test]
async fn test_two_page_harvest_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "data scientist",
        results_page(&[100], Some("/search/vacancy/page2")),
    )
    .await;
    mount_html(&mock_server, "/search/vacancy/page2", results_page(&[200], None)).await;
    mount_html(&mock_server, "/vacancy/100", listing_page("Engineer", None, &[])).await;
    mount_html(
        &mock_server,
        "/vacancy/200",
        listing_page("Analyst", Some("от 90 000 руб."), &["sql", "excel"]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let config = create_test_config(&mock_server.uri());
    let report = harvest(config, "data scientist", &output, CancellationToken::new())
        .await
        .expect("harvest failed");

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.total_found, Some(2));

    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 2);

    let records = read_records(&output).unwrap();
    assert_eq!(records[0].id, "100");
    assert_eq!(records[0].name, "Engineer");
    assert_eq!(records[0].salary, None);
    assert_eq!(records[1].id, "200");
    assert_eq!(records[1].name, "Analyst");
    assert_eq!(records[1].tags, vec!["sql", "excel"]);
    assert_eq!(records[1].salary.as_deref(), Some("от 90 000 руб."));
    assert_eq!(records[1].description.as_deref(), Some("Описание вакансии"));
}

#[tokio::test]
async fn test_query_relative_pager_link_stays_on_search_path() {
    let mock_server = MockServer::start().await;

    // Most specific first: wiremock answers with the earliest matching mock
    Mock::given(method("GET"))
        .and(path("/search/vacancy"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[2], None)))
        .mount(&mock_server)
        .await;
    mount_search(&mock_server, "rust", results_page(&[1], Some("?text=rust&page=1"))).await;
    mount_html(&mock_server, "/vacancy/1", listing_page("One", None, &[])).await;
    mount_html(&mock_server, "/vacancy/2", listing_page("Two", None, &[])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let config = create_test_config(&mock_server.uri());
    let report = harvest(config, "rust", &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.pages_visited, 2);

    let ids: Vec<String> = read_records(&output)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn test_cancellation_keeps_written_records() {
    let mock_server = MockServer::start().await;

    let ids: Vec<u32> = (1..=10).collect();
    mount_search(&mock_server, "rust", results_page(&ids, None)).await;
    for id in &ids {
        mount_html(
            &mock_server,
            &format!("/vacancy/{}", id),
            listing_page(&format!("Listing {}", id), Some("100"), &["rust"]),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let token = CancellationToken::new();
    let sink = CancelAfter {
        inner: JsonLinesSink::open(&output).unwrap(),
        limit: 3,
        token: token.clone(),
    };

    let config = create_test_config(&mock_server.uri());
    let mut controller = Controller::new(config, sink, token).unwrap();
    let report = controller.run("rust").await.unwrap();

    assert_eq!(report.state, RunState::Aborted);
    assert!(report.was_cancelled());
    assert_eq!(report.records_written, 3);
    assert_eq!(controller.state(), RunState::Aborted);

    let records = read_records(&output).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_failed_listing_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "qa", results_page(&[1, 2, 3], None)).await;
    mount_html(&mock_server, "/vacancy/1", listing_page("One", None, &[])).await;
    Mock::given(method("GET"))
        .and(path("/vacancy/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/vacancy/3", listing_page("Three", None, &[])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let config = create_test_config(&mock_server.uri());
    let report = harvest(config, "qa", &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.total_skipped(), 1);
    assert_eq!(report.skipped.get("http_status"), Some(&1));

    let ids: Vec<String> = read_records(&output)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_item_limit_stops_run() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "go", results_page(&[1, 2], Some("/page2"))).await;
    mount_html(&mock_server, "/page2", results_page(&[3, 4], None)).await;
    for id in 1..=4 {
        mount_html(
            &mock_server,
            &format!("/vacancy/{}", id),
            listing_page("Gopher", None, &[]),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.max_items = Some(3);
    let report = harvest(config, "go", &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.references_seen, 3);
    assert_eq!(read_records(&output).unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_reference_is_skipped_without_request() {
    let mock_server = MockServer::start().await;

    let body = r#"<html><body>
        <a class="HH-LinkModifier" href="/vacancy/latest">No id</a>
        <a class="HH-LinkModifier" href="/vacancy/5">Five</a>
        </body></html>"#
        .to_string();
    mount_search(&mock_server, "ml", body).await;
    mount_html(&mock_server, "/vacancy/5", listing_page("Five", None, &[])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let config = create_test_config(&mock_server.uri());
    let report = harvest(config, "ml", &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.records_written, 1);
    assert_eq!(report.skipped.get("malformed_reference"), Some(&1));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/vacancy/latest"));
}

#[tokio::test]
async fn test_failed_search_aborts_with_no_records() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    let config = create_test_config(&mock_server.uri());
    let report = harvest(config, "anything", &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Aborted);
    assert!(!report.was_cancelled());
    assert!(report.abort_reason.is_some());
    assert_eq!(report.records_written, 0);
    assert!(read_records(&output).unwrap().is_empty());
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "devops", results_page(&[1, 2], None)).await;
    mount_html(&mock_server, "/vacancy/1", listing_page("One", None, &[])).await;
    mount_html(&mock_server, "/vacancy/2", listing_page("Two", None, &[])).await;

    let config = create_test_config(&mock_server.uri());
    let mut controller = Controller::new(config, BrokenSink, CancellationToken::new()).unwrap();
    let report = controller.run("devops").await.unwrap();

    assert_eq!(report.state, RunState::Aborted);
    assert!(!report.was_cancelled());
    assert_eq!(report.records_written, 0);
    assert_eq!(report.references_seen, 1);
}

#[tokio::test]
async fn test_append_run_keeps_previous_records() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "first", results_page(&[1], None)).await;
    mount_search(&mock_server, "second", results_page(&[2], None)).await;
    mount_html(&mock_server, "/vacancy/1", listing_page("One", None, &[])).await;
    mount_html(&mock_server, "/vacancy/2", listing_page("Two", None, &[])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("vacancies.jsonl");

    for query in ["first", "second"] {
        let config = create_test_config(&mock_server.uri());
        let report = harvest(config, query, &output, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.records_written, 1);
    }

    let ids: Vec<String> = read_records(&output)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
}
