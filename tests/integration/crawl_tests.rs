//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing and article pages and drive
//! full crawl requests through the job registry into SQLite.

use dynascrape::config::{Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig};
use dynascrape::job::RequestDefaults;
use dynascrape::sink::{RunStatus, SqliteSink};
use dynascrape::{CrawlEngine, JobRegistry};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `db_path`
fn create_test_config(db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            max_redirects: 5,
            max_concurrent_fetches: 2,
            default_max_pagination: 2,
            dedupe_urls: true,
            channel_capacity: 8,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            tags_delimiter: ",".to_string(),
        },
        extraction: ExtractionConfig {
            list_fields: vec!["article_tags".to_string()],
        },
    }
}

struct Harness {
    registry: JobRegistry,
    sink: Arc<SqliteSink>,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(db_path.to_str().unwrap());

    let sink = Arc::new(SqliteSink::new(&db_path, &config.output.tags_delimiter).unwrap());
    let engine = CrawlEngine::from_config(&config).unwrap();
    let registry = JobRegistry::new(engine, sink.clone(), RequestDefaults::from_config(&config));

    Harness {
        registry,
        sink,
        _dir: dir,
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn listing(items: &[&str], next: Option<&str>) -> ResponseTemplate {
    let mut body: String = items
        .iter()
        .map(|item| format!(r#"<h2 class="title"><a href="{}">story</a></h2>"#, item))
        .collect();
    if let Some(next) = next {
        body.push_str(&format!(r#"<a class="next" href="{}">Next</a>"#, next));
    }
    html(body)
}

fn article(title: &str, author: Option<&str>) -> ResponseTemplate {
    let author = author
        .map(|a| format!(r#"<span class="author">{}</span>"#, a))
        .unwrap_or_default();
    html(format!(
        r#"<h1>{}</h1>{}<a class="tag">news</a><a class="tag">local</a><div class="body">Text</div>"#,
        title, author
    ))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn request(server: &MockServer, max_pagination: u32) -> String {
    format!(
        r#"[{{
            "website_url": "{}/news",
            "scraping_rules": {{
                "item_url": "h2.title a::attr(href)",
                "next_page_url": "a.next::attr(href)",
                "article_title": "h1::text",
                "article_author": "span.author::text",
                "article_tags": "a.tag::text",
                "article_content": "div.body::text"
            }},
            "search_keyword": "local",
            "max_pagination": {}
        }}]"#,
        server.uri(),
        max_pagination
    )
}

#[tokio::test]
async fn test_single_listing_page() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/a/1", "/a/2", "/a/3"], Some("/news?page=2"))).await;
    mount(&server, "/a/1", article("One", Some("Ann"))).await;
    mount(&server, "/a/2", article("Two", Some("Bo"))).await;
    mount(&server, "/a/3", article("Three", Some("Cy"))).await;

    let h = harness();
    let summary = h
        .registry
        .submit_payload(&request(&server, 1))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.totals().listing_fetched, 1);
    assert_eq!(summary.totals().records_emitted, 3);

    let mut titles: Vec<String> = h.sink.articles().unwrap().into_iter().map(|a| a.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["One", "Three", "Two"]);

    // The next page was never requested
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.query().is_none()));
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_pagination_followed_within_budget() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/a/1"], Some("/news/2"))).await;
    mount(&server, "/news/2", listing(&["/a/2"], Some("/news/3"))).await;
    mount(&server, "/news/3", listing(&["/a/3"], None)).await;
    mount(&server, "/a/1", article("One", None)).await;
    mount(&server, "/a/2", article("Two", None)).await;
    mount(&server, "/a/3", article("Three", None)).await;

    let h = harness();
    let summary = h
        .registry
        .submit_payload(&request(&server, 2))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.totals().listing_fetched, 2);
    assert_eq!(h.sink.count_articles().unwrap(), 2);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/news/3"));
}

#[tokio::test]
async fn test_missing_fields_stored_as_placeholders() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/a/1"], None)).await;
    mount(&server, "/a/1", article("Anonymous", None)).await;

    let h = harness();
    h.registry
        .submit_payload(&request(&server, 1))
        .unwrap()
        .wait()
        .await
        .unwrap();

    let rows = h.sink.articles().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Anonymous");
    assert_eq!(rows[0].author, "-");
    assert_eq!(rows[0].summary, "-");
    assert_eq!(rows[0].tags, "news,local");
    assert_eq!(rows[0].url, format!("{}/a/1", server.uri()));
}

#[tokio::test]
async fn test_failed_item_is_skipped() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/a/1", "/a/gone", "/a/3"], None)).await;
    mount(&server, "/a/1", article("One", None)).await;
    mount(&server, "/a/gone", ResponseTemplate::new(404)).await;
    mount(&server, "/a/3", article("Three", None)).await;

    let h = harness();
    let summary = h
        .registry
        .submit_payload(&request(&server, 1))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.totals().fetch_failures, 1);
    assert_eq!(h.sink.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn test_zero_pagination_fetches_nothing() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/a/1"], None)).await;

    let h = harness();
    let summary = h
        .registry
        .submit_payload(&request(&server, 0))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.totals().fetch_attempts(), 0);
    assert_eq!(h.sink.count_articles().unwrap(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_redirected_item_keeps_final_url() {
    let server = MockServer::start().await;
    mount(&server, "/news", listing(&["/short/1"], None)).await;
    mount(
        &server,
        "/short/1",
        ResponseTemplate::new(301).insert_header("location", "/articles/one"),
    )
    .await;
    mount(&server, "/articles/one", article("One", Some("Ann"))).await;

    let h = harness();
    h.registry
        .submit_payload(&request(&server, 1))
        .unwrap()
        .wait()
        .await
        .unwrap();

    let rows = h.sink.articles().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].url, format!("{}/articles/one", server.uri()));
}

#[tokio::test]
async fn test_new_request_cancels_running_job() {
    let slow = MockServer::start().await;
    mount(&slow, "/news", listing(&["/a/1"], None)).await;
    mount(
        &slow,
        "/a/1",
        article("Slow", None).set_delay(Duration::from_secs(3)),
    )
    .await;

    let fast = MockServer::start().await;
    mount(&fast, "/news", listing(&["/a/1"], None)).await;
    mount(&fast, "/a/1", article("Fast", None)).await;

    let h = harness();
    let first = h.registry.submit_payload(&request(&slow, 1)).unwrap();

    // Let the first job reach its slow item fetch
    tokio::time::sleep(Duration::from_millis(300)).await;

    let second = h.registry.submit_payload(&request(&fast, 1)).unwrap();
    assert!(first.is_cancelled());

    let first_summary = first.wait().await.unwrap();
    let second_summary = second.wait().await.unwrap();

    assert_eq!(first_summary.status, RunStatus::Cancelled);
    assert_eq!(second_summary.status, RunStatus::Completed);

    let titles: Vec<String> = h.sink.articles().unwrap().into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["Fast"]);
    assert_eq!(h.sink.count_runs(RunStatus::Cancelled).unwrap(), 1);
    assert_eq!(h.sink.count_runs(RunStatus::Completed).unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_request_rejected() {
    let h = harness();
    let result = h
        .registry
        .submit_payload(r#"[{"website_url": "https://example.com", "scraping_rules": {}}]"#);
    assert!(result.is_err());
    assert_eq!(h.sink.latest_run().unwrap().map(|r| r.id), None);
}
