//! End-to-end crawls in aggregate mode
//!
//! These tests use wiremock to serve small sites and check the per-seed
//! summaries returned by the crawler.

use site_sift::config::Config;
use site_sift::crawler::{CrawlConfig, Crawler};
use site_sift::output::{CrawlSummary, EXTERNAL_RESOURCE, NO_INFORMATION};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn crawl(config: &Config, seeds: &[String], options: &CrawlConfig) -> Vec<CrawlSummary> {
    let crawler = Crawler::new(config).expect("valid config");
    crawler
        .run(seeds, options)
        .await
        .into_summaries()
        .expect("aggregate mode returns summaries")
}

#[tokio::test]
async fn test_full_crawl_single_seed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<p>Welcome home</p>
        <a href="/about">About</a>
        <a href="https://other.com/">Elsewhere</a>"#,
    )
    .await;
    mount_page(&server, "/about", r#"<p>About us</p><a href="/">Home</a>"#).await;

    let seeds = vec![format!("{}/", base)];
    let summaries = crawl(&Config::default(), &seeds, &CrawlConfig::default()).await;

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.seed_url, seeds[0]);
    assert_eq!(summary.results.len(), 3, "results: {:?}", summary.results);

    let home = summary.get(&base).expect("seed page result");
    assert!(home.data.contains("Welcome home"));

    let about = summary.get(&format!("{}/about", base)).expect("about result");
    assert_eq!(about.data, "About us\nHome");

    let external = summary.get("https://other.com").expect("external leaf");
    assert_eq!(external.data, EXTERNAL_RESOURCE);
}

#[tokio::test]
async fn test_http_error_is_leaf() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The error body links onward, but error pages are never expanded
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"<a href="/hidden">x</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("hidden"))
        .expect(0)
        .mount(&server)
        .await;

    let seeds = vec![format!("{}/missing", base)];
    let summaries = crawl(&Config::default(), &seeds, &CrawlConfig::default()).await;

    let results = &summaries[0].results;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, format!("{}/missing", base));
    assert_eq!(results[0].data, "Error: 404 Not Found");
}

#[tokio::test]
async fn test_network_error_result() {
    let seeds = vec!["http://127.0.0.1:1/".to_string()];
    let summaries = crawl(&Config::default(), &seeds, &CrawlConfig::default()).await;

    let results = &summaries[0].results;
    assert_eq!(results.len(), 1);
    assert!(
        results[0].data.starts_with("Error: "),
        "unexpected payload: {}",
        results[0].data
    );
}

#[tokio::test]
async fn test_invalid_seed_reports_error() {
    let seeds = vec!["not a url".to_string()];
    let summaries = crawl(&Config::default(), &seeds, &CrawlConfig::default()).await;

    assert_eq!(summaries[0].seed_url, "not a url");
    let results = &summaries[0].results;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "not a url");
    assert_eq!(results[0].data, "Error: Invalid URL");
}

#[tokio::test]
async fn test_max_links_stops_expansion() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<p>Index</p><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html("child"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let seeds = vec![base.clone()];
    let options = CrawlConfig::default().with_max_links(1);
    let summaries = crawl(&Config::default(), &seeds, &options).await;

    let results = &summaries[0].results;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, base);
}

#[tokio::test]
async fn test_capped_link_stays_available_to_other_seeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<p>Root</p><a href="/shared">Shared</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>Shared page</p>"))
        .expect(1)
        .mount(&server)
        .await;

    // One seed at a time, one result per seed
    let mut config = Config::default();
    config.limits.max_concurrent_seeds = 1;
    let seeds = vec![format!("{}/", base), format!("{}/shared", base)];
    let options = CrawlConfig::default().with_max_links(1);

    let summaries = crawl(&config, &seeds, &options).await;

    let shared = format!("{}/shared", base);
    assert_eq!(summaries[0].results.len(), 1);
    assert_eq!(summaries[0].results[0].url, base);
    assert_eq!(summaries[1].results.len(), 1);
    assert_eq!(summaries[1].results[0].url, shared);
    assert_eq!(summaries[1].results[0].data, "Shared page");
}

#[tokio::test]
async fn test_multiple_seeds_share_visited_set() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<p>Root</p><a href="/shared">Shared</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>Shared page</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let seeds = vec![format!("{}/", base), format!("{}/shared", base)];
    let summaries = crawl(&Config::default(), &seeds, &CrawlConfig::default()).await;

    // Summaries follow submission order
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].seed_url, seeds[0]);
    assert_eq!(summaries[1].seed_url, seeds[1]);

    // Each page appears exactly once across all seeds
    let mut urls: Vec<&str> = summaries
        .iter()
        .flat_map(|s| s.results.iter().map(|r| r.url.as_str()))
        .collect();
    urls.sort_unstable();
    let shared = format!("{}/shared", base);
    assert_eq!(urls, vec![base.as_str(), shared.as_str()]);
}

#[tokio::test]
async fn test_exclusions_prevent_fetch() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/Private/area">Private</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>Open</p>").await;
    Mock::given(method("GET"))
        .and(path("/Private/area"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.filter.excluded = vec!["private".to_string()];

    let summaries = crawl(&config, &[base.clone()], &CrawlConfig::default()).await;
    let results = &summaries[0].results;
    assert_eq!(results.len(), 2);
    assert!(summaries[0].get(&format!("{}/public", base)).is_some());
}

#[tokio::test]
async fn test_raw_mode_returns_body() {
    let server = MockServer::start().await;
    let body = "<html><body><h1>Title</h1></body></html>";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let options = CrawlConfig::default().with_clean_text(false);
    let summaries = crawl(&Config::default(), &[server.uri()], &options).await;

    assert_eq!(summaries[0].results[0].data, body);
}

#[tokio::test]
async fn test_empty_page_has_no_information() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<script>track()</script>").await;

    let summaries = crawl(&Config::default(), &[server.uri()], &CrawlConfig::default()).await;

    assert_eq!(summaries[0].results[0].data, NO_INFORMATION);
    assert_eq!(summaries[0].results[0].word_count(), 3);
}

#[tokio::test]
async fn test_domain_pattern_scopes_traversal() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/next">Next</a>"#).await;
    mount_page(&server, "/next", "<p>Next page</p>").await;

    // The pattern captures the host without the port
    let mut config = Config::default();
    config.filter.domain_name_pattern = Some(r"https?://([^/:]+)".to_string());

    let summaries = crawl(&config, &[base.clone()], &CrawlConfig::default()).await;
    let next = summaries[0]
        .get(&format!("{}/next", base))
        .expect("same-domain page fetched");
    assert_eq!(next.data, "Next page");
}
