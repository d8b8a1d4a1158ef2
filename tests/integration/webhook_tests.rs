//! End-to-end crawls in webhook mode

use serde_json::Value;
use site_sift::config::{Config, DedupScope};
use site_sift::crawler::{CrawlConfig, CrawlOutcome, Crawler};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves `/` linking to `/a`
async fn small_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><p>Index</p><a href="/a">A</a></body></html>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Page A</p></body></html>"),
        )
        .mount(&server)
        .await;

    server
}

async fn webhook_endpoint(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn hook_options(hook: &MockServer) -> CrawlConfig {
    let endpoint = Url::parse(&format!("{}/hook", hook.uri())).unwrap();
    CrawlConfig::default().with_webhook(endpoint)
}

async fn delivered_urls(hook: &MockServer) -> Vec<String> {
    let mut urls: Vec<String> = hook
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["url"].as_str().unwrap().to_string()
        })
        .collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn test_results_posted_as_json() {
    let site = small_site().await;
    let hook = webhook_endpoint(200).await;
    let crawler = Crawler::new(&Config::default()).unwrap();

    let options = hook_options(&hook);
    let outcome = crawler.run(&[site.uri()], &options).await;

    match outcome {
        CrawlOutcome::Dispatched {
            seeds,
            endpoint,
            deliveries,
        } => {
            assert_eq!(seeds, 1);
            assert_eq!(endpoint.path(), "/hook");
            assert_eq!(deliveries.delivered, 2);
            assert_eq!(deliveries.attempted(), 2);
        }
        other => panic!("expected webhook outcome, got {:?}", other),
    }

    let requests = hook.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let page_a = format!("{}/a", site.uri());
    let body = requests
        .iter()
        .map(|request| serde_json::from_slice::<Value>(&request.body).unwrap())
        .find(|body| body["url"] == page_a.as_str())
        .expect("page A delivered");
    assert_eq!(body["data"], "Page A");
    assert_eq!(body["wordCount"], 2);
}

#[tokio::test]
async fn test_process_scope_delivers_once_across_requests() {
    let site = small_site().await;
    let hook = webhook_endpoint(200).await;
    let crawler = Crawler::new(&Config::default()).unwrap();
    let options = hook_options(&hook);

    crawler.run(&[site.uri()], &options).await;
    let second = crawler.run(&[site.uri()], &options).await;

    // The repeated request skips both pages as already delivered
    match second {
        CrawlOutcome::Dispatched { deliveries, .. } => {
            assert_eq!(deliveries.delivered, 0);
            assert_eq!(deliveries.duplicates, 2);
        }
        other => panic!("expected webhook outcome, got {:?}", other),
    }

    let expected = vec![site.uri(), format!("{}/a", site.uri())];
    assert_eq!(delivered_urls(&hook).await, expected);

    // Pages were still fetched on both requests
    let fetches = site.received_requests().await.unwrap();
    assert_eq!(fetches.len(), 4);
}

#[tokio::test]
async fn test_request_scope_redelivers() {
    let site = small_site().await;
    let hook = webhook_endpoint(200).await;

    let mut config = Config::default();
    config.webhook.dedup_scope = DedupScope::Request;
    let crawler = Crawler::new(&config).unwrap();
    let options = hook_options(&hook);

    crawler.run(&[site.uri()], &options).await;
    crawler.run(&[site.uri()], &options).await;

    assert_eq!(delivered_urls(&hook).await.len(), 4);
}

#[tokio::test]
async fn test_reset_delivery_history() {
    let site = small_site().await;
    let hook = webhook_endpoint(200).await;
    let crawler = Crawler::new(&Config::default()).unwrap();
    let options = hook_options(&hook);

    crawler.run(&[site.uri()], &options).await;
    crawler.reset_delivery_history();
    crawler.run(&[site.uri()], &options).await;

    assert_eq!(delivered_urls(&hook).await.len(), 4);
}

#[tokio::test]
async fn test_rejected_delivery_does_not_stop_crawl() {
    let site = small_site().await;
    let hook = webhook_endpoint(500).await;
    let crawler = Crawler::new(&Config::default()).unwrap();

    crawler.run(&[site.uri()], &hook_options(&hook)).await;

    // Both pages were crawled and offered to the endpoint despite the errors
    assert_eq!(delivered_urls(&hook).await.len(), 2);
}

#[tokio::test]
async fn test_invalid_url_delivered_as_error() {
    let hook = webhook_endpoint(200).await;
    let crawler = Crawler::new(&Config::default()).unwrap();

    crawler
        .run(&["ftp://example.com/file".to_string()], &hook_options(&hook))
        .await;

    let requests = hook.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["url"], "ftp://example.com/file");
    assert_eq!(body["data"], "Error: Invalid URL");
}
