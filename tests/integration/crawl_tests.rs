//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the crawled site and the
//! geolocation service, and run the full crawl cycle end-to-end through the
//! production fetcher, resolver and lookup client.

use geo_ripple::config::{
    Config, CrawlerConfig, EnrichmentConfig, FrontierOrder, OutputConfig, UserAgentConfig,
};
use geo_ripple::crawler::Coordinator;
use geo_ripple::enrichment::COUNTRY_NOT_FOUND;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the given geolocation endpoint
fn create_test_config(geo_endpoint: &str, results_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 3,
            limit: Some(100),
            pacing_delay: 0,
            fetch_timeout: 5,
            frontier_order: FrontierOrder::Fifo,
        },
        enrichment: EnrichmentConfig {
            endpoint: geo_endpoint.to_string(),
            max_attempts: 2,
            backoff: 10,
            timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            results_path: results_path.to_string_lossy().into_owned(),
            seed_path: "./initial.txt".to_string(),
        },
    }
}

/// Serves `/` linking to `/page1` and `/page2`, which link back to `/`
async fn mount_site(server: &MockServer) {
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head><title>Home</title></head><body>
                    <a href="{}/page1">Page 1</a>
                    <a href="{}/page2">Page 2</a>
                    </body></html>"#,
                    base_url, base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;

    for page in ["/page1", "/page2"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(
                        r#"<html><body><a href="{}/">Home</a></body></html>"#,
                        base_url
                    ))
                    .insert_header("content-type", "text/html"),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Answers every lookup with the given country
async fn mount_geo_success(server: &MockServer, country: &str) {
    Mock::given(method("GET"))
        .and(path("/json/127.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": country,
            "query": "127.0.0.1"
        })))
        .mount(server)
        .await;
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read results")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_records_every_page() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    mount_site(&site).await;
    mount_geo_success(&geo, "Testland").await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    let config = create_test_config(&format!("{}/json", geo.uri()), &results);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    assert_eq!(coordinator.seed([format!("{}/", site.uri())]), 1);

    let summary = coordinator.run().await.expect("Crawl failed");
    assert_eq!(summary.pages_recorded, 3);
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(summary.geo_fallbacks, 0);

    let lines = read_lines(&results);
    assert_eq!(lines.len(), 3);

    let mut urls: Vec<String> = Vec::new();
    for line in &lines {
        let fields: Vec<&str> = line.split(", ").collect();
        assert_eq!(fields.len(), 4, "malformed line: {}", line);
        assert!(fields[0].parse::<f64>().is_ok(), "bad latency: {}", fields[0]);
        assert_eq!(fields[1], "Testland");
        assert_eq!(fields[2], "127.0.0.1");
        urls.push(fields[3].to_string());
    }
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/", site.uri()),
            format!("{}/page1", site.uri()),
            format!("{}/page2", site.uri()),
        ]
    );
}

#[tokio::test]
async fn test_failing_geolocation_falls_back_after_retries() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    mount_site(&site).await;

    // Two attempts for each of the three pages
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "reserved range"
        })))
        .expect(6)
        .mount(&geo)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    let config = create_test_config(&format!("{}/json", geo.uri()), &results);

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.seed([format!("{}/", site.uri())]);
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.geo_fallbacks, 3);
    let lines = read_lines(&results);
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert!(
            line.contains(&format!(", {}, 127.0.0.1, ", COUNTRY_NOT_FOUND)),
            "unexpected line: {}",
            line
        );
    }
}

#[tokio::test]
async fn test_relative_links_are_not_followed() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    mount_geo_success(&geo, "Testland").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r##"<html><body>
            <a href="/relative">Relative</a>
            <a href="#top">Top</a>
            <a href="javascript:void(0)">Script</a>
            <a href="">Empty</a>
            </body></html>"##,
        ))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/relative"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    let config = create_test_config(&format!("{}/json", geo.uri()), &results);

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.seed([format!("{}/", site.uri())]);
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.pages_recorded, 1);
    assert_eq!(summary.links_seen, 4);
    assert_eq!(summary.links_admitted, 0);
    assert_eq!(summary.malformed_links, 4);
}

#[tokio::test]
async fn test_error_status_is_recorded_and_dead_host_skipped() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    mount_geo_success(&geo, "Testland").await;

    // A port nobody listens on
    let dead_port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
            <a href="{}/missing">Missing</a>
            <a href="http://127.0.0.1:{}/">Dead</a>
            </body></html>"#,
            site.uri(),
            dead_port
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    let config = create_test_config(&format!("{}/json", geo.uri()), &results);

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.seed([format!("{}/", site.uri())]);
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.pages_recorded, 2);
    assert_eq!(summary.fetch_failures, 1);

    let lines = read_lines(&results);
    assert!(lines.iter().any(|line| line.ends_with("/missing")));
    assert!(!lines
        .iter()
        .any(|line| line.contains(&format!(":{}/", dead_port))));
}

#[tokio::test]
async fn test_lifo_order_takes_newest_link_first() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    mount_site(&site).await;
    mount_geo_success(&geo, "Testland").await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    let mut config = create_test_config(&format!("{}/json", geo.uri()), &results);
    config.crawler.workers = 1;
    config.crawler.frontier_order = FrontierOrder::Lifo;

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.seed([format!("{}/", site.uri())]);
    coordinator.run().await.unwrap();

    let lines = read_lines(&results);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(&format!("{}/", site.uri())));
    assert!(lines[1].ends_with("/page2"));
    assert!(lines[2].ends_with("/page1"));
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let site = MockServer::start().await;
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("scraped.txt");
    std::fs::write(&results, "left over from a previous run\n").unwrap();
    let config = create_test_config(&format!("{}/json", geo.uri()), &results);

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.seed([format!("{}/", site.uri())]);
    coordinator.cancellation_token().cancel();

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.pages_recorded, 0);
    assert_eq!(summary.seeded, 1);

    // The result file is truncated at start even when nothing is crawled
    assert!(read_lines(&results).is_empty());
}
