//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch, extract and write cycle end-to-end.

use quarry::config::{parse_config_json, CrawlConfig};
use quarry::crawler::{CrawlDriver, HttpFetcher, Throttle};
use quarry::output::{JsonLinesSink, MemorySink};
use quarry::{CrawlEngine, TypedRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a quote rule set starting at the given URLs
fn quote_config(start_urls: &[String], max_pages: u32) -> CrawlConfig {
    let json = serde_json::json!({
        "startURLs": start_urls,
        "allowedDomains": ["127.0.0.1"],
        "fetchPolicy": {"delay": 0.0, "userAgent": "QuarryTest/1.0"},
        "itemSelector": {"listSelector": "tr.row"},
        "fields": {
            "symbol": {"selector": "td.sym", "required": true},
            "price": {"selector": "td.px", "valueType": "float", "required": true},
            "volume": {"selector": "td.vol", "valueType": "int"}
        },
        "pagination": {"enabled": true, "nextPageSelector": "a.next", "maxPages": max_pages},
        "outputType": "quote"
    });
    parse_config_json(&json.to_string()).expect("Failed to parse rule set")
}

fn listing(rows: &[(&str, &str)], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><table>");
    for (symbol, price) in rows {
        html.push_str(&format!(
            r#"<tr class="row"><td class="sym">{}</td><td class="px">{}</td><td class="vol">100</td></tr>"#,
            symbol, price
        ));
    }
    html.push_str("</table>");
    if let Some(href) = next {
        html.push_str(&format!(r#"<a class="next" href="{}">Next</a>"#, href));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

fn driver(config: CrawlConfig) -> CrawlDriver<HttpFetcher> {
    let fetcher = HttpFetcher::new(&config.fetch_policy).expect("Failed to build fetcher");
    let engine = CrawlEngine::new(config).expect("Rule set should compile");
    CrawlDriver::new(engine, fetcher).with_throttle(Throttle::none())
}

fn symbols(records: &[TypedRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| match r {
            TypedRecord::Quote(q) => q.symbol.clone(),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_pagination_follows_to_page_cap() {
    let server = MockServer::start().await;
    for n in 1..=4 {
        mount_page(
            &server,
            &format!("/p{}", n),
            listing(&[(&format!("S{}", n), "1.5")], Some(&format!("/p{}", n + 1))),
        )
        .await;
    }

    let config = quote_config(&[format!("{}/p1", server.uri())], 3);
    let mut sink = MemorySink::new();
    let report = driver(config).run(&mut sink).await.unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(symbols(sink.records()), vec!["S1", "S2", "S3"]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.url.path() != "/p4"));
}

#[tokio::test]
async fn test_fetch_failure_stops_only_its_sequence() {
    let server = MockServer::start().await;
    mount_page(&server, "/a1", listing(&[("A1", "1")], Some("/a2"))).await;
    mount_page(&server, "/a2", listing(&[("A2", "2")], None)).await;
    mount_page(&server, "/b1", listing(&[("B1", "3")], Some("/b2"))).await;
    Mock::given(method("GET"))
        .and(path("/b2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = quote_config(
        &[format!("{}/a1", server.uri()), format!("{}/b1", server.uri())],
        10,
    );
    let mut sink = MemorySink::new();
    let report = driver(config).run(&mut sink).await.unwrap();

    assert_eq!(report.sequences, 2);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.fetch_failures, 1);

    let mut got = symbols(sink.records());
    got.sort();
    assert_eq!(got, vec!["A1", "A2", "B1"]);
}

#[tokio::test]
async fn test_links_outside_allowed_domains_are_not_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/list",
        listing(&[("X", "1")], Some("https://elsewhere.test/list?page=2")),
    )
    .await;

    let config = quote_config(&[format!("{}/list", server.uri())], 5);
    let mut sink = MemorySink::new();
    let report = driver(config).run(&mut sink).await.unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn test_duplicate_removal() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/list",
        listing(&[("D", "9.9"), ("D", "9.9"), ("E", "9.9")], None),
    )
    .await;

    let mut config = quote_config(&[format!("{}/list", server.uri())], 1);
    config.data_processing.remove_duplicates = true;

    let mut sink = MemorySink::new();
    let report = driver(config).run(&mut sink).await.unwrap();

    assert_eq!(report.records_emitted, 3);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(symbols(sink.records()), vec!["D", "E"]);
}

#[tokio::test]
async fn test_json_lines_output() {
    let server = MockServer::start().await;
    mount_page(&server, "/list", listing(&[("600000", "11.20"), ("600001", "0")], None)).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("quotes.jsonl");

    let config = quote_config(&[format!("{}/list", server.uri())], 1);
    let mut sink = JsonLinesSink::create(&out).unwrap();
    let report = driver(config).run(&mut sink).await.unwrap();
    drop(sink);

    assert_eq!(report.records_written, 2);

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["record_type"], "quote");
    assert_eq!(lines[0]["symbol"], "600000");
    assert_eq!(lines[0]["price"], 11.2);
    assert_eq!(lines[0]["volume"], 100);
    assert_eq!(lines[0]["source_url"], format!("{}/list", server.uri()));
    assert!(lines[0]["crawl_time"].as_str().unwrap().ends_with('Z'));
    assert_eq!(lines[1]["price"], 0.0);
}
