//! Integration tests for the extraction engine
//!
//! These tests drive `CrawlEngine` over static markup only; no network.

use quarry::config::{load_config, parse_config_json};
use quarry::{
    classify, CrawlEngine, FieldValue, OutputType, Page, PaginationState, TypedRecord,
};
use std::io::Write;
use url::Url;

const ITEM_CONFIG: &str = r#"{
    "startURLs": ["https://quotes.example.com/list"],
    "itemSelector": {"listSelector": ".item"},
    "fields": {
        "name": {"selector": ".name", "valueType": "string", "required": true},
        "price": {"selector": ".price", "valueType": "float", "required": true}
    },
    "outputType": "quote"
}"#;

fn page(url: &str, markup: &str) -> Page {
    Page::parse(Url::parse(url).unwrap(), markup)
}

#[test]
fn test_item_listing_end_to_end() {
    let engine = CrawlEngine::new(parse_config_json(ITEM_CONFIG).unwrap()).unwrap();
    let page = page(
        "https://quotes.example.com/list",
        r#"<html><body>
            <div class="item"><span class="name">Alpha</span><span class="price">37.71</span></div>
            <div class="item"><span class="name">Beta</span></div>
            <div class="item"><span class="name">Gamma</span><span class="price">0.5</span></div>
        </body></html>"#,
    );

    let outcome = engine.process_page(&page, &mut PaginationState::new());
    assert_eq!(outcome.stats.items_seen, 3);
    assert_eq!(outcome.stats.items_skipped, 1);

    let typed: Vec<TypedRecord> = outcome.records.into_iter().map(classify).collect();
    assert_eq!(typed.len(), 2);

    match &typed[0] {
        TypedRecord::Quote(q) => {
            assert_eq!(q.name.as_deref(), Some("Alpha"));
            assert_eq!(q.price, Some(37.71));
            assert_eq!(q.source_url, "https://quotes.example.com/list");
        }
        other => panic!("expected a quote, got {:?}", other),
    }
    match &typed[1] {
        TypedRecord::Quote(q) => {
            assert_eq!(q.name.as_deref(), Some("Gamma"));
            assert_eq!(q.price, Some(0.5));
        }
        other => panic!("expected a quote, got {:?}", other),
    }
}

#[test]
fn test_malformed_required_field_skips_item() {
    let engine = CrawlEngine::new(parse_config_json(ITEM_CONFIG).unwrap()).unwrap();
    let page = page(
        "https://quotes.example.com/list",
        r#"<div class="item"><span class="name">Alpha</span><span class="price">abc</span></div>
           <div class="item"><span class="name">Beta</span><span class="price">0</span></div>"#,
    );

    let outcome = engine.process_page(&page, &mut PaginationState::new());
    assert_eq!(outcome.stats.malformed_fields, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("price"), Some(&FieldValue::Float(0.0)));
}

#[test]
fn test_processing_is_idempotent() {
    let engine = CrawlEngine::new(parse_config_json(ITEM_CONFIG).unwrap()).unwrap();
    let page = page(
        "https://quotes.example.com/list",
        r#"<div class="item"><span class="name">A</span><span class="price">1</span></div>
           <div class="item"><span class="name">B</span><span class="price">2</span></div>"#,
    );

    let first = engine.process_page(&page, &mut PaginationState::new());
    let second = engine.process_page(&page, &mut PaginationState::new());
    assert_eq!(first, second);
}

#[test]
fn test_pagination_stops_at_max_pages() {
    let config = r#"{
        "startURLs": ["https://news.example.com/p/1"],
        "fields": {"title": {"selector": "h1"}},
        "pagination": {"enabled": true, "nextPageSelector": "a.next", "maxPages": 3},
        "outputType": "article"
    }"#;
    let engine = CrawlEngine::new(parse_config_json(config).unwrap()).unwrap();
    let mut state = PaginationState::new();

    let mut url = Url::parse("https://news.example.com/p/1").unwrap();
    let mut followed = Vec::new();
    for n in 1..=5 {
        let markup = format!(r#"<h1>Page {}</h1><a class="next" href="/p/{}">next</a>"#, n, n + 1);
        let page = Page::parse(url.clone(), &markup);
        match engine.process_page(&page, &mut state).next_page {
            Some(next) => {
                followed.push(next.to_string());
                url = next;
            }
            None => break,
        }
    }

    assert_eq!(
        followed,
        vec!["https://news.example.com/p/2", "https://news.example.com/p/3"]
    );
    assert_eq!(state.current_page(), 3);
}

#[test]
fn test_whole_page_item_without_list_selector() {
    let config = r#"{
        "startURLs": ["https://research.example.com/r/9"],
        "fields": {
            "title": {"selector": "h1.title", "required": true},
            "target_price": {"selector": ".target", "valueType": "float", "refinementPattern": "([\\d\\.]+)"},
            "rating": {"selector": ".rating"}
        },
        "outputType": "report"
    }"#;
    let engine = CrawlEngine::new(parse_config_json(config).unwrap()).unwrap();
    let page = page(
        "https://research.example.com/r/9",
        r#"<h1 class="title">Sector outlook</h1><p class="target">Target: 42.50 CNY</p>"#,
    );

    let outcome = engine.process_page(&page, &mut PaginationState::new());
    assert_eq!(outcome.records.len(), 1);

    match classify(outcome.records[0].clone()) {
        TypedRecord::Report(r) => {
            assert_eq!(r.title.as_deref(), Some("Sector outlook"));
            assert_eq!(r.target_price, Some(42.5));
            assert_eq!(r.rating, None);
        }
        other => panic!("expected a report, got {:?}", other),
    }
}

#[test]
fn test_legacy_toml_rule_set_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
start_urls = ["https://quotes.example.com/list"]
allowed_domains = ["example.com"]

[spider_settings]
download_delay = 0.5
concurrent_requests = 4

[item_selector]
list_selector = "tr.quote"

[data_fields.symbol]
selector = "td.code"
type = "STRING"
required = true

[data_fields.volume]
selector = "td.vol"
type = "INT"
regex = "(\\d+)"

[output_settings]
data_type = "research_report"
save_to_database = true
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.fetch_policy.delay, 0.5);
    assert_eq!(config.fetch_policy.concurrency, 4);
    assert_eq!(config.output_type, OutputType::Report);

    let engine = CrawlEngine::new(config).unwrap();
    let page = page(
        "https://quotes.example.com/list",
        r#"<table>
            <tr class="quote"><td class="code">600000</td><td class="vol">12,345 lots</td></tr>
            <tr class="quote"><td class="vol">99</td></tr>
        </table>"#,
    );

    let outcome = engine.process_page(&page, &mut PaginationState::new());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("volume"), Some(&FieldValue::Int(12)));
    assert_eq!(outcome.records[0].output_type(), OutputType::Report);
}

#[test]
fn test_invalid_rule_sets_are_rejected_before_fetching() {
    let no_fields = r#"{"startURLs": ["https://example.com"], "fields": {}}"#;
    let err = CrawlEngine::new(parse_config_json(no_fields).unwrap()).unwrap_err();
    assert_eq!(err.reason(), "missing field rules");

    let bad_selector = r#"{
        "startURLs": ["https://example.com"],
        "fields": {"title": {"selector": "h1[[["}}
    }"#;
    assert!(CrawlEngine::new(parse_config_json(bad_selector).unwrap()).is_err());

    let bad_scheme = r#"{
        "startURLs": ["ftp://example.com"],
        "fields": {"title": {"selector": "h1"}}
    }"#;
    assert!(CrawlEngine::new(parse_config_json(bad_scheme).unwrap()).is_err());
}
