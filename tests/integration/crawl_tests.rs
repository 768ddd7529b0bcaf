//! Crawl frontier traversal against mock sites

use crate::common::{client, fast_policy, html_page, redirect_to};
use pdf_harvest::config::{CrawlerConfig, TraversalOrder};
use pdf_harvest::crawler::{CrawlFrontier, HtmlLinkExtractor};
use pdf_harvest::output::RunStats;
use pdf_harvest::Site;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        politeness_delay_ms: 0,
        ..CrawlerConfig::default()
    }
}

fn frontier(config: CrawlerConfig, stats: Arc<RunStats>) -> CrawlFrontier {
    CrawlFrontier::new(
        client(fast_policy(1)),
        Arc::new(HtmlLinkExtractor),
        config,
        stats,
    )
}

fn paths(urls: &[url::Url]) -> Vec<String> {
    urls.iter().map(|u| u.path().to_string()).collect()
}

#[tokio::test]
async fn test_two_page_graph() {
    let server = MockServer::start().await;

    // A -> [B, C.pdf], B -> [A, D.pdf]
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&["/b", "/c.pdf"]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(&["/a", "/d.pdf"]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/d.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let stats = Arc::new(RunStats::new());
    let site = Site::parse(&format!("{}/a", server.uri())).unwrap();
    let result = frontier(crawler_config(), stats.clone()).crawl(&site).await;

    let pdfs: HashSet<String> = paths(&result.pdf_links).into_iter().collect();
    assert_eq!(pdfs, HashSet::from(["/c.pdf".to_string(), "/d.pdf".to_string()]));
    assert_eq!(paths(&result.visited), vec!["/a", "/b"]);
    assert_eq!(result.pages_failed, 0);
    assert!(!result.hit_page_limit());

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.pages_visited, 2);
    assert_eq!(snapshot.pdf_links_found, 2);
}

#[tokio::test]
async fn test_depth_first_order_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/one", "/two"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html_page(&["/three"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;

    let site = Site::parse(&format!("{}/", server.uri())).unwrap();

    let dfs = frontier(crawler_config(), Arc::new(RunStats::new()))
        .crawl(&site)
        .await;
    assert_eq!(paths(&dfs.visited), vec!["/", "/two", "/three", "/one"]);

    let bfs_config = CrawlerConfig {
        traversal: TraversalOrder::BreadthFirst,
        ..crawler_config()
    };
    let bfs = frontier(bfs_config, Arc::new(RunStats::new()))
        .crawl(&site)
        .await;
    assert_eq!(paths(&bfs.visited), vec!["/", "/one", "/two", "/three"]);
}

#[tokio::test]
async fn test_other_origins_are_never_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    let elsewhere = format!("{}/elsewhere", other.uri());
    let foreign_pdf = format!("{}/report.pdf", other.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[elsewhere.as_str(), elsewhere.as_str(), foreign_pdf.as_str()]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&other)
        .await;

    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(crawler_config(), Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(result.visited.len(), 1);
    // PDF links are collected regardless of origin
    assert_eq!(result.pdf_links.len(), 1);
    assert!(result.pdf_links[0].as_str().starts_with(&other.uri()));
}

#[tokio::test]
async fn test_not_found_page_does_not_stop_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/missing", "/docs"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(&["/annual.pdf"]))
        .expect(1)
        .mount(&server)
        .await;

    let stats = Arc::new(RunStats::new());
    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(crawler_config(), stats.clone()).crawl(&site).await;

    assert_eq!(result.visited.len(), 3);
    assert_eq!(result.pages_failed, 1);
    assert_eq!(paths(&result.pdf_links), vec!["/annual.pdf"]);
    assert_eq!(stats.snapshot().pages_failed, 1);
}

#[tokio::test]
async fn test_transient_failures_are_invisible_to_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/q1.pdf"]))
        .mount(&server)
        .await;

    let crawler = CrawlFrontier::new(
        client(fast_policy(4)),
        Arc::new(HtmlLinkExtractor),
        crawler_config(),
        Arc::new(RunStats::new()),
    );
    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = crawler.crawl(&site).await;

    assert_eq!(result.pages_failed, 0);
    assert_eq!(paths(&result.pdf_links), vec!["/q1.pdf"]);
}

#[tokio::test]
async fn test_duplicate_pdf_links_are_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/report.pdf", "/more"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/more"))
        .respond_with(html_page(&["/report.pdf", "/REPORT.PDF"]))
        .mount(&server)
        .await;

    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(crawler_config(), Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(
        paths(&result.pdf_links),
        vec!["/report.pdf", "/report.pdf", "/REPORT.PDF"]
    );
}

#[tokio::test]
async fn test_redirect_target_is_not_fetched_twice() {
    let server = MockServer::start().await;

    // DFS pops /old first; its redirect lands on /new, which is then skipped
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/new", "/old"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect_to(&format!("{}/new", server.uri())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_page(&["/brochure.pdf"]))
        .expect(1)
        .mount(&server)
        .await;

    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(crawler_config(), Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(paths(&result.visited), vec!["/", "/old"]);
    assert_eq!(paths(&result.pdf_links), vec!["/brochure.pdf"]);
}

#[tokio::test]
async fn test_page_limit_stops_traversal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/p1", "/p2", "/p3"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        max_pages: 2,
        ..crawler_config()
    };
    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(config, Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(result.visited.len(), 2);
    assert!(result.hit_page_limit());
    assert_eq!(result.pages_remaining, 2);
}

#[tokio::test]
async fn test_entry_redirected_off_origin_keeps_crawling_site() {
    let server = MockServer::start().await;
    let landing = MockServer::start().await;

    // The entry page bounces to another origin whose page uses root-relative links
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(redirect_to(&format!("{}/home", landing.uri())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(html_page(&["/investors"]))
        .mount(&landing)
        .await;
    Mock::given(method("GET"))
        .and(path("/investors"))
        .respond_with(html_page(&["/annual.pdf"]))
        .expect(1)
        .mount(&server)
        .await;

    let site = Site::parse(&format!("{}/", server.uri())).unwrap();
    let result = frontier(crawler_config(), Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(paths(&result.visited), vec!["/", "/investors"]);
    assert_eq!(result.pdf_links.len(), 1);
    assert_eq!(
        result.pdf_links[0].as_str(),
        format!("{}/annual.pdf", server.uri())
    );
}

#[tokio::test]
async fn test_politeness_delay_between_page_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/two"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html_page(&["/three"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;

    let delay = Duration::from_millis(50);
    let config = CrawlerConfig {
        politeness_delay_ms: delay.as_millis() as u64,
        ..CrawlerConfig::default()
    };
    let site = Site::parse(&format!("{}/", server.uri())).unwrap();

    let started = Instant::now();
    let result = frontier(config, Arc::new(RunStats::new()))
        .crawl(&site)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.visited.len(), 3);
    // Two gaps between three fetches
    assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_no_delay_before_first_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        politeness_delay_ms: 5_000,
        ..CrawlerConfig::default()
    };
    let site = Site::parse(&format!("{}/", server.uri())).unwrap();

    let started = Instant::now();
    let result = frontier(config, Arc::new(RunStats::new()))
        .crawl(&site)
        .await;

    assert_eq!(result.visited.len(), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}
