//! Download scheduler behavior against mock servers

use crate::common::{client, fast_policy, pdf_body};
use pdf_harvest::crawler::DownloadScheduler;
use pdf_harvest::output::RunStats;
use pdf_harvest::{DownloadLedger, Site};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scheduler(max_concurrent: usize, stats: Arc<RunStats>) -> DownloadScheduler {
    DownloadScheduler::new(client(fast_policy(1)), max_concurrent, stats)
}

fn link(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
}

#[tokio::test]
async fn test_concurrency_never_exceeds_bound() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(pdf_body(b"%PDF-1.7 slow").set_delay(Duration::from_millis(100)))
        .expect(12)
        .mount(&server)
        .await;

    let links: Vec<Url> = (0..12)
        .map(|i| link(&server, &format!("/docs/file{}.pdf", i)))
        .collect();
    let site = Site::parse(&server.uri()).unwrap();
    let ledger = DownloadLedger::new();
    let stats = Arc::new(RunStats::new());
    let scheduler = scheduler(3, stats.clone());

    let records = scheduler
        .download_all(&site, &links, dir.path(), &ledger)
        .await
        .unwrap();

    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.is_success()));
    assert_eq!(ledger.len(), 12);
    assert!(scheduler.peak_in_flight() <= 3);
    assert!(scheduler.peak_in_flight() >= 1);
    assert_eq!(stats.snapshot().downloads_succeeded, 12);

    for i in 0..12 {
        let content = std::fs::read(dir.path().join(format!("file{}.pdf", i))).unwrap();
        assert_eq!(content, b"%PDF-1.7 slow");
    }
}

#[tokio::test]
async fn test_redownload_is_idempotent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(pdf_body(b"alpha"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.pdf"))
        .respond_with(pdf_body(b"bravo"))
        .mount(&server)
        .await;

    let links = vec![link(&server, "/a.pdf"), link(&server, "/b.pdf")];
    let site = Site::parse(&server.uri()).unwrap();
    let scheduler = scheduler(2, Arc::new(RunStats::new()));

    scheduler
        .download_all(&site, &links, dir.path(), &DownloadLedger::new())
        .await
        .unwrap();
    let first = (
        std::fs::read(dir.path().join("a.pdf")).unwrap(),
        std::fs::read(dir.path().join("b.pdf")).unwrap(),
    );

    scheduler
        .download_all(&site, &links, dir.path(), &DownloadLedger::new())
        .await
        .unwrap();
    let second = (
        std::fs::read(dir.path().join("a.pdf")).unwrap(),
        std::fs::read(dir.path().join("b.pdf")).unwrap(),
    );

    assert_eq!(first, second);
    assert_eq!(first.0, b"alpha");

    // Only the published files remain; no temporary leftovers
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn test_failed_download_does_not_affect_siblings() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok.pdf"))
        .respond_with(pdf_body(b"ok"))
        .mount(&server)
        .await;

    let links = vec![link(&server, "/gone.pdf"), link(&server, "/ok.pdf")];
    let site = Site::parse(&server.uri()).unwrap();
    let ledger = DownloadLedger::new();
    let stats = Arc::new(RunStats::new());

    let mut records = scheduler(2, stats.clone())
        .download_all(&site, &links, dir.path(), &ledger)
        .await
        .unwrap();
    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    assert_eq!(records[0].file_name, "gone.pdf");
    assert!(!records[0].is_success());
    assert!(records[0].error().unwrap_or_default().contains("404"));
    assert_eq!(records[1].file_name, "ok.pdf");
    assert_eq!(records[1].bytes(), Some(2));

    assert!(!dir.path().join("gone.pdf").exists());
    assert!(dir.path().join("ok.pdf").exists());

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.downloads_succeeded, 1);
    assert_eq!(snapshot.downloads_failed, 1);
}

#[tokio::test]
async fn test_duplicate_links_write_one_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/same.pdf"))
        .respond_with(pdf_body(b"same bytes"))
        .expect(3)
        .mount(&server)
        .await;

    let url = link(&server, "/same.pdf");
    let links = vec![url.clone(), url.clone(), url];
    let site = Site::parse(&server.uri()).unwrap();

    let records = scheduler(3, Arc::new(RunStats::new()))
        .download_all(&site, &links, dir.path(), &DownloadLedger::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(
        std::fs::read(dir.path().join("same.pdf")).unwrap(),
        b"same bytes"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_download_uses_site_entry_as_referer() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let entry = format!("{}/investors", server.uri());

    Mock::given(method("GET"))
        .and(path("/files/q4.pdf"))
        .and(header("referer", entry.as_str()))
        .and(header("accept", "application/pdf"))
        .respond_with(pdf_body(b"q4"))
        .expect(1)
        .mount(&server)
        .await;

    let site = Site::parse(&entry).unwrap();
    let records = scheduler(1, Arc::new(RunStats::new()))
        .download_all(
            &site,
            &[link(&server, "/files/q4.pdf")],
            dir.path(),
            &DownloadLedger::new(),
        )
        .await
        .unwrap();

    assert!(records[0].is_success());
    assert_eq!(records[0].site, entry);
    assert_eq!(records[0].pdf_url, format!("{}/files/q4.pdf", server.uri()));
}

#[tokio::test]
async fn test_file_name_near_length_limit() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // 250 bytes: fits the usual 255-byte limit with nothing to spare
    let name = format!("{}.pdf", "r".repeat(246));
    Mock::given(method("GET"))
        .and(path(format!("/{}", name)))
        .respond_with(pdf_body(b"long"))
        .expect(1)
        .mount(&server)
        .await;

    let site = Site::parse(&server.uri()).unwrap();
    let records = scheduler(1, Arc::new(RunStats::new()))
        .download_all(
            &site,
            &[link(&server, &format!("/{}", name))],
            dir.path(),
            &DownloadLedger::new(),
        )
        .await
        .unwrap();

    assert!(records[0].is_success(), "{:?}", records[0].error());
    assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"long");
}
