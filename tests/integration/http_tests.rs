//! HTTP client retry and header behavior against mock servers

use crate::common::{client, fast_policy, html_page, pdf_body, redirect_to};
use pdf_harvest::FetchError;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_retries_transient_status_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
    let fetched = client(fast_policy(4))
        .fetch_page(&url, &server.uri())
        .await
        .unwrap();

    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn test_not_found_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let result = client(fast_policy(5)).fetch_page(&url, &server.uri()).await;

    match result {
        Err(e @ FetchError::HttpStatus { .. }) => assert_eq!(e.status_code(), Some(404)),
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
    let result = client(fast_policy(2)).fetch_page(&url, &server.uri()).await;

    match result {
        Err(FetchError::RetryExhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 3);
            assert!(last.contains("502"));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sends_referer_and_accept_headers() {
    let server = MockServer::start().await;
    let referer = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("referer", referer.as_str()))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .and(header("referer", referer.as_str()))
        .and(header("accept", "application/pdf"))
        .respond_with(pdf_body(b"%PDF-1.4"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(fast_policy(0));
    let page = Url::parse(&format!("{}/page", server.uri())).unwrap();
    let pdf = Url::parse(&format!("{}/doc.pdf", server.uri())).unwrap();

    client.fetch_page(&page, &referer).await.unwrap();
    let fetched = client.fetch_pdf(&pdf, &referer).await.unwrap();

    assert_eq!(fetched.body, b"%PDF-1.4");
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect_to(&format!("{}/new", server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_page(&[]))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
    let fetched = client(fast_policy(0))
        .fetch_page(&url, &server.uri())
        .await
        .unwrap();

    assert_eq!(fetched.final_url.path(), "/new");
}
