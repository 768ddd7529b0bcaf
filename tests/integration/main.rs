//! Integration tests for PDF-Harvest
//!
//! These tests use wiremock to stand up mock websites and exercise the
//! HTTP client, the crawl frontier, the download scheduler and the full
//! harvest end-to-end.

mod crawl_tests;
mod download_tests;
mod http_tests;
