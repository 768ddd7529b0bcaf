//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building one pooled HTTP client with timeouts and compression
//! - Sending the User-Agent, Referer, Accept-Language and Accept headers
//! - Retrying transient failures according to a [`RetryPolicy`]
//! - Error classification

use crate::config::HttpConfig;
use crate::crawler::retry::RetryPolicy;
use crate::FetchError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successful (2xx) response with its body read into memory
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

/// Outcome of a single attempt, before the retry policy is applied
enum AttemptError {
    /// Worth another attempt; carries a description of what went wrong
    Transient(String),
    /// Final, no retry
    Fatal(FetchError),
}

/// Builds the underlying reqwest client
///
/// # Example
///
/// ```no_run
/// use pdf_harvest::config::HttpConfig;
/// use pdf_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP client shared by the crawl frontier and the download scheduler
///
/// Stateless apart from the connection pool inside the reqwest client,
/// so one instance can be shared (behind an `Arc`) by every task.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
    accept_language: String,
    page_accept: String,
    pdf_accept: String,
}

impl HttpClient {
    /// Creates a client from configuration and an explicit retry policy
    pub fn new(config: &HttpConfig, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            policy,
            accept_language: config.accept_language.clone(),
            page_accept: config.page_accept.clone(),
            pdf_accept: config.pdf_accept.clone(),
        })
    }

    /// The retry policy applied to every request
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches an HTML page
    pub async fn fetch_page(&self, url: &Url, referer: &str) -> Result<FetchedBody, FetchError> {
        self.fetch(url, referer, &self.page_accept).await
    }

    /// Fetches a PDF document
    pub async fn fetch_pdf(&self, url: &Url, referer: &str) -> Result<FetchedBody, FetchError> {
        self.fetch(url, referer, &self.pdf_accept).await
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Retries are invisible to the caller: the call either returns the
    /// first successful response or the error left after the retry budget
    /// is spent.
    ///
    /// # Errors
    ///
    /// * `FetchError::HttpStatus` - non-2xx status outside the retry set (no retry)
    /// * `FetchError::RetryExhausted` - every attempt hit a transient failure
    /// * `FetchError::Network` - transport failure that is not worth retrying
    /// * `FetchError::Body` - the body could not be read
    pub async fn fetch(
        &self,
        url: &Url,
        referer: &str,
        accept: &str,
    ) -> Result<FetchedBody, FetchError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let reason = match self.attempt(url, referer, accept).await {
                Ok(body) => {
                    if attempts > 1 {
                        tracing::debug!(url = %url, attempts, "Request succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::Transient(reason)) => reason,
            };

            if !self.policy.should_retry(attempts) {
                return Err(FetchError::RetryExhausted {
                    url: url.to_string(),
                    attempts,
                    last: reason,
                });
            }

            let delay = self.policy.backoff(attempts);
            tracing::warn!(
                url = %url,
                attempt = attempts,
                reason = %reason,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        url: &Url,
        referer: &str,
        accept: &str,
    ) -> Result<FetchedBody, AttemptError> {
        let response = self
            .client
            .get(url.clone())
            .header(REFERER, referer)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            if self.policy.is_retryable_status(code) {
                return Err(AttemptError::Transient(format!("HTTP {}", code)));
            }
            return Err(AttemptError::Fatal(FetchError::HttpStatus {
                url: url.to_string(),
                code,
            }));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Transient(format!("Body read timeout: {}", e))
            } else {
                AttemptError::Fatal(FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        })?;

        Ok(FetchedBody {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Connection failures and timeouts are transient; everything else is final
fn classify_transport_error(url: &Url, error: reqwest::Error) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Transient("Request timeout".to_string())
    } else if error.is_connect() {
        AttemptError::Transient(format!("Connection failed: {}", error))
    } else {
        AttemptError::Fatal(FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        })
    }
}
