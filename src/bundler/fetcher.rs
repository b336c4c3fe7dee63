//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for a run, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests returning either decoded text or raw bytes
//! - Stall detection: text bodies get a whole-request limit, binary bodies
//!   an idle limit between chunks so slow but steady media still completes
//! - Error classification for the root document and subresources

use crate::config::FetcherConfig;
use crate::BundleError;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// How a response body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Decode the body as text using the response charset
    Text,
    /// Keep the raw bytes
    Binary,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched a text body
    Text {
        /// Final URL after redirects
        final_url: String,
        /// Decoded body
        body: String,
    },

    /// Successfully fetched a binary body
    Binary {
        /// Final URL after redirects
        final_url: String,
        /// Raw body bytes
        body: Vec<u8>,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Describes a failed fetch; None for successes
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Text { .. } | Self::Binary { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use web_code_bundler::bundler::build_http_client;
/// use web_code_bundler::config::FetcherConfig;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and reads the body as requested
///
/// Redirects are followed by the client. Any non-2xx final status is an
/// `HttpError`; transport and body-read failures are `NetworkError`s.
///
/// `limit` bounds a text fetch as a whole. For a binary fetch it bounds the
/// wait for the response headers and for each body chunk, so a large body
/// may take longer overall as long as it keeps arriving.
pub async fn fetch_url(client: &Client, url: &Url, kind: BodyKind, limit: Duration) -> FetchResult {
    match kind {
        BodyKind::Text => match tokio::time::timeout(limit, fetch_text(client, url)).await {
            Ok(result) => result,
            Err(_) => timed_out(limit),
        },
        BodyKind::Binary => fetch_binary(client, url, limit).await,
    }
}

/// Sends the GET and keeps only successful responses
async fn send(client: &Client, url: &Url) -> Result<Response, FetchResult> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(classify_network_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchResult::HttpError {
            status_code: status.as_u16(),
        });
    }

    Ok(response)
}

async fn fetch_text(client: &Client, url: &Url) -> FetchResult {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(failed) => return failed,
    };

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Text { final_url, body },
        Err(e) => classify_network_error(e),
    }
}

async fn fetch_binary(client: &Client, url: &Url, idle: Duration) -> FetchResult {
    let mut response = match tokio::time::timeout(idle, send(client, url)).await {
        Ok(Ok(response)) => response,
        Ok(Err(failed)) => return failed,
        Err(_) => return timed_out(idle),
    };

    let final_url = response.url().to_string();
    let mut body = Vec::new();

    loop {
        match tokio::time::timeout(idle, response.chunk()).await {
            Ok(Ok(Some(chunk))) => body.extend_from_slice(&chunk),
            Ok(Ok(None)) => break,
            Ok(Err(e)) => return classify_network_error(e),
            Err(_) => return timed_out(idle),
        }
    }

    FetchResult::Binary { final_url, body }
}

fn timed_out(limit: Duration) -> FetchResult {
    FetchResult::NetworkError {
        error: format!("Request timeout after {:?}", limit),
    }
}

fn classify_network_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}

/// Fetches the root document of a run
///
/// This is the only fetch whose failure aborts the run.
///
/// # Returns
///
/// * `Ok(String)` - The document text
/// * `Err(BundleError::RootFetchFailed)` - Non-success status, transport
///   error, or no complete response within `limit`
pub async fn fetch_document(
    client: &Client,
    url: &Url,
    limit: Duration,
) -> Result<String, BundleError> {
    match fetch_url(client, url, BodyKind::Text, limit).await {
        FetchResult::Text { final_url, body } => {
            tracing::debug!("Fetched root document {} ({} bytes)", final_url, body.len());
            Ok(body)
        }
        other => Err(BundleError::RootFetchFailed {
            url: url.to_string(),
            reason: other
                .failure_reason()
                .unwrap_or_else(|| "unexpected binary body".to_string()),
        }),
    }
}
