use super::{ImageRecord, SearchResponse};
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;

/// Fixed page size for every search request.
pub const PER_PAGE: usize = 30;

/// Maximum response body size (a page of photo metadata is a few hundred KB).
const MAX_RESPONSE_SIZE: usize = 4 * 1024 * 1024;

/// Per-request budget; a hung provider must not wedge pagination forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// Fetch one page of search results.
///
/// `page` is 1-based; every request asks for [`PER_PAGE`] records. A page
/// shorter than that means the result set is exhausted — the caller decides
/// what to do with that.
///
/// `base_url` overrides the provider endpoint (wiremock in tests, proxies in
/// config); the default is the public API host.
pub async fn search_photos(
    client: &reqwest::Client,
    access_key: &SecretString,
    query: &str,
    page: u32,
    base_url: Option<&str>,
) -> Result<Vec<ImageRecord>, SearchError> {
    let base = base_url.unwrap_or(DEFAULT_BASE_URL);
    check_base_url(base)?;

    let url = format!("{}/search/photos", base.trim_end_matches('/'));

    tracing::debug!(query = %query, page = page, "Requesting search page");

    let page_param = page.to_string();
    let per_page_param = PER_PAGE.to_string();
    let request = client
        .get(&url)
        .query(&[
            ("query", query),
            ("page", page_param.as_str()),
            ("per_page", per_page_param.as_str()),
        ])
        .header(
            "Authorization",
            format!("Client-ID {}", access_key.expose_secret()),
        );

    let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| SearchError::Timeout)?
        .map_err(SearchError::Network)?;

    if !response.status().is_success() {
        return Err(SearchError::HttpStatus(response.status().as_u16()));
    }

    let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
    let parsed: SearchResponse =
        serde_json::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

    Ok(parsed.results.into_iter().map(ImageRecord::from).collect())
}

/// Enforce HTTPS for the provider endpoint; the access key travels in a
/// header. HTTP is allowed only for localhost (wiremock).
fn check_base_url(base: &str) -> Result<(), SearchError> {
    let parsed = url::Url::parse(base).map_err(|_| SearchError::InsecureBaseUrl)?;
    match parsed.scheme() {
        "https" => Ok(()),
        "http" if matches!(parsed.host_str(), Some("127.0.0.1") | Some("localhost")) => Ok(()),
        _ => {
            tracing::error!(base_url = %base, "Rejecting non-HTTPS search base URL");
            Err(SearchError::InsecureBaseUrl)
        }
    }
}

/// Stream the body with a hard size cap instead of buffering blindly.
async fn read_limited(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SearchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(SearchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(SearchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SearchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
