//! Prompt-to-image generation client.
//!
//! One-shot request/response against a hosted generation API: a free-text
//! prompt yields a single image resource, which is verified to actually load
//! before being turned into a feed record. There is no retry — failures are
//! surfaced to the user in the generation dialog.

use crate::search::{Author, ImageRecord};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Generation is slow; give the provider more room than a search fetch.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(90);

/// Budget for the post-generation load check.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(20);

const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Generation service error: {0}")]
    Provider(String),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Service returned no image")]
    NoImage,
    #[error("Generated image failed to load: {0}")]
    Unloadable(String),
}

impl GenerateError {
    /// Message shown inline in the generation dialog.
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::EmptyPrompt => "Enter a prompt first.".to_string(),
            GenerateError::Timeout => "Generation timed out. Try again.".to_string(),
            GenerateError::Network(_) => "Could not reach the generation service.".to_string(),
            GenerateError::Provider(msg) => format!("Generation failed: {}", msg),
            GenerateError::HttpStatus(status) => {
                format!("Generation service error (HTTP {}).", status)
            }
            GenerateError::NoImage => "The service returned no image. Try again.".to_string(),
            GenerateError::Unloadable(_) => {
                "The generated image could not be loaded.".to_string()
            }
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

// ============================================================================
// Operation
// ============================================================================

/// Generate a single image from a prompt and build a feed record for it.
///
/// The record is attributed to `author_name` (the signed-in user) and
/// flagged as generated. An empty or whitespace prompt is rejected before
/// any request is issued.
pub async fn generate_image(
    client: &reqwest::Client,
    api_key: &SecretString,
    prompt: &str,
    author_name: &str,
    base_url: Option<&str>,
) -> Result<ImageRecord, GenerateError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }

    let base = base_url.unwrap_or(DEFAULT_BASE_URL);
    let url = format!("{}/v1/images/generations", base.trim_end_matches('/'));

    tracing::info!(prompt_len = prompt.len(), "Requesting image generation");

    let request = client
        .post(&url)
        .header(
            "Authorization",
            format!("Bearer {}", api_key.expose_secret()),
        )
        .json(&serde_json::json!({
            "prompt": prompt,
            "n": 1,
            "size": IMAGE_SIZE,
        }));

    let response = tokio::time::timeout(GENERATION_TIMEOUT, request.send())
        .await
        .map_err(|_| GenerateError::Timeout)?
        .map_err(GenerateError::Network)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Ok(err) = serde_json::from_str::<ProviderError>(&body) {
            if !err.error.message.is_empty() {
                return Err(GenerateError::Provider(err.error.message));
            }
        }
        return Err(GenerateError::HttpStatus(status.as_u16()));
    }

    let parsed: GenerationResponse = response
        .json()
        .await
        .map_err(|e| GenerateError::Provider(format!("malformed response: {}", e)))?;

    let image_url = parsed
        .data
        .into_iter()
        .find_map(|img| img.url)
        .ok_or(GenerateError::NoImage)?;

    verify_loads(client, &image_url).await?;

    Ok(ImageRecord {
        id: format!("generated-{}", Utc::now().timestamp_millis()),
        description: Some(prompt.to_string()),
        alt_description: Some(prompt.to_string()),
        preview_url: image_url.clone(),
        full_url: image_url,
        download_url: None,
        author: Author {
            name: author_name.to_string(),
            username: "generated".to_string(),
            avatar_url: None,
        },
        likes: None,
        views: None,
        created_at: Some(Utc::now()),
        generated: true,
    })
}

/// Confirm the returned URL actually serves an image before showing it.
///
/// Providers occasionally hand back URLs that 404 or resolve to an error
/// page; checking here keeps broken cards out of the feed.
async fn verify_loads(client: &reqwest::Client, url: &str) -> Result<(), GenerateError> {
    let response = tokio::time::timeout(VERIFY_TIMEOUT, client.get(url).send())
        .await
        .map_err(|_| GenerateError::Unloadable("timed out".to_string()))?
        .map_err(|e| GenerateError::Unloadable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GenerateError::Unloadable(format!("HTTP {}", status.as_u16())));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("image/") {
        return Err(GenerateError::Unloadable(format!(
            "unexpected content type '{}'",
            content_type
        )));
    }

    Ok(())
}
