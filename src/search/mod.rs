//! Photo search provider: record model and HTTP client.
//!
//! The provider speaks an Unsplash-shaped API: one `GET /search/photos`
//! endpoint taking a query string and a 1-based page number, returning a
//! page of photo objects. This module owns the domain model (`ImageRecord`)
//! that the rest of the application renders and paginates over.

mod unsplash;

pub use unsplash::{search_photos, SearchError, PER_PAGE};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Attribution metadata for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// A single image in the feed.
///
/// Identity is the `id` field; records are immutable once fetched.
/// `generated` marks records produced by the prompt-to-image path rather
/// than the search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: String,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    /// Small rendition, suitable for grid previews.
    pub preview_url: String,
    /// Full-resolution rendition for the detail view.
    pub full_url: String,
    /// Provider download endpoint, when one exists.
    pub download_url: Option<String>,
    pub author: Author,
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub generated: bool,
}

impl ImageRecord {
    /// Display title: alt text, falling back to "Untitled".
    pub fn title(&self) -> &str {
        self.alt_description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Untitled")
    }

    /// Long-form description, falling back to "No description".
    pub fn description_text(&self) -> &str {
        self.description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("No description")
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Search endpoint response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub results: Vec<ApiPhoto>,
}

/// One photo object as returned by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiPhoto {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub views: Option<u64>,
    pub urls: ApiUrls,
    #[serde(default)]
    pub links: Option<ApiLinks>,
    pub user: ApiUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUrls {
    pub small: String,
    pub regular: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLinks {
    #[serde(default)]
    pub download: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub profile_image: Option<ApiProfileImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiProfileImage {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
}

impl From<ApiPhoto> for ImageRecord {
    fn from(photo: ApiPhoto) -> Self {
        let avatar_url = photo
            .user
            .profile_image
            .and_then(|p| p.medium.or(p.small));
        ImageRecord {
            id: photo.id,
            description: photo.description,
            alt_description: photo.alt_description,
            preview_url: photo.urls.small,
            full_url: photo.urls.regular,
            download_url: photo.links.and_then(|l| l.download),
            author: Author {
                name: photo.user.name,
                username: photo.user.username,
                avatar_url,
            },
            likes: photo.likes,
            views: photo.views,
            created_at: photo.created_at,
            generated: false,
        }
    }
}
