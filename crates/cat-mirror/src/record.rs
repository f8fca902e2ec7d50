//! Upstream wire shapes. These exist only between the client and the
//! mapper and are never persisted.

use serde::Deserialize;

/// A breed as returned by `GET /breeds`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BreedRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub temperament: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub life_span: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub reference_image_id: Option<String>,
}

/// An image as returned by `GET /images/search`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Breeds the provider tagged on the image. Informational only.
    #[serde(default)]
    pub breeds: Vec<BreedRecord>,
}
