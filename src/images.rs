// ABOUTME: Image provider interface and Pexels-backed implementation
// ABOUTME: Searches for stock photos and downloads candidate images

use crate::errors::{Result, SlideError};
use log::info;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";

/// Search constraints for a photo lookup.
#[derive(Debug, Clone)]
pub struct SearchConstraints {
    pub orientation: String,
    pub count: usize,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            orientation: "landscape".to_string(),
            count: 1,
        }
    }
}

/// One search result. `url` points at the best available rendition.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub id: u64,
    pub url: String,
    pub alt_text: String,
}

/// External collaborator that finds and fetches photos. Any failure from an
/// implementation is treated by the pipeline as "no image available"; it
/// degrades a slide but never aborts generation.
pub trait ImageProvider {
    /// Search for candidate images. An empty result means nothing matched;
    /// errors are reserved for transport and HTTP failures.
    fn search(&self, keyword: &str, constraints: &SearchConstraints) -> Result<Vec<ImageCandidate>>;

    /// Download raw image bytes from a candidate URL.
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Pexels photo search API client.
pub struct PexelsClient {
    api_key: String,
    client: Client,
}

impl PexelsClient {
    pub fn new(api_key: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(SlideError::FetchError)?;
        Ok(Self {
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    id: u64,
    #[serde(default)]
    alt: Option<String>,
    src: PhotoSrc,
}

#[derive(Deserialize)]
struct PhotoSrc {
    large2x: Option<String>,
    large: Option<String>,
    original: Option<String>,
}

impl ImageProvider for PexelsClient {
    fn search(&self, keyword: &str, constraints: &SearchConstraints) -> Result<Vec<ImageCandidate>> {
        info!("Searching for photo with keyword: '{}'", keyword);

        let per_page = constraints.count.to_string();
        let response = self
            .client
            .get(PEXELS_SEARCH_URL)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", keyword),
                ("orientation", constraints.orientation.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .map_err(SlideError::FetchError)?;

        if !response.status().is_success() {
            return Err(SlideError::AssetFetchError(format!(
                "Photo search returned HTTP {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| SlideError::AssetFetchError(format!("Malformed search response: {}", e)))?;

        let candidates = parsed
            .photos
            .into_iter()
            .filter_map(|photo| {
                let url = photo.src.large2x.or(photo.src.large).or(photo.src.original)?;
                Some(ImageCandidate {
                    id: photo.id,
                    url,
                    alt_text: photo.alt.unwrap_or_default(),
                })
            })
            .collect();
        Ok(candidates)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading image: {}", url);
        let response = self.client.get(url).send().map_err(SlideError::FetchError)?;
        if !response.status().is_success() {
            return Err(SlideError::AssetFetchError(format!(
                "Image download returned HTTP {}",
                response.status()
            )));
        }
        let bytes = response.bytes().map_err(SlideError::FetchError)?;
        Ok(bytes.to_vec())
    }
}
