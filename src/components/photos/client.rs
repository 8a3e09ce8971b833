use super::models::{MediaItem, MediaItemPage, SearchRequest};
use crate::auth::Credentials;
use crate::error::{check_status, payload_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;

/// Base URL for the Google Photos Library API v1
const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com/v1";

/// Source of album items and their content
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// One page of the album's items
    async fn search_album(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> SyncResult<MediaItemPage>;

    /// Binary content of an item
    async fn download(&self, item: &MediaItem) -> SyncResult<Vec<u8>>;
}

/// Google Photos Library API client
#[derive(Debug, Clone)]
pub struct GooglePhotosClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GooglePhotosClient {
    pub fn new(client: Client, credentials: &Credentials) -> Self {
        Self {
            client,
            access_token: credentials.access_token().to_string(),
            base_url: PHOTOS_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PhotoSource for GooglePhotosClient {
    async fn search_album(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> SyncResult<MediaItemPage> {
        let body = SearchRequest {
            album_id,
            page_size,
            page_token,
        };

        let response = self
            .client
            .post(format!("{}/mediaItems:search", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        check_status("Google Photos", response)
            .await?
            .json()
            .await
            .map_err(|e| payload_error(&format!("Failed to parse media items: {}", e)))
    }

    async fn download(&self, item: &MediaItem) -> SyncResult<Vec<u8>> {
        let response = self.client.get(&item.base_url).send().await?;
        let bytes = check_status("Google Photos download", response)
            .await?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
