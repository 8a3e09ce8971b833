use serde::{Deserialize, Serialize};

/// Media item as returned by the Google Photos Library API
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default)]
    pub id: String,
    pub filename: String,
    /// Short-lived download URL
    pub base_url: String,
    pub mime_type: Option<String>,
}

/// One page of `mediaItems:search`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemPage {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    pub next_page_token: Option<String>,
}

/// Request body of `mediaItems:search`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub album_id: &'a str,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

/// What a photo sync did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSyncReport {
    pub found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub rejected: usize,
    /// Entries written to the listing file
    pub listing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_page() {
        let page: MediaItemPage = serde_json::from_str(
            r#"{
                "mediaItems": [{
                    "id": "m1",
                    "filename": "IMG_0001.JPG",
                    "baseUrl": "https://lh3.googleusercontent.com/abc",
                    "mimeType": "image/jpeg",
                    "mediaMetadata": {"width": "4032"}
                }],
                "nextPageToken": "next"
            }"#,
        )
        .unwrap();

        assert_eq!(page.media_items.len(), 1);
        assert_eq!(page.media_items[0].filename, "IMG_0001.JPG");
        assert_eq!(page.media_items[0].base_url, "https://lh3.googleusercontent.com/abc");
        assert_eq!(page.next_page_token.as_deref(), Some("next"));
    }

    #[test]
    fn test_empty_album_page() {
        let page: MediaItemPage = serde_json::from_str("{}").unwrap();
        assert!(page.media_items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_first_page_request_omits_token() {
        let body = serde_json::to_value(SearchRequest {
            album_id: "album",
            page_size: 100,
            page_token: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"albumId": "album", "pageSize": 100}));
    }
}
