//! Read-only access to the external video catalog (YouTube Data API v3).
//!
//! Two calls are used: a free-text search restricted to embeddable videos, and
//! a lookup of one video's snippet and statistics. Both are single-shot; a
//! failure is reported to the caller and never retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
pub const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One row of a search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: String,
}

/// Title, channel and statistics for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMeta {
    pub title: String,
    pub channel_title: String,
    pub view_count: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Missing YT_API_KEY on server")]
    MissingCredential,
    #[error("YouTube API error {status}")]
    Upstream { status: u16 },
    #[error("request to the catalog failed: {0}")]
    Transport(String),
    #[error("could not decode catalog response: {0}")]
    Decode(String),
}

/// Search and metadata lookups. Implementations block; async callers are
/// expected to hop onto a blocking thread.
pub trait Catalog: Send + Sync {
    /// Ordered results for `query`. A blank query returns an empty list.
    fn search(&self, query: &str) -> Result<Vec<SearchItem>, CatalogError>;

    /// Metadata for `id`, or `None` when it is unavailable for any reason.
    fn video_meta(&self, id: &str) -> Option<VideoMeta>;
}

pub struct YouTubeCatalog {
    agent: ureq::Agent,
    api_key: Option<String>,
    max_results: u8,
    search_endpoint: String,
    videos_endpoint: String,
}

impl YouTubeCatalog {
    pub fn new(api_key: Option<String>, max_results: u8) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_key,
            max_results,
            search_endpoint: SEARCH_ENDPOINT.to_string(),
            videos_endpoint: VIDEOS_ENDPOINT.to_string(),
        }
    }

    /// Points both calls at another base, e.g. a local stand-in.
    pub fn with_endpoints(mut self, search: impl Into<String>, videos: impl Into<String>) -> Self {
        self.search_endpoint = search.into();
        self.videos_endpoint = videos.into();
        self
    }

    fn get_json(&self, request: ureq::Request) -> Result<serde_json::Value, CatalogError> {
        let response = match request.set("Accept", "application/json").call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                warn!(status, body = %body, "catalog returned an error status");
                return Err(CatalogError::Upstream { status });
            }
            Err(ureq::Error::Transport(err)) => {
                warn!(error = %err, "catalog request failed");
                return Err(CatalogError::Transport(err.to_string()));
            }
        };
        response
            .into_json()
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }
}

impl Catalog for YouTubeCatalog {
    fn search(&self, query: &str) -> Result<Vec<SearchItem>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.api_key.as_deref().ok_or_else(|| {
            warn!("search requested but YT_API_KEY is not configured");
            CatalogError::MissingCredential
        })?;

        let max_results = self.max_results.to_string();
        let request = self
            .agent
            .get(&self.search_endpoint)
            .query("key", key)
            .query("part", "snippet")
            .query("type", "video")
            .query("maxResults", &max_results)
            .query("q", query)
            .query("videoEmbeddable", "true");
        let body = self.get_json(request)?;
        let items = parse_search_response(body)?;
        debug!(query, results = items.len(), "catalog search complete");
        Ok(items)
    }

    fn video_meta(&self, id: &str) -> Option<VideoMeta> {
        let key = self.api_key.as_deref()?;
        let request = self
            .agent
            .get(&self.videos_endpoint)
            .query("part", "snippet,statistics")
            .query("id", id)
            .query("key", key);
        match self.get_json(request).and_then(parse_videos_response) {
            Ok(meta) => meta,
            Err(err) => {
                debug!(id, error = %err, "metadata lookup treated as unavailable");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResource {
    #[serde(default)]
    id: SearchResourceId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResourceId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoResource {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    view_count: Option<String>,
}

/// Flattens a `search.list` body. Missing fields become empty strings rather
/// than errors; only a body of the wrong shape fails.
pub fn parse_search_response(body: serde_json::Value) -> Result<Vec<SearchItem>, CatalogError> {
    let list: ListResponse<SearchResource> =
        serde_json::from_value(body).map_err(|err| CatalogError::Decode(err.to_string()))?;
    Ok(list
        .items
        .into_iter()
        .map(|resource| {
            let thumbnails = resource.snippet.thumbnails;
            let thumbnail = thumbnails
                .medium
                .and_then(|thumb| thumb.url)
                .or_else(|| thumbnails.default.and_then(|thumb| thumb.url))
                .unwrap_or_default();
            SearchItem {
                id: resource.id.video_id.unwrap_or_default(),
                title: resource.snippet.title.unwrap_or_default(),
                channel_title: resource.snippet.channel_title.unwrap_or_default(),
                thumbnail,
            }
        })
        .collect())
}

/// First entry of a `videos.list` body, if any.
pub fn parse_videos_response(
    body: serde_json::Value,
) -> Result<Option<VideoMeta>, CatalogError> {
    let list: ListResponse<VideoResource> =
        serde_json::from_value(body).map_err(|err| CatalogError::Decode(err.to_string()))?;
    Ok(list.items.into_iter().next().map(|video| VideoMeta {
        title: video.snippet.title.unwrap_or_default(),
        channel_title: video.snippet.channel_title.unwrap_or_default(),
        view_count: video.statistics.view_count,
        published_at: video.snippet.published_at,
    }))
}
