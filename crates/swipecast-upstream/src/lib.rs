//! Reqwest client for the third-party content-scraping API, plus the pure
//! payload-shape parsing it relies on.

pub mod normalize;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use swipecast_protocol::error::{CastRuntimeError, CastRuntimeResult};
use tracing::debug;
use swipecast_protocol::ids::Username;
use swipecast_protocol::item::{ContentItem, ContentPage, FeedMode};
use swipecast_protocol::source::{ContentSource, MediaFetcher, ProfileInfo, ReelMediaResolver};

use crate::normalize::{normalize_story_record, normalize_timeline_record};

const DEFAULT_SCRAPER_HOST: &str = "instagram-scraper-stable-api.p.rapidapi.com";
const DEFAULT_RESOLVER_HOST: &str = "instagram-video-image-downloader.p.rapidapi.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const ENV_SCRAPER_API_KEY: &str = "SWIPECAST_SCRAPER_API_KEY";
const ENV_SCRAPER_HOST: &str = "SWIPECAST_SCRAPER_HOST";
const ENV_RESOLVER_HOST: &str = "SWIPECAST_RESOLVER_HOST";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub api_key: String,
    pub scraper_host: String,
    pub resolver_host: String,
    pub request_timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            scraper_host: DEFAULT_SCRAPER_HOST.to_owned(),
            resolver_host: DEFAULT_RESOLVER_HOST.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> CastRuntimeResult<Self> {
        let api_key = std::env::var(ENV_SCRAPER_API_KEY).map_err(|_| {
            CastRuntimeError::Configuration(
                "SWIPECAST_SCRAPER_API_KEY is not set. Export a valid API key before using swipecast-upstream."
                    .to_owned(),
            )
        })?;
        let api_key = api_key.trim().to_owned();
        if api_key.is_empty() {
            return Err(CastRuntimeError::Configuration(
                "SWIPECAST_SCRAPER_API_KEY is empty. Provide a non-empty API key.".to_owned(),
            ));
        }

        let scraper_host = std::env::var(ENV_SCRAPER_HOST)
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SCRAPER_HOST.to_owned());
        let resolver_host = std::env::var(ENV_RESOLVER_HOST)
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_RESOLVER_HOST.to_owned());

        Ok(Self {
            api_key,
            scraper_host,
            resolver_host,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

/// HTTP upstream implementing the content-source, reel-resolution, and media
/// download seams against the scraping API.
#[derive(Clone)]
pub struct ScraperContentSource {
    config: ScraperConfig,
    client: Client,
}

impl ScraperContentSource {
    pub fn from_env() -> CastRuntimeResult<Self> {
        Self::new(ScraperConfig::from_env()?)
    }

    pub fn new(config: ScraperConfig) -> CastRuntimeResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| {
                CastRuntimeError::Configuration(format!(
                    "failed to build scraper HTTP client: {error}"
                ))
            })?;
        Ok(Self { config, client })
    }

    fn scraper_endpoint(&self, path: &str) -> String {
        format!("https://{}/{}", self.config.scraper_host, path)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> CastRuntimeResult<Value> {
        debug!(path, "scraper API request");
        let request = self
            .client
            .post(self.scraper_endpoint(path))
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.scraper_host)
            .form(form);
        self.request_json(request).await
    }

    async fn request_json(&self, request: reqwest::RequestBuilder) -> CastRuntimeResult<Value> {
        let response = request.send().await.map_err(|error| {
            CastRuntimeError::Upstream(format!("scraper API request failed: {error}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            CastRuntimeError::Upstream(format!("scraper API response read failed: {error}"))
        })?;

        if !status.is_success() {
            let snippet: String = body.chars().take(400).collect();
            return Err(CastRuntimeError::Upstream(format!(
                "scraper API request failed with status {status}: {snippet}"
            )));
        }

        serde_json::from_str(&body).map_err(|error| {
            CastRuntimeError::Upstream(format!("scraper API response was malformed JSON: {error}"))
        })
    }
}

#[async_trait]
impl ContentSource for ScraperContentSource {
    async fn fetch_page(
        &self,
        username: &Username,
        mode: FeedMode,
        cursor: Option<&str>,
    ) -> CastRuntimeResult<ContentPage> {
        match mode {
            FeedMode::Post => {
                let mut form = vec![("username_or_url", username.as_str())];
                if let Some(cursor) = cursor {
                    form.push(("pagination_token", cursor));
                }
                let payload = self.post_form("get_ig_user_posts.php", &form).await?;
                Ok(parse_posts_page(&payload))
            }
            // Stories are not paginated; any cursor argument is ignored.
            FeedMode::Story => {
                let form = [("username_or_url", username.as_str())];
                let payload = self.post_form("get_ig_user_stories.php", &form).await?;
                Ok(parse_stories_page(&payload))
            }
        }
    }

    async fn fetch_profile(&self, username: &Username) -> CastRuntimeResult<ProfileInfo> {
        let form = [("username_or_url", username.as_str())];
        let payload = self.post_form("ig_get_fb_profile_v3.php", &form).await?;
        parse_profile(&payload)
    }
}

#[async_trait]
impl ReelMediaResolver for ScraperContentSource {
    async fn resolve_reel_media(&self, code: &str) -> CastRuntimeResult<Option<String>> {
        let reel_url = format!("https://www.instagram.com/reel/{code}");
        let request = self
            .client
            .get(format!("https://{}/igdl", self.config.resolver_host))
            .query(&[("url", reel_url.as_str())])
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.resolver_host);
        let payload = self.request_json(request).await?;
        Ok(parse_reel_media(&payload))
    }
}

#[async_trait]
impl MediaFetcher for ScraperContentSource {
    async fn fetch_media(&self, url: &str) -> CastRuntimeResult<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|error| {
            CastRuntimeError::MediaUnavailable(format!("media download failed: {error}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CastRuntimeError::MediaUnavailable(format!(
                "media download failed with status {status}: {url}"
            )));
        }
        let bytes = response.bytes().await.map_err(|error| {
            CastRuntimeError::MediaUnavailable(format!("media download read failed: {error}"))
        })?;
        Ok(bytes.to_vec())
    }
}

/// Extracts a posts page. The API usually nests edges under
/// `data.user.edge_owner_to_timeline_media`, but flat `edges`/`posts`
/// variants exist across accounts.
pub fn parse_posts_page(payload: &Value) -> ContentPage {
    let edges = payload
        .get("data")
        .and_then(|data| data.get("user"))
        .and_then(|user| user.get("edge_owner_to_timeline_media"))
        .and_then(|timeline| timeline.get("edges"))
        .or_else(|| payload.get("edges"))
        .or_else(|| payload.get("posts"))
        .and_then(Value::as_array);

    let items: Vec<ContentItem> = edges
        .map(|records| {
            records
                .iter()
                .enumerate()
                .filter_map(|(index, record)| normalize_timeline_record(record, index))
                .collect()
        })
        .unwrap_or_default();

    let page_info = payload
        .get("data")
        .and_then(|data| data.get("user"))
        .and_then(|user| user.get("edge_owner_to_timeline_media"))
        .and_then(|timeline| timeline.get("page_info"));
    let next_cursor = payload
        .get("pagination_token")
        .and_then(Value::as_str)
        .or_else(|| {
            page_info
                .and_then(|info| info.get("end_cursor"))
                .and_then(Value::as_str)
        })
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_owned);

    // `has_next_page` is authoritative when the response carries it; the
    // final Graph page often still has an `end_cursor`. The flat
    // `pagination_token` shape has no page info, so cursor presence decides.
    let has_more = page_info
        .and_then(|info| info.get("has_next_page"))
        .and_then(Value::as_bool)
        .unwrap_or(next_cursor.is_some());

    ContentPage {
        items,
        has_more,
        next_cursor,
    }
}

/// Extracts a stories page. Accounts return the tray as a bare array or
/// under `stories`/`items`/`reels`; an empty tray is a valid result, not an
/// error. Stories never paginate.
pub fn parse_stories_page(payload: &Value) -> ContentPage {
    let records = payload
        .as_array()
        .or_else(|| payload.get("stories").and_then(Value::as_array))
        .or_else(|| payload.get("items").and_then(Value::as_array))
        .or_else(|| payload.get("reels").and_then(Value::as_array));

    let items: Vec<ContentItem> = records
        .map(|records| {
            records
                .iter()
                .enumerate()
                .filter_map(|(index, record)| normalize_story_record(record, index))
                .collect()
        })
        .unwrap_or_default();

    ContentPage {
        items,
        next_cursor: None,
        has_more: false,
    }
}

/// The resolver answers with a file list; prefer the first mp4, falling back
/// to the first file of any kind.
pub fn parse_reel_media(payload: &Value) -> Option<String> {
    let files = payload
        .as_array()
        .or_else(|| payload.get("data").and_then(Value::as_array))?;

    let file_url = |file: &Value| {
        file.get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    };

    files
        .iter()
        .filter_map(file_url)
        .find(|url| url.contains(".mp4"))
        .or_else(|| files.first().and_then(file_url))
}

pub fn parse_profile(payload: &Value) -> CastRuntimeResult<ProfileInfo> {
    payload
        .get("profile_pic_url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(|url| ProfileInfo {
            profile_pic_url: url.to_owned(),
        })
        .ok_or_else(|| {
            CastRuntimeError::Upstream("profile response has no profile picture".to_owned())
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_posts_page, parse_profile, parse_reel_media, parse_stories_page};

    #[test]
    fn posts_page_parses_nested_timeline_edges_and_cursor() {
        let payload = json!({
            "data": { "user": { "edge_owner_to_timeline_media": {
                "edges": [
                    { "node": { "id": "1", "display_url": "https://cdn.example/1.jpg",
                                "taken_at_timestamp": 300 } },
                    { "node": { "id": "2", "display_url": "https://cdn.example/2.jpg",
                                "taken_at_timestamp": 200 } }
                ],
                "page_info": { "has_next_page": true, "end_cursor": "cursor-2" }
            }}}
        });

        let page = parse_posts_page(&payload);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
        assert!(page.has_more);
    }

    #[test]
    fn posts_page_prefers_top_level_pagination_token() {
        let payload = json!({
            "pagination_token": "token-9",
            "edges": [
                { "node": { "id": "7", "display_url": "https://cdn.example/7.jpg" } }
            ]
        });

        let page = parse_posts_page(&payload);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("token-9"));
        assert!(page.has_more);
    }

    #[test]
    fn final_graph_page_is_terminal_despite_a_trailing_cursor() {
        let payload = json!({
            "data": { "user": { "edge_owner_to_timeline_media": {
                "edges": [
                    { "node": { "id": "9", "display_url": "https://cdn.example/9.jpg" } }
                ],
                "page_info": { "has_next_page": false, "end_cursor": "tail-cursor" }
            }}}
        });

        let page = parse_posts_page(&payload);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("tail-cursor"));
    }

    #[test]
    fn has_next_page_keeps_paging_even_without_a_cursor() {
        let payload = json!({
            "data": { "user": { "edge_owner_to_timeline_media": {
                "edges": [
                    { "node": { "id": "9", "display_url": "https://cdn.example/9.jpg" } }
                ],
                "page_info": { "has_next_page": true, "end_cursor": null }
            }}}
        });

        let page = parse_posts_page(&payload);
        assert!(page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn posts_page_without_cursor_reports_no_more_pages() {
        let payload = json!({
            "edges": [
                { "node": { "id": "7", "display_url": "https://cdn.example/7.jpg" } }
            ]
        });

        let page = parse_posts_page(&payload);
        assert!(page.next_cursor.is_none());
        assert!(!page.has_more);
    }

    #[test]
    fn posts_page_drops_records_without_media() {
        let payload = json!({
            "edges": [
                { "node": { "id": "ok", "display_url": "https://cdn.example/ok.jpg" } },
                { "node": { "id": "bare", "caption": { "text": "no media" } } }
            ]
        });

        let page = parse_posts_page(&payload);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "ok");
    }

    #[test]
    fn stories_page_accepts_a_bare_array_tray() {
        let payload = json!([
            { "pk": 1, "image_versions2": { "candidates": [
                { "url": "https://cdn.example/s1.jpg", "width": 1080 } ] } },
            { "pk": 2, "video_versions": [ { "url": "https://cdn.example/s2.mp4" } ] }
        ]);

        let page = parse_stories_page(&payload);
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn empty_story_tray_is_a_valid_result() {
        let page = parse_stories_page(&json!({ "stories": [] }));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn reel_media_prefers_the_first_mp4_file() {
        let payload = json!([
            { "url": "https://cdn.example/cover.jpg" },
            { "url": "https://cdn.example/clip.mp4" },
            { "url": "https://cdn.example/other.mp4" }
        ]);
        assert_eq!(
            parse_reel_media(&payload).as_deref(),
            Some("https://cdn.example/clip.mp4")
        );
    }

    #[test]
    fn reel_media_falls_back_to_the_first_file_under_data() {
        let payload = json!({ "data": [ { "url": "https://cdn.example/only.jpg" } ] });
        assert_eq!(
            parse_reel_media(&payload).as_deref(),
            Some("https://cdn.example/only.jpg")
        );
    }

    #[test]
    fn reel_media_is_none_for_an_empty_answer() {
        assert!(parse_reel_media(&json!({ "data": [] })).is_none());
        assert!(parse_reel_media(&json!({})).is_none());
    }

    #[test]
    fn profile_parse_requires_a_picture_url() {
        let ok = parse_profile(&json!({ "profile_pic_url": "https://cdn.example/me.jpg" }))
            .expect("profile info");
        assert_eq!(ok.profile_pic_url, "https://cdn.example/me.jpg");

        assert!(parse_profile(&json!({ "profile_pic_url": "" })).is_err());
        assert!(parse_profile(&json!({})).is_err());
    }
}
