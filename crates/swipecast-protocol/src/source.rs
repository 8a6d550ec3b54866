use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CastRuntimeResult;
use crate::ids::Username;
use crate::item::{ContentPage, FeedMode};

/// One-shot profile lookup, independent of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub profile_pic_url: String,
}

/// Paged content upstream. `cursor` is only meaningful for paginated modes;
/// implementations must ignore it for stories and report `has_more = false`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_page(
        &self,
        username: &Username,
        mode: FeedMode,
        cursor: Option<&str>,
    ) -> CastRuntimeResult<ContentPage>;

    async fn fetch_profile(&self, username: &Username) -> CastRuntimeResult<ProfileInfo>;
}

/// Resolves a reel shortcode to a downloadable media URL. `Ok(None)` means
/// the upstream answered but found no playable file.
#[async_trait]
pub trait ReelMediaResolver: Send + Sync {
    async fn resolve_reel_media(&self, code: &str) -> CastRuntimeResult<Option<String>>;
}

/// Downloads remote media bytes (through the same-origin proxy collaborator,
/// which works around upstream hotlink restrictions).
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_media(&self, url: &str) -> CastRuntimeResult<Vec<u8>>;
}
