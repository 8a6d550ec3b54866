use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// Which upstream collection a screen session is consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedMode {
    #[default]
    Post,
    Story,
}

impl FeedMode {
    /// Stories are a fixed tray; only the post timeline pages.
    pub fn is_paginated(self) -> bool {
        matches!(self, Self::Post)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Post,
    Reel,
    Story,
}

impl ContentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Reel => "reel",
            Self::Story => "story",
        }
    }
}

/// Display-only counts; no invariant depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub plays: Option<u64>,
}

/// One normalized queue entry. Immutable once created; edits replace the
/// record wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub kind: ContentKind,
    /// Shortcode that makes reel media resolvable.
    pub code: Option<String>,
    pub thumbnail_url: Option<String>,
    pub media_url: Option<String>,
    pub caption: String,
    pub engagement: Option<Engagement>,
    /// Seconds since epoch, used only for ordering.
    pub taken_at: Option<i64>,
}

impl ContentItem {
    /// Items with neither a thumbnail nor direct media are filtered out
    /// before they can enter a queue.
    pub fn has_displayable_media(&self) -> bool {
        self.thumbnail_url.is_some() || self.media_url.is_some()
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// One page of normalized content from the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentPage {
    pub items: Vec<ContentItem>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
