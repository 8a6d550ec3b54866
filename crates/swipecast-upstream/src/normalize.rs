//! Item Normalizer: ordered fallback extraction over variant upstream
//! payload shapes. Every extractor degrades to `None` on malformed input;
//! nothing here ever fails a whole page.

use serde_json::Value;
use swipecast_protocol::ids::ItemId;
use swipecast_protocol::item::{ContentItem, ContentKind, Engagement};

/// Values above this are taken to be milliseconds and normalized to seconds.
const MILLISECOND_TIMESTAMP_FLOOR: i64 = 20_000_000_000;

/// Normalizes one timeline record (post or reel). Returns `None` when the
/// record has neither a thumbnail nor direct media.
pub fn normalize_timeline_record(record: &Value, fallback_index: usize) -> Option<ContentItem> {
    let node = record_node(record);
    let code = extract_code(node);
    let kind = if code.is_some() {
        ContentKind::Reel
    } else {
        ContentKind::Post
    };
    build_item(node, fallback_index, kind, code)
}

/// Normalizes one story record. Stories arrive unnested.
pub fn normalize_story_record(record: &Value, fallback_index: usize) -> Option<ContentItem> {
    let code = extract_code(record);
    build_item(record, fallback_index, ContentKind::Story, code)
}

fn build_item(
    node: &Value,
    fallback_index: usize,
    kind: ContentKind,
    code: Option<String>,
) -> Option<ContentItem> {
    let item = ContentItem {
        id: extract_id(node, fallback_index),
        kind,
        code,
        thumbnail_url: extract_thumbnail(node),
        media_url: extract_video_url(node),
        caption: extract_caption(node).unwrap_or_default(),
        engagement: extract_engagement(node),
        taken_at: extract_taken_at(node),
    };
    item.has_displayable_media().then_some(item)
}

/// Timeline payloads wrap the media under `node` or `media`; stories do not.
fn record_node(record: &Value) -> &Value {
    record
        .get("node")
        .or_else(|| record.get("media"))
        .unwrap_or(record)
}

/// Stable identity across repeated fetches: upstream id, then pk, then
/// shortcode, then the positional fallback.
fn extract_id(node: &Value, fallback_index: usize) -> ItemId {
    for key in ["id", "pk", "code", "shortcode"] {
        match node.get(key) {
            Some(Value::String(value)) if !value.is_empty() => return ItemId::new(value.clone()),
            Some(Value::Number(value)) => return ItemId::new(value.to_string()),
            _ => {}
        }
    }
    ItemId::new(fallback_index.to_string())
}

fn extract_code(node: &Value) -> Option<String> {
    node.get("shortcode")
        .or_else(|| node.get("code"))
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
}

/// Maximum-width candidate from a width-tagged candidate list.
fn pick_largest_candidate(candidates: &Value) -> Option<String> {
    candidates
        .as_array()?
        .iter()
        .max_by_key(|candidate| candidate.get("width").and_then(Value::as_u64).unwrap_or(0))
        .and_then(|candidate| candidate.get("url"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Thumbnail, in priority order: width-tagged candidates, direct display
/// URL, legacy thumbnail field, then the first carousel sub-item's
/// candidates.
fn extract_thumbnail(node: &Value) -> Option<String> {
    if let Some(url) = node
        .get("image_versions2")
        .and_then(|versions| versions.get("candidates"))
        .and_then(pick_largest_candidate)
    {
        return Some(url);
    }

    for key in ["display_url", "thumbnail_src"] {
        if let Some(url) = node.get(key).and_then(Value::as_str) {
            if url.starts_with("http") {
                return Some(url.to_owned());
            }
        }
    }

    node.get("carousel_media")
        .and_then(|carousel| carousel.get(0))
        .and_then(|first| first.get("image_versions2"))
        .and_then(|versions| versions.get("candidates"))
        .and_then(pick_largest_candidate)
}

/// Caption, in priority order: structured caption text, GraphQL caption
/// edges, then a title field.
fn extract_caption(node: &Value) -> Option<String> {
    if let Some(text) = node
        .get("caption")
        .and_then(|caption| caption.get("text"))
        .and_then(Value::as_str)
    {
        return Some(text.to_owned());
    }

    if let Some(text) = node
        .get("edge_media_to_caption")
        .and_then(|edge| edge.get("edges"))
        .and_then(|edges| edges.get(0))
        .and_then(|edge| edge.get("node"))
        .and_then(|node| node.get("text"))
        .and_then(Value::as_str)
    {
        return Some(text.to_owned());
    }

    node.get("title").and_then(Value::as_str).map(str::to_owned)
}

/// Originating timestamp in seconds. Millisecond-looking values are
/// converted; the caption's creation time is the last resort.
fn extract_taken_at(node: &Value) -> Option<i64> {
    if let Some(seconds) = node.get("taken_at_timestamp").and_then(Value::as_i64) {
        return Some(normalize_seconds(seconds));
    }
    if let Some(raw) = node.get("taken_at").and_then(Value::as_i64) {
        return Some(normalize_seconds(raw));
    }
    node.get("caption")
        .and_then(|caption| caption.get("created_at"))
        .and_then(Value::as_i64)
        .map(normalize_seconds)
}

fn normalize_seconds(raw: i64) -> i64 {
    if raw > MILLISECOND_TIMESTAMP_FLOOR {
        raw / 1000
    } else {
        raw
    }
}

/// First entry of the video-variants list, when present.
fn extract_video_url(node: &Value) -> Option<String> {
    node.get("video_versions")
        .and_then(|versions| versions.get(0))
        .and_then(|version| version.get("url"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn extract_engagement(node: &Value) -> Option<Engagement> {
    let likes = node
        .get("edge_media_preview_like")
        .and_then(|edge| edge.get("count"))
        .and_then(Value::as_u64)
        .or_else(|| node.get("like_count").and_then(Value::as_u64));
    let comments = node
        .get("edge_media_to_comment")
        .and_then(|edge| edge.get("count"))
        .and_then(Value::as_u64)
        .or_else(|| node.get("comment_count").and_then(Value::as_u64));
    let plays = node.get("play_count").and_then(Value::as_u64);

    if likes.is_none() && comments.is_none() && plays.is_none() {
        return None;
    }
    Some(Engagement {
        likes,
        comments,
        plays,
    })
}
