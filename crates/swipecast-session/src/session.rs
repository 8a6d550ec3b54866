use swipecast_protocol::ids::{CastAttemptId, SessionGeneration};
use swipecast_protocol::item::{ContentItem, ContentPage, FeedMode};

use crate::queue;

/// Remaining-buffer threshold that triggers prefetching the next page.
pub const LOW_WATER_MARK: usize = 3;

/// Continuation state for the active mode. Only the post timeline ever
/// reports `has_more`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationState {
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// "n of m" for the UI; `position` is zero when the queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

/// The mutable state of one pick-and-cast screen session. Owned exclusively
/// by the runtime and mutated only under its lock; everything here is plain
/// synchronous state.
#[derive(Debug)]
pub struct FeedSession {
    mode: FeedMode,
    generation: SessionGeneration,
    queue: Vec<ContentItem>,
    cursor: usize,
    pagination: PaginationState,
    fetch_in_flight: bool,
    editor_draft: Option<String>,
    visible_attempt: Option<CastAttemptId>,
}

impl FeedSession {
    pub fn new(mode: FeedMode) -> Self {
        Self {
            mode,
            generation: 1,
            queue: Vec::new(),
            cursor: 0,
            pagination: PaginationState::default(),
            fetch_in_flight: false,
            editor_draft: None,
            visible_attempt: None,
        }
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Atomically resets queue, cursor, pagination, and transient UI state
    /// for the new mode, and bumps the generation so resolutions from the
    /// previous session can be recognized as stale.
    pub fn switch_mode(&mut self, mode: FeedMode) -> SessionGeneration {
        self.mode = mode;
        self.generation = self
            .generation
            .checked_add(1)
            .expect("session generation space exhausted");
        self.queue.clear();
        self.cursor = 0;
        self.pagination = PaginationState::default();
        self.fetch_in_flight = false;
        self.editor_draft = None;
        self.visible_attempt = None;
        self.generation
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Claims the fetch slot. Returns the continuation cursor to request, or
    /// `None` when a fetch is already outstanding.
    pub fn begin_fetch(&mut self, from_start: bool) -> Option<Option<String>> {
        if self.fetch_in_flight {
            return None;
        }
        self.fetch_in_flight = true;
        if from_start || !self.mode.is_paginated() {
            Some(None)
        } else {
            Some(self.pagination.next_cursor.clone())
        }
    }

    /// True when the consumption pointer is close enough to the end of the
    /// buffered queue that another page should be requested.
    pub fn wants_prefetch(&self) -> bool {
        self.mode.is_paginated()
            && self.pagination.has_more
            && !self.fetch_in_flight
            && self.queue.len().saturating_sub(self.cursor) <= LOW_WATER_MARK
    }

    /// Applies a successfully fetched page: merge + dedup + re-sort, then
    /// pagination state from the response. Releases the fetch slot.
    pub fn merge_page(&mut self, page: ContentPage) {
        self.fetch_in_flight = false;
        let incoming = page
            .items
            .into_iter()
            .filter(ContentItem::has_displayable_media)
            .collect();
        self.queue = queue::merge(std::mem::take(&mut self.queue), incoming);
        if self.mode.is_paginated() {
            self.pagination = PaginationState {
                next_cursor: page.next_cursor,
                has_more: page.has_more,
            };
        } else {
            self.pagination = PaginationState::default();
        }
        tracing::debug!(
            mode = ?self.mode,
            queue_len = self.queue.len(),
            has_more = self.pagination.has_more,
            "merged fetched page into session queue"
        );
    }

    /// Releases the fetch slot after a failed fetch; queue state is left
    /// untouched and retry is manual.
    pub fn fetch_failed(&mut self) {
        self.fetch_in_flight = false;
    }

    pub fn current(&self) -> Option<&ContentItem> {
        self.queue.get(self.cursor)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more
    }

    pub fn progress(&self) -> Progress {
        let total = self.queue.len();
        let position = if total == 0 {
            0
        } else {
            (self.cursor + 1).min(total)
        };
        Progress { position, total }
    }

    /// Moves the consumption pointer past the current item, clamped at the
    /// queue length, and resets per-item transient state (editor draft and
    /// the visible attempt slot). Must be called exactly once per resolved
    /// decision.
    pub fn advance(&mut self) -> bool {
        self.editor_draft = None;
        self.visible_attempt = None;
        if self.cursor < self.queue.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Seeds the editor with the current item's caption. Returns the draft,
    /// or `None` when the queue is exhausted.
    pub fn open_editor(&mut self) -> Option<&str> {
        let caption = self.current()?.caption.clone();
        self.editor_draft = Some(caption);
        self.editor_draft.as_deref()
    }

    pub fn editor_draft(&self) -> Option<&str> {
        self.editor_draft.as_deref()
    }

    pub fn close_editor(&mut self) {
        self.editor_draft = None;
    }

    /// Replaces the current item wholesale with an edited caption. Returns
    /// the updated item for the commit path.
    pub fn replace_current_caption(&mut self, caption: &str) -> Option<ContentItem> {
        let item = self.queue.get_mut(self.cursor)?;
        *item = item.clone().with_caption(caption);
        Some(item.clone())
    }

    pub fn set_visible_attempt(&mut self, attempt_id: CastAttemptId) {
        self.visible_attempt = Some(attempt_id);
    }

    pub fn visible_attempt(&self) -> Option<CastAttemptId> {
        self.visible_attempt
    }
}
