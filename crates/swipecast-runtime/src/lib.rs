//! Feed runtime composition layer: one screen session wired to the upstream
//! content source, the commit caster, and the cast eventbus.
//!
//! All queue and cursor state lives in a single [`FeedSession`] behind a
//! lock owned here; gesture handling, prefetching, and commit dispatch go
//! through this facade so decisions are processed strictly one at a time.

use std::sync::Arc;

use swipecast_caster::CoinCaster;
use swipecast_eventbus::CastEventEnvelope;
use swipecast_protocol::error::CastRuntimeResult;
use swipecast_protocol::event::CastAttempt;
use swipecast_protocol::gesture::{GestureSample, SwipeDecision};
use swipecast_protocol::ids::{CastAttemptId, SessionGeneration, Username};
use swipecast_protocol::item::{ContentItem, FeedMode};
use swipecast_protocol::mint::WalletSession;
use swipecast_protocol::source::{ContentSource, ProfileInfo};
use swipecast_session::{classify, FeedSession, Progress};
use tokio::sync::broadcast;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

pub struct FeedRuntime {
    username: Username,
    session: Mutex<FeedSession>,
    source: Arc<dyn ContentSource>,
    caster: CoinCaster,
    wallet: RwLock<WalletSession>,
    notice: RwLock<Option<String>>,
}

impl FeedRuntime {
    pub fn new(username: Username, source: Arc<dyn ContentSource>, caster: CoinCaster) -> Self {
        Self {
            username,
            session: Mutex::new(FeedSession::new(FeedMode::default())),
            source,
            caster,
            wallet: RwLock::new(WalletSession::default()),
            notice: RwLock::new(None),
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn caster(&self) -> &CoinCaster {
        &self.caster
    }

    /// Replaces the wallet snapshot supplied by the connection collaborator.
    pub async fn set_wallet(&self, wallet: WalletSession) {
        *self.wallet.write().await = wallet;
    }

    /// Atomically resets queue, cursor, and pagination for the new mode,
    /// then loads its first page.
    pub async fn on_mode_change(&self, mode: FeedMode) -> CastRuntimeResult<()> {
        let generation = {
            let mut session = self.session.lock().await;
            session.switch_mode(mode)
        };
        *self.notice.write().await = None;
        self.caster.prune_stale_attempts(generation).await;
        debug!(?mode, generation, "feed mode switched");
        self.fetch_into_session(true).await
    }

    /// Re-fetches the active mode from the start. Also used for the initial
    /// load after construction.
    pub async fn on_refresh(&self) -> CastRuntimeResult<()> {
        self.fetch_into_session(true).await
    }

    /// Classifies a finished gesture and dispatches the resulting decision.
    /// `None` gestures snap back without touching any state.
    pub async fn on_gesture_end(&self, sample: GestureSample) -> SwipeDecision {
        let decision = classify(sample);
        match decision {
            SwipeDecision::Discard => {
                self.on_discard().await;
            }
            SwipeDecision::Commit => {
                self.on_commit().await;
            }
            SwipeDecision::Edit => {
                self.on_edit().await;
            }
            SwipeDecision::None => {}
        }
        decision
    }

    /// Skips the current item: one cursor advance, no network work.
    pub async fn on_discard(&self) -> bool {
        let advanced = {
            let mut session = self.session.lock().await;
            if session.is_exhausted() {
                false
            } else {
                session.advance()
            }
        };
        if advanced {
            self.maybe_prefetch().await;
        }
        advanced
    }

    /// Commits the current item: the cursor advances immediately and the
    /// mint pipeline runs in the background, reporting through the eventbus.
    pub async fn on_commit(&self) -> Option<CastAttempt> {
        let item = {
            let mut session = self.session.lock().await;
            let item = session.current()?.clone();
            session.advance();
            item
        };
        let attempt = self.start_cast(item).await;
        self.maybe_prefetch().await;
        Some(attempt)
    }

    /// Opens the caption editor seeded with the current caption. The cursor
    /// does not move until the edit is confirmed.
    pub async fn on_edit(&self) -> Option<String> {
        let mut session = self.session.lock().await;
        session.open_editor().map(str::to_owned)
    }

    /// Confirms an edit: the current item is replaced wholesale with the
    /// final caption and then committed.
    pub async fn on_editor_confirm(&self, caption: &str) -> Option<CastAttempt> {
        let item = {
            let mut session = self.session.lock().await;
            let item = session.replace_current_caption(caption)?;
            session.close_editor();
            session.advance();
            item
        };
        let attempt = self.start_cast(item).await;
        self.maybe_prefetch().await;
        Some(attempt)
    }

    pub async fn on_editor_cancel(&self) {
        let mut session = self.session.lock().await;
        session.close_editor();
    }

    pub async fn current_item(&self) -> Option<ContentItem> {
        let session = self.session.lock().await;
        session.current().cloned()
    }

    pub async fn progress(&self) -> Progress {
        let session = self.session.lock().await;
        session.progress()
    }

    pub async fn loading(&self) -> bool {
        let session = self.session.lock().await;
        session.fetch_in_flight()
    }

    pub async fn mode(&self) -> FeedMode {
        let session = self.session.lock().await;
        session.mode()
    }

    pub async fn generation(&self) -> SessionGeneration {
        let session = self.session.lock().await;
        session.generation()
    }

    pub async fn queue_len(&self) -> usize {
        let session = self.session.lock().await;
        session.queue_len()
    }

    pub async fn editor_draft(&self) -> Option<String> {
        let session = self.session.lock().await;
        session.editor_draft().map(str::to_owned)
    }

    pub async fn visible_attempt(&self) -> Option<CastAttemptId> {
        let session = self.session.lock().await;
        session.visible_attempt()
    }

    /// The dismissible fetch-error banner, if one is showing.
    pub async fn notice(&self) -> Option<String> {
        self.notice.read().await.clone()
    }

    pub async fn dismiss_notice(&self) {
        *self.notice.write().await = None;
    }

    /// One-shot profile image lookup, independent of the queue.
    pub async fn load_profile(&self) -> CastRuntimeResult<ProfileInfo> {
        self.source.fetch_profile(&self.username).await
    }

    pub fn subscribe_cast_events(&self) -> broadcast::Receiver<CastEventEnvelope> {
        self.caster.eventbus().subscribe_all()
    }

    pub async fn attempt_snapshot(&self, attempt_id: CastAttemptId) -> Option<CastAttempt> {
        self.caster.registry().snapshot(attempt_id).await
    }

    async fn start_cast(&self, item: ContentItem) -> CastAttempt {
        let generation = {
            let session = self.session.lock().await;
            session.generation()
        };
        let wallet = self.wallet.read().await.clone();
        let attempt = self.caster.cast(item, wallet, generation).await;
        let mut session = self.session.lock().await;
        if session.generation() == attempt.generation {
            session.set_visible_attempt(attempt.attempt_id);
        }
        attempt
    }

    /// Claims the session's fetch slot, performs the page request without
    /// holding the session lock, and merges the result. A resolution that
    /// arrives after a mode switch carries a stale generation and is
    /// dropped.
    async fn fetch_into_session(&self, from_start: bool) -> CastRuntimeResult<()> {
        let (generation, mode, cursor) = {
            let mut session = self.session.lock().await;
            let Some(cursor) = session.begin_fetch(from_start) else {
                return Ok(());
            };
            (session.generation(), session.mode(), cursor)
        };

        let result = self
            .source
            .fetch_page(&self.username, mode, cursor.as_deref())
            .await;

        let mut session = self.session.lock().await;
        if session.generation() != generation {
            debug!(
                stale_generation = generation,
                live_generation = session.generation(),
                "dropping fetch resolution from a reset session"
            );
            return Ok(());
        }
        match result {
            Ok(page) => {
                session.merge_page(page);
                // Prefetches are silent; only first-page loads post a notice.
                if from_start {
                    let notice = match session.mode() {
                        FeedMode::Story if session.queue_len() == 0 => {
                            "No active stories right now.".to_owned()
                        }
                        FeedMode::Story => {
                            format!("Loaded stories for @{}.", self.username.as_str())
                        }
                        FeedMode::Post => {
                            format!("Loaded posts + reels for @{}.", self.username.as_str())
                        }
                    };
                    drop(session);
                    *self.notice.write().await = Some(notice);
                }
                Ok(())
            }
            Err(error) => {
                session.fetch_failed();
                drop(session);
                warn!(%error, ?mode, "page fetch failed");
                *self.notice.write().await = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Requests the next page when the buffered queue has drained to the
    /// low-water mark. The in-flight guard in the session makes overlapping
    /// prefetches impossible.
    async fn maybe_prefetch(&self) {
        let wants = {
            let session = self.session.lock().await;
            session.wants_prefetch()
        };
        if wants {
            let _ = self.fetch_into_session(false).await;
        }
    }
}
