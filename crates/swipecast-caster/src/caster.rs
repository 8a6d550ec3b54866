use std::sync::Arc;

use swipecast_eventbus::CastEventBus;
use swipecast_protocol::error::{CastRuntimeError, CastRuntimeResult};
use swipecast_protocol::event::{CastAttempt, CastAttemptStatus, CastReceipt, CastStatusEvent};
use swipecast_protocol::ids::SessionGeneration;
use swipecast_protocol::item::ContentItem;
use swipecast_protocol::mint::{CoinMetadata, CoinMinter, MetadataUploader, MintRequest, WalletSession};
use swipecast_protocol::source::{MediaFetcher, ReelMediaResolver};
use tracing::{debug, warn};

use crate::assets::package_media;
use crate::profile::derive_coin_profile;
use crate::registry::CastAttemptRegistry;

/// Fixed mint target. Every coin is created on the same chain with the same
/// trading currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTarget {
    pub chain_id: u64,
    pub currency: String,
}

impl Default for ChainTarget {
    fn default() -> Self {
        // Base mainnet, ETH-paired.
        Self {
            chain_id: 8453,
            currency: "ETH".to_owned(),
        }
    }
}

/// Runs the commit pipeline for swiped-right items: derive a coin profile,
/// package the media, upload assets and metadata, submit the mint.
///
/// `cast` returns as soon as the attempt is registered; the pipeline runs on
/// a spawned task and reports its resolution through the registry and the
/// eventbus. Attempts never touch queue state.
#[derive(Clone)]
pub struct CoinCaster {
    resolver: Arc<dyn ReelMediaResolver>,
    fetcher: Arc<dyn MediaFetcher>,
    uploader: Arc<dyn MetadataUploader>,
    minter: Arc<dyn CoinMinter>,
    registry: Arc<CastAttemptRegistry>,
    eventbus: Arc<CastEventBus>,
    chain: ChainTarget,
}

impl CoinCaster {
    pub fn new(
        resolver: Arc<dyn ReelMediaResolver>,
        fetcher: Arc<dyn MediaFetcher>,
        uploader: Arc<dyn MetadataUploader>,
        minter: Arc<dyn CoinMinter>,
        eventbus: Arc<CastEventBus>,
        chain: ChainTarget,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            uploader,
            minter,
            registry: Arc::new(CastAttemptRegistry::default()),
            eventbus,
            chain,
        }
    }

    pub fn registry(&self) -> &Arc<CastAttemptRegistry> {
        &self.registry
    }

    pub fn eventbus(&self) -> &Arc<CastEventBus> {
        &self.eventbus
    }

    /// Drops resolved attempts from superseded generations and tears down
    /// their per-attempt event channels. Called when the owning session
    /// resets; pending attempts are left to resolve best-effort.
    pub async fn prune_stale_attempts(&self, live_generation: SessionGeneration) -> usize {
        let stale = self.registry.prune_stale(live_generation).await;
        for attempt_id in &stale {
            self.eventbus.remove_attempt(*attempt_id);
        }
        if !stale.is_empty() {
            debug!(pruned = stale.len(), live_generation, "pruned stale cast attempts");
        }
        stale.len()
    }

    /// Starts one commit attempt and returns immediately with its pending
    /// snapshot. An unready wallet resolves the attempt to an error before
    /// any network work happens.
    pub async fn cast(
        &self,
        item: ContentItem,
        wallet: WalletSession,
        generation: SessionGeneration,
    ) -> CastAttempt {
        let attempt = self.registry.begin(item.id.clone(), generation).await;

        if let Err(error) = wallet.ensure_ready() {
            warn!(
                attempt_id = attempt.attempt_id,
                item_id = item.id.as_str(),
                %error,
                "cast rejected before pipeline start"
            );
            return self
                .resolve_and_publish(&attempt, CastAttemptStatus::Error(error.to_string()))
                .await;
        }

        debug!(
            attempt_id = attempt.attempt_id,
            item_id = item.id.as_str(),
            generation,
            "cast attempt started"
        );
        self.eventbus.publish(CastStatusEvent {
            attempt_id: attempt.attempt_id,
            item_id: attempt.item_id.clone(),
            generation: attempt.generation,
            status: CastAttemptStatus::Pending,
        });

        let caster = self.clone();
        let pending = attempt.clone();
        tokio::spawn(async move {
            let status = match caster.run_pipeline(&item, &wallet).await {
                Ok(receipt) => CastAttemptStatus::Success(receipt),
                Err(error) => {
                    warn!(
                        attempt_id = pending.attempt_id,
                        item_id = item.id.as_str(),
                        %error,
                        "cast pipeline failed"
                    );
                    CastAttemptStatus::Error(error.to_string())
                }
            };
            caster.resolve_and_publish(&pending, status).await;
        });

        attempt
    }

    async fn run_pipeline(
        &self,
        item: &ContentItem,
        wallet: &WalletSession,
    ) -> CastRuntimeResult<CastReceipt> {
        let profile = derive_coin_profile(item);
        let media = package_media(item, self.resolver.as_ref(), self.fetcher.as_ref()).await?;

        let image_uri = self
            .uploader
            .upload_asset(media.image)
            .await
            .map_err(pipeline_stage("asset upload"))?;
        let animation_uri = match media.animation {
            Some(video) => Some(
                self.uploader
                    .upload_asset(video)
                    .await
                    .map_err(pipeline_stage("asset upload"))?,
            ),
            None => None,
        };

        let metadata_uri = self
            .uploader
            .upload_metadata(CoinMetadata {
                name: profile.name,
                symbol: profile.symbol,
                description: profile.description,
                image_uri,
                animation_uri,
            })
            .await
            .map_err(pipeline_stage("metadata upload"))?;

        self.minter
            .create_coin(MintRequest {
                metadata_uri,
                creator_address: wallet.address.clone(),
                chain_id: self.chain.chain_id,
                currency: self.chain.currency.clone(),
            })
            .await
            .map_err(pipeline_stage("mint submission"))
    }

    async fn resolve_and_publish(
        &self,
        attempt: &CastAttempt,
        status: CastAttemptStatus,
    ) -> CastAttempt {
        let resolved = self
            .registry
            .resolve(attempt.attempt_id, status)
            .await
            .unwrap_or_else(|| attempt.clone());
        self.eventbus.publish(CastStatusEvent {
            attempt_id: resolved.attempt_id,
            item_id: resolved.item_id.clone(),
            generation: resolved.generation,
            status: resolved.status.clone(),
        });
        resolved
    }
}

fn pipeline_stage(stage: &'static str) -> impl Fn(CastRuntimeError) -> CastRuntimeError {
    move |error| match error {
        wrapped @ CastRuntimeError::Pipeline { .. } => wrapped,
        other => CastRuntimeError::Pipeline {
            stage,
            message: other.to_string(),
        },
    }
}
