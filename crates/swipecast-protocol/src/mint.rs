use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CastRuntimeError, CastRuntimeResult};
use crate::event::CastReceipt;

/// Wallet-connection collaborator snapshot handed to the caster. The engine
/// never connects wallets itself; it only checks readiness.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: String,
    pub connected: bool,
}

impl WalletSession {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connected: true,
        }
    }

    /// Fail fast before any network work when the wallet is absent.
    pub fn ensure_ready(&self) -> CastRuntimeResult<()> {
        if !self.connected {
            return Err(CastRuntimeError::WalletNotReady(
                "wallet is not connected".to_owned(),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(CastRuntimeError::WalletNotReady(
                "wallet session has no address".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A file handed to the uploader: raw bytes plus a best-effort MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The metadata document describing the coin, uploaded alongside its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_uri: String,
    /// Set for video coins; references the playable media.
    pub animation_uri: Option<String>,
}

#[async_trait]
pub trait MetadataUploader: Send + Sync {
    async fn upload_asset(&self, asset: AssetUpload) -> CastRuntimeResult<String>;
    async fn upload_metadata(&self, metadata: CoinMetadata) -> CastRuntimeResult<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub metadata_uri: String,
    pub creator_address: String,
    pub chain_id: u64,
    pub currency: String,
}

#[async_trait]
pub trait CoinMinter: Send + Sync {
    async fn create_coin(&self, request: MintRequest) -> CastRuntimeResult<CastReceipt>;
}
