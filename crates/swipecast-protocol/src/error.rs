use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CastRuntimeError {
    #[error("cast runtime configuration error: {0}")]
    Configuration(String),
    #[error("upstream fetch failed: {0}")]
    Upstream(String),
    #[error("media unavailable: {0}")]
    MediaUnavailable(String),
    #[error("wallet not ready: {0}")]
    WalletNotReady(String),
    #[error("cast pipeline failed during {stage}: {message}")]
    Pipeline { stage: &'static str, message: String },
    #[error("cast runtime internal error: {0}")]
    Internal(String),
}

pub type CastRuntimeResult<T> = Result<T, CastRuntimeError>;
