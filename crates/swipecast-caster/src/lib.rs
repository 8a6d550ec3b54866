//! Commit pipeline for swiped-right items: coin profile derivation, media
//! packaging, and the background upload-and-mint task.

pub mod assets;
pub mod caster;
pub mod profile;
pub mod registry;

pub use assets::{package_media, placeholder_image, PackagedMedia};
pub use caster::{ChainTarget, CoinCaster};
pub use profile::{derive_coin_profile, CoinProfile};
pub use registry::CastAttemptRegistry;
