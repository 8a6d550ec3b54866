//! Facade crate re-exporting the swipe-to-cast engine: protocol types, the
//! upstream scraper client, the screen session, the cast eventbus, the coin
//! caster, and the composed feed runtime.

pub use swipecast_caster as caster;
pub use swipecast_eventbus as eventbus;
pub use swipecast_protocol as protocol;
pub use swipecast_runtime as runtime;
pub use swipecast_session as session;
pub use swipecast_upstream as upstream;

pub use swipecast_caster::{ChainTarget, CoinCaster};
pub use swipecast_runtime::FeedRuntime;
pub use swipecast_session::FeedSession;
