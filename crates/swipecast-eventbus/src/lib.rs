//! Fanout bus for cast-attempt status transitions.

pub mod bus;
pub mod envelope;

pub use bus::{
    CastEventBus, CastEventBusConfig, DEFAULT_ATTEMPT_BUFFER_CAPACITY,
    DEFAULT_GLOBAL_BUFFER_CAPACITY,
};
pub use envelope::CastEventEnvelope;
