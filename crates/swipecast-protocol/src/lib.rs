//! Shared protocol types and collaborator seams for the swipecast engine.

pub mod error;
pub mod event;
pub mod gesture;
pub mod ids;
pub mod item;
pub mod mint;
pub mod source;
