use serde::{Deserialize, Serialize};

/// Displacement and velocity sampled at gesture end. Positive x is right,
/// positive y is down, matching pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureSample {
    pub dx: f32,
    pub dy: f32,
    pub vx: f32,
    pub vy: f32,
}

impl GestureSample {
    pub fn new(dx: f32, dy: f32, vx: f32, vy: f32) -> Self {
        Self { dx, dy, vx, vy }
    }
}

/// The discrete outcome a finished gesture maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDecision {
    /// Swipe left: drop the current item without casting.
    Discard,
    /// Swipe right: cast the current item as-is.
    Commit,
    /// Swipe up: open the caption editor; cursor does not move.
    Edit,
    /// No threshold crossed; snap back to rest.
    None,
}
