//! Screen-session state for the swipe feed: ordered queue, consumption
//! cursor, pagination bookkeeping, and the gesture classifier.

pub mod gesture;
pub mod queue;
pub mod session;

pub use gesture::{
    classify, HORIZONTAL_DISTANCE_TRIGGER, HORIZONTAL_VELOCITY_TRIGGER, VERTICAL_DISTANCE_TRIGGER,
    VERTICAL_VELOCITY_TRIGGER,
};
pub use queue::merge;
pub use session::{FeedSession, PaginationState, Progress, LOW_WATER_MARK};
