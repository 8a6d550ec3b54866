use swipecast_protocol::event::CastStatusEvent;
use swipecast_protocol::ids::CastAttemptId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastEventEnvelope {
    pub attempt_id: CastAttemptId,
    pub sequence: u64,
    pub received_at_monotonic_nanos: u64,
    pub event: CastStatusEvent,
}
