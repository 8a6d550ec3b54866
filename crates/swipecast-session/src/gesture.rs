use swipecast_protocol::gesture::{GestureSample, SwipeDecision};

pub const HORIZONTAL_DISTANCE_TRIGGER: f32 = 120.0;
pub const HORIZONTAL_VELOCITY_TRIGGER: f32 = 600.0;
pub const VERTICAL_DISTANCE_TRIGGER: f32 = 120.0;
pub const VERTICAL_VELOCITY_TRIGGER: f32 = 700.0;

/// Maps a finished gesture to exactly one decision. Each axis triggers on
/// either distance or velocity. When several thresholds are crossed in the
/// same sample the priority order is fixed: horizontal-left, then
/// horizontal-right, then vertical-up; the first satisfied wins.
pub fn classify(sample: GestureSample) -> SwipeDecision {
    let far_left = sample.dx < -HORIZONTAL_DISTANCE_TRIGGER
        || sample.vx < -HORIZONTAL_VELOCITY_TRIGGER;
    let far_right =
        sample.dx > HORIZONTAL_DISTANCE_TRIGGER || sample.vx > HORIZONTAL_VELOCITY_TRIGGER;
    // Up is negative in pointer coordinates.
    let swiped_up =
        sample.dy < -VERTICAL_DISTANCE_TRIGGER || sample.vy < -VERTICAL_VELOCITY_TRIGGER;

    if far_left {
        SwipeDecision::Discard
    } else if far_right {
        SwipeDecision::Commit
    } else if swiped_up {
        SwipeDecision::Edit
    } else {
        SwipeDecision::None
    }
}

#[cfg(test)]
mod tests {
    use swipecast_protocol::gesture::{GestureSample, SwipeDecision};

    use super::classify;

    #[test]
    fn left_swipe_by_distance_discards() {
        let decision = classify(GestureSample::new(-200.0, 0.0, -700.0, 0.0));
        assert_eq!(decision, SwipeDecision::Discard);
    }

    #[test]
    fn right_swipe_by_velocity_alone_commits() {
        let decision = classify(GestureSample::new(40.0, 0.0, 650.0, 0.0));
        assert_eq!(decision, SwipeDecision::Commit);
    }

    #[test]
    fn upward_swipe_opens_editor() {
        assert_eq!(
            classify(GestureSample::new(0.0, -130.0, 0.0, -100.0)),
            SwipeDecision::Edit
        );
        assert_eq!(
            classify(GestureSample::new(0.0, -40.0, 0.0, -750.0)),
            SwipeDecision::Edit
        );
    }

    #[test]
    fn sub_threshold_gesture_snaps_back() {
        let decision = classify(GestureSample::new(60.0, -50.0, 100.0, -200.0));
        assert_eq!(decision, SwipeDecision::None);
    }

    #[test]
    fn horizontal_wins_over_vertical_when_both_cross() {
        let decision = classify(GestureSample::new(-150.0, -150.0, 0.0, 0.0));
        assert_eq!(decision, SwipeDecision::Discard);

        let decision = classify(GestureSample::new(150.0, -150.0, 0.0, 0.0));
        assert_eq!(decision, SwipeDecision::Commit);
    }

    #[test]
    fn left_wins_when_distance_and_velocity_disagree_on_direction() {
        // Distance says left, velocity says right; left is evaluated first.
        let decision = classify(GestureSample::new(-130.0, 0.0, 650.0, 0.0));
        assert_eq!(decision, SwipeDecision::Discard);
    }

    #[test]
    fn downward_fling_never_triggers_edit() {
        let decision = classify(GestureSample::new(0.0, 300.0, 0.0, 900.0));
        assert_eq!(decision, SwipeDecision::None);
    }
}
