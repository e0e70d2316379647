//! Enter/leave/cancel bookkeeping across event streams

use targeting::event::{PointerAction, PointerEvent, SourceType};
use targeting::types::Rect;
use targeting::{Resolution, ShiftWindowParam};
use test_harness::fixtures::{group, side_by_side, window};
use test_harness::{assertions, TestEngine};

#[test]
fn mouse_crossing_emits_enter_and_leave() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());

    t.mouse(PointerAction::Move, 100, 100);
    let enters = t.actions_of(PointerAction::EnterWindow);
    assert_eq!(enters.len(), 1);
    assert_eq!(enters[0].target_window_id, Some(1));

    // Cross into window 2
    t.mouse(PointerAction::Move, 1500, 100);
    let leaves = t.actions_of(PointerAction::LeaveWindow);
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].target_window_id, Some(1));
    let enters = t.actions_of(PointerAction::EnterWindow);
    assert_eq!(enters.last().unwrap().target_window_id, Some(2));
}

#[test]
fn staying_in_one_window_emits_no_repeat_crossings() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());
    t.mouse(PointerAction::Move, 100, 100);
    t.mouse(PointerAction::Move, 200, 200);
    t.mouse(PointerAction::Move, 300, 300);
    assert_eq!(t.actions_of(PointerAction::EnterWindow).len(), 1);
    assert!(t.actions_of(PointerAction::LeaveWindow).is_empty());
}

#[test]
fn mouse_drag_stays_glued_until_release() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());

    t.mouse(PointerAction::ButtonDown, 100, 100);
    // Drag across the boundary: still window 1
    let res = t.mouse(PointerAction::Move, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 1);
    let res = t.mouse(PointerAction::ButtonUp, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 1);
    // After release the next move retargets
    let res = t.mouse(PointerAction::Move, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 2);
}

#[test]
fn pull_stream_cancels_old_window_before_reissue() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());

    t.touch(PointerAction::Down, 0, 100, 100);
    // The payload drags into window 2
    let res = t.touch(PointerAction::PullMove, 0, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 2);

    let cancels = t.actions_of(PointerAction::Cancel);
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].target_window_id, Some(1));

    // Cancel arrived before the pull delivery
    let log = t.deliveries();
    let cancel_pos = log
        .iter()
        .position(|(_, e)| e.action == PointerAction::Cancel)
        .unwrap();
    let pull_pos = log
        .iter()
        .position(|(_, e)| e.action == PointerAction::PullMove)
        .unwrap();
    assert!(cancel_pos < pull_pos);
    assertions::assert_cancel_before_reissue(&log, 0);

    t.touch(PointerAction::PullUp, 0, 1500, 100);
}

#[test]
fn touch_up_delivers_to_down_window_after_windows_move() {
    let mut t = TestEngine::new();
    t.publish(group(vec![window(1, 1.0, Rect::new(0, 0, 400, 400))]));
    t.touch(PointerAction::Down, 0, 100, 100);

    // The window moves away mid-gesture
    t.publish(group(vec![window(1, 1.0, Rect::new(1000, 1000, 400, 400))]));

    let res = t.touch(PointerAction::Up, 0, 100, 100);
    assert_eq!(res.target().unwrap().window_id, 1);
}

#[test]
fn two_pointers_track_independently() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());

    assert_eq!(t.touch(PointerAction::Down, 0, 100, 100).target().unwrap().window_id, 1);
    assert_eq!(t.touch(PointerAction::Down, 1, 1500, 100).target().unwrap().window_id, 2);
    // Each pointer's move stays pinned to its own down window
    assert_eq!(t.touch(PointerAction::Move, 0, 1500, 100).target().unwrap().window_id, 1);
    assert_eq!(t.touch(PointerAction::Move, 1, 100, 100).target().unwrap().window_id, 2);
    assert_eq!(t.touch(PointerAction::Up, 0, 100, 100).target().unwrap().window_id, 1);
    assert_eq!(t.touch(PointerAction::Up, 1, 100, 100).target().unwrap().window_id, 2);
}

#[test]
fn broad_touch_right_after_cancel_is_swallowed() {
    let mut t = TestEngine::new();
    t.publish(group(vec![window(1, 1.0, Rect::new(0, 0, 1920, 1080))]));
    t.touch(PointerAction::Down, 0, 500, 500);
    t.touch(PointerAction::Cancel, 0, 500, 500);

    let mut dup = test_harness::headless::touch_event(PointerAction::Down, 0, 500, 500);
    dup.items[0].long_axis = 400;
    assert_eq!(t.send(&dup), Resolution::Swallowed);

    // A narrow follow-up is a genuine touch
    assert!(t.touch(PointerAction::Down, 0, 500, 500).target().is_some());
}

#[test]
fn session_loss_purges_everything_the_pid_owned() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());
    t.touch(PointerAction::Down, 0, 100, 100);
    t.engine()
        .set_pointer_style(101, 1, targeting::hot_area::PointerStyleKind::SizeWestEast, false)
        .unwrap();

    t.kill_process(101);

    // The dead pid's touch is gone: a move re-hit-tests and finds the
    // same geometry but delivery goes nowhere
    t.clear_log();
    t.touch(PointerAction::Move, 0, 100, 100);
    assert!(t.deliveries().is_empty());
    assert_eq!(
        t.engine().get_pointer_style(101, 1, false).unwrap(),
        targeting::hot_area::PointerStyleKind::Default
    );
}

#[test]
fn shift_hands_touch_stream_to_another_window() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());
    t.touch(PointerAction::Down, 0, 100, 100);
    t.clear_log();

    t.engine()
        .shift_app_pointer_event(
            ShiftWindowParam {
                source_window_id: 1,
                target_window_id: 2,
                pointer_id: Some(0),
                x: 1500,
                y: 100,
            },
            true,
        )
        .unwrap();

    let log = t.deliveries();
    assert_eq!(log[0].1.action, PointerAction::Cancel);
    assert_eq!(log[0].1.target_window_id, Some(1));
    assert_eq!(log[1].1.action, PointerAction::EnterWindow);
    assert_eq!(log[1].1.target_window_id, Some(2));

    // The stream now belongs to window 2
    let res = t.touch(PointerAction::Up, 0, 100, 100);
    assert_eq!(res.target().unwrap().window_id, 2);
}

#[test]
fn shift_without_stream_in_flight_fails() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());
    let err = t
        .engine()
        .shift_app_pointer_event(
            ShiftWindowParam {
                source_window_id: 1,
                target_window_id: 2,
                pointer_id: Some(0),
                x: 1500,
                y: 100,
            },
            false,
        )
        .unwrap_err();
    assert_eq!(err, targeting::TargetingError::NoEventInFlight);
}

#[test]
fn hover_scroll_toggle_changes_axis_targeting() {
    let mut t = TestEngine::new();
    t.publish(side_by_side());
    t.mouse(PointerAction::ButtonDown, 100, 100);

    // Default: axis events follow the cursor
    let res = t.mouse(PointerAction::AxisUpdate, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 2);

    t.engine().set_hover_scroll(false);
    let res = t.mouse(PointerAction::AxisUpdate, 1500, 100);
    assert_eq!(res.target().unwrap().window_id, 1);
}

#[test]
fn joystick_events_route_by_focus() {
    let mut t = TestEngine::new();
    let mut g = side_by_side();
    g.focus_window_id = 2;
    t.publish(g);

    // Joysticks carry no contact geometry at all; the focus window
    // still receives the event
    let ev = PointerEvent {
        source: SourceType::Joystick,
        action: PointerAction::Down,
        target_display_id: 0,
        ..Default::default()
    };
    assert_eq!(t.send(&ev).target().unwrap().window_id, 2);
    assert_eq!(t.last_delivery().unwrap().target_window_id, Some(2));

    // A stray contact item changes nothing; focus still wins over
    // whatever geometry the item claims
    let mut ev = test_harness::headless::touch_event(PointerAction::Down, 0, 0, 0);
    ev.source = SourceType::Joystick;
    assert_eq!(t.send(&ev).target().unwrap().window_id, 2);
}
