//! Physical-to-logical coordinate handling through the pipeline

use targeting::event::{PointerAction, EVENT_FLAG_SIMULATE};
use targeting::types::{Direction, Rect, ScreenCombination};
use targeting::Resolution;
use test_harness::fixtures::{display, group_on, one_hand_display, rotated_display, window};
use test_harness::headless::touch_event;
use test_harness::TestEngine;

#[test]
fn rotation_90_lands_in_logical_space() {
    let mut t = TestEngine::new();
    // Physical (10, 20) on a 90-degree 1920x1080 panel -> logical (1059, 10)
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(1055, 5, 10, 10))],
        vec![rotated_display(0, 1920, 1080, Direction::D90)],
    ));
    let res = t.touch(PointerAction::Down, 0, 10, 20);
    assert_eq!(res.target().unwrap().window_id, 1);
    let item_pos = {
        let ev = t.last_delivery().unwrap();
        let item = ev.acting_item().unwrap().clone();
        (item.display_x, item.display_y)
    };
    assert_eq!(item_pos, (1059, 10));
}

#[test]
fn rotation_270_lands_in_logical_space() {
    let mut t = TestEngine::new();
    // (10, 20) at 270 degrees -> (20, 1920 - 1 - 10) = (20, 1909)
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(15, 1900, 20, 20))],
        vec![rotated_display(0, 1920, 1080, Direction::D270)],
    ));
    assert_eq!(t.touch(PointerAction::Down, 0, 10, 20).target().unwrap().window_id, 1);
}

#[test]
fn fixed_direction_overrides_panel_direction() {
    let mut t = TestEngine::new();
    let mut d = rotated_display(0, 1920, 1080, Direction::D90);
    d.fixed_direction = Some(Direction::D0);
    t.publish(group_on(vec![window(1, 1.0, Rect::new(0, 0, 50, 50))], vec![d]));
    // Identity mapping despite the panel reporting 90 degrees
    assert_eq!(t.touch(PointerAction::Down, 0, 10, 20).target().unwrap().window_id, 1);
}

#[test]
fn one_hand_mode_scales_touch_back_to_full_screen() {
    let mut t = TestEngine::new();
    // 75% viewport anchored at (270, 585); (345, 735) maps to (100, 200)
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(95, 195, 10, 10))],
        vec![one_hand_display(270, 585, 75)],
    ));
    assert_eq!(t.touch(PointerAction::Down, 0, 345, 735).target().unwrap().window_id, 1);
}

#[test]
fn injected_events_skip_one_hand_remap() {
    let mut t = TestEngine::new();
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(340, 730, 10, 10))],
        vec![one_hand_display(270, 585, 75)],
    ));
    let mut ev = touch_event(PointerAction::Down, 0, 345, 735);
    ev.flags = EVENT_FLAG_SIMULATE;
    assert_eq!(t.send(&ev).target().unwrap().window_id, 1);
}

#[test]
fn display_transform_applies_scale_and_offset() {
    let mut t = TestEngine::new();
    let mut d = display(0, 1920, 1080);
    d.transform = Some([1.5, 0.0, 100.0, 0.0, 1.5, 50.0, 0.0, 0.0, 1.0]);
    // (10, 20) -> (115, 80)
    t.publish(group_on(vec![window(1, 1.0, Rect::new(110, 75, 10, 10))], vec![d]));
    assert_eq!(t.touch(PointerAction::Down, 0, 10, 20).target().unwrap().window_id, 1);
}

#[test]
fn out_of_range_points_clamp_to_display_edge() {
    let mut t = TestEngine::new();
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(1900, 1060, 20, 20))],
        vec![display(0, 1920, 1080)],
    ));
    // Way past the panel clamps to (1919, 1079), inside the corner window
    assert_eq!(
        t.touch(PointerAction::Down, 0, 50_000, 50_000).target().unwrap().window_id,
        1
    );
}

#[test]
fn mouse_rehomes_onto_adjacent_display() {
    let mut t = TestEngine::new();
    let mut main = display(0, 1920, 1080);
    main.combination = ScreenCombination::Main;
    let mut right = display(1, 1280, 1024);
    right.x = 1920;
    right.combination = ScreenCombination::Expand;
    let mut w = window(1, 1.0, Rect::new(0, 0, 1280, 1024));
    w.display_id = Some(1);
    t.publish(group_on(vec![w], vec![main, right]));

    // Mouse reports (2000, 100) relative to display 0: globally that is
    // inside display 1 at local (80, 100)
    let res = t.mouse(PointerAction::Move, 2000, 100);
    assert_eq!(res.target().unwrap().window_id, 1);
    let state = t.engine().mouse_state();
    assert_eq!(state.display_id, 1);
    assert_eq!((state.x, state.y), (80, 100));
}

#[test]
fn negative_coordinates_never_hit() {
    let mut t = TestEngine::new();
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(-100, -100, 5000, 5000))],
        vec![display(0, 1920, 1080)],
    ));
    // The clamp stage pins the point to (0, 0), which may hit; drive the
    // resolver directly below the clamp by using a display-independent
    // probe instead.
    let windows = t.engine().catalog().windows_at(-5, 10, None);
    assert!(windows.is_empty());
    let windows = t.engine().catalog().windows_at(10, -5, None);
    assert!(windows.is_empty());
    // Through the pipeline the clamped point resolves normally.
    assert!(matches!(
        t.touch(PointerAction::Down, 0, -5, 10),
        Resolution::Target(_)
    ));
}

#[test]
fn cursor_state_tracks_mouse_and_maps_back_to_panel() {
    let mut t = TestEngine::new();
    t.publish(group_on(
        vec![window(1, 1.0, Rect::new(0, 0, 1080, 1920))],
        vec![rotated_display(0, 1920, 1080, Direction::D90)],
    ));
    t.mouse(PointerAction::Move, 10, 20);
    let state = t.engine().mouse_state();
    assert_eq!((state.x, state.y), (1059, 10));
    // Hardware cursor placement undoes the rotation
    let panel = t.engine().physical_cursor_position().unwrap();
    assert_eq!((panel.x, panel.y), (10, 20));
}
