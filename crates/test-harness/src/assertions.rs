//! Test assertions over delivery logs

use targeting::event::{PointerAction, PointerEvent};
use targeting::types::WindowId;

/// Assert the last delivered event of this action kind targeted `window`.
pub fn assert_last_target(log: &[(i32, PointerEvent)], action: PointerAction, window: WindowId) {
    let last = log
        .iter()
        .rev()
        .find(|(_, e)| e.action == action)
        .unwrap_or_else(|| panic!("no {action:?} was delivered"));
    assert_eq!(
        last.1.target_window_id,
        Some(window),
        "{action:?} targeted {:?}, expected window {window}",
        last.1.target_window_id
    );
}

/// Assert that every window which received a DOWN or PULL_DOWN for the
/// pointer received a terminating UP/CANCEL before any later window
/// received a DOWN/PULL for the same pointer.
///
/// This is the cancel-before-reissue contract: never two live DOWNs for
/// one pointer without a terminator between them.
pub fn assert_cancel_before_reissue(log: &[(i32, PointerEvent)], pointer: i32) {
    let mut live: Option<WindowId> = None;
    for (_, ev) in log.iter().filter(|(_, e)| e.pointer_id == pointer) {
        let target = ev.target_window_id;
        match ev.action {
            PointerAction::Down | PointerAction::PullDown => {
                if let (Some(open), Some(new)) = (live, target) {
                    assert_eq!(
                        open, new,
                        "window {new} got a down while window {open} still held one"
                    );
                }
                live = target;
            }
            PointerAction::PullMove => {
                if let (Some(open), Some(new)) = (live, target) {
                    assert_eq!(
                        open, new,
                        "pull moved to window {new} without cancelling window {open}"
                    );
                }
                if target.is_some() {
                    live = target;
                }
            }
            PointerAction::Up | PointerAction::Cancel | PointerAction::PullUp => {
                if live == target {
                    live = None;
                }
            }
            _ => {}
        }
    }
}

/// Assert no event in the log was delivered to the given window.
pub fn assert_never_delivered_to(log: &[(i32, PointerEvent)], window: WindowId) {
    for (_, ev) in log {
        assert_ne!(
            ev.target_window_id,
            Some(window),
            "window {window} unexpectedly received {:?}",
            ev.action
        );
    }
}

/// Assert the log contains, for this pointer, the given action sequence
/// as a subsequence in order.
pub fn assert_sequence(log: &[(i32, PointerEvent)], pointer: i32, expected: &[PointerAction]) {
    let mut want = expected.iter();
    let mut next = want.next();
    for (_, ev) in log.iter().filter(|(_, e)| e.pointer_id == pointer) {
        if Some(&ev.action) == next {
            next = want.next();
        }
    }
    assert!(
        next.is_none(),
        "delivery log missing {next:?} from expected sequence {expected:?}"
    );
}
