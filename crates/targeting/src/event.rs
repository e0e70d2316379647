//! Normalized input event model
//!
//! Events arrive here already normalized by the device layer (out of
//! scope); this module only carries what target resolution and dispatch
//! need: source, action, per-contact items, and the flags that alter the
//! coordinate pipeline.

use serde::{Deserialize, Serialize};

use crate::types::{DeviceId, DisplayId, PointerId, WindowId};

/// Event flag: injected/simulated event, bypasses one-hand-mode remap.
pub const EVENT_FLAG_SIMULATE: u32 = 1 << 0;

/// Event flag: already mapped to the virtual screen by the injector.
pub const EVENT_FLAG_AUTO_TO_VIRTUAL_SCREEN: u32 = 1 << 1;

/// Hardware source class of a pointer event.
///
/// Resolution dispatches once on this (one path per variant) instead of
/// re-checking capabilities in every helper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Mouse,
    TouchScreen,
    Joystick,
    Crown,
}

/// Physical tool that produced a touch contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    #[default]
    Finger,
    Pen,
    Mouse,
    Knuckle,
}

/// Pointer action, including the synthetic actions this engine emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    #[default]
    Unknown,
    Down,
    Move,
    Up,
    Cancel,
    ButtonDown,
    ButtonUp,
    AxisBegin,
    AxisUpdate,
    AxisEnd,
    /// Re-issued actions while a drag payload is in flight.
    PullDown,
    PullMove,
    PullUp,
    /// Synthetic window-crossing notifications.
    EnterWindow,
    LeaveWindow,
}

impl PointerAction {
    /// Actions that re-issue an in-progress gesture to a new window.
    pub fn is_pull(self) -> bool {
        matches!(
            self,
            PointerAction::PullDown | PointerAction::PullMove | PointerAction::PullUp
        )
    }

    /// Actions that terminate a pointer's session.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PointerAction::Up | PointerAction::Cancel | PointerAction::PullUp
        )
    }
}

/// One contact of a pointer event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerItem {
    pub pointer_id: PointerId,
    /// Physical display coordinates as reported by the device layer.
    pub display_x: i32,
    pub display_y: i32,
    pub tool_type: ToolType,
    /// Contact ellipse long axis, used by the duplicate-touch heuristic.
    pub long_axis: i32,
    pub pressed: bool,
}

/// A normalized pointer event (mouse, touch, joystick, crown).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerEvent {
    pub id: u64,
    pub source: SourceType,
    pub action: PointerAction,
    /// The acting contact; must name one of `items`.
    pub pointer_id: PointerId,
    pub items: Vec<PointerItem>,
    pub device_id: DeviceId,
    pub target_display_id: DisplayId,
    /// Filled in by resolution; injected events may pre-pin a target.
    pub target_window_id: Option<WindowId>,
    pub agent_window_id: Option<WindowId>,
    pub button_id: Option<i32>,
    pub flags: u32,
}

impl PointerEvent {
    /// The item belonging to the acting pointer id.
    pub fn acting_item(&self) -> Option<&PointerItem> {
        self.items.iter().find(|i| i.pointer_id == self.pointer_id)
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// One-hand remap is skipped for injected events and events already
    /// mapped onto the virtual screen.
    pub fn bypasses_one_hand(&self) -> bool {
        self.has_flag(EVENT_FLAG_SIMULATE) || self.has_flag(EVENT_FLAG_AUTO_TO_VIRTUAL_SCREEN)
    }
}

/// Key action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    #[default]
    Down,
    Up,
}

/// A normalized key event. Keys route by focus, not geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    pub id: u64,
    pub key_code: i32,
    pub action: KeyAction,
    pub device_id: DeviceId,
    pub target_window_id: Option<WindowId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acting_item_matches_pointer_id() {
        let ev = PointerEvent {
            pointer_id: 2,
            items: vec![
                PointerItem { pointer_id: 1, display_x: 10, ..Default::default() },
                PointerItem { pointer_id: 2, display_x: 20, ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(ev.acting_item().unwrap().display_x, 20);
    }

    #[test]
    fn acting_item_absent_when_items_do_not_name_it() {
        let ev = PointerEvent { pointer_id: 7, ..Default::default() };
        assert!(ev.acting_item().is_none());
    }

    #[test]
    fn simulate_flag_bypasses_one_hand() {
        let ev = PointerEvent { flags: EVENT_FLAG_SIMULATE, ..Default::default() };
        assert!(ev.bypasses_one_hand());
        let ev = PointerEvent { flags: EVENT_FLAG_AUTO_TO_VIRTUAL_SCREEN, ..Default::default() };
        assert!(ev.bypasses_one_hand());
        let ev = PointerEvent::default();
        assert!(!ev.bypasses_one_hand());
    }

    #[test]
    fn pull_and_terminal_classification() {
        assert!(PointerAction::PullMove.is_pull());
        assert!(!PointerAction::Move.is_pull());
        assert!(PointerAction::Cancel.is_terminal());
        assert!(PointerAction::PullUp.is_terminal());
        assert!(!PointerAction::Down.is_terminal());
    }
}
