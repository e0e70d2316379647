//! Per-pointer session bookkeeping
//!
//! The only long-lived per-pointer state in the engine: what was captured
//! at DOWN, which window owns an in-flight drag, which windows are owed a
//! CANCEL before a pull event may be reissued elsewhere, and the
//! per-client pointer-style registries. Everything here is created on
//! DOWN, mutated on MOVE, and destroyed on UP/CANCEL or session loss.

use std::collections::HashMap;

use crate::hot_area::PointerStyleKind;
use crate::types::{Pid, PointerId, Rect, WindowId, WindowInfo};

/// Window identity captured at mouse button-down.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseDownInfo {
    pub id: WindowId,
    pub pid: Pid,
    pub agent_id: Option<WindowId>,
    /// Hot areas frozen at press time; re-used while the button is held
    /// so a concurrent catalog update cannot retarget the drag.
    pub default_hot_areas: Vec<Rect>,
    pub pointer_hot_areas: Vec<Rect>,
}

/// Window captured at touch-down for one pointer id.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchDownInfo {
    pub window: WindowInfo,
    /// The down resolved through a non-default path (UI extension,
    /// capture mode, input-type fall-through).
    pub off_default_path: bool,
}

/// The window that received the very first button-down of a drag. Keeps
/// the drag glued to its origin even when the pointer crosses into
/// another window's hot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstButtonDown {
    pub id: WindowId,
    pub agent_id: Option<WindowId>,
}

/// Per-pointer session state, owned by the engine instance.
#[derive(Debug, Default)]
pub struct PointerSessionState {
    mouse_down: Option<MouseDownInfo>,
    touch_down: HashMap<PointerId, TouchDownInfo>,
    first_button_down: Option<FirstButtonDown>,
    /// Windows owed a synthetic CANCEL before a pull event is reissued
    /// elsewhere, keyed by pointer id.
    cancel_lists: HashMap<PointerId, Vec<WindowInfo>>,
    /// pid -> window -> style, for plain windows.
    styles: HashMap<Pid, HashMap<WindowId, PointerStyleKind>>,
    /// pid -> window -> style, for UI-extension surfaces.
    ui_extension_styles: HashMap<Pid, HashMap<WindowId, PointerStyleKind>>,
    /// Capture mode pins all pointer input to one window id.
    captured_window: Option<WindowId>,
}

impl PointerSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- mouse ---

    pub fn mouse_down(&self) -> Option<&MouseDownInfo> {
        self.mouse_down.as_ref()
    }

    pub fn set_mouse_down(&mut self, info: MouseDownInfo) {
        if self.first_button_down.is_none() {
            self.first_button_down = Some(FirstButtonDown {
                id: info.id,
                agent_id: info.agent_id,
            });
        }
        self.mouse_down = Some(info);
    }

    pub fn clear_mouse_down(&mut self) {
        self.mouse_down = None;
        self.first_button_down = None;
    }

    pub fn first_button_down(&self) -> Option<FirstButtonDown> {
        self.first_button_down
    }

    // --- touch ---

    pub fn touch_down(&self, pointer: PointerId) -> Option<&TouchDownInfo> {
        self.touch_down.get(&pointer)
    }

    pub fn set_touch_down(&mut self, pointer: PointerId, info: TouchDownInfo) {
        self.touch_down.insert(pointer, info);
    }

    pub fn clear_touch_down(&mut self, pointer: PointerId) {
        self.touch_down.remove(&pointer);
        self.cancel_lists.remove(&pointer);
    }

    /// Pointers whose down window lives on the given display.
    pub fn touches_on_display(&self, display: i32) -> Vec<PointerId> {
        self.touch_down
            .iter()
            .filter(|(_, info)| info.window.display_id == Some(display))
            .map(|(id, _)| *id)
            .collect()
    }

    // --- cancel-before-reissue ---

    /// Record that `window` saw a DOWN/PULL for this pointer and must see
    /// a terminating CANCEL before the pull lands elsewhere.
    pub fn push_cancel(&mut self, pointer: PointerId, window: WindowInfo) {
        let list = self.cancel_lists.entry(pointer).or_default();
        if !list.iter().any(|w| w.id == window.id) {
            list.push(window);
        }
    }

    /// Drain the windows owed a CANCEL for this pointer.
    pub fn take_cancel_list(&mut self, pointer: PointerId) -> Vec<WindowInfo> {
        self.cancel_lists.remove(&pointer).unwrap_or_default()
    }

    pub fn cancel_list(&self, pointer: PointerId) -> &[WindowInfo] {
        self.cancel_lists.get(&pointer).map(Vec::as_slice).unwrap_or(&[])
    }

    // --- capture mode ---

    pub fn captured_window(&self) -> Option<WindowId> {
        self.captured_window
    }

    pub fn set_capture(&mut self, window: Option<WindowId>) {
        self.captured_window = window;
    }

    // --- pointer styles ---

    pub fn set_style(
        &mut self,
        pid: Pid,
        window: WindowId,
        style: PointerStyleKind,
        ui_extension: bool,
    ) {
        let map = if ui_extension { &mut self.ui_extension_styles } else { &mut self.styles };
        map.entry(pid).or_default().insert(window, style);
    }

    pub fn style(&self, pid: Pid, window: WindowId, ui_extension: bool) -> Option<PointerStyleKind> {
        let map = if ui_extension { &self.ui_extension_styles } else { &self.styles };
        map.get(&pid)?.get(&window).copied()
    }

    pub fn clear_style(&mut self, pid: Pid, window: WindowId) {
        if let Some(m) = self.styles.get_mut(&pid) {
            m.remove(&window);
        }
        if let Some(m) = self.ui_extension_styles.get_mut(&pid) {
            m.remove(&window);
        }
    }

    /// Number of style entries registered for a pid (diagnostics).
    pub fn style_count(&self, pid: Pid) -> usize {
        self.styles.get(&pid).map_or(0, HashMap::len)
            + self.ui_extension_styles.get(&pid).map_or(0, HashMap::len)
    }

    // --- session teardown ---

    /// Purge every piece of state owned by a dying client so no stale
    /// window reference outlives its session.
    pub fn on_session_lost(&mut self, pid: Pid, windows_of_pid: &[WindowId]) {
        self.styles.remove(&pid);
        self.ui_extension_styles.remove(&pid);
        if self.mouse_down.as_ref().is_some_and(|m| m.pid == pid) {
            self.mouse_down = None;
            self.first_button_down = None;
        }
        self.touch_down.retain(|_, info| info.window.pid != pid);
        for list in self.cancel_lists.values_mut() {
            list.retain(|w| w.pid != pid);
        }
        self.cancel_lists.retain(|_, list| !list.is_empty());
        if let Some(captured) = self.captured_window {
            if windows_of_pid.contains(&captured) {
                self.captured_window = None;
            }
        }
        tracing::debug!(pid, "session state purged");
    }
}
