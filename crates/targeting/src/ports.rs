//! Collaborator interfaces
//!
//! The engine consumes device identity and the dispatch transport, and
//! informs the cursor renderer; all three live in other components and
//! are reached only through these traits. The renderer side is a
//! registered observer and the flow is one-directional: the render
//! thread never calls back into the resolver.

use serde::{Deserialize, Serialize};

use crate::event::{KeyEvent, PointerEvent};
use crate::types::{DeviceId, DisplayGroupInfo, DisplayId, Pid, WindowInfo};

/// Device identity as provided by the device manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub is_pointer_device: bool,
    pub is_touchable_device: bool,
    pub is_remote: bool,
    /// Distributed hardware id for remote/cooperate devices.
    pub dhid: String,
    pub vendor_config: String,
}

/// Keyboard class reported by the device manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardType {
    #[default]
    Unknown,
    Alphabetic,
    Digital,
    Handwriting,
    Remote,
}

/// Device-manager lookups the engine needs.
pub trait DeviceLookup {
    fn device(&self, id: DeviceId) -> Option<DeviceInfo>;
    fn keyboard_type(&self, id: DeviceId) -> KeyboardType;
    /// One bool per queried key code.
    fn supports_keys(&self, id: DeviceId, codes: &[i32]) -> Vec<bool>;
}

/// ANR trigger kind forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnrKind {
    Dispatch,
    Monitor,
}

/// Dispatch transport: client sessions keyed by pid/fd.
pub trait SessionTable {
    /// Transport fd for a client pid, `None` when the process is gone.
    fn fd_for_pid(&self, pid: Pid) -> Option<i32>;
    /// Send one event to a client fd; false means the send failed.
    fn send_event(&self, fd: i32, event: &PointerEvent) -> bool;
    /// Send one key event to a client fd.
    fn send_key_event(&self, fd: i32, event: &KeyEvent) -> bool;
    /// Arm the ANR watchdog for a delivery.
    fn trigger_anr(&self, kind: AnrKind, timestamp: i64, fd: i32) -> bool;
}

/// Mouse cursor display state shared with the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseDisplayState {
    pub display_id: DisplayId,
    pub x: i32,
    pub y: i32,
    pub visible: bool,
}

/// Cursor-renderer notifications.
///
/// Implementations run on the render thread; the engine hands over
/// copied snapshots only, never references into its own state.
pub trait CursorRenderer {
    fn update_pointer_device(&self, has_pointer: bool, is_visible: bool, is_hot_plug: bool);
    fn on_display_info(&self, group: &DisplayGroupInfo);
    fn on_window_info(&self, window: &WindowInfo);
    fn set_mouse_display_state(&self, state: MouseDisplayState);
}

/// A device lookup with no devices; for tools and tests that only
/// exercise geometry.
#[derive(Debug, Default)]
pub struct NoDevices;

impl DeviceLookup for NoDevices {
    fn device(&self, _id: DeviceId) -> Option<DeviceInfo> {
        None
    }

    fn keyboard_type(&self, _id: DeviceId) -> KeyboardType {
        KeyboardType::Unknown
    }

    fn supports_keys(&self, _id: DeviceId, codes: &[i32]) -> Vec<bool> {
        vec![false; codes.len()]
    }
}
