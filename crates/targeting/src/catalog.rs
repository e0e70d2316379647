//! Authoritative display-group snapshots and structural queries
//!
//! The catalog owns the window/display model: snapshots are replaced
//! wholesale (or patched through the incremental path) and never mutated
//! behind a reader's back. Hit-test reads dominate updates by orders of
//! magnitude, so queries are simple scans over the z-ordered window list
//! rather than anything incremental.
//!
//! Side effects of an update (hot-area rebuild, focus notifications,
//! forced cancels for removed displays) are the engine's job; the catalog
//! reports what changed through [`GroupDiff`] and stays structural.

use std::collections::BTreeMap;

use crate::types::{
    DisplayGroupInfo, DisplayId, DisplayInfo, GroupId, Pid, WindowAction, WindowId, WindowInfo,
    DEFAULT_GROUP_ID,
};

/// What a wholesale group replacement changed, as seen by the engine.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupDiff {
    /// Displays present before and absent after.
    pub removed_displays: Vec<DisplayId>,
    /// Any display changed its screen-combination kind.
    pub combination_changed: bool,
    /// Focus moved; carries the new focus window id.
    pub focus_changed: Option<WindowId>,
    /// Relative z-order of surviving windows changed.
    pub zorder_changed: bool,
}

/// The authoritative, versioned snapshot store.
#[derive(Debug, Default)]
pub struct WindowCatalog {
    groups: BTreeMap<GroupId, DisplayGroupInfo>,
}

impl WindowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default group's snapshot, if one was ever published.
    pub fn default_group(&self) -> Option<&DisplayGroupInfo> {
        self.groups.get(&DEFAULT_GROUP_ID)
    }

    pub fn group(&self, id: GroupId) -> Option<&DisplayGroupInfo> {
        self.groups.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &DisplayGroupInfo> {
        self.groups.values()
    }

    /// Replace a group's snapshot wholesale, reporting what changed.
    pub fn replace_group(&mut self, group: DisplayGroupInfo) -> GroupDiff {
        let mut diff = GroupDiff::default();
        if let Some(old) = self.groups.get(&group.id) {
            for d in &old.displays {
                if !group.displays.iter().any(|n| n.id == d.id) {
                    diff.removed_displays.push(d.id);
                }
            }
            diff.combination_changed = old.displays.iter().any(|d| {
                group
                    .displays
                    .iter()
                    .find(|n| n.id == d.id)
                    .is_some_and(|n| n.combination != d.combination)
            });
            if old.focus_window_id != group.focus_window_id {
                diff.focus_changed = Some(group.focus_window_id);
            }
            diff.zorder_changed = zorder_changed(&old.windows, &group.windows);
        } else if group.focus_window_id != 0 {
            diff.focus_changed = Some(group.focus_window_id);
        }
        tracing::debug!(
            group = group.id,
            windows = group.windows.len(),
            displays = group.displays.len(),
            removed = diff.removed_displays.len(),
            "display group replaced"
        );
        self.groups.insert(group.id, group);
        diff
    }

    /// Apply an incremental window update (ADD / ADD_END / DEL / CHANGE)
    /// without discarding the rest of the snapshot.
    ///
    /// Returns the terminal action applied; ADD_END marks a logical frame
    /// of updates complete, which callers use to flush style caches.
    pub fn apply_incremental(&mut self, patch: DisplayGroupInfo) -> WindowAction {
        let group = self.groups.entry(patch.id).or_default();
        group.id = patch.id;
        if patch.focus_window_id != 0 {
            group.focus_window_id = patch.focus_window_id;
        }
        if !patch.displays.is_empty() {
            group.displays = patch.displays;
        }
        let mut terminal = WindowAction::Unknown;
        for window in patch.windows {
            terminal = window.action;
            match window.action {
                WindowAction::Add | WindowAction::AddEnd => {
                    // Re-adding an id replaces the stale entry in place.
                    if let Some(existing) =
                        group.windows.iter_mut().find(|w| w.id == window.id)
                    {
                        *existing = window;
                    } else {
                        group.windows.push(window);
                    }
                }
                WindowAction::Del => {
                    group.windows.retain(|w| w.id != window.id);
                }
                WindowAction::Change => {
                    if let Some(existing) =
                        group.windows.iter_mut().find(|w| w.id == window.id)
                    {
                        *existing = window;
                    } else {
                        tracing::debug!(window = window.id, "CHANGE for unknown window, adding");
                        group.windows.push(window);
                    }
                }
                WindowAction::Unknown => {
                    tracing::debug!(window = window.id, "ignoring window with unknown action");
                }
            }
        }
        terminal
    }

    /// All windows containing the point, topmost first.
    ///
    /// Ordering: strictly greater z-order wins; equal z-order keeps
    /// catalog insertion order (stable sort). Untouchable windows and
    /// windows transparent at the probed pixel are skipped — and they
    /// never occlude what's beneath them. `display_id = None` matches
    /// display-independent windows and every display.
    pub fn windows_at(
        &self,
        x: i32,
        y: i32,
        display_id: Option<DisplayId>,
    ) -> Vec<&WindowInfo> {
        let Some(group) = self.default_group() else {
            return Vec::new();
        };
        let mut candidates: Vec<&WindowInfo> = group
            .windows
            .iter()
            .filter(|w| display_matches(w, display_id))
            .filter(|w| !w.is_untouchable())
            .filter(|w| is_in_window(w, x, y))
            .filter(|w| !w.is_transparent_at(x, y))
            .collect();
        // Stable by construction: equal z keeps insertion order.
        candidates.sort_by(|a, b| b.z_order.total_cmp(&a.z_order));
        candidates
    }

    /// Topmost eligible window at the point, if any.
    pub fn window_at(&self, x: i32, y: i32, display_id: Option<DisplayId>) -> Option<&WindowInfo> {
        self.windows_at(x, y, display_id).into_iter().next()
    }

    /// Display lookup by id across all groups.
    pub fn physical_display(&self, id: DisplayId) -> Option<&DisplayInfo> {
        self.groups.values().flat_map(|g| g.displays.iter()).find(|d| d.id == id)
    }

    /// Display lookup by stable unique name.
    pub fn display_by_name(&self, unique_name: &str) -> Option<&DisplayInfo> {
        self.groups
            .values()
            .flat_map(|g| g.displays.iter())
            .find(|d| d.unique_name == unique_name)
    }

    /// Top-level window lookup by id in the default group.
    pub fn window_by_id(&self, id: WindowId) -> Option<&WindowInfo> {
        self.default_group()?.windows.iter().find(|w| w.id == id)
    }

    /// Owning pid for a window id, searching UI-extension children too.
    /// Absent ids are `None`, never a fault.
    pub fn window_pid(&self, id: WindowId) -> Option<Pid> {
        for group in self.groups.values() {
            for w in &group.windows {
                if w.id == id {
                    return Some(w.pid);
                }
                for ext in &w.ui_extensions {
                    if ext.id == id {
                        return Some(ext.pid);
                    }
                }
            }
        }
        None
    }

    /// The focused window of the default group, if it exists in the
    /// snapshot.
    pub fn focused_window(&self) -> Option<&WindowInfo> {
        let group = self.default_group()?;
        group.windows.iter().find(|w| w.id == group.focus_window_id)
    }

    /// Windows owned by the given pid (session-loss sweep).
    pub fn windows_of_pid(&self, pid: Pid) -> Vec<WindowId> {
        self.groups
            .values()
            .flat_map(|g| g.windows.iter())
            .filter(|w| w.pid == pid)
            .map(|w| w.id)
            .collect()
    }
}

fn display_matches(w: &WindowInfo, display_id: Option<DisplayId>) -> bool {
    match (w.display_id, display_id) {
        (Some(wd), Some(q)) => wd == q,
        // Display-independent windows match everywhere; an unqualified
        // query matches every display.
        _ => true,
    }
}

fn is_in_window(w: &WindowInfo, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 {
        return false;
    }
    w.effective_hot_areas().iter().any(|r| r.contains(x, y))
}

/// Whether the relative z-order of windows surviving a replacement moved.
fn zorder_changed(old: &[WindowInfo], new: &[WindowInfo]) -> bool {
    for w in new {
        if let Some(prev) = old.iter().find(|o| o.id == w.id) {
            if prev.z_order != w.z_order {
                return true;
            }
        }
    }
    false
}
