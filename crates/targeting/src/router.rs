//! Dispatch routing: turn a resolution into delivery side effects
//!
//! The router converts a [`Resolution`] into an explicit list of
//! [`DispatchAction`]s — real deliveries plus the synthetic
//! ENTER_WINDOW/LEAVE_WINDOW/CANCEL traffic that keeps every client's
//! view of its pointers consistent. Actions are data: the engine executes
//! them against the transport, and tests inspect them directly.
//!
//! Invariant maintained here: every window that saw a DOWN for a pointer
//! sees a terminating UP/CANCEL before that pointer's pull stream lands
//! in another window. Never two live DOWNs without a terminator between.

use crate::catalog::WindowCatalog;
use crate::event::{PointerAction, PointerEvent, SourceType};
use crate::ports::SessionTable;
use crate::resolver::{Resolution, Target};
use crate::session::{PointerSessionState, TouchDownInfo};
use crate::errors::TargetingError;
use crate::types::{DisplayId, Pid, PointerId, WindowId};

/// One delivery side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchAction {
    /// Deliver the (retargeted) event to a client fd.
    Deliver { fd: i32, event: PointerEvent },
    /// Synthetic ENTER_WINDOW to a window the pointer just entered.
    Enter { window_id: WindowId, pid: Pid },
    /// Synthetic LEAVE_WINDOW to the window the pointer just left.
    Leave { window_id: WindowId, pid: Pid },
    /// Synthetic CANCEL owed to a window before a pull is reissued.
    Cancel { window_id: WindowId, pid: Pid, pointer_id: PointerId },
}

/// Parameters for an administrative pointer-stream hand-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftWindowParam {
    pub source_window_id: WindowId,
    pub target_window_id: WindowId,
    /// Touch pointer to shift; `None` shifts the mouse stream.
    pub pointer_id: Option<PointerId>,
    /// Current pointer position, used for the transparency probe.
    pub x: i32,
    pub y: i32,
}

/// Enter/leave bookkeeping plus delivery-action synthesis.
#[derive(Debug, Default)]
pub struct DispatchRouter {
    /// Previous mouse resolution, for enter/leave synthesis.
    last_pointer_window: Option<(WindowId, Pid)>,
    /// Previous touch resolution, for leave-on-up synthesis.
    last_touch_window: Option<(WindowId, Pid)>,
}

impl DispatchRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a resolved window to its transport fd.
    ///
    /// Touch UP/CANCEL deliveries consult the captured down info so the
    /// original window keeps receiving the stream even when re-hit-testing
    /// would now pick a different one.
    pub fn get_client_fd(
        &self,
        table: &dyn SessionTable,
        catalog: &WindowCatalog,
        session: &PointerSessionState,
        event: &PointerEvent,
        window_id: Option<WindowId>,
    ) -> Option<i32> {
        if event.source == SourceType::TouchScreen && event.action.is_terminal() {
            if let Some(down) = session.touch_down(event.pointer_id) {
                return table.fd_for_pid(down.window.pid);
            }
        }
        let id = window_id.or(event.target_window_id)?;
        let pid = catalog.window_pid(id)?;
        table.fd_for_pid(pid)
    }

    /// Convert one resolution into its delivery actions.
    pub fn route_pointer(
        &mut self,
        table: &dyn SessionTable,
        catalog: &WindowCatalog,
        session: &mut PointerSessionState,
        event: &PointerEvent,
        resolution: &Resolution,
    ) -> Vec<DispatchAction> {
        let mut actions = Vec::new();
        let target = match resolution {
            Resolution::Target(t) => t,
            Resolution::Swallowed => return actions,
            Resolution::NoTarget => {
                // The pointer left every window: close out enter state.
                if event.source == SourceType::Mouse {
                    if let Some((wid, pid)) = self.last_pointer_window.take() {
                        actions.push(DispatchAction::Leave { window_id: wid, pid });
                    }
                }
                return actions;
            }
        };

        // Cancel-before-reissue: drain the windows owed a terminator
        // before a pulled event lands in a new window.
        if event.action.is_pull() {
            self.search_cancel_list(session, event.pointer_id, target, &mut actions);
        }

        match event.source {
            SourceType::Mouse => self.mouse_crossing(target, &mut actions),
            SourceType::TouchScreen => self.touch_crossing(event, target, &mut actions),
            _ => {}
        }

        match table.fd_for_pid(target.pid) {
            Some(fd) => {
                let mut delivered = event.clone();
                delivered.target_window_id = Some(target.window_id);
                delivered.agent_window_id = Some(target.agent_window_id);
                actions.push(DispatchAction::Deliver { fd, event: delivered });
            }
            None => {
                // Process died between resolution and dispatch: same as
                // no owner, drop silently.
                tracing::debug!(pid = target.pid, "no session for resolved target");
            }
        }
        actions
    }

    /// Drain `cancel_lists[pointer]`, emitting a CANCEL for every window
    /// other than the new target; the target itself stays owed one.
    fn search_cancel_list(
        &self,
        session: &mut PointerSessionState,
        pointer: PointerId,
        target: &Target,
        actions: &mut Vec<DispatchAction>,
    ) {
        let owed = session.take_cancel_list(pointer);
        for w in owed {
            if w.id == target.window_id {
                // Still the live target: keep it owed a terminator.
                session.push_cancel(pointer, w);
            } else {
                actions.push(DispatchAction::Cancel {
                    window_id: w.id,
                    pid: w.pid,
                    pointer_id: pointer,
                });
            }
        }
    }

    fn mouse_crossing(&mut self, target: &Target, actions: &mut Vec<DispatchAction>) {
        match self.last_pointer_window {
            Some((wid, _)) if wid == target.window_id => {}
            Some((wid, pid)) => {
                actions.push(DispatchAction::Leave { window_id: wid, pid });
                actions.push(DispatchAction::Enter {
                    window_id: target.window_id,
                    pid: target.pid,
                });
                self.last_pointer_window = Some((target.window_id, target.pid));
            }
            None => {
                actions.push(DispatchAction::Enter {
                    window_id: target.window_id,
                    pid: target.pid,
                });
                self.last_pointer_window = Some((target.window_id, target.pid));
            }
        }
    }

    fn touch_crossing(
        &mut self,
        event: &PointerEvent,
        target: &Target,
        actions: &mut Vec<DispatchAction>,
    ) {
        match event.action {
            PointerAction::Down | PointerAction::PullDown => {
                self.last_touch_window = Some((target.window_id, target.pid));
            }
            PointerAction::Up | PointerAction::Cancel | PointerAction::PullUp => {
                if let Some((wid, pid)) = self.last_touch_window.take() {
                    if wid != target.window_id {
                        // UP landed elsewhere after a retarget: the
                        // entered window still gets its leave.
                        actions.push(DispatchAction::Leave { window_id: wid, pid });
                    }
                }
            }
            _ => {}
        }
    }

    /// Synchronous compensation for a disappearing display: every
    /// in-flight touch on it gets a CANCEL, and the mouse enter state is
    /// closed out if the cursor was there.
    pub fn pointer_cancel_on_display(
        &mut self,
        session: &mut PointerSessionState,
        display_id: DisplayId,
    ) -> Vec<DispatchAction> {
        let mut actions = Vec::new();
        for pointer in session.touches_on_display(display_id) {
            if let Some(down) = session.touch_down(pointer) {
                actions.push(DispatchAction::Cancel {
                    window_id: down.window.id,
                    pid: down.window.pid,
                    pointer_id: pointer,
                });
            }
            session.clear_touch_down(pointer);
        }
        tracing::debug!(display = display_id, cancels = actions.len(), "display-loss cancel");
        actions
    }

    /// Re-assert enter/leave after a catalog update moved windows under a
    /// stationary cursor.
    pub fn notify_pointer_to_window(
        &mut self,
        catalog: &WindowCatalog,
        cursor_x: i32,
        cursor_y: i32,
        display_id: Option<DisplayId>,
    ) -> Vec<DispatchAction> {
        let mut actions = Vec::new();
        match catalog.window_at(cursor_x, cursor_y, display_id) {
            Some(w) => {
                let target = Target {
                    window_id: w.id,
                    agent_window_id: w.agent_window_id.unwrap_or(w.id),
                    pid: w.pid,
                    display_id: w.display_id,
                };
                self.mouse_crossing(&target, &mut actions);
            }
            None => {
                if let Some((wid, pid)) = self.last_pointer_window.take() {
                    actions.push(DispatchAction::Leave { window_id: wid, pid });
                }
            }
        }
        actions
    }

    /// Administrative re-target of an in-progress pointer stream
    /// (PIP/split-screen hand-off).
    ///
    /// Fails when the destination refuses input (untouchable or
    /// transparent at the current point), does not exist, or there is no
    /// stream in flight to shift.
    pub fn shift_app_pointer_event(
        &mut self,
        catalog: &WindowCatalog,
        session: &mut PointerSessionState,
        param: ShiftWindowParam,
        auto_gen_down: bool,
    ) -> Result<Vec<DispatchAction>, TargetingError> {
        let dest = catalog
            .window_by_id(param.target_window_id)
            .ok_or(TargetingError::NoSuchWindow(param.target_window_id))?;
        if dest.is_untouchable() || dest.is_transparent_at(param.x, param.y) {
            return Err(TargetingError::WindowRefusesInput(dest.id));
        }
        if let Some(did) = dest.display_id {
            if catalog.physical_display(did).is_none() {
                return Err(TargetingError::NoSuchDisplay(did));
            }
        }

        let mut actions = Vec::new();
        match param.pointer_id {
            Some(pointer) => {
                let down = session
                    .touch_down(pointer)
                    .ok_or(TargetingError::NoEventInFlight)?;
                if down.window.id != param.source_window_id {
                    return Err(TargetingError::NoEventInFlight);
                }
                actions.push(DispatchAction::Cancel {
                    window_id: down.window.id,
                    pid: down.window.pid,
                    pointer_id: pointer,
                });
                let dest = dest.clone();
                session.set_touch_down(
                    pointer,
                    TouchDownInfo { window: dest.clone(), off_default_path: true },
                );
                session.push_cancel(pointer, dest.clone());
                if auto_gen_down {
                    actions.push(DispatchAction::Enter { window_id: dest.id, pid: dest.pid });
                }
            }
            None => {
                let down = session.mouse_down().ok_or(TargetingError::NoEventInFlight)?;
                if down.id != param.source_window_id {
                    return Err(TargetingError::NoEventInFlight);
                }
                actions.push(DispatchAction::Cancel {
                    window_id: down.id,
                    pid: down.pid,
                    pointer_id: 0,
                });
                let dest = dest.clone();
                session.set_mouse_down(crate::session::MouseDownInfo {
                    id: dest.id,
                    pid: dest.pid,
                    agent_id: dest.agent_window_id,
                    default_hot_areas: dest.default_hot_areas.clone(),
                    pointer_hot_areas: dest.pointer_hot_areas.clone(),
                });
                self.last_pointer_window = Some((dest.id, dest.pid));
                if auto_gen_down {
                    actions.push(DispatchAction::Enter { window_id: dest.id, pid: dest.pid });
                }
            }
        }
        Ok(actions)
    }

    /// Forget enter/leave caches (display reconfiguration).
    pub fn reset_crossing_state(&mut self) {
        self.last_pointer_window = None;
        self.last_touch_window = None;
    }
}
