//! The targeting engine: composition root and event pipeline
//!
//! Owns every piece of targeting state — catalog, hot-area index,
//! per-pointer sessions, resolver, router, bind table — and wires them to
//! the outside world through the port traits. There is exactly one engine
//! per service instance, created explicitly and passed where needed; no
//! state hides in globals.
//!
//! The pointer pipeline, in order:
//!
//! 1. pick the display (device bind, event display id, or default)
//! 2. one-hand-mode remap (unless the event bypasses it)
//! 3. rotate into logical space
//! 4. optional 3x3 display transform
//! 5. clamp into the valid logical extent
//! 6. resolve the target window
//! 7. route into dispatch actions and execute them on the transport

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::bind::{DisplayBindInfo, DisplayBindTable};
use crate::catalog::WindowCatalog;
use crate::config::Config;
use crate::errors::TargetingError;
use crate::event::{KeyEvent, PointerAction, PointerEvent, SourceType};
use crate::geometry::{
    adjust_display_coordinate, find_physical_display, one_hand_position, reverse_rotate_screen,
    rotate_screen, transform_display_xy, Position,
};
use crate::hot_area::{HotAreaIndex, PointerStyleKind};
use crate::ports::{AnrKind, CursorRenderer, DeviceLookup, MouseDisplayState, SessionTable};
use crate::resolver::{Resolution, TargetResolver};
use crate::router::{DispatchAction, DispatchRouter, ShiftWindowParam};
use crate::session::PointerSessionState;
use crate::types::{
    DeviceId, DisplayGroupInfo, DisplayId, DisplayInfo, Pid, ScreenCombination, WindowAction,
    WindowId,
};

/// Opaque drag payload attached to an in-flight pull gesture.
///
/// While `appended` is set, touch MOVE events may retarget like pull
/// events; clearing it restores pinned-move semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraData {
    pub appended: bool,
    pub buffer: Vec<u8>,
    pub source_type: i32,
    pub pointer_id: i32,
}

/// The stateful targeting core, one per service.
pub struct TargetingEngine {
    config: Config,
    catalog: WindowCatalog,
    hot_areas: HotAreaIndex,
    session: PointerSessionState,
    resolver: TargetResolver,
    router: DispatchRouter,
    binds: DisplayBindTable,
    extra_data: ExtraData,
    mouse_state: MouseDisplayState,
    devices: Box<dyn DeviceLookup>,
    sessions: Box<dyn SessionTable>,
    renderers: Vec<Box<dyn CursorRenderer>>,
}

impl TargetingEngine {
    pub fn new(
        config: Config,
        devices: Box<dyn DeviceLookup>,
        sessions: Box<dyn SessionTable>,
    ) -> Self {
        let resolver = TargetResolver::new(&config);
        Self {
            config,
            catalog: WindowCatalog::new(),
            hot_areas: HotAreaIndex::new(),
            session: PointerSessionState::new(),
            resolver,
            router: DispatchRouter::new(),
            binds: DisplayBindTable::new(),
            extra_data: ExtraData::default(),
            mouse_state: MouseDisplayState::default(),
            devices,
            sessions,
            renderers: Vec::new(),
        }
    }

    /// Register a cursor-renderer observer. Observers receive copies of
    /// display and cursor state after every update that affects them.
    pub fn register_cursor_renderer(&mut self, renderer: Box<dyn CursorRenderer>) {
        renderer.set_mouse_display_state(self.mouse_state);
        self.renderers.push(renderer);
    }

    pub fn catalog(&self) -> &WindowCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- event pipeline ---

    /// Run one pointer event through the full pipeline and execute the
    /// resulting dispatch actions. Returns the resolution so callers can
    /// observe the outcome.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> Resolution {
        // Joystick and crown carry no contact geometry; they resolve by
        // the focus window and skip display location entirely.
        if matches!(event.source, SourceType::Joystick | SourceType::Crown) {
            let resolution = self.resolver.resolve_pointer(
                &self.catalog,
                &self.hot_areas,
                &mut self.session,
                &self.config,
                event,
                Position::new(0, 0),
            );
            let actions = self.router.route_pointer(
                self.sessions.as_ref(),
                &self.catalog,
                &mut self.session,
                event,
                &resolution,
            );
            self.execute(&actions);
            return resolution;
        }

        let Some((display, point)) = self.locate(event) else {
            tracing::debug!(event = event.id, "no display for pointer event, dropped");
            return Resolution::NoTarget;
        };

        // The pipeline copy carries logical coordinates and the display
        // the point actually landed on; resolution and delivery both see
        // the located display, not the raw device-reported one.
        let mut delivered = event.clone();
        delivered.target_display_id = display.id;
        if let Some(item) = delivered
            .items
            .iter_mut()
            .find(|i| i.pointer_id == delivered.pointer_id)
        {
            item.display_x = point.x;
            item.display_y = point.y;
        }

        let resolution = self.resolver.resolve_pointer(
            &self.catalog,
            &self.hot_areas,
            &mut self.session,
            &self.config,
            &delivered,
            point,
        );

        let actions = self.router.route_pointer(
            self.sessions.as_ref(),
            &self.catalog,
            &mut self.session,
            &delivered,
            &resolution,
        );
        self.execute(&actions);

        if event.source == SourceType::Mouse {
            self.move_cursor(display.id, point);
        }
        resolution
    }

    /// Key events route by focus; no geometry, no session state.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Resolution {
        let resolution = self.resolver.resolve_key(&self.catalog);
        if let Some(t) = resolution.target() {
            if let Some(fd) = self.sessions.fd_for_pid(t.pid) {
                let mut delivered = event.clone();
                delivered.target_window_id = Some(t.window_id);
                let sent = self.sessions.send_key_event(fd, &delivered);
                if sent {
                    self.sessions.trigger_anr(AnrKind::Dispatch, 0, fd);
                }
            }
        }
        resolution
    }

    /// Pick the display for an event and transform the acting contact's
    /// physical point into that display's logical space.
    fn locate(&self, event: &PointerEvent) -> Option<(DisplayInfo, Position)> {
        let origin = self.event_display(event)?.clone();
        let item = event.acting_item()?;
        let raw = Position::new(item.display_x, item.display_y);

        // Absolute mice report relative to one display; spanning setups
        // re-home the point onto whichever display actually contains it.
        let (display, raw) = if event.source == SourceType::Mouse {
            self.rehome(&origin, raw)
        } else {
            (origin, raw)
        };

        let p = if event.bypasses_one_hand() {
            raw
        } else {
            one_hand_position(&display, raw)
        };
        let p = rotate_screen(&display, p);
        let p = transform_display_xy(&display, p);
        let p = adjust_display_coordinate(&display, p);
        Some((display, p))
    }

    fn event_display(&self, event: &PointerEvent) -> Option<&DisplayInfo> {
        if let Some(bound) = self.binds.bound_display(event.device_id) {
            if let Some(d) = self.catalog.physical_display(bound) {
                return Some(d);
            }
        }
        if event.target_display_id >= 0 {
            if let Some(d) = self.catalog.physical_display(event.target_display_id) {
                return Some(d);
            }
        }
        self.catalog.default_group()?.displays.first()
    }

    /// Move a point from `origin`'s space onto the display that contains
    /// it globally, if any; otherwise stay on the origin display.
    fn rehome(&self, origin: &DisplayInfo, p: Position) -> (DisplayInfo, Position) {
        let Some(group) = self.catalog.default_group() else {
            return (origin.clone(), p);
        };
        if group.displays.len() < 2 {
            return (origin.clone(), p);
        }
        match find_physical_display(&group.displays, origin, p) {
            Some(id) if id != origin.id => {
                let Some(d) = self.catalog.physical_display(id) else {
                    return (origin.clone(), p);
                };
                let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                let gx = origin.x as i64 + p.x as i64;
                let gy = origin.y as i64 + p.y as i64;
                let local = Position::new(clamp(gx - d.x as i64), clamp(gy - d.y as i64));
                (d.clone(), local)
            }
            _ => (origin.clone(), p),
        }
    }

    fn move_cursor(&mut self, display_id: DisplayId, p: Position) {
        self.mouse_state = MouseDisplayState {
            display_id,
            x: p.x,
            y: p.y,
            visible: true,
        };
        for r in &self.renderers {
            r.set_mouse_display_state(self.mouse_state);
        }
    }

    /// Current cursor position in logical space.
    pub fn mouse_state(&self) -> MouseDisplayState {
        self.mouse_state
    }

    /// Cursor position mapped back into panel space for hardware-cursor
    /// placement.
    pub fn physical_cursor_position(&self) -> Option<Position> {
        let d = self.catalog.physical_display(self.mouse_state.display_id)?;
        Some(reverse_rotate_screen(
            d,
            Position::new(self.mouse_state.x, self.mouse_state.y),
        ))
    }

    fn execute(&mut self, actions: &[DispatchAction]) {
        for action in actions {
            match action {
                DispatchAction::Deliver { fd, event } => {
                    if self.sessions.send_event(*fd, event) {
                        self.sessions.trigger_anr(AnrKind::Dispatch, 0, *fd);
                    } else {
                        tracing::warn!(fd, "event delivery failed");
                    }
                }
                DispatchAction::Enter { window_id, pid } => {
                    self.send_synthetic(*pid, *window_id, PointerAction::EnterWindow, 0);
                }
                DispatchAction::Leave { window_id, pid } => {
                    self.send_synthetic(*pid, *window_id, PointerAction::LeaveWindow, 0);
                }
                DispatchAction::Cancel { window_id, pid, pointer_id } => {
                    self.send_synthetic(*pid, *window_id, PointerAction::Cancel, *pointer_id);
                }
            }
        }
    }

    fn send_synthetic(&self, pid: Pid, window_id: WindowId, action: PointerAction, pointer: i32) {
        let Some(fd) = self.sessions.fd_for_pid(pid) else {
            return;
        };
        let ev = PointerEvent {
            action,
            pointer_id: pointer,
            target_window_id: Some(window_id),
            ..Default::default()
        };
        self.sessions.send_event(fd, &ev);
    }

    // --- catalog updates ---

    /// Replace a display group wholesale and run every compensation the
    /// change demands, synchronously, before any further event resolves
    /// against the new snapshot.
    pub fn update_display_info(&mut self, group: DisplayGroupInfo) {
        let diff = self.catalog.replace_group(group);

        // In-flight touches on a removed display get their CANCEL now,
        // not on the next event.
        for display in &diff.removed_displays {
            let cancels = self.router.pointer_cancel_on_display(&mut self.session, *display);
            self.execute(&cancels);
        }
        self.binds.prune_removed_displays(&diff.removed_displays);

        if diff.combination_changed
            || diff.removed_displays.contains(&self.mouse_state.display_id)
        {
            self.router.reset_crossing_state();
            self.snap_cursor_to_main();
        }

        // Focus or stacking changes surface on the cursor side even when
        // nothing moved; renderers re-read the focused window.
        if diff.focus_changed.is_some() || diff.zorder_changed {
            if let Some(w) = self.catalog.focused_window() {
                for r in &self.renderers {
                    r.on_window_info(w);
                }
            }
        }

        self.release_stale_capture();
        self.rebuild_hot_areas();
        for r in &self.renderers {
            if let Some(g) = self.catalog.default_group() {
                r.on_display_info(g);
            }
        }
        self.reassert_cursor_window();
    }

    /// Apply an incremental window patch. An ADD_END terminal marks a
    /// logical frame complete and flushes cursor-side caches.
    pub fn update_window_info(&mut self, patch: DisplayGroupInfo) {
        let terminal = self.catalog.apply_incremental(patch);
        self.release_stale_capture();
        self.rebuild_hot_areas();
        if terminal == WindowAction::AddEnd {
            for r in &self.renderers {
                if let Some(w) = self.catalog.focused_window() {
                    r.on_window_info(w);
                }
            }
        }
        self.reassert_cursor_window();
    }

    /// Capture mode follows the catalog: when the captured window leaves
    /// the snapshot the pin is released, otherwise every subsequent
    /// pointer event would resolve to nothing.
    fn release_stale_capture(&mut self) {
        if let Some(captured) = self.session.captured_window() {
            if self.catalog.window_by_id(captured).is_none() {
                tracing::warn!(window = captured, "captured window left the catalog, capture released");
                self.session.set_capture(None);
            }
        }
    }

    fn rebuild_hot_areas(&mut self) {
        if let Some(group) = self.catalog.default_group() {
            self.hot_areas.update(group);
        }
    }

    /// Window geometry changed under a stationary cursor: re-issue
    /// enter/leave as if the cursor had moved.
    fn reassert_cursor_window(&mut self) {
        if !self.mouse_state.visible {
            return;
        }
        let actions = self.router.notify_pointer_to_window(
            &self.catalog,
            self.mouse_state.x,
            self.mouse_state.y,
            Some(self.mouse_state.display_id),
        );
        self.execute(&actions);
    }

    /// Park the cursor at the center of the first main display when its
    /// current display is gone or the combination changed.
    fn snap_cursor_to_main(&mut self) {
        let Some(group) = self.catalog.default_group() else {
            return;
        };
        let main = group
            .displays
            .iter()
            .find(|d| d.combination == ScreenCombination::Main)
            .or_else(|| group.displays.first());
        if let Some(d) = main {
            let (w, h) = d.logical_extents();
            self.move_cursor(d.id, Position::new(w / 2, h / 2));
        }
    }

    // --- administrative surface ---

    pub fn set_pointer_style(
        &mut self,
        pid: Pid,
        window_id: WindowId,
        style: PointerStyleKind,
        ui_extension: bool,
    ) -> Result<(), TargetingError> {
        validate_ids(pid, window_id)?;
        self.session.set_style(pid, window_id, style, ui_extension);
        Ok(())
    }

    /// Style registered for the window; `Default` when none was set.
    pub fn get_pointer_style(
        &self,
        pid: Pid,
        window_id: WindowId,
        ui_extension: bool,
    ) -> Result<PointerStyleKind, TargetingError> {
        validate_ids(pid, window_id)?;
        Ok(self
            .session
            .style(pid, window_id, ui_extension)
            .unwrap_or_default())
    }

    pub fn clear_pointer_style(&mut self, pid: Pid, window_id: WindowId) -> Result<(), TargetingError> {
        validate_ids(pid, window_id)?;
        self.session.clear_style(pid, window_id);
        Ok(())
    }

    /// Resize-cursor hint for the pointer-change area under the point.
    pub fn pointer_change_style(&self, window_id: WindowId, x: i32, y: i32) -> Option<PointerStyleKind> {
        self.hot_areas.select_pointer_change_area(window_id, x, y)
    }

    /// Pin all pointer input to one window, or release the pin.
    pub fn set_mouse_capture_mode(&mut self, window: Option<WindowId>) -> Result<(), TargetingError> {
        if let Some(id) = window {
            if self.catalog.window_by_id(id).is_none() {
                return Err(TargetingError::NoSuchWindow(id));
            }
        }
        self.session.set_capture(window);
        Ok(())
    }

    /// Pointer-device presence changed (hot-plug or visibility toggle):
    /// hide or show the cursor and forward the change to the renderers.
    pub fn update_pointer_device(&mut self, has_pointer: bool, is_visible: bool, is_hot_plug: bool) {
        self.mouse_state.visible = has_pointer && is_visible;
        for r in &self.renderers {
            r.update_pointer_device(has_pointer, is_visible, is_hot_plug);
            r.set_mouse_display_state(self.mouse_state);
        }
    }

    pub fn hover_scroll(&self) -> bool {
        self.resolver.hover_scroll()
    }

    pub fn set_hover_scroll(&mut self, enabled: bool) {
        self.resolver.set_hover_scroll(enabled);
    }

    pub fn set_back_gesture_active(&mut self, active: bool) {
        self.resolver.set_back_gesture_active(active);
    }

    pub fn set_display_bind(
        &mut self,
        device_id: DeviceId,
        display_id: DisplayId,
    ) -> Result<(), TargetingError> {
        if self.devices.device(device_id).is_none() {
            return Err(TargetingError::InvalidDeviceId(device_id));
        }
        self.binds.set_display_bind(&self.catalog, device_id, display_id)
    }

    pub fn get_display_bind_info(&self) -> Vec<DisplayBindInfo> {
        self.binds.get_display_bind_info()
    }

    /// Attach a drag payload; MOVE events may retarget while one is set.
    pub fn append_extra_data(&mut self, data: ExtraData) {
        self.resolver.set_drag_flag(data.appended);
        self.extra_data = data;
    }

    pub fn clear_extra_data(&mut self) {
        self.resolver.set_drag_flag(false);
        self.extra_data = ExtraData::default();
    }

    pub fn extra_data(&self) -> &ExtraData {
        &self.extra_data
    }

    /// Hand an in-flight pointer stream to another window.
    pub fn shift_app_pointer_event(
        &mut self,
        param: ShiftWindowParam,
        auto_gen_down: bool,
    ) -> Result<(), TargetingError> {
        let actions = self.router.shift_app_pointer_event(
            &self.catalog,
            &mut self.session,
            param,
            auto_gen_down,
        )?;
        self.execute(&actions);
        Ok(())
    }

    /// A client process died: purge every piece of state it owned.
    pub fn on_session_lost(&mut self, pid: Pid) {
        let windows = self.catalog.windows_of_pid(pid);
        self.session.on_session_lost(pid, &windows);
    }

    /// Human-readable state dump for the service's inspection channel.
    pub fn dump(&self, out: &mut dyn Write, _args: &[String]) -> std::io::Result<()> {
        writeln!(out, "targeting engine state")?;
        writeln!(
            out,
            "  cursor: display={} x={} y={} visible={}",
            self.mouse_state.display_id, self.mouse_state.x, self.mouse_state.y,
            self.mouse_state.visible
        )?;
        writeln!(out, "  hover_scroll: {}", self.resolver.hover_scroll())?;
        writeln!(out, "  capture: {:?}", self.session.captured_window())?;
        writeln!(out, "  drag: {}", self.resolver.drag_in_progress())?;
        for group in self.catalog.groups() {
            writeln!(out, "  group {} focus={}", group.id, group.focus_window_id)?;
            for d in &group.displays {
                writeln!(
                    out,
                    "    display {} \"{}\" {}x{} dir={:?} comb={:?}",
                    d.id, d.unique_name, d.width, d.height, d.logical_direction(), d.combination
                )?;
            }
            for w in &group.windows {
                writeln!(
                    out,
                    "    window {} pid={} z={} area={:?} type={:?} exts={}",
                    w.id, w.pid, w.z_order, w.area, w.input_type, w.ui_extensions.len()
                )?;
            }
        }
        for b in self.binds.get_display_bind_info() {
            writeln!(out, "  bind device {} -> display {} ({})", b.device_id, b.display_id, b.display_name)?;
        }
        Ok(())
    }
}

fn validate_ids(pid: Pid, window_id: WindowId) -> Result<(), TargetingError> {
    if pid < 0 {
        return Err(TargetingError::InvalidPid(pid));
    }
    if window_id < 0 {
        return Err(TargetingError::InvalidWindowId(window_id));
    }
    Ok(())
}
