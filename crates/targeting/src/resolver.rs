//! Target resolution: pick exactly one delivery target per event
//!
//! The resolver turns a transformed logical point plus an in-progress
//! event into a [`Resolution`]. Dispatch happens once per event on the
//! event's [`SourceType`] — mouse, touch, and the focus-routed sources
//! each get their own path — instead of re-checking capabilities inside
//! every helper.
//!
//! Per-pointer flow: `IDLE -> DOWN (capture origin) -> MOVE* -> UP/CANCEL
//! -> IDLE`. While captured, MOVE resolves against the origin window
//! rather than re-hit-testing, unless policy explicitly allows
//! retargeting (hover scroll, pull events).

use crate::catalog::WindowCatalog;
use crate::config::Config;
use crate::event::{PointerAction, PointerEvent, SourceType, ToolType};
use crate::geometry::Position;
use crate::hot_area::{is_in_hot_area, HotAreaIndex};
use crate::session::{MouseDownInfo, PointerSessionState, TouchDownInfo};
use crate::types::{DisplayId, Pid, WindowId, WindowInfo};

/// A resolved delivery target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// The window that was hit.
    pub window_id: WindowId,
    /// The id input is actually delivered to (`agent_window_id` when the
    /// agent exists, else the hit window itself).
    pub agent_window_id: WindowId,
    pub pid: Pid,
    pub display_id: Option<DisplayId>,
}

/// Outcome of one resolution call.
///
/// One sum type for every caller: a sentinel id can never be mistaken
/// for a real target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Deliver to this target.
    Target(Target),
    /// A policy consumed the event; drop it without delivery.
    Swallowed,
    /// No window owns the point; drop silently (not an error).
    NoTarget,
}

impl Resolution {
    pub fn target(&self) -> Option<&Target> {
        match self {
            Resolution::Target(t) => Some(t),
            _ => None,
        }
    }
}

/// What the input-type policy decided for one candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeDecision {
    Deliver,
    FallThrough,
    Swallow,
}

/// The stateful targeting core.
///
/// Holds only cross-event policy state; the window model stays in the
/// catalog and per-pointer capture state in [`PointerSessionState`],
/// both passed in per call.
#[derive(Debug)]
pub struct TargetResolver {
    hover_scroll: bool,
    /// Button-down landed on a resize edge; moves stay glued to it.
    drag_border: bool,
    /// An explicit drag operation is in progress (set by the engine when
    /// extra data is appended).
    drag_flag: bool,
    /// A back gesture is being recognized; DOWNs on navigation windows
    /// are swallowed while set.
    back_gesture_active: bool,
    /// Pointers whose last event was a CANCEL (duplicate-touch heuristic).
    recently_cancelled: std::collections::HashSet<crate::types::PointerId>,
}

impl TargetResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            hover_scroll: config.hover_scroll,
            drag_border: false,
            drag_flag: false,
            back_gesture_active: false,
            recently_cancelled: Default::default(),
        }
    }

    pub fn hover_scroll(&self) -> bool {
        self.hover_scroll
    }

    pub fn set_hover_scroll(&mut self, enabled: bool) {
        self.hover_scroll = enabled;
    }

    pub fn set_drag_flag(&mut self, dragging: bool) {
        self.drag_flag = dragging;
    }

    pub fn drag_in_progress(&self) -> bool {
        self.drag_flag || self.drag_border
    }

    pub fn set_back_gesture_active(&mut self, active: bool) {
        self.back_gesture_active = active;
    }

    /// Resolve a pointer event at an already-transformed logical point.
    pub fn resolve_pointer(
        &mut self,
        catalog: &WindowCatalog,
        hot_areas: &HotAreaIndex,
        session: &mut PointerSessionState,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        // Capture mode pins every pointer event regardless of geometry.
        if let Some(captured) = session.captured_window() {
            return self.target_by_id(catalog, captured);
        }
        match event.source {
            SourceType::Mouse => {
                self.resolve_mouse(catalog, hot_areas, session, config, event, point)
            }
            SourceType::TouchScreen => {
                self.resolve_touch(catalog, session, config, event, point)
            }
            // Joystick and crown have no geometry: route by focus.
            SourceType::Joystick | SourceType::Crown => self.resolve_by_focus(catalog),
        }
    }

    /// Key events route purely by the group's focus window. Privacy mode
    /// suppresses logging detail but never changes the target.
    pub fn resolve_key(&self, catalog: &WindowCatalog) -> Resolution {
        match catalog.focused_window() {
            Some(w) => {
                if w.privacy_mode {
                    tracing::debug!("key routed to privacy-mode window");
                } else {
                    tracing::debug!(window = w.id, "key routed by focus");
                }
                self.make_target(catalog, w)
            }
            None => Resolution::NoTarget,
        }
    }

    // --- mouse path ---

    fn resolve_mouse(
        &mut self,
        catalog: &WindowCatalog,
        hot_areas: &HotAreaIndex,
        session: &mut PointerSessionState,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        match event.action {
            PointerAction::ButtonDown => {
                let res = self.hit_test(catalog, config, event, point);
                if let Resolution::Target(t) = &res {
                    if let Some(w) = self.find_window(catalog, t.window_id) {
                        session.set_mouse_down(MouseDownInfo {
                            id: w.id,
                            pid: w.pid,
                            agent_id: w.agent_window_id,
                            default_hot_areas: w.default_hot_areas.clone(),
                            pointer_hot_areas: w.pointer_hot_areas.clone(),
                        });
                    }
                    // A press on a resize edge glues the drag to this
                    // window until release.
                    self.drag_border = hot_areas
                        .select_pointer_change_area(t.window_id, point.x, point.y)
                        .is_some();
                }
                res
            }
            PointerAction::ButtonUp => {
                let res = self.pinned_or_hit(catalog, session, config, event, point);
                session.clear_mouse_down();
                self.drag_border = false;
                res
            }
            PointerAction::Move => {
                // While a button is held the drag stays glued to its
                // origin window even across window boundaries.
                self.pinned_or_hit(catalog, session, config, event, point)
            }
            PointerAction::AxisBegin | PointerAction::AxisUpdate | PointerAction::AxisEnd => {
                if self.hover_scroll {
                    self.hit_test(catalog, config, event, point)
                } else {
                    // Hover scroll disabled: axis events behave like a
                    // drag, pinned to the button-down window.
                    self.pinned_or_hit(catalog, session, config, event, point)
                }
            }
            _ => self.hit_test(catalog, config, event, point),
        }
    }

    /// Resolve against the captured mouse-down window when one exists,
    /// falling back to a plain hit test.
    fn pinned_or_hit(
        &mut self,
        catalog: &WindowCatalog,
        session: &PointerSessionState,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        if let Some(down) = session.mouse_down() {
            return self.target_from_down(catalog, down.id, down.agent_id, down.pid);
        }
        if let Some(first) = session.first_button_down() {
            if self.drag_in_progress() {
                if let Resolution::Target(t) = self.target_by_id(catalog, first.id) {
                    return Resolution::Target(t);
                }
            }
        }
        self.hit_test(catalog, config, event, point)
    }

    // --- touch path ---

    fn resolve_touch(
        &mut self,
        catalog: &WindowCatalog,
        session: &mut PointerSessionState,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        let pointer = event.pointer_id;
        match event.action {
            PointerAction::Down | PointerAction::PullDown => {
                if self.should_ignore_touch(config, event) {
                    tracing::debug!(pointer, "duplicate touch after cancel ignored");
                    return Resolution::Swallowed;
                }
                self.recently_cancelled.remove(&pointer);
                let res = self.hit_test(catalog, config, event, point);
                if let Resolution::Target(t) = &res {
                    if let Some(w) = self.find_window(catalog, t.window_id) {
                        if config.back_gesture_exclusion
                            && self.back_gesture_active
                            && is_valid_navigation_window(w, point)
                        {
                            tracing::debug!(window = w.id, "down swallowed by back gesture");
                            return Resolution::Swallowed;
                        }
                        // Off the default path when the hit landed on a
                        // UI-extension surface rather than a top-level
                        // window.
                        let off_default = catalog.window_by_id(t.window_id).is_none();
                        session.set_touch_down(
                            pointer,
                            TouchDownInfo { window: w.clone(), off_default_path: off_default },
                        );
                        // Every window that sees a DOWN is owed a
                        // terminator before a pull lands elsewhere.
                        session.push_cancel(pointer, w.clone());
                    }
                }
                res
            }
            PointerAction::Move => {
                if self.drag_flag {
                    // A drag payload is in flight: moves may retarget
                    // like pull events.
                    return self.retarget_pull(catalog, session, config, event, point);
                }
                match session.touch_down(pointer) {
                    Some(down) => {
                        let w = down.window.clone();
                        self.target_from_down(catalog, w.id, w.agent_window_id, w.pid)
                    }
                    None => self.hit_test(catalog, config, event, point),
                }
            }
            PointerAction::PullMove => {
                self.retarget_pull(catalog, session, config, event, point)
            }
            PointerAction::Up | PointerAction::PullUp => {
                let res = match session.touch_down(pointer) {
                    Some(down) => {
                        let w = down.window.clone();
                        self.target_from_down(catalog, w.id, w.agent_window_id, w.pid)
                    }
                    None => self.hit_test(catalog, config, event, point),
                };
                session.clear_touch_down(pointer);
                res
            }
            PointerAction::Cancel => {
                let res = match session.touch_down(pointer) {
                    Some(down) => {
                        let w = down.window.clone();
                        self.target_from_down(catalog, w.id, w.agent_window_id, w.pid)
                    }
                    None => Resolution::NoTarget,
                };
                session.clear_touch_down(pointer);
                self.recently_cancelled.insert(pointer);
                res
            }
            _ => self.hit_test(catalog, config, event, point),
        }
    }

    /// Pull events re-hit-test; the router issues the owed CANCELs when
    /// the target moves. The new window joins the cancel list so the
    /// chain stays terminated if the pull moves on again.
    fn retarget_pull(
        &mut self,
        catalog: &WindowCatalog,
        session: &mut PointerSessionState,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        let pointer = event.pointer_id;
        let res = self.hit_test(catalog, config, event, point);
        if let Resolution::Target(t) = &res {
            let moved = session
                .touch_down(pointer)
                .is_some_and(|down| down.window.id != t.window_id);
            if moved {
                if let Some(w) = self.find_window(catalog, t.window_id) {
                    let w = w.clone();
                    session.set_touch_down(
                        pointer,
                        TouchDownInfo { window: w.clone(), off_default_path: true },
                    );
                    session.push_cancel(pointer, w);
                }
            }
        }
        res
    }

    /// Sensor duplicate: a broad-contact DOWN immediately after a CANCEL
    /// on the same pointer is the same touch re-reported.
    fn should_ignore_touch(&self, config: &Config, event: &PointerEvent) -> bool {
        if !self.recently_cancelled.contains(&event.pointer_id) {
            return false;
        }
        event
            .acting_item()
            .is_some_and(|item| item.long_axis >= config.touch_long_axis_threshold)
    }

    // --- focus path ---

    fn resolve_by_focus(&self, catalog: &WindowCatalog) -> Resolution {
        match catalog.focused_window() {
            Some(w) => self.make_target(catalog, w),
            None => Resolution::NoTarget,
        }
    }

    // --- shared hit-test core ---

    /// Geometry walk: topmost candidate first, UI-extension drill-down,
    /// then the input-type policy per candidate.
    fn hit_test(
        &self,
        catalog: &WindowCatalog,
        config: &Config,
        event: &PointerEvent,
        point: Position,
    ) -> Resolution {
        let display = display_filter(event);
        for window in catalog.windows_at(point.x, point.y, display) {
            // Nested UI extensions take precedence over the host's own
            // hot areas, under the same z-order/occlusion rules.
            if let Some(nested) = topmost_extension_at(window, point) {
                match type_decision(nested, config, event) {
                    TypeDecision::Deliver => return self.make_target(catalog, nested),
                    TypeDecision::Swallow => return Resolution::Swallowed,
                    TypeDecision::FallThrough => {}
                }
            }
            match type_decision(window, config, event) {
                TypeDecision::Deliver => return self.make_target(catalog, window),
                TypeDecision::Swallow => return Resolution::Swallowed,
                TypeDecision::FallThrough => continue,
            }
        }
        Resolution::NoTarget
    }

    /// Build a target from a hit window, resolving the agent redirect.
    /// A dangling agent id is tolerated: delivery falls back to the hit
    /// window itself.
    fn make_target(&self, catalog: &WindowCatalog, window: &WindowInfo) -> Resolution {
        if window.pid < 0 {
            tracing::debug!(window = window.id, "owning process gone, treating as no target");
            return Resolution::NoTarget;
        }
        let agent = match window.agent_window_id {
            Some(aid) if self.find_window(catalog, aid).is_some() => aid,
            Some(aid) => {
                tracing::debug!(window = window.id, agent = aid, "agent window missing");
                window.id
            }
            None => window.id,
        };
        Resolution::Target(Target {
            window_id: window.id,
            agent_window_id: agent,
            pid: window.pid,
            display_id: window.display_id,
        })
    }

    /// Target a window by id (capture mode, pinned drags). A missing
    /// window is `NoTarget`, never a fault.
    fn target_by_id(&self, catalog: &WindowCatalog, id: WindowId) -> Resolution {
        match self.find_window(catalog, id) {
            Some(w) => self.make_target(catalog, w),
            None => Resolution::NoTarget,
        }
    }

    /// Target the captured down window; survives the window leaving the
    /// snapshot mid-gesture by falling back to the frozen identity.
    fn target_from_down(
        &self,
        catalog: &WindowCatalog,
        id: WindowId,
        agent: Option<WindowId>,
        pid: Pid,
    ) -> Resolution {
        if let Some(w) = self.find_window(catalog, id) {
            return self.make_target(catalog, w);
        }
        if pid < 0 {
            return Resolution::NoTarget;
        }
        Resolution::Target(Target {
            window_id: id,
            agent_window_id: agent.unwrap_or(id),
            pid,
            display_id: None,
        })
    }

    /// Window lookup across top-level and UI-extension namespaces — the
    /// two id namespaces are disjoint by convention only, so both are
    /// searched.
    fn find_window<'a>(&self, catalog: &'a WindowCatalog, id: WindowId) -> Option<&'a WindowInfo> {
        if let Some(w) = catalog.window_by_id(id) {
            return Some(w);
        }
        catalog
            .default_group()?
            .windows
            .iter()
            .flat_map(|w| w.ui_extensions.iter())
            .find(|e| e.id == id)
    }
}

fn display_filter(event: &PointerEvent) -> Option<DisplayId> {
    if event.target_display_id < 0 {
        None
    } else {
        Some(event.target_display_id)
    }
}

/// Topmost eligible UI-extension child containing the point.
fn topmost_extension_at(host: &WindowInfo, point: Position) -> Option<&WindowInfo> {
    let mut best: Option<&WindowInfo> = None;
    for ext in &host.ui_extensions {
        if ext.is_untouchable() || ext.is_transparent_at(point.x, point.y) {
            continue;
        }
        if !is_in_hot_area(point.x, point.y, ext.effective_hot_areas()) {
            continue;
        }
        // Strictly greater z wins; ties keep the earlier child.
        if best.map_or(true, |b| ext.z_order > b.z_order) {
            best = Some(ext);
        }
    }
    best
}

/// Navigation windows only claim points inside their default hot areas.
fn is_valid_navigation_window(window: &WindowInfo, point: Position) -> bool {
    window.input_type.is_navigation()
        && is_in_hot_area(point.x, point.y, window.effective_hot_areas())
}

/// The per-window input-type policy (anti-mistake, transmit, mix).
fn type_decision(window: &WindowInfo, config: &Config, event: &PointerEvent) -> TypeDecision {
    use crate::types::WindowInputType as T;

    // Handwriting-only windows accept pen input exclusively.
    if window.is_handwriting_only() {
        let pen = event.acting_item().is_some_and(|i| i.tool_type == ToolType::Pen);
        if !pen {
            return TypeDecision::FallThrough;
        }
    }

    let action = event.action;
    let axis = matches!(
        action,
        PointerAction::AxisBegin | PointerAction::AxisUpdate | PointerAction::AxisEnd
    );
    match window.input_type {
        T::Normal => TypeDecision::Deliver,
        T::TransmitAll => TypeDecision::FallThrough,
        T::TransmitExceptMove => {
            if action == PointerAction::Move {
                TypeDecision::Deliver
            } else {
                TypeDecision::FallThrough
            }
        }
        T::AntiMistakeTouch => {
            if !config.anti_mistake_observer {
                return TypeDecision::Deliver;
            }
            match event.acting_item().map(|i| i.tool_type) {
                Some(ToolType::Pen) => TypeDecision::FallThrough,
                _ => TypeDecision::Swallow,
            }
        }
        T::TransmitAxisMove => {
            if axis {
                TypeDecision::FallThrough
            } else {
                TypeDecision::Deliver
            }
        }
        T::TransmitMouseMove => {
            if event.source == SourceType::Mouse && action == PointerAction::Move {
                TypeDecision::FallThrough
            } else {
                TypeDecision::Deliver
            }
        }
        // Candidacy is already bounded by the published hot areas, so
        // the remaining transmit types deliver within them.
        T::TransmitLeftRight | T::TransmitButtom => TypeDecision::Deliver,
        T::MixLeftRightAntiAxisMove | T::MixButtomAntiAxisMove => {
            if axis {
                TypeDecision::Swallow
            } else {
                TypeDecision::Deliver
            }
        }
    }
}
