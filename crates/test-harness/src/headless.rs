//! Headless targeting engine wrapper for testing
//!
//! Wraps a [`TargetingEngine`] with a recording transport and cursor
//! renderer so tests can drive the full pipeline — physical coordinates
//! in, dispatched events out — and assert on everything that crossed the
//! port boundary.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;

use targeting::event::{KeyEvent, PointerAction, PointerEvent, PointerItem, SourceType};
use targeting::ports::{AnrKind, CursorRenderer, MouseDisplayState, NoDevices, SessionTable};
use targeting::types::{DisplayGroupInfo, Pid, PointerId, WindowInfo};
use targeting::{Config, Resolution, TargetingEngine};

#[derive(Error, Debug)]
pub enum TestError {
    #[error("no event was delivered")]
    NoDelivery,

    #[error("engine error: {0}")]
    Engine(String),
}

/// Everything the engine pushed through the transport.
#[derive(Debug, Default)]
pub struct DeliveryLog {
    pub pointer: Vec<(i32, PointerEvent)>,
    pub key: Vec<(i32, KeyEvent)>,
    dead_pids: HashSet<Pid>,
}

struct RecordingTransport {
    log: Rc<RefCell<DeliveryLog>>,
}

impl SessionTable for RecordingTransport {
    // fd == pid keeps assertions readable.
    fn fd_for_pid(&self, pid: Pid) -> Option<i32> {
        if self.log.borrow().dead_pids.contains(&pid) {
            None
        } else {
            Some(pid)
        }
    }

    fn send_event(&self, fd: i32, event: &PointerEvent) -> bool {
        self.log.borrow_mut().pointer.push((fd, event.clone()));
        true
    }

    fn send_key_event(&self, fd: i32, event: &KeyEvent) -> bool {
        self.log.borrow_mut().key.push((fd, event.clone()));
        true
    }

    fn trigger_anr(&self, _kind: AnrKind, _ts: i64, _fd: i32) -> bool {
        true
    }
}

struct RecordingRenderer {
    states: Rc<RefCell<Vec<MouseDisplayState>>>,
}

impl CursorRenderer for RecordingRenderer {
    fn update_pointer_device(&self, _has_pointer: bool, _is_visible: bool, _is_hot_plug: bool) {}

    fn on_display_info(&self, _group: &DisplayGroupInfo) {}

    fn on_window_info(&self, _window: &WindowInfo) {}

    fn set_mouse_display_state(&self, state: MouseDisplayState) {
        self.states.borrow_mut().push(state);
    }
}

/// A targeting engine wired to recording ports.
pub struct TestEngine {
    engine: TargetingEngine,
    log: Rc<RefCell<DeliveryLog>>,
    cursor_states: Rc<RefCell<Vec<MouseDisplayState>>>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let log = Rc::new(RefCell::new(DeliveryLog::default()));
        let cursor_states = Rc::new(RefCell::new(Vec::new()));
        let mut engine = TargetingEngine::new(
            config,
            Box::new(NoDevices),
            Box::new(RecordingTransport { log: Rc::clone(&log) }),
        );
        engine.register_cursor_renderer(Box::new(RecordingRenderer {
            states: Rc::clone(&cursor_states),
        }));
        Self { engine, log, cursor_states }
    }

    pub fn engine(&mut self) -> &mut TargetingEngine {
        &mut self.engine
    }

    /// Publish a full display-group snapshot.
    pub fn publish(&mut self, group: DisplayGroupInfo) {
        self.engine.update_display_info(group);
    }

    /// Apply an incremental window patch.
    pub fn patch(&mut self, patch: DisplayGroupInfo) {
        self.engine.update_window_info(patch);
    }

    // --- event drivers ---

    pub fn touch(&mut self, action: PointerAction, pointer: PointerId, x: i32, y: i32) -> Resolution {
        let ev = touch_event(action, pointer, x, y);
        self.engine.handle_pointer_event(&ev)
    }

    pub fn touch_on_display(
        &mut self,
        action: PointerAction,
        pointer: PointerId,
        display: i32,
        x: i32,
        y: i32,
    ) -> Resolution {
        let mut ev = touch_event(action, pointer, x, y);
        ev.target_display_id = display;
        self.engine.handle_pointer_event(&ev)
    }

    pub fn mouse(&mut self, action: PointerAction, x: i32, y: i32) -> Resolution {
        let ev = mouse_event(action, x, y);
        self.engine.handle_pointer_event(&ev)
    }

    pub fn send(&mut self, event: &PointerEvent) -> Resolution {
        self.engine.handle_pointer_event(event)
    }

    pub fn key(&mut self, key_code: i32) -> Resolution {
        self.engine.handle_key_event(&KeyEvent { key_code, ..Default::default() })
    }

    // --- observation ---

    /// Every pointer event sent through the transport, in order.
    pub fn deliveries(&self) -> Vec<(i32, PointerEvent)> {
        self.log.borrow().pointer.clone()
    }

    pub fn key_deliveries(&self) -> Vec<(i32, KeyEvent)> {
        self.log.borrow().key.clone()
    }

    /// Delivered events of one action kind, in delivery order.
    pub fn actions_of(&self, action: PointerAction) -> Vec<PointerEvent> {
        self.log
            .borrow()
            .pointer
            .iter()
            .filter(|(_, e)| e.action == action)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn last_delivery(&self) -> Result<PointerEvent, TestError> {
        self.log
            .borrow()
            .pointer
            .last()
            .map(|(_, e)| e.clone())
            .ok_or(TestError::NoDelivery)
    }

    pub fn clear_log(&mut self) {
        let mut log = self.log.borrow_mut();
        log.pointer.clear();
        log.key.clear();
    }

    /// Cursor states the renderer observed, in order.
    pub fn cursor_states(&self) -> Vec<MouseDisplayState> {
        self.cursor_states.borrow().clone()
    }

    /// Make a pid's session disappear from the transport and purge the
    /// engine state it owned.
    pub fn kill_process(&mut self, pid: Pid) {
        tracing::debug!(pid, "test transport dropping pid");
        self.log.borrow_mut().dead_pids.insert(pid);
        self.engine.on_session_lost(pid);
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A touch event on the default display with one contact.
pub fn touch_event(action: PointerAction, pointer: PointerId, x: i32, y: i32) -> PointerEvent {
    PointerEvent {
        source: SourceType::TouchScreen,
        action,
        pointer_id: pointer,
        target_display_id: 0,
        items: vec![PointerItem {
            pointer_id: pointer,
            display_x: x,
            display_y: y,
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// A mouse event on the default display.
pub fn mouse_event(action: PointerAction, x: i32, y: i32) -> PointerEvent {
    let mut ev = touch_event(action, 0, x, y);
    ev.source = SourceType::Mouse;
    ev
}
