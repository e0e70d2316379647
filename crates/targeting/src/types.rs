//! Data model for displays, windows, and display groups
//!
//! These are plain value types: the catalog replaces snapshots wholesale
//! rather than mutating them in place, so everything here derives `Clone`
//! and carries serde for scene files and diagnostic dumps.

use serde::{Deserialize, Serialize};

/// Display identifier assigned by the window manager.
pub type DisplayId = i32;

/// Window identifier assigned by the window manager.
pub type WindowId = i32;

/// Process id of a window's owning client.
pub type Pid = i32;

/// Per-contact pointer id (touch) or 0 for the global mouse pointer.
pub type PointerId = i32;

/// Input device id.
pub type DeviceId = i32;

/// Display group id (multi-seat / virtual-screen scenarios).
pub type GroupId = i32;

/// The group used when an update does not name one.
pub const DEFAULT_GROUP_ID: GroupId = 0;

/// Window flag: the window never receives input and never occludes.
pub const FLAG_BIT_UNTOUCHABLE: u32 = 1 << 0;

/// Window flag: the window only accepts pen (handwriting) input.
pub const FLAG_BIT_HANDWRITING: u32 = 1 << 1;

/// An axis-aligned rectangle in logical display coordinates.
///
/// Width and height may legitimately be enormous (virtual displays), so
/// containment widens to i64 before adding — a rect can never wrap around
/// the i32 range into a false match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive), widened so `x + width` cannot overflow.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width.max(0) as i64
    }

    /// Bottom edge (exclusive), widened so `y + height` cannot overflow.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height.max(0) as i64
    }

    /// A rect with zero or negative extent contains nothing.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment test: `[x, x+width) x [y, y+height)`.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        !self.is_empty()
            && px >= self.x
            && (px as i64) < self.right()
            && py >= self.y
            && (py as i64) < self.bottom()
    }
}

/// Display rotation, counter-clockwise from the panel's natural orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    D0,
    D90,
    D180,
    D270,
}

impl Direction {
    /// True for the two rotations that swap the display's axes.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Direction::D90 | Direction::D270)
    }
}

/// How a physical display participates in the screen combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenCombination {
    #[default]
    Main,
    Expand,
    Mirror,
}

/// One physical (or virtual) display.
///
/// Replaced wholesale on every display-topology update; never mutated
/// field-by-field once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayInfo {
    pub id: DisplayId,
    /// Origin in the global (multi-display) coordinate space.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Usable extent after notch/cutout subtraction; the rotation pivot.
    pub valid_width: i32,
    pub valid_height: i32,
    pub dpi: i32,
    pub name: String,
    /// Stable cross-reboot identifier used by name lookups.
    pub unique_name: String,
    pub direction: Direction,
    /// Foldables pin the logical orientation regardless of the panel's
    /// reported direction.
    pub fixed_direction: Option<Direction>,
    /// One-hand-mode viewport origin (active when `scale_percent < 100`).
    pub one_hand_x: i32,
    pub one_hand_y: i32,
    /// One-hand-mode scale in percent; 100 means the mode is off.
    pub scale_percent: u32,
    /// Row-major 3x3 affine overriding the simple rotation math when set.
    pub transform: Option<[f32; 9]>,
    pub combination: ScreenCombination,
}

impl Default for DisplayInfo {
    fn default() -> Self {
        Self {
            id: 0,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            valid_width: 0,
            valid_height: 0,
            dpi: 160,
            name: String::new(),
            unique_name: String::new(),
            direction: Direction::D0,
            fixed_direction: None,
            one_hand_x: 0,
            one_hand_y: 0,
            scale_percent: 100,
            transform: None,
            combination: ScreenCombination::Main,
        }
    }
}

impl DisplayInfo {
    /// The direction used for coordinate math: the fold-pinned one if set.
    pub fn logical_direction(&self) -> Direction {
        self.fixed_direction.unwrap_or(self.direction)
    }

    /// Logical extent after rotation (axes swap for 90/270).
    pub fn logical_extents(&self) -> (i32, i32) {
        if self.logical_direction().swaps_axes() {
            (self.valid_height, self.valid_width)
        } else {
            (self.valid_width, self.valid_height)
        }
    }

    /// Whether one-hand mode is active on this display.
    pub fn one_hand_active(&self) -> bool {
        self.scale_percent > 0 && self.scale_percent < 100
    }

    /// Bounding-box containment in global coordinates, saturating so a
    /// display near the i32 edge never wraps into a false match.
    pub fn contains_global(&self, gx: i32, gy: i32) -> bool {
        let right = (self.x as i64).saturating_add(self.width.max(0) as i64);
        let bottom = (self.y as i64).saturating_add(self.height.max(0) as i64);
        gx >= self.x && (gx as i64) < right && gy >= self.y && (gy as i64) < bottom
    }
}

/// Input transmission policy attached to a window by the window manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowInputType {
    #[default]
    Normal,
    TransmitAll,
    TransmitExceptMove,
    AntiMistakeTouch,
    TransmitAxisMove,
    TransmitMouseMove,
    TransmitLeftRight,
    TransmitButtom,
    MixLeftRightAntiAxisMove,
    MixButtomAntiAxisMove,
}

impl WindowInputType {
    /// The two MIX_* types mark navigation-gesture windows whose
    /// `default_hot_areas` bound the region they actually claim.
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            WindowInputType::MixLeftRightAntiAxisMove | WindowInputType::MixButtomAntiAxisMove
        )
    }
}

/// Incremental-update action attached to a window entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAction {
    #[default]
    Unknown,
    Add,
    AddEnd,
    Del,
    Change,
}

/// Per-window transparency mask sampled at hit-test time.
///
/// The mask resolution is independent of the window size; probes scale
/// the window-local point into mask space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelMask {
    pub width: u32,
    pub height: u32,
    /// Row-major alpha bytes, `width * height` entries.
    pub alpha: Vec<u8>,
}

impl PixelMask {
    /// Alpha at mask coordinates, `None` when out of bounds or malformed.
    pub fn alpha_at(&self, mx: u32, my: u32) -> Option<u8> {
        if mx >= self.width || my >= self.height {
            return None;
        }
        self.alpha.get((my as usize) * (self.width as usize) + mx as usize).copied()
    }
}

/// One window (or UI-extension sub-surface) as published by the window
/// manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub id: WindowId,
    pub pid: Pid,
    pub uid: i32,
    /// Redirect target for input delivery; `None` means deliver to `id`.
    pub agent_window_id: Option<WindowId>,
    /// Higher paints (and hit-tests) above lower; ties break by catalog
    /// insertion order.
    pub z_order: f32,
    /// Outer bounds, also the reference frame for pointer-change areas.
    pub area: Rect,
    /// Rects used for plain containment and navigation-gesture claims.
    pub default_hot_areas: Vec<Rect>,
    /// Rects used for resize/edge detection.
    pub pointer_hot_areas: Vec<Rect>,
    /// 8 thickness entries clockwise from the top-left corner
    /// `[tl, top, tr, right, br, bottom, bl, left]`; an optional 9th
    /// entry expands every derived band outward by that margin.
    pub pointer_change_areas: Vec<i32>,
    pub flags: u32,
    pub input_type: WindowInputType,
    pub privacy_mode: bool,
    /// Display this window lives on; `None` means display-independent.
    pub display_id: Option<DisplayId>,
    /// Row-major 3x3 affine from logical display space to window space.
    pub transform: Option<[f32; 9]>,
    pub pixel_mask: Option<PixelMask>,
    /// Embedded UI-extension sub-surfaces, hit-tested before the host's
    /// own hot areas.
    pub ui_extensions: Vec<WindowInfo>,
    pub action: WindowAction,
}

impl Default for WindowInfo {
    fn default() -> Self {
        Self {
            id: 0,
            pid: 0,
            uid: 0,
            agent_window_id: None,
            z_order: 0.0,
            area: Rect::default(),
            default_hot_areas: Vec::new(),
            pointer_hot_areas: Vec::new(),
            pointer_change_areas: Vec::new(),
            flags: 0,
            input_type: WindowInputType::Normal,
            privacy_mode: false,
            display_id: None,
            transform: None,
            pixel_mask: None,
            ui_extensions: Vec::new(),
            action: WindowAction::Unknown,
        }
    }
}

impl WindowInfo {
    pub fn is_untouchable(&self) -> bool {
        self.flags & FLAG_BIT_UNTOUCHABLE != 0
    }

    pub fn is_handwriting_only(&self) -> bool {
        self.flags & FLAG_BIT_HANDWRITING != 0
    }

    /// Hot areas used for plain containment; the outer area when the
    /// window manager published none.
    pub fn effective_hot_areas(&self) -> &[Rect] {
        if self.default_hot_areas.is_empty() {
            std::slice::from_ref(&self.area)
        } else {
            &self.default_hot_areas
        }
    }

    /// True when a pixel mask is attached and fully transparent at the
    /// probed logical point. Windows without a mask are never transparent.
    pub fn is_transparent_at(&self, x: i32, y: i32) -> bool {
        let Some(mask) = &self.pixel_mask else {
            return false;
        };
        if mask.width == 0 || mask.height == 0 || self.area.is_empty() {
            return false;
        }
        if !self.area.contains(x, y) {
            return false;
        }
        // Scale the window-local point into mask space.
        let lx = (x - self.area.x) as i64;
        let ly = (y - self.area.y) as i64;
        let mx = lx * mask.width as i64 / self.area.width as i64;
        let my = ly * mask.height as i64 / self.area.height as i64;
        matches!(mask.alpha_at(mx as u32, my as u32), Some(0))
    }
}

/// The atomic snapshot published by the window manager: displays plus the
/// z-ordered window list for one display group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayGroupInfo {
    pub id: GroupId,
    pub width: i32,
    pub height: i32,
    pub focus_window_id: WindowId,
    pub windows: Vec<WindowInfo>,
    pub displays: Vec<DisplayInfo>,
}

impl DisplayGroupInfo {
    /// Look up a display by id within this group.
    pub fn display(&self, id: DisplayId) -> Option<&DisplayInfo> {
        self.displays.iter().find(|d| d.id == id)
    }
}
