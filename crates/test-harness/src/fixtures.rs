//! Test fixtures for common targeting scenarios

use targeting::types::{
    DisplayGroupInfo, DisplayId, DisplayInfo, Direction, Rect, ScreenCombination, WindowId,
    WindowInfo,
};

/// Standard test display dimensions
pub const TEST_WIDTH: i32 = 1920;
pub const TEST_HEIGHT: i32 = 1080;

/// A display with equal raw and valid extents.
pub fn display(id: DisplayId, width: i32, height: i32) -> DisplayInfo {
    DisplayInfo {
        id,
        width,
        height,
        valid_width: width,
        valid_height: height,
        unique_name: format!("display-{id}"),
        ..Default::default()
    }
}

/// The standard 1920x1080 main display.
pub fn main_display() -> DisplayInfo {
    let mut d = display(0, TEST_WIDTH, TEST_HEIGHT);
    d.combination = ScreenCombination::Main;
    d
}

/// A display rotated to the given direction.
pub fn rotated_display(id: DisplayId, width: i32, height: i32, direction: Direction) -> DisplayInfo {
    let mut d = display(id, width, height);
    d.direction = direction;
    d
}

/// A phone-shaped display with one-hand mode active: `scale_percent` of
/// the screen anchored at `(x, y)`.
pub fn one_hand_display(x: i32, y: i32, scale_percent: u32) -> DisplayInfo {
    let mut d = display(0, 1080, 2340);
    d.one_hand_x = x;
    d.one_hand_y = y;
    d.scale_percent = scale_percent;
    d
}

/// A plain window; pid is derived as `100 + id` so transport fds stay
/// predictable in assertions.
pub fn window(id: WindowId, z_order: f32, area: Rect) -> WindowInfo {
    WindowInfo { id, pid: 100 + id, z_order, area, ..Default::default() }
}

/// A group over the standard main display.
pub fn group(windows: Vec<WindowInfo>) -> DisplayGroupInfo {
    DisplayGroupInfo {
        width: TEST_WIDTH,
        height: TEST_HEIGHT,
        windows,
        displays: vec![main_display()],
        ..Default::default()
    }
}

/// A group with explicit displays.
pub fn group_on(windows: Vec<WindowInfo>, displays: Vec<DisplayInfo>) -> DisplayGroupInfo {
    DisplayGroupInfo { windows, displays, ..Default::default() }
}

/// Two full-screen windows stacked over the same area: id 1 at z=5 over
/// id 2 at z=3.
pub fn stacked_pair() -> DisplayGroupInfo {
    group(vec![
        window(1, 5.0, Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT)),
        window(2, 3.0, Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT)),
    ])
}

/// Two windows side by side: id 1 on the left half, id 2 on the right.
pub fn side_by_side() -> DisplayGroupInfo {
    let half = TEST_WIDTH / 2;
    group(vec![
        window(1, 1.0, Rect::new(0, 0, half, TEST_HEIGHT)),
        window(2, 1.0, Rect::new(half, 0, half, TEST_HEIGHT)),
    ])
}
