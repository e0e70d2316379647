//! Coordinate transforms between physical and logical display space
//!
//! Pure functions over `DisplayInfo` value types: no state, no side
//! effects, deterministic. The pipeline for an incoming physical point is
//!
//! 1. one-hand-mode remap (unless the event bypasses it)
//! 2. rotation into logical space (`rotate_screen`)
//! 3. optional 3x3 affine for virtual/extended displays
//! 4. clamp into the valid logical extent
//!
//! `reverse_rotate_screen` is the algebraic inverse of step 2, used to
//! place the hardware cursor back in panel space.
//!
//! All arithmetic that could overflow i32 (display origins near the i32
//! edge, `i32::MAX` widths) widens to i64 and saturates on the way back.
//! Wrapping into a valid-looking but wrong coordinate is never allowed.

use crate::types::{DisplayId, DisplayInfo, Direction};

/// A point in either physical or logical display coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rotate a physical point into logical (rotation-normalized) space.
///
/// The pivot extents are `valid_width`/`valid_height` (the usable panel
/// area after cutouts), not the raw width/height:
///
/// - 0:   identity
/// - 90:  (x, y) -> (valid_height - 1 - y, x)
/// - 180: (x, y) -> (valid_width - 1 - x, valid_height - 1 - y)
/// - 270: (x, y) -> (y, valid_width - 1 - x)
pub fn rotate_screen(display: &DisplayInfo, p: Position) -> Position {
    let w = display.valid_width;
    let h = display.valid_height;
    match display.logical_direction() {
        Direction::D0 => p,
        Direction::D90 => Position::new(sub1(h, p.y), p.x),
        Direction::D180 => Position::new(sub1(w, p.x), sub1(h, p.y)),
        Direction::D270 => Position::new(p.y, sub1(w, p.x)),
    }
}

/// The algebraic inverse of [`rotate_screen`].
///
/// Used to map a logical cursor position back to panel space for
/// hardware-cursor placement.
pub fn reverse_rotate_screen(display: &DisplayInfo, p: Position) -> Position {
    let w = display.valid_width;
    let h = display.valid_height;
    match display.logical_direction() {
        Direction::D0 => p,
        Direction::D90 => Position::new(p.y, sub1(h, p.x)),
        Direction::D180 => Position::new(sub1(w, p.x), sub1(h, p.y)),
        Direction::D270 => Position::new(sub1(w, p.y), p.x),
    }
}

// extent - 1 - v, saturating at the i32 boundary rather than wrapping.
fn sub1(extent: i32, v: i32) -> i32 {
    clamp_i64(extent as i64 - 1 - v as i64)
}

fn clamp_i64(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Apply the display's 3x3 row-major affine, if present.
///
/// Virtual and extended displays use this to express non-integer scale
/// plus translation; without a matrix the transform is identity.
pub fn transform_display_xy(display: &DisplayInfo, p: Position) -> Position {
    let Some(m) = &display.transform else {
        return p;
    };
    let x = p.x as f32;
    let y = p.y as f32;
    let tx = m[0] * x + m[1] * y + m[2];
    let ty = m[3] * x + m[4] * y + m[5];
    Position::new(saturate_f32(tx), saturate_f32(ty))
}

fn saturate_f32(v: f32) -> i32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(i32::MIN as f32, i32::MAX as f32) as i32
}

/// Clamp a rotated point into `[0, w) x [0, h)` of the logical extent.
///
/// The extent swaps axes for 90/270 so the clamp matches the space
/// `rotate_screen` produced.
pub fn adjust_display_coordinate(display: &DisplayInfo, p: Position) -> Position {
    let (w, h) = display.logical_extents();
    Position::new(
        p.x.clamp(0, (w - 1).max(0)),
        p.y.clamp(0, (h - 1).max(0)),
    )
}

/// Find which physical display contains a point given relative to
/// `origin`'s coordinate space.
///
/// Absolute-positioned mice report coordinates relative to one display;
/// spanning setups need the containing display resolved against global
/// bounding boxes. Arithmetic saturates (see module docs).
pub fn find_physical_display(
    displays: &[DisplayInfo],
    origin: &DisplayInfo,
    p: Position,
) -> Option<DisplayId> {
    let gx = clamp_i64(origin.x as i64 + p.x as i64);
    let gy = clamp_i64(origin.y as i64 + p.y as i64);
    for d in displays {
        if d.contains_global(gx, gy) {
            return Some(d.id);
        }
    }
    tracing::debug!(x = gx, y = gy, "no physical display contains point");
    None
}

/// Remap a physical point from the one-hand-mode virtual viewport back to
/// full-screen coordinates.
///
/// One-hand mode shrinks the screen to `scale_percent` and offsets it to
/// `(one_hand_x, one_hand_y)`; a touch inside the shrunk viewport must
/// land where it would have on the full screen. Points outside the
/// viewport clamp to the display edge. Identity when the mode is off.
pub fn one_hand_position(display: &DisplayInfo, p: Position) -> Position {
    if !display.one_hand_active() {
        return p;
    }
    let scale = display.scale_percent as i64;
    let x = (p.x as i64 - display.one_hand_x as i64) * 100 / scale;
    let y = (p.y as i64 - display.one_hand_y as i64) * 100 / scale;
    Position::new(
        clamp_i64(x).clamp(0, (display.valid_width - 1).max(0)),
        clamp_i64(y).clamp(0, (display.valid_height - 1).max(0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScreenCombination;

    fn display(w: i32, h: i32, direction: Direction) -> DisplayInfo {
        DisplayInfo {
            id: 0,
            width: w,
            height: h,
            valid_width: w,
            valid_height: h,
            direction,
            ..Default::default()
        }
    }

    #[test]
    fn rotate_identity_at_direction_0() {
        let d = display(1920, 1080, Direction::D0);
        assert_eq!(rotate_screen(&d, Position::new(10, 20)), Position::new(10, 20));
    }

    #[test]
    fn rotate_90_concrete_scenario() {
        // 1920x1080 at 90 degrees: (10,20) -> (1079-20, 10) = (1059, 10)
        let d = display(1920, 1080, Direction::D90);
        assert_eq!(rotate_screen(&d, Position::new(10, 20)), Position::new(1059, 10));
    }

    #[test]
    fn rotate_180_mirrors_both_axes() {
        let d = display(1920, 1080, Direction::D180);
        assert_eq!(rotate_screen(&d, Position::new(0, 0)), Position::new(1919, 1079));
        assert_eq!(rotate_screen(&d, Position::new(1919, 1079)), Position::new(0, 0));
    }

    #[test]
    fn rotate_270_concrete() {
        let d = display(1920, 1080, Direction::D270);
        assert_eq!(rotate_screen(&d, Position::new(10, 20)), Position::new(20, 1909));
    }

    #[test]
    fn reverse_undoes_rotate_all_directions() {
        for dir in [Direction::D0, Direction::D90, Direction::D180, Direction::D270] {
            let d = display(1920, 1080, dir);
            for p in [
                Position::new(0, 0),
                Position::new(10, 20),
                Position::new(1919, 1079),
                Position::new(960, 540),
            ] {
                let there = rotate_screen(&d, p);
                let back = reverse_rotate_screen(&d, there);
                assert_eq!(back, p, "round-trip failed for {:?} at {:?}", p, dir);
            }
        }
    }

    #[test]
    fn reverse_90_concrete_scenario() {
        let d = display(1920, 1080, Direction::D90);
        assert_eq!(
            reverse_rotate_screen(&d, Position::new(1059, 10)),
            Position::new(10, 20)
        );
    }

    #[test]
    fn fixed_direction_wins_over_panel_direction() {
        let mut d = display(1920, 1080, Direction::D90);
        d.fixed_direction = Some(Direction::D0);
        assert_eq!(rotate_screen(&d, Position::new(10, 20)), Position::new(10, 20));
    }

    #[test]
    fn transform_identity_without_matrix() {
        let d = display(1920, 1080, Direction::D0);
        assert_eq!(transform_display_xy(&d, Position::new(5, 7)), Position::new(5, 7));
    }

    #[test]
    fn transform_applies_scale_and_translation() {
        let mut d = display(1920, 1080, Direction::D0);
        // 1.5x scale plus (100, 50) translation
        d.transform = Some([1.5, 0.0, 100.0, 0.0, 1.5, 50.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            transform_display_xy(&d, Position::new(10, 20)),
            Position::new(115, 80)
        );
    }

    #[test]
    fn adjust_clamps_into_logical_extent() {
        let d = display(1920, 1080, Direction::D0);
        assert_eq!(
            adjust_display_coordinate(&d, Position::new(-5, 2000)),
            Position::new(0, 1079)
        );
    }

    #[test]
    fn adjust_swaps_extent_for_90() {
        let d = display(1920, 1080, Direction::D90);
        // Logical space is 1080x1920 after rotation
        assert_eq!(
            adjust_display_coordinate(&d, Position::new(5000, 5000)),
            Position::new(1079, 1919)
        );
    }

    #[test]
    fn find_display_across_side_by_side_monitors() {
        let left = display(1920, 1080, Direction::D0);
        let right = DisplayInfo {
            id: 1,
            x: 1920,
            width: 1280,
            height: 1024,
            valid_width: 1280,
            valid_height: 1024,
            combination: ScreenCombination::Expand,
            ..Default::default()
        };
        let displays = vec![left.clone(), right];
        // Point past the left display's right edge lands on the right one
        assert_eq!(
            find_physical_display(&displays, &left, Position::new(2000, 100)),
            Some(1)
        );
        assert_eq!(
            find_physical_display(&displays, &left, Position::new(100, 100)),
            Some(0)
        );
        assert_eq!(
            find_physical_display(&displays, &left, Position::new(-10, 100)),
            None
        );
    }

    #[test]
    fn find_display_saturates_instead_of_wrapping() {
        let origin = DisplayInfo {
            x: i32::MAX - 100,
            width: i32::MAX,
            height: 1080,
            valid_width: i32::MAX,
            valid_height: 1080,
            ..Default::default()
        };
        let displays = vec![origin.clone()];
        // origin.x + p.x would wrap in i32; saturation keeps the point on
        // the display instead of teleporting it negative
        assert_eq!(
            find_physical_display(&displays, &origin, Position::new(1000, 500)),
            Some(0)
        );
    }

    #[test]
    fn one_hand_identity_when_off() {
        let d = display(1080, 2340, Direction::D0);
        assert_eq!(one_hand_position(&d, Position::new(33, 44)), Position::new(33, 44));
    }

    #[test]
    fn one_hand_maps_viewport_back_to_full_screen() {
        // 75% viewport anchored at (270, 585): its origin maps to (0,0)
        // and a point inside scales back up
        let mut d = display(1080, 2340, Direction::D0);
        d.one_hand_x = 270;
        d.one_hand_y = 585;
        d.scale_percent = 75;
        assert_eq!(one_hand_position(&d, Position::new(270, 585)), Position::new(0, 0));
        assert_eq!(
            one_hand_position(&d, Position::new(270 + 75, 585 + 150)),
            Position::new(100, 200)
        );
    }

    #[test]
    fn one_hand_clamps_points_outside_viewport() {
        let mut d = display(1080, 2340, Direction::D0);
        d.one_hand_x = 270;
        d.one_hand_y = 585;
        d.scale_percent = 75;
        // Left of the viewport clamps to x=0; far corner clamps to extent
        assert_eq!(one_hand_position(&d, Position::new(0, 0)), Position::new(0, 0));
        assert_eq!(
            one_hand_position(&d, Position::new(1079, 2339)),
            Position::new(1078, 2338)
        );
    }
}
