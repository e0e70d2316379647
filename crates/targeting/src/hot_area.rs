//! Per-window hot-area geometry
//!
//! Precomputes, for every window that publishes `pointer_change_areas`,
//! the eight edge/corner rectangles used for resize-cursor hinting, and
//! answers the point-in-region queries the resolver and router need.
//!
//! Slot layout (fixed, indexes matter for style mapping):
//!
//! | slot | band         | style        |
//! |------|--------------|--------------|
//! | 0    | top          | north-south  |
//! | 1    | bottom       | north-south  |
//! | 2    | left         | west-east    |
//! | 3    | right        | west-east    |
//! | 4    | top-left     | nw-se        |
//! | 5    | bottom-right | nw-se        |
//! | 6    | top-right    | ne-sw        |
//! | 7    | bottom-left  | ne-sw        |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DisplayGroupInfo, Rect, WindowId, WindowInfo};

/// Thickness entries published per window, clockwise from the top-left
/// corner: `[tl, top, tr, right, br, bottom, bl, left]`.
const CHANGE_AREA_COUNT: usize = 8;

/// Cursor style suggested by a pointer-change area hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerStyleKind {
    #[default]
    Default,
    SizeNorthSouth,
    SizeWestEast,
    SizeNorthWestSouthEast,
    SizeNorthEastSouthWest,
}

/// Style for a hit in the given slot.
fn style_for_slot(slot: usize) -> PointerStyleKind {
    match slot {
        0 | 1 => PointerStyleKind::SizeNorthSouth,
        2 | 3 => PointerStyleKind::SizeWestEast,
        4 | 5 => PointerStyleKind::SizeNorthWestSouthEast,
        6 | 7 => PointerStyleKind::SizeNorthEastSouthWest,
        _ => PointerStyleKind::Default,
    }
}

/// True iff the point lies in the union of `rects`.
///
/// Negative logical coordinates never hit-test positive, regardless of
/// the rect list — even overflow-sized rects cannot claim them.
pub fn is_in_hot_area(x: i32, y: i32, rects: &[Rect]) -> bool {
    if x < 0 || y < 0 {
        return false;
    }
    rects.iter().any(|r| r.contains(x, y))
}

/// Map a hit among the eight slots to a cursor style.
///
/// Scans every slot and keeps the **last** match: callers stack rect
/// lists bottom-to-top, so last-wins yields the topmost window's style.
pub fn in_which_hot_area(x: i32, y: i32, rects: &[Rect]) -> Option<PointerStyleKind> {
    if x < 0 || y < 0 {
        return None;
    }
    let mut hit = None;
    for (slot, r) in rects.iter().enumerate() {
        if r.contains(x, y) {
            hit = Some(style_for_slot(slot % CHANGE_AREA_COUNT));
        }
    }
    hit
}

/// Precomputed pointer-change rectangles, keyed by window id.
///
/// Rebuilt from scratch on every catalog update; hit-test reads vastly
/// outnumber updates, so the index favors cheap lookups over incremental
/// maintenance.
#[derive(Debug, Default)]
pub struct HotAreaIndex {
    change_areas: HashMap<WindowId, [Rect; CHANGE_AREA_COUNT]>,
}

impl HotAreaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every window's pointer-change rects from a fresh group
    /// snapshot. Windows without published thickness entries get no slot
    /// (they fall back to the default cursor).
    pub fn update(&mut self, group: &DisplayGroupInfo) {
        self.change_areas.clear();
        for window in &group.windows {
            self.index_window(window);
            for ext in &window.ui_extensions {
                self.index_window(ext);
            }
        }
        tracing::debug!(windows = self.change_areas.len(), "pointer-change areas rebuilt");
    }

    fn index_window(&mut self, window: &WindowInfo) {
        if window.pointer_change_areas.len() < CHANGE_AREA_COUNT {
            return;
        }
        let t = &window.pointer_change_areas;
        // Optional 9th entry: uniform outward expansion of every band.
        let margin = t.get(CHANGE_AREA_COUNT).copied().unwrap_or(0).max(0);
        let mut rects = [Rect::default(); CHANGE_AREA_COUNT];
        update_top_bottom_area(&window.area, t[1], t[5], margin, &mut rects);
        update_left_right_area(&window.area, t[7], t[3], margin, &mut rects);
        update_inner_angle_area(&window.area, t[0], t[2], t[4], t[6], margin, &mut rects);
        self.change_areas.insert(window.id, rects);
    }

    /// Look up the window's rects and map the point to a style.
    ///
    /// `None` when no rects are registered for the window or the point
    /// misses all of them; callers fall back to the default cursor.
    pub fn select_pointer_change_area(
        &self,
        window_id: WindowId,
        x: i32,
        y: i32,
    ) -> Option<PointerStyleKind> {
        let rects = self.change_areas.get(&window_id)?;
        in_which_hot_area(x, y, rects)
    }

    /// Whether any pointer-change rects are registered for the window.
    pub fn has_window(&self, window_id: WindowId) -> bool {
        self.change_areas.contains_key(&window_id)
    }

    /// The raw slot rects for a window (diagnostics / dump).
    pub fn window_areas(&self, window_id: WindowId) -> Option<&[Rect]> {
        self.change_areas.get(&window_id).map(|r| r.as_slice())
    }
}

// Zero thickness yields a zero-area rect: it simply never matches.
fn band(x: i64, y: i64, w: i64, h: i64) -> Rect {
    let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    Rect::new(clamp(x), clamp(y), clamp(w.max(0)), clamp(h.max(0)))
}

/// Slots 0/1: horizontal bands along the window's top and bottom edges.
fn update_top_bottom_area(
    area: &Rect,
    top: i32,
    bottom: i32,
    margin: i32,
    rects: &mut [Rect; CHANGE_AREA_COUNT],
) {
    let (ax, ay, aw, ah) = (area.x as i64, area.y as i64, area.width as i64, area.height as i64);
    let m = margin as i64;
    rects[0] = band(ax - m, ay - m, aw + 2 * m, top as i64 + m);
    rects[1] = band(ax - m, ay + ah - bottom as i64, aw + 2 * m, bottom as i64 + m);
}

/// Slots 2/3: vertical bands along the window's left and right edges.
fn update_left_right_area(
    area: &Rect,
    left: i32,
    right: i32,
    margin: i32,
    rects: &mut [Rect; CHANGE_AREA_COUNT],
) {
    let (ax, ay, aw, ah) = (area.x as i64, area.y as i64, area.width as i64, area.height as i64);
    let m = margin as i64;
    rects[2] = band(ax - m, ay - m, left as i64 + m, ah + 2 * m);
    rects[3] = band(ax + aw - right as i64, ay - m, right as i64 + m, ah + 2 * m);
}

/// Slots 4..8: the four corner squares, sized by their corner thickness.
/// Corners are indexed after the edge bands so corner styles win the
/// last-match scan when a point sits in both.
fn update_inner_angle_area(
    area: &Rect,
    tl: i32,
    tr: i32,
    br: i32,
    bl: i32,
    margin: i32,
    rects: &mut [Rect; CHANGE_AREA_COUNT],
) {
    let (ax, ay, aw, ah) = (area.x as i64, area.y as i64, area.width as i64, area.height as i64);
    let m = margin as i64;
    // top-left / bottom-right share the nw-se diagonal
    rects[4] = band(ax - m, ay - m, tl as i64 + m, tl as i64 + m);
    rects[5] = band(
        ax + aw - br as i64,
        ay + ah - br as i64,
        br as i64 + m,
        br as i64 + m,
    );
    // top-right / bottom-left share the ne-sw diagonal
    rects[6] = band(ax + aw - tr as i64, ay - m, tr as i64 + m, tr as i64 + m);
    rects[7] = band(ax - m, ay + ah - bl as i64, bl as i64 + m, bl as i64 + m);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisplayGroupInfo;

    fn window_with_areas(id: WindowId, area: Rect, thickness: Vec<i32>) -> WindowInfo {
        WindowInfo {
            id,
            area,
            pointer_change_areas: thickness,
            ..Default::default()
        }
    }

    fn group(windows: Vec<WindowInfo>) -> DisplayGroupInfo {
        DisplayGroupInfo { windows, ..Default::default() }
    }

    // Uniform 8px edges and corners on a 100x100 window at (100, 100)
    fn uniform_index() -> HotAreaIndex {
        let mut index = HotAreaIndex::new();
        index.update(&group(vec![window_with_areas(
            1,
            Rect::new(100, 100, 100, 100),
            vec![8; 8],
        )]));
        index
    }

    #[test]
    fn negative_coordinates_never_hit() {
        let rects = vec![Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX)];
        assert!(!is_in_hot_area(-1, 50, &rects));
        assert!(!is_in_hot_area(50, -1, &rects));
        assert!(is_in_hot_area(50, 50, &rects));
    }

    #[test]
    fn union_containment() {
        let rects = vec![Rect::new(0, 0, 10, 10), Rect::new(100, 100, 10, 10)];
        assert!(is_in_hot_area(5, 5, &rects));
        assert!(is_in_hot_area(105, 105, &rects));
        assert!(!is_in_hot_area(50, 50, &rects));
    }

    #[test]
    fn edge_bands_map_to_resize_styles() {
        let index = uniform_index();
        // Top edge
        assert_eq!(
            index.select_pointer_change_area(1, 150, 103),
            Some(PointerStyleKind::SizeNorthSouth)
        );
        // Bottom edge
        assert_eq!(
            index.select_pointer_change_area(1, 150, 197),
            Some(PointerStyleKind::SizeNorthSouth)
        );
        // Left edge
        assert_eq!(
            index.select_pointer_change_area(1, 103, 150),
            Some(PointerStyleKind::SizeWestEast)
        );
        // Right edge
        assert_eq!(
            index.select_pointer_change_area(1, 197, 150),
            Some(PointerStyleKind::SizeWestEast)
        );
    }

    #[test]
    fn corners_win_over_edges() {
        let index = uniform_index();
        // (103,103) is in both the top band and the top-left corner; the
        // corner is scanned later, so last-wins picks the diagonal style
        assert_eq!(
            index.select_pointer_change_area(1, 103, 103),
            Some(PointerStyleKind::SizeNorthWestSouthEast)
        );
        assert_eq!(
            index.select_pointer_change_area(1, 197, 103),
            Some(PointerStyleKind::SizeNorthEastSouthWest)
        );
        assert_eq!(
            index.select_pointer_change_area(1, 197, 197),
            Some(PointerStyleKind::SizeNorthWestSouthEast)
        );
        assert_eq!(
            index.select_pointer_change_area(1, 103, 197),
            Some(PointerStyleKind::SizeNorthEastSouthWest)
        );
    }

    #[test]
    fn interior_misses_all_bands() {
        let index = uniform_index();
        assert_eq!(index.select_pointer_change_area(1, 150, 150), None);
    }

    #[test]
    fn unregistered_window_returns_none() {
        let index = uniform_index();
        assert_eq!(index.select_pointer_change_area(99, 150, 103), None);
        assert!(!index.has_window(99));
    }

    #[test]
    fn zero_thickness_never_matches() {
        let mut index = HotAreaIndex::new();
        index.update(&group(vec![window_with_areas(
            1,
            Rect::new(0, 0, 100, 100),
            vec![0; 8],
        )]));
        assert_eq!(index.select_pointer_change_area(1, 0, 0), None);
        assert_eq!(index.select_pointer_change_area(1, 99, 99), None);
    }

    #[test]
    fn short_thickness_list_is_skipped() {
        let mut index = HotAreaIndex::new();
        index.update(&group(vec![window_with_areas(
            1,
            Rect::new(0, 0, 100, 100),
            vec![8, 8, 8],
        )]));
        assert!(!index.has_window(1));
    }

    #[test]
    fn ninth_entry_expands_bands_outward() {
        let mut thickness = vec![8; 8];
        thickness.push(4); // 4px outward margin
        let mut index = HotAreaIndex::new();
        index.update(&group(vec![window_with_areas(
            1,
            Rect::new(100, 100, 100, 100),
            thickness,
        )]));
        // 2px outside the window's top edge still hits the top band
        assert_eq!(
            index.select_pointer_change_area(1, 150, 98),
            Some(PointerStyleKind::SizeNorthSouth)
        );
    }

    #[test]
    fn last_match_wins_across_stacked_lists() {
        // Two full slot sets concatenated bottom-to-top: the later (top)
        // window's style is returned for a point inside both
        let mut rects = vec![Rect::default(); 16];
        rects[0] = Rect::new(0, 0, 100, 8); // bottom window: top band
        rects[8 + 2] = Rect::new(0, 0, 8, 100); // top window: left band
        assert_eq!(
            in_which_hot_area(2, 2, &rects),
            Some(PointerStyleKind::SizeWestEast)
        );
    }

    #[test]
    fn ui_extension_areas_are_indexed() {
        let mut host = window_with_areas(1, Rect::new(0, 0, 200, 200), vec![8; 8]);
        host.ui_extensions = vec![window_with_areas(10, Rect::new(50, 50, 50, 50), vec![4; 8])];
        let mut index = HotAreaIndex::new();
        index.update(&group(vec![host]));
        assert!(index.has_window(10));
        assert_eq!(
            index.select_pointer_change_area(10, 75, 51),
            Some(PointerStyleKind::SizeNorthSouth)
        );
    }
}
