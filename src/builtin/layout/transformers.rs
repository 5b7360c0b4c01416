//! Plain rectangle transforms applied around a [Split][crate::pure::layout::Split]'s
//! computed layout: shrink the usable area before tiling (gaps, reserved
//! bars), or reflect window positions afterward.
use crate::{pure::geometry::Rect, Xid};

/// Reflect a set of computed window positions horizontally within `r`.
pub fn reflect_horizontal(r: Rect, positions: Vec<(Xid, Rect)>) -> Vec<(Xid, Rect)> {
    let mid = r.x + r.w / 2;

    positions
        .into_iter()
        .map(|(id, mut r)| {
            r.x = if r.x <= mid {
                2 * (mid - r.x) - r.w
            } else {
                2 * mid - r.x - r.w
            };

            (id, r)
        })
        .collect()
}

/// Reflect a set of computed window positions vertically within `r`.
pub fn reflect_vertical(r: Rect, positions: Vec<(Xid, Rect)>) -> Vec<(Xid, Rect)> {
    let mid = r.y + r.h / 2;

    positions
        .into_iter()
        .map(|(id, mut r)| {
            r.y = if r.y <= mid {
                2 * (mid - r.y) - r.h
            } else {
                2 * mid - r.y - r.h
            };

            (id, r)
        })
        .collect()
}

fn shrink(r: Rect, px: u32) -> Rect {
    if r.w == 0 || r.h == 0 {
        return r;
    }

    Rect {
        x: r.x + px,
        y: r.y + px,
        w: r.w.saturating_sub(2 * px),
        h: r.h.saturating_sub(2 * px),
    }
}

/// Shrink the bounds handed to a [Split] by `outer_px` on every edge before
/// calling `set_bounds`, leaving a gap around the screen.
pub fn gaps_outer(r: Rect, outer_px: u32) -> Rect {
    shrink(r, outer_px)
}

/// Shrink each window's computed rectangle by `inner_px`, leaving a gap
/// between tiled windows. Apply to the output of [Split::layout][crate::pure::layout::Split::layout].
pub fn gaps_inner(positions: Vec<(Xid, Rect)>, inner_px: u32) -> Vec<(Xid, Rect)> {
    positions.into_iter().map(|(id, r)| (id, shrink(r, inner_px))).collect()
}

/// Reserve `px` pixels at the top of the bounds handed to a [Split], typically
/// to leave room for a status bar.
pub fn reserve_top(mut r: Rect, px: u32) -> Rect {
    if r.w == 0 || r.h == 0 {
        return r;
    }

    r.y += px;
    r.h = r.h.saturating_sub(px);

    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(Rect::new(0, 0, 100, 200), Rect::new(0, 0, 100, 200); "fullscreen is idempotent")]
    #[test_case(Rect::new(0, 0, 40, 100), Rect::new(60, 0, 40, 100); "not crossing midpoint left")]
    #[test_case(Rect::new(60, 0, 40, 100), Rect::new(0, 0, 40, 100); "not crossing midpoint right")]
    #[test_case(Rect::new(0, 0, 60, 100), Rect::new(40, 0, 60, 100); "crossing midpoint")]
    #[test_case(Rect::new(0, 0, 50, 100), Rect::new(50, 0, 50, 100); "on midpoint")]
    #[test]
    fn reflect_horizontal_works(original: Rect, expected: Rect) {
        let r = Rect::new(0, 0, 100, 200);
        let transformed = reflect_horizontal(r, vec![(Xid(1), original)]);

        assert_eq!(transformed, vec![(Xid(1), expected)]);
    }

    #[test_case(Rect::new(0, 0, 100, 200), Rect::new(0, 0, 100, 200); "fullscreen is idempotent")]
    #[test_case(Rect::new(0, 0, 50, 80), Rect::new(0, 120, 50, 80); "not crossing midpoint above")]
    #[test_case(Rect::new(0, 120, 50, 80), Rect::new(0, 0, 50, 80); "not crossing midpoint below")]
    #[test_case(Rect::new(0, 0, 50, 120), Rect::new(0, 80, 50, 120); "crossing midpoint")]
    #[test_case(Rect::new(0, 0, 50, 100), Rect::new(0, 100, 50, 100); "on midpoint")]
    #[test]
    fn reflect_vertical_works(original: Rect, expected: Rect) {
        let r = Rect::new(0, 0, 100, 200);
        let transformed = reflect_vertical(r, vec![(Xid(1), original)]);

        assert_eq!(transformed, vec![(Xid(1), expected)]);
    }

    #[test]
    fn gaps_outer_then_inner_leaves_consistent_spacing() {
        let bounds = gaps_outer(Rect::new(0, 0, 100, 100), 5);
        assert_eq!(bounds, Rect::new(5, 5, 90, 90));

        let positions = gaps_inner(vec![(Xid(1), bounds)], 5);
        assert_eq!(positions, vec![(Xid(1), Rect::new(10, 10, 80, 80))]);
    }

    #[test]
    fn reserve_top_shrinks_height_and_shifts_down() {
        let r = reserve_top(Rect::new(0, 0, 800, 600), 20);
        assert_eq!(r, Rect::new(0, 20, 800, 580));
    }
}
