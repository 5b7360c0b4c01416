//! Screen: a physical output as a rectangle with bar/slice reservations
//! peeled off in declaration order. See spec §4.4.
use crate::pure::geometry::Rect;

/// A fixed-height reservation peeled off the top or bottom of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub height: u32,
    pub visible: bool,
    pub rect: Rect,
}

impl Bar {
    pub fn new(height: u32) -> Self {
        Self {
            height,
            visible: true,
            rect: Rect::default(),
        }
    }
}

/// A fixed-width reservation peeled off the left or right of a screen, after
/// bars have claimed their space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub width: u32,
    pub visible: bool,
    pub rect: Rect,
}

impl Slice {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            visible: true,
            rect: Rect::default(),
        }
    }
}

/// A physical output. Starts with `outer == inner`; `set_bounds` recomputes
/// `inner` by peeling off each top bar, then bottom bar, then left slice,
/// then right slice, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    pub outer: Rect,
    pub inner: Rect,
    pub top_bars: Vec<Bar>,
    pub bottom_bars: Vec<Bar>,
    pub left_slices: Vec<Slice>,
    pub right_slices: Vec<Slice>,
    pub group: Option<usize>,
}

impl Screen {
    pub fn new(outer: Rect) -> Self {
        let mut s = Self {
            outer,
            inner: outer,
            top_bars: Vec::new(),
            bottom_bars: Vec::new(),
            left_slices: Vec::new(),
            right_slices: Vec::new(),
            group: None,
        };
        s.recompute();
        s
    }

    /// Recompute `inner` and every bar/slice rectangle from `outer` and the
    /// current visibility flags. Returns `true` if anything changed, so the
    /// caller can decide whether to emit `updated`.
    pub fn set_bounds(&mut self, outer: Rect) -> bool {
        let before = (self.outer, self.inner);
        self.outer = outer;
        self.recompute();
        before != (self.outer, self.inner)
    }

    pub fn toggle_top_bar(&mut self, idx: usize) -> bool {
        self.toggle(idx, true, true)
    }

    pub fn toggle_bottom_bar(&mut self, idx: usize) -> bool {
        self.toggle(idx, false, true)
    }

    pub fn toggle_left_slice(&mut self, idx: usize) -> bool {
        self.toggle(idx, true, false)
    }

    pub fn toggle_right_slice(&mut self, idx: usize) -> bool {
        self.toggle(idx, false, false)
    }

    fn toggle(&mut self, idx: usize, top_or_left: bool, is_bar: bool) -> bool {
        let visible = match (is_bar, top_or_left) {
            (true, true) => self.top_bars.get_mut(idx).map(|b| &mut b.visible),
            (true, false) => self.bottom_bars.get_mut(idx).map(|b| &mut b.visible),
            (false, true) => self.left_slices.get_mut(idx).map(|s| &mut s.visible),
            (false, false) => self.right_slices.get_mut(idx).map(|s| &mut s.visible),
        };
        let Some(visible) = visible else { return false };
        *visible = !*visible;
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let mut r = self.outer;

        for bar in self.top_bars.iter_mut() {
            if bar.visible {
                bar.rect = Rect::new(r.x, r.y, r.w, bar.height);
                r = Rect::new(r.x, r.y + bar.height, r.w, r.h.saturating_sub(bar.height));
            } else {
                bar.rect = Rect::default();
            }
        }

        for bar in self.bottom_bars.iter_mut() {
            if bar.visible {
                let y = r.y + r.h.saturating_sub(bar.height);
                bar.rect = Rect::new(r.x, y, r.w, bar.height);
                r = Rect::new(r.x, r.y, r.w, r.h.saturating_sub(bar.height));
            } else {
                bar.rect = Rect::default();
            }
        }

        for slice in self.left_slices.iter_mut() {
            if slice.visible {
                slice.rect = Rect::new(r.x, r.y, slice.width, r.h);
                r = Rect::new(r.x + slice.width, r.y, r.w.saturating_sub(slice.width), r.h);
            } else {
                slice.rect = Rect::default();
            }
        }

        for slice in self.right_slices.iter_mut() {
            if slice.visible {
                let x = r.x + r.w.saturating_sub(slice.width);
                slice.rect = Rect::new(x, r.y, slice.width, r.h);
                r = Rect::new(r.x, r.y, r.w.saturating_sub(slice.width), r.h);
            } else {
                slice.rect = Rect::default();
            }
        }

        self.inner = r;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_and_slices_peel_in_declaration_order() {
        let mut s = Screen::new(Rect::new(0, 0, 1000, 800));
        s.top_bars.push(Bar::new(20));
        s.bottom_bars.push(Bar::new(30));
        s.left_slices.push(Slice::new(50));
        s.right_slices.push(Slice::new(40));
        s.set_bounds(Rect::new(0, 0, 1000, 800));

        assert_eq!(s.top_bars[0].rect, Rect::new(0, 0, 1000, 20));
        assert_eq!(s.bottom_bars[0].rect, Rect::new(0, 750, 1000, 30));
        assert_eq!(s.left_slices[0].rect, Rect::new(0, 20, 50, 750));
        assert_eq!(s.right_slices[0].rect, Rect::new(910, 20, 40, 750));
        assert_eq!(s.inner, Rect::new(50, 20, 860, 750));
    }

    #[test]
    fn toggling_a_bar_returns_its_space_to_inner() {
        let mut s = Screen::new(Rect::new(0, 0, 800, 600));
        s.top_bars.push(Bar::new(20));
        s.set_bounds(Rect::new(0, 0, 800, 600));
        assert_eq!(s.inner, Rect::new(0, 20, 800, 580));

        s.toggle_top_bar(0);
        assert_eq!(s.inner, Rect::new(0, 0, 800, 600));
        assert_eq!(s.top_bars[0].rect, Rect::default());

        s.toggle_top_bar(0);
        assert_eq!(s.inner, Rect::new(0, 20, 800, 580));
    }

    #[test]
    fn outer_equals_inner_with_no_reservations() {
        let s = Screen::new(Rect::new(0, 0, 640, 480));
        assert_eq!(s.outer, s.inner);
    }
}
