//! The composable split/stack layout tree: maps a rectangle and an ordered
//! set of windows to per-window rectangles. See spec §4.6.
use crate::pure::{geometry::Rect, window::Xid};

/// Fixed-identity configuration for one [StackNode] inside a [Split].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    /// Name used as the persisted `lprops.stack` identity.
    pub name: String,
    /// The bigger the weight, the bigger the share of the split this stack
    /// gets when sizes are partitioned by weight.
    pub weight: u32,
    /// An absolute pixel width/height for this stack, if fixed.
    pub size: Option<u32>,
    /// Minimum pixel size used as a stand-in for `size` when computing
    /// whether pixel sizes can be honoured (step 2 of the allocation rule).
    pub min_size: u32,
    /// Capacity limit on the number of windows this stack will hold.
    pub limit: Option<usize>,
    /// Auto-placement priority; lower runs first. `None` means this stack is
    /// never chosen automatically (manual assignment only).
    pub priority: Option<u32>,
    /// `true`: render every window in the stack, tiled equally along `axis_vertical`.
    /// `false`: render only the top (most-recently-focused) window.
    pub tile: bool,
    /// The axis along which this stack's own windows are tiled when `tile`
    /// is set (independent of the owning [Split]'s axis).
    pub axis_vertical: bool,
}

impl StackSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1,
            size: None,
            min_size: 32,
            limit: None,
            priority: Some(100),
            tile: true,
            axis_vertical: true,
        }
    }

    pub fn weight(mut self, w: u32) -> Self {
        self.weight = w;
        self
    }

    pub fn size(mut self, px: u32) -> Self {
        self.size = Some(px);
        self
    }

    pub fn min_size(mut self, px: u32) -> Self {
        self.min_size = px;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn priority(mut self, p: Option<u32>) -> Self {
        self.priority = p;
        self
    }

    pub fn single_visible(mut self) -> Self {
        self.tile = false;
        self
    }
}

/// A leaf layout node: an ordered list of windows rendered single-visible or
/// equal-tiled, plus the rectangle the owning [Split] assigned to it.
#[derive(Debug, Clone)]
pub struct StackNode {
    pub spec: StackSpec,
    pub windows: Vec<Xid>,
    pub b: Rect,
}

impl StackNode {
    pub fn new(spec: StackSpec) -> Self {
        Self {
            spec,
            windows: Vec::new(),
            b: Rect::default(),
        }
    }

    pub fn empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn full(&self) -> bool {
        matches!(self.spec.limit, Some(n) if self.windows.len() >= n)
    }

    pub fn add(&mut self, w: Xid) {
        self.windows.push(w);
    }

    pub fn remove(&mut self, w: Xid) {
        self.windows.retain(|&x| x != w);
    }

    pub fn contains(&self, w: Xid) -> bool {
        self.windows.contains(&w)
    }

    /// The windows that should currently be mapped, in render order.
    pub fn visible(&self) -> &[Xid] {
        if self.spec.tile || self.windows.len() <= 1 {
            &self.windows
        } else {
            &self.windows[..1]
        }
    }

    /// Rotate the window order so the element after `w` becomes first.
    pub fn shift_up(&mut self, w: Xid) {
        let Some(idx) = self.windows.iter().position(|&x| x == w) else {
            return;
        };
        self.windows[idx..].rotate_left(1);
    }

    /// Rotate the window order so the element before `w` becomes first.
    pub fn shift_down(&mut self, w: Xid) {
        let Some(idx) = self.windows.iter().position(|&x| x == w) else {
            return;
        };
        self.windows[..=idx].rotate_right(1);
    }

    /// Evict the first window in the stack, returning it, so another window
    /// can take its place (used by cross-stack swaps when the target is full).
    pub fn evict_first(&mut self) -> Option<Xid> {
        if self.windows.is_empty() {
            None
        } else {
            Some(self.windows.remove(0))
        }
    }

    /// Assign per-window rectangles within `self.b` for this stack's current
    /// render mode.
    pub fn layout(&self) -> Vec<(Xid, Rect)> {
        let visible = self.visible();
        if visible.is_empty() {
            return Vec::new();
        }

        if !self.spec.tile {
            return vec![(visible[0], self.b)];
        }

        let n = visible.len() as u32;
        let mut out = Vec::with_capacity(visible.len());
        let total = if self.spec.axis_vertical { self.b.h } else { self.b.w };
        let mut start = 0u32;

        for (i, &w) in visible.iter().enumerate() {
            let end = ((i as u32 + 1) * total) / n;
            let r = if self.spec.axis_vertical {
                Rect::new(self.b.x, self.b.y + start, self.b.w, end - start)
            } else {
                Rect::new(self.b.x + start, self.b.y, end - start, self.b.h)
            };
            out.push((w, r));
            start = end;
        }

        out
    }
}

/// A vertical or horizontal partition of a rectangle into fixed-identity
/// stacks with weights, pixel sizes and min-sizes.
#[derive(Debug, Clone)]
pub struct Split {
    pub vertical: bool,
    pub fixed: bool,
    pub stacks: Vec<StackNode>,
    bounds: Rect,
}

impl Split {
    pub fn new(vertical: bool, fixed: bool, specs: Vec<StackSpec>) -> Self {
        Self {
            vertical,
            fixed,
            stacks: specs.into_iter().map(StackNode::new).collect(),
            bounds: Rect::default(),
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.assign_boxes();
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Space allocation within a Split, normative per spec §4.6.
    fn assign_boxes(&mut self) {
        let total = if self.vertical { self.bounds.w } else { self.bounds.h };

        let indices: Vec<usize> = if self.fixed {
            (0..self.stacks.len()).collect()
        } else {
            self.stacks
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.empty())
                .map(|(i, _)| i)
                .collect()
        };

        if indices.is_empty() {
            return;
        }

        let sum_size: u32 = indices
            .iter()
            .map(|&i| self.stacks[i].spec.size.unwrap_or(self.stacks[i].spec.min_size))
            .sum();
        let has_flexible = indices.iter().any(|&i| self.stacks[i].spec.size.is_none());

        let use_weights = sum_size > total || (!has_flexible && sum_size != total);

        let mut sizes = vec![0u32; indices.len()];

        if use_weights {
            let total_weight: u32 = indices.iter().map(|&i| self.stacks[i].spec.weight).sum();
            let mut cum = 0u32;
            let mut prev_cut = 0u32;
            for (n, &i) in indices.iter().enumerate() {
                cum += self.stacks[i].spec.weight;
                let cut = if n == indices.len() - 1 {
                    total
                } else if total_weight == 0 {
                    0
                } else {
                    (cum as u64 * total as u64 / total_weight as u64) as u32
                };
                sizes[n] = cut - prev_cut;
                prev_cut = cut;
            }
        } else {
            let fixed_total: u32 = indices
                .iter()
                .filter(|&&i| self.stacks[i].spec.size.is_some())
                .map(|&i| self.stacks[i].spec.size.unwrap())
                .sum();
            let remainder = total.saturating_sub(fixed_total);
            let flex_weight: u32 = indices
                .iter()
                .filter(|&&i| self.stacks[i].spec.size.is_none())
                .map(|&i| self.stacks[i].spec.weight)
                .sum();

            let mut cum = 0u32;
            let mut prev_cut = 0u32;
            let mut flex_seen = 0usize;
            let flex_count = indices.iter().filter(|&&i| self.stacks[i].spec.size.is_none()).count();

            for (n, &i) in indices.iter().enumerate() {
                let is_last = n == indices.len() - 1;
                match self.stacks[i].spec.size {
                    Some(size) => {
                        sizes[n] = size;
                    }
                    None => {
                        cum += self.stacks[i].spec.weight;
                        flex_seen += 1;
                        let cut = if flex_seen == flex_count || is_last {
                            remainder
                        } else if flex_weight == 0 {
                            0
                        } else {
                            (cum as u64 * remainder as u64 / flex_weight as u64) as u32
                        };
                        sizes[n] = cut - prev_cut;
                        prev_cut = cut;
                    }
                }
            }
        }

        let mut start = 0u32;
        for (n, &i) in indices.iter().enumerate() {
            let size = sizes[n];
            let r = if self.vertical {
                Rect::new(self.bounds.x + start, self.bounds.y, size, self.bounds.h)
            } else {
                Rect::new(self.bounds.x, self.bounds.y + start, self.bounds.w, size)
            };
            self.stacks[i].b = r;
            start += size;
        }
    }

    /// `add(window)` per spec §4.6: respect the window's recorded stack if it
    /// still exists and isn't full, otherwise walk auto-stacks in priority
    /// order and insert into the first non-full one. Returns `false` (caller
    /// treats the window as floating) if every eligible stack is full.
    pub fn add(&mut self, w: Xid, wanted_stack: Option<&str>) -> bool {
        if let Some(name) = wanted_stack {
            if let Some(s) = self.stacks.iter_mut().find(|s| s.spec.name == name) {
                if !s.full() {
                    s.add(w);
                    self.set_bounds(self.bounds);
                    return true;
                }
            }
        }

        let mut order: Vec<usize> = (0..self.stacks.len())
            .filter(|&i| self.stacks[i].spec.priority.is_some())
            .collect();
        order.sort_by_key(|&i| self.stacks[i].spec.priority.unwrap());

        for i in order {
            if !self.stacks[i].full() {
                self.stacks[i].add(w);
                self.set_bounds(self.bounds);
                return true;
            }
        }

        false
    }

    pub fn remove(&mut self, w: Xid) {
        for s in self.stacks.iter_mut() {
            if s.contains(w) {
                s.remove(w);
            }
        }
        self.set_bounds(self.bounds);
    }

    pub fn stack_of(&self, w: Xid) -> Option<&str> {
        self.stacks
            .iter()
            .find(|s| s.contains(w))
            .map(|s| s.spec.name.as_str())
    }

    pub fn all_windows(&self) -> Vec<Xid> {
        self.stacks.iter().flat_map(|s| s.windows.iter().copied()).collect()
    }

    pub fn layout(&self) -> Vec<(Xid, Rect)> {
        self.stacks.iter().flat_map(|s| s.layout()).collect()
    }

    fn stack_index(&self, w: Xid) -> Option<usize> {
        self.stacks.iter().position(|s| s.contains(w))
    }

    /// `shift_up`/`shift_down`: rotate the window order within `w`'s stack.
    pub fn shift_up(&mut self, w: Xid) {
        if let Some(i) = self.stack_index(w) {
            self.stacks[i].shift_up(w);
        }
    }

    pub fn shift_down(&mut self, w: Xid) {
        if let Some(i) = self.stack_index(w) {
            self.stacks[i].shift_down(w);
        }
    }

    /// Cross-stack motion along the split axis: swap `w` with the first
    /// window of the neighbouring stack, evicting that stack's first window
    /// back to `w`'s stack if the neighbour is full.
    pub fn swap_neighbor(&mut self, w: Xid, forward: bool) {
        let Some(i) = self.stack_index(w) else { return };
        let j = if forward {
            if i + 1 >= self.stacks.len() {
                return;
            }
            i + 1
        } else {
            if i == 0 {
                return;
            }
            i - 1
        };

        if !self.stacks[j].full() {
            self.stacks[i].remove(w);
            self.stacks[j].add(w);
        } else if let Some(evicted) = self.stacks[j].evict_first() {
            self.stacks[i].remove(w);
            self.stacks[j].add(w);
            self.stacks[i].add(evicted);
        }

        self.set_bounds(self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_a_priority_and_limit_auto_placement() {
        let mut split = Split::new(
            true,
            false,
            vec![
                StackSpec::new("left").weight(3).limit(1).priority(Some(0)),
                StackSpec::new("right"),
            ],
        );
        split.set_bounds(Rect::new(0, 0, 800, 600));

        let w1 = Xid(1);
        let w2 = Xid(2);
        let w3 = Xid(3);

        assert!(split.add(w1, None));
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w1], Rect::new(0, 0, 800, 600));

        assert!(split.add(w2, None));
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w1], Rect::new(0, 0, 600, 600));
        assert_eq!(boxes[&w2], Rect::new(600, 0, 200, 600));

        assert!(split.add(w3, None));
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w3], Rect::new(600, 300, 200, 300));
        assert_eq!(boxes[&w2], Rect::new(600, 0, 200, 300));
    }

    #[test]
    fn scenario_b_pixel_sizes_dropped_when_they_would_overflow() {
        let mut split = Split::new(
            true,
            false,
            vec![
                StackSpec::new("left").size(128).limit(1),
                StackSpec::new("right").weight(2).min_size(300),
            ],
        );
        split.set_bounds(Rect::new(0, 0, 800, 600));

        let w1 = Xid(1);
        let w2 = Xid(2);
        split.add(w1, None);
        split.add(w2, None);

        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w1], Rect::new(0, 0, 128, 600));
        assert_eq!(boxes[&w2], Rect::new(128, 0, 672, 600));

        split.set_bounds(Rect::new(0, 0, 400, 300));
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w1], Rect::new(0, 0, 133, 300));
        assert_eq!(boxes[&w2], Rect::new(133, 0, 267, 300));
    }

    #[test]
    fn scenario_c_pixel_only_split_falls_back_to_equal_weight() {
        let mut split = Split::new(
            true,
            false,
            vec![
                StackSpec::new("left").size(2).limit(1),
                StackSpec::new("right").size(3).limit(1),
            ],
        );
        split.set_bounds(Rect::new(0, 0, 800, 600));

        let w1 = Xid(1);
        let w2 = Xid(2);
        split.add(w1, None);
        split.add(w2, None);

        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&w1].w, 400);
        assert_eq!(boxes[&w2].w, 400);
    }

    #[test]
    fn full_stack_rejects_window_for_floating() {
        let mut split = Split::new(true, false, vec![StackSpec::new("only").limit(1)]);
        split.set_bounds(Rect::new(0, 0, 800, 600));

        assert!(split.add(Xid(1), None));
        assert!(!split.add(Xid(2), None));
    }

    #[test]
    fn property_2_children_tile_parent_exactly() {
        let mut split = Split::new(
            true,
            false,
            vec![
                StackSpec::new("a").weight(1).limit(1),
                StackSpec::new("b").weight(1).limit(1),
                StackSpec::new("c").weight(1).limit(1),
            ],
        );
        let total = Rect::new(0, 0, 797, 600);
        split.set_bounds(total);
        // two of these land nowhere (every stack is at capacity) and are left
        // for the caller to treat as floating; the tiling invariant must still
        // hold for whatever subset of stacks ends up populated.
        for id in [1, 2, 3, 4, 5] {
            split.add(Xid(id), None);
        }

        let sum_w: u32 = split.stacks.iter().map(|s| s.b.w).sum();
        assert_eq!(sum_w, total.w);

        let mut x = total.x;
        for s in &split.stacks {
            assert_eq!(s.b.x, x);
            x += s.b.w;
        }
    }

    #[test]
    fn remove_restores_the_other_stack_to_full_width() {
        let mut split = Split::new(
            true,
            false,
            vec![
                StackSpec::new("left").priority(Some(0)).limit(1),
                StackSpec::new("right"),
            ],
        );
        split.set_bounds(Rect::new(0, 0, 800, 600));
        split.add(Xid(1), None);
        split.add(Xid(2), None);

        split.remove(Xid(2));
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&Xid(1)], Rect::new(0, 0, 800, 600));
    }
}
