//! Group: a virtual desktop. Owns exactly one [Split] layout tree plus the
//! floating windows that sit above it. See spec §4.7.
use crate::pure::{layout::Split, window::Xid};

/// A virtual desktop.
///
/// `all_windows = tiled ⊎ floating` is maintained as an invariant by every
/// mutator below: a window is never present in both `layout` and
/// `floating_windows` at once.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub layout: Split,
    pub floating_windows: Vec<Xid>,
    pub visible: bool,
    pub urgent: Vec<Xid>,
}

impl Group {
    pub fn new(name: impl Into<String>, layout: Split) -> Self {
        Self {
            name: name.into(),
            layout,
            floating_windows: Vec::new(),
            visible: false,
            urgent: Vec::new(),
        }
    }

    pub fn all_windows(&self) -> Vec<Xid> {
        let mut all = self.layout.all_windows();
        all.extend(self.floating_windows.iter().copied());
        all
    }

    fn visible_tiled(&self) -> Vec<Xid> {
        self.layout
            .stacks
            .iter()
            .flat_map(|s| s.visible().iter().copied())
            .collect()
    }

    /// Add a window to the group: floating windows are appended to the
    /// floating list (restacked above the layout by the caller); tiled
    /// windows go through the Split's stack-assignment rule. If every
    /// eligible stack is full the window is demoted to floating instead, per
    /// spec §4.6's `add` contract ("caller treats window as floating").
    pub fn add_window(&mut self, w: Xid, floating: bool, wanted_stack: Option<&str>) {
        if floating {
            self.floating_windows.push(w);
            return;
        }

        if !self.layout.add(w, wanted_stack) {
            self.floating_windows.push(w);
        }
    }

    pub fn remove_window(&mut self, w: Xid) {
        self.layout.remove(w);
        self.floating_windows.retain(|&x| x != w);
        self.urgent.retain(|&x| x != w);
    }

    pub fn contains(&self, w: Xid) -> bool {
        self.layout.all_windows().contains(&w) || self.floating_windows.contains(&w)
    }

    pub fn is_floating(&self, w: Xid) -> bool {
        self.floating_windows.contains(&w)
    }

    /// The window that should receive input focus when this group becomes
    /// active: the first visible tiled window, else the first floating one.
    pub fn focus_target(&self) -> Option<Xid> {
        self.visible_tiled()
            .first()
            .copied()
            .or_else(|| self.floating_windows.first().copied())
    }

    /// `cmd_focus_next`/`cmd_focus_prev`: cycle through
    /// `visible_tiled ++ floating` with wrap-around relative to `current`.
    pub fn focus_next(&self, current: Xid) -> Option<Xid> {
        let order = self.focus_order();
        cycle(&order, current, 1)
    }

    pub fn focus_prev(&self, current: Xid) -> Option<Xid> {
        let order = self.focus_order();
        cycle(&order, current, -1)
    }

    fn focus_order(&self) -> Vec<Xid> {
        let mut order = self.visible_tiled();
        order.extend(self.floating_windows.iter().copied());
        order
    }

    /// `cmd_set_layout`: swap in a new layout tree and reinsert every
    /// non-floating window into it in its existing order.
    pub fn set_layout(&mut self, mut new_layout: Split) {
        new_layout.set_bounds(self.layout.bounds());
        for w in self.layout.all_windows() {
            new_layout.add(w, None);
        }
        self.layout = new_layout;
    }

    pub fn mark_urgent(&mut self, w: Xid) {
        if !self.urgent.contains(&w) {
            self.urgent.push(w);
        }
    }

    pub fn clear_urgent(&mut self, w: Xid) {
        self.urgent.retain(|&x| x != w);
    }
}

fn cycle(order: &[Xid], current: Xid, step: i64) -> Option<Xid> {
    if order.is_empty() {
        return None;
    }
    let Some(idx) = order.iter().position(|&x| x == current) else {
        return order.first().copied();
    };
    let len = order.len() as i64;
    let next = ((idx as i64 + step).rem_euclid(len)) as usize;
    Some(order[next])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::{geometry::Rect, layout::StackSpec};

    fn single_stack_split() -> Split {
        let mut s = Split::new(true, false, vec![StackSpec::new("main")]);
        s.set_bounds(Rect::new(0, 0, 800, 600));
        s
    }

    #[test]
    fn all_windows_is_the_disjoint_union_of_tiled_and_floating() {
        let mut g = Group::new("one", single_stack_split());
        g.add_window(Xid(1), false, None);
        g.add_window(Xid(2), true, None);

        let mut all = g.all_windows();
        all.sort();
        assert_eq!(all, vec![Xid(1), Xid(2)]);
        assert!(!g.is_floating(Xid(1)));
        assert!(g.is_floating(Xid(2)));
    }

    #[test]
    fn full_stack_demotes_new_window_to_floating() {
        let mut split = Split::new(true, false, vec![StackSpec::new("main").limit(1)]);
        split.set_bounds(Rect::new(0, 0, 800, 600));
        let mut g = Group::new("one", split);

        g.add_window(Xid(1), false, None);
        g.add_window(Xid(2), false, None);

        assert!(!g.is_floating(Xid(1)));
        assert!(g.is_floating(Xid(2)));
    }

    #[test]
    fn focus_target_prefers_tiled_over_floating() {
        let mut g = Group::new("one", single_stack_split());
        g.add_window(Xid(1), true, None);
        assert_eq!(g.focus_target(), Some(Xid(1)));

        g.add_window(Xid(2), false, None);
        assert_eq!(g.focus_target(), Some(Xid(2)));
    }

    #[test]
    fn focus_next_wraps_across_tiled_then_floating() {
        let mut g = Group::new("one", single_stack_split());
        g.add_window(Xid(1), false, None);
        g.add_window(Xid(2), false, None);
        g.add_window(Xid(3), true, None);

        assert_eq!(g.focus_next(Xid(1)), Some(Xid(2)));
        assert_eq!(g.focus_next(Xid(2)), Some(Xid(3)));
        assert_eq!(g.focus_next(Xid(3)), Some(Xid(1)));
        assert_eq!(g.focus_prev(Xid(1)), Some(Xid(3)));
    }

    #[test]
    fn set_layout_reinserts_tiled_windows_only() {
        let mut g = Group::new("one", single_stack_split());
        g.add_window(Xid(1), false, None);
        g.add_window(Xid(2), true, None);

        let mut replacement = Split::new(true, false, vec![StackSpec::new("main")]);
        replacement.set_bounds(Rect::new(0, 0, 800, 600));
        g.set_layout(replacement);

        assert!(g.layout.all_windows().contains(&Xid(1)));
        assert!(g.floating_windows.contains(&Xid(2)));
        assert!(!g.layout.all_windows().contains(&Xid(2)));
    }
}
