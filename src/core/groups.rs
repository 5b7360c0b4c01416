//! Group manager: virtual desktops, their binding to screens, and the
//! commands that move windows and focus between them. See spec §4.7.
use crate::{
    core::{commands::CommandRegistry, event_bus::EventBus, screens::ScreenManager},
    pure::{group::Group, layout::Split, Xid},
};

pub struct GroupManager {
    pub groups: Vec<Group>,
    /// Index into `groups` of the group currently holding the focus tuple in
    /// the command registry — not necessarily the group on the active
    /// screen under the pointer, but the one the key/mouse bindings target.
    pub focused: usize,
}

impl GroupManager {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups, focused: 0 }
    }

    /// Startup binding: the first `min(groups, screens)` groups, in order,
    /// are bound to screens in order; the first bound group becomes the
    /// initial focus.
    pub fn bind_startup(&mut self, screens: &mut ScreenManager) {
        let n = self.groups.len().min(screens.screens.len());
        for i in 0..n {
            screens.bind(i, Some(i));
            self.groups[i].visible = true;
        }
        if n > 0 {
            self.focused = 0;
        }
    }

    /// `add_window`: choose the target group — `lprops_group` if it names a
    /// valid group, else the currently focused group, else the first
    /// screen's current group — add the window there, and return the index
    /// so the caller can persist it back to `window.lprops.group`.
    pub fn add_window(
        &mut self,
        w: Xid,
        lprops_group: Option<usize>,
        floating: bool,
        wanted_stack: Option<&str>,
        screens: &ScreenManager,
    ) -> usize {
        let target = lprops_group
            .filter(|&i| i < self.groups.len())
            .unwrap_or_else(|| {
                if self.focused < self.groups.len() {
                    self.focused
                } else {
                    screens
                        .screens
                        .first()
                        .and_then(|s| s.group)
                        .unwrap_or(0)
                }
            });

        self.groups[target].add_window(w, floating, wanted_stack);
        target
    }

    /// `cmd_switch(name)`: if `target` is already visible on some screen,
    /// swap the two groups' screen bindings (keeps both visible, pager
    /// style); otherwise hide the current group on `on_screen` and bind
    /// `target` there. Always updates the focus tuple and emits
    /// `group_changed`.
    pub fn cmd_switch(
        &mut self,
        target: usize,
        on_screen: usize,
        screens: &mut ScreenManager,
        registry: &mut CommandRegistry,
        bus: &mut EventBus,
    ) {
        if let Some(other_screen) = screens.screen_for_group(target) {
            let current = screens.group_on_screen(on_screen);
            screens.bind(other_screen, current);
            screens.bind(on_screen, Some(target));
        } else {
            if let Some(current) = screens.group_on_screen(on_screen) {
                self.groups[current].visible = false;
            }
            screens.bind(on_screen, Some(target));
        }

        self.groups[target].visible = true;
        self.focused = target;
        let _ = registry; // registry tuple update is owned by core/mod.rs's State, which holds the live (group, layout, screen) slots
        bus.emit("group_changed", &[self.groups[target].name.clone()]);
    }

    /// `cmd_move_window_to(name)`: move the focused window's group
    /// assignment, hiding it on the old group and adding it to the new one.
    pub fn cmd_move_window_to(&mut self, w: Xid, from: usize, to: usize) {
        if from == to {
            return;
        }
        let floating = self.groups[from].is_floating(w);
        self.groups[from].remove_window(w);
        self.groups[to].add_window(w, floating, None);
    }

    pub fn cmd_set_layout(&mut self, group: usize, new_layout: Split) {
        self.groups[group].set_layout(new_layout);
    }

    pub fn group_of(&self, w: Xid) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::{geometry::Rect, layout::StackSpec};

    fn group(name: &str) -> Group {
        let mut split = Split::new(true, false, vec![StackSpec::new("main")]);
        split.set_bounds(Rect::new(0, 0, 800, 600));
        Group::new(name, split)
    }

    #[test]
    fn startup_binds_min_of_groups_and_screens() {
        let mut screens = ScreenManager::new(vec![Rect::new(0, 0, 800, 600)]);
        let mut mgr = GroupManager::new(vec![group("one"), group("two"), group("three")]);
        mgr.bind_startup(&mut screens);

        assert_eq!(screens.group_on_screen(0), Some(0));
        assert_eq!(mgr.focused, 0);
        assert!(mgr.groups[0].visible);
        assert!(!mgr.groups[1].visible);
    }

    #[test]
    fn add_window_prefers_lprops_group_then_focused_then_first_screen() {
        let screens = ScreenManager::new(vec![Rect::new(0, 0, 800, 600)]);
        let mut mgr = GroupManager::new(vec![group("one"), group("two")]);
        mgr.focused = 1;

        let assigned = mgr.add_window(Xid(1), Some(0), false, None, &screens);
        assert_eq!(assigned, 0);

        let assigned = mgr.add_window(Xid(2), None, false, None, &screens);
        assert_eq!(assigned, 1);
    }

    #[test]
    fn cmd_switch_swaps_bindings_when_target_already_visible() {
        let mut screens = ScreenManager::new(vec![Rect::new(0, 0, 800, 600), Rect::new(800, 0, 800, 600)]);
        let mut mgr = GroupManager::new(vec![group("one"), group("two")]);
        mgr.bind_startup(&mut screens);
        screens.bind(1, Some(1));
        mgr.groups[1].visible = true;

        let mut registry = CommandRegistry::new();
        let mut bus = EventBus::new();
        bus.declare("group_changed", false);

        mgr.cmd_switch(1, 0, &mut screens, &mut registry, &mut bus);

        assert_eq!(screens.group_on_screen(0), Some(1));
        assert_eq!(screens.group_on_screen(1), Some(0));
    }

    #[test]
    fn move_window_to_transfers_group_membership() {
        let mut mgr = GroupManager::new(vec![group("one"), group("two")]);
        mgr.groups[0].add_window(Xid(5), false, None);

        mgr.cmd_move_window_to(Xid(5), 0, 1);

        assert!(!mgr.groups[0].contains(Xid(5)));
        assert!(mgr.groups[1].contains(Xid(5)));
    }
}
