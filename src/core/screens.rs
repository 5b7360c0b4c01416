//! Screen manager: the ordered list of physical outputs. See spec §4.4.
use crate::{
    core::event_bus::EventBus,
    pure::{geometry::Rect, screen::Screen},
};

/// Holds an ordered list of [Screen]s and fans out `updated` whenever any of
/// them changes shape or reservation visibility.
#[derive(Debug, Default)]
pub struct ScreenManager {
    pub screens: Vec<Screen>,
}

impl ScreenManager {
    pub fn new(outer_rects: Vec<Rect>) -> Self {
        Self {
            screens: outer_rects.into_iter().map(Screen::new).collect(),
        }
    }

    /// Replace the screen geometry wholesale (e.g. after a RandR
    /// reconfiguration) and emit `updated` if anything changed. Screens
    /// beyond the new count are dropped; their bound groups are the caller's
    /// responsibility to reassign (`GroupManager::reassign_orphaned`).
    pub fn set_bounds(&mut self, outer_rects: Vec<Rect>, bus: &mut EventBus) {
        let mut changed = outer_rects.len() != self.screens.len();

        for (i, rect) in outer_rects.iter().enumerate() {
            if let Some(screen) = self.screens.get_mut(i) {
                changed |= screen.set_bounds(*rect);
            } else {
                self.screens.push(Screen::new(*rect));
                changed = true;
            }
        }
        self.screens.truncate(outer_rects.len());

        if changed {
            bus.emit("updated", &[]);
        }
    }

    pub fn toggle_top_bar(&mut self, screen: usize, idx: usize, bus: &mut EventBus) {
        if let Some(s) = self.screens.get_mut(screen) {
            if s.toggle_top_bar(idx) {
                bus.emit("updated", &[]);
            }
        }
    }

    pub fn toggle_left_slice(&mut self, screen: usize, idx: usize, bus: &mut EventBus) {
        if let Some(s) = self.screens.get_mut(screen) {
            if s.toggle_left_slice(idx) {
                bus.emit("updated", &[]);
            }
        }
    }

    pub fn screen_for_group(&self, group: usize) -> Option<usize> {
        self.screens.iter().position(|s| s.group == Some(group))
    }

    pub fn group_on_screen(&self, screen: usize) -> Option<usize> {
        self.screens.get(screen).and_then(|s| s.group)
    }

    pub fn bind(&mut self, screen: usize, group: Option<usize>) {
        if let Some(s) = self.screens.get_mut(screen) {
            s.group = group;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bounds_emits_updated_only_on_change() {
        let mut bus = EventBus::new();
        bus.declare("updated", false);
        let fired = std::rc::Rc::new(std::cell::RefCell::new(0));
        let f = fired.clone();
        bus.on("updated", Box::new(move |_| *f.borrow_mut() += 1));

        let mut mgr = ScreenManager::new(vec![Rect::new(0, 0, 800, 600)]);
        mgr.set_bounds(vec![Rect::new(0, 0, 800, 600)], &mut bus);
        assert_eq!(*fired.borrow(), 0);

        mgr.set_bounds(vec![Rect::new(0, 0, 1024, 768)], &mut bus);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn screen_for_group_finds_the_bound_screen() {
        let mut mgr = ScreenManager::new(vec![Rect::new(0, 0, 800, 600), Rect::new(800, 0, 800, 600)]);
        mgr.bind(1, Some(3));
        assert_eq!(mgr.screen_for_group(3), Some(1));
        assert_eq!(mgr.screen_for_group(9), None);
    }
}
