//! Overlay UI: override-redirect popups driven by a keyboard grab rather
//! than the ordinary passive key bindings, for the launcher, window finder
//! and rename dialog. [`tabs`] is the odd one out: a persistent per-screen
//! sidebar rather than a popup, so it skips [`TextField`] and the grab
//! entirely.
//!
//! A gadget's toggle key still needs to reach us as an ordinary
//! [`tilewm::x::XEvent::KeyPress`], which only happens for passively
//! grabbed keycodes. Register a harmless stub in the binding table for it
//! ([`register_toggle_key`]) and let the gadget's own composed event hook,
//! which runs before normal key dispatch, do the actual show/hide.
use tilewm::{
    core::{
        bindings::{KeyBindings, KeyCode},
        State,
    },
    x::XConn,
    Result,
};

pub mod finder;
pub mod menu;
pub mod rename;
pub mod tabs;

pub use finder::Finder;
pub use menu::Menu;
pub use rename::RenameDialog;
pub use tabs::Tabs;

/// Ensure `code` is included in the engine's passive key grab, without
/// binding any actual behavior to it. Popup gadgets rely on this: the real
/// show/hide/text-entry logic lives in their event hook, which runs ahead
/// of normal key binding dispatch.
pub fn register_toggle_key<X: XConn + 'static>(bindings: &mut KeyBindings<X>, code: KeyCode) {
    bindings.entry(code).or_insert_with(|| Box::new(|_| Ok(())));
}

/// X11 keysyms this module's [TextField] needs to recognise by name. Over
/// the printable-ASCII range a keysym is numerically identical to the
/// Latin-1 codepoint, so only the non-printing editing keys need a table.
mod keysym {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const DELETE: u32 = 0xffff;
    pub const LEFT: u32 = 0xff51;
    pub const RIGHT: u32 = 0xff53;
    pub const HOME: u32 = 0xff50;
    pub const END: u32 = 0xff57;
}

/// What a [TextField] did with a keysym handed to [`TextField::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    /// The field's value or cursor changed; the gadget should re-filter
    /// and redraw.
    Changed,
    /// `Return` was pressed: the gadget should act on the current value.
    Submit,
    /// `Escape` was pressed: the gadget should close without acting.
    Cancel,
    /// The keysym meant nothing to the field.
    Ignored,
}

/// A single-line, cursor-aware text input, the one piece every popup
/// gadget in this module shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value: String = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Feed one resolved `(keysym, char)` pair (see
    /// [`tilewm::x::XConn::keysym_for_keycode`]) to the field.
    pub fn handle_key(&mut self, sym: u32) -> FieldEvent {
        match sym {
            keysym::RETURN => FieldEvent::Submit,
            keysym::ESCAPE => FieldEvent::Cancel,
            keysym::BACKSPACE => {
                if self.cursor > 0 {
                    let idx = self.byte_index(self.cursor - 1);
                    self.value.remove(idx);
                    self.cursor -= 1;
                    FieldEvent::Changed
                } else {
                    FieldEvent::Ignored
                }
            }
            keysym::DELETE => {
                if self.cursor < self.value.chars().count() {
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                    FieldEvent::Changed
                } else {
                    FieldEvent::Ignored
                }
            }
            keysym::LEFT => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    FieldEvent::Changed
                } else {
                    FieldEvent::Ignored
                }
            }
            keysym::RIGHT => {
                if self.cursor < self.value.chars().count() {
                    self.cursor += 1;
                    FieldEvent::Changed
                } else {
                    FieldEvent::Ignored
                }
            }
            keysym::HOME => {
                self.cursor = 0;
                FieldEvent::Changed
            }
            keysym::END => {
                self.cursor = self.value.chars().count();
                FieldEvent::Changed
            }
            keysym::TAB => FieldEvent::Ignored,
            // Printable Latin-1/ASCII: the keysym value is the codepoint.
            0x20..=0x7e => {
                let ch = char::from_u32(sym).unwrap_or(' ');
                let idx = self.byte_index(self.cursor);
                self.value.insert(idx, ch);
                self.cursor += 1;
                FieldEvent::Changed
            }
            _ => FieldEvent::Ignored,
        }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.value.len())
    }
}

/// Case-insensitive substring filter shared by the menu and finder
/// gadgets: every candidate whose lowercased form contains the
/// lowercased query, case preserved in the returned items.
pub(crate) fn filter_contains<'a>(query: &str, items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let q = query.to_lowercase();
    items.filter(|s| s.to_lowercase().contains(&q)).cloned().collect()
}

#[allow(unused_variables)]
pub(crate) fn screen_rect_for_focus<X: XConn>(state: &State<X>) -> tilewm::pure::geometry::Rect {
    state
        .screens
        .screens
        .get(state.screens.screen_for_group(state.groups.focused).unwrap_or(0))
        .map(|s| s.outer)
        .unwrap_or(tilewm::pure::geometry::Rect::new(0, 0, 800, 600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_inserts_at_cursor() {
        let mut f = TextField::new();
        assert_eq!(f.handle_key('a' as u32), FieldEvent::Changed);
        assert_eq!(f.handle_key('b' as u32), FieldEvent::Changed);
        assert_eq!(f.value(), "ab");
        assert_eq!(f.cursor(), 2);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut f = TextField::with_value("abc");
        f.handle_key(keysym::LEFT);
        f.handle_key(keysym::BACKSPACE);
        assert_eq!(f.value(), "ac");
        assert_eq!(f.cursor(), 1);
    }

    #[test]
    fn backspace_on_empty_field_is_ignored() {
        let mut f = TextField::new();
        assert_eq!(f.handle_key(keysym::BACKSPACE), FieldEvent::Ignored);
    }

    #[test]
    fn return_and_escape_are_reported_without_mutating() {
        let mut f = TextField::with_value("x");
        assert_eq!(f.handle_key(keysym::RETURN), FieldEvent::Submit);
        assert_eq!(f.handle_key(keysym::ESCAPE), FieldEvent::Cancel);
        assert_eq!(f.value(), "x");
    }

    #[test]
    fn filter_contains_is_case_insensitive() {
        let items = vec!["Firefox".to_string(), "firefox-bin".to_string(), "Alacritty".to_string()];
        let matches = filter_contains("FIRE", items.iter());
        assert_eq!(matches, vec!["Firefox", "firefox-bin"]);
    }
}
