//! X11 keysym name/code tables, keyed for direct numeric lookup: the
//! parser in `core::bindings::parse_key_spec` just needs `name -> code`,
//! not a Rust variant per keysym.
//!
//! Printable ASCII (letters, digits, common punctuation, space) keysyms are
//! numerically identical to their Latin-1 codepoint by X11 convention, so
//! those resolve without a table lookup at all. Everything else (editing
//! keys, function keys, modifiers, the keypad) comes from the curated
//! [XKeySym] enum below, values taken from `X11/keysymdef.h`.
use strum::{AsRefStr, EnumIter, EnumString};

/// Named, non-ASCII X keysyms this crate's key grammar is expected to bind:
/// editing/navigation keys, function keys, modifiers and the numeric
/// keypad. Not the full `keysymdef.h` universe — see module docs.
#[allow(non_camel_case_types)]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum XKeySym {
    #[strum(serialize = "BackSpace")]
    XK_BackSpace = 0xff08,
    #[strum(serialize = "Tab")]
    XK_Tab = 0xff09,
    #[strum(serialize = "Return")]
    XK_Return = 0xff0d,
    #[strum(serialize = "Escape")]
    XK_Escape = 0xff1b,
    #[strum(serialize = "Delete")]
    XK_Delete = 0xffff,

    #[strum(serialize = "Home")]
    XK_Home = 0xff50,
    #[strum(serialize = "Left")]
    XK_Left = 0xff51,
    #[strum(serialize = "Up")]
    XK_Up = 0xff52,
    #[strum(serialize = "Right")]
    XK_Right = 0xff53,
    #[strum(serialize = "Down")]
    XK_Down = 0xff54,
    #[strum(serialize = "Page_Up")]
    XK_Page_Up = 0xff55,
    #[strum(serialize = "Page_Down")]
    XK_Page_Down = 0xff56,
    #[strum(serialize = "End")]
    XK_End = 0xff57,
    #[strum(serialize = "Insert")]
    XK_Insert = 0xff63,

    #[strum(serialize = "Shift_L")]
    XK_Shift_L = 0xffe1,
    #[strum(serialize = "Shift_R")]
    XK_Shift_R = 0xffe2,
    #[strum(serialize = "Control_L")]
    XK_Control_L = 0xffe3,
    #[strum(serialize = "Control_R")]
    XK_Control_R = 0xffe4,
    #[strum(serialize = "Caps_Lock")]
    XK_Caps_Lock = 0xffe5,
    #[strum(serialize = "Num_Lock")]
    XK_Num_Lock = 0xff7f,
    #[strum(serialize = "Alt_L")]
    XK_Alt_L = 0xffe9,
    #[strum(serialize = "Alt_R")]
    XK_Alt_R = 0xffea,
    #[strum(serialize = "Super_L")]
    XK_Super_L = 0xffeb,
    #[strum(serialize = "Super_R")]
    XK_Super_R = 0xffec,

    #[strum(serialize = "F1")]
    XK_F1 = 0xffbe,
    #[strum(serialize = "F2")]
    XK_F2 = 0xffbf,
    #[strum(serialize = "F3")]
    XK_F3 = 0xffc0,
    #[strum(serialize = "F4")]
    XK_F4 = 0xffc1,
    #[strum(serialize = "F5")]
    XK_F5 = 0xffc2,
    #[strum(serialize = "F6")]
    XK_F6 = 0xffc3,
    #[strum(serialize = "F7")]
    XK_F7 = 0xffc4,
    #[strum(serialize = "F8")]
    XK_F8 = 0xffc5,
    #[strum(serialize = "F9")]
    XK_F9 = 0xffc6,
    #[strum(serialize = "F10")]
    XK_F10 = 0xffc7,
    #[strum(serialize = "F11")]
    XK_F11 = 0xffc8,
    #[strum(serialize = "F12")]
    XK_F12 = 0xffc9,

    #[strum(serialize = "KP_Enter")]
    XK_KP_Enter = 0xff8d,
    #[strum(serialize = "KP_Home")]
    XK_KP_Home = 0xff95,
    #[strum(serialize = "KP_Left")]
    XK_KP_Left = 0xff96,
    #[strum(serialize = "KP_Up")]
    XK_KP_Up = 0xff97,
    #[strum(serialize = "KP_Right")]
    XK_KP_Right = 0xff98,
    #[strum(serialize = "KP_Down")]
    XK_KP_Down = 0xff99,
    #[strum(serialize = "KP_Page_Up")]
    XK_KP_Page_Up = 0xff9a,
    #[strum(serialize = "KP_Page_Down")]
    XK_KP_Page_Down = 0xff9b,
    #[strum(serialize = "KP_End")]
    XK_KP_End = 0xff9c,
    #[strum(serialize = "KP_Delete")]
    XK_KP_Delete = 0xff9f,

    #[strum(serialize = "Print")]
    XK_Print = 0xff61,
    #[strum(serialize = "Menu")]
    XK_Menu = 0xff67,
}

impl XKeySym {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Resolve a key spec component's name to its numeric X keysym, the
/// function `core::bindings::parse_key_spec` expects for its
/// `keysym_from_name` parameter.
///
/// Single printable-ASCII characters (`a`-`z`, `0`-`9`, punctuation, space)
/// resolve to their own codepoint without consulting [XKeySym] at all,
/// since X11 defines those keysyms to equal Latin-1.
pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_graphic() || c == ' ' {
            return Some(c as u32);
        }
    }

    use std::str::FromStr;
    XKeySym::from_str(name).ok().map(XKeySym::code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ascii_chars_resolve_to_their_own_codepoint() {
        assert_eq!(keysym_from_name("a"), Some(0x61));
        assert_eq!(keysym_from_name("q"), Some(0x71));
        assert_eq!(keysym_from_name("9"), Some(0x39));
    }

    #[test]
    fn named_keys_resolve_through_the_table() {
        assert_eq!(keysym_from_name("Return"), Some(0xff0d));
        assert_eq!(keysym_from_name("F1"), Some(0xffbe));
        assert_eq!(keysym_from_name("Super_L"), Some(0xffeb));
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        assert_eq!(keysym_from_name("NotAKey"), None);
    }
}
