//! Decoded X window property values and the ICCCM hint structs they carry.
use crate::pure::window::{Gravity, SizeHints};
use bitflags::bitflags;

/// A decoded property value, tagged by its X type.
#[derive(Debug, PartialEq, Clone)]
pub enum Prop {
    Atom(Vec<String>),
    Bytes(Vec<u32>),
    Cardinal(u32),
    Utf8String(Vec<String>),
    Window(Vec<crate::pure::Xid>),
    WmHints(WmHints),
    WmNormalHints(SizeHints),
}

bitflags! {
    /// Flags set in a `WM_HINTS` client property.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WmHintsFlags: u32 {
        const INPUT_HINT         = 0b0000000001;
        const STATE_HINT         = 0b0000000010;
        const ICON_PIXMAP_HINT   = 0b0000000100;
        const ICON_WINDOW_HINT   = 0b0000001000;
        const ICON_POSITION_HINT = 0b0000010000;
        const ICON_MASK_HINT     = 0b0000100000;
        const WINDOW_GROUP_HINT  = 0b0001000000;
        const URGENCY_HINT       = 0b0100000000;
    }
}

bitflags! {
    /// Flags set in a `WM_NORMAL_HINTS` client property, determining which
    /// fields of [SizeHints] are actually populated.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WmNormalHintsFlags: u32 {
        const U_POSITION    = 0b0000000001;
        const U_SIZE        = 0b0000000010;
        const P_POSITION    = 0b0000000100;
        const P_SIZE        = 0b0000001000;
        const P_MIN_SIZE    = 0b0000010000;
        const P_MAX_SIZE    = 0b0000100000;
        const P_RESIZE_INC  = 0b0001000000;
        const P_ASPECT      = 0b0010000000;
        const P_BASE_SIZE   = 0b0100000000;
        const P_WIN_GRAVITY = 0b1000000000;
    }
}

/// `WM_STATE` values an ICCCM client window can be in.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WindowState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WindowState {
    /// The wire-format `(state, icon_window)` pair spec §4.10 writes for
    /// `WM_STATE`.
    pub fn to_wire(self) -> (u32, u32) {
        let state = match self {
            WindowState::Withdrawn => 0,
            WindowState::Normal => 1,
            WindowState::Iconic => 3,
        };
        (state, 0) // None as icon window
    }
}

/// Whether a window is currently mapped, as reported by `GetWindowAttributes`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MapState {
    Unmapped,
    UnViewable,
    Viewable,
}

/// Whether a window can receive input, as reported by `GetWindowAttributes`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WindowClass {
    CopyFromParent,
    InputOutput,
    InputOnly,
}

/// The subset of `GetWindowAttributes` this engine inspects when deciding
/// whether a just-created window should be managed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub override_redirect: bool,
    pub map_state: MapState,
    pub window_class: WindowClass,
}

impl WindowAttributes {
    pub fn new(override_redirect: bool, map_state: MapState, window_class: WindowClass) -> Self {
        Self {
            override_redirect,
            map_state,
            window_class,
        }
    }

    /// Windows with override-redirect set (menus, tooltips, drag images) or
    /// that are input-only are never managed, per spec §4.1.
    pub fn should_manage(&self) -> bool {
        !self.override_redirect && self.window_class != WindowClass::InputOnly
    }
}

/// `WM_HINTS`: urgency and requested initial mapping state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmHints {
    pub flags: WmHintsFlags,
    pub accepts_input: bool,
    pub initial_state: WindowState,
}

impl WmHints {
    pub fn is_urgent(&self) -> bool {
        self.flags.contains(WmHintsFlags::URGENCY_HINT)
    }
}

/// Decode a raw `WM_NORMAL_HINTS` property (18 `u32`s per ICCCM) into
/// [SizeHints], honouring the flags word to distinguish "unset" from "zero".
pub fn decode_wm_normal_hints(raw: &[u32]) -> SizeHints {
    if raw.len() < 18 {
        return SizeHints::default();
    }

    let flags = WmNormalHintsFlags::from_bits_truncate(raw[0]);
    let mut hints = SizeHints::default();

    if flags.contains(WmNormalHintsFlags::P_MIN_SIZE) {
        hints.min = Some((raw[5], raw[6]));
    }
    if flags.contains(WmNormalHintsFlags::P_MAX_SIZE) {
        hints.max = Some((raw[7], raw[8]));
    }
    if flags.contains(WmNormalHintsFlags::P_RESIZE_INC) {
        hints.inc = Some((raw[9], raw[10]));
    }
    if flags.contains(WmNormalHintsFlags::P_ASPECT) {
        hints.aspect = Some(((raw[11], raw[12]), (raw[13], raw[14])));
    }
    if flags.contains(WmNormalHintsFlags::P_BASE_SIZE) {
        hints.base = Some((raw[15], raw[16]));
    }
    if flags.contains(WmNormalHintsFlags::P_WIN_GRAVITY) {
        hints.gravity = Some(decode_gravity(raw[17]));
    }

    hints
}

/// Decode a raw `WM_HINTS` property (9 `u32`s per ICCCM) into [WmHints].
pub fn decode_wm_hints(raw: &[u32]) -> Option<WmHints> {
    if raw.len() < 3 {
        return None;
    }

    let flags = WmHintsFlags::from_bits_truncate(raw[0]);
    let accepts_input = !flags.contains(WmHintsFlags::INPUT_HINT) || raw[1] != 0;
    let initial_state = if flags.contains(WmHintsFlags::STATE_HINT) {
        match raw[2] {
            3 => WindowState::Iconic,
            1 => WindowState::Normal,
            _ => WindowState::Withdrawn,
        }
    } else {
        WindowState::Normal
    };

    Some(WmHints { flags, accepts_input, initial_state })
}

fn decode_gravity(raw: u32) -> Gravity {
    match raw {
        1 => Gravity::NorthWest,
        2 => Gravity::North,
        3 => Gravity::NorthEast,
        4 => Gravity::West,
        5 => Gravity::Center,
        6 => Gravity::East,
        7 => Gravity::SouthWest,
        8 => Gravity::South,
        9 => Gravity::SouthEast,
        10 => Gravity::Static,
        _ => Gravity::NorthWest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_wm_normal_hints_respects_flag_bits() {
        let mut raw = vec![0u32; 18];
        raw[0] = WmNormalHintsFlags::P_MIN_SIZE.bits() | WmNormalHintsFlags::P_MAX_SIZE.bits();
        raw[5] = 100;
        raw[6] = 50;
        raw[7] = 800;
        raw[8] = 600;

        let hints = decode_wm_normal_hints(&raw);
        assert_eq!(hints.min, Some((100, 50)));
        assert_eq!(hints.max, Some((800, 600)));
        assert_eq!(hints.inc, None);
    }

    #[test]
    fn normal_state_wire_encoding_has_no_icon_window() {
        assert_eq!(WindowState::Normal.to_wire(), (1, 0));
        assert_eq!(WindowState::Withdrawn.to_wire(), (0, 0));
    }

    #[test]
    fn decode_wm_hints_reads_urgency_and_initial_state() {
        let mut raw = vec![0u32; 9];
        raw[0] = (WmHintsFlags::URGENCY_HINT | WmHintsFlags::STATE_HINT).bits();
        raw[2] = 3; // IconicState

        let hints = decode_wm_hints(&raw).unwrap();
        assert!(hints.is_urgent());
        assert_eq!(hints.initial_state, WindowState::Iconic);
    }
}
