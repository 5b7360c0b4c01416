//! Key and pointer registries: key-spec parsing, lock-bit-insensitive
//! grabbing, and the pointer drag state machine for move/resize. See
//! spec §4.9.
use crate::{pure::geometry::Point, Error, Result};
use std::collections::HashMap;

/// The modifiers a key spec or mouse binding can name, per spec §4.9: `S`
/// shift, `C` control, `W` the "super" modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::EnumIter)]
pub enum ModifierKey {
    Shift,
    Control,
    Super,
}

impl ModifierKey {
    /// The raw X modifier bit this key contributes to a `modmask`.
    pub fn mask_bit(self) -> u16 {
        match self {
            ModifierKey::Shift => 1 << 0,
            ModifierKey::Control => 1 << 2,
            ModifierKey::Super => 1 << 6, // Mod4
        }
    }
}

impl TryFrom<char> for ModifierKey {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c {
            'S' => Ok(ModifierKey::Shift),
            'C' => Ok(ModifierKey::Control),
            'W' => Ok(ModifierKey::Super),
            other => Err(Error::InvalidKeySpec(format!("unknown modifier: {other}"))),
        }
    }
}

/// Lock-key bits that must be masked out of `event.state` before a binding
/// lookup, and crossed with every grabbed `modmask` so bindings survive lock
/// key state. Concretely: CapsLock, NumLock, ModeSwitch (and their
/// combinations).
pub const LOCK_MASK_BITS: [u16; 3] = [1 << 1, 1 << 4, 1 << 3];

pub fn lock_mask_combinations() -> Vec<u16> {
    let mut out = vec![0u16];
    for bit in LOCK_MASK_BITS {
        let mut next = out.clone();
        for m in &mut out {
            next.push(*m | bit);
        }
        out = next;
    }
    out
}

pub fn mask_ignoring_locks(state: u16) -> u16 {
    state & !LOCK_MASK_BITS.iter().fold(0, |acc, b| acc | b)
}

/// An X key code, as grabbed, with its required modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode {
    pub mask: u16,
    pub code: u8,
}

/// `(modmask, keysym)` parsed out of a `<mods-sym>` key spec, before keysym
/// lookup resolves it to a concrete [KeyCode].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub modmask: u16,
    pub keysym: u32,
}

/// Parse a key spec: `<mods-sym>` (e.g. `W-C-Return`) or a single character.
/// Mods are the `S`/`C`/`W` letters from spec §4.9, hyphen separated, with
/// the key name last.
pub fn parse_key_spec(spec: &str, keysym_from_name: impl Fn(&str) -> Option<u32>) -> Result<KeySpec> {
    if spec.chars().count() == 1 {
        let keysym = keysym_from_name(spec)
            .ok_or_else(|| Error::InvalidKeySpec(format!("unknown key name: {spec}")))?;
        return Ok(KeySpec { modmask: 0, keysym });
    }

    let parts: Vec<&str> = spec.split('-').collect();
    let (mods, name) = parts
        .split_last()
        .ok_or_else(|| Error::InvalidKeySpec(spec.to_string()))?;

    let mut modmask = 0u16;
    for part in name {
        let mut chars = part.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(Error::InvalidKeySpec(format!("bad modifier token: {part}")));
        };
        modmask |= ModifierKey::try_from(c)?.mask_bit();
    }

    let keysym = keysym_from_name(mods)
        .ok_or_else(|| Error::InvalidKeySpec(format!("unknown key name: {mods}")))?;

    Ok(KeySpec { modmask, keysym })
}

/// [parse_key_spec] wired up to [wm_keysyms::keysym_from_name], the keysym
/// source every real config uses; kept separate so the parser above stays
/// testable without the `keysyms` feature.
#[cfg(feature = "keysyms")]
pub fn parse_key_spec_default(spec: &str) -> Result<KeySpec> {
    parse_key_spec(spec, wm_keysyms::keysym_from_name)
}

/// Action invoked for a key binding.
pub type KeyHandler<X> = Box<dyn FnMut(&mut crate::core::WindowManager<X>) -> Result<()>>;

pub type KeyBindings<X> = HashMap<KeyCode, KeyHandler<X>>;

/// Known mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MouseState {
    pub button: MouseButton,
    pub modifiers: Vec<ModifierKey>,
}

impl MouseState {
    pub fn new(button: MouseButton, mut modifiers: Vec<ModifierKey>) -> Self {
        modifiers.sort();
        Self { button, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Motion,
}

#[derive(Debug, Clone)]
pub struct MouseEvent {
    pub id: crate::pure::Xid,
    pub root_pt: Point,
    pub event_pt: Point,
    pub state: MouseState,
    pub kind: MouseEventKind,
}

pub type MouseHandler<X> =
    Box<dyn FnMut(&mut crate::core::WindowManager<X>, &MouseEvent) -> Result<()>>;

pub type MouseBindings<X> = HashMap<(MouseEventKind, MouseState), MouseHandler<X>>;

/// Which corner/edge of the frame a resize drag pins, per spec §4.9's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    Move { offset: Point },
    ResizeBr { anchor: Point },
    ResizeTr { anchor: Point },
    ResizeBl { anchor: Point },
    ResizeTl { anchor: Point },
}

impl Drag {
    /// Pick a resize variant by which quadrant of `frame` the click landed
    /// in, per spec's "resize by the quadrant the click lands in".
    pub fn resize_for_click(frame: crate::pure::geometry::Rect, click: Point) -> Self {
        let mid_x = frame.x + frame.w / 2;
        let mid_y = frame.y + frame.h / 2;
        let right = click.x >= mid_x;
        let bottom = click.y >= mid_y;

        match (right, bottom) {
            (true, true) => Drag::ResizeBr {
                anchor: Point::new(frame.x, frame.y),
            },
            (true, false) => Drag::ResizeTr {
                anchor: Point::new(frame.x, frame.y + frame.h),
            },
            (false, true) => Drag::ResizeBl {
                anchor: Point::new(frame.x + frame.w, frame.y),
            },
            (false, false) => Drag::ResizeTl {
                anchor: Point::new(frame.x + frame.w, frame.y + frame.h),
            },
        }
    }

    /// Apply pointer motion to `frame`'s starting bounds, producing the new
    /// bounds for this drag kind.
    pub fn apply_motion(
        &self,
        start: crate::pure::geometry::Rect,
        pointer: Point,
    ) -> crate::pure::geometry::Rect {
        use crate::pure::geometry::Rect;
        match *self {
            Drag::Move { offset } => Rect::new(
                pointer.x.saturating_sub(offset.x),
                pointer.y.saturating_sub(offset.y),
                start.w,
                start.h,
            ),
            Drag::ResizeBr { anchor } => Rect::new(
                anchor.x,
                anchor.y,
                pointer.x.saturating_sub(anchor.x),
                pointer.y.saturating_sub(anchor.y),
            ),
            Drag::ResizeTr { anchor } => {
                let h = anchor.y.saturating_sub(pointer.y);
                Rect::new(anchor.x, pointer.y, pointer.x.saturating_sub(anchor.x), h)
            }
            Drag::ResizeBl { anchor } => {
                let w = anchor.x.saturating_sub(pointer.x);
                Rect::new(pointer.x, anchor.y, w, pointer.y.saturating_sub(anchor.y))
            }
            Drag::ResizeTl { anchor } => {
                let w = anchor.x.saturating_sub(pointer.x);
                let h = anchor.y.saturating_sub(pointer.y);
                Rect::new(pointer.x, pointer.y, w, h)
            }
        }
    }
}

/// State held across a move/resize drag: which client, its bounds when the
/// drag started, and the drag kind.
#[derive(Debug, Clone, Copy)]
pub struct DragState {
    pub client: crate::pure::Xid,
    pub start_bounds: crate::pure::geometry::Rect,
    pub drag: Drag,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<u32> {
        match name {
            "Return" => Some(0xff0d),
            "q" => Some(0x71),
            _ => None,
        }
    }

    #[test]
    fn parses_single_modifier_spec() {
        let spec = parse_key_spec("W-Return", lookup).unwrap();
        assert_eq!(spec.modmask, ModifierKey::Super.mask_bit());
        assert_eq!(spec.keysym, 0xff0d);
    }

    #[test]
    fn parses_stacked_modifier_spec() {
        let spec = parse_key_spec("W-S-q", lookup).unwrap();
        assert_eq!(
            spec.modmask,
            ModifierKey::Super.mask_bit() | ModifierKey::Shift.mask_bit()
        );
    }

    #[test]
    fn single_character_spec_has_no_modifiers() {
        let spec = parse_key_spec("q", lookup).unwrap();
        assert_eq!(spec.modmask, 0);
    }

    #[test]
    fn unknown_modifier_letter_is_rejected() {
        assert!(parse_key_spec("X-Return", lookup).is_err());
    }

    #[test]
    fn lock_mask_combinations_cover_every_bit_combination() {
        let combos = lock_mask_combinations();
        assert_eq!(combos.len(), 1 << LOCK_MASK_BITS.len());
        assert!(combos.contains(&0));
        assert!(combos.contains(&(LOCK_MASK_BITS[0] | LOCK_MASK_BITS[1] | LOCK_MASK_BITS[2])));
    }

    #[test]
    fn mask_ignoring_locks_strips_only_lock_bits() {
        let state = ModifierKey::Super.mask_bit() | LOCK_MASK_BITS[0];
        assert_eq!(mask_ignoring_locks(state), ModifierKey::Super.mask_bit());
    }

    #[test]
    fn resize_br_drag_grows_from_the_top_left_anchor() {
        use crate::pure::geometry::Rect;
        let frame = Rect::new(0, 0, 200, 200);
        let drag = Drag::resize_for_click(frame, Point::new(180, 180));
        assert!(matches!(drag, Drag::ResizeBr { .. }));

        let resized = drag.apply_motion(frame, Point::new(300, 250));
        assert_eq!(resized, Rect::new(0, 0, 300, 250));
    }

    /// A key grabbed at a plain modifier mask must still dispatch when the
    /// physical keypress arrives with NumLock also held: grabbing crosses
    /// every lock-bit combination onto the mask (see `x11rb::conn`), but the
    /// event's `KeyCode` is built by stripping those bits back out before the
    /// lookup, so the bindings table only ever needs the bare entry.
    #[test]
    fn numlock_active_keypress_still_resolves_the_plain_binding() {
        let code = 38u8; // arbitrary keycode, e.g. 'a'
        let bound_mask = ModifierKey::Super.mask_bit();

        let mut table = HashMap::new();
        table.insert(KeyCode { mask: bound_mask, code }, "focus-next");

        let numlock_bit = LOCK_MASK_BITS[1];
        let raw_event_state = bound_mask | numlock_bit;
        let looked_up = KeyCode {
            mask: mask_ignoring_locks(raw_event_state),
            code,
        };

        assert_eq!(table.get(&looked_up), Some(&"focus-next"));
    }

    #[test]
    fn move_drag_translates_frame_by_the_press_offset() {
        use crate::pure::geometry::Rect;
        let start = Rect::new(10, 10, 200, 200);
        let press = Point::new(100, 100);
        let offset = Point::new(press.x - start.x, press.y - start.y);
        let drag = Drag::Move { offset };

        let moved = drag.apply_motion(start, Point::new(150, 120));
        assert_eq!(moved, Rect::new(60, 30, 200, 200));
    }
}
