//! Per-client window state: the three coexisting geometry records, decoded
//! ICCCM/EWMH properties, size hints, icons and layout-properties.
use crate::pure::geometry::Rect;
use std::collections::HashMap;

/// An X window id. Newtype so that client ids, frame ids and atom ids can't be
/// confused with one another at the type level.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}

/// Window gravity as carried in `WM_NORMAL_HINTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
    Static,
}

/// ICCCM `WM_NORMAL_HINTS`: min/max/base/increment/aspect/gravity.
///
/// Fields are `None` when the corresponding flag bit was absent from the
/// property so that application order (§4.5) can distinguish "not set" from
/// "set to zero".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub min: Option<(u32, u32)>,
    pub max: Option<(u32, u32)>,
    pub base: Option<(u32, u32)>,
    pub inc: Option<(u32, u32)>,
    pub aspect: Option<((u32, u32), (u32, u32))>,
    pub gravity: Option<Gravity>,
}

impl SizeHints {
    /// Apply increment-snap, base/min clamp and max clamp to a requested size,
    /// in the normative order from spec §4.5:
    ///   1. snap to `inc` using `base` (or `min` if base is absent) as the origin
    ///   2. clamp to `max`
    ///   3. (aspect ratio: left to the caller — see `Frame::configure_content`)
    pub fn apply(&self, w: u32, h: u32) -> (u32, u32) {
        let (base_w, base_h) = self.base.or(self.min).unwrap_or((0, 0));
        let (inc_w, inc_h) = self.inc.unwrap_or((1, 1));

        let snap = |size: u32, base: u32, inc: u32| -> u32 {
            if inc == 0 || size < base {
                return size.max(base);
            }
            base + ((size - base) / inc) * inc
        };

        let mut w = snap(w, base_w, inc_w.max(1));
        let mut h = snap(h, base_h, inc_h.max(1));

        if let Some((min_w, min_h)) = self.min {
            w = w.max(min_w);
            h = h.max(min_h);
        }
        if let Some((max_w, max_h)) = self.max {
            if max_w > 0 {
                w = w.min(max_w);
            }
            if max_h > 0 {
                h = h.min(max_h);
            }
        }

        (w, h)
    }
}

/// A single decoded icon frame from `_NET_WM_ICON`: width, height and
/// alpha-premultiplied ARGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub w: u32,
    pub h: u32,
    pub pixels: Vec<u32>,
}

/// Decode a flat `_NET_WM_ICON` property (`[w, h, w*h pixels, w, h, ...]`) into
/// icons sorted smallest-first, premultiplying alpha as we go.
pub fn decode_icons(raw: &[u32]) -> Vec<Icon> {
    let mut icons = Vec::new();
    let mut i = 0;

    while i + 2 <= raw.len() {
        let w = raw[i];
        let h = raw[i + 1];
        let n = (w as usize) * (h as usize);
        let start = i + 2;
        let end = start + n;
        if w == 0 || h == 0 || end > raw.len() {
            break;
        }

        let pixels = raw[start..end].iter().map(|&argb| premultiply(argb)).collect();
        icons.push(Icon { w, h, pixels });
        i = end;
    }

    icons.sort_by_key(|icon| icon.w * icon.h);
    icons
}

fn premultiply(argb: u32) -> u32 {
    let a = (argb >> 24) & 0xff;
    let r = (argb >> 16) & 0xff;
    let g = (argb >> 8) & 0xff;
    let b = argb & 0xff;

    let mul = |c: u32| (c * a) / 255;

    (a << 24) | (mul(r) << 16) | (mul(g) << 8) | mul(b)
}

/// Layout-relevant attributes that persist across a property round trip
/// (`_TN_LP_*`) so that a manager restart can recover window placement.
///
/// Setting any field here is expected to also schedule a property write; the
/// small explicit setters replace the source's dynamic attribute interception
/// (see DESIGN.md / spec §9).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutProps {
    pub floating: bool,
    pub ignore_hints: bool,
    pub group: Option<usize>,
    pub stack: Option<String>,
    pub name: Option<String>,
}

impl LayoutProps {
    pub fn clear(&mut self) {
        *self = LayoutProps::default();
    }
}

/// The three geometry records a managed [Window] tracks, per spec §3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    /// What the client last asked for via `ConfigureRequest`.
    pub want: Rect,
    /// What we last told X to apply (layout-derived size included).
    pub done: Rect,
    /// What X last confirmed via a configure/map notification.
    pub real: Rect,
}

/// A managed client window.
#[derive(Debug, Clone)]
pub struct Window {
    pub id: Xid,
    pub geometry: Geometry,
    pub props: HashMap<String, String>,
    pub hints: SizeHints,
    pub icons: Vec<Icon>,
    pub lprops: LayoutProps,
    pub protocols: Vec<String>,
    pub frame: Option<Xid>,
    pub group: Option<usize>,
    pub visible: bool,
    pub has_focus: bool,
}

impl Window {
    pub fn new(id: Xid) -> Self {
        Self {
            id,
            geometry: Geometry::default(),
            props: HashMap::new(),
            hints: SizeHints::default(),
            icons: Vec::new(),
            lprops: LayoutProps::default(),
            protocols: Vec::new(),
            frame: None,
            group: None,
            visible: false,
            has_focus: false,
        }
    }

    pub fn supports(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }

    /// Ordered class list for the classifier: the full `WM_CLASS` instance/class
    /// tokens plus every successive dash-prefix, so `gimp-2.8` also yields `gimp`.
    pub fn class_tokens(&self) -> Vec<String> {
        let raw = self.props.get("WM_CLASS").cloned().unwrap_or_default();
        let mut tokens = Vec::new();

        for name in raw.split('\0') {
            if name.is_empty() {
                continue;
            }
            let mut current = name.to_string();
            tokens.push(current.clone());
            while let Some(idx) = current.rfind('-') {
                current.truncate(idx);
                if current.is_empty() {
                    break;
                }
                tokens.push(current.clone());
            }
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_tokens_yields_dash_prefixes() {
        let mut w = Window::new(Xid(1));
        w.props
            .insert("WM_CLASS".into(), "gimp-2.8\0Gimp\0".into());

        let tokens = w.class_tokens();
        assert!(tokens.contains(&"gimp-2.8".to_string()));
        assert!(tokens.contains(&"gimp".to_string()));
        assert!(tokens.contains(&"Gimp".to_string()));
    }

    #[test]
    fn size_hints_snap_then_clamp() {
        let hints = SizeHints {
            base: Some((10, 10)),
            inc: Some((10, 10)),
            max: Some((100, 100)),
            ..Default::default()
        };

        // 55 snaps down to the nearest increment above base: 10 + floor((55-10)/10)*10 = 50
        assert_eq!(hints.apply(55, 55), (50, 50));
        // clamps to max even if the increment snap would exceed it
        assert_eq!(hints.apply(500, 500), (100, 100));
    }

    #[test]
    fn decode_icons_sorts_smallest_first() {
        let raw = vec![2, 1, 0xffffffff, 0xffffffff, 1, 1, 0x80ff0000];
        let icons = decode_icons(&raw);
        assert_eq!(icons.len(), 2);
        assert_eq!((icons[0].w, icons[0].h), (1, 1));
        assert_eq!((icons[1].w, icons[1].h), (2, 1));
    }
}
