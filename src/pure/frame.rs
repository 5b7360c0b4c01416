//! Frame: the window-manager-owned decoration window that reparents exactly
//! one client, applies its size hints, and tracks focus-driven border state.
use crate::pure::{
    geometry::Rect,
    window::{SizeHints, Xid},
};

/// An RGB border color, stored as a packed value ready to hand to `XConn`,
/// matching the `Color` type used elsewhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor(pub u32);

/// A decoration window owning exactly one client as its content.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: Xid,
    pub content: Xid,
    pub bounds: Rect,
    pub border_width: u32,
    pub normal_color: BorderColor,
    pub focused_color: BorderColor,
    pub focused: bool,
}

impl Frame {
    pub fn new(id: Xid, content: Xid, normal_color: BorderColor, focused_color: BorderColor, border_width: u32) -> Self {
        Self {
            id,
            content,
            bounds: Rect::default(),
            border_width,
            normal_color,
            focused_color,
            focused: false,
        }
    }

    pub fn border_color(&self) -> BorderColor {
        if self.focused {
            self.focused_color
        } else {
            self.normal_color
        }
    }

    /// The rectangle available to the content window inside the frame once
    /// the border has been peeled off on every side.
    pub fn inner(&self) -> Rect {
        let b = self.border_width;
        Rect {
            x: self.bounds.x + b,
            y: self.bounds.y + b,
            w: self.bounds.w.saturating_sub(2 * b),
            h: self.bounds.h.saturating_sub(2 * b),
        }
    }

    /// Apply the content's size hints to compute its bounds within this
    /// frame: increment/min/max clamp, then center within the frame's inner
    /// rectangle if the hinted size is smaller than it.
    ///
    /// Aspect ratio adjustment is left unimplemented; the sizing rule applied
    /// here is increment/min/max clamp followed by centering, with no
    /// attempt to additionally preserve an aspect ratio hint.
    pub fn configure_content(&self, hints: &SizeHints, ignore_hints: bool) -> Rect {
        let inner = self.inner();
        if ignore_hints {
            return inner;
        }

        let (w, h) = hints.apply(inner.w, inner.h);
        let content = Rect::new(inner.x, inner.y, w.min(inner.w.max(w)), h.min(inner.h.max(h)));

        content.centered_in(&inner).unwrap_or(Rect::new(
            inner.x,
            inner.y,
            w.min(inner.w),
            h.min(inner.h),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_peels_border_on_every_side() {
        let mut f = Frame::new(Xid(1), Xid(2), BorderColor(0), BorderColor(0), 2);
        f.bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(f.inner(), Rect::new(2, 2, 96, 96));
    }

    #[test]
    fn configure_content_centers_when_smaller_than_frame() {
        let mut f = Frame::new(Xid(1), Xid(2), BorderColor(0), BorderColor(0), 0);
        f.bounds = Rect::new(0, 0, 200, 200);
        let hints = SizeHints {
            max: Some((100, 100)),
            ..Default::default()
        };

        let r = f.configure_content(&hints, false);
        assert_eq!(r, Rect::new(50, 50, 100, 100));
    }

    #[test]
    fn ignore_hints_skips_size_hint_application_entirely() {
        let mut f = Frame::new(Xid(1), Xid(2), BorderColor(0), BorderColor(0), 0);
        f.bounds = Rect::new(0, 0, 200, 200);
        let hints = SizeHints {
            max: Some((100, 100)),
            ..Default::default()
        };

        let r = f.configure_content(&hints, true);
        assert_eq!(r, Rect::new(0, 0, 200, 200));
    }
}
