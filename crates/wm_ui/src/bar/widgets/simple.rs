//! The focused window's title, dwm-bar style.
use crate::{
    bar::widgets::{Text, Widget},
    core::Context,
    Result, TextStyle,
};
use tilewm::{
    core::State,
    pure::geometry::Rect,
    x::{Atom, XConn, XConnExt, XEvent},
};

/// A text widget showing the title of the currently focused window,
/// truncated to `max_chars`.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveWindowName {
    inner: Text,
    max_chars: usize,
}

impl ActiveWindowName {
    /// `max_chars` is clamped to at least 3 (room for the `...` suffix).
    pub fn new(max_chars: usize, style: TextStyle, is_greedy: bool) -> Self {
        Self {
            inner: Text::new("", style, is_greedy, false),
            max_chars: max_chars.max(3),
        }
    }

    fn set_text(&mut self, txt: &str) {
        if txt.chars().count() <= self.max_chars {
            self.inner.set_text(txt);
        } else {
            let truncated: String = txt.chars().take(self.max_chars - 3).collect();
            self.inner.set_text(format!("{truncated}..."));
        }
    }
}

impl<X: XConn> Widget<X> for ActiveWindowName {
    fn draw(&mut self, ctx: &mut Context<'_>, s: usize, focus: bool, w: u32, h: u32) -> Result<()> {
        if focus {
            Widget::<X>::draw(&mut self.inner, ctx, s, focus, w, h)
        } else {
            ctx.fill_bg(Rect::new(0, 0, w, h))
        }
    }

    fn current_extent(&mut self, ctx: &mut Context<'_>, h: u32) -> Result<(u32, u32)> {
        Widget::<X>::current_extent(&mut self.inner, ctx, h)
    }

    fn require_draw(&self) -> bool {
        Widget::<X>::require_draw(&self.inner)
    }

    fn is_greedy(&self) -> bool {
        Widget::<X>::is_greedy(&self.inner)
    }

    fn on_refresh(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        match state.focused_client() {
            Some(id) => {
                let title = x.window_title(id)?;
                self.set_text(&title);
            }
            None => self.set_text(""),
        }

        Ok(())
    }

    fn on_event(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<()> {
        let name_props = [Atom::NetWmName.as_ref(), Atom::WmName.as_ref()];

        let Some(focused) = state.focused_client() else {
            return Ok(());
        };

        if let XEvent::PropertyNotify(p) = event {
            if p.id == focused && name_props.contains(&p.atom.as_str()) {
                self.set_text(&x.window_title(p.id)?);
            }
        }

        Ok(())
    }
}
