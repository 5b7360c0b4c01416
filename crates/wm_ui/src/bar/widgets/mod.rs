//! Self-rendering building blocks for the status bar's text widgets.
use crate::{core::Context, Result, TextStyle};
use tilewm::{
    core::State,
    pure::geometry::Rect,
    x::{XConn, XEvent},
    Color,
};

mod simple;
mod workspaces;

pub use simple::ActiveWindowName;
pub use workspaces::Workspaces;

/// A status bar widget that can be rendered using a [Context].
pub trait Widget<X>
where
    X: XConn,
{
    /// Render the current state of the widget into its allotted `w x h`
    /// slice of the bar, at the context's current x offset.
    fn draw(&mut self, ctx: &mut Context<'_>, screen: usize, screen_has_focus: bool, w: u32, h: u32) -> Result<()>;

    /// The width and height this widget currently needs, given its content.
    fn current_extent(&mut self, ctx: &mut Context<'_>, h: u32) -> Result<(u32, u32)>;

    /// Whether this widget needs to be redrawn (reset by a successful `draw`).
    fn require_draw(&self) -> bool;

    /// Greedy widgets expand to fill left-over space after layout; space is
    /// split evenly when more than one widget is greedy.
    fn is_greedy(&self) -> bool;

    #[allow(unused_variables)]
    fn on_startup(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        Ok(())
    }

    #[allow(unused_variables)]
    fn on_event(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<()> {
        Ok(())
    }

    #[allow(unused_variables)]
    fn on_refresh(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        Ok(())
    }

    #[allow(unused_variables)]
    fn on_new_client(&mut self, id: tilewm::Xid, state: &mut State<X>, x: &X) -> Result<()> {
        Ok(())
    }
}

/// A simple single-color-of-text label, the base every text widget in this
/// module builds on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Text {
    txt: String,
    fg: Color,
    bg: Option<Color>,
    padding: (u32, u32),
    is_greedy: bool,
    right_justified: bool,
    extent: Option<(u32, u32)>,
    require_draw: bool,
}

impl Text {
    pub(crate) fn new(txt: impl Into<String>, style: TextStyle, is_greedy: bool, right_justified: bool) -> Self {
        Self {
            txt: txt.into(),
            fg: style.fg,
            bg: style.bg,
            padding: style.padding,
            is_greedy,
            right_justified,
            extent: None,
            require_draw: true,
        }
    }

    pub(crate) fn set_text(&mut self, txt: impl Into<String>) {
        let next = txt.into();
        if self.txt != next {
            self.txt = next;
            self.extent = None;
            self.require_draw = true;
        }
    }
}

impl<X: XConn> Widget<X> for Text {
    fn draw(&mut self, ctx: &mut Context<'_>, _screen: usize, _focus: bool, w: u32, h: u32) -> Result<()> {
        if let Some(bg) = self.bg {
            ctx.fill_rect(Rect::new(0, 0, w, h), bg)?;
        }

        let (ew, _) = <Self as Widget<X>>::current_extent(self, ctx, h)?;
        let offset = w as i32 - ew as i32;

        if self.right_justified && self.is_greedy && offset > 0 {
            ctx.translate(offset, 0);
            ctx.draw_text(&self.txt, self.padding, self.fg)?;
            ctx.translate(-offset, 0);
        } else {
            ctx.draw_text(&self.txt, self.padding, self.fg)?;
        }

        self.require_draw = false;
        Ok(())
    }

    fn current_extent(&mut self, ctx: &mut Context<'_>, _h: u32) -> Result<(u32, u32)> {
        match self.extent {
            Some(e) => Ok(e),
            None => {
                let (l, r) = self.padding;
                let (w, h) = ctx.extent(&self.txt)?;
                let e = (w + l + r, h);
                self.extent = Some(e);
                Ok(e)
            }
        }
    }

    fn require_draw(&self) -> bool {
        self.require_draw
    }

    fn is_greedy(&self) -> bool {
        self.is_greedy
    }
}
