//! A group indicator for the status bar: one block of text per group, lit
//! up when occupied or when it is the screen's focused group.
use crate::{bar::widgets::Widget, core::Context, Result, TextStyle};
use tilewm::{core::State, pure::geometry::Rect, x::XConn, Color};

const PADDING: u32 = 6;

#[derive(Clone, Debug, PartialEq)]
struct GroupMeta {
    name: String,
    occupied: bool,
    extent: Option<(u32, u32)>,
}

/// A simple group indicator for a status bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Workspaces {
    groups: Vec<GroupMeta>,
    focused: usize,
    fg_occupied: Color,
    fg_empty: Color,
    bg_highlight: Color,
    bg: Color,
    require_draw: bool,
}

impl Workspaces {
    pub fn new(style: TextStyle, highlight: impl Into<Color>, empty_fg: impl Into<Color>) -> Self {
        Self {
            groups: vec![],
            focused: 0,
            fg_occupied: style.fg,
            fg_empty: empty_fg.into(),
            bg_highlight: highlight.into(),
            bg: style.bg.unwrap_or_else(|| 0x000000.into()),
            require_draw: true,
        }
    }

    fn update_from_state<X: XConn>(&mut self, state: &State<X>) {
        let next: Vec<GroupMeta> = state
            .groups
            .groups
            .iter()
            .map(|g| GroupMeta {
                name: g.name.clone(),
                occupied: !g.all_windows().is_empty(),
                extent: None,
            })
            .collect();

        if next != self.groups {
            self.groups = next;
            self.require_draw = true;
        }

        if self.focused != state.groups.focused {
            self.focused = state.groups.focused;
            self.require_draw = true;
        }
    }
}

impl<X: XConn> Widget<X> for Workspaces {
    fn draw(&mut self, ctx: &mut Context<'_>, _screen: usize, _focus: bool, w: u32, h: u32) -> Result<()> {
        ctx.fill_rect(Rect::new(0, 0, w, h), self.bg)?;

        let mut x = 0;
        for (i, g) in self.groups.iter().enumerate() {
            let (gw, _) = g.extent.unwrap_or((0, 0));
            let fg = if g.occupied { self.fg_occupied } else { self.fg_empty };

            if i == self.focused {
                ctx.fill_rect(Rect::new(x, 0, gw, h), self.bg_highlight)?;
            }

            ctx.translate(x as i32, 0);
            ctx.draw_text(&g.name, (PADDING, PADDING), fg)?;
            ctx.translate(-(x as i32), 0);
            x += gw;
        }

        self.require_draw = false;
        Ok(())
    }

    fn current_extent(&mut self, ctx: &mut Context<'_>, _h: u32) -> Result<(u32, u32)> {
        let mut total_w = 0;
        let mut max_h = 0;

        for g in self.groups.iter_mut() {
            let e = match g.extent {
                Some(e) => e,
                None => {
                    let (w, h) = ctx.extent(&g.name)?;
                    let e = (w + 2 * PADDING, h);
                    g.extent = Some(e);
                    e
                }
            };

            total_w += e.0;
            max_h = max_h.max(e.1);
        }

        Ok((total_w, max_h))
    }

    fn require_draw(&self) -> bool {
        self.require_draw
    }

    fn is_greedy(&self) -> bool {
        false
    }

    fn on_startup(&mut self, state: &mut State<X>, _x: &X) -> Result<()> {
        self.update_from_state(state);
        Ok(())
    }

    fn on_refresh(&mut self, state: &mut State<X>, _x: &X) -> Result<()> {
        self.update_from_state(state);
        Ok(())
    }
}
