//! A lightweight, configurable status bar: one window per screen, each
//! rendering a row of [`widgets::Widget`]s left to right.
use crate::{
    core::{Context, Draw},
    Result,
};
use std::fmt;
use tilewm::{
    core::State,
    pure::geometry::Rect,
    x::{Atom, Prop, WinType, XConn, XEvent},
    Color, Xid,
};
use tracing::{debug, error, info};

pub mod widgets;

use widgets::Widget;

/// Which edge of the screen a bar is pinned to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Position {
    Top,
    Bottom,
}

pub struct StatusBar<X: XConn> {
    draw: Draw,
    position: Position,
    widgets: Vec<Box<dyn Widget<X>>>,
    screens: Vec<(Xid, f64)>,
    hpx: u32,
    h: f64,
    bg: Color,
    active_screen: usize,
}

impl<X: XConn> fmt::Debug for StatusBar<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBar")
            .field("position", &self.position)
            .field("n_widgets", &self.widgets.len())
            .field("screens", &self.screens)
            .field("hpx", &self.hpx)
            .field("bg", &self.bg)
            .field("active_screen", &self.active_screen)
            .finish()
    }
}

impl<X: XConn> StatusBar<X> {
    /// Build a new, empty status bar. Windows for each screen are only
    /// created once [startup_hook] runs, at which point the backing
    /// [XConn] is live.
    pub fn try_new(
        position: Position,
        h: u32,
        bg: impl Into<Color>,
        font: &str,
        widgets: Vec<Box<dyn Widget<X>>>,
    ) -> Result<Self> {
        let draw = Draw::new(font)?;

        Ok(Self {
            draw,
            position,
            widgets,
            screens: vec![],
            hpx: h,
            h: h as f64,
            bg: bg.into(),
            active_screen: 0,
        })
    }

    /// Wire this bar into `state`'s lifecycle hooks. Consumes `self` and
    /// hands it to `state` as an extension the hooks then look up.
    pub fn add_to(self, state: &mut State<X>)
    where
        X: 'static,
    {
        state.add_extension(self);
        state.config.compose_or_set_event_hook(event_hook);
        state.config.compose_or_set_manage_hook(manage_hook);
        state.config.compose_or_set_refresh_hook(refresh_hook);
        state.config.compose_or_set_startup_hook(startup_hook);
    }

    fn init_for_screens(&mut self, x: &X) -> Result<()> {
        info!("creating one status bar window per screen");
        let rects = x.screen_details()?;

        self.screens = rects
            .iter()
            .map(|&Rect { x: sx, y: sy, w, h }| {
                let y = match self.position {
                    Position::Top => sy,
                    Position::Bottom => sy + h - self.hpx,
                };

                let id = self
                    .draw
                    .new_window(x, WinType::InputOutput(Atom::NetWindowTypeDock), Rect::new(sx, y, w, self.hpx), false)?;

                debug!(%id, "tagging status bar window");
                for atom in [Atom::NetWmName, Atom::WmName, Atom::WmClass] {
                    x.set_prop(id, atom.as_ref(), Prop::Utf8String(vec!["tilewm-bar".into()]))?;
                }

                self.draw.flush(id)?;
                Ok((id, w as f64))
            })
            .collect::<Result<Vec<(Xid, f64)>>>()?;

        Ok(())
    }

    /// Re-render every widget on every screen's bar window.
    pub fn redraw(&mut self) -> Result<()> {
        for (i, &(id, w)) in self.screens.clone().iter().enumerate() {
            let screen_has_focus = self.active_screen == i;
            let mut ctx = self.draw.context_for(id)?;

            ctx.set_bg(self.bg);
            ctx.clear()?;

            let extents = self.layout(&mut ctx, w)?;
            let mut x_off = 0.0;
            for (wd, (wpx, _)) in self.widgets.iter_mut().zip(extents) {
                ctx.set_x_offset(x_off as i32);
                wd.draw(&mut ctx, i, screen_has_focus, wpx as u32, self.hpx)?;
                x_off += wpx;
            }

            ctx.flush();
            self.draw.flush(id)?;
        }

        Ok(())
    }

    fn layout(&mut self, ctx: &mut Context<'_>, w: f64) -> Result<Vec<(f64, f64)>> {
        let mut extents = Vec::with_capacity(self.widgets.len());
        let mut greedy = vec![];

        for (i, wd) in self.widgets.iter_mut().enumerate() {
            let (wpx, hpx) = wd.current_extent(ctx, self.hpx)?;
            extents.push((wpx as f64, hpx as f64));
            if wd.is_greedy() {
                greedy.push(i);
            }
        }

        let total: f64 = extents.iter().map(|(wpx, _)| wpx).sum();
        if total < w && !greedy.is_empty() {
            let per_greedy = (w - total) / greedy.len() as f64;
            for i in greedy {
                extents[i].0 += per_greedy;
            }
        }

        Ok(extents)
    }

    fn redraw_if_needed(&mut self) -> Result<()> {
        if self.widgets.iter().any(|w| w.require_draw()) {
            self.redraw()?;
        }
        Ok(())
    }
}

fn startup_hook<X: XConn + 'static>(state: &mut State<X>, x: &X) -> tilewm::Result<()> {
    let ext = state.extension::<StatusBar<X>>()?;
    let mut bar = ext.borrow_mut();

    if let Err(e) = bar.init_for_screens(x) {
        error!(%e, "unable to create status bar windows");
        return Ok(());
    }

    for w in bar.widgets.iter_mut() {
        if let Err(e) = w.on_startup(state, x) {
            error!(%e, "error running widget startup hook");
        }
    }

    if let Err(e) = bar.redraw() {
        error!(%e, "error redrawing status bar");
    }

    Ok(())
}

fn refresh_hook<X: XConn + 'static>(state: &mut State<X>, x: &X) -> tilewm::Result<()> {
    let ext = state.extension::<StatusBar<X>>()?;
    let mut bar = ext.borrow_mut();

    bar.active_screen = state
        .screens
        .screen_for_group(state.groups.focused)
        .unwrap_or(0);

    for w in bar.widgets.iter_mut() {
        if let Err(e) = w.on_refresh(state, x) {
            error!(%e, "error running widget refresh hook");
        }
    }

    if let Err(e) = bar.redraw_if_needed() {
        error!(%e, "error redrawing status bar");
    }

    Ok(())
}

fn event_hook<X: XConn + 'static>(event: &XEvent, state: &mut State<X>, x: &X) -> tilewm::Result<bool> {
    let ext = state.extension::<StatusBar<X>>()?;
    let mut bar = ext.borrow_mut();

    for w in bar.widgets.iter_mut() {
        if let Err(e) = w.on_event(event, state, x) {
            error!(%e, "error running widget event hook");
        }
    }

    if let Err(e) = bar.redraw_if_needed() {
        error!(%e, "error redrawing status bar");
    }

    Ok(true)
}

fn manage_hook<X: XConn + 'static>(id: Xid, state: &mut State<X>, x: &X) -> tilewm::Result<()> {
    let ext = state.extension::<StatusBar<X>>()?;
    let mut bar = ext.borrow_mut();

    for w in bar.widgets.iter_mut() {
        if let Err(e) = w.on_new_client(id, state, x) {
            error!(%e, "error running widget manage hook");
        }
    }

    if let Err(e) = bar.redraw_if_needed() {
        error!(%e, "error redrawing status bar");
    }

    Ok(())
}
