//! `Tabs`: a persistent per-screen left-edge sidebar listing the windows
//! in that screen's bound group, highlighting whichever one is globally
//! focused. Unlike the other gadgets in this module it reserves real
//! screen space (via [`tilewm::pure::screen::Screen::left_slices`]) rather
//! than floating over everything, and is shown/hidden rather than
//! popped up.
use crate::{
    core::{Context, Draw, TextStyle},
    Result,
};
use tilewm::{
    core::{bindings::KeyCode, State},
    pure::{geometry::Rect, screen::Slice},
    x::{Atom, Prop, WinType, XConn, XConnExt, XEvent},
    Color, Xid,
};
use tracing::error;

const SLICE_IDX: usize = 0;

struct Row {
    id: Xid,
    title: String,
}

/// One sidebar per screen, all sharing a single [Draw] connection.
pub struct Tabs {
    draw: Draw,
    width: u32,
    windows: Vec<Option<Xid>>,
    rows: Vec<Vec<Row>>,
    visible: bool,
    toggle: KeyCode,
    style: TextStyle,
    bg: Color,
    bg_active: Color,
    line_height: u32,
}

impl Tabs {
    pub fn try_new(toggle: KeyCode, style: TextStyle, bg_active: impl Into<Color>, width: u32, line_height: u32) -> Result<Self> {
        Ok(Self {
            draw: Draw::new(&style.font)?,
            width,
            windows: Vec::new(),
            rows: Vec::new(),
            visible: false,
            toggle,
            bg: style.bg.unwrap_or_else(|| 0x1d2021.into()),
            style,
            bg_active: bg_active.into(),
            line_height,
        })
    }

    pub fn add_to<X: XConn + 'static>(self, state: &mut State<X>) {
        state.add_extension(self);
        state.config.compose_or_set_startup_hook(startup_hook);
        state.config.compose_or_set_event_hook(event_hook);
        state.config.compose_or_set_refresh_hook(refresh_hook);
    }

    fn reserve_slices<X: XConn>(&mut self, state: &mut State<X>) {
        for screen in state.screens.screens.iter_mut() {
            if screen.left_slices.len() <= SLICE_IDX {
                let mut slice = Slice::new(self.width);
                slice.visible = false;
                screen.left_slices.push(slice);
            }
        }
        self.windows = vec![None; state.screens.screens.len()];
        self.rows = vec![Vec::new(); state.screens.screens.len()];
    }

    fn toggle<X: XConn>(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        self.visible = !self.visible;

        for i in 0..state.screens.screens.len() {
            state.screens.toggle_left_slice(i, SLICE_IDX, &mut state.bus);
        }
        x.refresh(state)?;

        if self.visible {
            self.update_rows(state, x);
            self.show_windows(state, x)?;
        } else {
            self.hide_windows(x)?;
        }

        Ok(())
    }

    fn show_windows<X: XConn>(&mut self, state: &State<X>, x: &X) -> Result<()> {
        for (i, screen) in state.screens.screens.iter().enumerate() {
            if self.windows.get(i).copied().flatten().is_some() {
                continue;
            }
            let Some(slice) = screen.left_slices.get(SLICE_IDX) else { continue };
            let r = Rect::new(slice.rect.x, slice.rect.y, self.width, slice.rect.h);
            let id = self.draw.new_window(x, WinType::InputOutput(Atom::NetWindowTypeUtility), r, false)?;
            for atom in [Atom::NetWmName, Atom::WmName] {
                x.set_prop(id, atom.as_ref(), Prop::Utf8String(vec!["tilewm-tabs".into()]))?;
            }
            x.map(id)?;
            self.windows[i] = Some(id);
        }
        self.redraw(state)
    }

    fn hide_windows<X: XConn>(&mut self, x: &X) -> Result<()> {
        for slot in self.windows.iter_mut() {
            if let Some(id) = slot.take() {
                self.draw.destroy_window_and_surface(x, id)?;
            }
        }
        Ok(())
    }

    fn update_rows<X: XConn>(&mut self, state: &State<X>, x: &X) {
        for (i, screen) in state.screens.screens.iter().enumerate() {
            let rows = match screen.group {
                Some(g) => state.groups.groups[g]
                    .all_windows()
                    .into_iter()
                    .map(|id| Row { id, title: x.window_title(id).unwrap_or_else(|_| id.to_string()) })
                    .collect(),
                None => Vec::new(),
            };
            if let Some(slot) = self.rows.get_mut(i) {
                *slot = rows;
            }
        }
    }

    fn redraw<X: XConn>(&mut self, state: &State<X>) -> Result<()> {
        if !self.visible {
            return Ok(());
        }

        let focused = state.focused_client();

        for (i, win) in self.windows.clone().iter().enumerate() {
            let Some(id) = win else { continue };
            let rows = self.rows.get(i).cloned_rows();
            let mut ctx = self.draw.context_for(*id)?;

            ctx.set_bg(self.bg);
            ctx.clear()?;

            for (row_i, row) in rows.iter().enumerate() {
                ctx.set_y_offset((row_i as u32 * self.line_height) as i32);
                if Some(row.id) == focused {
                    ctx.fill_rect(Rect::new(0, 0, self.width, self.line_height), self.bg_active)?;
                }
                ctx.draw_text(&row.title, self.style.padding, self.style.fg)?;
            }

            ctx.reset_offset();
            ctx.flush();
            self.draw.flush(*id)?;
        }

        Ok(())
    }
}

/// Borrow-friendly clone helper so [Tabs::redraw] doesn't hold a borrow of
/// `self.rows` across the `self.draw.context_for` call.
trait ClonedRows {
    fn cloned_rows(&self) -> Vec<RowView>;
}

#[derive(Clone)]
struct RowView {
    id: Xid,
    title: String,
}

impl ClonedRows for Option<&Vec<Row>> {
    fn cloned_rows(&self) -> Vec<RowView> {
        self.map(|rows| rows.iter().map(|r| RowView { id: r.id, title: r.title.clone() }).collect()).unwrap_or_default()
    }
}

fn startup_hook<X: XConn + 'static>(state: &mut State<X>, _x: &X) -> tilewm::Result<()> {
    let ext = state.extension::<Tabs>()?;
    ext.borrow_mut().reserve_slices(state);
    Ok(())
}

fn refresh_hook<X: XConn + 'static>(state: &mut State<X>, x: &X) -> tilewm::Result<()> {
    let ext = state.extension::<Tabs>()?;
    let mut tabs = ext.borrow_mut();
    if tabs.visible {
        tabs.update_rows(state, x);
        if let Err(e) = tabs.redraw(state) {
            error!(%e, "error redrawing tabs sidebar");
        }
    }
    Ok(())
}

fn event_hook<X: XConn + 'static>(event: &XEvent, state: &mut State<X>, x: &X) -> tilewm::Result<bool> {
    let ext = state.extension::<Tabs>()?;
    let mut tabs = ext.borrow_mut();

    if let XEvent::KeyPress(code) = event {
        if *code == tabs.toggle {
            if let Err(e) = tabs.toggle(state, x) {
                error!(%e, "error toggling tabs sidebar");
            }
            return Ok(false);
        }
    }

    Ok(true)
}
