//! `Finder`: a filterable list of every currently managed window, jumping
//! to and focusing whichever one is selected. Same overlay/keyboard-grab
//! shape as [`crate::gadgets::Menu`], just backed by live window state
//! instead of `$PATH`.
use crate::{
    core::{Draw, TextStyle},
    gadgets::{filter_contains, screen_rect_for_focus, FieldEvent, TextField},
    Result,
};
use tilewm::{
    core::{bindings::KeyCode, State},
    pure::geometry::Rect,
    x::{Atom, WinType, XConn, XConnExt, XEvent},
    Color, Xid,
};
use tracing::{error, warn};

struct Entry {
    id: Xid,
    title: String,
}

/// A `Ctrl+Tab`-style window switcher: type to filter by title, `Return`
/// focuses the highlighted window (switching its group onto the current
/// screen first if it isn't already visible).
pub struct Finder {
    draw: Draw,
    window: Option<Xid>,
    width: u32,
    field: TextField,
    entries: Vec<Entry>,
    matches: Vec<usize>,
    selected: usize,
    toggle: KeyCode,
    style: TextStyle,
    bg: Color,
    bg_selected: Color,
    line_height: u32,
    max_lines: usize,
}

impl Finder {
    pub fn try_new(toggle: KeyCode, style: TextStyle, bg_selected: impl Into<Color>, line_height: u32, max_lines: usize) -> Result<Self> {
        Ok(Self {
            draw: Draw::new(&style.font)?,
            window: None,
            width: 0,
            field: TextField::new(),
            entries: Vec::new(),
            matches: Vec::new(),
            selected: 0,
            toggle,
            bg: style.bg.unwrap_or_else(|| 0x1d2021.into()),
            style,
            bg_selected: bg_selected.into(),
            line_height,
            max_lines,
        })
    }

    pub fn add_to<X: XConn + 'static>(self, state: &mut State<X>) {
        state.add_extension(self);
        state.config.compose_or_set_event_hook(event_hook);
    }

    fn is_visible(&self) -> bool {
        self.window.is_some()
    }

    fn refilter(&mut self) {
        let titles: Vec<String> = self.entries.iter().map(|e| e.title.clone()).collect();
        let wanted = filter_contains(self.field.value(), titles.iter());
        self.matches = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| wanted.contains(&e.title))
            .map(|(i, _)| i)
            .collect();
        self.selected = self.selected.min(self.matches.len().saturating_sub(1));
    }

    fn show<X: XConn>(&mut self, state: &State<X>, x: &X, anchor: Rect) -> Result<()> {
        self.entries = state
            .windows
            .keys()
            .map(|&id| Entry { id, title: x.window_title(id).unwrap_or_else(|_| id.to_string()) })
            .collect();
        self.entries.sort_by(|a, b| a.title.cmp(&b.title));
        self.field.clear();
        self.refilter();

        self.width = anchor.w;
        let h = self.line_height * (1 + self.max_lines as u32);
        let r = Rect::new(anchor.x, anchor.y, anchor.w, h);

        let id = self.draw.new_window(x, WinType::InputOutput(Atom::NetWindowTypeMenu), r, false)?;
        x.grab_keyboard()?;
        x.map(id)?;
        self.window = Some(id);
        self.redraw()
    }

    fn hide<X: XConn>(&mut self, x: &X) -> Result<()> {
        if let Some(id) = self.window.take() {
            self.draw.destroy_window_and_surface(x, id)?;
            x.ungrab_keyboard()?;
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(id) = self.window else { return Ok(()) };
        let mut ctx = self.draw.context_for(id)?;

        ctx.set_bg(self.bg);
        ctx.clear()?;
        ctx.draw_text(self.field.value(), self.style.padding, self.style.fg)?;

        for (row, &idx) in self.matches.iter().take(self.max_lines).enumerate() {
            ctx.set_y_offset(((row + 1) as u32 * self.line_height) as i32);
            if row == self.selected {
                ctx.fill_rect(Rect::new(0, 0, self.width, self.line_height), self.bg_selected)?;
            }
            ctx.draw_text(&self.entries[idx].title, self.style.padding, self.style.fg)?;
        }

        ctx.reset_offset();
        ctx.flush();
        self.draw.flush(id)
    }

    fn selected_window(&self) -> Option<Xid> {
        self.matches.get(self.selected).map(|&i| self.entries[i].id)
    }
}

fn jump_to<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> tilewm::Result<()> {
    if let Some(group) = state.group_of(id) {
        let on_screen = state.screens.screen_for_group(state.groups.focused).unwrap_or(0);
        let State { groups, screens, registry, bus, .. } = state;
        groups.cmd_switch(group, on_screen, screens, registry, bus);
    }
    x.refresh(state)?;
    x.focus(id)
}

fn event_hook<X: XConn + 'static>(event: &XEvent, state: &mut State<X>, x: &X) -> tilewm::Result<bool> {
    let ext = state.extension::<Finder>()?;
    let mut finder = ext.borrow_mut();

    let XEvent::KeyPress(code) = event else { return Ok(true) };

    if !finder.is_visible() {
        if *code == finder.toggle {
            let anchor = screen_rect_for_focus(state);
            if let Err(e) = finder.show(state, x, anchor) {
                error!(%e, "unable to show window finder");
            }
            return Ok(false);
        }
        return Ok(true);
    }

    let sym = match x.keysym_for_keycode(*code) {
        Ok(Some(sym)) => sym,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(%e, "unable to resolve keysym for finder input");
            return Ok(false);
        }
    };

    match sym {
        keysym::UP => {
            finder.selected = finder.selected.saturating_sub(1);
            finder.redraw()?;
        }
        keysym::DOWN => {
            finder.selected = (finder.selected + 1).min(finder.matches.len().saturating_sub(1));
            finder.redraw()?;
        }
        _ => match finder.field.handle_key(sym) {
            FieldEvent::Changed => {
                finder.refilter();
                finder.redraw()?;
            }
            FieldEvent::Submit => {
                let target = finder.selected_window();
                finder.hide(x)?;
                drop(finder);
                if let Some(id) = target {
                    jump_to(id, state, x)?;
                }
            }
            FieldEvent::Cancel => finder.hide(x)?,
            FieldEvent::Ignored => {}
        },
    }

    Ok(false)
}

mod keysym {
    pub const UP: u32 = 0xff52;
    pub const DOWN: u32 = 0xff54;
}
