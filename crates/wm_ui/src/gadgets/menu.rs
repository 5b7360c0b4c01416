//! `Menu`: a filterable dropdown of every executable on `$PATH`, launched
//! by spawning the selected name as a detached child process. The
//! override-redirect-window-plus-keyboard-grab approach here mirrors a
//! dmenu-style launcher.
use crate::{
    core::{Context, Draw, TextStyle},
    gadgets::{filter_contains, screen_rect_for_focus, FieldEvent, TextField},
    Result,
};
use std::{collections::BTreeSet, env, fs, process::Command};
use tilewm::{
    core::{bindings::KeyCode, State},
    pure::geometry::Rect,
    x::{Atom, WinType, XConn, XEvent},
    Color, Xid,
};
use tracing::{error, warn};

/// A filterable launcher: types a prefix, narrows a list of `$PATH`
/// executables, `Return` spawns the highlighted one.
pub struct Menu {
    draw: Draw,
    window: Option<Xid>,
    width: u32,
    field: TextField,
    items: Vec<String>,
    matches: Vec<String>,
    selected: usize,
    toggle: KeyCode,
    style: TextStyle,
    bg: Color,
    bg_selected: Color,
    line_height: u32,
    max_lines: usize,
}

impl Menu {
    pub fn try_new(toggle: KeyCode, style: TextStyle, bg_selected: impl Into<Color>, line_height: u32, max_lines: usize) -> Result<Self> {
        Ok(Self {
            draw: Draw::new(&style.font)?,
            window: None,
            width: 0,
            field: TextField::new(),
            items: Vec::new(),
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
        self.matches = filter_contains(self.field.value(), self.items.iter());
        self.selected = self.selected.min(self.matches.len().saturating_sub(1));
    }

    fn show<X: XConn>(&mut self, x: &X, anchor: Rect) -> Result<()> {
        self.items = path_executables();
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

        for (i, name) in self.matches.iter().take(self.max_lines).enumerate() {
            ctx.set_y_offset(((i + 1) as u32 * self.line_height) as i32);
            if i == self.selected {
                ctx.fill_rect(Rect::new(0, 0, self.width, self.line_height), self.bg_selected)?;
            }
            ctx.draw_text(name, self.style.padding, self.style.fg)?;
        }

        ctx.reset_offset();
        ctx.flush();
        self.draw.flush(id)
    }

    fn launch_selected(&self) {
        let Some(name) = self.matches.get(self.selected) else { return };
        if let Err(e) = Command::new(name).spawn() {
            error!(%name, %e, "unable to launch");
        }
    }
}

fn path_executables() -> Vec<String> {
    let Some(path) = env::var_os("PATH") else { return Vec::new() };

    let mut names = BTreeSet::new();
    for dir in env::split_paths(&path) {
        let Ok(entries) = fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            if is_executable(&entry) {
                if let Some(name) = entry.file_name().to_str() {
                    names.insert(name.to_string());
                }
            }
        }
    }

    names.into_iter().collect()
}

#[cfg(unix)]
fn is_executable(entry: &fs::DirEntry) -> bool {
    use std::os::unix::fs::PermissionsExt;
    entry.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

fn event_hook<X: XConn + 'static>(event: &XEvent, state: &mut State<X>, x: &X) -> tilewm::Result<bool> {
    let ext = state.extension::<Menu>()?;
    let mut menu = ext.borrow_mut();

    let XEvent::KeyPress(code) = event else { return Ok(true) };

    if !menu.is_visible() {
        if *code == menu.toggle {
            let anchor = screen_rect_for_focus(state);
            if let Err(e) = menu.show(x, anchor) {
                error!(%e, "unable to show launcher");
            }
            return Ok(false);
        }
        return Ok(true);
    }

    let sym = match x.keysym_for_keycode(*code) {
        Ok(Some(sym)) => sym,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(%e, "unable to resolve keysym for launcher input");
            return Ok(false);
        }
    };

    match sym {
        keysym::UP => {
            menu.selected = menu.selected.saturating_sub(1);
            menu.redraw()?;
        }
        keysym::DOWN => {
            menu.selected = (menu.selected + 1).min(menu.matches.len().saturating_sub(1));
            menu.redraw()?;
        }
        _ => match menu.field.handle_key(sym) {
            FieldEvent::Changed => {
                menu.refilter();
                menu.redraw()?;
            }
            FieldEvent::Submit => {
                menu.launch_selected();
                menu.hide(x)?;
            }
            FieldEvent::Cancel => menu.hide(x)?,
            FieldEvent::Ignored => {}
        },
    }

    Ok(false)
}

mod keysym {
    pub const UP: u32 = 0xff52;
    pub const DOWN: u32 = 0xff54;
}
