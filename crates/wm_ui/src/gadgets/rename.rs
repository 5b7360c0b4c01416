//! `RenameDialog`: a single-line overlay for renaming the focused group,
//! pre-filled with its current name. The simplest of the popup gadgets:
//! one [TextField], no item list.
use crate::{
    core::{Draw, TextStyle},
    gadgets::{screen_rect_for_focus, FieldEvent, TextField},
    Result,
};
use tilewm::{
    core::{bindings::KeyCode, State},
    pure::geometry::Rect,
    x::{Atom, WinType, XConn, XEvent},
    Color, Xid,
};
use tracing::{error, warn};

pub struct RenameDialog {
    draw: Draw,
    window: Option<Xid>,
    field: TextField,
    toggle: KeyCode,
    style: TextStyle,
    bg: Color,
}

impl RenameDialog {
    pub fn try_new(toggle: KeyCode, style: TextStyle) -> Result<Self> {
        Ok(Self {
            draw: Draw::new(&style.font)?,
            window: None,
            field: TextField::new(),
            toggle,
            bg: style.bg.unwrap_or_else(|| 0x1d2021.into()),
            style,
        })
    }

    pub fn add_to<X: XConn + 'static>(self, state: &mut State<X>) {
        state.add_extension(self);
        state.config.compose_or_set_event_hook(event_hook);
    }

    fn is_visible(&self) -> bool {
        self.window.is_some()
    }

    fn show<X: XConn>(&mut self, current_name: &str, x: &X, anchor: Rect, line_height: u32) -> Result<()> {
        self.field = TextField::with_value(current_name);

        let r = Rect::new(anchor.x, anchor.y, anchor.w, line_height);
        let id = self.draw.new_window(x, WinType::InputOutput(Atom::NetWindowTypeDialog), r, false)?;
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
        ctx.flush();
        self.draw.flush(id)
    }
}

fn event_hook<X: XConn + 'static>(event: &XEvent, state: &mut State<X>, x: &X) -> tilewm::Result<bool> {
    let ext = state.extension::<RenameDialog>()?;
    let mut dialog = ext.borrow_mut();

    let XEvent::KeyPress(code) = event else { return Ok(true) };

    if !dialog.is_visible() {
        if *code == dialog.toggle {
            let name = state.groups.groups[state.groups.focused].name.clone();
            let anchor = screen_rect_for_focus(state);
            if let Err(e) = dialog.show(&name, x, anchor, 24) {
                error!(%e, "unable to show rename dialog");
            }
            return Ok(false);
        }
        return Ok(true);
    }

    let sym = match x.keysym_for_keycode(*code) {
        Ok(Some(sym)) => sym,
        Ok(None) => return Ok(false),
        Err(e) => {
            warn!(%e, "unable to resolve keysym for rename input");
            return Ok(false);
        }
    };

    match dialog.field.handle_key(sym) {
        FieldEvent::Changed => dialog.redraw()?,
        FieldEvent::Submit => {
            let new_name = dialog.field.value().to_string();
            dialog.hide(x)?;
            if !new_name.is_empty() {
                state.groups.groups[state.groups.focused].name = new_name;
            }
        }
        FieldEvent::Cancel => dialog.hide(x)?,
        FieldEvent::Ignored => {}
    }

    Ok(false)
}
