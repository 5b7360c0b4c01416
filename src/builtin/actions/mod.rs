//! Helpers and pre-defined actions for use in user defined key and mouse
//! bindings.
use crate::{
    core::{
        bindings::{KeyHandler, MouseEvent, MouseHandler},
        WindowManager,
    },
    x::XConn,
    Result,
};
use std::process::{Command, Stdio};
use tracing::info;

pub mod floating;

// NOTE: this is here to force the correct lifetime requirements on closures
//       being used as handlers. The generic impl for functions of the right
//       signature isn't always sufficient on its own.

/// Construct a [KeyHandler] from a closure or free function.
pub fn key_handler<F, X>(f: F) -> KeyHandler<X>
where
    F: FnMut(&mut WindowManager<X>) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Construct a [MouseHandler] from a closure or free function.
pub fn mouse_handler<F, X>(f: F) -> MouseHandler<X>
where
    F: FnMut(&mut WindowManager<X>, &MouseEvent) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Spawn an external program as part of a key binding, redirecting its
/// stdout/stderr to `/dev/null`.
pub fn spawn<X: XConn>(cmd: &'static str) -> KeyHandler<X> {
    key_handler(move |_| {
        let mut parts = cmd.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };

        Command::new(program)
            .args(parts)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(crate::Error::from)
    })
}

/// Signal the [WindowManager] to break out of its main event loop once this
/// tick finishes.
pub fn exit<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| {
        wm.request_exit();
        Ok(())
    })
}

/// Info-log the current window manager [crate::core::State] for debugging.
pub fn log_current_state<X: XConn + std::fmt::Debug>() -> KeyHandler<X> {
    key_handler(|wm| {
        info!(state = ?wm.state, "current window manager state");
        Ok(())
    })
}

/// Ask the focused client to close (`WM_DELETE_WINDOW` if it supports the
/// protocol, otherwise kill its X connection outright).
pub fn close_focused<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| wm.close_focused())
}

/// Forcibly kill the focused client's connection to the X server without
/// giving it a chance to clean up. Prefer [close_focused] where possible.
pub fn kill_focused<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| wm.kill_focused())
}

/// Move focus to the next client in the current group's stacking order.
pub fn focus_next<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| wm.focus_adjacent(true))
}

/// Move focus to the previous client in the current group's stacking order.
pub fn focus_prev<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| wm.focus_adjacent(false))
}

/// Toggle the focused client between floating and tiled.
pub fn toggle_floating_focused<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| wm.toggle_floating_focused())
}

/// Show group `name` on the screen currently holding the focus tuple.
pub fn switch_group<X: XConn>(name: &'static str) -> KeyHandler<X> {
    key_handler(move |wm| wm.switch_group(name))
}

/// Move the focused client to group `name` and follow it there.
pub fn move_focused_to_group<X: XConn>(name: &'static str) -> KeyHandler<X> {
    key_handler(move |wm| wm.move_focused_to_group(name))
}
