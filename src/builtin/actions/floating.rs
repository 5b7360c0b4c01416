//! Actions for manipulating floating windows.
use crate::{
    builtin::actions::key_handler,
    core::bindings::KeyHandler,
    x::XConn,
};

/// Resize the focused floating window by a (width, height) delta. A no-op if
/// the focused client is tiled.
pub fn resize<X: XConn>(dw: i32, dh: i32) -> KeyHandler<X> {
    key_handler(move |wm| match wm.state.focused_client() {
        Some(id) => wm.resize_floating(id, dw, dh),
        None => Ok(()),
    })
}

/// Move the focused floating window by an (x, y) delta. A no-op if the
/// focused client is tiled.
pub fn reposition<X: XConn>(dx: i32, dy: i32) -> KeyHandler<X> {
    key_handler(move |wm| match wm.state.focused_client() {
        Some(id) => wm.reposition_floating(id, dx, dy),
        None => Ok(()),
    })
}

/// Move the focused client onto the floating layer, keeping its current
/// on-screen position.
pub fn float_focused<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| match wm.state.focused_client() {
        Some(id) => wm.set_floating(id, true),
        None => Ok(()),
    })
}

/// Sink the focused client back into tiling if it was floating.
pub fn sink_focused<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| match wm.state.focused_client() {
        Some(id) => wm.set_floating(id, false),
        None => Ok(()),
    })
}

/// Float every window in the currently focused group.
pub fn float_all<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| {
        let group = wm.state.groups.focused;
        let windows = wm.state.groups.groups[group].all_windows();
        for id in windows {
            wm.set_floating(id, true)?;
        }
        Ok(())
    })
}

/// Sink every floating window in the currently focused group back into tiling.
pub fn sink_all<X: XConn>() -> KeyHandler<X> {
    key_handler(|wm| {
        let group = wm.state.groups.focused;
        let windows = wm.state.groups.groups[group].all_windows();
        for id in windows {
            wm.set_floating(id, false)?;
        }
        Ok(())
    })
}
