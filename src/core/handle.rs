//! XEvent handlers for use in the main event loop. Each handler gets exactly
//! the pieces it needs: `(state, x)` for most events, or the whole
//! [WindowManager] for key/mouse bindings, whose closures are written against
//! user-facing `WindowManager` methods rather than the raw `x` connection.
use crate::{
    core::{
        bindings::{KeyBindings, KeyCode, MouseBindings, MouseEvent},
        State, WindowManager,
    },
    pure::{geometry::Point, window::Window},
    x::{
        atom::{lp_property_name, Atom, LP_PROPERTY_PREFIX},
        event::{ClientMessage, ClientMessageKind, ConfigureEvent, PointerChange, PropertyEvent},
        property::{Prop, WmHints},
        ClientAttr, XConn, XConnExt,
    },
    Result, Xid,
};
use tracing::{error, info, trace};

/// No client messages are handled by default; the ewmh extension registers
/// handling for the ones it cares about (`_NET_ACTIVE_WINDOW`, pagers, etc).
pub(crate) fn client_message<X: XConn>(msg: ClientMessage, _: &mut State<X>, _: &X) -> Result<()> {
    let data = &msg.data;
    trace!(id = msg.id.0, dtype = ?msg.dtype, ?data, "got client message");
    Ok(())
}

pub(crate) fn mapping_notify<X: XConn>(
    key_bindings: &KeyBindings<X>,
    mouse_bindings: &MouseBindings<X>,
    x: &X,
) -> Result<()> {
    trace!("grabbing key and mouse bindings");
    let key_codes: Vec<_> = key_bindings.keys().copied().collect();
    let mouse_states: Vec<_> = mouse_bindings.keys().map(|(_, state)| state.clone()).collect();

    x.grab(&key_codes, &mouse_states)
}

/// Look up and run the bound key handler. The handler is temporarily removed
/// from the map so it can be called with a fresh `&mut WindowManager` without
/// aliasing `wm.key_bindings`.
pub(crate) fn keypress<X: XConn>(key: KeyCode, wm: &mut WindowManager<X>) -> Result<()> {
    if let Some(mut action) = wm.key_bindings.remove(&key) {
        trace!(?key, "running user keybinding");
        let result = action(wm);
        wm.key_bindings.insert(key, action);
        if let Err(error) = result {
            error!(%error, ?key, "error running user keybinding");
            return Err(error);
        }
    }

    Ok(())
}

pub(crate) fn mouse_event<X: XConn>(e: MouseEvent, wm: &mut WindowManager<X>) -> Result<()> {
    let binding_key = (e.kind, e.state.clone());
    if let Some(mut action) = wm.mouse_bindings.remove(&binding_key) {
        let result = action(wm, &e);
        wm.mouse_bindings.insert(binding_key, action);
        if let Err(error) = result {
            error!(%error, ?e, "error running user mouse binding");
            return Err(error);
        }
    }

    Ok(())
}

/// Tiled clients aren't allowed to reposition themselves; floating and
/// unmanaged windows get their request applied verbatim, routed through the
/// frame-aware [XConnExt::position_client] so the decoration moves with them.
pub(crate) fn configure_request<X: XConn>(
    ConfigureEvent { id, r, .. }: &ConfigureEvent,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    let tiled = state
        .groups
        .group_of(*id)
        .is_some_and(|g| !state.groups.groups[g].is_floating(*id));

    if tiled {
        return Ok(());
    }

    if let Some(w) = state.windows.get_mut(id) {
        w.geometry.want = *r;
    }

    x.position_client(*id, *r, state)
}

/// A window is only actually managed (given a frame) on its first map: a
/// `CreateNotify` may already have registered a bare [Window] for it, but
/// that record has no frame yet, so the guard checks for one rather than
/// mere presence in `state.windows`.
pub(crate) fn map_request<X: XConn>(client: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    trace!(?client, "handling new map request");
    if state.windows.get(&client).is_some_and(|w| w.frame.is_some()) {
        return Ok(());
    }

    let attrs = x.get_window_attributes(client)?;
    if !attrs.should_manage() {
        return Ok(());
    }

    trace!(?client, "managing client");
    x.manage(client, state)
}

/// Pre-register a [Window] for a freshly created top-level window so its
/// initial property list is captured before it ever asks to be mapped.
/// Frame construction is deferred to [map_request]/[XConnExt::manage].
pub(crate) fn create_notify<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    if state.windows.contains_key(&id) {
        return Ok(());
    }

    trace!(?id, "new window created");
    let mut window = Window::new(id);
    x.set_client_attributes(id, &[ClientAttr::ClientEventMask])?;

    window.props = x
        .all_props_for(id)?
        .into_iter()
        .filter_map(|(name, prop)| match prop {
            Prop::Utf8String(strs) => Some((name, strs.join("\0"))),
            _ => None,
        })
        .collect();

    state.windows.insert(id, window);
    Ok(())
}

pub(crate) fn destroy<X: XConn>(client: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    trace!(?client, "destroying client");
    x.unmanage(client, state)?;
    state.mapped.remove(&client);
    state.pending_unmap.remove(&client);

    Ok(())
}

/// `hide` only ever unmaps a client's frame, never the client itself, so any
/// `UnmapNotify` delivered for the client's own id is the client withdrawing
/// of its own accord. `pending_unmap` remains as a defensive counter for any
/// future path that does unmap a client directly.
pub(crate) fn unmap_notify<X: XConn>(client: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    let expected = *state.pending_unmap.get(&client).unwrap_or(&0);

    if expected == 0 {
        x.unmanage(client, state)?;
    } else if expected == 1 {
        state.pending_unmap.remove(&client);
    } else {
        state.pending_unmap.entry(client).and_modify(|count| *count -= 1);
    }

    Ok(())
}

pub(crate) fn focus_in<X: XConn>(client: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    let accepts_focus = match x.get_prop(client, Atom::WmHints.as_ref()) {
        Ok(Some(Prop::WmHints(WmHints { accepts_input, .. }))) => accepts_input,
        _ => true,
    };

    if accepts_focus {
        x.focus(client)?;
        x.set_prop(x.root(), Atom::NetActiveWindow.as_ref(), Prop::Window(vec![client]))?;
        set_focused_client(state, x, client)?;
    } else {
        let msg = ClientMessageKind::TakeFocus(client).as_message(x)?;
        x.send_client_message(msg)?;
    }

    Ok(())
}

/// The pointer-driven counterpart to [focus_in]'s `take_focus` branch: a
/// window that loses X input focus (e.g. while a grab is active elsewhere,
/// or focus drops to none) reverts its own border immediately rather than
/// waiting on a `FocusIn` for whatever gets it next.
pub(crate) fn focus_out<X: XConn>(client: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    if let Some(w) = state.windows.get_mut(&client) {
        if w.has_focus {
            w.has_focus = false;
            let frame = w.frame.unwrap_or(client);
            x.set_client_border_color(frame, state.config.normal_border)?;
        }
    }

    Ok(())
}

/// Flip the `has_focus` bit and border color on every managed window so
/// exactly one of them is highlighted. Borders are drawn on each window's
/// frame, not the bare client.
fn set_focused_client<X: XConn>(state: &mut State<X>, x: &X, client: Xid) -> Result<()> {
    let normal = state.config.normal_border;
    let focused = state.config.focused_border;

    for (&id, w) in state.windows.iter_mut() {
        let is_focused = id == client;
        if w.has_focus != is_focused {
            w.has_focus = is_focused;
            let frame = w.frame.unwrap_or(id);
            x.set_client_border_color(frame, if is_focused { focused } else { normal })?;
        }
    }

    Ok(())
}

pub(crate) fn enter<X: XConn>(p: PointerChange, state: &mut State<X>, x: &X) -> Result<()> {
    if state.config.focus_follow_mouse {
        x.focus(p.id)?;
        set_focused_client(state, x, p.id)?;
    }

    Ok(())
}

pub(crate) fn leave<X: XConn>(p: PointerChange, state: &mut State<X>, x: &X) -> Result<()> {
    if p.id == state.root() && !p.same_screen {
        x.focus(p.id)?;
        set_screen_from_point(p.abs, state);
    }

    Ok(())
}

pub(crate) fn detect_screens<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    info!("re-detecting screens");
    let rects = x.screen_details()?;
    info!(?rects, "found screens");
    state.screens.set_bounds(rects, &mut state.bus);

    Ok(())
}

pub(crate) fn screen_change<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    trace!("screen changed");
    set_screen_from_point(x.cursor_position()?, state);
    Ok(())
}

/// Move the "focused group" tuple to whichever screen the point now falls
/// within, so that key bindings keep acting on the group under the pointer.
fn set_screen_from_point<X: XConn>(p: Point, state: &mut State<X>) {
    let group = state.screens.screens.iter().find(|s| s.outer.contains_point(p)).and_then(|s| s.group);

    if let Some(group) = group {
        state.groups.focused = group;
    }
}

/// Re-decode a single property after a `PropertyNotify`, following `_TN_LP_*`
/// writes back into the window's [crate::pure::window::LayoutProps] and
/// `_NET_WM_DESKTOP` writes into a group reassignment, then fan out
/// `property_changed` for anything else (bars, gadgets) listening.
pub(crate) fn property_notify<X: XConn>(e: &PropertyEvent, state: &mut State<X>, x: &X) -> Result<()> {
    if e.is_root || !state.windows.contains_key(&e.id) {
        return Ok(());
    }

    trace!(client = %e.id, atom = %e.atom, "property changed");

    if let Some(field) = e.atom.strip_prefix(LP_PROPERTY_PREFIX) {
        apply_layout_prop(e.id, field, state, x)?;
    } else if e.atom == Atom::NetWmDesktop.as_ref() {
        move_to_desktop_prop(e.id, state, x)?;
    }

    state.bus.emit("property_changed", &[e.id.to_string(), e.atom.clone()]);
    Ok(())
}

fn apply_layout_prop<X: XConn>(id: Xid, field: &str, state: &mut State<X>, x: &X) -> Result<()> {
    let value = match x.get_prop(id, &lp_property_name(field)) {
        Ok(Some(Prop::Utf8String(mut strs))) if !strs.is_empty() => Some(strs.remove(0)),
        _ => None,
    };

    let Some(window) = state.windows.get_mut(&id) else {
        return Ok(());
    };

    match field {
        "FLOATING" => window.lprops.floating = value.as_deref() == Some("1"),
        "IGNORE_HINTS" => window.lprops.ignore_hints = value.as_deref() == Some("1"),
        "STACK" => window.lprops.stack = value,
        "NAME" => window.lprops.name = value,
        _ => {}
    }

    Ok(())
}

fn move_to_desktop_prop<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    let Ok(Some(Prop::Cardinal(desktop))) = x.get_prop(id, Atom::NetWmDesktop.as_ref()) else {
        return Ok(());
    };

    let to = desktop as usize;
    if to >= state.config.group_names.len() {
        return Ok(());
    }

    let Some(from) = state.groups.group_of(id) else {
        return Ok(());
    };

    if from == to {
        return Ok(());
    }

    state.groups.cmd_move_window_to(id, from, to);
    if let Some(w) = state.windows.get_mut(&id) {
        w.group = Some(to);
        w.lprops.group = Some(to);
    }

    x.refresh(state)
}
