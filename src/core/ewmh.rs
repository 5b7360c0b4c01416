//! EWMH compliance: advertises `_NET_SUPPORTED`, keeps the desktop/client
//! list properties external pagers and panels read in sync with this
//! engine's groups, and accepts the handful of client messages those tools
//! send back (`_NET_CURRENT_DESKTOP`, `_NET_WM_DESKTOP`, `_NET_ACTIVE_WINDOW`,
//! `_NET_CLOSE_WINDOW`, `_NET_WM_STATE` fullscreen). See spec §4.10.
use crate::{
    core::{Config, State},
    x::{
        atom::{lp_property_name, Atom, EWMH_SUPPORTED_ATOMS},
        event::{ClientMessage, ClientMessageData},
        property::Prop,
        XConn, XConnExt, XEvent,
    },
    Result, Xid,
};
use tracing::{debug, warn};

/// Register the startup/refresh/event hooks that keep this manager EWMH
/// compliant. Compose into an existing [Config] rather than replacing it
/// wholesale, the same way [crate::builtin::hooks::SpacingHook] is wired in.
pub fn add_ewmh_hooks<X>(mut config: Config<X>) -> Config<X>
where
    X: XConn + 'static,
{
    config.compose_or_set_startup_hook(startup_hook);
    config.compose_or_set_refresh_hook(refresh_hook);
    config.compose_or_set_event_hook(event_hook);

    config
}

/// Advertise EWMH support and create the `_NET_SUPPORTING_WM_CHECK` window.
pub fn startup_hook<X: XConn>(_state: &mut State<X>, x: &X) -> Result<()> {
    let root = x.root();
    let check = x.check_window();

    x.set_prop(root, Atom::WmName.as_ref(), Prop::Utf8String(vec![WM_NAME.to_owned()]))?;
    x.set_prop(check, Atom::WmName.as_ref(), Prop::Utf8String(vec![WM_NAME.to_owned()]))?;
    x.set_prop(root, Atom::NetSupportingWmCheck.as_ref(), Prop::Window(vec![check]))?;
    x.set_prop(check, Atom::NetSupportingWmCheck.as_ref(), Prop::Window(vec![check]))?;

    x.set_prop(
        root,
        Atom::NetSupported.as_ref(),
        Prop::Atom(EWMH_SUPPORTED_ATOMS.iter().map(|a| a.as_ref().to_owned()).collect()),
    )
}

/// The name this manager advertises via `WM_NAME`.
pub const WM_NAME: &str = "tilewm";

/// Keep `_NET_NUMBER_OF_DESKTOPS`, `_NET_DESKTOP_NAMES`, `_NET_CURRENT_DESKTOP`,
/// `_NET_CLIENT_LIST[_STACKING]`, `_NET_WM_DESKTOP` and `_NET_ACTIVE_WINDOW` in
/// sync with the current [GroupManager] state.
pub fn refresh_hook<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    let root = x.root();

    x.set_prop(
        root,
        Atom::NetNumberOfDesktops.as_ref(),
        Prop::Cardinal(state.config.group_names.len() as u32),
    )?;
    x.set_prop(
        root,
        Atom::NetDesktopNames.as_ref(),
        Prop::Utf8String(state.config.group_names.clone()),
    )?;
    x.set_prop(
        root,
        Atom::NetCurrentDesktop.as_ref(),
        Prop::Cardinal(state.groups.focused as u32),
    )?;

    let clients: Vec<Xid> = state.windows.keys().copied().collect();
    x.set_prop(root, Atom::NetClientList.as_ref(), Prop::Window(clients.clone()))?;
    x.set_prop(root, Atom::NetClientListStacking.as_ref(), Prop::Window(clients))?;

    for (&id, w) in state.windows.iter() {
        if let Some(group) = w.group {
            x.set_prop(id, Atom::NetWmDesktop.as_ref(), Prop::Cardinal(group as u32))?;
        }
    }

    if let Some(id) = state.focused_client() {
        x.set_prop(root, Atom::NetActiveWindow.as_ref(), Prop::Window(vec![id]))?;
    }

    write_back_lprops(state, x)
}

/// Persist each managed window's [crate::pure::window::LayoutProps] to
/// `_TN_LP_*` properties so a restarted manager can recover group/floating/
/// stack placement without relying on process memory. See spec §9.
fn write_back_lprops<X: XConn>(state: &State<X>, x: &X) -> Result<()> {
    for (&id, w) in state.windows.iter() {
        x.set_prop(
            id,
            &lp_property_name("floating"),
            Prop::Cardinal(w.lprops.floating as u32),
        )?;
        if let Some(group) = w.lprops.group {
            x.set_prop(id, &lp_property_name("group"), Prop::Cardinal(group as u32))?;
        }
        if let Some(stack) = &w.lprops.stack {
            x.set_prop(id, &lp_property_name("stack"), Prop::Utf8String(vec![stack.clone()]))?;
        }
    }

    Ok(())
}

/// Handle client messages sent by external pagers/panels/clients.
pub fn event_hook<X: XConn>(event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool> {
    let ClientMessage { id, dtype, data, .. } = match event {
        XEvent::ClientMessage(m) => m,
        _ => return Ok(true),
    };

    debug!(?dtype, "processing client message in ewmh hook");

    match dtype.as_str() {
        "_NET_CURRENT_DESKTOP" => {
            if let Some(&target) = data.as_usize().first() {
                switch_to(state, x, target)?;
            }
        }

        "_NET_WM_DESKTOP" => {
            if let Some(&target) = data.as_usize().first() {
                move_to(state, *id, target);
                x.refresh(state)?;
            }
        }

        // Pager-style activation messages carry source indicator 2 in the
        // first data word; anything else is a direct client request we still
        // honour, per the EWMH spec's guidance for well behaved WMs.
        "_NET_ACTIVE_WINDOW" => {
            if state.windows.contains_key(id) {
                x.focus(*id)?;
            }
        }

        "_NET_CLOSE_WINDOW" => {
            if state.windows.contains_key(id) {
                if x.client_supports_protocol(*id, Atom::WmDeleteWindow.as_ref())? {
                    let msg = crate::x::event::ClientMessageKind::DeleteWindow(*id).as_message(x)?;
                    x.send_client_message(msg)?;
                } else {
                    x.kill(*id)?;
                }
            }
        }

        "_NET_WM_STATE" => handle_wm_state(*id, data, state, x)?,

        _ => (),
    }

    Ok(true)
}

fn switch_to<X: XConn>(state: &mut State<X>, x: &X, target: usize) -> Result<()> {
    if target >= state.groups.groups.len() {
        return Ok(());
    }

    let on_screen = state.screens.screen_for_group(state.groups.focused).unwrap_or(0);
    let State { groups, screens, registry, bus, .. } = state;
    groups.cmd_switch(target, on_screen, screens, registry, bus);
    x.refresh(state)
}

fn move_to<X: XConn>(state: &mut State<X>, id: Xid, target: usize) {
    if target >= state.groups.groups.len() {
        return;
    }
    let Some(from) = state.groups.group_of(id) else {
        return;
    };

    state.groups.cmd_move_window_to(id, from, target);
    if let Some(w) = state.windows.get_mut(&id) {
        w.group = Some(target);
        w.lprops.group = Some(target);
    }
}

/// `_NET_WM_STATE` fullscreen requests: approximate "fullscreen" with the
/// floating layer, sized to the client's current screen, and mirror the
/// request back onto the window's own `_NET_WM_STATE` property so clients
/// that poll it (rather than trust their own request) see it take effect.
fn handle_wm_state<X: XConn>(id: Xid, data: &ClientMessageData, state: &mut State<X>, x: &X) -> Result<()> {
    let mut words = data.as_u32();
    if words.is_empty() || !state.windows.contains_key(&id) {
        warn!(?data, "malformed or unknown-client _NET_WM_STATE message");
        return Ok(());
    }

    let fullscreen_atom = x.intern_atom(Atom::NetWmStateFullscreen.as_ref())?;
    let action = words.remove(0);
    if !words.contains(&fullscreen_atom.0) {
        return Ok(());
    }

    let currently = matches!(
        x.get_prop(id, Atom::NetWmState.as_ref())?,
        Some(Prop::Atom(atoms)) if atoms.iter().any(|a| a == Atom::NetWmStateFullscreen.as_ref())
    );

    let want = match action {
        0 => false,
        1 => true,
        2 => !currently,
        other => {
            warn!(%other, "invalid _NET_WM_STATE action: expected 0, 1 or 2");
            return Ok(());
        }
    };

    if want == currently {
        return Ok(());
    }

    if want {
        x.set_prop(
            id,
            Atom::NetWmState.as_ref(),
            Prop::Atom(vec![Atom::NetWmStateFullscreen.as_ref().to_owned()]),
        )?;
        if let Some(screen) = state.screens.screen_for_group(state.groups.group_of(id).unwrap_or(state.groups.focused)) {
            let bounds = state.screens.screens[screen].outer;
            if let Some(w) = state.windows.get_mut(&id) {
                w.geometry.want = bounds;
            }
        }
    } else {
        x.set_prop(id, Atom::NetWmState.as_ref(), Prop::Atom(vec![]))?;
    }

    let group = state.groups.group_of(id);
    if let Some(group) = group {
        if state.groups.groups[group].is_floating(id) != want {
            state.groups.groups[group].remove_window(id);
            state.groups.groups[group].add_window(id, want, None);
        }
    }

    x.refresh(state)
}
