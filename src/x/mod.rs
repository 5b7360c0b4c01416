//! Logic for interacting with the X server.
use crate::{
    core::{bindings::{KeyCode, MouseState}, State},
    pure::{
        frame::{BorderColor, Frame},
        geometry::{Point, Rect},
        window::Window,
    },
    x::{atom::AUTO_FLOAT_WINDOW_TYPES, event::ClientMessage, property::WindowState},
    Color, Error, Result, Xid,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, trace};

pub mod atom;
pub mod event;
pub mod property;
pub mod query;

#[cfg(test)]
pub mod mock;

#[cfg(test)]
pub use mock::MockXConn;

pub use atom::Atom;
pub use event::XEvent;
pub use property::{Prop, WindowAttributes};
pub use query::Query;

/// A window type to be specified when creating a new window in the X server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WinType {
    /// A simple hidden stub window for facilitating other API calls (used
    /// for the `_NET_SUPPORTING_WM_CHECK` window).
    CheckWin,
    /// A window that receives input only (not queryable).
    InputOnly,
    /// A regular window; the [Atom] should be a valid `_NET_WM_WINDOW_TYPE`.
    InputOutput(Atom),
}

/// On screen configuration options for X clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientConfig {
    BorderPx(u32),
    Position(Rect),
    StackBelow(Xid),
    StackAbove(Xid),
    StackTop,
    StackBottom,
}

/// Attributes for an X11 client window that can be set directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientAttr {
    BorderColor(u32),
    ClientEventMask,
    ClientUnmapMask,
    RootEventMask,
}

/// A handle on a running X11 connection that we can use for issuing X
/// requests. Abstracted so the core engine can be driven by a fake
/// implementation in tests (see [mock]) as well as a real x11rb backend.
pub trait XConn {
    fn root(&self) -> Xid;
    fn screen_details(&self) -> Result<Vec<Rect>>;
    fn cursor_position(&self) -> Result<Point>;

    fn grab(&self, key_codes: &[KeyCode], mouse_states: &[MouseState]) -> Result<()>;
    fn next_event(&self) -> Result<XEvent>;
    fn flush(&self);

    fn intern_atom(&self, atom: &str) -> Result<Xid>;
    fn atom_name(&self, xid: Xid) -> Result<String>;

    fn client_geometry(&self, client: Xid) -> Result<Rect>;
    fn existing_clients(&self) -> Result<Vec<Xid>>;

    fn map(&self, client: Xid) -> Result<()>;
    fn unmap(&self, client: Xid) -> Result<()>;
    fn kill(&self, client: Xid) -> Result<()>;
    fn focus(&self, client: Xid) -> Result<()>;

    /// Create a new top-level window of the given [WinType] at `r`, for use
    /// by first-party UI surfaces (bars, gadget overlays) that manage their
    /// own lifecycle rather than going through `manage`/`unmanage`.
    /// `managed` selects whether this engine's own window-management rules
    /// apply to it (a bar sets `false`, so the window bypasses tiling and
    /// MapRequest handling via override-redirect). Backends without a real
    /// window-creation path (tests, mocks) report [Error::DriverMissing].
    fn create_window(&self, ty: WinType, r: Rect, managed: bool) -> Result<Xid> {
        let _ = (ty, r, managed);
        Err(Error::DriverMissing("create_window"))
    }

    /// Destroy a window created by [XConn::create_window].
    fn destroy_window(&self, id: Xid) -> Result<()> {
        let _ = id;
        Err(Error::DriverMissing("destroy_window"))
    }

    /// Reparent `client` to become a child of `parent`, positioned at
    /// `(x, y)` relative to it, and add it to the server's save-set so a
    /// crash of this connection reparents it back to the root window
    /// automatically (ICCCM §4.4). Used by [XConnExt::manage] to move a
    /// freshly managed client into its decoration [Frame].
    fn reparent_to_frame(&self, client: Xid, parent: Xid, x: i32, y: i32) -> Result<()> {
        let _ = (client, parent, x, y);
        Err(Error::DriverMissing("reparent_to_frame"))
    }

    /// Reparent `client` back to the root window at the root-relative
    /// position `(x, y)` and drop it from the save-set. Used by
    /// [XConnExt::unmanage] so a withdrawn client survives at its last
    /// on-screen position and a restarted WM can re-adopt it.
    fn reparent_to_root(&self, client: Xid, x: i32, y: i32) -> Result<()> {
        let _ = (client, x, y);
        Err(Error::DriverMissing("reparent_to_root"))
    }

    /// Actively grab the keyboard so that every keypress is delivered to us
    /// as a normal [XEvent::KeyPress], regardless of [XConn::grab]'s passive
    /// key list. Used by overlay gadgets that need free-form text entry for
    /// as long as they are on screen.
    fn grab_keyboard(&self) -> Result<()> {
        Err(Error::DriverMissing("grab_keyboard"))
    }

    /// Release a keyboard grab taken out by [XConn::grab_keyboard].
    fn ungrab_keyboard(&self) -> Result<()> {
        Err(Error::DriverMissing("ungrab_keyboard"))
    }

    /// Resolve the keysym a [KeyCode] produces, consulting the X server's
    /// current keyboard mapping. `None` if the keycode maps to no keysym at
    /// its first (unshifted) level.
    fn keysym_for_keycode(&self, code: KeyCode) -> Result<Option<u32>> {
        let _ = code;
        Err(Error::DriverMissing("keysym_for_keycode"))
    }

    fn get_prop(&self, client: Xid, prop_name: &str) -> Result<Option<Prop>>;
    fn list_props(&self, client: Xid) -> Result<Vec<String>>;
    fn get_wm_state(&self, client: Xid) -> Result<Option<WindowState>>;
    fn get_window_attributes(&self, client: Xid) -> Result<WindowAttributes>;

    fn set_wm_state(&self, client: Xid, wm_state: WindowState) -> Result<()>;
    fn set_prop(&self, client: Xid, name: &str, val: Prop) -> Result<()>;
    fn delete_prop(&self, client: Xid, prop_name: &str) -> Result<()>;
    fn set_client_attributes(&self, client: Xid, attrs: &[ClientAttr]) -> Result<()>;
    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()>;
    fn send_client_message(&self, msg: ClientMessage) -> Result<()>;

    /// Reposition the mouse cursor to `(x, y)` within `id`. Callers should
    /// use `warp_pointer_to_window`/`warp_pointer_to_screen` instead.
    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()>;

    /// The hidden window used for `_NET_SUPPORTING_WM_CHECK` (spec §4.10).
    /// Backends without a real extra window (tests, mocks) can fall back to
    /// the root window.
    fn check_window(&self) -> Xid {
        self.root()
    }
}

/// Helpers built on top of [XConn] that don't themselves need to be part of
/// the trait object: property decoding shortcuts, border/geometry helpers,
/// and the few things every backend gets identically.
pub trait XConnExt: XConn + Sized {
    /// Check whether a client should be floated based on its `WM_CLASS` or
    /// `_NET_WM_WINDOW_TYPE`, per spec §4.1/§4.8.
    fn client_should_float(&self, client: Xid, floating_classes: &[String]) -> Result<bool> {
        trace!(%client, "fetching WmClass prop");
        if let Some(Prop::Utf8String(strs)) = self.get_prop(client, Atom::WmClass.as_ref())? {
            if strs.iter().any(|c| floating_classes.contains(c)) {
                debug!(%client, ?floating_classes, "window has a floating class");
                return Ok(true);
            }
        }

        let window_types = self.get_prop(client, Atom::NetWmWindowType.as_ref())?;
        let float_types: Vec<&str> = AUTO_FLOAT_WINDOW_TYPES.iter().map(|a| a.as_ref()).collect();

        let should_float = match window_types {
            Some(Prop::Atom(atoms)) => atoms.iter().any(|a| float_types.contains(&a.as_ref())),
            _ => false,
        };

        Ok(should_float)
    }

    /// Update the border color of the given client window.
    fn set_client_border_color<C>(&self, id: Xid, color: C) -> Result<()>
    where
        C: Into<Color>,
    {
        let color = color.into();
        self.set_client_attributes(id, &[ClientAttr::BorderColor(color.rgba_u32())])
    }

    /// Set the initial window properties for a newly managed window: the
    /// client itself is withdrawn and watching for property changes, while
    /// the border lives on its [Frame], which is what actually gets drawn
    /// with one.
    fn set_initial_properties(&self, client: Xid, frame: Xid, border_width: u32, normal_border: Color) -> Result<()> {
        self.set_wm_state(client, WindowState::Withdrawn)?;
        self.set_client_attributes(client, &[ClientAttr::ClientEventMask])?;

        let conf = &[ClientConfig::BorderPx(border_width)];
        let attrs = &[ClientAttr::BorderColor(normal_border.rgba_u32())];
        self.set_client_attributes(frame, attrs)?;
        self.set_client_config(frame, conf)
    }

    /// Move a managed client's frame to `r` and fit the client inside it
    /// according to its size hints, translating the resulting rect into
    /// frame-relative coordinates (X reparented children are positioned
    /// relative to their parent, not the root). Clients with no frame yet
    /// (not managed through [Self::manage], e.g. first-party UI windows)
    /// are positioned directly.
    fn position_client(&self, client: Xid, r: Rect, state: &State<Self>) -> Result<()> {
        let frame_id = match state.windows.get(&client).and_then(|w| w.frame) {
            Some(id) => id,
            None => return self.set_client_config(client, &[ClientConfig::Position(r)]),
        };

        self.set_client_config(frame_id, &[ClientConfig::Position(r)])?;

        let hints = match self.get_prop(client, Atom::WmNormalHints.as_ref()) {
            Ok(Some(Prop::WmNormalHints(hints))) => hints,
            _ => Default::default(),
        };
        let ignore_hints = state.windows.get(&client).map(|w| w.lprops.ignore_hints).unwrap_or(false);

        let mut frame = Frame::new(
            frame_id,
            client,
            BorderColor(state.config.normal_border.rgba_u32()),
            BorderColor(state.config.focused_border.rgba_u32()),
            state.config.border_width,
        );
        frame.bounds = r;
        let content = frame.configure_content(&hints, ignore_hints);
        let relative = Rect::new(content.x.saturating_sub(r.x), content.y.saturating_sub(r.y), content.w, content.h);

        trace!(%client, ?r, ?relative, "positioning framed client");
        self.set_client_config(client, &[ClientConfig::Position(relative)])
    }

    /// Restack the given windows, each one above the last, bottom to top.
    fn restack<'a, I>(&self, mut ids: I) -> Result<()>
    where
        I: Iterator<Item = &'a Xid>,
    {
        let mut previous = match ids.next() {
            Some(id) => *id,
            None => return Ok(()),
        };

        for &id in ids {
            self.set_client_config(id, &[ClientConfig::StackAbove(previous)])?;
            previous = id;
        }

        Ok(())
    }

    /// Warp the mouse cursor to the center of the given client window.
    fn warp_pointer_to_window(&self, id: Xid) -> Result<()> {
        let r = self.client_geometry(id)?;
        self.warp_pointer(id, r.w as i16 / 2, r.h as i16 / 2)
    }

    /// Warp the mouse cursor to the center of an arbitrary rect (used for
    /// screens, which have no window of their own).
    fn warp_pointer_to_rect(&self, r: Rect) -> Result<()> {
        let x = (r.x as i32 + r.w as i32 / 2) as i16;
        let y = (r.y as i32 + r.h as i32 / 2) as i16;
        self.warp_pointer(self.root(), x, y)
    }

    /// Fetch the value of every known property for a given client window.
    fn all_props_for(&self, id: Xid) -> Result<HashMap<String, Prop>> {
        self.list_props(id)?
            .into_iter()
            .filter_map(|s| self.get_prop(id, &s).ok().flatten().map(|p| (s, p)))
            .map(Ok)
            .collect::<Result<HashMap<_, _>>>()
    }

    /// Request the title of a given client window following ICCCM/EWMH.
    fn window_title(&self, id: Xid) -> Result<String> {
        match query::str_prop(Atom::WmName, id, self) {
            Ok(Some(mut strs)) if !strs.is_empty() => Ok(strs.remove(0)),
            _ => match query::str_prop(Atom::NetWmName, id, self)? {
                Some(mut strs) if !strs.is_empty() => Ok(strs.remove(0)),
                _ => Ok(String::new()),
            },
        }
    }

    /// Check whether a given client window supports a particular WM protocol.
    fn client_supports_protocol(&self, id: Xid, proto: &str) -> Result<bool> {
        if let Some(Prop::Atom(protocols)) = self.get_prop(id, Atom::WmProtocols.as_ref())? {
            Ok(protocols.iter().any(|p| p == proto))
        } else {
            Ok(false)
        }
    }

    /// Run the provided [Query], returning the result.
    fn query(&self, query: &dyn Query<Self>, id: Xid) -> Result<bool> {
        query.run(id, self)
    }

    /// Run the provided [Query], defaulting on any error talking to the server.
    fn query_or(&self, default: bool, query: &dyn Query<Self>, id: Xid) -> bool {
        query.run(id, self).unwrap_or(default)
    }

    /// Build the [Window] record for a newly mapped client (reusing one
    /// pre-registered by `CreateNotify` if there is one), classify it as
    /// floating or tiled, assign it to a group, reparent it into a freshly
    /// created [Frame], and apply its initial border and event mask. Does
    /// not map it: that happens on the next [Self::refresh].
    fn manage(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        trace!(%id, "managing new client");

        let mut window = state.windows.remove(&id).unwrap_or_else(|| Window::new(id));
        window.geometry.want = self.client_geometry(id)?;

        if let Ok(Some(Prop::WmNormalHints(hints))) = self.get_prop(id, Atom::WmNormalHints.as_ref()) {
            window.hints = hints;
        }

        let floating = self.client_should_float(id, &state.config.floating_classes)?;
        let assigned = state.groups.add_window(id, None, floating, None, &state.screens);
        window.group = Some(assigned);
        window.lprops.group = Some(assigned);
        window.lprops.floating = floating;

        let frame = self.create_window(WinType::InputOutput(Atom::NetWindowTypeNormal), window.geometry.want, false)?;
        self.reparent_to_frame(id, frame, 0, 0)?;
        self.map(id)?;
        window.frame = Some(frame);

        state.windows.insert(id, window);
        self.set_initial_properties(id, frame, state.config.border_width, state.config.normal_border)?;

        let mut hook = state.config.manage_hook.take();
        if let Some(ref mut h) = hook {
            trace!("running user manage hook");
            if let Err(e) = h.call(id, state, self) {
                error!(%e, "error returned from user manage hook");
            }
        }
        state.config.manage_hook = hook;

        self.refresh(state)
    }

    /// Remove a client from every registry, reparent it back to the root so
    /// it survives a WM restart, and destroy its frame.
    fn unmanage(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        trace!(%id, "removing client");
        if let Some(group) = state.groups.group_of(id) {
            state.groups.groups[group].remove_window(id);
        }

        if let Some(window) = state.windows.remove(&id) {
            if let Some(frame) = window.frame {
                let r = window.geometry.real;
                if let Err(e) = self.reparent_to_root(id, r.x as i32, r.y as i32) {
                    debug!(%id, %e, "client already gone, skipping reparent to root");
                }
                if let Err(e) = self.destroy_window(frame) {
                    debug!(%frame, %e, "failed to destroy frame window");
                }
            }
        }

        state.mapped.remove(&id);
        state.pending_unmap.remove(&id);

        self.refresh(state)
    }

    /// Map a client's frame, mark the client `Normal`, and record it as
    /// mapped. Idempotent.
    fn reveal(&self, client: Xid, state: &mut State<Self>) -> Result<()> {
        self.set_wm_state(client, WindowState::Normal)?;
        let target = state.windows.get(&client).and_then(|w| w.frame).unwrap_or(client);
        self.map(target)?;
        state.mapped.insert(client);
        if let Some(w) = state.windows.get_mut(&client) {
            w.visible = true;
        }

        Ok(())
    }

    /// Unmap a client's frame and mark the client `Withdrawn`. Idempotent: a
    /// no-op if it is not currently mapped. The client itself is left
    /// reparented and mapped inside its (now-hidden) frame so it can be
    /// shown again without re-managing it.
    fn hide(&self, client: Xid, state: &mut State<Self>) -> Result<()> {
        if !state.mapped.contains(&client) {
            return Ok(());
        }

        let target = state.windows.get(&client).and_then(|w| w.frame).unwrap_or(client);
        self.unmap(target)?;
        self.set_wm_state(client, WindowState::Withdrawn)?;

        state.mapped.remove(&client);
        if let Some(w) = state.windows.get_mut(&client) {
            w.visible = false;
        }

        debug!(%client, "hid client");
        Ok(())
    }

    /// Re-run layout for every screen's bound group and sync it to the X
    /// server: position/map every currently-visible window and unmap
    /// everything that fell out of view. See spec §4.6's "dirty protocol".
    fn refresh(&self, state: &mut State<Self>) -> Result<()> {
        let bound: Vec<(usize, Rect)> = state
            .screens
            .screens
            .iter()
            .filter_map(|s| s.group.map(|g| (g, s.inner)))
            .collect();

        for &(group_idx, inner) in &bound {
            state.groups.groups[group_idx].layout.set_bounds(inner);
        }
        for (group_idx, _) in bound {
            self.refresh_group(state, group_idx)?;
        }

        let mut hook = state.config.refresh_hook.take();
        if let Some(ref mut h) = hook {
            trace!("running user refresh hook");
            if let Err(e) = h.call(state, self) {
                error!(%e, "error returned from user refresh hook");
            }
        }
        state.config.refresh_hook = hook;

        Ok(())
    }

    fn refresh_group(&self, state: &mut State<Self>, group_idx: usize) -> Result<()> {
        let group = &state.groups.groups[group_idx];
        let visible = group.visible;
        let floating_windows = group.floating_windows.clone();
        let tiled_positions = group.layout.layout();
        let all_in_group = group.layout.all_windows();
        let shown: HashSet<Xid> = tiled_positions.iter().map(|(w, _)| *w).collect();

        for w in &floating_windows {
            let r = state.windows.get(w).map(|w| w.geometry.want).unwrap_or_default();
            if visible {
                self.position_client(*w, r, state)?;
                self.reveal(*w, state)?;
            } else {
                self.hide(*w, state)?;
            }
        }

        for (w, r) in &tiled_positions {
            self.position_client(*w, *r, state)?;
            if visible {
                self.reveal(*w, state)?;
            } else {
                self.hide(*w, state)?;
            }
        }

        for w in all_in_group {
            if !shown.contains(&w) {
                self.hide(w, state)?;
            }
        }

        let stack_order: Vec<Xid> = tiled_positions.iter().map(|(w, _)| *w).chain(floating_windows).collect();
        if !stack_order.is_empty() {
            self.restack(stack_order.iter())?;
        }

        Ok(())
    }
}

impl<T> XConnExt for T where T: XConn {}
