//! Core data structures and user facing functionality for the window manager.
use crate::{
    core::{
        bindings::{DragState, KeyBindings, MouseBindings},
        commands::CommandRegistry,
        event_bus::EventBus,
        groups::GroupManager,
        hooks::{EventHook, ManageHook, StateHook},
        screens::ScreenManager,
    },
    pure::{
        geometry::Rect,
        group::Group,
        layout::{Split, StackSpec},
        window::Window,
        Xid,
    },
    x::{WinType, XConn, XConnExt, XEvent},
    Color, Result,
};
use anymap::{any::Any, AnyMap};
use nix::sys::signal::{signal, SigHandler, Signal};
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};
use tracing::{debug, error, span, trace, Level};

pub mod bindings;
pub mod commands;
pub mod ewmh;
pub mod event_bus;
pub mod groups;
pub mod handle;
pub mod hooks;
pub mod screens;

/// Mutable internal state for the window manager: every registered client
/// window, the group/screen topology, and the two cross-cutting buses that
/// widgets and gadgets interact with. See spec §3/§4.2/§4.3.
pub struct State<X>
where
    X: XConn,
{
    pub config: Config<X>,
    pub windows: HashMap<Xid, Window>,
    pub groups: GroupManager,
    pub screens: ScreenManager,
    pub bus: EventBus,
    pub registry: CommandRegistry,
    pub(crate) extensions: AnyMap,
    pub(crate) root: Xid,
    pub(crate) mapped: HashSet<Xid>,
    pub(crate) pending_unmap: HashMap<Xid, usize>,
    pub(crate) current_event: Option<XEvent>,
    pub(crate) drag: Option<DragState>,
}

impl<X> State<X>
where
    X: XConn,
{
    /// The Xid of the root window for the running [WindowManager].
    pub fn root(&self) -> Xid {
        self.root
    }

    /// The set of all client windows currently mapped to a screen.
    pub fn mapped_clients(&self) -> &HashSet<Xid> {
        &self.mapped
    }

    /// The event currently being processed.
    pub fn current_event(&self) -> Option<&XEvent> {
        self.current_event.as_ref()
    }

    /// The group index a given client currently belongs to, if managed.
    pub fn group_of(&self, client: Xid) -> Option<usize> {
        self.groups.group_of(client)
    }

    /// The single window currently holding input focus, if any.
    pub fn focused_client(&self) -> Option<Xid> {
        self.windows.iter().find(|(_, w)| w.has_focus).map(|(&id, _)| id)
    }

    /// Resolve a configured group name to its index.
    pub fn group_named(&self, name: &str) -> Option<usize> {
        self.config.group_names.iter().position(|n| n == name)
    }

    /// Get access to a shared state extension.
    pub fn extension<E: Any>(&self) -> Result<Arc<RefCell<E>>> {
        self.extensions
            .get()
            .map(Arc::clone)
            .ok_or_else(|| crate::Error::NotFound("state extension".to_string()))
    }

    /// Remove a shared state extension entirely.
    pub fn remove_extension<E: Any>(&mut self) -> Option<E> {
        let arc: Arc<RefCell<E>> = self.extensions.remove()?;
        match Arc::try_unwrap(arc) {
            Ok(rc) => Some(rc.into_inner()),
            Err(arc) => {
                self.extensions.insert(arc);
                None
            }
        }
    }

    /// Add a typed [State] extension to this State.
    pub fn add_extension<E: Any>(&mut self, extension: E) {
        self.extensions.insert(Arc::new(RefCell::new(extension)));
    }
}

/// Startup-time configuration for the window manager.
pub struct Config<X>
where
    X: XConn,
{
    pub normal_border: Color,
    pub focused_border: Color,
    pub border_width: u32,
    pub focus_follow_mouse: bool,
    pub group_names: Vec<String>,
    pub floating_classes: Vec<String>,
    pub startup_hook: Option<Box<dyn StateHook<X>>>,
    pub event_hook: Option<Box<dyn EventHook<X>>>,
    pub manage_hook: Option<Box<dyn ManageHook<X>>>,
    pub refresh_hook: Option<Box<dyn StateHook<X>>>,
}

impl<X> fmt::Debug for Config<X>
where
    X: XConn,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("normal_border", &self.normal_border)
            .field("focused_border", &self.focused_border)
            .field("border_width", &self.border_width)
            .field("focus_follow_mouse", &self.focus_follow_mouse)
            .field("group_names", &self.group_names)
            .field("floating_classes", &self.floating_classes)
            .finish()
    }
}

impl<X> Default for Config<X>
where
    X: XConn,
{
    fn default() -> Self {
        let strings = |slice: &[&str]| slice.iter().map(|s| s.to_string()).collect();

        Config {
            normal_border: Color::try_from("#3c3836").expect("valid hex code"),
            focused_border: Color::try_from("#cc241d").expect("valid hex code"),
            border_width: 2,
            focus_follow_mouse: true,
            group_names: strings(&["1", "2", "3", "4", "5", "6", "7", "8", "9"]),
            floating_classes: strings(&["dmenu", "dunst"]),
            startup_hook: None,
            event_hook: None,
            manage_hook: None,
            refresh_hook: None,
        }
    }
}

impl<X> Config<X>
where
    X: XConn,
{
    pub fn compose_or_set_startup_hook<H>(&mut self, hook: H)
    where
        H: StateHook<X> + 'static,
        X: 'static,
    {
        self.startup_hook = match self.startup_hook.take() {
            Some(h) => Some(hook.then_boxed(h)),
            None => Some(hook.boxed()),
        };
    }

    pub fn compose_or_set_event_hook<H>(&mut self, hook: H)
    where
        H: EventHook<X> + 'static,
        X: 'static,
    {
        self.event_hook = match self.event_hook.take() {
            Some(h) => Some(hook.then_boxed(h)),
            None => Some(hook.boxed()),
        };
    }

    pub fn compose_or_set_manage_hook<H>(&mut self, hook: H)
    where
        H: ManageHook<X> + 'static,
        X: 'static,
    {
        self.manage_hook = match self.manage_hook.take() {
            Some(h) => Some(hook.then_boxed(h)),
            None => Some(hook.boxed()),
        };
    }

    pub fn compose_or_set_refresh_hook<H>(&mut self, hook: H)
    where
        H: StateHook<X> + 'static,
        X: 'static,
    {
        self.refresh_hook = match self.refresh_hook.take() {
            Some(h) => Some(hook.then_boxed(h)),
            None => Some(hook.boxed()),
        };
    }
}

/// Build the default single-stack `Split` a freshly named group starts life
/// with: one flexible, tiled, unlimited stack named "main".
fn default_layout() -> Split {
    Split::new(true, false, vec![StackSpec::new("main")])
}

/// A top level struct holding all of the state required to run as an X11
/// window manager. This allows for final configuration to be carried out
/// before entering the main event loop.
pub struct WindowManager<X>
where
    X: XConn,
{
    x: X,
    pub state: State<X>,
    key_bindings: KeyBindings<X>,
    mouse_bindings: MouseBindings<X>,
    exit_requested: bool,
}

impl<X> WindowManager<X>
where
    X: XConn,
{
    /// Construct a new [WindowManager] with the provided config and X connection.
    pub fn new(
        config: Config<X>,
        key_bindings: KeyBindings<X>,
        mouse_bindings: MouseBindings<X>,
        x: X,
    ) -> Result<Self> {
        let outer_rects = x.screen_details()?;
        let mut screens = ScreenManager::new(outer_rects);

        let groups: Vec<Group> = config
            .group_names
            .iter()
            .map(|name| Group::new(name.clone(), default_layout()))
            .collect();
        let mut groups = GroupManager::new(groups);
        groups.bind_startup(&mut screens);

        let mut bus = EventBus::new();
        for (name, coalesce) in [
            ("layout.relayout", true),
            ("group_changed", false),
            ("updated", true),
            ("property_changed", false),
        ] {
            bus.declare(name, coalesce);
        }

        let state = State {
            config,
            windows: HashMap::new(),
            groups,
            screens,
            bus,
            registry: CommandRegistry::new(),
            extensions: AnyMap::new(),
            root: x.root(),
            mapped: HashSet::new(),
            pending_unmap: HashMap::new(),
            current_event: None,
            drag: None,
        };

        Ok(Self {
            x,
            state,
            key_bindings,
            mouse_bindings,
            exit_requested: false,
        })
    }

    /// Add a typed [State] extension to this WindowManager.
    pub fn add_extension<E: Any>(&mut self, extension: E) {
        self.state.add_extension(extension);
    }

    /// Start the WindowManager and run it until told to exit.
    pub fn run(mut self) -> Result<()> {
        trace!("registering SIGCHLD signal handler");
        if let Err(e) = unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) } {
            panic!("unable to set signal handler: {}", e);
        }

        self.grab()?;

        if let Some(mut h) = self.state.config.startup_hook.take() {
            trace!("running user startup hook");
            if let Err(e) = h.call(&mut self.state, &self.x) {
                error!(%e, "error returned from user startup hook");
            }
        }

        self.x.refresh(&mut self.state)?;

        while !self.exit_requested {
            match self.x.next_event() {
                Ok(event) => {
                    let span = span!(target: "tilewm", Level::DEBUG, "XEvent", %event);
                    let _enter = span.enter();
                    trace!(details = ?event, "event details");
                    self.state.current_event = Some(event.clone());

                    self.handle_xevent(event)?;
                    self.x.flush();

                    self.state.current_event = None;
                }
                Err(e) => error!(%e, "error pulling next x event"),
            }
        }

        Ok(())
    }

    /// Ask the manager to cleanly break out of [Self::run] after the current
    /// event tick. See [crate::builtin::actions::exit].
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn grab(&self) -> Result<()> {
        trace!("grabbing key and mouse bindings");
        let key_codes: Vec<_> = self.key_bindings.keys().copied().collect();
        let mouse_states: Vec<_> = self.mouse_bindings.keys().map(|(_, state)| state.clone()).collect();

        self.x.grab(&key_codes, &mouse_states)
    }

    fn handle_xevent(&mut self, event: XEvent) -> Result<()> {
        use XEvent::*;

        let mut hook = self.state.config.event_hook.take();
        if let Some(ref mut h) = hook {
            trace!("running user event hook");
            let should_run = match h.call(&event, &mut self.state, &self.x) {
                Ok(should_run) => should_run,
                Err(e) => {
                    error!(%e, "error returned from user event hook");
                    true
                }
            };
            self.state.config.event_hook = hook;
            if !should_run {
                return Ok(());
            }
        } else {
            self.state.config.event_hook = hook;
        }

        // Key/mouse bindings run against the whole WindowManager rather than a
        // split (state, x) pair, so these two are dispatched before the split
        // borrow below is taken.
        match &event {
            KeyPress(code) => return handle::keypress(*code, self),
            MouseEvent(e) => return handle::mouse_event(e.clone(), self),
            _ => {}
        }

        let WindowManager {
            x,
            state,
            key_bindings,
            mouse_bindings,
        } = self;

        match &event {
            ClientMessage(m) => handle::client_message(m.clone(), state, x)?,
            ConfigureNotify(e) if e.is_root => handle::detect_screens(state, x)?,
            ConfigureNotify(_) => (),
            ConfigureRequest(e) => handle::configure_request(e, state, x)?,
            CreateNotify(id) => handle::create_notify(*id, state, x)?,
            Enter(p) => handle::enter(*p, state, x)?,
            Expose(_) => (),
            FocusIn(id) => handle::focus_in(*id, state, x)?,
            FocusOut(id) => handle::focus_out(*id, state, x)?,
            Destroy(xid) => handle::destroy(*xid, state, x)?,
            Leave(p) => handle::leave(*p, state, x)?,
            MappingNotify => handle::mapping_notify(key_bindings, mouse_bindings, x)?,
            MapRequest(xid) => handle::map_request(*xid, state, x)?,
            PropertyNotify(e) => handle::property_notify(e, state, x)?,
            RandrNotify => handle::detect_screens(state, x)?,
            ScreenChange => handle::screen_change(state, x)?,
            UnmapNotify(xid) => handle::unmap_notify(*xid, state, x)?,
            KeyPress(_) | MouseEvent(_) => unreachable!("handled above"),
        }

        Ok(())
    }

    /// Re-run layout for every screen's bound group and sync it to the X
    /// server: map/position/restack every currently-visible window, and
    /// unmap everything that fell out of view. See [crate::x::XConnExt::refresh].
    pub fn refresh_all(&mut self) -> Result<()> {
        self.x.refresh(&mut self.state)
    }

    /// Create an unmanaged, unmapped top-level window on the X server.
    /// Intended for overlay UI (menus, dialogs) that a key binding needs to
    /// pop up outside of the normal client lifecycle.
    pub fn create_window(&self, ty: WinType, r: Rect, managed: bool) -> Result<Xid> {
        self.x.create_window(ty, r, managed)
    }

    /// Tear down a window previously created with [Self::create_window].
    pub fn destroy_window(&self, id: Xid) -> Result<()> {
        self.x.destroy_window(id)
    }

    /// Ask a client to close: `WM_DELETE_WINDOW` if it supports the protocol,
    /// otherwise kill the X connection to it outright.
    pub fn close_client(&mut self, id: Xid) -> Result<()> {
        if self.x.client_supports_protocol(id, crate::x::atom::Atom::WmDeleteWindow.as_ref())? {
            let msg = crate::x::event::ClientMessageKind::DeleteWindow(id).as_message(&self.x)?;
            self.x.send_client_message(msg)
        } else {
            self.x.kill(id)
        }
    }

    /// Forcibly kill a client's connection to the X server.
    pub fn kill_client(&mut self, id: Xid) -> Result<()> {
        self.x.kill(id)
    }

    pub fn close_focused(&mut self) -> Result<()> {
        match self.state.focused_client() {
            Some(id) => self.close_client(id),
            None => Ok(()),
        }
    }

    pub fn kill_focused(&mut self) -> Result<()> {
        match self.state.focused_client() {
            Some(id) => self.kill_client(id),
            None => Ok(()),
        }
    }

    /// Move a client onto (or off) the floating layer within its current
    /// group, keeping its current `want` geometry, and re-run layout.
    pub fn set_floating(&mut self, id: Xid, floating: bool) -> Result<()> {
        if let Some(group) = self.state.groups.group_of(id) {
            if self.state.groups.groups[group].is_floating(id) != floating {
                self.state.groups.groups[group].remove_window(id);
                self.state.groups.groups[group].add_window(id, floating, None);
                if let Some(w) = self.state.windows.get_mut(&id) {
                    w.lprops.floating = floating;
                }
            }
        }
        self.refresh_all()
    }

    /// Flip a client between floating and tiled, keeping it in the same
    /// group, and re-run layout.
    pub fn toggle_floating(&mut self, id: Xid) -> Result<()> {
        let floating = self
            .state
            .groups
            .group_of(id)
            .map(|g| self.state.groups.groups[g].is_floating(id))
            .unwrap_or(false);
        self.set_floating(id, !floating)
    }

    pub fn toggle_floating_focused(&mut self) -> Result<()> {
        match self.state.focused_client() {
            Some(id) => self.toggle_floating(id),
            None => Ok(()),
        }
    }

    /// Resize a floating client's `want` geometry by a (width, height) delta
    /// and re-run layout. A no-op for tiled clients, whose geometry is
    /// dictated by the group's [Split].
    pub fn resize_floating(&mut self, id: Xid, dw: i32, dh: i32) -> Result<()> {
        if let Some(w) = self.state.windows.get_mut(&id) {
            w.geometry.want.w = w.geometry.want.w.saturating_add_signed(dw);
            w.geometry.want.h = w.geometry.want.h.saturating_add_signed(dh);
        }
        self.refresh_all()
    }

    /// Move a floating client's `want` geometry by an (x, y) delta and
    /// re-run layout.
    pub fn reposition_floating(&mut self, id: Xid, dx: i32, dy: i32) -> Result<()> {
        if let Some(w) = self.state.windows.get_mut(&id) {
            w.geometry.want.x = w.geometry.want.x.saturating_add_signed(dx);
            w.geometry.want.y = w.geometry.want.y.saturating_add_signed(dy);
        }
        self.refresh_all()
    }

    /// Move input focus to the next (or previous) client in the focused
    /// group's stacking order. The border/`has_focus` bookkeeping happens
    /// when the resulting `FocusIn` event comes back around the event loop.
    pub fn focus_adjacent(&mut self, next: bool) -> Result<()> {
        let group = &self.state.groups.groups[self.state.groups.focused];
        let target = match self.state.focused_client() {
            Some(current) if group.contains(current) => {
                if next { group.focus_next(current) } else { group.focus_prev(current) }
            }
            _ => group.focus_target(),
        };

        match target {
            Some(id) => self.x.focus(id),
            None => Ok(()),
        }
    }

    /// Switch the currently focused group's screen to `name`, per
    /// [GroupManager::cmd_switch].
    pub fn switch_group(&mut self, name: &str) -> Result<()> {
        let Some(target) = self.state.group_named(name) else {
            return Ok(());
        };
        let on_screen = self
            .state
            .screens
            .screen_for_group(self.state.groups.focused)
            .unwrap_or(0);

        let State { groups, screens, registry, bus, .. } = &mut self.state;
        groups.cmd_switch(target, on_screen, screens, registry, bus);
        self.refresh_all()
    }

    /// Move the focused client to group `name` and follow it there.
    pub fn move_focused_to_group(&mut self, name: &str) -> Result<()> {
        let Some(to) = self.state.group_named(name) else {
            return Ok(());
        };
        let Some(client) = self.state.focused_client() else {
            return Ok(());
        };
        let Some(from) = self.state.groups.group_of(client) else {
            return Ok(());
        };

        self.state.groups.cmd_move_window_to(client, from, to);
        if let Some(w) = self.state.windows.get_mut(&client) {
            w.group = Some(to);
            w.lprops.group = Some(to);
        }
        self.switch_group(&self.state.config.group_names[to].clone())
    }

    /// Replace the focused group's layout outright.
    pub fn set_layout(&mut self, layout: Split) -> Result<()> {
        let group = self.state.groups.focused;
        self.state.groups.cmd_set_layout(group, layout);
        self.refresh_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_starts_with_a_single_flexible_stack() {
        let mut split = default_layout();
        split.set_bounds(Rect::new(0, 0, 800, 600));
        assert!(split.add(Xid(1), None));
        let boxes = split.layout();
        assert_eq!(boxes, vec![(Xid(1), Rect::new(0, 0, 800, 600))]);
    }
}
