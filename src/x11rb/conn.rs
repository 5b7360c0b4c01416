//! The real [XConn] implementation, talking to an X server over `x11rb`.
use crate::{
    core::bindings::{
        lock_mask_combinations, mask_ignoring_locks, KeyCode, ModifierKey, MouseButton, MouseEvent,
        MouseEventKind, MouseState,
    },
    pure::geometry::{Point, Rect},
    x::{
        atom::Atom,
        event::{ClientMessage, ClientMessageData, ClientMessageKind, ConfigureEvent, ExposeEvent, PointerChange, PropertyEvent, XEvent},
        property::{
            decode_wm_hints, decode_wm_normal_hints, MapState as OurMapState, Prop, WindowAttributes,
            WindowClass as OurWindowClass, WindowState,
        },
        ClientAttr, ClientConfig, WinType, XConn,
    },
    Error, Result, Xid,
};
use std::{cell::RefCell, collections::HashMap, str::FromStr};
use strum::IntoEnumIterator;
use tracing::{trace, warn};
use x11rb::{
    connection::Connection,
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigureWindowAux, ConnectionExt as _,
            EventMask, GrabMode, InputFocus, MapState as XMapState, PropMode, SetMode, StackMode,
            WindowClass as XWindowClass,
        },
        Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

fn xerr<E: std::fmt::Display>(e: E) -> Error {
    Error::XProto { kind: "x11rb".to_string(), params: e.to_string() }
}

const BASE_EVENT_MASK: EventMask = EventMask::from_bits_truncate(
    EventMask::ENTER_WINDOW.bits()
        | EventMask::LEAVE_WINDOW.bits()
        | EventMask::PROPERTY_CHANGE.bits()
        | EventMask::STRUCTURE_NOTIFY.bits()
        | EventMask::FOCUS_CHANGE.bits(),
);

const ROOT_EVENT_MASK: EventMask = EventMask::from_bits_truncate(
    EventMask::PROPERTY_CHANGE.bits()
        | EventMask::SUBSTRUCTURE_REDIRECT.bits()
        | EventMask::SUBSTRUCTURE_NOTIFY.bits()
        | EventMask::BUTTON_MOTION.bits(),
);

const MOUSE_GRAB_MASK: EventMask = EventMask::from_bits_truncate(
    EventMask::BUTTON_PRESS.bits() | EventMask::BUTTON_RELEASE.bits() | EventMask::BUTTON_MOTION.bits(),
);

/// An `XConn` implementation backed by a live connection to an X server.
///
/// Atom lookups are cached in both directions so that decoding properties
/// (which come back as raw atom ids) doesn't round-trip to the server on
/// every call.
pub struct X11rbConn {
    conn: RustConnection,
    root: Xid,
    check_win: Xid,
    atom_ids: HashMap<Atom, u32>,
    by_name: RefCell<HashMap<String, u32>>,
    by_id: RefCell<HashMap<u32, String>>,
}

impl X11rbConn {
    /// Connect to the X server named by `$DISPLAY`, intern every atom this
    /// engine knows about up front, select for RandR output-change events,
    /// and create the hidden check window used for `_NET_SUPPORTING_WM_CHECK`.
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).map_err(xerr)?;
        let root = conn.setup().roots[screen_num].root;

        conn.extension_information(randr::X11_EXTENSION_NAME)
            .map_err(xerr)?
            .ok_or(Error::DriverMissing("RandR"))?;

        let mask = randr::NotifyMask::OUTPUT_CHANGE | randr::NotifyMask::CRTC_CHANGE | randr::NotifyMask::SCREEN_CHANGE;
        conn.randr_select_input(root, mask).map_err(xerr)?;

        let cookies: Vec<_> = Atom::iter()
            .map(|a| conn.intern_atom(false, a.as_ref().as_bytes()).map(|c| (a, c)))
            .collect::<std::result::Result<_, _>>()
            .map_err(xerr)?;
        let atom_ids = cookies
            .into_iter()
            .map(|(a, c)| Ok((a, c.reply().map_err(xerr)?.atom)))
            .collect::<Result<HashMap<_, _>>>()?;

        let check_win = conn.generate_id().map_err(xerr)?;
        let aux = ChangeWindowAttributesAux::new().override_redirect(1.into());
        conn.create_window(0, check_win, root, 0, 0, 1, 1, 0, XWindowClass::INPUT_OUTPUT, 0, &Default::default())
            .map_err(xerr)?;
        conn.change_window_attributes(check_win, &aux).map_err(xerr)?;
        conn.flush().map_err(xerr)?;

        let by_name = atom_ids.iter().map(|(a, &id)| (a.as_ref().to_string(), id)).collect();
        let by_id = atom_ids.iter().map(|(a, &id)| (id, a.as_ref().to_string())).collect();

        Ok(Self {
            conn,
            root: Xid(root),
            check_win: Xid(check_win),
            atom_ids,
            by_name: RefCell::new(by_name),
            by_id: RefCell::new(by_id),
        })
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        self.atom_ids[&atom]
    }

    fn atom_id(&self, name: &str) -> Result<u32> {
        if let Ok(known) = Atom::from_str(name) {
            return Ok(self.known_atom(known));
        }
        if let Some(&id) = self.by_name.borrow().get(name) {
            return Ok(id);
        }

        let id = self.conn.intern_atom(false, name.as_bytes()).map_err(xerr)?.reply().map_err(xerr)?.atom;
        self.by_name.borrow_mut().insert(name.to_string(), id);
        self.by_id.borrow_mut().insert(id, name.to_string());
        Ok(id)
    }

    fn atom_name_cached(&self, id: u32) -> Result<String> {
        if let Some(name) = self.by_id.borrow().get(&id) {
            return Ok(name.clone());
        }

        let name = self.conn.get_atom_name(id).map_err(xerr)?.reply().map_err(xerr)?;
        let name = String::from_utf8(name.name).map_err(|e| xerr(e))?;
        self.by_name.borrow_mut().insert(name.clone(), id);
        self.by_id.borrow_mut().insert(id, name.clone());
        Ok(name)
    }

    fn decode_prop(&self, prop_type: u32, value8: Vec<u8>, value32: Vec<u32>) -> Option<Prop> {
        if prop_type == self.known_atom(Atom::Utf8String) || prop_type == u32::from(AtomEnum::STRING) {
            let s = String::from_utf8_lossy(&value8).to_string();
            let strs = s.split('\0').filter(|s| !s.is_empty()).map(str::to_string).collect();
            return Some(Prop::Utf8String(strs));
        }

        if prop_type == u32::from(AtomEnum::ATOM) {
            let strs = value32
                .into_iter()
                .filter_map(|a| self.atom_name_cached(a).ok())
                .collect();
            return Some(Prop::Atom(strs));
        }

        if prop_type == u32::from(AtomEnum::WINDOW) {
            return Some(Prop::Window(value32.into_iter().map(Xid).collect()));
        }

        if prop_type == u32::from(AtomEnum::CARDINAL) {
            return value32.first().copied().map(Prop::Cardinal);
        }

        if prop_type == self.known_atom(Atom::WmHints) {
            return decode_wm_hints(&value32).map(Prop::WmHints);
        }

        if prop_type == self.known_atom(Atom::WmNormalHints) {
            return Some(Prop::WmNormalHints(decode_wm_normal_hints(&value32)));
        }

        if !value32.is_empty() {
            return Some(Prop::Bytes(value32));
        }

        None
    }
}

impl XConn for X11rbConn {
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        let resources = self.conn.randr_get_screen_resources(self.root.0).map_err(xerr)?.reply().map_err(xerr)?;
        let cookies: Vec<_> = resources
            .crtcs
            .iter()
            .map(|&crtc| self.conn.randr_get_crtc_info(crtc, 0).map_err(xerr))
            .collect::<Result<_>>()?;

        let rects = cookies
            .into_iter()
            .filter_map(|c| c.reply().ok())
            .filter(|r| r.width > 0 && r.height > 0)
            .map(|r| Rect::new(r.x as u32, r.y as u32, r.width as u32, r.height as u32))
            .collect();

        Ok(rects)
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root.0).map_err(xerr)?.reply().map_err(xerr)?;
        Ok(Point::new(reply.root_x as u32, reply.root_y as u32))
    }

    fn grab(&self, key_codes: &[KeyCode], mouse_states: &[MouseState]) -> Result<()> {
        for key in key_codes {
            for extra in lock_mask_combinations() {
                self.conn
                    .grab_key(false, self.root.0, key.mask | extra, key.code, GrabMode::ASYNC, GrabMode::ASYNC)
                    .map_err(xerr)?;
            }
        }

        for state in mouse_states {
            let modmask = state.modifiers.iter().fold(0u16, |acc, m| acc | m.mask_bit());
            let button = mouse_button_code(&state.button);
            for extra in lock_mask_combinations() {
                self.conn
                    .grab_button(
                        false,
                        self.root.0,
                        MOUSE_GRAB_MASK.into(),
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                        NONE,
                        NONE,
                        button,
                        modmask | extra,
                    )
                    .map_err(xerr)?;
            }
        }

        let aux = ChangeWindowAttributesAux::new().event_mask(ROOT_EVENT_MASK);
        self.conn.change_window_attributes(self.root.0, &aux).map_err(xerr)?;
        self.conn.flush().map_err(xerr)
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            let event = self.conn.wait_for_event().map_err(xerr)?;
            if let Some(xevent) = self.translate_event(event)? {
                return Ok(xevent);
            }
        }
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }

    fn intern_atom(&self, atom: &str) -> Result<Xid> {
        self.atom_id(atom).map(Xid)
    }

    fn atom_name(&self, xid: Xid) -> Result<String> {
        self.atom_name_cached(xid.0)
    }

    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        let geo = self.conn.get_geometry(client.0).map_err(xerr)?.reply().map_err(xerr)?;
        Ok(Rect::new(geo.x as u32, geo.y as u32, geo.width as u32, geo.height as u32))
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(self.root.0).map_err(xerr)?.reply().map_err(xerr)?;
        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn map(&self, client: Xid) -> Result<()> {
        self.conn.map_window(client.0).map_err(xerr)?;
        Ok(())
    }

    fn unmap(&self, client: Xid) -> Result<()> {
        self.conn.unmap_window(client.0).map_err(xerr)?;
        Ok(())
    }

    fn kill(&self, client: Xid) -> Result<()> {
        self.conn.kill_client(client.0).map_err(xerr)?;
        Ok(())
    }

    fn focus(&self, client: Xid) -> Result<()> {
        self.conn.set_input_focus(InputFocus::PARENT, client.0, CURRENT_TIME).map_err(xerr)?;
        let atom = self.known_atom(Atom::NetActiveWindow);
        self.conn
            .change_property32(PropMode::REPLACE, self.root.0, atom, AtomEnum::WINDOW, &[client.0])
            .map_err(xerr)?;
        Ok(())
    }

    fn get_prop(&self, client: Xid, prop_name: &str) -> Result<Option<Prop>> {
        let atom = self.atom_id(prop_name)?;
        let reply = self
            .conn
            .get_property(false, client.0, atom, AtomEnum::ANY, 0, u32::MAX / 4)
            .map_err(xerr)?
            .reply()
            .map_err(xerr)?;

        if reply.value_len == 0 {
            return Ok(None);
        }

        let value8 = reply.value8().map(|i| i.collect()).unwrap_or_default();
        let value32 = reply.value32().map(|i| i.collect()).unwrap_or_default();
        Ok(self.decode_prop(reply.type_, value8, value32))
    }

    fn list_props(&self, client: Xid) -> Result<Vec<String>> {
        let reply = self.conn.list_properties(client.0).map_err(xerr)?.reply().map_err(xerr)?;
        reply.atoms.into_iter().map(|a| self.atom_name_cached(a)).collect()
    }

    fn get_wm_state(&self, client: Xid) -> Result<Option<WindowState>> {
        match self.get_prop(client, Atom::WmState.as_ref())? {
            Some(Prop::Bytes(raw)) if !raw.is_empty() => Ok(Some(match raw[0] {
                1 => WindowState::Normal,
                3 => WindowState::Iconic,
                _ => WindowState::Withdrawn,
            })),
            _ => Ok(None),
        }
    }

    fn get_window_attributes(&self, client: Xid) -> Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(client.0).map_err(xerr)?.reply().map_err(xerr)?;

        let map_state = match reply.map_state {
            XMapState::UNMAPPED => OurMapState::Unmapped,
            XMapState::UNVIEWABLE => OurMapState::UnViewable,
            _ => OurMapState::Viewable,
        };
        let window_class = match reply.class {
            XWindowClass::INPUT_ONLY => OurWindowClass::InputOnly,
            XWindowClass::INPUT_OUTPUT => OurWindowClass::InputOutput,
            _ => OurWindowClass::CopyFromParent,
        };

        Ok(WindowAttributes::new(reply.override_redirect, map_state, window_class))
    }

    fn set_wm_state(&self, client: Xid, wm_state: WindowState) -> Result<()> {
        let (state, icon) = wm_state.to_wire();
        let atom = self.known_atom(Atom::WmState);
        self.conn
            .change_property32(PropMode::REPLACE, client.0, atom, atom, &[state, icon])
            .map_err(xerr)?;
        Ok(())
    }

    fn set_prop(&self, client: Xid, name: &str, val: Prop) -> Result<()> {
        let atom = self.atom_id(name)?;
        match val {
            Prop::Utf8String(strs) => {
                let ty = self.known_atom(Atom::Utf8String);
                let joined = strs.join("\0");
                self.conn.change_property8(PropMode::REPLACE, client.0, atom, ty, joined.as_bytes()).map_err(xerr)?;
            }
            Prop::Atom(strs) => {
                let ids = strs.iter().map(|s| self.atom_id(s)).collect::<Result<Vec<_>>>()?;
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::ATOM, &ids).map_err(xerr)?;
            }
            Prop::Window(ids) => {
                let raw: Vec<u32> = ids.iter().map(|x| x.0).collect();
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::WINDOW, &raw).map_err(xerr)?;
            }
            Prop::Cardinal(n) => {
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::CARDINAL, &[n]).map_err(xerr)?;
            }
            Prop::Bytes(raw) => {
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::CARDINAL, &raw).map_err(xerr)?;
            }
            Prop::WmHints(_) | Prop::WmNormalHints(_) => {
                return Err(Error::Raw("writing WM_HINTS/WM_NORMAL_HINTS is not supported".to_string()));
            }
        }
        Ok(())
    }

    fn delete_prop(&self, client: Xid, prop_name: &str) -> Result<()> {
        let atom = self.atom_id(prop_name)?;
        self.conn.delete_property(client.0, atom).map_err(xerr)?;
        Ok(())
    }

    fn set_client_attributes(&self, client: Xid, attrs: &[ClientAttr]) -> Result<()> {
        for attr in attrs {
            let aux = match *attr {
                ClientAttr::BorderColor(c) => ChangeWindowAttributesAux::new().border_pixel(c),
                ClientAttr::ClientEventMask => ChangeWindowAttributesAux::new().event_mask(BASE_EVENT_MASK),
                ClientAttr::ClientUnmapMask => ChangeWindowAttributesAux::new().event_mask(EventMask::NO_EVENT),
                ClientAttr::RootEventMask => ChangeWindowAttributesAux::new().event_mask(ROOT_EVENT_MASK),
            };
            self.conn.change_window_attributes(client.0, &aux).map_err(xerr)?;
        }
        Ok(())
    }

    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        for cfg in data {
            let aux = match *cfg {
                ClientConfig::BorderPx(w) => ConfigureWindowAux::new().border_width(w),
                ClientConfig::Position(r) => ConfigureWindowAux::new()
                    .x(r.x as i32)
                    .y(r.y as i32)
                    .width(r.w)
                    .height(r.h),
                ClientConfig::StackBelow(sibling) => {
                    ConfigureWindowAux::new().sibling(sibling.0).stack_mode(StackMode::BELOW)
                }
                ClientConfig::StackAbove(sibling) => {
                    ConfigureWindowAux::new().sibling(sibling.0).stack_mode(StackMode::ABOVE)
                }
                ClientConfig::StackTop => ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
                ClientConfig::StackBottom => ConfigureWindowAux::new().stack_mode(StackMode::BELOW),
            };
            self.conn.configure_window(client.0, &aux).map_err(xerr)?;
        }
        Ok(())
    }

    fn send_client_message(&self, msg: ClientMessage) -> Result<()> {
        let dtype = self.atom_id(&msg.dtype)?;
        let data: [u32; 5] = msg.data.as_u32().try_into().unwrap_or([0; 5]);
        let event = ClientMessageEvent::new(32, msg.id.0, dtype, data);
        self.conn.send_event(false, msg.id.0, EventMask::NO_EVENT, event).map_err(xerr)?;
        Ok(())
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(NONE, id.0, 0, 0, 0, 0, x, y).map_err(xerr)?;
        Ok(())
    }

    fn check_window(&self) -> Xid {
        self.check_win
    }

    fn create_window(&self, ty: WinType, r: Rect, managed: bool) -> Result<Xid> {
        let id = self.conn.generate_id().map_err(xerr)?;
        let class = match ty {
            WinType::InputOnly => XWindowClass::INPUT_ONLY,
            WinType::InputOutput(_) | WinType::CheckWin => XWindowClass::INPUT_OUTPUT,
        };

        self.conn
            .create_window(0, id, self.root.0, r.x as i16, r.y as i16, r.w as u16, r.h as u16, 0, class, 0, &Default::default())
            .map_err(xerr)?;

        if !managed {
            let aux = ChangeWindowAttributesAux::new().override_redirect(1.into());
            self.conn.change_window_attributes(id, &aux).map_err(xerr)?;
        }

        if let WinType::InputOutput(atom) = ty {
            let window_type = self.atom_id(atom.as_ref())?;
            self.conn
                .change_property32(PropMode::REPLACE, id, self.known_atom(Atom::NetWmWindowType), AtomEnum::ATOM, &[window_type])
                .map_err(xerr)?;
        }

        self.conn.flush().map_err(xerr)?;
        Ok(Xid(id))
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.conn.destroy_window(id.0).map_err(xerr)?;
        self.conn.flush().map_err(xerr)?;
        Ok(())
    }

    fn reparent_to_frame(&self, client: Xid, parent: Xid, x: i32, y: i32) -> Result<()> {
        self.conn.change_save_set(SetMode::INSERT, client.0).map_err(xerr)?;
        self.conn.reparent_window(client.0, parent.0, x as i16, y as i16).map_err(xerr)?;
        self.conn.flush().map_err(xerr)?;
        Ok(())
    }

    fn reparent_to_root(&self, client: Xid, x: i32, y: i32) -> Result<()> {
        self.conn.reparent_window(client.0, self.root.0, x as i16, y as i16).map_err(xerr)?;
        self.conn.change_save_set(SetMode::DELETE, client.0).map_err(xerr)?;
        self.conn.flush().map_err(xerr)?;
        Ok(())
    }

    fn grab_keyboard(&self) -> Result<()> {
        self.conn
            .grab_keyboard(false, self.root.0, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)
            .map_err(xerr)?
            .reply()
            .map_err(xerr)?;
        self.conn.flush().map_err(xerr)
    }

    fn ungrab_keyboard(&self) -> Result<()> {
        self.conn.ungrab_keyboard(CURRENT_TIME).map_err(xerr)?;
        self.conn.flush().map_err(xerr)
    }

    fn keysym_for_keycode(&self, code: KeyCode) -> Result<Option<u32>> {
        let setup = self.conn.setup();
        let min = setup.min_keycode;
        let max = setup.max_keycode;
        if code.code < min || code.code > max {
            return Ok(None);
        }

        let reply = self
            .conn
            .get_keyboard_mapping(code.code, 1)
            .map_err(xerr)?
            .reply()
            .map_err(xerr)?;

        if reply.keysyms_per_keycode == 0 {
            return Ok(None);
        }

        // Index 0 is the unshifted level; index 1 (if present) is the
        // shift level, which is what a KeyCode's own `mask` already tells
        // us whether to prefer.
        let shifted = code.mask & ModifierKey::Shift.mask_bit() != 0;
        let level = if shifted && reply.keysyms_per_keycode > 1 { 1 } else { 0 };
        let sym = reply.keysyms.get(level).copied().unwrap_or(0);

        Ok(if sym == 0 { None } else { Some(sym) })
    }
}

impl X11rbConn {
    /// Translate a raw `x11rb` event into our [XEvent], or `None` for events
    /// this engine ignores (returned so [XConn::next_event]'s loop can keep
    /// waiting without recursing).
    fn translate_event(&self, event: Event) -> Result<Option<XEvent>> {
        let out = match event {
            Event::ButtonPress(e) => mouse_state(e.detail, e.state)
                .map(|state| mouse_event(e.event, e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Press)),
            Event::ButtonRelease(e) => mouse_state(e.detail, e.state)
                .map(|state| mouse_event(e.event, e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Release)),
            Event::MotionNotify(e) => {
                // Motion events don't carry a button in `detail`; report button 1
                // (the only button drags originate from in this engine).
                mouse_state(1, e.state)
                    .map(|state| mouse_event(e.event, e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Motion))
            }
            Event::KeyPress(e) => {
                let code = KeyCode { mask: mask_ignoring_locks(e.state), code: e.detail };
                Some(XEvent::KeyPress(code))
            }
            Event::MapRequest(e) => Some(XEvent::MapRequest(Xid(e.window))),
            Event::EnterNotify(e) => Some(XEvent::Enter(pointer_change(e.event, e.root_x, e.root_y, e.event_x, e.event_y, e.same_screen))),
            Event::LeaveNotify(e) => Some(XEvent::Leave(pointer_change(e.event, e.root_x, e.root_y, e.event_x, e.event_y, e.same_screen))),
            Event::FocusIn(e) => Some(XEvent::FocusIn(Xid(e.event))),
            Event::FocusOut(e) => Some(XEvent::FocusOut(Xid(e.event))),
            Event::CreateNotify(e) => Some(XEvent::CreateNotify(Xid(e.window))),
            Event::DestroyNotify(e) => Some(XEvent::Destroy(Xid(e.window))),
            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify(Xid(e.window))),
            Event::MappingNotify(_) => Some(XEvent::MappingNotify),
            Event::RandrScreenChangeNotify(_) => Some(XEvent::ScreenChange),
            Event::RandrNotify(_) => Some(XEvent::RandrNotify),
            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify(ConfigureEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                is_root: e.window == self.root.0,
            })),
            Event::ConfigureRequest(e) => Some(XEvent::ConfigureRequest(ConfigureEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                is_root: e.window == self.root.0,
            })),
            Event::Expose(e) => Some(XEvent::Expose(ExposeEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                count: e.count as usize,
            })),
            Event::PropertyNotify(e) => {
                let is_root = e.window == self.root.0;
                self.atom_name_cached(e.atom)
                    .ok()
                    .map(|atom| XEvent::PropertyNotify(PropertyEvent { id: Xid(e.window), atom, is_root }))
            }
            Event::ClientMessage(e) => self.atom_name_cached(e.type_).ok().map(|dtype| {
                XEvent::ClientMessage(ClientMessage::new(
                    Xid(e.window),
                    crate::x::event::ClientEventMask::NoEventMask,
                    dtype,
                    ClientMessageData::U32(e.data.as_data32()),
                ))
            }),
            other => {
                trace!(?other, "ignoring unhandled x11 event");
                None
            }
        };

        Ok(out)
    }
}

fn mouse_button_code(button: &MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::ScrollUp => 4,
        MouseButton::ScrollDown => 5,
    }
}

fn mouse_state(detail: u8, raw_state: u16) -> Option<MouseState> {
    let button = match detail {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        4 => MouseButton::ScrollUp,
        5 => MouseButton::ScrollDown,
        _ => {
            warn!(detail, "dropping event for unknown mouse button");
            return None;
        }
    };

    let state = mask_ignoring_locks(raw_state);
    let modifiers = ModifierKey::iter().filter(|m| state & m.mask_bit() != 0).collect();
    Some(MouseState::new(button, modifiers))
}

fn mouse_event(id: u32, root_x: i16, root_y: i16, event_x: i16, event_y: i16, state: MouseState, kind: MouseEventKind) -> XEvent {
    XEvent::MouseEvent(MouseEvent {
        id: Xid(id),
        root_pt: Point::new(root_x as u32, root_y as u32),
        event_pt: Point::new(event_x as u32, event_y as u32),
        state,
        kind,
    })
}

fn pointer_change(id: u32, root_x: i16, root_y: i16, event_x: i16, event_y: i16, same_screen: bool) -> PointerChange {
    PointerChange {
        id: Xid(id),
        abs: Point::new(root_x as u32, root_y as u32),
        relative: Point::new(event_x as u32, event_y as u32),
        same_screen,
    }
}
