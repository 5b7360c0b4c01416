//! Data types for working with X events.
use crate::{
    core::bindings::{KeyCode, MouseEvent},
    pure::geometry::{Point, Rect},
    x::{Atom, XConn},
    Result, Xid,
};
use std::convert::TryFrom;

/// Wrapper around the low level X event types that correspond to request /
/// response data when communicating with the X server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XEvent {
    ClientMessage(ClientMessage),
    ConfigureNotify(ConfigureEvent),
    ConfigureRequest(ConfigureEvent),
    CreateNotify(Xid),
    Enter(PointerChange),
    Expose(ExposeEvent),
    FocusIn(Xid),
    FocusOut(Xid),
    Destroy(Xid),
    KeyPress(KeyCode),
    Leave(PointerChange),
    MappingNotify,
    MapRequest(Xid),
    MouseEvent(MouseEvent),
    PropertyNotify(PropertyEvent),
    RandrNotify,
    ScreenChange,
    UnmapNotify(Xid),
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;

        match self {
            ClientMessage(_) => write!(f, "ClientMessage"),
            ConfigureNotify(_) => write!(f, "ConfigureNotify"),
            ConfigureRequest(_) => write!(f, "ConfigureRequest"),
            CreateNotify(_) => write!(f, "CreateNotify"),
            Enter(_) => write!(f, "Enter"),
            Expose(_) => write!(f, "Expose"),
            FocusIn(_) => write!(f, "FocusIn"),
            FocusOut(_) => write!(f, "FocusOut"),
            Destroy(_) => write!(f, "Destroy"),
            KeyPress(_) => write!(f, "KeyPress"),
            Leave(_) => write!(f, "Leave"),
            MappingNotify => write!(f, "MappingNotify"),
            MapRequest(_) => write!(f, "MapRequest"),
            MouseEvent(_) => write!(f, "MouseEvent"),
            PropertyNotify(_) => write!(f, "PropertyNotify"),
            RandrNotify => write!(f, "RandrNotify"),
            ScreenChange => write!(f, "ScreenChange"),
            UnmapNotify(_) => write!(f, "UnmapNotify"),
        }
    }
}

/// Client message formats this manager sends of its own accord.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientMessageKind {
    /// Politely ask a client to close via `WM_DELETE_WINDOW`.
    DeleteWindow(Xid),
    /// Request that a client take input focus via `WM_TAKE_FOCUS`.
    TakeFocus(Xid),
}

impl ClientMessageKind {
    /// Build the default [ClientMessage] for this kind, as specified by
    /// ICCCM §4.2.8 (the `WM_PROTOCOLS` message format).
    pub fn as_message<X>(&self, q: &X) -> Result<ClientMessage>
    where
        X: XConn,
    {
        let proto_msg = |id: Xid, atom: Atom| {
            let proto = Atom::WmProtocols.as_ref();
            let data = &[*q.intern_atom(atom.as_ref())?, 0, 0, 0, 0];
            let mask = ClientEventMask::NoEventMask;

            Ok(ClientMessage::new(id, mask, proto, data.into()))
        };

        match self {
            ClientMessageKind::DeleteWindow(id) => proto_msg(*id, Atom::WmDeleteWindow),
            ClientMessageKind::TakeFocus(id) => proto_msg(*id, Atom::WmTakeFocus),
        }
    }
}

/// Event masks used when sending client events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientEventMask {
    SubstructureNotify,
    StructureNotify,
    NoEventMask,
}

/// The raw data contained in a [ClientMessage].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientMessageData {
    U8([u8; 20]),
    U16([u16; 10]),
    U32([u32; 5]),
}

macro_rules! cast_slice {
    ($s:expr, $t:ty) => {
        $s.iter().map(|&v| v as $t).collect::<Vec<$t>>()
    };
}

impl ClientMessageData {
    pub fn as_usize(&self) -> Vec<usize> {
        match self {
            Self::U8(data) => cast_slice!(data, usize),
            Self::U16(data) => cast_slice!(data, usize),
            Self::U32(data) => cast_slice!(data, usize),
        }
    }
}

macro_rules! __impl_client_message_data(
    { $t:ty; $count:expr, $variant:expr, $method:ident } => {
        impl ClientMessageData {
            pub fn $method(&self) -> Vec<$t> {
                match self {
                    Self::U8(data) => cast_slice!(data, $t),
                    Self::U16(data) => cast_slice!(data, $t),
                    Self::U32(data) => cast_slice!(data, $t),
                }
            }
        }
        impl From<[$t; $count]> for ClientMessageData {
            fn from(data: [$t; $count]) -> Self {
                $variant(data)
            }
        }
        impl From<&[$t; $count]> for ClientMessageData {
            fn from(data: &[$t; $count]) -> Self {
                $variant(*data)
            }
        }
        impl TryFrom<&[$t]> for ClientMessageData {
            type Error = std::array::TryFromSliceError;

            fn try_from(data: &[$t]) -> std::result::Result<Self, Self::Error> {
                Ok($variant(<[$t; $count]>::try_from(data)?))
            }
        }
    }
);

__impl_client_message_data!(u8; 20, ClientMessageData::U8, as_u8);
__impl_client_message_data!(u16; 10, ClientMessageData::U16, as_u16);
__impl_client_message_data!(u32; 5, ClientMessageData::U32, as_u32);

/// A client message that needs to be parsed and handled based on its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientMessage {
    pub id: Xid,
    pub mask: ClientEventMask,
    pub dtype: String,
    pub data: ClientMessageData,
}

impl ClientMessage {
    pub fn new(id: Xid, mask: ClientEventMask, dtype: impl Into<String>, data: ClientMessageData) -> Self {
        Self {
            id,
            mask,
            dtype: dtype.into(),
            data,
        }
    }
}

/// A configure request or notification when a client changes position or size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigureEvent {
    pub id: Xid,
    pub r: Rect,
    pub is_root: bool,
}

/// A notification that a window has become visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExposeEvent {
    pub id: Xid,
    pub r: Rect,
    pub count: usize,
}

/// A notification that the mouse pointer has entered or left a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerChange {
    pub id: Xid,
    pub abs: Point,
    pub relative: Point,
    pub same_screen: bool,
}

/// A property change on a known client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyEvent {
    pub id: Xid,
    pub atom: String,
    pub is_root: bool,
}
