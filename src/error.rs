//! The crate-wide error type.
use crate::pure::window::Xid;

/// Errors raised anywhere in the window-management engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request to the X server failed at the protocol level.
    #[error("X protocol error ({kind}): {params}")]
    XProto { kind: String, params: String },

    /// A lookup (window, group, stack, command object…) came up empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// The client died in the window between an event firing and its
    /// handler running; this is expected and handled by logging at debug.
    #[error("client {0} died before its event could be handled")]
    ClientDied(Xid),

    /// A window is referenced that the engine never built a [crate::pure::Window]
    /// record for.
    #[error("{0} is not a known client window")]
    UnknownClient(Xid),

    /// A window operation was attempted on a client the engine knows about
    /// but has not (yet, or any longer) framed and added to a group.
    #[error("{0} is not currently managed")]
    UnmanagedWindow(Xid),

    /// Startup-time configuration was invalid; aborts `WindowManager::new`.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An X extension this build depends on (RandR, SHM, XTest, the
    /// synaptics shared-memory segment) was not present on the running
    /// server/driver.
    #[error("required driver/extension missing: {0}")]
    DriverMissing(&'static str),

    /// A hex color string was malformed.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// Parsing a key spec (`<mods-sym>`) failed.
    #[error("invalid key spec: {0}")]
    InvalidKeySpec(String),

    /// Parsing an [crate::x::Atom] name failed.
    #[error("{0}")]
    Strum(#[from] strum::ParseError),

    /// An integer conversion failed while decoding a property or parsing a
    /// color string.
    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// An IO error, typically from the touchpad gesture shared-memory poll
    /// or the command-socket-free process bits we still own (SIGCHLD setup).
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A generic error for user code (hooks, gadgets) needing to construct a
    /// simple [Error] without a dedicated variant.
    #[error("{0}")]
    Raw(String),

    /// A [crate::x::mock::MockXConn] method was called without a test
    /// providing an override for it.
    #[error("mock XConn method was not implemented by this test")]
    UnimplementedMock,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
