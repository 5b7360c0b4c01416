//! A tiling window manager engine for X11.
//!
//! The engine is split the way the `x` module's [x::XConn] trait implies:
//! pure data and algorithms in [pure], the user-facing manager and its
//! registries in [core], X protocol plumbing behind [x], and optional pieces
//! (classifiers, gestures, gadgets) in [extensions]. [builtin] holds the
//! default layouts, key actions and configuration a binary crate wires up to
//! get a running window manager.
pub mod builtin;
pub mod color;
pub mod core;
pub mod error;
pub mod extensions;
pub mod pure;
pub mod x;
#[cfg(feature = "x11rb")]
pub mod x11rb;

#[doc(inline)]
pub use crate::core::{Config, State, WindowManager};
#[doc(inline)]
pub use color::Color;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use pure::Xid;
