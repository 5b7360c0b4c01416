//! Built-in functionality for the window manager.
//!
//! The code in this module is built using the APIs available to users
//! and provided as a minimal "out of the box" experience for using the
//! window manager.
//!
//! More advanced functionality is available via the `extensions` module.
pub mod actions;
pub mod hooks;
pub mod layout;
