//! Optional, first-party functionality layered on top of `core`/`builtin`:
//! the window classifier and the touchpad gesture recognizer.
pub mod classify;
pub mod gestures;
