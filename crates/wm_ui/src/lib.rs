//! A bare bones toolkit for adding first-party UI surfaces to tilewm: a
//! status bar and, built on the same [`Draw`]/[`Context`] primitives, the
//! popup and sidebar gadgets in [`gadgets`].
//!
//! This crate is not a general purpose UI library. It provides just enough
//! of a drawing surface to render a row of text widgets into a dedicated,
//! unmanaged top-level window, using `Xft` for glyph rendering the way a
//! dwm-style bar does.
use tilewm::{x::XConn, Color, Xid};

pub mod bar;
pub mod core;
pub mod gadgets;

pub use crate::core::{Context, Draw, TextStyle};
pub use bar::{Position, StatusBar};
pub use gadgets::{Finder, Menu, RenameDialog, Tabs};

use bar::widgets::{ActiveWindowName, Workspaces};

/// Error variants from the wm_ui crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A null byte turned up where a C string was required.
    #[error(transparent)]
    Nul(#[from] std::ffi::NulError),

    /// Creation of a [`Color`] from a string hex code was invalid.
    #[error("invalid hex color code: {code}")]
    InvalidHexColor {
        /// The invalid string that was intended as a color hex code.
        code: String,
    },

    /// An error was returned from the [`XConn`] when interacting with the X server.
    #[error(transparent)]
    Tilewm(#[from] tilewm::Error),

    /// The X server refused to open a display connection.
    #[error("unable to open an X display connection")]
    NoDisplay,

    /// We were unable to load the requested font via Xft.
    #[error("'{font}' could not be loaded as a font")]
    UnknownFont {
        /// The font name that failed to load.
        font: String,
    },

    /// An attempt was made to work with a surface for a window that was not
    /// initialised by the [`Draw`] instance being used.
    #[error("no surface for window {id}")]
    UninitialisedSurface {
        /// The window id requested.
        id: Xid,
    },
}

/// A Result where the error type is a wm_ui [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Build a default dwm-style status bar: a workspace indicator followed by
/// the focused window's title, in `style`'s font.
pub fn status_bar<X: XConn>(
    height: u32,
    style: &TextStyle,
    highlight: impl Into<Color>,
    empty_ws: impl Into<Color>,
    position: Position,
) -> Result<StatusBar<X>> {
    let max_title_chars = 80;
    let highlight = highlight.into();

    StatusBar::try_new(
        position,
        height,
        style.bg.unwrap_or_else(|| 0x000000.into()),
        &style.font,
        vec![
            Box::new(Workspaces::new(style.clone(), highlight, empty_ws)),
            Box::new(ActiveWindowName::new(
                max_title_chars,
                TextStyle {
                    bg: Some(highlight),
                    padding: (6, 4),
                    ..style.clone()
                },
                true,
            )),
        ],
    )
}
