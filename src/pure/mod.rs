//! Side-effect-free window manager state: geometry, windows, frames, the
//! layout tree, groups and screens. Nothing in this module touches the X
//! connection; everything here is plain data and pure functions over it.
pub mod frame;
pub mod geometry;
pub mod group;
pub mod layout;
pub mod screen;
pub mod window;

#[doc(inline)]
pub use frame::{BorderColor, Frame};
#[doc(inline)]
pub use group::Group;
#[doc(inline)]
pub use layout::{Split, StackNode, StackSpec};
#[doc(inline)]
pub use screen::Screen;
#[doc(inline)]
pub use window::{Geometry, Gravity, Icon, LayoutProps, SizeHints, Window, Xid};

/// A relative position along the horizontal and vertical axes, used by
/// pointer drag quadrant selection and the touchpad gesture direction table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RelativePosition {
    /// Left of the current position
    Left,
    /// Right of the current position
    Right,
    /// Above the current position
    Above,
    /// Below the current position
    Below,
}
