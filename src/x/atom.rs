//! X atom names this engine cares about. Grouped as a `strum` enum so the
//! atom cache gets type safety for the handful of names the core reads or
//! writes, while still accepting the full universe of interned atoms by id.
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    #[strum(serialize = "ATOM")]
    Atom,
    #[strum(serialize = "ATOM_WINDOW")]
    Window,
    #[strum(serialize = "ATOM_CARDINAL")]
    Cardinal,
    #[strum(serialize = "MANAGER")]
    Manager,
    #[strum(serialize = "UTF8_STRING")]
    Utf8String,
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    #[strum(serialize = "WM_STATE")]
    WmState,
    #[strum(serialize = "WM_NAME")]
    WmName,
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    #[strum(serialize = "WM_TAKE_FOCUS")]
    WmTakeFocus,
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    #[strum(serialize = "_NET_CLIENT_LIST_STACKING")]
    NetClientListStacking,
    #[strum(serialize = "_NET_CURRENT_DESKTOP")]
    NetCurrentDesktop,
    #[strum(serialize = "_NET_DESKTOP_NAMES")]
    NetDesktopNames,
    #[strum(serialize = "_NET_NUMBER_OF_DESKTOPS")]
    NetNumberOfDesktops,
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    #[strum(serialize = "_NET_WM_DESKTOP")]
    NetWmDesktop,
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    #[strum(serialize = "_NET_WM_ICON")]
    NetWmIcon,
    #[strum(serialize = "_NET_WM_WINDOW_ROLE")]
    NetWmWindowRole,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DESKTOP")]
    NetWindowTypeDesktop,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DOCK")]
    NetWindowTypeDock,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_TOOLBAR")]
    NetWindowTypeToolbar,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_MENU")]
    NetWindowTypeMenu,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_UTILITY")]
    NetWindowTypeUtility,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_SPLASH")]
    NetWindowTypeSplash,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWindowTypeDialog,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_NOTIFICATION")]
    NetWindowTypeNotification,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_NORMAL")]
    NetWindowTypeNormal,
}

/// Window types the classifier floats by default (spec §4.8's
/// `match-type` primitive is keyed against this universe).
pub const AUTO_FLOAT_WINDOW_TYPES: &[Atom] = &[
    Atom::NetWindowTypeDialog,
    Atom::NetWindowTypeUtility,
    Atom::NetWindowTypeSplash,
    Atom::NetWindowTypeToolbar,
    Atom::NetWindowTypeMenu,
    Atom::NetWindowTypeNotification,
];

/// EWMH atoms this surface advertises on `_NET_SUPPORTED` (spec §4.10).
pub const EWMH_SUPPORTED_ATOMS: &[Atom] = &[
    Atom::NetActiveWindow,
    Atom::NetClientList,
    Atom::NetClientListStacking,
    Atom::NetCurrentDesktop,
    Atom::NetDesktopNames,
    Atom::NetNumberOfDesktops,
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetWmName,
    Atom::NetWmState,
    Atom::NetWmStateFullscreen,
    Atom::NetWmWindowType,
    Atom::NetWmIcon,
];

/// The reserved property-name prefix used to round-trip layout properties
/// across a manager restart (spec §4.10, §9).
pub const LP_PROPERTY_PREFIX: &str = "_TN_LP_";

/// `_TN_LP_<UPPER>` for a given [crate::pure::window::LayoutProps] field name.
pub fn lp_property_name(field: &str) -> String {
    format!("{LP_PROPERTY_PREFIX}{}", field.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn atom_names_round_trip() {
        assert_eq!(Atom::from_str("WM_STATE").unwrap(), Atom::WmState);
        assert_eq!(Atom::WmState.as_ref(), "WM_STATE");
    }

    #[test]
    fn lp_property_name_uppercases_and_prefixes() {
        assert_eq!(lp_property_name("floating"), "_TN_LP_FLOATING");
    }
}
