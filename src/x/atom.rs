//! The atoms read, written and advertised by tagwm
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every atom tagwm touches, named by its X string through strum.
///
/// [XConn][crate::x::XConn] implementations intern all of these before the first
/// property is read.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(AsRefStr, Display, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    /// Property type of EWMH text
    #[strum(serialize = "UTF8_STRING")]
    UTF8String,
    /// Instance and class names matched by rules
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    /// Protocol used to ask a client to close politely
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    /// Input and urgency hints
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    /// Legacy title, and the status text when set on the root window
    #[strum(serialize = "WM_NAME")]
    WmName,
    /// Size constraints fed to the size hints engine
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    /// Protocols a client takes part in, also the type of protocol messages
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    /// Normal, iconic or withdrawn, written by the window manager
    #[strum(serialize = "WM_STATE")]
    WmState,
    /// Protocol used to hand focus to clients that manage their own input
    #[strum(serialize = "WM_TAKE_FOCUS")]
    WmTakeFocus,
    /// Parent of a dialog, decides its tags and monitor
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    /// The focused client, kept up to date on the root window
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    /// Every managed client across all monitors
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    /// The EWMH atoms listed in [EWMH_SUPPORTED_ATOMS]
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    /// Child window proving that a compliant window manager is running
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    /// Preferred UTF-8 title
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    /// Client state list, only fullscreen is acted on
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    /// Fullscreen member of `_NET_WM_STATE`
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,
    /// Functional type of a window
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    /// Dialogs are floated when first managed
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWindowTypeDialog,
}

/// Written to `_NET_SUPPORTED` on the root window during startup
pub const EWMH_SUPPORTED_ATOMS: &[Atom] = &[
    Atom::NetActiveWindow,
    Atom::NetClientList,
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetWmName,
    Atom::NetWmState,
    Atom::NetWmStateFullscreen,
    Atom::NetWmWindowType,
    Atom::NetWindowTypeDialog,
];
