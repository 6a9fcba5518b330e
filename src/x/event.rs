//! Data types for working with X events
use crate::{
    core::bindings::{KeyCode, MouseEvent},
    pure::geometry::{Point, Rect},
    Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wrapper around the low level X event types that the window manager responds to.
///
/// This is a closed set: backends are expected to drop any event kind not listed here
/// before it reaches the dispatcher.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// A grabbed mouse button has been pressed
    ButtonPress(MouseEvent),
    /// A grabbed mouse button has been released
    ButtonRelease(MouseEvent),
    /// A message has been sent to a particular client
    ClientMessage(ClientMessage),
    /// Client config has changed in some way
    ConfigureNotify(ConfigureEvent),
    /// A client is requesting to be repositioned
    ConfigureRequest(ConfigureRequest),
    /// A client window has been closed
    Destroy(Xid),
    /// The mouse pointer has entered a new window
    Enter(PointerChange),
    /// A part or all of a window has become visible
    Expose(ExposeEvent),
    /// A window has received input focus
    FocusIn(Xid),
    /// A grabbed key combination has been entered by the user
    KeyPress(KeyCode),
    /// The keyboard, modifier or pointer mapping has changed
    MappingNotify(MappingKind),
    /// A client window is requesting to be positioned and rendered on the screen.
    MapRequest(Xid),
    /// The mouse has moved
    MotionNotify(MotionEvent),
    /// A window property has changed
    PropertyNotify(PropertyEvent),
    /// A window has been unmapped
    UnmapNotify(UnmapEvent),
}

impl XEvent {
    /// The event kinds that are serviced by the normal handlers while a pointer drag
    /// is in progress.
    pub fn is_interaction_passthrough(&self) -> bool {
        matches!(
            self,
            Self::ConfigureRequest(_) | Self::Expose(_) | Self::MapRequest(_)
        )
    }
}

/// A client message that needs to be parsed and handled based on its type
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    /// The ID of the window that sent the message
    pub id: Xid,
    /// The data type being set
    pub dtype: String,
    /// The raw data being sent in this message
    pub data: [u32; 5],
}

impl ClientMessage {
    /// Build a new message for the given client.
    pub fn new(id: Xid, dtype: impl Into<String>, data: [u32; 5]) -> Self {
        Self {
            id,
            dtype: dtype.into(),
            data,
        }
    }
}

/// A configure event notifying that a window's geometry has changed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// The ID of the window that had a property changed
    pub id: Xid,
    /// The new window size
    pub r: Rect,
    /// Is this window the root window?
    pub is_root: bool,
}

/// A client request to change its geometry or stacking. Only the fields that were
/// set in the request's value mask are `Some`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    /// The ID of the window making the request
    pub id: Xid,
    /// Requested x position
    pub x: Option<i32>,
    /// Requested y position
    pub y: Option<i32>,
    /// Requested width
    pub w: Option<i32>,
    /// Requested height
    pub h: Option<i32>,
    /// Requested border width
    pub border: Option<i32>,
    /// Sibling window for stacking requests
    pub sibling: Option<Xid>,
    /// Raw stack mode for stacking requests
    pub stack_mode: Option<u8>,
}

/// How a pointer crossing event was generated
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    /// Ordinary pointer motion
    Normal,
    /// A pointer grab was activated
    Grab,
    /// A pointer grab was released
    Ungrab,
    /// Motion while a grab is held
    WhileGrabbed,
}

/// A notification that the mouse pointer has entered a window
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerChange {
    /// The ID of the window that was entered
    pub id: Xid,
    /// Absolute coordinate of the event
    pub abs: Point,
    /// The crossing mode
    pub mode: NotifyMode,
    /// Whether the pointer moved into this window from one of its own children
    pub inferior: bool,
}

/// A part or all of a window has been exposed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    /// The ID of the window that has been exposed
    pub id: Xid,
    /// The exposed region
    pub r: Rect,
    /// The number of remaining pending expose events to process
    pub count: usize,
}

/// The kind of mapping that changed in a MappingNotify event
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// Modifier keys were remapped
    Modifier,
    /// Keyboard key codes were remapped
    Keyboard,
    /// Pointer buttons were remapped
    Pointer,
}

/// Pointer motion over a window
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    /// The window the motion was reported against
    pub id: Xid,
    /// Absolute coordinate of the pointer
    pub abs: Point,
    /// Server timestamp in milliseconds
    pub time: u32,
}

/// A property change on a known client
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    /// The ID of the window that had a property changed
    pub id: Xid,
    /// The property that changed
    pub atom: String,
    /// Is this window the root window?
    pub is_root: bool,
    /// Was the property deleted rather than set?
    pub deleted: bool,
}

/// A window was unmapped
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmapEvent {
    /// The ID of the unmapped window
    pub id: Xid,
    /// Whether the event was synthesised by a client rather than the server
    pub synthetic: bool,
}

/// Request opcodes that are referenced by the error allow-list
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// ConfigureWindow
    ConfigureWindow,
    /// MapWindow
    MapWindow,
    /// GrabButton
    GrabButton,
    /// GrabKey
    GrabKey,
    /// SetInputFocus
    SetInputFocus,
    /// CopyArea
    CopyArea,
    /// PolySegment
    PolySegment,
    /// PolyFillRectangle
    PolyFillRectangle,
    /// PolyText8
    PolyText8,
    /// Any other request opcode
    Other(u8),
}

impl From<u8> for Request {
    fn from(opcode: u8) -> Self {
        match opcode {
            8 => Self::MapWindow,
            12 => Self::ConfigureWindow,
            28 => Self::GrabButton,
            33 => Self::GrabKey,
            42 => Self::SetInputFocus,
            62 => Self::CopyArea,
            66 => Self::PolySegment,
            70 => Self::PolyFillRectangle,
            74 => Self::PolyText8,
            n => Self::Other(n),
        }
    }
}

/// Core protocol error codes that are referenced by the error allow-list
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// BadWindow
    BadWindow,
    /// BadMatch
    BadMatch,
    /// BadDrawable
    BadDrawable,
    /// BadAccess
    BadAccess,
    /// Any other error code
    Other(u8),
}

impl From<u8> for ErrorCode {
    fn from(code: u8) -> Self {
        match code {
            3 => Self::BadWindow,
            8 => Self::BadMatch,
            9 => Self::BadDrawable,
            10 => Self::BadAccess,
            n => Self::Other(n),
        }
    }
}

/// An error reply from the display server.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{code:?} in response to {request:?}")]
pub struct ProtocolError {
    /// The request that triggered the error
    pub request: Request,
    /// The error code returned
    pub code: ErrorCode,
}

impl ProtocolError {
    /// There is no way to check for a window having been destroyed before issuing a
    /// request against it so the following errors are expected and ignored:
    ///
    /// - BadWindow for any request
    /// - BadMatch for SetInputFocus and ConfigureWindow
    /// - BadDrawable for PolyText8, PolyFillRectangle, PolySegment and CopyArea
    /// - BadAccess for GrabButton and GrabKey
    pub fn is_tolerated(&self) -> bool {
        use ErrorCode::*;
        use Request::*;

        matches!(
            (self.code, self.request),
            (BadWindow, _)
                | (BadMatch, SetInputFocus | ConfigureWindow)
                | (BadDrawable, PolyText8 | PolyFillRectangle | PolySegment | CopyArea)
                | (BadAccess, GrabButton | GrabKey)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(3, 1, true; "bad window for anything")]
    #[test_case(8, 42, true; "bad match set input focus")]
    #[test_case(8, 12, true; "bad match configure window")]
    #[test_case(8, 8, false; "bad match map window")]
    #[test_case(9, 74, true; "bad drawable poly text")]
    #[test_case(9, 12, false; "bad drawable configure window")]
    #[test_case(10, 28, true; "bad access grab button")]
    #[test_case(10, 33, true; "bad access grab key")]
    #[test_case(10, 42, false; "bad access set input focus")]
    #[test_case(2, 12, false; "bad value")]
    #[test]
    fn error_allow_list(code: u8, opcode: u8, tolerated: bool) {
        let e = ProtocolError {
            request: opcode.into(),
            code: code.into(),
        };

        assert_eq!(e.is_tolerated(), tolerated);
    }
}
