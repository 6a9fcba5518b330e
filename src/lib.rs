//! tagwm: the state core of a dwm style tiling window manager
//!
//! The crate is split into four layers:
//!
//! - [pure]: side effect free client, monitor and geometry state along with the
//!   size hint engine, focus resolution and monitor reconciliation.
//! - [core]: the [WindowManager], its [State](core::State) and [Config](core::Config),
//!   user bindings, the layout trait and event dispatch.
//! - [builtin]: the stock tile, dwindle and monocle layouts and the user actions that
//!   are normally bound to keys and mouse buttons.
//! - [x]: the [XConn](x::XConn) trait that any display protocol backend needs to
//!   implement along with the event and property types that flow across it.
//!
//! Rendering of the status bar and parsing of user configuration are left to the
//! caller: see [StatusBar](core::hooks::StatusBar) for how a bar is plugged in.
#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::style,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rustdoc::all
)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

pub mod builtin;
pub mod core;
pub mod pure;
pub mod util;
pub mod x;

#[doc(inline)]
pub use crate::core::WindowManager;

use x::{atom::Atom, event::ProtocolError};

/// Error variants from the core tagwm library.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The connection to the display server was lost
    #[error("the connection to the display server has been closed")]
    ConnectionClosed,

    /// A hex literal provided to create a color was not a valid RGB or RGBA value
    #[error("invalid hex color code: {code}")]
    InvalidHexColor {
        /// The string that was used as a color
        code: String,
    },

    /// The provided configuration can not be used to run the window manager
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Raw size or WM hints data was malformed
    #[error("invalid client hints: {0}")]
    InvalidHints(String),

    /// A property was returned in a form that could not be used
    #[error("{atom} is not a valid property type for {value}")]
    InvalidPropertyData {
        /// The property that was requested
        atom: Atom,
        /// A description of what was returned instead
        value: String,
    },

    /// There were no monitors reported by the display server
    #[error("there are no monitors available")]
    NoScreens,

    /// Another window manager already has control of the root window
    #[error("another window manager is already running")]
    OtherWmRunning,

    /// An error reported by the display server in response to a request
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A mouse button number that has no [MouseButton](core::bindings::MouseButton) variant
    #[error("{0} is not a known mouse button")]
    UnknownMouseButton(u8),

    /// A requested monitor index is out of bounds
    #[error("{0} is not a known monitor index")]
    UnknownMonitor(usize),

    /// An operation was requested on a client window that is not currently managed
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// Wrapper around IO errors from spawning external programs
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around low level unix errors
    #[error(transparent)]
    Nix(#[from] nix::Error),

    /// Wrapper around strum parse errors for atom names
    #[error(transparent)]
    Strum(#[from] strum::ParseError),
}

impl Error {
    /// Errors that leave the window manager unable to continue running.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::NoScreens | Self::OtherWmRunning
        )
    }

    /// Errors that are expected to occur as a side effect of clients closing while
    /// requests targeting them are in flight. These are safe to drop silently.
    pub fn is_tolerated(&self) -> bool {
        match self {
            Self::Protocol(e) => e.is_tolerated(),
            _ => false,
        }
    }
}

/// A Result where the error type is a tagwm [Error]
pub type Result<T> = std::result::Result<T, Error>;

/// An X11 ID for a given resource
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Xid(pub(crate) u32);

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}

/// A window border colour stored as 0xRRGGBBAA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    rgba_hex: u32,
}

impl Color {
    /// Wrap an 0xRRGGBBAA value
    pub fn new_from_hex(rgba_hex: u32) -> Self {
        Self { rgba_hex }
    }

    /// The border pixel value: 0xRRGGBB with alpha dropped
    pub fn rgb_u32(&self) -> u32 {
        self.rgba_hex >> 8
    }

    /// The stored 0xRRGGBBAA value
    pub fn rgba_u32(&self) -> u32 {
        self.rgba_hex
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::new_from_hex(hex)
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        let hex = u32::from_str_radix(s.strip_prefix('#').unwrap_or(s), 16).map_err(|_| {
            Error::InvalidHexColor {
                code: s.to_string(),
            }
        })?;

        match s.trim_start_matches('#').len() {
            6 => Ok(Self::new_from_hex((hex << 8) + 0xFF)),
            8 => Ok(Self::new_from_hex(hex)),
            _ => Err(Error::InvalidHexColor {
                code: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::try_from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("#585858", 0x585858; "grey border")]
    #[test_case("#0025ff", 0x0025ff; "blue border")]
    #[test_case("0025ffff", 0x0025ff; "rgba without hash")]
    #[test]
    fn color_from_hex_str(s: &str, rgb: u32) {
        let c = Color::try_from(s).unwrap();

        assert_eq!(c.rgb_u32(), rgb);
    }

    #[test_case("#58585"; "too short")]
    #[test_case("#zzzzzz"; "not hex")]
    #[test]
    fn invalid_color_strings_are_rejected(s: &str) {
        assert!(matches!(
            Color::try_from(s),
            Err(Error::InvalidHexColor { .. })
        ));
    }

    #[test]
    fn protocol_errors_on_the_allow_list_are_tolerated() {
        use x::event::{ErrorCode, Request};

        let tolerated = Error::Protocol(ProtocolError {
            request: Request::ConfigureWindow,
            code: ErrorCode::BadMatch,
        });
        let escalated = Error::Protocol(ProtocolError {
            request: Request::MapWindow,
            code: ErrorCode::BadMatch,
        });

        assert!(tolerated.is_tolerated());
        assert!(!escalated.is_tolerated());
        assert!(!Error::ConnectionClosed.is_tolerated());
        assert!(Error::ConnectionClosed.is_fatal());
    }
}
