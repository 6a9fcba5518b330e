//! Side effect free management of internal window manager state
//!
//! Nothing in this module talks to the display server: operations on the
//! [ClientSet] update the client and monitor state and queue up any geometry changes
//! that need to be pushed out, leaving it to the [XConnExt](crate::x::XConnExt)
//! methods to flush them.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod client;
pub mod client_set;
pub mod focus;
pub mod geometry;
pub mod hints;
pub mod monitor;
pub mod reconcile;

#[doc(inline)]
pub use client::Client;
#[doc(inline)]
pub use client_set::{ClientSet, Configure, Rule, Settings};
#[doc(inline)]
pub use focus::FocusChange;
#[doc(inline)]
pub use monitor::Monitor;
#[doc(inline)]
pub use reconcile::Topology;

/// A direction to move in through the focus stack or monitor list
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Towards the end of the list, wrapping to the start
    Forward,
    /// Towards the start of the list, wrapping to the end
    Backward,
}

impl Direction {
    /// Map a signed offset onto a direction: positive values are forward
    pub fn from_offset(i: i32) -> Self {
        if i > 0 {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}
