//! Data types for working with X window properties
use crate::{pure::geometry::Rect, Error, Result, Xid};
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The decoded value of a window property as returned by [XConn::get_prop][crate::x::XConn::get_prop].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Prop {
    /// One or more X Atoms
    Atom(Vec<String>),
    /// Raw bytes for when the prop type is non-standard
    Bytes(Vec<u32>),
    /// A cardinal number
    Cardinal(Vec<u32>),
    /// UTF-8 encoded string data
    UTF8String(Vec<String>),
    /// One or more X window IDs
    Window(Vec<Xid>),
    /// The WmHints properties for this window
    WmHints(WmHints),
    /// The WmNormalHints properties for this window
    WmNormalHints(WmNormalHints),
}

bitflags! {
    /// Which fields of a `WM_HINTS` property carry meaningful values
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WmHintsFlags: u32 {
        /// `input` is meaningful
        const INPUT_HINT = 1 << 0;
        /// `initial_state` is meaningful
        const STATE_HINT = 1 << 1;
        /// An icon pixmap is provided
        const ICON_PIXMAP_HINT = 1 << 2;
        /// An icon window is provided
        const ICON_WINDOW_HINT = 1 << 3;
        /// An icon position is provided
        const ICON_POSITION_HINT = 1 << 4;
        /// An icon mask is provided
        const ICON_MASK_HINT = 1 << 5;
        /// The client belongs to a window group
        const WINDOW_GROUP_HINT = 1 << 6;
        /// The client wants the user's attention
        const URGENCY_HINT = 1 << 8;
    }
}

bitflags! {
    /// Which fields of a `WM_NORMAL_HINTS` property carry meaningful values.
    ///
    /// Only the program specified size constraints feed into the size hints engine.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WmNormalHintsFlags: u32 {
        /// Position chosen by the user
        const U_POSITION = 1 << 0;
        /// Size chosen by the user
        const U_SIZE = 1 << 1;
        /// Position chosen by the client
        const P_POSITION = 1 << 2;
        /// Size chosen by the client
        const P_SIZE = 1 << 3;
        /// `min` is meaningful
        const P_MIN_SIZE = 1 << 4;
        /// `max` is meaningful
        const P_MAX_SIZE = 1 << 5;
        /// `inc` is meaningful
        const P_RESIZE_INC = 1 << 6;
        /// `min_aspect` and `max_aspect` are meaningful
        const P_ASPECT = 1 << 7;
        /// `base` is meaningful
        const P_BASE_SIZE = 1 << 8;
        /// A window gravity is requested
        const P_WIN_GRAVITY = 1 << 9;
    }
}

/// The value tagwm writes to the `WM_STATE` property of the windows it manages.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WmState {
    /// No longer managed
    Withdrawn,
    /// Managed and shown
    Normal,
    /// Managed but minimised
    Iconic,
}

/// Map state reported by the server when a window is queried
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MapState {
    /// Not mapped
    Unmapped,
    /// Mapped but an ancestor is not
    UnViewable,
    /// Mapped and on screen
    Viewable,
}

/// Client requested hints about information other than window geometry.
///
/// Only the input and urgency hints are acted on but the remaining fields are carried
/// so that the property can be written back unchanged when toggling urgency.
///
/// Described in section 4.1.2.4 of the [ICCCM][1].
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_hints_property
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct WmHints {
    pub(crate) flags: WmHintsFlags,
    pub(crate) input: bool,
    pub(crate) rest: [u32; 7],
}

impl WmHints {
    /// Create a new instance with the given flags and input hint
    pub fn new(flags: WmHintsFlags, input: bool) -> Self {
        Self {
            flags,
            input,
            rest: [0; 7],
        }
    }

    /// Parse the nine 32 bit words of a `WM_HINTS` property.
    ///
    /// Word 0 holds the flags and word 1 the input hint. The icon, initial state and
    /// group words are kept as they are so that [WmHints::to_bytes] can reproduce them.
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 9 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 9] for WmHints, got [u32; {}]",
                raw.len()
            )));
        }

        let mut rest = [0; 7];
        rest.copy_from_slice(&raw[2..]);

        Ok(Self {
            flags: WmHintsFlags::from_bits_truncate(raw[0]),
            input: raw[1] > 0,
            rest,
        })
    }

    /// Serialise back to the raw layout accepted by [WmHints::try_from_bytes].
    pub fn to_bytes(&self) -> Vec<u32> {
        let mut raw = vec![self.flags.bits(), self.input as u32];
        raw.extend_from_slice(&self.rest);

        raw
    }

    /// Whether or not the urgency hint is set
    pub fn is_urgent(&self) -> bool {
        self.flags.contains(WmHintsFlags::URGENCY_HINT)
    }

    /// Set or clear the urgency hint
    pub fn set_urgent(&mut self, urgent: bool) {
        self.flags.set(WmHintsFlags::URGENCY_HINT, urgent);
    }

    /// Whether the client has explicitly stated whether or not it accepts input focus.
    ///
    /// `None` if the input hint is not set.
    pub fn accepts_input(&self) -> Option<bool> {
        self.flags
            .contains(WmHintsFlags::INPUT_HINT)
            .then_some(self.input)
    }
}

/// Client requested hints about window geometry.
///
/// Described in section 4.1.2.3 of the [ICCCM][1], with the word layout given in the
/// [Xlib manual][2]. Gravity is not honoured.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_normal_hints_property
/// [2]: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/wm-normal-hints.html
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct WmNormalHints {
    pub(crate) flags: WmNormalHintsFlags,
    pub(crate) min: (i32, i32),
    pub(crate) max: (i32, i32),
    pub(crate) inc: (i32, i32),
    pub(crate) min_aspect: (i32, i32),
    pub(crate) max_aspect: (i32, i32),
    pub(crate) base: (i32, i32),
}

impl WmNormalHints {
    /// Parse the eighteen 32 bit words of a `WM_NORMAL_HINTS` property.
    ///
    /// Words 1 to 4 are the obsolete position and size and word 17 is the gravity,
    /// none of which are read. The remaining words are (width, height) pairs starting
    /// at word 5: min, max, inc, min_aspect, max_aspect and base.
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 18 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 18] for WmNormalHints, got [u32; {}]",
                raw.len()
            )));
        }

        let pair = |i: usize| (raw[i] as i32, raw[i + 1] as i32);

        Ok(Self {
            flags: WmNormalHintsFlags::from_bits_truncate(raw[0]),
            min: pair(5),
            max: pair(7),
            inc: pair(9),
            min_aspect: pair(11),
            max_aspect: pair(13),
            base: pair(15),
        })
    }

    /// Set the program specified base size
    pub fn with_base(mut self, w: i32, h: i32) -> Self {
        self.flags |= WmNormalHintsFlags::P_BASE_SIZE;
        self.base = (w, h);
        self
    }

    /// Set the program specified minimum size
    pub fn with_min(mut self, w: i32, h: i32) -> Self {
        self.flags |= WmNormalHintsFlags::P_MIN_SIZE;
        self.min = (w, h);
        self
    }

    /// Set the program specified maximum size
    pub fn with_max(mut self, w: i32, h: i32) -> Self {
        self.flags |= WmNormalHintsFlags::P_MAX_SIZE;
        self.max = (w, h);
        self
    }

    /// Set the program specified resize increments
    pub fn with_increments(mut self, w: i32, h: i32) -> Self {
        self.flags |= WmNormalHintsFlags::P_RESIZE_INC;
        self.inc = (w, h);
        self
    }

    /// Set the program specified aspect ratio bounds as (numerator, denominator) pairs
    pub fn with_aspect(mut self, min: (i32, i32), max: (i32, i32)) -> Self {
        self.flags |= WmNormalHintsFlags::P_ASPECT;
        self.min_aspect = min;
        self.max_aspect = max;
        self
    }
}

/// Window attributes consulted when deciding whether and how to manage a window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct WindowAttributes {
    pub(crate) override_redirect: bool,
    pub(crate) map_state: MapState,
    pub(crate) geometry: Rect,
    pub(crate) border_width: i32,
}

impl WindowAttributes {
    /// Create a new instance from component parts
    pub fn new(
        override_redirect: bool,
        map_state: MapState,
        geometry: Rect,
        border_width: i32,
    ) -> Self {
        Self {
            override_redirect,
            map_state,
            geometry,
            border_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_hints_are_read_from_the_xlib_layout() {
        let mut raw = [0u32; 18];
        raw[0] = (WmNormalHintsFlags::P_MIN_SIZE | WmNormalHintsFlags::P_RESIZE_INC).bits();
        raw[5] = 100;
        raw[6] = 50;
        raw[9] = 10;
        raw[10] = 20;

        let hints = WmNormalHints::try_from_bytes(&raw).unwrap();

        assert_eq!(
            hints,
            WmNormalHints::default()
                .with_min(100, 50)
                .with_increments(10, 20)
        );
    }

    #[test]
    fn short_normal_hints_are_an_error() {
        assert!(matches!(
            WmNormalHints::try_from_bytes(&[0; 17]),
            Err(Error::InvalidHints(_))
        ));
    }

    #[test]
    fn urgency_round_trips_through_raw_hints() {
        let mut hints = WmHints::try_from_bytes(&[1, 1, 0, 0, 0, 0, 0, 0, 7]).unwrap();
        assert_eq!(hints.accepts_input(), Some(true));
        assert!(!hints.is_urgent());

        hints.set_urgent(true);
        let raw = hints.to_bytes();

        assert_eq!(raw[0], (WmHintsFlags::INPUT_HINT | WmHintsFlags::URGENCY_HINT).bits());
        assert_eq!(raw[8], 7);
        assert!(WmHints::try_from_bytes(&raw).unwrap().is_urgent());
    }

    #[test]
    fn missing_input_hint_is_none() {
        let hints = WmHints::new(WmHintsFlags::empty(), false);

        assert_eq!(hints.accepts_input(), None);
    }
}
