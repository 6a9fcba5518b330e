//! Setting up and responding to user defined key/mouse bindings
use crate::{
    core::State,
    pure::geometry::Point,
    x::XConn,
    Error, Result, Xid,
};
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

bitflags! {
    /// The core X11 modifier masks as they appear in key and button event state
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 {
        /// Shift
        const SHIFT   = 1 << 0;
        /// Caps lock
        const LOCK    = 1 << 1;
        /// Control
        const CONTROL = 1 << 2;
        /// Mod1: normally Alt
        const MOD1    = 1 << 3;
        /// Mod2: normally Num lock
        const MOD2    = 1 << 4;
        /// Mod3
        const MOD3    = 1 << 5;
        /// Mod4: normally Super
        const MOD4    = 1 << 6;
        /// Mod5
        const MOD5    = 1 << 7;
    }
}

impl ModMask {
    /// Strip the lock modifiers so that bindings fire regardless of caps lock and num
    /// lock state. `numlock` is whichever modifier num lock is currently mapped to.
    pub fn clean(self, numlock: ModMask) -> ModMask {
        self - (numlock | ModMask::LOCK)
    }
}

/// Some action to be run by a user key binding
pub trait KeyEventHandler<X>
where
    X: XConn,
{
    /// Call this handler with the current window manager state
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()>;
}

impl<X: XConn> fmt::Debug for Box<dyn KeyEventHandler<X>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEventHandler").finish()
    }
}

impl<F, X> KeyEventHandler<X> for F
where
    F: FnMut(&mut State<X>, &X) -> Result<()>,
    X: XConn,
{
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(state, x)
    }
}

/// User defined key bindings
pub type KeyBindings<X> = HashMap<KeyCode, Box<dyn KeyEventHandler<X>>>;

/// An action to be run in response to a mouse button press
pub trait MouseEventHandler<X>
where
    X: XConn,
{
    /// Call this handler with the resolved click and current window manager state
    fn on_click(&mut self, click: &ButtonClick, state: &mut State<X>, x: &X) -> Result<()>;
}

impl<X: XConn> fmt::Debug for Box<dyn MouseEventHandler<X>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MouseEventHandler").finish()
    }
}

impl<F, X> MouseEventHandler<X> for F
where
    F: FnMut(&ButtonClick, &mut State<X>, &X) -> Result<()>,
    X: XConn,
{
    fn on_click(&mut self, click: &ButtonClick, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(click, state, x)
    }
}

/// User defined mouse bindings, keyed by the region that was clicked and the button state
pub type MouseBindings<X> = HashMap<(Click, MouseState), Box<dyn MouseEventHandler<X>>>;

/// A key press and held modifiers
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyCode {
    /// The held modifier mask
    pub mask: ModMask,
    /// The key code that was held
    pub code: u8,
}

impl KeyCode {
    /// Create a new KeyCode
    pub fn new(mask: ModMask, code: u8) -> Self {
        Self { mask, code }
    }

    /// Create a new KeyCode from an existing one with the lock modifiers removed
    pub fn clean(&self, numlock: ModMask) -> KeyCode {
        KeyCode {
            mask: self.mask.clean(numlock),
            code: self.code,
        }
    }
}

/// Known mouse buttons for binding actions
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MouseButton {
    /// 1
    Left,
    /// 2
    Middle,
    /// 3
    Right,
    /// 4
    ScrollUp,
    /// 5
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

impl TryFrom<u8> for MouseButton {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Self::Left),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Right),
            4 => Ok(Self::ScrollUp),
            5 => Ok(Self::ScrollDown),
            _ => Err(Error::UnknownMouseButton(n)),
        }
    }
}

/// A button together with the modifiers held while pressing it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MouseState {
    /// The [MouseButton] being held
    pub button: MouseButton,
    /// All modifiers being held
    pub modifiers: ModMask,
}

impl MouseState {
    /// Construct a new MouseState
    pub fn new(button: MouseButton, modifiers: ModMask) -> Self {
        Self { button, modifiers }
    }

    /// This state with the lock modifiers removed
    pub fn clean(&self, numlock: ModMask) -> Self {
        Self {
            button: self.button,
            modifiers: self.modifiers.clean(numlock),
        }
    }
}

/// A mouse button event
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The ID of the window that was under the pointer
    pub id: Xid,
    /// Absolute coordinate of the event
    pub abs: Point,
    /// Coordinate of the event relative to top-left of the window itself
    pub rel: Point,
    /// The button and modifiers that were held
    pub state: MouseState,
    /// Server timestamp in milliseconds
    pub time: u32,
}

/// The region of the screen that a mouse binding applies to
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Click {
    /// One of the tag labels in a bar
    TagBar,
    /// The layout symbol in a bar
    LayoutSymbol,
    /// The status text in a bar
    StatusText,
    /// The title area of a bar
    WindowTitle,
    /// A managed client window
    ClientWindow,
    /// The root window
    RootWindow,
}

/// A resolved button press as passed to a [MouseEventHandler]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonClick {
    /// The region that was clicked
    pub click: Click,
    /// The tag mask of the label that was clicked for [Click::TagBar]
    pub tag: Option<u32>,
    /// The client that was clicked for [Click::ClientWindow]
    pub client: Option<Xid>,
    /// The raw event
    pub event: MouseEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(ModMask::MOD4, ModMask::MOD4; "no locks")]
    #[test_case(ModMask::MOD4 | ModMask::LOCK, ModMask::MOD4; "caps lock")]
    #[test_case(ModMask::MOD4 | ModMask::MOD2, ModMask::MOD4; "num lock")]
    #[test_case(ModMask::MOD4 | ModMask::MOD2 | ModMask::LOCK | ModMask::SHIFT, ModMask::MOD4 | ModMask::SHIFT; "both")]
    #[test]
    fn clean_strips_lock_modifiers(held: ModMask, expected: ModMask) {
        let k = KeyCode::new(held, 38);

        assert_eq!(k.clean(ModMask::MOD2), KeyCode::new(expected, 38));
    }

    #[test]
    fn mouse_buttons_round_trip() {
        for n in 1..=5u8 {
            let b = MouseButton::try_from(n).unwrap();
            assert_eq!(u8::from(b), n);
        }

        assert!(MouseButton::try_from(9).is_err());
    }
}
