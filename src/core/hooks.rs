//! Hooks for plugging user code into the window manager.
use crate::{
    core::{bindings::Click, State},
    x::XConn,
    Error, Result, Xid,
};
use std::fmt;
use tracing::error;

/// A status bar drawn at the top or bottom of each monitor.
///
/// The window manager never renders anything itself: it tells the bar when it needs
/// redrawing or moving and asks it to classify clicks. Monitors are identified by their
/// index into [ClientSet::monitors](crate::pure::ClientSet::monitors).
pub trait StatusBar<X>
where
    X: XConn,
{
    /// Redraw the bar for monitor `m` from the current state.
    fn redraw(&mut self, m: usize, state: &State<X>, x: &X) -> Result<()>;

    /// Move or resize the bar for monitor `m` after its geometry or visibility changed.
    fn reposition(&mut self, m: usize, state: &State<X>, x: &X) -> Result<()>;

    /// The window used to draw the bar for monitor `m`, if one exists.
    ///
    /// Tiled clients are stacked directly below this window.
    fn window(&self, m: usize) -> Option<Xid>;

    /// The monitor whose bar is drawn in the given window, if any.
    fn monitor_for(&self, id: Xid) -> Option<usize>;

    /// Classify a click at horizontal offset `x` within the bar of monitor `m`. The tag
    /// mask of the label under the pointer is returned for [Click::TagBar].
    fn click(&self, m: usize, x: i32, state: &State<X>) -> (Click, Option<u32>);
}

impl<X: XConn> fmt::Debug for Box<dyn StatusBar<X>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBar").finish()
    }
}

/// Called with every non-fatal error that is not expected as part of normal operation.
pub trait ErrorHandler {
    /// Handle an error that was returned while processing an event.
    fn handle(&mut self, error: &Error);
}

impl<F> ErrorHandler for F
where
    F: FnMut(&Error),
{
    fn handle(&mut self, error: &Error) {
        (self)(error)
    }
}

impl fmt::Debug for Box<dyn ErrorHandler> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler").finish()
    }
}

/// An [ErrorHandler] that only logs.
pub fn logging_error_handler() -> Box<dyn ErrorHandler> {
    Box::new(|e: &Error| error!(%e, "unhandled error"))
}
