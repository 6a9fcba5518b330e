//! Layouts for positioning tiled clients within the window area of a monitor
use crate::pure::ClientSet;
use std::fmt;

/// An algorithm for positioning the tiled clients of a monitor.
///
/// Implementations are handed the full [ClientSet] and the index of the monitor being
/// arranged. They should position each of the monitor's [tiled
/// clients](ClientSet::tiled_clients) by calling [ClientSet::resize] so that client size
/// hints are honoured.
pub trait Arrange: fmt::Debug {
    /// Position the tiled clients of monitor `m`.
    fn arrange(&self, cs: &mut ClientSet, m: usize);

    /// Whether this layout gives every tiled client the entire window area.
    ///
    /// Client borders are not drawn under layouts that fill the window area.
    fn fills_area(&self) -> bool {
        false
    }
}

/// An entry in the layout catalog: a symbol for display in the bar and an optional
/// arrangement algorithm. A layout without an algorithm leaves every client floating.
#[derive(Debug)]
pub struct Layout {
    pub(crate) symbol: String,
    pub(crate) arrange: Option<Box<dyn Arrange>>,
}

impl Layout {
    /// Create a new tiling layout.
    pub fn new(symbol: impl Into<String>, arrange: impl Arrange + 'static) -> Self {
        Self {
            symbol: symbol.into(),
            arrange: Some(Box::new(arrange)),
        }
    }

    /// Create a new floating layout: clients keep whatever position they have.
    pub fn floating(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            arrange: None,
        }
    }

    /// The symbol used to represent this layout in the bar
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether this layout leaves every client floating
    pub fn is_floating(&self) -> bool {
        self.arrange.is_none()
    }

    /// Whether this layout gives every tiled client the entire window area
    pub fn fills_area(&self) -> bool {
        self.arrange.as_ref().map_or(false, |a| a.fills_area())
    }
}
