//! A physical display area with its own tags, layout and client lists
use crate::{pure::geometry::Rect, Xid};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single physical monitor.
///
/// The client list and focus stack of a monitor are intrusive singly linked lists
/// threaded through the [Client](crate::pure::Client)s owned by the
/// [ClientSet](crate::pure::ClientSet): the monitor only stores their heads.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub(crate) num: usize,
    pub(crate) symbol: String,
    pub(crate) mfact: f32,
    pub(crate) nmaster: i32,
    pub(crate) bar_y: i32,
    pub(crate) r: Rect,
    pub(crate) wr: Rect,
    pub(crate) seltags: usize,
    pub(crate) sellt: usize,
    pub(crate) tagset: [u32; 2],
    pub(crate) lt: [usize; 2],
    pub(crate) show_bar: bool,
    pub(crate) top_bar: bool,
    pub(crate) clients: Option<Xid>,
    pub(crate) stack: Option<Xid>,
    pub(crate) sel: Option<Xid>,
}

impl Monitor {
    pub(crate) fn new(
        num: usize,
        mfact: f32,
        nmaster: i32,
        show_bar: bool,
        top_bar: bool,
        layouts: [usize; 2],
        symbol: &str,
    ) -> Self {
        Self {
            num,
            symbol: symbol.to_string(),
            mfact,
            nmaster,
            bar_y: 0,
            r: Rect::default(),
            wr: Rect::default(),
            seltags: 0,
            sellt: 0,
            tagset: [1, 1],
            lt: layouts,
            show_bar,
            top_bar,
            clients: None,
            stack: None,
            sel: None,
        }
    }

    /// The index of this monitor
    pub fn num(&self) -> usize {
        self.num
    }

    /// The physical geometry of this monitor
    pub fn geometry(&self) -> Rect {
        self.r
    }

    /// The region available for client windows: the physical geometry minus the bar
    pub fn window_area(&self) -> Rect {
        self.wr
    }

    /// The y coordinate of the bar. Negative when the bar is hidden.
    pub fn bar_y(&self) -> i32 {
        self.bar_y
    }

    /// Whether the bar is shown
    pub fn show_bar(&self) -> bool {
        self.show_bar
    }

    /// The symbol of the active layout as last rendered by an arrange
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The fraction of the window area given to the master column
    pub fn mfact(&self) -> f32 {
        self.mfact
    }

    /// The number of clients in the master column
    pub fn nmaster(&self) -> i32 {
        self.nmaster
    }

    /// The currently viewed tag mask
    pub fn tags(&self) -> u32 {
        self.tagset[self.seltags]
    }

    /// The catalog index of the active layout
    pub fn layout(&self) -> usize {
        self.lt[self.sellt]
    }

    /// The currently selected client on this monitor
    pub fn selected(&self) -> Option<Xid> {
        self.sel
    }

    /// Recompute the window area and bar position from the physical geometry.
    pub fn update_bar_pos(&mut self, bar_height: i32) {
        self.wr = self.r;

        if self.show_bar {
            self.wr.h -= bar_height;
            self.bar_y = if self.top_bar {
                self.wr.y
            } else {
                self.wr.y + self.wr.h
            };
            if self.top_bar {
                self.wr.y += bar_height;
            }
        } else {
            self.bar_y = -bar_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(false, false, Rect::new(0, 0, 1000, 800), -20; "hidden")]
    #[test_case(true, true, Rect::new(0, 20, 1000, 780), 0; "top")]
    #[test_case(true, false, Rect::new(0, 0, 1000, 780), 780; "bottom")]
    #[test]
    fn update_bar_pos(show_bar: bool, top_bar: bool, area: Rect, bar_y: i32) {
        let mut m = Monitor::new(0, 0.5, 1, show_bar, top_bar, [0, 1], "[]=");
        m.r = Rect::new(0, 0, 1000, 800);
        m.update_bar_pos(20);

        assert_eq!(m.window_area(), area);
        assert_eq!(m.bar_y(), bar_y);
    }
}
