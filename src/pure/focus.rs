//! Resolving which client and monitor should hold focus
use crate::{
    pure::{geometry::Rect, ClientSet, Direction},
    Xid,
};
use tracing::trace;

/// The outcome of moving focus, describing what needs to be pushed out to the display
/// server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// The previously selected client that has lost focus
    pub unfocused: Option<Xid>,
    /// The client that now holds focus. `None` if focus should return to the root window
    pub focused: Option<Xid>,
    /// Whether the newly focused client had its urgency flag cleared
    pub was_urgent: bool,
}

impl ClientSet {
    /// Focus the given client, or the most recently focused visible client on the
    /// selected monitor if the target is missing or not visible.
    ///
    /// Focusing a client on another monitor selects that monitor. The focused client is
    /// moved to the head of its monitor's focus stack and has its urgency cleared.
    pub fn focus(&mut self, target: Option<Xid>) -> FocusChange {
        let target = target
            .filter(|&id| self.is_visible(id))
            .or_else(|| {
                self.iter_stack(self.selmon)
                    .find(|c| self.visible(c))
                    .map(|c| c.id)
            });

        let mut change = FocusChange {
            unfocused: self.selected_client().filter(|&s| Some(s) != target),
            ..Default::default()
        };

        if let Some(id) = target {
            let m = match self.clients.get_mut(&id) {
                Some(c) => {
                    change.was_urgent = c.is_urgent;
                    c.is_urgent = false;
                    c.mon
                }
                None => return change,
            };

            if m != self.selmon {
                trace!(from = self.selmon, to = m, "focus moving monitor");
                self.selmon = m;
            }

            self.detach_stack(id);
            self.attach_stack(id);
        }

        self.selmon_mut().sel = target;
        change.focused = target;

        change
    }

    /// The visible client adjacent to the selection on the selected monitor, in client
    /// list order and wrapping at either end.
    ///
    /// Returns `None` if there is no selection or if the selection is fullscreen and
    /// focus is locked to fullscreen clients.
    pub fn focus_stack_target(&self, dir: Direction) -> Option<Xid> {
        let sel = self.client(self.selected_client()?)?;
        if sel.is_fullscreen && self.settings.lock_fullscreen {
            return None;
        }

        let visible: Vec<Xid> = self
            .iter_clients(self.selmon)
            .filter(|c| c.id == sel.id || self.visible(c))
            .map(|c| c.id)
            .collect();
        let pos = visible.iter().position(|&id| id == sel.id)?;
        let sel_visible = self.visible(sel);

        let candidates: Vec<Xid> = match dir {
            Direction::Forward => visible[pos + 1..]
                .iter()
                .chain(visible[..pos].iter())
                .copied()
                .collect(),
            Direction::Backward => visible[..pos]
                .iter()
                .rev()
                .chain(visible[pos + 1..].iter().rev())
                .copied()
                .collect(),
        };

        candidates
            .first()
            .copied()
            .or(if sel_visible { Some(sel.id) } else { None })
    }

    /// The index of the monitor adjacent to the selected monitor, wrapping at either end.
    pub fn dir_to_monitor(&self, dir: Direction) -> usize {
        let n = self.monitors.len();

        match dir {
            Direction::Forward => (self.selmon + 1) % n,
            Direction::Backward => (self.selmon + n - 1) % n,
        }
    }

    /// The monitor whose window area has the largest overlap with `r`, defaulting to the
    /// selected monitor if nothing overlaps.
    pub fn rect_to_monitor(&self, r: Rect) -> usize {
        let mut best = (self.selmon, 0);

        for m in self.monitors.iter() {
            let area = r.intersection_area(&m.wr);
            if area > best.1 {
                best = (m.num, area);
            }
        }

        best.0
    }

    /// The monitor of a managed client, defaulting to the selected monitor for unknown
    /// windows.
    pub fn window_to_monitor(&self, id: Xid) -> usize {
        self.client(id).map_or(self.selmon, |c| c.mon)
    }
}
