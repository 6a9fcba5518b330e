//! Reconciling the monitor list with the physical screen layout
use crate::{
    pure::{geometry::Rect, ClientSet},
    Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// The physical layout of the screen as reported by the display server.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// One or more physical outputs. Outputs that share a geometry are cloned displays
    /// and are treated as a single monitor.
    Multi(Vec<Rect>),
    /// No multi-head support: the whole root window is a single monitor.
    Single,
}

fn dedup(rects: &[Rect]) -> Vec<Rect> {
    let mut unique: Vec<Rect> = Vec::with_capacity(rects.len());
    for r in rects {
        if !unique.contains(r) {
            unique.push(*r);
        }
    }

    unique
}

impl ClientSet {
    /// Bring the monitor list in line with the given topology.
    ///
    /// New monitors are appended and existing monitors have their geometry updated.
    /// Surplus monitors are removed from the end of the list with their clients moving
    /// to the first monitor. Returns whether anything changed that needs the clients to
    /// be re-arranged.
    pub fn reconcile(&mut self, topology: Topology) -> bool {
        match topology {
            Topology::Multi(rects) => self.reconcile_multi(&rects),
            Topology::Single => self.reconcile_single(),
        }
    }

    fn reconcile_multi(&mut self, rects: &[Rect]) -> bool {
        let unique = dedup(rects);
        if unique.is_empty() {
            error!("display server reported no outputs: keeping current monitors");
            return false;
        }

        let bar_height = self.settings.bar_height;
        let (n, nn) = (self.monitors.len(), unique.len());
        let mut dirty = false;

        for i in n..nn {
            let m = self.new_monitor(i);
            self.monitors.push(m);
        }

        for (i, r) in unique.iter().enumerate() {
            let mon = &mut self.monitors[i];
            if i >= n || mon.r != *r {
                info!(monitor = i, ?r, "updating monitor geometry");
                dirty = true;
                mon.r = *r;
                mon.wr = *r;
                mon.update_bar_pos(bar_height);
            }
        }

        while self.monitors.len() > nn {
            let m = self.monitors.len() - 1;
            let orphans: Vec<Xid> = self.iter_clients(m).map(|c| c.id).collect();
            debug!(monitor = m, n_clients = orphans.len(), "removing monitor");

            for id in orphans {
                dirty = true;
                self.detach(id);
                self.detach_stack(id);
                if let Some(c) = self.clients.get_mut(&id) {
                    c.mon = 0;
                }
                self.attach(id);
                self.attach_below(id);
                self.attach_stack(id);
            }

            if self.selmon == m {
                self.selmon = 0;
            }
            self.monitors.pop();
        }

        dirty
    }

    fn reconcile_single(&mut self) -> bool {
        if self.monitors.is_empty() {
            let m = self.new_monitor(0);
            self.monitors.push(m);
        }

        let (w, h) = (self.screen.w, self.screen.h);
        let bar_height = self.settings.bar_height;
        let mon = &mut self.monitors[0];
        if mon.r.w == w && mon.r.h == h {
            return false;
        }

        info!(w, h, "updating single monitor geometry");
        mon.r = Rect::new(0, 0, w, h);
        mon.wr = mon.r;
        mon.update_bar_pos(bar_height);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::{client_set::tests::test_set, Client};

    fn two() -> Topology {
        Topology::Multi(vec![
            Rect::new(0, 0, 1000, 800),
            Rect::new(1000, 0, 1000, 800),
        ])
    }

    #[test]
    fn cloned_outputs_are_a_single_monitor() {
        let mut cs = test_set(&[]);
        let r = Rect::new(0, 0, 1000, 800);

        assert!(!cs.reconcile(Topology::Multi(vec![r, r])));
        assert_eq!(cs.monitors().len(), 1);
    }

    #[test]
    fn adding_an_output_appends_a_monitor() {
        let mut cs = test_set(&[1]);

        assert!(cs.reconcile(two()));
        assert_eq!(cs.monitors().len(), 2);
        assert_eq!(cs.monitors()[1].window_area(), Rect::new(1000, 0, 1000, 800));
        assert!(!cs.reconcile(two()));
    }

    #[test]
    fn removing_an_output_keeps_every_client() {
        let mut cs = test_set(&[1, 2]);
        cs.reconcile(two());
        for id in [3, 4] {
            let mut c = Client::new(Xid(id), Rect::default(), 1);
            c.mon = 1;
            c.tags = 1;
            cs.insert(c);
        }
        cs.selmon = 1;

        assert!(cs.reconcile(Topology::Multi(vec![Rect::new(0, 0, 1000, 800)])));

        assert_eq!(cs.monitors().len(), 1);
        assert_eq!(cs.selected_monitor(), 0);
        let mut ids: Vec<u32> = cs.all_clients().into_iter().map(|id| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(cs.invariant_violations().is_empty(), "{:?}", cs.invariant_violations());
    }

    #[test]
    fn removing_an_empty_output_is_not_dirty() {
        let mut cs = test_set(&[1]);
        cs.reconcile(two());

        assert!(!cs.reconcile(Topology::Multi(vec![Rect::new(0, 0, 1000, 800)])));
        assert_eq!(cs.monitors().len(), 1);
    }

    #[test]
    fn empty_topology_is_ignored() {
        let mut cs = test_set(&[1]);

        assert!(!cs.reconcile(Topology::Multi(vec![])));
        assert_eq!(cs.monitors().len(), 1);
    }

    #[test]
    fn single_tracks_the_screen_size() {
        let mut cs = test_set(&[]);

        assert!(!cs.reconcile(Topology::Single));
        cs.set_screen_size(1920, 1080);
        assert!(cs.reconcile(Topology::Single));
        assert_eq!(cs.monitors()[0].geometry(), Rect::new(0, 0, 1920, 1080));
    }
}
