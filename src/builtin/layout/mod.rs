//! Built-in layouts.
//!
//! Each layout positions the [tiled clients](ClientSet::tiled_clients) of a monitor within
//! its window area, in client list order, using the monitor's master fraction and master
//! count where they apply.
use crate::{
    core::layout::{Arrange, Layout},
    pure::{geometry::Rect, ClientSet},
};


/// The stock layout catalog: dwindle, tile, floating and monocle in that order.
pub fn default_layouts() -> Vec<Layout> {
    vec![
        Layout::new("D", Dwindle),
        Layout::new("T", Tile),
        Layout::floating("F"),
        Layout::new("M", Monocle),
    ]
}

/// A master column on the left with the remaining clients stacked in a column to the right.
///
/// The master column takes the full width when every client fits in it and no width at
/// all when the master count is zero. Each column divides its height evenly with any
/// rounding remainder going to the clients placed last.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tile;

impl Arrange for Tile {
    fn arrange(&self, cs: &mut ClientSet, m: usize) {
        let tiled = cs.tiled_clients(m);
        let n = tiled.len() as i32;
        if n == 0 {
            return;
        }

        let (wr, mfact, nmaster) = match cs.monitor(m) {
            Some(mon) => (mon.window_area(), mon.mfact(), mon.nmaster()),
            None => return,
        };

        let mw = if n > nmaster {
            if nmaster > 0 {
                (wr.w as f32 * mfact) as i32
            } else {
                0
            }
        } else {
            wr.w
        };

        let (mut my, mut ty) = (0, 0);
        for (i, id) in tiled.into_iter().enumerate() {
            let i = i as i32;
            let bw = match cs.client(id) {
                Some(c) => c.border(),
                None => continue,
            };

            let (x, y, w, slots, offset) = if i < nmaster {
                (wr.x, wr.y + my, mw, n.min(nmaster) - i, &mut my)
            } else {
                (wr.x + mw, wr.y + ty, wr.w - mw, n - i, &mut ty)
            };

            let h = (wr.h - *offset) / slots;
            cs.resize(id, Rect::new(x, y, w - 2 * bw, h - 2 * bw), false);

            let placed = cs.client(id).map_or(0, |c| c.outer_h());
            if *offset + placed < wr.h {
                *offset += placed;
            }
        }
    }
}

/// Recursively halve the window area, alternating between vertical and horizontal
/// splits, so that each new client takes half of the space left by the one before it.
///
/// The first split uses the master fraction rather than a half.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dwindle;

impl Arrange for Dwindle {
    fn arrange(&self, cs: &mut ClientSet, m: usize) {
        let tiled = cs.tiled_clients(m);
        let n = tiled.len() as i32;
        if n == 0 {
            return;
        }

        let (wr, mfact) = match cs.monitor(m) {
            Some(mon) => (mon.window_area(), mon.mfact()),
            None => return,
        };

        let (mut nx, mut ny, mut nw, mut nh) = (wr.x, 0, wr.w, wr.h);
        let mut i = 0;

        for id in tiled {
            let bw = match cs.client(id) {
                Some(c) => c.border(),
                None => continue,
            };

            let odd = i % 2 == 1;
            if (odd && nh / 2 > 2 * bw) || (!odd && nw / 2 > 2 * bw) {
                if i < n - 1 {
                    if odd {
                        nh /= 2;
                    } else {
                        nw /= 2;
                    }
                }

                match i % 4 {
                    0 | 2 => ny += nh,
                    _ => nx += nw,
                }

                if i == 0 {
                    if n != 1 {
                        nw = (wr.w as f32 * mfact) as i32;
                    }
                    ny = wr.y;
                } else if i == 1 {
                    nw = wr.w - nw;
                }
                i += 1;
            }

            let r = Rect::new(nx, ny, nw - 2 * bw, nh - 2 * bw);
            cs.resize(id, r, false);
        }
    }
}

/// Every tiled client takes the entire window area, with the layout symbol showing how
/// many clients are visible.
#[derive(Debug, Default, Clone, Copy)]
pub struct Monocle;

impl Arrange for Monocle {
    fn arrange(&self, cs: &mut ClientSet, m: usize) {
        let n = cs.visible_clients(m).len();
        let wr = match cs.monitors.get_mut(m) {
            Some(mon) => {
                if n > 0 {
                    mon.symbol = format!("[{n}]");
                }
                mon.window_area()
            }
            None => return,
        };

        for id in cs.tiled_clients(m) {
            let bw = cs.client(id).map_or(0, |c| c.border());
            let r = Rect::new(wr.x, wr.y, wr.w - 2 * bw, wr.h - 2 * bw);
            cs.resize(id, r, false);
        }
    }

    fn fills_area(&self) -> bool {
        true
    }
}
