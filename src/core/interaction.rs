//! Interactive moving and resizing of clients with the mouse.
//!
//! A drag is a modal loop: once the pointer is grabbed the window manager only reads
//! pointer events and the few event kinds that need servicing to keep other clients
//! responsive, until the button is released. The current [Interaction] is recorded in
//! [State] so that the event dispatcher routes pointer motion to the drag.
use crate::{
    core::{handle, handle_error, State},
    pure::geometry::{Point, Rect},
    x::{CursorKind, XConn, XConnExt, XEvent},
    Result, Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Motion events closer together than this many milliseconds are dropped.
pub const MOTION_INTERVAL_MS: u32 = 1000 / 60;

/// The state of a drag that is in progress
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    /// The client being dragged
    pub id: Xid,
    /// The pointer position when the drag started
    pub pointer: Point,
    /// The client geometry when the drag started
    pub start: Rect,
    /// Timestamp of the last motion event that was acted on
    pub last_time: u32,
}

/// What the pointer is currently being used for
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// No drag is in progress
    #[default]
    Idle,
    /// A client is being moved
    Moving(Drag),
    /// A client is being resized
    Resizing(Drag),
}

impl Interaction {
    /// Whether a drag is currently in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Snap a position along one axis to the edges of an area.
///
/// `pos` is the leading edge of a window whose outer size along the axis is `size`.
/// The leading edge snaps to `lo` and the trailing edge snaps to `hi` when they are
/// within `snap` pixels.
pub fn snap_axis(pos: i32, size: i32, lo: i32, hi: i32, snap: i32) -> i32 {
    if (lo - pos).abs() < snap {
        lo
    } else if (hi - (pos + size)).abs() < snap {
        hi - size
    } else {
        pos
    }
}

/// Move the selected client with the mouse until the button is released.
pub(crate) fn move_mouse<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    begin(state, x, CursorKind::Move, false)
}

/// Resize the selected client with the mouse until the button is released.
pub(crate) fn resize_mouse<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    begin(state, x, CursorKind::Resize, true)
}

fn begin<X: XConn>(state: &mut State<X>, x: &X, cursor: CursorKind, resize: bool) -> Result<()> {
    let (id, start, bw) = match state.client_set.selected_client() {
        Some(id) => match state.client_set.client(id) {
            Some(c) if !c.is_fullscreen() => (id, c.geometry(), c.border()),
            _ => return Ok(()),
        },
        None => return Ok(()),
    };

    x.restack(state.client_set.selected_monitor(), state)?;

    if !x.grab_pointer(cursor)? {
        debug!(%id, "unable to grab pointer for drag");
        return Ok(());
    }

    let pointer = if resize {
        let corner = Point::new(start.w + bw - 1, start.h + bw - 1);
        x.warp_pointer(id, corner)?;
        Point::new(start.x + bw + corner.x, start.y + bw + corner.y)
    } else {
        match x.cursor_position()? {
            Some(p) => p,
            None => {
                x.ungrab_pointer()?;
                return Ok(());
            }
        }
    };

    let drag = Drag {
        id,
        pointer,
        start,
        last_time: 0,
    };
    state.interaction = if resize {
        Interaction::Resizing(drag)
    } else {
        Interaction::Moving(drag)
    };
    trace!(%id, ?start, resize, "starting drag");

    let res = run_drag(state, x);

    state.interaction = Interaction::Idle;
    if resize {
        if let Some(c) = state.client_set.client(id) {
            let r = c.geometry();
            x.warp_pointer(id, Point::new(r.w + bw - 1, r.h + bw - 1))?;
        }
    }
    x.ungrab_pointer()?;
    if resize {
        x.drain_enter_events()?;
    }
    res?;

    finish(id, state, x)
}

// Only a button release ends the drag: errors from servicing other clients in the
// meantime are reported and the loop carries on.
fn run_drag<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    loop {
        match x.next_interaction_event()? {
            XEvent::ButtonRelease(_) => return Ok(()),
            event => {
                if let Err(e) = handle::interaction_event(event, state, x) {
                    handle_error(e, state)?;
                }
            }
        }
    }
}

// A client dragged onto another monitor moves there and takes focus with it.
fn finish<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    let r = match state.client_set.client(id) {
        Some(c) => c.geometry(),
        None => return Ok(()),
    };

    let m = state.client_set.rect_to_monitor(r);
    if m != state.client_set.selected_monitor() {
        debug!(%id, m, "drag ended on another monitor");
        x.send_to_monitor(id, m, state)?;
        state.client_set.set_selected_monitor(m)?;
        x.focus(None, state)?;
    }

    Ok(())
}

/// Apply a pointer motion event to the drag that is in progress.
pub(crate) fn on_motion<X: XConn>(abs: Point, time: u32, state: &mut State<X>, x: &X) -> Result<()> {
    let (mut drag, resize) = match state.interaction {
        Interaction::Moving(d) => (d, false),
        Interaction::Resizing(d) => (d, true),
        Interaction::Idle => return Ok(()),
    };

    if time.wrapping_sub(drag.last_time) <= MOTION_INTERVAL_MS {
        return Ok(());
    }
    drag.last_time = time;
    state.interaction = if resize {
        Interaction::Resizing(drag)
    } else {
        Interaction::Moving(drag)
    };

    if resize {
        drag_resize(&drag, abs, state, x)
    } else {
        drag_move(&drag, abs, state, x)
    }
}

fn drag_move<X: XConn>(drag: &Drag, abs: Point, state: &mut State<X>, x: &X) -> Result<()> {
    let snap = state.config.snap;
    let cs = &state.client_set;
    let (r, bw, floating) = match cs.client(drag.id) {
        Some(c) => (c.geometry(), c.border(), c.is_floating()),
        None => return Ok(()),
    };
    let wr = cs.monitor(cs.selected_monitor()).map(|m| m.window_area()).unwrap_or(r);
    let floating_layout = cs.has_floating_layout(cs.selected_monitor());

    let nx = drag.start.x + (abs.x - drag.pointer.x);
    let ny = drag.start.y + (abs.y - drag.pointer.y);
    let nx = snap_axis(nx, r.w + 2 * bw, wr.x, wr.x + wr.w, snap);
    let ny = snap_axis(ny, r.h + 2 * bw, wr.y, wr.y + wr.h, snap);

    let mut floating = floating;
    if !floating && !floating_layout && ((nx - r.x).abs() > snap || (ny - r.y).abs() > snap) {
        debug!(id = %drag.id, "floating dragged client");
        toggle_floating(state, x)?;
        floating = true;
    }

    if floating || floating_layout {
        state.client_set.resize(drag.id, Rect::new(nx, ny, r.w, r.h), true);
        x.flush_pending(state)?;
    }

    Ok(())
}

fn drag_resize<X: XConn>(drag: &Drag, abs: Point, state: &mut State<X>, x: &X) -> Result<()> {
    let snap = state.config.snap;
    let cs = &state.client_set;
    let (r, bw, floating, mon) = match cs.client(drag.id) {
        Some(c) => (c.geometry(), c.border(), c.is_floating(), c.monitor()),
        None => return Ok(()),
    };
    let sel_wr = match cs.monitor(cs.selected_monitor()) {
        Some(m) => m.window_area(),
        None => return Ok(()),
    };
    let mon_wr = cs.monitor(mon).map(|m| m.window_area()).unwrap_or(sel_wr);
    let floating_layout = cs.has_floating_layout(cs.selected_monitor());

    let nw = (abs.x - drag.start.x - 2 * bw + 1).max(1);
    let nh = (abs.y - drag.start.y - 2 * bw + 1).max(1);

    let within = mon_wr.x + nw >= sel_wr.x
        && mon_wr.x + nw <= sel_wr.x + sel_wr.w
        && mon_wr.y + nh >= sel_wr.y
        && mon_wr.y + nh <= sel_wr.y + sel_wr.h;

    let mut floating = floating;
    if within
        && !floating
        && !floating_layout
        && ((nw - r.w).abs() > snap || (nh - r.h).abs() > snap)
    {
        debug!(id = %drag.id, "floating resized client");
        toggle_floating(state, x)?;
        floating = true;
    }

    if floating || floating_layout {
        state.client_set.resize(drag.id, Rect::new(r.x, r.y, nw, nh), true);
        x.flush_pending(state)?;
    }

    Ok(())
}

fn toggle_floating<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    if state.client_set.toggle_floating() {
        let m = state.client_set.selected_monitor();
        x.arrange(Some(m), state)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(5, 100, 0, 1000, 32, 0; "leading edge snaps")]
    #[test_case(880, 100, 0, 1000, 32, 900; "trailing edge snaps")]
    #[test_case(400, 100, 0, 1000, 32, 400; "middle is untouched")]
    #[test_case(-20, 100, 0, 1000, 32, 0; "overhanging leading edge snaps")]
    #[test_case(40, 100, 0, 1000, 32, 40; "just outside snap distance")]
    #[test]
    fn snap_axis_cases(pos: i32, size: i32, lo: i32, hi: i32, snap: i32, expected: i32) {
        assert_eq!(snap_axis(pos, size, lo, hi, snap), expected);
    }

    #[test]
    fn idle_is_not_active() {
        assert!(!Interaction::Idle.is_active());
        assert!(Interaction::Moving(Drag {
            id: Xid(1),
            pointer: Point::new(0, 0),
            start: Rect::default(),
            last_time: 0,
        })
        .is_active());
    }
}
