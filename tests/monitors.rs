//! Reacting to changes in the physical output layout
use tagwm::{
    pure::geometry::Rect,
    x::{event::ConfigureEvent, XEvent},
    Xid,
};

mod common;

use common::*;

fn root_changed(root: Xid, r: Rect) -> XEvent {
    XEvent::ConfigureNotify(ConfigureEvent {
        id: root,
        r,
        is_root: true,
    })
}

#[test]
fn one_monitor_per_output() {
    let wm = wm_with_clients(dual_output(), &[]);
    let cs = &wm.state.client_set;

    assert_eq!(cs.monitors().len(), 2);
    assert_eq!(cs.monitor(1).unwrap().geometry(), output(1));
}

#[test]
fn removing_an_output_moves_its_clients() {
    let mut wm = wm_with_clients(dual_output(), &[10, 11]);
    wm.handle_event(XEvent::KeyPress(TAG_MONITOR_CODE)).unwrap();
    assert_eq!(wm.state.client_set.client(Xid::from(11)).unwrap().monitor(), 1);

    wm.conn().set_outputs(vec![output(0)]);
    let root = wm.state.root();
    wm.handle_event(root_changed(root, output(0))).unwrap();

    let cs = &wm.state.client_set;
    assert_eq!(cs.monitors().len(), 1);
    assert_eq!(cs.selected_monitor(), 0);
    for id in [10, 11] {
        assert_eq!(cs.client(Xid::from(id)).unwrap().monitor(), 0);
    }
    assert!(cs.invariant_violations().is_empty(), "{:?}", cs.invariant_violations());

    // tiled clients are laid out inside the remaining monitor
    let wa = cs.monitor(0).unwrap().window_area();
    for id in cs.tiled_clients(0) {
        let r = cs.client(id).unwrap().geometry();
        assert!(r.x >= wa.x && r.x + r.w <= wa.x + wa.w, "{r:?} outside {wa:?}");
    }
}

#[test]
fn adding_an_output_adds_a_monitor() {
    let mut wm = wm_with_clients(single_output(), &[10]);
    assert_eq!(wm.state.client_set.monitors().len(), 1);

    wm.conn().set_outputs(vec![output(0), output(1)]);
    let root = wm.state.root();
    wm.handle_event(root_changed(root, Rect::new(0, 0, 2 * SCREEN_WIDTH, SCREEN_HEIGHT)))
        .unwrap();

    let cs = &wm.state.client_set;
    assert_eq!(cs.monitors().len(), 2);
    assert_eq!(cs.screen().w, 2 * SCREEN_WIDTH);
    assert_eq!(cs.client(Xid::from(10)).unwrap().monitor(), 0);
}

#[test]
fn duplicate_outputs_are_merged() {
    let mut wm = wm_with_clients(single_output(), &[]);

    wm.conn().set_outputs(vec![output(0), output(0)]);
    let root = wm.state.root();
    wm.handle_event(root_changed(root, output(0))).unwrap();

    assert_eq!(wm.state.client_set.monitors().len(), 1);
}

#[test]
fn fullscreen_clients_follow_the_monitor_geometry() {
    use tagwm::x::{event::ClientMessage, Atom, XConn};

    let mut wm = wm_with_clients(single_output(), &[10]);
    let fullscreen = *wm.conn().intern_atom(Atom::NetWmStateFullscreen).unwrap();
    let msg = ClientMessage::new(Xid::from(10), Atom::NetWmState.as_ref(), [1, fullscreen, 0, 0, 0]);
    wm.handle_event(XEvent::ClientMessage(msg)).unwrap();

    let bigger = Rect::new(0, 0, 1200, 900);
    wm.conn().set_outputs(vec![bigger]);
    let root = wm.state.root();
    wm.handle_event(root_changed(root, bigger)).unwrap();

    let c = wm.state.client_set.client(Xid::from(10)).unwrap();
    assert!(c.is_fullscreen());
    assert_eq!(c.geometry(), bigger);
}
