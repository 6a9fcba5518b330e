//! XEvent handlers for use in the main event loop
use crate::{
    core::{
        bindings::{ButtonClick, Click, KeyBindings, KeyCode, MouseBindings, MouseEvent},
        interaction, State,
    },
    pure::geometry::Rect,
    x::{
        atom::Atom,
        event::{
            ClientMessage, ConfigureEvent, ConfigureRequest, ExposeEvent, MappingKind,
            MotionEvent, NotifyMode, PointerChange, PropertyEvent, UnmapEvent,
        },
        property::WmState,
        ClientConfig, XConn, XConnExt, XEvent,
    },
    Result, Xid,
};
use std::str::FromStr;
use tracing::{debug, trace, warn};

// _NET_WM_STATE actions
const NET_WM_STATE_REMOVE: u32 = 0;
const NET_WM_STATE_ADD: u32 = 1;
const NET_WM_STATE_TOGGLE: u32 = 2;

/// Route an event to its handler.
///
/// While a drag is in progress only pointer motion and the event kinds that keep other
/// clients responsive are acted on.
pub(crate) fn dispatch<X: XConn>(
    event: XEvent,
    state: &mut State<X>,
    x: &X,
    key_bindings: &mut KeyBindings<X>,
    mouse_bindings: &mut MouseBindings<X>,
) -> Result<()> {
    if state.interaction.is_active() {
        return interaction_event(event, state, x);
    }

    trace!(?event, "handling event");

    match event {
        XEvent::ButtonPress(e) => button_press(e, mouse_bindings, state, x),
        XEvent::ButtonRelease(_) => Ok(()),
        XEvent::ClientMessage(m) => client_message(m, state, x),
        XEvent::ConfigureNotify(e) => configure_notify(e, state, x),
        XEvent::ConfigureRequest(e) => configure_request(e, state, x),
        XEvent::Destroy(id) => destroy(id, state, x),
        XEvent::Enter(p) => enter(p, state, x),
        XEvent::Expose(e) => expose(e, state, x),
        XEvent::FocusIn(id) => focus_in(id, state, x),
        XEvent::KeyPress(k) => keypress(k, key_bindings, state, x),
        XEvent::MappingNotify(kind) => mapping_notify(kind, key_bindings, state, x),
        XEvent::MapRequest(id) => map_request(id, state, x),
        XEvent::MotionNotify(e) => motion(e, state, x),
        XEvent::PropertyNotify(e) => property_notify(e, state, x),
        XEvent::UnmapNotify(e) => unmap_notify(e, state, x),
    }
}

/// Handle an event while a drag is in progress.
pub(crate) fn interaction_event<X: XConn>(
    event: XEvent,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    match event {
        XEvent::MotionNotify(e) => interaction::on_motion(e.abs, e.time, state, x),
        XEvent::ConfigureRequest(e) => configure_request(e, state, x),
        XEvent::Expose(e) => expose(e, state, x),
        XEvent::MapRequest(id) => map_request(id, state, x),
        event => {
            trace!(?event, "dropping event during drag");
            Ok(())
        }
    }
}

pub(crate) fn button_press<X: XConn>(
    e: MouseEvent,
    bindings: &mut MouseBindings<X>,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    let m = x.window_to_monitor(e.id, state)?;
    if m != state.client_set.selected_monitor() {
        if let Some(sel) = state.client_set.selected_client() {
            x.unfocus(sel, true, state)?;
        }
        state.client_set.set_selected_monitor(m)?;
        x.focus(None, state)?;
    }

    let bar_click = state
        .config
        .bar
        .as_ref()
        .filter(|b| b.monitor_for(e.id) == Some(m))
        .map(|b| b.click(m, e.rel.x, state));

    let (click, tag, client) = match bar_click {
        Some((click, tag)) => (click, tag, None),
        None if state.client_set.contains(e.id) => {
            x.focus(Some(e.id), state)?;
            x.restack(state.client_set.selected_monitor(), state)?;
            x.replay_pointer()?;
            (Click::ClientWindow, None, Some(e.id))
        }
        None => (Click::RootWindow, None, None),
    };

    let key = (click, e.state.clean(state.numlock));
    match bindings.get_mut(&key) {
        Some(action) => {
            trace!(?click, ?tag, "running mouse binding");
            let click = ButtonClick {
                click,
                tag,
                client,
                event: e,
            };
            action.on_click(&click, state, x)
        }
        None => Ok(()),
    }
}

pub(crate) fn client_message<X: XConn>(msg: ClientMessage, state: &mut State<X>, x: &X) -> Result<()> {
    let data = msg.data;
    trace!(id = %msg.id, dtype = ?msg.dtype, ?data, "got client message");

    let (is_fullscreen, is_urgent) = match state.client_set.client(msg.id) {
        Some(c) => (c.is_fullscreen(), c.is_urgent()),
        None => return Ok(()),
    };

    match Atom::from_str(&msg.dtype) {
        Ok(Atom::NetWmState) => {
            let fullscreen = *x.intern_atom(Atom::NetWmStateFullscreen)?;
            if data[1] != fullscreen && data[2] != fullscreen {
                return Ok(());
            }

            let enable = match data[0] {
                NET_WM_STATE_ADD => true,
                NET_WM_STATE_REMOVE => false,
                NET_WM_STATE_TOGGLE => !is_fullscreen,
                action => {
                    warn!(action, "unknown _NET_WM_STATE action");
                    return Ok(());
                }
            };
            x.set_fullscreen(msg.id, enable, state)
        }

        Ok(Atom::NetActiveWindow) => {
            if state.client_set.selected_client() != Some(msg.id) && !is_urgent {
                x.set_urgent(msg.id, true, state)?;
                x.redraw_bars(state)?;
            }
            Ok(())
        }

        // all other client message types are ignored
        _ => Ok(()),
    }
}

pub(crate) fn configure_request<X: XConn>(
    e: ConfigureRequest,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    let cs = &mut state.client_set;
    let (mon, floating) = match cs.client(e.id) {
        Some(c) => (c.monitor(), c.is_floating()),
        None => {
            trace!(id = %e.id, "passing through configure request for unmanaged window");
            return x.configure_unmanaged(&e);
        }
    };

    if let Some(bw) = e.border {
        if let Some(c) = cs.client_mut(e.id) {
            c.border = bw;
        }
        return Ok(());
    }

    if !(floating || cs.has_floating_layout(cs.selected_monitor())) {
        let c = cs.client(e.id).map(|c| (c.geometry(), c.border()));
        if let Some((r, bw)) = c {
            x.send_configure_notify(e.id, r, bw)?;
        }
        return Ok(());
    }

    let mr = match cs.monitor(mon) {
        Some(m) => m.geometry(),
        None => return Ok(()),
    };
    let visible = cs.is_visible(e.id);
    let r = match cs.client_mut(e.id) {
        Some(c) => {
            if let Some(rx) = e.x {
                c.old_r.x = c.r.x;
                c.r.x = mr.x + rx;
            }
            if let Some(ry) = e.y {
                c.old_r.y = c.r.y;
                c.r.y = mr.y + ry;
            }
            if let Some(w) = e.w {
                c.old_r.w = c.r.w;
                c.r.w = w;
            }
            if let Some(h) = e.h {
                c.old_r.h = c.r.h;
                c.r.h = h;
            }

            // centre clients that would overflow their monitor
            if c.r.x + c.r.w > mr.x + mr.w && c.is_floating {
                c.r.x = mr.x + (mr.w / 2 - c.outer_w() / 2);
            }
            if c.r.y + c.r.h > mr.y + mr.h && c.is_floating {
                c.r.y = mr.y + (mr.h / 2 - c.outer_h() / 2);
            }

            (c.r, c.border)
        }
        None => return Ok(()),
    };

    let moved = e.x.is_some() || e.y.is_some();
    let resized = e.w.is_some() || e.h.is_some();
    if moved && !resized {
        x.send_configure_notify(e.id, r.0, r.1)?;
    }
    if visible {
        x.set_client_config(e.id, &[ClientConfig::Position(r.0)])?;
    }

    Ok(())
}

pub(crate) fn configure_notify<X: XConn>(
    e: ConfigureEvent,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    if !e.is_root {
        return Ok(());
    }

    let resized = state.client_set.set_screen_size(e.r.w, e.r.h);
    let dirty = x.update_geometry(state)?;
    if !(resized || dirty) {
        return Ok(());
    }
    debug!(r = ?e.r, "root window geometry changed");

    for m in 0..state.client_set.monitors().len() {
        let mr = state.client_set.monitors()[m].geometry();
        let fullscreen: Vec<Xid> = state
            .client_set
            .iter_clients(m)
            .filter(|c| c.is_fullscreen())
            .map(|c| c.id())
            .collect();
        for id in fullscreen {
            state.client_set.resize_client(id, mr);
        }
        x.reposition_bar(m, state)?;
    }

    x.focus(None, state)?;
    x.arrange(None, state)
}

pub(crate) fn destroy<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    if state.client_set.contains(id) {
        x.unmanage(id, true, state)?;
    }

    Ok(())
}

pub(crate) fn enter<X: XConn>(p: PointerChange, state: &mut State<X>, x: &X) -> Result<()> {
    if (p.mode != NotifyMode::Normal || p.inferior) && p.id != state.root {
        return Ok(());
    }

    let client = state.client_set.contains(p.id).then_some(p.id);
    let m = x.window_to_monitor(p.id, state)?;
    let selmon = state.client_set.selected_monitor();

    if m != selmon {
        if let Some(sel) = state.client_set.selected_client() {
            x.unfocus(sel, true, state)?;
        }
        state.client_set.set_selected_monitor(m)?;
    } else if client.is_none() || client == state.client_set.selected_client() {
        return Ok(());
    }

    x.focus(client, state)
}

pub(crate) fn expose<X: XConn>(e: ExposeEvent, state: &mut State<X>, x: &X) -> Result<()> {
    if e.count == 0 {
        let m = x.window_to_monitor(e.id, state)?;
        x.redraw_bar(m, state)?;
    }

    Ok(())
}

// Some clients grab focus for themselves
pub(crate) fn focus_in<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    match state.client_set.selected_client() {
        Some(sel) if sel != id => x.set_focus(sel, state),
        _ => Ok(()),
    }
}

pub(crate) fn keypress<X: XConn>(
    key: KeyCode,
    bindings: &mut KeyBindings<X>,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    let key = key.clean(state.numlock);
    match bindings.get_mut(&key) {
        Some(action) => {
            trace!(?key, "running key binding");
            action.call(state, x)
        }
        None => Ok(()),
    }
}

pub(crate) fn mapping_notify<X: XConn>(
    kind: MappingKind,
    bindings: &mut KeyBindings<X>,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    if kind == MappingKind::Keyboard {
        debug!("keyboard mapping changed: regrabbing keys");
        state.numlock = x.numlock_mask()?;
        let keys: Vec<KeyCode> = bindings.keys().copied().collect();
        x.grab_keys(&keys, state.numlock)?;
    }

    Ok(())
}

pub(crate) fn map_request<X: XConn>(id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
    let attrs = match x.window_attributes(id)? {
        Some(attrs) => attrs,
        None => {
            warn!(%id, "no attributes for window: not managing");
            return Ok(());
        }
    };

    if !attrs.override_redirect && !state.client_set.contains(id) {
        x.manage(id, &attrs, state)?;
    }

    Ok(())
}

// Moving the pointer across the root window into another monitor selects it
pub(crate) fn motion<X: XConn>(e: MotionEvent, state: &mut State<X>, x: &X) -> Result<()> {
    if e.id != state.root {
        return Ok(());
    }

    let m = state
        .client_set
        .rect_to_monitor(Rect::new(e.abs.x, e.abs.y, 1, 1));

    if state.motion_mon.map_or(false, |prev| prev != m) {
        if let Some(sel) = state.client_set.selected_client() {
            x.unfocus(sel, true, state)?;
        }
        state.client_set.set_selected_monitor(m)?;
        x.focus(None, state)?;
    }
    state.motion_mon = Some(m);

    Ok(())
}

pub(crate) fn property_notify<X: XConn>(e: PropertyEvent, state: &mut State<X>, x: &X) -> Result<()> {
    let atom = match Atom::from_str(&e.atom) {
        Ok(atom) => atom,
        Err(_) => return Ok(()),
    };

    if e.is_root && atom == Atom::WmName {
        return x.update_status(state);
    }
    if e.deleted {
        return Ok(());
    }

    let (mon, floating) = match state.client_set.client(e.id) {
        Some(c) => (c.monitor(), c.is_floating()),
        None => return Ok(()),
    };

    match atom {
        Atom::WmTransientFor => {
            let parent = x.transient_for(e.id)?;
            if !floating && parent.map_or(false, |p| state.client_set.contains(p)) {
                if let Some(c) = state.client_set.client_mut(e.id) {
                    c.is_floating = true;
                }
                x.arrange(Some(mon), state)?;
            }
        }

        Atom::WmNormalHints => x.update_size_hints(e.id, state)?,

        Atom::WmHints => {
            x.update_wm_hints(e.id, state)?;
            x.redraw_bars(state)?;
        }

        _ => (),
    }

    if matches!(atom, Atom::WmName | Atom::NetWmName) {
        x.update_title(e.id, state)?;
        let sel = state.client_set.monitor(mon).and_then(|m| m.selected());
        if sel == Some(e.id) {
            x.redraw_bar(mon, state)?;
        }
    }

    if atom == Atom::NetWmWindowType {
        x.update_window_type(e.id, state)?;
    }

    Ok(())
}

pub(crate) fn unmap_notify<X: XConn>(e: UnmapEvent, state: &mut State<X>, x: &X) -> Result<()> {
    if !state.client_set.contains(e.id) {
        return Ok(());
    }

    if e.synthetic {
        x.set_wm_state(e.id, WmState::Withdrawn)
    } else {
        x.unmanage(e.id, false, state)
    }
}
