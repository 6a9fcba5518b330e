//! Logic for interacting with the X server
//!
//! [XConn] is the seam between the window manager and the display protocol: it is a thin
//! request/response layer with no window manager logic of its own. Everything built on
//! top of it lives in [XConnExt], which is implemented for every [XConn] and carries out
//! the higher level operations (managing clients, moving focus, arranging monitors) by
//! combining updates to the pure [ClientSet](crate::pure::ClientSet) with the requests
//! needed to reflect them on screen.
use crate::{
    core::{
        bindings::{KeyCode, ModMask, MouseState},
        State,
    },
    pure::{
        geometry::{Point, Rect},
        client::BROKEN,
        hints::SizeHints,
        Client, Topology,
    },
    Color, Result, Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

pub mod atom;
pub mod event;
pub mod mock;
pub mod property;

pub use atom::Atom;
pub use event::XEvent;
pub use property::{Prop, WindowAttributes};

use event::{ClientMessage, ConfigureRequest};
use property::{MapState, WmHints, WmState};

/// Geometry and stacking changes for a client window
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientConfig {
    /// The border width in pixels
    BorderPx(i32),
    /// Absolute size and position on the screen as a [Rect]
    Position(Rect),
    /// Move the window without changing its size
    Move(Point),
    /// Stack this window directly below the given sibling
    StackBelow(Xid),
    /// Stack this window below all other windows
    StackBottom,
    /// Stack this window above all other windows
    StackTop,
}

/// The cursor to display while the pointer is grabbed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// The default pointer
    Normal,
    /// Shown while moving a client
    Move,
    /// Shown while resizing a client
    Resize,
}

/// A handle on a running X11 connection that we can use for issuing X requests.
///
/// XConn is intended as an abstraction layer to allow for communication with the
/// underlying display system using whatever mechanism the implementer wishes. X idioms
/// and high level event types are assumed.
///
/// Implementations are expected to drop requests that target a window that has already
/// been destroyed by returning a tolerated [Error::Protocol](crate::Error::Protocol) rather than failing hard.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;
    /// The geometry of the root window.
    fn screen_size(&self) -> Result<Rect>;
    /// The geometry of each physical output, or `None` if multi-head information is
    /// not available and the root window should be treated as a single monitor.
    fn screen_details(&self) -> Result<Option<Vec<Rect>>>;
    /// The current position of the pointer relative to the root window, if it can be
    /// queried.
    fn cursor_position(&self) -> Result<Option<Point>>;

    /// Look up the [Xid] of a given [Atom], interning it if needed.
    fn intern_atom(&self, atom: Atom) -> Result<Xid>;

    /// Register for substructure redirection on the root window.
    ///
    /// Must return [Error::OtherWmRunning](crate::Error::OtherWmRunning) if another client already holds the redirect.
    fn select_root_events(&self) -> Result<()>;
    /// Register for the events the window manager needs from a managed client.
    fn select_client_events(&self, client: Xid) -> Result<()>;
    /// Create the hidden window used for `_NET_SUPPORTING_WM_CHECK`.
    fn create_check_window(&self) -> Result<Xid>;
    /// Destroy a window that was created by the window manager.
    fn destroy_window(&self, id: Xid) -> Result<()>;

    /// The modifier mask currently mapped to num lock.
    fn numlock_mask(&self) -> Result<ModMask>;
    /// Release all key grabs on the root window and then grab each of the given key
    /// combinations under every combination of the caps lock and num lock modifiers.
    fn grab_keys(&self, keys: &[KeyCode], numlock: ModMask) -> Result<()>;
    /// Reset the button grabs on a client. Focused clients only have the given states
    /// grabbed, unfocused clients have every button grabbed so that clicking focuses them.
    fn grab_buttons(
        &self,
        client: Xid,
        states: &[MouseState],
        focused: bool,
        numlock: ModMask,
    ) -> Result<()>;
    /// Release all button grabs on a client.
    fn ungrab_buttons(&self, client: Xid) -> Result<()>;
    /// Actively grab the pointer, returning whether the grab succeeded.
    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool>;
    /// Release an active pointer grab.
    fn ungrab_pointer(&self) -> Result<()>;
    /// Replay a button press that was intercepted by a passive grab to the client.
    fn replay_pointer(&self) -> Result<()>;
    /// Move the pointer to a position relative to the given window.
    fn warp_pointer(&self, id: Xid, p: Point) -> Result<()>;

    /// Block and wait for the next event from the X server.
    fn next_event(&self) -> Result<XEvent>;
    /// Block and wait for the next event of a kind that is relevant while a pointer drag
    /// is in progress: button presses and releases, pointer motion, configure requests,
    /// exposes and map requests.
    fn next_interaction_event(&self) -> Result<XEvent>;
    /// Sync with the server and discard any pending pointer crossing events.
    fn drain_enter_events(&self) -> Result<()>;
    /// Flush any pending requests to the X server.
    fn flush(&self);

    /// The IDs of all current children of the root window
    fn existing_clients(&self) -> Result<Vec<Xid>>;
    /// The attributes of a window, or `None` if the window no longer exists.
    fn window_attributes(&self, id: Xid) -> Result<Option<WindowAttributes>>;

    /// Look up a specific property on a given window.
    fn get_prop(&self, id: Xid, atom: Atom) -> Result<Option<Prop>>;
    /// Set a specific property on a given window.
    fn set_prop(&self, id: Xid, atom: Atom, val: Prop) -> Result<()>;
    /// Delete a property from a given window.
    fn delete_prop(&self, id: Xid, atom: Atom) -> Result<()>;
    /// Get the current [WmState] for a given window.
    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>>;
    /// Set the current [WmState] for a given window.
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;

    /// Apply one or more [ClientConfig] changes to a window.
    fn set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()>;
    /// Forward a configure request for an unmanaged window to the server unchanged.
    fn configure_unmanaged(&self, req: &ConfigureRequest) -> Result<()>;
    /// Send a synthetic ConfigureNotify informing a client of its current geometry.
    fn send_configure_notify(&self, id: Xid, r: Rect, border: i32) -> Result<()>;
    /// Set the border color of a window.
    fn set_border_color(&self, id: Xid, color: Color) -> Result<()>;
    /// Give input focus to a window.
    fn set_input_focus(&self, id: Xid) -> Result<()>;
    /// Send a [ClientMessage] to a window.
    fn send_client_message(&self, msg: ClientMessage) -> Result<()>;
    /// Map a window, making it visible.
    fn map(&self, id: Xid) -> Result<()>;
    /// Forcibly disconnect the client owning the given window.
    fn kill(&self, id: Xid) -> Result<()>;
}

/// Extended functionality for [XConn] impls in order to run the window manager.
pub trait XConnExt: XConn + Sized {
    /// Start managing a new window.
    ///
    /// The client is placed using its transient parent or the configured rules, kept
    /// within its monitor, linked in below the current selection and then focused.
    ///
    /// Every property is read before the client is added to the
    /// [ClientSet](crate::pure::ClientSet). Once it is
    /// linked a failing request leaves it managed, to be released by a later unmap or
    /// destroy notification.
    fn manage(&self, id: Xid, attrs: &WindowAttributes, state: &mut State<Self>) -> Result<()> {
        trace!(%id, "managing new client");
        let title = tolerate(id, self.window_title(id), None)?;
        let transient = tolerate(id, self.transient_for(id), None)?;
        let broken = (BROKEN.to_string(), BROKEN.to_string());
        let (class, instance) = tolerate(id, self.wm_class(id), broken)?;
        let (fullscreen, dialog) = tolerate(id, self.window_type(id), (false, false))?;
        let size_hints = tolerate(id, self.size_hints(id), SizeHints::default())?;
        let wm_hints = tolerate(id, self.wm_hints(id), None)?;

        let mut c = Client::new(id, attrs.geometry, 0);
        c.old_border = attrs.border_width;
        c.set_name(title.as_deref());
        let cs = &state.client_set;
        cs.assign(&mut c, transient, &class, &instance, &state.config.rules);
        cs.place(&mut c);
        c.border = state.config.border_width;
        c.set_hints(size_hints);
        if let Some(h) = wm_hints {
            c.is_urgent = h.is_urgent();
            c.never_focus = h.accepts_input().map_or(false, |input| !input);
        }
        c.is_floating |= dialog || transient.is_some() || c.is_fixed;
        c.old_floating = c.is_floating;

        let (r, border, mon, floating) = (c.r, c.border, c.mon, c.is_floating);
        state.client_set.insert(c);

        self.set_client_config(id, &[ClientConfig::BorderPx(border)])?;
        self.set_border_color(id, state.config.normal_border)?;
        self.send_configure_notify(id, r, border)?;
        if fullscreen {
            self.set_fullscreen(id, true, state)?;
        }
        self.select_client_events(id)?;
        self.grab_buttons(id, &state.client_buttons, false, state.numlock)?;
        if floating {
            self.set_client_config(id, &[ClientConfig::StackTop])?;
        }
        self.update_client_list(state)?;

        let sw = state.client_set.screen().w;
        self.set_client_config(id, &[ClientConfig::Position(Rect::new(r.x + 2 * sw, r.y, r.w, r.h))])?;
        self.set_wm_state(id, WmState::Normal)?;

        if mon == state.client_set.selected_monitor() {
            if let Some(sel) = state.client_set.selected_client().filter(|&sel| sel != id) {
                self.unfocus(sel, false, state)?;
            }
        }
        if let Some(m) = state.client_set.monitors.get_mut(mon) {
            m.sel = Some(id);
        }

        self.arrange(Some(mon), state)?;
        self.map(id)?;
        debug!(%id, mon, floating, "client managed");

        self.focus(None, state)
    }

    /// Stop managing a client, restoring its original border unless the window has
    /// already been destroyed, then refocus and re-arrange its monitor.
    fn unmanage(&self, id: Xid, destroyed: bool, state: &mut State<Self>) -> Result<()> {
        let m = match state.client_set.client(id) {
            Some(c) => c.mon,
            None => return Ok(()),
        };
        trace!(%id, destroyed, "removing client");

        release_client(self, id, destroyed, state)?;
        self.focus(None, state)?;
        self.update_client_list(state)?;

        self.arrange(Some(m), state)
    }

    /// Move focus to the given client or to the most recently focused visible client if
    /// the target is not usable.
    fn focus(&self, target: Option<Xid>, state: &mut State<Self>) -> Result<()> {
        let change = state.client_set.focus(target);

        if let Some(id) = change.unfocused {
            self.unfocus(id, false, state)?;
        }

        match change.focused {
            Some(id) => {
                if change.was_urgent {
                    self.set_wm_hints_urgency(id, false)?;
                }
                self.grab_buttons(id, &state.client_buttons, true, state.numlock)?;
                self.set_border_color(id, state.config.focused_border)?;
                self.set_focus(id, state)?;
            }
            None => {
                self.set_input_focus(state.root)?;
                self.delete_prop(state.root, Atom::NetActiveWindow)?;
            }
        }

        self.redraw_bars(state)
    }

    /// Draw a client as unfocused, optionally returning input focus to the root window.
    fn unfocus(&self, id: Xid, set_focus: bool, state: &mut State<Self>) -> Result<()> {
        if !state.client_set.contains(id) {
            return Ok(());
        }

        self.grab_buttons(id, &state.client_buttons, false, state.numlock)?;
        self.set_border_color(id, state.config.normal_border)?;

        if set_focus {
            self.set_input_focus(state.root)?;
            self.delete_prop(state.root, Atom::NetActiveWindow)?;
        }

        Ok(())
    }

    /// Hand input focus to a client: directly unless it has asked never to be focused,
    /// and through `WM_TAKE_FOCUS` if it supports the protocol.
    fn set_focus(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        let never_focus = state.client_set.client(id).map_or(true, |c| c.never_focus);

        if !never_focus {
            self.set_input_focus(id)?;
            self.set_prop(state.root, Atom::NetActiveWindow, Prop::Window(vec![id]))?;
        }
        self.send_protocol(id, Atom::WmTakeFocus)?;

        Ok(())
    }

    /// Show and hide clients based on the current tags, then run the active layout for
    /// the given monitor or every monitor if `m` is `None`.
    fn arrange(&self, m: Option<usize>, state: &mut State<Self>) -> Result<()> {
        let targets: Vec<usize> = match m {
            Some(m) => vec![m],
            None => (0..state.client_set.monitors().len()).collect(),
        };

        for &m in targets.iter() {
            for (id, p) in state.client_set.show_hide(m) {
                self.set_client_config(id, &[ClientConfig::Move(p)])?;
            }
        }
        self.flush_pending(state)?;

        for &m in targets.iter() {
            state.client_set.arrange_monitor(m);
        }
        self.flush_pending(state)?;

        match m {
            Some(m) => self.restack(m, state),
            None => Ok(()),
        }
    }

    /// Push any queued client geometry changes out to the server.
    fn flush_pending(&self, state: &mut State<Self>) -> Result<()> {
        for cfg in state.client_set.drain_pending() {
            trace!(id = %cfg.id, r = ?cfg.r, "configuring client");
            self.set_client_config(
                cfg.id,
                &[ClientConfig::Position(cfg.r), ClientConfig::BorderPx(cfg.border)],
            )?;
            self.send_configure_notify(cfg.id, cfg.r, cfg.border)?;
        }

        Ok(())
    }

    /// Restack the clients of a monitor: a floating selection is raised and tiled
    /// clients are stacked below the bar in focus order.
    fn restack(&self, m: usize, state: &mut State<Self>) -> Result<()> {
        self.redraw_bar(m, state)?;

        let cs = &state.client_set;
        let sel = match cs.monitor(m).and_then(|mon| mon.sel) {
            Some(id) => id,
            None => return Ok(()),
        };

        let floating_layout = cs.has_floating_layout(m);
        if floating_layout || cs.client(sel).map_or(false, |c| c.is_floating) {
            self.set_client_config(sel, &[ClientConfig::StackTop])?;
        }

        if !floating_layout {
            let mut below = state.config.bar.as_ref().and_then(|b| b.window(m));
            let tiled: Vec<Xid> = cs
                .iter_stack(m)
                .filter(|c| !c.is_floating && cs.visible(c))
                .map(|c| c.id)
                .collect();

            for id in tiled {
                let cfg = match below {
                    Some(sibling) => ClientConfig::StackBelow(sibling),
                    None => ClientConfig::StackBottom,
                };
                self.set_client_config(id, &[cfg])?;
                below = Some(id);
            }
        }

        self.drain_enter_events()
    }

    /// Enter or leave fullscreen for a client, keeping `_NET_WM_STATE` in sync.
    fn set_fullscreen(&self, id: Xid, fullscreen: bool, state: &mut State<Self>) -> Result<()> {
        if !state.client_set.set_fullscreen(id, fullscreen) {
            return Ok(());
        }

        let atoms = if fullscreen {
            vec![Atom::NetWmStateFullscreen.as_ref().to_string()]
        } else {
            vec![]
        };
        self.set_prop(id, Atom::NetWmState, Prop::Atom(atoms))?;

        if fullscreen {
            self.flush_pending(state)?;
            self.set_client_config(id, &[ClientConfig::StackTop])
        } else {
            let m = state.client_set.window_to_monitor(id);
            self.flush_pending(state)?;
            self.arrange(Some(m), state)
        }
    }

    /// Set or clear the urgency of a client in both our state and its `WM_HINTS`.
    fn set_urgent(&self, id: Xid, urgent: bool, state: &mut State<Self>) -> Result<()> {
        match state.client_set.client_mut(id) {
            Some(c) => c.is_urgent = urgent,
            None => return Ok(()),
        }

        self.set_wm_hints_urgency(id, urgent)
    }

    /// Update the urgency flag in the `WM_HINTS` of a window if it has any.
    fn set_wm_hints_urgency(&self, id: Xid, urgent: bool) -> Result<()> {
        if let Some(Prop::WmHints(mut hints)) = self.get_prop(id, Atom::WmHints)? {
            hints.set_urgent(urgent);
            self.set_prop(id, Atom::WmHints, Prop::WmHints(hints))?;
        }

        Ok(())
    }

    /// Move a client to another monitor, taking on the tags viewed there.
    fn send_to_monitor(&self, id: Xid, m: usize, state: &mut State<Self>) -> Result<()> {
        if state.client_set.window_to_monitor(id) == m || !state.client_set.contains(id) {
            return Ok(());
        }

        self.unfocus(id, true, state)?;
        if !state.client_set.send_to_monitor(id, m) {
            return Ok(());
        }
        self.focus(None, state)?;

        self.arrange(None, state)
    }

    /// Ask a client to close via `WM_DELETE_WINDOW`, killing it if it does not support
    /// the protocol.
    fn kill_client(&self, id: Xid) -> Result<()> {
        if !self.send_protocol(id, Atom::WmDeleteWindow)? {
            debug!(%id, "client does not support WM_DELETE_WINDOW: killing");
            self.kill(id)?;
        }

        Ok(())
    }

    /// Whether a window lists the given protocol in its `WM_PROTOCOLS`.
    fn supports_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        match self.get_prop(id, Atom::WmProtocols)? {
            Some(Prop::Atom(protocols)) => Ok(protocols.iter().any(|p| p == proto.as_ref())),
            _ => Ok(false),
        }
    }

    /// Send a `WM_PROTOCOLS` message to a window if it supports the given protocol,
    /// returning whether the message was sent.
    fn send_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        if !self.supports_protocol(id, proto)? {
            return Ok(false);
        }

        let proto_id = *self.intern_atom(proto)?;
        let msg = ClientMessage::new(id, Atom::WmProtocols.as_ref(), [proto_id, 0, 0, 0, 0]);
        self.send_client_message(msg)?;

        Ok(true)
    }

    /// The title of a window from `_NET_WM_NAME` falling back to `WM_NAME`.
    fn window_title(&self, id: Xid) -> Result<Option<String>> {
        for atom in [Atom::NetWmName, Atom::WmName] {
            if let Some(Prop::UTF8String(mut strs)) = self.get_prop(id, atom)? {
                if !strs.is_empty() && !strs[0].is_empty() {
                    return Ok(Some(strs.swap_remove(0)));
                }
            }
        }

        Ok(None)
    }

    /// The window that this window is transient for, if any.
    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        match self.get_prop(id, Atom::WmTransientFor)? {
            Some(Prop::Window(ids)) => Ok(ids.first().copied()),
            _ => Ok(None),
        }
    }

    /// The `(class, instance)` pair from `WM_CLASS`, with unreadable values replaced by
    /// [BROKEN](crate::pure::client::BROKEN).
    fn wm_class(&self, id: Xid) -> Result<(String, String)> {
        let strs = match self.get_prop(id, Atom::WmClass)? {
            Some(Prop::UTF8String(strs)) => strs,
            _ => vec![],
        };
        let instance = strs.first().cloned().unwrap_or_else(|| BROKEN.to_string());
        let class = strs.get(1).cloned().unwrap_or_else(|| BROKEN.to_string());

        Ok((class, instance))
    }

    /// Refresh the display name of a client.
    fn update_title(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        let title = self.window_title(id)?;
        if let Some(c) = state.client_set.client_mut(id) {
            c.set_name(title.as_deref());
        }

        Ok(())
    }

    /// The size hints of a window, all zero if it has no `WM_NORMAL_HINTS`.
    fn size_hints(&self, id: Xid) -> Result<SizeHints> {
        let raw = match self.get_prop(id, Atom::WmNormalHints)? {
            Some(Prop::WmNormalHints(h)) => Some(h),
            _ => None,
        };

        Ok(SizeHints::from_normal_hints(raw.as_ref()))
    }

    /// Refresh the size hints of a client from `WM_NORMAL_HINTS`.
    fn update_size_hints(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        let hints = self.size_hints(id)?;
        if let Some(c) = state.client_set.client_mut(id) {
            c.set_hints(hints);
        }

        Ok(())
    }

    /// The `WM_HINTS` of a window, if it has any.
    fn wm_hints(&self, id: Xid) -> Result<Option<WmHints>> {
        match self.get_prop(id, Atom::WmHints)? {
            Some(Prop::WmHints(h)) => Ok(Some(h)),
            _ => Ok(None),
        }
    }

    /// Refresh urgency and input handling of a client from `WM_HINTS`.
    ///
    /// Urgency is cleared rather than recorded for the selected client.
    fn update_wm_hints(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        let mut hints = match self.wm_hints(id)? {
            Some(h) => h,
            None => return Ok(()),
        };

        let urgent = hints.is_urgent();
        let never_focus = hints.accepts_input().map_or(false, |input| !input);
        let selected = state.client_set.selected_client() == Some(id);
        if selected && urgent {
            hints.set_urgent(false);
            self.set_prop(id, Atom::WmHints, Prop::WmHints(hints))?;
        }

        if let Some(c) = state.client_set.client_mut(id) {
            if !selected {
                c.is_urgent = urgent;
            }
            c.never_focus = never_focus;
        }

        Ok(())
    }

    /// Whether a window asks to be fullscreen and whether it is a dialog.
    fn window_type(&self, id: Xid) -> Result<(bool, bool)> {
        let has = |atom: Atom, val: Atom| -> Result<bool> {
            match self.get_prop(id, atom)? {
                Some(Prop::Atom(atoms)) => Ok(atoms.iter().any(|a| a == val.as_ref())),
                _ => Ok(false),
            }
        };

        Ok((
            has(Atom::NetWmState, Atom::NetWmStateFullscreen)?,
            has(Atom::NetWmWindowType, Atom::NetWindowTypeDialog)?,
        ))
    }

    /// Apply `_NET_WM_STATE` fullscreen and dialog window types to a client.
    fn update_window_type(&self, id: Xid, state: &mut State<Self>) -> Result<()> {
        let (fullscreen, dialog) = self.window_type(id)?;

        if fullscreen {
            self.set_fullscreen(id, true, state)?;
        }
        if dialog {
            if let Some(c) = state.client_set.client_mut(id) {
                c.is_floating = true;
            }
        }

        Ok(())
    }

    /// Rewrite `_NET_CLIENT_LIST` on the root window.
    fn update_client_list(&self, state: &State<Self>) -> Result<()> {
        let ids = state.client_set.all_clients();
        self.set_prop(state.root, Atom::NetClientList, Prop::Window(ids))
    }

    /// Refresh the status text from the `WM_NAME` of the root window.
    fn update_status(&self, state: &mut State<Self>) -> Result<()> {
        state.status = match self.get_prop(state.root, Atom::WmName)? {
            Some(Prop::UTF8String(mut strs)) if !strs.is_empty() => strs.swap_remove(0),
            _ => format!("tagwm-{}", env!("CARGO_PKG_VERSION")),
        };

        let m = state.client_set.selected_monitor();
        self.redraw_bar(m, state)
    }

    /// Reconcile the monitor list with the current output layout, returning whether
    /// anything changed.
    fn update_geometry(&self, state: &mut State<Self>) -> Result<bool> {
        let topology = match self.screen_details()? {
            Some(rects) => Topology::Multi(rects),
            None => Topology::Single,
        };

        let dirty = state.client_set.reconcile(topology);
        if dirty {
            let m = self.window_to_monitor(state.root, state)?;
            state.client_set.set_selected_monitor(m)?;
        }

        Ok(dirty)
    }

    /// The monitor a window belongs to. For the root window this is the monitor under
    /// the pointer, for bars it is the monitor they are drawn on and for clients it is
    /// their assigned monitor. Anything else maps to the selected monitor.
    fn window_to_monitor(&self, id: Xid, state: &State<Self>) -> Result<usize> {
        let cs = &state.client_set;

        if id == state.root {
            if let Some(p) = self.cursor_position()? {
                return Ok(cs.rect_to_monitor(Rect::new(p.x, p.y, 1, 1)));
            }
        }

        if let Some(m) = state.config.bar.as_ref().and_then(|b| b.monitor_for(id)) {
            return Ok(m);
        }

        Ok(cs.window_to_monitor(id))
    }

    /// Redraw the bar of a single monitor if a [StatusBar](crate::core::hooks::StatusBar)
    /// is configured.
    fn redraw_bar(&self, m: usize, state: &mut State<Self>) -> Result<()> {
        let mut bar = state.config.bar.take();
        let res = match bar.as_mut() {
            Some(b) => b.redraw(m, state, self),
            None => Ok(()),
        };
        state.config.bar = bar;

        res
    }

    /// Redraw the bars of every monitor.
    fn redraw_bars(&self, state: &mut State<Self>) -> Result<()> {
        for m in 0..state.client_set.monitors().len() {
            self.redraw_bar(m, state)?;
        }

        Ok(())
    }

    /// Move the bar of a monitor after its geometry or visibility has changed.
    fn reposition_bar(&self, m: usize, state: &mut State<Self>) -> Result<()> {
        let mut bar = state.config.bar.take();
        let res = match bar.as_mut() {
            Some(b) => b.reposition(m, state, self),
            None => Ok(()),
        };
        state.config.bar = bar;

        res
    }

    /// Whether an existing window should be adopted when the window manager starts.
    fn should_adopt(&self, id: Xid, attrs: &WindowAttributes) -> Result<bool> {
        Ok(attrs.map_state == MapState::Viewable
            || self.get_wm_state(id)? == Some(WmState::Iconic))
    }
}

impl<T> XConnExt for T where T: XConn {}

/// Fall back to `default` when reading from a window fails because it has gone away.
fn tolerate<T>(id: Xid, res: Result<T>, default: T) -> Result<T> {
    match res {
        Err(e) if e.is_tolerated() => {
            trace!(%id, %e, "unable to read window property, using default");
            Ok(default)
        }
        res => res,
    }
}

/// Remove a client from the window manager without refocusing or arranging. Windows that
/// still exist have their original border restored and are withdrawn.
pub(crate) fn release_client<X: XConn>(
    x: &X,
    id: Xid,
    destroyed: bool,
    state: &mut State<X>,
) -> Result<()> {
    let c = match state.client_set.remove(id) {
        Some(c) => c,
        None => return Ok(()),
    };

    if !destroyed {
        let res = x
            .set_client_config(id, &[ClientConfig::BorderPx(c.old_border)])
            .and_then(|_| x.ungrab_buttons(id))
            .and_then(|_| x.set_wm_state(id, WmState::Withdrawn));

        match res {
            Err(e) if e.is_tolerated() => trace!(%id, %e, "client went away while releasing"),
            Err(e) => {
                error!(%id, %e, "unable to restore client state");
                return Err(e);
            }
            Ok(()) => (),
        }
    }

    Ok(())
}

/// Adopt the windows that already exist when the window manager starts: ordinary
/// windows first so that transients can find their parents.
pub(crate) fn scan<X: XConn>(x: &X, state: &mut State<X>) -> Result<()> {
    let ids: Vec<Xid> = x
        .existing_clients()?
        .into_iter()
        .filter(|&id| !state.client_set.contains(id))
        .collect();
    let mut transients = Vec::new();

    for id in ids {
        let attrs = match x.window_attributes(id)? {
            Some(a) if !a.override_redirect => a,
            _ => continue,
        };

        if x.transient_for(id)?.is_some() {
            transients.push((id, attrs));
        } else if x.should_adopt(id, &attrs)? {
            x.manage(id, &attrs, state)?;
        }
    }

    for (id, attrs) in transients {
        if x.should_adopt(id, &attrs)? {
            x.manage(id, &attrs, state)?;
        } else {
            warn!(%id, "skipping unmapped transient window");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Config, WindowManager},
        x::{mock::ScriptedConn, property::WindowAttributes},
    };
    use std::collections::HashMap;

    fn wm(conn: ScriptedConn) -> WindowManager<ScriptedConn> {
        WindowManager::new(Config::default(), HashMap::new(), HashMap::new(), conn).unwrap()
    }

    #[test]
    fn scan_adopts_parents_before_transients() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.add_window(5, Rect::new(0, 0, 50, 50));
        conn.add_window(20, Rect::new(0, 0, 300, 300));
        conn.set_window_prop(Xid(5), Atom::WmTransientFor, Prop::Window(vec![Xid(20)]));

        let mut wm = wm(conn);
        let (state, x) = wm.parts_mut();
        state.client_set.view(1 << 3);
        scan(x, state).unwrap();

        let parent = state.client_set.client(Xid(20)).unwrap();
        let child = state.client_set.client(Xid(5)).unwrap();
        assert_eq!(child.tags(), parent.tags());
        assert!(child.is_floating());
        assert!(!parent.is_floating());
    }

    #[test]
    fn scan_skips_override_redirect_and_unmapped_windows() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        let r = Rect::new(0, 0, 50, 50);
        conn.add_window_with_attrs(5, WindowAttributes::new(true, MapState::Viewable, r, 0));
        conn.add_window_with_attrs(6, WindowAttributes::new(false, MapState::Unmapped, r, 0));
        conn.add_window_with_attrs(7, WindowAttributes::new(false, MapState::Unmapped, r, 0));
        conn.set_wm_state(Xid(7), WmState::Iconic).unwrap();

        let mut wm = wm(conn);
        let (state, x) = wm.parts_mut();
        scan(x, state).unwrap();

        assert_eq!(state.client_set.all_clients(), vec![Xid(7)]);
    }

    #[test]
    fn rules_are_applied_from_wm_class() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.add_window(5, Rect::new(0, 0, 50, 50));
        conn.add_window(6, Rect::new(0, 0, 50, 50));
        let class = |s: &str| Prop::UTF8String(vec![s.to_lowercase(), s.to_string()]);
        conn.set_window_prop(Xid(5), Atom::WmClass, class("Gimp"));
        conn.set_window_prop(Xid(6), Atom::WmClass, class("Firefox"));

        let mut wm = wm(conn);
        wm.handle_event(XEvent::MapRequest(Xid(5))).unwrap();
        wm.handle_event(XEvent::MapRequest(Xid(6))).unwrap();

        let cs = &wm.state.client_set;
        assert!(cs.client(Xid(5)).unwrap().is_floating());
        assert_eq!(cs.client(Xid(6)).unwrap().tags(), 1 << 8);
        assert_eq!(cs.selected_client(), Some(Xid(5)));
    }

    #[test]
    fn unreadable_hints_fall_back_to_defaults() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.add_window(10, Rect::new(0, 0, 50, 50));
        conn.fail_prop_reads(Xid(10), Atom::WmNormalHints);
        conn.fail_prop_reads(Xid(10), Atom::WmHints);

        let mut wm = wm(conn);
        wm.handle_event(XEvent::MapRequest(Xid(10))).unwrap();

        let cs = &wm.state.client_set;
        assert_eq!(cs.all_clients(), vec![Xid(10)]);
        assert_eq!(cs.selected_client(), Some(Xid(10)));
        assert!(!cs.client(Xid(10)).unwrap().is_fixed());
        assert!(cs.invariant_violations().is_empty());
    }

    #[test]
    fn a_window_vanishing_while_being_managed_stays_linked_until_destroyed() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.add_window(10, Rect::new(0, 0, 50, 50));
        conn.add_window(11, Rect::new(0, 0, 50, 50));

        let mut wm = wm(conn);
        wm.handle_event(XEvent::MapRequest(Xid(10))).unwrap();
        wm.conn().vanish_window(Xid(11));

        wm.handle_event(XEvent::MapRequest(Xid(11))).unwrap();
        wm.handle_event(XEvent::MapRequest(Xid(11))).unwrap();

        let cs = &wm.state.client_set;
        assert_eq!(cs.all_clients(), vec![Xid(10), Xid(11)]);
        assert!(cs.invariant_violations().is_empty());

        wm.handle_event(XEvent::Destroy(Xid(11))).unwrap();

        let cs = &wm.state.client_set;
        assert_eq!(cs.all_clients(), vec![Xid(10)]);
        assert_eq!(cs.selected_client(), Some(Xid(10)));
        assert!(cs.invariant_violations().is_empty());
    }

    #[test]
    fn kill_prefers_wm_delete_window() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.set_window_prop(
            Xid(5),
            Atom::WmProtocols,
            Prop::Atom(vec![Atom::WmDeleteWindow.as_ref().to_string()]),
        );

        conn.kill_client(Xid(5)).unwrap();

        let calls = conn.calls();
        assert!(matches!(calls.as_slice(), [mock::Call::Message(_)]));
    }
}
