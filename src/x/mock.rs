//! Mock implementations of [XConn] for driving the window manager without a display.
//!
//! [MockXConn] mirrors every [XConn] method with a `mock_` prefixed default so that test
//! doubles only need to implement the calls they care about. [ScriptedConn] is a ready
//! made implementation that replays a queue of events against an in memory model of the
//! server and records every request it is sent.
use crate::{
    core::bindings::{KeyCode, ModMask, MouseState},
    pure::geometry::{Point, Rect},
    x::{
        event::{ClientMessage, ConfigureRequest, ErrorCode, ProtocolError, Request, XEvent},
        property::{MapState, Prop, WindowAttributes, WmState},
        Atom, ClientConfig, CursorKind, XConn,
    },
    Color, Error, Result, Xid,
};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet, VecDeque},
};
use strum::IntoEnumIterator;

/// Every method on this trait has a default that succeeds without doing anything, with
/// the exception of the two event methods which report a closed connection.
///
/// Any implementation of `MockXConn` will automatically implement [XConn] by forwarding
/// calls to `$method` on to `mock_$method`.
#[allow(unused_variables, missing_docs)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(0)
    }

    fn mock_screen_size(&self) -> Result<Rect> {
        Ok(Rect::new(0, 0, 1920, 1080))
    }

    fn mock_screen_details(&self) -> Result<Option<Vec<Rect>>> {
        Ok(None)
    }

    fn mock_cursor_position(&self) -> Result<Option<Point>> {
        Ok(None)
    }

    fn mock_intern_atom(&self, atom: Atom) -> Result<Xid> {
        let n = Atom::iter().position(|a| a == atom).unwrap_or_default();
        Ok(Xid(100 + n as u32))
    }

    fn mock_select_root_events(&self) -> Result<()> {
        Ok(())
    }

    fn mock_select_client_events(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_create_check_window(&self) -> Result<Xid> {
        Ok(Xid(1))
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_numlock_mask(&self) -> Result<ModMask> {
        Ok(ModMask::MOD2)
    }

    fn mock_grab_keys(&self, keys: &[KeyCode], numlock: ModMask) -> Result<()> {
        Ok(())
    }

    fn mock_grab_buttons(
        &self,
        client: Xid,
        states: &[MouseState],
        focused: bool,
        numlock: ModMask,
    ) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_buttons(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_replay_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_warp_pointer(&self, id: Xid, p: Point) -> Result<()> {
        Ok(())
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::ConnectionClosed)
    }

    fn mock_next_interaction_event(&self) -> Result<XEvent> {
        Err(Error::ConnectionClosed)
    }

    fn mock_drain_enter_events(&self) -> Result<()> {
        Ok(())
    }

    fn mock_flush(&self) {}

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(vec![])
    }

    fn mock_window_attributes(&self, id: Xid) -> Result<Option<WindowAttributes>> {
        Ok(None)
    }

    fn mock_get_prop(&self, id: Xid, atom: Atom) -> Result<Option<Prop>> {
        Ok(None)
    }

    fn mock_set_prop(&self, id: Xid, atom: Atom, val: Prop) -> Result<()> {
        Ok(())
    }

    fn mock_delete_prop(&self, id: Xid, atom: Atom) -> Result<()> {
        Ok(())
    }

    fn mock_get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        Ok(())
    }

    fn mock_set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        Ok(())
    }

    fn mock_configure_unmanaged(&self, req: &ConfigureRequest) -> Result<()> {
        Ok(())
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, border: i32) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        Ok(())
    }

    fn mock_set_input_focus(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_send_client_message(&self, msg: ClientMessage) -> Result<()> {
        Ok(())
    }

    fn mock_map(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_kill(&self, id: Xid) -> Result<()> {
        Ok(())
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn screen_size(&self) -> Result<Rect> {
        self.mock_screen_size()
    }

    fn screen_details(&self) -> Result<Option<Vec<Rect>>> {
        self.mock_screen_details()
    }

    fn cursor_position(&self) -> Result<Option<Point>> {
        self.mock_cursor_position()
    }

    fn intern_atom(&self, atom: Atom) -> Result<Xid> {
        self.mock_intern_atom(atom)
    }

    fn select_root_events(&self) -> Result<()> {
        self.mock_select_root_events()
    }

    fn select_client_events(&self, client: Xid) -> Result<()> {
        self.mock_select_client_events(client)
    }

    fn create_check_window(&self) -> Result<Xid> {
        self.mock_create_check_window()
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.mock_destroy_window(id)
    }

    fn numlock_mask(&self) -> Result<ModMask> {
        self.mock_numlock_mask()
    }

    fn grab_keys(&self, keys: &[KeyCode], numlock: ModMask) -> Result<()> {
        self.mock_grab_keys(keys, numlock)
    }

    fn grab_buttons(
        &self,
        client: Xid,
        states: &[MouseState],
        focused: bool,
        numlock: ModMask,
    ) -> Result<()> {
        self.mock_grab_buttons(client, states, focused, numlock)
    }

    fn ungrab_buttons(&self, client: Xid) -> Result<()> {
        self.mock_ungrab_buttons(client)
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        self.mock_grab_pointer(cursor)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.mock_ungrab_pointer()
    }

    fn replay_pointer(&self) -> Result<()> {
        self.mock_replay_pointer()
    }

    fn warp_pointer(&self, id: Xid, p: Point) -> Result<()> {
        self.mock_warp_pointer(id, p)
    }

    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }

    fn next_interaction_event(&self) -> Result<XEvent> {
        self.mock_next_interaction_event()
    }

    fn drain_enter_events(&self) -> Result<()> {
        self.mock_drain_enter_events()
    }

    fn flush(&self) {
        self.mock_flush()
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        self.mock_existing_clients()
    }

    fn window_attributes(&self, id: Xid) -> Result<Option<WindowAttributes>> {
        self.mock_window_attributes(id)
    }

    fn get_prop(&self, id: Xid, atom: Atom) -> Result<Option<Prop>> {
        self.mock_get_prop(id, atom)
    }

    fn set_prop(&self, id: Xid, atom: Atom, val: Prop) -> Result<()> {
        self.mock_set_prop(id, atom, val)
    }

    fn delete_prop(&self, id: Xid, atom: Atom) -> Result<()> {
        self.mock_delete_prop(id, atom)
    }

    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        self.mock_get_wm_state(id)
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(id, state)
    }

    fn set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        self.mock_set_client_config(id, data)
    }

    fn configure_unmanaged(&self, req: &ConfigureRequest) -> Result<()> {
        self.mock_configure_unmanaged(req)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, border: i32) -> Result<()> {
        self.mock_send_configure_notify(id, r, border)
    }

    fn set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        self.mock_set_border_color(id, color)
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.mock_set_input_focus(id)
    }

    fn send_client_message(&self, msg: ClientMessage) -> Result<()> {
        self.mock_send_client_message(msg)
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.mock_map(id)
    }

    fn kill(&self, id: Xid) -> Result<()> {
        self.mock_kill(id)
    }
}

/// A request that was made against a [ScriptedConn].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Keys were (re)grabbed
    GrabKeys(Vec<KeyCode>),
    /// A window was configured
    Configure(Xid, Vec<ClientConfig>),
    /// An unmanaged configure request was passed through
    ConfigureUnmanaged(ConfigureRequest),
    /// A synthetic configure notify was sent
    ConfigureNotify(Xid, Rect, i32),
    /// A border colour was set
    BorderColor(Xid, Color),
    /// Input focus was given to a window
    Focus(Xid),
    /// A client message was sent
    Message(ClientMessage),
    /// A window was mapped
    Map(Xid),
    /// A client was killed
    Kill(Xid),
    /// The pointer was grabbed
    GrabPointer(CursorKind),
    /// The pointer grab was released
    UngrabPointer,
    /// The pointer was warped relative to a window
    Warp(Xid, Point),
    /// A window was destroyed
    Destroy(Xid),
}

/// An in memory stand in for an X server.
///
/// Windows, properties and pointer position are modelled just well enough for the window
/// manager to run against: geometry changes are applied to the stored windows and
/// properties can be read back after being written. Events are served from a queue and
/// the connection reports itself closed once the queue runs dry.
///
/// Windows can be marked as vanished, and individual properties as unreadable, to
/// exercise the BadWindow errors a real server returns for clients that have gone away.
#[derive(Debug)]
pub struct ScriptedConn {
    screen: Rect,
    outputs: RefCell<Option<Vec<Rect>>>,
    other_wm: bool,
    events: RefCell<VecDeque<XEvent>>,
    windows: RefCell<HashMap<Xid, WindowAttributes>>,
    props: RefCell<HashMap<(Xid, Atom), Prop>>,
    wm_states: RefCell<HashMap<Xid, WmState>>,
    pointer: Cell<Option<Point>>,
    calls: RefCell<Vec<Call>>,
    vanished: RefCell<HashSet<Xid>>,
    unreadable: RefCell<HashSet<(Xid, Atom)>>,
}

impl ScriptedConn {
    /// A single screen of the given size with no windows and no pending events.
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            outputs: RefCell::new(None),
            other_wm: false,
            events: RefCell::new(VecDeque::new()),
            windows: RefCell::new(HashMap::new()),
            props: RefCell::new(HashMap::new()),
            wm_states: RefCell::new(HashMap::new()),
            pointer: Cell::new(None),
            calls: RefCell::new(Vec::new()),
            vanished: RefCell::new(HashSet::new()),
            unreadable: RefCell::new(HashSet::new()),
        }
    }

    /// Report the given physical outputs rather than a single screen.
    pub fn with_outputs(self, outputs: Vec<Rect>) -> Self {
        self.set_outputs(outputs);
        self
    }

    /// Refuse substructure redirection as if another window manager were running.
    pub fn with_other_wm(mut self) -> Self {
        self.other_wm = true;
        self
    }

    /// Replace the reported physical outputs.
    pub fn set_outputs(&self, outputs: Vec<Rect>) {
        *self.outputs.borrow_mut() = Some(outputs);
    }

    /// Create a new mapped top level window.
    pub fn add_window(&self, id: u32, r: Rect) -> Xid {
        let id = Xid(id);
        let attrs = WindowAttributes::new(false, MapState::Viewable, r, 0);
        self.windows.borrow_mut().insert(id, attrs);

        id
    }

    /// Create a window with explicit attributes.
    pub fn add_window_with_attrs(&self, id: u32, attrs: WindowAttributes) -> Xid {
        let id = Xid(id);
        self.windows.borrow_mut().insert(id, attrs);

        id
    }

    /// Remove a window as if its client had destroyed it.
    pub fn remove_window(&self, id: Xid) {
        self.windows.borrow_mut().remove(&id);
        self.props.borrow_mut().retain(|(w, _), _| *w != id);
    }

    /// Fail every later request that targets `id` with BadWindow.
    pub fn vanish_window(&self, id: Xid) {
        self.vanished.borrow_mut().insert(id);
    }

    /// Fail reads of a single property of `id` with BadWindow.
    pub fn fail_prop_reads(&self, id: Xid, atom: Atom) {
        self.unreadable.borrow_mut().insert((id, atom));
    }

    /// Set a property on a window without recording a request.
    pub fn set_window_prop(&self, id: Xid, atom: Atom, val: Prop) {
        self.props.borrow_mut().insert((id, atom), val);
    }

    /// The current value of a property.
    pub fn prop(&self, id: Xid, atom: Atom) -> Option<Prop> {
        self.props.borrow().get(&(id, atom)).cloned()
    }

    /// The current geometry of a window.
    pub fn geometry(&self, id: Xid) -> Option<Rect> {
        self.windows.borrow().get(&id).map(|a| a.geometry)
    }

    /// The current `WM_STATE` of a window.
    pub fn wm_state(&self, id: Xid) -> Option<WmState> {
        self.wm_states.borrow().get(&id).copied()
    }

    /// Queue an event to be returned from the connection.
    pub fn push_event(&self, event: XEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// Queue several events in order.
    pub fn push_events(&self, events: impl IntoIterator<Item = XEvent>) {
        self.events.borrow_mut().extend(events);
    }

    /// The number of events still waiting to be read.
    pub fn pending_events(&self) -> usize {
        self.events.borrow().len()
    }

    /// Move the pointer to an absolute position.
    pub fn set_pointer(&self, p: Point) {
        self.pointer.set(Some(p));
    }

    /// Every request recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Take the recorded requests, clearing the log.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, id: Xid, request: Request) -> Result<()> {
        if self.vanished.borrow().contains(&id) {
            return Err(bad_window(request));
        }

        Ok(())
    }
}

fn bad_window(request: Request) -> Error {
    Error::Protocol(ProtocolError {
        request,
        code: ErrorCode::BadWindow,
    })
}

// GetProperty
const GET_PROPERTY: u8 = 20;

#[allow(unused_variables)]
impl MockXConn for ScriptedConn {
    fn mock_screen_size(&self) -> Result<Rect> {
        Ok(self.screen)
    }

    fn mock_screen_details(&self) -> Result<Option<Vec<Rect>>> {
        Ok(self.outputs.borrow().clone())
    }

    fn mock_cursor_position(&self) -> Result<Option<Point>> {
        Ok(self.pointer.get())
    }

    fn mock_select_root_events(&self) -> Result<()> {
        if self.other_wm {
            Err(Error::OtherWmRunning)
        } else {
            Ok(())
        }
    }

    fn mock_create_check_window(&self) -> Result<Xid> {
        Ok(Xid(1))
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        self.record(Call::Destroy(id));
        Ok(())
    }

    fn mock_grab_keys(&self, keys: &[KeyCode], numlock: ModMask) -> Result<()> {
        self.record(Call::GrabKeys(keys.to_vec()));
        Ok(())
    }

    fn mock_grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        self.record(Call::GrabPointer(cursor));
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        self.record(Call::UngrabPointer);
        Ok(())
    }

    fn mock_warp_pointer(&self, id: Xid, p: Point) -> Result<()> {
        // warps are relative to the inside of the window border
        let origin = self.windows.borrow().get(&id).map_or(Point::new(0, 0), |a| {
            let g = a.geometry;
            Point::new(g.x + a.border_width, g.y + a.border_width)
        });
        self.pointer.set(Some(Point::new(origin.x + p.x, origin.y + p.y)));
        self.record(Call::Warp(id, p));

        Ok(())
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or(Error::ConnectionClosed)
    }

    // Events outside of the mask stay queued for the main loop.
    fn mock_next_interaction_event(&self) -> Result<XEvent> {
        let mut events = self.events.borrow_mut();
        let ix = events.iter().position(|e| {
            e.is_interaction_passthrough()
                || matches!(
                    e,
                    XEvent::ButtonPress(_) | XEvent::ButtonRelease(_) | XEvent::MotionNotify(_)
                )
        });

        ix.and_then(|ix| events.remove(ix))
            .ok_or(Error::ConnectionClosed)
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        let mut ids: Vec<Xid> = self.windows.borrow().keys().copied().collect();
        ids.sort_unstable();

        Ok(ids)
    }

    fn mock_window_attributes(&self, id: Xid) -> Result<Option<WindowAttributes>> {
        Ok(self.windows.borrow().get(&id).copied())
    }

    fn mock_get_prop(&self, id: Xid, atom: Atom) -> Result<Option<Prop>> {
        let request = Request::Other(GET_PROPERTY);
        self.check(id, request)?;
        if self.unreadable.borrow().contains(&(id, atom)) {
            return Err(bad_window(request));
        }

        Ok(self.prop(id, atom))
    }

    fn mock_set_prop(&self, id: Xid, atom: Atom, val: Prop) -> Result<()> {
        self.set_window_prop(id, atom, val);
        Ok(())
    }

    fn mock_delete_prop(&self, id: Xid, atom: Atom) -> Result<()> {
        self.props.borrow_mut().remove(&(id, atom));
        Ok(())
    }

    fn mock_get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        Ok(self.wm_state(id))
    }

    fn mock_set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.wm_states.borrow_mut().insert(id, state);
        Ok(())
    }

    fn mock_set_client_config(&self, id: Xid, data: &[ClientConfig]) -> Result<()> {
        self.check(id, Request::ConfigureWindow)?;
        if let Some(attrs) = self.windows.borrow_mut().get_mut(&id) {
            for cfg in data {
                match cfg {
                    ClientConfig::Position(r) => attrs.geometry = *r,
                    ClientConfig::Move(p) => {
                        attrs.geometry.x = p.x;
                        attrs.geometry.y = p.y;
                    }
                    ClientConfig::BorderPx(bw) => attrs.border_width = *bw,
                    _ => (),
                }
            }
        }
        self.record(Call::Configure(id, data.to_vec()));

        Ok(())
    }

    fn mock_configure_unmanaged(&self, req: &ConfigureRequest) -> Result<()> {
        self.check(req.id, Request::ConfigureWindow)?;
        self.record(Call::ConfigureUnmanaged(*req));
        Ok(())
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, border: i32) -> Result<()> {
        self.record(Call::ConfigureNotify(id, r, border));
        Ok(())
    }

    fn mock_set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        self.record(Call::BorderColor(id, color));
        Ok(())
    }

    fn mock_set_input_focus(&self, id: Xid) -> Result<()> {
        self.record(Call::Focus(id));
        Ok(())
    }

    fn mock_send_client_message(&self, msg: ClientMessage) -> Result<()> {
        self.record(Call::Message(msg));
        Ok(())
    }

    fn mock_map(&self, id: Xid) -> Result<()> {
        self.record(Call::Map(id));
        Ok(())
    }

    fn mock_kill(&self, id: Xid) -> Result<()> {
        self.record(Call::Kill(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;
    impl MockXConn for Bare {}

    #[test]
    fn defaults_report_a_closed_connection() {
        assert!(matches!(Bare.next_event(), Err(Error::ConnectionClosed)));
        assert_eq!(Bare.window_attributes(Xid(3)).unwrap(), None);
    }

    #[test]
    fn interned_atoms_are_distinct() {
        let a = Bare.intern_atom(Atom::WmProtocols).unwrap();
        let b = Bare.intern_atom(Atom::WmDeleteWindow).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn configuring_a_window_updates_its_geometry() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 800, 600));
        let id = conn.add_window(5, Rect::new(0, 0, 10, 10));

        conn.set_client_config(id, &[ClientConfig::Move(Point::new(20, 30))])
            .unwrap();

        assert_eq!(conn.geometry(id), Some(Rect::new(20, 30, 10, 10)));
        assert_eq!(
            conn.calls(),
            vec![Call::Configure(id, vec![ClientConfig::Move(Point::new(20, 30))])]
        );
    }

    #[test]
    fn interaction_events_skip_unrelated_kinds() {
        let conn = ScriptedConn::new(Rect::new(0, 0, 800, 600));
        conn.push_events([XEvent::FocusIn(Xid(4)), XEvent::MapRequest(Xid(7))]);

        assert_eq!(conn.next_interaction_event().unwrap(), XEvent::MapRequest(Xid(7)));
        assert_eq!(conn.pending_events(), 0);
    }
}
