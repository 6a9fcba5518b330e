//! Core data structures and user facing functionality for the window manager
use crate::{
    builtin::layout::default_layouts,
    pure::{ClientSet, Rule, Settings, Topology},
    x::{
        atom::EWMH_SUPPORTED_ATOMS,
        release_client, scan, Atom, ClientConfig, Prop, XConn, XConnExt,
    },
    Color, Error, Result, Xid,
};
use nix::sys::signal::{signal, SigHandler, Signal};
use std::{fmt, mem};
use tracing::{debug, error, info, trace};

pub mod bindings;
pub(crate) mod handle;
pub mod hooks;
pub mod interaction;
pub mod layout;

use bindings::{Click, KeyBindings, KeyCode, ModMask, MouseBindings, MouseState};
use hooks::{logging_error_handler, ErrorHandler, StatusBar};
use interaction::Interaction;
use layout::Layout;

/// Mutable internal state for the window manager
#[derive(Debug)]
pub struct State<X>
where
    X: XConn,
{
    /// The static configuration the window manager was started with
    pub config: Config<X>,
    /// The clients and monitors currently being managed
    pub client_set: ClientSet,
    pub(crate) root: Xid,
    pub(crate) check_win: Xid,
    pub(crate) running: bool,
    pub(crate) interaction: Interaction,
    pub(crate) motion_mon: Option<usize>,
    pub(crate) status: String,
    pub(crate) numlock: ModMask,
    pub(crate) client_buttons: Vec<MouseState>,
}

impl<X> State<X>
where
    X: XConn,
{
    /// The root window
    pub fn root(&self) -> Xid {
        self.root
    }

    /// The current status text, as set through the `WM_NAME` of the root window
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the main event loop is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The pointer drag that is currently in progress, if any
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Stop the main event loop once the current event has been handled.
    pub fn quit(&mut self) {
        info!("exit requested");
        self.running = false;
    }
}

/// The user specified config options for how the window manager should run
pub struct Config<X>
where
    X: XConn,
{
    /// The border colour of unfocused clients
    pub normal_border: Color,
    /// The border colour of the focused client
    pub focused_border: Color,
    /// The border width of clients in pixels
    pub border_width: i32,
    /// How close in pixels a dragged client needs to be to a monitor edge to snap to it
    pub snap: i32,
    /// Whether bars are shown on new monitors
    pub show_bar: bool,
    /// Whether bars are placed at the top of each monitor
    pub top_bar: bool,
    /// The height of the bar in pixels
    pub bar_height: i32,
    /// The names of each tag
    pub tags: Vec<String>,
    /// Rules applied to newly managed clients
    pub rules: Vec<Rule>,
    /// The layout catalog. The first two entries are the initial layouts of every monitor.
    ///
    /// This is moved into the [ClientSet] when the window manager is created.
    pub layouts: Vec<Layout>,
    /// The initial master fraction
    pub mfact: f32,
    /// The initial number of clients in the master area
    pub nmaster: i32,
    /// Respect size hints for tiled clients
    pub resize_hints: bool,
    /// Prevent moving focus away from a fullscreen client
    pub lock_fullscreen: bool,
    /// An optional status bar
    pub bar: Option<Box<dyn StatusBar<X>>>,
    /// Called with unexpected errors that were raised while handling events
    pub error_handler: Box<dyn ErrorHandler>,
}

impl<X: XConn> fmt::Debug for Config<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("normal_border", &self.normal_border)
            .field("focused_border", &self.focused_border)
            .field("border_width", &self.border_width)
            .field("snap", &self.snap)
            .field("show_bar", &self.show_bar)
            .field("top_bar", &self.top_bar)
            .field("bar_height", &self.bar_height)
            .field("tags", &self.tags)
            .field("rules", &self.rules)
            .field("layouts", &self.layouts)
            .field("mfact", &self.mfact)
            .field("nmaster", &self.nmaster)
            .field("resize_hints", &self.resize_hints)
            .field("lock_fullscreen", &self.lock_fullscreen)
            .field("bar", &self.bar)
            .finish()
    }
}

impl<X: XConn> Default for Config<X> {
    fn default() -> Self {
        Self {
            normal_border: Color::new_from_hex(0x585858ff),
            focused_border: Color::new_from_hex(0x0025ffff),
            border_width: 1,
            snap: 32,
            show_bar: false,
            top_bar: false,
            bar_height: 18,
            tags: (1..=9).map(|n| n.to_string()).collect(),
            rules: vec![
                Rule {
                    class: Some("Gimp".to_string()),
                    floating: true,
                    ..Default::default()
                },
                Rule {
                    class: Some("Firefox".to_string()),
                    tags: 1 << 8,
                    ..Default::default()
                },
            ],
            layouts: default_layouts(),
            mfact: 0.5,
            nmaster: 1,
            resize_hints: true,
            lock_fullscreen: true,
            bar: None,
            error_handler: logging_error_handler(),
        }
    }
}

impl<X: XConn> Config<X> {
    /// The subset of this config consulted by the [ClientSet].
    pub fn settings(&self) -> Settings {
        Settings {
            n_tags: self.tags.len(),
            mfact: self.mfact,
            nmaster: self.nmaster,
            show_bar: self.show_bar,
            top_bar: self.top_bar,
            bar_height: self.bar_height,
            resize_hints: self.resize_hints,
            lock_fullscreen: self.lock_fullscreen,
        }
    }
}

/// A top level struct holding all of the state required to run as an X11 window manager.
///
/// This allows for final configuration to be carried out before entering the main event
/// loop.
#[derive(Debug)]
pub struct WindowManager<X>
where
    X: XConn,
{
    x: X,
    /// The mutable state of the window manager
    pub state: State<X>,
    key_bindings: KeyBindings<X>,
    mouse_bindings: MouseBindings<X>,
}

impl<X> WindowManager<X>
where
    X: XConn,
{
    /// Construct a new [WindowManager] with the provided config and X connection.
    ///
    /// This takes control of the root window, builds the initial monitor list, advertises
    /// EWMH support and grabs the configured key bindings.
    ///
    /// # Errors
    /// Returns [Error::OtherWmRunning] if another window manager already controls the
    /// root window and [Error::InvalidConfig] or [Error::NoScreens] if the initial state
    /// can not be built from the config and the reported screens.
    pub fn new(
        mut config: Config<X>,
        key_bindings: KeyBindings<X>,
        mouse_bindings: MouseBindings<X>,
        x: X,
    ) -> Result<Self> {
        x.select_root_events()?;

        let screen = x.screen_size()?;
        let topology = match x.screen_details()? {
            Some(rects) => Topology::Multi(rects),
            None => Topology::Single,
        };
        let settings = config.settings();
        let layouts = mem::take(&mut config.layouts);
        let client_set = ClientSet::try_new(settings, layouts, screen, topology)?;

        let client_buttons = mouse_bindings
            .keys()
            .filter(|(click, _)| *click == Click::ClientWindow)
            .map(|(_, state)| *state)
            .collect();

        let mut state = State {
            config,
            client_set,
            root: x.root(),
            check_win: Xid(0),
            running: false,
            interaction: Interaction::Idle,
            motion_mon: None,
            status: String::new(),
            numlock: x.numlock_mask()?,
            client_buttons,
        };

        let m = x.window_to_monitor(state.root, &state)?;
        state.client_set.set_selected_monitor(m)?;

        advertise_ewmh_support(&x, &mut state)?;
        for m in 0..state.client_set.monitors().len() {
            x.reposition_bar(m, &mut state)?;
        }
        x.update_status(&mut state)?;

        let mut wm = Self {
            x,
            state,
            key_bindings,
            mouse_bindings,
        };
        wm.grab_keys()?;
        wm.x.focus(None, &mut wm.state)?;

        Ok(wm)
    }

    /// The connection to the display server
    pub fn conn(&self) -> &X {
        &self.x
    }

    /// Mutable access to the state alongside the connection, for running actions
    /// directly.
    pub fn parts_mut(&mut self) -> (&mut State<X>, &X) {
        (&mut self.state, &self.x)
    }

    /// Grab every configured key binding on the root window.
    pub fn grab_keys(&mut self) -> Result<()> {
        self.state.numlock = self.x.numlock_mask()?;
        let keys: Vec<KeyCode> = self.key_bindings.keys().copied().collect();
        debug!(n_keys = keys.len(), "grabbing key bindings");

        self.x.grab_keys(&keys, self.state.numlock)
    }

    /// Adopt any windows that already exist, then run the main event loop until
    /// [State::quit] is called or the connection to the display server is lost.
    ///
    /// On a clean exit every client is released and focus is returned to the root window.
    pub fn run(mut self) -> Result<()> {
        trace!("ignoring SIGCHLD");
        // SAFETY: SIG_IGN installs no handler so nothing runs in signal context
        if let Err(e) = unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) } {
            error!(%e, "unable to set SIGCHLD handler");
            return Err(e.into());
        }

        scan(&self.x, &mut self.state)?;
        self.state.running = true;

        debug!("entering main event loop");
        while self.state.running {
            let res = match self.x.next_event() {
                Ok(event) => handle::dispatch(
                    event,
                    &mut self.state,
                    &self.x,
                    &mut self.key_bindings,
                    &mut self.mouse_bindings,
                ),
                Err(e) => Err(e),
            };

            if let Err(e) = res {
                self.handle_error(e)?;
            }
            self.x.flush();
        }

        self.cleanup()
    }

    /// Process a single event outside of [WindowManager::run], as a headless driver or a
    /// test would.
    pub fn handle_event(&mut self, event: crate::x::XEvent) -> Result<()> {
        let res = handle::dispatch(
            event,
            &mut self.state,
            &self.x,
            &mut self.key_bindings,
            &mut self.mouse_bindings,
        );

        match res {
            Err(e) => self.handle_error(e),
            Ok(()) => {
                self.x.flush();
                Ok(())
            }
        }
    }

    fn handle_error(&mut self, e: Error) -> Result<()> {
        handle_error(e, &mut self.state)
    }

    /// Show every client on every tag, release them all and give focus back to the root
    /// window.
    pub fn cleanup(&mut self) -> Result<()> {
        debug!("releasing clients");
        let x = &self.x;
        let state = &mut self.state;

        for m in 0..state.client_set.monitors().len() {
            state.client_set.set_selected_monitor(m)?;
            state.client_set.view(!0);
            for (id, p) in state.client_set.show_hide(m) {
                x.set_client_config(id, &[ClientConfig::Move(p)])?;
            }
            x.flush_pending(state)?;

            let ids: Vec<Xid> = state.client_set.iter_stack(m).map(|c| c.id()).collect();
            for id in ids {
                release_client(x, id, false, state)?;
            }
        }

        x.grab_keys(&[], state.numlock)?;
        x.destroy_window(state.check_win)?;
        x.set_input_focus(state.root)?;
        x.delete_prop(state.root, Atom::NetActiveWindow)?;
        x.flush();

        Ok(())
    }
}

fn advertise_ewmh_support<X: XConn>(x: &X, state: &mut State<X>) -> Result<()> {
    let check = x.create_check_window()?;
    state.check_win = check;
    let name = vec![env!("CARGO_PKG_NAME").to_string()];
    let supported = EWMH_SUPPORTED_ATOMS
        .iter()
        .map(|a| a.as_ref().to_string())
        .collect();

    x.set_prop(check, Atom::NetSupportingWmCheck, Prop::Window(vec![check]))?;
    x.set_prop(check, Atom::NetWmName, Prop::UTF8String(name))?;
    x.set_prop(state.root, Atom::NetSupportingWmCheck, Prop::Window(vec![check]))?;
    x.set_prop(state.root, Atom::NetSupported, Prop::Atom(supported))?;
    x.delete_prop(state.root, Atom::NetClientList)?;

    Ok(())
}

/// Pass fatal errors back to the caller. Anything else is logged, and errors that are
/// not an expected consequence of a window going away reach the configured
/// [ErrorHandler].
pub(crate) fn handle_error<X: XConn>(e: Error, state: &mut State<X>) -> Result<()> {
    if e.is_fatal() {
        error!(%e, "fatal error");
        return Err(e);
    }

    if e.is_tolerated() {
        trace!(%e, "ignoring expected protocol error");
    } else {
        error!(%e, "error handling event");
        state.config.error_handler.handle(&e);
    }

    Ok(())
}

