//! tagwm :: a headless session
//!
//! Runs the window manager against a scripted connection: a handful of windows are
//! mapped, shuffled between tags and layouts using dwm style key bindings, and then the
//! session is ended. Set `RUST_LOG` to control the log output, e.g. `RUST_LOG=tagwm=debug`.
use std::collections::HashMap;
use tagwm::{
    builtin::actions::{
        focus_monitor, focus_stack, inc_nmaster, kill_client, mouse::default_mouse_bindings,
        quit, set_layout, set_mfact, spawn, tag, tag_monitor, toggle_bar, toggle_floating,
        toggle_tag, toggle_view, view, zoom,
    },
    core::{
        bindings::{KeyBindings, KeyCode, ModMask},
        Config, WindowManager,
    },
    pure::{geometry::Rect, Direction},
    x::{mock::ScriptedConn, XEvent},
    Result, Xid,
};
use tracing_subscriber::{self, prelude::*, EnvFilter};

const MODKEY: ModMask = ModMask::MOD4;

fn key(mask: ModMask, code: u8) -> KeyCode {
    KeyCode::new(mask, code)
}

fn key_bindings() -> KeyBindings<ScriptedConn> {
    let shift = MODKEY | ModMask::SHIFT;
    let mut bindings: KeyBindings<ScriptedConn> = HashMap::new();

    bindings.insert(key(shift, 36), spawn("st"));
    bindings.insert(key(MODKEY, 56), toggle_bar());
    bindings.insert(key(MODKEY, 44), focus_stack(Direction::Forward));
    bindings.insert(key(MODKEY, 45), focus_stack(Direction::Backward));
    bindings.insert(key(MODKEY, 31), inc_nmaster(1));
    bindings.insert(key(MODKEY, 40), inc_nmaster(-1));
    bindings.insert(key(MODKEY, 43), set_mfact(-0.05));
    bindings.insert(key(MODKEY, 46), set_mfact(0.05));
    bindings.insert(key(MODKEY, 36), zoom());
    bindings.insert(key(MODKEY, 23), view(0));
    bindings.insert(key(shift, 54), kill_client());
    bindings.insert(key(MODKEY, 27), set_layout(Some(0)));
    bindings.insert(key(MODKEY, 28), set_layout(Some(1)));
    bindings.insert(key(MODKEY, 41), set_layout(Some(2)));
    bindings.insert(key(MODKEY, 58), set_layout(Some(3)));
    bindings.insert(key(MODKEY, 65), set_layout(None));
    bindings.insert(key(shift, 65), toggle_floating());
    bindings.insert(key(MODKEY, 19), view(!0));
    bindings.insert(key(shift, 19), tag(!0));
    bindings.insert(key(MODKEY, 59), focus_monitor(Direction::Backward));
    bindings.insert(key(MODKEY, 60), focus_monitor(Direction::Forward));
    bindings.insert(key(shift, 59), tag_monitor(Direction::Backward));
    bindings.insert(key(shift, 60), tag_monitor(Direction::Forward));
    bindings.insert(key(shift, 24), quit());

    // keycodes 10..=18 are the number row
    for n in 0..9u8 {
        let mask = 1 << n;
        bindings.insert(key(MODKEY, 10 + n), view(mask));
        bindings.insert(key(MODKEY | ModMask::CONTROL, 10 + n), toggle_view(mask));
        bindings.insert(key(shift, 10 + n), tag(mask));
        bindings.insert(key(shift | ModMask::CONTROL, 10 + n), toggle_tag(mask));
    }

    bindings
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let conn = ScriptedConn::new(Rect::new(0, 0, 3840, 1080)).with_outputs(vec![
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 0, 1920, 1080),
    ]);

    let ids: Vec<Xid> = (0..4)
        .map(|n| conn.add_window(100 + n, Rect::new(0, 0, 640, 480)))
        .collect();
    conn.push_events(ids.iter().map(|&id| XEvent::MapRequest(id)));

    let shift = MODKEY | ModMask::SHIFT;
    conn.push_events(
        [
            key(MODKEY, 28),
            key(MODKEY, 46),
            key(MODKEY, 36),
            key(shift, 11),
            key(MODKEY, 11),
            key(shift, 60),
            key(MODKEY, 58),
            key(MODKEY, 56),
            key(shift, 24),
        ]
        .map(XEvent::KeyPress),
    );

    let wm = WindowManager::new(
        Config::default(),
        key_bindings(),
        default_mouse_bindings(MODKEY),
        conn,
    )?;

    wm.run()
}
