#![allow(dead_code)]
use std::collections::HashMap;
use tagwm::{
    builtin::actions::{self, mouse::default_mouse_bindings},
    core::{
        bindings::{KeyBindings, KeyCode, ModMask, MouseButton, MouseEvent, MouseState},
        Config, WindowManager,
    },
    pure::{geometry::Point, geometry::Rect, Direction},
    x::{event::MotionEvent, mock::ScriptedConn, XEvent},
    Xid,
};
use tracing_subscriber::EnvFilter;

pub const SCREEN_WIDTH: i32 = 1000;
pub const SCREEN_HEIGHT: i32 = 800;
pub const QUIT_CODE: KeyCode = KeyCode {
    mask: ModMask::MOD4,
    code: 24,
};
pub const TAG_MONITOR_CODE: KeyCode = KeyCode {
    mask: ModMask::MOD4,
    code: 25,
};
pub const VIEW_2_CODE: KeyCode = KeyCode {
    mask: ModMask::MOD4,
    code: 26,
};

pub fn output(n: i32) -> Rect {
    Rect::new(n * SCREEN_WIDTH, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
}

pub fn single_output() -> ScriptedConn {
    ScriptedConn::new(output(0))
}

pub fn dual_output() -> ScriptedConn {
    ScriptedConn::new(Rect::new(0, 0, 2 * SCREEN_WIDTH, SCREEN_HEIGHT))
        .with_outputs(vec![output(0), output(1)])
}

pub fn key_bindings() -> KeyBindings<ScriptedConn> {
    let mut bindings: KeyBindings<ScriptedConn> = HashMap::new();
    bindings.insert(QUIT_CODE, actions::quit());
    bindings.insert(TAG_MONITOR_CODE, actions::tag_monitor(Direction::Forward));
    bindings.insert(VIEW_2_CODE, actions::view(1 << 1));

    bindings
}

/// Log to the test output, filtered by `RUST_LOG`
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A window manager with the stock mouse bindings and the given windows mapped
pub fn wm_with_clients(conn: ScriptedConn, ids: &[u32]) -> WindowManager<ScriptedConn> {
    init_logging();
    for &id in ids {
        conn.add_window(id, Rect::new(10, 10, 200, 100));
    }

    let mut wm = WindowManager::new(
        Config::default(),
        key_bindings(),
        default_mouse_bindings(ModMask::MOD4),
        conn,
    )
    .unwrap();

    for &id in ids {
        wm.handle_event(XEvent::MapRequest(Xid::from(id))).unwrap();
    }

    wm
}

pub fn press(id: Xid, button: MouseButton, abs: Point) -> XEvent {
    XEvent::ButtonPress(mouse_event(id, button, abs))
}

pub fn release(id: Xid, button: MouseButton, abs: Point) -> XEvent {
    XEvent::ButtonRelease(mouse_event(id, button, abs))
}

pub fn motion(id: Xid, abs: Point, time: u32) -> XEvent {
    XEvent::MotionNotify(MotionEvent { id, abs, time })
}

fn mouse_event(id: Xid, button: MouseButton, abs: Point) -> MouseEvent {
    MouseEvent {
        id,
        abs,
        rel: abs,
        state: MouseState::new(button, ModMask::MOD4),
        time: 0,
    }
}
