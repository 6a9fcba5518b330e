//! Pre-defined actions for use in user defined key bindings.
//!
//! Each action returns a boxed [KeyEventHandler] so that it can be dropped straight into
//! a [KeyBindings](crate::core::bindings::KeyBindings) map:
//!
//! ```no_run
//! # use tagwm::{builtin::actions::*, core::bindings::*, x::mock::ScriptedConn};
//! # use std::collections::HashMap;
//! let mut keys: KeyBindings<ScriptedConn> = HashMap::new();
//! keys.insert(KeyCode::new(ModMask::MOD4, 36), spawn("st"));
//! keys.insert(KeyCode::new(ModMask::MOD4, 43), set_mfact(-0.05));
//! keys.insert(KeyCode::new(ModMask::MOD4 | ModMask::SHIFT, 24), quit());
//! ```
use crate::{
    core::{bindings::KeyEventHandler, State},
    pure::{ClientSet, Direction},
    util,
    x::{XConn, XConnExt},
    Result,
};
use tracing::{debug, error};

pub mod mouse;

/// Construct a [KeyEventHandler] from a closure or free function
pub fn key_handler<F, X>(f: F) -> Box<dyn KeyEventHandler<X>>
where
    F: FnMut(&mut State<X>, &X) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Apply a change to the selected monitor, refocusing and rearranging it if anything
/// changed.
pub(crate) fn modify_selected<F, X>(f: F, state: &mut State<X>, x: &X) -> Result<()>
where
    F: FnOnce(&mut ClientSet) -> bool,
    X: XConn,
{
    if f(&mut state.client_set) {
        let m = state.client_set.selected_monitor();
        x.focus(None, state)?;
        x.arrange(Some(m), state)?;
    }

    Ok(())
}

/// Rearrange the selected monitor
pub(crate) fn arrange_selected<X: XConn>(state: &mut State<X>, x: &X) -> Result<()> {
    let m = state.client_set.selected_monitor();
    x.arrange(Some(m), state)
}

/// Spawn an external program as part of a key binding.
///
/// Failures to launch the program are logged and otherwise ignored.
pub fn spawn<X>(program: &'static str) -> Box<dyn KeyEventHandler<X>>
where
    X: XConn,
{
    key_handler(move |_, _| {
        if let Err(e) = util::spawn(program) {
            error!(%e, program, "unable to spawn program");
        }

        Ok(())
    })
}

/// View the given tags on the selected monitor. An empty mask swaps back to the
/// previously viewed tags.
pub fn view<X: XConn>(mask: u32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| modify_selected(|cs| cs.view(mask), s, x))
}

/// Toggle whether the given tags are in view on the selected monitor
pub fn toggle_view<X: XConn>(mask: u32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| modify_selected(|cs| cs.toggle_view(mask), s, x))
}

/// Move the selected client to the given tags
pub fn tag<X: XConn>(mask: u32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| modify_selected(|cs| cs.tag_selected(mask), s, x))
}

/// Toggle the given tags on the selected client
pub fn toggle_tag<X: XConn>(mask: u32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        modify_selected(|cs| cs.toggle_tag_selected(mask), s, x)
    })
}

/// Move focus to the next or previous visible client on the selected monitor
pub fn focus_stack<X: XConn>(dir: Direction) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        if let Some(id) = s.client_set.focus_stack_target(dir) {
            x.focus(Some(id), s)?;
            x.restack(s.client_set.selected_monitor(), s)?;
        }

        Ok(())
    })
}

/// Move focus to the next or previous monitor
pub fn focus_monitor<X: XConn>(dir: Direction) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        if s.client_set.monitors().len() < 2 {
            return Ok(());
        }

        let m = s.client_set.dir_to_monitor(dir);
        if m == s.client_set.selected_monitor() {
            return Ok(());
        }

        if let Some(id) = s.client_set.selected_client() {
            x.unfocus(id, false, s)?;
        }
        debug!(m, "focusing monitor");
        s.client_set.set_selected_monitor(m)?;
        x.focus(None, s)
    })
}

/// Send the selected client to the next or previous monitor
pub fn tag_monitor<X: XConn>(dir: Direction) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        if s.client_set.monitors().len() < 2 {
            return Ok(());
        }

        match s.client_set.selected_client() {
            Some(id) => {
                let m = s.client_set.dir_to_monitor(dir);
                x.send_to_monitor(id, m, s)
            }
            None => Ok(()),
        }
    })
}

/// Set the layout of the selected monitor to the given index into the layout catalog,
/// or swap to the previous layout with `None`.
pub fn set_layout<X: XConn>(layout: Option<usize>) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| apply_layout(layout, s, x))
}

pub(crate) fn apply_layout<X: XConn>(layout: Option<usize>, s: &mut State<X>, x: &X) -> Result<()> {
    s.client_set.set_layout(layout);
    let m = s.client_set.selected_monitor();

    if s.client_set.selected_client().is_some() {
        x.arrange(Some(m), s)
    } else {
        x.redraw_bar(m, s)
    }
}

/// Adjust the master fraction of the selected monitor.
///
/// Values below 1.0 are relative to the current fraction, larger values set it to
/// `f - 1.0`.
pub fn set_mfact<X: XConn>(f: f32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        if s.client_set.set_mfact(f) {
            arrange_selected(s, x)?;
        }

        Ok(())
    })
}

/// Change the number of clients in the master area of the selected monitor
pub fn inc_nmaster<X: XConn>(n: i32) -> Box<dyn KeyEventHandler<X>> {
    key_handler(move |s: &mut State<X>, x: &X| {
        s.client_set.inc_nmaster(n);
        arrange_selected(s, x)
    })
}

/// Move the selected client to the master position, or swap the master with the next
/// tiled client if it is already selected.
pub fn zoom<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| zoom_selected(s, x))
}

pub(crate) fn zoom_selected<X: XConn>(s: &mut State<X>, x: &X) -> Result<()> {
    if let Some(id) = s.client_set.zoom_target() {
        s.client_set.pop(id);
        x.focus(Some(id), s)?;
        arrange_selected(s, x)?;
    }

    Ok(())
}

/// Toggle whether the selected client floats
pub fn toggle_floating<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| toggle_floating_selected(s, x))
}

pub(crate) fn toggle_floating_selected<X: XConn>(s: &mut State<X>, x: &X) -> Result<()> {
    if s.client_set.toggle_floating() {
        arrange_selected(s, x)?;
    }

    Ok(())
}

/// Show or hide the bar on the selected monitor
pub fn toggle_bar<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| {
        s.client_set.toggle_bar();
        let m = s.client_set.selected_monitor();
        x.reposition_bar(m, s)?;
        x.arrange(Some(m), s)
    })
}

/// Politely ask the selected client to close, killing it if it does not support
/// `WM_DELETE_WINDOW`.
pub fn kill_client<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| match s.client_set.selected_client() {
        Some(id) => x.kill_client(id),
        None => Ok(()),
    })
}

/// Exit the main event loop, releasing all clients
pub fn quit<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, _: &X| {
        s.quit();
        Ok(())
    })
}
