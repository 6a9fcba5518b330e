//! Pre-defined actions for use in user defined mouse bindings.
use crate::{
    builtin::actions::{apply_layout, modify_selected, toggle_floating_selected, zoom_selected},
    core::{
        bindings::{
            ButtonClick, Click, ModMask, MouseBindings, MouseButton, MouseEventHandler, MouseState,
        },
        interaction, State,
    },
    x::XConn,
    Result,
};
use std::collections::HashMap;

/// Construct a [MouseEventHandler] from a closure or free function
pub fn mouse_handler<F, X>(f: F) -> Box<dyn MouseEventHandler<X>>
where
    F: FnMut(&ButtonClick, &mut State<X>, &X) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Move the selected client with the mouse until the button is released
pub fn move_mouse<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    mouse_handler(|_: &ButtonClick, s: &mut State<X>, x: &X| interaction::move_mouse(s, x))
}

/// Resize the selected client with the mouse until the button is released
pub fn resize_mouse<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    mouse_handler(|_: &ButtonClick, s: &mut State<X>, x: &X| interaction::resize_mouse(s, x))
}

/// Toggle whether the clicked client floats
pub fn toggle_floating<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    mouse_handler(|_: &ButtonClick, s: &mut State<X>, x: &X| toggle_floating_selected(s, x))
}

/// Move the selected client to the master position
pub fn zoom<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    mouse_handler(|_: &ButtonClick, s: &mut State<X>, x: &X| zoom_selected(s, x))
}

/// Set the layout of the selected monitor, or swap to the previous layout with `None`
pub fn set_layout<X: XConn>(layout: Option<usize>) -> Box<dyn MouseEventHandler<X>> {
    mouse_handler(move |_: &ButtonClick, s: &mut State<X>, x: &X| apply_layout(layout, s, x))
}

// The tag mask of the clicked bar label, if the click landed on one.
fn tag_action<F, X>(f: F) -> Box<dyn MouseEventHandler<X>>
where
    F: Fn(u32, &mut State<X>, &X) -> Result<()> + 'static,
    X: XConn,
{
    mouse_handler(move |click: &ButtonClick, s: &mut State<X>, x: &X| match click.tag {
        Some(mask) => f(mask, s, x),
        None => Ok(()),
    })
}

/// View the clicked tag
pub fn view<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    tag_action(|mask, s: &mut State<X>, x: &X| modify_selected(|cs| cs.view(mask), s, x))
}

/// Toggle whether the clicked tag is in view
pub fn toggle_view<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    tag_action(|mask, s: &mut State<X>, x: &X| modify_selected(|cs| cs.toggle_view(mask), s, x))
}

/// Move the selected client to the clicked tag
pub fn tag<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    tag_action(|mask, s: &mut State<X>, x: &X| modify_selected(|cs| cs.tag_selected(mask), s, x))
}

/// Toggle the clicked tag on the selected client
pub fn toggle_tag<X: XConn>() -> Box<dyn MouseEventHandler<X>> {
    tag_action(|mask, s: &mut State<X>, x: &X| {
        modify_selected(|cs| cs.toggle_tag_selected(mask), s, x)
    })
}

/// The stock set of mouse bindings, using `modifier` for actions on client windows.
///
/// | Region          | Button             | Action              |
/// |-----------------|--------------------|---------------------|
/// | layout symbol   | left               | previous layout     |
/// | layout symbol   | right              | monocle             |
/// | window title    | middle             | zoom                |
/// | client window   | modifier + left    | move                |
/// | client window   | modifier + middle  | toggle floating     |
/// | client window   | modifier + right   | resize              |
/// | tag label       | left               | view                |
/// | tag label       | right              | toggle view         |
/// | tag label       | modifier + left    | tag                 |
/// | tag label       | modifier + right   | toggle tag          |
///
/// The layout indices assume the catalog from
/// [default_layouts](crate::builtin::layout::default_layouts).
pub fn default_mouse_bindings<X: XConn>(modifier: ModMask) -> MouseBindings<X> {
    let none = ModMask::empty();
    let bindings: Vec<(Click, MouseButton, ModMask, Box<dyn MouseEventHandler<X>>)> = vec![
        (Click::LayoutSymbol, MouseButton::Left, none, set_layout(None)),
        (Click::LayoutSymbol, MouseButton::Right, none, set_layout(Some(3))),
        (Click::WindowTitle, MouseButton::Middle, none, zoom()),
        (Click::ClientWindow, MouseButton::Left, modifier, move_mouse()),
        (Click::ClientWindow, MouseButton::Middle, modifier, toggle_floating()),
        (Click::ClientWindow, MouseButton::Right, modifier, resize_mouse()),
        (Click::TagBar, MouseButton::Left, none, view()),
        (Click::TagBar, MouseButton::Right, none, toggle_view()),
        (Click::TagBar, MouseButton::Left, modifier, tag()),
        (Click::TagBar, MouseButton::Right, modifier, toggle_tag()),
    ];

    let mut map: MouseBindings<X> = HashMap::new();
    for (click, button, mods, action) in bindings {
        map.insert((click, MouseState::new(button, mods)), action);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{bindings::MouseEvent, Config, WindowManager},
        pure::geometry::{Point, Rect},
        x::{mock::ScriptedConn, XEvent},
        Xid,
    };

    fn button_click(click: Click, tag: Option<u32>) -> ButtonClick {
        ButtonClick {
            click,
            tag,
            client: None,
            event: MouseEvent {
                id: Xid(1),
                abs: Point::new(0, 0),
                rel: Point::new(0, 0),
                state: MouseState::new(MouseButton::Left, ModMask::empty()),
                time: 0,
            },
        }
    }

    fn wm() -> WindowManager<ScriptedConn> {
        let conn = ScriptedConn::new(Rect::new(0, 0, 1000, 800));
        conn.add_window(10, Rect::new(10, 10, 200, 100));
        let mut wm = WindowManager::new(
            Config::default(),
            HashMap::new(),
            default_mouse_bindings(ModMask::MOD4),
            conn,
        )
        .unwrap();
        wm.handle_event(XEvent::MapRequest(Xid(10))).unwrap();

        wm
    }

    #[test]
    fn default_bindings_cover_every_region_with_a_handler() {
        let bindings = default_mouse_bindings::<ScriptedConn>(ModMask::MOD4);

        assert_eq!(bindings.len(), 10);
        assert!(bindings.contains_key(&(
            Click::ClientWindow,
            MouseState::new(MouseButton::Left, ModMask::MOD4)
        )));
    }

    #[test]
    fn client_window_buttons_are_recorded_for_grabbing() {
        let wm = wm();
        let mut buttons = wm.state.client_buttons.clone();
        buttons.sort_by_key(|s| u8::from(s.button));

        assert_eq!(
            buttons,
            vec![
                MouseState::new(MouseButton::Left, ModMask::MOD4),
                MouseState::new(MouseButton::Middle, ModMask::MOD4),
                MouseState::new(MouseButton::Right, ModMask::MOD4),
            ]
        );
    }

    #[test]
    fn tag_actions_ignore_clicks_without_a_tag() {
        let mut wm = wm();
        let (state, x) = wm.parts_mut();
        let mut action = view::<ScriptedConn>();

        action
            .on_click(&button_click(Click::TagBar, None), state, x)
            .unwrap();

        assert_eq!(state.client_set.selmon().tags(), 1);
    }

    #[test]
    fn view_uses_the_clicked_tag() {
        let mut wm = wm();
        let (state, x) = wm.parts_mut();
        let mut action = view::<ScriptedConn>();

        action
            .on_click(&button_click(Click::TagBar, Some(1 << 2)), state, x)
            .unwrap();

        assert_eq!(state.client_set.selmon().tags(), 1 << 2);
    }

    #[test]
    fn toggle_floating_from_the_mouse() {
        let mut wm = wm();
        let press = MouseEvent {
            id: Xid(10),
            abs: Point::new(50, 50),
            rel: Point::new(40, 40),
            state: MouseState::new(MouseButton::Middle, ModMask::MOD4),
            time: 0,
        };

        wm.handle_event(XEvent::ButtonPress(press)).unwrap();

        assert!(wm.state.client_set.client(Xid(10)).unwrap().is_floating());
    }
}
