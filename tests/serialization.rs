//! Loading configuration and replaying recorded sessions through serde
#![cfg(feature = "serde")]
use std::collections::HashMap;
use tagwm::{
    core::Config,
    pure::{geometry::Rect, Rule},
    x::{Atom, Prop, XEvent},
    WindowManager, Xid,
};

mod common;

use common::*;

#[test]
fn rules_can_be_loaded_from_json() {
    let raw = r#"[
        {"class": "mpv", "instance": null, "title": null, "tags": 0, "floating": true, "monitor": null},
        {"class": null, "instance": "irc", "title": null, "tags": 4, "floating": false, "monitor": null}
    ]"#;
    let rules: Vec<Rule> = serde_json::from_str(raw).unwrap();

    let conn = single_output();
    conn.add_window(10, Rect::new(0, 0, 100, 100));
    conn.add_window(11, Rect::new(0, 0, 100, 100));
    let class = |instance: &str, class: &str| {
        Prop::UTF8String(vec![instance.to_string(), class.to_string()])
    };
    conn.set_window_prop(Xid::from(10), Atom::WmClass, class("mpv", "mpv"));
    conn.set_window_prop(Xid::from(11), Atom::WmClass, class("irc", "st"));

    let config = Config {
        rules,
        ..Config::default()
    };
    let mut wm = WindowManager::new(config, HashMap::new(), HashMap::new(), conn).unwrap();
    wm.handle_event(XEvent::MapRequest(Xid::from(10))).unwrap();
    wm.handle_event(XEvent::MapRequest(Xid::from(11))).unwrap();

    let cs = &wm.state.client_set;
    assert!(cs.client(Xid::from(10)).unwrap().is_floating());
    assert_eq!(cs.client(Xid::from(11)).unwrap().tags(), 4);
}

#[test]
fn a_recorded_session_replays_to_the_same_state() {
    let events = vec![
        XEvent::MapRequest(Xid::from(10)),
        XEvent::MapRequest(Xid::from(11)),
        XEvent::KeyPress(TAG_MONITOR_CODE),
        XEvent::MapRequest(Xid::from(12)),
        XEvent::KeyPress(VIEW_2_CODE),
    ];
    let recorded = serde_json::to_string(&events).unwrap();

    let run = |events: Vec<XEvent>| {
        let mut wm = wm_with_clients(dual_output(), &[]);
        for id in 10..=12 {
            wm.conn().add_window(id, Rect::new(0, 0, 100, 100));
        }
        for e in events {
            wm.handle_event(e).unwrap();
        }

        let cs = &wm.state.client_set;
        let placement: Vec<_> = cs
            .all_clients()
            .into_iter()
            .map(|id| {
                let c = cs.client(id).unwrap();
                (id, c.monitor(), c.tags(), c.geometry())
            })
            .collect();

        (placement, cs.selected_monitor(), cs.selected_client())
    };

    let replayed: Vec<XEvent> = serde_json::from_str(&recorded).unwrap();

    assert_eq!(run(events), run(replayed));
}
