//! End-to-end scenarios driven through the mock transport.
use lath::{
    cmd::{self, Outcome},
    pure::{client::ClientState, geometry::Rect, model::Config},
    x::{mock::MockCall, ClientAttr, ClientMessage, OutputInfo, XEvent},
    Xid,
};

mod common;
use common::{dual_wm, manage, manage_with_class, wm};

fn exec(w: &mut lath::core::Wm<lath::x::mock::MockXConn>, line: &str) -> String {
    match cmd::execute(w, line) {
        Outcome::Reply(r) => r,
        other => panic!("expected a plain reply, got {:?}", other),
    }
}

#[test]
fn two_tiled_clients_split_the_screen() {
    let mut cfg = Config::default();
    cfg.ws_def.msplit = 0.5;
    let mut w = wm(cfg);

    let a = manage(&mut w, 100, Rect::new(10, 10, 800, 600));
    let b = manage(&mut w, 101, Rect::new(20, 20, 800, 600));

    let ca = w.model.client(a).expect("first client managed");
    let cb = w.model.client(b).expect("second client managed");
    assert_eq!(ca.geom, Rect::new(0, 0, 958, 1078));
    assert_eq!(cb.geom, Rect::new(960, 0, 958, 1078));
    assert_eq!((ca.bw, cb.bw), (1, 1));
    w.model.check_invariants();
}

#[test]
fn matching_rule_places_and_floats_without_stealing_focus() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 4"), "");
    assert_eq!(exec(&mut w, r#"rule class "^gimp$" ws 3 float true"#), "");

    let plain = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    let gimp = manage_with_class(&mut w, 101, Rect::new(5, 5, 640, 480), "gimp");

    let c = w.model.client(gimp).expect("rule client managed");
    assert_eq!(c.ws, 2, "rule sends the client to the named workspace");
    assert!(c.state.contains(ClientState::FLOATING));
    assert_eq!(w.model.sel_ws, 0, "selected workspace is unchanged");
    assert_eq!(w.model.cur_client(), Some(plain));
    w.model.check_invariants();
}

#[test]
fn fullscreen_round_trips_geometry_and_border() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    assert_eq!(exec(&mut w, "win float true"), "");
    {
        let c = w.model.client_mut(id).unwrap();
        c.geom = Rect::new(100, 100, 400, 300);
        c.bw = 1;
    }

    w.set_fullscreen(id, true);
    {
        let c = w.model.client(id).unwrap();
        assert_eq!(c.geom, Rect::new(0, 0, 1920, 1080));
        assert_eq!(c.bw, 0);
        assert!(c.state.contains(ClientState::FULLSCREEN));
        assert!(c.state.contains(ClientState::FLOATING));
        assert!(c.state.contains(ClientState::NOBORDER));
    }
    // The border/state invariant holds while the client is fullscreen too.
    w.model.check_invariants();

    w.set_fullscreen(id, false);
    let c = w.model.client(id).unwrap();
    assert_eq!(c.geom, Rect::new(100, 100, 400, 300));
    assert_eq!(c.bw, 1);
    assert!(!c.state.contains(ClientState::FULLSCREEN));
    assert!(!c.state.contains(ClientState::NOBORDER));
    w.model.check_invariants();
}

#[test]
fn monitor_unplug_reassigns_workspaces_and_rescales_floaters() {
    let mut w = dual_wm(Config::default());
    w.model.update_workspaces(4).expect("four workspaces");
    assert_eq!(w.model.ws(1).mon, 1);
    assert_eq!(w.model.ws(3).mon, 1);

    // A floating client sitting at the second monitor's origin.
    let id = manage(&mut w, 100, Rect::new(0, 0, 640, 480));
    w.model.set_workspace(id, 1, false);
    w.model.client_mut(id).unwrap().state |= ClientState::FLOATING;
    w.model.client_mut(id).unwrap().geom = Rect::new(1920, 0, 640, 480);

    w.x.set_outputs(vec![OutputInfo {
        id: 1,
        name: "MOCK-1".to_string(),
        r: Rect::new(0, 0, 1920, 1080),
        primary: true,
    }]);
    w.handle_randr_change();

    assert!(!w.model.monitors[1].connected, "unplugged monitor retained");
    assert_eq!(w.model.ws(1).mon, 0);
    assert_eq!(w.model.ws(3).mon, 0);
    let c = w.model.client(id).unwrap();
    assert_eq!((c.geom.x, c.geom.y), (0, 0), "origin client lands on the new origin");
    assert_eq!((c.geom.w, c.geom.h), (640, 480));
    w.model.check_invariants();
}

#[test]
fn bad_set_value_replies_with_error_and_mutates_nothing() {
    let mut w = wm(Config::default());
    let before = w.model.cur_ws().gap;

    let reply = exec(&mut w, "set gap abc");

    assert_eq!(
        reply,
        "!invalid value for gap: abc\n\nexpected integer e.g. 10"
    );
    assert_eq!(w.model.cur_ws().gap, before);
}

#[test]
fn activate_message_sets_urgency_when_focus_urgent_is_off() {
    let mut cfg = Config::default();
    cfg.focus_urgent = false;
    let mut w = wm(cfg);
    assert_eq!(exec(&mut w, "set numws 2"), "");

    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    w.model.set_workspace(id, 1, false);
    w.refresh();
    assert_eq!(w.model.sel_ws, 0);
    w.x.clear_calls();

    w.handle_event(XEvent::ClientMessage(ClientMessage {
        id,
        dtype: "_NET_ACTIVE_WINDOW".to_string(),
        data: [0; 5],
    }));

    let c = w.model.client(id).unwrap();
    assert!(c.state.contains(ClientState::URGENT));
    assert_eq!(w.model.sel_ws, 0, "no focus change");
    // The border was repainted in the urgent color.
    let urgent = w.model.cfg.border.urgent.argb_u32();
    assert!(w
        .x
        .calls()
        .iter()
        .any(|c| *c == MockCall::Attrs(id, vec![ClientAttr::BorderColor(urgent)])));
}

#[test]
fn activate_message_focuses_when_focus_urgent_is_on() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 2"), "");

    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    w.model.set_workspace(id, 1, false);
    w.refresh();
    assert_eq!(w.model.sel_ws, 0);

    w.handle_event(XEvent::ClientMessage(ClientMessage {
        id,
        dtype: "_NET_ACTIVE_WINDOW".to_string(),
        data: [0; 5],
    }));

    assert_eq!(w.model.sel_ws, 1, "view switched to the client's workspace");
    assert_eq!(w.model.cur_client(), Some(id));
    assert!(!w.model.client(id).unwrap().state.contains(ClientState::URGENT));
}

#[test]
fn float_toggle_twice_restores_geometry_and_state() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    manage(&mut w, 101, Rect::new(0, 0, 800, 600));

    let (geom, bw, state) = {
        let c = w.model.client(id).unwrap();
        (c.geom, c.bw, c.state)
    };

    assert_eq!(exec(&mut w, &format!("win {} float", id)), "");
    w.refresh();
    assert_eq!(exec(&mut w, &format!("win {} float", id)), "");
    w.refresh();

    let c = w.model.client(id).unwrap();
    assert_eq!(c.geom, geom);
    assert_eq!(c.bw, bw);
    assert_eq!(c.state, state);
    w.model.check_invariants();
}

#[test]
fn workspace_move_updates_net_wm_desktop() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 3"), "");
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));

    w.set_client_workspace(id, 2, false);

    assert_eq!(w.model.client(id).unwrap().ws, 2);
    let desk = w.x.calls().into_iter().rev().find_map(|c| match c {
        MockCall::SetProp(win, name, lath::x::Prop::Cardinal(v))
            if win == id && name == "_NET_WM_DESKTOP" =>
        {
            Some(v)
        }
        _ => None,
    });
    assert_eq!(desk, Some(vec![2]));
    w.model.check_invariants();
}

#[test]
fn net_client_list_matches_model() {
    let mut w = wm(Config::default());
    let a = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    let b = manage(&mut w, 101, Rect::new(0, 0, 800, 600));

    let list = w.x.calls().into_iter().rev().find_map(|c| match c {
        MockCall::SetProp(_, name, lath::x::Prop::Window(ids))
            if name == "_NET_CLIENT_LIST" =>
        {
            Some(ids)
        }
        _ => None,
    });

    let list = list.expect("client list was advertised");
    assert!(list.contains(&a) && list.contains(&b));
    assert_eq!(list.len(), w.model.net_client_list().len());
}

#[test]
fn kill_unmanaged_client_forcefully() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    w.x.clear_calls();

    // The mock advertises no WM_DELETE_WINDOW support, so the kill is
    // forced.
    w.kill_client(id);

    assert!(w.x.calls().contains(&MockCall::Kill(id)));
}

#[test]
fn unmanage_restores_border_and_withdraws() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    w.x.clear_calls();

    w.unmanage(id, false);

    assert!(w.model.client(id).is_none());
    let calls = w.x.calls();
    assert!(calls
        .iter()
        .any(|c| *c == MockCall::SetWmState(id, lath::x::WmState::Withdrawn)));
    w.model.check_invariants();
}

#[test]
fn scratch_push_and_pop_round_trip() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));

    assert_eq!(exec(&mut w, "win scratch push"), "");
    {
        let c = w.model.client(id).unwrap();
        assert!(c.state.contains(ClientState::SCRATCH));
        assert_eq!(c.ws, lath::pure::SCRATCH_WS);
        assert!(w.model.scratch.contains(id));
    }

    assert_eq!(exec(&mut w, "win scratch pop"), "");
    let c = w.model.client(id).unwrap();
    assert!(!c.state.contains(ClientState::SCRATCH));
    assert_eq!(c.ws, 0);
    w.model.check_invariants();
}

#[test]
fn enter_notify_focuses_with_focus_mouse() {
    let mut w = wm(Config::default());
    let a = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    let b = manage(&mut w, 101, Rect::new(0, 0, 800, 600));
    w.focus(Some(a));
    assert_eq!(w.model.cur_client(), Some(a));

    w.handle_event(XEvent::Enter(lath::x::PointerChange {
        id: b,
        abs: lath::pure::Point::new(1000, 500),
    }));

    assert_eq!(w.model.cur_client(), Some(b));
}

#[test]
fn last_workspace_on_monitor_cannot_move() {
    let mut w = dual_wm(Config::default());
    // Two monitors, two workspaces: each monitor has exactly one.
    assert!(matches!(
        w.model.assign_workspace(0, 1),
        Err(lath::Error::LastWorkspaceOnMonitor { .. })
    ));
}
