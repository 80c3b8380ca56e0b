//! Structural invariants of the pure data model.
use lath::{
    pure::{
        client::{Client, ClientState},
        geometry::Rect,
        model::{Config, Model, MAX_WORKSPACES, SCRATCH_WS},
        monitor::Monitor,
    },
    Xid,
};
use simple_test_case::test_case;

fn model(mons: usize, ws: usize) -> Model {
    let mut m = Model::new(Config::default());
    for i in 0..mons {
        m.monitors.push(Monitor::new(
            i as u32 + 1,
            format!("MON-{}", i),
            i,
            Rect::new(1920 * i as i32, 0, 1920, 1080),
            0,
        ));
    }
    m.update_workspaces(ws).expect("workspaces");

    m
}

fn add(m: &mut Model, id: u32, ws: usize) -> Xid {
    let id = Xid::from(id);
    let mut c = Client::new(id, Rect::new(0, 0, 640, 480), 1);
    c.ws = ws;
    m.add_client(c);
    m.attach(id, false);
    m.attach_stack(id);

    id
}

#[test_case(1, 1, 4; "single monitor")]
#[test_case(2, 4, 6; "dual monitor")]
#[test]
fn membership_invariants_hold_after_moves(mons: usize, ws_count: usize, clients: u32) {
    let mut m = model(mons, ws_count);
    for i in 0..clients {
        add(&mut m, 100 + i, (i as usize) % ws_count);
    }

    // Shuffle everything onto different workspaces and verify both lists
    // stay consistent.
    for i in 0..clients {
        let id = Xid::from(100 + i);
        m.set_workspace(id, ((i as usize) + 1) % ws_count, i % 2 == 0);
    }

    m.check_invariants();
    for i in 0..clients {
        let id = Xid::from(100 + i);
        let ws = m.client(id).unwrap().ws;
        let on_lists = m
            .workspaces
            .iter()
            .filter(|w| w.clients.contains(&id))
            .count();
        assert_eq!(on_lists, 1, "client appears on exactly one workspace");
        assert!(m.ws(ws).stack.contains(&id));
    }
}

#[test]
fn selection_follows_stack_head_on_detach() {
    let mut m = model(1, 1);
    let a = add(&mut m, 100, 0);
    let b = add(&mut m, 101, 0);
    m.ws_mut(0).raise_in_stack(a);
    m.ws_mut(0).raise_in_stack(b);

    m.remove_client(b);

    assert_eq!(m.ws(0).sel, Some(a));
    m.check_invariants();
}

#[test]
fn monitor_visible_workspace_backreference() {
    let m = model(2, 4);

    for i in m.connected_monitors() {
        assert_eq!(m.ws(m.monitors[i].ws).mon, i);
    }
}

#[test]
fn net_client_list_counts_all_containers() {
    let mut m = model(1, 2);
    add(&mut m, 100, 0);
    add(&mut m, 101, 1);
    let s = add(&mut m, 102, SCRATCH_WS);
    m.client_mut(s).unwrap().state |= ClientState::SCRATCH;

    assert_eq!(m.net_client_list().len(), 3);
}

#[test]
fn workspace_count_bounds() {
    let mut m = model(1, 1);

    assert!(m.update_workspaces(MAX_WORKSPACES).is_ok());
    assert!(m.update_workspaces(MAX_WORKSPACES + 1).is_err());
    assert_eq!(m.workspaces.len(), MAX_WORKSPACES);
}

#[test]
fn fixed_size_hints_imply_floating() {
    use lath::pure::hints::SizeHints;

    let hints = SizeHints {
        min_w: 200,
        max_w: 200,
        min_h: 100,
        max_h: 100,
        ..Default::default()
    };

    assert!(hints.is_fixed());
}

#[test]
fn visibility_requires_visible_workspace_or_sticky() {
    let mut m = model(1, 2);
    let a = add(&mut m, 100, 0);
    let b = add(&mut m, 101, 1);

    assert!(m.visible(m.client(a).unwrap()));
    assert!(!m.visible(m.client(b).unwrap()));

    m.client_mut(b).unwrap().state |= ClientState::STICKY;
    assert!(m.visible(m.client(b).unwrap()));
}

#[test]
fn struts_shrink_only_their_monitor() {
    let mut m = model(2, 2);
    m.panels.push(lath::pure::monitor::Panel {
        win: Xid::from(500),
        r: Rect::new(0, 0, 1920, 30),
        strut: lath::pure::monitor::Strut { t: 30, ..Default::default() },
        mon: 0,
        class: "bar".into(),
        instance: "bar".into(),
    });

    m.update_struts();

    assert_eq!(m.monitors[0].wr, Rect::new(0, 30, 1920, 1050));
    assert_eq!(m.monitors[1].wr, m.monitors[1].r);
}
