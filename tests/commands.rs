//! Control-socket grammar and boundary behavior.
use lath::{
    cmd::{self, Outcome},
    core::Wm,
    layout::LayoutKind,
    pure::{geometry::Rect, model::Config},
    status::StatusType,
    x::mock::MockXConn,
};
use simple_test_case::test_case;

mod common;
use common::{manage, wm};

fn exec(w: &mut Wm<MockXConn>, line: &str) -> String {
    match cmd::execute(w, line) {
        Outcome::Reply(r) => r,
        other => panic!("expected a plain reply, got {:?}", other),
    }
}

#[test_case("set gap 10"; "gap")]
#[test_case("set msplit 0.6"; "msplit")]
#[test_case("set layout grid"; "layout")]
#[test_case("set master 2 stack 4"; "master and stack")]
#[test_case("set numws 5"; "numws")]
#[test_case("set border w 2 color focus #336699"; "border")]
#[test_case("set smart_gap false"; "bool setting")]
#[test_case("set pad l 10 r 10"; "padding")]
#[test_case(r#"rule class "^mpv$" float true"#; "rule")]
#[test]
fn accepted_commands_reply_empty_and_are_idempotent(line: &str) {
    let mut w = wm(Config::default());

    assert_eq!(exec(&mut w, line), "");
    // Re-running the same canonical command leaves the reply clean.
    assert_eq!(exec(&mut w, line), "");
}

#[test_case("wibble", "!unknown command"; "unknown keyword")]
#[test_case("set gap abc", "!invalid value for gap"; "bad int")]
#[test_case("set msplit 2.0", "!invalid value for msplit"; "split out of range")]
#[test_case("set layout wobbly", "!invalid value for layout"; "unknown layout")]
#[test_case("set mouse mod hyper", "!set mouse: invalid value for mod"; "bad modifier")]
#[test_case("win focus sideways", "!invalid argument for win focus"; "bad focus arg")]
#[test_case(r#"rule class "(unclosed""#, "!regex parse error"; "bad regex")]
#[test]
fn rejected_commands_reply_with_bang(line: &str, prefix: &str) {
    let mut w = wm(Config::default());
    manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    manage(&mut w, 101, Rect::new(0, 0, 800, 600));

    let reply = exec(&mut w, line);

    assert!(
        reply.starts_with(prefix),
        "reply {:?} does not start with {:?}",
        reply,
        prefix
    );
}

#[test]
fn gap_bound_is_one_sixth_of_the_working_height() {
    let mut w = wm(Config::default());

    // 1080 / 6
    assert_eq!(exec(&mut w, "set gap 180"), "");
    assert_eq!(w.model.cur_ws().gap, 180);

    let reply = exec(&mut w, "set gap 181");
    assert!(reply.starts_with('!'));
    assert_eq!(w.model.cur_ws().gap, 180, "rejected value leaves state alone");
}

#[test]
fn workspace_count_above_256_is_refused() {
    let mut w = wm(Config::default());

    let reply = exec(&mut w, "set numws 257");

    assert!(reply.starts_with('!'));
    assert_eq!(w.model.workspaces.len(), 1);
}

#[test]
fn relative_values_adjust_and_absolute_values_replace() {
    let mut w = wm(Config::default());

    assert_eq!(exec(&mut w, "set gap 10"), "");
    assert_eq!(exec(&mut w, "set gap +5"), "");
    assert_eq!(w.model.cur_ws().gap, 15);
    assert_eq!(exec(&mut w, "set gap -5"), "");
    assert_eq!(w.model.cur_ws().gap, 10);
    assert_eq!(exec(&mut w, "set gap 2"), "");
    assert_eq!(w.model.cur_ws().gap, 2);
}

#[test]
fn layout_cycle_advances_and_wraps() {
    let mut w = wm(Config::default());
    assert_eq!(w.model.cur_ws().layout, LayoutKind::Tile);

    for _ in 0..LayoutKind::ALL.len() {
        assert_eq!(exec(&mut w, "set layout cycle"), "");
    }

    assert_eq!(w.model.cur_ws().layout, LayoutKind::Tile);
}

#[test]
fn rules_insert_replace_and_remove() {
    let mut w = wm(Config::default());

    assert_eq!(exec(&mut w, r#"rule class "^term$" float true"#), "");
    assert_eq!(w.rules.len(), 1);

    // Same matcher replaces rather than duplicating.
    assert_eq!(exec(&mut w, r#"rule class "^term$" stick true"#), "");
    assert_eq!(w.rules.len(), 1);

    assert_eq!(exec(&mut w, r#"rule class "^term$" remove"#), "");
    assert!(w.rules.is_empty());
}

#[test]
fn rule_remove_star_clears_all() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, r#"rule class "^a$" float true"#), "");
    assert_eq!(exec(&mut w, r#"rule class "^b$" float true"#), "");

    assert_eq!(exec(&mut w, "rule remove *"), "");

    assert!(w.rules.is_empty());
}

#[test]
fn ws_view_switches_by_number_and_direction() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 3"), "");

    assert_eq!(exec(&mut w, "ws view 2"), "");
    assert_eq!(w.model.sel_ws, 1);

    assert_eq!(exec(&mut w, "ws next"), "");
    assert_eq!(w.model.sel_ws, 2);

    assert_eq!(exec(&mut w, "ws prev"), "");
    assert_eq!(w.model.sel_ws, 1);

    assert_eq!(exec(&mut w, "ws last"), "");
    assert_eq!(w.model.sel_ws, 2);
}

#[test]
fn ws_send_moves_the_selected_client() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 2"), "");
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));

    assert_eq!(exec(&mut w, "ws send 2"), "");

    assert_eq!(w.model.client(id).unwrap().ws, 1);
    assert_eq!(w.model.sel_ws, 0);
    w.model.check_invariants();
}

#[test]
fn ws_follow_moves_and_views() {
    let mut w = wm(Config::default());
    assert_eq!(exec(&mut w, "set numws 2"), "");
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));

    assert_eq!(exec(&mut w, "ws follow 2"), "");

    assert_eq!(w.model.client(id).unwrap().ws, 1);
    assert_eq!(w.model.sel_ws, 1);
    w.model.check_invariants();
}

#[test]
fn status_command_upgrades_the_connection() {
    let mut w = wm(Config::default());

    match cmd::execute(&mut w, "status type bar num 2") {
        Outcome::Subscribe { ty, num } => {
            assert_eq!(ty, StatusType::Bar);
            assert_eq!(num, 2);
        }
        other => panic!("expected a subscription, got {:?}", other),
    }
}

#[test]
fn restart_and_exit_clear_the_run_flag() {
    let mut w = wm(Config::default());
    w.running = true;

    assert_eq!(exec(&mut w, "restart"), "");
    assert!(!w.running && w.restart);

    w.running = true;
    w.restart = false;
    assert_eq!(exec(&mut w, "exit"), "");
    assert!(!w.running && !w.restart);
}

#[test]
fn win_resize_adjusts_floating_geometry() {
    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));
    assert_eq!(exec(&mut w, "win float true"), "");
    {
        let c = w.model.client_mut(id).unwrap();
        c.geom = Rect::new(100, 100, 400, 300);
    }

    assert_eq!(exec(&mut w, "win resize x +10 y +20 w 500 h 350"), "");

    let c = w.model.client(id).unwrap();
    assert_eq!(c.geom, Rect::new(110, 120, 500, 350));
}

#[test]
fn win_resize_bw_zero_sets_noborder() {
    use lath::pure::client::ClientState;

    let mut w = wm(Config::default());
    let id = manage(&mut w, 100, Rect::new(0, 0, 800, 600));

    assert_eq!(exec(&mut w, "win resize bw 0"), "");

    let c = w.model.client(id).unwrap();
    assert_eq!(c.bw, 0);
    assert!(c.state.contains(ClientState::NOBORDER));
    w.model.check_invariants();
}

#[test]
fn quoted_rule_patterns_keep_their_spaces() {
    let mut w = wm(Config::default());

    assert_eq!(
        exec(&mut w, r#"rule title "Save As" float true"#),
        ""
    );

    let r = w.rules.iter().next().expect("rule stored");
    assert_eq!(r.title.as_ref().unwrap().pattern, "Save As");
}
