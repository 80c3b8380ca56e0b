//! Terminal absorption: a terminal window visually hosts the window of a
//! child process it spawned, and gets it back when the child closes.
//!
//! Eligibility is decided by walking the process tree through
//! `/proc/<pid>/stat` looking for an ancestor that owns a managed client
//! with the `TERMINAL` state and no absorbed child already. On kernels
//! without procfs the walk finds nothing and absorption never triggers.
use crate::{
    pure::{client::ClientState, model::Model},
    Xid,
};
use std::fs;
use tracing::{debug, warn};

/// The parent pid of `pid`, from field four of `/proc/<pid>/stat`.
pub fn parent_pid(pid: u32) -> Option<u32> {
    let stat = fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    // The comm field is parenthesised and may contain spaces; everything
    // after the closing paren is space separated with ppid first.
    let after_comm = stat.rsplit_once(')')?.1;

    after_comm
        .split_whitespace()
        .nth(1)
        .and_then(|ppid| ppid.parse().ok())
        .filter(|&ppid| ppid > 0)
}

/// Whether `ancestor` appears on the parent chain of `pid`.
pub fn is_ancestor(ancestor: u32, mut pid: u32) -> bool {
    if ancestor == 0 || pid == 0 {
        return false;
    }
    while let Some(ppid) = parent_pid(pid) {
        if ppid == ancestor {
            return true;
        }
        if ppid <= 1 {
            break;
        }
        pid = ppid;
    }

    false
}

/// Find a terminal client eligible to absorb a new client owned by `pid`.
pub fn find_terminal_for(model: &Model, pid: u32) -> Option<Xid> {
    if pid == 0 {
        return None;
    }

    let candidates = model
        .workspaces
        .iter()
        .chain([&model.scratch])
        .flat_map(|ws| ws.clients.iter());

    for id in candidates {
        let c = match model.client(*id) {
            Some(c) => c,
            None => continue,
        };
        if c.state.contains(ClientState::TERMINAL)
            && c.absorbed.is_none()
            && c.pid != 0
            && is_ancestor(c.pid, pid)
        {
            return Some(*id);
        }
    }

    None
}

/// Whether `child` may be absorbed at all.
pub fn absorbable(model: &Model, child: Xid) -> bool {
    match model.client(child) {
        Some(c) => {
            !c.state.contains(ClientState::NOABSORB)
                && !c.state.contains(ClientState::TERMINAL)
                && !model.floating(c)
        }
        None => false,
    }
}

/// Absorb `child` into `term`: the child leaves every workspace list, the
/// two records swap window ids so the terminal's slot now addresses the
/// child's window, and the terminal keeps the child as an owned sub-record.
///
/// Returns the window to unmap (the terminal's original window), or `None`
/// if either record disappeared underneath us.
pub fn absorb(model: &mut Model, term: Xid, child: Xid) -> Option<Xid> {
    model.detach(child, false);
    model.detach_stack(child);

    let mut child_rec = model.clients.remove(&child)?;
    let mut term_rec = match model.clients.remove(&term) {
        Some(t) => t,
        None => {
            // Terminal vanished mid-flight: put the child back.
            warn!(%child, "terminal disappeared during absorption");
            model.clients.insert(child, child_rec);
            model.attach(child, false);
            model.attach_stack(child);
            return None;
        }
    };

    debug!(%term, %child, "absorbing client into terminal");
    let term_win = term_rec.win;
    term_rec.win = child_rec.win;
    child_rec.win = term_win;
    term_rec.state |= ClientState::NEEDSMAP;
    term_rec.absorbed = Some(Box::new(child_rec));

    // The terminal is now addressed by the child's window id everywhere.
    let ws = model.ws_mut(term_rec.ws);
    for slot in ws.clients.iter_mut().chain(ws.stack.iter_mut()) {
        if *slot == term {
            *slot = term_rec.win;
        }
    }
    if ws.sel == Some(term) {
        ws.sel = Some(term_rec.win);
    }

    let new_id = term_rec.win;
    model.clients.insert(new_id, term_rec);
    model.win_change = true;
    model.ws_change = true;
    model.needs_refresh = true;

    Some(term_win)
}

/// Reverse an absorption when the child's window goes away: swap the ids
/// back and return the terminal's own window so it can be mapped again.
pub fn desorb(model: &mut Model, id: Xid) -> Option<Xid> {
    let mut term_rec = model.clients.remove(&id)?;
    let child = match term_rec.absorbed.take() {
        Some(c) => c,
        None => {
            model.clients.insert(id, term_rec);
            return None;
        }
    };

    debug!(%id, child = %child.win, "releasing absorbed client");
    // The child record holds the terminal's original window id.
    term_rec.win = child.win;
    term_rec.state |= ClientState::NEEDSMAP;

    let ws = model.ws_mut(term_rec.ws);
    for slot in ws.clients.iter_mut().chain(ws.stack.iter_mut()) {
        if *slot == id {
            *slot = term_rec.win;
        }
    }
    if ws.sel == Some(id) {
        ws.sel = Some(term_rec.win);
    }

    let new_id = term_rec.win;
    model.clients.insert(new_id, term_rec);
    model.win_change = true;
    model.ws_change = true;
    model.needs_refresh = true;

    Some(new_id)
}

/// The client currently holding `win` as an absorbed child, if any.
pub fn absorbing_client(model: &Model, win: Xid) -> Option<Xid> {
    model
        .clients
        .iter()
        .find(|(_, c)| c.absorbed.as_ref().map(|a| a.win) == Some(win))
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::{client::Client, geometry::Rect, model::Config, monitor::Monitor};

    fn model() -> Model {
        let mut m = Model::new(Config::default());
        m.monitors
            .push(Monitor::new(1, "M-0", 0, Rect::new(0, 0, 1920, 1080), 0));
        m.update_workspaces(2).expect("workspaces");

        m
    }

    fn managed(m: &mut Model, id: u32, ws: usize) {
        let mut c = Client::new(Xid(id), Rect::new(0, 0, 100, 100), 1);
        c.ws = ws;
        m.add_client(c);
        m.attach(Xid(id), false);
        m.attach_stack(Xid(id));
    }

    #[test]
    fn absorb_swaps_ids_and_detaches_child() {
        let mut m = model();
        managed(&mut m, 100, 0);
        managed(&mut m, 200, 0);
        m.client_mut(Xid(100)).unwrap().state |= ClientState::TERMINAL;
        m.client_mut(Xid(100)).unwrap().pid = 10;

        let unmap = absorb(&mut m, Xid(100), Xid(200));

        assert_eq!(unmap, Some(Xid(100)));
        // The terminal record now lives under the child's window id.
        let term = m.client(Xid(200)).expect("terminal under child id");
        assert!(term.state.contains(ClientState::TERMINAL));
        let inner = term.absorbed.as_ref().expect("owns the child");
        assert_eq!(inner.win, Xid(100));
        // The child is on no workspace list.
        assert_eq!(m.ws(0).clients, vec![Xid(200)]);
        assert_eq!(m.ws(0).stack, vec![Xid(200)]);
        m.check_invariants();
    }

    #[test]
    fn desorb_restores_the_original_window() {
        let mut m = model();
        managed(&mut m, 100, 0);
        managed(&mut m, 200, 0);
        m.client_mut(Xid(100)).unwrap().state |= ClientState::TERMINAL;

        absorb(&mut m, Xid(100), Xid(200));
        let remapped = desorb(&mut m, Xid(200));

        assert_eq!(remapped, Some(Xid(100)));
        let term = m.client(Xid(100)).expect("terminal back under its own id");
        assert!(term.absorbed.is_none());
        assert_eq!(m.ws(0).clients, vec![Xid(100)]);
        m.check_invariants();
    }

    #[test]
    fn absorbing_client_finds_the_holder() {
        let mut m = model();
        managed(&mut m, 100, 0);
        managed(&mut m, 200, 0);

        absorb(&mut m, Xid(100), Xid(200));

        assert_eq!(absorbing_client(&m, Xid(100)), Some(Xid(200)));
        assert_eq!(absorbing_client(&m, Xid(999)), None);
    }

    #[test]
    fn find_terminal_requires_terminal_state_and_free_slot() {
        let mut m = model();
        managed(&mut m, 100, 0);
        // No TERMINAL state, never matches regardless of the process tree.
        assert_eq!(find_terminal_for(&m, std::process::id()), None);
    }

    #[test]
    fn pid_zero_never_matches() {
        let m = model();

        assert_eq!(find_terminal_for(&m, 0), None);
        assert!(!is_ancestor(0, 42));
    }

    #[test]
    fn parent_pid_of_self_is_plausible() {
        // Only meaningful on Linux; elsewhere the probe returns None and
        // absorption is simply inert.
        if let Some(ppid) = parent_pid(std::process::id()) {
            assert!(ppid >= 1);
        }
    }
}
