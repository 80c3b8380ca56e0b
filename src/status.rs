//! JSON status snapshots for external bars, streamed to control-socket
//! subscribers.
use crate::{
    core::{Wm, CALLBACK_NAMES},
    layout::LayoutKind,
    pure::{client::Client, client::ClientState, workspace::Workspace},
    rules::Rule,
    x::XConn,
    Xid,
};
use serde_json::{json, Value};
use std::{io::Write, os::unix::net::UnixStream, str::FromStr};

/// Which snapshot a subscriber receives, and on which change flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    /// Workspace array with selected window info, on any change
    Bar,
    /// Focused window title, on focus/title change
    Win,
    /// Workspace array, on workspace change
    Ws,
    /// Current layout name, on layout change
    Layout,
    /// Complete state dump, on any change
    Full,
}

impl FromStr for StatusType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "bar" => Ok(Self::Bar),
            "win" => Ok(Self::Win),
            "ws" => Ok(Self::Ws),
            "layout" => Ok(Self::Layout),
            "full" => Ok(Self::Full),
            _ => Err(bad_command!(
                "status: invalid or missing value for type: {}",
                s
            )),
        }
    }
}

/// A connection upgraded to receive status snapshots.
#[derive(Debug)]
pub struct Subscriber {
    /// The connection the snapshots are written to
    pub stream: UnixStream,
    /// Which snapshot variant this subscriber gets
    pub ty: StatusType,
    /// Remaining snapshots before auto-close; 0 means unlimited
    pub num: usize,
}

impl Subscriber {
    /// Write one snapshot. Returns false when the subscriber is exhausted
    /// or its connection is gone and it should be dropped.
    pub fn emit(&mut self, payload: &Value) -> bool {
        let mut line = payload.to_string();
        line.push('\n');
        if self.stream.write_all(line.as_bytes()).is_err() {
            return false;
        }

        if self.num > 0 {
            self.num -= 1;
            if self.num == 0 {
                return false;
            }
        }

        true
    }
}

// Inner control characters are stripped; quote escaping is the serializer's
// job.
fn clean(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

fn win_id(id: Xid) -> String {
    format!("{}", id)
}

fn flag(c: &Client, s: ClientState) -> bool {
    c.state.contains(s)
}

fn client_json<X: XConn>(wm: &Wm<X>, c: &Client) -> Value {
    let ws_display = if flag(c, ClientState::SCRATCH) {
        0
    } else {
        c.ws + 1
    };

    json!({
        "id": win_id(c.win),
        "pid": c.pid,
        "title": clean(&c.title),
        "class": clean(&c.class),
        "instance": clean(&c.instance),
        "workspace": ws_display,
        "focused": wm.model.cur_client() == Some(c.win),
        "x": c.geom.x,
        "y": c.geom.y,
        "w": c.geom.w,
        "h": c.geom.h,
        "bw": c.bw,
        "hoff": c.hoff,
        "float": flag(c, ClientState::FLOATING),
        "full": flag(c, ClientState::FULLSCREEN),
        "fakefull": flag(c, ClientState::FAKEFULL),
        "fixed": flag(c, ClientState::FIXED),
        "sticky": flag(c, ClientState::STICKY),
        "urgent": flag(c, ClientState::URGENT),
        "above": flag(c, ClientState::ABOVE),
        "hidden": flag(c, ClientState::HIDDEN),
        "scratch": flag(c, ClientState::SCRATCH),
        "no_absorb": flag(c, ClientState::NOABSORB),
        "callback": c.cb.clone().unwrap_or_default(),
        "transient": c.trans
            .and_then(|t| wm.model.client(t))
            .map(|t| client_json(wm, t))
            .unwrap_or_else(|| json!({})),
        "absorbed": c.absorbed
            .as_ref()
            .map(|a| client_json(wm, a))
            .unwrap_or_else(|| json!({})),
    })
}

fn workspace_json<X: XConn>(wm: &Wm<X>, ws: &Workspace) -> Value {
    let clients: Vec<Value> = ws
        .clients
        .iter()
        .filter_map(|id| wm.model.client(*id))
        .map(|c| client_json(wm, c))
        .collect();
    let stack: Vec<Value> = ws
        .stack
        .iter()
        .filter_map(|id| wm.model.client(*id))
        .map(|c| client_json(wm, c))
        .collect();

    json!({
        "name": clean(&ws.name),
        "number": ws.num + 1,
        "focused": ws.num == wm.model.sel_ws,
        "monitor": wm.model.monitors[ws.mon].name,
        "layout": ws.layout.name(),
        "master": ws.nmaster,
        "stack": ws.nstack,
        "msplit": ws.msplit,
        "ssplit": ws.ssplit,
        "gap": ws.gap,
        "smart_gap": ws.smart_gap && wm.model.tile_count(ws.num) == 1,
        "pad_l": ws.pad_l,
        "pad_r": ws.pad_r,
        "pad_t": ws.pad_t,
        "pad_b": ws.pad_b,
        "clients": clients,
        "focus_stack": stack,
    })
}

fn monitor_json<X: XConn>(wm: &Wm<X>, mi: usize) -> Value {
    let m = &wm.model.monitors[mi];

    json!({
        "name": m.name,
        "number": m.num + 1,
        "focused": m.ws == wm.model.sel_ws,
        "x": m.r.x,
        "y": m.r.y,
        "w": m.r.w,
        "h": m.r.h,
        "wx": m.wr.x,
        "wy": m.wr.y,
        "ww": m.wr.w,
        "wh": m.wr.h,
        "workspace": workspace_json(wm, wm.model.ws(m.ws)),
    })
}

fn rule_json(r: &Rule) -> Value {
    let pat = |m: &Option<crate::rules::Matcher>| {
        m.as_ref().map(|m| m.pattern.clone()).unwrap_or_default()
    };

    json!({
        "title": pat(&r.title),
        "class": pat(&r.class),
        "instance": pat(&r.instance),
        "workspace": r.ws.map(|w| w as i64 + 1).unwrap_or(0),
        "monitor": r.mon.clone().unwrap_or_default(),
        "x": r.x.unwrap_or(-1),
        "y": r.y.unwrap_or(-1),
        "w": r.w.unwrap_or(-1),
        "h": r.h.unwrap_or(-1),
        "float": r.state.contains(ClientState::FLOATING),
        "full": r.state.contains(ClientState::FULLSCREEN),
        "fakefull": r.state.contains(ClientState::FAKEFULL),
        "sticky": r.state.contains(ClientState::STICKY),
        "scratch": r.state.contains(ClientState::SCRATCH),
        "focus": r.focus,
        "ignore_cfg": r.state.contains(ClientState::IGNORECFG),
        "ignore_msg": r.state.contains(ClientState::IGNOREMSG),
        "no_absorb": r.state.contains(ClientState::NOABSORB),
        "callback": r.cb.clone().unwrap_or_default(),
        "xgrav": r.xgrav.name(),
        "ygrav": r.ygrav.name(),
    })
}

fn global_json<X: XConn>(wm: &Wm<X>) -> Value {
    let cfg = &wm.model.cfg;
    let layouts: Vec<&str> = LayoutKind::ALL.iter().map(|l| l.name()).collect();

    json!({
        "numws": cfg.num_ws,
        "static_ws": cfg.static_ws,
        "focus_mouse": cfg.focus_mouse,
        "focus_open": cfg.focus_open,
        "focus_urgent": cfg.focus_urgent,
        "win_minwh": cfg.min_wh,
        "win_minxy": cfg.min_xy,
        "smart_border": cfg.smart_border,
        "smart_gap": cfg.smart_gap,
        "tile_hints": cfg.tile_hints,
        "tile_tohead": cfg.tile_to_head,
        "obey_motif": cfg.obey_motif,
        "layouts": layouts,
        "callbacks": CALLBACK_NAMES,
        "border": {
            "width": cfg.border.width,
            "focus": cfg.border.focus.to_string(),
            "urgent": cfg.border.urgent.to_string(),
            "unfocus": cfg.border.unfocus.to_string(),
        },
        "focused": monitor_json(wm, wm.model.sel_mon()),
    })
}

fn ws_selected_window<X: XConn>(wm: &Wm<X>, ws: &Workspace) -> (String, String) {
    match ws
        .sel
        .and_then(|id| wm.model.client(id))
        .filter(|c| !c.state.contains(ClientState::HIDDEN))
    {
        Some(c) => (clean(&c.title), win_id(c.win)),
        None => (String::new(), String::new()),
    }
}

/// The `type bar` / `type ws` snapshot: the workspace array with selected
/// window info per workspace.
pub fn bar_snapshot<X: XConn>(wm: &Wm<X>) -> Value {
    let workspaces: Vec<Value> = wm
        .model
        .workspaces
        .iter()
        .map(|ws| {
            let (title, id) = ws_selected_window(wm, ws);
            json!({
                "name": clean(&ws.name),
                "number": ws.num + 1,
                "focused": ws.num == wm.model.sel_ws,
                "active": !ws.clients.is_empty(),
                "monitor": wm.model.monitors[ws.mon].name,
                "layout": ws.layout.name(),
                "title": title,
                "id": id,
            })
        })
        .collect();

    json!({ "workspaces": workspaces })
}

/// The `type win` snapshot.
pub fn win_snapshot<X: XConn>(wm: &Wm<X>) -> Value {
    let focused = wm
        .model
        .cur_client()
        .and_then(|id| wm.model.client(id))
        .map(|c| clean(&c.title))
        .unwrap_or_default();

    json!({ "focused": focused })
}

/// The `type layout` snapshot.
pub fn layout_snapshot<X: XConn>(wm: &Wm<X>) -> Value {
    json!({ "layout": wm.model.cur_ws().layout.name() })
}

/// The `type full` snapshot: everything.
pub fn full_snapshot<X: XConn>(wm: &Wm<X>) -> Value {
    let workspaces: Vec<Value> = wm
        .model
        .workspaces
        .iter()
        .map(|ws| workspace_json(wm, ws))
        .collect();
    let monitors: Vec<Value> = wm
        .model
        .connected_monitors()
        .map(|mi| monitor_json(wm, mi))
        .collect();
    let clients: Vec<Value> = wm
        .model
        .workspaces
        .iter()
        .chain([&wm.model.scratch])
        .flat_map(|ws| ws.clients.iter())
        .filter_map(|id| wm.model.client(*id))
        .map(|c| client_json(wm, c))
        .collect();
    let rules: Vec<Value> = wm.rules.iter().map(rule_json).collect();
    let panels: Vec<Value> = wm
        .model
        .panels
        .iter()
        .map(|p| {
            json!({
                "id": win_id(p.win),
                "class": clean(&p.class),
                "instance": clean(&p.instance),
                "x": p.r.x,
                "y": p.r.y,
                "w": p.r.w,
                "h": p.r.h,
                "l": p.strut.l,
                "r": p.strut.r,
                "t": p.strut.t,
                "b": p.strut.b,
                "monitor": monitor_json(wm, p.mon),
            })
        })
        .collect();
    let desks: Vec<Value> = wm
        .model
        .desks
        .iter()
        .map(|d| {
            json!({
                "id": win_id(d.win),
                "class": clean(&d.class),
                "instance": clean(&d.instance),
                "monitor": wm.model.monitors[d.mon].name,
            })
        })
        .collect();

    json!({
        "global": global_json(wm),
        "workspaces": workspaces,
        "monitors": monitors,
        "clients": clients,
        "rules": rules,
        "panels": panels,
        "desks": desks,
    })
}

/// The snapshot for a given subscriber type.
pub fn snapshot_for<X: XConn>(wm: &Wm<X>, ty: StatusType) -> Value {
    match ty {
        StatusType::Bar | StatusType::Ws => bar_snapshot(wm),
        StatusType::Win => win_snapshot(wm),
        StatusType::Layout => layout_snapshot(wm),
        StatusType::Full => full_snapshot(wm),
    }
}

/// Whether a subscriber of `ty` cares about the currently pending changes.
pub fn wants_update(ty: StatusType, win: bool, ws: bool, layout: bool) -> bool {
    match ty {
        StatusType::Bar | StatusType::Full => win || ws || layout,
        StatusType::Win => win,
        StatusType::Ws => ws,
        StatusType::Layout => layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(clean("a\x01b\nc"), "abc");
    }

    #[test]
    fn quotes_survive_via_serializer() {
        let v = json!({ "title": clean("say \"hi\"") });

        assert_eq!(v.to_string(), r#"{"title":"say \"hi\""}"#);
    }

    #[test_case(StatusType::Bar, true, false, false, true; "bar on win change")]
    #[test_case(StatusType::Win, false, true, false, false; "win ignores ws change")]
    #[test_case(StatusType::Ws, false, true, false, true; "ws on ws change")]
    #[test_case(StatusType::Layout, false, false, true, true; "layout on layout change")]
    #[test_case(StatusType::Full, false, false, true, true; "full on any change")]
    #[test]
    fn update_filtering(ty: StatusType, win: bool, ws: bool, layout: bool, expected: bool) {
        assert_eq!(wants_update(ty, win, ws, layout), expected);
    }

    #[test_case("bar", StatusType::Bar; "bar")]
    #[test_case("full", StatusType::Full; "full")]
    #[test]
    fn type_parsing(s: &str, expected: StatusType) {
        assert_eq!(StatusType::from_str(s).expect("valid type"), expected);
    }

    #[test]
    fn unknown_type_is_rejected(){
        assert!(StatusType::from_str("everything").is_err());
    }
}
