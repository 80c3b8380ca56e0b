//! The control-socket command language: tokenization, dispatch tables and
//! the handlers that mutate the model.
//!
//! Every connection carries one command line; the reply is empty on success
//! and starts with `!` on error, in which case no state was changed by the
//! failing clause.
use crate::{
    core::{workspaces::Direction, Wm, CALLBACK_NAMES},
    layout::LayoutKind,
    pure::{
        client::ClientState,
        geometry::Gravity,
        model::MAX_WORKSPACES,
        workspace::WsDefaults,
    },
    rules::{Matcher, Rule},
    status::StatusType,
    x::{Atom, XConn, XConnExt},
    Result, Xid,
};
use std::str::FromStr;
use tracing::debug;

pub mod parse;

use parse::{adjust, adjust_split, invalid_value, tokenize, Args};

/// What the socket layer should do with the connection after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write the reply and close. Errors start with `!`.
    Reply(String),
    /// Upgrade the connection to a status subscriber.
    Subscribe {
        /// Snapshot variant to stream
        ty: StatusType,
        /// Snapshot countdown; 0 streams forever
        num: usize,
    },
}

/// Parse and run one command line against the window manager.
pub fn execute<X: XConn>(wm: &mut Wm<X>, line: &str) -> Outcome {
    debug!(%line, "running command");
    let toks = tokenize(line);
    let mut args = Args::new(&toks);

    let res = match args.next() {
        None => Err(bad_command!("no command given")),
        Some("mon") => cmd_mon(wm, &mut args).map(|_| None),
        Some("rule") => cmd_rule(wm, &mut args).map(|_| None),
        Some("set") => cmd_set(wm, &mut args).map(|_| None),
        Some("win") => cmd_win(wm, &mut args).map(|_| None),
        Some("ws") => cmd_ws(wm, &mut args).map(|_| None),
        Some("status") => cmd_status(&mut args).map(Some),
        Some("restart") => {
            wm.running = false;
            wm.restart = true;
            Ok(None)
        }
        Some("exit") => {
            wm.running = false;
            Ok(None)
        }
        Some(cmd) => Err(bad_command!(
            "unknown command: {}\n\nexpected one of mon, rule, set, win, ws, status, restart, exit",
            cmd
        )),
    };

    let res = res.and_then(|o| match args.next() {
        Some(extra) if o.is_none() => Err(bad_command!("unknown argument: {}", extra)),
        _ => Ok(o),
    });

    match res {
        Ok(Some(outcome)) => outcome,
        Ok(None) => Outcome::Reply(String::new()),
        Err(e) => Outcome::Reply(format!("!{}", e)),
    }
}

// ----- shared argument helpers ---------------------------------------------

// A window reference is a hex `0x...` window id. Returns None for tokens
// that do not look like ids; ids that parse but match no client are an error.
fn parse_client_ref<X: XConn>(wm: &Wm<X>, tok: &str) -> Result<Option<Xid>> {
    let parsed = tok
        .strip_prefix("0x")
        .and_then(|hex| u32::from_str_radix(hex, 16).ok());

    match parsed {
        Some(raw) => {
            let id = Xid::from(raw);
            if wm.model.clients.contains_key(&id) {
                Ok(Some(id))
            } else {
                Err(bad_command!(
                    "invalid window id: {}\nexpected hex e.g. 0x001fefe7",
                    tok
                ))
            }
        }
        None => Ok(None),
    }
}

// Resolve a workspace reference: a direction word, a 1-based number, or a
// workspace name. With `use_mon` the same words address monitors and resolve
// to the monitor's visible workspace.
fn resolve_ws_target<X: XConn>(wm: &Wm<X>, tok: &str, use_mon: bool) -> Result<usize> {
    if let Ok(dir) = Direction::from_str(tok) {
        return Ok(if use_mon {
            resolve_mon_direction(wm, dir)
        } else {
            resolve_ws_direction(wm, dir)
        });
    }

    if use_mon {
        wm.model
            .mon_by_reference(tok)
            .map(|mi| wm.model.monitors[mi].ws)
            .ok_or_else(|| {
                bad_command!(
                    "invalid argument for mon: {}\nexpected integer or monitor name e.g. HDMI-A-0",
                    tok
                )
            })
    } else {
        if let Ok(n) = tok.parse::<usize>() {
            if n >= 1 && n <= wm.model.workspaces.len() {
                return Ok(n - 1);
            }
        }
        wm.model
            .workspaces
            .iter()
            .find(|w| w.name == tok)
            .map(|w| w.num)
            .ok_or_else(|| {
                bad_command!(
                    "invalid argument for ws: {}\nexpected integer or workspace name e.g. 2",
                    tok
                )
            })
    }
}

fn resolve_ws_direction<X: XConn>(wm: &Wm<X>, dir: Direction) -> usize {
    let n = wm.model.workspaces.len();
    let cur = wm.model.sel_ws;

    match dir {
        Direction::Next => (cur + 1) % n,
        Direction::Prev => (cur + n - 1) % n,
        Direction::Last => wm.model.last_ws.min(n - 1),
        Direction::NextNonEmpty | Direction::PrevNonEmpty => {
            let step = |ws: usize| match dir {
                Direction::NextNonEmpty => (ws + 1) % n,
                _ => (ws + n - 1) % n,
            };
            let mut ws = step(cur);
            while ws != cur && wm.model.ws(ws).clients.is_empty() {
                ws = step(ws);
            }
            ws
        }
    }
}

fn resolve_mon_direction<X: XConn>(wm: &Wm<X>, dir: Direction) -> usize {
    let mons: Vec<usize> = wm.model.connected_monitors().collect();
    let cur = wm.model.sel_mon();
    let pos = mons.iter().position(|&m| m == cur).unwrap_or(0);

    let mi = match dir {
        Direction::Next | Direction::NextNonEmpty => mons[(pos + 1) % mons.len()],
        Direction::Prev | Direction::PrevNonEmpty => mons[(pos + mons.len() - 1) % mons.len()],
        Direction::Last => {
            let last_mon = wm.model.ws(wm.model.last_ws).mon;
            if wm.model.monitors[last_mon].connected {
                last_mon
            } else {
                cur
            }
        }
    };

    wm.model.monitors[mi].ws
}

// ----- ws / mon -------------------------------------------------------------

fn cmd_ws<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    if wm.model.workspaces.len() < 2 {
        let _ = args.rest();
        return Ok(());
    }
    wm.cmd_use_mon = false;
    adjust_ws_or_mon(wm, args)
}

fn cmd_mon<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    if wm.model.connected_monitors().count() < 2 {
        let _ = args.rest();
        return Ok(());
    }
    wm.cmd_use_mon = true;
    let res = adjust_ws_or_mon(wm, args);
    wm.cmd_use_mon = false;

    res
}

#[derive(Clone, Copy, PartialEq)]
enum WsAction {
    View,
    Send,
    Follow,
}

fn adjust_ws_or_mon<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let mut action = WsAction::View;
    if let Some(tok) = args.peek() {
        action = match tok {
            "view" => WsAction::View,
            "send" => WsAction::Send,
            "follow" => WsAction::Follow,
            _ => WsAction::View,
        };
        if matches!(tok, "view" | "send" | "follow") {
            args.next();
        }
    }

    wm.cmd_target = wm.model.cur_client();
    wm.cmd_target_passed = false;
    if action != WsAction::View {
        if let Some(tok) = args.peek() {
            if let Some(id) = parse_client_ref(wm, tok)? {
                wm.cmd_target = Some(id);
                wm.cmd_target_passed = true;
                args.next();
            }
        }
    }

    let tok = args
        .next()
        .ok_or_else(|| {
            bad_command!(
                "{} command requires additional arguments",
                if wm.cmd_use_mon { "mon" } else { "ws" }
            )
        })?;
    let ws = resolve_ws_target(wm, tok, wm.cmd_use_mon)?;

    let target_differs = wm
        .cmd_target
        .and_then(|c| wm.model.client(c))
        .map(|c| c.ws != ws)
        .unwrap_or(false);
    if target_differs || ws != wm.model.sel_ws {
        if action != WsAction::Send && wm.model.ws(ws).layout != wm.model.cur_ws().layout {
            wm.model.layout_change = true;
        }
        match action {
            WsAction::View => wm.view_workspace(ws),
            WsAction::Send => wm.send_to_workspace(ws),
            WsAction::Follow => wm.follow_to_workspace(ws),
        }
        wm.model.ws_change = true;
    }

    Ok(())
}

// ----- win ------------------------------------------------------------------

fn cmd_win<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    wm.cmd_target = wm.model.cur_client();
    wm.cmd_target_passed = false;

    while let Some(tok) = args.next() {
        if let Some(id) = parse_client_ref(wm, tok)? {
            wm.cmd_target = Some(id);
            wm.cmd_target_passed = true;
            continue;
        }

        // Only scratch works without a target client.
        if wm.cmd_target.is_none() && tok != "scratch" {
            return Err(bad_command!("no window available for win {}", tok));
        }

        match tok {
            "cycle" => wm.cycle_clients()?,
            "fakefull" => {
                let c = wm.cmd_target.expect("checked above");
                wm.toggle_fakefull(c);
            }
            "float" => cmd_win_float(wm, args)?,
            "full" => {
                let c = wm.cmd_target.expect("checked above");
                let cur = matches!(
                    wm.model.client(c),
                    Some(cl) if cl.state.contains(ClientState::FULLSCREEN)
                );
                wm.set_fullscreen(c, !cur);
            }
            "focus" => cmd_win_focus(wm, args)?,
            "kill" => {
                let c = wm.cmd_target.expect("checked above");
                wm.kill_client(c);
            }
            "resize" => cmd_win_resize(wm, args)?,
            "stick" => {
                let c = wm.cmd_target.expect("checked above");
                wm.toggle_sticky(c)?;
            }
            "swap" => wm.swap_with_master()?,
            "scratch" => cmd_win_scratch(wm, args)?,
            _ => {
                return Err(bad_command!(
                    "unknown win command: {}\n\nexpected one of cycle, fakefull, float, full, focus, kill, resize, stick, swap, scratch",
                    tok
                ))
            }
        }
    }

    Ok(())
}

fn cmd_win_float<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let c = wm.cmd_target.expect("target checked by caller");

    match args.peek() {
        Some("all") => {
            args.next();
            let ws = wm.model.client(c).map(|cl| cl.ws).unwrap_or(wm.model.sel_ws);
            for id in wm.model.ws(ws).clients.clone() {
                let (floating, was) = match wm.model.client(id) {
                    Some(cl) => (
                        wm.model.floating(cl),
                        cl.state.contains(ClientState::WASFLOATING),
                    ),
                    None => continue,
                };
                if floating || was {
                    if let Some(cl) = wm.model.client_mut(id) {
                        cl.state.set(ClientState::WASFLOATING, floating);
                    }
                    // Sticky or fixed clients refuse the toggle; the sweep
                    // keeps going regardless.
                    let _ = wm.set_floating(id, None);
                }
            }
            Ok(())
        }
        Some("true") | Some("false") | Some("1") | Some("0") => {
            let v = args.bool_for("win float")?;
            wm.set_floating(c, Some(v))
        }
        _ => wm.set_floating(c, None),
    }
}

fn cmd_win_focus<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let c = wm.cmd_target.expect("target checked by caller");
    let fullscreen = matches!(
        wm.model.client(c),
        Some(cl) if cl.real_fullscreen()
    );

    if wm.cmd_target_passed {
        if let Some(ws) = wm.model.client(c).map(|cl| cl.ws) {
            if ws != wm.model.sel_ws {
                wm.view_workspace(ws);
            }
        }
        wm.focus(Some(c));
        return Ok(());
    }
    if fullscreen || wm.model.cur_ws().clients.len() < 2 {
        return Ok(());
    }

    let tok = args.value_for("win focus")?;
    let n = match Direction::from_str(tok) {
        Ok(Direction::Next) => 1,
        Ok(Direction::Prev) => -1,
        Ok(_) => {
            return Err(bad_command!("invalid argument for win focus: {}", tok));
        }
        Err(_) => tok
            .parse::<i32>()
            .map_err(|_| bad_command!("invalid argument for win focus: {}", tok))?,
    };
    wm.focus_direction(n);

    Ok(())
}

// A coordinate value in a resize spec: an integer or a gravity word.
fn parse_coord(tok: &str, horizontal: bool) -> Result<(Option<i32>, bool, Gravity)> {
    if let Ok(v) = tok.parse::<i32>() {
        let rel = tok.starts_with('+') || tok.starts_with('-');
        return Ok((Some(v), rel, Gravity::None));
    }

    let grav = Gravity::from_str(tok)?;
    let ok = matches!(
        (horizontal, grav),
        (true, Gravity::Left | Gravity::Right | Gravity::Center)
            | (false, Gravity::Top | Gravity::Bottom | Gravity::Center)
    );
    if !ok {
        return Err(invalid_value(
            if horizontal { "x" } else { "y" },
            tok,
            "integer or gravity",
        ));
    }

    Ok((None, false, grav))
}

fn cmd_win_resize<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let c = wm.cmd_target.expect("target checked by caller");
    if matches!(wm.model.client(c), Some(cl) if cl.real_fullscreen()) {
        return Err(bad_command!("unable to resize fullscreen windows"));
    }

    let (mut x, mut y, mut w, mut h, mut bw) = (None, None, None, None, None);
    let (mut relx, mut rely, mut relw, mut relh, mut relbw) = (false, false, false, false, false);
    let (mut xgrav, mut ygrav) = (Gravity::None, Gravity::None);

    while let Some(tok) = args.peek() {
        match tok {
            "x" => {
                args.next();
                let v = args.value_for("x")?;
                (x, relx, xgrav) = parse_coord(v, true)?;
            }
            "y" => {
                args.next();
                let v = args.value_for("y")?;
                (y, rely, ygrav) = parse_coord(v, false)?;
            }
            "w" | "width" => {
                args.next();
                let (v, r) = args.int_for("w", false)?;
                w = Some(v);
                relw = r;
            }
            "h" | "height" => {
                args.next();
                let (v, r) = args.int_for("h", false)?;
                h = Some(v);
                relh = r;
            }
            "bw" | "border_width" => {
                args.next();
                let (v, r) = args.int_for("bw", true)?;
                bw = Some(v);
                relbw = r;
            }
            _ => break,
        }
    }
    if (x, y, w, h, bw) == (None, None, None, None, None)
        && xgrav == Gravity::None
        && ygrav == Gravity::None
    {
        return Err(bad_command!("win resize requires additional arguments"));
    }

    let ws = wm.model.client(c).map(|cl| cl.ws).unwrap_or(wm.model.sel_ws);
    let (_, wr) = wm.client_mon_rects(c);

    if let Some(v) = bw {
        let cur = wm.model.client(c).map(|cl| cl.bw).unwrap_or(0);
        let nv = adjust(cur, v, relbw).clamp(0, wr.h / 6);
        if nv != cur {
            if let Some(cl) = wm.model.client_mut(c) {
                cl.set_border_width(nv);
            }
            wm.model.needs_refresh = true;
        }
    }

    let floating = wm
        .model
        .client(c)
        .map(|cl| wm.model.floating(cl))
        .unwrap_or(true);

    if !floating {
        if let Some(v) = y {
            wm.move_in_stack(if v > 0 { 1 } else { -1 });
        }
    }

    let layout = wm.model.ws(ws).layout;
    if floating {
        let cur = wm.model.client(c).map(|cl| (cl.geom, cl.bw)).expect("client exists");
        let mut r = cur.0;
        if xgrav == Gravity::None {
            if let Some(v) = x {
                r.x = adjust(r.x, v, relx);
            }
        }
        if ygrav == Gravity::None {
            if let Some(v) = y {
                r.y = adjust(r.y, v, rely);
            }
        }
        if let Some(v) = w {
            r.w = adjust(r.w, v, relw);
        }
        if let Some(v) = h {
            r.h = adjust(r.h, v, relh);
        }
        wm.resize_hint(c, r, cur.1, true, false);
        if xgrav != Gravity::None || ygrav != Gravity::None {
            wm.gravitate(c, xgrav, ygrav, true);
        }
    } else if layout.supports_drag_resize() {
        if let Some(mut v) = w {
            if layout == LayoutKind::RTile {
                v = -v;
            }
            let tiled = wm.model.tiled(ws);
            let i = tiled.iter().position(|&t| t == c).unwrap_or(0);
            let (nmaster, nstack, msplit, ssplit, mon_ww) = {
                let wsr = wm.model.ws(ws);
                (
                    wsr.nmaster,
                    wsr.nstack,
                    wsr.msplit,
                    wsr.ssplit,
                    wm.model.monitors[wsr.mon].wr.w,
                )
            };
            let in_primary = nmaster > 0 && i < nmaster + nstack;
            let cur_split = if in_primary { msplit } else { ssplit };
            let f = if relw {
                (mon_ww as f32 * cur_split + v as f32) / mon_ww as f32
            } else {
                v as f32 / mon_ww as f32
            };
            if !(0.05..=0.95).contains(&f) {
                return Err(bad_command!("width exceeded limit: {}", mon_ww as f32 * f));
            }
            {
                let wsr = wm.model.ws_mut(ws);
                if in_primary {
                    wsr.msplit = f;
                } else {
                    wsr.ssplit = f;
                }
            }
            if h.is_none() {
                wm.layout_workspace(ws);
            }
        }
        if let Some(v) = h {
            let old_hoff = wm.model.client(c).map(|cl| cl.hoff).unwrap_or(0);
            if let Some(cl) = wm.model.client_mut(c) {
                cl.hoff = adjust(old_hoff, v, relh);
            }
            if wm.layout_workspace(ws) {
                let hoff = wm.model.client(c).map(|cl| cl.hoff).unwrap_or(0);
                if let Some(cl) = wm.model.client_mut(c) {
                    cl.hoff = old_hoff;
                }
                wm.layout_workspace(ws);
                return Err(bad_command!("height offset exceeded limit: {}", hoff));
            }
        }
    } else if layout == LayoutKind::Spiral || layout == LayoutKind::Dwindle {
        // The Fibonacci layouts only expose their first split.
        if let Some(v) = w {
            let (msplit, mon_ww) = {
                let wsr = wm.model.ws(ws);
                (wsr.msplit, wm.model.monitors[wsr.mon].wr.w)
            };
            let f = if relw {
                (mon_ww as f32 * msplit + v as f32) / mon_ww as f32
            } else {
                v as f32 / mon_ww as f32
            };
            if !(0.05..=0.95).contains(&f) {
                return Err(bad_command!("width exceeded limit: {}", mon_ww as f32 * f));
            }
            wm.model.ws_mut(ws).msplit = f;
            wm.layout_workspace(ws);
        }
    } else if x.is_some() || w.is_some() || h.is_some() {
        return Err(bad_command!(
            "unable to resize windows in {} layout",
            layout.name()
        ));
    }

    let _ = wm.x.drain_enter_notify();
    Ok(())
}

fn cmd_win_scratch<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    match args.peek() {
        Some("push") => {
            args.next();
            match wm.cmd_target {
                Some(c) => {
                    wm.scratch_push(c);
                    Ok(())
                }
                None => Err(bad_command!("no clients to scratch push")),
            }
        }
        Some("pop") => {
            args.next();
            match wm.model.scratch.clients.first().copied() {
                Some(c) => {
                    wm.scratch_pop(c);
                    Ok(())
                }
                None => Err(bad_command!("no scratch clients to pop")),
            }
        }
        Some(other) => Err(bad_command!(
            "invalid scratch command: {}\nexpected pop or push",
            other
        )),
        None => {
            let target = if wm.cmd_target_passed { wm.cmd_target } else { None };
            wm.scratch_toggle(target)
        }
    }
}

// ----- set ------------------------------------------------------------------

fn cmd_set<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    if args.exhausted() {
        return Err(bad_command!("set command requires additional arguments"));
    }

    let mut set_ws = wm.model.sel_ws;
    let mut names_changed = false;

    while let Some(tok) = args.next() {
        match tok {
            "ws" => {
                let v = args.value_for("ws")?;
                if v == "_" {
                    cmd_set_ws_defaults(wm, args)?;
                    set_ws = wm.model.sel_ws;
                } else {
                    set_ws = resolve_ws_target(wm, v, false)?;
                }
            }
            "mon" => {
                if !wm.model.cfg.static_ws {
                    return Err(bad_command!(
                        "unable to set workspace monitor without static_ws=true"
                    ));
                }
                let v = args.value_for("mon")?;
                let mi = wm.model.mon_by_reference(v).ok_or_else(|| {
                    bad_command!("invalid monitor index or name: {}", v)
                })?;
                wm.model.assign_workspace(set_ws, mi)?;
                let was_visible = wm.model.monitors[mi].ws == set_ws;
                wm.relocate_workspace(set_ws, wm.model.sel_mon(), was_visible);
            }
            "name" => {
                let v = args.value_for("name")?;
                if wm.model.ws(set_ws).name != v {
                    wm.model.ws_mut(set_ws).name = v.to_string();
                    names_changed = true;
                    wm.model.ws_change = true;
                }
            }
            "border" => cmd_set_border(wm, args)?,
            "gap" => {
                let max = workspace_dimension_limit(wm, set_ws);
                let (v, rel) = args.int_for("gap", true)?;
                let cur = wm.model.ws(set_ws).gap;
                let nv = adjust(cur, v, rel);
                if !(0..=max).contains(&nv) {
                    args.back();
                    return Err(invalid_value(
                        "gap",
                        args.next().unwrap_or_default(),
                        &format!("integer between 0 and {}", max),
                    ));
                }
                if nv != cur {
                    wm.model.ws_mut(set_ws).gap = nv;
                    wm.model.needs_refresh = true;
                }
            }
            "layout" => {
                let v = args.value_for("layout")?;
                let new = if v == "cycle" {
                    wm.model.ws(set_ws).layout.cycled()
                } else {
                    LayoutKind::from_str(v)?
                };
                if wm.model.ws(set_ws).layout != new {
                    wm.model.ws_mut(set_ws).layout = new;
                    wm.model.needs_refresh = true;
                    wm.model.layout_change = true;
                }
            }
            "master" | "stack" => {
                let (v, rel) = args.int_for(tok, true)?;
                let cur = if tok == "master" {
                    wm.model.ws(set_ws).nmaster
                } else {
                    wm.model.ws(set_ws).nstack
                } as i32;
                let nv = adjust(cur, v, rel).max(0) as usize;
                let ws = wm.model.ws_mut(set_ws);
                if tok == "master" {
                    ws.nmaster = nv;
                } else {
                    ws.nstack = nv;
                }
                wm.model.needs_refresh = true;
            }
            "mouse" => cmd_set_mouse(wm, args)?,
            "pad" => cmd_set_pad(wm, args, set_ws)?,
            "msplit" | "ssplit" => {
                let (v, rel) = args.float_for(tok)?;
                let cur = if tok == "msplit" {
                    wm.model.ws(set_ws).msplit
                } else {
                    wm.model.ws(set_ws).ssplit
                };
                let nv = adjust_split(cur, v, rel);
                if (nv - cur).abs() > f32::EPSILON {
                    let ws = wm.model.ws_mut(set_ws);
                    if tok == "msplit" {
                        ws.msplit = nv;
                    } else {
                        ws.ssplit = nv;
                    }
                    wm.model.needs_refresh = true;
                }
            }
            "numws" => {
                let (v, _) = args.int_clamped_for("numws", 1, MAX_WORKSPACES as i32)?;
                if v as usize > wm.model.cfg.num_ws {
                    wm.model.update_workspaces(v as usize)?;
                    wm.update_net_workspaces()?;
                }
            }
            "static_ws" => wm.model.cfg.static_ws = args.bool_for(tok)?,
            "focus_open" => wm.model.cfg.focus_open = args.bool_for(tok)?,
            "focus_urgent" => wm.model.cfg.focus_urgent = args.bool_for(tok)?,
            "focus_mouse" => wm.model.cfg.focus_mouse = args.bool_for(tok)?,
            "smart_border" => {
                wm.model.cfg.smart_border = args.bool_for(tok)?;
                wm.model.needs_refresh = true;
            }
            "smart_gap" => {
                wm.model.cfg.smart_gap = args.bool_for(tok)?;
                wm.model.needs_refresh = true;
            }
            "tile_hints" => {
                wm.model.cfg.tile_hints = args.bool_for(tok)?;
                wm.model.needs_refresh = true;
            }
            "tile_tohead" => wm.model.cfg.tile_to_head = args.bool_for(tok)?,
            "obey_motif" => {
                wm.model.cfg.obey_motif = args.bool_for(tok)?;
                wm.apply_motif_policy();
            }
            "win_minwh" => {
                let (v, _) = args.int_clamped_for(tok, 1, 10000)?;
                wm.model.cfg.min_wh = v;
                wm.model.needs_refresh = true;
            }
            "win_minxy" => {
                let (v, _) = args.int_clamped_for(tok, 1, 10000)?;
                wm.model.cfg.min_xy = v;
                wm.model.needs_refresh = true;
            }
            _ => {
                return Err(bad_command!("unknown setting: {}", tok));
            }
        }
    }

    if names_changed {
        wm.set_net_ws_names()?;
    }

    Ok(())
}

// One sixth of the workspace's usable height, the bound on gaps and border
// widths.
fn workspace_dimension_limit<X: XConn>(wm: &Wm<X>, ws: usize) -> i32 {
    let w = wm.model.ws(ws);
    let m = &wm.model.monitors[w.mon];

    (m.wr.h - w.pad_t - w.pad_b) / 6
}

fn cmd_set_border<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let mut any = false;

    while let Some(tok) = args.peek() {
        match tok {
            "w" | "width" => {
                args.next();
                let max = workspace_dimension_limit(wm, wm.model.sel_ws);
                let (v, rel) = args.int_for("border width", true)?;
                let old = wm.model.cfg.border.width;
                let nv = adjust(old, v, rel);
                if !(0..=max).contains(&nv) {
                    return Err(invalid_value(
                        "border width",
                        &nv.to_string(),
                        &format!("integer between 0 and {}", max),
                    ));
                }
                wm.model.cfg.border.width = nv;

                // Retile and repaint every client still on the old width.
                let ids: Vec<Xid> = wm
                    .model
                    .clients
                    .iter()
                    .filter(|(_, c)| !c.state.contains(ClientState::NOBORDER) && c.bw == old)
                    .map(|(id, _)| *id)
                    .collect();
                for id in ids {
                    if let Some(c) = wm.model.client_mut(id) {
                        c.set_border_width(nv);
                    }
                }
                wm.model.needs_refresh = true;
            }
            "colour" | "color" => {
                args.next();
                let mut first = true;
                while let Some(which) = args.peek() {
                    let target = match which {
                        "f" | "focus" => 0,
                        "u" | "urgent" => 1,
                        "r" | "unfocus" => 2,
                        _ if first => {
                            return Err(bad_command!(
                                "set border: invalid color value: {}",
                                which
                            ));
                        }
                        _ => break,
                    };
                    args.next();
                    first = false;
                    let c = args.color_for(which)?;
                    match target {
                        0 => wm.model.cfg.border.focus = c,
                        1 => wm.model.cfg.border.urgent = c,
                        _ => wm.model.cfg.border.unfocus = c,
                    }
                }
                let sel = wm.model.cur_client();
                for id in wm.model.clients.keys().copied().collect::<Vec<_>>() {
                    wm.client_border(id, sel == Some(id));
                }
            }
            _ => break,
        }
        any = true;
    }

    if !any {
        return Err(bad_command!("set border requires additional arguments"));
    }
    Ok(())
}

fn cmd_set_mouse<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let old = wm.model.cfg.mouse;

    while let Some(tok) = args.peek() {
        match tok {
            "mod" => {
                args.next();
                let v = args.value_for("mod")?;
                wm.model.cfg.mouse.modifier = match v {
                    "alt" | "mod1" => 1 << 3,
                    "super" | "mod4" => 1 << 6,
                    "ctrl" | "control" => 1 << 2,
                    _ => {
                        return Err(bad_command!("set mouse: invalid value for mod: {}", v));
                    }
                };
            }
            "move" | "resize" => {
                let which = args.next().expect("peeked");
                let v = args.value_for(which)?;
                let btn = match v {
                    "button1" => 1,
                    "button2" => 2,
                    "button3" => 3,
                    _ => {
                        return Err(bad_command!(
                            "set mouse: invalid value for {}: {}",
                            which,
                            v
                        ));
                    }
                };
                if which == "move" {
                    wm.model.cfg.mouse.move_button = btn;
                } else {
                    wm.model.cfg.mouse.resize_button = btn;
                }
            }
            _ => break,
        }
    }

    if wm.model.cfg.mouse != old {
        let mouse = wm.model.cfg.mouse;
        for id in wm.model.clients.keys().copied().collect::<Vec<_>>() {
            let _ = wm.x.grab_buttons(id, &mouse);
        }
    }

    Ok(())
}

fn cmd_set_pad<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>, set_ws: usize) -> Result<()> {
    let mut any = false;

    while let Some(tok) = args.peek() {
        let edge = match tok {
            "l" | "left" => 0,
            "r" | "right" => 1,
            "t" | "top" => 2,
            "b" | "bottom" => 3,
            _ => break,
        };
        args.next();
        any = true;

        let m = wm.model.monitors[wm.model.ws(set_ws).mon].r;
        let max = if edge < 2 { m.w / 6 } else { m.h / 6 };
        let (v, rel) = args.int_for("pad", true)?;
        let w = wm.model.ws_mut(set_ws);
        let cur = match edge {
            0 => w.pad_l,
            1 => w.pad_r,
            2 => w.pad_t,
            _ => w.pad_b,
        };
        let nv = adjust(cur, v, rel);
        if !(0..=max).contains(&nv) {
            return Err(invalid_value(
                "pad",
                &nv.to_string(),
                &format!("integer between 0 and {}", max),
            ));
        }
        match edge {
            0 => w.pad_l = nv,
            1 => w.pad_r = nv,
            2 => w.pad_t = nv,
            _ => w.pad_b = nv,
        }
        if nv != cur {
            wm.model.needs_refresh = true;
        }
    }

    if !any {
        return Err(bad_command!("set pad requires additional arguments"));
    }
    Ok(())
}

fn cmd_set_ws_defaults<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let mut def: WsDefaults = wm.model.cfg.ws_def.clone();
    let mut apply = false;

    while let Some(tok) = args.peek() {
        match tok {
            "apply" => {
                args.next();
                apply = true;
            }
            "layout" => {
                args.next();
                def.layout = LayoutKind::from_str(args.value_for("layout")?)?;
            }
            "master" | "stack" => {
                let which = args.next().expect("peeked");
                let (v, _) = args.int_clamped_for(which, 0, i32::MAX - 1)?;
                if which == "master" {
                    def.nmaster = v as usize;
                } else {
                    def.nstack = v as usize;
                }
            }
            "msplit" | "ssplit" => {
                let which = args.next().expect("peeked");
                let (v, _) = args.float_for(which)?;
                let v = v.clamp(0.05, 0.95);
                if which == "msplit" {
                    def.msplit = v;
                } else {
                    def.ssplit = v;
                }
            }
            "gap" => {
                args.next();
                let max = workspace_dimension_limit(wm, wm.model.sel_ws);
                let (v, _) = args.int_clamped_for("gap", 0, max)?;
                def.gap = v;
            }
            "pad" => {
                args.next();
                let mut pads = def.pad;
                while let Some(edge) = args.peek() {
                    let slot = match edge {
                        "l" | "left" => 0,
                        "r" | "right" => 1,
                        "t" | "top" => 2,
                        "b" | "bottom" => 3,
                        _ => break,
                    };
                    args.next();
                    let (v, _) = args.int_for("pad", true)?;
                    match slot {
                        0 => pads.0 = v.max(0),
                        1 => pads.1 = v.max(0),
                        2 => pads.2 = v.max(0),
                        _ => pads.3 = v.max(0),
                    }
                }
                def.pad = pads;
            }
            _ => break,
        }
    }

    wm.model.cfg.ws_def = def.clone();
    if apply {
        for num in 0..wm.model.workspaces.len() {
            let ws = &mut wm.model.workspaces[num];
            ws.layout = def.layout;
            ws.nmaster = def.nmaster;
            ws.nstack = def.nstack;
            ws.msplit = def.msplit;
            ws.ssplit = def.ssplit;
            ws.gap = def.gap;
            ws.pad_l = def.pad.0;
            ws.pad_r = def.pad.1;
            ws.pad_t = def.pad.2;
            ws.pad_b = def.pad.3;
        }
        wm.model.needs_refresh = true;
    }

    Ok(())
}

// ----- rule -----------------------------------------------------------------

fn cmd_rule<X: XConn>(wm: &mut Wm<X>, args: &mut Args<'_>) -> Result<()> {
    let mut r = Rule::default();
    let mut remove = false;
    let mut apply = false;
    let mut apply_all = false;

    while let Some(tok) = args.next() {
        match tok {
            "class" | "match_class" => {
                r.class = Some(Matcher::new(args.value_for("class")?)?);
            }
            "instance" | "match_instance" => {
                r.instance = Some(Matcher::new(args.value_for("instance")?)?);
            }
            "title" | "match_title" => {
                r.title = Some(Matcher::new(args.value_for("title")?)?);
            }
            "type" | "match_type" => {
                let v = args.value_for("type")?;
                r.win_type = Some(match v {
                    "dialog" => Atom::NetWindowTypeDialog.as_ref().to_string(),
                    "splash" => Atom::NetWindowTypeSplash.as_ref().to_string(),
                    _ => {
                        return Err(bad_command!("rule: invalid value for type: {}", v));
                    }
                });
            }
            "mon" => r.mon = Some(args.value_for("mon")?.to_string()),
            "ws" => {
                let v = args.value_for("ws")?;
                let ws = match v.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= wm.model.cfg.num_ws => n - 1,
                    _ => wm
                        .model
                        .workspaces
                        .iter()
                        .find(|w| w.name == v)
                        .map(|w| w.num)
                        .ok_or_else(|| bad_command!("rule: invalid value for ws: {}", v))?,
                };
                r.ws = Some(ws);
            }
            "callback" => {
                let v = args.value_for("callback")?;
                if !CALLBACK_NAMES.contains(&v) {
                    return Err(bad_command!("rule: invalid value for callback: {}", v));
                }
                r.cb = Some(v.to_string());
            }
            "x" => {
                let v = args.value_for("x")?;
                (r.x, _, r.xgrav) = parse_coord(v, true)?;
            }
            "y" => {
                let v = args.value_for("y")?;
                (r.y, _, r.ygrav) = parse_coord(v, false)?;
            }
            "w" | "width" => r.w = Some(args.int_for("w", false)?.0),
            "h" | "height" => r.h = Some(args.int_for("h", false)?.0),
            "bw" | "border_width" => {
                let max = wm
                    .model
                    .primary
                    .map(|p| wm.model.monitors[p].r.h / 6)
                    .unwrap_or(i32::MAX);
                let (v, _) = args.int_clamped_for("bw", 0, max)?;
                r.bw = Some(v);
                if v == 0 && wm.model.cfg.border.width != 0 {
                    r.state |= ClientState::NOBORDER;
                } else {
                    r.state -= ClientState::NOBORDER;
                }
            }
            "float" => set_rule_state(&mut r, ClientState::FLOATING, args)?,
            "full" => set_rule_state(&mut r, ClientState::FULLSCREEN, args)?,
            "fakefull" => set_rule_state(&mut r, ClientState::FAKEFULL, args)?,
            "stick" => {
                set_rule_state(&mut r, ClientState::STICKY | ClientState::FLOATING, args)?
            }
            "ignore_cfg" => set_rule_state(&mut r, ClientState::IGNORECFG, args)?,
            "ignore_msg" => set_rule_state(&mut r, ClientState::IGNOREMSG, args)?,
            "terminal" => set_rule_state(&mut r, ClientState::TERMINAL, args)?,
            "no_absorb" => set_rule_state(&mut r, ClientState::NOABSORB, args)?,
            "scratch" => set_rule_state(&mut r, ClientState::SCRATCH, args)?,
            "focus" => r.focus = args.bool_for("focus")?,
            "apply" => {
                apply = true;
                if args.peek() == Some("*") {
                    args.next();
                    apply_all = true;
                }
            }
            "remove" => {
                remove = true;
                if args.peek() == Some("*") {
                    args.next();
                    wm.rules.clear();
                    return Ok(());
                }
            }
            _ => {
                return Err(bad_command!("rule: invalid value for rule: {}", tok));
            }
        }
    }

    if apply_all {
        rules_apply_all(wm);
        return Ok(());
    }

    let has_match =
        r.class.is_some() || r.instance.is_some() || r.title.is_some() || r.win_type.is_some();
    let has_action = r.ws.is_some()
        || r.mon.is_some()
        || r.focus
        || r.cb.is_some()
        || r.state != ClientState::empty()
        || [r.x, r.y, r.w, r.h, r.bw].iter().any(Option::is_some)
        || r.xgrav != Gravity::None
        || r.ygrav != Gravity::None;

    if has_match && remove {
        wm.rules.remove(&r);
    } else if has_match && has_action {
        wm.rules.insert(r.clone());
        if apply {
            rules_apply_one(wm, &r);
        }
    } else {
        return Err(bad_command!(
            "rule requires at least one match and one action field"
        ));
    }

    Ok(())
}

fn set_rule_state(r: &mut Rule, s: ClientState, args: &mut Args<'_>) -> Result<()> {
    if args.bool_for("rule state")? {
        r.state |= s;
    } else {
        r.state -= s;
    }

    Ok(())
}

fn rules_apply_one<X: XConn>(wm: &mut Wm<X>, r: &Rule) {
    for id in wm.model.clients.keys().copied().collect::<Vec<_>>() {
        wm.apply_client_rules(id, Some(r), false);
        if let Some(cb) = wm.model.client(id).and_then(|c| c.cb.clone()) {
            wm.run_callback(&cb, id, false);
        }
    }
    wm.model.needs_refresh = true;
}

fn rules_apply_all<X: XConn>(wm: &mut Wm<X>) {
    for id in wm.model.clients.keys().copied().collect::<Vec<_>>() {
        wm.apply_client_rules(id, None, false);
        if let Some(cb) = wm.model.client(id).and_then(|c| c.cb.clone()) {
            wm.run_callback(&cb, id, false);
        }
    }
    wm.model.needs_refresh = true;
}

// ----- status ---------------------------------------------------------------

fn cmd_status(args: &mut Args<'_>) -> Result<Outcome> {
    let mut ty = StatusType::Bar;
    let mut num = 0usize;

    while let Some(tok) = args.next() {
        match tok {
            "type" => ty = StatusType::from_str(args.value_for("type")?)?,
            "num" => {
                let (v, _) = args.int_clamped_for("num", 0, i32::MAX - 1)?;
                num = v as usize;
            }
            _ => {
                return Err(bad_command!(
                    "status: invalid or missing value for type: {}",
                    tok
                ))
            }
        }
    }

    Ok(Outcome::Subscribe { ty, num })
}
