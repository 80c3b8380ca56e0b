//! Workspace viewing, sending and the tiled-stack reordering commands.
use crate::{
    core::Wm,
    pure::{client::ClientState, geometry::Point},
    x::{Atom, ClientConfig, Prop, WmState, XConn},
};
use std::str::FromStr;
use tracing::debug;

/// Relative targets accepted wherever a workspace or monitor is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The next workspace/monitor, wrapping
    Next,
    /// The previous workspace/monitor, wrapping
    Prev,
    /// The previously selected workspace/monitor
    Last,
    /// The next non-empty workspace
    NextNonEmpty,
    /// The previous non-empty workspace
    PrevNonEmpty,
}

impl Direction {
    /// All direction names in match order.
    pub const NAMES: [&'static str; 5] = ["next", "prev", "last", "nextne", "prevne"];
}

impl FromStr for Direction {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "last" => Ok(Self::Last),
            "nextne" => Ok(Self::NextNonEmpty),
            "prevne" => Ok(Self::PrevNonEmpty),
            _ => Err(bad_command!("invalid direction: {}", s)),
        }
    }
}

impl<X: XConn> Wm<X> {
    /// Make `ws` the selected workspace, swapping it onto the current
    /// monitor when `swap` is set, warping the pointer when crossing
    /// monitors with `warp`.
    pub fn change_workspace(&mut self, ws: usize, swap: bool, warp: bool) {
        if ws == self.model.sel_ws || ws >= self.model.workspaces.len() {
            return;
        }

        let sel = self.model.sel_ws;
        let sel_mon = self.model.sel_mon();
        let target_mon = self.model.ws(ws).mon;
        let do_warp = !swap && warp && sel_mon != target_mon;
        let was_visible = self.model.monitors[target_mon].ws == ws;
        let hide_ws = self.model.monitors[target_mon].ws;
        debug!(prev = sel, next = ws, swap, "changing workspace");

        self.model.last_ws = sel;
        if let Some(prev) = self.model.ws(sel).sel {
            self.unfocus(Some(prev), true);
        }

        if swap && sel_mon != target_mon {
            self.model.ws_mut(sel).mon = target_mon;
            if self.model.monitors[target_mon].ws == ws {
                self.model.monitors[target_mon].ws = sel;
            }
            self.model.ws_mut(ws).mon = sel_mon;
            self.model.monitors[sel_mon].ws = ws;
            let _ = self.update_net_workspaces();
            self.relocate_workspace(ws, target_mon, was_visible);
            let last = self.model.last_ws;
            if self.model.monitors[self.model.ws(last).mon].ws == last {
                self.relocate_workspace(last, sel_mon, true);
            }
        }

        self.model.sel_ws = ws;
        let new_mon = self.model.ws(ws).mon;
        self.model.monitors[new_mon].ws = ws;
        self.show_hide(ws);

        if do_warp {
            let sel = self.model.ws(ws).sel;
            let mid = self.model.monitors[new_mon].r.midpoint();
            self.warp_to(sel, mid);
            self.show_hide(hide_ws);
        } else {
            let last = self.model.last_ws;
            self.show_hide(last);
        }

        let _ = self.x.set_prop(
            self.x.root(),
            Atom::NetCurrentDesktop.as_ref(),
            Prop::Cardinal(vec![ws as u32]),
        );
        self.model.needs_refresh = true;
        self.model.ws_change = true;
    }

    /// `ws view N`: see the workspace, swapping in dynamic mode.
    pub fn view_workspace(&mut self, ws: usize) {
        let static_ws = self.model.cfg.static_ws;
        let use_mon = self.cmd_use_mon;
        let cross = static_ws && self.model.sel_mon() != self.model.ws(ws).mon;

        self.change_workspace(ws, !static_ws && !use_mon, use_mon || cross);
    }

    /// `ws send N`: move the command's client to another workspace.
    pub fn send_to_workspace(&mut self, ws: usize) {
        let c = match self.cmd_target {
            Some(c) => c,
            None => return,
        };
        if self.model.client(c).map(|cl| cl.ws) == Some(ws) {
            return;
        }
        debug!(client = %c, target = ws, "sending client");

        let old_mon = self
            .model
            .client(c)
            .map(|cl| self.model.ws(cl.ws).mon)
            .unwrap_or_else(|| self.model.sel_mon());
        let was_sel = self
            .model
            .client(c)
            .map(|cl| self.model.ws(cl.ws).sel == Some(c))
            .unwrap_or(false);

        self.unfocus(Some(c), true);
        self.model.set_workspace(c, ws, !was_sel);
        let _ = self.x.set_prop(
            c,
            Atom::NetWmDesktop.as_ref(),
            Prop::Cardinal(vec![ws as u32]),
        );

        let new_mon = self.model.ws(ws).mon;
        if new_mon != old_mon && self.model.monitors[new_mon].ws == ws {
            self.relocate_client(c, new_mon, old_mon);
        }
        let floating = self
            .model
            .client(c)
            .map(|cl| self.model.floating(cl))
            .unwrap_or(false);
        if floating {
            let (geom, bw) = {
                let cl = &self.model.clients[&c];
                (cl.geom, cl.bw)
            };
            let _ = self.x.set_client_config(
                c,
                &[ClientConfig::Position(geom), ClientConfig::BorderPx(bw)],
            );
        }

        self.show_hide(ws);
        let sel = self.model.sel_ws;
        self.show_hide(sel);
        self.model.needs_refresh = true;
        self.model.ws_change = true;
        self.model.win_change = true;
    }

    /// `ws follow N`: send then view.
    pub fn follow_to_workspace(&mut self, ws: usize) {
        if self.cmd_target.is_some() {
            self.send_to_workspace(ws);
            self.view_workspace(ws);
        }
    }

    /// Move every client of `ws` on or off screen according to current
    /// visibility, in focus-stack order.
    pub fn show_hide(&mut self, ws: usize) {
        let stack = self.model.ws(ws).stack.clone();

        for id in stack {
            let (visible, sticky, geom, bw, full_w, fullscreen, floating) =
                match self.model.client(id) {
                    Some(c) => (
                        self.model.visible(c),
                        c.state.contains(ClientState::STICKY),
                        c.geom,
                        c.bw,
                        c.full_w(),
                        c.real_fullscreen(),
                        self.model.floating(c),
                    ),
                    None => continue,
                };

            if visible {
                let _ = self.x.set_wm_state(id, WmState::Normal);
                let (mon_r, _) = self.client_mon_rects(id);
                if fullscreen {
                    let _ = self.x.set_client_config(
                        id,
                        &[ClientConfig::Position(mon_r), ClientConfig::BorderPx(0)],
                    );
                } else if floating {
                    self.resize(id, geom, bw);
                } else {
                    let is_mono = self
                        .model
                        .client(id)
                        .map(|c| self.model.ws(c.ws).layout)
                        == Some(crate::layout::LayoutKind::Mono);
                    let is_sel = self
                        .model
                        .client(id)
                        .map(|c| self.model.ws(c.ws).sel == Some(id))
                        .unwrap_or(false);
                    if is_sel || !is_mono {
                        let _ = self.x.set_client_config(
                            id,
                            &[ClientConfig::Move(Point::new(geom.x, geom.y))],
                        );
                    }
                }
            } else if !sticky {
                let _ = self.x.set_wm_state(id, WmState::Iconic);
                let _ = self.x.set_client_config(
                    id,
                    &[ClientConfig::Move((-2 * full_w, geom.y).into())],
                );
            } else {
                // A sticky client on the selected monitor rides along to the
                // newly selected workspace.
                let c_ws = self.model.client(id).map(|c| c.ws);
                if c_ws != Some(self.model.sel_ws)
                    && c_ws.map(|w| self.model.ws(w).mon) == Some(self.model.sel_mon())
                {
                    let keep = self.model.cur_client().or(Some(id));
                    let sel = self.model.sel_ws;
                    self.set_client_workspace(id, sel, false);
                    self.focus(keep);
                }
            }
        }
    }

    // ----- tiled stack reordering ------------------------------------------

    /// Move the command's client through the tiled list by `n` positions.
    pub fn move_in_stack(&mut self, n: i32) {
        let c = match self.cmd_target {
            Some(c) => c,
            None => return,
        };
        let ws = match self.model.client(c) {
            Some(cl) => cl.ws,
            None => return,
        };
        let tiled = self.model.tiled(ws);
        if tiled.len() < 2 || !tiled.contains(&c) {
            return;
        }

        let mut steps = n;
        while steps != 0 {
            let tiled = self.model.tiled(ws);
            let pos = match tiled.iter().position(|&t| t == c) {
                Some(p) => p,
                None => break,
            };
            let target = if steps > 0 {
                tiled.get(pos + 1).copied()
            } else if pos > 0 {
                tiled.get(pos - 1).copied()
            } else {
                None
            };

            let list = &mut self.model.ws_mut(ws).clients;
            list.retain(|&id| id != c);
            match target {
                Some(t) => {
                    let ti = list.iter().position(|&id| id == t).expect("target on list");
                    if steps > 0 {
                        list.insert(ti + 1, c);
                    } else {
                        list.insert(ti, c);
                    }
                }
                // Walked off either end: wrap to the other.
                None if steps > 0 => list.insert(0, c),
                None => list.push(c),
            }
            steps += if steps > 0 { -1 } else { 1 };
        }

        self.model.needs_refresh = true;
    }

    /// `win cycle`: rotate the tiled clients, keeping focus on the head.
    pub fn cycle_clients(&mut self) -> crate::Result<()> {
        let c = match self.cmd_target {
            Some(c) => c,
            None => return Ok(()),
        };
        let (ws, floating, fullscreen) = match self.model.client(c) {
            Some(cl) => (cl.ws, self.model.floating(cl), cl.real_fullscreen()),
            None => return Ok(()),
        };

        if floating || fullscreen || self.model.tile_count(ws) <= 1 {
            return Err(bad_command!(
                "unable to cycle floating, fullscreen, or single tiled windows"
            ));
        }

        let tiled = self.model.tiled(ws);
        let first = tiled[0];
        let sel = self.model.ws(ws).sel.unwrap_or(first);
        let next = tiled
            .iter()
            .position(|&t| t == sel)
            .and_then(|p| tiled.get(p + 1).copied())
            .unwrap_or(first);

        self.focus(Some(first));
        self.move_in_stack(-1);
        self.focus(Some(next));

        Ok(())
    }

    /// `win swap`: exchange the command's client with the master (or, when
    /// it already is the master, with the last client swapped out).
    pub fn swap_with_master(&mut self) -> crate::Result<()> {
        let c = match self.cmd_target {
            Some(c) => c,
            None => return Ok(()),
        };
        let (ws, floating, fullscreen) = match self.model.client(c) {
            Some(cl) => (cl.ws, self.model.floating(cl), cl.real_fullscreen()),
            None => return Ok(()),
        };

        if floating || fullscreen || self.model.tile_count(ws) <= 1 {
            return Err(bad_command!(
                "unable to swap floating, fullscreen, or single tiled windows"
            ));
        }

        let tiled = self.model.tiled(ws);
        let first = tiled[0];
        let target = if c == first { tiled[1] } else { c };

        let list = &mut self.model.ws_mut(ws).clients;
        list.retain(|&id| id != target);
        list.insert(0, target);

        self.model.needs_refresh = true;
        Ok(())
    }

    /// `win focus DIR|N`: walk the client list relative to the selection.
    pub fn focus_direction(&mut self, n: i32) {
        let ws = self.model.sel_ws;
        let clients = self.model.ws(ws).clients.clone();
        if clients.len() < 2 {
            return;
        }
        let mut sel = match self.model.ws(ws).sel {
            Some(s) => s,
            None => return,
        };

        let mut steps = n;
        while steps != 0 {
            let pos = match clients.iter().position(|&c| c == sel) {
                Some(p) => p,
                None => return,
            };
            sel = if steps > 0 {
                clients[(pos + 1) % clients.len()]
            } else {
                clients[(pos + clients.len() - 1) % clients.len()]
            };
            steps += if steps > 0 { -1 } else { 1 };
        }

        self.focus(Some(sel));
        let floating = self
            .model
            .client(sel)
            .map(|c| self.model.floating(c))
            .unwrap_or(false);
        if floating {
            let _ = self.x.set_client_config(sel, &[ClientConfig::StackAbove]);
        }
    }
}
