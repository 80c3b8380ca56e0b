//! Managing clients: adoption, rule application, state toggles and removal.
use crate::{
    absorb,
    core::Wm,
    pure::{
        client::{Client, ClientState},
        geometry::{Gravity, Rect},
        model::{MAX_WORKSPACES, SCRATCH_WS},
        monitor::{Desk, Panel},
    },
    rules::{MatchSubject, Rule},
    x::{Atom, ClientAttr, ClientConfig, Prop, WmState, XConn, XConnExt},
    Xid,
};
use tracing::{debug, trace, warn};

impl<X: XConn> Wm<X> {
    /// Adopt a window: panels and desks by `_NET_WM_WINDOW_TYPE`, everything
    /// else that is not override-redirect becomes a client. `scan` marks the
    /// startup pass, which skips unmapped ordinary windows.
    pub fn manage(&mut self, win: Xid, scan: bool) {
        if self.model.clients.contains_key(&win)
            || self.model.panels.iter().any(|p| p.win == win)
            || self.model.desks.iter().any(|d| d.win == win)
        {
            return;
        }
        let attrs = match self.x.window_attributes(win) {
            Ok(a) => a,
            Err(_) => return,
        };
        let geom = match self.x.window_geometry(win) {
            Ok(g) => g,
            Err(_) => return,
        };
        debug!(%win, ?geom, "managing window");

        let types = self.x.window_types(win);
        let is = |a: Atom| types.iter().any(|t| t == a.as_ref());

        if is(Atom::NetWindowTypeDock) {
            self.init_panel(win, geom);
            let _ = self.x.set_wm_state(win, WmState::Normal);
        } else if is(Atom::NetWindowTypeDesktop) {
            self.init_desk(win, geom);
            let _ = self.x.set_wm_state(win, WmState::Normal);
        } else if !attrs.override_redirect {
            if scan && !attrs.viewable {
                return;
            }
            self.init_client(win, geom);
            let _ = self.update_net_client_list();
        } else {
            return;
        }

        self.refresh();
    }

    fn init_client(&mut self, win: Xid, geom: Rect) {
        let bw = self.model.cfg.border.width;
        let mut c = Client::new(win, geom, bw);
        c.state = ClientState::NEEDSMAP;
        c.pid = self.x.window_pid(win).unwrap_or(0);
        c.trans = self
            .x
            .transient_for(win)
            .filter(|t| self.model.clients.contains_key(t));
        let (class, instance) = self.x.window_class(win);
        c.class = class;
        c.instance = instance;
        c.title = self.x.window_title(win);

        if self.x.motif_requests_no_border(win) {
            c.motif_no_border = true;
            if self.model.cfg.obey_motif {
                c.set_border_width(0);
            }
        }

        trace!(%win, class = %c.class, title = %c.title, "new client");
        self.model.add_client(c);

        // Rules pick the workspace and seed the initial state; the EWMH
        // state and type have the last word on fullscreen / floating.
        self.apply_client_rules(win, None, !self.model.cfg.focus_open);
        self.read_net_state(win);
        self.refresh_window_type(win);
        self.refresh_wm_hints(win);
        self.fetch_size_hints_if_needed(win);
        let _ = self.x.grab_buttons(win, &self.model.cfg.mouse);

        let term = match self.model.client(win) {
            Some(c) if c.trans.is_none() && absorb::absorbable(&self.model, win) => {
                absorb::find_terminal_for(&self.model, c.pid)
            }
            _ => None,
        };

        self.place_floating_client(win);

        if let Some(cb) = self.model.client(win).and_then(|c| c.cb.clone()) {
            self.run_callback(&cb, win, false);
        }
        let _ = self.x.set_client_attributes(win, &[ClientAttr::ClientEventMask]);

        let same_ws = term
            .and_then(|t| self.model.client(t))
            .map(|t| Some(t.ws) == self.model.client(win).map(|c| c.ws))
            .unwrap_or(false);
        if let (Some(term), true) = (term, same_ws) {
            if let Some(unmap) = absorb::absorb(&mut self.model, term, win) {
                self.win_unmap(unmap);
                self.refresh_client_identity(win);
            }
        } else if matches!(
            self.model.client(win),
            Some(c) if c.state.contains(ClientState::SCRATCH) && !c.real_fullscreen()
        ) {
            self.scratch_push(win);
        }

        self.model.ws_change = true;
    }

    // Initial placement for clients that start out floating: clamp to the
    // monitor, center on the transient parent, and take a quadrant slot when
    // the client gave no position of its own.
    fn place_floating_client(&mut self, win: Xid) {
        let (mon_r, wr) = self.client_mon_rects(win);
        let min_wh = self.model.cfg.min_wh;

        let parent = match self.model.client(win) {
            Some(c)
                if !c.real_fullscreen()
                    && (self.model.floating(c) || c.state.contains(ClientState::FIXED)) =>
            {
                c.trans.and_then(|t| self.model.client(t)).map(|t| t.frame_rect())
            }
            _ => return,
        };

        let (mut w, mut h, fixed, bw) = {
            let c = self.model.client(win).expect("checked above");
            (c.geom.w, c.geom.h, c.state.contains(ClientState::FIXED), c.bw)
        };
        if !fixed {
            w = w.max(min_wh).min(wr.w);
            h = h.max(min_wh).min(wr.h);
        }

        let (mut x, mut y) = {
            let c = self.model.client(win).expect("checked above");
            (c.geom.x, c.geom.y)
        };
        if let Some(p) = parent {
            x = p.x + (p.w - (w + 2 * bw)) / 2;
            y = p.y + (p.h - (h + 2 * bw)) / 2;
        }
        x = x.max(mon_r.x).min(mon_r.right() - (w + 2 * bw));
        y = y.max(mon_r.y).min(mon_r.bottom() - (h + 2 * bw));

        if (x, y) == (mon_r.x, mon_r.y) {
            let ws = self.model.client(win).map(|c| c.ws).unwrap_or(SCRATCH_WS);
            let p = self.model.next_quadrant(ws, w, h, bw);
            x = p.x;
            y = p.y;
        }

        if let Some(c) = self.model.client_mut(win) {
            c.geom = Rect::new(x, y, w, h);
        }
    }

    fn init_panel(&mut self, win: Xid, geom: Rect) {
        let (class, instance) = self.x.window_class(win);
        let strut = self.x.strut(win);
        let mon = self
            .model
            .coord_to_mon(geom.midpoint())
            .unwrap_or_else(|| self.model.sel_mon());

        debug!(%win, %class, "managing panel");
        self.model.panels.push(Panel {
            win,
            r: geom,
            strut,
            mon,
            class,
            instance,
        });
        self.model.update_struts();
        let _ = self.update_net_workspaces();
        let _ = self.x.map(win);
        let _ = self.x.set_client_attributes(win, &[ClientAttr::ClientEventMask]);
    }

    fn init_desk(&mut self, win: Xid, geom: Rect) {
        let (class, instance) = self.x.window_class(win);
        let mon = self
            .model
            .coord_to_mon(geom.midpoint())
            .unwrap_or_else(|| self.model.sel_mon());

        debug!(%win, %class, "managing desktop window");
        self.model.desks.push(Desk {
            win,
            mon,
            class,
            instance,
        });
        let r = self.model.monitors[mon].r;
        let _ = self
            .x
            .set_client_config(win, &[ClientConfig::Position(r), ClientConfig::StackBelow]);
        let _ = self.x.map(win);
        self.model.needs_refresh = true;
    }

    /// Remove all record of a window. `destroyed` is set when the window is
    /// already gone from the server, so no courtesy cleanup is possible.
    pub fn unmanage(&mut self, win: Xid, destroyed: bool) {
        // The window may be the hidden half of an absorption.
        let win = match absorb::absorbing_client(&self.model, win) {
            Some(holder) if holder != win => {
                // The terminal's own (hidden) window went away: drop the
                // orphaned record quietly.
                if let Some(c) = self.model.client_mut(holder) {
                    c.absorbed = None;
                }
                return;
            }
            _ => win,
        };

        if self.model.clients.contains_key(&win) {
            let absorbed = self
                .model
                .client(win)
                .map(|c| c.absorbed.is_some())
                .unwrap_or(false);
            if absorbed {
                // The absorbed child closed: the terminal takes its window
                // slot back.
                if let Some(remapped) = absorb::desorb(&mut self.model, win) {
                    self.refresh_client_identity(remapped);
                    self.model.needs_refresh = true;
                    self.refresh();
                }
                return;
            }

            debug!(%win, "unmanaging client");
            if let Some(cb) = self.model.client(win).and_then(|c| c.cb.clone()) {
                if self.running {
                    self.run_callback(&cb, win, true);
                }
            }
            let old_bw = self.model.client(win).map(|c| c.old_bw).unwrap_or(0);
            self.model.remove_client(win);
            self.model.ws_change = true;

            if !destroyed {
                let _ = self.x.set_client_config(win, &[ClientConfig::BorderPx(old_bw)]);
                if self.running {
                    let _ = self.x.delete_prop(win, Atom::NetWmState.as_ref());
                    let _ = self.x.delete_prop(win, Atom::NetWmDesktop.as_ref());
                }
                let _ = self.x.set_wm_state(win, WmState::Withdrawn);
            }
        } else if let Some(i) = self.model.panels.iter().position(|p| p.win == win) {
            debug!(%win, "unmanaging panel");
            self.model.panels.remove(i);
            self.model.update_struts();
            let _ = self.update_net_workspaces();
        } else if let Some(i) = self.model.desks.iter().position(|d| d.win == win) {
            debug!(%win, "unmanaging desktop window");
            self.model.desks.remove(i);
        } else {
            return;
        }

        let _ = self.update_net_client_list();
        self.refresh();
    }

    // ----- rules -----------------------------------------------------------

    /// Match a client against the rule list (or one specific rule) and apply
    /// the first hit, falling back to the default rule.
    pub fn apply_client_rules(&mut self, win: Xid, only: Option<&Rule>, nofocus: bool) {
        let (class, instance, title, trans_ws) = match self.model.client(win) {
            Some(c) => (
                c.class.clone(),
                c.instance.clone(),
                c.title.clone(),
                c.trans.and_then(|t| self.model.client(t)).map(|t| t.ws),
            ),
            None => return,
        };

        // The workspace hint only counts when the client is not transient.
        let cur_ws = trans_ws.unwrap_or_else(|| {
            match self.x.get_prop(win, Atom::NetWmDesktop.as_ref()) {
                Ok(Some(Prop::Cardinal(v))) if !v.is_empty() && (v[0] as usize) <= MAX_WORKSPACES => {
                    v[0] as usize
                }
                _ => self.model.sel_ws,
            }
        });
        let win_types = self.x.window_types(win);
        let subject = MatchSubject {
            class: &class,
            instance: &instance,
            title: &title,
            win_types: &win_types,
        };

        let rule = match only {
            Some(r) => r.matches(subject).then(|| r.clone()),
            None => self.rules.first_match(subject).cloned(),
        };

        self.apply_rule(win, rule.as_ref(), cur_ws, trans_ws.is_some(), nofocus);
    }

    fn apply_rule(
        &mut self,
        win: Xid,
        rule: Option<&Rule>,
        cur_ws: usize,
        transient: bool,
        nofocus: bool,
    ) {
        let mut ws = cur_ws;
        let mut do_focus = false;
        let mut xgrav = Gravity::None;
        let mut ygrav = Gravity::None;
        let mut fullscreen = false;

        if let Some(r) = rule {
            trace!(%win, "applying rule");
            do_focus = r.focus;
            xgrav = r.xgrav;
            ygrav = r.ygrav;
            fullscreen = r.state.contains(ClientState::FULLSCREEN);

            if let Some(c) = self.model.client_mut(win) {
                c.cb = r.cb.clone();
                c.state |= r.state;
                if let Some(x) = r.x {
                    c.geom.x = x;
                }
                if let Some(y) = r.y {
                    c.geom.y = y;
                }
                if let Some(w) = r.w {
                    c.geom.w = w;
                }
                if let Some(h) = r.h {
                    c.geom.h = h;
                }
                if let Some(bw) = r.bw {
                    // A zero override carries NOBORDER with it; nonzero
                    // overrides never re-border a borderless client.
                    if bw == 0 || !c.state.contains(ClientState::NOBORDER) {
                        c.set_border_width(bw);
                    }
                }
            }

            if !transient && ws == cur_ws {
                if let Some(mon) = &r.mon {
                    if let Some(mi) = self.model.mon_by_reference(mon) {
                        ws = self.model.monitors[mi].ws;
                    }
                } else if let Some(target) = r.ws {
                    if target < self.model.cfg.num_ws {
                        ws = target;
                    }
                }
            }
        }

        if ws + 1 > self.model.cfg.num_ws && ws < MAX_WORKSPACES {
            if let Err(e) = self.model.update_workspaces(ws + 1) {
                warn!(%e, "unable to grow workspaces for rule target");
            }
        }
        let ws = ws.min(self.model.cfg.num_ws.saturating_sub(1));
        self.set_client_workspace(win, ws, nofocus);

        if !do_focus && nofocus && !self.model.cfg.focus_urgent {
            self.set_urgent(win, true);
            self.client_border(win, false);
        }
        if do_focus && ws != self.model.sel_ws {
            self.view_workspace(ws);
        }

        if fullscreen {
            if let Some(c) = self.model.client_mut(win) {
                c.state -= ClientState::FULLSCREEN;
            }
            self.set_fullscreen(win, true);
        } else if xgrav != Gravity::None || ygrav != Gravity::None {
            self.gravitate(win, xgrav, ygrav, true);
        }
    }

    /// Move a client between workspaces and mirror `_NET_WM_DESKTOP`.
    pub fn set_client_workspace(&mut self, win: Xid, ws: usize, stack_tail: bool) {
        if !self.model.clients.contains_key(&win) {
            return;
        }
        if self.model.client(win).map(|c| c.ws) == Some(ws)
            && self.model.ws(ws).contains(win)
        {
            return;
        }

        // New clients are not on any list yet; set_workspace handles both.
        if self.model.ws(self.model.client(win).map(|c| c.ws).unwrap_or(ws)).contains(win) {
            self.model.set_workspace(win, ws, stack_tail);
        } else {
            if let Some(c) = self.model.client_mut(win) {
                c.ws = ws;
            }
            let to_head = self.model.cfg.tile_to_head;
            self.model.attach(win, to_head);
            self.model.ws_mut(ws).attach_stack(win, stack_tail);
        }

        if ws != SCRATCH_WS {
            let _ = self.x.set_prop(
                win,
                Atom::NetWmDesktop.as_ref(),
                Prop::Cardinal(vec![ws as u32]),
            );
        }
        self.model.win_change = true;
    }

    // ----- property refreshers ---------------------------------------------

    /// Re-read WM_HINTS: urgency (cleared for the focused client) and input.
    pub fn refresh_wm_hints(&mut self, win: Xid) {
        let hints = self.x.wm_hints(win);
        let selected = self.model.cur_client() == Some(win);

        if selected && hints.urgent {
            let mut cleared = hints;
            cleared.urgent = false;
            let _ = self
                .x
                .set_prop(win, Atom::WmHints.as_ref(), Prop::WmHints(cleared));
        } else if let Some(c) = self.model.client_mut(win) {
            if hints.urgent {
                c.state |= ClientState::URGENT;
            }
            if !hints.accepts_input {
                c.state |= ClientState::NOINPUT;
            }
        }
    }

    /// Re-read the window type and transient state, possibly flipping the
    /// client to floating.
    pub fn refresh_window_type(&mut self, win: Xid) {
        let types = self.x.window_types(win);
        let auto_float = types.iter().any(|t| {
            t == Atom::NetWindowTypeDialog.as_ref() || t == Atom::NetWindowTypeSplash.as_ref()
        });
        let trans = self
            .x
            .transient_for(win)
            .filter(|t| self.model.clients.contains_key(t));

        if let Some(c) = self.model.client_mut(win) {
            if trans.is_some() {
                c.trans = trans;
            }
            if auto_float || c.trans.is_some() {
                c.state |= ClientState::FLOATING;
            }
        }
    }

    /// Read `_NET_WM_STATE` set before mapping (fullscreen / above).
    fn read_net_state(&mut self, win: Xid) {
        if let Ok(Some(Prop::Atoms(atoms))) = self.x.get_prop(win, Atom::NetWmState.as_ref()) {
            for a in atoms {
                if a == Atom::NetWmStateFullscreen.as_ref() {
                    self.set_fullscreen(win, true);
                } else if a == Atom::NetWmStateAbove.as_ref() {
                    if let Some(c) = self.model.client_mut(win) {
                        c.state |= ClientState::ABOVE | ClientState::FLOATING;
                    }
                }
            }
        }
    }

    /// Re-read title, class and pid after an absorption swapped window ids.
    pub(crate) fn refresh_client_identity(&mut self, win: Xid) {
        let title = self.x.window_title(win);
        let (class, instance) = self.x.window_class(win);
        let pid = self.x.window_pid(win).unwrap_or(0);

        if let Some(c) = self.model.client_mut(win) {
            c.title = title;
            c.class = class;
            c.instance = instance;
            c.pid = pid;
        }
    }

    /// Re-read the title, reporting whether it changed.
    pub fn refresh_title(&mut self, win: Xid) -> bool {
        let title = self.x.window_title(win);
        match self.model.client_mut(win) {
            Some(c) if c.title != title => {
                c.title = title;
                true
            }
            _ => false,
        }
    }

    /// Re-apply the motif border policy to every client that asked for no
    /// decoration, after `obey_motif` was toggled.
    pub fn apply_motif_policy(&mut self) {
        let obey = self.model.cfg.obey_motif;
        let bw = self.model.cfg.border.width;
        let ids: Vec<Xid> = self
            .model
            .clients
            .iter()
            .filter(|(_, c)| c.motif_no_border)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let focused = self.model.cur_client() == Some(id);
            if let Some(c) = self.model.client_mut(id) {
                c.set_border_width(if obey { 0 } else { bw });
            }
            self.client_border(id, focused);
        }
    }

    // ----- state toggles ----------------------------------------------------

    /// Toggle (or set) the floating state of a client, restoring the saved
    /// geometry on release from tiling.
    pub fn set_floating(&mut self, win: Xid, floating: Option<bool>) -> crate::Result<()> {
        let has_tiling = self
            .model
            .client(win)
            .map(|c| self.model.ws(c.ws).layout.is_tiling())
            .unwrap_or(false);
        if !has_tiling {
            return Ok(());
        }

        let blocked = matches!(
            self.model.client(win),
            Some(c) if c.real_fullscreen()
                || c.state.contains(ClientState::STICKY)
                || c.state.contains(ClientState::FIXED)
        );
        if blocked {
            return Err(bad_command!(
                "unable to change floating state of fullscreen, sticky, or fixed size windows"
            ));
        }

        if let (Some(target), Some(c)) = (floating, self.model.client_mut(win)) {
            // Pre-invert so the toggle below lands on the requested state.
            c.state.set(ClientState::FLOATING, !target);
        }

        let (_, wr) = self.client_mon_rects(win);
        let now_floating = {
            let c = self.model.client_mut(win).expect("client checked above");
            c.state.toggle(ClientState::FLOATING);
            c.state.contains(ClientState::FLOATING)
        };

        if now_floating {
            let needs_quadrant = {
                let c = self.model.client(win).expect("client checked above");
                let ws_mon = self.model.monitors[self.model.ws(c.ws).mon].r;
                c.old_geom.x + c.old_geom.y == wr.x + wr.y
                    || c.old_geom.x + c.old_geom.y == ws_mon.x + ws_mon.y
            };
            if needs_quadrant {
                let (ws, w, h, bw) = {
                    let c = self.model.client(win).expect("client checked above");
                    (c.ws, c.old_geom.w, c.old_geom.h, c.bw)
                };
                let p = self.model.next_quadrant(ws, w, h, bw);
                if let Some(c) = self.model.client_mut(win) {
                    c.old_geom.x = p.x;
                    c.old_geom.y = p.y;
                }
            }

            let oversize = {
                let c = self.model.client(win).expect("client checked above");
                c.full_w() >= wr.w && c.full_h() >= wr.h
            };
            if oversize {
                if let Some(c) = self.model.client_mut(win) {
                    c.geom.w = wr.w - wr.w / 8;
                    c.geom.h = wr.h - wr.h / 8;
                }
                self.gravitate(win, Gravity::Center, Gravity::Center, true);
            }

            let (r, bw) = {
                let c = self.model.client(win).expect("client checked above");
                (c.old_geom, c.bw)
            };
            self.resize_hint(win, r, bw, false, false);
        } else if let Some(c) = self.model.client_mut(win) {
            c.save_geometry();
        }

        self.model.needs_refresh = true;
        Ok(())
    }

    /// Toggle the fake-fullscreen bit; a currently fullscreen client gets
    /// its geometry back (or loses it) immediately.
    pub fn toggle_fakefull(&mut self, win: Xid) {
        let (mon_r, _) = self.client_mon_rects(win);
        let state = match self.model.client_mut(win) {
            Some(c) => {
                c.state.toggle(ClientState::FAKEFULL);
                c.state
            }
            None => return,
        };

        if state.contains(ClientState::FULLSCREEN) {
            if let Some(c) = self.model.client_mut(win) {
                if c.geom.w != mon_r.w || c.geom.h != mon_r.h {
                    let bw = c.old_bw;
                    c.set_border_width(bw);
                }
            }
            if !state.contains(ClientState::FAKEFULL) {
                self.resize(win, mon_r, 0);
            }
            self.model.needs_refresh = true;
        }
    }

    /// Toggle sticky: a sticky client shows on every workspace of its
    /// monitor and advertises the all-desktops sentinel.
    pub fn toggle_sticky(&mut self, win: Xid) -> crate::Result<()> {
        let (sticky, fullscreen, ws) = match self.model.client(win) {
            Some(c) => (
                c.state.contains(ClientState::STICKY),
                c.real_fullscreen(),
                c.ws,
            ),
            None => return Ok(()),
        };
        if fullscreen {
            return Err(bad_command!("unable to change sticky state of fullscreen windows"));
        }

        if sticky {
            if let Some(c) = self.model.client_mut(win) {
                c.state -= ClientState::STICKY;
            }
            let _ = self.x.set_prop(
                win,
                Atom::NetWmDesktop.as_ref(),
                Prop::Cardinal(vec![ws as u32]),
            );
        } else {
            self.set_floating(win, None)?;
            if let Some(c) = self.model.client_mut(win) {
                c.state |= ClientState::STICKY | ClientState::FLOATING;
            }
            let _ = self.x.set_prop(
                win,
                Atom::NetWmDesktop.as_ref(),
                Prop::Cardinal(vec![0xffffffff]),
            );
        }

        Ok(())
    }

    // ----- scratchpad -------------------------------------------------------

    /// Hide a client on the scratch workspace.
    pub fn scratch_push(&mut self, win: Xid) {
        let fullscreen = matches!(
            self.model.client(win),
            Some(c) if c.real_fullscreen()
        );
        if fullscreen {
            return;
        }

        if self.model.cur_client() == Some(win) {
            self.unfocus(Some(win), true);
        }

        let floating = self
            .model
            .client(win)
            .map(|c| self.model.floating(c))
            .unwrap_or(true);
        if !floating {
            let (_, wr) = self.client_mon_rects(win);
            if let Some(c) = self.model.client_mut(win) {
                c.state |= ClientState::FLOATING;
                c.geom.w = wr.w / 3;
                c.geom.h = wr.h / 3;
                c.geom.x = wr.x + c.geom.w;
                c.geom.y = wr.y;
            }
        }

        if let Some(c) = self.model.client_mut(win) {
            c.state |= ClientState::SCRATCH | ClientState::HIDDEN | ClientState::FLOATING;
        }
        self.model.detach(win, false);
        self.model.detach_stack(win);
        if let Some(c) = self.model.client_mut(win) {
            c.ws = SCRATCH_WS;
        }
        self.model.attach(win, true);
        self.model.attach_stack(win);
        self.win_unmap(win);

        self.model.needs_refresh = true;
        self.model.win_change = true;
        self.model.ws_change = true;
    }

    /// Bring a scratch client to the selected workspace.
    pub fn scratch_pop(&mut self, win: Xid) {
        if let Some(c) = self.model.client_mut(win) {
            c.state -= ClientState::SCRATCH | ClientState::HIDDEN;
            c.old_state = c.state | ClientState::SCRATCH;
            c.state |= ClientState::NEEDSMAP;
        }
        let sel = self.model.sel_ws;
        self.set_client_workspace(win, sel, false);
        self.win_map(win);

        self.model.needs_refresh = true;
        self.model.win_change = true;
        self.model.ws_change = true;
    }

    /// The bare `win scratch` form: pop the most recent scratch client, or
    /// push the current selection when the scratchpad is empty.
    pub fn scratch_toggle(&mut self, target: Option<Xid>) -> crate::Result<()> {
        if let Some(win) = target {
            let is_scratch = matches!(
                self.model.client(win),
                Some(c) if c.state.contains(ClientState::SCRATCH)
            );
            if is_scratch {
                self.scratch_pop(win);
            } else {
                self.scratch_push(win);
            }
            return Ok(());
        }

        if let Some(&win) = self.model.scratch.clients.first() {
            self.scratch_pop(win);
            return Ok(());
        }

        // A client that was previously scratched keeps the bit in its saved
        // state; pull it back rather than pushing something new.
        let prior = self.model.workspaces.iter().flat_map(|w| w.clients.iter()).find(|id| {
            matches!(
                self.model.client(**id),
                Some(c) if c.old_state.contains(ClientState::SCRATCH)
                    && self.model.floating(c)
                    && !c.real_fullscreen()
            )
        });
        if let Some(&win) = prior {
            if self.model.client(win).map(|c| c.ws) == Some(self.model.sel_ws) {
                self.scratch_push(win);
            } else {
                if let Some(c) = self.model.client_mut(win) {
                    c.old_state = c.state | ClientState::SCRATCH;
                }
                self.scratch_pop(win);
            }
            return Ok(());
        }

        match self.model.cur_client() {
            Some(win) => {
                self.scratch_push(win);
                Ok(())
            }
            None => Err(bad_command!("no clients to scratch push")),
        }
    }
}
