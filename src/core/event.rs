//! The per-event handler table driven by the main loop.
use crate::{
    core::Wm,
    pure::client::ClientState,
    x::{
        Atom, ClientConfig, ClientMessage, ConfigureEvent, ConfigureRequest, MouseEvent,
        NetWmStateAction, PointerChange, PropertyEvent, XConn, XConnExt, XEvent,
    },
    Xid,
};
use tracing::trace;

// Caps lock and the common numlock modifier are ignored when matching the
// configured mouse chord.
const LOCK_MASKS: u16 = 0x2 | 0x10;

impl<X: XConn> Wm<X> {
    /// Dispatch one X event to its handler.
    pub fn handle_event(&mut self, ev: XEvent) {
        trace!(%ev, "handling event");

        match ev {
            XEvent::ButtonPress(e) => self.on_button_press(e),
            XEvent::ButtonRelease(_) => (),
            XEvent::ClientMessage(m) => self.on_client_message(m),
            XEvent::ConfigureNotify(e) => self.on_configure_notify(e),
            XEvent::ConfigureRequest(e) => self.on_configure_request(e),
            XEvent::Destroy(id) => self.unmanage(id, true),
            XEvent::Enter(e) => self.on_enter(e),
            XEvent::FocusIn(id) => self.on_focus_in(id),
            XEvent::MappingNotify => self.on_mapping_notify(),
            XEvent::MapRequest(id) => self.manage(id, false),
            XEvent::Motion(e) => self.on_motion(e),
            XEvent::PropertyNotify(e) => self.on_property_notify(e),
            XEvent::RandrNotify => self.handle_randr_change(),
            XEvent::UnmapNotify { id, from_send_event } => {
                self.on_unmap_notify(id, from_send_event)
            }
        }
    }

    fn on_button_press(&mut self, e: MouseEvent) {
        if !self.model.clients.contains_key(&e.id) {
            return;
        }
        if self.model.cur_client() != Some(e.id) {
            self.focus(Some(e.id));
        }

        let mouse = self.model.cfg.mouse;
        let is_chord_button = e.button == mouse.move_button || e.button == mouse.resize_button;
        let floating = self
            .model
            .client(e.id)
            .map(|c| self.model.floating(c))
            .unwrap_or(false);

        if floating && is_chord_button {
            let _ = self.x.set_client_config(e.id, &[ClientConfig::StackAbove]);
        }
        let _ = self.x.allow_pointer_events();

        if (e.state & !LOCK_MASKS) == (mouse.modifier & !LOCK_MASKS) && is_chord_button {
            let (fullscreen, fixed) = match self.model.client(e.id) {
                Some(c) => (
                    c.real_fullscreen(),
                    c.state.contains(ClientState::FIXED),
                ),
                None => return,
            };
            let moving = e.button == mouse.move_button;
            if fullscreen || (fixed && !moving) {
                return;
            }
            self.mouse_interact(e.id, moving, e.abs);
        }
    }

    fn on_client_message(&mut self, m: ClientMessage) {
        let root = self.x.root();

        if m.id == root && m.dtype == Atom::NetCurrentDesktop.as_ref() {
            let sel = self.model.cur_client();
            self.unfocus(sel, true);
            let ws = m.data[0] as usize;
            if ws < self.model.workspaces.len() {
                self.view_workspace(ws);
            }
            return;
        }
        if m.dtype == Atom::NetCloseWindow.as_ref() {
            self.unmanage(m.id, true);
            let _ = self.x.kill(m.id);
            return;
        }
        if !self.model.clients.contains_key(&m.id) {
            return;
        }

        if m.dtype == Atom::NetWmDesktop.as_ref() {
            let ws = m.data[0] as usize;
            if ws >= self.model.workspaces.len() {
                tracing::warn!(ws, "invalid workspace index in client message");
                return;
            }
            let was_sel = self
                .model
                .client(m.id)
                .map(|c| self.model.ws(c.ws).sel == Some(m.id))
                .unwrap_or(false);
            self.set_client_workspace(m.id, ws, !was_sel);
            self.model.ws_change = true;
            self.model.win_change = true;
            self.model.needs_refresh = true;
        } else if m.dtype == Atom::NetWmState.as_ref() {
            self.on_net_wm_state(m);
        } else if m.dtype == Atom::NetActiveWindow.as_ref()
            && self.model.cur_client() != Some(m.id)
        {
            self.activate_client(m.id);
        }
    }

    fn on_net_wm_state(&mut self, m: ClientMessage) {
        let action = match NetWmStateAction::from_data(m.data[0]) {
            Some(a) => a,
            None => return,
        };
        let names: Vec<String> = [m.data[1], m.data[2]]
            .into_iter()
            .filter(|&v| v != 0)
            .filter_map(|v| self.x.atom_name(v).ok())
            .collect();
        let has = |atom: Atom| names.iter().any(|n| n == atom.as_ref());

        if has(Atom::NetWmStateFullscreen) {
            let (visible, cur) = match self.model.client(m.id) {
                Some(c) => (
                    self.model.visible(c),
                    c.state.contains(ClientState::FULLSCREEN),
                ),
                None => return,
            };
            if visible {
                self.set_fullscreen(m.id, action.apply_to(cur));
                let _ = self.x.drain_enter_notify();
            }
        } else if has(Atom::NetWmStateAbove) {
            let cur = matches!(
                self.model.client(m.id),
                Some(c) if c.state.contains(ClientState::ABOVE)
            );
            let above = action.apply_to(cur);
            if let Some(c) = self.model.client_mut(m.id) {
                if above && !cur {
                    c.state |= ClientState::ABOVE | ClientState::FLOATING;
                } else if !above && cur {
                    c.state -= ClientState::ABOVE;
                }
            }
            self.model.needs_refresh = true;
        } else if has(Atom::NetWmStateDemandsAttention)
            && self.model.cur_client() != Some(m.id)
        {
            self.activate_client(m.id);
        }
    }

    /// `_NET_ACTIVE_WINDOW` / demands-attention: focus when `focus_urgent`
    /// allows it, otherwise just mark urgency.
    fn activate_client(&mut self, id: Xid) {
        let ignorable = matches!(
            self.model.client(id),
            Some(c) if c.state.contains(ClientState::IGNOREMSG)
                || c.state.contains(ClientState::SCRATCH)
        );

        if self.model.cfg.focus_urgent && !ignorable {
            let ws = self.model.clients[&id].ws;
            if ws != self.model.sel_ws {
                let sel = self.model.cur_client();
                self.unfocus(sel, true);
                self.view_workspace(ws);
            }
            self.focus(Some(id));
            let floating = self
                .model
                .client(id)
                .map(|c| self.model.floating(c))
                .unwrap_or(false);
            if floating {
                let _ = self.x.set_client_config(id, &[ClientConfig::StackAbove]);
            }
        } else {
            self.set_urgent(id, true);
        }
        self.model.needs_refresh = true;
    }

    fn on_configure_notify(&mut self, e: ConfigureEvent) {
        if e.is_root {
            self.root_resized(e.r);
        }
    }

    fn on_configure_request(&mut self, e: ConfigureRequest) {
        if !self.model.clients.contains_key(&e.id) {
            // Unmanaged windows get their request verbatim.
            let geom = self.x.window_geometry(e.id).unwrap_or_default();
            let r = crate::pure::geometry::Rect::new(
                e.x.unwrap_or(geom.x),
                e.y.unwrap_or(geom.y),
                e.w.unwrap_or(geom.w),
                e.h.unwrap_or(geom.h),
            );
            let _ = self.x.set_client_config(e.id, &[ClientConfig::Position(r)]);
            self.x.flush();
            return;
        }

        let (visible, ignore_cfg, floating, geom, bw) = {
            let c = &self.model.clients[&e.id];
            (
                self.model.visible(c),
                c.state.contains(ClientState::IGNORECFG),
                self.model.floating(c),
                c.geom,
                c.bw,
            )
        };
        if !visible || ignore_cfg {
            return;
        }

        if let Some(new_bw) = e.bw {
            if let Some(c) = self.model.client_mut(e.id) {
                c.set_border_width(new_bw);
            }
        } else if floating {
            let (mon_r, _) = self.client_mon_rects(e.id);
            let min_wh = self.model.cfg.min_wh;
            let min_xy = self.model.cfg.min_xy;

            let (mut full_w, mut full_h) = (0, 0);
            if let Some(c) = self.model.client_mut(e.id) {
                if let Some(x) = e.x {
                    c.old_geom.x = c.geom.x;
                    c.geom.x = mon_r.x + x;
                }
                if let Some(y) = e.y {
                    c.old_geom.y = c.geom.y;
                    c.geom.y = mon_r.y + y;
                }
                if let Some(w) = e.w {
                    c.old_geom.w = c.geom.w;
                    c.geom.w = w.clamp(min_wh, mon_r.w);
                }
                if let Some(h) = e.h {
                    c.old_geom.h = c.geom.h;
                    c.geom.h = h.clamp(min_wh, mon_r.h);
                }
                full_w = c.full_w();
                full_h = c.full_h();
            }
            // A request that would leave the window effectively off screen
            // re-centers it instead.
            if let Some(c) = self.model.client_mut(e.id) {
                if c.geom.x + c.geom.w < mon_r.x + min_xy
                    || c.geom.x > mon_r.right() - min_xy
                {
                    c.geom.x = mon_r.x + (mon_r.w / 2 - full_w / 2);
                }
                if c.geom.y + c.geom.h < mon_r.y + min_xy
                    || c.geom.y > mon_r.bottom() - min_xy
                {
                    c.geom.y = mon_r.y + (mon_r.h / 2 - full_h / 2);
                }
            }
            let r = self.model.clients[&e.id].geom;
            let bw = self.model.clients[&e.id].bw;
            self.resize(e.id, r, bw);
        } else {
            let _ = self.x.send_configure_notify(e.id, geom, bw);
        }
        self.x.flush();
    }

    fn on_enter(&mut self, e: PointerChange) {
        let ws = if let Some(c) = self.model.client(e.id) {
            Some(c.ws)
        } else {
            self.model.coord_to_mon(e.abs).map(|m| self.model.monitors[m].ws)
        };

        if let Some(ws) = ws {
            if ws != self.model.sel_ws {
                self.change_workspace(ws, false, false);
            }
        }

        let is_client = self.model.clients.contains_key(&e.id);
        if is_client && self.model.cur_client() != Some(e.id) && self.model.cfg.focus_mouse {
            self.focus(Some(e.id));
        }
    }

    fn on_focus_in(&mut self, id: Xid) {
        // Re-assert focus if something stole it from the selected client.
        if let Some(sel) = self.model.cur_client() {
            if id != sel {
                self.set_input_focus(sel);
            }
        }
    }

    fn on_mapping_notify(&mut self) {
        let _ = self.x.refresh_keyboard_mapping();
        let mouse = self.model.cfg.mouse;
        for id in self.model.clients.keys().copied().collect::<Vec<_>>() {
            let _ = self.x.grab_buttons(id, &mouse);
        }
    }

    fn on_motion(&mut self, e: MouseEvent) {
        if e.id != self.x.root() {
            return;
        }
        if let Some(m) = self.model.coord_to_mon(e.abs) {
            let ws = self.model.monitors[m].ws;
            if ws != self.model.sel_ws {
                self.change_workspace(ws, false, false);
                self.focus(None);
            }
        }
    }

    fn on_property_notify(&mut self, e: PropertyEvent) {
        if e.deleted || e.id == self.x.root() {
            return;
        }

        if self.model.clients.contains_key(&e.id) {
            if e.atom == Atom::WmHints.as_ref() {
                self.refresh_wm_hints(e.id);
            } else if e.atom == Atom::WmNormalHints.as_ref() {
                if let Some(c) = self.model.client_mut(e.id) {
                    c.hints = None;
                }
            } else if e.atom == Atom::WmTransientFor.as_ref() {
                let trans = self
                    .x
                    .transient_for(e.id)
                    .filter(|t| self.model.clients.contains_key(t));
                let floating = self
                    .model
                    .client(e.id)
                    .map(|c| self.model.floating(c))
                    .unwrap_or(true);
                if let Some(c) = self.model.client_mut(e.id) {
                    c.trans = trans;
                    if c.trans.is_some() && !floating {
                        c.state |= ClientState::FLOATING;
                        self.model.needs_refresh = true;
                    }
                }
            } else if e.atom == Atom::WmName.as_ref() || e.atom == Atom::NetWmName.as_ref() {
                if self.refresh_title(e.id) {
                    self.model.win_change = true;
                }
            } else if e.atom == Atom::NetWmWindowType.as_ref() {
                self.refresh_window_type(e.id);
            }
        } else if (e.atom == Atom::NetWmStrut.as_ref()
            || e.atom == Atom::NetWmStrutPartial.as_ref())
            && self.model.panels.iter().any(|p| p.win == e.id)
        {
            let strut = self.x.strut(e.id);
            if let Some(p) = self.model.panels.iter_mut().find(|p| p.win == e.id) {
                p.strut = strut;
            }
            self.model.update_struts();
            let _ = self.update_net_workspaces();
            self.model.needs_refresh = true;
        }
    }

    fn on_unmap_notify(&mut self, id: Xid, from_send_event: bool) {
        if id == self.x.root() {
            return;
        }
        if from_send_event {
            // ICCCM: a synthetic unmap asks for withdrawal without deletion.
            let _ = self.x.set_wm_state(id, crate::x::WmState::Withdrawn);
        } else {
            self.unmanage(id, false);
        }
    }
}
